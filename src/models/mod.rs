pub mod images;
pub mod itinerary;
pub mod lenient;
pub mod places;
pub mod preferences;
pub mod suggestions;
pub mod voice;
pub mod weather;
