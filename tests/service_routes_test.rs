mod common;

use actix_web::test;
use serde_json::{json, Value};

use common::{FakeModel, FakeSearch, TestApp};

#[actix_rt::test]
async fn test_health_check() {
    let test_app = TestApp::new(FakeModel::default(), FakeSearch::empty());
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get().uri("/api/v1/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!({ "status": "ok" }));
}

#[actix_rt::test]
async fn test_service_status_reports_missing_configuration() {
    let test_app = TestApp::new(FakeModel::default(), FakeSearch::unconfigured());
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/health/services")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["storage_backend"], "memory");
    assert_eq!(body["services"]["storage"]["status"], "ok");
    assert_eq!(body["services"]["search"]["status"], "error");
    assert_eq!(body["services"]["maps"]["status"], "error");
}

#[actix_rt::test]
async fn test_weather_forecast_requires_maps_key() {
    let test_app = TestApp::new(FakeModel::default(), FakeSearch::empty());
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/weather-forecast?city=Jaipur&days=3")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body["error"],
        "GOOGLE_MAPS_API_KEY (or MAPS_API_KEY) is required for the Google Weather API."
    );
}

#[actix_rt::test]
async fn test_weather_forecast_days_out_of_range() {
    let test_app = TestApp::new(FakeModel::default(), FakeSearch::empty());
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/weather-forecast?city=Jaipur&days=11")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 422);
}

#[actix_rt::test]
async fn test_weather_search_uses_web_results() {
    let test_app = TestApp::new(FakeModel::default(), FakeSearch::empty());
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/weather-search?city=Goa")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["city"], "Goa");
    assert_eq!(body["results"].as_array().unwrap().len(), 2);
    assert_eq!(test_app.search.queries(), vec!["Goa weather forecast".to_string()]);
}

#[actix_rt::test]
async fn test_directions_without_key_is_an_error() {
    let test_app = TestApp::new(FakeModel::default(), FakeSearch::empty());
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/directions")
        .set_json(json!({
            "origin": {"lat": 26.9855, "lng": 75.8513},
            "destination": {"lat": 26.9239, "lng": 75.8267},
            "waypoints": [{"lat": 26.9258, "lng": 75.8237}]
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 500);

    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].as_str().unwrap().contains("MAPS_API_KEY"));
}

#[actix_rt::test]
async fn test_geocode_with_no_locations_is_empty() {
    let test_app = TestApp::new(FakeModel::default(), FakeSearch::empty());
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/geocode-locations?city=Jaipur")
        .set_json(json!({ "locations": [] }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!({ "results": {} }));
}

#[actix_rt::test]
async fn test_smart_tips() {
    let model = FakeModel::with_text(&["```json\n{\"tips\": [\"Carry cash for bazaars\"]}\n```"]);
    let test_app = TestApp::new(model, FakeSearch::empty());
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/smart-tips?destination=Jaipur&themes=Food")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["destination"], "Jaipur");
    assert_eq!(body["themes"], "Food");
    assert!(body["tips"].is_object() || body["tips"].is_array());
}

#[actix_rt::test]
async fn test_translate_itinerary_returns_model_json() {
    let model = FakeModel::with_text(&["{\"days\": [{\"summary\": \"Forts et bazars\"}]}"]);
    let test_app = TestApp::new(model, FakeSearch::empty());
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/translate-itinerary")
        .set_json(json!({
            "itinerary": {"days": [{"summary": "Forts and bazaars"}]},
            "target_language": "French"
        }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["days"][0]["summary"], "Forts et bazars");

    let requests = test_app.model.requests.lock().unwrap();
    assert!(requests[0].prompt.contains("French"));
    assert!(requests[0].prompt.contains("Forts and bazaars"));
}

#[actix_rt::test]
async fn test_translate_itinerary_unparseable_reply() {
    let test_app = TestApp::new(FakeModel::with_text(&["Désolé"]), FakeSearch::empty());
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/translate-itinerary")
        .set_json(json!({ "itinerary": {}, "target_language": "Hindi" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 500);
}

#[actix_rt::test]
async fn test_weather_summary_falls_back_on_empty_reply() {
    let test_app = TestApp::new(FakeModel::default(), FakeSearch::empty());
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/weather-summary")
        .set_json(json!({ "daily": [{"date": "2025-03-10", "maxTempC": 31}] }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["summary"], "Could not generate a weather summary.");
}
