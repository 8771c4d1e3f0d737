mod common;

use actix_web::test;
use serde_json::{json, Value};
use trip_planner_api::db::ItineraryStore;

use common::{itinerary_reply, preferences, FakeModel, FakeSearch, TestApp};

fn hotel_reply() -> String {
    json!([
        {"name": "Pearl Haveli", "neighbourhood": "Old City", "approx_price_in_inr": 3500, "rating": 4.4, "tags": ["heritage"]},
        {"name": "Lake View Palace", "neighbourhood": "Amer", "approx_price_in_inr": 5000, "rating": 4.7},
        {"name": "Pink City Inn", "approx_price_in_inr": 3900, "rating": "4.1"},
        {"name": "  ", "approx_price_in_inr": 1200}
    ])
    .to_string()
}

#[actix_rt::test]
async fn test_hotels_filtered_by_nightly_budget() {
    let test_app = TestApp::new(FakeModel::with_text(&[hotel_reply().as_str()]), FakeSearch::with_images(1));
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/suggest-hotels?city=Jaipur&start_date=2025-03-10&end_date=2025-03-13&budget=12000")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["city"], "Jaipur");
    assert_eq!(body["travellers"], 2);
    let names: Vec<&str> = body["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|hotel| hotel["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Pearl Haveli", "Pink City Inn"]);
    assert_eq!(body["results"][0]["image_url"], "https://img.test/photo-1.jpg");
    assert!(test_app
        .search
        .queries()
        .contains(&"Pearl Haveli Jaipur hotel".to_string()));
}

#[actix_rt::test]
async fn test_hotels_over_budget_fall_back_to_cheapest_entries() {
    let test_app = TestApp::new(FakeModel::with_text(&[hotel_reply().as_str()]), FakeSearch::with_images(1));
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/suggest-hotels?city=Jaipur&start_date=2025-03-10&end_date=2025-03-13&budget=3000")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    let prices: Vec<f64> = body["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|hotel| hotel["approx_price_in_inr"].as_f64().unwrap())
        .collect();
    assert_eq!(prices, vec![1200.0, 3500.0, 3900.0, 5000.0]);
    assert_eq!(body["results"][1]["name"], "Pearl Haveli");
}

#[actix_rt::test]
async fn test_hotels_are_attached_to_stored_itinerary() {
    let model = FakeModel::with_text(&[itinerary_reply("Jaipur").as_str(), hotel_reply().as_str()]);
    let test_app = TestApp::new(model, FakeSearch::empty());
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/itinerary")
        .set_json(json!({ "preferences": preferences("Jaipur") }))
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    let id = created["id"].as_str().unwrap();

    let req = test::TestRequest::get()
        .uri(&format!(
            "/api/v1/suggest-hotels?city=Jaipur&start_date=2025-03-10&end_date=2025-03-11&itinerary_id={}",
            id
        ))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let record = test_app.store.load_itinerary(id).await.unwrap().unwrap();
    let hotels = record.providers.hotels.expect("hotels attached");
    assert_eq!(hotels.city, "Jaipur");
    assert_eq!(hotels.results.len(), 3);
    assert!(record.providers.flights.is_none());
}

#[actix_rt::test]
async fn test_hotels_for_unknown_itinerary_still_succeed() {
    let test_app = TestApp::new(FakeModel::with_text(&[hotel_reply().as_str()]), FakeSearch::empty());
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/suggest-hotels?city=Jaipur&start_date=2025-03-10&end_date=2025-03-11&itinerary_id=missing")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
}

#[actix_rt::test]
async fn test_hotels_model_returns_object_is_error() {
    let test_app = TestApp::new(FakeModel::with_text(&["{\"hotels\": []}"]), FakeSearch::empty());
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/suggest-hotels?city=Jaipur&start_date=2025-03-10&end_date=2025-03-11")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 500);

    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].is_string());
}

#[actix_rt::test]
async fn test_flights_fall_back_when_over_budget() {
    let reply = json!([
        {"airline": "IndiGo", "flight_number": "6E 201", "depart_time": "07:10", "arrival_time": "08:20", "duration": "1h 10m", "price_in_inr": 6200},
        {"airline": "Air India", "flight_number": "AI 411", "depart_time": "12:00", "arrival_time": "13:15", "duration": "1h 15m", "price_in_inr": 7400}
    ])
    .to_string();
    let test_app = TestApp::new(FakeModel::with_text(&[reply.as_str()]), FakeSearch::empty());
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/suggest-flights?origin=Delhi&destination=Jaipur&depart=2025-03-10&ret=2025-03-12&budget=3000")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["origin"], "Delhi");
    assert_eq!(body["return"], "2025-03-12");
    assert_eq!(body["travellers"], 1);
    assert_eq!(body["results"].as_array().unwrap().len(), 2);
    assert_eq!(body["results"][0]["airline"], "IndiGo");
}

#[actix_rt::test]
async fn test_fashion_offline_catalogue_without_search() {
    let test_app = TestApp::new(FakeModel::default(), FakeSearch::unconfigured());
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/suggest-fashion?city=Jaipur&season_hint=winter")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["offline"], true);
    assert_eq!(body["season_hint"], "winter");
    for category in ["men", "women", "kids", "accessories"] {
        assert_eq!(body["results"][category].as_array().unwrap().len(), 4);
    }
    assert_eq!(test_app.model.request_count(), 0);
}

#[actix_rt::test]
async fn test_fashion_gives_up_after_repeated_bad_payloads() {
    let test_app = TestApp::new(
        FakeModel::with_text(&["not json", "{\"men\": []}", "[]"]),
        FakeSearch::with_images(1),
    );
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/suggest-fashion?city=Jaipur")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 502);

    let body: Value = test::read_body_json(resp).await;
    assert!(body["detail"].is_string());
    assert_eq!(test_app.model.request_count(), 3);
}

#[actix_rt::test]
async fn test_missing_query_parameter_is_unprocessable() {
    let test_app = TestApp::new(FakeModel::default(), FakeSearch::empty());
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/suggest-flights?origin=Delhi")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 422);
}
