mod common;

use actix_web::{http::header, test};
use serde_json::{json, Value};
use trip_planner_api::db::ItineraryStore;

use common::{itinerary_reply, preferences, FakeModel, FakeSearch, TestApp};

#[actix_rt::test]
async fn test_generate_itinerary_enriches_and_persists() {
    let reply = itinerary_reply("Jaipur");
    let test_app = TestApp::new(FakeModel::with_text(&[reply.as_str()]), FakeSearch::with_images(3));
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/itinerary")
        .set_json(json!({ "preferences": preferences("Jaipur") }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["destination"], "Jaipur, India");
    assert_eq!(body["currency"], "INR");
    assert_eq!(body["budget"], 40000);
    assert_eq!(body["totalEstimatedCost"], 32000);
    assert_eq!(body["meta"]["source"], "gemini");
    assert_eq!(body["days"].as_array().unwrap().len(), 2);
    assert_eq!(body["days"][0]["date"], "2025-03-10");
    assert_eq!(body["days"][1]["date"], "2025-03-11");
    assert_eq!(body["themes"], json!(["Heritage", "Food"]));
    assert_eq!(body["image_urls"].as_array().unwrap().len(), 3);
    assert!(!body["days"][0]["activities"][0]["images"]
        .as_array()
        .unwrap()
        .is_empty());
    assert!(body["narrations"].is_array());
    assert!(body["insights"]["overallScore"].is_number());

    let id = body["id"].as_str().unwrap();
    assert_eq!(test_app.state.store.load_itinerary(id).await.unwrap().unwrap().id, id);
}

#[actix_rt::test]
async fn test_reversed_dates_plan_a_single_day() {
    let reply = itinerary_reply("Jaipur");
    let test_app = TestApp::new(FakeModel::with_text(&[reply.as_str()]), FakeSearch::empty());
    let app = test::init_service(test_app.create_app()).await;

    let mut prefs = preferences("Jaipur");
    prefs["startDate"] = json!("2025-03-12");
    prefs["endDate"] = json!("2025-03-10");
    let req = test::TestRequest::post()
        .uri("/api/v1/itinerary")
        .set_json(json!({ "preferences": prefs }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let requests = test_app.model.requests.lock().unwrap();
    let instruction = requests[0].system_instruction.as_deref().unwrap();
    assert!(instruction.contains("Create exactly 1 days"));
}

#[actix_rt::test]
async fn test_repeat_request_is_served_from_cache() {
    let reply = itinerary_reply("Jaipur");
    let test_app = TestApp::new(FakeModel::with_text(&[reply.as_str()]), FakeSearch::with_images(1));
    let app = test::init_service(test_app.create_app()).await;

    for expected_source in ["gemini", "cache"] {
        let req = test::TestRequest::post()
            .uri("/api/v1/itinerary")
            .set_json(json!({ "preferences": preferences("Jaipur") }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["meta"]["source"], expected_source);
    }
    assert_eq!(test_app.model.request_count(), 1);
}

#[actix_rt::test]
async fn test_get_and_delete_stored_itinerary() {
    let reply = itinerary_reply("Jaipur");
    let test_app = TestApp::new(FakeModel::with_text(&[reply.as_str()]), FakeSearch::empty());
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/itinerary")
        .set_json(json!({ "preferences": preferences("Jaipur") }))
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    let id = created["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/itinerary/{}", id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    let stored: Value = test::read_body_json(resp).await;
    assert_eq!(stored["id"], id.as_str());
    assert!(stored.get("_id").is_none());
    assert_eq!(stored["itinerary"]["destination"], "Jaipur, India");
    assert_eq!(stored["preferences"]["destination"], "Jaipur");
    assert!(stored["updatedAt"].is_string());

    let req = test::TestRequest::delete()
        .uri(&format!("/api/v1/itinerary/{}", id))
        .to_request();
    let deleted: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(deleted, json!({ "id": id, "deleted": true }));

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/itinerary/{}", id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["detail"], "Itinerary not found");
}

#[actix_rt::test]
async fn test_delete_unknown_itinerary_is_not_found() {
    let test_app = TestApp::new(FakeModel::default(), FakeSearch::empty());
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::delete()
        .uri("/api/v1/itinerary/does-not-exist")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
}

#[actix_rt::test]
async fn test_out_of_range_budget_is_rejected() {
    let test_app = TestApp::new(FakeModel::default(), FakeSearch::empty());
    let app = test::init_service(test_app.create_app()).await;

    let mut prefs = preferences("Jaipur");
    prefs["budget"] = json!(500);
    let req = test::TestRequest::post()
        .uri("/api/v1/itinerary")
        .set_json(json!({ "preferences": prefs }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 422);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["detail"], "Budget must be between 1000 and 500000");
    assert_eq!(test_app.model.request_count(), 0);
}

#[actix_rt::test]
async fn test_empty_model_reply_is_bad_gateway() {
    let test_app = TestApp::new(FakeModel::with_text(&["  "]), FakeSearch::empty());
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/itinerary")
        .set_json(json!({ "preferences": preferences("Jaipur") }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 502);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["detail"], "Gemini returned an empty response");
}

#[actix_rt::test]
async fn test_malformed_body_is_unprocessable() {
    let test_app = TestApp::new(FakeModel::default(), FakeSearch::empty());
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/itinerary")
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_payload("{\"preferences\": {\"origin\": \"Delhi\"}}")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 422);

    let body: Value = test::read_body_json(resp).await;
    assert!(body["detail"].is_string());
}
