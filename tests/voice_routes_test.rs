mod common;

use actix_web::test;
use serde_json::{json, Value};

use common::{itinerary_reply, FakeModel, FakeSearch, FakeSpeech, TestApp};

const GREETING: &str =
    "Hey I am Ava, your personalized trip planning assistant. How may I help you today?";

fn message(session_id: &str, text: &str) -> test::TestRequest {
    test::TestRequest::post()
        .uri(&format!("/api/v1/voice/session/{}/message", session_id))
        .set_json(json!({ "message": text }))
}

#[actix_rt::test]
async fn test_start_session_greets_with_audio() {
    let test_app = TestApp::new(FakeModel::default(), FakeSearch::empty());
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/voice/session/start")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert!(body["sessionId"].as_str().is_some_and(|id| !id.is_empty()));
    assert_eq!(
        body["text"],
        format!("{} To begin, which city are you travelling from?", GREETING)
    );
    assert_eq!(body["audio"], "bXAzLWF1ZGlv");
    assert!(body["warnings"].is_null());
}

#[actix_rt::test]
async fn test_start_session_without_speech_warns() {
    let test_app = TestApp::with_speech(
        FakeModel::default(),
        FakeSearch::empty(),
        FakeSpeech { available: false },
    );
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/voice/session/start")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert!(body["audio"].is_null());
    assert_eq!(body["warnings"].as_array().unwrap().len(), 1);
}

#[actix_rt::test]
async fn test_conversation_produces_itinerary() {
    let reply = itinerary_reply("Jaipur");
    let test_app = TestApp::new(FakeModel::with_text(&[reply.as_str()]), FakeSearch::empty());
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/voice/session/start")
        .to_request();
    let started: Value = test::call_and_read_body_json(&app, req).await;
    let session_id = started["sessionId"].as_str().unwrap().to_string();

    let first: Value = test::call_and_read_body_json(&app, message(&session_id, "new delhi").to_request()).await;
    assert_eq!(
        first["reply"],
        "Perfect, we'll start right from New Delhi. Lovely. Where would you like to visit?"
    );
    assert_eq!(first["complete"], false);

    let _: Value = test::call_and_read_body_json(&app, message(&session_id, "jaipur").to_request()).await;

    let unclear: Value = test::call_and_read_body_json(&app, message(&session_id, "not sure yet").to_request()).await;
    assert_eq!(
        unclear["reply"],
        "I missed that start date. Could you share it once more, including the month and day?"
    );
    assert_eq!(unclear["complete"], false);

    let _: Value = test::call_and_read_body_json(&app, message(&session_id, "2025-03-10").to_request()).await;
    let _: Value = test::call_and_read_body_json(&app, message(&session_id, "2025-03-11").to_request()).await;
    let _: Value = test::call_and_read_body_json(&app, message(&session_id, "two of us").to_request()).await;
    let budget: Value = test::call_and_read_body_json(&app, message(&session_id, "40,000 rupees").to_request()).await;
    assert!(budget["reply"]
        .as_str()
        .unwrap()
        .starts_with("Thanks. I'll keep the trip within \u{20b9}40,000."));

    let done: Value = test::call_and_read_body_json(&app, message(&session_id, "heritage").to_request()).await;
    assert_eq!(done["complete"], true);
    assert_eq!(done["itinerary"]["destination"], "Jaipur, India");
    assert_eq!(done["preferences"]["origin"], "New Delhi");
    assert_eq!(done["preferences"]["startDate"], "2025-03-10");
    assert_eq!(done["preferences"]["travellers"], 2);
    assert_eq!(done["preferences"]["budget"], 40000);
    assert_eq!(done["preferences"]["themes"], json!(["Heritage"]));

    let again: Value = test::call_and_read_body_json(&app, message(&session_id, "thanks").to_request()).await;
    assert_eq!(again["complete"], true);
    assert_eq!(
        again["reply"],
        "Your itinerary is already ready. Feel free to ask for another plan whenever you like."
    );
    assert_eq!(test_app.model.request_count(), 1);
}

#[actix_rt::test]
async fn test_message_for_unknown_session_is_not_found() {
    let test_app = TestApp::new(FakeModel::default(), FakeSearch::empty());
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/voice/session/nope/message")
        .set_json(json!({ "message": "Delhi" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["detail"], "Session not found or expired.");
}

#[actix_rt::test]
async fn test_empty_message_is_rejected() {
    let test_app = TestApp::new(FakeModel::default(), FakeSearch::empty());
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/voice/session/start")
        .to_request();
    let started: Value = test::call_and_read_body_json(&app, req).await;

    let req = test::TestRequest::post()
        .uri(&format!(
            "/api/v1/voice/session/{}/message",
            started["sessionId"].as_str().unwrap()
        ))
        .set_json(json!({ "message": "   " }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["detail"], "Message cannot be empty.");
}

#[actix_rt::test]
async fn test_transcribe_audio() {
    let test_app = TestApp::new(FakeModel::default(), FakeSearch::empty());
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/voice/session/start")
        .to_request();
    let started: Value = test::call_and_read_body_json(&app, req).await;
    let uri = format!(
        "/api/v1/voice/session/{}/transcribe",
        started["sessionId"].as_str().unwrap()
    );

    let req = test::TestRequest::post()
        .uri(&uri)
        .set_json(json!({ "audio": "data:audio/webm;base64,d2VibS1hdWRpbw==" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!({ "transcript": "Delhi" }));

    let req = test::TestRequest::post()
        .uri(&uri)
        .set_json(json!({}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["detail"], "No audio payload received.");

    let req = test::TestRequest::post()
        .uri(&uri)
        .set_json(json!({ "audio": "%%% not base64 %%%" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}
