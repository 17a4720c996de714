use axum::http::StatusCode;
use serde_json::{Value, json};

use clinic_testing::auth::MockAuth;

use crate::helpers::{create_patient, demo_server, id_of, list_all, patient_body, register, send_sms};

// ── POST /users/@me ──────────────────────────────────────────────────────────

#[tokio::test]
async fn should_register_caller_with_normalized_email() {
    let server = demo_server().await;
    let auth = MockAuth::random();

    let response = server
        .post("/users/@me")
        .add_header(auth.header_name(), auth.header_value())
        .json(&json!({"email": "  Front.Desk@Clinic.Example "}))
        .await;

    response.assert_status(StatusCode::CREATED);
    let user = response.json::<Value>();
    assert_eq!(user["id"], auth.user_id.to_string());
    assert_eq!(user["email"], "front.desk@clinic.example");
    assert_eq!(user["seeded_patients"], 0);
}

#[tokio::test]
async fn should_reject_duplicate_registration() {
    let server = demo_server().await;
    let auth = register(&server).await;

    let again = server
        .post("/users/@me")
        .add_header(auth.header_name(), auth.header_value())
        .json(&json!({"email": "someone.else@clinic.example"}))
        .await;
    again.assert_status(StatusCode::CONFLICT);
    assert_eq!(again.json::<Value>()["kind"], "USER_ALREADY_EXISTS");

    let other = MockAuth::random();
    let taken_email = server
        .post("/users/@me")
        .add_header(other.header_name(), other.header_value())
        .json(&json!({"email": format!("{}@clinic.example", auth.user_id)}))
        .await;
    taken_email.assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn should_reject_malformed_email() {
    let server = demo_server().await;
    let auth = MockAuth::random();

    let response = server
        .post("/users/@me")
        .add_header(auth.header_name(), auth.header_value())
        .json(&json!({"email": "front desk"}))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.json::<Value>()["errors"]["email"].is_array());
}

#[tokio::test]
async fn should_seed_demo_patients_on_request() {
    let server = demo_server().await;
    let auth = MockAuth::random();

    let response = server
        .post("/users/@me")
        .add_header(auth.header_name(), auth.header_value())
        .json(&json!({"email": "demo@clinic.example", "seed_demo": true}))
        .await;

    response.assert_status(StatusCode::CREATED);
    assert_eq!(response.json::<Value>()["seeded_patients"], 100);
    let page = list_all(&server, &auth, &[]).await;
    assert_eq!(page["total"], 100);
    assert_eq!(page["last_page"], 10);

    let todays = server
        .get("/patients")
        .add_header(auth.header_name(), auth.header_value())
        .await
        .json::<Value>();
    assert!(todays["total"].as_u64().unwrap() >= 5, "{}", todays["total"]);
}

// ── DELETE /users/@me ────────────────────────────────────────────────────────

#[tokio::test]
async fn should_delete_caller_and_their_patients() {
    let server = demo_server().await;
    let auth = register(&server).await;
    let patient = create_patient(&server, &auth, patient_body("Ava", "Lee", "+61412000001")).await;
    send_sms(&server, &auth, &id_of(&patient)).await;

    server
        .delete("/users/@me")
        .add_header(auth.header_name(), auth.header_value())
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let again = server
        .delete("/users/@me")
        .add_header(auth.header_name(), auth.header_value())
        .await;
    again.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(again.json::<Value>()["kind"], "USER_NOT_FOUND");

    server
        .get(&format!("/patients/{}", id_of(&patient)))
        .add_header(auth.header_name(), auth.header_value())
        .await
        .assert_status(StatusCode::NOT_FOUND);
}
