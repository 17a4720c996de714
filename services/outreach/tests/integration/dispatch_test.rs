use axum::http::StatusCode;
use chrono::Utc;
use serde_json::{Value, json};

use crate::helpers::{
    create_patient, demo_server, get_patient, id_of, patient_body, register, rejecting_server,
    send_sms,
};

fn todays_patient() -> Value {
    let mut body = patient_body("Mia", "Wilson", "+61411000111");
    body["appointment_at"] = json!(Utc::now().to_rfc3339());
    body
}

// ── POST /sms/send ───────────────────────────────────────────────────────────

#[tokio::test]
async fn should_record_sent_message_in_demo_mode() {
    let server = demo_server().await;
    let auth = register(&server).await;
    let patient = create_patient(&server, &auth, todays_patient()).await;

    let (status, body) = send_sms(&server, &auth, &id_of(&patient)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["status"], "sent");

    let detail = get_patient(&server, &auth, &id_of(&patient)).await;
    assert_eq!(detail["status"], "sent");
    let messages = detail["sms_messages"].as_array().unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["id"], body["message_id"]);
    assert!(messages[0]["sent_at"].is_string());
    assert_eq!(messages[0]["completed_at"], Value::Null);
    assert_eq!(messages[0]["failed_at"], Value::Null);
    assert_eq!(messages[0]["content"], "Please fill in your intake form");
    assert_eq!(detail["last_sent_at"], messages[0]["sent_at"]);
}

#[tokio::test]
async fn should_record_failed_attempt_when_provider_rejects() {
    let server = rejecting_server().await;
    let auth = register(&server).await;
    let patient = create_patient(&server, &auth, todays_patient()).await;

    let (status, body) = send_sms(&server, &auth, &id_of(&patient)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert!(
        body["error"].as_str().unwrap().contains("Invalid 'To' Phone Number"),
        "{body}"
    );

    let detail = get_patient(&server, &auth, &id_of(&patient)).await;
    assert_eq!(detail["status"], "failed");
    let messages = detail["sms_messages"].as_array().unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["status"], "failed");
    assert!(messages[0]["failed_at"].is_string());
    assert_eq!(messages[0]["sent_at"], Value::Null);
    assert_eq!(detail["last_sent_at"], messages[0]["failed_at"]);
}

#[tokio::test]
async fn should_keep_every_attempt_and_derive_status_from_all_of_them() {
    let server = demo_server().await;
    let auth = register(&server).await;
    let patient = create_patient(&server, &auth, todays_patient()).await;

    let (_, first) = send_sms(&server, &auth, &id_of(&patient)).await;
    server
        .post(&format!("/messages/{}/completion", first["message_id"].as_str().unwrap()))
        .add_header(auth.header_name(), auth.header_value())
        .await
        .assert_status_ok();
    let (_, second) = send_sms(&server, &auth, &id_of(&patient)).await;

    // The newer attempt is only "sent", but the earlier completion still wins.
    assert_eq!(second["status"], "completed");
    let detail = get_patient(&server, &auth, &id_of(&patient)).await;
    assert_eq!(detail["status"], "completed");
    let messages = detail["sms_messages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["id"], second["message_id"]);
    assert_eq!(messages[1]["id"], first["message_id"]);
}

#[tokio::test]
async fn should_validate_send_request() {
    let server = demo_server().await;
    let auth = register(&server).await;

    let response = server
        .post("/sms/send")
        .add_header(auth.header_name(), auth.header_value())
        .json(&json!({"patient_id": "not-a-uuid", "message": "  "}))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let errors = &response.json::<Value>()["errors"];
    assert!(errors["patient_id"].is_array());
    assert!(errors["message"].is_array());
}

#[tokio::test]
async fn should_reject_mistyped_send_body_with_json_errors() {
    let server = demo_server().await;
    let auth = register(&server).await;

    for body in [json!({"patient_id": 12}), json!({"patient_id": 12, "message": "hi"})] {
        let response = server
            .post("/sms/send")
            .add_header(auth.header_name(), auth.header_value())
            .json(&body)
            .await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        let error = response.json::<Value>();
        assert_eq!(error["kind"], "VALIDATION");
        assert!(error["errors"]["body"][0].is_string(), "{error}");
    }

    let not_json = server
        .post("/sms/send")
        .add_header(auth.header_name(), auth.header_value())
        .text("patient_id=12")
        .await;
    not_json.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert!(not_json.json::<Value>()["errors"]["body"].is_array());
}

#[tokio::test]
async fn should_not_send_to_another_users_patient() {
    let server = demo_server().await;
    let alice = register(&server).await;
    let bob = register(&server).await;
    let patient = create_patient(&server, &alice, todays_patient()).await;

    let response = server
        .post("/sms/send")
        .add_header(bob.header_name(), bob.header_value())
        .json(&json!({"patient_id": id_of(&patient), "message": "hi"}))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>()["kind"], "PATIENT_NOT_FOUND");
    let detail = get_patient(&server, &alice, &id_of(&patient)).await;
    assert_eq!(detail["sms_messages"], json!([]));
}
