use axum::http::StatusCode;
use serde_json::Value;

use crate::helpers::{create_patient, demo_server, get_patient, id_of, patient_body, register, send_sms};

// ── POST /messages/{id}/completion, /messages/{id}/failure ──────────────────

#[tokio::test]
async fn should_mark_message_completed() {
    let server = demo_server().await;
    let auth = register(&server).await;
    let patient = create_patient(&server, &auth, patient_body("Noah", "Brown", "+61412000001")).await;
    let (_, sent) = send_sms(&server, &auth, &id_of(&patient)).await;
    let message_id = sent["message_id"].as_str().unwrap();

    let response = server
        .post(&format!("/messages/{message_id}/completion"))
        .add_header(auth.header_name(), auth.header_value())
        .await;

    response.assert_status_ok();
    let message = response.json::<Value>();
    assert_eq!(message["status"], "completed");
    assert!(message["completed_at"].is_string());
    assert_eq!(get_patient(&server, &auth, &id_of(&patient)).await["status"], "completed");
}

#[tokio::test]
async fn should_mark_late_provider_failure() {
    let server = demo_server().await;
    let auth = register(&server).await;
    let patient = create_patient(&server, &auth, patient_body("Noah", "Brown", "+61412000001")).await;
    let (_, sent) = send_sms(&server, &auth, &id_of(&patient)).await;
    let message_id = sent["message_id"].as_str().unwrap();

    let response = server
        .post(&format!("/messages/{message_id}/failure"))
        .add_header(auth.header_name(), auth.header_value())
        .await;

    response.assert_status_ok();
    let message = response.json::<Value>();
    assert_eq!(message["status"], "failed");
    assert_eq!(message["sent_at"], Value::Null);

    let detail = get_patient(&server, &auth, &id_of(&patient)).await;
    assert_eq!(detail["status"], "failed");
    assert_eq!(detail["last_sent_at"], message["failed_at"]);
}

#[tokio::test]
async fn should_not_fail_a_completed_message() {
    let server = demo_server().await;
    let auth = register(&server).await;
    let patient = create_patient(&server, &auth, patient_body("Noah", "Brown", "+61412000001")).await;
    let (_, sent) = send_sms(&server, &auth, &id_of(&patient)).await;
    let message_id = sent["message_id"].as_str().unwrap();
    server
        .post(&format!("/messages/{message_id}/completion"))
        .add_header(auth.header_name(), auth.header_value())
        .await
        .assert_status_ok();

    let response = server
        .post(&format!("/messages/{message_id}/failure"))
        .add_header(auth.header_name(), auth.header_value())
        .await;

    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["status"], "completed");
}

#[tokio::test]
async fn should_hide_other_users_messages() {
    let server = demo_server().await;
    let alice = register(&server).await;
    let bob = register(&server).await;
    let patient = create_patient(&server, &alice, patient_body("Noah", "Brown", "+61412000001")).await;
    let (_, sent) = send_sms(&server, &alice, &id_of(&patient)).await;
    let message_id = sent["message_id"].as_str().unwrap();

    for path in [
        format!("/messages/{message_id}/completion"),
        format!("/messages/{message_id}/failure"),
        "/messages/not-a-uuid/completion".to_owned(),
    ] {
        let response = server
            .post(&path)
            .add_header(bob.header_name(), bob.header_value())
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
        assert_eq!(response.json::<Value>()["kind"], "MESSAGE_NOT_FOUND");
    }
    assert_eq!(get_patient(&server, &alice, &id_of(&patient)).await["status"], "sent");
}
