use axum::http::StatusCode;
use chrono::{Duration, Utc};
use serde_json::{Value, json};

use crate::helpers::{create_patient, demo_server, id_of, patient_body, register, send_sms};

// ── GET /dashboard/stats ─────────────────────────────────────────────────────

#[tokio::test]
async fn should_summarize_callers_patients() {
    let server = demo_server().await;
    let auth = register(&server).await;
    let other = register(&server).await;

    let mut today = patient_body("Today", "One", "+61412000001");
    today["appointment_at"] = json!(Utc::now().to_rfc3339());
    let contacted = create_patient(&server, &auth, today.clone()).await;
    today["first_name"] = json!("Today Two");
    today["phone"] = json!("+61412000002");
    create_patient(&server, &auth, today.clone()).await;
    let mut tomorrow = patient_body("Tomorrow", "Three", "+61412000003");
    tomorrow["appointment_at"] = json!((Utc::now() + Duration::days(2)).to_rfc3339());
    let later = create_patient(&server, &auth, tomorrow).await;
    create_patient(&server, &other, today).await;

    send_sms(&server, &auth, &id_of(&contacted)).await;
    send_sms(&server, &auth, &id_of(&later)).await;

    let response = server
        .get("/dashboard/stats")
        .add_header(auth.header_name(), auth.header_value())
        .await;

    response.assert_status_ok();
    response.assert_json(&json!({
        "total_patients": 3,
        "todays_appointments": 2,
        "forms_sent_today": 2,
        "pending_forms": 2,
    }));
}

#[tokio::test]
async fn should_not_count_completed_forms_as_pending() {
    let server = demo_server().await;
    let auth = register(&server).await;
    let mut body = patient_body("Today", "One", "+61412000001");
    body["appointment_at"] = json!(Utc::now().to_rfc3339());
    let patient = create_patient(&server, &auth, body).await;
    let (_, sent) = send_sms(&server, &auth, &id_of(&patient)).await;
    server
        .post(&format!("/messages/{}/completion", sent["message_id"].as_str().unwrap()))
        .add_header(auth.header_name(), auth.header_value())
        .await
        .assert_status(StatusCode::OK);

    let stats = server
        .get("/dashboard/stats")
        .add_header(auth.header_name(), auth.header_value())
        .await
        .json::<Value>();

    assert_eq!(stats["todays_appointments"], 1);
    assert_eq!(stats["pending_forms"], 0);
    assert_eq!(stats["forms_sent_today"], 1);
}
