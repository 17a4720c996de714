use axum::http::StatusCode;
use chrono::{Duration, Utc};
use serde_json::{Value, json};

use crate::helpers::{
    create_patient, demo_server, get_patient, id_of, list_all, patient_body, register,
};

fn names(page: &Value) -> Vec<String> {
    page["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| format!("{} {}", p["first_name"].as_str().unwrap(), p["last_name"].as_str().unwrap()))
        .collect()
}

// ── POST /patients ───────────────────────────────────────────────────────────

#[tokio::test]
async fn should_create_pending_patient() {
    let server = demo_server().await;
    let auth = register(&server).await;

    let created = create_patient(
        &server,
        &auth,
        json!({
            "first_name": "Ana",
            "last_name": "Gómez",
            "phone": "+573001234567",
            "email": "ana@example.com",
            "appointment_at": "2026-03-04T14:30:00Z",
        }),
    )
    .await;

    assert_eq!(created["status"], "pending");
    assert_eq!(created["status_label"], "Pending");
    assert_eq!(created["email"], "ana@example.com");
    assert_eq!(created["appointment_at"], "2026-03-04T14:30:00.000Z");
    assert_eq!(created["appointment_date"], "2026-03-04");
    assert_eq!(created["appointment_time"], "14:30");
    assert_eq!(created["last_sent_at"], Value::Null);
    assert_eq!(created["sms_messages"], json!([]));
}

#[tokio::test]
async fn should_reject_malformed_phone_numbers() {
    let server = demo_server().await;
    let auth = register(&server).await;

    for phone in ["0412345678", "+123", "+614xxxxxxxx"] {
        let response = server
            .post("/patients")
            .add_header(auth.header_name(), auth.header_value())
            .json(&patient_body("Ana", "Gómez", phone))
            .await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        let body = response.json::<Value>();
        assert_eq!(body["kind"], "VALIDATION");
        assert!(body["errors"]["phone"].is_array(), "{phone}: {body}");
    }

    for phone in ["+61412345678", "+15551234567"] {
        create_patient(&server, &auth, patient_body("Ana", "Gómez", phone)).await;
    }
}

#[tokio::test]
async fn should_report_every_invalid_field() {
    let server = demo_server().await;
    let auth = register(&server).await;

    let response = server
        .post("/patients")
        .add_header(auth.header_name(), auth.header_value())
        .json(&json!({"first_name": "  ", "email": "not-an-email"}))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let errors = &response.json::<Value>()["errors"];
    for field in ["first_name", "last_name", "phone", "email"] {
        assert!(errors[field].is_array(), "missing {field}: {errors}");
    }
}

#[tokio::test]
async fn should_reject_mistyped_patient_body_with_json_errors() {
    let server = demo_server().await;
    let auth = register(&server).await;
    let mut body = patient_body("Ana", "Gómez", "+61412345678");
    body["last_name"] = json!(5);

    let response = server
        .post("/patients")
        .add_header(auth.header_name(), auth.header_value())
        .json(&body)
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let error = response.json::<Value>();
    assert_eq!(error["kind"], "VALIDATION");
    assert!(error["errors"]["body"][0].is_string(), "{error}");
}

#[tokio::test]
async fn should_reject_patient_for_unregistered_user() {
    let server = demo_server().await;
    let stranger = clinic_testing::auth::MockAuth::random();

    let response = server
        .post("/patients")
        .add_header(stranger.header_name(), stranger.header_value())
        .json(&patient_body("Ana", "Gómez", "+61412345678"))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>()["kind"], "USER_NOT_FOUND");
}

// ── GET /patients/{id} ───────────────────────────────────────────────────────

#[tokio::test]
async fn should_return_not_found_for_unknown_patient() {
    let server = demo_server().await;
    let auth = register(&server).await;

    for id in ["0190f5a4-0000-7000-8000-000000000000", "not-a-uuid"] {
        let response = server
            .get(&format!("/patients/{id}"))
            .add_header(auth.header_name(), auth.header_value())
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
        assert_eq!(response.json::<Value>()["kind"], "PATIENT_NOT_FOUND");
    }
}

// ── GET /patients ────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_default_to_todays_appointments() {
    let server = demo_server().await;
    let auth = register(&server).await;
    let mut today = patient_body("Today", "Patient", "+61412345678");
    today["appointment_at"] = json!(Utc::now().to_rfc3339());
    let mut next_week = patient_body("Later", "Patient", "+61412345679");
    next_week["appointment_at"] = json!((Utc::now() + Duration::days(7)).to_rfc3339());
    create_patient(&server, &auth, today).await;
    create_patient(&server, &auth, next_week).await;
    create_patient(&server, &auth, patient_body("No", "Appointment", "+61412345670")).await;

    let response = server
        .get("/patients")
        .add_header(auth.header_name(), auth.header_value())
        .await;

    response.assert_status_ok();
    let page = response.json::<Value>();
    assert_eq!(names(&page), vec!["Today Patient"]);
    assert_eq!(list_all(&server, &auth, &[]).await["total"], 3);
}

#[tokio::test]
async fn should_read_today_only_flag_case_insensitively() {
    let server = demo_server().await;
    let auth = register(&server).await;
    let mut today = patient_body("Today", "Patient", "+61412345678");
    today["appointment_at"] = json!(Utc::now().to_rfc3339());
    create_patient(&server, &auth, today).await;
    create_patient(&server, &auth, patient_body("No", "Appointment", "+61412345670")).await;

    for (flag, total) in [("TRUE", 1), ("Yes", 1), ("False", 2), ("NO", 2), ("0", 2)] {
        let page = server
            .get("/patients")
            .add_header(auth.header_name(), auth.header_value())
            .add_query_param("today_only", flag)
            .await
            .json::<Value>();
        assert_eq!(page["total"], total, "today_only={flag}");
    }

    let response = server
        .get("/patients")
        .add_header(auth.header_name(), auth.header_value())
        .add_query_param("today_only", "maybe")
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.json::<Value>()["errors"]["today_only"].is_array());
}

#[tokio::test]
async fn should_paginate_ten_patients_per_page() {
    let server = demo_server().await;
    let auth = register(&server).await;
    for i in 0..12 {
        create_patient(
            &server,
            &auth,
            patient_body("Patient", &format!("Number{i:02}"), &format!("+6141200{i:04}")),
        )
        .await;
    }

    let first = list_all(&server, &auth, &[]).await;
    assert_eq!(first["data"].as_array().unwrap().len(), 10);
    assert_eq!(first["current_page"], 1);
    assert_eq!(first["last_page"], 2);
    assert_eq!(first["per_page"], 10);
    assert_eq!(first["total"], 12);

    let second = list_all(&server, &auth, &[("page", "2")]).await;
    assert_eq!(second["data"].as_array().unwrap().len(), 2);
    assert_eq!(second["current_page"], 2);

    let clamped = list_all(&server, &auth, &[("page", "0")]).await;
    assert_eq!(clamped["current_page"], 1);
}

#[tokio::test]
async fn should_report_one_page_when_empty() {
    let server = demo_server().await;
    let auth = register(&server).await;

    let page = list_all(&server, &auth, &[]).await;

    assert_eq!(page["data"], json!([]));
    assert_eq!(page["last_page"], 1);
    assert_eq!(page["total"], 0);
}

#[tokio::test]
async fn should_sort_by_last_then_first_name() {
    let server = demo_server().await;
    let auth = register(&server).await;
    create_patient(&server, &auth, patient_body("Zoe", "Baker", "+61412000001")).await;
    create_patient(&server, &auth, patient_body("Adam", "Carter", "+61412000002")).await;
    create_patient(&server, &auth, patient_body("Amy", "Baker", "+61412000003")).await;

    let asc = list_all(&server, &auth, &[("sortBy", "name")]).await;
    assert_eq!(names(&asc), vec!["Amy Baker", "Zoe Baker", "Adam Carter"]);

    let desc = list_all(&server, &auth, &[("sortBy", "name"), ("sortDir", "desc")]).await;
    assert_eq!(names(&desc), vec!["Adam Carter", "Zoe Baker", "Amy Baker"]);
}

#[tokio::test]
async fn should_reject_unknown_sort_and_status() {
    let server = demo_server().await;
    let auth = register(&server).await;

    for (key, value, field) in [("sortBy", "age", "sortBy"), ("status", "lost", "status")] {
        let response = server
            .get("/patients")
            .add_header(auth.header_name(), auth.header_value())
            .add_query_param(key, value)
            .await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        assert!(response.json::<Value>()["errors"][field].is_array());
    }
}

#[tokio::test]
async fn should_search_names_case_insensitively_and_phones_by_tail() {
    let server = demo_server().await;
    let auth = register(&server).await;
    create_patient(&server, &auth, patient_body("Olivia", "Smith", "+61412345678")).await;
    create_patient(&server, &auth, patient_body("Liam", "Jones", "+573001112233")).await;

    let by_name = list_all(&server, &auth, &[("search", "oLiV")]).await;
    assert_eq!(names(&by_name), vec!["Olivia Smith"]);

    let by_last_name = list_all(&server, &auth, &[("search", "JON")]).await;
    assert_eq!(names(&by_last_name), vec!["Liam Jones"]);

    let by_phone = list_all(&server, &auth, &[("search", "0412 345 678")]).await;
    assert_eq!(names(&by_phone), vec!["Olivia Smith"]);

    let nothing = list_all(&server, &auth, &[("search", "Nobody")]).await;
    assert_eq!(nothing["total"], 0);

    for wildcard in ["_", "%", "Ol_via"] {
        let page = list_all(&server, &auth, &[("search", wildcard)]).await;
        assert_eq!(page["total"], 0, "search {wildcard:?}");
    }
}

#[tokio::test]
async fn should_filter_by_cached_status() {
    let server = demo_server().await;
    let auth = register(&server).await;
    let contacted = create_patient(&server, &auth, patient_body("Sent", "Patient", "+61412000001")).await;
    create_patient(&server, &auth, patient_body("Waiting", "Patient", "+61412000002")).await;
    crate::helpers::send_sms(&server, &auth, &id_of(&contacted)).await;

    let sent = list_all(&server, &auth, &[("status", "sent")]).await;
    assert_eq!(names(&sent), vec!["Sent Patient"]);

    let pending = list_all(&server, &auth, &[("status", "pending")]).await;
    assert_eq!(names(&pending), vec!["Waiting Patient"]);

    let all = list_all(&server, &auth, &[("status", "all")]).await;
    assert_eq!(all["total"], 2);
}

#[tokio::test]
async fn should_only_list_contacted_patients_when_sorting_by_last_sent() {
    let server = demo_server().await;
    let auth = register(&server).await;
    let first = create_patient(&server, &auth, patient_body("First", "Contact", "+61412000001")).await;
    let second = create_patient(&server, &auth, patient_body("Second", "Contact", "+61412000002")).await;
    create_patient(&server, &auth, patient_body("Never", "Contacted", "+61412000003")).await;
    crate::helpers::send_sms(&server, &auth, &id_of(&first)).await;
    crate::helpers::send_sms(&server, &auth, &id_of(&second)).await;

    let page = list_all(&server, &auth, &[("sortBy", "last_sent"), ("sortDir", "desc")]).await;

    assert_eq!(names(&page), vec!["Second Contact", "First Contact"]);
    assert_eq!(page["total"], 2);
}

#[tokio::test]
async fn should_never_leak_patients_across_users() {
    let server = demo_server().await;
    let alice = register(&server).await;
    let bob = register(&server).await;
    let mut alices = patient_body("Shared", "Name", "+61412345678");
    alices["appointment_at"] = json!(Utc::now().to_rfc3339());
    let alice_patient = create_patient(&server, &alice, alices.clone()).await;
    let bob_patient = create_patient(&server, &bob, alices).await;
    crate::helpers::send_sms(&server, &alice, &id_of(&alice_patient)).await;

    let queries: [&[(&str, &str)]; 5] = [
        &[],
        &[("search", "shared")],
        &[("search", "0412345678")],
        &[("status", "sent")],
        &[("sortBy", "last_sent")],
    ];
    for query in queries {
        let page = list_all(&server, &bob, query).await;
        for row in page["data"].as_array().unwrap() {
            assert_eq!(row["id"], bob_patient["id"], "query {query:?} leaked {row}");
        }
    }
    let todays = server
        .get("/patients")
        .add_header(bob.header_name(), bob.header_value())
        .await
        .json::<Value>();
    assert_eq!(todays["total"], 1);
    assert_eq!(todays["data"][0]["id"], bob_patient["id"]);

    let response = server
        .get(&format!("/patients/{}", id_of(&alice_patient)))
        .add_header(bob.header_name(), bob.header_value())
        .await;
    response.assert_status(StatusCode::NOT_FOUND);

    let own = get_patient(&server, &alice, &id_of(&alice_patient)).await;
    assert_eq!(own["status"], "sent");
}
