//! API integration tests
//!
//! Require a running server and database. Tokens are signed locally with
//! `JWT_SECRET` (defaults to the development secret).

use chrono::{Duration, Utc};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

use excavator_rental_server::models::StaffClaims;

const BASE_URL: &str = "http://localhost:8080/api/v1";

/// Sign a short-lived staff token
fn auth_token() -> String {
    let secret = std::env::var("JWT_SECRET")
        .unwrap_or_else(|_| "change-this-secret-in-production".to_string());
    let now = Utc::now();
    StaffClaims {
        sub: "integration-tests".to_string(),
        email: None,
        exp: (now + Duration::minutes(10)).timestamp(),
        iat: now.timestamp(),
    }
    .create_token(&secret)
    .expect("Failed to sign token")
}

fn day(offset: i64) -> String {
    (Utc::now().date_naive() + Duration::days(offset)).to_string()
}

async fn create_excavator(client: &Client, token: &str, name: &str) -> Value {
    let response = client
        .post(format!("{}/equipment", BASE_URL))
        .bearer_auth(token)
        .json(&json!({
            "name": name,
            "brand": "Komatsu",
            "equipment_type": "standard",
            "operator_name": "Agus",
            "regular_rate_per_hour": 100000,
            "overtime_rate_per_hour": 150000,
            "stock": 1
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::CREATED);
    response.json().await.expect("Failed to parse response")
}

fn rental_draft(equipment_id: &str, start: i64, end: i64) -> Value {
    json!({
        "renter_name": "PT Maju Jaya",
        "renter_phone": "+62 812 3456 7890",
        "renter_email": "",
        "start_date": day(start),
        "end_date": day(end),
        "lines": [{ "equipment_id": equipment_id, "regular_hours": 8, "overtime_hours": 2 }]
    })
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_requests_without_token_are_rejected() {
    let client = Client::new();

    let response = client
        .get(format!("{}/equipment", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore]
async fn test_rental_lifecycle() {
    let client = Client::new();
    let token = auth_token();
    let unit = create_excavator(&client, &token, "PC200-IT").await;
    let unit_id = unit["id"].as_str().expect("No id").to_string();

    // Create: two days at 8h + 2h overtime
    let response = client
        .post(format!("{}/rentals", BASE_URL))
        .bearer_auth(&token)
        .json(&rental_draft(&unit_id, 30, 31))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);
    let created: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(created["rental"]["total_amount"], 2_200_000);
    assert_eq!(created["rental"]["renter_phone"], "081234567890");
    assert_eq!(created["invoice"]["is_paid"], false);
    let rental_id = created["rental"]["id"].as_str().expect("No id").to_string();

    // The unit is now taken for a touching period
    let response = client
        .get(format!(
            "{}/rentals/availability?start_date={}&end_date={}",
            BASE_URL,
            day(31),
            day(33)
        ))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    let availability: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(availability["available"][&unit_id], false);

    // ...but not when checked on behalf of the rental itself
    let response = client
        .get(format!(
            "{}/rentals/availability?start_date={}&end_date={}&exclude_rental_id={}",
            BASE_URL,
            day(31),
            day(33),
            rental_id
        ))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    let availability: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(availability["available"][&unit_id], true);

    // A second rental on the same unit is blocked
    let response = client
        .post(format!("{}/rentals", BASE_URL))
        .bearer_auth(&token)
        .json(&rental_draft(&unit_id, 31, 32))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Extending its own dates re-prices the invoice
    let response = client
        .put(format!("{}/rentals/{}", BASE_URL, rental_id))
        .bearer_auth(&token)
        .json(&json!({ "end_date": day(32) }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let updated: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(updated["rental"]["duration_days"], 3);
    assert_eq!(updated["invoice"]["total_amount"], 3_300_000);

    // Deleting the rental removes its invoice
    let response = client
        .delete(format!("{}/rentals/{}", BASE_URL, rental_id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = client
        .get(format!("{}/rentals/{}/invoice", BASE_URL, rental_id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore]
async fn test_duplicate_equipment_is_rejected() {
    let client = Client::new();
    let token = auth_token();
    let unit = create_excavator(&client, &token, "PC75-IT").await;
    let unit_id = unit["id"].as_str().expect("No id");

    let mut draft = rental_draft(unit_id, 40, 41);
    draft["lines"] = json!([
        { "equipment_id": unit_id },
        { "equipment_id": unit_id }
    ]);

    let response = client
        .post(format!("{}/rentals", BASE_URL))
        .bearer_auth(&token)
        .json(&draft)
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "DuplicateEquipment");
}

#[tokio::test]
#[ignore]
async fn test_timesheet_pay_preview() {
    let client = Client::new();
    let token = auth_token();
    let unit = create_excavator(&client, &token, "ZX200-IT").await;

    let response = client
        .post(format!("{}/timesheets/pay-preview", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({
            "equipment_id": unit["id"],
            "start_time": "08:00",
            "end_time": "18:00"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let pay: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(pay["work_hours"], 8.0);
    assert_eq!(pay["overtime_hours"], 2.0);
    assert_eq!(pay["total_pay"], 1_100_000);
}
