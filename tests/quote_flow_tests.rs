/// End-to-end tests of the quotation workflow
///
/// A client builds a project, sends it out for quotation, a supplier answers
/// through the public link and an administrator forwards the answer with a
/// margin. Each step goes through the HTTP API.

mod common;

use axum::http::StatusCode;
use common::{call, create_material, create_project, create_test_app, set_rate};
use serde_json::{json, Value};

fn snapshot_id(view: &Value, name: &str) -> String {
    view["materials"]
        .as_array()
        .unwrap()
        .iter()
        .find(|m| m["name"] == name)
        .map(|m| m["id"].as_str().unwrap().to_string())
        .unwrap()
}

#[tokio::test]
async fn test_request_quote_and_forward_to_client() {
    let app = create_test_app();
    set_rate(&app, "CNY", "FCFA", 85.0).await;

    let project_id = create_project(&app, "owner-1", "Villa Almadies").await;
    let cement_id = create_material(&app, &project_id, "Ciment CPJ 42.5", 200.0, "sac").await;
    create_material(&app, &project_id, "Carrelage 60x60", 120.0, "m2").await;

    // Send the project out
    let (status, request) = call(
        &app,
        "POST",
        &format!("/projects/{}/supplier-requests", project_id),
        Some(json!({ "owner_id": "owner-1", "num_suppliers": 2, "expires_in_days": 14 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(request["total_materials"], 2);
    assert_eq!(request["filled_materials"], 0);
    let request_id = request["id"].as_str().unwrap().to_string();
    let token = request["public_token"].as_str().unwrap().to_string();
    assert!(request["request_number"].as_str().unwrap().starts_with("REQ-"));

    // The supplier opens the link
    let (status, view) = call(&app, "GET", &format!("/public/requests/{}", token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["total_materials"], 2);

    // The supplier answers for the cement only
    let answer = json!({
        "supplier": {
            "name": "Li Na",
            "email": "sales@foshan-build.cn",
            "company": "Foshan Build Co",
            "country": "China"
        },
        "quoted_materials": [
            {
                "id": snapshot_id(&view, "Ciment CPJ 42.5"),
                "name": "Ciment CPJ 42.5",
                "prices": [{ "amount": 100.0, "currency": "CNY", "moq": 500 }]
            },
            {
                "id": snapshot_id(&view, "Carrelage 60x60"),
                "name": "Carrelage 60x60",
                "unavailable": true
            }
        ]
    });
    let (status, quote) = call(&app, "POST", &format!("/public/requests/{}/quotes", token), Some(answer)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(quote["status"], "submitted");
    let quote_id = quote["id"].as_str().unwrap().to_string();

    let (_, request) = call(&app, "GET", &format!("/supplier-requests/{}", request_id), None).await;
    assert_eq!(request["status"], "in_progress");
    assert_eq!(request["filled_materials"], 1);

    let (_, quotes) = call(&app, "GET", &format!("/quotes?request_id={}", request_id), None).await;
    assert_eq!(quotes.as_array().unwrap().len(), 1);

    // The administrator forwards it with a 25% margin
    let (status, summary) = call(
        &app,
        "POST",
        &format!("/quotes/{}/send", quote_id),
        Some(json!({ "global_margin": 25.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["prices_inserted"], 1);
    assert_eq!(summary["quotations_archived"], 1);
    assert_eq!(summary["material_count"], 1);

    // The client sees the marked-up price, not who offered it
    let (_, prices) = call(&app, "GET", &format!("/materials/{}/prices", cement_id), None).await;
    let prices = prices.as_array().unwrap();
    assert_eq!(prices.len(), 1);
    assert_eq!(prices[0]["amount"], 125.0);
    assert_eq!(prices[0]["currency"], "CNY");
    assert_eq!(prices[0]["converted_amount"], 10625.0);
    assert!(prices[0]["supplier_reference"].as_str().unwrap().starts_with("REF-"));

    // The raw price is archived for comparison
    let (_, page) = call(&app, "GET", "/quotations?material=ciment", None).await;
    assert_eq!(page["total"], 1);
    assert_eq!(page["data"][0]["unit_price"], 100.0);
    assert_eq!(page["data"][0]["converted_price_fcfa"], 8500.0);
    assert_eq!(page["data"][0]["source_quote_id"], quote_id.as_str());

    // The owner is told
    let (_, notifications) = call(&app, "GET", "/notifications?user_id=owner-1", None).await;
    let notifications = notifications.as_array().unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0]["link"], format!("/projects/{}", project_id));

    // A forwarded quote cannot be sent again
    let (status, _) = call(
        &app,
        "POST",
        &format!("/quotes/{}/send", quote_id),
        Some(json!({ "global_margin": 10.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_cancelled_request_stops_accepting_quotes() {
    let app = create_test_app();
    let project_id = create_project(&app, "owner-1", "Entrepôt Thiès").await;
    create_material(&app, &project_id, "Tôle bac acier", 300.0, "m2").await;

    let (_, request) = call(
        &app,
        "POST",
        &format!("/projects/{}/supplier-requests", project_id),
        Some(json!({ "owner_id": "owner-1" })),
    )
    .await;
    let request_id = request["id"].as_str().unwrap();
    let token = request["public_token"].as_str().unwrap();

    let (status, request) = call(
        &app,
        "PATCH",
        &format!("/supplier-requests/{}/status", request_id),
        Some(json!({ "status": "cancelled" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(request["status"], "cancelled");

    let (status, body) = call(&app, "GET", &format!("/public/requests/{}", token), None).await;
    assert_eq!(status, StatusCode::GONE);
    assert!(body["error"].as_str().unwrap().contains("cancelled"));
}

#[tokio::test]
async fn test_quote_answer_is_validated() {
    let app = create_test_app();
    let project_id = create_project(&app, "owner-1", "Immeuble Plateau").await;
    create_material(&app, &project_id, "Fer à béton HA12", 5.0, "t").await;

    let (_, request) = call(
        &app,
        "POST",
        &format!("/projects/{}/supplier-requests", project_id),
        Some(json!({ "owner_id": "owner-1" })),
    )
    .await;
    let token = request["public_token"].as_str().unwrap();

    let (status, body) = call(
        &app,
        "POST",
        &format!("/public/requests/{}/quotes", token),
        Some(json!({
            "supplier": { "name": "Mehmet", "email": "not-an-email", "country": "Turkey" },
            "quoted_materials": [{ "id": "x", "name": "Fer à béton HA12", "prices": [] }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "A valid supplier email is required");

    let (status, _) = call(
        &app,
        "POST",
        &format!("/public/requests/{}/quotes", token),
        Some(json!({
            "supplier": { "name": "Mehmet", "email": "mehmet@izmir-steel.tr", "country": "Turkey" },
            "quoted_materials": []
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_project_comparison_by_country() {
    let app = create_test_app();
    let project_id = create_project(&app, "owner-1", "Villa Saly").await;
    let tiles_id = create_material(&app, &project_id, "Carrelage 60x60", 100.0, "m2").await;

    for (amount, currency, country, converted) in [
        (8000.0, "FCFA", "Senegal", 8000.0),
        (60.0, "CNY", "China", 5100.0),
    ] {
        let (status, _) = call(
            &app,
            "POST",
            &format!("/materials/{}/prices", tiles_id),
            Some(json!({
                "amount": amount,
                "currency": currency,
                "country": country,
                "converted_amount": converted
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, prices) = call(&app, "GET", &format!("/projects/{}/prices", project_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(prices.as_array().unwrap().len(), 2);

    let (status, comparison) = call(
        &app,
        "GET",
        &format!("/projects/{}/comparison?baseline=Senegal&candidate=China", project_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(comparison["totals_by_country"]["Senegal"], 800000.0);
    assert_eq!(comparison["totals_by_country"]["China"], 510000.0);
    assert_eq!(comparison["savings"]["savings"], 290000.0);
}
