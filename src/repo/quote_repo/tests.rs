use super::*;
use crate::errors::ApiError;
use crate::models::{QuotedPrice, RequestOptions};
use crate::repo::{
    create_supplier_request, get_supplier_request, list_notifications, list_prices, list_suppliers,
    upsert_exchange_rate,
};
use crate::test_utils::{seed_material, seed_project, setup_test_db};

fn identity(email: &str) -> SupplierIdentity {
    SupplierIdentity {
        name: "Zhang Wei".to_string(),
        email: email.to_string(),
        company: Some("Guangzhou Build Co".to_string()),
        country: "China".to_string(),
        phone: None,
    }
}

fn line(id: &str, name: &str, amount: f64, currency: &str) -> QuotedMaterial {
    QuotedMaterial {
        id: id.to_string(),
        name: name.to_string(),
        category: None,
        quantity: None,
        unavailable: false,
        prices: vec![QuotedPrice {
            amount,
            currency: currency.to_string(),
            country: None,
            unit: None,
            moq: None,
            notes: None,
            variations: vec![],
        }],
    }
}

fn settings() -> BrokerSettings {
    BrokerSettings {
        broker_supplier_name: "Procura Sourcing".to_string(),
        fallback_rate: 95.0,
    }
}

/// A project with two materials and a request snapshotting them
fn request_fixture(pool: &DbPool) -> (Project, SupplierRequest) {
    let project = seed_project(pool, "owner-1", "Villa Dakar");
    seed_material(pool, &project.get_id(), "Ciment", Some(100.0));
    seed_material(pool, &project.get_id(), "Carrelage 60x60", Some(80.0));
    let request = create_supplier_request(pool, &project, "owner-1", RequestOptions::default()).unwrap();
    (project, request)
}

fn snapshot_id(request: &SupplierRequest, name: &str) -> String {
    request
        .get_materials()
        .into_iter()
        .find(|m| m.name == name)
        .map(|m| m.id)
        .unwrap()
}

#[test]
fn test_submit_quote_updates_request_progress() {
    let pool = setup_test_db();
    let (_, request) = request_fixture(&pool);
    let cement = snapshot_id(&request, "Ciment");

    let quote = submit_quote(
        &pool,
        &request,
        identity("zhang@example.cn"),
        vec![line(&cement, "Ciment", 40.0, "CNY")],
    )
    .unwrap();

    assert_eq!(quote.get_status(), "submitted");
    let stored = get_supplier_request(&pool, &request.get_id()).unwrap().unwrap();
    assert_eq!(stored.get_status(), "in_progress");
    assert_eq!(stored.get_filled_materials(), 1);
}

#[test]
fn test_resubmission_replaces_previous_answer() {
    let pool = setup_test_db();
    let (_, request) = request_fixture(&pool);
    let cement = snapshot_id(&request, "Ciment");
    let tiles = snapshot_id(&request, "Carrelage 60x60");

    let first = submit_quote(
        &pool,
        &request,
        identity("zhang@example.cn"),
        vec![line(&cement, "Ciment", 40.0, "CNY")],
    )
    .unwrap();
    let second = submit_quote(
        &pool,
        &request,
        identity("zhang@example.cn"),
        vec![
            line(&cement, "Ciment", 38.0, "CNY"),
            line(&tiles, "Carrelage 60x60", 25.0, "CNY"),
        ],
    )
    .unwrap();

    assert_eq!(first.get_id(), second.get_id());
    assert_eq!(second.get_quoted_materials().len(), 2);
    assert_eq!(list_quotes(&pool, Some(&request.get_id())).unwrap().len(), 1);

    let stored = get_supplier_request(&pool, &request.get_id()).unwrap().unwrap();
    assert_eq!(stored.get_filled_materials(), 2);
}

#[test]
fn test_filled_materials_counts_each_material_once() {
    let pool = setup_test_db();
    let (_, request) = request_fixture(&pool);
    let cement = snapshot_id(&request, "Ciment");

    submit_quote(&pool, &request, identity("a@example.cn"), vec![line(&cement, "Ciment", 40.0, "CNY")]).unwrap();
    submit_quote(&pool, &request, identity("b@example.tr"), vec![line(&cement, "Ciment", 9.0, "EUR")]).unwrap();

    let stored = get_supplier_request(&pool, &request.get_id()).unwrap().unwrap();
    assert_eq!(stored.get_filled_materials(), 1);
    assert_eq!(list_quotes(&pool, None).unwrap().len(), 2);
}

#[test]
fn test_update_quote_margin() {
    let pool = setup_test_db();
    let (_, request) = request_fixture(&pool);
    let quote = submit_quote(&pool, &request, identity("zhang@example.cn"), vec![]).unwrap();

    let updated = update_quote_margin(&pool, &quote.get_id(), 15.0).unwrap().unwrap();
    assert_eq!(updated.get_admin_margin(), Some(15.0));
    assert!(update_quote_margin(&pool, "missing", 15.0).unwrap().is_none());
}

#[test]
fn test_send_quote_to_client() {
    let pool = setup_test_db();
    let (project, request) = request_fixture(&pool);
    upsert_exchange_rate(&pool, "CNY", "FCFA", 85.0).unwrap();
    let cement = snapshot_id(&request, "Ciment");
    let quote = submit_quote(
        &pool,
        &request,
        identity("zhang@example.cn"),
        vec![
            line(&cement, "ciment", 100.0, "CNY"),
            line("unknown", "Peinture", 10.0, "CNY"),
        ],
    )
    .unwrap();

    let summary = send_quote_to_client(&pool, &quote.get_id(), &MarginPolicy::global(10.0), &settings())
        .unwrap()
        .unwrap();

    assert_eq!(summary.prices_inserted, 1);
    assert_eq!(summary.quotations_archived, 1);
    assert_eq!(summary.material_count, 1);
    assert_eq!(summary.unmatched_materials, vec!["Peinture".to_string()]);

    let sent = get_quote(&pool, &quote.get_id()).unwrap().unwrap();
    assert!(sent.is_sent_to_client());
    assert_eq!(sent.get_admin_margin(), Some(10.0));
    assert!(sent.get_sent_to_client_at().is_some());

    // The client price is attributed to the broker, marked up and converted
    let material_id = list_materials_named(&pool, &project, "Ciment");
    let prices = list_prices(&pool, &material_id).unwrap();
    assert_eq!(prices.len(), 1);
    assert!((prices[0].get_amount() - 110.0).abs() < 1e-9);
    assert!((prices[0].get_converted_amount().unwrap() - 9350.0).abs() < 1e-6);
    let broker = list_suppliers(&pool).unwrap();
    assert_eq!(broker.len(), 1);
    assert_eq!(prices[0].get_supplier_id(), Some(broker[0].get_id()));

    let notifications = list_notifications(&pool, "owner-1", false).unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].get_kind(), QUOTE_RECEIVED);
    assert_eq!(Some(notifications[0].get_id()), summary.notification_id);
    assert!(notifications[0].get_message().contains("Villa Dakar"));
}

fn list_materials_named(pool: &DbPool, project: &Project, name: &str) -> String {
    crate::repo::list_materials(pool, &project.get_id())
        .unwrap()
        .into_iter()
        .find(|m| m.get_name() == name)
        .map(|m| m.get_id())
        .unwrap()
}

#[test]
fn test_sending_twice_is_a_conflict() {
    let pool = setup_test_db();
    let (_, request) = request_fixture(&pool);
    let cement = snapshot_id(&request, "Ciment");
    let quote = submit_quote(&pool, &request, identity("zhang@example.cn"), vec![line(&cement, "Ciment", 40.0, "CNY")]).unwrap();

    send_quote_to_client(&pool, &quote.get_id(), &MarginPolicy::default(), &settings()).unwrap();
    let err = send_quote_to_client(&pool, &quote.get_id(), &MarginPolicy::default(), &settings()).unwrap_err();

    assert!(matches!(ApiError::from(err), ApiError::Conflict(_)));
}

#[test]
fn test_sent_quote_is_frozen() {
    let pool = setup_test_db();
    let (_, request) = request_fixture(&pool);
    let quote = submit_quote(&pool, &request, identity("zhang@example.cn"), vec![]).unwrap();
    send_quote_to_client(&pool, &quote.get_id(), &MarginPolicy::default(), &settings()).unwrap();

    let margin_err = update_quote_margin(&pool, &quote.get_id(), 20.0).unwrap_err();
    assert!(matches!(ApiError::from(margin_err), ApiError::Conflict(_)));

    let resubmit_err = submit_quote(&pool, &request, identity("zhang@example.cn"), vec![]).unwrap_err();
    assert!(matches!(ApiError::from(resubmit_err), ApiError::Conflict(_)));
}

#[test]
fn test_send_missing_quote() {
    let pool = setup_test_db();
    assert!(
        send_quote_to_client(&pool, "missing", &MarginPolicy::default(), &settings())
            .unwrap()
            .is_none()
    );
}
