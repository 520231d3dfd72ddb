use super::*;
use serde_json::json;

#[test]
fn test_page_query_defaults() {
    let query = PageQuery::default();
    assert_eq!(query.page(), 1);
    assert_eq!(query.limit(), DEFAULT_PAGE_SIZE);
    assert_eq!(query.offset(), 0);
}

#[test]
fn test_page_query_clamps() {
    let query = PageQuery {
        page: Some(0),
        limit: Some(500),
    };
    assert_eq!(query.page(), 1);
    assert_eq!(query.limit(), MAX_PAGE_SIZE);

    let query = PageQuery {
        page: Some(3),
        limit: Some(10),
    };
    assert_eq!(query.offset(), 20);
}

#[test]
fn test_page_query_offset_saturates_on_huge_pages() {
    let query = PageQuery {
        page: Some(i64::MAX),
        limit: Some(100),
    };
    assert_eq!(query.page(), i64::MAX);
    assert_eq!(query.offset(), i64::MAX);
}

#[test]
fn test_paginated_total_pages() {
    let query = PageQuery {
        page: Some(2),
        limit: Some(10),
    };
    let page = Paginated::new(vec![1, 2, 3], 23, &query);
    assert_eq!(page.total_pages, 3);
    assert_eq!(page.page, 2);

    let empty: Paginated<i32> = Paginated::new(vec![], 0, &query);
    assert_eq!(empty.total_pages, 0);
}

#[test]
fn test_project_list_query_from_query_string() {
    let query: ProjectListQuery = parse_query("owner_id=owner-1&page=2&limit=5");
    assert_eq!(query.owner_id, "owner-1");
    assert_eq!(query.page_query().offset(), 5);
}

/// Parses a query string the same way the router does
fn parse_query<T: serde::de::DeserializeOwned>(query: &str) -> T {
    let uri: axum::http::Uri = format!("http://localhost/?{}", query).parse().unwrap();
    axum::extract::Query::<T>::try_from_uri(&uri).unwrap().0
}

#[test]
fn test_supplier_request_options_defaults() {
    let dto: CreateSupplierRequestDto = serde_json::from_value(json!({"owner_id": "owner-1"})).unwrap();
    let options = dto.options();

    assert_eq!(options.num_suppliers, 3);
    assert_eq!(options.country, "China");
    assert_eq!(options.shipping_type, "sea");
    assert!(options.expires_in_days.is_none());
}

#[test]
fn test_supplier_request_options_override() {
    let dto: CreateSupplierRequestDto = serde_json::from_value(json!({
        "owner_id": "owner-1",
        "num_suppliers": 5,
        "country": "Turkey",
        "shipping_type": "air",
        "expires_in_days": 14
    }))
    .unwrap();
    let options = dto.options();

    assert_eq!(options.num_suppliers, 5);
    assert_eq!(options.country, "Turkey");
    assert_eq!(options.shipping_type, "air");
    assert_eq!(options.expires_in_days, Some(14));
}

#[test]
fn test_send_quote_dto_flattens_policy() {
    let dto: SendQuoteDto = serde_json::from_value(json!({
        "global_margin": 15.0,
        "individual_margins": {"m1": 10.0, "m2": 30.0},
        "apply_global_to_all": true
    }))
    .unwrap();

    let policy = dto.into_policy();
    assert_eq!(policy.margin_for("m1"), 15.0);
    assert_eq!(policy.margin_for("m2"), 15.0);
}

#[test]
fn test_send_quote_dto_keeps_individual_margins() {
    let dto: SendQuoteDto = serde_json::from_value(json!({
        "global_margin": 15.0,
        "individual_margins": {"m1": 10.0}
    }))
    .unwrap();

    let policy = dto.into_policy();
    assert_eq!(policy.margin_for("m1"), 10.0);
    assert_eq!(policy.margin_for("other"), 0.0);
}

#[test]
fn test_quotation_list_query_defaults() {
    let query = QuotationListQuery::default();
    assert_eq!(query.limit(), DEFAULT_QUOTATION_LIMIT);
    assert_eq!(query.offset(), 0);
    assert_eq!(query.sort_by, QuotationSort::CreatedAt);
    assert_eq!(query.sort_order, SortOrder::Desc);
}

#[test]
fn test_quotation_list_query_from_query_string() {
    let query: QuotationListQuery = parse_query("material=ciment&sort_by=unit_price&sort_order=asc&limit=5000");
    assert_eq!(query.material.as_deref(), Some("ciment"));
    assert_eq!(query.sort_by, QuotationSort::UnitPrice);
    assert_eq!(query.sort_order, SortOrder::Asc);
    assert_eq!(query.limit(), 1000);
}

#[test]
fn test_quotation_list_query_status_filter() {
    let query: QuotationListQuery = parse_query("");
    assert_eq!(query.status, QuotationStatusFilter::Active);
    assert_eq!(query.status.status(), Some(QuotationStatus::Active));

    let query: QuotationListQuery = parse_query("status=all");
    assert_eq!(query.status, QuotationStatusFilter::All);
    assert_eq!(query.status.status(), None);

    let query: QuotationListQuery = parse_query("status=archived");
    assert_eq!(query.status.status(), Some(QuotationStatus::Archived));
}

#[test]
fn test_quotation_list_query_display() {
    let display = format!("{}", QuotationListQuery::default());
    assert!(display.contains("material: None"));
    assert!(display.contains("limit: 100"));
}

#[test]
fn test_analyze_file_dto_sample_rows() {
    let dto: AnalyzeFileDto = serde_json::from_value(json!({
        "fileSample": [["Designation", "Qty"], ["Ciment", 10]],
        "fileName": "devis.xlsx"
    }))
    .unwrap();
    assert_eq!(dto.sample_rows().map(|rows| rows.len()), Some(2));

    let empty: AnalyzeFileDto = serde_json::from_value(json!({"fileSample": []})).unwrap();
    assert!(empty.sample_rows().is_none());

    let missing: AnalyzeFileDto = serde_json::from_value(json!({})).unwrap();
    assert!(missing.sample_rows().is_none());

    let not_array: AnalyzeFileDto = serde_json::from_value(json!({"fileSample": "x"})).unwrap();
    assert!(not_array.sample_rows().is_none());
}

#[test]
fn test_invite_dto_rejects_unknown_role() {
    let result: Result<InviteCollaboratorDto, _> = serde_json::from_value(json!({
        "email": "a@b.c",
        "role": "owner",
        "invited_by": "owner-1"
    }));
    assert!(result.is_err());
}
