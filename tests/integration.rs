//! Integration tests for the billing engine HTTP API.
//!
//! This test suite drives the router end to end over one shared ledger:
//! - Employee and job cost summaries
//! - Manager hierarchy with GST and DSP overlays
//! - Rental summaries
//! - Per-job activity dates and invoice statistics
//! - Invoice range and invoiced-date transitions
//! - Error cases

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use rust_decimal::Decimal;
use serde_json::{Value, json};
use std::str::FromStr;
use tower::ServiceExt;

use billing_engine::api::{AppState, create_router};
use billing_engine::config::ConfigLoader;

// =============================================================================
// Test Helpers
// =============================================================================

fn create_test_state() -> AppState {
    let config = ConfigLoader::load("./config/default").expect("Failed to load config");
    AppState::new(config)
}

fn create_router_for_test() -> Router {
    create_router(create_test_state())
}

fn decimal(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn decimal_at(value: &Value) -> Decimal {
    let text = value
        .as_str()
        .unwrap_or_else(|| panic!("Expected a decimal string, got {}", value));
    Decimal::from_str(text).unwrap()
}

async fn post_json(router: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

fn time_entry(
    id: &str,
    employee_id: &str,
    job_id: &str,
    hour_type_id: &str,
    date: &str,
    hours: &str,
    loa_count: u32,
    wages: (&str, &str),
) -> Value {
    json!({
        "id": id,
        "employee_id": employee_id,
        "job_id": job_id,
        "hour_type_id": hour_type_id,
        "province_id": "ab",
        "date": date,
        "hours": hours,
        "loa_count": loa_count,
        "cost_wage_used": wages.0,
        "billable_wage_used": wages.1
    })
}

/// A ledger exercising every rule.
///
/// | entry | employee | job     | type        | cost | billable |
/// |-------|----------|---------|-------------|------|----------|
/// | te_1  | Avery    | J-1001  | 8h Regular  | 320  | 480      |
/// | te_2  | Blair    | J-1001  | 2h NS OT    | 69   | 69       |
/// | te_3  | Casey    | J-1001  | LOA only    | 200  | 200      |
/// | te_4  | Casey    | J-2002  | 4h OT       | 150  | 0        |
/// | te_5  | Drew     | J-1001  | 8h + LOA    | 600  | 760      |
/// | te_6  | Avery    | missing | -           | -    | -        |
fn create_ledger() -> Value {
    json!({
        "employees": [
            { "id": "boss", "name": "Avery", "title": "Superintendent",
              "billable_wage": "60", "cost_wage": "40", "category": "employee" },
            { "id": "dsp1", "name": "Blair", "title": "Operator",
              "billable_wage": "20", "cost_wage": "20", "manager_id": "boss", "category": "dsp" },
            { "id": "hand", "name": "Casey", "title": "Labourer",
              "billable_wage": "35", "cost_wage": "25", "manager_id": "dsp1" },
            { "id": "sub", "name": "Drew", "title": "Welder",
              "billable_wage": "70", "cost_wage": "50", "category": "contractor" }
        ],
        "jobs": [
            { "id": "job_001", "job_number": "J-1001", "name": "Pipeline Tie-In",
              "invoiced_dates": ["2024-01-02"] },
            { "id": "job_002", "job_number": "J-2002", "name": "Yard Cleanup",
              "is_billable": false }
        ],
        "hour_types": [
            { "id": "ht_reg", "name": "Regular", "multiplier": "1.0" },
            { "id": "ht_ot", "name": "Overtime", "multiplier": "1.5" },
            { "id": "ht_ns_ot", "name": "NS Overtime", "multiplier": "1.5" }
        ],
        "provinces": [{ "id": "ab", "name": "Alberta" }],
        "time_entries": [
            time_entry("te_1", "boss", "job_001", "ht_reg", "2024-01-02", "8", 0, ("40", "60")),
            time_entry("te_2", "dsp1", "job_001", "ht_ns_ot", "2024-01-02", "2", 0, ("20", "20")),
            time_entry("te_3", "hand", "job_001", "ht_reg", "2024-01-03", "0", 1, ("25", "35")),
            time_entry("te_4", "hand", "job_002", "ht_ot", "2024-01-03", "4", 0, ("25", "35")),
            time_entry("te_5", "sub", "job_001", "ht_reg", "2024-01-04", "8", 1, ("50", "70")),
            time_entry("te_6", "boss", "job_999", "ht_reg", "2024-01-04", "8", 0, ("40", "60"))
        ],
        "rental_items": [
            { "id": "item_tower", "name": "Light Tower", "default_rate": "150", "billing_unit": "day" }
        ],
        "rental_entries": [
            { "id": "re_1", "rental_item_id": "item_tower", "job_id": "job_001", "employee_id": "dsp1",
              "start_date": "2024-01-02T08:00:00", "end_date": "2024-01-03T08:00:00",
              "quantity": "1", "billing_unit": "day", "rate_used": "150", "dsp_rate": "40" },
            { "id": "re_2", "rental_item_id": "item_gone", "job_id": "job_001",
              "start_date": "2024-01-02T08:00:00", "end_date": "2024-01-02T09:00:00",
              "quantity": "1", "billing_unit": "hour", "rate_used": "10" }
        ]
    })
}

fn find_by<'a>(items: &'a Value, field: &str, value: &str) -> &'a Value {
    items
        .as_array()
        .unwrap()
        .iter()
        .find(|item| item[field] == value)
        .unwrap_or_else(|| panic!("No item with {} = {}", field, value))
}

// =============================================================================
// SECTION 1: Cost Summaries
// =============================================================================

#[tokio::test]
async fn test_employee_summaries_sorted_by_cost() {
    let (status, result) =
        post_json(create_router_for_test(), "/summaries/employees", create_ledger()).await;

    assert_eq!(status, StatusCode::OK);
    let summaries = &result["data"]["summaries"];
    let names: Vec<&str> = summaries
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["employee_name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Drew", "Casey", "Avery", "Blair"]);

    let casey = find_by(summaries, "employee_name", "Casey");
    assert_eq!(decimal_at(&casey["totals"]["cost"]), decimal("350"));
    assert_eq!(casey["totals"]["loa_count"], 1);
    assert_eq!(casey["category"], "employee");
}

#[tokio::test]
async fn test_employee_summaries_grand_totals_and_exclusions() {
    let (_, result) =
        post_json(create_router_for_test(), "/summaries/employees", create_ledger()).await;

    let data = &result["data"];
    assert_eq!(decimal_at(&data["grand_totals"]["cost"]), decimal("1339"));
    assert_eq!(data["grand_totals"]["entry_count"], 5);

    let exclusions = data["exclusions"].as_array().unwrap();
    assert_eq!(exclusions.len(), 1);
    assert_eq!(exclusions[0]["entry_id"], "te_6");
    assert_eq!(exclusions[0]["reason"], "unknown_job");
    assert_eq!(exclusions[0]["detail"], "job_999");
}

#[tokio::test]
async fn test_night_shift_overtime_is_premium_then_multiplier() {
    // 2h x 1.5 x (20 + 3) = 69
    let (_, result) =
        post_json(create_router_for_test(), "/summaries/employees", create_ledger()).await;

    let blair = find_by(&result["data"]["summaries"], "employee_name", "Blair");
    assert_eq!(decimal_at(&blair["totals"]["cost"]), decimal("69"));
    assert_eq!(decimal_at(&blair["totals"]["effective_hours"]), decimal("3"));
    assert_eq!(decimal_at(&blair["entries"][0]["cost_rate"]), decimal("23"));
}

#[tokio::test]
async fn test_job_summaries_with_employee_breakdown() {
    let (status, result) =
        post_json(create_router_for_test(), "/summaries/jobs", create_ledger()).await;

    assert_eq!(status, StatusCode::OK);
    let summaries = &result["data"]["summaries"];
    assert_eq!(summaries[0]["job_number"], "J-1001");

    let main_job = &summaries[0];
    assert_eq!(decimal_at(&main_job["totals"]["cost"]), decimal("1189"));
    assert_eq!(decimal_at(&main_job["totals"]["billable"]), decimal("1509"));
    let breakdown = main_job["employee_breakdown"].as_object().unwrap();
    assert_eq!(breakdown.len(), 4);
    assert_eq!(decimal_at(&breakdown["Drew"]["billable"]), decimal("760"));
}

#[tokio::test]
async fn test_non_billable_job_has_cost_but_no_billable() {
    let (_, result) =
        post_json(create_router_for_test(), "/summaries/jobs", create_ledger()).await;

    let yard = find_by(&result["data"]["summaries"], "job_number", "J-2002");
    assert_eq!(decimal_at(&yard["totals"]["cost"]), decimal("150"));
    assert_eq!(decimal_at(&yard["totals"]["billable"]), Decimal::ZERO);
}

#[tokio::test]
async fn test_time_entry_summaries_by_entry_detail() {
    let (status, result) =
        post_json(create_router_for_test(), "/summaries/time-entries", create_ledger()).await;

    assert_eq!(status, StatusCode::OK);
    let summaries = result["data"]["summaries"].as_array().unwrap();
    assert_eq!(summaries.len(), 5);

    let blair = summaries
        .iter()
        .find(|s| s["employee_name"] == "Blair")
        .unwrap();
    assert_eq!(blair["hour_type_name"], "NS Overtime");
    assert_eq!(blair["province_name"], "Alberta");
    assert_eq!(decimal_at(&blair["totals"]["cost"]), decimal("69"));
    assert_eq!(decimal_at(&result["data"]["grand_totals"]["cost"]), decimal("1339"));
}

#[tokio::test]
async fn test_rollup_by_date_and_employee() {
    let (status, result) = post_json(
        create_router_for_test(),
        "/summaries/rollup?group_by=date_and_employee",
        create_ledger(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let data = &result["data"];
    assert_eq!(data["group_by"], "date_and_employee");

    let buckets = data["buckets"].as_array().unwrap();
    assert_eq!(buckets.len(), 4);
    assert_eq!(buckets[0]["key"]["date"], "2024-01-02");
    assert_eq!(buckets[0]["key"]["employee_name"], "Avery");

    // te_3 and te_4 share a date
    let casey = buckets
        .iter()
        .find(|b| b["key"]["employee_name"] == "Casey")
        .unwrap();
    assert_eq!(decimal_at(&casey["totals"]["cost"]), decimal("350"));
    assert_eq!(casey["entries"].as_array().unwrap().len(), 2);

    let total: Decimal = buckets.iter().map(|b| decimal_at(&b["totals"]["cost"])).sum();
    assert_eq!(total, decimal("1339"));
}

#[tokio::test]
async fn test_rollup_by_title_and_job() {
    let (_, result) = post_json(
        create_router_for_test(),
        "/summaries/rollup?group_by=title_and_job",
        create_ledger(),
    )
    .await;

    let buckets = result["data"]["buckets"].as_array().unwrap();
    assert_eq!(buckets.len(), 5);
    assert!(buckets.iter().all(|b| b["key"]["group_by"] == "title_and_job"));
}

#[tokio::test]
async fn test_rollup_with_unknown_dimension_returns_400() {
    let (status, result) = post_json(
        create_router_for_test(),
        "/summaries/rollup?group_by=province",
        create_ledger(),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(result["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_overflowing_entry_is_excluded_not_fatal() {
    let mut ledger = create_ledger();
    ledger["time_entries"].as_array_mut().unwrap().push(time_entry(
        "te_huge",
        "boss",
        "job_001",
        "ht_ot",
        "2024-01-05",
        "60000000000000000000000000000",
        0,
        ("40", "60"),
    ));

    let (status, result) =
        post_json(create_router_for_test(), "/summaries/employees", ledger).await;

    assert_eq!(status, StatusCode::OK);
    let data = &result["data"];
    assert_eq!(decimal_at(&data["grand_totals"]["cost"]), decimal("1339"));
    let huge = find_by(&data["exclusions"], "entry_id", "te_huge");
    assert_eq!(huge["reason"], "invalid");
    assert!(huge["detail"].as_str().unwrap().contains("amount overflows"));
}

// =============================================================================
// SECTION 2: Hierarchy
// =============================================================================

#[tokio::test]
async fn test_hierarchy_flattens_subordinates_under_root() {
    let (status, result) =
        post_json(create_router_for_test(), "/summaries/hierarchy", create_ledger()).await;

    assert_eq!(status, StatusCode::OK);
    let roots = result["data"]["roots"].as_array().unwrap();
    assert_eq!(roots.len(), 2);
    assert_eq!(roots[0]["employee_name"], "Avery");
    assert_eq!(roots[1]["employee_name"], "Drew");

    let subordinates: Vec<&str> = roots[0]["subordinates"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["employee_name"].as_str().unwrap())
        .collect();
    assert_eq!(subordinates, vec!["Casey", "Blair"]);
}

#[tokio::test]
async fn test_hierarchy_gst_and_dsp_overlays() {
    let (_, result) =
        post_json(create_router_for_test(), "/summaries/hierarchy", create_ledger()).await;

    let roots = &result["data"]["roots"];
    let avery = &roots[0];
    assert_eq!(decimal_at(&avery["gst_amount"]), Decimal::ZERO);
    // Blair is a DSP: 69 x 5%
    assert_eq!(decimal_at(&avery["subordinate_gst_total"]), decimal("3.45"));
    // One light tower over two days at 40 per day
    assert_eq!(decimal_at(&avery["subordinate_dsp_total"]), decimal("80"));

    let drew = &roots[1];
    assert_eq!(decimal_at(&drew["gst_amount"]), decimal("30"));

    assert_eq!(result["data"]["exclusions"].as_array().unwrap().len(), 2);
}

// =============================================================================
// SECTION 3: Rentals
// =============================================================================

#[tokio::test]
async fn test_rental_summaries() {
    let (status, result) =
        post_json(create_router_for_test(), "/summaries/rentals", create_ledger()).await;

    assert_eq!(status, StatusCode::OK);
    let by_job = &result["data"]["by_job"][0];
    assert_eq!(by_job["label"], "J-1001");
    assert_eq!(decimal_at(&by_job["total_cost"]), decimal("300"));
    assert_eq!(decimal_at(&by_job["total_duration"]), decimal("2"));
    assert_eq!(decimal_at(&by_job["total_dsp_earnings"]), decimal("80"));

    assert_eq!(result["data"]["by_item"][0]["label"], "Light Tower");

    let exclusions = result["data"]["exclusions"].as_array().unwrap();
    assert_eq!(exclusions.len(), 1);
    assert_eq!(exclusions[0]["reason"], "unknown_rental_item");
}

// =============================================================================
// SECTION 4: Job Dates and Invoice Statistics
// =============================================================================

#[tokio::test]
async fn test_job_dates_combine_labor_and_rentals() {
    let (status, result) =
        post_json(create_router_for_test(), "/jobs/job_001/dates", create_ledger()).await;

    assert_eq!(status, StatusCode::OK);
    let dates = result["data"]["dates"].as_array().unwrap();
    let days: Vec<&str> = dates.iter().map(|d| d["date"].as_str().unwrap()).collect();
    assert_eq!(days, vec!["2024-01-02", "2024-01-03", "2024-01-04"]);

    let first = &dates[0];
    assert_eq!(decimal_at(&first["total_hours"]), decimal("10"));
    assert_eq!(decimal_at(&first["labor_billable"]), decimal("549"));
    assert_eq!(decimal_at(&first["rental_billable"]), decimal("300"));
    assert_eq!(decimal_at(&first["total_billable"]), decimal("849"));
    assert_eq!(first["is_invoiced"], true);
    assert_eq!(first["time_entry_count"], 2);
    assert_eq!(first["rental_count"], 1);

    // The LOA-only day bills the allowance once
    assert_eq!(decimal_at(&dates[1]["total_billable"]), decimal("200"));
}

#[tokio::test]
async fn test_job_dates_stats() {
    let (_, result) =
        post_json(create_router_for_test(), "/jobs/job_001/dates", create_ledger()).await;

    let stats = &result["data"]["stats"];
    assert_eq!(stats["total_dates"], 3);
    assert_eq!(stats["invoiced_dates"], 1);
    assert_eq!(stats["uninvoiced_dates"], 2);
    assert_eq!(decimal_at(&stats["invoiced_billable"]), decimal("849"));
    assert_eq!(decimal_at(&stats["uninvoiced_billable"]), decimal("960"));
}

// =============================================================================
// SECTION 5: Invoicing Transitions
// =============================================================================

#[tokio::test]
async fn test_invoice_range_adds_only_new_dates() {
    let body = json!({
        "ledger": create_ledger(),
        "start_date": "2024-01-01",
        "end_date": "2024-01-04"
    });
    let (status, result) =
        post_json(create_router_for_test(), "/jobs/job_001/invoice-range", body).await;

    assert_eq!(status, StatusCode::OK);
    let outcome = &result["data"]["outcome"];
    assert_eq!(outcome["status"], "changed");
    assert_eq!(
        outcome["dates"],
        json!(["2024-01-01", "2024-01-03", "2024-01-04"])
    );
    assert_eq!(
        result["data"]["job"]["invoiced_dates"].as_array().unwrap().len(),
        4
    );
}

#[tokio::test]
async fn test_invoice_range_twice_is_unchanged() {
    let body = json!({
        "ledger": create_ledger(),
        "start_date": "2024-01-01",
        "end_date": "2024-01-04"
    });
    let (_, first) = post_json(create_router_for_test(), "/jobs/job_001/invoice-range", body).await;

    let mut ledger = create_ledger();
    ledger["jobs"][0] = first["data"]["job"].clone();
    let body = json!({
        "ledger": ledger,
        "start_date": "2024-01-01",
        "end_date": "2024-01-04"
    });
    let (status, second) =
        post_json(create_router_for_test(), "/jobs/job_001/invoice-range", body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["data"]["outcome"]["status"], "unchanged");
}

#[tokio::test]
async fn test_invoice_range_remove_action() {
    let body = json!({
        "ledger": create_ledger(),
        "start_date": "2024-01-01",
        "end_date": "2024-01-31",
        "action": "remove"
    });
    let (status, result) =
        post_json(create_router_for_test(), "/jobs/job_001/invoice-range", body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["data"]["outcome"]["dates"], json!(["2024-01-02"]));
    assert!(result["data"]["job"]["invoiced_dates"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_invoiced_dates_add_and_remove() {
    let body = json!({
        "ledger": create_ledger(),
        "action": "add",
        "dates": ["2024-01-02", "2024-01-03", "2024-01-03"]
    });
    let (status, result) =
        post_json(create_router_for_test(), "/jobs/job_001/invoiced-dates", body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["data"]["action"], "add");
    assert_eq!(result["data"]["affected"], 1);

    let body = json!({
        "ledger": create_ledger(),
        "action": "remove",
        "dates": ["2024-01-02", "2024-01-09"]
    });
    let (_, result) =
        post_json(create_router_for_test(), "/jobs/job_001/invoiced-dates", body).await;

    assert_eq!(result["data"]["affected"], 1);
    assert!(result["data"]["job"]["invoiced_dates"].as_array().unwrap().is_empty());
}

// =============================================================================
// SECTION 6: Error Cases
// =============================================================================

#[tokio::test]
async fn test_inverted_range_returns_400() {
    let body = json!({
        "ledger": create_ledger(),
        "start_date": "2024-01-09",
        "end_date": "2024-01-01"
    });
    let (status, result) =
        post_json(create_router_for_test(), "/jobs/job_001/invoice-range", body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(result["code"], "INVALID_DATE_RANGE");
}

#[tokio::test]
async fn test_overlong_range_returns_400_without_expanding() {
    let body = json!({
        "ledger": create_ledger(),
        "start_date": "0001-01-01",
        "end_date": "3000-01-01"
    });
    let (status, result) =
        post_json(create_router_for_test(), "/jobs/job_001/invoice-range", body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(result["code"], "DATE_RANGE_TOO_LONG");
}

#[tokio::test]
async fn test_unknown_job_returns_404() {
    let body = json!({
        "ledger": create_ledger(),
        "action": "add",
        "dates": ["2024-01-02"]
    });
    let (status, result) =
        post_json(create_router_for_test(), "/jobs/job_404/invoiced-dates", body).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(result["code"], "JOB_NOT_FOUND");
    assert!(result["message"].as_str().unwrap().contains("job_404"));
}

#[tokio::test]
async fn test_invalid_billing_unit_returns_400() {
    let mut ledger = create_ledger();
    ledger["rental_entries"][0]["billing_unit"] = json!("fortnight");

    let (status, result) = post_json(create_router_for_test(), "/summaries/rentals", ledger).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(result["code"], "MALFORMED_JSON");
}

#[tokio::test]
async fn test_missing_content_type_returns_400() {
    let response = create_router_for_test()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/summaries/employees")
                .body(Body::from(create_ledger().to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_empty_ledger_returns_empty_summaries() {
    let (status, result) = post_json(create_router_for_test(), "/summaries/jobs", json!({})).await;

    assert_eq!(status, StatusCode::OK);
    assert!(result["data"]["summaries"].as_array().unwrap().is_empty());
    assert_eq!(decimal_at(&result["data"]["grand_totals"]["cost"]), Decimal::ZERO);
}
