//! HTTP request handlers for the billing engine API.
//!
//! Every handler computes on the ledger in its request body and wraps the
//! result in a [`Report`] envelope.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::{
    add_invoiced_dates, bulk_range_invoice, bulk_range_uninvoice, compose_hierarchy,
    grand_totals, invoice_stats, job_dates_for, remove_invoiced_dates, rollup, sort_by_cost_desc,
    summarize_by_employee, summarize_by_job, summarize_rentals_by_item, summarize_rentals_by_job,
    summarize_time_entries, valuate_rentals, valuate_time_entries,
};
use crate::error::{EngineError, EngineResult};
use crate::models::{Job, LedgerSnapshot, Report};

use super::request::{InvoiceAction, InvoiceDatesRequest, InvoiceRangeRequest, RollupParams};
use super::response::{
    ApiError, ApiErrorResponse, EmployeeSummariesResponse, HierarchyResponse,
    InvoiceRangeResponse, InvoicedDatesResponse, JobDatesResponse, JobSummariesResponse,
    RentalSummariesResponse, RollupResponse, TimeEntrySummariesResponse,
};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/summaries/employees", post(employee_summaries_handler))
        .route("/summaries/jobs", post(job_summaries_handler))
        .route("/summaries/time-entries", post(time_entry_summaries_handler))
        .route("/summaries/rollup", post(rollup_handler))
        .route("/summaries/hierarchy", post(hierarchy_handler))
        .route("/summaries/rentals", post(rental_summaries_handler))
        .route("/jobs/:job_id/dates", post(job_dates_handler))
        .route("/jobs/:job_id/invoice-range", post(invoice_range_handler))
        .route("/jobs/:job_id/invoiced-dates", post(invoiced_dates_handler))
        .with_state(state)
}

/// Unwraps a JSON body or builds the 400 response for it.
fn parse_body<T>(
    payload: Result<Json<T>, JsonRejection>,
    correlation_id: Uuid,
) -> Result<T, ApiErrorResponse> {
    match payload {
        Ok(Json(body)) => Ok(body),
        Err(rejection) => {
            let error = match rejection {
                JsonRejection::JsonDataError(err) => {
                    // serde's message is in the body text
                    let body_text = err.body_text();
                    warn!(
                        correlation_id = %correlation_id,
                        error = %body_text,
                        "JSON data error"
                    );
                    if body_text.contains("missing field") {
                        ApiError::validation_error(body_text)
                    } else {
                        ApiError::malformed_json(body_text)
                    }
                }
                JsonRejection::JsonSyntaxError(err) => {
                    warn!(
                        correlation_id = %correlation_id,
                        error = %err,
                        "JSON syntax error"
                    );
                    ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
                }
                JsonRejection::MissingJsonContentType(_) => {
                    ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
                }
                _ => ApiError::malformed_json("Failed to parse request body"),
            };
            Err(ApiErrorResponse::bad_request(error))
        }
    }
}

fn report_response<T: Serialize>(data: T) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        Json(Report::new(data)),
    )
        .into_response()
}

fn error_response(correlation_id: Uuid, err: EngineError) -> Response {
    warn!(
        correlation_id = %correlation_id,
        error = %err,
        "Request failed"
    );
    ApiErrorResponse::from(err).into_response()
}

/// Handler for POST /summaries/employees.
async fn employee_summaries_handler(
    State(state): State<AppState>,
    payload: Result<Json<LedgerSnapshot>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing employee summary request");

    let ledger = match parse_body(payload, correlation_id) {
        Ok(ledger) => ledger,
        Err(error) => return error.into_response(),
    };

    let start_time = Instant::now();
    let valuated = valuate_time_entries(&ledger, state.rules());
    let mut summaries = summarize_by_employee(&valuated.entries);
    sort_by_cost_desc(&mut summaries);
    let totals = grand_totals(&valuated.entries);

    info!(
        correlation_id = %correlation_id,
        employees = summaries.len(),
        excluded = valuated.exclusions.len(),
        total_cost = %totals.cost,
        duration_us = start_time.elapsed().as_micros(),
        "Employee summaries computed"
    );

    report_response(EmployeeSummariesResponse {
        summaries,
        grand_totals: totals,
        exclusions: valuated.exclusions,
    })
}

/// Handler for POST /summaries/jobs.
async fn job_summaries_handler(
    State(state): State<AppState>,
    payload: Result<Json<LedgerSnapshot>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing job summary request");

    let ledger = match parse_body(payload, correlation_id) {
        Ok(ledger) => ledger,
        Err(error) => return error.into_response(),
    };

    let start_time = Instant::now();
    let valuated = valuate_time_entries(&ledger, state.rules());
    let mut summaries = summarize_by_job(&valuated.entries);
    sort_by_cost_desc(&mut summaries);
    let totals = grand_totals(&valuated.entries);

    info!(
        correlation_id = %correlation_id,
        jobs = summaries.len(),
        excluded = valuated.exclusions.len(),
        total_billable = %totals.billable,
        duration_us = start_time.elapsed().as_micros(),
        "Job summaries computed"
    );

    report_response(JobSummariesResponse {
        summaries,
        grand_totals: totals,
        exclusions: valuated.exclusions,
    })
}

/// Handler for POST /summaries/time-entries.
async fn time_entry_summaries_handler(
    State(state): State<AppState>,
    payload: Result<Json<LedgerSnapshot>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing time entry summary request");

    let ledger = match parse_body(payload, correlation_id) {
        Ok(ledger) => ledger,
        Err(error) => return error.into_response(),
    };

    let start_time = Instant::now();
    let valuated = valuate_time_entries(&ledger, state.rules());
    let summaries = summarize_time_entries(&valuated.entries);
    let totals = grand_totals(&valuated.entries);

    info!(
        correlation_id = %correlation_id,
        summaries = summaries.len(),
        excluded = valuated.exclusions.len(),
        duration_us = start_time.elapsed().as_micros(),
        "Time entry summaries computed"
    );

    report_response(TimeEntrySummariesResponse {
        summaries,
        grand_totals: totals,
        exclusions: valuated.exclusions,
    })
}

/// Handler for POST /summaries/rollup?group_by=...
async fn rollup_handler(
    State(state): State<AppState>,
    params: Result<Query<RollupParams>, QueryRejection>,
    payload: Result<Json<LedgerSnapshot>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();

    let Query(RollupParams { group_by }) = match params {
        Ok(params) => params,
        Err(rejection) => {
            warn!(
                correlation_id = %correlation_id,
                error = %rejection.body_text(),
                "Invalid rollup query"
            );
            return ApiErrorResponse::bad_request(ApiError::validation_error(
                rejection.body_text(),
            ))
            .into_response();
        }
    };
    info!(correlation_id = %correlation_id, group_by = ?group_by, "Processing rollup request");

    let ledger = match parse_body(payload, correlation_id) {
        Ok(ledger) => ledger,
        Err(error) => return error.into_response(),
    };

    let start_time = Instant::now();
    let valuated = valuate_time_entries(&ledger, state.rules());
    let buckets = rollup(&valuated.entries, group_by);
    let totals = grand_totals(&valuated.entries);

    info!(
        correlation_id = %correlation_id,
        buckets = buckets.len(),
        excluded = valuated.exclusions.len(),
        duration_us = start_time.elapsed().as_micros(),
        "Rollup computed"
    );

    report_response(RollupResponse {
        group_by,
        buckets,
        grand_totals: totals,
        exclusions: valuated.exclusions,
    })
}

/// Handler for POST /summaries/hierarchy.
async fn hierarchy_handler(
    State(state): State<AppState>,
    payload: Result<Json<LedgerSnapshot>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing hierarchy request");

    let ledger = match parse_body(payload, correlation_id) {
        Ok(ledger) => ledger,
        Err(error) => return error.into_response(),
    };

    let start_time = Instant::now();
    let rules = state.rules();
    let labor = valuate_time_entries(&ledger, rules);
    let rentals = valuate_rentals(&ledger, rules);
    let roots = compose_hierarchy(&ledger.employees, &labor.entries, &rentals.entries, rules);

    let mut exclusions = labor.exclusions;
    exclusions.extend(rentals.exclusions);

    info!(
        correlation_id = %correlation_id,
        roots = roots.len(),
        excluded = exclusions.len(),
        duration_us = start_time.elapsed().as_micros(),
        "Hierarchy computed"
    );

    report_response(HierarchyResponse { roots, exclusions })
}

/// Handler for POST /summaries/rentals.
async fn rental_summaries_handler(
    State(state): State<AppState>,
    payload: Result<Json<LedgerSnapshot>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing rental summary request");

    let ledger = match parse_body(payload, correlation_id) {
        Ok(ledger) => ledger,
        Err(error) => return error.into_response(),
    };

    let start_time = Instant::now();
    let rentals = valuate_rentals(&ledger, state.rules());
    let by_job = summarize_rentals_by_job(&rentals.entries);
    let by_item = summarize_rentals_by_item(&rentals.entries);

    info!(
        correlation_id = %correlation_id,
        rentals = rentals.entries.len(),
        excluded = rentals.exclusions.len(),
        duration_us = start_time.elapsed().as_micros(),
        "Rental summaries computed"
    );

    report_response(RentalSummariesResponse {
        by_job,
        by_item,
        exclusions: rentals.exclusions,
    })
}

/// Handler for POST /jobs/:job_id/dates.
async fn job_dates_handler(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
    payload: Result<Json<LedgerSnapshot>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, job_id = %job_id, "Processing job dates request");

    let ledger = match parse_body(payload, correlation_id) {
        Ok(ledger) => ledger,
        Err(error) => return error.into_response(),
    };

    let start_time = Instant::now();
    match job_dates_for(&ledger, &job_id, state.rules()) {
        Ok(dates) => {
            let stats = invoice_stats(&dates);
            info!(
                correlation_id = %correlation_id,
                job_id = %job_id,
                dates = stats.total_dates,
                invoiced = stats.invoiced_dates,
                duration_us = start_time.elapsed().as_micros(),
                "Job dates computed"
            );
            report_response(JobDatesResponse {
                job_id,
                dates,
                stats,
            })
        }
        Err(err) => error_response(correlation_id, err),
    }
}

fn updated_job(ledger: &LedgerSnapshot, job_id: &str) -> EngineResult<Job> {
    ledger
        .jobs
        .iter()
        .find(|job| job.id == job_id)
        .cloned()
        .ok_or_else(|| EngineError::JobNotFound {
            job_id: job_id.to_string(),
        })
}

/// Handler for POST /jobs/:job_id/invoice-range.
async fn invoice_range_handler(
    Path(job_id): Path<String>,
    payload: Result<Json<InvoiceRangeRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, job_id = %job_id, "Processing invoice range request");

    let request = match parse_body(payload, correlation_id) {
        Ok(request) => request,
        Err(error) => return error.into_response(),
    };

    let mut ledger = request.ledger;
    let (start, end) = (request.start_date, request.end_date);
    let outcome = match request.action {
        InvoiceAction::Add => bulk_range_invoice(&mut ledger, &job_id, start, end),
        InvoiceAction::Remove => bulk_range_uninvoice(&mut ledger, &job_id, start, end),
    };
    let result = outcome.and_then(|outcome| Ok((updated_job(&ledger, &job_id)?, outcome)));

    match result {
        Ok((job, outcome)) => {
            info!(
                correlation_id = %correlation_id,
                job_id = %job_id,
                action = ?request.action,
                affected = outcome.affected_count(),
                "Invoice range applied"
            );
            report_response(InvoiceRangeResponse { job, outcome })
        }
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for POST /jobs/:job_id/invoiced-dates.
async fn invoiced_dates_handler(
    Path(job_id): Path<String>,
    payload: Result<Json<InvoiceDatesRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, job_id = %job_id, "Processing invoiced dates request");

    let request = match parse_body(payload, correlation_id) {
        Ok(request) => request,
        Err(error) => return error.into_response(),
    };

    let mut ledger = request.ledger;
    let action = request.action;
    let affected = match action {
        InvoiceAction::Add => add_invoiced_dates(&mut ledger, &job_id, request.dates),
        InvoiceAction::Remove => remove_invoiced_dates(&mut ledger, &job_id, request.dates),
    };
    let result = affected.and_then(|affected| Ok((updated_job(&ledger, &job_id)?, affected)));

    match result {
        Ok((job, affected)) => {
            info!(
                correlation_id = %correlation_id,
                job_id = %job_id,
                action = ?action,
                affected,
                "Invoiced dates updated"
            );
            report_response(InvoicedDatesResponse {
                job,
                action,
                affected,
            })
        }
        Err(err) => error_response(correlation_id, err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculation::BulkInvoiceOutcome;
    use axum::body::Body;
    use axum::http::Request;
    use rust_decimal::Decimal;
    use serde_json::{Value, json};
    use std::str::FromStr;
    use tower::ServiceExt;

    fn create_test_state() -> AppState {
        AppState::new(crate::config::ConfigLoader::defaults())
    }

    fn ledger_json() -> Value {
        json!({
            "employees": [
                { "id": "emp_001", "name": "Dana Reyes", "title": "Foreman",
                  "billable_wage": "45", "cost_wage": "25" }
            ],
            "jobs": [
                { "id": "job_001", "job_number": "J-1001", "name": "Pipeline Tie-In",
                  "invoiced_dates": ["2024-01-02"] }
            ],
            "hour_types": [{ "id": "ht_reg", "name": "Regular", "multiplier": "1.0" }],
            "provinces": [{ "id": "ab", "name": "Alberta" }],
            "time_entries": [
                { "id": "te_001", "employee_id": "emp_001", "job_id": "job_001",
                  "hour_type_id": "ht_reg", "province_id": "ab", "date": "2024-01-02",
                  "hours": "8", "loa_count": 1, "billable_wage_used": "45", "cost_wage_used": "25" }
            ]
        })
    }

    async fn post(uri: &str, body: String) -> (StatusCode, Value) {
        let response = create_router(create_test_state())
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("Content-Type", "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_employee_summaries_returns_report() {
        let (status, body) = post("/summaries/employees", ledger_json().to_string()).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body["report_id"].is_string());
        assert_eq!(body["data"]["summaries"][0]["employee_name"], "Dana Reyes");
        // 8 x 25 + 200
        let cost = Decimal::from_str(body["data"]["grand_totals"]["cost"].as_str().unwrap()).unwrap();
        assert_eq!(cost, Decimal::new(400, 0));
    }

    #[tokio::test]
    async fn test_malformed_json_returns_400() {
        let (status, body) = post("/summaries/jobs", "{invalid json".to_string()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "MALFORMED_JSON");
    }

    #[tokio::test]
    async fn test_missing_field_returns_validation_error() {
        let body = json!({ "ledger": {}, "dates": [] }).to_string();
        let (status, body) = post("/jobs/job_001/invoiced-dates", body).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_invoice_range_returns_updated_job() {
        let body = json!({
            "ledger": ledger_json(),
            "start_date": "2024-01-01",
            "end_date": "2024-01-03"
        })
        .to_string();
        let (status, body) = post("/jobs/job_001/invoice-range", body).await;

        assert_eq!(status, StatusCode::OK);
        let outcome: BulkInvoiceOutcome =
            serde_json::from_value(body["data"]["outcome"].clone()).unwrap();
        assert_eq!(outcome.affected_count(), 2);
        assert_eq!(body["data"]["job"]["invoiced_dates"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_unknown_job_returns_404() {
        let (status, body) = post("/jobs/job_404/dates", ledger_json().to_string()).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "JOB_NOT_FOUND");
    }
}
