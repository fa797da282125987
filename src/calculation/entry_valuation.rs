//! Time entry valuation.
//!
//! This module applies rate resolution and the flat live-out allowance to a
//! single time entry, and runs the ledger-wide pass that resolves every
//! entry's references before valuing it.

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::config::BusinessRules;
use crate::error::{EngineError, EngineResult};
use crate::models::{AuditStep, HourType, LedgerIndex, LedgerSnapshot, TimeEntry, ValuatedTimeEntry};

use super::exclusion::{ExclusionReason, Valuated};
use super::rate_resolver::resolve_rate;

/// The rule identifier recorded on LOA audit steps.
pub const LOA_RULE: &str = "live_out_allowance";

/// Largest hour count, cost or billable total a single entry may carry.
///
/// One quadrillion. Keeps rollup sums over any realistic ledger inside the
/// decimal range.
pub const MAX_ENTRY_AMOUNT: Decimal = Decimal::from_parts(0xA4C6_8000, 0x0003_8D7E, 0, false, 0);

/// The cost and billable amounts of one time entry.
#[derive(Debug, Clone)]
pub struct TimeEntryValuation {
    /// Hours after the hour-type multiplier.
    pub effective_hours: Decimal,
    /// Cost rate after any night-shift premium.
    pub cost_rate: Decimal,
    /// Billable rate after any night-shift premium.
    pub billable_rate: Decimal,
    /// `loa_count × loa_unit_value`.
    pub loa_amount: Decimal,
    /// `effective_hours × cost_rate + loa_amount`.
    pub total_cost: Decimal,
    /// `effective_hours × billable_rate + loa_amount`.
    pub total_billable: Decimal,
    /// Rate resolution and LOA steps, in order.
    pub audit_steps: Vec<AuditStep>,
}

fn reject(entry: &TimeEntry, message: String) -> EngineError {
    EngineError::InvalidEntry {
        entry_id: entry.id.clone(),
        message,
    }
}

/// Rejects values that would silently poison aggregate sums.
fn validate_entry(entry: &TimeEntry, hour_type: &HourType) -> EngineResult<()> {
    if entry.hours < Decimal::ZERO {
        return Err(reject(
            entry,
            format!("hours must not be negative (got {})", entry.hours),
        ));
    }
    if entry.cost_wage_used < Decimal::ZERO {
        return Err(reject(
            entry,
            format!("cost wage must not be negative (got {})", entry.cost_wage_used),
        ));
    }
    if entry.billable_wage_used < Decimal::ZERO {
        return Err(reject(
            entry,
            format!(
                "billable wage must not be negative (got {})",
                entry.billable_wage_used
            ),
        ));
    }
    if hour_type.multiplier() < Decimal::ZERO {
        return Err(reject(
            entry,
            format!(
                "hour type '{}' has a negative multiplier ({})",
                hour_type.name,
                hour_type.multiplier()
            ),
        ));
    }
    Ok(())
}

/// Computes the cost and billable amounts of a single time entry.
///
/// The LOA contribution is flat per unit: it is unaffected by the hour-type
/// multiplier and the night-shift premium, and is added exactly once to each
/// total.
///
/// # Errors
///
/// Returns [`EngineError::InvalidEntry`] for negative hours, negative wages
/// or a negative multiplier, and when its hours or either total overflow or exceed
/// [`MAX_ENTRY_AMOUNT`].
///
/// # Examples
///
/// ```
/// use billing_engine::calculation::value_time_entry;
/// use billing_engine::config::BusinessRules;
/// use billing_engine::models::{HourType, TimeEntry};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let regular = HourType {
///     id: "ht_reg".to_string(),
///     name: "Regular".to_string(),
///     multiplier: Some(Decimal::ONE),
/// };
/// let entry = TimeEntry {
///     id: "te_001".to_string(),
///     employee_id: "emp_001".to_string(),
///     job_id: "job_001".to_string(),
///     hour_type_id: "ht_reg".to_string(),
///     province_id: "ab".to_string(),
///     date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
///     hours: Decimal::new(8, 0),
///     loa_count: 1,
///     billable_wage_used: Decimal::new(25, 0),
///     cost_wage_used: Decimal::new(25, 0),
///     description: None,
/// };
///
/// let valuation = value_time_entry(&entry, &regular, &BusinessRules::default()).unwrap();
/// // 8 x 25 + 200, with the allowance counted once
/// assert_eq!(valuation.total_cost, Decimal::new(400, 0));
/// ```
pub fn value_time_entry(
    entry: &TimeEntry,
    hour_type: &HourType,
    rules: &BusinessRules,
) -> EngineResult<TimeEntryValuation> {
    validate_entry(entry, hour_type)?;

    let overflow = || reject(entry, format!("amount overflows (limit {})", MAX_ENTRY_AMOUNT));

    let resolution = resolve_rate(
        hour_type,
        entry.cost_wage_used,
        entry.billable_wage_used,
        entry.hours,
        rules,
    )
    .ok_or_else(overflow)?;

    let loa_amount = Decimal::from(entry.loa_count)
        .checked_mul(rules.loa_unit_value)
        .ok_or_else(overflow)?;
    let hourly_cost = resolution
        .effective_hours
        .checked_mul(resolution.cost_rate)
        .ok_or_else(overflow)?;
    let hourly_billable = resolution
        .effective_hours
        .checked_mul(resolution.billable_rate)
        .ok_or_else(overflow)?;
    let total_cost = hourly_cost.checked_add(loa_amount).ok_or_else(overflow)?;
    let total_billable = hourly_billable.checked_add(loa_amount).ok_or_else(overflow)?;
    let figures = [entry.hours, resolution.effective_hours, total_cost, total_billable];
    if figures.iter().any(|figure| *figure > MAX_ENTRY_AMOUNT) {
        return Err(overflow());
    }

    let loa_step = AuditStep {
        rule_id: LOA_RULE.to_string(),
        rule_name: "Live-Out Allowance".to_string(),
        input: serde_json::json!({
            "loa_count": entry.loa_count,
            "loa_unit_value": rules.loa_unit_value.normalize().to_string(),
            "hourly_cost": hourly_cost.normalize().to_string(),
            "hourly_billable": hourly_billable.normalize().to_string()
        }),
        output: serde_json::json!({
            "loa_amount": loa_amount.normalize().to_string(),
            "total_cost": total_cost.normalize().to_string(),
            "total_billable": total_billable.normalize().to_string()
        }),
        reasoning: if entry.loa_count > 0 {
            format!(
                "{} x ${} LOA = ${} added once to cost and billable",
                entry.loa_count,
                rules.loa_unit_value.normalize(),
                loa_amount.normalize()
            )
        } else {
            "No LOA units on entry".to_string()
        },
    };

    Ok(TimeEntryValuation {
        effective_hours: resolution.effective_hours,
        cost_rate: resolution.cost_rate,
        billable_rate: resolution.billable_rate,
        loa_amount,
        total_cost,
        total_billable,
        audit_steps: vec![resolution.audit_step, loa_step],
    })
}

fn valuate_one(
    entry: &TimeEntry,
    index: &LedgerIndex<'_>,
    rules: &BusinessRules,
) -> Result<ValuatedTimeEntry, ExclusionReason> {
    let employee = index
        .employee(&entry.employee_id)
        .ok_or_else(|| ExclusionReason::UnknownEmployee(entry.employee_id.clone()))?;
    let job = index
        .job(&entry.job_id)
        .ok_or_else(|| ExclusionReason::UnknownJob(entry.job_id.clone()))?;
    let hour_type = index
        .hour_type(&entry.hour_type_id)
        .ok_or_else(|| ExclusionReason::UnknownHourType(entry.hour_type_id.clone()))?;
    let province = index
        .province(&entry.province_id)
        .ok_or_else(|| ExclusionReason::UnknownProvince(entry.province_id.clone()))?;

    let valuation = value_time_entry(entry, hour_type, rules)
        .map_err(|err| ExclusionReason::Invalid(err.to_string()))?;

    // Non-billable jobs are cost sinks
    let total_billable = if job.is_billable {
        valuation.total_billable
    } else {
        Decimal::ZERO
    };

    Ok(ValuatedTimeEntry {
        entry_id: entry.id.clone(),
        employee_id: employee.id.clone(),
        employee_name: employee.name.clone(),
        employee_title: employee.title.clone(),
        employee_category: employee.category(),
        job_id: job.id.clone(),
        job_number: job.job_number.clone(),
        job_name: job.name.clone(),
        hour_type_id: hour_type.id.clone(),
        hour_type_name: hour_type.name.clone(),
        province_id: province.id.clone(),
        province_name: province.name.clone(),
        date: entry.date,
        hours: entry.hours,
        effective_hours: valuation.effective_hours,
        loa_count: entry.loa_count,
        cost_rate: valuation.cost_rate,
        billable_rate: valuation.billable_rate,
        loa_amount: valuation.loa_amount,
        total_cost: valuation.total_cost,
        total_billable,
    })
}

/// Values every time entry in the ledger.
///
/// Entries whose employee, job, hour type or province does not resolve, and
/// entries that fail validation, are excluded and reported rather than
/// failing the pass.
pub fn valuate_time_entries(
    ledger: &LedgerSnapshot,
    rules: &BusinessRules,
) -> Valuated<ValuatedTimeEntry> {
    let index = ledger.index();

    let valuated = ledger
        .time_entries
        .iter()
        .fold(Valuated::default(), |mut acc, entry| {
            let outcome = valuate_one(entry, &index, rules);
            if let Err(reason) = &outcome {
                match reason {
                    ExclusionReason::Invalid(message) => {
                        warn!(entry_id = %entry.id, error = %message, "Excluding invalid time entry")
                    }
                    _ => debug!(entry_id = %entry.id, reason = ?reason, "Excluding unresolved time entry"),
                }
            }
            acc.push(&entry.id, outcome);
            acc
        });

    debug!(
        valuated = valuated.entries.len(),
        excluded = valuated.exclusions.len(),
        "Time entry valuation complete"
    );
    valuated
}
