//! Rate resolution functionality.
//!
//! This module turns raw hours and snapshotted base rates into effective hours
//! and adjusted rates for a given hour type.

use rust_decimal::Decimal;

use crate::config::BusinessRules;
use crate::models::{AuditStep, HourType};

/// The rule identifier recorded on rate resolution audit steps.
pub const RATE_RESOLUTION_RULE: &str = "rate_resolution";

/// The result of resolving an hour type against base rates.
#[derive(Debug, Clone)]
pub struct RateResolution {
    /// `hours × multiplier`.
    pub effective_hours: Decimal,
    /// Base cost rate plus any night-shift premium.
    pub cost_rate: Decimal,
    /// Base billable rate plus any night-shift premium.
    pub billable_rate: Decimal,
    /// The premium that was added to each rate (zero if none).
    pub premium: Decimal,
    /// The audit step recording this resolution.
    pub audit_step: AuditStep,
}

/// Resolves effective hours and adjusted rates for an hour type.
///
/// The night-shift premium is added to both base rates *before* they are
/// multiplied by effective hours; it is never applied to the hours.
///
/// Returns `None` when any product or sum overflows the decimal range.
///
/// # Arguments
///
/// * `hour_type` - The hour type the work was recorded under
/// * `base_cost_rate` - The cost rate snapshotted on the entry
/// * `base_billable_rate` - The billable rate snapshotted on the entry
/// * `hours` - Raw hours worked
/// * `rules` - Business rules supplying the premium and its prefix
///
/// # Examples
///
/// ```
/// use billing_engine::calculation::resolve_rate;
/// use billing_engine::config::BusinessRules;
/// use billing_engine::models::HourType;
/// use rust_decimal::Decimal;
///
/// let ns_overtime = HourType {
///     id: "ht_ns_ot".to_string(),
///     name: "NS Overtime".to_string(),
///     multiplier: Some(Decimal::new(15, 1)),
/// };
///
/// let resolution = resolve_rate(
///     &ns_overtime,
///     Decimal::new(20, 0),
///     Decimal::new(35, 0),
///     Decimal::new(2, 0),
///     &BusinessRules::default(),
/// )
/// .unwrap();
///
/// assert_eq!(resolution.effective_hours, Decimal::new(3, 0));
/// assert_eq!(resolution.cost_rate, Decimal::new(23, 0));
/// assert_eq!(resolution.effective_hours * resolution.cost_rate, Decimal::new(69, 0));
/// ```
pub fn resolve_rate(
    hour_type: &HourType,
    base_cost_rate: Decimal,
    base_billable_rate: Decimal,
    hours: Decimal,
    rules: &BusinessRules,
) -> Option<RateResolution> {
    let multiplier = hour_type.multiplier();
    let effective_hours = hours.checked_mul(multiplier)?;

    let is_night_shift = hour_type.is_night_shift(&rules.night_shift_prefix);
    let premium = if is_night_shift {
        rules.night_shift_premium
    } else {
        Decimal::ZERO
    };

    let cost_rate = base_cost_rate.checked_add(premium)?;
    let billable_rate = base_billable_rate.checked_add(premium)?;

    let reasoning = if is_night_shift {
        format!(
            "{}h x {} = {}h; night shift premium ${} added to rates: cost ${} -> ${}, billable ${} -> ${}",
            hours.normalize(),
            multiplier.normalize(),
            effective_hours.normalize(),
            premium.normalize(),
            base_cost_rate.normalize(),
            cost_rate.normalize(),
            base_billable_rate.normalize(),
            billable_rate.normalize()
        )
    } else {
        format!(
            "{}h x {} = {}h at cost ${} / billable ${}",
            hours.normalize(),
            multiplier.normalize(),
            effective_hours.normalize(),
            cost_rate.normalize(),
            billable_rate.normalize()
        )
    };

    let audit_step = AuditStep {
        rule_id: RATE_RESOLUTION_RULE.to_string(),
        rule_name: "Rate Resolution".to_string(),
        input: serde_json::json!({
            "hour_type": hour_type.name,
            "hours": hours.normalize().to_string(),
            "multiplier": multiplier.normalize().to_string(),
            "base_cost_rate": base_cost_rate.normalize().to_string(),
            "base_billable_rate": base_billable_rate.normalize().to_string()
        }),
        output: serde_json::json!({
            "effective_hours": effective_hours.normalize().to_string(),
            "cost_rate": cost_rate.normalize().to_string(),
            "billable_rate": billable_rate.normalize().to_string(),
            "premium_applied": is_night_shift
        }),
        reasoning,
    };

    Some(RateResolution {
        effective_hours,
        cost_rate,
        billable_rate,
        premium,
        audit_step,
    })
}
