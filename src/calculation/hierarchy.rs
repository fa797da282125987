//! Manager hierarchy composition.
//!
//! This module positions per-employee rollups under their managers and adds
//! the GST and DSP overlays. Subordinates at any depth are flattened onto
//! their top-level manager, so each root carries one level of subordinates.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::config::BusinessRules;
use crate::models::{
    Employee, EmployeeCategory, EmployeeHierarchySummary, RollupTotals, ValuatedRentalEntry,
    ValuatedTimeEntry,
};

use super::rental_valuation::dsp_earnings_by_employee;

/// Returns the GST owed on `cost` for an employee category.
///
/// Regular employees owe no GST; every other category owes
/// `cost × gst_rate`.
///
/// ```
/// use billing_engine::calculation::gst_amount;
/// use billing_engine::config::BusinessRules;
/// use billing_engine::models::EmployeeCategory;
/// use rust_decimal::Decimal;
///
/// let rules = BusinessRules::default();
/// assert_eq!(gst_amount(&EmployeeCategory::Dsp, Decimal::new(1000, 0), &rules), Decimal::new(50, 0));
/// assert_eq!(gst_amount(&EmployeeCategory::Employee, Decimal::new(1000, 0), &rules), Decimal::ZERO);
/// ```
pub fn gst_amount(category: &EmployeeCategory, cost: Decimal, rules: &BusinessRules) -> Decimal {
    if category.is_gst_applicable() {
        cost * rules.gst_rate
    } else {
        Decimal::ZERO
    }
}

/// Manager id to direct subordinate ids, built once per pass.
#[derive(Debug, Clone, Default)]
pub struct ManagerIndex<'a> {
    subordinates: HashMap<&'a str, Vec<&'a str>>,
}

impl<'a> ManagerIndex<'a> {
    /// Indexes the `manager_id` links of `employees`.
    pub fn new(employees: &'a [Employee]) -> Self {
        let subordinates = employees
            .iter()
            .filter_map(|e| e.manager_id.as_deref().map(|m| (m, e.id.as_str())))
            .fold(HashMap::new(), |mut acc: HashMap<&str, Vec<&str>>, (manager, id)| {
                acc.entry(manager).or_default().push(id);
                acc
            });
        Self { subordinates }
    }

    /// Direct subordinates of `manager_id`, in input order.
    pub fn direct_subordinates(&self, manager_id: &str) -> &[&'a str] {
        self.subordinates
            .get(manager_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Every subordinate reachable from `root_id`, breadth first.
    ///
    /// Each employee is visited once, so a cycle below the root terminates.
    /// The root itself is never included.
    pub fn descendants(&self, root_id: &str) -> Vec<&'a str> {
        let mut seen: HashSet<&str> = HashSet::from([root_id]);
        let mut queue: VecDeque<&str> = VecDeque::from([root_id]);
        let mut found = Vec::new();

        while let Some(current) = queue.pop_front() {
            for &subordinate in self.direct_subordinates(current) {
                if seen.insert(subordinate) {
                    found.push(subordinate);
                    queue.push_back(subordinate);
                }
            }
        }
        found
    }
}

struct Activity {
    totals: BTreeMap<String, RollupTotals>,
    dsp: BTreeMap<String, Decimal>,
}

impl Activity {
    fn collect(entries: &[ValuatedTimeEntry], rentals: &[ValuatedRentalEntry]) -> Self {
        let totals = entries.iter().fold(BTreeMap::new(), |mut acc, entry| {
            acc.entry(entry.employee_id.clone())
                .or_insert_with(RollupTotals::default)
                .add(entry);
            acc
        });
        Self {
            totals,
            dsp: dsp_earnings_by_employee(rentals),
        }
    }

    fn is_active(&self, employee_id: &str) -> bool {
        self.totals.contains_key(employee_id) || self.dsp.contains_key(employee_id)
    }

    fn node(&self, employee: &Employee, rules: &BusinessRules) -> EmployeeHierarchySummary {
        let totals = self.totals.get(&employee.id).cloned().unwrap_or_default();
        let category = employee.category();
        EmployeeHierarchySummary {
            employee_id: employee.id.clone(),
            employee_name: employee.name.clone(),
            title: employee.title.clone(),
            gst_amount: gst_amount(&category, totals.cost, rules),
            dsp_earnings: self.dsp.get(&employee.id).copied().unwrap_or(Decimal::ZERO),
            category,
            totals,
            subordinates: Vec::new(),
            subordinate_gst_total: Decimal::ZERO,
            subordinate_dsp_total: Decimal::ZERO,
        }
    }
}

fn by_cost_then_name(a: &EmployeeHierarchySummary, b: &EmployeeHierarchySummary) -> std::cmp::Ordering {
    b.team_totals()
        .cost
        .cmp(&a.team_totals().cost)
        .then_with(|| a.employee_name.cmp(&b.employee_name))
}

/// Builds the manager hierarchy over valuated labor and rentals.
///
/// Only employees with labor or DSP earnings appear, except that a root
/// manager with no activity of their own still appears when any of their
/// subordinates does. Employees whose manager id does not resolve are
/// treated as roots. Employees caught in a management cycle become
/// standalone roots.
///
/// Roots and subordinates are ordered by cost, highest first, then by name.
pub fn compose_hierarchy(
    employees: &[Employee],
    entries: &[ValuatedTimeEntry],
    rentals: &[ValuatedRentalEntry],
    rules: &BusinessRules,
) -> Vec<EmployeeHierarchySummary> {
    let activity = Activity::collect(entries, rentals);
    let by_id: HashMap<&str, &Employee> = employees.iter().map(|e| (e.id.as_str(), e)).collect();
    let managers = ManagerIndex::new(employees);

    let is_root = |employee: &Employee| match employee.manager_id.as_deref() {
        None => true,
        Some(manager_id) if !by_id.contains_key(manager_id) => {
            warn!(
                employee_id = %employee.id,
                manager_id = %manager_id,
                "Unknown manager; treating employee as a root"
            );
            true
        }
        Some(_) => false,
    };

    let mut placed: HashSet<&str> = HashSet::new();
    let mut roots = Vec::new();

    for root in employees.iter().filter(|e| is_root(e)) {
        if !placed.insert(root.id.as_str()) {
            continue;
        }

        let mut subordinates: Vec<EmployeeHierarchySummary> = managers
            .descendants(&root.id)
            .into_iter()
            .filter(|id| placed.insert(*id))
            .filter(|id| activity.is_active(id))
            .filter_map(|id| by_id.get(id))
            .map(|employee| activity.node(employee, rules))
            .collect();

        if subordinates.is_empty() && !activity.is_active(&root.id) {
            continue;
        }

        subordinates.sort_by(by_cost_then_name);
        let mut node = activity.node(root, rules);
        node.subordinate_gst_total = subordinates.iter().map(|s| s.gst_amount).sum();
        node.subordinate_dsp_total = subordinates.iter().map(|s| s.dsp_earnings).sum();
        node.subordinates = subordinates;
        roots.push(node);
    }

    // Anything still unplaced has a manager chain that never reaches a root
    for employee in employees {
        if placed.contains(employee.id.as_str()) || !activity.is_active(&employee.id) {
            continue;
        }
        warn!(
            employee_id = %employee.id,
            manager_id = ?employee.manager_id,
            "Management cycle detected; promoting employee to a standalone root"
        );
        placed.insert(employee.id.as_str());
        roots.push(activity.node(employee, rules));
    }

    roots.sort_by(by_cost_then_name);
    debug!(roots = roots.len(), "Hierarchy composed");
    roots
}
