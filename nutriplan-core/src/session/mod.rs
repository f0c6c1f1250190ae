//! Editing session: the selection state around a plan and the reducer that
//! applies user intents to it.

mod intent;
mod reducer;
mod validate;

pub use intent::{DishTarget, Intent, Replacement, SlotMetaMode};
pub use reducer::{apply, apply_at};
pub use validate::{validate_plan, validate_session, ValidationError, ValidationRules};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

use crate::models::{
    period_order, DayEntry, NutrientTotals, PeriodMode, PeriodOrder, Plan, PlanDetails, Slot,
    DEFAULT_OPTION_ID,
};
use crate::normalize::{normalize_plan, plan_targets};

/// Everything an editor needs between two intents. Intents never mutate a
/// state in place; [`apply`] returns the next one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    #[serde(default)]
    pub mode: PeriodMode,
    #[serde(default)]
    pub plan: Plan,
    #[serde(default)]
    pub selected_period: String,
    #[serde(default)]
    pub selected_slot: String,
    #[serde(default = "default_option")]
    pub selected_option: String,
    #[serde(default)]
    pub details: PlanDetails,
    /// Nutrient targets per period key.
    #[serde(default)]
    pub targets: BTreeMap<String, NutrientTotals>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_replace: Option<ReplaceReport>,
}

fn default_option() -> String {
    DEFAULT_OPTION_ID.to_string()
}

impl SessionState {
    /// A fresh session whose periods each hold the default slot template.
    pub fn new(mode: PeriodMode, today: NaiveDate) -> Self {
        let mut state = Self {
            mode,
            plan: Plan::seeded(&mode.default_keys(today)),
            selected_period: String::new(),
            selected_slot: String::new(),
            selected_option: default_option(),
            details: PlanDetails::default(),
            targets: BTreeMap::new(),
            last_replace: None,
        };
        state.select_first_period();
        state
    }

    /// A session over a persisted plan of any shape.
    pub fn hydrate(raw: &Value) -> Self {
        let plan = normalize_plan(raw);
        let mut state = Self {
            mode: infer_mode(&plan),
            plan,
            selected_period: String::new(),
            selected_slot: String::new(),
            selected_option: default_option(),
            details: PlanDetails::default(),
            targets: plan_targets(raw),
            last_replace: None,
        };
        state.select_first_period();
        state
    }

    pub fn with_details(mut self, details: PlanDetails) -> Self {
        self.details = details;
        self
    }

    pub fn current_day(&self) -> Option<&DayEntry> {
        self.plan.get(&self.selected_period)
    }

    pub fn current_day_mut(&mut self) -> Option<&mut DayEntry> {
        self.plan.get_mut(&self.selected_period)
    }

    pub fn current_slot(&self) -> Option<&Slot> {
        self.current_day()?.slot(&self.selected_slot)
    }

    /// Selects `key` with its first slot and the default option.
    pub(crate) fn select_period(&mut self, key: &str) {
        self.selected_period = key.to_string();
        self.selected_slot = self
            .plan
            .get(key)
            .and_then(|day| day.slots.first())
            .map(|slot| slot.slot_id.clone())
            .unwrap_or_default();
        self.selected_option = default_option();
    }

    pub(crate) fn select_first_period(&mut self) {
        let first = self.plan.first_key().unwrap_or_default().to_string();
        self.select_period(&first);
    }
}

/// Guesses the period mode from the kind of keys a plan uses.
pub fn infer_mode(plan: &Plan) -> PeriodMode {
    let orders: Vec<PeriodOrder> = plan.keys().map(period_order).collect();
    if orders.is_empty() {
        PeriodMode::Daily
    } else if orders.iter().all(|o| matches!(o, PeriodOrder::Date(_))) {
        PeriodMode::Monthly
    } else if orders.iter().all(|o| matches!(o, PeriodOrder::Weekday(_))) {
        PeriodMode::Weekly
    } else {
        PeriodMode::Daily
    }
}

/// Why one entry of a cross-period replacement was not applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    MissingSourcePeriod,
    MissingSourceSlot,
    MissingSlotId,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingSourcePeriod => write!(f, "source period not found"),
            SkipReason::MissingSourceSlot => write!(f, "source slot not found"),
            SkipReason::MissingSlotId => write!(f, "no slot id to copy into"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedReplacement {
    /// Position of the entry in the request.
    pub index: usize,
    pub reason: SkipReason,
}

/// Outcome of the most recent cross-period replacement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplaceReport {
    pub applied: usize,
    pub skipped: Vec<SkippedReplacement>,
}

impl ReplaceReport {
    pub fn all_skipped(&self) -> bool {
        self.applied == 0 && !self.skipped.is_empty()
    }
}

impl fmt::Display for ReplaceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} replacement(s) applied, {} skipped",
            self.applied,
            self.skipped.len()
        )?;
        for skipped in &self.skipped {
            write!(f, "\n  #{}: {}", skipped.index, skipped.reason)?;
        }
        Ok(())
    }
}
