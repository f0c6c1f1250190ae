use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::SessionState;
use crate::models::{canonical_key, DetailField, Plan, Slot, SlotKind};

/// Reasons a plan may not be finalized yet. Each names where to look.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} - for the meal plan is required!")]
    MissingDetail { field: DetailField },

    #[error("The meal plan has no days assigned!")]
    EmptyPlan,

    #[error("There are no plans assigned for the day - {period}!")]
    EmptyPeriod { period: String },

    #[error("On {period}, for {slot} at least one meal should be assigned!")]
    NoOptions { period: String, slot: String },

    #[error("On {period}, for {slot} at least one dish is required in {option}")]
    NoDishes {
        period: String,
        slot: String,
        option: String,
    },

    #[error("Time should be selected for all the meals. Not provided for {slot} on {period} ({option})")]
    MissingTime {
        period: String,
        slot: String,
        option: String,
    },

    #[error("Dish should be selected for all the meals. Not provided for {slot} on {period} ({option})")]
    MissingName {
        period: String,
        slot: String,
        option: String,
    },
}

/// Knobs for the pre-save check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationRules {
    /// Slots allowed to stay without dishes.
    pub flexible_slots: Vec<String>,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            flexible_slots: vec!["lunch".to_string(), "dinner".to_string()],
        }
    }
}

impl ValidationRules {
    pub fn with_flexible_slots(mut self, slots: Vec<String>) -> Self {
        self.flexible_slots = slots;
        self
    }

    /// Known slot kinds match through their aliases, other ids by name.
    pub fn is_flexible(&self, slot_id: &str) -> bool {
        let kind = SlotKind::from_slot_id(slot_id);
        self.flexible_slots.iter().any(|flexible| match kind {
            Some(kind) => SlotKind::from_slot_id(flexible) == Some(kind),
            None => canonical_key(flexible) == canonical_key(slot_id),
        })
    }
}

fn slot_name(slot: &Slot) -> String {
    if slot.slot_id.is_empty() {
        "First Meal Type".to_string()
    } else {
        slot.slot_id.clone()
    }
}

fn validate_slot(period: &str, slot: &Slot, rules: &ValidationRules) -> Result<(), ValidationError> {
    let name = slot_name(slot);
    let Some(first) = slot.first_option() else {
        return Err(ValidationError::NoOptions {
            period: period.to_string(),
            slot: name,
        });
    };
    if rules.is_flexible(&slot.slot_id) {
        return Ok(());
    }
    if first.dishes().is_empty() {
        return Err(ValidationError::NoDishes {
            period: period.to_string(),
            slot: name,
            option: first.option_id.clone(),
        });
    }

    let slot_has_timing = slot
        .default_timing
        .as_ref()
        .is_some_and(|t| !t.trim().is_empty());
    for option in &slot.options {
        for dish in option.dishes() {
            if dish.time().is_none() && !slot_has_timing {
                return Err(ValidationError::MissingTime {
                    period: period.to_string(),
                    slot: name,
                    option: option.option_id.clone(),
                });
            }
            if dish.name().is_none() {
                return Err(ValidationError::MissingName {
                    period: period.to_string(),
                    slot: name,
                    option: option.option_id.clone(),
                });
            }
        }
    }
    Ok(())
}

/// Checks the structure of a plan before it is saved.
pub fn validate_plan(plan: &Plan, rules: &ValidationRules) -> Result<(), ValidationError> {
    if plan.is_empty() {
        return Err(ValidationError::EmptyPlan);
    }
    for (period, day) in plan.iter() {
        if day.is_empty() {
            return Err(ValidationError::EmptyPeriod {
                period: period.to_string(),
            });
        }
        for slot in &day.slots {
            validate_slot(period, slot, rules)?;
        }
    }
    Ok(())
}

/// [`validate_plan`] plus the plan's title and description.
pub fn validate_session(state: &SessionState, rules: &ValidationRules) -> Result<(), ValidationError> {
    for field in [DetailField::Title, DetailField::Description] {
        if state.details.get(field).trim().is_empty() {
            return Err(ValidationError::MissingDetail { field });
        }
    }
    validate_plan(&state.plan, rules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DayEntry, MealOption, PlanDetails};
    use serde_json::json;

    fn plan_with(slot: Slot) -> Plan {
        Plan::single("mon", DayEntry::new(vec![slot]))
    }

    fn breakfast(content: serde_json::Value) -> Slot {
        Slot::new("breakfast").with_options(vec![MealOption::new("option_1").with_content(content)])
    }

    #[test]
    fn test_valid_plan() {
        let plan = plan_with(breakfast(json!([{"name": "Oats", "time": "08:00"}])));
        assert_eq!(validate_plan(&plan, &ValidationRules::default()), Ok(()));
    }

    #[test]
    fn test_empty_plan_and_period() {
        let rules = ValidationRules::default();
        assert_eq!(validate_plan(&Plan::new(), &rules), Err(ValidationError::EmptyPlan));

        let err = validate_plan(&Plan::single("tue", DayEntry::default()), &rules).unwrap_err();
        assert_eq!(
            err.to_string(),
            "There are no plans assigned for the day - tue!"
        );
    }

    #[test]
    fn test_no_dishes_names_slot_and_option() {
        let err = validate_plan(&plan_with(breakfast(json!([]))), &ValidationRules::default())
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::NoDishes {
                period: "mon".to_string(),
                slot: "breakfast".to_string(),
                option: "option_1".to_string(),
            }
        );
        assert_eq!(
            err.to_string(),
            "On mon, for breakfast at least one dish is required in option_1"
        );
    }

    #[test]
    fn test_flexible_slots_skip_dish_checks() {
        let rules = ValidationRules::default();
        assert!(validate_plan(&plan_with(Slot::new("lunch")), &rules).is_ok());
        assert!(validate_plan(&plan_with(Slot::new("night")), &rules).is_ok());

        let strict = ValidationRules::default().with_flexible_slots(Vec::new());
        assert!(validate_plan(&plan_with(Slot::new("lunch")), &strict).is_err());
    }

    #[test]
    fn test_missing_time_uses_slot_default() {
        let rules = ValidationRules::default();
        let plan = plan_with(breakfast(json!([{"name": "Oats"}])));
        assert!(matches!(
            validate_plan(&plan, &rules),
            Err(ValidationError::MissingTime { .. })
        ));

        let timed = plan_with(breakfast(json!([{"name": "Oats"}])).with_default_timing("08:00"));
        assert!(validate_plan(&timed, &rules).is_ok());
    }

    #[test]
    fn test_missing_name() {
        let plan = plan_with(breakfast(json!([{"time": "08:00", "calories": 100}])));
        assert!(matches!(
            validate_plan(&plan, &ValidationRules::default()),
            Err(ValidationError::MissingName { .. })
        ));
    }

    #[test]
    fn test_validate_session_details() {
        let mut state = SessionState::hydrate(&json!({
            "breakfast": [{"name": "Oats", "time": "08:00"}]
        }));
        let rules = ValidationRules::default();
        assert_eq!(
            validate_session(&state, &rules),
            Err(ValidationError::MissingDetail {
                field: DetailField::Title
            })
        );

        state = state.with_details(PlanDetails::new("Cut").with_description("Lean month"));
        assert_eq!(validate_session(&state, &rules), Ok(()));
    }
}
