use clap::{Args, Subcommand};
use nutriplan_core::models::{period_label, NutrientTotals, Plan, PlanDetails};
use nutriplan_core::{
    apply, day_totals, normalize_plan, pending, plan_targets, slot_totals, validate_plan,
    validate_session, Intent, SessionState,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

use super::{CommandError, OutputFormat};
use crate::config::Config;
use crate::input::{read_as, read_json};

#[derive(Args)]
pub struct PlanCommand {
    #[command(subcommand)]
    pub command: PlanSubcommand,
}

#[derive(Subcommand)]
pub enum PlanSubcommand {
    /// Print a plan of any accepted shape in canonical form
    Normalize {
        /// Plan file (JSON)
        file: PathBuf,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show nutrient totals per slot and per period
    Totals {
        /// Plan file (JSON)
        file: PathBuf,

        /// Only this period
        #[arg(long, short)]
        period: Option<String>,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Check that a plan is complete enough to be saved
    Validate {
        /// Plan file (JSON)
        file: PathBuf,

        /// Plan title; checked together with the description when given
        #[arg(long)]
        title: Option<String>,

        /// Plan description
        #[arg(long)]
        description: Option<String>,
    },

    /// Apply a list of editing intents and print the resulting plan
    Edit {
        /// Plan file (JSON)
        file: PathBuf,

        /// JSON array of intents
        #[arg(long, short)]
        intents: PathBuf,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

#[derive(Debug, Serialize)]
struct SlotTotals {
    slot_id: String,
    label: String,
    totals: NutrientTotals,
}

#[derive(Debug, Serialize)]
struct PeriodTotals {
    period: String,
    label: String,
    slots: Vec<SlotTotals>,
    total: NutrientTotals,
    #[serde(skip_serializing_if = "Option::is_none")]
    targets: Option<NutrientTotals>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pending: Option<NutrientTotals>,
}

impl std::fmt::Display for PeriodTotals {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.label)?;
        writeln!(f, "{}", "-".repeat(self.label.chars().count()))?;
        for slot in &self.slots {
            writeln!(f, "  {:20} {}", slot.label, slot.totals)?;
        }
        writeln!(f, "  {:20} {}", "Total", self.total)?;
        if let Some(targets) = &self.targets {
            writeln!(f, "  {:20} {}", "Target", targets)?;
        }
        if let Some(pending) = &self.pending {
            writeln!(f, "  {:20} {}", "Pending", pending)?;
        }
        Ok(())
    }
}

/// Totals for every period of `plan`, or only `only` when given.
fn period_totals(
    plan: &Plan,
    targets: &BTreeMap<String, NutrientTotals>,
    only: Option<&str>,
) -> Result<Vec<PeriodTotals>, CommandError> {
    if let Some(key) = only {
        if !plan.contains(key) {
            return Err(CommandError::UnknownPeriod(key.to_string()));
        }
    }

    Ok(plan
        .iter()
        .filter(|(key, _)| only.map_or(true, |only| only == *key))
        .map(|(key, day)| {
            let total = day_totals(day);
            let target = targets.get(key).copied();
            PeriodTotals {
                period: key.to_string(),
                label: period_label(key, None),
                slots: day
                    .slots
                    .iter()
                    .map(|slot| SlotTotals {
                        slot_id: slot.slot_id.clone(),
                        label: slot.label(),
                        totals: slot_totals(slot),
                    })
                    .collect(),
                total,
                targets: target,
                pending: target.map(|target| pending(&target, &total)),
            }
        })
        .collect())
}

impl PlanCommand {
    pub fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            PlanSubcommand::Normalize { file, format } => {
                let plan = normalize_plan(&read_json(file)?);
                match format {
                    OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&plan)?),
                    OutputFormat::Text => print!("{}", plan),
                }
                Ok(())
            }

            PlanSubcommand::Totals {
                file,
                period,
                format,
            } => {
                let raw = read_json(file)?;
                let plan = normalize_plan(&raw);
                let totals = period_totals(&plan, &plan_targets(&raw), period.as_deref())?;
                match format {
                    OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&totals)?),
                    OutputFormat::Text => {
                        for (index, period) in totals.iter().enumerate() {
                            if index > 0 {
                                println!();
                            }
                            print!("{}", period);
                        }
                    }
                }
                Ok(())
            }

            PlanSubcommand::Validate {
                file,
                title,
                description,
            } => {
                let raw = read_json(file)?;
                let rules = config.validation_rules();
                if title.is_some() || description.is_some() {
                    let details = PlanDetails::new(title.clone().unwrap_or_default())
                        .with_description(description.clone().unwrap_or_default());
                    let state = SessionState::hydrate(&raw).with_details(details);
                    validate_session(&state, &rules)?;
                } else {
                    validate_plan(&normalize_plan(&raw), &rules)?;
                }
                println!("Plan is valid");
                Ok(())
            }

            PlanSubcommand::Edit {
                file,
                intents,
                format,
            } => {
                let state = SessionState::hydrate(&read_json(file)?);
                let intents: Vec<Intent> = read_as(intents)?;
                tracing::info!(count = intents.len(), "applying intents");

                let state = intents
                    .iter()
                    .fold(state, |state, intent| apply(&state, intent));

                match format {
                    OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&state.plan)?),
                    OutputFormat::Text => {
                        print!("{}", state.plan);
                        if let Some(report) = &state.last_replace {
                            println!("\n{}", report);
                        }
                    }
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_period_totals_with_targets() {
        let raw = json!({
            "day_1": {
                "breakfast": [{"name": "Oats", "calories": "1,200", "protein": 30}],
                "lunch": [{"name": "Dal", "calories": {"total": 300, "proteins": 10}}],
                "totals": {"calories": 1600, "protein": 50}
            }
        });
        let plan = normalize_plan(&raw);
        let totals = period_totals(&plan, &plan_targets(&raw), None).unwrap();

        assert_eq!(totals.len(), 1);
        let day = &totals[0];
        assert_eq!(day.slots.len(), 2);
        assert_eq!(day.total.calories, 1500.0);
        assert_eq!(day.total.protein, 40.0);
        let pending = day.pending.unwrap();
        assert_eq!(pending.calories, 100.0);
        assert_eq!(pending.protein, 10.0);
    }

    #[test]
    fn test_period_totals_filter() {
        let plan = normalize_plan(&json!({
            "mon": {"breakfast": [{"name": "Oats", "calories": 300}]},
            "tue": {"breakfast": [{"name": "Poha", "calories": 250}]}
        }));
        let targets = BTreeMap::new();

        let tue = period_totals(&plan, &targets, Some("tue")).unwrap();
        assert_eq!(tue.len(), 1);
        assert_eq!(tue[0].label, "Tuesday");
        assert!(tue[0].pending.is_none());

        let err = period_totals(&plan, &targets, Some("sun")).unwrap_err();
        assert_eq!(err.to_string(), "Period not found: sun");
    }

    #[test]
    fn test_period_totals_display() {
        let plan = normalize_plan(&json!({"breakfast": [{"name": "Oats", "calories": 300}]}));
        let totals = period_totals(&plan, &BTreeMap::new(), None).unwrap();
        let text = totals[0].to_string();
        assert!(text.starts_with("Daily\n-----\n"));
        assert!(text.contains("Breakfast"));
        assert!(text.contains("Total"));
    }
}
