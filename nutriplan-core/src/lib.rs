//! Nutriplan Core Library
//!
//! The nested meal-plan model with its normalizer, path-addressed edits,
//! nutrient aggregation, editing session and printable layout.

pub mod dishes;
pub mod models;
pub mod normalize;
pub mod nutrition;
pub mod path;
pub mod render;
pub mod session;

pub use dishes::{count_dishes, flatten_dishes, locate_dishes};
pub use models::{
    DayEntry, DetailField, Dish, MealOption, NutrientTotals, PeriodMode, Plan, PlanDetails, Slot,
    SlotKind,
};
pub use normalize::{normalize_dish_payload, normalize_plan, plan_targets};
pub use nutrition::{day_totals, option_totals, pending, slot_totals, sum_nutrients};
pub use path::{Path, PathSegment};
pub use render::{render, CategoryTable, LayoutOptions, PageSection, PlanDocument};
pub use session::{
    apply, apply_at, validate_plan, validate_session, Intent, SessionState, ValidationError,
    ValidationRules,
};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
