mod details;
mod dish;
mod nutrient;
mod period;
mod plan;
mod slot_kind;

pub use details::{DetailField, PlanDetails};
pub use dish::{as_text, first_text, Dish, DISH_FIELDS, NAME_FIELDS, TIME_FIELDS};
pub use nutrient::{one_decimal, NutrientTotals};
pub use period::{
    format_date_key, format_range_date, parse_date_key, period_label, period_order, PeriodMode,
    PeriodOrder, DAILY_KEY, DATE_KEY_FORMAT, WEEKDAY_KEYS,
};
pub use plan::{sort_by_priority, DayEntry, MealOption, Plan, Slot, DEFAULT_OPTION_ID};
pub use slot_kind::{canonical_key, slot_label, slot_priority, SlotKind};
