//! Calorie and macro aggregation over schema-tolerant dishes.
//!
//! Totals are plain sums of whatever values the dishes already carry. A
//! nutrient can live directly on the dish, inside the dish's `calories`
//! map under an alias, or as the `total` of its own map.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::{DayEntry, Dish, MealOption, NutrientTotals, Slot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Macro {
    Calories,
    Protein,
    Carbohydrates,
    Fats,
}

impl Macro {
    pub const ALL: [Macro; 4] = [
        Macro::Calories,
        Macro::Protein,
        Macro::Carbohydrates,
        Macro::Fats,
    ];

    /// The dish field carrying this nutrient.
    pub fn field(&self) -> &'static str {
        match self {
            Macro::Calories => "calories",
            Macro::Protein => "protein",
            Macro::Carbohydrates => "carbohydrates",
            Macro::Fats => "fats",
        }
    }

    /// Key of this nutrient inside a dish's `calories` map.
    pub fn calories_alias(&self) -> &'static str {
        match self {
            Macro::Calories => "total",
            Macro::Protein => "proteins",
            Macro::Carbohydrates => "carbs",
            Macro::Fats => "fats",
        }
    }

    /// Energy per gram, used for the macro split.
    fn kcal_per_gram(&self) -> f64 {
        match self {
            Macro::Calories => 0.0,
            Macro::Protein | Macro::Carbohydrates => 4.0,
            Macro::Fats => 9.0,
        }
    }
}

/// Parses the leading number of a value. Thousands separators are ignored
/// and trailing units dropped; anything without a leading number is 0.
pub fn parse_number(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()).unwrap_or(0.0),
        Value::String(s) => parse_leading_number(&s.replace(',', "")),
        _ => 0.0,
    }
}

fn parse_leading_number(text: &str) -> f64 {
    let text = text.trim_start();
    let bytes = text.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'-') | Some(b'+')) {
        end += 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        if frac_end > frac_start {
            digits += frac_end - frac_start;
            end = frac_end;
        }
    }

    if digits == 0 {
        return 0.0;
    }
    text[..end]
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

fn is_scalar(value: &Value) -> bool {
    matches!(value, Value::Number(_) | Value::String(_) | Value::Bool(_))
}

/// Null and blank strings count as absent.
fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        _ => true,
    }
}

/// Finds the raw value a nutrient comes from, in order: the direct scalar
/// field, the alias inside the `calories` map, the direct field's own `total`.
pub fn nutrient_source(fields: &Map<String, Value>, nutrient: Macro) -> Option<&Value> {
    let direct = fields.get(nutrient.field()).filter(|v| is_present(v));

    if let Some(value) = direct.filter(|v| is_scalar(v)) {
        return Some(value);
    }
    if let Some(value) = fields
        .get("calories")
        .filter(|v| v.is_object())
        .and_then(|calories| calories.get(nutrient.calories_alias()))
        .filter(|v| is_present(v))
    {
        return Some(value);
    }
    direct
        .and_then(|value| value.get("total"))
        .filter(|v| is_present(v))
}

pub fn resolve_nutrient(dish: &Dish, nutrient: Macro) -> f64 {
    nutrient_source(dish.fields(), nutrient)
        .map(parse_number)
        .unwrap_or(0.0)
}

pub fn dish_nutrients(dish: &Dish) -> NutrientTotals {
    NutrientTotals::new(
        resolve_nutrient(dish, Macro::Calories),
        resolve_nutrient(dish, Macro::Protein),
        resolve_nutrient(dish, Macro::Carbohydrates),
        resolve_nutrient(dish, Macro::Fats),
    )
}

pub fn sum_nutrients(dishes: &[Dish]) -> NutrientTotals {
    dishes.iter().map(dish_nutrients).sum()
}

pub fn option_totals(option: &MealOption) -> NutrientTotals {
    sum_nutrients(&option.dishes())
}

/// Representative totals of a slot: its first option only.
pub fn slot_totals(slot: &Slot) -> NutrientTotals {
    slot.first_option().map(option_totals).unwrap_or_default()
}

pub fn day_totals(day: &DayEntry) -> NutrientTotals {
    day.slots.iter().map(slot_totals).sum()
}

/// What is left of `targets` once `actual` is eaten, per nutrient.
pub fn pending(targets: &NutrientTotals, actual: &NutrientTotals) -> NutrientTotals {
    *targets - *actual
}

/// Share of energy coming from protein, carbohydrates and fats, in whole
/// percent. All zero when there is no macro energy at all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacroSplit {
    pub protein: u32,
    pub carbohydrates: u32,
    pub fats: u32,
}

pub fn energy_split(totals: &NutrientTotals) -> MacroSplit {
    let protein = totals.protein.max(0.0) * Macro::Protein.kcal_per_gram();
    let carbohydrates = totals.carbohydrates.max(0.0) * Macro::Carbohydrates.kcal_per_gram();
    let fats = totals.fats.max(0.0) * Macro::Fats.kcal_per_gram();
    let energy = protein + carbohydrates + fats;
    if energy <= 0.0 {
        return MacroSplit::default();
    }
    let percent = |part: f64| (part / energy * 100.0).round() as u32;
    MacroSplit {
        protein: percent(protein),
        carbohydrates: percent(carbohydrates),
        fats: percent(fats),
    }
}
