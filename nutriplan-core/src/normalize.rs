//! Reconciles the plan shapes found in the wild into the canonical tree.
//!
//! Nothing in here fails. Input that matches no known shape becomes an empty
//! day or an empty plan, and normalizing canonical output again yields the
//! same value.

use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

use crate::models::{
    first_text, sort_by_priority, DayEntry, MealOption, NutrientTotals, Plan, Slot, SlotKind,
    DAILY_KEY, DEFAULT_OPTION_ID, DISH_FIELDS, NAME_FIELDS, TIME_FIELDS,
};
use crate::nutrition::{nutrient_source, parse_number, Macro};

/// Meal names of the oldest keyed day shape.
const LEGACY_MEAL_KEYS: [&str; 4] = ["breakfast", "lunch", "dinner", "snacks"];

/// Bookkeeping keys of a generated day that are not slots.
const GENERATED_IGNORED_KEYS: [&str; 4] = ["totals", "_id", "day", "date"];

const SLOT_ID_FIELDS: [&str; 3] = ["slot_id", "mealType", "type"];
const SLOT_TIMING_FIELDS: [&str; 2] = ["default_timing", "defaultMealTiming"];
const OPTION_ID_FIELDS: [&str; 3] = ["option_id", "optionType", "type"];
const OPTION_CONTENT_FIELDS: [&str; 3] = ["content", "dishes", "meals"];

/// The day shapes understood, in the order they are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayShape {
    /// A sequence of slot records.
    Canonical,
    /// `{ meals: [...] }` or `{ slots: [...] }` around a slot sequence.
    Wrapped,
    /// A generated day keyed by slot ids, possibly carrying `totals`.
    Generated,
    /// `{ breakfast, lunch, dinner, snacks }` dish lists.
    LegacyKeyed,
    Unrecognized,
}

pub fn detect_day_shape(raw: &Value) -> DayShape {
    match raw {
        Value::Array(_) => DayShape::Canonical,
        Value::Object(map) => {
            if wrapped_slots(map).is_some() {
                DayShape::Wrapped
            } else if is_generated_day(map) {
                DayShape::Generated
            } else if LEGACY_MEAL_KEYS.iter().any(|key| map.contains_key(*key)) {
                DayShape::LegacyKeyed
            } else {
                DayShape::Unrecognized
            }
        }
        _ => DayShape::Unrecognized,
    }
}

fn wrapped_slots(map: &Map<String, Value>) -> Option<&Vec<Value>> {
    ["meals", "slots"]
        .iter()
        .find_map(|key| map.get(*key).and_then(Value::as_array))
}

fn is_generated_day(map: &Map<String, Value>) -> bool {
    map.contains_key("totals")
        || map.iter().any(|(key, value)| {
            if LEGACY_MEAL_KEYS.contains(&key.as_str()) {
                value.is_object()
            } else {
                SlotKind::from_slot_id(key).is_some()
            }
        })
}

fn has_content(value: &Value) -> bool {
    match value {
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
        _ => false,
    }
}

/// Normalizes one day of any accepted shape.
pub fn normalize_day(raw: &Value) -> DayEntry {
    let shape = detect_day_shape(raw);
    let slots = match (shape, raw) {
        (DayShape::Canonical, Value::Array(items)) => slots_from_records(items),
        (DayShape::Wrapped, Value::Object(map)) => {
            wrapped_slots(map)
                .map(|items| slots_from_records(items))
                .unwrap_or_default()
        }
        (DayShape::Generated, Value::Object(map)) => generated_slots(map),
        (DayShape::LegacyKeyed, Value::Object(map)) => legacy_slots(map),
        _ => {
            debug!("unrecognized day shape, using an empty day");
            Vec::new()
        }
    };
    DayEntry::new(merge_duplicate_slots(slots))
}

fn slots_from_records(items: &[Value]) -> Vec<Slot> {
    items
        .iter()
        .filter(|item| {
            let keep = item.is_object();
            if !keep {
                debug!("skipping non-record slot entry");
            }
            keep
        })
        .map(normalize_slot)
        .collect()
}

fn generated_slots(map: &Map<String, Value>) -> Vec<Slot> {
    let mut slots: Vec<Slot> = map
        .iter()
        .filter(|(key, value)| {
            !GENERATED_IGNORED_KEYS.contains(&key.as_str()) && has_content(value)
        })
        .map(|(key, value)| {
            Slot::new(key.clone())
                .with_options(vec![MealOption::new(DEFAULT_OPTION_ID).with_content(value.clone())])
        })
        .collect();
    sort_by_priority(&mut slots);
    slots
}

fn legacy_slots(map: &Map<String, Value>) -> Vec<Slot> {
    LEGACY_MEAL_KEYS
        .iter()
        .filter_map(|key| {
            let dishes = map.get(*key).filter(|v| v.as_array().is_some_and(|a| !a.is_empty()))?;
            Some(
                Slot::new(*key)
                    .with_options(vec![MealOption::new(DEFAULT_OPTION_ID).with_content(dishes.clone())]),
            )
        })
        .collect()
}

/// Normalizes one slot record, accepting the persisted field names.
pub fn normalize_slot(raw: &Value) -> Slot {
    let Some(map) = raw.as_object() else {
        debug!("slot is not a record, using an empty slot");
        return Slot::new("");
    };

    let slot_id = first_text(map, &SLOT_ID_FIELDS).unwrap_or_default();
    let raw_options = ["options", "meals"]
        .iter()
        .find_map(|key| map.get(*key).and_then(Value::as_array))
        .map(|options| options.as_slice())
        .unwrap_or_default();

    let options: Vec<MealOption> = raw_options
        .iter()
        .enumerate()
        .map(|(index, option)| normalize_option(option, index))
        .collect();
    let mut options = repair_field_split(options);
    dedupe_option_ids(&mut options);

    let mut slot = Slot::new(slot_id).with_options(options);
    if let Some(timing) = first_text(map, &SLOT_TIMING_FIELDS) {
        slot = slot.with_default_timing(timing);
    }
    slot
}

/// Normalizes the option at `index` of a slot. Content is never null.
pub fn normalize_option(raw: &Value, index: usize) -> MealOption {
    let fallback_id = format!("option_{}", index + 1);
    let Some(map) = raw.as_object() else {
        return MealOption::new(fallback_id);
    };

    let option_id = first_text(map, &OPTION_ID_FIELDS).unwrap_or(fallback_id);
    let content = OPTION_CONTENT_FIELDS
        .iter()
        .find_map(|key| map.get(*key).filter(|v| v.is_array() || v.is_object()))
        .cloned()
        .unwrap_or_else(|| Value::Array(Vec::new()));
    MealOption::new(option_id).with_content(content)
}

fn dedupe_option_ids(options: &mut [MealOption]) {
    let mut taken: HashSet<String> = options.iter().map(|o| o.option_id.clone()).collect();
    let mut seen = HashSet::new();
    for option in options.iter_mut() {
        if seen.insert(option.option_id.clone()) {
            continue;
        }
        let fresh = (1..)
            .map(|n| format!("option_{}", n))
            .find(|id| !taken.contains(id))
            .unwrap_or_default();
        debug!(from = %option.option_id, to = %fresh, "renaming duplicate option id");
        taken.insert(fresh.clone());
        seen.insert(fresh.clone());
        option.option_id = fresh;
    }
}

fn merge_duplicate_slots(slots: Vec<Slot>) -> Vec<Slot> {
    let mut merged: Vec<Slot> = Vec::with_capacity(slots.len());
    for slot in slots {
        match merged.iter_mut().find(|s| s.slot_id == slot.slot_id) {
            Some(existing) => {
                debug!(slot_id = %slot.slot_id, "merging duplicate slot");
                existing.options.extend(slot.options);
                if existing.default_timing.is_none() {
                    existing.default_timing = slot.default_timing;
                }
                dedupe_option_ids(&mut existing.options);
            }
            None => merged.push(slot),
        }
    }
    merged
}

/// Canonical dish field and the option ids that carry it in a field-split slot.
const FIELD_SPLIT_SOURCES: [(&str, &[&str]); 9] = [
    ("name", &["name", "dish_name", "dishName"]),
    ("description", &["description"]),
    ("time", &["time", "meal_time", "mealTime"]),
    ("serving_size", &["serving_size", "servingSize"]),
    ("calories", &["calories"]),
    ("protein", &["protein"]),
    ("carbohydrates", &["carbohydrates"]),
    ("fats", &["fats"]),
    ("image", &["image"]),
];

fn is_field_key(option_id: &str) -> bool {
    option_id == "image" || DISH_FIELDS.contains(&option_id)
}

/// Rebuilds a single dish from a slot whose dish fields were each stored as
/// their own one-dish option.
fn repair_field_split(options: Vec<MealOption>) -> Vec<MealOption> {
    let looks_split = options.len() >= 4
        && options.iter().all(|option| {
            is_field_key(&option.option_id)
                && option.content.as_array().is_some_and(|dishes| dishes.len() == 1)
        });
    if !looks_split {
        return options;
    }

    let pick = |ids: &[&str]| -> Option<String> {
        ids.iter().find_map(|id| {
            options
                .iter()
                .find(|option| option.option_id == *id)
                .and_then(|option| option.content.get(0))
                .and_then(Value::as_object)
                .and_then(|dish| first_text(dish, &NAME_FIELDS))
        })
    };

    let mut dish = Map::new();
    for (field, ids) in FIELD_SPLIT_SOURCES {
        if let Some(value) = pick(ids) {
            dish.insert(field.to_string(), Value::String(value));
        }
    }
    debug!("rebuilt field-split slot into a single dish");
    vec![MealOption::new(DEFAULT_OPTION_ID).with_content(Value::Array(vec![Value::Object(dish)]))]
}

/// True when `raw` is a single day rather than a map of periods.
fn is_single_day(raw: &Value) -> bool {
    match raw {
        Value::Array(_) => true,
        Value::Object(map) => {
            wrapped_slots(map).is_some()
                || map.contains_key("totals")
                || map.keys().any(|key| SlotKind::from_slot_id(key).is_some())
        }
        _ => false,
    }
}

/// Normalizes a whole plan. A bare day becomes the single `daily` period.
pub fn normalize_plan(raw: &Value) -> Plan {
    if is_single_day(raw) {
        return Plan::single(DAILY_KEY, normalize_day(raw));
    }
    let Some(map) = raw.as_object() else {
        debug!("plan is not a map of periods, using an empty plan");
        return Plan::new();
    };

    let mut plan = Plan::new();
    for (key, day) in map {
        plan.insert(key.clone(), normalize_day(day));
    }
    plan.sort_periods();
    plan
}

/// Nutrient targets carried in a generated day's `totals` map.
pub fn day_targets(raw_day: &Value) -> Option<NutrientTotals> {
    let totals = raw_day.get("totals")?.as_object()?;
    let read = |nutrient: Macro| {
        totals
            .get(nutrient.field())
            .or_else(|| totals.get(nutrient.calories_alias()))
            .map(parse_number)
            .unwrap_or(0.0)
    };
    Some(NutrientTotals::new(
        read(Macro::Calories),
        read(Macro::Protein),
        read(Macro::Carbohydrates),
        read(Macro::Fats),
    ))
}

/// Targets per period key, for every period that carries them.
pub fn plan_targets(raw: &Value) -> BTreeMap<String, NutrientTotals> {
    let mut targets = BTreeMap::new();
    if is_single_day(raw) {
        if let Some(day) = day_targets(raw) {
            targets.insert(DAILY_KEY.to_string(), day);
        }
    } else if let Some(map) = raw.as_object() {
        for (key, day) in map {
            if let Some(day) = day_targets(day) {
                targets.insert(key.clone(), day);
            }
        }
    }
    targets
}

const DISH_ALIAS_FIELDS: [&str; 6] = [
    "dish_name",
    "dishName",
    "img",
    "meal_time",
    "mealTime",
    "servingSize",
];

/// Canonicalizes a dish about to be saved: one `name`, one `image`, direct
/// nutrient fields and a `time`, falling back to `default_time`.
pub fn normalize_dish_payload(payload: &Value, default_time: Option<&str>) -> Value {
    let source = payload.as_object().cloned().unwrap_or_default();
    let mut dish = source.clone();

    let name = first_text(&source, &["name", "dish_name", "dishName", "title"]).unwrap_or_default();
    dish.insert("name".to_string(), Value::String(name));

    if let Some(image) = first_text(&source, &["image", "img"]) {
        dish.insert("image".to_string(), Value::String(image));
    }

    if let Some(serving) = first_text(&source, &["serving_size", "servingSize"]) {
        dish.insert("serving_size".to_string(), Value::String(serving));
    }

    for nutrient in Macro::ALL {
        let value = nutrient_source(&source, nutrient)
            .cloned()
            .unwrap_or_else(|| Value::String(String::new()));
        dish.insert(nutrient.field().to_string(), value);
    }

    let time = first_text(&source, &TIME_FIELDS)
        .or_else(|| default_time.map(str::to_string))
        .unwrap_or_default();
    dish.insert("time".to_string(), Value::String(time));

    for alias in DISH_ALIAS_FIELDS {
        dish.shift_remove(alias);
    }
    Value::Object(dish)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ids(day: &DayEntry) -> Vec<&str> {
        day.slots.iter().map(|s| s.slot_id.as_str()).collect()
    }

    fn assert_idempotent(raw: Value) {
        let once = normalize_plan(&raw);
        let twice = normalize_plan(&serde_json::to_value(&once).unwrap());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_detect_day_shape() {
        assert_eq!(detect_day_shape(&json!([])), DayShape::Canonical);
        assert_eq!(detect_day_shape(&json!({"meals": []})), DayShape::Wrapped);
        assert_eq!(detect_day_shape(&json!({"breakfast": []})), DayShape::LegacyKeyed);
        assert_eq!(
            detect_day_shape(&json!({"when_you_wake_up": {"name": "Water"}})),
            DayShape::Generated
        );
        assert_eq!(
            detect_day_shape(&json!({"lunch": {"roti": []}})),
            DayShape::Generated
        );
        assert_eq!(detect_day_shape(&json!({"foo": 1})), DayShape::Unrecognized);
        assert_eq!(detect_day_shape(&json!("x")), DayShape::Unrecognized);
    }

    #[test]
    fn test_legacy_keyed_scenario() {
        let day = normalize_day(&json!({"breakfast": [{"name": "Oats"}], "lunch": []}));
        assert_eq!(ids(&day), vec!["breakfast"]);
        let slot = &day.slots[0];
        assert_eq!(slot.options.len(), 1);
        assert_eq!(slot.options[0].option_id, "option_1");
        let dishes = slot.options[0].dishes();
        assert_eq!(dishes.len(), 1);
        assert_eq!(dishes[0].name(), Some("Oats".to_string()));
    }

    #[test]
    fn test_persisted_field_names() {
        let day = normalize_day(&json!([{
            "mealType": "breakfast",
            "defaultMealTiming": "08:00",
            "meals": [
                {"optionType": "option_1", "dishes": [{"dish_name": "Poha"}]},
                {"dishes": [{"dish_name": "Upma"}]}
            ]
        }]));
        let slot = &day.slots[0];
        assert_eq!(slot.slot_id, "breakfast");
        assert_eq!(slot.default_timing.as_deref(), Some("08:00"));
        assert_eq!(slot.options[1].option_id, "option_2");
        assert_eq!(slot.options[1].dishes()[0].name(), Some("Upma".to_string()));
    }

    #[test]
    fn test_wrapped_day() {
        let day = normalize_day(&json!({"meals": [{"slot_id": "dinner", "options": []}]}));
        assert_eq!(ids(&day), vec!["dinner"]);
        assert_eq!(day.slots[0].options[0].content, json!([]));
    }

    #[test]
    fn test_malformed_options_default() {
        let day = normalize_day(&json!([{"slot_id": "lunch", "options": "nope"}, 7]));
        assert_eq!(day.slots.len(), 1);
        assert_eq!(day.slots[0].options.len(), 1);
        assert_eq!(day.slots[0].options[0].option_id, "option_1");

        let null_content = normalize_option(&json!({"option_id": "a", "content": null}), 0);
        assert_eq!(null_content.content, json!([]));
    }

    #[test]
    fn test_duplicate_ids_repaired() {
        let day = normalize_day(&json!([
            {"slot_id": "lunch", "options": [
                {"option_id": "option_1", "content": [{"name": "A"}]},
                {"option_id": "option_1", "content": [{"name": "B"}]}
            ]},
            {"slot_id": "lunch", "options": [{"option_id": "option_1", "content": [{"name": "C"}]}]}
        ]));
        assert_eq!(day.slots.len(), 1);
        let option_ids: Vec<&str> = day.slots[0]
            .options
            .iter()
            .map(|o| o.option_id.as_str())
            .collect();
        assert_eq!(option_ids, vec!["option_1", "option_2", "option_3"]);
    }

    #[test]
    fn test_generated_day_sorted_and_targets() {
        let raw = json!({
            "dinner": [{"name": "Soup"}],
            "totals": {"calories": 1800, "protein": "90", "carbs": 200, "fats": 60},
            "when_you_wake_up": {"name": "Warm water"},
            "lunch": {"salad_choose_any_1": [{"name": "Cucumber Salad"}], "roti": {"items": [{"name": "Phulka"}]}},
            "day": 1,
            "breakfast": []
        });
        let day = normalize_day(&raw);
        assert_eq!(ids(&day), vec!["when_you_wake_up", "lunch", "dinner"]);
        assert_eq!(day.slots[1].options[0].dishes().len(), 2);

        let targets = day_targets(&raw).unwrap();
        assert_eq!(targets.calories, 1800.0);
        assert_eq!(targets.protein, 90.0);
        assert_eq!(targets.carbohydrates, 200.0);
        assert!(day_targets(&json!({"lunch": []})).is_none());
    }

    #[test]
    fn test_field_split_repair() {
        let day = normalize_day(&json!([{
            "mealType": "breakfast",
            "meals": [
                {"optionType": "dish_name", "dishes": [{"dish_name": "Oats"}]},
                {"optionType": "meal_time", "dishes": [{"dish_name": "08:00"}]},
                {"optionType": "calories", "dishes": [{"dish_name": "300"}]},
                {"optionType": "protein", "dishes": [{"dish_name": "12"}]}
            ]
        }]));
        let slot = &day.slots[0];
        assert_eq!(slot.options.len(), 1);
        assert_eq!(
            slot.options[0].content,
            json!([{"name": "Oats", "time": "08:00", "calories": "300", "protein": "12"}])
        );
    }

    #[test]
    fn test_normalize_plan_single_day_and_periods() {
        let single = normalize_plan(&json!({"breakfast": [{"name": "Oats"}]}));
        assert_eq!(single.keys().collect::<Vec<_>>(), vec!["daily"]);

        let weekly = normalize_plan(&json!({
            "wed": [{"slot_id": "lunch"}],
            "mon": {"meals": [{"mealType": "dinner"}]},
            "sun": "garbage"
        }));
        assert_eq!(weekly.keys().collect::<Vec<_>>(), vec!["sun", "mon", "wed"]);
        assert!(weekly.get("sun").unwrap().is_empty());

        assert!(normalize_plan(&json!(42)).is_empty());
    }

    #[test]
    fn test_normalization_is_idempotent() {
        assert_idempotent(json!({"breakfast": [{"name": "Oats"}], "lunch": []}));
        assert_idempotent(json!({"meals": [{"mealType": "lunch", "meals": [{"dishes": []}, {"dishes": []}]}]}));
        assert_idempotent(json!({"day_1": {"lunch": {"roti": {"items": [{"name": "Phulka"}]}}, "totals": {}}}));
        assert_idempotent(json!({"02-11-2026": [], "30-10-2026": [{"slot_id": "x", "default_timing": "9:00"}]}));
        assert_idempotent(json!(null));
    }

    #[test]
    fn test_plan_targets() {
        let targets = plan_targets(&json!({
            "day_1": {"lunch": [], "totals": {"calories": 1500}},
            "day_2": {"lunch": []}
        }));
        assert_eq!(targets.len(), 1);
        assert_eq!(targets["day_1"].calories, 1500.0);
    }

    #[test]
    fn test_normalize_dish_payload() {
        let dish = normalize_dish_payload(
            &json!({
                "dish_name": "Paneer Bhurji",
                "img": "http://img/p.png",
                "calories": {"total": 320, "proteins": 18, "carbs": 6, "fats": 24},
                "meal_time": "",
                "measure": "1 plate"
            }),
            Some("13:00"),
        );
        assert_eq!(
            dish,
            json!({
                "name": "Paneer Bhurji",
                "image": "http://img/p.png",
                "calories": 320,
                "protein": 18,
                "carbohydrates": 6,
                "fats": 24,
                "measure": "1 plate",
                "time": "13:00"
            })
        );
    }

    #[test]
    fn test_normalize_dish_payload_keeps_own_time() {
        let dish = normalize_dish_payload(&json!({"name": "Tea", "time": "17:00"}), Some("08:00"));
        assert_eq!(dish["time"], json!("17:00"));
        assert_eq!(dish["calories"], json!(""));

        let empty = normalize_dish_payload(&json!(null), None);
        assert_eq!(empty["name"], json!(""));
        assert_eq!(empty["time"], json!(""));
    }
}
