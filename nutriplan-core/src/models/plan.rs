use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

use super::dish::Dish;
use super::period::{period_label, period_order};
use super::slot_kind::{slot_label, slot_priority, SlotKind};
use crate::dishes::flatten_dishes;
use crate::normalize::{normalize_day, normalize_plan, normalize_slot};

pub const DEFAULT_OPTION_ID: &str = "option_1";

/// One alternative within a slot. `content` is a dish list or an arbitrarily
/// nested composite of dish lists, single dishes and combos.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealOption {
    pub option_id: String,
    #[serde(default = "empty_content")]
    pub content: Value,
}

fn empty_content() -> Value {
    Value::Array(Vec::new())
}

impl MealOption {
    pub fn new(option_id: impl Into<String>) -> Self {
        Self {
            option_id: option_id.into(),
            content: empty_content(),
        }
    }

    pub fn with_content(mut self, content: Value) -> Self {
        self.content = if content.is_null() {
            empty_content()
        } else {
            content
        };
        self
    }

    pub fn dishes(&self) -> Vec<Dish> {
        flatten_dishes(&self.content)
    }
}

/// A meal occasion within a day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slot {
    pub slot_id: String,
    pub options: Vec<MealOption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_timing: Option<String>,
}

impl Slot {
    pub fn new(slot_id: impl Into<String>) -> Self {
        Self {
            slot_id: slot_id.into(),
            options: vec![MealOption::new(DEFAULT_OPTION_ID)],
            default_timing: None,
        }
    }

    /// Replaces the options. A slot always keeps at least one option.
    pub fn with_options(mut self, options: Vec<MealOption>) -> Self {
        self.options = if options.is_empty() {
            vec![MealOption::new(DEFAULT_OPTION_ID)]
        } else {
            options
        };
        self
    }

    pub fn with_default_timing(mut self, timing: impl Into<String>) -> Self {
        let timing = timing.into();
        self.default_timing = if timing.trim().is_empty() {
            None
        } else {
            Some(timing)
        };
        self
    }

    pub fn option(&self, option_id: &str) -> Option<&MealOption> {
        self.options.iter().find(|o| o.option_id == option_id)
    }

    pub fn option_mut(&mut self, option_id: &str) -> Option<&mut MealOption> {
        self.options.iter_mut().find(|o| o.option_id == option_id)
    }

    /// Returns the option with `option_id`, creating an empty one if missing.
    pub fn ensure_option(&mut self, option_id: &str) -> &mut MealOption {
        let index = match self.options.iter().position(|o| o.option_id == option_id) {
            Some(index) => index,
            None => {
                self.options.push(MealOption::new(option_id));
                self.options.len() - 1
            }
        };
        &mut self.options[index]
    }

    /// The representative option used for totals and validation.
    pub fn first_option(&self) -> Option<&MealOption> {
        self.options.first()
    }

    pub fn kind(&self) -> Option<SlotKind> {
        SlotKind::from_slot_id(&self.slot_id)
    }

    pub fn label(&self) -> String {
        slot_label(&self.slot_id)
    }

    /// Serving time for dishes saved without one: the slot's default timing,
    /// else the time of the first dish in the first option.
    pub fn fallback_time(&self) -> Option<String> {
        if let Some(timing) = self.default_timing.as_ref().filter(|t| !t.trim().is_empty()) {
            return Some(timing.clone());
        }
        self.first_option()
            .and_then(|option| option.dishes().into_iter().next())
            .and_then(|dish| dish.time())
    }
}

impl<'de> Deserialize<'de> for Slot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        Ok(normalize_slot(&raw))
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.default_timing {
            Some(timing) => writeln!(f, "{} ({})", self.label(), timing)?,
            None => writeln!(f, "{}", self.label())?,
        }
        for option in &self.options {
            let names: Vec<String> = option
                .dishes()
                .iter()
                .map(|dish| dish.name().unwrap_or_else(|| "?".to_string()))
                .collect();
            if names.is_empty() {
                writeln!(f, "  {}: (empty)", option.option_id)?;
            } else {
                writeln!(f, "  {}: {}", option.option_id, names.join(", "))?;
            }
        }
        Ok(())
    }
}

/// Stable sort of slots into serving order; unknown slot ids go last.
pub fn sort_by_priority(slots: &mut [Slot]) {
    slots.sort_by_key(|slot| slot_priority(&slot.slot_id));
}

/// The ordered slots of one period.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DayEntry {
    pub slots: Vec<Slot>,
}

impl DayEntry {
    pub fn new(slots: Vec<Slot>) -> Self {
        Self { slots }
    }

    /// A day holding every known slot, each with one empty option.
    pub fn template() -> Self {
        Self {
            slots: SlotKind::ALL
                .iter()
                .map(|kind| Slot::new(kind.slot_id()))
                .collect(),
        }
    }

    pub fn slot(&self, slot_id: &str) -> Option<&Slot> {
        self.slots.iter().find(|s| s.slot_id == slot_id)
    }

    pub fn slot_mut(&mut self, slot_id: &str) -> Option<&mut Slot> {
        self.slots.iter_mut().find(|s| s.slot_id == slot_id)
    }

    pub fn contains(&self, slot_id: &str) -> bool {
        self.slot(slot_id).is_some()
    }

    pub fn position(&self, slot_id: &str) -> Option<usize> {
        self.slots.iter().position(|s| s.slot_id == slot_id)
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl<'de> Deserialize<'de> for DayEntry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        Ok(normalize_day(&raw))
    }
}

impl fmt::Display for DayEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.slots.is_empty() {
            return writeln!(f, "(no slots)");
        }
        for slot in &self.slots {
            write!(f, "{}", slot)?;
        }
        Ok(())
    }
}

/// Period key to day entry, kept in insertion order until sorted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Plan {
    periods: Vec<(String, DayEntry)>,
}

impl Plan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(key: impl Into<String>, day: DayEntry) -> Self {
        Self {
            periods: vec![(key.into(), day)],
        }
    }

    /// A plan whose every period holds the default slot template.
    pub fn seeded<S: AsRef<str>>(keys: &[S]) -> Self {
        let mut plan = Self::new();
        for key in keys {
            plan.insert(key.as_ref(), DayEntry::template());
        }
        plan
    }

    pub fn get(&self, key: &str) -> Option<&DayEntry> {
        self.periods.iter().find(|(k, _)| k == key).map(|(_, d)| d)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut DayEntry> {
        self.periods
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, d)| d)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Replaces the day under `key` in place, or appends a new period.
    pub fn insert(&mut self, key: impl Into<String>, day: DayEntry) {
        let key = key.into();
        match self.get_mut(&key) {
            Some(existing) => *existing = day,
            None => self.periods.push((key, day)),
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<DayEntry> {
        let index = self.periods.iter().position(|(k, _)| k == key)?;
        Some(self.periods.remove(index).1)
    }

    /// Re-keys a period in place. Fails if `from` is missing or `to` is taken.
    pub fn rename(&mut self, from: &str, to: &str) -> bool {
        if from == to || self.contains(to) {
            return false;
        }
        match self.periods.iter_mut().find(|(k, _)| k == from) {
            Some(entry) => {
                entry.0 = to.to_string();
                true
            }
            None => false,
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.periods.iter().map(|(k, _)| k.as_str())
    }

    pub fn first_key(&self) -> Option<&str> {
        self.periods.first().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DayEntry)> {
        self.periods.iter().map(|(k, d)| (k.as_str(), d))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut DayEntry)> {
        self.periods.iter_mut().map(|(k, d)| (k.as_str(), d))
    }

    pub fn len(&self) -> usize {
        self.periods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    /// Orders periods: daily, weekdays, dates, numbered days, then the rest.
    pub fn sort_periods(&mut self) {
        self.periods.sort_by_key(|(k, _)| period_order(k));
    }
}

impl Serialize for Plan {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.periods.len()))?;
        for (key, day) in &self.periods {
            map.serialize_entry(key, day)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Plan {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        Ok(normalize_plan(&raw))
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.periods.is_empty() {
            return writeln!(f, "Empty plan.");
        }
        for (index, (key, day)) in self.periods.iter().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            let label = period_label(key, None);
            writeln!(f, "{}", label)?;
            writeln!(f, "{}", "=".repeat(label.chars().count()))?;
            write!(f, "{}", day)?;
        }
        Ok(())
    }
}
