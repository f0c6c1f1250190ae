use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Fields whose direct presence marks a map as a dish rather than structure.
pub const DISH_FIELDS: [&str; 13] = [
    "name",
    "dish_name",
    "dishName",
    "description",
    "time",
    "meal_time",
    "mealTime",
    "serving_size",
    "servingSize",
    "calories",
    "protein",
    "carbohydrates",
    "fats",
];

pub const NAME_FIELDS: [&str; 3] = ["name", "dish_name", "dishName"];
pub const TIME_FIELDS: [&str; 3] = ["time", "meal_time", "mealTime"];
const SERVING_FIELDS: [&str; 2] = ["serving_size", "servingSize"];

/// A dish leaf. Plans are schema-tolerant, so the dish keeps every field it
/// was stored with and resolves the recognised ones through their aliases.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dish(Map<String, Value>);

impl Dish {
    pub fn new(name: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert("name".to_string(), Value::String(name.into()));
        Self(fields)
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// True when `node` is a map exposing at least one dish field directly.
    pub fn is_dish(node: &Value) -> bool {
        node.as_object().is_some_and(is_dish_map)
    }

    pub fn from_value(node: &Value) -> Option<Self> {
        node.as_object()
            .filter(|fields| is_dish_map(fields))
            .map(|fields| Self(fields.clone()))
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn name(&self) -> Option<String> {
        first_text(&self.0, &NAME_FIELDS)
    }

    pub fn description(&self) -> Option<String> {
        first_text(&self.0, &["description"])
    }

    pub fn time(&self) -> Option<String> {
        first_text(&self.0, &TIME_FIELDS)
    }

    pub fn serving_size(&self) -> Option<String> {
        first_text(&self.0, &SERVING_FIELDS)
    }

    pub fn image(&self) -> Option<String> {
        first_text(&self.0, &["image", "img"])
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

fn is_dish_map(fields: &Map<String, Value>) -> bool {
    DISH_FIELDS.iter().any(|key| fields.contains_key(*key))
}

/// Renders a scalar as display text; empty strings and non-scalars are absent.
pub fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// First non-empty text value among `keys`, in order.
pub fn first_text(fields: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| fields.get(*key).and_then(as_text))
}

impl From<Dish> for Value {
    fn from(dish: Dish) -> Self {
        dish.into_value()
    }
}

impl fmt::Display for Dish {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.name().unwrap_or_else(|| "Unnamed dish".to_string());
        writeln!(f, "{}", name)?;
        writeln!(f, "{}", "=".repeat(name.chars().count()))?;

        if let Some(serving) = self.serving_size() {
            writeln!(f, "Serving: {}", serving)?;
        }
        if let Some(time) = self.time() {
            writeln!(f, "Time: {}", time)?;
        }
        if let Some(description) = self.description() {
            writeln!(f, "\n{}", description)?;
        }

        Ok(())
    }
}
