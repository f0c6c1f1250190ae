//! Finding dish leaves inside option content of any shape.

use serde_json::Value;

use crate::models::Dish;
use crate::path::Path;

/// True for a combo wrapper: a map whose `items` is a sequence.
pub fn is_combo(node: &Value) -> bool {
    node.get("items").is_some_and(Value::is_array)
}

/// Every dish under `content`, depth first, in document order.
pub fn flatten_dishes(content: &Value) -> Vec<Dish> {
    locate_dishes(content)
        .into_iter()
        .map(|(_, dish)| dish)
        .collect()
}

/// Every dish under `content` together with the path that addresses it.
pub fn locate_dishes(content: &Value) -> Vec<(Path, Dish)> {
    let mut found = Vec::new();
    walk(content, Path::root(), &mut found);
    found
}

fn walk(node: &Value, path: Path, found: &mut Vec<(Path, Dish)>) {
    match node {
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                walk(item, path.child(index), found);
            }
        }
        Value::Object(map) => {
            if let Some(dish) = Dish::from_value(node) {
                found.push((path, dish));
            } else if is_combo(node) {
                walk(&map["items"], path.child("items"), found);
            } else {
                for (key, value) in map {
                    walk(value, path.child(key.as_str()), found);
                }
            }
        }
        _ => {}
    }
}

/// Number of dishes under `content`.
pub fn count_dishes(content: &Value) -> usize {
    locate_dishes(content).len()
}
