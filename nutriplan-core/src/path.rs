//! Copy-on-write access to nodes at arbitrary depth of a plan tree.
//!
//! Every operation takes the tree by reference and returns a new tree. A path
//! that does not resolve leaves the tree unchanged; nothing here panics or
//! grows a sequence to fit an index.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    Index(usize),
    Key(String),
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(key.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        PathSegment::Key(key)
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Index(i) => write!(f, "[{}]", i),
            PathSegment::Key(k) => write!(f, ".{}", k),
        }
    }
}

/// Keys and indices leading from an option's content root to a node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path(Vec<PathSegment>);

impl Path {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn new(segments: Vec<PathSegment>) -> Self {
        Self(segments)
    }

    /// Returns a copy of this path extended by one segment.
    pub fn child(&self, segment: impl Into<PathSegment>) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        Self(segments)
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<PathSegment>> FromIterator<S> for Path {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "$")?;
        for segment in &self.0 {
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

fn step<'a>(node: &'a Value, segment: &PathSegment) -> Option<&'a Value> {
    match (segment, node) {
        (PathSegment::Index(i), Value::Array(items)) => items.get(*i),
        (PathSegment::Key(k), Value::Object(map)) => map.get(k),
        _ => None,
    }
}

pub fn get<'a>(node: &'a Value, path: &Path) -> Option<&'a Value> {
    path.segments()
        .iter()
        .try_fold(node, |current, segment| step(current, segment))
}

/// Returns a new tree with the node at `path` replaced by `updater(node)`.
pub fn update<F>(node: &Value, path: &Path, updater: F) -> Value
where
    F: FnOnce(&Value) -> Value,
{
    rebuild(node, path.segments(), updater).unwrap_or_else(|| {
        debug!(path = %path, "path does not resolve, tree left unchanged");
        node.clone()
    })
}

fn rebuild<F>(node: &Value, segments: &[PathSegment], updater: F) -> Option<Value>
where
    F: FnOnce(&Value) -> Value,
{
    let Some((head, rest)) = segments.split_first() else {
        return Some(updater(node));
    };

    match (head, node) {
        (PathSegment::Index(i), Value::Array(items)) => {
            let child = rebuild(items.get(*i)?, rest, updater)?;
            let mut items = items.clone();
            items[*i] = child;
            Some(Value::Array(items))
        }
        (PathSegment::Key(k), Value::Object(map)) => {
            let child = rebuild(map.get(k)?, rest, updater)?;
            let mut map = map.clone();
            map.insert(k.clone(), child);
            Some(Value::Object(map))
        }
        _ => None,
    }
}

/// Removes the node at `path`. The root itself cannot be deleted.
pub fn delete(node: &Value, path: &Path) -> Value {
    let Some((last, parent)) = path.segments().split_last() else {
        return node.clone();
    };

    update(node, &Path::new(parent.to_vec()), |target| match (last, target) {
        (PathSegment::Index(i), Value::Array(items)) if *i < items.len() => {
            let mut items = items.clone();
            items.remove(*i);
            Value::Array(items)
        }
        (PathSegment::Key(k), Value::Object(map)) => {
            let mut map = map.clone();
            map.shift_remove(k);
            Value::Object(map)
        }
        _ => target.clone(),
    })
}

/// Appends `value` to the sequence at `path`, or merges a map `value` into
/// the map at `path`. Other targets are left as they are.
pub fn append_at(node: &Value, path: &Path, value: Value) -> Value {
    update(node, path, |target| match (target, value) {
        (Value::Array(items), value) => {
            let mut items = items.clone();
            items.push(value);
            Value::Array(items)
        }
        (Value::Object(map), Value::Object(extra)) => {
            let mut map = map.clone();
            map.extend(extra);
            Value::Object(map)
        }
        (target, _) => target.clone(),
    })
}
