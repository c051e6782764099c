//! Structured identity document handling.
//!
//! Documents are JSON objects. Updates are merged into the stored document
//! field by field: incoming fields overwrite, absent fields are preserved.
//! The identifier field is owned by the stored document and can never be
//! changed through a merge.

use crate::errors::{DraftError, Result};
use serde_json::{Map, Value};
use std::fmt;

/// Field carrying the language of a localized value
const LANGUAGE_FIELD: &str = "language";

/// Dotted path to a field inside a document, e.g. `identity.UIN`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentPath {
    segments: Vec<String>,
}

impl DocumentPath {
    /// Parse a dotted path. A leading `$.` is accepted and ignored.
    pub fn parse(path: &str) -> Option<Self> {
        let path = path.trim();
        let path = path.strip_prefix("$.").unwrap_or(path);
        let segments: Vec<String> = path.split('.').map(str::to_string).collect();

        if segments.iter().any(|s| s.is_empty()) {
            return None;
        }
        Some(Self { segments })
    }

    /// Path of the enclosing object, `None` for top-level fields
    pub fn parent(&self) -> Option<DocumentPath> {
        (self.segments.len() > 1).then(|| DocumentPath {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    pub fn get<'a>(&self, document: &'a Value) -> Option<&'a Value> {
        self.segments
            .iter()
            .try_fold(document, |node, segment| node.get(segment.as_str()))
    }

    /// Set the field, creating intermediate objects as needed
    pub fn set(&self, document: &mut Value, value: Value) {
        let (leaf, parents) = match self.segments.split_last() {
            Some(split) => split,
            None => return,
        };

        let mut node = document;
        for segment in parents {
            node = ensure_object(node)
                .entry(segment.clone())
                .or_insert_with(|| Value::Object(Map::new()));
        }
        ensure_object(node).insert(leaf.clone(), value);
    }

    /// Remove the field if present
    pub fn remove(&self, document: &mut Value) -> Option<Value> {
        let (leaf, parents) = self.segments.split_last()?;

        let mut node = document;
        for segment in parents {
            node = node.get_mut(segment.as_str())?;
        }
        node.as_object_mut()?.remove(leaf)
    }
}

impl fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

fn ensure_object(node: &mut Value) -> &mut Map<String, Value> {
    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    match node {
        Value::Object(map) => map,
        _ => unreachable!("node was just replaced with an object"),
    }
}

/// Lenient structural comparison.
///
/// Every field in `expected` must be present and equal in `actual`; extra
/// fields in `actual` are ignored. Arrays must have the same length but
/// element order does not matter.
pub fn lenient_matches(expected: &Value, actual: &Value) -> bool {
    match (expected, actual) {
        (Value::Object(expected), Value::Object(actual)) => expected.iter().all(|(key, value)| {
            actual
                .get(key)
                .map_or(false, |other| lenient_matches(value, other))
        }),
        (Value::Array(expected), Value::Array(actual)) => {
            if expected.len() != actual.len() {
                return false;
            }
            let mut used = vec![false; actual.len()];
            expected.iter().all(|item| {
                let found = actual
                    .iter()
                    .enumerate()
                    .find(|(i, other)| !used[*i] && lenient_matches(item, other))
                    .map(|(i, _)| i);
                match found {
                    Some(i) => {
                        used[i] = true;
                        true
                    }
                    None => false,
                }
            })
        }
        (Value::Number(expected), Value::Number(actual)) => {
            expected == actual || expected.as_f64() == actual.as_f64()
        }
        _ => expected == actual,
    }
}

/// Recursively merge `incoming` into `target`.
///
/// Objects merge key by key. Arrays of language-tagged objects merge by
/// language. Anything else is replaced.
pub fn merge_into(target: &mut Value, incoming: Value) {
    match incoming {
        Value::Object(fields) if target.is_object() => {
            if let Value::Object(existing) = target {
                for (key, value) in fields {
                    match existing.get_mut(&key) {
                        Some(slot) => merge_into(slot, value),
                        None => {
                            existing.insert(key, value);
                        }
                    }
                }
            }
        }
        Value::Array(items)
            if is_language_tagged(&items)
                && target.as_array().map_or(false, |t| is_language_tagged(t)) =>
        {
            if let Value::Array(existing) = target {
                merge_by_language(existing, items);
            }
        }
        other => *target = other,
    }
}

fn is_language_tagged(items: &[Value]) -> bool {
    !items.is_empty()
        && items
            .iter()
            .all(|item| item.get(LANGUAGE_FIELD).map_or(false, Value::is_string))
}

fn merge_by_language(existing: &mut Vec<Value>, incoming: Vec<Value>) {
    for item in incoming {
        let language = item.get(LANGUAGE_FIELD).cloned();
        match existing
            .iter()
            .position(|e| e.get(LANGUAGE_FIELD) == language.as_ref())
        {
            Some(pos) => existing[pos] = item,
            None => existing.push(item),
        }
    }
}

/// Applies updates to stored identity documents
#[derive(Debug, Clone)]
pub struct DocumentMerger {
    identifier_path: DocumentPath,
}

impl DocumentMerger {
    pub fn new(identifier_path: DocumentPath) -> Self {
        Self { identifier_path }
    }

    /// Minimal document carrying only the identifier
    pub fn identity_document(&self, identifier: &str) -> Value {
        let mut document = Value::Object(Map::new());
        self.identifier_path
            .set(&mut document, Value::String(identifier.to_string()));
        document
    }

    /// Object holding the identifier and the per-category identity fields
    pub fn identity_object<'a>(&self, document: &'a Value) -> Option<&'a Value> {
        match self.identifier_path.parent() {
            Some(parent) => parent.get(document),
            None => Some(document),
        }
    }

    /// Merge `incoming` into the serialized `stored` document.
    ///
    /// The identifier in `incoming` is replaced by the stored one, or removed
    /// when the stored document has none. Returns `None` when `incoming` is
    /// already contained in `stored`.
    pub fn merge(&self, stored: &[u8], incoming: &Value) -> Result<Option<Vec<u8>>> {
        let mut stored: Value = serde_json::from_slice(stored)?;
        if !stored.is_object() || !incoming.is_object() {
            return Err(DraftError::UnknownSerializationError(
                "identity document must be a JSON object".to_string(),
            ));
        }

        let mut incoming = incoming.clone();
        match self.identifier_path.get(&stored).cloned() {
            Some(identifier) => self.identifier_path.set(&mut incoming, identifier),
            None => {
                self.identifier_path.remove(&mut incoming);
            }
        }

        if lenient_matches(&incoming, &stored) {
            return Ok(None);
        }

        merge_into(&mut stored, incoming);
        Ok(Some(serde_json::to_vec(&stored)?))
    }
}
