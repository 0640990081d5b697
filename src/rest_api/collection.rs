//! # Collections
//!
//! The [`Collection`] capability consumed by the result assembler, and the
//! in-memory [`DocumentStore`] that backs it.
//!
//! Documents are JSON objects kept in insertion order per collection. Every
//! stored document carries a string `_id` and a `createdAt` RFC 3339
//! timestamp.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::errors::{RestError, RestResult};
use super::filter::{lookup_path, Filter};
use super::parser::{SortDirection, SortKey, DEFAULT_SORT_FIELD};

/// Identity field present on every stored document
pub const ID_FIELD: &str = "_id";

/// Read-only inlining of fields from a referenced collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expansion {
    /// Field holding the referenced id (or array of ids)
    pub path: String,

    /// Collection the id refers to
    pub from: String,

    /// Fields of the referenced document to inline (plus `_id`)
    pub select: Vec<String>,
}

impl Expansion {
    pub fn new(path: impl Into<String>, from: impl Into<String>, select: &[&str]) -> Self {
        Self {
            path: path.into(),
            from: from.into(),
            select: select.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Everything a collection needs to produce one page of records
#[derive(Debug, Clone, Copy)]
pub struct FindQuery<'a> {
    pub filter: &'a Filter,
    pub sort: &'a [SortKey],
    pub projection: Option<&'a BTreeSet<String>>,
    pub expand: &'a [Expansion],
    pub skip: u64,
    pub limit: u64,
}

/// Queryable set of records
pub trait Collection: Send + Sync {
    /// Collection name
    fn name(&self) -> &str;

    /// Number of records matching `filter`
    fn count(&self, filter: &Filter) -> RestResult<u64>;

    /// Filter, sort, window, project and expand
    fn find(&self, query: &FindQuery<'_>) -> RestResult<Vec<Value>>;
}

/// In-memory JSON document store
#[derive(Debug, Default)]
pub struct DocumentStore {
    collections: RwLock<HashMap<String, Vec<Value>>>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a [`Collection`] handle for `name`
    pub fn collection(self: &Arc<Self>, name: &str) -> CollectionHandle {
        CollectionHandle {
            store: Arc::clone(self),
            name: name.to_string(),
        }
    }

    fn read(&self) -> RestResult<RwLockReadGuard<'_, HashMap<String, Vec<Value>>>> {
        self.collections
            .read()
            .map_err(|_| RestError::DataAccess("document store lock poisoned".to_string()))
    }

    fn write(&self) -> RestResult<RwLockWriteGuard<'_, HashMap<String, Vec<Value>>>> {
        self.collections
            .write()
            .map_err(|_| RestError::DataAccess("document store lock poisoned".to_string()))
    }

    /// Insert a document, assigning `_id` and `createdAt` when absent
    pub fn insert(&self, collection: &str, doc: Value) -> RestResult<Value> {
        let doc = prepare_document(doc)?;
        let mut store = self.write()?;
        store
            .entry(collection.to_string())
            .or_default()
            .push(doc.clone());
        Ok(doc)
    }

    /// Import seed data shaped `{ "<collection>": [doc, ...], ... }`
    pub fn import(&self, seed: &Value) -> RestResult<usize> {
        let collections = seed
            .as_object()
            .ok_or_else(|| RestError::InvalidBody("seed data must be a JSON object".to_string()))?;

        let mut imported = 0;
        for (name, docs) in collections {
            let docs = docs.as_array().ok_or_else(|| {
                RestError::InvalidBody(format!("seed collection '{}' must be an array", name))
            })?;
            for doc in docs {
                self.insert(name, doc.clone())?;
                imported += 1;
            }
        }
        Ok(imported)
    }

    /// Look up a document by `_id`
    pub fn get(&self, collection: &str, id: &str) -> RestResult<Option<Value>> {
        let store = self.read()?;
        Ok(store
            .get(collection)
            .and_then(|docs| docs.iter().find(|d| has_id(d, id)))
            .cloned())
    }

    /// Look up a document by `_id` and apply expansions
    pub fn get_expanded(
        &self,
        collection: &str,
        id: &str,
        expand: &[Expansion],
    ) -> RestResult<Option<Value>> {
        let store = self.read()?;
        Ok(store
            .get(collection)
            .and_then(|docs| docs.iter().find(|d| has_id(d, id)))
            .map(|doc| expand_document(&store, doc.clone(), expand)))
    }

    /// All matching documents in insertion order
    pub fn find_all(&self, collection: &str, filter: &Filter) -> RestResult<Vec<Value>> {
        let store = self.read()?;
        Ok(store
            .get(collection)
            .map(|docs| docs.iter().filter(|d| filter.matches(d)).cloned().collect())
            .unwrap_or_default())
    }

    /// Shallow-merge `patch` into the document with `_id`; `_id` itself is kept
    pub fn update(
        &self,
        collection: &str,
        id: &str,
        patch: Map<String, Value>,
    ) -> RestResult<Option<Value>> {
        let mut store = self.write()?;
        let doc = match store
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|d| has_id(d, id)))
        {
            Some(doc) => doc,
            None => return Ok(None),
        };

        if let Some(fields) = doc.as_object_mut() {
            for (key, value) in patch {
                if key != ID_FIELD {
                    fields.insert(key, value);
                }
            }
        }
        Ok(Some(doc.clone()))
    }

    /// Delete the document with `_id`; returns whether it existed
    pub fn remove(&self, collection: &str, id: &str) -> RestResult<bool> {
        let mut store = self.write()?;
        let docs = match store.get_mut(collection) {
            Some(docs) => docs,
            None => return Ok(false),
        };
        let before = docs.len();
        docs.retain(|d| !has_id(d, id));
        Ok(docs.len() != before)
    }

    /// Number of documents in a collection
    pub fn len(&self, collection: &str) -> RestResult<usize> {
        Ok(self.read()?.get(collection).map_or(0, Vec::len))
    }
}

/// Handle to one collection of a shared [`DocumentStore`]
#[derive(Debug, Clone)]
pub struct CollectionHandle {
    store: Arc<DocumentStore>,
    name: String,
}

impl Collection for CollectionHandle {
    fn name(&self) -> &str {
        &self.name
    }

    fn count(&self, filter: &Filter) -> RestResult<u64> {
        let store = self.store.read()?;
        let count = store
            .get(&self.name)
            .map_or(0, |docs| docs.iter().filter(|d| filter.matches(d)).count());
        Ok(count as u64)
    }

    fn find(&self, query: &FindQuery<'_>) -> RestResult<Vec<Value>> {
        let store = self.store.read()?;
        let docs = match store.get(&self.name) {
            Some(docs) => docs,
            None => return Ok(Vec::new()),
        };

        let mut matched: Vec<&Value> = docs.iter().filter(|d| query.filter.matches(d)).collect();

        // Stable: ties keep insertion order
        matched.sort_by(|a, b| compare_documents(a, b, query.sort));

        let skip = usize::try_from(query.skip).unwrap_or(usize::MAX);
        let limit = usize::try_from(query.limit).unwrap_or(usize::MAX);

        Ok(matched
            .into_iter()
            .skip(skip)
            .take(limit)
            .map(|doc| {
                let doc = match query.projection {
                    Some(fields) => project(doc, fields),
                    None => doc.clone(),
                };
                expand_document(&store, doc, query.expand)
            })
            .collect())
    }
}

fn has_id(doc: &Value, id: &str) -> bool {
    doc.get(ID_FIELD).and_then(Value::as_str) == Some(id)
}

/// Validate the body shape and stamp identity fields
fn prepare_document(doc: Value) -> RestResult<Value> {
    let mut fields = match doc {
        Value::Object(fields) => fields,
        other => {
            return Err(RestError::InvalidBody(format!(
                "expected a JSON object, got {}",
                json_type_name(&other)
            )))
        }
    };

    match fields.get(ID_FIELD) {
        Some(Value::String(_)) => {}
        Some(Value::Number(n)) => {
            let id = n.to_string();
            fields.insert(ID_FIELD.to_string(), Value::String(id));
        }
        _ => {
            fields.insert(
                ID_FIELD.to_string(),
                Value::String(Uuid::new_v4().to_string()),
            );
        }
    }

    if !fields.contains_key(DEFAULT_SORT_FIELD) {
        fields.insert(
            DEFAULT_SORT_FIELD.to_string(),
            Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)),
        );
    }

    Ok(Value::Object(fields))
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Compare two documents over every sort key in order
fn compare_documents(a: &Value, b: &Value, sort: &[SortKey]) -> Ordering {
    for key in sort {
        let ordering = compare_values(lookup_path(a, &key.field), lookup_path(b, &key.field));
        let ordering = match key.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

/// Sort ordering: missing < null < bool < number < string < array < object
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a_val), Some(b_val)) => {
            let type_order = |v: &Value| -> u8 {
                match v {
                    Value::Null => 0,
                    Value::Bool(_) => 1,
                    Value::Number(_) => 2,
                    Value::String(_) => 3,
                    Value::Array(_) => 4,
                    Value::Object(_) => 5,
                }
            };

            match type_order(a_val).cmp(&type_order(b_val)) {
                Ordering::Equal => match (a_val, b_val) {
                    (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
                    (Value::Number(a), Value::Number(b)) => a
                        .as_f64()
                        .unwrap_or(0.0)
                        .partial_cmp(&b.as_f64().unwrap_or(0.0))
                        .unwrap_or(Ordering::Equal),
                    (Value::String(a), Value::String(b)) => compare_strings(a, b),
                    _ => Ordering::Equal,
                },
                other => other,
            }
        }
    }
}

/// RFC 3339 timestamps compare as instants, so `12:00:00Z` and
/// `12:00:00.250000Z` order by time rather than by text
fn compare_strings(a: &str, b: &str) -> Ordering {
    match (DateTime::parse_from_rfc3339(a), DateTime::parse_from_rfc3339(b)) {
        (Ok(a_ts), Ok(b_ts)) => a_ts.cmp(&b_ts),
        _ => a.cmp(b),
    }
}

/// Keep `_id` plus the selected (possibly dotted) fields
fn project(doc: &Value, fields: &BTreeSet<String>) -> Value {
    let mut out = Map::new();
    if let Some(id) = doc.get(ID_FIELD) {
        out.insert(ID_FIELD.to_string(), id.clone());
    }
    for field in fields {
        if let Some(value) = lookup_path(doc, field) {
            insert_path(&mut out, field, value.clone());
        }
    }
    Value::Object(out)
}

fn insert_path(target: &mut Map<String, Value>, path: &str, value: Value) {
    match path.split_once('.') {
        None => {
            target.insert(path.to_string(), value);
        }
        Some((head, rest)) => {
            let child = target
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if let Some(child) = child.as_object_mut() {
                insert_path(child, rest, value);
            }
        }
    }
}

/// Replace referenced ids with the referenced documents' selected fields
fn expand_document(
    store: &HashMap<String, Vec<Value>>,
    mut doc: Value,
    expand: &[Expansion],
) -> Value {
    for expansion in expand {
        let related = match store.get(&expansion.from) {
            Some(related) => related,
            None => continue,
        };
        let resolve = |reference: &Value| -> Option<Value> {
            let id = reference.as_str()?;
            let target = related.iter().find(|d| has_id(d, id))?;
            let select: BTreeSet<String> = expansion.select.iter().cloned().collect();
            Some(project(target, &select))
        };

        let Some(fields) = doc.as_object_mut() else {
            break;
        };
        let Some(reference) = fields.get(&expansion.path) else {
            continue;
        };

        let expanded = match reference {
            Value::Array(ids) => Value::Array(
                ids.iter()
                    .map(|id| resolve(id).unwrap_or_else(|| id.clone()))
                    .collect(),
            ),
            single => match resolve(single) {
                Some(found) => found,
                None => continue,
            },
        };
        fields.insert(expansion.path.clone(), expanded);
    }
    doc
}
