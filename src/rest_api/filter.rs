//! # Filter Predicates
//!
//! Typed filter conditions produced by the query translator and evaluated
//! by the document store.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use regex::Regex;
use serde_json::Value;

/// Comparison operators accepted in `field[op]=value` syntax
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterOperator {
    /// `gt`
    GreaterThan,
    /// `gte`
    GreaterOrEqual,
    /// `lt`
    LessThan,
    /// `lte`
    LessOrEqual,
    /// `in`
    In,
    /// `regex`, always a literal substring match
    Pattern,
}

impl FilterOperator {
    /// Every operator, in token order
    pub const ALL: [FilterOperator; 6] = [
        FilterOperator::GreaterThan,
        FilterOperator::GreaterOrEqual,
        FilterOperator::LessThan,
        FilterOperator::LessOrEqual,
        FilterOperator::In,
        FilterOperator::Pattern,
    ];

    /// Resolve a query-string token (`gt`, `gte`, ...) to an operator
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "gt" => Some(FilterOperator::GreaterThan),
            "gte" => Some(FilterOperator::GreaterOrEqual),
            "lt" => Some(FilterOperator::LessThan),
            "lte" => Some(FilterOperator::LessOrEqual),
            "in" => Some(FilterOperator::In),
            "regex" => Some(FilterOperator::Pattern),
            _ => None,
        }
    }

    /// Get the query-string token for this operator
    pub fn as_token(&self) -> &'static str {
        match self {
            FilterOperator::GreaterThan => "gt",
            FilterOperator::GreaterOrEqual => "gte",
            FilterOperator::LessThan => "lt",
            FilterOperator::LessOrEqual => "lte",
            FilterOperator::In => "in",
            FilterOperator::Pattern => "regex",
        }
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_token())
    }
}

/// Case-sensitive "contains" pattern built from an escaped literal.
///
/// Every metacharacter in the literal is escaped before compilation, so the
/// pattern only ever matches the literal text as a substring.
#[derive(Debug, Clone)]
pub struct ContainsPattern {
    literal: String,
    regex: Regex,
}

impl ContainsPattern {
    pub fn new(literal: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(&regex::escape(literal))?;
        Ok(Self {
            literal: literal.to_string(),
            regex,
        })
    }

    /// The unescaped text supplied by the caller
    pub fn literal(&self) -> &str {
        &self.literal
    }

    /// The escaped pattern source
    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    pub fn is_match(&self, haystack: &str) -> bool {
        self.regex.is_match(haystack)
    }
}

impl PartialEq for ContainsPattern {
    fn eq(&self, other: &Self) -> bool {
        self.literal == other.literal
    }
}

/// Operand carried by an operator predicate
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Scalar(Value),
    Set(Vec<Value>),
    Pattern(ContainsPattern),
}

/// A single field-level filter condition
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Literal equality (also used for pass-through object values)
    Equals(Value),
    /// Operator-tagged comparison
    Compare(FilterOperator, Operand),
}

impl Predicate {
    /// Check whether a field value (None = field absent) satisfies this predicate
    pub fn matches(&self, field_value: Option<&Value>) -> bool {
        let field_value = match field_value {
            Some(v) => v,
            // A missing field only equals null
            None => return matches!(self, Predicate::Equals(Value::Null)),
        };

        match self {
            Predicate::Equals(expected) => matches_any(field_value, |v| loose_eq(v, expected)),
            Predicate::Compare(FilterOperator::In, Operand::Set(set)) => {
                matches_any(field_value, |v| set.iter().any(|item| loose_eq(v, item)))
            }
            Predicate::Compare(FilterOperator::Pattern, Operand::Pattern(pattern)) => {
                matches_any(field_value, |v| v.as_str().is_some_and(|s| pattern.is_match(s)))
            }
            Predicate::Compare(op, Operand::Scalar(operand)) => matches_any(field_value, |v| {
                match compare_loose(v, operand) {
                    Some(ordering) => match op {
                        FilterOperator::GreaterThan => ordering == Ordering::Greater,
                        FilterOperator::GreaterOrEqual => ordering != Ordering::Less,
                        FilterOperator::LessThan => ordering == Ordering::Less,
                        FilterOperator::LessOrEqual => ordering != Ordering::Greater,
                        _ => false,
                    },
                    None => false,
                }
            }),
            // Operator/operand shapes the translator never builds
            Predicate::Compare(_, _) => false,
        }
    }
}

/// Field-path → predicates, AND-ed together
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    fields: BTreeMap<String, Vec<Predicate>>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style push
    pub fn and(mut self, field: impl Into<String>, predicate: Predicate) -> Self {
        self.push(field, predicate);
        self
    }

    pub fn push(&mut self, field: impl Into<String>, predicate: Predicate) {
        self.fields.entry(field.into()).or_default().push(predicate);
    }

    pub fn get(&self, field: &str) -> Option<&[Predicate]> {
        self.fields.get(field).map(Vec::as_slice)
    }

    pub fn contains_field(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &[Predicate])> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Check if a document matches every predicate
    pub fn matches(&self, doc: &Value) -> bool {
        self.fields.iter().all(|(path, predicates)| {
            let value = lookup_path(doc, path);
            predicates.iter().all(|p| p.matches(value))
        })
    }
}

/// Resolve a dot-separated path inside a document
pub fn lookup_path<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(doc, |current, segment| current.as_object()?.get(segment))
}

/// Arrays match when any element matches
fn matches_any(value: &Value, test: impl Fn(&Value) -> bool) -> bool {
    match value {
        Value::Array(items) => test(value) || items.iter().any(&test),
        _ => test(value),
    }
}

/// Equality that tolerates number/string representation differences
fn loose_eq(a: &Value, b: &Value) -> bool {
    if a == b {
        return true;
    }
    match (a, b) {
        (Value::Number(_), Value::Number(_)) => as_number(a) == as_number(b),
        (Value::String(s), Value::Number(_)) | (Value::Number(_), Value::String(s)) => {
            let number = if a.is_number() { a } else { b };
            s.parse::<f64>().ok() == as_number(number)
        }
        (Value::String(s), Value::Bool(flag)) | (Value::Bool(flag), Value::String(s)) => {
            s.parse::<bool>().ok() == Some(*flag)
        }
        _ => false,
    }
}

/// Ordering between a document value and an operand, when comparable
fn compare_loose(value: &Value, operand: &Value) -> Option<Ordering> {
    match (value, operand) {
        (Value::Number(_), Value::Number(_)) => {
            as_number(value)?.partial_cmp(&as_number(operand)?)
        }
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::String(s), Value::Number(_)) => {
            s.parse::<f64>().ok()?.partial_cmp(&as_number(operand)?)
        }
        (Value::Number(_), Value::String(s)) => {
            as_number(value)?.partial_cmp(&s.parse::<f64>().ok()?)
        }
        _ => None,
    }
}

fn as_number(value: &Value) -> Option<f64> {
    value.as_f64()
}
