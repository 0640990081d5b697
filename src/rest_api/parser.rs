//! # Query Translator
//!
//! Translates raw REST query parameters into a structured [`QueryPlan`]:
//! a filter, a sort order, an optional field projection and a page window.
//!
//! Supported syntax:
//!
//! ```text
//! field=value            equality
//! field[gt]=v            gt | gte | lt | lte
//! field[in]=a,b          set membership
//! field[regex]=v         literal substring match
//! field={gte:5,lt:9}     object form of the operators above
//! field_nested=v         filters on `field.nested`
//! select=a,b  sort=a,-b  page=N  limit=N
//! ```
//!
//! Translation is pure; no I/O happens here.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use serde_json::{Map, Value};

use super::errors::{RestError, RestResult};
use super::filter::{ContainsPattern, Filter, FilterOperator, Operand, Predicate};

/// Page used when `page` is missing or invalid
pub const DEFAULT_PAGE: u64 = 1;

/// Page size used when `limit` is missing or invalid
pub const DEFAULT_LIMIT: u64 = 25;

/// Sort field used when `sort` is missing
pub const DEFAULT_SORT_FIELD: &str = "createdAt";

/// Query keys that control the result shape and never filter rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReservedKey {
    Select,
    Sort,
    Page,
    Limit,
}

impl ReservedKey {
    pub const ALL: [ReservedKey; 4] = [
        ReservedKey::Select,
        ReservedKey::Sort,
        ReservedKey::Page,
        ReservedKey::Limit,
    ];

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "select" => Some(ReservedKey::Select),
            "sort" => Some(ReservedKey::Sort),
            "page" => Some(ReservedKey::Page),
            "limit" => Some(ReservedKey::Limit),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReservedKey::Select => "select",
            ReservedKey::Sort => "sort",
            ReservedKey::Page => "page",
            ReservedKey::Limit => "limit",
        }
    }
}

impl fmt::Display for ReservedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// One sort key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: String,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Ascending,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Descending,
        }
    }
}

/// Structured query produced from raw query parameters
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    /// Row filter (never contains reserved keys)
    pub filter: Filter,

    /// Ordered sort keys
    pub sort: Vec<SortKey>,

    /// Fields to return (None = all)
    pub projection: Option<BTreeSet<String>>,

    /// 1-based page number
    pub page: u64,

    /// Page size
    pub limit: u64,
}

impl Default for QueryPlan {
    fn default() -> Self {
        Self {
            filter: Filter::new(),
            sort: vec![SortKey::desc(DEFAULT_SORT_FIELD)],
            projection: None,
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl QueryPlan {
    /// Index of the first record on this page
    pub fn start_index(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// Index one past the last record on this page
    pub fn end_index(&self) -> u64 {
        self.page.saturating_mul(self.limit)
    }
}

/// Translates query parameters into a [`QueryPlan`]
pub struct QueryTranslator;

impl QueryTranslator {
    /// Translate raw query parameters.
    ///
    /// Keys are processed in sorted order so the resulting plan is identical
    /// for identical input regardless of map iteration order.
    pub fn translate(params: &HashMap<String, String>) -> RestResult<QueryPlan> {
        let mut plan = QueryPlan::default();

        let mut keys: Vec<&String> = params.keys().collect();
        keys.sort();

        for key in keys {
            // Reserved keys are dropped whatever their bracket suffix looks like
            if ReservedKey::from_key(base_key(key)).is_some() {
                continue;
            }

            let value = &params[key];
            let (field, token) = split_key(key, value)?;

            let path = normalize_field(field);
            for predicate in parse_predicates(key, token, value)? {
                plan.filter.push(path.clone(), predicate);
            }
        }

        if let Some(select) = params.get(ReservedKey::Select.as_str()) {
            plan.projection = parse_select(select);
        }

        if let Some(sort) = params.get(ReservedKey::Sort.as_str()) {
            let keys = parse_sort(sort);
            if !keys.is_empty() {
                plan.sort = keys;
            }
        }

        plan.page = parse_positive(params.get(ReservedKey::Page.as_str()), DEFAULT_PAGE);
        plan.limit = parse_positive(params.get(ReservedKey::Limit.as_str()), DEFAULT_LIMIT);

        Ok(plan)
    }
}

/// Rewrite `a_b_c` to the nested path `a.b.c`
pub fn normalize_field(field: &str) -> String {
    field.replace('_', ".")
}

/// The part of a key before any bracket
fn base_key(key: &str) -> &str {
    match key.find(|c: char| c == '[' || c == ']') {
        Some(end) => &key[..end],
        None => key,
    }
}

/// Split `field[op]` into its field and operator token
fn split_key<'a>(key: &'a str, value: &str) -> RestResult<(&'a str, Option<&'a str>)> {
    let (field, token) = match key.find('[') {
        None => {
            if key.contains(']') {
                return Err(RestError::query_parse(key, value, "unbalanced ']' in key"));
            }
            (key, None)
        }
        Some(open) => {
            if !key.ends_with(']') {
                return Err(RestError::query_parse(key, value, "unterminated '[' in key"));
            }
            let token = &key[open + 1..key.len() - 1];
            if token.is_empty() || token.contains('[') || token.contains(']') {
                return Err(RestError::query_parse(key, value, "malformed operator in key"));
            }
            (&key[..open], Some(token))
        }
    };

    if field.is_empty() {
        return Err(RestError::query_parse(key, value, "missing field name"));
    }

    Ok((field, token))
}

/// Build the predicates for one query parameter
fn parse_predicates(key: &str, token: Option<&str>, value: &str) -> RestResult<Vec<Predicate>> {
    if let Some(token) = token {
        let predicate = match FilterOperator::from_token(token) {
            Some(op) => operator_from_text(key, op, value)?,
            None => {
                let mut literal = Map::new();
                literal.insert(token.to_string(), coerce_scalar(value));
                Predicate::Equals(Value::Object(literal))
            }
        };
        return Ok(vec![predicate]);
    }

    if value.trim_start().starts_with('{') {
        let object = parse_object(key, value)?;
        let mut predicates = Vec::new();
        let mut literal = Map::new();

        for (sub_key, operand) in object {
            match FilterOperator::from_token(&sub_key) {
                Some(op) => predicates.push(operator_from_value(key, value, op, operand)?),
                None => {
                    literal.insert(sub_key, operand);
                }
            }
        }

        if !literal.is_empty() || predicates.is_empty() {
            predicates.push(Predicate::Equals(Value::Object(literal)));
        }
        return Ok(predicates);
    }

    Ok(vec![Predicate::Equals(coerce_scalar(value))])
}

/// Operator predicate from the raw text of a `field[op]=text` parameter
fn operator_from_text(key: &str, op: FilterOperator, text: &str) -> RestResult<Predicate> {
    let operand = match op {
        FilterOperator::In => Operand::Set(split_list(text)),
        FilterOperator::Pattern => Operand::Pattern(compile_pattern(key, text)?),
        _ => Operand::Scalar(coerce_scalar(text)),
    };
    Ok(Predicate::Compare(op, operand))
}

/// Operator predicate from a sub-key of an object-form value
fn operator_from_value(
    key: &str,
    raw: &str,
    op: FilterOperator,
    operand: Value,
) -> RestResult<Predicate> {
    let operand = match (op, operand) {
        (FilterOperator::In, Value::Array(items)) => Operand::Set(items),
        (FilterOperator::In, Value::String(text)) => Operand::Set(split_list(&text)),
        (_, Value::Array(_)) | (_, Value::Object(_)) => {
            return Err(RestError::query_parse(
                key,
                raw,
                format!("operand of '{}' must be a scalar", op),
            ));
        }
        (FilterOperator::In, scalar) => Operand::Set(vec![scalar]),
        (FilterOperator::Pattern, Value::String(text)) => {
            Operand::Pattern(compile_pattern(key, &text)?)
        }
        (FilterOperator::Pattern, scalar) => {
            Operand::Pattern(compile_pattern(key, &scalar.to_string())?)
        }
        (_, Value::String(text)) => Operand::Scalar(coerce_scalar(&text)),
        (_, scalar) => Operand::Scalar(scalar),
    };
    Ok(Predicate::Compare(op, operand))
}

fn compile_pattern(key: &str, text: &str) -> RestResult<ContainsPattern> {
    ContainsPattern::new(text).map_err(|e| RestError::query_parse(key, text, e.to_string()))
}

/// Parse an object-form value: strict JSON first, then the relaxed
/// `{key:value,...}` form where keys and values may be unquoted.
fn parse_object(key: &str, value: &str) -> RestResult<Map<String, Value>> {
    let trimmed = value.trim();
    if !trimmed.ends_with('}') {
        return Err(RestError::query_parse(key, value, "unterminated object"));
    }

    if let Ok(Value::Object(object)) = serde_json::from_str::<Value>(trimmed) {
        return Ok(object);
    }

    let inner = trimmed[1..trimmed.len() - 1].trim();
    let mut object = Map::new();
    if inner.is_empty() {
        return Ok(object);
    }
    if inner.contains('{') || inner.contains('}') {
        return Err(RestError::query_parse(
            key,
            value,
            "nested objects must be valid JSON",
        ));
    }

    let mut last_key: Option<String> = None;
    for segment in inner.split(',') {
        match segment.split_once(':') {
            Some((sub_key, sub_value)) => {
                let sub_key = unquote(sub_key);
                if sub_key.is_empty() {
                    return Err(RestError::query_parse(key, value, "empty object key"));
                }
                object.insert(sub_key.to_string(), Value::String(unquote(sub_value).to_string()));
                last_key = Some(sub_key.to_string());
            }
            // `{in:a,b}`: trailing list items continue the `in` entry
            None if last_key.as_deref() == Some(FilterOperator::In.as_token()) => {
                if let Some(Value::String(list)) = object.get_mut(FilterOperator::In.as_token()) {
                    list.push(',');
                    list.push_str(unquote(segment));
                }
            }
            None => {
                return Err(RestError::query_parse(
                    key,
                    value,
                    format!("expected key:value, found '{}'", segment.trim()),
                ));
            }
        }
    }

    Ok(object)
}

fn unquote(s: &str) -> &str {
    s.trim().trim_matches(|c| c == '"' || c == '\'')
}

fn split_list(text: &str) -> Vec<Value> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(coerce_scalar)
        .collect()
}

/// Interpret a query-string scalar: null, booleans and numbers are typed,
/// everything else stays a string
pub fn coerce_scalar(value: &str) -> Value {
    match value {
        "null" => return Value::Null,
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }

    if let Ok(n) = value.parse::<i64>() {
        return Value::Number(n.into());
    }
    if let Ok(n) = value.parse::<f64>() {
        if let Some(num) = serde_json::Number::from_f64(n) {
            return Value::Number(num);
        }
    }

    Value::String(value.to_string())
}

/// Parse select parameter (comma-separated field list)
fn parse_select(value: &str) -> Option<BTreeSet<String>> {
    let fields: BTreeSet<String> = value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    if fields.is_empty() {
        None
    } else {
        Some(fields)
    }
}

/// Parse sort parameter (`a,-b`: ascending a, then descending b)
fn parse_sort(value: &str) -> Vec<SortKey> {
    value
        .split(',')
        .map(str::trim)
        .filter_map(|part| match part.strip_prefix('-') {
            Some(field) if !field.is_empty() => Some(SortKey::desc(field)),
            Some(_) => None,
            None if !part.is_empty() => Some(SortKey::asc(part)),
            None => None,
        })
        .collect()
}

/// Parse a positive integer, falling back to `default` on anything else
fn parse_positive(value: Option<&String>, default: u64) -> u64 {
    value
        .and_then(|v| leading_integer(v.trim()))
        .filter(|n| *n > 0)
        .map(|n| n as u64)
        .unwrap_or(default)
}

/// Integer read from the start of `text` (`2.5` → 2, `10abc` → 10)
fn leading_integer(text: &str) -> Option<i64> {
    let unsigned = text.strip_prefix(|c: char| c == '+' || c == '-').unwrap_or(text);
    let digits = unsigned
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(unsigned.len());
    if digits == 0 {
        return None;
    }

    let sign_len = text.len() - unsigned.len();
    text[..sign_len + digits].parse().ok()
}
