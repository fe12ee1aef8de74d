//! Request/response DTOs and JSON mapping helpers.
//!
//! Inbound bodies are read field by field with [`FieldReader`] so that a
//! missing field, an explicit `null` and a wrongly-typed value can each be
//! reported against the field that caused it. Outbound payloads are plain
//! `Serialize` structs built from domain records.

use core::str::FromStr;
use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{Map, Value};

use fitclub_core::FieldErrors;
use fitclub_core::validation::messages;

use crate::app::errors::ApiError;

pub mod accounts;
pub mod members;
pub mod memberships;
pub mod trainers;

pub use accounts::UserPayload;
pub use members::MemberPayload;
pub use memberships::{MembershipListItem, MembershipPayload};
pub use trainers::TrainerPayload;

const INVALID_INTEGER: &str = "A valid integer is required.";
const INVALID_NUMBER: &str = "A valid number is required.";
const INVALID_STRING: &str = "Not a valid string.";
const INVALID_DATE: &str = "Date has wrong format. Use one of these formats instead: YYYY-MM-DD.";

// -------------------------
// Inbound: JSON object reader
// -------------------------

/// Reads typed fields out of a JSON object body, collecting per-field errors.
#[derive(Debug, Default)]
pub struct FieldReader {
    object: Map<String, Value>,
    errors: FieldErrors,
}

impl FieldReader {
    /// Parse a request body. An empty body reads as an empty object.
    pub fn from_body(body: &[u8]) -> Result<Self, ApiError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        let value: Value =
            serde_json::from_slice(body).map_err(|e| ApiError::MalformedJson(e.to_string()))?;
        match value {
            Value::Object(object) => Ok(Self {
                object,
                errors: FieldErrors::new(),
            }),
            other => Err(ApiError::field(
                "non_field_errors",
                format!(
                    "Invalid data. Expected a dictionary, but got {}.",
                    json_type(&other)
                ),
            )),
        }
    }

    /// Errors collected so far.
    pub fn into_errors(self) -> FieldErrors {
        self.errors
    }

    pub fn string(&mut self, field: &str) -> Option<String> {
        self.read(field, false, as_string).flatten()
    }

    pub fn nullable_string(&mut self, field: &str) -> Option<Option<String>> {
        self.read(field, true, as_string)
    }

    pub fn integer(&mut self, field: &str) -> Option<i64> {
        self.read(field, false, as_integer).flatten()
    }

    /// A primary key of a related record.
    pub fn pk<T: From<i64>>(&mut self, field: &str) -> Option<T> {
        self.read(field, false, as_pk).flatten().map(T::from)
    }

    pub fn nullable_pk<T: From<i64>>(&mut self, field: &str) -> Option<Option<T>> {
        self.read(field, true, as_pk).map(|v| v.map(T::from))
    }

    pub fn date(&mut self, field: &str) -> Option<NaiveDate> {
        self.read(field, false, as_date).flatten()
    }

    pub fn nullable_date(&mut self, field: &str) -> Option<Option<NaiveDate>> {
        self.read(field, true, as_date)
    }

    pub fn decimal(&mut self, field: &str) -> Option<Decimal> {
        self.read(field, false, as_decimal).flatten()
    }

    /// One of a fixed set of string tags.
    pub fn choice<T>(&mut self, field: &str) -> Option<T>
    where
        T: FromStr<Err = String>,
    {
        self.read(field, false, |v| match v {
            Value::String(s) => s.parse(),
            other => Err(messages::invalid_choice(&other.to_string())),
        })
        .flatten()
    }

    /// Absent → `None`; `null` → `Some(None)` when `nullable`, else an error.
    fn read<T>(
        &mut self,
        field: &str,
        nullable: bool,
        parse: impl Fn(&Value) -> Result<T, String>,
    ) -> Option<Option<T>> {
        let value = self.object.get(field)?;
        if value.is_null() {
            if nullable {
                return Some(None);
            }
            self.errors.add(field, messages::NULL);
            return None;
        }
        match parse(value) {
            Ok(v) => Some(Some(v)),
            Err(msg) => {
                self.errors.add(field, msg);
                None
            }
        }
    }
}

/// Combine type errors from reading a body with the errors from resolving it.
///
/// A field rejected while reading is not reported again as missing.
pub fn combine<T>(read_errors: FieldErrors, resolved: Result<T, FieldErrors>) -> Result<T, ApiError> {
    match resolved {
        Ok(value) if read_errors.is_empty() => Ok(value),
        Ok(_) => Err(ApiError::Validation(read_errors)),
        Err(errors) => {
            let mut all = read_errors;
            all.merge_absent(errors);
            Err(ApiError::Validation(all))
        }
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

fn as_string(value: &Value) -> Result<String, String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        _ => Err(INVALID_STRING.to_string()),
    }
}

fn as_integer(value: &Value) -> Result<i64, String> {
    let parsed = match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && f.abs() < 9.0e15).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| INVALID_INTEGER.to_string())
}

fn as_pk(value: &Value) -> Result<i64, String> {
    let parsed = match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| {
        format!(
            "Incorrect type. Expected pk value, received {}.",
            json_type(value)
        )
    })
}

fn as_date(value: &Value) -> Result<NaiveDate, String> {
    match value {
        Value::String(s) => {
            NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| INVALID_DATE.to_string())
        }
        _ => Err(INVALID_DATE.to_string()),
    }
}

fn as_decimal(value: &Value) -> Result<Decimal, String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return Err(INVALID_NUMBER.to_string()),
    };
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|_| INVALID_NUMBER.to_string())
}

// -------------------------
// Inbound: query strings
// -------------------------

/// Query parameter reader; empty values count as absent.
#[derive(Debug)]
pub struct QueryParams<'a> {
    params: &'a HashMap<String, String>,
    errors: FieldErrors,
}

impl<'a> QueryParams<'a> {
    pub fn new(params: &'a HashMap<String, String>) -> Self {
        Self {
            params,
            errors: FieldErrors::new(),
        }
    }

    pub fn text(&self, key: &str) -> Option<String> {
        self.params
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    /// Like [`Self::text`] but keeps surrounding whitespace; substring
    /// filters match the value exactly as sent.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.params.get(key).filter(|v| !v.is_empty()).cloned()
    }

    pub fn id<T: From<i64>>(&mut self, key: &str) -> Option<T> {
        let raw = self.text(key)?;
        match raw.parse::<i64>() {
            Ok(v) => Some(T::from(v)),
            Err(_) => {
                self.errors.add(key, INVALID_INTEGER);
                None
            }
        }
    }

    pub fn finish(self) -> Result<(), ApiError> {
        self.errors.into_result().map_err(ApiError::Validation)
    }
}

// -------------------------
// Outbound: pagination
// -------------------------

/// A page of results in the `{count, next, previous, results}` envelope.
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub count: usize,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

/// Cut `items` down to the requested page.
///
/// `page` is the raw `?page=` value (1-based, or `last`); `path` and `query`
/// are used to build the `next`/`previous` links.
pub fn paginate<T>(
    items: Vec<T>,
    page_size: usize,
    page: Option<&str>,
    path: &str,
    query: Option<&str>,
) -> Result<Page<T>, ApiError> {
    let count = items.len();
    let pages = count.div_ceil(page_size).max(1);

    let number = match page.map(str::trim).filter(|p| !p.is_empty()) {
        None => 1,
        Some("last") => pages,
        Some(raw) => raw.parse::<usize>().map_err(|_| ApiError::invalid_page())?,
    };
    if number == 0 || number > pages {
        return Err(ApiError::invalid_page());
    }

    let link = |n: usize| page_link(path, query, n);
    let next = (number < pages).then(|| link(number + 1));
    let previous = (number > 1).then(|| link(number - 1));

    let results = items
        .into_iter()
        .skip((number - 1) * page_size)
        .take(page_size)
        .collect();

    Ok(Page {
        count,
        next,
        previous,
        results,
    })
}

/// Rebuild `path?query` with `page` replaced by `number`.
fn page_link(path: &str, query: Option<&str>, number: usize) -> String {
    let mut pairs: Vec<&str> = query
        .unwrap_or_default()
        .split('&')
        .filter(|pair| !pair.is_empty() && !pair.starts_with("page=") && *pair != "page")
        .collect();
    let page = format!("page={number}");
    pairs.push(&page);
    format!("{path}?{}", pairs.join("&"))
}
