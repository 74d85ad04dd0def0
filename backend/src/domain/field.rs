//! Declarative field specifications and the validation engine.
//!
//! Each entity declares a static table of [`FieldSpec`]s. A spec names the
//! key, one of a closed set of validation strategies ([`FieldKind`]), whether
//! a value is mandatory, whether it may change after creation, and an
//! optional default. The saver walks the table; this module performs the
//! per-field checks that need no store access.

use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::DomainError;
use crate::domain::ports::IndexName;

/// Canonical, converted field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Floating point measure.
    Float(f64),
    /// Text, choice or identifier.
    Text(String),
    /// String-to-string map, e.g. lane statuses.
    Map(BTreeMap<String, String>),
}

impl FieldValue {
    /// JSON rendering recorded in log entries.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Float(value) => serde_json::Number::from_f64(*value)
                .map_or(Value::Null, Value::Number),
            Self::Text(value) => Value::String(value.clone()),
            Self::Map(map) => Value::Object(
                map.iter()
                    .map(|(key, value)| (key.clone(), Value::String(value.clone())))
                    .collect(),
            ),
        }
    }

    /// Borrow the text payload, if this is a text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }
}

/// Character rules applied to identifier fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdSyntax {
    /// Starts with a letter; letters, digits, `-`, `.` and `_` follow.
    Code,
    /// Like [`IdSyntax::Code`] but may start with a digit, as instrument run
    /// identifiers do.
    RunCode,
    /// A plausible email address.
    Email,
}

/// Validation and conversion strategy for one field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    /// Free text, trimmed.
    Text,
    /// One of a fixed set of options.
    Choice(&'static [&'static str]),
    /// Finite float inside optional inclusive bounds.
    BoundedFloat {
        /// Inclusive lower bound.
        min: Option<f64>,
        /// Inclusive upper bound.
        max: Option<f64>,
    },
    /// Identifier unique among siblings in `index`.
    Identifier {
        /// Index holding `[scope.., value]` keys for uniqueness checks.
        index: IndexName,
        /// Character rules.
        syntax: IdSyntax,
    },
    /// Position within the parent, assigned on creation.
    Position {
        /// Index holding `[scope.., position]` keys.
        index: IndexName,
    },
    /// Lane number to status map; statuses drawn from the options.
    LaneStatuses(&'static [&'static str]),
}

/// Value substituted when the computed value is empty.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldDefault {
    /// Text default.
    Text(&'static str),
    /// Float default.
    Float(f64),
}

impl FieldDefault {
    fn to_value(self) -> FieldValue {
        match self {
            Self::Text(value) => FieldValue::Text(value.to_owned()),
            Self::Float(value) => FieldValue::Float(value),
        }
    }
}

/// Declaration of one entity attribute.
///
/// # Examples
/// ```
/// use seqtrack::domain::field::{FieldKind, FieldSpec};
///
/// const STATUS: FieldSpec = FieldSpec::new("status", FieldKind::Choice(&["OPEN", "CLOSED"]))
///     .with_text_default("OPEN");
/// assert!(STATUS.editable);
/// assert!(!STATUS.mandatory);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    /// Attribute key in payloads and documents.
    pub key: &'static str,
    /// Validation strategy.
    pub kind: FieldKind,
    /// Whether an empty value is rejected.
    pub mandatory: bool,
    /// Whether the value may change after creation.
    pub editable: bool,
    /// Value used when the computed value is empty.
    pub default: Option<FieldDefault>,
}

impl FieldSpec {
    /// Optional, editable field without a default.
    #[must_use]
    pub const fn new(key: &'static str, kind: FieldKind) -> Self {
        Self {
            key,
            kind,
            mandatory: false,
            editable: true,
            default: None,
        }
    }

    /// Shorthand for a plain text field.
    #[must_use]
    pub const fn text(key: &'static str) -> Self {
        Self::new(key, FieldKind::Text)
    }

    /// Shorthand for a non-negative float field defaulting to zero.
    #[must_use]
    pub const fn measure(key: &'static str) -> Self {
        Self::new(
            key,
            FieldKind::BoundedFloat {
                min: Some(0.0),
                max: None,
            },
        )
        .with_float_default(0.0)
    }

    /// Reject empty values.
    #[must_use]
    pub const fn mandatory(mut self) -> Self {
        self.mandatory = true;
        self
    }

    /// Allow the value to be set only at creation.
    #[must_use]
    pub const fn immutable(mut self) -> Self {
        self.editable = false;
        self
    }

    /// Substitute `value` for empty text.
    #[must_use]
    pub const fn with_text_default(mut self, value: &'static str) -> Self {
        self.default = Some(FieldDefault::Text(value));
        self
    }

    /// Substitute `value` for an empty float.
    #[must_use]
    pub const fn with_float_default(mut self, value: f64) -> Self {
        self.default = Some(FieldDefault::Float(value));
        self
    }

    /// Fail if a mandatory value is empty or absent.
    pub fn check_mandatory(&self, candidate: Option<&Value>) -> Result<(), DomainError> {
        if self.mandatory && candidate.is_none_or(is_blank) {
            return Err(DomainError::invalid_field(
                self.key,
                "missing",
                format!("{} is required", self.key),
            ));
        }
        Ok(())
    }

    /// Validate and convert a non-empty raw value to its canonical form.
    ///
    /// Uniqueness of identifiers needs the store and is checked by the saver.
    pub fn check_valid(&self, raw: &Value) -> Result<FieldValue, DomainError> {
        match self.kind {
            FieldKind::Text => scalar_text(self.key, raw).map(FieldValue::Text),
            FieldKind::Choice(options) => {
                let value = scalar_text(self.key, raw)?;
                if options.contains(&value.as_str()) {
                    Ok(FieldValue::Text(value))
                } else {
                    Err(DomainError::invalid_field(
                        self.key,
                        "invalid_choice",
                        format!("{} must be one of {}", self.key, options.join(", ")),
                    ))
                }
            }
            FieldKind::BoundedFloat { min, max } => {
                let value = float_value(self.key, raw)?;
                let below = min.is_some_and(|bound| value < bound);
                let above = max.is_some_and(|bound| value > bound);
                if below || above {
                    return Err(DomainError::invalid_field(
                        self.key,
                        "out_of_range",
                        format!("{} value {value} is out of range", self.key),
                    ));
                }
                Ok(FieldValue::Float(value))
            }
            FieldKind::Identifier { syntax, .. } => {
                let value = scalar_text(self.key, raw)?;
                if syntax_regex(syntax).is_match(&value) {
                    Ok(FieldValue::Text(value))
                } else {
                    Err(DomainError::invalid_field(
                        self.key,
                        "invalid_identifier",
                        format!("{} contains disallowed characters", self.key),
                    ))
                }
            }
            FieldKind::Position { .. } => {
                let value = scalar_text(self.key, raw)?;
                match value.parse::<u32>() {
                    Ok(position) if position > 0 => Ok(FieldValue::Text(position.to_string())),
                    _ => Err(DomainError::invalid_field(
                        self.key,
                        "invalid_position",
                        format!("{} must be a positive integer", self.key),
                    )),
                }
            }
            FieldKind::LaneStatuses(options) => lane_statuses(self.key, options, raw),
        }
    }

    /// Default value, if one is declared.
    #[must_use]
    pub fn default_value(&self) -> Option<FieldValue> {
        self.default.map(FieldDefault::to_value)
    }

    /// Uniqueness index, for identifier fields.
    #[must_use]
    pub const fn identifier_index(&self) -> Option<IndexName> {
        match self.kind {
            FieldKind::Identifier { index, .. } => Some(index),
            _ => None,
        }
    }
}

/// Whether a raw value counts as empty.
#[must_use]
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.trim().is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// Highest lane number on a flowcell.
const MAX_LANE: u8 = 8;

static CODE_RE: OnceLock<Regex> = OnceLock::new();
static RUN_CODE_RE: OnceLock<Regex> = OnceLock::new();
static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn syntax_regex(syntax: IdSyntax) -> &'static Regex {
    let (cell, pattern) = match syntax {
        IdSyntax::Code => (&CODE_RE, "^[A-Za-z][-._A-Za-z0-9]*$"),
        IdSyntax::RunCode => (&RUN_CODE_RE, "^[A-Za-z0-9][-._A-Za-z0-9]*$"),
        IdSyntax::Email => (&EMAIL_RE, r"^[^@\s]+@[^@\s]+\.[^@\s]+$"),
    };
    cell.get_or_init(|| {
        Regex::new(pattern)
            .unwrap_or_else(|error| panic!("identifier regex failed to compile: {error}"))
    })
}

fn scalar_text(key: &str, raw: &Value) -> Result<String, DomainError> {
    match raw {
        Value::String(text) => Ok(text.trim().to_owned()),
        Value::Number(number) => Ok(number.to_string()),
        Value::Bool(flag) => Ok(flag.to_string()),
        _ => Err(DomainError::invalid_field(
            key,
            "invalid_type",
            format!("{key} must be a scalar value"),
        )),
    }
}

fn float_value(key: &str, raw: &Value) -> Result<f64, DomainError> {
    let parsed = match raw {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(value) if value.is_finite() => Ok(value),
        _ => Err(DomainError::invalid_field(
            key,
            "invalid_number",
            format!("{key} must be a number"),
        )),
    }
}

fn lane_statuses(
    key: &str,
    options: &'static [&'static str],
    raw: &Value,
) -> Result<FieldValue, DomainError> {
    let Value::Object(lanes) = raw else {
        return Err(DomainError::invalid_field(
            key,
            "invalid_type",
            format!("{key} must map lane numbers to statuses"),
        ));
    };
    let mut statuses = BTreeMap::new();
    for (lane, submitted) in lanes {
        let lane_ok = lane.parse::<u8>().is_ok_and(|number| (1..=MAX_LANE).contains(&number));
        let status = submitted.as_str().map(str::trim).unwrap_or_default();
        if !lane_ok || !options.contains(&status) {
            return Err(DomainError::invalid_field(
                key,
                "invalid_lane_status",
                format!(
                    "{key} lane {lane} must have one of {}",
                    options.join(", ")
                ),
            ));
        }
        statuses.insert(lane.clone(), status.to_owned());
    }
    Ok(FieldValue::Map(statuses))
}

/// Source of candidate values for a save.
///
/// `lookup` distinguishes an absent key (`None`) from an explicit null
/// (`Some(Value::Null)`): absent keys leave stored values untouched on update.
pub trait FieldSource: Sync {
    /// Raw value submitted for `key`.
    fn lookup(&self, key: &str) -> Option<Value>;
}

/// Structured JSON payload, as sent by API clients.
#[derive(Debug, Clone, Copy)]
pub struct JsonPayload<'a>(pub &'a Map<String, Value>);

impl FieldSource for JsonPayload<'_> {
    fn lookup(&self, key: &str) -> Option<Value> {
        self.0.get(key).cloned()
    }
}

/// Named form parameters, as posted by the operator UI.
///
/// Empty strings are submitted for cleared inputs and read as nulls.
#[derive(Debug, Clone, Copy)]
pub struct FormParams<'a>(pub &'a HashMap<String, String>);

impl FieldSource for FormParams<'_> {
    fn lookup(&self, key: &str) -> Option<Value> {
        self.0.get(key).map(|value| {
            if value.trim().is_empty() {
                Value::Null
            } else {
                Value::String(value.clone())
            }
        })
    }
}

/// Source with no values; used for saves driven entirely by defaults.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFields;

impl FieldSource for NoFields {
    fn lookup(&self, _key: &str) -> Option<Value> {
        None
    }
}
