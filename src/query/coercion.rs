// ABOUTME: Numeric coercion table for integer and numeric wire types
// ABOUTME: Converts textual PostgreSQL values and array literals into JSON numbers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Numeric type coercion
//!
//! `COUNT(*)` yields `int8` and `SUM(numeric)` yields `numeric`, both of which a
//! driver would otherwise surface as strings or exact decimals. Dashboard rows
//! want plain numbers, so these wire types go through a fixed text parser that
//! produces `f64`. Non-finite and unparseable values become JSON `null`.

use serde_json::Value;

/// Database wire types whose values are coerced to floating point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WireType {
    /// `int4`
    Int4,
    /// `int8`
    Int8,
    /// `numeric`
    Numeric,
    /// `int4[]`
    Int4Array,
    /// `int8[]`
    Int8Array,
    /// `numeric[]`
    NumericArray,
}

impl WireType {
    /// Every coerced wire type
    pub const ALL: [Self; 6] = [
        Self::Int4,
        Self::Int8,
        Self::Numeric,
        Self::Int4Array,
        Self::Int8Array,
        Self::NumericArray,
    ];

    /// `PostgreSQL` type OID
    #[must_use]
    pub const fn oid(self) -> u32 {
        match self {
            Self::Int4 => 23,
            Self::Int8 => 20,
            Self::Numeric => 1700,
            Self::Int4Array => 1007,
            Self::Int8Array => 1016,
            Self::NumericArray => 1231,
        }
    }

    /// Type name as reported by the driver
    #[must_use]
    pub const fn type_name(self) -> &'static str {
        match self {
            Self::Int4 => "INT4",
            Self::Int8 => "INT8",
            Self::Numeric => "NUMERIC",
            Self::Int4Array => "INT4[]",
            Self::Int8Array => "INT8[]",
            Self::NumericArray => "NUMERIC[]",
        }
    }

    /// Look up a wire type by OID
    #[must_use]
    pub fn from_oid(oid: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|wire| wire.oid() == oid)
    }

    /// Look up a wire type by driver type name (`INT8`, `NUMERIC[]`, `_int4`)
    #[must_use]
    pub fn from_type_name(name: &str) -> Option<Self> {
        let upper = name.trim().to_ascii_uppercase();
        let canonical = upper
            .strip_prefix('_')
            .map_or_else(|| upper.clone(), |element| format!("{element}[]"));
        Self::ALL
            .into_iter()
            .find(|wire| wire.type_name() == canonical)
    }

    /// Whether values of this type are array literals
    #[must_use]
    pub const fn is_array(self) -> bool {
        matches!(self, Self::Int4Array | Self::Int8Array | Self::NumericArray)
    }

    /// Element type for arrays, the type itself for scalars
    #[must_use]
    pub const fn element(self) -> Self {
        match self {
            Self::Int4 | Self::Int4Array => Self::Int4,
            Self::Int8 | Self::Int8Array => Self::Int8,
            Self::Numeric | Self::NumericArray => Self::Numeric,
        }
    }
}

/// Parser from the textual wire representation to a JSON value
pub type TextParser = fn(&str) -> Value;

/// Process-wide coercion registrations
static COERCION_TABLE: &[(WireType, TextParser)] = &[
    (WireType::Int4, coerce_scalar),
    (WireType::Int8, coerce_scalar),
    (WireType::Numeric, coerce_scalar),
    (WireType::Int4Array, coerce_array),
    (WireType::Int8Array, coerce_array),
    (WireType::NumericArray, coerce_array),
];

/// Registered parser for a wire type
#[must_use]
pub fn parser_for(wire: WireType) -> Option<TextParser> {
    COERCION_TABLE
        .iter()
        .find(|(registered, _)| *registered == wire)
        .map(|(_, parser)| *parser)
}

/// Coerce a textual value of the given wire type into JSON
#[must_use]
pub fn coerce_text(wire: WireType, text: &str) -> Value {
    parser_for(wire).map_or_else(|| Value::String(text.to_owned()), |parse| parse(text))
}

/// Parse a scalar numeric literal
#[must_use]
pub fn parse_number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok()
}

/// Parse a `PostgreSQL` array literal of numbers, keeping `NULL` elements
///
/// Nested dimensions are flattened and an explicit bounds decoration such as
/// `[0:2]={1,2,3}` is ignored.
#[must_use]
pub fn parse_number_array(text: &str) -> Vec<Option<f64>> {
    let body = strip_dimension_decoration(text.trim());
    let inner = body
        .strip_prefix('{')
        .and_then(|rest| rest.strip_suffix('}'))
        .unwrap_or(body);

    if inner.trim().is_empty() {
        return Vec::new();
    }

    inner
        .split(',')
        .map(|element| element.trim().trim_matches(|ch| ch == '{' || ch == '}'))
        .map(|element| {
            if element.eq_ignore_ascii_case("NULL") {
                None
            } else {
                parse_number(element)
            }
        })
        .collect()
}

fn strip_dimension_decoration(text: &str) -> &str {
    if text.starts_with('[') {
        if let Some((_, literal)) = text.split_once('=') {
            return literal;
        }
    }
    text
}

fn number_to_json(value: Option<f64>) -> Value {
    value
        .and_then(serde_json::Number::from_f64)
        .map_or(Value::Null, Value::Number)
}

fn coerce_scalar(text: &str) -> Value {
    number_to_json(parse_number(text))
}

fn coerce_array(text: &str) -> Value {
    Value::Array(
        parse_number_array(text)
            .into_iter()
            .map(number_to_json)
            .collect(),
    )
}
