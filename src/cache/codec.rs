//! Value Codec Module
//!
//! Converts between native result values and the flat string representation
//! the hash store requires.
//!
//! Decoding is a heuristic, not a tagged encoding: a stored string is read
//! back as a number if removing at most one decimal point leaves only decimal
//! digits, and verbatim text otherwise. Known limitation: a categorical value
//! that happens to be all digits decodes as a number on the cache-hit path,
//! while the fresh-computation path never passes through the codec and keeps
//! its native type. Negative and non-finite numbers likewise decode as text.
//! This asymmetry between hit and miss results is part of the contract.

use serde::Serialize;

// == Field Value ==
/// A decoded cache field: numeric aggregate or verbatim text.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

// == Encode ==
/// Converts a value to its canonical string form.
///
/// Integral finite numbers keep one fractional digit (`15` -> `"15.0"`) so
/// that canonical numeric strings survive a decode/encode round trip.
pub fn encode(value: &FieldValue) -> String {
    match value {
        FieldValue::Number(n) => {
            if n.is_finite() && n.fract() == 0.0 {
                format!("{:.1}", n)
            } else {
                format!("{}", n)
            }
        }
        FieldValue::Text(s) => s.clone(),
    }
}

// == Decode ==
/// Interprets a stored string as a number when it looks like one,
/// verbatim text otherwise.
pub fn decode(raw: &str) -> FieldValue {
    if looks_numeric(raw) {
        match raw.parse::<f64>() {
            Ok(n) => FieldValue::Number(n),
            Err(_) => FieldValue::Text(raw.to_string()),
        }
    } else {
        FieldValue::Text(raw.to_string())
    }
}

/// True if removing at most one `.` leaves a non-empty run of decimal digits.
fn looks_numeric(raw: &str) -> bool {
    let stripped = raw.replacen('.', "", 1);
    !stripped.is_empty() && stripped.bytes().all(|b| b.is_ascii_digit())
}
