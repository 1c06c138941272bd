use std::fmt;

/// A single cell as it comes out of the data file.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Empty,
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Text(s) => write!(f, "{s}"),
            RawValue::Int(i) => write!(f, "{i}"),
            RawValue::Float(v) => write!(f, "{v}"),
            RawValue::Bool(true) => write!(f, "TRUE"),
            RawValue::Bool(false) => write!(f, "FALSE"),
            RawValue::Empty => Ok(()),
        }
    }
}

// Strings that missing values turn into once they went through a float column.
const MISSING_ARTIFACTS: [&str; 2] = ["nan", "none"];

/// Trims text, turns integral floats into integers and NaN into empty.
/// Everything else passes through.
pub fn normalize(value: &RawValue) -> RawValue {
    match value {
        RawValue::Text(s) => RawValue::Text(s.trim().to_string()),
        RawValue::Float(f) if f.is_nan() => RawValue::Empty,
        RawValue::Float(f) if is_integral(*f) => RawValue::Int(*f as i64),
        other => other.clone(),
    }
}

fn is_integral(f: f64) -> bool {
    f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64
}

/// Restores the fixed width form of an identifier that was stored as a number
/// upstream and lost its leading zeros.
pub fn normalize_identifier(value: &RawValue, width: usize) -> String {
    let rendered = value.to_string();
    let trimmed = rendered.trim();
    let stripped = trimmed.strip_suffix(".0").unwrap_or(trimmed).trim();
    if stripped.is_empty() {
        return String::new();
    }
    format!("{stripped:0>width$}")
}

/// Final string shown in the field panel.
pub fn display_string(value: &RawValue) -> String {
    let rendered = value.to_string();
    let trimmed = rendered.trim();
    if MISSING_ARTIFACTS.contains(&trimmed.to_lowercase().as_str()) {
        String::new()
    } else {
        trimmed.to_string()
    }
}
