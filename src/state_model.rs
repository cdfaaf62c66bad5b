//! Validation of loosely-typed light state requests.
//!
//! Callers hand in a JSON object with any subset of the fields below. Each
//! present field is checked on its own; nothing is cross-checked here.
//!
//! | field        | shape                  | range        |
//! |--------------|------------------------|--------------|
//! | `rgb`        | 3 numbers              | 0-255        |
//! | `rgbw`       | 4 integers             | 0-255        |
//! | `rgbww`      | 5 integers             | 0-255        |
//! | `brightness` | integer                | 0-255        |
//! | `colortemp`  | integer                | 2000-6500    |
//! | `warm_white` | integer                | 0-255        |
//! | `cold_white` | integer                | 0-255        |
//! | `speed`      | integer                | 0-100        |
//! | `ratio`      | integer                | 0-100        |
//! | `scene`      | integer                | any          |
//! | `hucolor`    | 2 numbers              | any          |
//! | `state`      | boolean or string      | default true |

use std::fmt;

use serde_json::{Map, Value};

use crate::types::{
    Brightness, Color, ColorRGBW, ColorRGBWW, HueSaturation, Kelvin, Ratio, Speed, White,
};

/// A single failed field check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: &'static str,
    pub constraint: String,
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.constraint)
    }
}

/// Every field of a state request that failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    violations: Vec<FieldViolation>,
}

impl ValidationError {
    pub fn violations(&self) -> &[FieldViolation] {
        &self.violations
    }

    /// Whether `field` is among the failed fields.
    pub fn has_field(&self, field: &str) -> bool {
        self.violations.iter().any(|v| v.field == field)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, violation) in self.violations.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{violation}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// A state request whose present fields have all passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedState {
    pub rgb: Option<Color>,
    pub rgbw: Option<ColorRGBW>,
    pub rgbww: Option<ColorRGBWW>,
    pub brightness: Option<Brightness>,
    pub colortemp: Option<Kelvin>,
    pub warm_white: Option<White>,
    pub cold_white: Option<White>,
    pub speed: Option<Speed>,
    pub scene: Option<i64>,
    pub hucolor: Option<HueSaturation>,
    pub ratio: Option<Ratio>,
    /// Requested power; `true` unless the request says otherwise.
    pub power: bool,
}

impl Default for ValidatedState {
    fn default() -> Self {
        ValidatedState {
            rgb: None,
            rgbw: None,
            rgbww: None,
            brightness: None,
            colortemp: None,
            warm_white: None,
            cold_white: None,
            speed: None,
            scene: None,
            hucolor: None,
            ratio: None,
            power: true,
        }
    }
}

/// Validate a raw state request.
///
/// Unknown fields are ignored and `null` counts as absent. All failing
/// fields are reported together.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use wizlights_mcp::validate_state;
///
/// let state = validate_state(&json!({"rgb": [10, 20, 30], "brightness": 128})).unwrap();
/// assert!(state.power);
///
/// let err = validate_state(&json!({"brightness": 300})).unwrap_err();
/// assert!(err.has_field("brightness"));
/// ```
pub fn validate_state(payload: &Value) -> Result<ValidatedState, ValidationError> {
    let Some(fields) = payload.as_object() else {
        return Err(ValidationError {
            violations: vec![FieldViolation {
                field: "payload",
                constraint: "must be a JSON object".into(),
            }],
        });
    };

    let mut checker = Checker {
        fields,
        violations: Vec::new(),
    };

    let state = ValidatedState {
        rgb: checker.check("rgb", |v| {
            let [r, g, b] = numbers::<3>(v)?;
            Color::create(r, g, b).ok_or_else(channel_range)
        }),
        rgbw: checker.check("rgbw", |v| {
            let [r, g, b, w] = integers::<4>(v)?;
            ColorRGBW::create(r, g, b, w).ok_or_else(channel_range)
        }),
        rgbww: checker.check("rgbww", |v| {
            let [r, g, b, c, w] = integers::<5>(v)?;
            ColorRGBWW::create(r, g, b, c, w).ok_or_else(channel_range)
        }),
        brightness: checker.check("brightness", |v| {
            ranged(v, Brightness::MIN, Brightness::MAX, Brightness::create)
        }),
        colortemp: checker.check("colortemp", |v| {
            ranged(v, Kelvin::MIN, Kelvin::MAX, Kelvin::create)
        }),
        warm_white: checker.check("warm_white", |v| {
            ranged(v, White::MIN, White::MAX, White::create)
        }),
        cold_white: checker.check("cold_white", |v| {
            ranged(v, White::MIN, White::MAX, White::create)
        }),
        speed: checker.check("speed", |v| ranged(v, Speed::MIN, Speed::MAX, Speed::create)),
        scene: checker.check("scene", integer),
        hucolor: checker.check("hucolor", |v| {
            let [hue, saturation] = numbers::<2>(v)?;
            HueSaturation::create(hue, saturation).ok_or_else(|| "must be finite".to_string())
        }),
        ratio: checker.check("ratio", |v| ranged(v, Ratio::MIN, Ratio::MAX, Ratio::create)),
        power: checker.check("state", power).unwrap_or(true),
    };

    if checker.violations.is_empty() {
        Ok(state)
    } else {
        Err(ValidationError {
            violations: checker.violations,
        })
    }
}

/// Lenient power flag: booleans as-is, strings are on only when they read
/// `"true"` in any case.
fn power(value: &Value) -> Result<bool, String> {
    match value {
        Value::Bool(on) => Ok(*on),
        Value::String(s) => Ok(s.eq_ignore_ascii_case("true")),
        _ => Err("must be a boolean".into()),
    }
}

struct Checker<'a> {
    fields: &'a Map<String, Value>,
    violations: Vec<FieldViolation>,
}

impl Checker<'_> {
    fn check<T>(
        &mut self,
        field: &'static str,
        parse: impl FnOnce(&Value) -> Result<T, String>,
    ) -> Option<T> {
        let value = self.fields.get(field).filter(|v| !v.is_null())?;
        match parse(value) {
            Ok(parsed) => Some(parsed),
            Err(constraint) => {
                self.violations.push(FieldViolation { field, constraint });
                None
            }
        }
    }
}

fn channel_range() -> String {
    "values must all be between 0 and 255".into()
}

fn integer(value: &Value) -> Result<i64, String> {
    as_integer(value).ok_or_else(|| "must be an integer".to_string())
}

fn ranged<T>(value: &Value, min: i64, max: i64, create: fn(i64) -> Option<T>) -> Result<T, String> {
    let n = integer(value)?;
    create(n).ok_or_else(|| format!("must be between {min} and {max}"))
}

fn as_integer(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64)
            .map(|f| f as i64)
    })
}

fn elements<const N: usize>(value: &Value) -> Result<&[Value], String> {
    let items = value
        .as_array()
        .ok_or_else(|| format!("must be a list of {N} values"))?;
    if items.len() != N {
        return Err(format!("must have exactly {N} elements"));
    }
    Ok(items)
}

fn numbers<const N: usize>(value: &Value) -> Result<[f64; N], String> {
    let items = elements::<N>(value)?;
    let mut out = [0.0; N];
    for (slot, item) in out.iter_mut().zip(items) {
        *slot = item
            .as_f64()
            .ok_or_else(|| "values must all be numbers".to_string())?;
    }
    Ok(out)
}

fn integers<const N: usize>(value: &Value) -> Result<[i64; N], String> {
    let items = elements::<N>(value)?;
    let mut out = [0; N];
    for (slot, item) in out.iter_mut().zip(items) {
        *slot = as_integer(item).ok_or_else(|| "values must all be integers".to_string())?;
    }
    Ok(out)
}
