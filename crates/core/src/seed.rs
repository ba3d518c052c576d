//! Reproducibility seed for a universe layout.
//!
//! A [`Seed`] is the string form of whatever primitive the host supplied
//! (`"demo"`, `42`, `1.5`, `true`). The string form is folded into a 32-bit
//! PRNG state with an order-dependent hash, so `42` and `"42"` are the same
//! seed while `"ab"` and `"ba"` are not.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Seed for the universe generator, stored as its canonical string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Seed(String);

impl Seed {
    /// Returns the canonical string form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Folds the UTF-16 code units of the string form into a 32-bit state.
    ///
    /// `h = h * 31 + unit` with wrapping 32-bit arithmetic.
    pub fn hash32(&self) -> u32 {
        self.0
            .encode_utf16()
            .fold(0u32, |h, unit| h.wrapping_mul(31).wrapping_add(u32::from(unit)))
    }

    /// Converts a JSON primitive into a seed.
    ///
    /// Returns `None` for null, arrays, objects, and falsy primitives
    /// (`""`, `0`, `false`, `NaN`): those mean "no seed".
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) if !s.is_empty() => Some(Self(s.clone())),
            Value::Bool(true) => Some(Self("true".to_owned())),
            Value::Number(n) => match (n.as_i64(), n.as_u64(), n.as_f64()) {
                (Some(0), _, _) => None,
                (Some(i), _, _) => Some(Self(i.to_string())),
                (None, Some(u), _) => Some(Self(u.to_string())),
                (None, None, Some(f)) => Self::from_f64(f),
                _ => None,
            },
            _ => None,
        }
    }

    fn from_f64(value: f64) -> Option<Self> {
        if value == 0.0 || value.is_nan() {
            return None;
        }
        if value.fract() == 0.0 && value.abs() < 1e15 {
            return Some(Self((value as i64).to_string()));
        }
        Some(Self(value.to_string()))
    }
}

impl From<&str> for Seed {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for Seed {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<u64> for Seed {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl From<i64> for Seed {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

impl std::fmt::Display for Seed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Seed {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Seed::from_json(&value).ok_or_else(|| {
            serde::de::Error::custom(format!("seed must be a truthy primitive, got {value}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn hash_of_demo_matches_known_value() {
        assert_eq!(Seed::from("demo").hash32(), 3_079_651);
    }

    #[test]
    fn hash_is_order_dependent() {
        assert_ne!(Seed::from("ab").hash32(), Seed::from("ba").hash32());
    }

    #[test]
    fn hash_uses_utf16_code_units() {
        assert_eq!(Seed::from("héllo").hash32(), 103_094_734);
    }

    #[test]
    fn number_and_string_forms_hash_identically() {
        assert_eq!(Seed::from(42u64).hash32(), Seed::from("42").hash32());
        assert_eq!(Seed::from_json(&json!(42)), Some(Seed::from("42")));
        assert_eq!(Seed::from_json(&json!(42.0)), Some(Seed::from("42")));
        assert_eq!(Seed::from_json(&json!(-7)), Some(Seed::from("-7")));
    }

    #[test]
    fn fractional_number_keeps_fraction() {
        assert_eq!(Seed::from_json(&json!(1.5)), Some(Seed::from("1.5")));
    }

    #[test]
    fn falsy_values_mean_no_seed() {
        assert_eq!(Seed::from_json(&json!(null)), None);
        assert_eq!(Seed::from_json(&json!("")), None);
        assert_eq!(Seed::from_json(&json!(0)), None);
        assert_eq!(Seed::from_json(&json!(0.0)), None);
        assert_eq!(Seed::from_json(&json!(false)), None);
        assert_eq!(Seed::from_json(&json!([1])), None);
        assert_eq!(Seed::from_json(&json!({"a": 1})), None);
    }

    #[test]
    fn true_is_a_seed() {
        assert_eq!(Seed::from_json(&json!(true)), Some(Seed::from("true")));
    }

    #[test]
    fn json_round_trip_as_string() {
        let seed = Seed::from("demo");
        let json = serde_json::to_string(&seed).unwrap();
        assert_eq!(json, "\"demo\"");
        let restored: Seed = serde_json::from_str(&json).unwrap();
        assert_eq!(seed, restored);
    }

    #[test]
    fn deserialize_accepts_numbers() {
        let seed: Seed = serde_json::from_str("1234").unwrap();
        assert_eq!(seed.as_str(), "1234");
    }

    #[test]
    fn deserialize_rejects_falsy() {
        assert!(serde_json::from_str::<Seed>("\"\"").is_err());
        assert!(serde_json::from_str::<Seed>("false").is_err());
    }
}
