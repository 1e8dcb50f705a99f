//! Lenient field decoders for loosely typed backend fields.
//!
//! The catalog backend is not consistent about scalar types: ratings and
//! years arrive as numbers on some endpoints and as numeric strings on others,
//! and list fields are sometimes `null` instead of absent.

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Int(i64),
    Float(f64),
    Text(String),
    Bool(bool),
}

impl Scalar {
    fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Int(v) => Some(*v as f64),
            Scalar::Float(v) => Some(*v),
            Scalar::Text(s) => s.trim().parse().ok(),
            Scalar::Bool(_) => None,
        }
    }

    fn into_text(self) -> Option<String> {
        match self {
            Scalar::Int(v) => Some(v.to_string()),
            Scalar::Float(v) => Some(v.to_string()),
            Scalar::Text(s) if s.trim().is_empty() => None,
            Scalar::Text(s) => Some(s),
            Scalar::Bool(_) => None,
        }
    }
}

pub(crate) fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Scalar>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(Scalar::as_f64).filter(|v| v.is_finite()))
}

pub(crate) fn lenient_i32<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Scalar>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(Scalar::as_f64).and_then(|v| {
        // "2008.0" and 2008 are both a year; anything fractional is not
        if v.fract() == 0.0 && v >= i32::MIN as f64 && v <= i32::MAX as f64 {
            Some(v as i32)
        } else {
            None
        }
    }))
}

pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Scalar>::deserialize(deserializer)?;
    Ok(raw.and_then(Scalar::into_text))
}

pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "lenient_f64")]
        rate: Option<f64>,
        #[serde(default, deserialize_with = "lenient_i32")]
        year: Option<i32>,
        #[serde(default, deserialize_with = "null_as_default")]
        tags: Vec<String>,
    }

    #[test]
    fn numbers_and_numeric_strings_decode_alike() {
        let a: Probe = serde_json::from_str(r#"{"rate": 8.5, "year": 1994}"#).unwrap();
        let b: Probe = serde_json::from_str(r#"{"rate": "8.5", "year": "1994"}"#).unwrap();
        assert_eq!(a.rate, b.rate);
        assert_eq!(a.year, Some(1994));
        assert_eq!(b.year, Some(1994));
    }

    #[test]
    fn garbage_scalars_become_none() {
        let p: Probe =
            serde_json::from_str(r#"{"rate": "n/a", "year": "19xx", "tags": null}"#).unwrap();
        assert_eq!(p.rate, None);
        assert_eq!(p.year, None);
        assert!(p.tags.is_empty());
    }
}
