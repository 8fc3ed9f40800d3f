//! Lenient decoders for the loosely typed fields the API returns.

use serde::de::Error;
use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Str(String),
    Int(i64),
    Uint(u64),
    Float(f64),
}

impl Scalar {
    fn into_string(self) -> String {
        match self {
            Scalar::Str(s) => s,
            Scalar::Int(i) => i.to_string(),
            Scalar::Uint(u) => u.to_string(),
            Scalar::Float(f) => f.to_string(),
        }
    }
}

pub fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Scalar::deserialize(deserializer)?.into_string())
}

pub fn opt_string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<Scalar>::deserialize(deserializer)?.map(Scalar::into_string))
}

/// Counts arrive as `4`, `"4"` or `""`; the empty string means unknown.
pub fn opt_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
    match Option::<Scalar>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Scalar::Str(s)) if s.trim().is_empty() => Ok(None),
        Some(Scalar::Str(s)) => s.trim().parse().map(Some).map_err(D::Error::custom),
        Some(Scalar::Int(i)) => u32::try_from(i).map(Some).map_err(D::Error::custom),
        Some(Scalar::Uint(u)) => u32::try_from(u).map(Some).map_err(D::Error::custom),
        Some(Scalar::Float(f)) => Err(D::Error::custom(format!("expected a whole count, got {f}"))),
    }
}
