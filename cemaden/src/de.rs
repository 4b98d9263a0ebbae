//! Deserialization adapters for the CEMADEN JSON payloads.
//!
//! The web service is inconsistent about numeric fields: the same field can
//! arrive as a JSON number, as a quoted string, or as null when a gauge is
//! offline. These helpers accept any of those shapes.

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum RawF64 {
    Num(f64),
    Str(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawU32 {
    Num(u64),
    Str(String),
}

/// Deserializes an f64 given either a JSON number or a numeric string.
pub fn flex_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match RawF64::deserialize(deserializer)? {
        RawF64::Num(n) => Ok(n),
        RawF64::Str(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// Like [`flex_f64`] but treats null and empty strings as missing.
pub fn flex_f64_opt<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<RawF64>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawF64::Num(n)) => Ok(Some(n)),
        Some(RawF64::Str(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Ok(None)
            } else {
                trimmed.parse().map(Some).map_err(serde::de::Error::custom)
            }
        }
    }
}

/// Deserializes a u32 given either a JSON integer or a numeric string.
pub fn flex_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = match RawU32::deserialize(deserializer)? {
        RawU32::Num(n) => n,
        RawU32::Str(s) => s.trim().parse().map_err(serde::de::Error::custom)?,
    };
    u32::try_from(raw).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Probe {
        #[serde(deserialize_with = "super::flex_f64")]
        value: f64,
        #[serde(default, deserialize_with = "super::flex_f64_opt")]
        maybe: Option<f64>,
        #[serde(deserialize_with = "super::flex_u32")]
        code: u32,
    }

    #[test]
    fn accepts_numbers_and_strings() {
        let a: Probe =
            serde_json::from_str(r#"{"value": -7.095, "maybe": "1.4", "code": "2507507"}"#)
                .unwrap();
        assert_eq!(a.value, -7.095);
        assert_eq!(a.maybe, Some(1.4));
        assert_eq!(a.code, 2507507);

        let b: Probe =
            serde_json::from_str(r#"{"value": "-7.095", "maybe": null, "code": 2507507}"#).unwrap();
        assert_eq!(b.value, -7.095);
        assert_eq!(b.maybe, None);
        assert_eq!(b.code, 2507507);
    }

    #[test]
    fn empty_string_counts_as_missing() {
        let p: Probe = serde_json::from_str(r#"{"value": 0.0, "maybe": "  ", "code": 1}"#).unwrap();
        assert_eq!(p.maybe, None);
    }

    #[test]
    fn missing_field_counts_as_missing() {
        let p: Probe = serde_json::from_str(r#"{"value": 0.0, "code": 1}"#).unwrap();
        assert_eq!(p.maybe, None);
    }

    #[test]
    fn rejects_non_numeric_strings() {
        let r = serde_json::from_str::<Probe>(r#"{"value": "wet", "maybe": null, "code": 1}"#);
        assert!(r.is_err());
    }
}
