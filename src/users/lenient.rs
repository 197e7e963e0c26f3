//! Tolerant decoders for form-shaped JSON.
//!
//! The dashboard posts whatever its form controls hold: a crop list may arrive
//! as `["Wheat", "Corn"]`, as `"Wheat, Corn"` or as a bare number, and numeric
//! fields are frequently strings. These helpers fold all of those into the
//! typed profile fields.

use serde::{de, Deserialize, Deserializer};

use super::profile::PesticideUsage;

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Str(String),
    Num(serde_json::Number),
    Bool(bool),
}

impl Scalar {
    fn into_text(self) -> String {
        match self {
            Scalar::Str(s) => s.trim().to_string(),
            Scalar::Num(n) => n.to_string(),
            Scalar::Bool(b) => b.to_string(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ListInput {
    Many(Vec<Scalar>),
    One(Scalar),
}

impl ListInput {
    fn into_list(self) -> Vec<String> {
        match self {
            ListInput::Many(items) => items
                .into_iter()
                .map(Scalar::into_text)
                .filter(|s| !s.is_empty())
                .collect(),
            ListInput::One(Scalar::Str(s)) => split_list(&s),
            ListInput::One(other) => vec![other.into_text()],
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PesticideInput {
    Entry(PesticideUsage),
    Text(Scalar),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PesticidesInput {
    Many(Vec<PesticideInput>),
    One(PesticideInput),
}

impl PesticidesInput {
    fn into_list(self) -> Vec<PesticideUsage> {
        let items = match self {
            PesticidesInput::Many(items) => items,
            PesticidesInput::One(PesticideInput::Text(Scalar::Str(s))) => {
                return split_list(&s).iter().map(|e| parse_pesticide(e)).collect();
            }
            PesticidesInput::One(item) => vec![item],
        };
        items
            .into_iter()
            .map(|item| match item {
                PesticideInput::Entry(p) => PesticideUsage {
                    name: p.name.trim().to_string(),
                    frequency: p.frequency.trim().to_string(),
                },
                PesticideInput::Text(s) => parse_pesticide(&s.into_text()),
            })
            .filter(|p| !p.name.is_empty())
            .collect()
    }
}

/// Splits a comma separated form value into trimmed, non-empty entries.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parses `"name"` or `"name:frequency"`.
pub fn parse_pesticide(raw: &str) -> PesticideUsage {
    let (name, frequency) = raw.split_once(':').unwrap_or((raw, ""));
    PesticideUsage {
        name: name.trim().to_string(),
        frequency: frequency.trim().to_string(),
    }
}

/// Parses a numeric form value; blank input means "not provided".
pub fn parse_number(raw: &str) -> Result<Option<f64>, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<f64>()
        .map(Some)
        .map_err(|_| format!("\"{raw}\" is not a number"))
}

pub fn text<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(Option::<Scalar>::deserialize(d)?
        .map(Scalar::into_text)
        .unwrap_or_default())
}

pub fn opt_text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<Scalar>::deserialize(d)?
        .map(Scalar::into_text)
        .filter(|s| !s.is_empty()))
}

/// Like [`opt_text`] but keeps an explicitly blank value as `Some("")`.
pub fn opt_raw_text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<Scalar>::deserialize(d)?.map(Scalar::into_text))
}

pub fn string_list<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
    Ok(Option::<ListInput>::deserialize(d)?
        .map(ListInput::into_list)
        .unwrap_or_default())
}

pub fn opt_string_list<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Vec<String>>, D::Error> {
    Ok(Option::<ListInput>::deserialize(d)?.map(ListInput::into_list))
}

pub fn pesticides<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<PesticideUsage>, D::Error> {
    Ok(Option::<PesticidesInput>::deserialize(d)?
        .map(PesticidesInput::into_list)
        .unwrap_or_default())
}

pub fn opt_pesticides<'de, D: Deserializer<'de>>(
    d: D,
) -> Result<Option<Vec<PesticideUsage>>, D::Error> {
    Ok(Option::<PesticidesInput>::deserialize(d)?.map(PesticidesInput::into_list))
}

pub fn number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    match Option::<Scalar>::deserialize(d)? {
        None => Ok(None),
        Some(Scalar::Num(n)) => n
            .as_f64()
            .map(Some)
            .ok_or_else(|| de::Error::custom("number out of range")),
        Some(Scalar::Str(s)) => parse_number(&s).map_err(de::Error::custom),
        Some(Scalar::Bool(_)) => Err(de::Error::custom("expected a number")),
    }
}
