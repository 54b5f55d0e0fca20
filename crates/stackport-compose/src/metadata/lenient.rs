//! Field deserializers that tolerate community metadata of the wrong shape.
//!
//! A field of an unexpected type reads as absent instead of rejecting the
//! whole metadata document.

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer};

use super::vendor::LocalizedText;

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Str(String),
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
    Other(IgnoredAny),
}

impl Scalar {
    fn into_string(self) -> Option<String> {
        let s = match self {
            Self::Str(s) => s,
            Self::Int(n) => n.to_string(),
            Self::UInt(n) => n.to_string(),
            Self::Float(n) => n.to_string(),
            Self::Bool(b) => b.to_string(),
            Self::Other(_) => return None,
        };
        let trimmed = s.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_owned())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LooseText {
    Text(LocalizedText),
    Scalar(Scalar),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ListOrOne {
    List(Vec<Scalar>),
    One(Scalar),
}

/// Any scalar as a trimmed, non-empty string.
pub fn string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Scalar::deserialize(deserializer)?.into_string())
}

/// A localized text, a plain string, or any scalar rendered as text.
pub fn localized<'de, D>(deserializer: D) -> Result<Option<LocalizedText>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match LooseText::deserialize(deserializer)? {
        LooseText::Text(LocalizedText::Plain(s)) if s.trim().is_empty() => None,
        LooseText::Text(text) => Some(text),
        LooseText::Scalar(scalar) => scalar.into_string().map(LocalizedText::Plain),
    })
}

/// A list of strings; a single string reads as a one-element list.
pub fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = match ListOrOne::deserialize(deserializer)? {
        ListOrOne::List(items) => items,
        ListOrOne::One(item) => vec![item],
    };
    Ok(items
        .into_iter()
        .filter_map(|item| match item {
            Scalar::Str(s) if !s.trim().is_empty() => Some(s.trim().to_owned()),
            _ => None,
        })
        .collect())
}
