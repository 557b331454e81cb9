//! Lenient deserializers for fields the API sometimes sends as strings

use serde::{Deserialize, Deserializer, de::Error};

#[derive(Deserialize)]
#[serde(untagged)]
enum Loose {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
}

fn loose_to_i64<E: Error>(value: Loose) -> Result<i64, E> {
    match value {
        Loose::Int(n) => Ok(n),
        Loose::Float(f) if f.fract() == 0.0 => Ok(f as i64),
        Loose::Float(f) => Err(E::custom(format!("expected an integer, got {f}"))),
        Loose::Bool(b) => Ok(i64::from(b)),
        Loose::Str(s) => s
            .trim()
            .parse()
            .map_err(|_| E::custom(format!("expected an integer, got {s:?}"))),
    }
}

pub fn i64_lenient<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    loose_to_i64(Loose::deserialize(deserializer)?)
}

pub fn i32_lenient<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i32, D::Error> {
    match Option::<Loose>::deserialize(deserializer)? {
        None => Ok(0),
        Some(value) => {
            let n = loose_to_i64::<D::Error>(value)?;
            i32::try_from(n).map_err(|_| D::Error::custom(format!("{n} is out of range")))
        }
    }
}

/// Null, empty strings and zero all mean "no parent"
pub fn opt_i64_lenient<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<i64>, D::Error> {
    match Option::<Loose>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Loose::Str(s)) if s.trim().is_empty() => Ok(None),
        Some(value) => Ok(Some(loose_to_i64::<D::Error>(value)?).filter(|id| *id != 0)),
    }
}

pub fn bool_lenient<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(match Option::<Loose>::deserialize(deserializer)? {
        None => false,
        Some(Loose::Bool(b)) => b,
        Some(Loose::Int(n)) => n != 0,
        Some(Loose::Float(f)) => f != 0.0,
        Some(Loose::Str(s)) => matches!(s.trim(), "1" | "true" | "yes"),
    })
}

pub fn string_lenient<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Option::<Loose>::deserialize(deserializer)? {
        None => String::new(),
        Some(Loose::Str(s)) => s,
        Some(Loose::Int(n)) => n.to_string(),
        Some(Loose::Float(f)) => f.to_string(),
        Some(Loose::Bool(b)) => b.to_string(),
    })
}

pub fn url_or_sentinel<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let url = Option::<String>::deserialize(deserializer)?;
    Ok(super::menu::normalize_url(url.as_deref().unwrap_or_default()))
}

pub fn parent_name_or_root<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<String, D::Error> {
    let name = Option::<String>::deserialize(deserializer)?;
    Ok(match name {
        Some(name) if !name.trim().is_empty() => name,
        _ => super::menu::ROOT_PARENT_NAME.to_string(),
    })
}
