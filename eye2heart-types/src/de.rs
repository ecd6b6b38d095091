//! Lenient deserializers for untrusted API fields.
//!
//! A single malformed field must not reject the whole vitals payload, so each
//! field is read as "any JSON value" and narrowed afterwards.

use alloc::string::String;
use core::fmt;

use serde::de::{Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::{Serialize, Serializer};

use crate::HeartRate;

enum Loose {
    Number(f64),
    Text(String),
    Null,
    Other,
}

struct LooseVisitor;

impl<'de> Visitor<'de> for LooseVisitor {
    type Value = Loose;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any JSON value")
    }

    fn visit_bool<E>(self, _v: bool) -> Result<Loose, E> {
        Ok(Loose::Other)
    }

    fn visit_i64<E>(self, v: i64) -> Result<Loose, E> {
        Ok(Loose::Number(v as f64))
    }

    fn visit_u64<E>(self, v: u64) -> Result<Loose, E> {
        Ok(Loose::Number(v as f64))
    }

    fn visit_f64<E>(self, v: f64) -> Result<Loose, E> {
        Ok(Loose::Number(v))
    }

    fn visit_str<E>(self, v: &str) -> Result<Loose, E> {
        Ok(Loose::Text(v.into()))
    }

    fn visit_string<E>(self, v: String) -> Result<Loose, E> {
        Ok(Loose::Text(v))
    }

    fn visit_unit<E>(self) -> Result<Loose, E> {
        Ok(Loose::Null)
    }

    fn visit_none<E>(self) -> Result<Loose, E> {
        Ok(Loose::Null)
    }

    fn visit_some<D>(self, deserializer: D) -> Result<Loose, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(LooseVisitor)
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Loose, A::Error>
    where
        A: SeqAccess<'de>,
    {
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        Ok(Loose::Other)
    }

    fn visit_map<A>(self, mut map: A) -> Result<Loose, A::Error>
    where
        A: MapAccess<'de>,
    {
        while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
        Ok(Loose::Other)
    }
}

fn loose<'de, D>(deserializer: D) -> Result<Loose, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(LooseVisitor)
}

/// `null` becomes `None`; anything that is not a number or string is kept as
/// [`HeartRate::Invalid`] so callers can still see a value was supplied.
pub(crate) fn heart_rate<'de, D>(deserializer: D) -> Result<Option<HeartRate>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match loose(deserializer)? {
        Loose::Number(n) => Some(HeartRate::Number(n)),
        Loose::Text(s) => Some(HeartRate::Text(s)),
        Loose::Null => None,
        Loose::Other => Some(HeartRate::Invalid),
    })
}

pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match loose(deserializer)? {
        Loose::Text(s) => Some(s),
        _ => None,
    })
}

pub(crate) fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match loose(deserializer)? {
        Loose::Number(n) => Some(n),
        Loose::Text(s) => s.trim().parse().ok(),
        _ => None,
    })
}

impl Serialize for HeartRate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            HeartRate::Number(n) => serializer.serialize_f64(*n),
            HeartRate::Text(s) => serializer.serialize_str(s),
            HeartRate::Invalid => serializer.serialize_unit(),
        }
    }
}
