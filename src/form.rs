//! `application/x-www-form-urlencoded` decoding into structs.
//!
//! Field names come from the target's `Deserialize` impl (serde hands them
//! over in `deserialize_struct`), so `#[serde(rename)]` is honoured and no
//! runtime introspection is involved. Matching rules:
//!
//! - form keys are compared to field names ignoring ASCII case;
//! - when a key repeats, the first value wins;
//! - keys with no matching field are ignored;
//! - only string-shaped fields (`String`, `Option<String>`, string newtypes)
//!   are filled. A matched `u32` or nested struct is skipped;
//! - a field that ends up unfilled keeps its serde default (`Option` becomes
//!   `None`, `#[serde(default)]` applies) and otherwise its zero value: `0`,
//!   `false`, `""`, an empty collection, a struct of zero values.
//!
//! Serde cannot ask a type for its zero value up front, so decoding runs in
//! passes. A pass that trips over an unsettable or missing field records it
//! and the next pass treats it accordingly. Each pass settles at least one
//! field, so a struct with `n` fields takes at most `2n + 1` passes.

use std::collections::HashSet;
use std::fmt;
use std::iter;

use serde::de::value::{MapDeserializer, SeqDeserializer};
use serde::de::{self, DeserializeOwned, Deserializer, IntoDeserializer, Visitor};
use serde::forward_to_deserialize_any;

/// Failure to map a form body onto a struct.
#[derive(Debug, thiserror::Error)]
pub enum FormError {
    #[error("malformed form body: {0}")]
    Syntax(#[from] serde_urlencoded::de::Error),

    #[error("{0}")]
    Field(String),

    /// A matched field whose type cannot be built from text.
    #[error("field `{0}` cannot be set from a form value")]
    Unsettable(&'static str),

    #[error("missing field `{0}`")]
    Missing(&'static str),
}

impl de::Error for FormError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Self::Field(msg.to_string())
    }

    fn missing_field(field: &'static str) -> Self {
        Self::Missing(field)
    }
}

pub(crate) fn from_bytes<T: DeserializeOwned>(body: &[u8]) -> Result<T, FormError> {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(body)?;
    let mut plan = Plan::default();
    loop {
        match T::deserialize(FormDeserializer { pairs: &pairs, plan: &plan }) {
            Err(FormError::Unsettable(field)) if plan.skipped.insert(field) => {}
            Err(FormError::Missing(field)) if plan.zeroed.insert(field) => {}
            result => return result,
        }
    }
}

/// What earlier passes learned about the target's fields.
#[derive(Default)]
struct Plan {
    /// Matched, but not string-shaped.
    skipped: HashSet<&'static str>,
    /// Unfilled and without a serde default.
    zeroed: HashSet<&'static str>,
}

// ── Struct level ──────────────────────────────────────────────────────────────

struct FormDeserializer<'a> {
    pairs: &'a [(String, String)],
    plan: &'a Plan,
}

impl FormDeserializer<'_> {
    fn first(&self, field: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(field))
            .map(|(_, value)| value.as_str())
    }

    fn slot(&self, field: &'static str) -> Option<Slot> {
        match self.first(field).filter(|_| !self.plan.skipped.contains(field)) {
            Some(value) => Some(Slot::Text { field, value: value.to_owned() }),
            None if self.plan.zeroed.contains(field) => Some(Slot::Zero),
            None => None,
        }
    }
}

impl<'de> Deserializer<'de> for FormDeserializer<'_> {
    type Error = FormError;

    fn deserialize_any<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value, Self::Error> {
        Err(FormError::Field("form bodies can only be decoded into structs".to_owned()))
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        let entries: Vec<(&'static str, Slot)> = fields
            .iter()
            .filter_map(|&field| self.slot(field).map(|slot| (field, slot)))
            .collect();
        visitor.visit_map(MapDeserializer::new(entries.into_iter()))
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf option unit unit_struct newtype_struct seq tuple
        tuple_struct map enum identifier ignored_any
    }
}

// ── Field level ───────────────────────────────────────────────────────────────

/// The value handed to one struct field.
enum Slot {
    /// A form value. Only string-shaped requests accept it.
    Text { field: &'static str, value: String },
    Zero,
}

impl<'de> IntoDeserializer<'de, FormError> for Slot {
    type Deserializer = Self;

    fn into_deserializer(self) -> Self::Deserializer {
        self
    }
}

macro_rules! text_only {
    ($($method:ident)*) => {$(
        fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
            match self {
                Self::Text { field, .. } => Err(FormError::Unsettable(field)),
                Self::Zero => Zero.$method(visitor),
            }
        }
    )*};
}

impl<'de> Deserializer<'de> for Slot {
    type Error = FormError;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        match self {
            Self::Text { value, .. } => visitor.visit_string(value),
            Self::Zero => Zero.deserialize_any(visitor),
        }
    }

    fn deserialize_str<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        self.deserialize_any(visitor)
    }

    fn deserialize_string<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        self.deserialize_any(visitor)
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        match self {
            Self::Text { .. } => visitor.visit_some(self),
            Self::Zero => visitor.visit_none(),
        }
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_unit_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        match self {
            Self::Text { field, .. } => Err(FormError::Unsettable(field)),
            Self::Zero => Zero.deserialize_unit_struct(name, visitor),
        }
    }

    fn deserialize_tuple<V: Visitor<'de>>(self, len: usize, visitor: V) -> Result<V::Value, Self::Error> {
        match self {
            Self::Text { field, .. } => Err(FormError::Unsettable(field)),
            Self::Zero => Zero.deserialize_tuple(len, visitor),
        }
    }

    fn deserialize_tuple_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        len: usize,
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        match self {
            Self::Text { field, .. } => Err(FormError::Unsettable(field)),
            Self::Zero => Zero.deserialize_tuple_struct(name, len, visitor),
        }
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        match self {
            Self::Text { field, .. } => Err(FormError::Unsettable(field)),
            Self::Zero => Zero.deserialize_struct(name, fields, visitor),
        }
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        name: &'static str,
        variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        match self {
            Self::Text { field, .. } => Err(FormError::Unsettable(field)),
            Self::Zero => Zero.deserialize_enum(name, variants, visitor),
        }
    }

    fn deserialize_ignored_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        visitor.visit_unit()
    }

    text_only! {
        deserialize_bool deserialize_i8 deserialize_i16 deserialize_i32 deserialize_i64
        deserialize_i128 deserialize_u8 deserialize_u16 deserialize_u32 deserialize_u64
        deserialize_u128 deserialize_f32 deserialize_f64 deserialize_char deserialize_bytes
        deserialize_byte_buf deserialize_unit deserialize_seq deserialize_map
        deserialize_identifier
    }
}

// ── Zero values ───────────────────────────────────────────────────────────────

/// Produces the zero value of whatever type asks for one.
#[derive(Clone, Copy)]
struct Zero;

impl<'de> IntoDeserializer<'de, FormError> for Zero {
    type Deserializer = Self;

    fn into_deserializer(self) -> Self::Deserializer {
        self
    }
}

macro_rules! zero_number {
    ($($method:ident => $visit:ident($zero:expr),)*) => {$(
        fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
            visitor.$visit($zero)
        }
    )*};
}

impl<'de> Deserializer<'de> for Zero {
    type Error = FormError;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        visitor.visit_unit()
    }

    zero_number! {
        deserialize_bool => visit_bool(false),
        deserialize_i8 => visit_i8(0),
        deserialize_i16 => visit_i16(0),
        deserialize_i32 => visit_i32(0),
        deserialize_i64 => visit_i64(0),
        deserialize_i128 => visit_i128(0),
        deserialize_u8 => visit_u8(0),
        deserialize_u16 => visit_u16(0),
        deserialize_u32 => visit_u32(0),
        deserialize_u64 => visit_u64(0),
        deserialize_u128 => visit_u128(0),
        deserialize_f32 => visit_f32(0.0),
        deserialize_f64 => visit_f64(0.0),
        deserialize_char => visit_char('\0'),
        deserialize_str => visit_str(""),
        deserialize_string => visit_str(""),
        deserialize_bytes => visit_bytes(&[]),
        deserialize_byte_buf => visit_bytes(&[]),
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        visitor.visit_none()
    }

    fn deserialize_unit<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        visitor.visit_unit()
    }

    fn deserialize_unit_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        visitor.visit_unit()
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        visitor.visit_seq(SeqDeserializer::<_, FormError>::new(iter::empty::<Zero>()))
    }

    fn deserialize_tuple<V: Visitor<'de>>(self, len: usize, visitor: V) -> Result<V::Value, Self::Error> {
        visitor.visit_seq(SeqDeserializer::<_, FormError>::new(iter::repeat_n(Zero, len)))
    }

    fn deserialize_tuple_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        len: usize,
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        self.deserialize_tuple(len, visitor)
    }

    fn deserialize_map<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        visitor.visit_map(MapDeserializer::<_, FormError>::new(iter::empty::<(Zero, Zero)>()))
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        let entries = fields.iter().map(|&field| (field, Zero));
        visitor.visit_map(MapDeserializer::<_, FormError>::new(entries))
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        name: &'static str,
        _variants: &'static [&'static str],
        _visitor: V,
    ) -> Result<V::Value, Self::Error> {
        Err(FormError::Field(format!("enum `{name}` has no zero value")))
    }

    fn deserialize_identifier<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value, Self::Error> {
        Err(FormError::Field("identifiers have no zero value".to_owned()))
    }

    fn deserialize_ignored_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        visitor.visit_unit()
    }
}
