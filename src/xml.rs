//! XML encoding of arbitrary values.
//!
//! `quick-xml` takes the root element from the type name, which only exists
//! for structs and enums. Everything else gets a fixed root:
//!
//! | value | body |
//! |---|---|
//! | `()`, `None`, JSON `null` | empty |
//! | `"hi"` | `<string>hi</string>` |
//! | `42` / `-1` / `1.5` / `true` | `<uint>`, `<int>`, `<float>`, `<bool>` |
//! | `vec![1, 2]` | `<item>1</item><item>2</item>` |
//! | a map | `<map>…</map>` |
//! | a newtype or tuple struct | its own name |

use quick_xml::SeError;
use serde::Serialize;
use serde::ser::{self, Serializer};

pub(crate) fn to_vec<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, SeError> {
    let xml = match value.serialize(Probe)? {
        Root::Empty => String::new(),
        Root::Named => quick_xml::se::to_string(value)?,
        Root::Tag(tag) => quick_xml::se::to_string_with_root(tag, value)?,
    };
    Ok(xml.into_bytes())
}

/// Root element a value needs.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Root {
    Empty,
    /// `quick-xml` derives the root itself.
    Named,
    Tag(&'static str),
}

/// Looks at the top level of a value only; fields and elements are never
/// visited.
struct Probe;

/// Swallows the contents of a compound value.
struct Skip(Root);

impl Serializer for Probe {
    type Ok = Root;
    type Error = SeError;

    type SerializeSeq = Skip;
    type SerializeTuple = Skip;
    type SerializeTupleStruct = Skip;
    type SerializeTupleVariant = Skip;
    type SerializeMap = Skip;
    type SerializeStruct = Skip;
    type SerializeStructVariant = Skip;

    fn serialize_bool(self, _v: bool) -> Result<Root, SeError> {
        Ok(Root::Tag("bool"))
    }

    fn serialize_i8(self, _v: i8) -> Result<Root, SeError> {
        Ok(Root::Tag("int"))
    }

    fn serialize_i16(self, _v: i16) -> Result<Root, SeError> {
        Ok(Root::Tag("int"))
    }

    fn serialize_i32(self, _v: i32) -> Result<Root, SeError> {
        Ok(Root::Tag("int"))
    }

    fn serialize_i64(self, _v: i64) -> Result<Root, SeError> {
        Ok(Root::Tag("int"))
    }

    fn serialize_i128(self, _v: i128) -> Result<Root, SeError> {
        Ok(Root::Tag("int"))
    }

    fn serialize_u8(self, _v: u8) -> Result<Root, SeError> {
        Ok(Root::Tag("uint"))
    }

    fn serialize_u16(self, _v: u16) -> Result<Root, SeError> {
        Ok(Root::Tag("uint"))
    }

    fn serialize_u32(self, _v: u32) -> Result<Root, SeError> {
        Ok(Root::Tag("uint"))
    }

    fn serialize_u64(self, _v: u64) -> Result<Root, SeError> {
        Ok(Root::Tag("uint"))
    }

    fn serialize_u128(self, _v: u128) -> Result<Root, SeError> {
        Ok(Root::Tag("uint"))
    }

    fn serialize_f32(self, _v: f32) -> Result<Root, SeError> {
        Ok(Root::Tag("float"))
    }

    fn serialize_f64(self, _v: f64) -> Result<Root, SeError> {
        Ok(Root::Tag("float"))
    }

    fn serialize_char(self, _v: char) -> Result<Root, SeError> {
        Ok(Root::Tag("string"))
    }

    fn serialize_str(self, _v: &str) -> Result<Root, SeError> {
        Ok(Root::Tag("string"))
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<Root, SeError> {
        Ok(Root::Tag("bytes"))
    }

    fn serialize_none(self) -> Result<Root, SeError> {
        Ok(Root::Empty)
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<Root, SeError> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Root, SeError> {
        Ok(Root::Empty)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Root, SeError> {
        Ok(Root::Named)
    }

    fn serialize_unit_variant(self, _name: &'static str, _index: u32, _variant: &'static str) -> Result<Root, SeError> {
        Ok(Root::Named)
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(self, name: &'static str, _value: &T) -> Result<Root, SeError> {
        Ok(Root::Tag(name))
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<Root, SeError> {
        Ok(Root::Named)
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Skip, SeError> {
        Ok(Skip(Root::Tag("item")))
    }

    fn serialize_tuple(self, _len: usize) -> Result<Skip, SeError> {
        Ok(Skip(Root::Tag("item")))
    }

    fn serialize_tuple_struct(self, name: &'static str, _len: usize) -> Result<Skip, SeError> {
        Ok(Skip(Root::Tag(name)))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Skip, SeError> {
        Ok(Skip(Root::Named))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Skip, SeError> {
        Ok(Skip(Root::Tag("map")))
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Skip, SeError> {
        Ok(Skip(Root::Named))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Skip, SeError> {
        Ok(Skip(Root::Named))
    }
}

impl ser::SerializeSeq for Skip {
    type Ok = Root;
    type Error = SeError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, _value: &T) -> Result<(), SeError> {
        Ok(())
    }

    fn end(self) -> Result<Root, SeError> {
        Ok(self.0)
    }
}

impl ser::SerializeTuple for Skip {
    type Ok = Root;
    type Error = SeError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, _value: &T) -> Result<(), SeError> {
        Ok(())
    }

    fn end(self) -> Result<Root, SeError> {
        Ok(self.0)
    }
}

impl ser::SerializeTupleStruct for Skip {
    type Ok = Root;
    type Error = SeError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, _value: &T) -> Result<(), SeError> {
        Ok(())
    }

    fn end(self) -> Result<Root, SeError> {
        Ok(self.0)
    }
}

impl ser::SerializeTupleVariant for Skip {
    type Ok = Root;
    type Error = SeError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, _value: &T) -> Result<(), SeError> {
        Ok(())
    }

    fn end(self) -> Result<Root, SeError> {
        Ok(self.0)
    }
}

impl ser::SerializeMap for Skip {
    type Ok = Root;
    type Error = SeError;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, _key: &T) -> Result<(), SeError> {
        Ok(())
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, _value: &T) -> Result<(), SeError> {
        Ok(())
    }

    fn end(self) -> Result<Root, SeError> {
        Ok(self.0)
    }
}

impl ser::SerializeStruct for Skip {
    type Ok = Root;
    type Error = SeError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, _key: &'static str, _value: &T) -> Result<(), SeError> {
        Ok(())
    }

    fn end(self) -> Result<Root, SeError> {
        Ok(self.0)
    }
}

impl ser::SerializeStructVariant for Skip {
    type Ok = Root;
    type Error = SeError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, _key: &'static str, _value: &T) -> Result<(), SeError> {
        Ok(())
    }

    fn end(self) -> Result<Root, SeError> {
        Ok(self.0)
    }
}
