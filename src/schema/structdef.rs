// Composition engine: ordered named fields assembled into a composite
// FieldType with whole-buffer decode/encode, offset lookup and in-place
// single-field patching.

use std::collections::HashMap;

use chrono::NaiveDate;

use super::errors::{FormatError, RangeError, Warning};
use super::field::{Field, FieldType};
use super::value::Value;

/// An ordered collection of named fields, itself a `FieldType` so schemas
/// nest. Built once at startup and immutable thereafter; layout is the sum
/// of the children's fixed widths, walked strictly in declaration order.
pub struct StructSchema {
    name: &'static str,
    fields: Vec<Field>,
    size: usize,
}

impl StructSchema {
    /// Panics on duplicate field names; schemas are process-wide constants
    /// defined at startup, so a duplicate is a construction bug.
    pub fn new(name: &'static str, fields: Vec<Field>) -> Self {
        for (i, field) in fields.iter().enumerate() {
            assert!(
                fields[i + 1..].iter().all(|f| f.name() != field.name()),
                "duplicate field name `{}` in struct `{}`",
                field.name(),
                name
            );
        }
        let size = fields.iter().map(|f| f.size()).sum();
        Self { name, fields, size }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter()
    }

    /// Byte offset and width of a named field within this struct's encoding,
    /// found by summing the widths of all fields declared before it. Used to
    /// address a field inside an already-produced buffer without re-encoding.
    pub fn locate(&self, name: &str) -> Option<(usize, usize)> {
        let mut offset = 0;
        for field in &self.fields {
            if field.name() == name {
                return Some((offset, field.size()));
            }
            offset += field.size();
        }
        None
    }

    /// Re-encode a single field and patch its bytes into an already-produced
    /// buffer in place. The buffer must be at least as long as this struct's
    /// encoding starting at `base`.
    pub fn update(
        &self,
        name: &str,
        value: &Value,
        base: usize,
        buf: &mut [u8],
    ) -> Result<(), RangeError> {
        let mut offset = 0;
        for field in &self.fields {
            if field.name() == name {
                let bytes = field
                    .field_type()
                    .encode(value)
                    .map_err(|e| e.in_field(name))?;
                buf[base + offset..base + offset + field.size()].copy_from_slice(&bytes);
                return Ok(());
            }
            offset += field.size();
        }
        Err(RangeError::UnknownField(name.to_string()))
    }
}

impl FieldType for StructSchema {
    fn size(&self) -> usize {
        self.size
    }

    fn default_value(&self) -> Value {
        Value::Struct(StructValue::new())
    }

    fn decode(&self, data: &[u8], warnings: &mut Vec<Warning>) -> Result<Value, FormatError> {
        let mut rest = data;
        let mut value = StructValue::new();

        for field in &self.fields {
            let width = field.size();
            if rest.len() < width {
                return Err(FormatError::BufferTooShort {
                    expected: width,
                    actual: rest.len(),
                }
                .in_field(field.name()));
            }
            let (head, tail) = rest.split_at(width);
            let decoded = field
                .field_type()
                .decode(head, warnings)
                .map_err(|e| e.in_field(field.name()))?;
            value.set(field.name(), decoded);
            rest = tail;
        }

        Ok(Value::Struct(value))
    }

    fn encode(&self, value: &Value) -> Result<Vec<u8>, RangeError> {
        let values = value
            .as_struct()
            .ok_or_else(|| RangeError::TypeMismatch {
                expected: "struct",
                actual: value.kind(),
            })?;

        let mut out = Vec::with_capacity(self.size);
        for field in &self.fields {
            // Unset fields fall back to their type's default
            let bytes = match values.get(field.name()) {
                Some(v) => field.field_type().encode(v),
                None => field.field_type().encode(&field.field_type().default_value()),
            }
            .map_err(|e| e.in_field(field.name()))?;
            out.extend(bytes);
        }
        Ok(out)
    }
}

/// A decoded or to-be-encoded struct: a mutable name-to-value mapping.
///
/// Storage is unordered; on-wire layout always comes from the schema's
/// declaration order, never from this map.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StructValue {
    values: HashMap<String, Value>,
}

impl StructValue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    // Typed conveniences; None on absent field or variant mismatch.

    pub fn uint(&self, name: &str) -> Option<u64> {
        self.get(name).and_then(Value::as_uint)
    }

    pub fn float(&self, name: &str) -> Option<f32> {
        self.get(name).and_then(Value::as_float)
    }

    pub fn str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    pub fn date(&self, name: &str) -> Option<NaiveDate> {
        self.get(name).and_then(Value::as_date)
    }

    pub fn enum_name(&self, name: &str) -> Option<&'static str> {
        self.get(name).and_then(Value::as_enum).map(|(_, n)| n)
    }

    pub fn array(&self, name: &str) -> Option<&[Value]> {
        self.get(name).and_then(Value::as_array)
    }

    pub fn child(&self, name: &str) -> Option<&StructValue> {
        self.get(name).and_then(Value::as_struct)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::primitives::{ArrayField, AsciiString, Padding, UInt16, UInt8};

    fn sample_schema() -> StructSchema {
        StructSchema::new(
            "sample",
            vec![
                Field::new("tag", AsciiString::new(3)),
                Field::new("pad", Padding::new(1)),
                Field::new("count", UInt16),
                Field::new("values", ArrayField::new(UInt8, 4)),
            ],
        )
    }

    #[test]
    fn test_size_is_sum_of_fields() {
        assert_eq!(sample_schema().size(), 3 + 1 + 2 + 4);
    }

    #[test]
    fn test_decode_in_declaration_order() {
        let schema = sample_schema();
        let data = [b'A', b'B', b'C', 0xFF, 0x34, 0x12, 1, 2, 3, 4];
        let mut warnings = Vec::new();
        let value = schema.decode(&data, &mut warnings).unwrap();
        let sv = value.as_struct().unwrap();

        assert_eq!(sv.str("tag"), Some("ABC"));
        assert_eq!(sv.uint("count"), Some(0x1234));
        assert_eq!(
            sv.array("values"),
            Some(
                &[
                    Value::UInt(1),
                    Value::UInt(2),
                    Value::UInt(3),
                    Value::UInt(4)
                ][..]
            )
        );
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_decode_buffer_too_short() {
        let schema = sample_schema();
        let mut warnings = Vec::new();
        let err = schema.decode(&[b'A', b'B'], &mut warnings).unwrap_err();
        match err {
            FormatError::Field { field, source } => {
                assert_eq!(field, "tag");
                assert!(matches!(
                    *source,
                    FormatError::BufferTooShort {
                        expected: 3,
                        actual: 2
                    }
                ));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_encode_fills_defaults() {
        let schema = sample_schema();
        let mut sv = StructValue::new();
        sv.set("tag", "NDI");
        // count and values unset: default to zero
        let bytes = schema.encode(&Value::Struct(sv)).unwrap();
        assert_eq!(bytes, vec![b'N', b'D', b'I', 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_encode_decode_round_trip() {
        let schema = sample_schema();
        let mut sv = StructValue::new();
        sv.set("tag", "XY");
        sv.set("count", 513u16);
        sv.set(
            "values",
            vec![Value::UInt(9), Value::UInt(8), Value::UInt(7)],
        );

        let bytes = schema.encode(&Value::Struct(sv)).unwrap();
        assert_eq!(bytes.len(), schema.size());

        let mut warnings = Vec::new();
        let back = schema.decode(&bytes, &mut warnings).unwrap();
        let sv = back.as_struct().unwrap();
        assert_eq!(sv.str("tag"), Some("XY"));
        assert_eq!(sv.uint("count"), Some(513));
        // Short array was padded to capacity with defaults
        assert_eq!(sv.array("values").unwrap().len(), 4);
        assert_eq!(sv.array("values").unwrap()[3], Value::UInt(0));
    }

    #[test]
    fn test_locate() {
        let schema = sample_schema();
        assert_eq!(schema.locate("tag"), Some((0, 3)));
        assert_eq!(schema.locate("pad"), Some((3, 1)));
        assert_eq!(schema.locate("count"), Some((4, 2)));
        assert_eq!(schema.locate("values"), Some((6, 4)));
        assert_eq!(schema.locate("missing"), None);
    }

    #[test]
    fn test_update_patches_in_place() {
        let schema = sample_schema();
        let mut buf = schema.encode(&Value::Struct(StructValue::new())).unwrap();
        schema
            .update("count", &Value::UInt(0xBEEF), 0, &mut buf)
            .unwrap();
        assert_eq!(&buf[4..6], &[0xEF, 0xBE]);
        // Neighbouring bytes untouched
        assert_eq!(buf[3], 0);
        assert_eq!(buf[6], 0);
    }

    #[test]
    fn test_nested_struct() {
        let inner = StructSchema::new("inner", vec![Field::new("x", UInt8)]);
        let outer = StructSchema::new(
            "outer",
            vec![Field::new("inner", inner), Field::new("y", UInt8)],
        );
        assert_eq!(outer.size(), 2);

        let mut warnings = Vec::new();
        let value = outer.decode(&[5, 6], &mut warnings).unwrap();
        let sv = value.as_struct().unwrap();
        assert_eq!(sv.child("inner").unwrap().uint("x"), Some(5));
        assert_eq!(sv.uint("y"), Some(6));
    }
}
