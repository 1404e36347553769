// Dynamically-typed field values produced and consumed by the schema engine

use chrono::NaiveDate;

use super::structdef::StructValue;

/// The decoded form of any schema field.
///
/// Every `FieldType` decodes into one of these variants and encodes from it.
/// Accessors return `None` on a variant mismatch rather than panicking, so
/// callers can fall back to defaults.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    UInt(u64),
    Float(f32),
    Str(String),
    Bytes(Vec<u8>),
    Vector([f32; 3]),
    Array(Vec<Value>),
    Date(NaiveDate),
    Enum { code: u64, name: &'static str },
    Struct(StructValue),
}

impl Value {
    /// Variant name, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::UInt(_) => "unsigned integer",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::Vector(_) => "vector",
            Value::Array(_) => "array",
            Value::Date(_) => "date",
            Value::Enum { .. } => "enum",
            Value::Struct(_) => "struct",
        }
    }

    pub fn as_uint(&self) -> Option<u64> {
        match self {
            Value::UInt(v) => Some(*v),
            Value::Enum { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        match self {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_vector(&self) -> Option<[f32; 3]> {
        match self {
            Value::Vector(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<(u64, &'static str)> {
        match self {
            Value::Enum { code, name } => Some((*code, name)),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&StructValue> {
        match self {
            Value::Struct(s) => Some(s),
            _ => None,
        }
    }
}

impl From<u8> for Value {
    fn from(v: u8) -> Self {
        Value::UInt(v as u64)
    }
}

impl From<u16> for Value {
    fn from(v: u16) -> Self {
        Value::UInt(v as u64)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::UInt(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<[f32; 3]> for Value {
    fn from(v: [f32; 3]) -> Self {
        Value::Vector(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::Array(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(v)
    }
}

impl From<StructValue> for Value {
    fn from(v: StructValue) -> Self {
        Value::Struct(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors() {
        assert_eq!(Value::UInt(7).as_uint(), Some(7));
        assert_eq!(Value::UInt(7).as_float(), None);
        assert_eq!(Value::Float(1.5).as_float(), Some(1.5));
        assert_eq!(Value::from("abc").as_str(), Some("abc"));
        assert_eq!(
            Value::Vector([1.0, 2.0, 3.0]).as_vector(),
            Some([1.0, 2.0, 3.0])
        );

        let e = Value::Enum {
            code: 2,
            name: "Undefined",
        };
        assert_eq!(e.as_enum(), Some((2, "Undefined")));
        // Enums double as their numeric code
        assert_eq!(e.as_uint(), Some(2));
    }

    #[test]
    fn test_kind() {
        assert_eq!(Value::UInt(0).kind(), "unsigned integer");
        assert_eq!(Value::Bytes(vec![]).kind(), "bytes");
    }
}
