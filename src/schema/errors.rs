// Error and warning taxonomy for the binary schema engine

use thiserror::Error;

/// Structural decode failures. These abort the decode immediately with no
/// partial result.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormatError {
    #[error("needed {expected} bytes, only {actual} remain")]
    BufferTooShort { expected: usize, actual: usize },

    #[error("bad magic bytes: expected {expected:?}, got {actual:?}")]
    BadMagic { expected: String, actual: String },

    #[error("no enum option with value {0}")]
    UnknownEnumValue(u64),

    #[error("string field contains non-ASCII bytes")]
    BadAscii,

    #[error("in field `{field}`: {source}")]
    Field {
        field: String,
        source: Box<FormatError>,
    },
}

impl FormatError {
    /// Wrap this error with the name of the field being decoded.
    pub fn in_field(self, field: &str) -> FormatError {
        FormatError::Field {
            field: field.to_string(),
            source: Box::new(self),
        }
    }
}

/// Encode failures: a value exceeds its fixed field's capacity or declared
/// domain. These abort the encode immediately.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RangeError {
    #[error("array holds at most {max} elements, got {actual}")]
    ArrayTooLong { max: usize, actual: usize },

    #[error("string exceeds {max} bytes (got {actual})")]
    StringTooLong { max: usize, actual: usize },

    #[error("string contains non-ASCII characters")]
    NonAsciiString,

    #[error("value {value} outside allowed range {min}..={max}")]
    OutOfRange { value: f64, min: f64, max: f64 },

    #[error("expected a {expected} value, got {actual}")]
    TypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("enum code {0} is not a declared option")]
    UndeclaredEnumCode(u64),

    #[error("`{0}` is not a declared option name")]
    UnknownOptionName(String),

    #[error("struct has no field named `{0}`")]
    UnknownField(String),

    #[error("marker count must be between 3 and 20, got {0}")]
    MarkerCount(usize),

    #[error("year {0} is outside the encodable range 1900..=2411")]
    YearOutOfRange(i32),

    #[error("sequence number {0} does not fit in 10 bits")]
    SequenceOutOfRange(u16),

    #[error("in field `{field}`: {source}")]
    Field {
        field: String,
        source: Box<RangeError>,
    },
}

impl RangeError {
    /// Wrap this error with the name of the field being encoded.
    pub fn in_field(self, field: &str) -> RangeError {
        RangeError::Field {
            field: field.to_string(),
            source: Box::new(self),
        }
    }
}

/// Non-fatal anomalies noticed while decoding. Warnings never abort a decode;
/// they are collected and returned alongside the successfully decoded value,
/// leaving disposition to the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    #[error("checksum mismatch: sum of record bytes is {expected:#06x}, record says {actual:#06x}")]
    ChecksumMismatch { expected: u16, actual: u16 },

    #[error("timestamp inconsistency: packed month is {packed_month}, day arithmetic gives {derived_month}")]
    TimestampInconsistency { packed_month: u8, derived_month: u8 },
}
