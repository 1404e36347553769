// Primitive field types: fixed-width integers, floats, strings, padding,
// literals, arrays and enums. All multi-byte values are little-endian.

use std::sync::Arc;

use super::errors::{FormatError, RangeError, Warning};
use super::field::FieldType;
use super::value::Value;

fn type_mismatch(expected: &'static str, actual: &Value) -> RangeError {
    RangeError::TypeMismatch {
        expected,
        actual: actual.kind(),
    }
}

fn require(data: &[u8], expected: usize) -> Result<(), FormatError> {
    if data.len() < expected {
        return Err(FormatError::BufferTooShort {
            expected,
            actual: data.len(),
        });
    }
    Ok(())
}

/// Unsigned 8-bit integer.
pub struct UInt8;

impl FieldType for UInt8 {
    fn size(&self) -> usize {
        1
    }

    fn default_value(&self) -> Value {
        Value::UInt(0)
    }

    fn decode(&self, data: &[u8], _warnings: &mut Vec<Warning>) -> Result<Value, FormatError> {
        require(data, 1)?;
        Ok(Value::UInt(data[0] as u64))
    }

    fn encode(&self, value: &Value) -> Result<Vec<u8>, RangeError> {
        let v = value
            .as_uint()
            .ok_or_else(|| type_mismatch("unsigned integer", value))?;
        if v > u8::MAX as u64 {
            return Err(RangeError::OutOfRange {
                value: v as f64,
                min: 0.0,
                max: u8::MAX as f64,
            });
        }
        Ok(vec![v as u8])
    }
}

/// Unsigned 16-bit little-endian integer.
pub struct UInt16;

impl FieldType for UInt16 {
    fn size(&self) -> usize {
        2
    }

    fn default_value(&self) -> Value {
        Value::UInt(0)
    }

    fn decode(&self, data: &[u8], _warnings: &mut Vec<Warning>) -> Result<Value, FormatError> {
        require(data, 2)?;
        Ok(Value::UInt(u16::from_le_bytes([data[0], data[1]]) as u64))
    }

    fn encode(&self, value: &Value) -> Result<Vec<u8>, RangeError> {
        let v = value
            .as_uint()
            .ok_or_else(|| type_mismatch("unsigned integer", value))?;
        if v > u16::MAX as u64 {
            return Err(RangeError::OutOfRange {
                value: v as f64,
                min: 0.0,
                max: u16::MAX as f64,
            });
        }
        Ok((v as u16).to_le_bytes().to_vec())
    }
}

/// IEEE-754 single-precision float, little-endian.
pub struct Float32;

impl FieldType for Float32 {
    fn size(&self) -> usize {
        4
    }

    fn default_value(&self) -> Value {
        Value::Float(0.0)
    }

    fn decode(&self, data: &[u8], _warnings: &mut Vec<Warning>) -> Result<Value, FormatError> {
        require(data, 4)?;
        Ok(Value::Float(f32::from_le_bytes([
            data[0], data[1], data[2], data[3],
        ])))
    }

    fn encode(&self, value: &Value) -> Result<Vec<u8>, RangeError> {
        let v = value
            .as_float()
            .ok_or_else(|| type_mismatch("float", value))?;
        Ok(v.to_le_bytes().to_vec())
    }
}

/// XYZ vector of three single-precision floats.
pub struct Vector3f;

impl FieldType for Vector3f {
    fn size(&self) -> usize {
        12
    }

    fn default_value(&self) -> Value {
        Value::Vector([0.0, 0.0, 0.0])
    }

    fn decode(&self, data: &[u8], _warnings: &mut Vec<Warning>) -> Result<Value, FormatError> {
        require(data, 12)?;
        let mut v = [0.0f32; 3];
        for (i, chunk) in data.chunks_exact(4).enumerate() {
            v[i] = f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        Ok(Value::Vector(v))
    }

    fn encode(&self, value: &Value) -> Result<Vec<u8>, RangeError> {
        let v = value
            .as_vector()
            .ok_or_else(|| type_mismatch("vector", value))?;
        let mut out = Vec::with_capacity(12);
        for component in v {
            out.extend_from_slice(&component.to_le_bytes());
        }
        Ok(out)
    }
}

/// Fixed-width ASCII string.
///
/// Decode strips trailing NUL padding; encode restores it, so buffers
/// round-trip byte-exactly. Not suitable for variable-width encodings
/// such as UTF-8.
pub struct AsciiString {
    length: usize,
}

impl AsciiString {
    pub fn new(length: usize) -> Self {
        Self { length }
    }
}

impl FieldType for AsciiString {
    fn size(&self) -> usize {
        self.length
    }

    fn default_value(&self) -> Value {
        Value::Str(String::new())
    }

    fn decode(&self, data: &[u8], _warnings: &mut Vec<Warning>) -> Result<Value, FormatError> {
        require(data, self.length)?;
        if !data.is_ascii() {
            return Err(FormatError::BadAscii);
        }
        let end = data
            .iter()
            .rposition(|&b| b != 0)
            .map_or(0, |last| last + 1);
        // Validated ASCII above, so this conversion cannot fail
        let s = String::from_utf8_lossy(&data[..end]).into_owned();
        Ok(Value::Str(s))
    }

    fn encode(&self, value: &Value) -> Result<Vec<u8>, RangeError> {
        let s = value
            .as_str()
            .ok_or_else(|| type_mismatch("string", value))?;
        if !s.is_ascii() {
            return Err(RangeError::NonAsciiString);
        }
        if s.len() > self.length {
            return Err(RangeError::StringTooLong {
                max: self.length,
                actual: s.len(),
            });
        }
        let mut out = s.as_bytes().to_vec();
        out.resize(self.length, 0);
        Ok(out)
    }
}

/// Reserved region carrying no information. Decode keeps the raw bytes
/// around for inspection but they are never meaningful; encode always
/// emits zeros regardless of any supplied value.
pub struct Padding {
    length: usize,
}

impl Padding {
    pub fn new(length: usize) -> Self {
        Self { length }
    }
}

impl FieldType for Padding {
    fn size(&self) -> usize {
        self.length
    }

    fn default_value(&self) -> Value {
        Value::Bytes(vec![0; self.length])
    }

    fn decode(&self, data: &[u8], _warnings: &mut Vec<Warning>) -> Result<Value, FormatError> {
        Ok(Value::Bytes(data.to_vec()))
    }

    fn encode(&self, _value: &Value) -> Result<Vec<u8>, RangeError> {
        Ok(vec![0; self.length])
    }
}

/// A fixed byte literal. Decode is lenient: the bytes actually read are
/// returned without being checked against the expected literal, matching
/// shipped files that disagree in these regions. Encode always emits the
/// declared literal.
pub struct Literal {
    bytes: &'static [u8],
}

impl Literal {
    pub fn new(bytes: &'static [u8]) -> Self {
        Self { bytes }
    }
}

impl FieldType for Literal {
    fn size(&self) -> usize {
        self.bytes.len()
    }

    fn default_value(&self) -> Value {
        Value::Bytes(self.bytes.to_vec())
    }

    fn decode(&self, data: &[u8], _warnings: &mut Vec<Warning>) -> Result<Value, FormatError> {
        Ok(Value::Bytes(data.to_vec()))
    }

    fn encode(&self, _value: &Value) -> Result<Vec<u8>, RangeError> {
        Ok(self.bytes.to_vec())
    }
}

/// Fixed-count array of a single element type.
///
/// Encoding fails when more elements are supplied than the array holds;
/// missing elements are padded with the element type's default. Decoding
/// always yields exactly `length` elements.
pub struct ArrayField {
    element: Arc<dyn FieldType>,
    length: usize,
}

impl ArrayField {
    pub fn new(element: impl FieldType + 'static, length: usize) -> Self {
        Self {
            element: Arc::new(element),
            length,
        }
    }
}

impl FieldType for ArrayField {
    fn size(&self) -> usize {
        self.length * self.element.size()
    }

    fn default_value(&self) -> Value {
        Value::Array(vec![self.element.default_value(); self.length])
    }

    fn decode(&self, data: &[u8], warnings: &mut Vec<Warning>) -> Result<Value, FormatError> {
        require(data, self.size())?;
        let step = self.element.size();
        let mut elements = Vec::with_capacity(self.length);
        for chunk in data.chunks_exact(step).take(self.length) {
            elements.push(self.element.decode(chunk, warnings)?);
        }
        Ok(Value::Array(elements))
    }

    fn encode(&self, value: &Value) -> Result<Vec<u8>, RangeError> {
        let elements = value
            .as_array()
            .ok_or_else(|| type_mismatch("array", value))?;
        if elements.len() > self.length {
            return Err(RangeError::ArrayTooLong {
                max: self.length,
                actual: elements.len(),
            });
        }

        let mut out = Vec::with_capacity(self.size());
        for element in elements {
            out.extend(self.element.encode(element)?);
        }
        let default = self.element.default_value();
        for _ in elements.len()..self.length {
            out.extend(self.element.encode(&default)?);
        }
        Ok(out)
    }
}

/// Bytes needed to hold `max` as a little-endian unsigned integer.
///
/// Bit-length based so exact powers of 256 land on the right side of the
/// boundary (255 -> 1, 256 -> 2, 65535 -> 2, 65536 -> 3).
fn bytes_for(max: u64) -> usize {
    let bits = (u64::BITS - max.leading_zeros()) as usize;
    bits.div_ceil(8).max(1)
}

/// Bijection between a fixed-width unsigned code and a symbolic name.
///
/// Width is the number of bytes needed to hold the highest declared code.
/// Decoding an undeclared code is a structural error; encoding emits only
/// the numeric code.
pub struct EnumField {
    options: &'static [(u64, &'static str)],
    default_code: u64,
    size: usize,
}

impl EnumField {
    /// Panics if option codes are not distinct or the default is not among
    /// them; schemas are built once at startup, so these are construction
    /// bugs rather than runtime conditions.
    pub fn new(options: &'static [(u64, &'static str)], default_code: u64) -> Self {
        assert!(!options.is_empty(), "enum needs at least one option");
        for (i, (code, _)) in options.iter().enumerate() {
            assert!(
                options[i + 1..].iter().all(|(other, _)| other != code),
                "enum option codes must be distinct"
            );
        }
        assert!(
            options.iter().any(|(code, _)| *code == default_code),
            "enum default must be a declared option"
        );

        let max = options.iter().map(|(code, _)| *code).max().unwrap_or(0);
        Self {
            options,
            default_code,
            size: bytes_for(max),
        }
    }

    fn lookup(&self, code: u64) -> Option<&'static str> {
        self.options
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, name)| *name)
    }
}

impl FieldType for EnumField {
    fn size(&self) -> usize {
        self.size
    }

    fn default_value(&self) -> Value {
        Value::Enum {
            code: self.default_code,
            // Membership checked in new()
            name: self.lookup(self.default_code).unwrap_or(""),
        }
    }

    fn decode(&self, data: &[u8], _warnings: &mut Vec<Warning>) -> Result<Value, FormatError> {
        require(data, self.size)?;
        let mut code = 0u64;
        for (i, &b) in data.iter().enumerate() {
            code |= (b as u64) << (8 * i);
        }
        let name = self
            .lookup(code)
            .ok_or(FormatError::UnknownEnumValue(code))?;
        Ok(Value::Enum { code, name })
    }

    fn encode(&self, value: &Value) -> Result<Vec<u8>, RangeError> {
        let code = value
            .as_uint()
            .ok_or_else(|| type_mismatch("enum", value))?;
        if self.lookup(code).is_none() {
            return Err(RangeError::UndeclaredEnumCode(code));
        }
        Ok(code.to_le_bytes()[..self.size].to_vec())
    }
}
