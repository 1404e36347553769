// The FieldType capability and named fields

use std::sync::Arc;

use super::errors::{FormatError, RangeError, Warning};
use super::value::Value;

/// Capability implemented by every primitive and composite binary field.
///
/// Widths are fixed per type and never depend on the value. `decode` is
/// handed exactly `size()` bytes by the composition engine; `encode` must
/// produce exactly `size()` bytes or fail with a `RangeError`.
///
/// The warnings sink threads non-fatal anomalies (e.g. an inconsistent
/// bit-packed timestamp) out of nested decodes without aborting them.
pub trait FieldType: Send + Sync {
    /// On-wire width in bytes.
    fn size(&self) -> usize;

    /// Value used when a struct is encoded without this field set.
    fn default_value(&self) -> Value;

    /// Decode exactly `size()` bytes into a value.
    fn decode(&self, data: &[u8], warnings: &mut Vec<Warning>) -> Result<Value, FormatError>;

    /// Encode a value into exactly `size()` bytes.
    fn encode(&self, value: &Value) -> Result<Vec<u8>, RangeError>;
}

/// A named occurrence of a `FieldType` inside a struct schema.
///
/// Layout is determined solely by the position of the field in the ordered
/// list handed to `StructSchema::new`; fields carry no counters of their own.
#[derive(Clone)]
pub struct Field {
    name: &'static str,
    ty: Arc<dyn FieldType>,
}

impl Field {
    pub fn new(name: &'static str, ty: impl FieldType + 'static) -> Self {
        Self {
            name,
            ty: Arc::new(ty),
        }
    }

    /// Build a field around an already-shared field type, e.g. a sub-struct
    /// schema that is also exposed on its own.
    pub fn shared(name: &'static str, ty: Arc<dyn FieldType>) -> Self {
        Self { name, ty }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn size(&self) -> usize {
        self.ty.size()
    }

    pub fn field_type(&self) -> &dyn FieldType {
        self.ty.as_ref()
    }
}

impl std::fmt::Debug for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("size", &self.size())
            .finish()
    }
}
