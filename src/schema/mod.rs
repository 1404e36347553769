// Declarative codec engine for fixed binary layouts
pub mod errors;
pub mod field;
pub mod primitives;
pub mod structdef;
pub mod value;

pub use errors::{FormatError, RangeError, Warning};
pub use field::{Field, FieldType};
pub use primitives::{
    ArrayField, AsciiString, EnumField, Float32, Literal, Padding, UInt16, UInt8, Vector3f,
};
pub use structdef::{StructSchema, StructValue};
pub use value::Value;
