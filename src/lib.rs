// NDI-ROM-RS: codec for the fixed 752-byte NDI .rom optical-tracking
// tool-description format, built on a small declarative binary-struct engine

pub mod formats;
pub mod rom;
pub mod schema;

// Re-export commonly used types
pub use formats::{load_rom, save_rom, Point, ToolDefinition};
pub use rom::{checksum, SequenceAndDate, ToolRom, ROM_SIZE};
pub use schema::{
    Field, FieldType, FormatError, RangeError, StructSchema, StructValue, Value, Warning,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
