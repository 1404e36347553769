// The NDI .rom tool-description record
pub mod datetime;
pub mod layout;
pub mod tool;

pub use datetime::{SequenceAndDate, EPOCH_YEAR, MAX_SEQUENCE, MAX_YEAR};
pub use layout::{MAGIC, MAIN_TYPES, MARKER_TYPES, MAX_FACES, MAX_MARKERS, ROM_SIZE, SUB_TYPES};
pub use tool::{checksum, ToolRom};
