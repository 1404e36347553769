// File and interchange format handlers
pub mod rom_file;
pub mod tool_def;

pub use rom_file::{load_rom, save_rom, RomFileError};
pub use tool_def::{Point, ToolDefError, ToolDefinition};
