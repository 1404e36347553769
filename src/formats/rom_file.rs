// .rom file load/save built on the codec entry points

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::rom::{ToolRom, ROM_SIZE};
use crate::schema::{FormatError, RangeError, Warning};

#[derive(Error, Debug)]
pub enum RomFileError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Range(#[from] RangeError),
}

pub type Result<T> = std::result::Result<T, RomFileError>;

/// Read and decode a .rom file.
///
/// Warnings (checksum mismatch, timestamp inconsistency) are returned
/// alongside the tool; a corrupted but structurally sound file still loads.
pub fn load_rom(path: impl AsRef<Path>) -> Result<(ToolRom, Vec<Warning>)> {
    let data = fs::read(path)?;
    let (tool, warnings) = ToolRom::from_rom(&data)?;
    Ok((tool, warnings))
}

/// Encode and write a tool as a fixed 752-byte .rom file.
pub fn save_rom(path: impl AsRef<Path>, tool: &ToolRom) -> Result<()> {
    let data = tool.to_rom()?;
    debug_assert_eq!(data.len(), ROM_SIZE);
    fs::write(path, data)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn sample_tool() -> ToolRom {
        ToolRom {
            manufacturer: "NDI".to_string(),
            markers: vec![[0.0, 0.0, 0.0], [10.0, 0.0, 0.0], [0.0, 10.0, 0.0]],
            marker_normals: vec![[0.0, 0.0, 1.0]; 3],
            marker_faces: vec![1, 1, 1],
            other_face_assignments: vec![0, 0, 0],
            ..ToolRom::default()
        }
    }

    #[test]
    fn test_save_load_round_trip() -> Result<()> {
        let tempfile = NamedTempFile::new().unwrap();
        let path = tempfile.path();

        let tool = sample_tool();
        save_rom(path, &tool)?;

        let (loaded, warnings) = load_rom(path)?;
        assert_eq!(loaded, tool);
        assert!(warnings.is_empty());
        Ok(())
    }

    #[test]
    fn test_load_truncated_file() {
        let tempfile = NamedTempFile::new().unwrap();
        std::fs::write(tempfile.path(), [0u8; 10]).unwrap();

        let err = load_rom(tempfile.path()).unwrap_err();
        assert!(matches!(
            err,
            RomFileError::Format(FormatError::BufferTooShort { .. })
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_rom("/nonexistent/tool.rom").unwrap_err();
        assert!(matches!(err, RomFileError::Io(_)));
    }

    #[test]
    fn test_saved_file_is_fixed_width() -> Result<()> {
        let tempfile = NamedTempFile::new().unwrap();
        save_rom(tempfile.path(), &sample_tool())?;
        let metadata = std::fs::metadata(tempfile.path())?;
        assert_eq!(metadata.len(), ROM_SIZE as u64);
        Ok(())
    }
}
