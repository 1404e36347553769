// Standard tool definition: the JSON shape higher-level tooling exchanges,
// mapped to and from the binary record's fields

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::rom::ToolRom;

#[derive(Error, Debug)]
pub enum ToolDefError {
    #[error("count field says {count} fiducials, list holds {actual}")]
    CountMismatch { count: usize, actual: usize },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ToolDefError>;

/// A single 3D point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl From<[f32; 3]> for Point {
    fn from(v: [f32; 3]) -> Self {
        Point {
            x: v[0],
            y: v[1],
            z: v[2],
        }
    }
}

impl From<Point> for [f32; 3] {
    fn from(p: Point) -> Self {
        [p.x, p.y, p.z]
    }
}

/// Tracker-agnostic tool definition:
/// `{ id?, count, fiducials: [{x,y,z}], pivot?: {x,y,z} }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u16>,

    pub count: usize,

    pub fiducials: Vec<Point>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub pivot: Option<Point>,
}

impl ToolDefinition {
    /// Build the standard shape from a decoded record. The record's part
    /// number doubles as the tool identifier; the binary format stores no
    /// pivot, so none is emitted.
    pub fn from_tool(tool: &ToolRom) -> Self {
        Self {
            id: Some(tool.part_number),
            count: tool.markers.len(),
            fiducials: tool.markers.iter().map(|&m| Point::from(m)).collect(),
            pivot: None,
        }
    }

    /// Populate a record from the standard shape; every field the shape does
    /// not carry takes its format default. A pivot, if present, has no home
    /// in the binary format and is dropped with a warning.
    pub fn into_tool(self) -> Result<ToolRom> {
        if self.count != self.fiducials.len() {
            return Err(ToolDefError::CountMismatch {
                count: self.count,
                actual: self.fiducials.len(),
            });
        }
        if self.pivot.is_some() {
            tracing::warn!("tool definition pivot has no binary representation, dropping");
        }

        Ok(ToolRom {
            part_number: self.id.unwrap_or(0),
            markers: self.fiducials.into_iter().map(Into::into).collect(),
            ..ToolRom::default()
        })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
