// ToolRom: the decoded tool-description record and its codec entry points.
//
// Decode fails only on structural violations (wrong magic, short buffer,
// unknown enum code); checksum and timestamp anomalies come back as
// warnings next to the decoded record so corrupted or hand-edited files
// can still be read. Encode fails when a value exceeds its fixed field's
// capacity or declared domain.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::datetime::epoch;
use super::layout::{
    option_code, CHECKSUM_COVERED_FROM, HEADER, MAGIC, MAIN_TYPES, MARKER_TYPES, MAX_FACES,
    MAX_MARKERS, MIN_MARKERS, ROM, ROM_SIZE, SUB_TYPES,
};
use crate::schema::{FieldType, FormatError, RangeError, StructValue, Value, Warning};

/// Sum, modulo 65536, of every byte the record's checksum field covers
/// (everything after the field's own two-byte span).
pub fn checksum(data: &[u8]) -> u16 {
    data.get(CHECKSUM_COVERED_FROM..)
        .unwrap_or_default()
        .iter()
        .fold(0u16, |sum, &b| sum.wrapping_add(b as u16))
}

/// A tool description decoded from, or destined for, a .rom record.
///
/// Marker-indexed lists (`markers`, `marker_normals`, `marker_faces`,
/// `other_face_assignments`) hold only the meaningful entries; the fixed
/// 20-slot on-wire arrays are padded out with defaults on encode and
/// trimmed back to the marker count on decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolRom {
    /// Symbolic sub-type name, e.g. "Undefined"
    pub sub_type: String,
    /// Symbolic main-type name, e.g. "Pointer"
    pub main_type: String,
    pub revision: u16,
    /// 10-bit counter stored bit-packed alongside the date
    pub sequence_number: u16,
    pub date: NaiveDate,
    /// Degrees, 0..=180
    pub min_marker_angle: u8,
    /// Must not exceed the number of markers
    pub min_marker_count: u8,
    /// 0.0..=10.0
    pub min_marker_error: f32,
    /// Fiducial marker positions, 3..=20 entries
    pub markers: Vec<[f32; 3]>,
    pub marker_normals: Vec<[f32; 3]>,
    /// At most 12 ASCII characters
    pub manufacturer: String,
    pub part_number: u16,
    /// Face index assigned to each marker
    pub marker_faces: Vec<u8>,
    pub other_face_assignments: Vec<u8>,
    /// Symbolic marker-type name, e.g. "Passive Sphere"
    pub marker_type: String,
    /// Up to 8 face normals
    pub face_normals: Vec<[f32; 3]>,
}

impl Default for ToolRom {
    fn default() -> Self {
        Self {
            sub_type: "Undefined".to_string(),
            main_type: "Unknown".to_string(),
            revision: 0,
            sequence_number: 1,
            date: epoch(),
            min_marker_angle: 90,
            min_marker_count: 3,
            min_marker_error: 2.0,
            markers: Vec::new(),
            marker_normals: Vec::new(),
            manufacturer: String::new(),
            part_number: 0,
            marker_faces: Vec::new(),
            other_face_assignments: Vec::new(),
            marker_type: "Passive Sphere".to_string(),
            face_normals: Vec::new(),
        }
    }
}

fn vectors_from(values: Option<&[Value]>, count: usize) -> Vec<[f32; 3]> {
    values
        .unwrap_or_default()
        .iter()
        .take(count)
        .map(|v| v.as_vector().unwrap_or_default())
        .collect()
}

fn bytes_from(values: Option<&[Value]>, count: usize) -> Vec<u8> {
    values
        .unwrap_or_default()
        .iter()
        .take(count)
        .map(|v| v.as_uint().unwrap_or(0) as u8)
        .collect()
}

fn vectors_to(vectors: &[[f32; 3]]) -> Vec<Value> {
    vectors.iter().map(|&v| Value::Vector(v)).collect()
}

fn bytes_to(bytes: &[u8]) -> Vec<Value> {
    bytes.iter().map(|&b| Value::UInt(b as u64)).collect()
}

impl ToolRom {
    /// Decode a raw record buffer.
    ///
    /// Returns the decoded tool together with any non-fatal warnings
    /// (checksum mismatch, inconsistent bit-packed timestamp).
    pub fn from_rom(data: &[u8]) -> Result<(ToolRom, Vec<Warning>), FormatError> {
        if data.len() < ROM_SIZE {
            return Err(FormatError::BufferTooShort {
                expected: ROM_SIZE,
                actual: data.len(),
            });
        }
        let data = &data[..ROM_SIZE];

        let mut warnings = Vec::new();
        let record = match ROM.decode(data, &mut warnings)? {
            Value::Struct(sv) => sv,
            _ => StructValue::new(),
        };

        let empty = StructValue::new();
        let header = record.child("header").unwrap_or(&empty);
        let geometry = record.child("geometry").unwrap_or(&empty);
        let details = record.child("tool_details").unwrap_or(&empty);
        let faces = record.child("face_geometry").unwrap_or(&empty);

        // The magic is the one reserved-looking region whose content is
        // actually validated
        let magic = header.str("ndi").unwrap_or_default();
        if magic != MAGIC {
            return Err(FormatError::BadMagic {
                expected: MAGIC.to_string(),
                actual: magic.to_string(),
            });
        }

        let stored = header.uint("checksum").unwrap_or(0) as u16;
        let computed = checksum(data);
        if stored != computed {
            let warning = Warning::ChecksumMismatch {
                expected: computed,
                actual: stored,
            };
            tracing::warn!("{warning}");
            warnings.push(warning);
        }

        let sequence_and_date = header.child("sequence_and_date").unwrap_or(&empty);
        let marker_count = (geometry.uint("marker_count").unwrap_or(0) as usize).min(MAX_MARKERS);

        let tool = ToolRom {
            sub_type: header
                .enum_name("tool_sub_type")
                .unwrap_or("Undefined")
                .to_string(),
            main_type: header
                .enum_name("tool_main_type")
                .unwrap_or("Unknown")
                .to_string(),
            revision: header.uint("tool_revision").unwrap_or(0) as u16,
            sequence_number: sequence_and_date.uint("sequence_number").unwrap_or(1) as u16,
            date: sequence_and_date.date("date").unwrap_or_else(epoch),
            min_marker_angle: geometry.uint("minimum_marker_angle").unwrap_or(0) as u8,
            min_marker_count: geometry.uint("minimum_marker_count").unwrap_or(0) as u8,
            min_marker_error: geometry.float("minimum_marker_error").unwrap_or(0.0),
            markers: vectors_from(geometry.array("markers"), marker_count),
            marker_normals: vectors_from(geometry.array("marker_normals"), marker_count),
            manufacturer: details.str("tool_manufacturer").unwrap_or_default().to_string(),
            part_number: details.uint("part_number").unwrap_or(0) as u16,
            marker_faces: bytes_from(faces.array("marker_faces"), marker_count),
            other_face_assignments: bytes_from(faces.array("other_assignments"), marker_count),
            marker_type: faces
                .enum_name("marker_type")
                .unwrap_or("Passive Sphere")
                .to_string(),
            face_normals: trim_trailing_zero(vectors_from(faces.array("face_normals"), MAX_FACES)),
        };

        Ok((tool, warnings))
    }

    /// Encode this tool into a fresh 752-byte record.
    ///
    /// Two-phase: the full record is produced with a placeholder checksum,
    /// then the real sum is patched into the checksum field's byte range
    /// without re-encoding anything else.
    pub fn to_rom(&self) -> Result<Vec<u8>, RangeError> {
        let marker_count = self.markers.len();
        if !(MIN_MARKERS..=MAX_MARKERS).contains(&marker_count) {
            return Err(RangeError::MarkerCount(marker_count));
        }
        if self.min_marker_angle > 180 {
            return Err(RangeError::OutOfRange {
                value: self.min_marker_angle as f64,
                min: 0.0,
                max: 180.0,
            });
        }
        if self.min_marker_count as usize > marker_count {
            return Err(RangeError::OutOfRange {
                value: self.min_marker_count as f64,
                min: 0.0,
                max: marker_count as f64,
            });
        }
        if !(0.0..=10.0).contains(&self.min_marker_error) {
            return Err(RangeError::OutOfRange {
                value: self.min_marker_error as f64,
                min: 0.0,
                max: 10.0,
            });
        }

        let sub_code = option_code(SUB_TYPES, &self.sub_type)
            .ok_or_else(|| RangeError::UnknownOptionName(self.sub_type.clone()))?;
        let main_code = option_code(MAIN_TYPES, &self.main_type)
            .ok_or_else(|| RangeError::UnknownOptionName(self.main_type.clone()))?;
        let marker_code = option_code(MARKER_TYPES, &self.marker_type)
            .ok_or_else(|| RangeError::UnknownOptionName(self.marker_type.clone()))?;

        let mut sequence_and_date = StructValue::new();
        sequence_and_date.set("date", self.date);
        sequence_and_date.set("sequence_number", self.sequence_number as u64);

        let mut header = StructValue::new();
        header.set("ndi", MAGIC);
        header.set("checksum", 0u64); // placeholder, patched below
        header.set("tool_sub_type", sub_code);
        header.set("tool_main_type", main_code);
        header.set("tool_revision", self.revision);
        header.set("sequence_and_date", sequence_and_date);

        let mut geometry = StructValue::new();
        geometry.set("minimum_marker_angle", self.min_marker_angle as u64);
        geometry.set("marker_count", marker_count as u64);
        geometry.set("minimum_marker_count", self.min_marker_count as u64);
        geometry.set("minimum_marker_error", self.min_marker_error);
        geometry.set("markers", vectors_to(&self.markers));
        geometry.set("marker_normals", vectors_to(&self.marker_normals));

        let mut details = StructValue::new();
        details.set("tool_manufacturer", self.manufacturer.as_str());
        details.set("part_number", self.part_number);

        let mut faces = StructValue::new();
        faces.set("marker_faces", bytes_to(&self.marker_faces));
        faces.set("other_assignments", bytes_to(&self.other_face_assignments));
        faces.set("marker_type", marker_code);
        faces.set("face_normals", vectors_to(&self.face_normals));

        let mut record = StructValue::new();
        record.set("header", header);
        record.set("geometry", geometry);
        record.set("tool_details", details);
        record.set("face_geometry", faces);

        let mut data = ROM.encode(&Value::Struct(record))?;

        let sum = checksum(&data);
        let (header_base, _) = ROM.locate("header").unwrap_or((0, 0));
        HEADER.update("checksum", &Value::UInt(sum as u64), header_base, &mut data)?;

        Ok(data)
    }
}

fn trim_trailing_zero(mut vectors: Vec<[f32; 3]>) -> Vec<[f32; 3]> {
    while vectors.last() == Some(&[0.0, 0.0, 0.0]) {
        vectors.pop();
    }
    vectors
}
