// The fixed 752-byte .rom record layout: four composed sub-structs plus
// the enum option tables. Schemas are process-wide constants, defined once
// and shared freely.

use std::sync::Arc;

use lazy_static::lazy_static;

use super::datetime::SequenceAndDate;
use crate::schema::{
    ArrayField, AsciiString, EnumField, Field, Float32, Literal, Padding, StructSchema, UInt16,
    UInt8, Vector3f,
};

/// Total record width in bytes.
pub const ROM_SIZE: usize = 752;

/// The three magic bytes every record starts with.
pub const MAGIC: &str = "NDI";

/// Byte offset of the first byte covered by the checksum (everything after
/// the checksum field's own two-byte span).
pub const CHECKSUM_COVERED_FROM: usize = 6;

pub const MAX_MARKERS: usize = 20;
pub const MIN_MARKERS: usize = 3;
pub const MAX_FACES: usize = 8;

pub const MAIN_TYPES: &[(u64, &str)] = &[
    (0, "Unknown"),
    (1, "Reference"),
    (2, "Pointer"),
    (3, "Button Box"),
    (4, "User Defined"),
    (5, "Microscope"),
    (7, "Calibration Block"),
    (8, "Tool Docking Station"),
    (9, "Isolation Box"),
    (10, "C-Arm Tracker"),
    (11, "Catheter"),
    (12, "GPIO Device"),
    (14, "Scan Reference"),
];

pub const SUB_TYPES: &[(u64, &str)] = &[(0, "Removable Tip"), (1, "Fixed Tip"), (2, "Undefined")];

pub const MARKER_TYPES: &[(u64, &str)] =
    &[(41, "Passive Sphere"), (49, "Passive Disc"), (57, "Radix Lens")];

pub const DEFAULT_SUB_TYPE: u64 = 2;
pub const DEFAULT_MAIN_TYPE: u64 = 0;
pub const DEFAULT_MARKER_TYPE: u64 = 41;

/// Numeric code for a symbolic option name.
pub fn option_code(options: &[(u64, &'static str)], name: &str) -> Option<u64> {
    options.iter().find(|(_, n)| *n == name).map(|(c, _)| *c)
}

/// Symbolic name for a numeric option code.
pub fn option_name(options: &[(u64, &'static str)], code: u64) -> Option<&'static str> {
    options.iter().find(|(c, _)| *c == code).map(|(_, n)| *n)
}

fn header_schema() -> StructSchema {
    StructSchema::new(
        "header",
        vec![
            Field::new("ndi", AsciiString::new(3)),
            Field::new("p1", Padding::new(1)),
            Field::new("checksum", UInt16),
            Field::new("p2", Literal::new(&[0, 0, 1, 0, 0, 0])),
            Field::new("tool_sub_type", EnumField::new(SUB_TYPES, DEFAULT_SUB_TYPE)),
            Field::new("p3", Padding::new(2)),
            Field::new(
                "tool_main_type",
                EnumField::new(MAIN_TYPES, DEFAULT_MAIN_TYPE),
            ),
            Field::new("tool_revision", UInt16),
            Field::new("p4", Padding::new(2)),
            // Sequence number and date share bits, decoded as one composite
            Field::new("sequence_and_date", SequenceAndDate),
        ],
    )
}

fn geometry_schema() -> StructSchema {
    StructSchema::new(
        "geometry",
        vec![
            Field::new("minimum_marker_angle", UInt8),
            Field::new("p1", Padding::new(3)),
            Field::new("marker_count", UInt8),
            Field::new("p2", Padding::new(3)),
            Field::new("minimum_marker_count", UInt8),
            Field::new("p3", Padding::new(3)),
            Field::new("minimum_marker_error", Float32),
            Field::new("p4", Padding::new(32)),
            Field::new("markers", ArrayField::new(Vector3f, MAX_MARKERS)),
            Field::new("marker_normals", ArrayField::new(Vector3f, MAX_MARKERS)),
            Field::new("p5", Literal::new(&[0, 1, 2])),
            Field::new("p6", Padding::new(17)),
            Field::new("p7", Literal::new(&[31, 31, 31, 31, 9, 0, 0, 0])),
        ],
    )
}

fn tool_details_schema() -> StructSchema {
    StructSchema::new(
        "tool_details",
        vec![
            Field::new("tool_manufacturer", AsciiString::new(12)),
            Field::new("part_number", UInt16),
            Field::new("p1", Padding::new(18)),
            Field::new("p2", Literal::new(&[9])),
        ],
    )
}

fn face_geometry_schema() -> StructSchema {
    StructSchema::new(
        "face_geometry",
        vec![
            Field::new("marker_faces", ArrayField::new(UInt8, MAX_MARKERS)),
            Field::new("other_assignments", ArrayField::new(UInt8, MAX_MARKERS)),
            Field::new("p1", Literal::new(&[128, 0])),
            Field::new(
                "marker_type",
                EnumField::new(MARKER_TYPES, DEFAULT_MARKER_TYPE),
            ),
            Field::new("face_normals", ArrayField::new(Vector3f, MAX_FACES)),
        ],
    )
}

lazy_static! {
    pub static ref HEADER: Arc<StructSchema> = Arc::new(header_schema());
    pub static ref GEOMETRY: Arc<StructSchema> = Arc::new(geometry_schema());
    pub static ref TOOL_DETAILS: Arc<StructSchema> = Arc::new(tool_details_schema());
    pub static ref FACE_GEOMETRY: Arc<StructSchema> = Arc::new(face_geometry_schema());

    /// The complete record: four sub-structs in fixed declaration order.
    pub static ref ROM: StructSchema = StructSchema::new(
        "rom",
        vec![
            Field::shared("header", HEADER.clone()),
            Field::shared("geometry", GEOMETRY.clone()),
            Field::shared("tool_details", TOOL_DETAILS.clone()),
            Field::shared("face_geometry", FACE_GEOMETRY.clone()),
        ],
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldType;

    #[test]
    fn test_sub_struct_widths() {
        assert_eq!(HEADER.size(), 24);
        assert_eq!(GEOMETRY.size(), 556);
        assert_eq!(TOOL_DETAILS.size(), 33);
        assert_eq!(FACE_GEOMETRY.size(), 139);
    }

    #[test]
    fn test_record_width() {
        assert_eq!(ROM.size(), ROM_SIZE);
    }

    #[test]
    fn test_checksum_location() {
        // The checksum sits at bytes 4-5; coverage starts right after it
        assert_eq!(HEADER.locate("checksum"), Some((4, 2)));
        assert_eq!(ROM.locate("header"), Some((0, 24)));
        assert_eq!(CHECKSUM_COVERED_FROM, 4 + 2);
    }

    #[test]
    fn test_known_field_offsets() {
        // Offsets within the whole record, cross-checked against the format
        let (geometry_base, _) = ROM.locate("geometry").unwrap();
        let (markers, _) = GEOMETRY.locate("markers").unwrap();
        assert_eq!(geometry_base + markers, 72);
        let (normals, _) = GEOMETRY.locate("marker_normals").unwrap();
        assert_eq!(geometry_base + normals, 312);

        let (details_base, _) = ROM.locate("tool_details").unwrap();
        let (manufacturer, _) = TOOL_DETAILS.locate("tool_manufacturer").unwrap();
        assert_eq!(details_base + manufacturer, 580);

        let (faces_base, _) = ROM.locate("face_geometry").unwrap();
        let (marker_type, _) = FACE_GEOMETRY.locate("marker_type").unwrap();
        assert_eq!(faces_base + marker_type, 655);
        let (face_normals, _) = FACE_GEOMETRY.locate("face_normals").unwrap();
        assert_eq!(faces_base + face_normals, 656);
    }

    #[test]
    fn test_option_lookup() {
        assert_eq!(option_code(MAIN_TYPES, "Pointer"), Some(2));
        assert_eq!(option_name(MAIN_TYPES, 14), Some("Scan Reference"));
        assert_eq!(option_code(MAIN_TYPES, "Bogus"), None);
        assert_eq!(option_name(SUB_TYPES, 7), None);
    }
}
