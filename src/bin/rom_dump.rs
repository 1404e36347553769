//! Dump .rom file utility
//! Decodes an NDI .rom tool definition and prints its fields and warnings

use ndi_rom_rs::formats::load_rom;
use std::env;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <tool.rom>", args[0]);
        std::process::exit(1);
    }

    let (tool, warnings) = load_rom(&args[1])?;

    println!("Tool: {} (part number {})", tool.manufacturer, tool.part_number);
    println!("Type: {} / {}", tool.main_type, tool.sub_type);
    println!("Marker type: {}", tool.marker_type);
    println!("Revision: {}", tool.revision);
    println!("Date: {}  sequence #{}", tool.date, tool.sequence_number);
    println!(
        "Constraints: angle >= {} deg, {} of {} markers, error <= {:.2} mm",
        tool.min_marker_angle,
        tool.min_marker_count,
        tool.markers.len(),
        tool.min_marker_error
    );

    println!("\nMarkers:");
    for (i, m) in tool.markers.iter().enumerate() {
        let face = tool.marker_faces.get(i).copied().unwrap_or(0);
        println!(
            "  #{:<2} ({:8.2}, {:8.2}, {:8.2})  face {}",
            i, m[0], m[1], m[2], face
        );
    }

    if !tool.face_normals.is_empty() {
        println!("\nFace normals:");
        for (i, n) in tool.face_normals.iter().enumerate() {
            println!("  #{:<2} ({:6.3}, {:6.3}, {:6.3})", i, n[0], n[1], n[2]);
        }
    }

    if warnings.is_empty() {
        println!("\nNo warnings.");
    } else {
        println!("\nWarnings:");
        for w in &warnings {
            println!("  - {w}");
        }
    }

    Ok(())
}
