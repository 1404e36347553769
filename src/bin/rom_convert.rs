//! Convert between NDI .rom files and JSON standard tool definitions
//! Direction is picked from the file extensions

use anyhow::{bail, Context};
use ndi_rom_rs::formats::{load_rom, save_rom, ToolDefinition};
use std::env;
use std::path::Path;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: {} <input> <output>", args[0]);
        eprintln!("\nExamples:");
        eprintln!("  {} tool.rom tool.json      # decode to JSON", args[0]);
        eprintln!("  {} tool.json tool.rom      # encode from JSON", args[0]);
        std::process::exit(1);
    }

    let input = Path::new(&args[1]);
    let output = Path::new(&args[2]);
    let extension = |p: &Path| {
        p.extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default()
    };

    match (extension(input).as_str(), extension(output).as_str()) {
        ("rom", "json") => {
            let (tool, warnings) = load_rom(input)?;
            for w in &warnings {
                eprintln!("warning: {w}");
            }
            let def = ToolDefinition::from_tool(&tool);
            std::fs::write(output, def.to_json()?)
                .with_context(|| format!("writing {}", output.display()))?;
            println!("Wrote {} ({} fiducials)", output.display(), def.count);
        }
        ("json", "rom") => {
            let json = std::fs::read_to_string(input)
                .with_context(|| format!("reading {}", input.display()))?;
            let tool = ToolDefinition::from_json(&json)?.into_tool()?;
            save_rom(output, &tool)?;
            println!("Wrote {} ({} markers)", output.display(), tool.markers.len());
        }
        (from, to) => bail!("unsupported conversion: .{from} -> .{to}"),
    }

    Ok(())
}
