//! Tree command
//!
//! Usage: rdm tree <SCRIPT> [--config <TOML>]

use clap::Args;
use std::fmt::Write;
use std::path::PathBuf;

use rdm_core::{ElementId, Module};

#[derive(Debug, Args)]
pub struct TreeArgs {
    /// Design script (JSON)
    pub script: PathBuf,

    /// Engine settings (TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Execute tree command
pub fn execute(args: TreeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let module = super::load_design(&args.script, args.config.as_ref())?;
    print!("{}", outline(&module)?);
    Ok(())
}

/// Indented outline: each element, then each non-empty slot as `[name]`
pub fn outline(module: &Module) -> Result<String, Box<dyn std::error::Error>> {
    let mut out = String::new();
    write_element(module, module.root(), 0, &mut out)?;
    Ok(out)
}

fn write_element(
    module: &Module,
    id: ElementId,
    depth: usize,
    out: &mut String,
) -> Result<(), Box<dyn std::error::Error>> {
    let element = module.element(id)?;
    writeln!(out, "{}{}", "  ".repeat(depth), element.display_name())?;
    for (location, contents) in element.content_lists() {
        let slot = module
            .schema()
            .content_defn(element.kind(), location)
            .map(|defn| defn.name.to_string())
            .unwrap_or_else(|| location.to_string());
        writeln!(out, "{}[{}]", "  ".repeat(depth + 1), slot)?;
        for content in contents {
            write_element(module, *content, depth + 2, out)?;
        }
    }
    Ok(())
}
