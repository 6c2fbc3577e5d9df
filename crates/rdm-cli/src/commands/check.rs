//! Check command
//!
//! Usage: rdm check <SCRIPT> [--config <TOML>] [--json]

use clap::Args;
use std::path::PathBuf;

use rdm_core::validation::Severity;

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Design script (JSON)
    pub script: PathBuf,

    /// Engine settings (TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Print findings as a JSON array
    #[arg(long)]
    pub json: bool,
}

/// Execute check command
///
/// Fails when the design does not load or holds at least one error-level
/// finding; warnings are printed but do not fail the check.
pub fn execute(args: CheckArgs) -> Result<(), Box<dyn std::error::Error>> {
    let module = super::load_design(&args.script, args.config.as_ref())?;
    let findings = module.all_errors();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&findings)?);
    } else if findings.is_empty() {
        println!("✓ {} has no semantic errors", args.script.display());
    } else {
        for finding in &findings {
            let subject = module
                .element(finding.element)
                .map(|el| el.display_name())
                .unwrap_or_else(|_| finding.element.to_string());
            println!(
                "{:?} [{}] {}: {}",
                finding.severity, finding.validator, subject, finding.message
            );
        }
    }

    let errors = findings
        .iter()
        .filter(|f| f.severity == Severity::Error)
        .count();
    if errors > 0 {
        return Err(format!("{} semantic error(s)", errors).into());
    }
    Ok(())
}
