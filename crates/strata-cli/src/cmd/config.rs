use super::Context;
use crate::output::{print_json, print_table};
use clap::Subcommand;
use strata_core::config::WarnLevel;

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show the effective search paths, lowest precedence first
    Show,

    /// Validate the config for common mistakes
    Validate,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(ctx: &Context, subcmd: ConfigSubcommand) -> anyhow::Result<()> {
    match subcmd {
        ConfigSubcommand::Show => show(ctx),
        ConfigSubcommand::Validate => validate(ctx),
    }
}

// ---------------------------------------------------------------------------
// show
// ---------------------------------------------------------------------------

fn show(ctx: &Context) -> anyhow::Result<()> {
    let config = ctx.config()?;
    let search_paths = ctx.search_paths(&config);

    if ctx.json {
        let value = serde_json::json!({
            "project": config.project.name,
            "search_paths": search_paths,
        });
        return print_json(&value);
    }

    println!("Project: {}", config.project.name);
    let rows = search_paths
        .iter()
        .map(|sp| {
            let status = if sp.root.is_dir() { "" } else { "(missing)" };
            vec![
                sp.origin.to_string(),
                sp.root.display().to_string(),
                status.to_string(),
            ]
        })
        .collect();
    print_table(&["ORIGIN", "ROOT", ""], rows);
    Ok(())
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

fn validate(ctx: &Context) -> anyhow::Result<()> {
    let config = ctx.config()?;
    let warnings = config.validate(&ctx.root);

    if ctx.json {
        let value = serde_json::json!({
            "warnings": warnings,
        });
        print_json(&value)?;
    } else if warnings.is_empty() {
        println!("Config is valid. No warnings.");
    } else {
        for w in &warnings {
            let prefix = match w.level {
                WarnLevel::Warning => "warning",
                WarnLevel::Error => "error",
            };
            println!("[{prefix}] {}", w.message);
        }
    }

    let has_errors = warnings.iter().any(|w| w.level == WarnLevel::Error);
    if has_errors {
        anyhow::bail!("config validation found errors");
    }

    Ok(())
}
