use super::Context;
use crate::output::print_json;
use std::collections::{BTreeMap, HashSet};
use strata_core::config::WarnLevel;
use strata_core::{PatternError, PatternType};

/// Load every pattern, then resolve each one so that missing references and
/// cycles surface as well as syntax errors.
pub fn run(ctx: &Context) -> anyhow::Result<()> {
    let config = ctx.config()?;
    let warnings = config.validate(&ctx.root);
    let resolver = strata_core::Resolver::new(ctx.search_paths(&config));

    let mut counts: BTreeMap<&'static str, usize> = BTreeMap::new();
    let mut errors: Vec<String> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut record = |e: PatternError| {
        let message = e.to_string();
        if seen.insert(message.clone()) {
            errors.push(message);
        }
    };

    for &pattern_type in PatternType::all() {
        let discovery = resolver.discover(pattern_type)?;
        counts.insert(pattern_type.dir_name(), discovery.patterns.len());
        for e in discovery.errors {
            record(e);
        }
        for pattern in &discovery.patterns {
            match resolver.resolve(&pattern.name, pattern_type) {
                Ok(_) => {}
                // Already reported by discovery.
                Err(
                    PatternError::Syntax(_)
                    | PatternError::InvalidField { .. }
                    | PatternError::ReadFailed { .. },
                ) => {}
                Err(e) => record(e),
            }
        }
    }

    if ctx.json {
        let value = serde_json::json!({
            "patterns": counts,
            "warnings": warnings,
            "errors": errors,
        });
        print_json(&value)?;
    } else {
        for (dir, n) in &counts {
            println!("{dir}: {n} loaded");
        }
        for w in &warnings {
            let prefix = match w.level {
                WarnLevel::Warning => "warning",
                WarnLevel::Error => "error",
            };
            println!("[{prefix}] {}", w.message);
        }
        for e in &errors {
            println!("[error] {e}");
        }
        if warnings.is_empty() && errors.is_empty() {
            println!("All patterns are valid.");
        }
    }

    let config_errors = warnings.iter().any(|w| w.level == WarnLevel::Error);
    if !errors.is_empty() || config_errors {
        anyhow::bail!("validation failed with {} pattern error(s)", errors.len());
    }
    Ok(())
}
