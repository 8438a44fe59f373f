use super::{parse_type, Context};
use crate::output::{print_json, print_table, print_yaml};
use serde::Serialize;
use std::path::PathBuf;
use strata_core::{Origin, PatternDescriptor};

#[derive(Serialize)]
struct ChainEntry {
    name: String,
    origin: Origin,
    source_path: PathBuf,
    extends: Vec<String>,
}

impl From<&PatternDescriptor> for ChainEntry {
    fn from(d: &PatternDescriptor) -> Self {
        Self {
            name: d.name.clone(),
            origin: d.origin,
            source_path: d.source_path.clone(),
            extends: d.dependencies.clone(),
        }
    }
}

pub fn run(ctx: &Context, name: &str, pattern_type: &str, chain: bool) -> anyhow::Result<()> {
    let pattern_type = parse_type(pattern_type)?;
    let resolver = ctx.resolver()?;

    if chain {
        let descriptors = resolver.resolve(name, pattern_type)?;
        let entries: Vec<ChainEntry> = descriptors.iter().map(ChainEntry::from).collect();
        if ctx.json {
            return print_json(&entries);
        }
        let rows = entries
            .iter()
            .enumerate()
            .map(|(i, e)| {
                vec![
                    (i + 1).to_string(),
                    e.name.clone(),
                    e.origin.to_string(),
                    e.source_path.display().to_string(),
                ]
            })
            .collect();
        print_table(&["#", "NAME", "ORIGIN", "SOURCE"], rows);
        return Ok(());
    }

    let resolved = resolver.resolve_config(name, pattern_type)?;
    if ctx.json {
        print_json(&resolved.value)
    } else {
        print_yaml(&resolved.value)
    }
}
