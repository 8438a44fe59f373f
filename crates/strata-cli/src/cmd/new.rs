use super::{parse_type, Context};
use crate::output::print_json;
use anyhow::Context as _;
use serde_yaml::{Mapping, Value};
use strata_core::{io, paths};

pub fn run(
    ctx: &Context,
    name: &str,
    pattern_type: &str,
    extends: &[String],
    description: Option<&str>,
) -> anyhow::Result<()> {
    let pattern_type = parse_type(pattern_type)?;
    paths::validate_pattern_name(name)?;

    let path = paths::pattern_file(&paths::user_patterns_dir(&ctx.root), pattern_type, name);
    if path.exists() {
        anyhow::bail!("{} already exists", path.display());
    }

    let mut doc = Mapping::new();
    let description = description
        .map(str::to_string)
        .unwrap_or_else(|| format!("{} {}", name.replace('-', " "), pattern_type));
    doc.insert("description".into(), description.into());
    if !extends.is_empty() {
        let names = extends.iter().cloned().map(Value::String).collect();
        doc.insert("extends".into(), Value::Sequence(names));
    }
    let data = serde_yaml::to_string(&doc)?;
    io::atomic_write(&path, data.as_bytes())
        .with_context(|| format!("failed to write {}", path.display()))?;

    // The file is kept either way; a broken reference is reported, not undone.
    let check = ctx.resolver()?.resolve(name, pattern_type);

    if ctx.json {
        let value = serde_json::json!({
            "path": path,
            "pattern_type": pattern_type,
            "name": name,
            "resolves": check.is_ok(),
        });
        print_json(&value)?;
    } else {
        println!("Created {pattern_type} pattern: {}", path.display());
    }
    if let Err(e) = check {
        eprintln!("warning: {e}");
    }
    Ok(())
}
