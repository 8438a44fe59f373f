use super::Context;
use anyhow::Context as _;
use strata_core::{config::Config, io, paths, PatternType};

pub fn run(ctx: &Context) -> anyhow::Result<()> {
    let root = &ctx.root;
    let project_name = root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "project".to_string());

    println!("Initializing strata in: {}", root.display());

    // 1. Pattern directories, one per type
    let patterns_root = paths::user_patterns_dir(root);
    for pattern_type in PatternType::all() {
        let p = patterns_root.join(pattern_type.dir_name());
        io::ensure_dir(&p).with_context(|| format!("failed to create {}", p.display()))?;
    }

    // 2. config.yaml if missing
    let config_path = paths::config_path(root);
    if !config_path.exists() {
        let cfg = Config::new(&project_name);
        cfg.save(root).context("failed to write config.yaml")?;
        println!("  created: {}", paths::CONFIG_FILE);
    } else {
        println!("  exists:  {}", paths::CONFIG_FILE);
    }

    println!("\nAdd overrides under {}/<workflows|phases|documents>/.", paths::PATTERNS_DIR);
    println!("Next: strata list");
    Ok(())
}
