use super::Context;
use crate::output::{print_json, print_table};
use anyhow::Context as _;
use strata_core::{ListOptions, PatternSelector, PatternSummary};

pub fn run(ctx: &Context, pattern_type: &str, examples: bool) -> anyhow::Result<()> {
    let selector: PatternSelector = pattern_type.parse()?;
    let resolver = ctx.resolver()?;
    let options = ListOptions {
        include_usage: examples,
    };
    let listing = resolver
        .list(selector, &options)
        .context("failed to list patterns")?;

    if ctx.json {
        return print_json(&listing);
    }

    print_section("Shipped patterns", &listing.shipped, examples);
    println!();
    print_section("User-defined patterns", &listing.user_defined, examples);
    Ok(())
}

fn print_section(title: &str, patterns: &[PatternSummary], examples: bool) {
    println!("{title}:");
    if patterns.is_empty() {
        println!("  (none)");
        return;
    }

    let mut headers = vec!["TYPE", "NAME", "DESCRIPTION"];
    if examples {
        headers.push("USAGE");
    }
    let rows: Vec<Vec<String>> = patterns
        .iter()
        .map(|p| {
            let name = if p.overridden {
                format!("{} (overridden)", p.name)
            } else {
                p.name.clone()
            };
            let description = match &p.error {
                Some(err) => format!("invalid: {err}"),
                None => p.description.clone(),
            };
            let mut row = vec![p.pattern_type.to_string(), name, description];
            if examples {
                row.push(p.usage_example.clone().unwrap_or_default());
            }
            row
        })
        .collect();
    print_table(&headers, rows);
}
