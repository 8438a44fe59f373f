use crate::error::{PatternError, Result};
use crate::loader::{self, PatternSource};
use crate::types::{Origin, PatternType, SearchPath};
use serde::Serialize;
use std::path::PathBuf;

pub const NO_DESCRIPTION: &str = "No description provided";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternSelector {
    All,
    Only(PatternType),
}

impl PatternSelector {
    pub fn types(self) -> Vec<PatternType> {
        match self {
            PatternSelector::All => PatternType::all().to_vec(),
            PatternSelector::Only(t) => vec![t],
        }
    }
}

impl std::str::FromStr for PatternSelector {
    type Err = PatternError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") {
            return Ok(PatternSelector::All);
        }
        s.parse().map(PatternSelector::Only)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    pub include_usage: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct PatternSummary {
    pub name: String,
    pub pattern_type: PatternType,
    pub source_path: PathBuf,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage_example: Option<String>,
    /// A later search path defines the same name.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub overridden: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PatternListing {
    pub shipped: Vec<PatternSummary>,
    pub user_defined: Vec<PatternSummary>,
}

/// Enumerate patterns by origin. Nothing is resolved or merged; files that do
/// not parse are still listed, with `error` set.
pub fn list_patterns(
    selector: PatternSelector,
    search_paths: &[SearchPath],
    options: &ListOptions,
) -> Result<PatternListing> {
    let mut listing = PatternListing::default();
    for pattern_type in selector.types() {
        let index = loader::scan(pattern_type, search_paths)?;
        let winners = index.sources().map(|s| (s, false));
        let losers = index.shadowed().iter().map(|s| (s, true));
        for (source, overridden) in winners.chain(losers) {
            let summary = summarize(source, overridden, options);
            match source.origin {
                Origin::Shipped => listing.shipped.push(summary),
                Origin::User => listing.user_defined.push(summary),
            }
        }
    }
    for bucket in [&mut listing.shipped, &mut listing.user_defined] {
        bucket.sort_by(|a, b| {
            (a.pattern_type, &a.name, a.overridden).cmp(&(b.pattern_type, &b.name, b.overridden))
        });
    }
    Ok(listing)
}

fn summarize(source: &PatternSource, overridden: bool, options: &ListOptions) -> PatternSummary {
    let mut summary = PatternSummary {
        name: source.name.clone(),
        pattern_type: source.pattern_type,
        source_path: source.path.clone(),
        description: NO_DESCRIPTION.to_string(),
        usage_example: None,
        overridden,
        error: None,
    };
    match source.load() {
        Ok(descriptor) => {
            if let Some(d) = descriptor.description() {
                summary.description = d.to_string();
            }
            if options.include_usage {
                summary.usage_example = descriptor.usage_example().map(str::to_string);
            }
        }
        Err(PatternError::Syntax(e)) => summary.error = Some(e.short_message()),
        Err(e) => summary.error = Some(e.to_string()),
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, body: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, body).unwrap();
    }

    fn fixture() -> (TempDir, TempDir, Vec<SearchPath>) {
        let shipped = TempDir::new().unwrap();
        let user = TempDir::new().unwrap();
        write(shipped.path(), "workflows/release.yaml", "description: Ship it\nusage_example: strata resolve release -t workflow\n");
        write(shipped.path(), "workflows/hotfix.yaml", "steps: [patch]\n");
        write(shipped.path(), "phases/design.yaml", "description: Design phase\n");
        write(user.path(), "workflows/release.yaml", "description: Our release\n");
        write(user.path(), "documents/adr.yaml", "description: Decision record\n");
        let paths = vec![SearchPath::shipped(shipped.path()), SearchPath::user(user.path())];
        (shipped, user, paths)
    }

    #[test]
    fn splits_by_origin() {
        let (_s, _u, paths) = fixture();
        let listing = list_patterns(PatternSelector::All, &paths, &ListOptions::default()).unwrap();

        let shipped: Vec<&str> = listing.shipped.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(shipped, vec!["hotfix", "release", "design"]);
        let user: Vec<&str> = listing.user_defined.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(user, vec!["release", "adr"]);
    }

    #[test]
    fn shadowed_shipped_pattern_is_flagged() {
        let (_s, _u, paths) = fixture();
        let listing = list_patterns(
            PatternSelector::Only(PatternType::Workflow),
            &paths,
            &ListOptions::default(),
        )
        .unwrap();
        let release = listing.shipped.iter().find(|p| p.name == "release").unwrap();
        assert!(release.overridden);
        assert!(!listing.user_defined[0].overridden);
    }

    #[test]
    fn description_placeholder_and_usage() {
        let (_s, _u, paths) = fixture();
        let opts = ListOptions { include_usage: true };
        let listing = list_patterns(PatternSelector::Only(PatternType::Workflow), &paths, &opts).unwrap();
        let hotfix = listing.shipped.iter().find(|p| p.name == "hotfix").unwrap();
        assert_eq!(hotfix.description, NO_DESCRIPTION);
        assert!(hotfix.usage_example.is_none());
        let release = listing.shipped.iter().find(|p| p.name == "release").unwrap();
        assert_eq!(
            release.usage_example.as_deref(),
            Some("strata resolve release -t workflow")
        );

        let without = list_patterns(
            PatternSelector::Only(PatternType::Workflow),
            &paths,
            &ListOptions::default(),
        )
        .unwrap();
        assert!(without.shipped.iter().all(|p| p.usage_example.is_none()));
    }

    #[test]
    fn broken_file_is_listed_with_error() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "phases/broken.yaml", "a: [b\n");
        let listing = list_patterns(
            PatternSelector::Only(PatternType::Phase),
            &[SearchPath::user(dir.path())],
            &ListOptions::default(),
        )
        .unwrap();
        assert_eq!(listing.user_defined.len(), 1);
        let error = listing.user_defined[0].error.as_deref().unwrap();
        assert!(error.starts_with("line "), "{error}");
        assert!(!error.contains('|'), "context block leaked: {error}");
        assert_eq!(listing.user_defined[0].description, NO_DESCRIPTION);
    }

    #[test]
    fn selector_parses_all() {
        assert_eq!("all".parse::<PatternSelector>().unwrap(), PatternSelector::All);
        assert_eq!(
            "phases".parse::<PatternSelector>().unwrap(),
            PatternSelector::Only(PatternType::Phase)
        );
        assert!("nope".parse::<PatternSelector>().is_err());
    }
}
