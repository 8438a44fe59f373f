//! Pattern resolution: walk `extends` references depth-first and produce a
//! dependencies-first chain ready for merging.
//!
//! Every request rebuilds its index from disk; nothing is cached between calls.

use crate::error::{PatternError, PatternNotFound, Result};
use crate::lister::{self, ListOptions, PatternListing, PatternSelector};
use crate::loader::{self, Discovery, PatternIndex};
use crate::merge::{self, ResolvedConfig};
use crate::similarity::rank_candidates;
use crate::types::{order_search_paths, PatternDescriptor, PatternType, SearchPath};
use std::collections::HashSet;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct Resolver {
    search_paths: Vec<SearchPath>,
}

impl Resolver {
    /// Shipped roots are always ordered before user roots.
    pub fn new(search_paths: Vec<SearchPath>) -> Self {
        Self {
            search_paths: order_search_paths(search_paths),
        }
    }

    pub fn search_paths(&self) -> &[SearchPath] {
        &self.search_paths
    }

    /// Resolve `name` into its merge chain: dependencies first, `name` last.
    pub fn resolve(&self, name: &str, pattern_type: PatternType) -> Result<Vec<PatternDescriptor>> {
        let index = loader::scan(pattern_type, &self.search_paths)?;
        resolve_in(&index, name)
    }

    /// Resolve and merge in one step.
    pub fn resolve_config(&self, name: &str, pattern_type: PatternType) -> Result<ResolvedConfig> {
        let chain = self.resolve(name, pattern_type)?;
        Ok(merge::merge_as(name, pattern_type, &chain))
    }

    pub fn discover(&self, pattern_type: PatternType) -> Result<Discovery> {
        loader::discover(pattern_type, &self.search_paths)
    }

    pub fn list(&self, selector: PatternSelector, options: &ListOptions) -> Result<PatternListing> {
        lister::list_patterns(selector, &self.search_paths, options)
    }
}

/// Resolve `name` against an already-scanned index.
pub fn resolve_in(index: &PatternIndex, name: &str) -> Result<Vec<PatternDescriptor>> {
    let mut walk = Walk {
        index,
        path: Vec::new(),
        done: HashSet::new(),
        order: Vec::new(),
    };
    walk.visit(name, None)?;
    debug!(
        pattern = name,
        chain = ?walk.order.iter().map(|d| d.name.as_str()).collect::<Vec<_>>(),
        "resolved pattern"
    );
    Ok(walk.order)
}

struct Walk<'a> {
    index: &'a PatternIndex,
    /// Names on the current DFS path, outermost first.
    path: Vec<String>,
    done: HashSet<String>,
    order: Vec<PatternDescriptor>,
}

impl Walk<'_> {
    fn visit(&mut self, name: &str, required_by: Option<&str>) -> Result<()> {
        if self.done.contains(name) {
            return Ok(());
        }
        if let Some(start) = self.path.iter().position(|n| n == name) {
            let mut dependency_chain = self.path[start..].to_vec();
            dependency_chain.push(name.to_string());
            return Err(PatternError::CircularDependency { dependency_chain });
        }

        let source = self
            .index
            .get(name)
            .ok_or_else(|| not_found(self.index, name, required_by))?;
        let descriptor = source.load()?;

        self.path.push(name.to_string());
        for dependency in &descriptor.dependencies {
            self.visit(dependency, Some(name))?;
        }
        self.path.pop();

        self.done.insert(name.to_string());
        self.order.push(descriptor);
        Ok(())
    }
}

fn not_found(index: &PatternIndex, name: &str, required_by: Option<&str>) -> PatternError {
    PatternError::NotFound(PatternNotFound {
        pattern_name: name.to_string(),
        pattern_type: index.pattern_type(),
        required_by: required_by.map(str::to_string),
        available: rank_candidates(name, index.names()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Origin;
    use std::path::Path;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, body: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, body).unwrap();
    }

    fn yaml(s: &str) -> serde_yaml::Value {
        serde_yaml::from_str(s).unwrap()
    }

    fn names(chain: &[PatternDescriptor]) -> Vec<&str> {
        chain.iter().map(|d| d.name.as_str()).collect()
    }

    #[test]
    fn dependencies_come_first() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "workflows/base.yaml", "steps: [plan]\n");
        write(dir.path(), "workflows/reviewed.yaml", "extends: base\nreview: true\n");
        write(dir.path(), "workflows/release.yaml", "extends: [reviewed]\n");
        let resolver = Resolver::new(vec![SearchPath::shipped(dir.path())]);

        let chain = resolver.resolve("release", PatternType::Workflow).unwrap();
        assert_eq!(names(&chain), vec!["base", "reviewed", "release"]);
    }

    #[test]
    fn diamond_is_merged_once() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "phases/root.yaml", "level: root\n");
        write(dir.path(), "phases/left.yaml", "extends: root\nleft: true\n");
        write(dir.path(), "phases/right.yaml", "extends: root\nright: true\n");
        write(dir.path(), "phases/top.yaml", "extends: [left, right]\n");
        let resolver = Resolver::new(vec![SearchPath::shipped(dir.path())]);

        let chain = resolver.resolve("top", PatternType::Phase).unwrap();
        assert_eq!(names(&chain), vec!["root", "left", "right", "top"]);
    }

    #[test]
    fn cycle_reports_full_chain() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "workflows/a.yaml", "extends: b\n");
        write(dir.path(), "workflows/b.yaml", "extends: c\n");
        write(dir.path(), "workflows/c.yaml", "extends: a\n");
        let resolver = Resolver::new(vec![SearchPath::shipped(dir.path())]);

        let err = resolver.resolve("a", PatternType::Workflow).unwrap_err();
        match &err {
            PatternError::CircularDependency { dependency_chain } => {
                assert_eq!(dependency_chain, &["a", "b", "c", "a"]);
            }
            other => panic!("expected cycle, got {other:?}"),
        }
        assert!(err.to_string().contains("a -> b -> c -> a"));
    }

    #[test]
    fn cycle_below_entry_point_starts_at_repeated_name() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "workflows/entry.yaml", "extends: x\n");
        write(dir.path(), "workflows/x.yaml", "extends: y\n");
        write(dir.path(), "workflows/y.yaml", "extends: x\n");
        let resolver = Resolver::new(vec![SearchPath::shipped(dir.path())]);

        let err = resolver.resolve("entry", PatternType::Workflow).unwrap_err();
        assert!(err.to_string().ends_with("x -> y -> x"));
    }

    #[test]
    fn self_reference_is_a_cycle() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "documents/loop.yaml", "extends: loop\n");
        let resolver = Resolver::new(vec![SearchPath::shipped(dir.path())]);
        let err = resolver.resolve("loop", PatternType::Document).unwrap_err();
        assert!(err.to_string().contains("loop -> loop"));
    }

    #[test]
    fn missing_pattern_suggests_nearest() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "workflows/release.yaml", "description: r\n");
        let resolver = Resolver::new(vec![SearchPath::shipped(dir.path())]);

        let err = resolver.resolve("relase", PatternType::Workflow).unwrap_err();
        let PatternError::NotFound(nf) = &err else {
            panic!("expected not found, got {err:?}");
        };
        assert_eq!(nf.pattern_name, "relase");
        assert_eq!(nf.suggestion(), Some("release"));
        assert!(err.to_string().contains("Did you mean \"release\"?"));
    }

    #[test]
    fn missing_dependency_names_parent() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "workflows/release.yaml", "extends: hardening\n");
        let resolver = Resolver::new(vec![SearchPath::shipped(dir.path())]);

        let err = resolver.resolve("release", PatternType::Workflow).unwrap_err();
        let PatternError::NotFound(nf) = err else {
            panic!("expected not found");
        };
        assert_eq!(nf.pattern_name, "hardening");
        assert_eq!(nf.required_by.as_deref(), Some("release"));
    }

    #[test]
    fn user_scalars_override_shipped() {
        let shipped = TempDir::new().unwrap();
        let user = TempDir::new().unwrap();
        write(shipped.path(), "workflows/release.yaml", "approvers: 1\nchecks: {lint: true}\n");
        write(user.path(), "workflows/release.yaml", "approvers: 3\n");
        // Passed in the wrong order on purpose; the resolver reorders.
        let resolver = Resolver::new(vec![
            SearchPath::user(user.path()),
            SearchPath::shipped(shipped.path()),
        ]);

        let chain = resolver.resolve("release", PatternType::Workflow).unwrap();
        assert_eq!(chain.len(), 1);
        assert_eq!(chain[0].origin, Origin::User);
        let config = resolver.resolve_config("release", PatternType::Workflow).unwrap();
        assert_eq!(config.get("approvers"), Some(&yaml("3")));
        assert!(config.get("checks").is_none());
    }

    #[test]
    fn user_pattern_can_extend_shipped_base() {
        let shipped = TempDir::new().unwrap();
        let user = TempDir::new().unwrap();
        write(shipped.path(), "workflows/base.yaml", "approvers: 1\nchecks: {lint: true}\n");
        write(user.path(), "workflows/team.yaml", "extends: base\nchecks: {audit: true}\n");
        let resolver = Resolver::new(vec![
            SearchPath::shipped(shipped.path()),
            SearchPath::user(user.path()),
        ]);

        let config = resolver.resolve_config("team", PatternType::Workflow).unwrap();
        assert_eq!(config.get("checks"), Some(&yaml("{lint: true, audit: true}")));
        assert_eq!(config.get("approvers"), Some(&yaml("1")));
    }

    #[test]
    fn resolution_is_idempotent() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "workflows/base.yaml", "a: {x: 1}\n");
        write(dir.path(), "workflows/top.yaml", "extends: base\na: {y: 2}\n");
        let resolver = Resolver::new(vec![SearchPath::shipped(dir.path())]);
        let first = resolver.resolve_config("top", PatternType::Workflow).unwrap();
        let second = resolver.resolve_config("top", PatternType::Workflow).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn broken_file_off_the_path_is_ignored() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "workflows/good.yaml", "description: ok\n");
        write(dir.path(), "workflows/broken.yaml", "key: [unclosed\n");
        let resolver = Resolver::new(vec![SearchPath::shipped(dir.path())]);

        assert!(resolver.resolve("good", PatternType::Workflow).is_ok());
        let err = resolver.resolve("broken", PatternType::Workflow).unwrap_err();
        assert!(matches!(err, PatternError::Syntax(_)));
    }
}
