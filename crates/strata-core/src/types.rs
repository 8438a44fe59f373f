use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::fmt;
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// PatternType
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternType {
    Workflow,
    Phase,
    Document,
}

impl PatternType {
    pub fn all() -> &'static [PatternType] {
        &[
            PatternType::Workflow,
            PatternType::Phase,
            PatternType::Document,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PatternType::Workflow => "workflow",
            PatternType::Phase => "phase",
            PatternType::Document => "document",
        }
    }

    /// Subdirectory of a search root holding patterns of this type.
    pub fn dir_name(self) -> &'static str {
        match self {
            PatternType::Workflow => "workflows",
            PatternType::Phase => "phases",
            PatternType::Document => "documents",
        }
    }
}

impl fmt::Display for PatternType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PatternType {
    type Err = crate::error::PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "workflow" | "workflows" => Ok(PatternType::Workflow),
            "phase" | "phases" => Ok(PatternType::Phase),
            "document" | "documents" => Ok(PatternType::Document),
            _ => Err(crate::error::PatternError::InvalidPatternType(
                s.to_string(),
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Origin
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    Shipped,
    User,
}

impl Origin {
    pub fn as_str(self) -> &'static str {
        match self {
            Origin::Shipped => "shipped",
            Origin::User => "user",
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// SearchPath
// ---------------------------------------------------------------------------

/// One pattern root. Search paths are ordered lowest precedence first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchPath {
    pub root: PathBuf,
    pub origin: Origin,
}

impl SearchPath {
    pub fn shipped(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            origin: Origin::Shipped,
        }
    }

    pub fn user(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            origin: Origin::User,
        }
    }

    pub fn type_dir(&self, pattern_type: PatternType) -> PathBuf {
        self.root.join(pattern_type.dir_name())
    }
}

/// Order search paths so that every shipped root precedes every user root,
/// keeping the relative order within each origin.
pub fn order_search_paths(paths: Vec<SearchPath>) -> Vec<SearchPath> {
    let (mut shipped, user): (Vec<_>, Vec<_>) =
        paths.into_iter().partition(|p| p.origin == Origin::Shipped);
    shipped.extend(user);
    shipped
}

// ---------------------------------------------------------------------------
// PatternDescriptor
// ---------------------------------------------------------------------------

pub const EXTENDS_KEY: &str = "extends";
pub const DESCRIPTION_KEY: &str = "description";
pub const USAGE_EXAMPLE_KEYS: &[&str] = &["usage_example", "usageExample"];

/// A parsed pattern file. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatternDescriptor {
    pub name: String,
    pub pattern_type: PatternType,
    pub source_path: PathBuf,
    pub origin: Origin,
    pub document: Value,
    /// Names this pattern extends, in declared order.
    pub dependencies: Vec<String>,
}

impl PatternDescriptor {
    pub fn description(&self) -> Option<&str> {
        self.document.get(DESCRIPTION_KEY).and_then(Value::as_str)
    }

    pub fn usage_example(&self) -> Option<&str> {
        USAGE_EXAMPLE_KEYS
            .iter()
            .find_map(|k| self.document.get(*k).and_then(Value::as_str))
    }
}
