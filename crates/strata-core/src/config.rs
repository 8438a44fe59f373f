use crate::error::Result;
use crate::paths;
use crate::types::SearchPath;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// PatternsConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternsConfig {
    /// Overrides the shipped pattern directory. Relative paths are taken from
    /// the project root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipped_dir: Option<PathBuf>,
    /// Set to false to resolve against project patterns only.
    #[serde(default = "default_include_shipped")]
    pub include_shipped: bool,
    /// Extra user roots, consulted after the shipped set and before
    /// `.strata/patterns`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub search_paths: Vec<PathBuf>,
}

fn default_include_shipped() -> bool {
    true
}

impl Default for PatternsConfig {
    fn default() -> Self {
        Self {
            shipped_dir: None,
            include_shipped: default_include_shipped(),
            search_paths: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// ProjectConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    pub project: ProjectConfig,
    #[serde(default)]
    pub patterns: PatternsConfig,
}

fn default_version() -> u32 {
    1
}

impl Config {
    pub fn new(project_name: impl Into<String>) -> Self {
        Self {
            version: 1,
            project: ProjectConfig {
                name: project_name.into(),
                description: None,
            },
            patterns: PatternsConfig::default(),
        }
    }

    /// Load `.strata/config.yaml`. A project without one gets defaults named
    /// after its directory.
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            let name = root
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("project");
            return Ok(Self::new(name));
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    /// The shipped root to use: `explicit` (flag/env) beats the config file,
    /// which beats `fallback`.
    pub fn shipped_dir(
        &self,
        root: &Path,
        explicit: Option<&Path>,
        fallback: Option<&Path>,
    ) -> Option<PathBuf> {
        if !self.patterns.include_shipped {
            return None;
        }
        explicit
            .map(Path::to_path_buf)
            .or_else(|| self.patterns.shipped_dir.as_ref().map(|p| root.join(p)))
            .or_else(|| fallback.map(Path::to_path_buf))
    }

    /// Ordered search roots, lowest precedence first.
    pub fn search_paths(&self, root: &Path, shipped_dir: Option<&Path>) -> Vec<SearchPath> {
        let mut out = Vec::new();
        if let Some(dir) = shipped_dir {
            out.push(SearchPath::shipped(dir));
        }
        for extra in &self.patterns.search_paths {
            out.push(SearchPath::user(root.join(extra)));
        }
        out.push(SearchPath::user(paths::user_patterns_dir(root)));
        out
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self, root: &Path) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.version != default_version() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!("unsupported config version {}", self.version),
            });
        }

        if let Some(dir) = &self.patterns.shipped_dir {
            if !root.join(dir).is_dir() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!(
                        "patterns.shipped_dir '{}' is not a directory",
                        dir.display()
                    ),
                });
            }
        }

        let project_dir = paths::user_patterns_dir(root);
        let mut seen = HashSet::new();
        for extra in &self.patterns.search_paths {
            let full = root.join(extra);
            if !seen.insert(full.clone()) {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!(
                        "search path '{}' is listed more than once",
                        extra.display()
                    ),
                });
                continue;
            }
            if full == project_dir {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!(
                        "search path '{}' duplicates {}",
                        extra.display(),
                        paths::PATTERNS_DIR
                    ),
                });
            } else if !full.is_dir() {
                // Not fatal: missing roots contribute no patterns.
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!("search path '{}' does not exist", extra.display()),
                });
            }
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
