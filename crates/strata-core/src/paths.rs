use crate::error::{PatternError, Result};
use crate::types::PatternType;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const STRATA_DIR: &str = ".strata";
pub const PATTERNS_DIR: &str = ".strata/patterns";
pub const CONFIG_FILE: &str = ".strata/config.yaml";

/// Shipped patterns relative to the directory holding the executable's
/// `bin/` directory (`<prefix>/share/strata/patterns`).
pub const SHIPPED_SHARE_DIR: &str = "share/strata/patterns";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

/// The project-local override root.
pub fn user_patterns_dir(root: &Path) -> PathBuf {
    root.join(PATTERNS_DIR)
}

pub fn pattern_file(patterns_root: &Path, pattern_type: PatternType, name: &str) -> PathBuf {
    patterns_root
        .join(pattern_type.dir_name())
        .join(format!("{name}.yaml"))
}

// ---------------------------------------------------------------------------
// Name validation
// ---------------------------------------------------------------------------

static NAME_RE: OnceLock<Regex> = OnceLock::new();

fn name_re() -> &'static Regex {
    NAME_RE.get_or_init(|| Regex::new(r"^[a-z0-9][a-z0-9\-]*[a-z0-9]$|^[a-z0-9]$").unwrap())
}

/// Names used for new pattern files. Existing files are accepted as named.
pub fn validate_pattern_name(name: &str) -> Result<()> {
    if name.is_empty() || name.len() > 64 || !name_re().is_match(name) {
        return Err(PatternError::InvalidName(name.to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
