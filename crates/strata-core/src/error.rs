use crate::similarity::Candidate;
use crate::types::PatternType;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PatternError {
    #[error(transparent)]
    Syntax(#[from] YamlSyntaxError),

    #[error(transparent)]
    NotFound(#[from] PatternNotFound),

    #[error("circular dependency detected: {}", .dependency_chain.join(" -> "))]
    CircularDependency { dependency_chain: Vec<String> },

    #[error("invalid field '{field}' in {}: {reason}", .file_path.display())]
    InvalidField {
        file_path: PathBuf,
        field: String,
        reason: String,
    },

    #[error("invalid pattern type '{0}': expected workflows, phases or documents")]
    InvalidPatternType(String),

    #[error("invalid pattern name '{0}': must be lowercase alphanumeric with hyphens")]
    InvalidName(String),

    #[error("failed to read {}: {source}", .file_path.display())]
    ReadFailed {
        file_path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, PatternError>;

// ---------------------------------------------------------------------------
// YamlSyntaxError
// ---------------------------------------------------------------------------

/// A pattern file that failed to parse.
///
/// `line` and `column` are 0-based as reported by the parser; `context` is the
/// rendered source window around `line` (1-based numbering for display).
#[derive(Debug, Clone, Serialize)]
pub struct YamlSyntaxError {
    pub file_path: PathBuf,
    pub line: Option<usize>,
    pub column: Option<usize>,
    pub message: String,
    pub context: Option<String>,
}

impl YamlSyntaxError {
    /// One line, `line L, column C: message`, without the path or context.
    pub fn short_message(&self) -> String {
        match (self.line, self.column) {
            (Some(line), Some(column)) => {
                format!("line {}, column {}: {}", line + 1, column + 1, self.message)
            }
            _ => self.message.clone(),
        }
    }
}

impl fmt::Display for YamlSyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "YAML syntax error in {}", self.file_path.display())?;
        if let (Some(line), Some(column)) = (self.line, self.column) {
            write!(f, " at line {}, column {}", line + 1, column + 1)?;
        }
        write!(f, ": {}", self.message)?;
        if let Some(context) = &self.context {
            write!(f, "\n\n{context}")?;
        }
        Ok(())
    }
}

impl std::error::Error for YamlSyntaxError {}

// ---------------------------------------------------------------------------
// PatternNotFound
// ---------------------------------------------------------------------------

/// Suggestions below or at this score are not offered.
pub const SUGGESTION_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Serialize)]
pub struct PatternNotFound {
    pub pattern_name: String,
    pub pattern_type: PatternType,
    /// The pattern whose `extends` named the missing one.
    pub required_by: Option<String>,
    /// Every pattern of `pattern_type`, best match first.
    pub available: Vec<Candidate>,
}

impl PatternNotFound {
    pub fn suggestion(&self) -> Option<&str> {
        self.available
            .first()
            .filter(|c| c.score > SUGGESTION_THRESHOLD)
            .map(|c| c.name.as_str())
    }

    pub fn available_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.available.iter().map(|c| c.name.as_str()).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Display for PatternNotFound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pattern \"{}\"", self.pattern_name)?;
        if let Some(parent) = &self.required_by {
            write!(f, " (extended by \"{parent}\")")?;
        }
        write!(f, " not found in {}", self.pattern_type.dir_name())?;
        if let Some(suggested) = self.suggestion() {
            write!(f, "\nDid you mean \"{suggested}\"?")?;
        }
        let names = self.available_names();
        if names.is_empty() {
            write!(f, "\nNo {} are defined.", self.pattern_type.dir_name())
        } else {
            write!(
                f,
                "\nAvailable {}: {}",
                self.pattern_type.dir_name(),
                names.join(", ")
            )
        }
    }
}

impl std::error::Error for PatternNotFound {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::similarity::rank_candidates;

    #[test]
    fn not_found_suggests_close_match() {
        let err = PatternNotFound {
            pattern_name: "relase".to_string(),
            pattern_type: PatternType::Workflow,
            required_by: None,
            available: rank_candidates("relase", ["release"]),
        };
        let msg = err.to_string();
        assert!(msg.contains("Did you mean \"release\"?"), "{msg}");
        assert!(msg.contains("Available workflows: release"));
    }

    #[test]
    fn not_found_lists_names_without_weak_suggestion() {
        let err = PatternNotFound {
            pattern_name: "zzz".to_string(),
            pattern_type: PatternType::Phase,
            required_by: Some("release".to_string()),
            available: rank_candidates("zzz", ["design", "review"]),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("pattern \"zzz\" (extended by \"release\") not found in phases"));
        assert!(!msg.contains("Did you mean"));
        assert!(msg.contains("Available phases: design, review"));
    }

    #[test]
    fn not_found_with_no_patterns() {
        let err = PatternNotFound {
            pattern_name: "x".to_string(),
            pattern_type: PatternType::Document,
            required_by: None,
            available: Vec::new(),
        };
        assert!(err.to_string().contains("No documents are defined."));
    }

    #[test]
    fn circular_renders_chain() {
        let err = PatternError::CircularDependency {
            dependency_chain: vec!["a".into(), "b".into(), "c".into(), "a".into()],
        };
        assert_eq!(
            err.to_string(),
            "circular dependency detected: a -> b -> c -> a"
        );
    }

    #[test]
    fn syntax_error_display_is_one_based() {
        let err = YamlSyntaxError {
            file_path: PathBuf::from("workflows/bad.yaml"),
            line: Some(9),
            column: Some(0),
            message: "found character that cannot start any token".to_string(),
            context: None,
        };
        assert!(err.to_string().contains("at line 10, column 1"));
        assert_eq!(
            err.short_message(),
            "line 10, column 1: found character that cannot start any token"
        );
    }

    #[test]
    fn read_failure_names_the_file() {
        let err = PatternError::ReadFailed {
            file_path: PathBuf::from("workflows/bin.yaml"),
            source: std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "stream did not contain valid UTF-8",
            ),
        };
        assert_eq!(
            err.to_string(),
            "failed to read workflows/bin.yaml: stream did not contain valid UTF-8"
        );
    }
}
