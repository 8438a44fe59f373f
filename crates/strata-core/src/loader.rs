//! Pattern discovery and parsing.
//!
//! Patterns live at `<root>/<type-dir>/<name>.yaml` (or `.yml`). Scanning only
//! lists files; parsing happens on demand so a broken file that nobody asks for
//! never fails a request.

use crate::error::{PatternError, Result, YamlSyntaxError};
use crate::types::{Origin, PatternDescriptor, PatternType, SearchPath, EXTENDS_KEY};
use serde::Serialize;
use serde_yaml::Value;
use std::collections::BTreeMap;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, warn};

pub const PATTERN_EXTENSIONS: &[&str] = &["yaml", "yml"];

/// Lines shown on each side of the failing line in a syntax error.
pub const CONTEXT_RADIUS: usize = 3;

// ---------------------------------------------------------------------------
// PatternSource / PatternIndex
// ---------------------------------------------------------------------------

/// A pattern file found on disk, not yet parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatternSource {
    pub name: String,
    pub pattern_type: PatternType,
    pub path: PathBuf,
    pub origin: Origin,
}

impl PatternSource {
    pub fn load(&self) -> Result<PatternDescriptor> {
        load_one(&self.path, self.pattern_type, self.origin)
    }
}

/// Every pattern file of one type, deduplicated by name.
#[derive(Debug, Clone)]
pub struct PatternIndex {
    pattern_type: PatternType,
    entries: BTreeMap<String, PatternSource>,
    shadowed: Vec<PatternSource>,
}

impl PatternIndex {
    fn new(pattern_type: PatternType) -> Self {
        Self {
            pattern_type,
            entries: BTreeMap::new(),
            shadowed: Vec::new(),
        }
    }

    fn insert(&mut self, source: PatternSource) {
        if let Some(previous) = self.entries.insert(source.name.clone(), source) {
            debug!(
                name = %previous.name,
                path = %previous.path.display(),
                "pattern overridden by a later search path"
            );
            self.shadowed.push(previous);
        }
    }

    pub fn pattern_type(&self) -> PatternType {
        self.pattern_type
    }

    pub fn get(&self, name: &str) -> Option<&PatternSource> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Winning sources in name order.
    pub fn sources(&self) -> impl Iterator<Item = &PatternSource> {
        self.entries.values()
    }

    /// Sources that lost a name collision to a later search path.
    pub fn shadowed(&self) -> &[PatternSource] {
        &self.shadowed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Scanning
// ---------------------------------------------------------------------------

/// List pattern files of `pattern_type` across `search_paths` (lowest
/// precedence first). Missing directories contribute nothing.
pub fn scan(pattern_type: PatternType, search_paths: &[SearchPath]) -> Result<PatternIndex> {
    let mut index = PatternIndex::new(pattern_type);
    for search_path in search_paths {
        let dir = search_path.type_dir(pattern_type);
        if !dir.is_dir() {
            debug!(dir = %dir.display(), "pattern directory absent, skipping");
            continue;
        }
        debug!(dir = %dir.display(), origin = %search_path.origin, "scanning pattern directory");
        for (name, path) in scan_dir(&dir)? {
            index.insert(PatternSource {
                name,
                pattern_type,
                path,
                origin: search_path.origin,
            });
        }
    }
    Ok(index)
}

/// Pattern files directly inside `dir`, keyed by name. When both `x.yaml` and
/// `x.yml` exist, `.yaml` wins.
fn scan_dir(dir: &Path) -> Result<BTreeMap<String, PathBuf>> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
        .map_err(|e| read_failed(dir, e))?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && has_pattern_extension(p))
        .collect();
    paths.sort();

    let mut found: BTreeMap<String, PathBuf> = BTreeMap::new();
    for path in paths {
        let Some(name) = pattern_name(&path) else {
            continue;
        };
        match found.get(&name) {
            Some(existing) => {
                warn!(
                    kept = %existing.display(),
                    ignored = %path.display(),
                    "duplicate pattern file with a different extension"
                );
            }
            None => {
                found.insert(name, path);
            }
        }
    }
    Ok(found)
}

fn read_failed(path: &Path, source: std::io::Error) -> PatternError {
    PatternError::ReadFailed {
        file_path: path.to_path_buf(),
        source,
    }
}

fn has_pattern_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| PATTERN_EXTENSIONS.contains(&e))
}

fn pattern_name(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Read and parse one pattern file.
pub fn load_one(path: &Path, pattern_type: PatternType, origin: Origin) -> Result<PatternDescriptor> {
    let name = pattern_name(path).ok_or_else(|| PatternError::InvalidName(path.display().to_string()))?;
    let text = std::fs::read_to_string(path).map_err(|e| read_failed(path, e))?;
    let document = parse_document(path, &text)?;
    let dependencies = declared_dependencies(path, &document)?;
    Ok(PatternDescriptor {
        name,
        pattern_type,
        source_path: path.to_path_buf(),
        origin,
        document,
        dependencies,
    })
}

/// Parse YAML text. An empty document becomes an empty mapping.
pub fn parse_document(path: &Path, text: &str) -> std::result::Result<Value, YamlSyntaxError> {
    match serde_yaml::from_str::<Value>(text) {
        Ok(Value::Null) => Ok(Value::Mapping(Default::default())),
        Ok(value) => Ok(value),
        Err(e) => {
            let location = e.location();
            let line = location.as_ref().map(|l| l.line().saturating_sub(1));
            let column = location.as_ref().map(|l| l.column().saturating_sub(1));
            Err(YamlSyntaxError {
                file_path: path.to_path_buf(),
                line,
                column,
                message: strip_location(&e.to_string()),
                context: line.and_then(|l| render_context(text, l, CONTEXT_RADIUS)),
            })
        }
    }
}

static LOCATION_RE: OnceLock<Regex> = OnceLock::new();

fn location_re() -> &'static Regex {
    LOCATION_RE.get_or_init(|| Regex::new(r" at line \d+ column \d+").unwrap())
}

/// Drop the parser's own first " at line N column M"; that location is kept in
/// structured form instead. Later locations belong to the parser's secondary
/// context and stay.
fn strip_location(message: &str) -> String {
    location_re().replace(message, "").into_owned()
}

/// Render `radius` lines either side of the 0-based `line`, numbered from 1,
/// with `>` marking the failing line.
pub fn render_context(text: &str, line: usize, radius: usize) -> Option<String> {
    let lines: Vec<&str> = text.lines().collect();
    if lines.is_empty() {
        return None;
    }
    // Parsers report end-of-input errors one past the last line.
    let line = line.min(lines.len() - 1);
    let start = line.saturating_sub(radius);
    let end = (line + radius).min(lines.len() - 1);
    let width = (end + 1).to_string().len();

    let rendered: Vec<String> = (start..=end)
        .map(|i| {
            let marker = if i == line { '>' } else { ' ' };
            format!("{marker} {:>width$} | {}", i + 1, lines[i])
        })
        .collect();
    Some(rendered.join("\n"))
}

/// The `extends` field: absent, a single name, or a list of names.
fn declared_dependencies(path: &Path, document: &Value) -> Result<Vec<String>> {
    let invalid = |reason: &str| PatternError::InvalidField {
        file_path: path.to_path_buf(),
        field: EXTENDS_KEY.to_string(),
        reason: reason.to_string(),
    };
    match document.get(EXTENDS_KEY) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::String(name)) => Ok(vec![name.clone()]),
        Some(Value::Sequence(items)) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| invalid("every entry must be a pattern name"))
            })
            .collect(),
        Some(_) => Err(invalid("expected a pattern name or a list of names")),
    }
}

// ---------------------------------------------------------------------------
// Discovery
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct Discovery {
    pub patterns: Vec<PatternDescriptor>,
    /// Files that could not be loaded. One bad file never hides the others.
    pub errors: Vec<PatternError>,
}

/// Load every pattern of `pattern_type`, user variants replacing shipped ones.
pub fn discover(pattern_type: PatternType, search_paths: &[SearchPath]) -> Result<Discovery> {
    let index = scan(pattern_type, search_paths)?;
    let mut discovery = Discovery::default();
    for source in index.sources() {
        match source.load() {
            Ok(descriptor) => discovery.patterns.push(descriptor),
            Err(e) => {
                warn!(path = %source.path.display(), error = %e, "failed to load pattern");
                discovery.errors.push(e);
            }
        }
    }
    Ok(discovery)
}
