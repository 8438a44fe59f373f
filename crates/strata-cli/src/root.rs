use std::path::{Path, PathBuf};
use strata_core::paths::{SHIPPED_SHARE_DIR, STRATA_DIR};

/// Resolve the project root directory.
///
/// Priority:
/// 1. `--root` flag / `STRATA_ROOT` env var (passed in as `explicit`)
/// 2. Walk upward from `cwd` looking for `.strata/`
/// 3. Walk upward from `cwd` looking for `.git/`
/// 4. Fall back to `cwd`
pub fn resolve_root(explicit: Option<&Path>) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    find_upward(&cwd, STRATA_DIR)
        .or_else(|| find_upward(&cwd, ".git"))
        .unwrap_or(cwd)
}

fn find_upward(start: &Path, marker: &str) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(marker).is_dir())
        .map(Path::to_path_buf)
}

/// Where the shipped patterns live when neither the flag nor the project
/// config says otherwise: `<prefix>/share/strata/patterns` for an installed
/// binary, else the `patterns/` directory of the source tree it was built from.
pub fn default_shipped_dir() -> Option<PathBuf> {
    let installed = std::env::current_exe().ok().and_then(|exe| {
        exe.parent()
            .and_then(Path::parent)
            .map(|prefix| prefix.join(SHIPPED_SHARE_DIR))
    });
    let source_tree = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../patterns");
    installed
        .into_iter()
        .chain(std::iter::once(source_tree))
        .find(|dir| dir.is_dir())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn explicit_root_wins() {
        let dir = TempDir::new().unwrap();
        let result = resolve_root(Some(dir.path()));
        assert_eq!(result, dir.path());
    }

    #[test]
    fn finds_strata_dir_above() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".strata")).unwrap();
        let subdir = dir.path().join("src/deep");
        std::fs::create_dir_all(&subdir).unwrap();
        assert_eq!(find_upward(&subdir, STRATA_DIR), Some(dir.path().to_path_buf()));
    }

    #[test]
    fn no_marker_found() {
        let dir = TempDir::new().unwrap();
        assert!(find_upward(dir.path(), "no-such-marker-dir").is_none());
    }
}
