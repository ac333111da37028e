use replybot_core::paths::REPLIES_FILE;
use std::path::{Path, PathBuf};

/// Resolve the installation directory.
///
/// Priority:
/// 1. `--root` flag / `REPLYBOT_ROOT` env var (passed in as `explicit`)
/// 2. Walk upward from `cwd` looking for `replies.json`
/// 3. Fall back to `cwd`
pub fn resolve_root(explicit: Option<&Path>) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    find_upward(&cwd).unwrap_or(cwd)
}

fn find_upward(start: &Path) -> Option<PathBuf> {
    let mut dir = start.to_path_buf();
    loop {
        if dir.join(REPLIES_FILE).is_file() {
            return Some(dir);
        }
        match dir.parent() {
            Some(p) => dir = p.to_path_buf(),
            None => return None,
        }
    }
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
    fn finds_catalog_in_ancestor() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(REPLIES_FILE), "{}").unwrap();
        let subdir = dir.path().join("logs/2024");
        std::fs::create_dir_all(&subdir).unwrap();

        assert_eq!(find_upward(&subdir), Some(dir.path().to_path_buf()));
    }
}
