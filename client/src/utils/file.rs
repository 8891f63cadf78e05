//! Path helpers for config and data locations

use std::path::PathBuf;

/// Expand a user-supplied path (`~`, `~/x`, relative) to an absolute path.
///
/// Absolute paths pass through unchanged. Relative paths are joined onto the
/// current working directory.
pub fn expand_path(path: &str) -> PathBuf {
    let path = path.trim();

    if path.is_empty() {
        return std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    }

    let expanded = match path.strip_prefix('~') {
        Some("") => dirs::home_dir().unwrap_or_else(|| PathBuf::from(path)),
        Some(rest) if rest.starts_with('/') || rest.starts_with('\\') => dirs::home_dir()
            .map(|home| home.join(&rest[1..]))
            .unwrap_or_else(|| PathBuf::from(path)),
        _ => PathBuf::from(path),
    };

    if expanded.is_relative() {
        std::env::current_dir()
            .map(|cwd| cwd.join(&expanded))
            .unwrap_or(expanded)
    } else {
        expanded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_path_unchanged() {
        assert_eq!(expand_path("/etc/billdesk"), PathBuf::from("/etc/billdesk"));
    }

    #[test]
    fn test_relative_path_becomes_absolute() {
        let result = expand_path("./billdesk.json");
        assert!(result.is_absolute());
        assert!(result.ends_with("billdesk.json"));
    }

    #[test]
    fn test_tilde_expands_to_home() {
        let result = expand_path("~/.billdesk");
        assert!(!result.to_string_lossy().contains('~'));
        assert!(result.ends_with(".billdesk"));

        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_path("~"), home);
        }
    }

    #[test]
    fn test_tilde_in_name_is_not_expanded() {
        let result = expand_path("~backup");
        assert!(result.ends_with("~backup"));
    }

    #[test]
    fn test_empty_is_cwd() {
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(expand_path("   "), cwd);
    }
}
