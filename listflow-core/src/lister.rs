//! The seam to the remote transfer protocol.
//!
//! A lister produces a best-effort snapshot of what is visible on the
//! endpoint right now. It has no memory of past calls; everything
//! incremental lives in the tracker. Ordering of the returned entities is
//! not guaranteed and callers must not rely on it.

use async_trait::async_trait;
use regex::Regex;

use crate::config::{ListerConfig, compile_pattern};
use crate::entity::ListableEntity;
use crate::Result;

/// Lists a remote path. Implementations wrap a concrete protocol (FTP,
/// SFTP, ...) and apply [`ListFilter`] plus their scope options
/// (recursion, symlinks, batch size) before returning, so the tracker only
/// ever sees in-scope entities.
///
/// A failed call must leave no trace: no state mutation anywhere, the
/// coordinator aborts the cycle and retries on the next trigger. Timeouts
/// are the caller's concern and count as listing failures.
#[async_trait]
pub trait RemoteLister: Send + Sync {
    async fn list(&self, path: &str) -> Result<Vec<ListableEntity>>;
}

/// Name/path scoping compiled once from [`ListerConfig`].
///
/// Applied by lister implementations before entities reach the tracker;
/// filtering here never changes tracker semantics, it only narrows what the
/// tracker considers the universe.
#[derive(Debug)]
pub struct ListFilter {
    file_name_pattern: Option<Regex>,
    path_pattern: Option<Regex>,
    ignore_dot_files: bool,
}

impl ListFilter {
    pub fn from_config(config: &ListerConfig) -> Result<Self> {
        Ok(Self {
            file_name_pattern: compile_pattern(
                config.file_name_filter_pattern.as_deref(),
                "file name filter",
            )?,
            path_pattern: compile_pattern(config.path_filter_pattern.as_deref(), "path filter")?,
            ignore_dot_files: config.ignore_dot_files,
        })
    }

    /// Whether an entity with the given directory path and display name is
    /// in scope.
    pub fn accepts(&self, path: &str, name: &str) -> bool {
        if self.ignore_dot_files && name.starts_with('.') {
            return false;
        }
        if let Some(pattern) = &self.file_name_pattern
            && !pattern.is_match(name)
        {
            return false;
        }
        if let Some(pattern) = &self.path_pattern
            && !pattern.is_match(path)
        {
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(config: ListerConfig) -> ListFilter {
        ListFilter::from_config(&config).unwrap()
    }

    #[test]
    fn test_dot_files_ignored_by_default() {
        let f = filter(ListerConfig::default());
        assert!(!f.accepts("in", ".hidden"));
        assert!(f.accepts("in", "visible.csv"));

        let f = filter(ListerConfig {
            ignore_dot_files: false,
            ..Default::default()
        });
        assert!(f.accepts("in", ".hidden"));
    }

    #[test]
    fn test_file_name_pattern_matches_name_only() {
        let f = filter(ListerConfig {
            file_name_filter_pattern: Some(r"\.csv$".to_string()),
            ..Default::default()
        });
        assert!(f.accepts("in/csv", "data.csv"));
        assert!(!f.accepts("in/csv", "data.json"));
    }

    #[test]
    fn test_path_pattern_matches_directory() {
        let f = filter(ListerConfig {
            path_filter_pattern: Some(r"^incoming(/|$)".to_string()),
            ..Default::default()
        });
        assert!(f.accepts("incoming/2024", "a.bin"));
        assert!(!f.accepts("archive/2024", "a.bin"));
    }
}
