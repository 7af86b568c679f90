//! Configuration for opening file-backed vectors

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Options controlling growth and close behaviour of a [`FileVec`](crate::FileVec)
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FileVecConfig {
    /// Capacity, in slots, to grow to from an empty mapping
    pub min_capacity: usize,
    /// Flush the mapping to the file before releasing it on close
    pub sync_on_close: bool,
    /// Create missing parent directories of the backing file on open
    pub create_parent_dirs: bool,
}

impl FileVecConfig {
    /// Config with a minimum growth capacity
    pub fn with_min_capacity(mut self, min_capacity: usize) -> Self {
        self.min_capacity = min_capacity.max(1);
        self
    }

    /// Set whether close flushes the mapping first
    pub fn with_sync_on_close(mut self, sync_on_close: bool) -> Self {
        self.sync_on_close = sync_on_close;
        self
    }

    /// Set whether open creates missing parent directories
    pub fn with_create_parent_dirs(mut self, create_parent_dirs: bool) -> Self {
        self.create_parent_dirs = create_parent_dirs;
        self
    }

    /// Get the minimum growth capacity in slots
    pub fn min_capacity(&self) -> usize {
        self.min_capacity
    }
}

impl Default for FileVecConfig {
    fn default() -> Self {
        Self {
            min_capacity: 1,
            sync_on_close: false,
            create_parent_dirs: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = FileVecConfig::default()
            .with_min_capacity(64)
            .with_sync_on_close(true)
            .with_create_parent_dirs(true);

        assert_eq!(config.min_capacity(), 64);
        assert!(config.sync_on_close);
        assert!(config.create_parent_dirs);
    }

    #[test]
    fn test_min_capacity_never_zero() {
        let config = FileVecConfig::default().with_min_capacity(0);
        assert_eq!(config.min_capacity(), 1);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_round_trip() {
        let config = FileVecConfig::default()
            .with_min_capacity(32)
            .with_sync_on_close(true);

        let json = serde_json::to_string(&config).unwrap();
        let decoded: FileVecConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, config);

        // Missing fields fall back to the defaults
        let partial: FileVecConfig = serde_json::from_str(r#"{"sync_on_close":true}"#).unwrap();
        assert_eq!(partial.min_capacity(), 1);
        assert!(partial.sync_on_close);
        assert!(!partial.create_parent_dirs);
    }
}
