//! Reversible directory stages
//!
//! A `StagedDir` guards one directory slot through a risky operation: any
//! existing content is renamed aside (never copied, so the data has exactly
//! one owner at all times), the operation rebuilds the slot, and the guard
//! either commits (dropping the saved copy) or rolls back (deleting the
//! partial result and renaming the saved copy back). Rollback runs from
//! `Drop`, so early returns and panics restore the previous on-disk state
//! too.
//!
//! The environment slot uses the `save` suffix, the node build slot uses
//! `backup`.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Guard over one directory slot with save/restore semantics
#[derive(Debug)]
pub struct StagedDir {
    active: PathBuf,
    saved: PathBuf,
    committed: bool,
}

impl StagedDir {
    /// Open the stage: move existing active content to the `.{suffix}`
    /// sibling, replacing any stale sibling from an earlier run.
    pub fn begin(active: &Path, suffix: &str) -> Result<Self> {
        let saved = sibling(active, suffix);

        if active.exists() {
            if saved.exists() {
                fs::remove_dir_all(&saved)?;
            }
            fs::rename(active, &saved)?;
        }

        Ok(Self {
            active: active.to_path_buf(),
            saved,
            committed: false,
        })
    }

    /// The directory this stage owns.
    pub fn path(&self) -> &Path {
        &self.active
    }

    /// Whether a previous version of the slot was saved aside.
    pub fn has_saved(&self) -> bool {
        self.saved.exists()
    }

    /// Keep the rebuilt slot and discard the saved previous content.
    pub fn commit(mut self) {
        self.committed = true;
        if self.saved.exists() {
            // Best effort: a leftover saved sibling is replaced on the
            // next run anyway.
            let _ = fs::remove_dir_all(&self.saved);
        }
    }
}

impl Drop for StagedDir {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        if self.active.exists() {
            let _ = fs::remove_dir_all(&self.active);
        }
        if self.saved.exists() {
            let _ = fs::rename(&self.saved, &self.active);
        }
    }
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!("{name}.{suffix}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_slot(path: &Path, content: &str) {
        fs::create_dir_all(path).unwrap();
        fs::write(path.join("data.txt"), content).unwrap();
    }

    fn read_slot(path: &Path) -> String {
        fs::read_to_string(path.join("data.txt")).unwrap()
    }

    #[test]
    fn test_rollback_restores_previous_content() {
        let temp = TempDir::new().unwrap();
        let slot = temp.path().join("venv");
        write_slot(&slot, "original");

        {
            let stage = StagedDir::begin(&slot, "save").unwrap();
            assert!(stage.has_saved());
            assert!(!slot.exists());
            write_slot(&slot, "partial");
            // Dropped uncommitted: the error path.
        }

        assert_eq!(read_slot(&slot), "original");
        assert!(!temp.path().join("venv.save").exists());
    }

    #[test]
    fn test_rollback_without_previous_leaves_nothing() {
        let temp = TempDir::new().unwrap();
        let slot = temp.path().join("venv");

        {
            let stage = StagedDir::begin(&slot, "save").unwrap();
            assert!(!stage.has_saved());
            write_slot(&slot, "partial");
        }

        assert!(!slot.exists());
        assert!(!temp.path().join("venv.save").exists());
    }

    #[test]
    fn test_commit_keeps_fresh_and_drops_saved() {
        let temp = TempDir::new().unwrap();
        let slot = temp.path().join("venv");
        write_slot(&slot, "original");

        let stage = StagedDir::begin(&slot, "save").unwrap();
        write_slot(&slot, "fresh");
        stage.commit();

        assert_eq!(read_slot(&slot), "fresh");
        assert!(!temp.path().join("venv.save").exists());
    }

    #[test]
    fn test_begin_is_a_rename_not_a_copy() {
        let temp = TempDir::new().unwrap();
        let slot = temp.path().join("node");
        write_slot(&slot, "built");

        let stage = StagedDir::begin(&slot, "backup").unwrap();
        // Exactly one of {active, saved} holds the data.
        assert!(!slot.exists());
        assert_eq!(read_slot(&temp.path().join("node.backup")), "built");
        drop(stage);
        assert_eq!(read_slot(&slot), "built");
    }

    #[test]
    fn test_stale_saved_sibling_is_replaced() {
        let temp = TempDir::new().unwrap();
        let slot = temp.path().join("venv");
        write_slot(&slot, "current");
        write_slot(&temp.path().join("venv.save"), "stale");

        let stage = StagedDir::begin(&slot, "save").unwrap();
        assert_eq!(read_slot(&temp.path().join("venv.save")), "current");
        drop(stage);
        assert_eq!(read_slot(&slot), "current");
    }

    #[test]
    fn test_rollback_on_panic() {
        let temp = TempDir::new().unwrap();
        let slot = temp.path().join("venv");
        write_slot(&slot, "original");

        let slot_clone = slot.clone();
        let result = std::panic::catch_unwind(move || {
            let _stage = StagedDir::begin(&slot_clone, "save").unwrap();
            write_slot(&slot_clone, "partial");
            panic!("stage blew up");
        });
        assert!(result.is_err());

        assert_eq!(read_slot(&slot), "original");
        assert!(!temp.path().join("venv.save").exists());
    }
}
