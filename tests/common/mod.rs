//! Shared integration test helpers for termprofile.
//!
//! Include this module at the top of each test file that needs it:
//!
//! ```ignore
//! mod common;
//! use common::TestDirs;
//! ```

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use termprofile::config::{ConfigDirs, Profile};

/// A throwaway user config base plus two system config bases.
///
/// Keep the value alive until all profile I/O in the test has finished.
pub struct TestDirs {
    _root: TempDir,
    pub user: PathBuf,
    pub system: Vec<PathBuf>,
}

impl TestDirs {
    pub fn new() -> Self {
        let root = TempDir::new().expect("Failed to create temp dir");
        let user = root.path().join("home").join(".config");
        let system = vec![
            root.path().join("etc").join("xdg"),
            root.path().join("usr").join("share").join("xdg"),
        ];
        Self {
            _root: root,
            user,
            system,
        }
    }

    pub fn config_dirs(&self) -> ConfigDirs {
        ConfigDirs::new(&self.user, self.system.clone())
    }

    pub fn profile(&self, name: &str) -> Profile {
        Profile::with_dirs(name, self.config_dirs()).expect("valid profile name")
    }

    /// Path of `name`'s file under `base`.
    pub fn profile_file(&self, base: &Path, name: &str) -> PathBuf {
        self.config_dirs().profile_path(base, name)
    }

    /// Write a profile file under `base`, creating directories.
    pub fn write_profile(&self, base: &Path, name: &str, contents: &str) -> PathBuf {
        let path = self.profile_file(base, name);
        fs::create_dir_all(path.parent().expect("profile file has a parent"))
            .expect("Failed to create profile dir");
        fs::write(&path, contents).expect("Failed to write profile");
        path
    }
}
