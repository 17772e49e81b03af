//! Process-wide registry of live profiles.
//!
//! Profiles are identified by name alone, so two independent instances for
//! the same name would each hold a private copy of the file and overwrite
//! each other's changes. The registry hands out one shared handle per name
//! for as long as any caller holds it.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, Weak};

use crate::error::Result;
use crate::paths::{ConfigDirs, validate_profile_name};
use crate::profile::Profile;

/// Shared, reference-counted profile handle.
pub type SharedProfile = Arc<Mutex<Profile>>;

/// Maps profile names to live shared handles.
#[derive(Debug)]
pub struct ProfileRegistry {
    dirs: ConfigDirs,
    entries: Mutex<HashMap<String, Weak<Mutex<Profile>>>>,
}

static GLOBAL: OnceLock<ProfileRegistry> = OnceLock::new();

impl ProfileRegistry {
    /// A registry whose profiles resolve against `dirs`.
    pub fn new(dirs: ConfigDirs) -> Self {
        Self {
            dirs,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// The process-wide registry, using the platform's directories.
    pub fn global() -> &'static ProfileRegistry {
        GLOBAL.get_or_init(|| ProfileRegistry::new(ConfigDirs::from_env()))
    }

    /// Directories handed to newly constructed profiles.
    pub fn dirs(&self) -> &ConfigDirs {
        &self.dirs
    }

    /// The live profile named `name`, constructing it if no caller holds one.
    ///
    /// Construction does not load the file; that still happens on first
    /// access.
    pub fn get(&self, name: &str) -> Result<SharedProfile> {
        validate_profile_name(name)?;
        let mut entries = self.entries.lock();
        if let Some(existing) = entries.get(name).and_then(Weak::upgrade) {
            return Ok(existing);
        }

        let profile = Arc::new(Mutex::new(Profile::with_dirs(name, self.dirs.clone())?));
        log::debug!("Registered profile '{}'", name);
        entries.insert(name.to_string(), Arc::downgrade(&profile));
        entries.retain(|_, weak| weak.strong_count() > 0);
        Ok(profile)
    }

    /// Names with at least one live handle, sorted.
    pub fn live_names(&self) -> Vec<String> {
        let entries = self.entries.lock();
        let mut names: Vec<String> = entries
            .iter()
            .filter(|(_, weak)| weak.strong_count() > 0)
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names
    }
}
