//! Named, persistent, typed settings profile.
//!
//! A [`Profile`] is cheap to construct: nothing touches the filesystem until
//! the first getter or setter. That first call resolves the backing file
//! (user directory, then system directories) and loads it exactly once for
//! the lifetime of the instance. Every setter rewrites the whole file and
//! then notifies subscribers of the matching domain.

use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::{Domain, DomainValue, Value};
use crate::error::{ProfileError, Result};
use crate::keyfile::is_valid_key;
use crate::notifier::{ChangeEvent, ChangeNotifier, SubscriptionId};
use crate::paths::{ConfigDirs, validate_profile_name};
use crate::search::{SearchFlags, SearchState};
use crate::store::{BackingStore, ProfileSnapshot};

/// A named settings store backed by `<config>/<namespace>/<name>.ini`.
///
/// Profiles are not synchronized. Share one across threads through
/// [`crate::ProfileRegistry`], which hands out `Arc<Mutex<Profile>>`.
#[derive(Debug)]
pub struct Profile {
    name: String,
    dirs: ConfigDirs,
    file_path: Option<PathBuf>,
    source_path: Option<PathBuf>,
    store: Option<BackingStore>,
    load_error: Option<ProfileError>,
    notifier: ChangeNotifier,
    search: SearchState,
}

impl Profile {
    /// Create a profile using the platform's configuration directories.
    ///
    /// # Errors
    /// `EmptyName` or `InvalidName` if `name` cannot be used as a file stem.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        Self::with_dirs(name, ConfigDirs::from_env())
    }

    /// Create a profile that resolves and saves within `dirs`.
    pub fn with_dirs(name: impl Into<String>, dirs: ConfigDirs) -> Result<Self> {
        let name = name.into();
        validate_profile_name(&name)?;
        Ok(Self {
            name,
            dirs,
            file_path: None,
            source_path: None,
            store: None,
            load_error: None,
            notifier: ChangeNotifier::new(),
            search: SearchState::new(),
        })
    }

    /// The profile's name. Fixed at construction.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Directories this profile resolves against.
    pub fn dirs(&self) -> &ConfigDirs {
        &self.dirs
    }

    /// The file saves go to: the user profile file, once a load found it or
    /// a save created it. Always under the user configuration directory.
    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    /// The file the store was read from, which may be a system profile.
    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    /// Whether the backing store has been initialized.
    pub fn is_loaded(&self) -> bool {
        self.store.is_some()
    }

    /// The failure recorded when the backing file could not be read or
    /// parsed. The profile carries on with an empty store in that case.
    pub fn load_error(&self) -> Option<&ProfileError> {
        self.load_error.as_ref()
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Load the backing store if this has not happened yet.
    ///
    /// The store is read-only from outside; changes go through the setters
    /// so they are saved and announced.
    ///
    /// ```compile_fail
    /// # use termprofile_config::{ConfigDirs, Profile};
    /// let mut profile = Profile::with_dirs("Default", ConfigDirs::new("/tmp", vec![]))?;
    /// profile.ensure_loaded().set("columns", &99_i64);
    /// # Ok::<(), termprofile_config::ProfileError>(())
    /// ```
    pub fn ensure_loaded(&mut self) -> &BackingStore {
        self.store_mut()
    }

    fn store_mut(&mut self) -> &mut BackingStore {
        if self.store.is_none() {
            let store = self.load();
            self.store = Some(store);
        }
        self.store.get_or_insert_with(BackingStore::new)
    }

    fn load(&mut self) -> BackingStore {
        let Some(path) = self.dirs.resolve(&self.name) else {
            log::info!(
                "No file for profile '{}', starting with an empty store",
                self.name
            );
            return BackingStore::new();
        };

        log::info!("Loading profile '{}' from {:?}", self.name, path);
        let result = match fs::read_to_string(&path) {
            Ok(text) => BackingStore::parse(&text).map_err(|e| ProfileError::LoadParse {
                path: path.clone(),
                line: e.line,
                message: e.message,
            }),
            Err(source) => Err(ProfileError::LoadIo {
                path: path.clone(),
                source,
            }),
        };
        if path == self.dirs.user_profile_path(&self.name) {
            self.file_path = Some(path.clone());
        }
        self.source_path = Some(path);

        match result {
            Ok(store) => store,
            Err(e) => {
                log::error!("{e}");
                self.load_error = Some(e);
                BackingStore::new()
            }
        }
    }

    /// Write the whole store to the backing file.
    ///
    /// The first save of a profile that had no file creates the user
    /// configuration directory and targets `<user_base>/<namespace>/<name>.ini`.
    ///
    /// # Errors
    /// `SaveIo` if the directory or file cannot be written. The in-memory
    /// store is unaffected.
    pub fn ensure_saved(&mut self) -> Result<()> {
        let text = self.ensure_loaded().to_text();
        let path = match self.file_path.clone() {
            Some(path) => path,
            None => {
                let dir = self.dirs.user_directory();
                if !dir.is_dir() {
                    fs::create_dir_all(&dir).map_err(|source| {
                        let e = ProfileError::SaveIo {
                            path: dir.clone(),
                            source,
                        };
                        log::error!("{e}");
                        e
                    })?;
                }
                let path = self.dirs.user_profile_path(&self.name);
                self.file_path = Some(path.clone());
                path
            }
        };

        write_atomically(&path, &text).map_err(|source| {
            let e = ProfileError::SaveIo {
                path: path.clone(),
                source,
            };
            log::error!("{e}");
            e
        })?;
        log::debug!("Saved profile '{}' to {:?}", self.name, path);
        Ok(())
    }

    // ========================================================================
    // Typed accessors
    // ========================================================================

    /// Read `key` from `T`'s section, or `T::default()` if it is missing or
    /// unreadable.
    pub fn get<T: DomainValue>(&mut self, key: &str) -> T {
        self.ensure_loaded().get(key).unwrap_or_default()
    }

    /// Store `value`, persist the profile and notify `T`'s subscribers.
    ///
    /// The value stays in memory and subscribers are notified even when the
    /// save fails; the save failure is then returned.
    ///
    /// # Errors
    /// `InvalidKey` (nothing changes) or `SaveIo`.
    pub fn set<T: DomainValue>(&mut self, key: &str, value: T) -> Result<()> {
        if !is_valid_key(key) {
            return Err(ProfileError::InvalidKey(key.to_string()));
        }
        self.store_mut().set(key, &value);
        let saved = self.ensure_saved();
        self.notifier.publish(&T::changed(key.to_string(), value));
        saved
    }

    pub fn get_string(&mut self, key: &str) -> String {
        self.get(key)
    }

    pub fn set_string(&mut self, key: &str, value: impl Into<String>) -> Result<()> {
        self.set(key, value.into())
    }

    pub fn get_int(&mut self, key: &str) -> i64 {
        self.get(key)
    }

    pub fn set_int(&mut self, key: &str, value: i64) -> Result<()> {
        self.set(key, value)
    }

    pub fn get_boolean(&mut self, key: &str) -> bool {
        self.get(key)
    }

    pub fn set_boolean(&mut self, key: &str, value: bool) -> Result<()> {
        self.set(key, value)
    }

    pub fn get_float(&mut self, key: &str) -> f64 {
        self.get(key)
    }

    pub fn set_float(&mut self, key: &str, value: f64) -> Result<()> {
        self.set(key, value)
    }

    /// Untyped read; the domain's zero value if missing or unreadable.
    pub fn get_value(&mut self, domain: Domain, key: &str) -> Value {
        self.ensure_loaded()
            .value(domain, key)
            .unwrap_or_else(|| domain.zero())
    }

    /// Untyped write, dispatched to the typed setter for the value's domain.
    pub fn set_value(&mut self, key: &str, value: Value) -> Result<()> {
        match value {
            Value::Text(v) => self.set(key, v),
            Value::Integer(v) => self.set(key, v),
            Value::Boolean(v) => self.set(key, v),
            Value::Float(v) => self.set(key, v),
        }
    }

    /// Whether `domain`'s section has an entry for `key`.
    pub fn contains(&mut self, domain: Domain, key: &str) -> bool {
        self.ensure_loaded().contains(domain, key)
    }

    /// Keys of `domain`'s section in file order.
    pub fn keys(&mut self, domain: Domain) -> Vec<String> {
        self.ensure_loaded().keys(domain)
    }

    /// Copy of every readable entry.
    pub fn snapshot(&mut self) -> ProfileSnapshot {
        self.ensure_loaded().snapshot()
    }

    // ========================================================================
    // Change notification
    // ========================================================================

    /// Register a handler for every change in `domain`.
    ///
    /// Handlers run on the setter's thread before it returns. A handler must
    /// not try to lock a shared handle to the profile it observes.
    pub fn subscribe<F>(&mut self, domain: Domain, handler: F) -> SubscriptionId
    where
        F: Fn(&ChangeEvent) + Send + 'static,
    {
        self.notifier.subscribe(domain, handler)
    }

    /// Remove a handler. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.notifier.unsubscribe(id)
    }

    pub fn on_string_changed<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: Fn(&str, &String) + Send + 'static,
    {
        self.notifier.subscribe_typed(handler)
    }

    pub fn on_int_changed<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: Fn(&str, &i64) + Send + 'static,
    {
        self.notifier.subscribe_typed(handler)
    }

    pub fn on_boolean_changed<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: Fn(&str, &bool) + Send + 'static,
    {
        self.notifier.subscribe_typed(handler)
    }

    pub fn on_float_changed<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: Fn(&str, &f64) + Send + 'static,
    {
        self.notifier.subscribe_typed(handler)
    }

    // ========================================================================
    // Search parameters
    // ========================================================================

    /// Validate and remember the find dialog's pattern and flags.
    ///
    /// # Errors
    /// `InvalidPattern` if `flags` has `AS_REGEX` and `pattern` does not
    /// compile. The previous search state is kept.
    pub fn apply_search(&mut self, pattern: &str, flags: SearchFlags) -> Result<()> {
        self.search.apply(pattern, flags)
    }

    /// Last accepted search pattern.
    pub fn search_pattern(&self) -> Option<&str> {
        self.search.pattern()
    }

    /// Last accepted search flags, or the dialog defaults.
    pub fn search_flags(&self) -> SearchFlags {
        self.search.flags()
    }
}

/// Replace `path` with `contents` via a temporary sibling and a rename.
fn write_atomically(path: &Path, contents: &str) -> std::io::Result<()> {
    let temp_path = path.with_extension(format!("{}.tmp", crate::paths::PROFILE_EXTENSION));
    let result = fs::write(&temp_path, contents).and_then(|()| fs::rename(&temp_path, path));
    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}
