//! Configuration directory layout and profile file resolution.
//!
//! A profile named `name` lives at `<base>/<namespace>/<name>.ini`. Loading
//! probes the user's config base first and then each system config base in
//! order; saving always targets the user's config base.

use std::path::{Component, Path, PathBuf};

use crate::error::{ProfileError, Result};

/// Subdirectory created under each configuration base directory.
pub const APP_NAMESPACE: &str = "termprofile";

/// File extension of profile files.
pub const PROFILE_EXTENSION: &str = "ini";

/// The set of directories profiles are loaded from and saved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigDirs {
    user_base: PathBuf,
    system_bases: Vec<PathBuf>,
    namespace: String,
}

impl ConfigDirs {
    /// Use explicit base directories with the default namespace.
    pub fn new(user_base: impl Into<PathBuf>, system_bases: Vec<PathBuf>) -> Self {
        Self {
            user_base: user_base.into(),
            system_bases,
            namespace: APP_NAMESPACE.to_string(),
        }
    }

    /// Directories supplied by the platform.
    ///
    /// The user base comes from `dirs::config_dir()` (`$XDG_CONFIG_HOME` or
    /// `~/.config` on Linux). System bases come from `$XDG_CONFIG_DIRS`,
    /// defaulting to `/etc/xdg` on Unix.
    pub fn from_env() -> Self {
        let user_base = dirs::config_dir().unwrap_or_else(|| {
            log::warn!("No user config directory available, using the current directory");
            PathBuf::from(".")
        });
        Self::new(user_base, system_config_dirs())
    }

    /// Replace the namespace subdirectory.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// The user's configuration base directory.
    pub fn user_base(&self) -> &Path {
        &self.user_base
    }

    /// System configuration base directories, most specific first.
    pub fn system_bases(&self) -> &[PathBuf] {
        &self.system_bases
    }

    /// Namespace subdirectory name.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// `<user_base>/<namespace>`, the directory saves are written to.
    pub fn user_directory(&self) -> PathBuf {
        self.user_base.join(&self.namespace)
    }

    /// `<base>/<namespace>/<name>.ini`
    pub fn profile_path(&self, base: &Path, name: &str) -> PathBuf {
        base.join(&self.namespace)
            .join(format!("{name}.{PROFILE_EXTENSION}"))
    }

    /// Where a profile with no existing file is saved.
    pub fn user_profile_path(&self, name: &str) -> PathBuf {
        self.profile_path(&self.user_base, name)
    }

    /// Every path probed for `name`, in probe order.
    pub fn candidates(&self, name: &str) -> Vec<PathBuf> {
        std::iter::once(self.user_base.as_path())
            .chain(self.system_bases.iter().map(PathBuf::as_path))
            .map(|base| self.profile_path(base, name))
            .collect()
    }

    /// First existing profile file for `name`, or `None`.
    ///
    /// A file in the user directory wins outright; files in system
    /// directories are never merged with it.
    pub fn resolve(&self, name: &str) -> Option<PathBuf> {
        let found = self.candidates(name).into_iter().find(|p| p.exists());
        match &found {
            Some(path) => log::debug!("Profile '{}' resolved to {:?}", name, path),
            None => log::debug!("No file found for profile '{}'", name),
        }
        found
    }
}

impl Default for ConfigDirs {
    fn default() -> Self {
        Self::from_env()
    }
}

fn system_config_dirs() -> Vec<PathBuf> {
    if let Some(value) = std::env::var_os("XDG_CONFIG_DIRS") {
        let dirs: Vec<PathBuf> = std::env::split_paths(&value)
            .filter(|p| !p.as_os_str().is_empty())
            .collect();
        if !dirs.is_empty() {
            return dirs;
        }
    }
    if cfg!(unix) {
        vec![PathBuf::from("/etc/xdg")]
    } else {
        Vec::new()
    }
}

/// Check that `name` is usable as a profile file stem.
///
/// Rejects empty names and anything that would place the file outside the
/// namespace directory.
pub fn validate_profile_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(ProfileError::EmptyName);
    }
    let mut components = Path::new(name).components();
    let single_normal = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );
    if !single_normal || name.contains(['/', '\\', '\0']) {
        return Err(ProfileError::InvalidName(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().expect("profile path has a parent"))
            .expect("Failed to create dir");
        fs::write(path, "[strings]\n").expect("Failed to write profile");
    }

    #[test]
    fn test_profile_path_layout() {
        let dirs = ConfigDirs::new("/home/u/.config", vec![]);
        assert_eq!(
            dirs.user_profile_path("Default"),
            PathBuf::from("/home/u/.config/termprofile/Default.ini")
        );
        assert_eq!(dirs.user_directory(), PathBuf::from("/home/u/.config/termprofile"));
    }

    #[test]
    fn test_candidates_are_user_first() {
        let dirs = ConfigDirs::new("/u", vec![PathBuf::from("/s1"), PathBuf::from("/s2")])
            .with_namespace("ns");
        assert_eq!(
            dirs.candidates("p"),
            vec![
                PathBuf::from("/u/ns/p.ini"),
                PathBuf::from("/s1/ns/p.ini"),
                PathBuf::from("/s2/ns/p.ini"),
            ]
        );
    }

    #[test]
    fn test_resolve_prefers_user_directory() {
        let user = TempDir::new().expect("Failed to create temp dir");
        let system = TempDir::new().expect("Failed to create temp dir");
        let dirs = ConfigDirs::new(user.path(), vec![system.path().to_path_buf()]);

        let system_file = dirs.profile_path(system.path(), "Default");
        touch(&system_file);
        assert_eq!(dirs.resolve("Default"), Some(system_file));

        let user_file = dirs.user_profile_path("Default");
        touch(&user_file);
        assert_eq!(dirs.resolve("Default"), Some(user_file));
    }

    #[test]
    fn test_resolve_walks_system_dirs_in_order() {
        let user = TempDir::new().expect("Failed to create temp dir");
        let first = TempDir::new().expect("Failed to create temp dir");
        let second = TempDir::new().expect("Failed to create temp dir");
        let dirs = ConfigDirs::new(
            user.path(),
            vec![first.path().to_path_buf(), second.path().to_path_buf()],
        );

        let later = dirs.profile_path(second.path(), "Work");
        touch(&later);
        assert_eq!(dirs.resolve("Work"), Some(later));

        let earlier = dirs.profile_path(first.path(), "Work");
        touch(&earlier);
        assert_eq!(dirs.resolve("Work"), Some(earlier));
    }

    #[test]
    fn test_resolve_missing_does_not_create_anything() {
        let user = TempDir::new().expect("Failed to create temp dir");
        let dirs = ConfigDirs::new(user.path(), vec![]);
        assert_eq!(dirs.resolve("Nothing"), None);
        assert!(!dirs.user_directory().exists());
    }

    #[test]
    fn test_validate_profile_name() {
        assert!(validate_profile_name("Default").is_ok());
        assert!(validate_profile_name("my profile").is_ok());
        assert!(matches!(
            validate_profile_name(""),
            Err(ProfileError::EmptyName)
        ));
        assert!(matches!(
            validate_profile_name("   "),
            Err(ProfileError::EmptyName)
        ));
        for bad in ["..", ".", "a/b", "../escape", "/abs", "back\\slash"] {
            assert!(
                matches!(validate_profile_name(bad), Err(ProfileError::InvalidName(_))),
                "{bad:?} should be rejected"
            );
        }
    }
}
