//! Profile store for the termprofile terminal settings system.
//!
//! A profile is a named, persistent, typed settings store. This crate
//! provides:
//!
//! - Profile file resolution across user and system config directories
//! - A comment-preserving key file codec
//! - Typed get/set over four value domains with write-through persistence
//! - Per-domain change notification
//! - A process-wide registry of shared profile handles
//! - Validation of search parameters submitted by the find dialog

pub mod domain;
pub mod error;
pub mod keyfile;
pub mod notifier;
pub mod paths;
pub mod profile;
pub mod registry;
pub mod search;
pub mod store;

pub use domain::{Domain, DomainValue, Value};
pub use error::{ProfileError, Result};
pub use keyfile::{KeyFile, KeyFileError};
pub use notifier::{ChangeEvent, ChangeHandler, ChangeNotifier, SubscriptionId};
pub use paths::{APP_NAMESPACE, ConfigDirs, PROFILE_EXTENSION, validate_profile_name};
pub use profile::Profile;
pub use registry::{ProfileRegistry, SharedProfile};
pub use search::{SearchFlags, SearchState, validate_pattern};
pub use store::{BackingStore, ProfileSnapshot};
