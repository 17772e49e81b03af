//! Search parameters handed over by the find dialog.
//!
//! The dialog owns the UI; this module only validates what it submits and
//! remembers the last accepted pattern and flags. No searching happens here.

use regex::RegexBuilder;
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use crate::error::{ProfileError, Result};

/// Bitmask of search options.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SearchFlags(u32);

impl SearchFlags {
    pub const NONE: SearchFlags = SearchFlags(0);
    pub const MATCH_CASE: SearchFlags = SearchFlags(1);
    pub const ENTIRE_WORD: SearchFlags = SearchFlags(1 << 1);
    pub const AS_REGEX: SearchFlags = SearchFlags(1 << 2);
    pub const BACKWARDS: SearchFlags = SearchFlags(1 << 3);
    pub const WRAP: SearchFlags = SearchFlags(1 << 4);

    const NAMED: [(SearchFlags, &'static str); 5] = [
        (SearchFlags::MATCH_CASE, "MATCH_CASE"),
        (SearchFlags::ENTIRE_WORD, "ENTIRE_WORD"),
        (SearchFlags::AS_REGEX, "AS_REGEX"),
        (SearchFlags::BACKWARDS, "BACKWARDS"),
        (SearchFlags::WRAP, "WRAP"),
    ];

    /// Every defined flag.
    pub const fn all() -> SearchFlags {
        SearchFlags(0b1_1111)
    }

    /// Flags the dialog starts with when nothing has been searched yet.
    pub const fn dialog_defaults() -> SearchFlags {
        SearchFlags(Self::BACKWARDS.0 | Self::WRAP.0)
    }

    /// Raw bit value.
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Build from raw bits, dropping undefined ones.
    pub const fn from_bits_truncate(bits: u32) -> SearchFlags {
        SearchFlags(bits & Self::all().0)
    }

    /// Whether every flag in `other` is set.
    pub const fn contains(self, other: SearchFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn insert(&mut self, other: SearchFlags) {
        self.0 |= other.0;
    }

    /// Set or clear `other` depending on `on`.
    pub fn set(&mut self, other: SearchFlags, on: bool) {
        if on {
            self.0 |= other.0;
        } else {
            self.0 &= !other.0;
        }
    }
}

impl BitOr for SearchFlags {
    type Output = SearchFlags;

    fn bitor(self, rhs: SearchFlags) -> SearchFlags {
        SearchFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for SearchFlags {
    fn bitor_assign(&mut self, rhs: SearchFlags) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for SearchFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("NONE");
        }
        let mut first = true;
        for (flag, name) in Self::NAMED {
            if self.contains(flag) {
                if !first {
                    f.write_str(" | ")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for SearchFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SearchFlags({self})")
    }
}

/// Check `pattern` against `flags` without storing anything.
///
/// Only regex patterns are compiled; literal text (including the empty
/// string) is always accepted.
pub fn validate_pattern(pattern: &str, flags: SearchFlags) -> Result<()> {
    if !flags.contains(SearchFlags::AS_REGEX) {
        return Ok(());
    }
    RegexBuilder::new(pattern)
        .case_insensitive(!flags.contains(SearchFlags::MATCH_CASE))
        .build()
        .map(|_| ())
        .map_err(|e| {
            log::debug!("Invalid regex pattern '{}': {}", pattern, e);
            ProfileError::InvalidPattern(e.to_string())
        })
}

/// Last search accepted from the dialog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchState {
    pattern: Option<String>,
    flags: SearchFlags,
}

impl SearchState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and, on success, remember `pattern` and `flags`.
    ///
    /// On failure the previous state is left as it was.
    pub fn apply(&mut self, pattern: &str, flags: SearchFlags) -> Result<()> {
        validate_pattern(pattern, flags)?;
        self.pattern = Some(pattern.to_string());
        self.flags = flags;
        Ok(())
    }

    /// The accepted pattern, or `None` before the first successful apply.
    pub fn pattern(&self) -> Option<&str> {
        self.pattern.as_deref()
    }

    /// The accepted flags, or [`SearchFlags::dialog_defaults`] before the
    /// first successful apply.
    pub fn flags(&self) -> SearchFlags {
        if self.pattern.is_some() {
            self.flags
        } else {
            SearchFlags::dialog_defaults()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_regex_rejected() {
        let err = validate_pattern("abc(", SearchFlags::AS_REGEX).unwrap_err();
        match err {
            ProfileError::InvalidPattern(msg) => assert!(!msg.is_empty()),
            other => panic!("expected InvalidPattern, got {other:?}"),
        }
    }

    #[test]
    fn test_literal_text_not_compiled() {
        assert!(validate_pattern("abc(", SearchFlags::NONE).is_ok());
        assert!(validate_pattern("", SearchFlags::WRAP | SearchFlags::BACKWARDS).is_ok());
        assert!(validate_pattern("[", SearchFlags::ENTIRE_WORD | SearchFlags::MATCH_CASE).is_ok());
    }

    #[test]
    fn test_valid_regex_accepted() {
        assert!(validate_pattern(r"^\$ \w+", SearchFlags::AS_REGEX).is_ok());
        assert!(validate_pattern("", SearchFlags::AS_REGEX).is_ok());
    }

    #[test]
    fn test_state_defaults_before_first_apply() {
        let state = SearchState::new();
        assert_eq!(state.pattern(), None);
        assert_eq!(
            state.flags(),
            SearchFlags::BACKWARDS | SearchFlags::WRAP
        );
    }

    #[test]
    fn test_failed_apply_keeps_previous_state() {
        let mut state = SearchState::new();
        state
            .apply("error", SearchFlags::MATCH_CASE)
            .expect("literal pattern accepted");

        assert!(state.apply("(", SearchFlags::AS_REGEX).is_err());
        assert_eq!(state.pattern(), Some("error"));
        assert_eq!(state.flags(), SearchFlags::MATCH_CASE);

        state.apply("", SearchFlags::NONE).expect("empty pattern accepted");
        assert_eq!(state.pattern(), Some(""));
        assert_eq!(state.flags(), SearchFlags::NONE);
    }

    #[test]
    fn test_flag_operations() {
        let mut flags = SearchFlags::AS_REGEX | SearchFlags::WRAP;
        assert!(flags.contains(SearchFlags::AS_REGEX));
        assert!(!flags.contains(SearchFlags::BACKWARDS));
        flags.set(SearchFlags::WRAP, false);
        flags |= SearchFlags::ENTIRE_WORD;
        assert_eq!(flags, SearchFlags::AS_REGEX | SearchFlags::ENTIRE_WORD);
        assert_eq!(SearchFlags::from_bits_truncate(0xFF), SearchFlags::all());
        assert_eq!(flags.to_string(), "ENTIRE_WORD | AS_REGEX");
        assert_eq!(SearchFlags::NONE.to_string(), "NONE");
    }
}
