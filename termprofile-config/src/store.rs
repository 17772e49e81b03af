//! Typed view over a key file with one section per value domain.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::domain::{Domain, DomainValue, Value};
use crate::keyfile::{KeyFile, KeyFileError};

/// In-memory sectioned key/value table mirrored to a profile file.
///
/// Sections other than the four domain sections are kept untouched so they
/// survive a save.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BackingStore {
    doc: KeyFile,
}

impl BackingStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse profile file text.
    pub fn parse(text: &str) -> Result<Self, KeyFileError> {
        Ok(Self {
            doc: KeyFile::parse(text)?,
        })
    }

    /// Serialize to profile file text.
    pub fn to_text(&self) -> String {
        self.doc.to_text()
    }

    /// Typed lookup. `None` if the key is absent or unreadable as `T`.
    pub fn get<T: DomainValue>(&self, key: &str) -> Option<T> {
        self.doc
            .get(T::DOMAIN.section(), key)
            .and_then(T::decode)
    }

    /// Store `value` under `key` in `T`'s section.
    pub fn set<T: DomainValue>(&mut self, key: &str, value: &T) {
        self.doc.set(T::DOMAIN.section(), key, &value.encode());
    }

    /// Untyped lookup in `domain`'s section.
    pub fn value(&self, domain: Domain, key: &str) -> Option<Value> {
        self.doc
            .get(domain.section(), key)
            .and_then(|raw| domain.parse_value(raw))
    }

    /// Whether `key` has an entry in `domain`'s section, readable or not.
    pub fn contains(&self, domain: Domain, key: &str) -> bool {
        self.doc.has_key(domain.section(), key)
    }

    /// Keys of `domain`'s section in file order.
    pub fn keys(&self, domain: Domain) -> Vec<String> {
        self.doc
            .keys(domain.section())
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Copy every readable value into a serializable snapshot.
    pub fn snapshot(&self) -> ProfileSnapshot {
        let mut snapshot = ProfileSnapshot::default();
        for domain in Domain::ALL {
            let section = snapshot.section_mut(domain);
            for key in self.doc.keys(domain.section()) {
                match self.value(domain, key) {
                    Some(value) => {
                        section.insert(key.to_string(), value);
                    }
                    None => log::debug!(
                        "Skipping unreadable {} entry '{}' in snapshot",
                        domain,
                        key
                    ),
                }
            }
        }
        snapshot
    }
}

/// Owned copy of a profile's four sections.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProfileSnapshot {
    pub strings: BTreeMap<String, Value>,
    pub ints: BTreeMap<String, Value>,
    pub booleans: BTreeMap<String, Value>,
    pub floats: BTreeMap<String, Value>,
}

impl ProfileSnapshot {
    /// Entries of one domain.
    pub fn section(&self, domain: Domain) -> &BTreeMap<String, Value> {
        match domain {
            Domain::Text => &self.strings,
            Domain::Integer => &self.ints,
            Domain::Boolean => &self.booleans,
            Domain::Float => &self.floats,
        }
    }

    fn section_mut(&mut self, domain: Domain) -> &mut BTreeMap<String, Value> {
        match domain {
            Domain::Text => &mut self.strings,
            Domain::Integer => &mut self.ints,
            Domain::Boolean => &mut self.booleans,
            Domain::Float => &mut self.floats,
        }
    }

    /// Total number of entries.
    pub fn len(&self) -> usize {
        Domain::ALL.iter().map(|d| self.section(*d).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
