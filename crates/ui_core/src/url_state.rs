//! Bookmarkable search state: widgets contribute key/value pairs to a shared
//! [`UrlObject`], which is encoded into the address bar query string.

use std::collections::BTreeMap;

use parking_lot::Mutex;
use search_model::QueryValue;
use thiserror::Error;
use url::form_urlencoded;

pub use crate::config::HistoryMode;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UrlStateError {
    #[error("url key '{key}' is owned by '{owner}' and cannot be written by '{contender}'")]
    KeyConflict {
        key: String,
        owner: String,
        contender: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct UrlEntry {
    owner: Option<String>,
    values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UrlObject {
    entries: BTreeMap<String, UrlEntry>,
}

impl UrlObject {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a writer whose keys are attributed to `owner`.
    pub fn scope<'a>(&'a mut self, owner: &str) -> UrlScope<'a> {
        UrlScope {
            object: self,
            owner: owner.to_string(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.entries.get(key).map(|entry| entry.values.as_slice())
    }

    pub fn first(&self, key: &str) -> Option<&str> {
        self.get(key)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    pub fn owner_of(&self, key: &str) -> Option<&str> {
        self.entries.get(key).and_then(|entry| entry.owner.as_deref())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn write(&mut self, owner: &str, key: &str, values: Vec<String>) -> Result<(), UrlStateError> {
        if let Some(existing) = self.entries.get(key) {
            if let Some(current_owner) = existing.owner.as_deref() {
                if current_owner != owner {
                    return Err(UrlStateError::KeyConflict {
                        key: key.to_string(),
                        owner: current_owner.to_string(),
                        contender: owner.to_string(),
                    });
                }
            }
        }
        self.entries.insert(
            key.to_string(),
            UrlEntry {
                owner: Some(owner.to_string()),
                values,
            },
        );
        Ok(())
    }

    /// Keys sorted, multi-values as repeated pairs.
    pub fn to_query_string(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, entry) in &self.entries {
            for value in &entry.values {
                serializer.append_pair(key, value);
            }
        }
        serializer.finish()
    }

    /// Parsed keys carry no owner.
    pub fn from_query_string(raw: &str) -> Self {
        let raw = raw.trim().trim_start_matches('?');
        let mut entries: BTreeMap<String, UrlEntry> = BTreeMap::new();
        for (key, value) in form_urlencoded::parse(raw.as_bytes()) {
            entries
                .entry(key.into_owned())
                .or_insert_with(|| UrlEntry {
                    owner: None,
                    values: Vec::new(),
                })
                .values
                .push(value.into_owned());
        }
        Self { entries }
    }
}

pub struct UrlScope<'a> {
    object: &'a mut UrlObject,
    owner: String,
}

impl UrlScope<'_> {
    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) -> Result<(), UrlStateError> {
        self.object.write(&self.owner, key, vec![value.into()])
    }

    pub fn set_many(&mut self, key: &str, values: Vec<String>) -> Result<(), UrlStateError> {
        self.object.write(&self.owner, key, values)
    }
}

pub trait UrlCodec: Send + Sync {
    fn to_url_object(
        &self,
        query: &QueryValue,
        object: &mut UrlObject,
    ) -> Result<(), UrlStateError>;
    fn from_url_object(&self, object: &UrlObject, query: &mut QueryValue);
}

pub trait AddressBar: Send + Sync {
    fn current(&self) -> Option<String>;
    fn push(&self, query_string: &str);
    fn replace(&self, query_string: &str);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub mode: HistoryMode,
    pub query_string: String,
}

/// In-process address bar keeping the full entry list.
#[derive(Debug, Default)]
pub struct MemoryAddressBar {
    entries: Mutex<Vec<HistoryEntry>>,
}

impl MemoryAddressBar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_initial(query_string: impl Into<String>) -> Self {
        Self {
            entries: Mutex::new(vec![HistoryEntry {
                mode: HistoryMode::Push,
                query_string: query_string.into(),
            }]),
        }
    }

    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.entries.lock().clone()
    }
}

impl AddressBar for MemoryAddressBar {
    fn current(&self) -> Option<String> {
        self.entries
            .lock()
            .last()
            .map(|entry| entry.query_string.clone())
    }

    fn push(&self, query_string: &str) {
        self.entries.lock().push(HistoryEntry {
            mode: HistoryMode::Push,
            query_string: query_string.to_string(),
        });
    }

    fn replace(&self, query_string: &str) {
        let mut entries = self.entries.lock();
        let entry = HistoryEntry {
            mode: HistoryMode::Replace,
            query_string: query_string.to_string(),
        };
        match entries.last_mut() {
            Some(last) => *last = entry,
            None => entries.push(entry),
        }
    }
}
