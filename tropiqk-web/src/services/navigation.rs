//! Navigation and per-tab storage seams.
//!
//! The client library never touches a real browser; it is handed a
//! [`Navigator`] and a [`KeyValueStorage`]. [`History`] and
//! [`MemoryStorage`] are the in-process implementations used by headless
//! clients and tests.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

pub trait Navigator: Send + Sync {
    /// Current location, path plus optional query.
    fn current_path(&self) -> String;

    /// Pushes a new location.
    fn navigate(&self, path: &str);

    /// Replaces the current location without adding an entry.
    fn replace(&self, path: &str);
}

pub trait KeyValueStorage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// Strips the query string and fragment off a location.
pub fn pathname(location: &str) -> &str {
    let end = location.find(['?', '#']).unwrap_or(location.len());
    &location[..end]
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-memory navigation history.
#[derive(Debug)]
pub struct History {
    entries: Mutex<Vec<String>>,
}

impl History {
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            entries: Mutex::new(vec![initial.into()]),
        }
    }

    pub fn entries(&self) -> Vec<String> {
        lock(&self.entries).clone()
    }

    pub fn back(&self) -> Option<String> {
        let mut entries = lock(&self.entries);
        if entries.len() > 1 {
            entries.pop();
        }
        entries.last().cloned()
    }
}

impl Navigator for History {
    fn current_path(&self) -> String {
        lock(&self.entries).last().cloned().unwrap_or_else(|| "/".to_string())
    }

    fn navigate(&self, path: &str) {
        tracing::debug!(to = %path, "navigate");
        lock(&self.entries).push(path.to_string());
    }

    fn replace(&self, path: &str) {
        let mut entries = lock(&self.entries);
        match entries.last_mut() {
            Some(last) => *last = path.to_string(),
            None => entries.push(path.to_string()),
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        lock(&self.values).get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        lock(&self.values).insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        lock(&self.values).remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pathname_drops_query_and_fragment() {
        assert_eq!(pathname("/auth/verify-email?email=a@b.c"), "/auth/verify-email");
        assert_eq!(pathname("/fans/dashboard#top"), "/fans/dashboard");
        assert_eq!(pathname("/"), "/");
    }

    #[test]
    fn history_push_replace_back() {
        let history = History::new("/");
        history.navigate("/auth/login");
        history.replace("/artist/dashboard");
        assert_eq!(history.entries(), ["/", "/artist/dashboard"]);
        assert_eq!(history.back().as_deref(), Some("/"));
        assert_eq!(history.back().as_deref(), Some("/"));
    }
}
