use std::collections::HashMap;
use std::sync::Mutex;

/// Durable key-value capability backing the conversation list, scoped to the
/// local profile. No expiry, no cross-instance coordination; a single
/// consumer at a time is assumed.
pub trait Storage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
}

/// In-process implementation. Durable only for the life of the process;
/// embedders substitute a browser- or disk-backed implementation.
#[derive(Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .expect("storage mutex poisoned")
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .expect("storage mutex poisoned")
            .insert(key.to_owned(), value.to_owned());
    }
}
