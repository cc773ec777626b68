use std::collections::HashMap;
use std::fmt;
use std::sync::{PoisonError, RwLock};

/// In-memory key-value store
///
/// A single reader-writer lock guards the whole map: any number of `get`
/// calls run together, `set` and `delete` run alone.
pub struct Store {
    data: RwLock<HashMap<String, String>>,
}

/// Result of a `set`: what was written and what it replaced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetOutcome {
    pub key: String,
    pub value: String,
    pub previous: Option<String>,
}

impl SetOutcome {
    /// Whether the key was present before the write
    pub fn existed(&self) -> bool {
        self.previous.is_some()
    }

    /// Previous value, empty when the key is new
    pub fn previous_value(&self) -> &str {
        self.previous.as_deref().unwrap_or_default()
    }
}

impl fmt::Display for SetOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.previous {
            Some(prev) => write!(
                f,
                "Key {} existed with value {}. Now updated with value {}",
                self.key, prev, self.value
            ),
            None => write!(f, "New key {} added with value {}", self.key, self.value),
        }
    }
}

/// Result of a `delete`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub key: String,
    pub existed: bool,
}

impl fmt::Display for DeleteOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.existed {
            write!(f, "Key {} existed and is now deleted", self.key)
        } else {
            write!(f, "Key {} does not exist", self.key)
        }
    }
}

impl Store {
    /// Create a new empty store
    pub fn new() -> Self {
        Self {
            data: RwLock::new(HashMap::new()),
        }
    }

    /// Get the value for a key, `None` if it was never set or has been deleted
    pub fn get(&self, key: &str) -> Option<String> {
        // Every mutation is a single insert/remove, so a poisoned map is still whole.
        let data = self.data.read().unwrap_or_else(PoisonError::into_inner);
        data.get(key).cloned()
    }

    /// Set a key to the given value, reporting the value it replaced
    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) -> SetOutcome {
        let key = key.into();
        let value = value.into();

        let mut data = self.data.write().unwrap_or_else(PoisonError::into_inner);
        let previous = data.insert(key.clone(), value.clone());
        drop(data);

        SetOutcome {
            key,
            value,
            previous,
        }
    }

    /// Remove a key; deleting an absent key is a no-op
    pub fn delete(&self, key: &str) -> DeleteOutcome {
        let mut data = self.data.write().unwrap_or_else(PoisonError::into_inner);
        let existed = data.remove(key).is_some();
        drop(data);

        DeleteOutcome {
            key: key.to_string(),
            existed,
        }
    }

    /// Number of keys currently stored
    pub fn len(&self) -> usize {
        self.data
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}
