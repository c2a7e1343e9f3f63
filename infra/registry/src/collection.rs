use crate::config::RegistryConfig;
use crate::key::{Key, KeyRef};
use crate::mode::{KeyMode, StorageKey};
use fxhash::FxBuildHasher;
use indexmap::IndexMap;
use std::fmt;
use tracing::trace;

/// A single keyed collection with a fixed [`KeyMode`].
///
/// Entries keep the order in which their key was first set. Overwriting a key keeps its
/// position; deleting and setting it again moves it to the end.
///
/// # Example
///
/// ```rust
/// use dmap_registry::{Key, KeyMode, KeyedCollection};
/// use serde_json::json;
///
/// let mut sessions = KeyedCollection::new(KeyMode::Structural);
/// sessions.set(json!({ "user": 1, "device": "web" }), "token-a");
///
/// // A freshly built key with equal content finds the same entry.
/// let probe = Key::from(json!({ "device": "web", "user": 1 }));
/// assert_eq!(sessions.get(&probe), Some(&"token-a"));
/// ```
#[derive(Clone)]
pub struct KeyedCollection<V> {
    entries: IndexMap<StorageKey, V, FxBuildHasher>,
    mode: KeyMode,
}

impl<V> KeyedCollection<V> {
    #[must_use]
    pub fn new(mode: KeyMode) -> Self {
        Self { entries: IndexMap::with_hasher(FxBuildHasher::default()), mode }
    }

    /// Creates an empty collection with the key mode resolved from `config`.
    #[must_use]
    pub fn with_config(config: &RegistryConfig) -> Self {
        Self::new(config.key_mode())
    }

    #[must_use]
    pub const fn key_mode(&self) -> KeyMode {
        self.mode
    }

    /// Inserts or overwrites the value stored under `key`, returning the replaced value.
    pub fn set(&mut self, key: impl Into<Key>, value: V) -> Option<V> {
        let key = self.mode.normalize(key.into());
        self.entries.insert(key, value)
    }

    /// Returns the value stored under `key`, or `None` if there is none.
    pub fn get<'k>(&self, key: impl Into<KeyRef<'k>>) -> Option<&V> {
        self.entries.get(&self.mode.lookup(key.into()))
    }

    /// Returns the value stored under `key`, or `default` if there is none.
    pub fn get_or<'a, 'k>(&'a self, key: impl Into<KeyRef<'k>>, default: &'a V) -> &'a V {
        self.get(key).unwrap_or(default)
    }

    pub fn get_mut<'k>(&mut self, key: impl Into<KeyRef<'k>>) -> Option<&mut V> {
        let probe = self.mode.lookup(key.into());
        self.entries.get_mut(&probe)
    }

    pub fn contains_key<'k>(&self, key: impl Into<KeyRef<'k>>) -> bool {
        self.entries.contains_key(&self.mode.lookup(key.into()))
    }

    /// Alias of [`KeyedCollection::contains_key`].
    pub fn has<'k>(&self, key: impl Into<KeyRef<'k>>) -> bool {
        self.contains_key(key)
    }

    /// Removes the entry stored under `key`. Removing an absent key is a no-op.
    pub fn delete<'k>(&mut self, key: impl Into<KeyRef<'k>>) -> Option<V> {
        let probe = self.mode.lookup(key.into());
        self.entries.shift_remove(&probe)
    }

    /// Removes every entry. The collection stays usable.
    pub fn clear(&mut self) {
        trace!(removed = self.entries.len(), "Clearing keyed collection");
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Snapshot of every stored key in storage order, each restored to its original shape.
    pub fn keys(&self) -> Vec<Key> {
        self.entries.keys().map(StorageKey::denormalize).collect()
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.values()
    }

    /// Iterates entries in storage order with restored keys.
    pub fn iter(&self) -> impl Iterator<Item = (Key, &V)> {
        self.entries.iter().map(|(key, value)| (key.denormalize(), value))
    }

    /// Invokes `callback` once per entry in storage order as `(value, key)`.
    pub fn for_each<F>(&self, mut callback: F)
    where
        F: FnMut(&V, Key),
    {
        for (key, value) in &self.entries {
            callback(value, key.denormalize());
        }
    }
}

impl<V> Default for KeyedCollection<V> {
    fn default() -> Self {
        Self::new(KeyMode::default())
    }
}

impl<V: fmt::Debug> fmt::Debug for KeyedCollection<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyedCollection")
            .field("mode", &self.mode)
            .field("entries", &DebugEntries(self))
            .finish()
    }
}

struct DebugEntries<'a, V>(&'a KeyedCollection<V>);

impl<V: fmt::Debug> fmt::Debug for DebugEntries<'_, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.0.iter()).finish()
    }
}

impl<K: Into<Key>, V> Extend<(K, V)> for KeyedCollection<V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.set(key, value);
        }
    }
}
