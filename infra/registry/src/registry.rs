use crate::collection::KeyedCollection;
use crate::config::{RegistryBuilder, RegistryConfig};
use crate::key::{Key, KeyRef};
use crate::mode::KeyMode;
use fxhash::FxBuildHasher;
use indexmap::IndexMap;
use std::borrow::Borrow;
use std::fmt;
use tracing::debug;

/// Name of a registry domain.
///
/// Domains are plain names; numeric names convert to their decimal text, so `1` and `"1"`
/// address the same domain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DomainName(String);

impl DomainName {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for DomainName {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for DomainName {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&String> for DomainName {
    fn from(value: &String) -> Self {
        Self(value.clone())
    }
}

impl From<i64> for DomainName {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

impl From<u32> for DomainName {
    fn from(value: u32) -> Self {
        Self(value.to_string())
    }
}

impl AsRef<str> for DomainName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for DomainName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DomainName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A key-value registry partitioned into independent domains.
///
/// Each domain owns one [`KeyedCollection`], created on the first write to that domain with
/// the registry's key mode. Reads, deletes and clears never create a domain. Clearing a domain
/// empties its collection but keeps the domain itself, so "empty" stays distinguishable from
/// "never touched".
///
/// # Example
///
/// ```rust
/// use dmap_registry::{DomainRegistry, Key, RegistryConfig};
/// use serde_json::json;
///
/// let mut registry = DomainRegistry::with_config(RegistryConfig::structural());
/// registry.set("A", json!({ "x": 1 }), "v1");
///
/// let probe = Key::from(json!({ "x": 1 }));
/// assert_eq!(registry.get("A", &probe), Some(&"v1"));
/// assert_eq!(registry.get("B", &probe), None);
///
/// registry.clear_domain("A");
/// assert_eq!(registry.get("A", &probe), None);
/// assert_eq!(registry.domain("A").map(|d| d.len()), Some(0));
/// ```
#[derive(Debug, Clone)]
pub struct DomainRegistry<V> {
    domains: IndexMap<DomainName, KeyedCollection<V>, FxBuildHasher>,
    mode: KeyMode,
}

impl DomainRegistry<()> {
    /// Starts a [`RegistryBuilder`]. The value type is chosen by [`RegistryBuilder::build`].
    #[must_use = "The registry is not created until you call .build()"]
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }
}

impl<V> DomainRegistry<V> {
    /// Creates an empty registry in strict key mode.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Creates an empty registry. The key mode is resolved once and fixed for its lifetime.
    #[must_use]
    pub fn with_config(config: RegistryConfig) -> Self {
        Self { domains: IndexMap::with_hasher(FxBuildHasher::default()), mode: config.key_mode() }
    }

    /// Creates a standalone collection outside any domain, following the same key mode rules.
    #[must_use]
    pub fn create_collection(config: &RegistryConfig) -> KeyedCollection<V> {
        KeyedCollection::with_config(config)
    }

    #[must_use]
    pub const fn key_mode(&self) -> KeyMode {
        self.mode
    }

    /// Stores `value` under `key` in `domain`, creating the domain on first use.
    /// Returns the value it replaced, if any.
    pub fn set(
        &mut self,
        domain: impl Into<DomainName>,
        key: impl Into<Key>,
        value: V,
    ) -> Option<V> {
        let mode = self.mode;
        self.domains
            .entry(domain.into())
            .or_insert_with_key(|name| {
                debug!(domain = %name, mode = ?mode, "Created domain collection");
                KeyedCollection::new(mode)
            })
            .set(key, value)
    }

    /// Returns the value under `key` in `domain`, or `None` if either is missing.
    pub fn get<'k>(&self, domain: impl AsRef<str>, key: impl Into<KeyRef<'k>>) -> Option<&V> {
        self.domains.get(domain.as_ref())?.get(key)
    }

    /// Returns the value under `key` in `domain`, or `default` if either is missing.
    pub fn get_or<'a, 'k>(
        &'a self,
        domain: impl AsRef<str>,
        key: impl Into<KeyRef<'k>>,
        default: &'a V,
    ) -> &'a V {
        self.get(domain, key).unwrap_or(default)
    }

    pub fn get_mut<'k>(
        &mut self,
        domain: impl AsRef<str>,
        key: impl Into<KeyRef<'k>>,
    ) -> Option<&mut V> {
        self.domains.get_mut(domain.as_ref())?.get_mut(key)
    }

    pub fn contains_key<'k>(&self, domain: impl AsRef<str>, key: impl Into<KeyRef<'k>>) -> bool {
        self.domains.get(domain.as_ref()).is_some_and(|collection| collection.contains_key(key))
    }

    /// Alias of [`DomainRegistry::contains_key`].
    pub fn has<'k>(&self, domain: impl AsRef<str>, key: impl Into<KeyRef<'k>>) -> bool {
        self.contains_key(domain, key)
    }

    /// Removes `key` from `domain`. Missing domains and keys are a no-op.
    pub fn delete<'k>(&mut self, domain: impl AsRef<str>, key: impl Into<KeyRef<'k>>) -> Option<V> {
        self.domains.get_mut(domain.as_ref())?.delete(key)
    }

    /// Removes every entry of `domain` while keeping the (now empty) domain.
    pub fn clear_domain(&mut self, domain: impl AsRef<str>) {
        let domain = domain.as_ref();
        if let Some(collection) = self.domains.get_mut(domain) {
            let removed = collection.len();
            collection.clear();
            debug!(domain, removed, "Cleared domain");
        }
    }

    /// Keys of `domain` in insertion order, or `None` if the domain was never written.
    pub fn domain_keys(&self, domain: impl AsRef<str>) -> Option<Vec<Key>> {
        self.domains.get(domain.as_ref()).map(KeyedCollection::keys)
    }

    /// Direct access to the collection behind `domain`.
    pub fn domain(&self, domain: impl AsRef<str>) -> Option<&KeyedCollection<V>> {
        self.domains.get(domain.as_ref())
    }

    pub fn domain_mut(&mut self, domain: impl AsRef<str>) -> Option<&mut KeyedCollection<V>> {
        self.domains.get_mut(domain.as_ref())
    }

    pub fn contains_domain(&self, domain: impl AsRef<str>) -> bool {
        self.domains.contains_key(domain.as_ref())
    }

    /// Domain names in the order the domains were created.
    pub fn domain_names(&self) -> impl Iterator<Item = &DomainName> {
        self.domains.keys()
    }

    pub fn domain_count(&self) -> usize {
        self.domains.len()
    }
}

impl<V> Default for DomainRegistry<V> {
    fn default() -> Self {
        Self::new()
    }
}
