//! An in-memory, domain-partitioned key-value registry.
//!
//! Values are stored under a `(domain, key)` pair. The domain is always a plain name; the key
//! may be a scalar or a structured object.
//!
//! # Key Modes
//!
//! - **Strict** (default): scalar keys compare by value, object keys by instance. Only the same
//!   [`ObjectKey`] handle (or a clone of it) finds an entry again.
//! - **Structural**: every key is normalized to a canonical serialized form, so two distinct
//!   object keys with equal content address the same entry.
//!
//! # Architectural Overview
//!
//! 1.  **[`KeyedCollection`]**: One keyed map plus the normalization policy of its [`KeyMode`].
//! 2.  **[`DomainRegistry`]**: Lazily creates and delegates to one collection per domain.
//! 3.  **[`RegistryConfig`]** / **[`RegistryBuilder`]**: Construction options, resolved once.
//!
//! No operation on a registry or collection can fail. Missing keys and domains are reported
//! through `Option` (or a caller-supplied default), never through errors. The structures are
//! plain single-owner values; wrap them in a lock if they need to be shared across threads.
//!
//! # Examples
//!
//! ```rust
//! use dmap_registry::{DomainRegistry, Key, ObjectKey};
//! use serde_json::json;
//!
//! let mut registry = DomainRegistry::new();
//!
//! let user = ObjectKey::new(json!({ "id": 42 }));
//! registry.set("profiles", &user, "Alice");
//! registry.set("settings", "theme", "dark");
//!
//! // Strict mode: the same instance hits, an equal copy does not.
//! assert_eq!(registry.get("profiles", &user), Some(&"Alice"));
//! let copy = ObjectKey::new(json!({ "id": 42 }));
//! assert_eq!(registry.get_or("profiles", &copy, &"unknown"), &"unknown");
//!
//! assert_eq!(registry.domain_keys("settings"), Some(vec![Key::from("theme")]));
//! ```
//!
//! ```rust
//! use dmap_registry::{KeyedCollection, RegistryConfig};
//! use serde_json::json;
//!
//! let options = RegistryConfig::from_json(r#"{ "strictKeyMode": false }"#)?;
//! let mut cache: KeyedCollection<u64> = KeyedCollection::with_config(&options);
//!
//! cache.set(json!({ "route": "/", "lang": "en" }), 1);
//! cache.set(json!({ "lang": "en", "route": "/" }), 2);
//! assert_eq!(cache.len(), 1);
//! # Ok::<(), dmap_registry::RegistryError>(())
//! ```

mod collection;
mod config;
mod error;
mod key;
mod mode;
mod registry;

pub use collection::KeyedCollection;
pub use config::{RegistryBuilder, RegistryConfig};
pub use error::{RegistryError, RegistryErrorExt};
pub use key::{Key, KeyRef, ObjectKey, Scalar, ScalarRef};
pub use mode::KeyMode;
pub use registry::{DomainName, DomainRegistry};
