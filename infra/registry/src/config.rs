use crate::collection::KeyedCollection;
use crate::error::RegistryError;
use crate::mode::KeyMode;
use crate::registry::DomainRegistry;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::debug;

/// Construction options for registries and standalone collections.
///
/// The only recognized option is `strictKeyMode` (default `true`). Values are read leniently:
/// a present value selects strict mode by truthiness (`false`, `0`, `""` and `null` select
/// structural mode) rather than being rejected, and unknown fields are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RegistryConfig {
    #[serde(deserialize_with = "truthy")]
    pub strict_key_mode: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self { strict_key_mode: true }
    }
}

impl RegistryConfig {
    #[must_use]
    pub const fn strict() -> Self {
        Self { strict_key_mode: true }
    }

    #[must_use]
    pub const fn structural() -> Self {
        Self { strict_key_mode: false }
    }

    #[must_use]
    pub const fn key_mode(&self) -> KeyMode {
        if self.strict_key_mode { KeyMode::Strict } else { KeyMode::Structural }
    }

    /// Parses options from a JSON document.
    ///
    /// A document that is not an object carries no options and yields the defaults.
    ///
    /// # Errors
    /// Returns [`RegistryError::Config`] if `raw` is not valid JSON.
    pub fn from_json(raw: &str) -> Result<Self, RegistryError> {
        let value: Value = serde_json::from_str(raw).map_err(|err| RegistryError::Config {
            message: err.to_string().into(),
            context: Some("Failed to parse registry options".into()),
        })?;

        if !value.is_object() {
            debug!(kind = value_kind(&value), "Registry options are not an object, using defaults");
            return Ok(Self::default());
        }

        Self::deserialize(value).map_err(|err| RegistryError::Config {
            message: err.to_string().into(),
            context: Some("Failed to read registry options".into()),
        })
    }
}

impl From<KeyMode> for RegistryConfig {
    fn from(mode: KeyMode) -> Self {
        Self { strict_key_mode: mode.is_strict() }
    }
}

fn truthy<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => false,
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f.abs() > 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    })
}

const fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Fluent builder for [`DomainRegistry`] and [`KeyedCollection`].
///
/// ```rust
/// use dmap_registry::{DomainRegistry, KeyMode};
///
/// let registry: DomainRegistry<u32> = DomainRegistry::builder().strict_key_mode(false).build();
/// assert_eq!(registry.key_mode(), KeyMode::Structural);
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct RegistryBuilder {
    config: RegistryConfig,
}

impl RegistryBuilder {
    #[must_use = "Creates a new registry builder with default configuration"]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "Sets whether object keys compare by instance or by content"]
    pub const fn strict_key_mode(mut self, enable: bool) -> Self {
        self.config.strict_key_mode = enable;
        self
    }

    #[must_use = "Sets the key mode for every collection the registry creates"]
    pub const fn key_mode(mut self, mode: KeyMode) -> Self {
        self.config.strict_key_mode = mode.is_strict();
        self
    }

    #[must_use = "Replaces the whole configuration"]
    pub const fn config(mut self, config: RegistryConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn build<V>(self) -> DomainRegistry<V> {
        DomainRegistry::with_config(self.config)
    }

    /// Builds a standalone collection outside any registry.
    #[must_use]
    pub fn build_collection<V>(self) -> KeyedCollection<V> {
        KeyedCollection::with_config(&self.config)
    }
}
