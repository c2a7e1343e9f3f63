use std::borrow::Cow;

/// Errors raised while building keys or configuration for the registry.
///
/// Registry and collection operations themselves never fail; these only surface
/// at the edges where caller data is converted into registry types.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// Key data could not be represented as a structured value.
    #[error("Key serialization failure{}: {source}", format_context(.context))]
    Serialize { source: serde_json::Error, context: Option<Cow<'static, str>> },

    /// A configuration document could not be parsed.
    #[error("Invalid registry configuration{}: {message}", format_context(.context))]
    Config { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

/// Attaches human-readable context to registry results.
pub trait RegistryErrorExt<T> {
    /// Adds `context` to the error, replacing any previous context.
    ///
    /// # Errors
    /// Propagates the original error with the context attached.
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, RegistryError>;
}

impl<T> RegistryErrorExt<T> for Result<T, RegistryError> {
    #[inline]
    fn context(self, context: impl Into<Cow<'static, str>>) -> Self {
        self.map_err(|mut e| {
            match &mut e {
                RegistryError::Serialize { context: c, .. }
                | RegistryError::Config { context: c, .. } => *c = Some(context.into()),
            }
            e
        })
    }
}

impl<T> RegistryErrorExt<T> for Result<T, serde_json::Error> {
    #[inline]
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, RegistryError> {
        self.map_err(|source| RegistryError::Serialize { source, context: Some(context.into()) })
    }
}

impl From<serde_json::Error> for RegistryError {
    #[inline]
    fn from(source: serde_json::Error) -> Self {
        Self::Serialize { source, context: None }
    }
}

fn format_context(context: &Option<Cow<'static, str>>) -> Cow<'static, str> {
    context.as_ref().map_or(Cow::Borrowed(""), |c| Cow::Owned(format!(" ({c})")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_is_rendered_in_display() {
        let err: Result<(), RegistryError> =
            Err(RegistryError::Config { message: "bad".into(), context: None });
        let err = err.context("loading registry").unwrap_err();
        assert_eq!(err.to_string(), "Invalid registry configuration (loading registry): bad");
    }

    #[test]
    fn serde_errors_convert_with_context() {
        let raw: Result<serde_json::Value, _> = serde_json::from_str("{");
        let err = raw.context("parsing key").unwrap_err();
        assert!(matches!(err, RegistryError::Serialize { context: Some(_), .. }));
    }
}
