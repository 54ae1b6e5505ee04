//! Container image references.
//!
//! An [`ImageReference`] is the `(registry?, repository, tag)` triple that the
//! transfer CLI understands. It is built once per resolution and never
//! mutated afterwards.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Tag used when none (or a blank one) is supplied.
pub const DEFAULT_TAG: &str = "latest";

/// A container image reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageReference {
    registry: Option<String>,
    repository: String,
    tag: String,
}

impl ImageReference {
    /// Creates a reference, substituting [`DEFAULT_TAG`] for a blank or missing tag.
    ///
    /// Never fails; use [`is_valid`](Self::is_valid) to check the result.
    ///
    /// # Examples
    ///
    /// ```
    /// use tollgate_core::ImageReference;
    ///
    /// let image = ImageReference::create(None::<String>, "team/app", Some("  "));
    /// assert_eq!(image.tag(), "latest");
    /// assert_eq!(image.name(), "team/app:latest");
    /// ```
    pub fn create(
        registry: Option<impl Into<String>>,
        repository: impl Into<String>,
        tag: Option<impl Into<String>>,
    ) -> Self {
        let tag = tag
            .map(Into::into)
            .filter(|t| !is_blank(t))
            .unwrap_or_else(|| DEFAULT_TAG.to_string());

        Self {
            registry: registry.map(Into::into),
            repository: repository.into(),
            tag,
        }
    }

    /// Registry host (with optional port), if any.
    #[must_use]
    pub fn registry(&self) -> Option<&str> {
        self.registry.as_deref()
    }

    /// Repository path.
    #[must_use]
    pub fn repository(&self) -> &str {
        &self.repository
    }

    /// Tag.
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Returns `true` unless the repository or the tag is blank.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !(is_blank(&self.repository) || is_blank(&self.tag))
    }

    /// Canonical name: `registry/repository:tag`, or `repository:tag` without a registry.
    ///
    /// # Examples
    ///
    /// ```
    /// use tollgate_core::ImageReference;
    ///
    /// let image = ImageReference::create(Some("localhost:5000"), "app", Some("dev"));
    /// assert_eq!(image.name(), "localhost:5000/app:dev");
    /// ```
    #[must_use]
    pub fn name(&self) -> String {
        match self.registry.as_deref() {
            Some(registry) if !registry.is_empty() => {
                format!("{registry}/{}:{}", self.repository, self.tag)
            }
            _ => format!("{}:{}", self.repository, self.tag),
        }
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

pub(crate) fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    const NO_REGISTRY: Option<&str> = None;

    #[test]
    fn test_blank_or_missing_tag_defaults_to_latest() {
        assert_eq!(ImageReference::create(NO_REGISTRY, "app", Some("")).tag(), "latest");
        assert_eq!(ImageReference::create(NO_REGISTRY, "app", Some(" \t")).tag(), "latest");
        assert_eq!(ImageReference::create(NO_REGISTRY, "app", None::<&str>).tag(), "latest");
        assert_eq!(ImageReference::create(NO_REGISTRY, "app", Some("v2")).tag(), "v2");
    }

    #[test]
    fn test_blank_repository_is_invalid() {
        assert!(!ImageReference::create(NO_REGISTRY, "", Some("v1")).is_valid());
        assert!(!ImageReference::create(NO_REGISTRY, "   ", Some("v1")).is_valid());
        assert!(ImageReference::create(NO_REGISTRY, "app", None::<&str>).is_valid());
    }

    #[test]
    fn test_name_with_and_without_registry() {
        let with = ImageReference::create(Some("registry.example.com"), "team/app", Some("1.0"));
        assert_eq!(with.name(), "registry.example.com/team/app:1.0");

        let without = ImageReference::create(NO_REGISTRY, "team/app", Some("1.0"));
        assert_eq!(without.name(), "team/app:1.0");
    }

    #[test]
    fn test_empty_registry_is_omitted_from_name() {
        let image = ImageReference::create(Some(""), "app", Some("1.0"));
        assert_eq!(image.name(), "app:1.0");
        assert_eq!(image.registry(), Some(""));
    }

    #[test]
    fn test_display_matches_name() {
        let image = ImageReference::create(Some("host:5000"), "app", None::<&str>);
        assert_eq!(image.to_string(), image.name());
    }
}
