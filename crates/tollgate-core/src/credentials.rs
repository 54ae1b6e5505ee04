//! API key credentials and credential stores.
//!
//! Credentials are looked up by an opaque id. A blank id means the scan runs
//! unauthenticated; an id that does not resolve is a configuration error.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::reference::is_blank;

/// Access/secret key pair for the scanning service.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct ApiKeys {
    /// Access key. Also used as the registry login user name.
    pub access_key: String,
    /// Secret key. Also used as the registry login password.
    pub secret_key: String,
}

impl ApiKeys {
    /// Creates a key pair.
    pub fn new(access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
        }
    }

    /// Value for the `X-ApiKeys` request header.
    ///
    /// # Examples
    ///
    /// ```
    /// use tollgate_core::ApiKeys;
    ///
    /// let keys = ApiKeys::new("ak", "sk");
    /// assert_eq!(keys.header_value(), "accessKey=ak;secretKey=sk;");
    /// ```
    #[must_use]
    pub fn header_value(&self) -> String {
        format!("accessKey={};secretKey={};", self.access_key, self.secret_key)
    }
}

impl fmt::Debug for ApiKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKeys")
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

/// A source of [`ApiKeys`] addressed by id.
pub trait CredentialStore {
    /// Looks up the keys stored under `id`.
    fn lookup(&self, id: &str) -> Option<ApiKeys>;
}

/// Credential store backed by an in-memory map.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCredentialStore {
    entries: HashMap<String, ApiKeys>,
}

impl InMemoryCredentialStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry.
    #[must_use]
    pub fn with_entry(mut self, id: impl Into<String>, keys: ApiKeys) -> Self {
        self.entries.insert(id.into(), keys);
        self
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn lookup(&self, id: &str) -> Option<ApiKeys> {
        self.entries.get(id).cloned()
    }
}

/// Credential store loaded from a YAML (or JSON) file mapping ids to key pairs.
///
/// ```yaml
/// tio-production:
///   access_key: 0123abcd
///   secret_key: 4567efgh
/// ```
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    inner: InMemoryCredentialStore,
}

impl FileCredentialStore {
    /// Loads the store from `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid map of key pairs.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| Error::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content).map_err(|source| Error::FileParse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn parse(content: &str) -> std::result::Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self {
                inner: InMemoryCredentialStore::new(),
            });
        }
        let entries: Option<HashMap<String, ApiKeys>> = serde_yaml::from_str(content)?;
        Ok(Self {
            inner: InMemoryCredentialStore {
                entries: entries.unwrap_or_default(),
            },
        })
    }
}

impl CredentialStore for FileCredentialStore {
    fn lookup(&self, id: &str) -> Option<ApiKeys> {
        self.inner.lookup(id)
    }
}

/// Resolves the credentials for an optional id.
///
/// A missing or blank id yields `Ok(None)` without consulting the store.
///
/// # Errors
///
/// Returns [`Error::CredentialsNotFound`] if a non-blank id has no entry.
pub fn resolve_credentials<S>(store: &S, id: Option<&str>) -> Result<Option<ApiKeys>>
where
    S: CredentialStore + ?Sized,
{
    let Some(id) = id.filter(|id| !is_blank(id)) else {
        return Ok(None);
    };

    store
        .lookup(id)
        .map(Some)
        .ok_or_else(|| Error::CredentialsNotFound { id: id.to_string() })
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    struct CountingStore {
        lookups: Cell<usize>,
    }

    impl CredentialStore for CountingStore {
        fn lookup(&self, _id: &str) -> Option<ApiKeys> {
            self.lookups.set(self.lookups.get() + 1);
            None
        }
    }

    #[test]
    fn test_blank_id_skips_lookup() {
        let store = CountingStore {
            lookups: Cell::new(0),
        };

        assert!(resolve_credentials(&store, None).unwrap().is_none());
        assert!(resolve_credentials(&store, Some("")).unwrap().is_none());
        assert!(resolve_credentials(&store, Some("   ")).unwrap().is_none());
        assert_eq!(store.lookups.get(), 0);
    }

    #[test]
    fn test_unknown_id_is_an_error() {
        let store = InMemoryCredentialStore::new();
        let err = resolve_credentials(&store, Some("missing")).unwrap_err();
        assert!(matches!(err, Error::CredentialsNotFound { ref id } if id == "missing"));
    }

    #[test]
    fn test_known_id_resolves() {
        let store = InMemoryCredentialStore::new().with_entry("tio", ApiKeys::new("ak", "sk"));
        let keys = resolve_credentials(&store, Some("tio")).unwrap().unwrap();
        assert_eq!(keys, ApiKeys::new("ak", "sk"));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let rendered = format!("{:?}", ApiKeys::new("ak", "super-secret"));
        assert!(rendered.contains("ak"));
        assert!(!rendered.contains("super-secret"));
    }

    #[test]
    fn test_file_store_loads_yaml_and_json() {
        let dir = tempfile::TempDir::new().unwrap();

        let yaml = dir.path().join("credentials.yaml");
        std::fs::write(&yaml, "tio:\n  access_key: ak\n  secret_key: sk\n").unwrap();
        let store = FileCredentialStore::load(&yaml).unwrap();
        assert_eq!(store.lookup("tio"), Some(ApiKeys::new("ak", "sk")));
        assert_eq!(store.lookup("other"), None);

        let json = dir.path().join("credentials.json");
        std::fs::write(&json, r#"{"ci": {"access_key": "a", "secret_key": "s"}}"#).unwrap();
        let store = FileCredentialStore::load(&json).unwrap();
        assert_eq!(store.lookup("ci"), Some(ApiKeys::new("a", "s")));
    }

    #[test]
    fn test_file_store_empty_file_is_empty_store() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("empty.yaml");
        std::fs::write(&path, "").unwrap();

        let store = FileCredentialStore::load(&path).unwrap();
        assert_eq!(store.lookup("anything"), None);
    }

    #[test]
    fn test_file_store_errors() {
        let dir = tempfile::TempDir::new().unwrap();

        let missing = FileCredentialStore::load(dir.path().join("nope.yaml")).unwrap_err();
        assert!(matches!(missing, Error::FileRead { .. }));

        let bad = dir.path().join("bad.yaml");
        std::fs::write(&bad, "tio: [not, a, key, pair]").unwrap();
        let parse = FileCredentialStore::load(&bad).unwrap_err();
        assert!(matches!(parse, Error::FileParse { .. }));
    }
}
