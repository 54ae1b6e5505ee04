//! Environment variables and `${NAME}` template expansion.
//!
//! An [`Environment`] is an immutable map. Deriving a new environment with
//! extra keys goes through [`Environment::with_overrides`], which returns a
//! fresh value and leaves the original untouched.

use std::collections::BTreeMap;

/// An immutable set of environment variables used for template expansion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    vars: BTreeMap<String, String>,
}

impl Environment {
    /// Creates an empty environment.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Captures the current process environment.
    ///
    /// Variables whose name or value is not valid unicode are skipped.
    #[must_use]
    pub fn from_process() -> Self {
        std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect()
    }

    /// Returns the value of a variable.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// Number of variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Returns `true` if no variables are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Returns a new environment containing `self` unioned with `overrides`.
    ///
    /// Keys present in both take the override's value.
    ///
    /// # Examples
    ///
    /// ```
    /// use tollgate_core::Environment;
    ///
    /// let base: Environment = [("A", "1"), ("B", "2")].into_iter().collect();
    /// let derived = base.with_overrides([("B", "3")]);
    /// assert_eq!(derived.get("B"), Some("3"));
    /// assert_eq!(base.get("B"), Some("2"));
    /// ```
    #[must_use]
    pub fn with_overrides<K, V>(&self, overrides: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut vars = self.vars.clone();
        vars.extend(overrides.into_iter().map(|(k, v)| (k.into(), v.into())));
        Self { vars }
    }

    /// Expands variable references in `template`.
    ///
    /// - `${NAME}` (name of `[A-Za-z0-9_.]`) and `$NAME` (name of `[A-Za-z0-9_]`)
    ///   are replaced when the variable is defined.
    /// - References to undefined variables are left as written.
    /// - `$$` renders a single `$`.
    /// - Anything else, such as a lone `$` or an unterminated `${`, is copied
    ///   literally.
    ///
    /// # Examples
    ///
    /// ```
    /// use tollgate_core::Environment;
    ///
    /// let env: Environment = [("TAG", "1.2")].into_iter().collect();
    /// assert_eq!(env.expand("app:${TAG}"), "app:1.2");
    /// assert_eq!(env.expand("app:$TAG-$MISSING"), "app:1.2-$MISSING");
    /// assert_eq!(env.expand("cost: $$5"), "cost: $5");
    /// ```
    #[must_use]
    pub fn expand(&self, template: &str) -> String {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(pos) = rest.find('$') {
            out.push_str(&rest[..pos]);
            let after = &rest[pos + 1..];

            if let Some(stripped) = after.strip_prefix('$') {
                out.push('$');
                rest = stripped;
                continue;
            }

            if let Some(braced) = after.strip_prefix('{') {
                let name_len = braced
                    .find(|c: char| !(is_name_char(c) || c == '.'))
                    .unwrap_or(braced.len());
                if name_len > 0 && braced[name_len..].starts_with('}') {
                    let name = &braced[..name_len];
                    let consumed = name_len + 3;
                    match self.get(name) {
                        Some(value) => out.push_str(value),
                        None => out.push_str(&rest[pos..pos + consumed]),
                    }
                    rest = &rest[pos + consumed..];
                    continue;
                }
            } else {
                let name_len = after.find(|c: char| !is_name_char(c)).unwrap_or(after.len());
                if name_len > 0 {
                    let name = &after[..name_len];
                    match self.get(name) {
                        Some(value) => out.push_str(value),
                        None => out.push_str(&rest[pos..=pos + name_len]),
                    }
                    rest = &after[name_len..];
                    continue;
                }
            }

            out.push('$');
            rest = after;
        }

        out.push_str(rest);
        out
    }
}

impl<K, V> FromIterator<(K, V)> for Environment
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

const fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
