//! Secret Bundle Entity
//!
//! Resolved secrets for exactly one service. Values stay in memory only;
//! `Debug` output lists key names and nothing else.

use std::collections::BTreeMap;
use std::fmt;

/// Mapping from secret name to secret value
///
/// Keys are kept sorted so that anything rendered from a bundle is
/// deterministic.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SecretBundle {
    values: BTreeMap<String, String>,
}

impl SecretBundle {
    /// Empty bundle (service does not require secrets)
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_map(values: BTreeMap<String, String>) -> Self {
        Self { values }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Secret names in sorted order; safe to log
    pub fn keys(&self) -> Vec<String> {
        self.values.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Borrow the underlying map (for rendering)
    pub fn as_map(&self) -> &BTreeMap<String, String> {
        &self.values
    }
}

impl fmt::Debug for SecretBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretBundle")
            .field("keys", &self.values.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl<K, V> FromIterator<(K, V)> for SecretBundle
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
