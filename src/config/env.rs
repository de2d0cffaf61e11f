//! Process environment snapshot.
//!
//! The environment is read exactly once at startup. Everything downstream
//! (config overrides, per-user credential lookup) reads from this snapshot,
//! so request handling never touches `std::env`.

use std::collections::HashMap;

/// Immutable copy of the process environment.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    vars: HashMap<String, String>,
}

impl Environment {
    /// Capture the current process environment.
    pub fn from_process() -> Self {
        std::env::vars().collect()
    }

    /// Look up a variable. Empty values are treated as unset.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// True if the variable is set to exactly `"true"`.
    pub fn flag(&self, key: &str) -> bool {
        self.get(key) == Some("true")
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Environment
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_values_are_unset() {
        let env: Environment = [("A", "1"), ("B", "")].into_iter().collect();
        assert_eq!(env.get("A"), Some("1"));
        assert_eq!(env.get("B"), None);
        assert_eq!(env.get("C"), None);
    }

    #[test]
    fn test_flag_requires_literal_true() {
        let env: Environment = [("ON", "true"), ("YES", "1"), ("CAPS", "TRUE")]
            .into_iter()
            .collect();
        assert!(env.flag("ON"));
        assert!(!env.flag("YES"));
        assert!(!env.flag("CAPS"));
        assert!(!env.flag("MISSING"));
    }
}
