//! Query key composition.

use serde::{Deserialize, Serialize};

/// A stable identifier for a cached query.
///
/// Combines a fixed namespace with the parts that vary it (such as the
/// active filter). Equal inputs always produce equal keys.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QueryKey {
    namespace: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    parts: Vec<String>,
}

impl QueryKey {
    /// Create a key with only a namespace.
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            parts: Vec::new(),
        }
    }

    /// Append a varying part.
    pub fn with_part(mut self, part: impl ToString) -> Self {
        self.parts.push(part.to_string());
        self
    }

    /// Parse a rendered key (`namespace:part:part`).
    pub fn parse(s: &str) -> Self {
        let mut segments = s.split(':');
        let namespace = segments.next().unwrap_or_default().to_string();
        Self {
            namespace,
            parts: segments.map(String::from).collect(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn parts(&self) -> &[String] {
        &self.parts
    }
}

impl std::fmt::Display for QueryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.namespace)?;
        for part in &self.parts {
            write!(f, ":{}", part)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(QueryKey::new("shoes-infinite").to_string(), "shoes-infinite");
        assert_eq!(
            QueryKey::new("shoes").with_part("running").to_string(),
            "shoes:running"
        );
    }

    #[test]
    fn test_stable_identity() {
        let a = QueryKey::new("shoes").with_part("boots");
        let b = QueryKey::new("shoes").with_part("boots");
        let c = QueryKey::new("shoes").with_part("casual");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_parse() {
        let key = QueryKey::parse("shoes:running");
        assert_eq!(key.namespace(), "shoes");
        assert_eq!(key.parts(), ["running".to_string()]);
        assert_eq!(key, QueryKey::new("shoes").with_part("running"));
    }
}
