//! Category filters.

use serde::{Deserialize, Serialize};

use crate::item::ShoeProduct;

/// Category filter applied to list and paged queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShoeFilter {
    /// No filtering.
    #[default]
    All,
    /// Running shoes.
    Running,
    /// Casual shoes.
    Casual,
    /// Boots.
    Boots,
}

impl ShoeFilter {
    /// Parse a filter, falling back to `All` for unknown values.
    pub fn from_str(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "running" => Self::Running,
            "casual" => Self::Casual,
            "boots" => Self::Boots,
            _ => Self::All,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Running => "running",
            Self::Casual => "casual",
            Self::Boots => "boots",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::All => "All Shoes",
            Self::Running => "Running",
            Self::Casual => "Casual",
            Self::Boots => "Boots",
        }
    }

    /// Every filter, in display order.
    pub fn all() -> [Self; 4] {
        [Self::All, Self::Running, Self::Casual, Self::Boots]
    }

    /// Check if a product passes this filter.
    pub fn matches(&self, item: &ShoeProduct) -> bool {
        match self {
            Self::All => true,
            other => item.category.eq_ignore_ascii_case(other.as_str()),
        }
    }
}

impl std::fmt::Display for ShoeFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::Catalog;

    #[test]
    fn test_from_str() {
        assert_eq!(ShoeFilter::from_str("Running"), ShoeFilter::Running);
        assert_eq!(ShoeFilter::from_str(" boots "), ShoeFilter::Boots);
        assert_eq!(ShoeFilter::from_str("sandals"), ShoeFilter::All);
        assert_eq!(ShoeFilter::from_str(""), ShoeFilter::All);
    }

    #[test]
    fn test_matches() {
        let catalog = Catalog::generate(3);
        let running = &catalog.items()[0];
        assert!(ShoeFilter::All.matches(running));
        assert!(ShoeFilter::Running.matches(running));
        assert!(!ShoeFilter::Casual.matches(running));
    }

    #[test]
    fn test_as_str_round_trips_through_from_str() {
        for filter in ShoeFilter::all() {
            assert_eq!(ShoeFilter::from_str(filter.as_str()), filter);
        }
    }
}
