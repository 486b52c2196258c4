//! Shoe products and the fixed backing catalog.

use serde::{Deserialize, Serialize};

use crate::filter::ShoeFilter;

const CATEGORIES: [&str; 3] = ["Running", "Casual", "Boots"];

const BRANDS: [&str; 6] = ["Nike", "Adidas", "New Balance", "Puma", "Asics", "Timberland"];

const COLORS: [&str; 7] = ["Black", "White", "Red", "Blue", "Grey", "Green", "Brown"];

const RUNNING_MODELS: [&str; 5] = ["Air Zoom", "Ultraboost", "Fresh Foam", "Gel-Nimbus", "Velocity"];
const CASUAL_MODELS: [&str; 5] = ["Court Classic", "Old Skool", "Chuck 70", "Suede", "Club C"];
const BOOT_MODELS: [&str; 5] = ["Trail Ranger", "6-Inch Premium", "Summit Hiker", "Chelsea", "Work Pro"];

/// A shoe in the catalog.
///
/// Immutable once fetched; pages hand out clones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShoeProduct {
    /// Unique product identifier.
    pub id: u32,
    /// Display name.
    pub name: String,
    /// Brand name.
    pub brand: String,
    /// Category (Running, Casual, Boots).
    pub category: String,
    /// Primary color.
    pub color: String,
    /// Price in dollars.
    pub price: f64,
    /// Whether the shoe can be ordered.
    pub in_stock: bool,
}

impl ShoeProduct {
    /// Build the product at `index` of a generated catalog.
    fn generated(index: usize) -> Self {
        let category = CATEGORIES[index % CATEGORIES.len()];
        let round = index / CATEGORIES.len();
        let brand = BRANDS[round % BRANDS.len()];
        let model = match category {
            "Running" => RUNNING_MODELS[round % RUNNING_MODELS.len()],
            "Casual" => CASUAL_MODELS[round % CASUAL_MODELS.len()],
            _ => BOOT_MODELS[round % BOOT_MODELS.len()],
        };

        Self {
            id: index as u32 + 1,
            name: format!("{} {}", brand, model),
            brand: brand.to_string(),
            category: category.to_string(),
            color: COLORS[(index * 3) % COLORS.len()].to_string(),
            price: 49.99 + ((index * 37) % 150) as f64,
            in_stock: index % 5 != 3,
        }
    }

    /// Price formatted for display.
    pub fn display_price(&self) -> String {
        format!("${:.2}", self.price)
    }
}

/// The fixed collection of items that pages are sliced from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    items: Vec<ShoeProduct>,
}

impl Catalog {
    /// Generate a deterministic catalog of `count` shoes.
    ///
    /// The same count always yields the same products in the same order.
    pub fn generate(count: usize) -> Self {
        Self {
            items: (0..count).map(ShoeProduct::generated).collect(),
        }
    }

    /// Wrap an existing list of products.
    pub fn from_items(items: Vec<ShoeProduct>) -> Self {
        Self { items }
    }

    /// All products in catalog order.
    pub fn items(&self) -> &[ShoeProduct] {
        &self.items
    }

    /// Products matching a filter, in catalog order.
    pub fn filtered(&self, filter: ShoeFilter) -> Vec<ShoeProduct> {
        self.items
            .iter()
            .filter(|item| filter.matches(item))
            .cloned()
            .collect()
    }

    /// Number of products.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_is_deterministic() {
        assert_eq!(Catalog::generate(40), Catalog::generate(40));
    }

    #[test]
    fn test_generated_ids_are_sequential() {
        let catalog = Catalog::generate(25);
        let ids: Vec<u32> = catalog.items().iter().map(|s| s.id).collect();
        assert_eq!(ids, (1..=25).collect::<Vec<_>>());
    }

    #[test]
    fn test_generated_categories_cycle() {
        let catalog = Catalog::generate(6);
        let categories: Vec<&str> = catalog.items().iter().map(|s| s.category.as_str()).collect();
        assert_eq!(
            categories,
            vec!["Running", "Casual", "Boots", "Running", "Casual", "Boots"]
        );
    }

    #[test]
    fn test_generated_name_includes_brand() {
        let catalog = Catalog::generate(1);
        let shoe = &catalog.items()[0];
        assert_eq!(shoe.name, "Nike Air Zoom");
        assert_eq!(shoe.display_price(), "$49.99");
        assert!(shoe.in_stock);
    }

    #[test]
    fn test_serializes_camel_case() {
        let catalog = Catalog::generate(1);
        let shoe = &catalog.items()[0];
        let json = serde_json::to_value(shoe).unwrap();
        assert_eq!(json["inStock"], serde_json::json!(true));
        assert!(json.get("in_stock").is_none());
    }

    #[test]
    fn test_filtered_keeps_order() {
        let catalog = Catalog::generate(9);
        let boots = catalog.filtered(ShoeFilter::Boots);
        let ids: Vec<u32> = boots.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![3, 6, 9]);
    }
}
