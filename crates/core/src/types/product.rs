//! Catalog product records.
//!
//! Products are immutable once loaded. Field names serialize in camelCase so
//! catalog files and persisted carts written by earlier storefront releases
//! (`inStock`, `isNew`) still deserialize.

use serde::{Deserialize, Serialize};

use super::{Language, Localized, Price, ProductId};

/// Physical dimensions of a furniture piece.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
    pub depth: f64,
    /// Unit label, e.g. `cm`.
    pub unit: String,
}

/// A furniture product offered by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: Localized<String>,
    pub description: Localized<String>,
    pub price: Price,
    pub category: Localized<String>,
    /// Image references, primary image first.
    #[serde(default)]
    pub images: Vec<String>,
    pub in_stock: bool,
    pub featured: bool,
    pub is_new: bool,
    /// Hex color tokens the piece is available in.
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub materials: Localized<Vec<String>>,
    pub dimensions: Dimensions,
}

impl Product {
    /// Category label in the given language.
    #[must_use]
    pub fn category_label(&self, language: Language) -> &str {
        self.category.get(language)
    }

    /// Display name in the given language.
    #[must_use]
    pub fn display_name(&self, language: Language) -> &str {
        self.name.get(language)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const CHAIR_JSON: &str = r##"{
        "id": "1",
        "name": { "en": "Arabesque Lounge Chair", "ar": "كرسي استرخاء أرابيسك" },
        "description": { "en": "Elegant lounge chair", "ar": "كرسي استرخاء أنيق" },
        "price": 799,
        "category": { "en": "Chairs", "ar": "كراسي" },
        "images": ["/placeholder.svg"],
        "inStock": true,
        "featured": true,
        "isNew": true,
        "colors": ["#8E2C48"],
        "materials": { "en": ["Oak wood"], "ar": ["خشب البلوط"] },
        "dimensions": { "width": 75, "height": 85, "depth": 80, "unit": "cm" }
    }"##;

    #[test]
    fn test_deserializes_catalog_record() {
        let product: Product = serde_json::from_str(CHAIR_JSON).unwrap();
        assert_eq!(product.id, ProductId::new("1"));
        assert_eq!(product.price, Price::from_units(799));
        assert!(product.in_stock && product.featured && product.is_new);
        assert_eq!(product.category_label(Language::Ar), "كراسي");
        assert_eq!(product.display_name(Language::En), "Arabesque Lounge Chair");
        assert!((product.dimensions.width - 75.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_serializes_camel_case_flags() {
        let product: Product = serde_json::from_str(CHAIR_JSON).unwrap();
        let value = serde_json::to_value(&product).unwrap();
        assert_eq!(value["inStock"], true);
        assert_eq!(value["isNew"], true);
        assert!(value.get("in_stock").is_none());
    }
}
