//! Catalog filtering and sorting.
//!
//! [`apply`] is a pure function of the product list, the criteria, and the
//! active language. Stages run in a fixed order, each narrowing the output
//! of the previous one:
//!
//! 1. search text
//! 2. category labels (in the active language)
//! 3. inclusive price range
//! 4. new arrivals only
//! 5. in-stock only
//! 6. stable sort

use core::fmt;

use diwan_core::{Language, Price, Product};
use serde::{Deserialize, Serialize};

/// Upper bound of the default price slider.
pub const DEFAULT_MAX_PRICE: u32 = 3000;

/// Listing sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    /// Featured products first, otherwise catalog order.
    #[default]
    Featured,
    PriceAsc,
    PriceDesc,
    /// New arrivals first, otherwise catalog order.
    Newest,
}

impl SortKey {
    /// Query-string spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Featured => "featured",
            Self::PriceAsc => "price-asc",
            Self::PriceDesc => "price-desc",
            Self::Newest => "newest",
        }
    }

    /// Parse a query-string value, also accepting the legacy
    /// `price-low-high` / `price-high-low` spellings.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "featured" => Some(Self::Featured),
            "price-asc" | "price-low-high" => Some(Self::PriceAsc),
            "price-desc" | "price-high-low" => Some(Self::PriceDesc),
            "newest" => Some(Self::Newest),
            _ => None,
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inclusive price bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: Price,
    pub max: Price,
}

impl PriceRange {
    #[must_use]
    pub const fn new(min: Price, max: Price) -> Self {
        Self { min, max }
    }

    #[must_use]
    pub fn contains(&self, price: Price) -> bool {
        self.min <= price && price <= self.max
    }
}

impl Default for PriceRange {
    fn default() -> Self {
        Self::new(Price::ZERO, Price::from_units(DEFAULT_MAX_PRICE))
    }
}

/// The combined search, filter, and sort parameters of a listing.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriteria {
    pub search: String,
    /// Selected category labels; empty means every category.
    pub categories: Vec<String>,
    pub price_range: PriceRange,
    pub new_only: bool,
    pub in_stock_only: bool,
    pub sort: SortKey,
}

/// Filter and sort `products` according to `criteria`.
#[must_use]
pub fn apply<'a>(
    products: &'a [Product],
    criteria: &FilterCriteria,
    language: Language,
) -> Vec<&'a Product> {
    let needle = SearchNeedle::new(&criteria.search);

    let mut matched: Vec<&Product> = products
        .iter()
        .filter(|product| needle.matches(product))
        .filter(|product| matches_category(product, &criteria.categories, language))
        .filter(|product| criteria.price_range.contains(product.price))
        .filter(|product| !criteria.new_only || product.is_new)
        .filter(|product| !criteria.in_stock_only || product.in_stock)
        .collect();

    sort(&mut matched, criteria.sort);
    matched
}

/// Stable in-place sort by `key`.
pub fn sort(products: &mut [&Product], key: SortKey) {
    match key {
        SortKey::Featured => products.sort_by_key(|product| !product.featured),
        SortKey::Newest => products.sort_by_key(|product| !product.is_new),
        SortKey::PriceAsc => products.sort_by_key(|product| product.price),
        SortKey::PriceDesc => products.sort_by(|a, b| b.price.cmp(&a.price)),
    }
}

/// Pre-folded search text, matched as typed (spaces included).
struct SearchNeedle<'a> {
    raw: &'a str,
    folded: String,
}

impl<'a> SearchNeedle<'a> {
    fn new(raw: &'a str) -> Self {
        Self {
            raw,
            folded: raw.to_lowercase(),
        }
    }

    /// English fields match case-insensitively; Arabic has no case, so its
    /// fields match the text as typed.
    fn matches(&self, product: &Product) -> bool {
        if self.raw.is_empty() {
            return true;
        }
        product.name.en.to_lowercase().contains(&self.folded)
            || product.name.ar.contains(self.raw)
            || product.description.en.to_lowercase().contains(&self.folded)
            || product.description.ar.contains(self.raw)
    }
}

fn matches_category(product: &Product, categories: &[String], language: Language) -> bool {
    categories.is_empty()
        || categories
            .iter()
            .any(|label| label == product.category_label(language))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;

    fn ids(products: &[&Product]) -> Vec<String> {
        products.iter().map(|p| p.id.to_string()).collect()
    }

    fn run(criteria: &FilterCriteria, language: Language) -> Vec<String> {
        let catalog = Catalog::sample().unwrap();
        ids(&apply(catalog.products(), criteria, language))
    }

    #[test]
    fn test_default_criteria_keeps_all_featured_first() {
        let result = run(&FilterCriteria::default(), Language::En);
        assert_eq!(result, vec!["1", "2", "3", "5", "4", "6"]);
    }

    #[test]
    fn test_price_range_scenario() {
        let criteria = FilterCriteria {
            price_range: PriceRange::new(Price::from_units(1000), Price::from_units(2000)),
            ..FilterCriteria::default()
        };
        assert_eq!(run(&criteria, Language::En), vec!["2", "5", "4"]);
    }

    #[test]
    fn test_price_bounds_are_inclusive() {
        let criteria = FilterCriteria {
            price_range: PriceRange::new(Price::from_units(799), Price::from_units(1299)),
            sort: SortKey::PriceAsc,
            ..FilterCriteria::default()
        };
        assert_eq!(run(&criteria, Language::En), vec!["1", "2"]);
    }

    #[test]
    fn test_search_english_is_case_insensitive() {
        let criteria = FilterCriteria {
            search: "MOROCCAN".to_owned(),
            ..FilterCriteria::default()
        };
        assert_eq!(run(&criteria, Language::En), vec!["2", "5"]);
    }

    #[test]
    fn test_search_matches_arabic_fields() {
        let criteria = FilterCriteria {
            search: "دمشق".to_owned(),
            ..FilterCriteria::default()
        };
        assert_eq!(run(&criteria, Language::Ar), vec!["4"]);
    }

    #[test]
    fn test_search_without_matches_is_empty() {
        let criteria = FilterCriteria {
            search: "hammock".to_owned(),
            ..FilterCriteria::default()
        };
        assert!(run(&criteria, Language::En).is_empty());
    }

    #[test]
    fn test_search_is_not_trimmed() {
        let search = |text: &str| FilterCriteria {
            search: text.to_owned(),
            ..FilterCriteria::default()
        };
        assert_eq!(run(&search("   "), Language::En), Vec::<String>::new());
        assert_eq!(run(&search(" bookshelf"), Language::En), vec!["5"]);
        assert_eq!(run(&search(" "), Language::En).len(), 6);
    }

    #[test]
    fn test_category_uses_active_language() {
        let criteria = FilterCriteria {
            categories: vec!["Chairs".to_owned(), "Outdoor".to_owned()],
            ..FilterCriteria::default()
        };
        assert_eq!(run(&criteria, Language::En), vec!["1", "6"]);
        assert!(run(&criteria, Language::Ar).is_empty());

        let arabic = FilterCriteria {
            categories: vec!["كراسي".to_owned()],
            ..FilterCriteria::default()
        };
        assert_eq!(run(&arabic, Language::Ar), vec!["1"]);
    }

    #[test]
    fn test_flags() {
        let new_only = FilterCriteria {
            new_only: true,
            ..FilterCriteria::default()
        };
        assert_eq!(run(&new_only, Language::En), vec!["1", "3", "6"]);

        let in_stock = FilterCriteria {
            in_stock_only: true,
            ..FilterCriteria::default()
        };
        assert!(!run(&in_stock, Language::En).contains(&"4".to_owned()));
    }

    #[test]
    fn test_price_sorts() {
        let asc = FilterCriteria {
            sort: SortKey::PriceAsc,
            ..FilterCriteria::default()
        };
        assert_eq!(run(&asc, Language::En), vec!["1", "2", "5", "4", "6", "3"]);

        let desc = FilterCriteria {
            sort: SortKey::PriceDesc,
            ..FilterCriteria::default()
        };
        assert_eq!(run(&desc, Language::En), vec!["3", "6", "4", "5", "2", "1"]);
    }

    #[test]
    fn test_newest_is_a_stable_partition() {
        let criteria = FilterCriteria {
            sort: SortKey::Newest,
            ..FilterCriteria::default()
        };
        assert_eq!(run(&criteria, Language::En), vec!["1", "3", "6", "2", "4", "5"]);
    }

    #[test]
    fn test_featured_sort_keeps_non_featured_order() {
        let catalog = Catalog::sample().unwrap();
        let mut reversed: Vec<&Product> = catalog.products().iter().rev().collect();
        sort(&mut reversed, SortKey::Featured);
        // Non-featured 6 precedes 4 in the reversed input and must stay so.
        assert_eq!(ids(&reversed), vec!["5", "3", "2", "1", "6", "4"]);
    }

    #[test]
    fn test_stage_order_does_not_change_outcome() {
        let catalog = Catalog::sample().unwrap();
        let criteria = FilterCriteria {
            search: "patterns".to_owned(),
            categories: vec!["Chairs".to_owned(), "Storage".to_owned(), "Bedroom".to_owned()],
            price_range: PriceRange::new(Price::from_units(500), Price::from_units(2000)),
            new_only: false,
            in_stock_only: true,
            sort: SortKey::Featured,
        };
        let needle = SearchNeedle::new(&criteria.search);
        let stages: [&dyn Fn(&Product) -> bool; 4] = [
            &|p| needle.matches(p),
            &|p| matches_category(p, &criteria.categories, Language::En),
            &|p| criteria.price_range.contains(p.price),
            &|p| p.in_stock,
        ];

        let canonical = ids(&apply(catalog.products(), &criteria, Language::En));
        for order in [[0, 1, 2, 3], [3, 2, 1, 0], [2, 0, 3, 1], [1, 3, 0, 2]] {
            let mut products: Vec<&Product> = catalog.products().iter().collect();
            for stage in order {
                products.retain(|p| stages[stage](p));
            }
            sort(&mut products, criteria.sort);
            assert_eq!(ids(&products), canonical);
        }
        assert_eq!(canonical, vec!["1", "5"]);
    }

    #[test]
    fn test_sort_key_parse() {
        assert_eq!(SortKey::parse("price-low-high"), Some(SortKey::PriceAsc));
        assert_eq!(SortKey::parse("price-desc"), Some(SortKey::PriceDesc));
        assert_eq!(SortKey::parse("random"), None);
        assert_eq!(SortKey::Newest.to_string(), "newest");
    }
}
