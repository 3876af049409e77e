//! URL query synchronization for catalog listings.
//!
//! A listing URL such as `/api/products?category=Chairs&new=true&sort=newest`
//! hydrates a [`FilterCriteria`]; the criteria can be written back into a
//! canonical query string so a listing stays shareable.

use diwan_core::Price;
use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use super::filter::{FilterCriteria, PriceRange, SortKey};

/// Raw listing query parameters.
///
/// Every field is kept as a string so a malformed value degrades to the
/// default instead of rejecting the whole request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogQuery {
    /// Category label, or several joined with commas.
    pub category: Option<String>,
    pub new: Option<String>,
    pub in_stock: Option<String>,
    pub sort: Option<String>,
    pub search: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
}

impl CatalogQuery {
    /// Parse a raw query string (with or without the leading `?`).
    ///
    /// Unknown parameters are ignored; when a parameter repeats, the first
    /// value wins.
    #[must_use]
    pub fn parse(query: &str) -> Self {
        let mut parsed = Self::default();
        for (name, value) in form_urlencoded::parse(query.trim_start_matches('?').as_bytes()) {
            let slot = match name.as_ref() {
                "category" => &mut parsed.category,
                "new" => &mut parsed.new,
                "inStock" => &mut parsed.in_stock,
                "sort" => &mut parsed.sort,
                "search" => &mut parsed.search,
                "minPrice" => &mut parsed.min_price,
                "maxPrice" => &mut parsed.max_price,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }
        parsed
    }

    /// Hydrate filter criteria from the query.
    #[must_use]
    pub fn into_criteria(self) -> FilterCriteria {
        let defaults = PriceRange::default();

        let categories = self
            .category
            .as_deref()
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|label| !label.is_empty())
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default();

        let sort = self.sort.as_deref().map_or(SortKey::Featured, |value| {
            SortKey::parse(value).unwrap_or_else(|| {
                tracing::debug!(sort = value, "Unknown sort key, using featured");
                SortKey::Featured
            })
        });

        FilterCriteria {
            search: self.search.unwrap_or_default(),
            categories,
            price_range: PriceRange::new(
                parse_price(self.min_price.as_deref()).unwrap_or(defaults.min),
                parse_price(self.max_price.as_deref()).unwrap_or(defaults.max),
            ),
            new_only: is_true(self.new.as_deref()),
            in_stock_only: is_true(self.in_stock.as_deref()),
            sort,
        }
    }

    /// Build the canonical query for `criteria`, omitting default values.
    #[must_use]
    pub fn from_criteria(criteria: &FilterCriteria) -> Self {
        let defaults = PriceRange::default();

        Self {
            category: (!criteria.categories.is_empty()).then(|| criteria.categories.join(",")),
            new: criteria.new_only.then(|| "true".to_owned()),
            in_stock: criteria.in_stock_only.then(|| "true".to_owned()),
            sort: (criteria.sort != SortKey::Featured).then(|| criteria.sort.as_str().to_owned()),
            search: (!criteria.search.is_empty()).then(|| criteria.search.clone()),
            min_price: (criteria.price_range.min != defaults.min)
                .then(|| criteria.price_range.min.to_string()),
            max_price: (criteria.price_range.max != defaults.max)
                .then(|| criteria.price_range.max.to_string()),
        }
    }

    /// Encode as `application/x-www-form-urlencoded`, without a leading `?`.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        let pairs = [
            ("category", &self.category),
            ("new", &self.new),
            ("inStock", &self.in_stock),
            ("sort", &self.sort),
            ("search", &self.search),
            ("minPrice", &self.min_price),
            ("maxPrice", &self.max_price),
        ];

        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (name, value) in pairs {
            if let Some(value) = value {
                serializer.append_pair(name, value);
            }
        }
        serializer.finish()
    }
}

fn is_true(value: Option<&str>) -> bool {
    value == Some("true")
}

fn parse_price(value: Option<&str>) -> Option<Price> {
    value.and_then(|raw| raw.parse().ok())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ignores_unknown_and_keeps_first() {
        let query = CatalogQuery::parse("?sort=newest&utm_source=mail&sort=price-asc");
        assert_eq!(query.sort.as_deref(), Some("newest"));
        assert_eq!(query.category, None);
    }

    #[test]
    fn test_deserializes_camel_case_params() {
        let query: CatalogQuery =
            serde_json::from_str(r#"{"inStock": "true", "maxPrice": "900"}"#).unwrap();
        let criteria = query.into_criteria();
        assert!(criteria.in_stock_only);
        assert_eq!(criteria.price_range.max, Price::from_units(900));
    }

    #[test]
    fn test_empty_query_is_default_criteria() {
        assert_eq!(CatalogQuery::default().into_criteria(), FilterCriteria::default());
    }

    #[test]
    fn test_hydrates_flags_and_category() {
        let criteria =
            CatalogQuery::parse("category=Chairs&new=true&inStock=true&sort=newest").into_criteria();
        assert_eq!(criteria.categories, vec!["Chairs"]);
        assert!(criteria.new_only);
        assert!(criteria.in_stock_only);
        assert_eq!(criteria.sort, SortKey::Newest);
    }

    #[test]
    fn test_flags_require_literal_true() {
        let criteria = CatalogQuery::parse("new=1&inStock=yes").into_criteria();
        assert!(!criteria.new_only);
        assert!(!criteria.in_stock_only);
    }

    #[test]
    fn test_unknown_sort_falls_back_to_featured() {
        assert_eq!(
            CatalogQuery::parse("sort=random").into_criteria().sort,
            SortKey::Featured
        );
        assert_eq!(
            CatalogQuery::parse("sort=price-high-low").into_criteria().sort,
            SortKey::PriceDesc
        );
    }

    #[test]
    fn test_invalid_prices_use_defaults() {
        let criteria = CatalogQuery::parse("minPrice=-5&maxPrice=abc").into_criteria();
        assert_eq!(criteria.price_range, PriceRange::default());

        let criteria = CatalogQuery::parse("minPrice=1000&maxPrice=2000").into_criteria();
        assert_eq!(criteria.price_range.min, Price::from_units(1000));
        assert_eq!(criteria.price_range.max, Price::from_units(2000));
    }

    #[test]
    fn test_search_keeps_surrounding_spaces() {
        let criteria = CatalogQuery::parse("search=%20bookshelf").into_criteria();
        assert_eq!(criteria.search, " bookshelf");
        assert_eq!(
            CatalogQuery::from_criteria(&criteria).to_query_string(),
            "search=+bookshelf"
        );
    }

    #[test]
    fn test_default_criteria_serializes_empty() {
        let query = CatalogQuery::from_criteria(&FilterCriteria::default());
        assert_eq!(query.to_query_string(), "");
    }

    #[test]
    fn test_query_string_round_trips_arabic_search() {
        let criteria = FilterCriteria {
            search: "كرسي".to_owned(),
            categories: vec!["كراسي".to_owned()],
            sort: SortKey::PriceAsc,
            ..FilterCriteria::default()
        };
        let encoded = CatalogQuery::from_criteria(&criteria).to_query_string();
        assert!(encoded.contains("sort=price-asc"));
        assert!(!encoded.contains("new="));
        assert_eq!(CatalogQuery::parse(&encoded).into_criteria(), criteria);
    }
}
