use garde::Validate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

use crate::models::credentials::Credentials;
use crate::models::validation::FieldErrors;

/// Amazon product categories the backend knows how to search.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display,
    EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Category {
    Electronics,
    Home,
    Fashion,
    Health,
    Beauty,
    Sports,
    Toys,
    Books,
}

impl Category {
    pub fn all() -> impl Iterator<Item = Category> {
        Category::iter()
    }

    /// Categories pre-selected on the landing form.
    pub fn defaults() -> BTreeSet<Category> {
        [
            Category::Electronics,
            Category::Home,
            Category::Fashion,
            Category::Health,
        ]
        .into_iter()
        .collect()
    }
}

/// Product filters and posting cadence for one automation run.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct AutomationConfig {
    #[garde(length(min = 1))]
    pub categories: BTreeSet<Category>,

    #[garde(range(min = 1, max = 50))]
    pub max_products_per_category: u32,

    #[garde(range(min = 60, max = 86_400))]
    pub post_interval_seconds: u32,

    #[garde(range(min = 1, max = 500))]
    pub daily_pin_limit: u32,

    #[garde(range(min = 0.0, max = 5.0))]
    pub min_rating: f64,

    #[garde(skip)]
    pub min_reviews: u32,

    #[garde(range(min = 0.0))]
    pub price_range_min: f64,

    #[garde(range(min = 0.0))]
    pub price_range_max: f64,
}

impl Default for AutomationConfig {
    fn default() -> Self {
        Self {
            categories: Category::defaults(),
            max_products_per_category: 5,
            post_interval_seconds: 300,
            daily_pin_limit: 50,
            min_rating: 4.0,
            min_reviews: 10,
            price_range_min: 5.0,
            price_range_max: 500.0,
        }
    }
}

impl AutomationConfig {
    /// Field rules plus the cross-field price range check.
    pub fn check(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        // Range rules compare with `<`/`>`, which NaN passes.
        for (field, value) in [
            ("min_rating", self.min_rating),
            ("price_range_min", self.price_range_min),
            ("price_range_max", self.price_range_max),
        ] {
            if !value.is_finite() {
                errors.insert(field, "must be a finite number");
            }
        }
        if let Err(report) = self.validate() {
            errors.extend_report(&report);
        }
        if self.price_range_min > self.price_range_max {
            errors.insert(
                "price_range_max",
                "maximum price must not be below the minimum price",
            );
        }
        errors.into_result()
    }
}

/// Body of `POST /api/start-automation`.
#[derive(Debug, Clone, Serialize)]
pub struct StartAutomationRequest<'a> {
    pub credentials: &'a Credentials,
    pub config: &'a AutomationConfig,
}

/// Reply to `POST /api/start-automation`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AutomationStarted {
    pub job_id: String,
    pub status: String,
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_landing_form() {
        let config = AutomationConfig::default();
        let categories: Vec<String> = config.categories.iter().map(|c| c.to_string()).collect();
        assert_eq!(categories, vec!["electronics", "home", "fashion", "health"]);
        assert_eq!(config.max_products_per_category, 5);
        assert_eq!(config.post_interval_seconds, 300);
        assert_eq!(config.daily_pin_limit, 50);
        assert_eq!(config.min_rating, 4.0);
        assert_eq!(config.min_reviews, 10);
        assert_eq!(config.price_range_min, 5.0);
        assert_eq!(config.price_range_max, 500.0);
        assert!(config.check().is_ok());
    }

    #[test]
    fn default_config_serializes_to_backend_shape() {
        let value = serde_json::to_value(AutomationConfig::default()).unwrap();
        assert_eq!(
            value["categories"],
            serde_json::json!(["electronics", "home", "fashion", "health"])
        );
        assert_eq!(value["post_interval_seconds"], 300);
        assert_eq!(value["min_rating"], 4.0);
    }

    #[test]
    fn empty_categories_rejected() {
        let config = AutomationConfig {
            categories: BTreeSet::new(),
            ..AutomationConfig::default()
        };
        let errors = config.check().unwrap_err();
        assert!(errors.contains("categories"));
    }

    #[test]
    fn inverted_price_range_rejected() {
        let config = AutomationConfig {
            price_range_min: 100.0,
            price_range_max: 10.0,
            ..AutomationConfig::default()
        };
        let errors = config.check().unwrap_err();
        assert!(errors.contains("price_range_max"));
    }

    #[test]
    fn out_of_range_values_rejected() {
        let config = AutomationConfig {
            min_rating: 7.5,
            daily_pin_limit: 0,
            ..AutomationConfig::default()
        };
        let errors = config.check().unwrap_err();
        assert!(errors.contains("min_rating"));
        assert!(errors.contains("daily_pin_limit"));
    }

    #[test]
    fn non_finite_numbers_rejected() {
        let config = AutomationConfig {
            min_rating: f64::NAN,
            price_range_max: f64::NAN,
            ..AutomationConfig::default()
        };
        let errors = config.check().unwrap_err();
        assert!(errors.contains("min_rating"));
        assert!(errors.contains("price_range_max"));
        assert!(!errors.contains("price_range_min"));

        let unbounded = AutomationConfig {
            price_range_max: f64::INFINITY,
            ..AutomationConfig::default()
        };
        assert!(unbounded.check().unwrap_err().contains("price_range_max"));
    }

    #[test]
    fn category_parses_from_lowercase() {
        assert_eq!("toys".parse::<Category>().unwrap(), Category::Toys);
        assert_eq!(Category::all().count(), 8);
    }
}
