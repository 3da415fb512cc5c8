use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::patch::Patch;
use crate::api::validate::{FieldErrors, Validate};

/// Persisted product row, also the shape returned by every endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub price: f64,
}

/// Body of `POST /products/`
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProduct {
    pub name: String,
    pub category: String,
    pub price: f64,
}

/// Body of `PUT /products/{id}`; every field is optional
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProduct {
    #[serde(default)]
    pub name: Patch<String>,
    #[serde(default)]
    pub category: Patch<String>,
    #[serde(default)]
    pub price: Patch<f64>,
}

/// Query string of `GET /products/`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductQuery {
    pub name: Option<String>,
    pub category: Option<String>,
}

impl UpdateProduct {
    pub fn is_empty(&self) -> bool {
        self.name.is_absent() && self.category.is_absent() && self.price.is_absent()
    }

    pub fn apply_to(&self, product: &mut Product) {
        self.name.apply_to(&mut product.name);
        self.category.apply_to(&mut product.category);
        self.price.apply_to(&mut product.price);
    }
}

impl ProductQuery {
    /// Case-insensitive substring match on every filter that is set
    pub fn matches(&self, product: &Product) -> bool {
        fn contains(haystack: &str, needle: &Option<String>) -> bool {
            match needle {
                Some(n) => haystack.to_lowercase().contains(&n.to_lowercase()),
                None => true,
            }
        }

        contains(&product.name, &self.name) && contains(&product.category, &self.category)
    }
}

fn check_text(errors: &mut FieldErrors, field: &str, value: &str) {
    if value.trim().is_empty() {
        errors.insert(field.to_string(), "must not be blank".to_string());
    }
}

fn check_price(errors: &mut FieldErrors, value: f64) {
    if !value.is_finite() {
        errors.insert("price".to_string(), "must be a finite number".to_string());
    }
}

fn check_not_null<T>(errors: &mut FieldErrors, field: &str, value: &Patch<T>) {
    if matches!(value, Patch::Null) {
        errors.insert(field.to_string(), "may not be null".to_string());
    }
}

impl Validate for CreateProduct {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        check_text(&mut errors, "name", &self.name);
        check_text(&mut errors, "category", &self.category);
        check_price(&mut errors, self.price);

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

impl Validate for UpdateProduct {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        check_not_null(&mut errors, "name", &self.name);
        check_not_null(&mut errors, "category", &self.category);
        check_not_null(&mut errors, "price", &self.price);

        if let Some(name) = self.name.value() {
            check_text(&mut errors, "name", name);
        }
        if let Some(category) = self.category.value() {
            check_text(&mut errors, "category", category);
        }
        if let Some(price) = self.price.value() {
            check_price(&mut errors, *price);
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}
