//! Field-level validation rules
//!
//! Validation is deterministic and collects every failing field rather
//! than stopping at the first.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::types::{CreateRestaurant, CreateReview, RestaurantDetails};

/// One failed field check, reported back to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    pub field: String,
    pub message: String,
}

impl FieldIssue {
    pub fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

/// A request body with semantic rules beyond its shape.
pub trait Validate {
    fn validate(&self) -> Result<(), Vec<FieldIssue>>;
}

/// Deserializes and validates a request body in one step.
///
/// Shape failures (missing field, wrong type) report as a single issue on
/// `body`; rule failures report one issue per offending field.
pub fn parse_body<T>(body: &Value) -> Result<T, Vec<FieldIssue>>
where
    T: DeserializeOwned + Validate,
{
    let parsed: T = serde_json::from_value(body.clone())
        .map_err(|e| vec![FieldIssue::new("body", &e.to_string())])?;
    parsed.validate()?;
    Ok(parsed)
}

impl Validate for CreateRestaurant {
    fn validate(&self) -> Result<(), Vec<FieldIssue>> {
        let mut issues = Vec::new();
        if self.name.trim().is_empty() {
            issues.push(FieldIssue::new("name", "must not be empty"));
        }
        if self.location.trim().is_empty() {
            issues.push(FieldIssue::new("location", "must not be empty"));
        }
        for (i, cuisine) in self.cuisines.iter().enumerate() {
            if cuisine.trim().is_empty() {
                issues.push(FieldIssue::new(
                    &format!("cuisines[{i}]"),
                    "must not be empty",
                ));
            }
        }
        if issues.is_empty() {
            Ok(())
        } else {
            Err(issues)
        }
    }
}

impl Validate for RestaurantDetails {
    fn validate(&self) -> Result<(), Vec<FieldIssue>> {
        let mut issues = Vec::new();
        for (i, link) in self.links.iter().enumerate() {
            if link.name.trim().is_empty() {
                issues.push(FieldIssue::new(
                    &format!("links[{i}].name"),
                    "must not be empty",
                ));
            }
            if link.url.trim().is_empty() {
                issues.push(FieldIssue::new(
                    &format!("links[{i}].url"),
                    "must not be empty",
                ));
            }
        }
        if self.contact.phone.trim().is_empty() {
            issues.push(FieldIssue::new("contact.phone", "must not be empty"));
        }
        if !is_email(&self.contact.email) {
            issues.push(FieldIssue::new("contact.email", "must be an email address"));
        }
        if issues.is_empty() {
            Ok(())
        } else {
            Err(issues)
        }
    }
}

impl Validate for CreateReview {
    fn validate(&self) -> Result<(), Vec<FieldIssue>> {
        let mut issues = Vec::new();
        if self.review.trim().is_empty() {
            issues.push(FieldIssue::new("review", "must not be empty"));
        }
        if !(1.0..=5.0).contains(&self.rating) {
            issues.push(FieldIssue::new("rating", "must be between 1 and 5"));
        }
        if issues.is_empty() {
            Ok(())
        } else {
            Err(issues)
        }
    }
}

fn is_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty(),
        None => false,
    }
}
