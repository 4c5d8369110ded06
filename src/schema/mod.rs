//! Request body schemas and validation
//!
//! Typed request bodies with field-level validation rules, checked before
//! any handler logic runs. A failed check responds 400 with one issue per
//! offending field.

mod types;
mod validator;

pub use types::{Contact, CreateRestaurant, CreateReview, Link, RestaurantDetails};
pub use validator::{parse_body, FieldIssue, Validate};
