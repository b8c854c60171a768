pub mod data;
pub mod definition;
pub mod document;
pub mod error;
pub mod fields;
pub mod filters;
pub mod html;
pub mod i18n;
pub mod paths;
pub mod registry;
pub mod rules;
pub mod schema;

pub use definition::FieldDefinition;
pub use document::{Form, FormOptions};
pub use error::{FormError, FormResult, ValidationFailure};
