//! Built-in validation rules. A rule inspects one candidate value (already
//! filtered) and reports pass/fail; cross-field rules additionally receive
//! the full raw input. Empty values always pass — required-ness is the
//! form's concern, not the rule's.

mod boolean;
mod color;
mod email;
mod equals;
mod options;
pub(crate) mod tel;
mod url;

pub use boolean::BooleanRule;
pub use color::ColorRule;
pub use email::EmailRule;
pub use equals::EqualsRule;
pub use options::OptionsRule;
pub use tel::TelRule;
pub use url::UrlRule;

use serde_json::Value;

use crate::error::FormResult;
use crate::registry::TypeRegistry;
use crate::schema::FieldNode;

pub trait Rule: Send + Sync {
    /// `Ok(false)` is a validation failure; `Err` is reserved for rule
    /// misuse such as a missing cross-field reference.
    fn test(
        &self,
        field: &FieldNode,
        value: &Value,
        group: Option<&str>,
        input: Option<&Value>,
    ) -> FormResult<bool>;
}

impl TypeRegistry<dyn Rule> {
    /// A registry pre-populated with every built-in rule.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("boolean", || Box::new(BooleanRule));
        registry.register("email", || Box::new(EmailRule));
        registry.register("equals", || Box::new(EqualsRule));
        registry.register("options", || Box::new(OptionsRule));
        registry.register("color", || Box::new(ColorRule));
        registry.register("tel", || Box::new(TelRule));
        registry.register("url", || Box::new(UrlRule));
        registry
    }
}
