use std::fmt::{Display, Formatter};

/// Recoverable engine errors. Validation outcomes are not errors; they are
/// carried as [`ValidationFailure`] values so callers can aggregate them.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum FormError {
    Parse(String),
    NotLoaded,
    UnknownGroup(String),
    FileNotFound(String),
    Bind(String),
    Rule(String),
}

impl Display for FormError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FormError::Parse(detail) => write!(f, "failed to parse form schema: {detail}"),
            FormError::NotLoaded => f.write_str("no form schema has been loaded"),
            FormError::UnknownGroup(group) => write!(f, "unknown field group: {group}"),
            FormError::FileNotFound(name) => {
                write!(f, "form file not found on any registered path: {name}")
            }
            FormError::Bind(detail) => write!(f, "failed to bind form data: {detail}"),
            FormError::Rule(detail) => write!(f, "validation rule misuse: {detail}"),
        }
    }
}

impl std::error::Error for FormError {}

pub type FormResult<T> = Result<T, FormError>;

/// One field's validation outcome when it did not pass. Collected by
/// `Form::validate`, surfaced through `Form::get_errors`.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum ValidationFailure {
    /// The field is marked required and the candidate value was empty.
    Required { field: String, group: Option<String> },
    /// The declared rule evaluated the value and rejected it.
    Rule { field: String, rule: String },
    /// The declared rule name did not resolve to any registered rule.
    UnknownRule { field: String, rule: String },
}

impl ValidationFailure {
    pub fn field(&self) -> &str {
        match self {
            ValidationFailure::Required { field, .. }
            | ValidationFailure::Rule { field, .. }
            | ValidationFailure::UnknownRule { field, .. } => field,
        }
    }

    pub fn message(&self) -> String {
        match self {
            ValidationFailure::Required { field, group } => match group {
                Some(group) => format!("required field {group}.{field} has no value"),
                None => format!("required field {field} has no value"),
            },
            ValidationFailure::Rule { field, rule } => {
                format!("field {field} failed the {rule} rule")
            }
            ValidationFailure::UnknownRule { field, rule } => {
                format!("field {field} declares an unexpected validation rule: {rule}")
            }
        }
    }
}

impl Display for ValidationFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message())
    }
}
