use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

use super::Rule;
use crate::data::{value_is_empty, value_to_string};
use crate::error::FormResult;
use crate::schema::FieldNode;

/// North American Numbering Plan notation, optionally with a leading
/// country code: `1 (202) 555-5555`.
pub(crate) fn nanp_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?:\+?1[-. ]?)?\(?([2-9][0-8][0-9])\)?[-. ]?([2-9][0-9]{2})[-. ]?([0-9]{4})$")
            .unwrap_or_else(|_| unreachable!("static pattern"))
    })
}

/// ITU-T E.123 international notation: `+`, then 7 to 15 digits with
/// optional space grouping.
pub(crate) fn itu_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\+(?:[0-9] ?){6,14}[0-9]$").unwrap_or_else(|_| unreachable!("static pattern"))
    })
}

/// EPP notation: `+ccc.nnnnnnn` with an optional `x` extension.
pub(crate) fn epp_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\+[0-9]{1,3}\.[0-9]{4,14}(?:x.+)?$")
            .unwrap_or_else(|_| unreachable!("static pattern"))
    })
}

/// Telephone numbers, checked against the numbering plan declared by the
/// field's `plan` attribute; without one, any supported notation passes.
pub struct TelRule;

impl Rule for TelRule {
    fn test(
        &self,
        field: &FieldNode,
        value: &Value,
        _group: Option<&str>,
        _input: Option<&Value>,
    ) -> FormResult<bool> {
        if value_is_empty(value) {
            return Ok(true);
        }
        let text = value_to_string(value);
        let text = text.trim();
        let plan = field.attr("plan").unwrap_or_default().to_ascii_lowercase();
        let passed = match plan.as_str() {
            "northamerica" | "us" => nanp_re().is_match(text),
            "international" | "int" | "itu-t" => itu_re().is_match(text),
            "ietf" | "epp" => epp_re().is_match(text),
            _ => nanp_re().is_match(text) || itu_re().is_match(text) || epp_re().is_match(text),
        };
        Ok(passed)
    }
}
