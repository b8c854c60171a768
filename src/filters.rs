//! Per-field input filtering, dispatched on the field's `filter` attribute.
//! String transforms map recursively over arrays and nested objects so a
//! multiple-select or grouped payload filters member-wise.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use regex::Regex;
use serde_json::Value;

use crate::html::{strip_scripts, strip_tags};
use crate::rules::tel::{epp_re, itu_re, nanp_re};

/// A caller-registered named filter. Returning `None` omits the value from
/// the filtered result, mirroring the built-in `unset` filter.
pub type FilterFn = Arc<dyn Fn(&Value) -> Option<Value> + Send + Sync>;

/// Applies the filter a field declares. `None` means the value is dropped
/// from the output entirely. Unknown names fall back to the strict default
/// sanitizer.
pub fn apply(
    declared: Option<&str>,
    value: &Value,
    custom: &HashMap<String, FilterFn>,
) -> Option<Value> {
    match declared.unwrap_or_default() {
        "unset" => None,
        "raw" => Some(value.clone()),
        "safehtml" => Some(map_strings(value, &strip_scripts)),
        "int" => Some(to_int(value)),
        "word" => Some(map_strings(value, &filter_word)),
        "url" => Some(map_strings(value, &filter_url)),
        "tel" => Some(map_strings(value, &filter_tel)),
        "" => Some(map_strings(value, &strip_tags)),
        name => match custom.get(name) {
            Some(filter) => filter(value),
            None => {
                log::warn!("unknown filter {name}; applying the strict default");
                Some(map_strings(value, &strip_tags))
            }
        },
    }
}

fn map_strings(value: &Value, transform: &dyn Fn(&str) -> String) -> Value {
    match value {
        Value::String(text) => Value::String(transform(text)),
        Value::Array(items) => Value::Array(
            items.iter().map(|item| map_strings(item, transform)).collect(),
        ),
        Value::Object(entries) => Value::Object(
            entries
                .iter()
                .map(|(key, item)| (key.clone(), map_strings(item, transform)))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// First integer found anywhere in the text, zero when there is none.
fn to_int(value: &Value) -> Value {
    match value {
        Value::Number(number) => match number.as_i64() {
            Some(int) => Value::from(int),
            None => Value::from(number.as_f64().unwrap_or_default().trunc() as i64),
        },
        Value::Array(items) => Value::Array(items.iter().map(to_int).collect()),
        other => {
            static RE: OnceLock<Regex> = OnceLock::new();
            let re = RE.get_or_init(|| {
                Regex::new(r"-?\d+").unwrap_or_else(|_| unreachable!("static pattern"))
            });
            let text = crate::data::value_to_string(other);
            let int = re
                .find(&text)
                .and_then(|m| m.as_str().parse::<i64>().ok())
                .unwrap_or(0);
            Value::from(int)
        }
    }
}

fn filter_word(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_ascii_alphabetic() || *c == '_')
        .collect()
}

fn scheme_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.-]*://")
            .unwrap_or_else(|_| unreachable!("static pattern"))
    })
}

/// Drops markup (keeping the text between tags), strips angle brackets and
/// quotes, and prefixes `http://` when no protocol is present.
fn filter_url(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let cleaned = strip_tags(text);
    let cleaned = cleaned.replace(['<', '>', '"'], "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return String::new();
    }
    if scheme_re().is_match(cleaned) {
        cleaned.to_string()
    } else {
        format!("http://{cleaned}")
    }
}

/// Normalizes to `area.local` numeric groups. Recognized notations are
/// reassembled from their digits; anything else is reduced to digits, with
/// at most 15 kept and numbers longer than 11 digits split before the last
/// ten. Unsalvageable input becomes the empty string.
fn filter_tel(text: &str) -> String {
    let value = text.trim();

    if nanp_re().is_match(value) {
        let mut digits = digits_of(value);
        if digits.len() == 11 && digits.starts_with('1') {
            digits.remove(0);
        }
        return format!("1.{digits}");
    }

    if itu_re().is_match(value) {
        if let Some((country, rest)) = value.split_once(' ') {
            return format!("{}.{}", digits_of(country), digits_of(rest));
        }
    }

    if epp_re().is_match(value) {
        let without_extension = match value.split_once('x') {
            Some((number, _extension)) => number,
            None => value,
        };
        return without_extension.trim_start_matches('+').to_string();
    }

    static FORMATTED: OnceLock<Regex> = OnceLock::new();
    let formatted = FORMATTED.get_or_init(|| {
        Regex::new(r"^[0-9]{1,3}\.[0-9]{4,14}$").unwrap_or_else(|_| unreachable!("static pattern"))
    });
    if formatted.is_match(value) {
        return value.to_string();
    }

    let digits = digits_of(value);
    if digits.is_empty() || digits.len() > 15 {
        return String::new();
    }
    if digits.len() > 11 {
        let split = digits.len() - 10;
        format!("{}.{}", &digits[..split], &digits[split..])
    } else {
        format!(".{digits}")
    }
}

fn digits_of(text: &str) -> String {
    text.chars().filter(char::is_ascii_digit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run(filter: &str, value: Value) -> Option<Value> {
        apply(Some(filter), &value, &HashMap::new())
    }

    #[test]
    fn tel_normalizes_nanp_numbers() {
        assert_eq!(run("tel", json!("1 (202) 555-5555")), Some(json!("1.2025555555")));
    }

    #[test]
    fn tel_keeps_bare_digit_runs_behind_a_dot() {
        assert_eq!(run("tel", json!("33333333333")), Some(json!(".33333333333")));
    }

    #[test]
    fn tel_drops_epp_extensions() {
        assert_eq!(
            run("tel", json!("+222.33333333333x444")),
            Some(json!("222.33333333333"))
        );
    }

    #[test]
    fn tel_reduces_digitless_input_to_empty() {
        assert_eq!(run("tel", json!("ABCabc/?.!*x")), Some(json!("")));
    }

    #[test]
    fn url_prefixes_the_default_protocol() {
        assert_eq!(run("url", json!("example.com")), Some(json!("http://example.com")));
        assert_eq!(
            run("url", json!("https://example.com")),
            Some(json!("https://example.com"))
        );
    }

    #[test]
    fn url_strips_markup_but_keeps_text() {
        assert_eq!(
            run("url", json!("http://<script>alert();</script> <p>Some text.</p>")),
            Some(json!("http://alert(); Some text."))
        );
    }

    #[test]
    fn int_takes_the_first_integer_and_defaults_to_zero() {
        assert_eq!(run("int", json!("order 42, page 7")), Some(json!(42)));
        assert_eq!(run("int", json!("-3 degrees")), Some(json!(-3)));
        assert_eq!(run("int", json!("none")), Some(json!(0)));
        assert_eq!(run("int", json!(9)), Some(json!(9)));
    }

    #[test]
    fn word_keeps_letters_and_underscores() {
        assert_eq!(run("word", json!("foo-bar_9 baz!")), Some(json!("foobar_baz")));
    }

    #[test]
    fn safehtml_strips_scripts_but_keeps_markup() {
        assert_eq!(
            run("safehtml", json!("<p>ok</p><script>alert(1);</script>")),
            Some(json!("<p>ok</p>"))
        );
    }

    #[test]
    fn default_filter_strips_all_markup() {
        assert_eq!(
            apply(None, &json!("<p>ok</p><b>bold</b>"), &HashMap::new()),
            Some(json!("okbold"))
        );
    }

    #[test]
    fn unset_drops_and_raw_passes_through() {
        assert_eq!(run("unset", json!("anything")), None);
        assert_eq!(run("raw", json!("<p>kept</p>")), Some(json!("<p>kept</p>")));
    }

    #[test]
    fn filters_map_over_arrays() {
        assert_eq!(
            run("word", json!(["a-b", "c d"])),
            Some(json!(["ab", "cd"]))
        );
    }

    #[test]
    fn registered_custom_filter_wins_over_the_fallback() {
        let mut custom: HashMap<String, FilterFn> = HashMap::new();
        custom.insert(
            "shout".to_string(),
            Arc::new(|value: &Value| {
                Some(Value::String(crate::data::value_to_string(value).to_uppercase()))
            }),
        );
        assert_eq!(apply(Some("shout"), &json!("hi"), &custom), Some(json!("HI")));
        // Unknown names degrade to the strict sanitizer.
        assert_eq!(apply(Some("ghost"), &json!("<i>x</i>"), &custom), Some(json!("x")));
    }
}
