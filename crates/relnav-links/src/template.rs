//! URI template expansion
//!
//! Supports simple `{name}` tokens. Tokens with a matching parameter are
//! substituted in place; tokens without one stay literal. Parameters not
//! consumed by any token are appended as query parameters. Expansion is pure:
//! same href + params always yields the same URL.

use serde_json::Value;
use url::form_urlencoded;

/// Caller-supplied expansion parameters.
///
/// `serde_json::Map` keeps keys sorted, so two logically-equal parameter
/// sets expand (and cache) identically regardless of insertion order.
pub type Params = serde_json::Map<String, Value>;

/// Expand `{name}` tokens in `href` and append unconsumed params as a query.
pub fn expand_uri(href: &str, params: &Params) -> String {
    let mut out = String::with_capacity(href.len());
    let mut consumed: Vec<&str> = Vec::new();
    let mut rest = href;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start..];
        match after.find('}') {
            Some(end) => {
                let name = &after[1..end];
                match params.get(name) {
                    Some(value) => {
                        out.push_str(&scalar_to_string(value));
                        // params may repeat in the template
                        if !consumed.contains(&name) {
                            consumed.push(name);
                        }
                    }
                    // unmatched token stays literal
                    None => out.push_str(&after[..=end]),
                }
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(after);
                rest = "";
            }
        }
    }
    out.push_str(rest);

    let leftover: Vec<(&String, &Value)> = params
        .iter()
        .filter(|(name, _)| !consumed.contains(&name.as_str()))
        .collect();

    if !leftover.is_empty() {
        let mut query = form_urlencoded::Serializer::new(String::new());
        for (name, value) in leftover {
            query.append_pair(name, &scalar_to_string(value));
        }
        out.push(if out.contains('?') { '&' } else { '?' });
        out.push_str(&query.finish());
    }

    out
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
