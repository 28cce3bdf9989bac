//! Canonical parameter encoding for Leptage request signing.
//!
//! The gateway recomputes the parameter string independently from the wire
//! request, so both sides must produce byte-identical output:
//!
//! ```text
//! GET    key=value pairs, keys sorted ascending, joined with `&`
//!        (values in plain form, no URL-encoding — this is a signing
//!        string, not a URL)
//! other  compact JSON with recursively sorted keys, no whitespace
//! none   empty string
//! ```
//!
//! Numeric values render in serde_json's shortest form (no trailing zeros,
//! no locale separators, no scientific notation for integers), which matches
//! what the gateway reconstructs from the wire body.

use http::Method;
use serde_json::{Map, Value};

/// Build the canonical parameter string for the given method.
///
/// Returns the empty string when `params` is absent or empty. GET parameters
/// are rendered as sorted `key=value` pairs joined with `&`; any other method
/// is treated as body-bearing and rendered as canonical JSON. The caller must
/// transmit the canonical JSON verbatim as the request body — serializing the
/// body separately risks a byte mismatch against what was signed.
///
/// # Examples
///
/// ```
/// use http::Method;
/// use leptage_auth::canonical::encode_params;
/// use serde_json::{Map, json};
///
/// let mut params = Map::new();
/// params.insert("name".to_owned(), json!("someone"));
/// params.insert("age".to_owned(), json!(21));
///
/// assert_eq!(encode_params(&Method::GET, Some(&params)), "age=21&name=someone");
/// assert_eq!(
///     encode_params(&Method::POST, Some(&params)),
///     r#"{"age":21,"name":"someone"}"#
/// );
/// assert_eq!(encode_params(&Method::GET, None), "");
/// ```
#[must_use]
pub fn encode_params(method: &Method, params: Option<&Map<String, Value>>) -> String {
    let Some(params) = params else {
        return String::new();
    };
    if params.is_empty() {
        return String::new();
    }

    if method == Method::GET {
        let mut pairs: Vec<(&String, &Value)> = params.iter().collect();
        pairs.sort_unstable_by(|a, b| a.0.cmp(b.0));

        pairs
            .iter()
            .map(|(key, value)| format!("{key}={}", plain_value(value)))
            .collect::<Vec<_>>()
            .join("&")
    } else {
        canonical_json(&Value::Object(params.clone()))
    }
}

/// Serialize a JSON value with recursively sorted object keys and no
/// inserted whitespace.
///
/// This is the body canonicalization for signed non-GET requests; the HTTP
/// transport must send these exact bytes so the gateway's reconstruction
/// matches the signed string.
///
/// # Examples
///
/// ```
/// use leptage_auth::canonical::canonical_json;
/// use serde_json::json;
///
/// let value = json!({"b": {"y": 2, "x": 1}, "a": [1, 2]});
/// assert_eq!(canonical_json(&value), r#"{"a":[1,2],"b":{"x":1,"y":2}}"#);
/// ```
#[must_use]
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

/// Render a GET parameter value in plain form.
///
/// Scalars render without quoting (the signing string is not JSON at this
/// level); composite values and `null` fall back to canonical JSON.
fn plain_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => canonical_json(value),
    }
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::String(s) => write_json_string(s, out),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        Value::Object(map) => {
            let mut pairs: Vec<(&String, &Value)> = map.iter().collect();
            pairs.sort_unstable_by(|a, b| a.0.cmp(b.0));

            out.push('{');
            for (i, (key, item)) in pairs.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_json_string(key, out);
                out.push(':');
                write_canonical(item, out);
            }
            out.push('}');
        }
    }
}

/// Append a JSON-escaped, quoted string to `out`.
fn write_json_string(s: &str, out: &mut String) {
    let escaped =
        serde_json::to_string(s).expect("serializing a string to JSON is infallible");
    out.push_str(&escaped);
}
