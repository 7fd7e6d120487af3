//! JSON to XML conversion for web-service responses.
//!
//! Objects become nested elements, lists repeat their element, null and
//! empty objects become empty elements. A single-key object names the root
//! element; anything else is wrapped in `<root>`.

use serde_json::Value;

const DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;
const INDENT: &str = "  ";

/// Serialize a JSON value as an XML document.
pub fn to_xml(value: &Value) -> String {
    let mut out = String::from(DECLARATION);
    out.push('\n');
    match value {
        Value::Object(map) if map.len() == 1 => {
            if let Some((name, inner)) = map.iter().next() {
                write_root(&mut out, name, inner);
            }
        }
        other => write_root(&mut out, "root", other),
    }
    out
}

fn write_root(out: &mut String, name: &str, value: &Value) {
    match value {
        // A document has one root: lists go inside it
        Value::Array(items) => {
            let name = element_name(name);
            out.push_str(&format!("<{}>\n", name));
            for item in items {
                write_element(out, "item", item, 1);
            }
            out.push_str(&format!("</{}>\n", name));
        }
        other => write_element(out, name, other, 0),
    }
}

fn write_element(out: &mut String, name: &str, value: &Value, depth: usize) {
    let name = element_name(name);
    let indent = INDENT.repeat(depth);
    match value {
        Value::Array(items) => {
            for item in items {
                write_element(out, &name, item, depth);
            }
        }
        Value::Object(map) if !map.is_empty() => {
            out.push_str(&format!("{}<{}>\n", indent, name));
            for (key, inner) in map {
                write_element(out, key, inner, depth + 1);
            }
            out.push_str(&format!("{}</{}>\n", indent, name));
        }
        Value::Object(_) | Value::Null => out.push_str(&format!("{}<{}/>\n", indent, name)),
        Value::String(s) => out.push_str(&format!("{}<{}>{}</{}>\n", indent, name, escape(s), name)),
        scalar => out.push_str(&format!("{}<{}>{}</{}>\n", indent, name, scalar, name)),
    }
}

/// Make a JSON key usable as an element name.
fn element_name(key: &str) -> String {
    let mut name: String = key
        .chars()
        .map(|c| if c.is_alphanumeric() || matches!(c, '_' | '-' | '.') { c } else { '_' })
        .collect();
    let starts_ok = name.chars().next().map(|c| c.is_alphabetic() || c == '_').unwrap_or(false);
    if !starts_ok {
        name.insert(0, '_');
    }
    name
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            c => escaped.push(c),
        }
    }
    escaped
}
