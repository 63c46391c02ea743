//! DAG-JSON text codec: the human-readable canonical form.
//!
//! Compact output with map entries in the same order as the binary form.
//! Floats print as the shortest decimal that round-trips, without an exponent
//! and without a trailing `.0`: `2010.0` renders as `2010`. The text form is
//! for inspection only; the int/float distinction lives in the binary form.

use crate::canonicalizer::{validate, CanonicalizationError};
use crate::node::{sorted_entries, Node};
use std::fmt::Write;

/// Encodes a node as canonical DAG-JSON text.
pub fn encode(node: &Node) -> Result<String, CanonicalizationError> {
    validate(node)?;
    let mut out = String::new();
    write_node(node, &mut out);
    Ok(out)
}

fn write_node(node: &Node, out: &mut String) {
    match node {
        Node::Null => out.push_str("null"),
        Node::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Node::Int(v) => {
            let _ = write!(out, "{}", v);
        }
        Node::Float(f) => {
            let _ = write!(out, "{}", f);
        }
        Node::Text(s) => write_string(s, out),
        Node::List(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_node(item, out);
            }
            out.push(']');
        }
        Node::Map(entries) => {
            out.push('{');
            for (i, (key, value)) in sorted_entries(entries).into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_string(key, out);
                out.push(':');
                write_node(value, out);
            }
            out.push('}');
        }
    }
}

fn write_string(s: &str, out: &mut String) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0c}' => out.push_str("\\f"),
            c if (c as u32) < 0x20 => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compact_sorted_output() {
        let node = Node::map([
            ("year", Node::Int(2010)),
            ("make", Node::text("Honda")),
            ("id", Node::text("x")),
        ]);
        assert_eq!(
            encode(&node).unwrap(),
            r#"{"id":"x","make":"Honda","year":2010}"#
        );
    }

    #[test]
    fn floats_print_plain_shortest_decimal() {
        assert_eq!(encode(&Node::Float(2010.0)).unwrap(), "2010");
        assert_eq!(encode(&Node::Float(-3.0)).unwrap(), "-3");
        assert_eq!(encode(&Node::Float(3.14159265359)).unwrap(), "3.14159265359");
        assert_eq!(encode(&Node::Float(0.1)).unwrap(), "0.1");
        assert_eq!(encode(&Node::Float(1e-7)).unwrap(), "0.0000001");
        assert_eq!(
            encode(&Node::Float(1e21)).unwrap(),
            "1000000000000000000000"
        );
    }

    #[test]
    fn output_is_valid_json() {
        let node = Node::map([
            ("special", Node::text("!@#$%^&*()")),
            ("unicode", Node::text("你好世界🌍")),
            ("newline", Node::text("line1\nline2\u{1}")),
            ("big", Node::Float(1.7976931348623157e308)),
            ("list", Node::List(vec![Node::Null, Node::Bool(true)])),
        ]);
        let text = encode(&node).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed["unicode"], "你好世界🌍");
        assert_eq!(parsed["newline"], "line1\nline2\u{1}");
        assert_eq!(parsed["list"][1], true);
    }
}
