//! Purpose: Render compact JSON lines with optional ANSI colorization.
//! Exports: `colorize_json_line`.
//! Role: Small, pure formatter used by the NDJSON emission path.
//! Invariants: When color is disabled, output equals serde_json::to_string.
//! Invariants: ANSI escapes appear only when explicitly enabled; output stays
//! on one line either way.

use serde_json::Value;

// Conservative 8/16-color palette for broad terminal compatibility.
const COLOR_KEY: &str = "36";
const COLOR_STRING: &str = "32";
const COLOR_NUMBER: &str = "33";
const COLOR_BOOL: &str = "35";
const COLOR_NULL: &str = "39";
const COLOR_PUNCT: &str = "39";

pub fn colorize_json_line(value: &Value, use_color: bool) -> String {
    let mut out = String::new();
    write_value(value, use_color, &mut out);
    out
}

fn write_value(value: &Value, use_color: bool, out: &mut String) {
    match value {
        Value::Null => push_colored("null", COLOR_NULL, use_color, out),
        Value::Bool(val) => {
            let text = if *val { "true" } else { "false" };
            push_colored(text, COLOR_BOOL, use_color, out);
        }
        Value::Number(num) => push_colored(&num.to_string(), COLOR_NUMBER, use_color, out),
        Value::String(text) => {
            let encoded = serde_json::to_string(text).unwrap_or_else(|_| "\"\"".to_string());
            push_colored(&encoded, COLOR_STRING, use_color, out);
        }
        Value::Array(items) => {
            push_colored("[", COLOR_PUNCT, use_color, out);
            for (idx, item) in items.iter().enumerate() {
                if idx > 0 {
                    push_colored(",", COLOR_PUNCT, use_color, out);
                }
                write_value(item, use_color, out);
            }
            push_colored("]", COLOR_PUNCT, use_color, out);
        }
        Value::Object(map) => {
            push_colored("{", COLOR_PUNCT, use_color, out);
            for (idx, (key, item)) in map.iter().enumerate() {
                if idx > 0 {
                    push_colored(",", COLOR_PUNCT, use_color, out);
                }
                let encoded = serde_json::to_string(key).unwrap_or_else(|_| "\"\"".to_string());
                push_colored(&encoded, COLOR_KEY, use_color, out);
                push_colored(":", COLOR_PUNCT, use_color, out);
                write_value(item, use_color, out);
            }
            push_colored("}", COLOR_PUNCT, use_color, out);
        }
    }
}

fn push_colored(text: &str, color: &str, use_color: bool, out: &mut String) {
    if !use_color {
        out.push_str(text);
        return;
    }
    out.push_str("\u{1b}[");
    out.push_str(color);
    out.push('m');
    out.push_str(text);
    out.push_str("\u{1b}[0m");
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::colorize_json_line;

    #[test]
    fn matches_compact_encoding_when_disabled() {
        let value = json!({
            "attr.id": "abc",
            "size": 12,
            "read_units": 0.5,
            "flags": [true, null]
        });
        let plain = colorize_json_line(&value, false);
        let compact = serde_json::to_string(&value).expect("compact");
        assert_eq!(plain, compact);
    }

    #[test]
    fn emits_ansi_when_enabled() {
        let value = json!({"k": "v", "n": 1, "b": true, "z": null});
        let colored = colorize_json_line(&value, true);
        assert!(colored.contains("\u{1b}[36m\"k\"\u{1b}[0m"));
        assert!(colored.contains("\u{1b}[32m\"v\"\u{1b}[0m"));
        assert!(colored.contains("\u{1b}[33m1\u{1b}[0m"));
        assert!(colored.contains("\u{1b}[35mtrue\u{1b}[0m"));
        assert!(colored.contains("\u{1b}[39mnull\u{1b}[0m"));
        assert!(!colored.contains('\n'));
    }
}
