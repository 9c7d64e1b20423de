//! Value rendering.
//!
//! Three renderings are provided:
//! - [`format`]: the operand rendering used in failure messages. Text is quoted,
//!   the empty string is the sentinel `(empty string)`, every line carries [`MARGIN`].
//! - [`pretty`]: the multi-line structural printer behind `format`.
//! - [`plain`]: the compact one-line form used inside mismatch descriptions.

use difference::{Changeset, Difference};

use crate::value::Value;

/// Left margin prepended to every line of [`format`] output.
pub const MARGIN: &str = "    ";

const INDENT: &str = "    ";
const EMPTY_STRING: &str = "(empty string)";

/// Renders `value` for a failure message.
pub fn format(value: &Value) -> String {
    let body = match value {
        Value::Text(s) if s.is_empty() => EMPTY_STRING.to_string(),
        other => pretty(other),
    };
    indent(&body)
}

/// Prefixes every line of `text` with [`MARGIN`].
pub fn indent(text: &str) -> String {
    if text.is_empty() {
        return MARGIN.to_string();
    }
    text.lines()
        .map(|line| format!("{MARGIN}{line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Multi-line structural rendering.
pub fn pretty(value: &Value) -> String {
    let mut out = String::new();
    write_pretty(&mut out, value, 0);
    out
}

fn write_pretty(out: &mut String, value: &Value, level: usize) {
    match value {
        Value::Nil => out.push_str("nil"),
        Value::Pointer { target: None, .. } => out.push_str("<nil pointer>"),
        Value::Pointer {
            target: Some(target),
            ..
        } => {
            out.push('&');
            write_pretty(out, target, level);
        }
        Value::Text(s) => out.push_str(&format!("{s:?}")),
        Value::Char(c) => out.push_str(&format!("{c:?}")),
        Value::Bool(_) | Value::Int(_) | Value::Uint(_) | Value::Float(_) => {
            out.push_str(&plain(value))
        }
        Value::Sequence(None) => out.push_str("<nil slice>"),
        Value::Mapping(None) => out.push_str("<nil map>"),
        Value::Sequence(Some(items)) | Value::Array(items) => {
            let entries: Vec<(Option<String>, &Value)> =
                items.iter().map(|v| (None, v)).collect();
            write_block(out, "[", "]", &entries, level);
        }
        Value::Mapping(Some(pairs)) => {
            let entries: Vec<_> = pairs.iter().map(|(k, v)| (Some(key_label(k)), v)).collect();
            write_block(out, "{", "}", &entries, level);
        }
        Value::Record { type_name, fields } => {
            let entries: Vec<_> = fields
                .iter()
                .map(|f| (Some(f.name.clone()), &f.value))
                .collect();
            write_block(out, &format!("{type_name} {{"), "}", &entries, level);
        }
        Value::Error(e) => {
            let rendered = e.render();
            let mut lines = rendered.lines();
            out.push_str("error: ");
            out.push_str(lines.next().unwrap_or_default());
            for line in lines {
                out.push('\n');
                push_indent(out, level + 1);
                out.push_str(line);
            }
        }
    }
}

fn write_block(
    out: &mut String,
    open: &str,
    close: &str,
    entries: &[(Option<String>, &Value)],
    level: usize,
) {
    out.push_str(open);
    if entries.is_empty() {
        out.push_str(close);
        return;
    }
    out.push('\n');
    for (label, value) in entries {
        push_indent(out, level + 1);
        if let Some(label) = label {
            out.push_str(label);
            out.push_str(": ");
        }
        write_pretty(out, value, level + 1);
        out.push_str(",\n");
    }
    push_indent(out, level);
    out.push_str(close);
}

fn push_indent(out: &mut String, level: usize) {
    for _ in 0..level {
        out.push_str(INDENT);
    }
}

fn key_label(key: &Value) -> String {
    match key {
        Value::Text(s) => format!("{s:?}"),
        other => plain(other),
    }
}

/// Compact one-line rendering; text is left unquoted.
pub fn plain(value: &Value) -> String {
    match value {
        Value::Nil => "<nil>".to_string(),
        Value::Pointer { target: None, .. } => "<nil pointer>".to_string(),
        Value::Pointer {
            target: Some(target),
            ..
        } => plain(target),
        Value::Bool(b) => b.to_string(),
        Value::Int(n) => n.to_string(),
        Value::Uint(n) => n.to_string(),
        Value::Float(n) => n.to_string(),
        Value::Char(c) => c.to_string(),
        Value::Text(s) => s.clone(),
        Value::Sequence(None) => "<nil slice>".to_string(),
        Value::Mapping(None) => "<nil map>".to_string(),
        Value::Sequence(Some(items)) | Value::Array(items) => {
            let parts: Vec<_> = items.iter().map(plain).collect();
            format!("[{}]", parts.join(" "))
        }
        Value::Mapping(Some(entries)) => {
            let parts: Vec<_> = entries
                .iter()
                .map(|(k, v)| format!("{}:{}", plain(k), plain(v)))
                .collect();
            format!("map[{}]", parts.join(" "))
        }
        Value::Record { type_name, fields } => {
            let parts: Vec<_> = fields
                .iter()
                .map(|f| format!("{}:{}", f.name, plain(&f.value)))
                .collect();
            format!("{type_name}{{{}}}", parts.join(" "))
        }
        Value::Error(e) => e.message(),
    }
}

/// Line diff between two renderings, `-` for expected and `+` for actual.
///
/// Returns `None` when the renderings are identical or both fit on one line, where a
/// diff would only repeat the operands.
pub fn line_diff(actual: &str, expected: &str) -> Option<String> {
    if !actual.contains('\n') && !expected.contains('\n') {
        return None;
    }
    let changeset = Changeset::new(expected, actual, "\n");
    if changeset.distance == 0 {
        return None;
    }
    let mut out = Vec::new();
    for diff in &changeset.diffs {
        let (mark, text) = match diff {
            Difference::Same(x) => (' ', x),
            Difference::Add(x) => ('+', x),
            Difference::Rem(x) => ('-', x),
        };
        for line in text.lines() {
            out.push(format!("{MARGIN}{mark}{line}"));
        }
    }
    Some(out.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{Inspect, Record};

    #[test]
    fn strings_are_quoted_and_escaped() {
        assert_eq!(format(&"hi\tthere".to_value()), "    \"hi\\tthere\"");
    }

    #[test]
    fn empty_string_uses_sentinel() {
        assert_eq!(format(&"".to_value()), "    (empty string)");
    }

    #[test]
    fn nil_renders() {
        assert_eq!(format(&Value::Nil), "    nil");
        assert_eq!(format(&None::<u8>.to_value()), "    <nil pointer>");
    }

    #[test]
    fn records_render_with_uniform_margin() {
        let v = Record::new("Person")
            .field("Name", "John")
            .field("Tags", &vec!["a"])
            .finish();
        let expected = [
            "    Person {",
            "        Name: \"John\",",
            "        Tags: [",
            "            \"a\",",
            "        ],",
            "    }",
        ]
        .join("\n");
        assert_eq!(format(&v), expected);
    }

    #[test]
    fn plain_distinguishes_nil_and_empty_collections() {
        assert_eq!(plain(&Value::nil_mapping()), "<nil map>");
        assert_eq!(plain(&Value::Mapping(Some(vec![]))), "map[]");
        assert_eq!(plain(&Value::nil_sequence()), "<nil slice>");
        assert_eq!(plain(&Vec::<u8>::new().to_value()), "[]");
    }

    #[test]
    fn line_diff_marks_changed_lines() {
        let diff = line_diff("a\nb\nc", "a\nx\nc").expect("renderings differ");
        assert!(diff.contains("-x"));
        assert!(diff.contains("+b"));
        assert!(diff.contains(" a"));
        assert!(line_diff("one", "two").is_none());
    }
}
