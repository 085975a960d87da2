//! Canonical literal text.
//!
//! Strings are quoted with `'` and only `'` and `\` are backslash-escaped;
//! every other byte is written verbatim. The output is the hash-consing key
//! for nodes, so it must stay bit-exact.

use std::io::Write;

use crate::value::{Value, ValueData};

/// Appends `bytes` as a quoted canonical string.
pub fn write_string(out: &mut Vec<u8>, bytes: &[u8]) {
    out.push(b'\'');
    for &byte in bytes {
        if byte == b'\'' || byte == b'\\' {
            out.push(b'\\');
        }
        out.push(byte);
    }
    out.push(b'\'');
}

/// Appends the canonical literal form of `value`.
///
/// Named values are written `'name':payload`, lists as `[a b]`, floats
/// always carry a fractional part or exponent so they never read as integers.
/// NaN and infinities have no canonical form; the builder rejects them, and
/// they only reach this writer through `Display` diagnostics.
pub fn write_value(out: &mut Vec<u8>, value: &Value) {
    if !value.name().is_empty() {
        write_string(out, value.name().as_bytes());
        out.push(b':');
    }
    match value.data() {
        ValueData::Number(n) => {
            let _ = write!(out, "{n}");
        }
        ValueData::Float(f) => {
            let _ = write!(out, "{f:?}");
        }
        ValueData::String(bytes) => write_string(out, bytes),
        ValueData::List(items) => {
            out.push(b'[');
            for (idx, item) in items.iter().enumerate() {
                if idx > 0 {
                    out.push(b' ');
                }
                write_value(out, item);
            }
            out.push(b']');
        }
    }
}

/// Convenience wrapper returning the quoted form of a UTF-8 string.
pub fn quote(text: &str) -> String {
    let mut out = Vec::with_capacity(text.len() + 2);
    write_string(&mut out, text.as_bytes());
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(value: &Value) -> String {
        String::from_utf8(value.to_canonical()).unwrap()
    }

    #[test]
    fn escapes_only_quote_and_backslash() {
        assert_eq!(quote("it's"), r"'it\'s'");
        assert_eq!(quote(r"a\b"), r"'a\\b'");
        assert_eq!(quote("tab\there\n"), "'tab\there\n'");
    }

    #[test]
    fn numbers_and_floats_are_distinct() {
        assert_eq!(render(&Value::number(-12)), "-12");
        assert_eq!(render(&Value::float(1.0)), "1.0");
        assert_eq!(render(&Value::float(-0.25)), "-0.25");
    }

    #[test]
    fn non_finite_floats_are_flagged() {
        assert!(Value::float(1.5).is_finite());
        assert!(!Value::float(f64::NAN).is_finite());
        assert!(!Value::list([Value::number(1), Value::float(f64::NEG_INFINITY)]).is_finite());
        assert!(Value::list([Value::string("x")]).is_finite());
    }

    #[test]
    fn named_and_nested_lists() {
        let value = Value::list([
            Value::number(1).with_name("a"),
            Value::list([Value::string("x")]).with_name("b"),
        ]);
        assert_eq!(render(&value), "['a':1 'b':['x']]");
        assert_eq!(render(&Value::list([])), "[]");
    }

    #[test]
    fn raw_bytes_are_not_escaped() {
        let mut out = Vec::new();
        write_string(&mut out, &[0xff, b'\'', 0x00]);
        assert_eq!(out, vec![b'\'', 0xff, b'\\', b'\'', 0x00, b'\'']);
    }
}
