//! Small standard library of operators and transformations.

use std::sync::Arc;

use pred_types::{Value, ValueData, ValueList};
use regex::bytes::Regex;

use crate::catalog::{Catalog, ExternalError, Operator, OperatorInstance, OperatorMatch};

pub(crate) fn register(catalog: &mut Catalog) {
    catalog.register_operator("rx", Arc::new(RxOperator));
    catalog.register_operator_fn("streq", true, |arg, input| {
        let expected = text_argument(arg)?;
        Ok(match_if(input_bytes(input)? == expected))
    });
    catalog.register_operator_fn("contains", true, |arg, input| {
        let needle = text_argument(arg)?;
        let haystack = input_bytes(input)?;
        let found = needle.is_empty() || haystack.windows(needle.len()).any(|w| w == needle);
        Ok(match_if(found))
    });

    catalog.register_transformation_fn("length", true, |input| {
        let len = match input.data() {
            ValueData::String(bytes) => bytes.len(),
            ValueData::List(items) => items.len(),
            _ => return Err(ExternalError::UnsupportedKind(input.kind())),
        };
        let len = i64::try_from(len).map_err(|err| ExternalError::Failed(err.to_string()))?;
        Ok(Value::new(input.name(), ValueData::Number(len)))
    });
    catalog.register_transformation_fn("lowercase", true, |input| {
        map_bytes(input, |bytes| bytes.to_ascii_lowercase())
    });
    catalog.register_transformation_fn("uppercase", true, |input| {
        map_bytes(input, |bytes| bytes.to_ascii_uppercase())
    });
    catalog.register_transformation_fn("trim", true, |input| {
        map_bytes(input, |bytes| bytes.trim_ascii().to_vec())
    });
}

fn match_if(matched: bool) -> OperatorMatch {
    if matched {
        OperatorMatch::hit()
    } else {
        OperatorMatch::miss()
    }
}

fn text_argument(arg: &Value) -> Result<&[u8], ExternalError> {
    arg.as_bytes()
        .ok_or_else(|| ExternalError::InvalidArgument(format!("expected string, got {}", arg.kind())))
}

fn input_bytes(input: &Value) -> Result<&[u8], ExternalError> {
    input
        .as_bytes()
        .ok_or(ExternalError::UnsupportedKind(input.kind()))
}

fn map_bytes(input: &Value, f: impl Fn(&[u8]) -> Vec<u8>) -> Result<Value, ExternalError> {
    let bytes = input_bytes(input)?;
    Ok(Value::new(input.name(), ValueData::String(f(bytes))))
}

/// Unanchored regex search. Capture groups become the capture list, each
/// named by its group name or index.
struct RxOperator;

struct RxInstance {
    regex: Regex,
}

impl Operator for RxOperator {
    fn instantiate(&self, argument: &Value) -> Result<Arc<dyn OperatorInstance>, ExternalError> {
        let pattern = std::str::from_utf8(text_argument(argument)?)
            .map_err(|err| ExternalError::InvalidArgument(err.to_string()))?;
        let regex =
            Regex::new(pattern).map_err(|err| ExternalError::InvalidArgument(err.to_string()))?;
        Ok(Arc::new(RxInstance { regex }))
    }
}

impl OperatorInstance for RxInstance {
    fn execute(&self, input: &Value) -> Result<OperatorMatch, ExternalError> {
        let haystack = input_bytes(input)?;
        let Some(captures) = self.regex.captures(haystack) else {
            return Ok(OperatorMatch::miss());
        };
        if self.regex.captures_len() == 1 {
            return Ok(OperatorMatch::hit());
        }
        let names: Vec<Option<&str>> = self.regex.capture_names().collect();
        let mut capture = ValueList::new();
        for (index, group) in captures.iter().enumerate() {
            let Some(group) = group else { continue };
            let name = match names.get(index).copied().flatten() {
                Some(name) => name.to_string(),
                None => index.to_string(),
            };
            capture.push(Value::new(name, ValueData::String(group.as_bytes().to_vec())));
        }
        Ok(OperatorMatch::with_capture(capture))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        Catalog::with_standard()
    }

    #[test]
    fn rx_without_groups_is_plain_match() {
        let rx = catalog().operator("rx").unwrap().instantiate(&Value::string("foo")).unwrap();
        assert_eq!(rx.execute(&Value::string("xfooy")).unwrap(), OperatorMatch::hit());
        assert_eq!(rx.execute(&Value::string("bar")).unwrap(), OperatorMatch::miss());
        assert!(rx.execute(&Value::number(3)).is_err());
    }

    #[test]
    fn rx_groups_become_capture() {
        let rx = catalog()
            .operator("rx")
            .unwrap()
            .instantiate(&Value::string("id=(?P<id>\\d+)"))
            .unwrap();
        let result = rx.execute(&Value::string("?id=42&x")).unwrap();
        let capture = result.capture.unwrap();
        assert_eq!(capture.len(), 2);
        assert_eq!(capture.get(0).unwrap().name(), "0");
        assert_eq!(capture.get(1).unwrap(), &Value::string("42").with_name("id"));
    }

    #[test]
    fn rx_rejects_bad_pattern() {
        let err = catalog()
            .operator("rx")
            .unwrap()
            .instantiate(&Value::string("("))
            .err()
            .unwrap();
        assert!(matches!(err, ExternalError::InvalidArgument(_)));
    }

    #[test]
    fn streq_and_contains() {
        let catalog = catalog();
        let streq = catalog.operator("streq").unwrap().instantiate(&Value::string("GET")).unwrap();
        assert!(streq.execute(&Value::string("GET")).unwrap().matched);
        assert!(!streq.execute(&Value::string("GETX")).unwrap().matched);
        let contains = catalog
            .operator("contains")
            .unwrap()
            .instantiate(&Value::string("../"))
            .unwrap();
        assert!(contains.execute(&Value::string("/a/../etc")).unwrap().matched);
        assert!(!contains.execute(&Value::string("/a/etc")).unwrap().matched);
    }

    #[test]
    fn length_keeps_name() {
        let catalog = catalog();
        let length = catalog.transformation("length").unwrap();
        let out = length.transform(&Value::string("/abcd").with_name("uri")).unwrap();
        assert_eq!(out, Value::number(5).with_name("uri"));
        let list = Value::list([Value::number(1), Value::number(2)]);
        assert_eq!(length.transform(&list).unwrap(), Value::number(2));
        assert!(length.transform(&Value::float(1.0)).is_err());
    }

    #[test]
    fn case_and_trim() {
        let catalog = catalog();
        let lower = catalog.transformation("lowercase").unwrap();
        assert_eq!(lower.transform(&Value::string("SeLeCt")).unwrap(), Value::string("select"));
        let upper = catalog.transformation("uppercase").unwrap();
        assert_eq!(upper.transform(&Value::string("get")).unwrap(), Value::string("GET"));
        let trim = catalog.transformation("trim").unwrap();
        assert_eq!(trim.transform(&Value::string("  x \t")).unwrap(), Value::string("x"));
    }
}
