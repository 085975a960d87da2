use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::canonical;

/// Immutable named datum produced by vars, literals and calls.
///
/// Values are reference counted so that filters and list functions can pass
/// them along without copying payloads.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ValueRepr", into = "ValueRepr")]
pub struct Value(Arc<ValueInner>);

#[derive(Debug, PartialEq)]
struct ValueInner {
    name: String,
    data: ValueData,
}

/// Payload of a [`Value`].
#[derive(Debug, Clone, PartialEq)]
pub enum ValueData {
    Number(i64),
    Float(f64),
    String(Vec<u8>),
    List(ValueList),
}

impl Value {
    pub fn new(name: impl Into<String>, data: ValueData) -> Self {
        Value(Arc::new(ValueInner {
            name: name.into(),
            data,
        }))
    }

    pub fn number(value: i64) -> Self {
        Self::new("", ValueData::Number(value))
    }

    pub fn float(value: f64) -> Self {
        Self::new("", ValueData::Float(value))
    }

    pub fn string(value: impl Into<Vec<u8>>) -> Self {
        Self::new("", ValueData::String(value.into()))
    }

    pub fn list(items: impl IntoIterator<Item = Value>) -> Self {
        Self::new("", ValueData::List(items.into_iter().collect()))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn data(&self) -> &ValueData {
        &self.0.data
    }

    /// Returns a copy of this value carrying `name`; the payload is shared.
    pub fn with_name(&self, name: impl Into<String>) -> Self {
        let name = name.into();
        if name == self.0.name {
            return self.clone();
        }
        Self::new(name, self.0.data.clone())
    }

    pub fn as_number(&self) -> Option<i64> {
        match self.0.data {
            ValueData::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match &self.0.data {
            ValueData::String(bytes) => Some(bytes),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&ValueList> {
        match &self.0.data {
            ValueData::List(list) => Some(list),
            _ => None,
        }
    }

    /// Numeric view used by ordering filters; strings and lists have none.
    pub fn as_f64(&self) -> Option<f64> {
        match self.0.data {
            ValueData::Number(n) => Some(n as f64),
            ValueData::Float(f) => Some(f),
            _ => None,
        }
    }

    /// False for NaN or infinite floats, at any nesting depth. Such values
    /// have no canonical literal form.
    pub fn is_finite(&self) -> bool {
        match &self.0.data {
            ValueData::Float(f) => f.is_finite(),
            ValueData::List(items) => items.iter().all(Value::is_finite),
            _ => true,
        }
    }

    /// Human-readable kind string used in error messages.
    pub fn kind(&self) -> &'static str {
        match self.0.data {
            ValueData::Number(_) => "number",
            ValueData::Float(_) => "float",
            ValueData::String(_) => "string",
            ValueData::List(_) => "list",
        }
    }

    /// Canonical literal text, e.g. `'name':'payload'`.
    pub fn to_canonical(&self) -> Vec<u8> {
        let mut out = Vec::new();
        canonical::write_value(&mut out, self);
        out
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.to_canonical()))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.to_canonical()))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::number(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::string(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::string(value)
    }
}

/// Ordered, append-only sequence of values produced by one node for one
/// transaction. Empty is falsy, anything else is truthy.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueList(Vec<Value>);

impl ValueList {
    /// Canonical false: the empty list.
    pub fn new() -> Self {
        ValueList(Vec::new())
    }

    /// Canonical true: one unnamed empty string.
    pub fn truthy() -> Self {
        ValueList(vec![Value::string("")])
    }

    pub fn push(&mut self, value: Value) {
        self.0.push(value);
    }

    pub fn extend_from_slice(&mut self, values: &[Value]) {
        self.0.extend_from_slice(values);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_truthy(&self) -> bool {
        !self.0.is_empty()
    }

    pub fn is_falsy(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.0.get(index)
    }

    pub fn first(&self) -> Option<&Value> {
        self.0.first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Value] {
        &self.0
    }

    /// Expands a literal into the list a literal node evaluates to.
    ///
    /// An unnamed list value stands for its elements; any other value is a
    /// single-element list. [`ValueList::into_literal`] is the inverse.
    pub fn from_literal(value: &Value) -> Self {
        match value.data() {
            ValueData::List(items) if value.name().is_empty() => items.clone(),
            _ => ValueList(vec![value.clone()]),
        }
    }

    /// Packs a finished list into the single value held by a literal node.
    pub fn into_literal(self) -> Value {
        if self.0.len() == 1 {
            let only = &self.0[0];
            let unnamed_list = only.name().is_empty() && only.as_list().is_some();
            if !unnamed_list {
                return only.clone();
            }
        }
        Value::new("", ValueData::List(self))
    }
}

impl FromIterator<Value> for ValueList {
    fn from_iter<T: IntoIterator<Item = Value>>(iter: T) -> Self {
        ValueList(iter.into_iter().collect())
    }
}

impl From<Vec<Value>> for ValueList {
    fn from(values: Vec<Value>) -> Self {
        ValueList(values)
    }
}

impl<'a> IntoIterator for &'a ValueList {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// JSON shape of a value: `{"name": "a", "int": 1}`, `{"text": "x"}`,
/// `{"hex": "00ff"}`, `{"float": 1.5}`, `{"list": [...]}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ValueRepr {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    name: String,
    #[serde(flatten)]
    data: DataRepr,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
enum DataRepr {
    Int(i64),
    Float(f64),
    Text(String),
    Hex(String),
    List(Vec<ValueRepr>),
}

impl TryFrom<ValueRepr> for Value {
    type Error = hex::FromHexError;

    fn try_from(repr: ValueRepr) -> Result<Self, Self::Error> {
        let data = match repr.data {
            DataRepr::Int(n) => ValueData::Number(n),
            DataRepr::Float(f) => ValueData::Float(f),
            DataRepr::Text(text) => ValueData::String(text.into_bytes()),
            DataRepr::Hex(encoded) => ValueData::String(hex::decode(encoded)?),
            DataRepr::List(items) => ValueData::List(
                items
                    .into_iter()
                    .map(Value::try_from)
                    .collect::<Result<ValueList, _>>()?,
            ),
        };
        Ok(Value::new(repr.name, data))
    }
}

impl From<Value> for ValueRepr {
    fn from(value: Value) -> Self {
        let data = match value.data() {
            ValueData::Number(n) => DataRepr::Int(*n),
            ValueData::Float(f) => DataRepr::Float(*f),
            ValueData::String(bytes) => match std::str::from_utf8(bytes) {
                Ok(text) => DataRepr::Text(text.to_owned()),
                Err(_) => DataRepr::Hex(hex::encode(bytes)),
            },
            ValueData::List(items) => {
                DataRepr::List(items.iter().cloned().map(ValueRepr::from).collect())
            }
        };
        ValueRepr {
            name: value.name().to_owned(),
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_true_and_false() {
        assert!(ValueList::truthy().is_truthy());
        assert!(ValueList::new().is_falsy());
        assert_eq!(ValueList::truthy().first(), Some(&Value::string("")));
    }

    #[test]
    fn literal_packing_is_inverse() {
        let cases = vec![
            ValueList::new(),
            ValueList::from(vec![Value::number(1)]),
            ValueList::from(vec![Value::number(1).with_name("a"), Value::number(2)]),
            ValueList::from(vec![Value::list([Value::string("x")])]),
            ValueList::from(vec![Value::list([]).with_name("named")]),
        ];
        for list in cases {
            let literal = list.clone().into_literal();
            assert_eq!(ValueList::from_literal(&literal), list, "literal {literal}");
        }
    }

    #[test]
    fn with_name_shares_payload() {
        let original = Value::string("payload");
        let renamed = original.with_name("arg");
        assert_eq!(renamed.name(), "arg");
        assert_eq!(renamed.as_bytes(), Some(&b"payload"[..]));
        assert_eq!(original.name(), "");
    }

    #[test]
    fn json_shape_round_trips() {
        let value = Value::list([
            Value::number(1).with_name("a"),
            Value::string(vec![0xff, 0x00]),
            Value::string("txt"),
        ]);
        let json = serde_json::to_value(&value).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"list": [{"name": "a", "int": 1}, {"hex": "ff00"}, {"text": "txt"}]})
        );
        let back: Value = serde_json::from_value(json).unwrap();
        assert_eq!(back, value);
    }
}
