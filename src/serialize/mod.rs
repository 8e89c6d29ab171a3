//! Bounded value serializer
//!
//! Converts a runtime [`Value`] into a [`SerializedValue`]: a small, JSON-ready
//! tree suitable for an environment diagram. Serialization is total and side
//! effect free. Long strings are truncated, only the first few members of a
//! container are kept, and nesting deeper than the depth budget collapses into
//! an opaque printable form. Cyclic structures therefore always terminate.
//!
//! The opaque form uses the built-in printable text ([`Value::repr`]), so no
//! guest code runs while serializing.

use crate::memory::value::Value;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Size and depth caps applied by [`serialize_with`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerializeLimits {
    /// Strings up to this many characters are kept verbatim
    pub max_text_len: usize,
    /// Characters kept from a longer string before the `...` marker
    pub text_keep: usize,
    /// Members of a list or tuple kept
    pub max_elements: usize,
    /// Entries of a dict kept
    pub max_fields: usize,
    /// Nesting depth below which containers are still expanded
    pub max_depth: usize,
}

impl Default for SerializeLimits {
    fn default() -> Self {
        SerializeLimits {
            max_text_len: 40,
            text_keep: 37,
            max_elements: 10,
            max_fields: 12,
            max_depth: 2,
        }
    }
}

/// Scalar payload of [`SerializedValue::Scalar`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ScalarValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    None,
}

/// Structural description of one runtime value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SerializedValue {
    /// `int`, `float`, `bool` or `None`
    Scalar {
        #[serde(rename = "type")]
        type_name: String,
        value: ScalarValue,
    },
    /// A string, possibly truncated
    Text {
        #[serde(rename = "type")]
        type_name: String,
        value: String,
    },
    /// A list or tuple; `length` is the full length, `elements` the kept prefix
    Sequence {
        #[serde(rename = "type")]
        type_name: String,
        length: usize,
        elements: Vec<SerializedValue>,
    },
    /// A dict; display key is the key text for string keys, else its repr
    Mapping {
        #[serde(rename = "type")]
        type_name: String,
        fields: IndexMap<String, SerializedValue>,
    },
    /// Anything else, or anything past the depth budget
    Opaque {
        #[serde(rename = "type")]
        type_name: String,
        repr: String,
    },
}

impl SerializedValue {
    pub fn type_name(&self) -> &str {
        match self {
            SerializedValue::Scalar { type_name, .. }
            | SerializedValue::Text { type_name, .. }
            | SerializedValue::Sequence { type_name, .. }
            | SerializedValue::Mapping { type_name, .. }
            | SerializedValue::Opaque { type_name, .. } => type_name,
        }
    }

    /// One-line summary for compact displays
    pub fn summary(&self) -> String {
        match self {
            SerializedValue::Scalar { value, .. } => match value {
                ScalarValue::Bool(true) => "True".to_string(),
                ScalarValue::Bool(false) => "False".to_string(),
                ScalarValue::Int(n) => n.to_string(),
                ScalarValue::Float(x) => crate::memory::value::format_float(*x),
                ScalarValue::None => "None".to_string(),
            },
            SerializedValue::Text { value, .. } => crate::memory::value::quote_str(value),
            SerializedValue::Sequence { type_name, length, .. } => {
                format!("{} of {} item{}", type_name, length, if *length == 1 { "" } else { "s" })
            }
            SerializedValue::Mapping { fields, .. } => {
                format!("dict of {} entr{}", fields.len(), if fields.len() == 1 { "y" } else { "ies" })
            }
            SerializedValue::Opaque { repr, .. } => repr.clone(),
        }
    }
}

/// Serialize with the default limits
pub fn serialize(value: &Value) -> SerializedValue {
    serialize_with(value, 0, &SerializeLimits::default())
}

/// Serialize `value` found at nesting `depth`
pub fn serialize_with(value: &Value, depth: usize, limits: &SerializeLimits) -> SerializedValue {
    if depth > limits.max_depth {
        return opaque(value);
    }

    let type_name = value.type_name();
    match value {
        Value::Bool(b) => SerializedValue::Scalar {
            type_name,
            value: ScalarValue::Bool(*b),
        },
        Value::Int(n) => SerializedValue::Scalar {
            type_name,
            value: ScalarValue::Int(*n),
        },
        Value::Float(x) => SerializedValue::Scalar {
            type_name,
            value: ScalarValue::Float(*x),
        },
        Value::None => SerializedValue::Scalar {
            type_name,
            value: ScalarValue::None,
        },
        Value::Str(s) => SerializedValue::Text {
            type_name,
            value: truncate_text(s, limits),
        },
        Value::List(items) => {
            let (length, head) = {
                let items = items.borrow();
                let head: Vec<Value> = items.iter().take(limits.max_elements).cloned().collect();
                (items.len(), head)
            };
            sequence(type_name, length, &head, depth, limits)
        }
        Value::Tuple(items) => {
            let head: Vec<Value> = items.iter().take(limits.max_elements).cloned().collect();
            sequence(type_name, items.len(), &head, depth, limits)
        }
        Value::Dict(dict) => {
            let entries: Vec<(Value, Value)> = dict
                .borrow()
                .items()
                .take(limits.max_fields)
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            let mut fields = IndexMap::with_capacity(entries.len());
            for (key, val) in &entries {
                let display_key = match key {
                    Value::Str(s) => s.to_string(),
                    other => other.repr(),
                };
                fields.insert(display_key, serialize_with(val, depth + 1, limits));
            }
            SerializedValue::Mapping {
                type_name: "dict".to_string(),
                fields,
            }
        }
        _ => opaque(value),
    }
}

fn sequence(
    type_name: String,
    length: usize,
    head: &[Value],
    depth: usize,
    limits: &SerializeLimits,
) -> SerializedValue {
    SerializedValue::Sequence {
        type_name,
        length,
        elements: head
            .iter()
            .map(|item| serialize_with(item, depth + 1, limits))
            .collect(),
    }
}

fn opaque(value: &Value) -> SerializedValue {
    SerializedValue::Opaque {
        type_name: value.type_name(),
        repr: value.repr(),
    }
}

fn truncate_text(s: &str, limits: &SerializeLimits) -> String {
    if s.chars().count() <= limits.max_text_len {
        return s.to_string();
    }
    let mut preview: String = s.chars().take(limits.text_keep).collect();
    preview.push_str("...");
    preview
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::value::{Dict, HashKey};
    use std::rc::Rc;

    fn depth_of(value: &SerializedValue) -> usize {
        match value {
            SerializedValue::Sequence { elements, .. } => {
                1 + elements.iter().map(depth_of).max().unwrap_or(0)
            }
            SerializedValue::Mapping { fields, .. } => {
                1 + fields.values().map(depth_of).max().unwrap_or(0)
            }
            _ => 0,
        }
    }

    #[test]
    fn test_scalars() {
        assert_eq!(
            serialize(&Value::Int(5)),
            SerializedValue::Scalar {
                type_name: "int".to_string(),
                value: ScalarValue::Int(5)
            }
        );
        assert_eq!(serialize(&Value::Bool(true)).type_name(), "bool");
        assert_eq!(serialize(&Value::None).type_name(), "NoneType");
    }

    #[test]
    fn test_text_truncation_boundary() {
        let exactly = "a".repeat(40);
        match serialize(&Value::str(&exactly)) {
            SerializedValue::Text { value, .. } => assert_eq!(value, exactly),
            other => panic!("Expected text, got {:?}", other),
        }

        let longer = "b".repeat(41);
        match serialize(&Value::str(&longer)) {
            SerializedValue::Text { value, .. } => {
                assert_eq!(value.chars().count(), 40);
                assert!(value.ends_with("..."));
                assert!(value.starts_with(&"b".repeat(37)));
            }
            other => panic!("Expected text, got {:?}", other),
        }
    }

    #[test]
    fn test_sequence_breadth_cap() {
        let list = Value::list((0..25).map(Value::Int).collect());
        match serialize(&list) {
            SerializedValue::Sequence { length, elements, .. } => {
                assert_eq!(length, 25);
                assert_eq!(elements.len(), 10);
            }
            other => panic!("Expected sequence, got {:?}", other),
        }
    }

    #[test]
    fn test_mapping_cap_and_keys() {
        let mut dict = Dict::new();
        for i in 0..20 {
            dict.insert(HashKey::Int(i), Value::Int(i), Value::Int(i * i));
        }
        dict.insert(HashKey::Str(Rc::from("name")), Value::str("name"), Value::str("x"));
        match serialize(&Value::dict(dict)) {
            SerializedValue::Mapping { fields, .. } => {
                assert_eq!(fields.len(), 12);
                assert!(fields.contains_key("0"));
                assert!(!fields.contains_key("name"));
            }
            other => panic!("Expected mapping, got {:?}", other),
        }

        let mut dict = Dict::new();
        dict.insert(HashKey::Str(Rc::from("k")), Value::str("k"), Value::Int(1));
        dict.insert(HashKey::Tuple(vec![HashKey::Int(1)]), Value::tuple(vec![Value::Int(1)]), Value::Int(2));
        match serialize(&Value::dict(dict)) {
            SerializedValue::Mapping { fields, .. } => {
                let keys: Vec<&String> = fields.keys().collect();
                assert_eq!(keys, vec!["k", "(1,)"]);
            }
            other => panic!("Expected mapping, got {:?}", other),
        }
    }

    #[test]
    fn test_depth_budget_collapses_to_opaque() {
        let mut value = Value::Int(0);
        for _ in 0..6 {
            value = Value::list(vec![value]);
        }
        let serialized = serialize(&value);
        assert!(depth_of(&serialized) <= 3);

        let SerializedValue::Sequence { elements, .. } = &serialized else {
            panic!("Expected sequence");
        };
        let SerializedValue::Sequence { elements, .. } = &elements[0] else {
            panic!("Expected sequence");
        };
        let SerializedValue::Sequence { elements, .. } = &elements[0] else {
            panic!("Expected sequence");
        };
        match &elements[0] {
            SerializedValue::Opaque { type_name, repr } => {
                assert_eq!(type_name, "list");
                assert_eq!(repr, "[[[0]]]");
            }
            other => panic!("Expected opaque, got {:?}", other),
        }
    }

    #[test]
    fn test_wide_dict_at_depth_cap() {
        let mut dict = Dict::new();
        for i in 0..20 {
            dict.insert(HashKey::Int(i), Value::Int(i), Value::list(vec![Value::Int(i)]));
        }
        let dict = Value::dict(dict);
        let row: Vec<Value> = (0..15).map(|_| dict.clone()).collect();
        let nested = Value::list(vec![Value::list(row)]);

        let serialized = serialize(&nested);
        assert!(depth_of(&serialized) <= 3);

        let SerializedValue::Sequence { elements, .. } = &serialized else {
            panic!("Expected sequence");
        };
        let SerializedValue::Sequence { length, elements, .. } = &elements[0] else {
            panic!("Expected sequence");
        };
        assert_eq!(*length, 15);
        assert_eq!(elements.len(), 10);

        let SerializedValue::Mapping { fields, .. } = &elements[0] else {
            panic!("Expected mapping");
        };
        assert_eq!(fields.len(), 12);
        match &fields["11"] {
            SerializedValue::Opaque { type_name, repr } => {
                assert_eq!(type_name, "list");
                assert_eq!(repr, "[11]");
            }
            other => panic!("Expected opaque, got {:?}", other),
        }

        // One level deeper the dict itself collapses
        let deeper = serialize(&Value::list(vec![nested]));
        assert!(depth_of(&deeper) <= 3);
    }

    #[test]
    fn test_cyclic_list_terminates() {
        let list = Value::list(vec![Value::Int(1)]);
        if let Value::List(items) = &list {
            items.borrow_mut().push(list.clone());
        }
        let serialized = serialize(&list);
        assert!(depth_of(&serialized) <= 3);
        if let Value::List(items) = &list {
            items.borrow_mut().clear();
        }
    }

    #[test]
    fn test_wire_shape() {
        let list = Value::list(vec![Value::Int(1), Value::None, Value::Float(2.5)]);
        let json = serde_json::to_value(serialize(&list)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "list",
                "length": 3,
                "elements": [
                    {"type": "int", "value": 1},
                    {"type": "NoneType", "value": null},
                    {"type": "float", "value": 2.5}
                ]
            })
        );

        let json = serde_json::to_value(serialize(&Value::Range(
            crate::memory::value::RangeValue { start: 0, stop: 3, step: 1 },
        )))
        .unwrap();
        assert_eq!(json, serde_json::json!({"type": "range", "repr": "range(0, 3)"}));
    }
}
