//! Host value → JSON conversion.
//!
//! A table is emitted as a JSON array when its length `n` is positive and
//! every key in `1..=n` holds a value; the array covers exactly `1..=n`
//! and any other keys on that table are dropped. Every other table is
//! emitted as an object over all of its entries, with integer keys
//! rendered in base 10.

use std::cell::RefCell;
use std::rc::Rc;

use computo_api::{DynamicValue, Key, Table, TableRef};

use crate::error::BridgeError;
use crate::options::BridgeOptions;
use crate::path::ValuePath;

/// Convert a host value to JSON. Errors report locations under `value`.
pub fn to_json(
    value: &DynamicValue,
    options: &BridgeOptions,
) -> Result<serde_json::Value, BridgeError> {
    ValueConverter::new(options, "value").convert(value)
}

/// Single-use converter for one argument.
///
/// Tracks the tables currently being visited so a table that contains
/// itself fails with [`BridgeError::CyclicValue`]. A table shared between
/// siblings is not a cycle and is converted once per occurrence.
pub struct ValueConverter<'a> {
    options: &'a BridgeOptions,
    path: ValuePath,
    ancestors: Vec<*const RefCell<Table>>,
}

impl<'a> ValueConverter<'a> {
    /// `root` names the argument in error locations (`script`, `inputs`).
    pub fn new(options: &'a BridgeOptions, root: &'static str) -> Self {
        Self {
            options,
            path: ValuePath::new(root),
            ancestors: Vec::new(),
        }
    }

    /// Convert `value`. Either the whole value converts or an error is
    /// returned; no partial document escapes.
    pub fn convert(mut self, value: &DynamicValue) -> Result<serde_json::Value, BridgeError> {
        self.value_to_json(value)
    }

    fn value_to_json(&mut self, value: &DynamicValue) -> Result<serde_json::Value, BridgeError> {
        match value {
            DynamicValue::Nil => Ok(serde_json::Value::Null),
            DynamicValue::Boolean(b) => Ok(serde_json::Value::Bool(*b)),
            DynamicValue::Integer(i) => Ok(serde_json::Value::from(*i)),
            DynamicValue::Float(x) => serde_json::Number::from_f64(*x)
                .map(serde_json::Value::Number)
                .ok_or_else(|| BridgeError::UnsupportedValueType {
                    type_name: "non-finite float",
                    path: self.path.to_string(),
                }),
            DynamicValue::String(s) => Ok(serde_json::Value::String(s.clone())),
            DynamicValue::Table(table) => self.table_to_json(table),
            DynamicValue::Function(_) | DynamicValue::Userdata(_) => {
                Err(BridgeError::UnsupportedValueType {
                    type_name: value.type_name(),
                    path: self.path.to_string(),
                })
            }
        }
    }

    fn table_to_json(&mut self, table: &TableRef) -> Result<serde_json::Value, BridgeError> {
        let ptr = Rc::as_ptr(table);
        if self.ancestors.contains(&ptr) {
            return Err(BridgeError::CyclicValue {
                path: self.path.to_string(),
            });
        }
        if self.ancestors.len() >= self.options.max_depth {
            return Err(BridgeError::DepthLimit {
                limit: self.options.max_depth,
                path: self.path.to_string(),
            });
        }
        let table = table.try_borrow().map_err(|_| BridgeError::TableBorrowed {
            path: self.path.to_string(),
        })?;

        self.ancestors.push(ptr);
        let result = match sequence_length(&table) {
            Some(len) => self.array_to_json(&table, len),
            None => self.object_to_json(&table),
        };
        self.ancestors.pop();
        result
    }

    fn array_to_json(&mut self, table: &Table, len: i64) -> Result<serde_json::Value, BridgeError> {
        let mut items = Vec::with_capacity(table.entry_count());
        for i in 1..=len {
            self.path.push_index(i);
            let item = match table.get_index(i) {
                Some(value) => self.value_to_json(value)?,
                None => serde_json::Value::Null,
            };
            self.path.pop();
            items.push(item);
        }
        Ok(serde_json::Value::Array(items))
    }

    fn object_to_json(&mut self, table: &Table) -> Result<serde_json::Value, BridgeError> {
        let mut map = serde_json::Map::with_capacity(table.entry_count());
        for (key, value) in table.iter() {
            let name = match key {
                Key::String(s) => s.clone(),
                Key::Integer(i) => i.to_string(),
                other => {
                    return Err(BridgeError::KeyType {
                        key_type: other.type_name(),
                        path: self.path.to_string(),
                    });
                }
            };
            self.path.push_key(&name);
            let converted = self.value_to_json(value)?;
            self.path.pop();
            // `1` and `"1"` collide; the entry visited last wins.
            map.insert(name, converted);
        }
        Ok(serde_json::Value::Object(map))
    }
}

/// Length heuristic. The host length is only a border, so every index
/// below it is re-checked before the table is treated as a sequence.
fn sequence_length(table: &Table) -> Option<i64> {
    let len = table.length();
    if len <= 0 {
        return None;
    }
    (1..=len)
        .all(|i| table.get_index(i).is_some_and(|v| !v.is_nil()))
        .then_some(len)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn seq(items: &[i64]) -> Table {
        Table::from_sequence(items.iter().map(|i| DynamicValue::Integer(*i)))
    }

    #[test]
    fn contiguous_table_is_a_sequence() {
        assert_eq!(sequence_length(&seq(&[10, 20, 30])), Some(3));
    }

    #[test]
    fn empty_table_is_not_a_sequence() {
        assert_eq!(sequence_length(&Table::new()), None);
    }

    #[test]
    fn hole_disables_sequence() {
        let mut t = seq(&[1, 2, 3]);
        t.set(2, DynamicValue::Nil);
        assert_eq!(sequence_length(&t), None);
    }

    #[test]
    fn sequence_ignores_extra_keys() {
        let mut t = seq(&[1, 2]);
        t.set("name", DynamicValue::from("x"));
        let options = BridgeOptions::default();
        assert_eq!(to_json(&DynamicValue::table(t), &options).unwrap(), json!([1, 2]));
    }
}
