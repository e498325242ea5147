//! Reference-compressed results payloads.
//!
//! The site serves a user's results as one flat JSON array. Values inside
//! objects and arrays are frequently integers pointing back into that same
//! array instead of the value itself. There is no schema: this module only
//! knows how to follow a reference one hop and where tournament records tend
//! to live.

use serde_json::Value;
use tracing::{debug, warn};

/// Marker string that precedes arrays of record references.
pub const RECORD_BLOCK_MARKER: &str = "value";

/// Interpret `value` as a pool index if it is a non-negative integral number.
///
/// Range checking against a pool happens in [`Pool::resolve`].
pub fn as_index(value: &Value) -> Option<usize> {
    let Value::Number(n) = value else {
        return None;
    };

    if let Some(i) = n.as_u64() {
        return usize::try_from(i).ok();
    }

    match n.as_f64() {
        Some(f) if f >= 0.0 && f.fract() == 0.0 && f <= usize::MAX as f64 => Some(f as usize),
        _ => None,
    }
}

/// The flat value array of one payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pool {
    values: Vec<Value>,
}

impl Pool {
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    /// Build a pool from a decoded response body.
    ///
    /// Anything other than a JSON array yields an empty pool, which extracts
    /// to no tournaments.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Array(values) => Self::new(values),
            other => {
                warn!(
                    "Payload is not an array (got {}), treating as empty",
                    value_kind(&other)
                );
                Self::default()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Follow `value` one hop if it is a valid index into this pool.
    ///
    /// Out-of-range and negative numbers are literals and come back as-is,
    /// as does every non-number. The result is never re-resolved.
    pub fn resolve<'a>(&'a self, value: &'a Value) -> &'a Value {
        as_index(value)
            .and_then(|i| self.values.get(i))
            .unwrap_or(value)
    }

    /// Arrays that look like lists of tournament record references.
    ///
    /// A candidate is an array directly following the `"value"` marker whose
    /// first element resolves to an object. Profiles with highlighted
    /// results carry several such arrays; all are returned in pool order.
    pub fn record_blocks(&self) -> Vec<&[Value]> {
        let mut blocks = Vec::new();

        for (i, pair) in self.values.windows(2).enumerate() {
            if pair[0].as_str() != Some(RECORD_BLOCK_MARKER) {
                continue;
            }
            let Value::Array(items) = &pair[1] else {
                continue;
            };
            let Some(first) = items.first() else {
                continue;
            };

            if self.resolve(first).is_object() {
                debug!(
                    "Found record block at index {} with {} items",
                    i + 1,
                    items.len()
                );
                blocks.push(items.as_slice());
            }
        }

        if blocks.is_empty() {
            warn!("No record blocks found in payload of {} values", self.len());
        }

        blocks
    }
}

impl From<Vec<Value>> for Pool {
    fn from(values: Vec<Value>) -> Self {
        Self::new(values)
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pool(value: Value) -> Pool {
        Pool::from_value(value)
    }

    #[test]
    fn test_resolve_valid_index() {
        let p = pool(json!(["a", "b", {"k": 1}]));

        assert_eq!(p.resolve(&json!(1)), &json!("b"));
        assert_eq!(p.resolve(&json!(2)), &json!({"k": 1}));
    }

    #[test]
    fn test_resolve_leaves_non_references_alone() {
        let p = pool(json!(["a", "b"]));

        assert_eq!(p.resolve(&json!("x")), &json!("x"));
        assert_eq!(p.resolve(&json!(2)), &json!(2));
        assert_eq!(p.resolve(&json!(-1)), &json!(-1));
        assert_eq!(p.resolve(&json!(0.5)), &json!(0.5));
        assert_eq!(p.resolve(&json!(null)), &json!(null));
        assert_eq!(p.resolve(&json!([0])), &json!([0]));
    }

    #[test]
    fn test_resolve_is_single_hop() {
        let p = pool(json!([1, "end"]));

        // index 0 holds 1, which would itself point at "end"
        let zero = json!(0);
        let once = p.resolve(&zero);
        assert_eq!(once, &json!(1));
        assert_eq!(p.resolve(once), &json!("end"));
    }

    #[test]
    fn test_resolve_integral_float_index() {
        let p = pool(json!(["a", "b"]));
        assert_eq!(p.resolve(&json!(1.0)), &json!("b"));
    }

    #[test]
    fn test_as_index() {
        assert_eq!(as_index(&json!(3)), Some(3));
        assert_eq!(as_index(&json!(3.0)), Some(3));
        assert_eq!(as_index(&json!(-3)), None);
        assert_eq!(as_index(&json!(3.5)), None);
        assert_eq!(as_index(&json!("3")), None);
    }

    #[test]
    fn test_from_value_non_array_is_empty() {
        assert!(pool(json!({"value": [1]})).is_empty());
        assert!(pool(json!("nope")).is_empty());
    }

    #[test]
    fn test_record_blocks_finds_all_candidates() {
        let p = pool(json!([
            "value",
            [2, 3],
            {"_5": 6},
            {"_5": 7},
            "value",
            [8],
            1001,
            1002,
            {"_5": 9},
            1003
        ]));

        let blocks = p.record_blocks();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0], &[json!(2), json!(3)][..]);
        assert_eq!(blocks[1], &[json!(8)][..]);
    }

    #[test]
    fn test_record_blocks_rejects_scalar_or_empty_arrays() {
        let p = pool(json!([
            "value",
            [2],
            "just a string",
            "value",
            [],
            "value",
            "not an array",
            "value"
        ]));

        assert!(p.record_blocks().is_empty());
    }

    #[test]
    fn test_record_blocks_rejects_nested_array_first_element() {
        let p = pool(json!(["value", [2], [1, 2, 3]]));
        assert!(p.record_blocks().is_empty());
    }

    #[test]
    fn test_record_blocks_accepts_inline_object() {
        let p = pool(json!(["value", [{"_1": 5}]]));
        assert_eq!(p.record_blocks().len(), 1);
    }
}
