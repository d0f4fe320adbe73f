use serde::Serialize;
use serde_json::Value;

/// Turn CLI overrides into a value that only carries what the user actually set
///
/// Unset flags serialize as `null` or `[]`; merged as-is they would clobber the
/// lower configuration layers, so both are dropped along with tables left empty.
pub fn prune_unset<T: Serialize>(input: T) -> Value {
    let mut value = serde_json::to_value(input).unwrap_or(Value::Null);
    prune_recursive(&mut value);
    value
}

fn prune_recursive(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (_, v) in map.iter_mut() {
                prune_recursive(v);
            }

            map.retain(|_, v| match v {
                Value::Null => false,
                Value::Array(arr) => !arr.is_empty(),
                Value::Object(inner) => !inner.is_empty(),
                _ => true,
            });
        }
        Value::Array(arr) => {
            for item in arr.iter_mut() {
                prune_recursive(item);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_prune_drops_unset_values() {
        let value = prune_unset(json!({
            "files": {
                "scan_paths": [],
                "max_depth": null,
                "max_files": 20,
            },
            "scan": { "backend": null },
        }));

        assert_eq!(value, json!({ "files": { "max_files": 20 } }));
    }

    #[test]
    fn test_prune_keeps_zero_and_false() {
        let value = prune_unset(json!({ "files": { "max_depth": 0, "flag": false } }));
        assert_eq!(value, json!({ "files": { "max_depth": 0, "flag": false } }));
    }
}
