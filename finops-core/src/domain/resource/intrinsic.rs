// finops-core/src/domain/resource/intrinsic.rs
//
// CloudFormation intrinsic functions as JSON values, plus reference discovery
// so the dependency graph can be derived from the properties themselves.

use serde_json::{Value, json};
use std::collections::BTreeSet;

pub const REGION: &str = "AWS::Region";

pub fn reference(logical_id: &str) -> Value {
    json!({ "Ref": logical_id })
}

pub fn get_att(logical_id: &str, attribute: &str) -> Value {
    json!({ "Fn::GetAtt": [logical_id, attribute] })
}

pub fn join(separator: &str, parts: Vec<Value>) -> Value {
    json!({ "Fn::Join": [separator, parts] })
}

pub fn select(index: usize, list: Value) -> Value {
    json!({ "Fn::Select": [index, list] })
}

/// Availability zones of the stack's region.
pub fn get_azs() -> Value {
    json!({ "Fn::GetAZs": "" })
}

/// Collects every logical id referenced through `Ref` or `Fn::GetAtt`.
/// Pseudo parameters (`AWS::*`) are not resources and are skipped.
pub fn collect_references(value: &Value) -> BTreeSet<String> {
    let mut found = BTreeSet::new();
    walk(value, &mut found);
    found
}

fn walk(value: &Value, found: &mut BTreeSet<String>) {
    match value {
        Value::Object(map) => {
            if let Some(Value::String(target)) = map.get("Ref") {
                if !target.starts_with("AWS::") {
                    found.insert(target.clone());
                }
            }
            if let Some(Value::Array(args)) = map.get("Fn::GetAtt") {
                if let Some(Value::String(target)) = args.first() {
                    found.insert(target.clone());
                }
            }
            for nested in map.values() {
                walk(nested, found);
            }
        }
        Value::Array(items) => {
            for item in items {
                walk(item, found);
            }
        }
        _ => {}
    }
}
