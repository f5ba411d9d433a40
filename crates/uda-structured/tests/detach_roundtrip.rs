mod common;

use common::{pickup_fetcher, PICKUP_QUERY, SHOT};
use serde_json::json;
use uda_structured::{Client, DetachedTreeNode, TreeNode, Value};

#[test]
fn detached_tree_outlives_the_client() {
    let detached: DetachedTreeNode = {
        let client = Client::new(pickup_fetcher());
        let tree = client.get(PICKUP_QUERY, SHOT).unwrap();
        tree.detach().unwrap()
    };
    assert_eq!(detached.select("coils/pickup").unwrap().len(), 5);
    assert_eq!(
        detached.find("flux_loops/FL01").unwrap().attribute("units").unwrap(),
        Some(&Value::from("m"))
    );
}

#[test]
fn detached_queries_match_bound_queries() {
    let client = Client::new(pickup_fetcher());
    let bound = client.get(PICKUP_QUERY, SHOT).unwrap();
    let detached = bound.detach().unwrap();
    for path in ["", "coils", "coils/pickup@4", "coils/pickup@1/data", "flux_loops/FL01"] {
        assert_eq!(bound.find(path).unwrap(), detached.find(path).unwrap(), "path {path}");
    }
}

#[test]
fn serialized_tree_round_trips() {
    let client = Client::new(pickup_fetcher());
    let detached = client.get(PICKUP_QUERY, SHOT).unwrap().detach().unwrap();
    let text = detached.to_json_pretty().unwrap();
    let back = TreeNode::from_json(&text).unwrap();
    assert_eq!(back, detached);
    assert_eq!(back.to_json().unwrap(), detached.to_json().unwrap());
}

#[test]
fn non_finite_values_survive_serialization() {
    let tree = TreeNode::new("n")
        .with_attribute("lo", f64::NEG_INFINITY)
        .with_attribute("hi", Value::vector([1.0, f64::INFINITY]));
    let encoded: serde_json::Value = serde_json::from_str(&tree.to_json().unwrap()).unwrap();
    assert_eq!(encoded["attributes"]["lo"]["value"], json!("-Infinity"));
    assert_eq!(TreeNode::from_json(&tree.to_json().unwrap()).unwrap(), tree);
}

#[test]
fn foreign_document_is_read_without_a_source() {
    let text = json!({
        "name": "ROOT",
        "attributes": {"count": {"type": "scalar", "dtype": "uint16", "value": 2}},
        "children": [
            {"name": "pickup", "attributes": {"r": {"type": "scalar", "dtype": "float64", "value": 0.5}}},
            {"name": "pickup"}
        ]
    })
    .to_string();
    let tree = TreeNode::from_json(&text).unwrap();
    assert!(tree.is_detached());
    assert_eq!(tree.select("pickup").unwrap().len(), 2);
    assert_eq!(tree.find("pickup@0").unwrap().attribute("r").unwrap().and_then(Value::as_f64), Some(0.5));
}
