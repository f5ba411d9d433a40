#![allow(dead_code)]

use uda_structured::{MemoryFetcher, MemoryNode, NativeValue, Number, TreeNode};

pub const PICKUP_QUERY: &str = "GEOM::get(signal=/magnetics/pickup, Config=1)";
pub const SHOT: &str = "45272";

/// `ROOT/coils/pickup x5`, each pickup carrying its index and a radius.
pub fn pickup_native() -> MemoryNode {
    let mut coils = MemoryNode::new("coils").with_attribute("count", NativeValue::scalar("int32", 5i64));
    for i in 0..5 {
        coils = coils.with_child(
            MemoryNode::new("pickup")
                .with_attribute("id", NativeValue::scalar("int32", i as i64))
                .with_attribute("r", 0.5 + i as f64 / 10.0)
                .with_attribute(
                    "z-pos",
                    NativeValue::vector("float64", vec![Number::Float(-0.1), Number::Float(0.1)]),
                )
                .with_child(MemoryNode::new("data").with_attribute("name", "P")),
        );
    }
    MemoryNode::unnamed().with_child(coils).with_child(
        MemoryNode::new("flux_loops").with_child(MemoryNode::new("FL01").with_attribute("units", "m")),
    )
}

pub fn pickup_fetcher() -> MemoryFetcher {
    MemoryFetcher::new().with_root(PICKUP_QUERY, SHOT, pickup_native())
}

/// The same shape as [`pickup_native`], built owned.
pub fn pickup_owned() -> TreeNode<'static> {
    TreeNode::bound(std::rc::Rc::new(pickup_native()))
        .detach()
        .expect("fixture detaches")
}

pub fn id_of(node: &TreeNode<'_>) -> i64 {
    node.attribute("id")
        .expect("attributes materialize")
        .and_then(|v| v.numbers().map(|n| n[0].as_i64()))
        .expect("fixture carries id")
}
