//! Property checks over generated trees.

use std::collections::HashSet;
use std::rc::Rc;

use proptest::prelude::*;
use uda_structured::{MemoryNode, TreeNode};

#[derive(Debug, Clone)]
struct Shape {
    name: String,
    value: i32,
    children: Vec<Shape>,
}

fn shape() -> impl Strategy<Value = Shape> {
    let leaf = ("[abAB]", any::<i32>()).prop_map(|(name, value)| Shape {
        name,
        value,
        children: Vec::new(),
    });
    leaf.prop_recursive(3, 32, 4, |inner| {
        ("[abAB]", any::<i32>(), prop::collection::vec(inner, 0..4)).prop_map(
            |(name, value, children)| Shape {
                name,
                value,
                children,
            },
        )
    })
}

fn native(shape: &Shape) -> MemoryNode {
    shape.children.iter().fold(
        MemoryNode::new(shape.name.clone()).with_attribute("value", f64::from(shape.value)),
        |node, child| node.with_child(native(child)),
    )
}

fn owned(shape: &Shape) -> TreeNode<'static> {
    shape.children.iter().fold(
        TreeNode::new(shape.name.clone()).with_attribute("value", f64::from(shape.value)),
        |node, child| node.with_child(owned(child)),
    )
}

proptest! {
    #[test]
    fn prop_canonical_path_resolves_to_same_node(
        shape in shape(),
        query in prop::collection::vec("[ab]", 0..4),
    ) {
        let tree = owned(&shape);
        let query = query.join("/");
        if let Ok(resolved) = tree.select(&query) {
            for m in resolved.into_matches() {
                let again = tree.find(&m.path).unwrap();
                prop_assert!(std::ptr::eq(again, m.node), "path {}", m.path);
            }
        }
    }

    #[test]
    fn prop_detach_is_idempotent(shape in shape()) {
        let bound = TreeNode::bound(Rc::new(native(&shape)));
        let once = bound.detach().unwrap();
        let twice = once.detach().unwrap();
        prop_assert_eq!(&twice, &once);
        prop_assert_eq!(&once, &owned(&shape));
    }

    #[test]
    fn prop_add_child_keeps_names_unique(names in prop::collection::vec("[abc]{1,2}", 0..12)) {
        let mut parent = TreeNode::new("parent");
        for name in &names {
            parent.add_child(TreeNode::new(name.as_str())).unwrap();
        }
        let seen: HashSet<&str> = parent.child_names().unwrap().into_iter().collect();
        prop_assert_eq!(seen.len(), names.len());
    }

    #[test]
    fn prop_retain_two_of_five(i in 0usize..5, j in 0usize..5) {
        let mut parent = (0..5).fold(TreeNode::new("parent"), |node, k| {
            node.with_child(TreeNode::new(format!("c{k}")))
        });
        parent.retain_children(&[i, j]).unwrap();
        let expected = vec![format!("c{i}"), format!("c{j}")];
        prop_assert_eq!(parent.child_names().unwrap(), expected);
    }
}
