mod common;

use common::{fetcher, FLUX, PICKUP, SHOT};
use tracing_test::traced_test;
use uda_geometry::{GeometryClient, GeometryConfig, GeometryData, GeometryError};
use uda_structured::{TreeError, TreeNode, Value};

fn client() -> GeometryClient<uda_structured::MemoryFetcher> {
    GeometryClient::new(fetcher(), GeometryConfig::default()).unwrap()
}

fn number(node: &TreeNode<'_>, attribute: &str) -> Option<f64> {
    node.attribute(attribute).unwrap().and_then(Value::as_f64)
}

#[test]
fn single_signal_is_merged_and_flattened() {
    let client = client();
    let geometry = client.geometry(&[PICKUP], SHOT).unwrap();
    let tree = geometry.data().unwrap();

    assert_eq!(tree.child_names().unwrap(), vec!["P1", "P2", "P3"]);
    assert_eq!(number(tree, "count"), Some(2.0));
    assert_eq!(number(tree, "cal_version"), Some(3.0));

    let p1 = tree.find("P1/data").unwrap();
    assert_eq!(number(p1, "r"), Some(1.0));
    assert_eq!(number(p1, "z"), Some(0.5));
    assert_eq!(p1.attribute("units").unwrap(), Some(&Value::from("m")));
    assert!(!p1.has_attribute("type").unwrap());
    assert!(!p1.has_attribute("status").unwrap());

    let p2 = tree.find("P2/data").unwrap();
    assert_eq!(number(p2, "z"), Some(0.0));
    assert_eq!(number(p2, "r"), Some(1.25));
    assert_eq!(number(p2, "tilt"), Some(0.125));

    assert_eq!(geometry.geometry_names().unwrap(), vec!["/P1", "/P2", "/P3"]);
}

#[test]
#[traced_test]
fn several_signals_keep_their_group_level() {
    let client = client();
    let geometry = client.geometry(&[PICKUP, FLUX], SHOT).unwrap();
    let tree = geometry.data().unwrap();

    assert_eq!(tree.child_names().unwrap(), vec!["pickup", "fluxloops"]);
    assert!(!tree.find("pickup").unwrap().has_attribute("signal_type").unwrap());
    assert_eq!(number(tree, "count"), Some(1.0));
    assert_eq!(
        geometry.geometry_names().unwrap(),
        vec!["/pickup/P1", "/pickup/P2", "/pickup/P3", "/fluxloops/inner/FL1"]
    );
    assert!(logs_contain("no calibration available"));
}

#[test]
fn missing_configuration_is_fatal() {
    let client = client();
    let err = client.geometry(&["/magnetics/saddle"], SHOT).unwrap_err();
    assert!(matches!(err, GeometryError::Tree(TreeError::Fetch(_))));
    assert!(err.to_string().contains("/magnetics/saddle"));
}

fn drop_units(tree: &mut TreeNode<'_>) -> Result<(), GeometryError> {
    for name in ["P1", "P2"] {
        tree.find_mut(&format!("data/data/{name}/data"))?.remove_attribute("units")?;
    }
    Ok(())
}

#[test]
fn manipulator_runs_before_presentation() {
    let client = client();
    let sources = client
        .sources(&[PICKUP], SHOT)
        .unwrap()
        .into_iter()
        .map(|source| source.with_manipulator(drop_units))
        .collect();
    let geometry = GeometryData::build(sources).unwrap();
    let tree = geometry.data().unwrap();
    assert!(!tree.find("P1/data").unwrap().has_attribute("units").unwrap());
    assert!(tree.find("P3/data").unwrap().has_attribute("units").unwrap());
}

#[test]
fn merged_geometry_detaches_and_serializes() {
    let detached = {
        let client = client();
        let geometry = client.geometry(&[PICKUP], SHOT).unwrap();
        geometry.detach().unwrap().unwrap()
    };
    let text = detached.to_json().unwrap();
    assert_eq!(TreeNode::from_json(&text).unwrap(), detached);
}

#[test]
fn signal_geometry_filters_unavailable_signals() {
    let client = client();
    let filtered = client.signal_geometry(PICKUP, SHOT, None).unwrap();
    assert_eq!(filtered.data().unwrap().child_names().unwrap(), vec!["P1"]);
    assert_eq!(filtered.geometry_names().unwrap(), vec!["/magnetics/pickup/P1"]);

    let all = client.signal_geometry(PICKUP, SHOT, Some(true)).unwrap();
    assert_eq!(all.data().unwrap().child_names().unwrap(), vec!["P1", "P2"]);
}
