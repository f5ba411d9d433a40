#![allow(dead_code)]

use uda_geometry::GeometryConfig;
use uda_structured::{MemoryFetcher, MemoryNode, NativeValue};

pub const SHOT: &str = "45272";
pub const PICKUP: &str = "/magnetics/pickup";
pub const FLUX: &str = "/magnetics/fluxloops";

fn element(name: &str, r: f64, z: f64) -> MemoryNode {
    MemoryNode::new(name).with_child(
        MemoryNode::new("data")
            .with_attribute("name", name)
            .with_attribute("r", r)
            .with_attribute("z", z)
            .with_attribute("units", "m"),
    )
}

/// `/magnetics/pickup` as the source returns it: an array of two coils
/// under two `data` wrappers.
pub fn pickup_config() -> MemoryNode {
    MemoryNode::unnamed().with_child(
        MemoryNode::new("data")
            .with_attribute("signal_type", "array")
            .with_child(
                MemoryNode::new("data")
                    .with_attribute("count", NativeValue::scalar("int32", 2i64))
                    .with_child(element("P1", 0.75, 0.5))
                    .with_child(element("P2", 1.25, -0.5)),
            ),
    )
}

/// Calibration for `/magnetics/pickup`: a relative correction of P1, an
/// absolute correction of P2 and a coil the configuration lacks.
pub fn pickup_calibration() -> MemoryNode {
    MemoryNode::unnamed().with_child(
        MemoryNode::new("data").with_child(
            MemoryNode::new("data")
                .with_attribute("cal_version", NativeValue::scalar("int32", 3i64))
                .with_child(
                    MemoryNode::new("P1").with_attribute("calibration", "True").with_child(
                        MemoryNode::new("data")
                            .with_attribute("type", "RELATIVE")
                            .with_attribute("status", "checked")
                            .with_attribute("r", 0.25)
                            .with_attribute("units", "mm"),
                    ),
                )
                .with_child(
                    MemoryNode::new("P2").with_attribute("calibration", "True").with_child(
                        MemoryNode::new("data")
                            .with_attribute("type", "ABSOLUTE")
                            .with_attribute("z", 0.0)
                            .with_attribute("tilt", 0.125),
                    ),
                )
                .with_child(element("P3", 2.0, 0.0)),
        ),
    )
}

pub fn flux_config() -> MemoryNode {
    MemoryNode::unnamed().with_child(
        MemoryNode::new("data")
            .with_attribute("signal_type", "group")
            .with_child(
                MemoryNode::new("data")
                    .with_child(MemoryNode::new("inner").with_child(element("FL1", 0.5, 1.0))),
            ),
    )
}

/// Signal mapping for a group: two signals, one of them unavailable.
pub fn signal_map() -> MemoryNode {
    let signal = |name: &str, alias: &str| {
        MemoryNode::new(name)
            .with_attribute("dimensions", NativeValue::scalar("int32", 1i64))
            .with_child(
                MemoryNode::new("data")
                    .with_attribute("signal_alias", alias)
                    .with_attribute("comp_names", format!("/magnetics/pickup/{name}").as_str()),
            )
    };
    MemoryNode::unnamed()
        .with_attribute("signal_alias_available", NativeValue::strings(["amb_p1", "amb_p3"]))
        .with_child(
            MemoryNode::new("data").with_attribute("signal_type", "group").with_child(
                MemoryNode::new("data")
                    .with_child(signal("P1", "amb_p1"))
                    .with_child(signal("P2", "amb_p2")),
            ),
        )
}

pub fn fetcher() -> MemoryFetcher {
    let config = GeometryConfig::default();
    MemoryFetcher::new()
        .with_root(config.config_query_for(PICKUP), SHOT, pickup_config())
        .with_root(config.calibration_query_for(PICKUP), SHOT, pickup_calibration())
        .with_root(config.config_query_for(FLUX), SHOT, flux_config())
        .with_root(config.signal_map_query_for(PICKUP), SHOT, signal_map())
}
