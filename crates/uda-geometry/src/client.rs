use tracing::{debug, info};
use uda_structured::{Client, Fetcher, TreeError, TreeNode};

use crate::combine::{GeometryData, GeometrySource};
use crate::config::GeometryConfig;
use crate::error::GeometryError;
use crate::signal_geometry::SignalGeometryData;

/// Fetches geometry configuration and calibration and runs them through
/// the geometry pipeline.
#[derive(Debug, Clone)]
pub struct GeometryClient<F> {
    client: Client<F>,
    config: GeometryConfig,
}

impl<F: Fetcher> GeometryClient<F> {
    pub fn new(fetcher: F, config: GeometryConfig) -> Result<Self, GeometryError> {
        config.validate()?;
        Ok(Self {
            client: Client::new(fetcher),
            config,
        })
    }

    pub fn config(&self) -> &GeometryConfig {
        &self.config
    }

    /// Fetches one source per signal. A failed configuration fetch is an
    /// error; a failed calibration fetch means the signal has none.
    pub fn sources(&self, signals: &[&str], source: &str) -> Result<Vec<GeometrySource<'_>>, GeometryError> {
        signals
            .iter()
            .map(|signal| {
                let config = self.client.get(&self.config.config_query_for(signal), source)?;
                let calibration = self.calibration(signal, source)?;
                Ok(GeometrySource::new(*signal, config, calibration))
            })
            .collect()
    }

    /// Geometry for `signals`, merged with their calibrations and combined.
    pub fn geometry(&self, signals: &[&str], source: &str) -> Result<GeometryData<'_>, GeometryError> {
        GeometryData::build(self.sources(signals, source)?)
    }

    /// Signal mapping for `signal`. `keep_all` overrides the configured
    /// `keep_all_signals`.
    pub fn signal_geometry(
        &self,
        signal: &str,
        source: &str,
        keep_all: Option<bool>,
    ) -> Result<SignalGeometryData<'_>, GeometryError> {
        let tree = self.client.get(&self.config.signal_map_query_for(signal), source)?;
        SignalGeometryData::new(tree, keep_all.unwrap_or(self.config.keep_all_signals))
    }

    fn calibration(&self, signal: &str, source: &str) -> Result<Option<TreeNode<'_>>, GeometryError> {
        match self.client.get(&self.config.calibration_query_for(signal), source) {
            Ok(tree) => {
                debug!(signal, "calibration found");
                Ok(Some(tree))
            }
            Err(TreeError::Fetch(e)) => {
                info!(signal, error = %e, "no calibration available");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }
}
