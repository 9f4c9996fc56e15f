use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RunPlotError;
use crate::metrics::TileMetric;

/// Tags for the tile-metric channels the candle-stick engine can plot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetricType {
    Density,
    DensityPF,
    ClusterCount,
    ClusterCountPF,
    PercentPhasing,
    PercentPrephasing,
    PercentAligned,
}

impl MetricType {
    /// Human-readable name used for series titles and axis labels.
    pub fn description(&self) -> &'static str {
        match self {
            MetricType::Density => "Density",
            MetricType::DensityPF => "Density PF",
            MetricType::ClusterCount => "Cluster Count",
            MetricType::ClusterCountPF => "Cluster Count PF",
            MetricType::PercentPhasing => "% Phasing",
            MetricType::PercentPrephasing => "% Prephasing",
            MetricType::PercentAligned => "% Aligned",
        }
    }

    /// True for metrics measured per read rather than per tile.
    pub fn is_read_specific(&self) -> bool {
        matches!(
            self,
            MetricType::PercentPhasing | MetricType::PercentPrephasing | MetricType::PercentAligned
        )
    }
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MetricType::Density => "Density",
            MetricType::DensityPF => "DensityPF",
            MetricType::ClusterCount => "ClusterCount",
            MetricType::ClusterCountPF => "ClusterCountPF",
            MetricType::PercentPhasing => "PercentPhasing",
            MetricType::PercentPrephasing => "PercentPrephasing",
            MetricType::PercentAligned => "PercentAligned",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for MetricType {
    type Err = RunPlotError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "Density" => Ok(MetricType::Density),
            "DensityPF" => Ok(MetricType::DensityPF),
            "ClusterCount" => Ok(MetricType::ClusterCount),
            "ClusterCountPF" => Ok(MetricType::ClusterCountPF),
            "PercentPhasing" => Ok(MetricType::PercentPhasing),
            "PercentPrephasing" => Ok(MetricType::PercentPrephasing),
            "PercentAligned" => Ok(MetricType::PercentAligned),
            _ => Err(RunPlotError::UnknownMetricName(name.to_string())),
        }
    }
}

/// Extracts one scalar sample from a metric record.
///
/// `None` stands in for "this record does not carry that metric" (wrong
/// read, missing channel); engines skip such records. Implementations are
/// pure.
pub trait MetricValue<M> {
    fn value(&self, record: &M, metric_type: MetricType) -> Option<f32>;
}

/// Value extraction for tile metrics, fixed to one read selector at
/// construction so read-specific lookups are stable across a whole plot.
#[derive(Debug, Clone, Copy, Default)]
pub struct TileMetricValue {
    read: Option<u16>,
}

impl TileMetricValue {
    pub fn new(read: Option<u16>) -> Self {
        TileMetricValue { read }
    }
}

impl MetricValue<TileMetric> for TileMetricValue {
    fn value(&self, record: &TileMetric, metric_type: MetricType) -> Option<f32> {
        match metric_type {
            MetricType::Density => record.cluster_density(),
            MetricType::DensityPF => record.cluster_density_pf(),
            MetricType::ClusterCount => record.cluster_count(),
            MetricType::ClusterCountPF => record.cluster_count_pf(),
            MetricType::PercentPhasing => self
                .read
                .and_then(|r| record.read_metric(r))
                .and_then(|m| m.percent_phasing()),
            MetricType::PercentPrephasing => self
                .read
                .and_then(|r| record.read_metric(r))
                .and_then(|m| m.percent_prephasing()),
            MetricType::PercentAligned => self
                .read
                .and_then(|r| record.read_metric(r))
                .and_then(|m| m.percent_aligned()),
        }
    }
}
