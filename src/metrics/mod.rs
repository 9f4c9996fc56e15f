use std::path::Path;

use getset::Getters;
use serde::{Deserialize, Serialize};

use crate::error::RunPlotError;
use crate::run_info::RunInfo;

pub mod binary;
pub mod q_metric;
pub mod tile_metric;

pub use q_metric::{
    QMetric, QMetricSet, QscoreBin, create_q_metrics_by_lane, parse_q_metrics, read_q_metrics,
};
pub use tile_metric::{ReadMetric, TileMetric, parse_tile_metrics, read_tile_metrics};

/// Name of the directory holding the binary metric files inside a run folder.
pub const INTEROP_DIR: &str = "InterOp";
pub const TILE_METRICS_FILE: &str = "TileMetricsOut.bin";
pub const Q_METRICS_FILE: &str = "QMetricsOut.bin";

/// A record located on the flowcell by lane and tile.
pub trait MetricRecord {
    fn lane(&self) -> u16;
    fn tile(&self) -> u32;
}

/// A record additionally indexed by sequencing cycle.
pub trait CycleMetricRecord: MetricRecord {
    fn cycle(&self) -> u16;
}

/// An ordered collection of metric records of one type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricSet<M> {
    records: Vec<M>,
}

impl<M> Default for MetricSet<M> {
    fn default() -> Self {
        MetricSet {
            records: Vec::new(),
        }
    }
}

impl<M> MetricSet<M> {
    pub fn new() -> Self {
        MetricSet::default()
    }

    pub fn from_records(records: Vec<M>) -> Self {
        MetricSet { records }
    }

    pub fn records(&self) -> &[M] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, M> {
        self.records.iter()
    }

    pub fn size(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn push(&mut self, record: M) {
        self.records.push(record);
    }
}

impl<M: MetricRecord> MetricSet<M> {
    /// Highest 1-based lane number seen in the set; zero when empty.
    pub fn max_lane(&self) -> u16 {
        self.records.iter().map(|r| r.lane()).max().unwrap_or(0)
    }
}

impl<M: CycleMetricRecord> MetricSet<M> {
    /// Highest 1-based cycle number seen in the set; zero when empty.
    pub fn max_cycle(&self) -> u16 {
        self.records.iter().map(|r| r.cycle()).max().unwrap_or(0)
    }
}

impl<'a, M> IntoIterator for &'a MetricSet<M> {
    type Item = &'a M;
    type IntoIter = std::slice::Iter<'a, M>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Everything loaded from one run folder: the run description plus the
/// metric sets the plot engines consume.
#[derive(Debug, Clone, Getters)]
pub struct RunMetrics {
    #[getset(get = "pub")]
    run_info: RunInfo,
    #[getset(get = "pub")]
    tile_metrics: MetricSet<TileMetric>,
    #[getset(get = "pub")]
    q_metrics: QMetricSet,
    #[getset(get = "pub")]
    q_metrics_by_lane: QMetricSet,
}

impl RunMetrics {
    pub fn with_attrs(
        run_info: RunInfo,
        tile_metrics: MetricSet<TileMetric>,
        q_metrics: QMetricSet,
    ) -> Self {
        RunMetrics {
            run_info,
            tile_metrics,
            q_metrics,
            q_metrics_by_lane: QMetricSet::new(),
        }
    }

    /// Bulk-load a run folder: `RunInfo.xml` plus the metric files under
    /// `InterOp/`. Missing metric files yield empty sets.
    pub fn read(run_folder: &Path) -> Result<Self, RunPlotError> {
        let run_info = RunInfo::read(run_folder)?;
        let interop = run_folder.join(INTEROP_DIR);
        let tile_metrics = read_tile_metrics(&interop.join(TILE_METRICS_FILE))?;
        let q_metrics = read_q_metrics(&interop.join(Q_METRICS_FILE))?;
        log::info!(
            "loaded run {}: {} tile records, {} q records",
            run_info.run_id(),
            tile_metrics.size(),
            q_metrics.size()
        );
        Ok(RunMetrics::with_attrs(run_info, tile_metrics, q_metrics))
    }

    /// True when no metric file contributed any record.
    pub fn empty(&self) -> bool {
        self.tile_metrics.is_empty() && self.q_metrics.is_empty()
    }

    /// Materialize the per-lane q-metric set from the raw one. Invoked by
    /// the heatmap engine on first use; a repeat call is a no-op.
    pub fn build_q_metrics_by_lane(&mut self) {
        if !self.q_metrics_by_lane.is_empty() || self.q_metrics.is_empty() {
            return;
        }
        create_q_metrics_by_lane(&self.q_metrics, &mut self.q_metrics_by_lane);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const RUN_INFO_XML: &str = r#"<RunInfo><Run Id="run-1">
        <Flowcell>FCX</Flowcell>
        <FlowcellLayout LaneCount="2" SurfaceCount="2" />
        <Reads><Read Number="1" NumCycles="26" IsIndexedRead="N" /></Reads>
    </Run></RunInfo>"#;

    fn write_run_folder(tile_bytes: Option<&[u8]>, q_bytes: Option<&[u8]>) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("RunInfo.xml"), RUN_INFO_XML).unwrap();
        let interop = dir.path().join(INTEROP_DIR);
        fs::create_dir(&interop).unwrap();
        if let Some(bytes) = tile_bytes {
            fs::write(interop.join(TILE_METRICS_FILE), bytes).unwrap();
        }
        if let Some(bytes) = q_bytes {
            fs::write(interop.join(Q_METRICS_FILE), bytes).unwrap();
        }
        dir
    }

    fn tile_file() -> Vec<u8> {
        let mut buf = vec![
            tile_metric::TILE_METRICS_VERSION,
            tile_metric::TILE_METRIC_RECORD_SIZE,
        ];
        for (lane, tile, code, value) in [(1u16, 1101u16, 100u16, 150.0f32), (2, 2101, 100, 250.0)]
        {
            buf.extend_from_slice(&lane.to_le_bytes());
            buf.extend_from_slice(&tile.to_le_bytes());
            buf.extend_from_slice(&code.to_le_bytes());
            buf.extend_from_slice(&value.to_le_bytes());
        }
        buf
    }

    #[test]
    fn test_read_run_folder() {
        let dir = write_run_folder(Some(&tile_file()), None);
        let metrics = RunMetrics::read(dir.path()).unwrap();
        assert_eq!(metrics.run_info().flowcell().barcode(), "FCX");
        assert_eq!(metrics.tile_metrics().size(), 2);
        assert!(metrics.q_metrics().is_empty());
        assert!(!metrics.empty());
    }

    #[test]
    fn test_read_run_folder_without_interop_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("RunInfo.xml"), RUN_INFO_XML).unwrap();
        let metrics = RunMetrics::read(dir.path()).unwrap();
        assert!(metrics.empty());
    }

    #[test]
    fn test_build_q_metrics_by_lane_is_idempotent() {
        let mut metrics = RunMetrics::with_attrs(
            RunInfo::parse(RUN_INFO_XML).unwrap(),
            MetricSet::new(),
            QMetricSet::with_attrs(
                vec![
                    QMetric::with_attrs(1, 1101, 1, vec![1, 2]),
                    QMetric::with_attrs(1, 1102, 1, vec![3, 4]),
                ],
                vec![],
                false,
            ),
        );
        metrics.build_q_metrics_by_lane();
        assert_eq!(metrics.q_metrics_by_lane().size(), 1);
        assert_eq!(metrics.q_metrics_by_lane().records()[0].hist(), &vec![4, 6]);
        let snapshot = metrics.q_metrics_by_lane().clone();
        metrics.build_q_metrics_by_lane();
        assert_eq!(
            metrics.q_metrics_by_lane().records()[0].hist(),
            snapshot.records()[0].hist()
        );
    }
}
