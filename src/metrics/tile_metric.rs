use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use getset::{CopyGetters, Getters};
use serde::{Deserialize, Serialize};

use crate::error::RunPlotError;
use crate::metrics::binary::ByteReader;
use crate::metrics::{MetricRecord, MetricSet};

pub const TILE_METRICS_VERSION: u8 = 2;
pub const TILE_METRIC_RECORD_SIZE: u8 = 10;

// Record codes of the tile metric file format.
const CODE_CLUSTER_DENSITY: u16 = 100;
const CODE_CLUSTER_DENSITY_PF: u16 = 101;
const CODE_CLUSTER_COUNT: u16 = 102;
const CODE_CLUSTER_COUNT_PF: u16 = 103;
const CODE_PHASING_BASE: u16 = 200;
const CODE_ALIGNED_BASE: u16 = 300;
const CODE_ALIGNED_END: u16 = 400;

/// Per-read measurements of one tile.
#[derive(Debug, Clone, Copy, Default, CopyGetters, Serialize, Deserialize)]
pub struct ReadMetric {
    #[getset(get_copy = "pub")]
    read: u16,
    #[getset(get_copy = "pub")]
    percent_aligned: Option<f32>,
    #[getset(get_copy = "pub")]
    percent_phasing: Option<f32>,
    #[getset(get_copy = "pub")]
    percent_prephasing: Option<f32>,
}

impl ReadMetric {
    pub fn with_attrs(
        read: u16,
        percent_aligned: Option<f32>,
        percent_phasing: Option<f32>,
        percent_prephasing: Option<f32>,
    ) -> Self {
        ReadMetric {
            read,
            percent_aligned,
            percent_phasing,
            percent_prephasing,
        }
    }
}

/// Scalar channels measured for one tile of one lane.
///
/// Channels missing from the source file stay `None` and are skipped by the
/// plot engines.
#[derive(Debug, Clone, Default, CopyGetters, Getters, Serialize, Deserialize)]
pub struct TileMetric {
    #[getset(get_copy = "pub")]
    lane: u16,
    #[getset(get_copy = "pub")]
    tile: u32,
    #[getset(get_copy = "pub")]
    cluster_density: Option<f32>,
    #[getset(get_copy = "pub")]
    cluster_density_pf: Option<f32>,
    #[getset(get_copy = "pub")]
    cluster_count: Option<f32>,
    #[getset(get_copy = "pub")]
    cluster_count_pf: Option<f32>,
    #[getset(get = "pub")]
    read_metrics: Vec<ReadMetric>,
}

impl TileMetric {
    pub fn new(lane: u16, tile: u32) -> Self {
        TileMetric {
            lane,
            tile,
            ..Default::default()
        }
    }

    pub fn with_attrs(
        lane: u16,
        tile: u32,
        cluster_density: Option<f32>,
        cluster_density_pf: Option<f32>,
        cluster_count: Option<f32>,
        cluster_count_pf: Option<f32>,
        read_metrics: Vec<ReadMetric>,
    ) -> Self {
        TileMetric {
            lane,
            tile,
            cluster_density,
            cluster_density_pf,
            cluster_count,
            cluster_count_pf,
            read_metrics,
        }
    }

    /// Measurements of the given read, if the tile carries any.
    pub fn read_metric(&self, read: u16) -> Option<&ReadMetric> {
        self.read_metrics.iter().find(|r| r.read() == read)
    }

    fn read_metric_mut(&mut self, read: u16) -> &mut ReadMetric {
        if let Some(idx) = self.read_metrics.iter().position(|r| r.read() == read) {
            return &mut self.read_metrics[idx];
        }
        self.read_metrics.push(ReadMetric {
            read,
            ..Default::default()
        });
        self.read_metrics.last_mut().expect("just pushed")
    }
}

impl MetricRecord for TileMetric {
    fn lane(&self) -> u16 {
        self.lane
    }

    fn tile(&self) -> u32 {
        self.tile
    }
}

/// Read `TileMetricsOut.bin`; a missing file yields an empty set.
pub fn read_tile_metrics(path: &Path) -> Result<MetricSet<TileMetric>, RunPlotError> {
    if !path.is_file() {
        log::debug!("no tile metrics at {}", path.display());
        return Ok(MetricSet::new());
    }
    let bytes = fs::read(path)?;
    parse_tile_metrics(&bytes, path)
}

/// Parse the tile metric format: a one-byte version, a one-byte record size,
/// then repeated `{lane: u16, tile: u16, code: u16, value: f32}` records.
/// Records sharing a `(lane, tile)` pair merge into one [`TileMetric`].
pub fn parse_tile_metrics(
    bytes: &[u8],
    path: &Path,
) -> Result<MetricSet<TileMetric>, RunPlotError> {
    let mut reader = ByteReader::new(bytes, path);
    let version = reader.read_u8()?;
    if version != TILE_METRICS_VERSION {
        return Err(reader.bad(format!("unsupported tile metric version {}", version)));
    }
    let record_size = reader.read_u8()?;
    if record_size != TILE_METRIC_RECORD_SIZE {
        return Err(reader.bad(format!(
            "unexpected record size {} (expected {})",
            record_size, TILE_METRIC_RECORD_SIZE
        )));
    }
    if reader.remaining() % TILE_METRIC_RECORD_SIZE as usize != 0 {
        return Err(reader.bad("truncated trailing record"));
    }

    let mut by_tile: BTreeMap<(u16, u32), TileMetric> = BTreeMap::new();
    while reader.remaining() > 0 {
        let lane = reader.read_u16()?;
        let tile = reader.read_u16()? as u32;
        let code = reader.read_u16()?;
        let value = reader.read_f32()?;
        let metric = by_tile
            .entry((lane, tile))
            .or_insert_with(|| TileMetric::new(lane, tile));
        apply_code(metric, code, value);
    }

    Ok(MetricSet::from_records(by_tile.into_values().collect()))
}

fn apply_code(metric: &mut TileMetric, code: u16, value: f32) {
    match code {
        CODE_CLUSTER_DENSITY => metric.cluster_density = Some(value),
        CODE_CLUSTER_DENSITY_PF => metric.cluster_density_pf = Some(value),
        CODE_CLUSTER_COUNT => metric.cluster_count = Some(value),
        CODE_CLUSTER_COUNT_PF => metric.cluster_count_pf = Some(value),
        CODE_PHASING_BASE..CODE_ALIGNED_BASE => {
            let read = (code - CODE_PHASING_BASE) / 2 + 1;
            let slot = metric.read_metric_mut(read);
            if (code - CODE_PHASING_BASE) % 2 == 0 {
                slot.percent_phasing = Some(value);
            } else {
                slot.percent_prephasing = Some(value);
            }
        }
        CODE_ALIGNED_BASE..CODE_ALIGNED_END => {
            let read = code - CODE_ALIGNED_BASE + 1;
            metric.read_metric_mut(read).percent_aligned = Some(value);
        }
        // Unknown codes belong to newer writers; skip them.
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn push_record(buf: &mut Vec<u8>, lane: u16, tile: u16, code: u16, value: f32) {
        buf.extend_from_slice(&lane.to_le_bytes());
        buf.extend_from_slice(&tile.to_le_bytes());
        buf.extend_from_slice(&code.to_le_bytes());
        buf.extend_from_slice(&value.to_le_bytes());
    }

    fn sample_file() -> Vec<u8> {
        let mut buf = vec![TILE_METRICS_VERSION, TILE_METRIC_RECORD_SIZE];
        push_record(&mut buf, 1, 1101, CODE_CLUSTER_DENSITY, 150.0);
        push_record(&mut buf, 1, 1101, CODE_CLUSTER_DENSITY_PF, 140.0);
        push_record(&mut buf, 1, 1101, CODE_CLUSTER_COUNT, 1000.0);
        push_record(&mut buf, 1, 1101, CODE_PHASING_BASE, 0.12);
        push_record(&mut buf, 1, 1101, CODE_PHASING_BASE + 1, 0.08);
        push_record(&mut buf, 1, 1101, CODE_ALIGNED_BASE + 1, 92.5);
        push_record(&mut buf, 2, 2101, CODE_CLUSTER_DENSITY, 250.0);
        buf
    }

    #[test]
    fn test_parse_merges_codes_per_tile() {
        let bytes = sample_file();
        let set = parse_tile_metrics(&bytes, &PathBuf::from("t.bin")).unwrap();
        assert_eq!(set.size(), 2);
        let first = &set.records()[0];
        assert_eq!(first.lane(), 1);
        assert_eq!(first.tile(), 1101);
        assert_eq!(first.cluster_density(), Some(150.0));
        assert_eq!(first.cluster_density_pf(), Some(140.0));
        assert_eq!(first.cluster_count(), Some(1000.0));
        assert_eq!(first.cluster_count_pf(), None);
        let read1 = first.read_metric(1).unwrap();
        assert_eq!(read1.percent_phasing(), Some(0.12));
        assert_eq!(read1.percent_prephasing(), Some(0.08));
        assert_eq!(read1.percent_aligned(), None);
        let read2 = first.read_metric(2).unwrap();
        assert_eq!(read2.percent_aligned(), Some(92.5));
        assert_eq!(set.max_lane(), 2);
    }

    #[test]
    fn test_parse_truncated_record_is_bad_format() {
        let mut bytes = sample_file();
        bytes.pop();
        assert!(matches!(
            parse_tile_metrics(&bytes, &PathBuf::from("t.bin")),
            Err(RunPlotError::BadFormat { .. })
        ));
    }

    #[test]
    fn test_parse_wrong_version_is_bad_format() {
        let bytes = vec![9u8, TILE_METRIC_RECORD_SIZE];
        assert!(matches!(
            parse_tile_metrics(&bytes, &PathBuf::from("t.bin")),
            Err(RunPlotError::BadFormat { .. })
        ));
    }

    #[test]
    fn test_missing_file_yields_empty_set() {
        let dir = tempfile::tempdir().unwrap();
        let set = read_tile_metrics(&dir.path().join("TileMetricsOut.bin")).unwrap();
        assert!(set.is_empty());
    }
}
