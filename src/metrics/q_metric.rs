use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use getset::{CopyGetters, Getters};
use serde::{Deserialize, Serialize};

use crate::error::RunPlotError;
use crate::metrics::binary::ByteReader;
use crate::metrics::{CycleMetricRecord, MetricRecord};

pub const Q_METRICS_VERSION_FLAT: u8 = 4;
pub const Q_METRICS_VERSION_BINNED: u8 = 5;
pub const Q_METRICS_VERSION_COMPRESSED: u8 = 6;

/// Width of a score-indexed histogram (scores 1..=50).
pub const Q_HIST_WIDTH: usize = 50;

/// One compression bin of the q-score axis, 1-based inclusive on both ends.
///
/// `value` is the representative score standing in for every score of
/// `[lower, upper]` after compression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, CopyGetters, Serialize, Deserialize)]
pub struct QscoreBin {
    #[getset(get_copy = "pub")]
    lower: u8,
    #[getset(get_copy = "pub")]
    upper: u8,
    #[getset(get_copy = "pub")]
    value: u8,
}

impl QscoreBin {
    pub fn with_attrs(lower: u8, upper: u8, value: u8) -> Self {
        QscoreBin {
            lower,
            upper,
            value,
        }
    }

    fn validate(&self) -> Result<(), RunPlotError> {
        if self.lower < 1 {
            return Err(RunPlotError::InvalidBinTable(format!(
                "bin lower bound {} must be >= 1",
                self.lower
            )));
        }
        if self.upper < self.lower {
            return Err(RunPlotError::InvalidBinTable(format!(
                "bin range [{}, {}] is inverted",
                self.lower, self.upper
            )));
        }
        if self.value < self.lower || self.value > self.upper {
            return Err(RunPlotError::InvalidBinTable(format!(
                "bin value {} outside its range [{}, {}]",
                self.value, self.lower, self.upper
            )));
        }
        Ok(())
    }
}

/// Histogram of q-scores called on one tile at one cycle.
///
/// The histogram is score-indexed for the uncompressed encodings and
/// bin-indexed for the compressed one; the owning set knows which.
#[derive(Debug, Clone, CopyGetters, Getters, Serialize, Deserialize)]
pub struct QMetric {
    #[getset(get_copy = "pub")]
    lane: u16,
    #[getset(get_copy = "pub")]
    tile: u32,
    #[getset(get_copy = "pub")]
    cycle: u16,
    #[getset(get = "pub")]
    hist: Vec<u32>,
}

impl QMetric {
    pub fn with_attrs(lane: u16, tile: u32, cycle: u16, hist: Vec<u32>) -> Self {
        QMetric {
            lane,
            tile,
            cycle,
            hist,
        }
    }

    /// Count at histogram slot `i`; zero past the end.
    pub fn qscore_hist(&self, i: usize) -> u32 {
        self.hist.get(i).copied().unwrap_or(0)
    }

    /// Number of histogram slots.
    pub fn size(&self) -> usize {
        self.hist.len()
    }

    /// Total count across the histogram.
    pub fn total(&self) -> u64 {
        self.hist.iter().map(|&c| c as u64).sum()
    }
}

impl MetricRecord for QMetric {
    fn lane(&self) -> u16 {
        self.lane
    }

    fn tile(&self) -> u32 {
        self.tile
    }
}

impl CycleMetricRecord for QMetric {
    fn cycle(&self) -> u16 {
        self.cycle
    }
}

/// An ordered q-metric collection plus its compression schema.
#[derive(Debug, Clone, Default, Getters, Serialize, Deserialize)]
pub struct QMetricSet {
    #[getset(get = "pub")]
    records: Vec<QMetric>,
    #[getset(get = "pub")]
    bins: Vec<QscoreBin>,
    compressed: bool,
}

impl QMetricSet {
    pub fn new() -> Self {
        QMetricSet::default()
    }

    pub fn with_attrs(records: Vec<QMetric>, bins: Vec<QscoreBin>, compressed: bool) -> Self {
        QMetricSet {
            records,
            bins,
            compressed,
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, QMetric> {
        self.records.iter()
    }

    pub fn size(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn bin_count(&self) -> usize {
        self.bins.len()
    }

    /// Bin at `index` of the compression schema.
    pub fn bin(&self, index: usize) -> Result<&QscoreBin, RunPlotError> {
        self.bins.get(index).ok_or(RunPlotError::IndexOutOfBounds {
            what: "q-score bin table",
            index,
            len: self.bins.len(),
        })
    }

    /// True when histograms are bin-indexed rather than score-indexed.
    pub fn is_compressed(&self) -> bool {
        self.compressed
    }

    pub fn max_lane(&self) -> u16 {
        self.records.iter().map(|r| r.lane()).max().unwrap_or(0)
    }

    pub fn max_cycle(&self) -> u16 {
        self.records.iter().map(|r| r.cycle()).max().unwrap_or(0)
    }

    /// Highest score the set can speak about: the top of the bin table, or
    /// the histogram width when no bin table is present.
    pub fn max_qval(&self) -> usize {
        if self.bins.is_empty() {
            self.records.iter().map(|r| r.size()).max().unwrap_or(0)
        } else {
            self.bins.iter().map(|b| b.upper() as usize).max().unwrap_or(0)
        }
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.bins.clear();
        self.compressed = false;
    }
}

/// Read `QMetricsOut.bin`; a missing file yields an empty set.
pub fn read_q_metrics(path: &Path) -> Result<QMetricSet, RunPlotError> {
    if !path.is_file() {
        log::debug!("no q metrics at {}", path.display());
        return Ok(QMetricSet::new());
    }
    let bytes = fs::read(path)?;
    parse_q_metrics(&bytes, path)
}

/// Parse the q-metric format.
///
/// Version 4 has no bin table and 50-wide score-indexed histograms.
/// Version 5 adds a bin table to the header but keeps score-indexed records.
/// Version 6 keeps the header and stores bin-indexed histograms instead.
pub fn parse_q_metrics(bytes: &[u8], path: &Path) -> Result<QMetricSet, RunPlotError> {
    let mut reader = ByteReader::new(bytes, path);
    let version = reader.read_u8()?;
    if !(Q_METRICS_VERSION_FLAT..=Q_METRICS_VERSION_COMPRESSED).contains(&version) {
        return Err(reader.bad(format!("unsupported q metric version {}", version)));
    }
    let record_size = reader.read_u8()? as usize;

    let mut bins = Vec::new();
    if version >= Q_METRICS_VERSION_BINNED {
        let has_bins = reader.read_u8()? != 0;
        if has_bins {
            let bin_count = reader.read_u8()? as usize;
            let mut raw = Vec::with_capacity(bin_count * 3);
            for _ in 0..bin_count * 3 {
                raw.push(reader.read_u8()?);
            }
            for i in 0..bin_count {
                let bin = QscoreBin::with_attrs(raw[i * 3], raw[i * 3 + 1], raw[i * 3 + 2]);
                bin.validate()?;
                bins.push(bin);
            }
        }
    }

    let compressed = version == Q_METRICS_VERSION_COMPRESSED && !bins.is_empty();
    let hist_width = if compressed { bins.len() } else { Q_HIST_WIDTH };
    let expected_record_size = 6 + 4 * hist_width;
    if record_size != expected_record_size {
        return Err(reader.bad(format!(
            "unexpected record size {} (expected {})",
            record_size, expected_record_size
        )));
    }
    if reader.remaining() % expected_record_size != 0 {
        return Err(reader.bad("truncated trailing record"));
    }

    let mut records = Vec::with_capacity(reader.remaining() / expected_record_size);
    while reader.remaining() > 0 {
        let lane = reader.read_u16()?;
        let tile = reader.read_u16()? as u32;
        let cycle = reader.read_u16()?;
        if cycle == 0 {
            return Err(reader.bad("cycle numbering is 1-based; found 0"));
        }
        let mut hist = Vec::with_capacity(hist_width);
        for _ in 0..hist_width {
            hist.push(reader.read_u32()?);
        }
        records.push(QMetric::with_attrs(lane, tile, cycle, hist));
    }

    Ok(QMetricSet::with_attrs(records, bins, compressed))
}

/// Fold per-tile q-metric records into one record per `(lane, cycle)` with
/// the element-wise sum of the histograms, keeping the source bin table.
/// The engine invokes this explicitly when the by-lane set has not been
/// materialized yet.
pub fn create_q_metrics_by_lane(src: &QMetricSet, dst: &mut QMetricSet) {
    dst.clear();
    let mut sums: BTreeMap<(u16, u16), Vec<u32>> = BTreeMap::new();
    for record in src.iter() {
        let hist = sums
            .entry((record.lane(), record.cycle()))
            .or_insert_with(|| vec![0u32; record.size()]);
        if hist.len() < record.size() {
            hist.resize(record.size(), 0);
        }
        for (slot, &count) in record.hist().iter().enumerate() {
            hist[slot] += count;
        }
    }
    let records = sums
        .into_iter()
        .map(|((lane, cycle), hist)| QMetric::with_attrs(lane, 0, cycle, hist))
        .collect();
    *dst = QMetricSet::with_attrs(records, src.bins().clone(), src.is_compressed());
}
