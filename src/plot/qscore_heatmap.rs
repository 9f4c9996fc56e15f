use crate::error::RunPlotError;
use crate::metrics::{QMetric, QMetricSet, QscoreBin, RunMetrics};
use crate::plot::by_lane::join_title;
use crate::plot::filter_options::FilterOptions;
use crate::plot::heatmap_data::HeatmapData;

/// Accumulate bin-indexed histograms: slot `b` of a record lands in the
/// column of the bin's representative score.
fn populate_heatmap_from_compressed<'a>(
    records: impl Iterator<Item = &'a QMetric>,
    bins: &[QscoreBin],
    options: &FilterOptions,
    data: &mut HeatmapData,
) {
    for record in records {
        if !options.valid_tile(record) {
            continue;
        }
        let Some(row) = cycle_row(record, data) else {
            continue;
        };
        for (bin, schema) in bins.iter().enumerate() {
            data[(row, schema.value() as usize - 1)] += record.qscore_hist(bin) as f32;
        }
    }
}

/// Accumulate score-indexed histograms: slot `b` is the column for score
/// `b + 1` directly.
fn populate_heatmap_from_uncompressed<'a>(
    records: impl Iterator<Item = &'a QMetric>,
    options: &FilterOptions,
    data: &mut HeatmapData,
) {
    for record in records {
        if !options.valid_tile(record) {
            continue;
        }
        let Some(row) = cycle_row(record, data) else {
            continue;
        };
        // Counts above the active score axis are zero in well-formed data.
        let width = record.size().min(data.column_count());
        for bin in 0..width {
            data[(row, bin)] += record.qscore_hist(bin) as f32;
        }
    }
}

fn cycle_row(record: &QMetric, data: &HeatmapData) -> Option<usize> {
    let row = (record.cycle() as usize).checked_sub(1)?;
    if row >= data.row_count() {
        return None;
    }
    Some(row)
}

/// Rescale every cell to percent of the grid maximum. An all-zero grid is
/// left untouched; callers treat it as "no data".
pub fn normalize_heatmap(data: &mut HeatmapData) {
    let max_value = data.max_value();
    if max_value <= 0.0 {
        return;
    }
    for row in 0..data.row_count() {
        for column in 0..data.column_count() {
            data[(row, column)] = 100.0 * data[(row, column)] / max_value;
        }
    }
}

/// Broadcast each bin's representative column across the score range the
/// bin subsumed before compression. The representative column is copied out
/// first so no write can clobber it mid-broadcast.
pub fn remap_to_bins(bins: &[QscoreBin], max_cycle: usize, data: &mut HeatmapData) {
    for bin in bins {
        let source = bin.value() as usize - 1;
        if source >= data.column_count() {
            continue;
        }
        let representative: Vec<f32> = (0..max_cycle).map(|cycle| data[(cycle, source)]).collect();
        let lower = (bin.lower() as usize).saturating_sub(1);
        let upper = (bin.upper() as usize).min(data.column_count());
        for column in lower..upper {
            for (cycle, &value) in representative.iter().enumerate() {
                data[(cycle, column)] = value;
            }
        }
    }
}

/// Fold one q-metric set into a cycle-by-score heatmap: accumulate, then
/// normalize to percent of maximum, then re-expand binned columns.
pub fn populate_heatmap(
    metric_set: &QMetricSet,
    options: &FilterOptions,
    data: &mut HeatmapData,
) -> Result<(), RunPlotError> {
    let max_q = metric_set.max_qval();
    let max_cycle = metric_set.max_cycle() as usize;
    data.resize(max_cycle, max_q);
    if data.row_count() == 0 || data.column_count() == 0 {
        if metric_set.bin_count() > 0 {
            return Err(RunPlotError::EmptyHeatmap);
        }
        return Ok(());
    }
    if metric_set.is_compressed() {
        populate_heatmap_from_compressed(metric_set.iter(), metric_set.bins(), options, data);
    } else {
        populate_heatmap_from_uncompressed(metric_set.iter(), options, data);
    }
    normalize_heatmap(data);
    remap_to_bins(metric_set.bins(), max_cycle, data);
    Ok(())
}

/// Heatmap of q-score counts over cycles.
///
/// A surface-specific selector reads the raw per-tile set; otherwise the
/// per-lane set is used, materialized from the raw set on first need.
pub fn plot_qscore_heatmap(
    metrics: &mut RunMetrics,
    options: &FilterOptions,
    data: &mut HeatmapData,
) -> Result<(), RunPlotError> {
    data.clear();
    if !options.is_specific_surface() {
        metrics.build_q_metrics_by_lane();
    }
    let metrics = &*metrics;
    let metric_set = if options.is_specific_surface() {
        metrics.q_metrics()
    } else {
        metrics.q_metrics_by_lane()
    };
    if metric_set.is_empty() {
        return Ok(());
    }
    populate_heatmap(metric_set, options, data)?;

    data.set_xrange(0.0, data.row_count() as f32);
    data.set_yrange(0.0, data.column_count() as f32);
    data.set_xlabel("Cycle");
    data.set_ylabel("Q Score");

    let flowcell = metrics.run_info().flowcell();
    let mut components = vec![flowcell.barcode().clone(), options.lane_description()];
    if flowcell.surface_count() > 1 && options.is_specific_surface() {
        components.push(options.surface_description());
    }
    data.set_title(join_title(components));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::MetricSet;
    use crate::plot::filter_options::TileNaming;
    use crate::run_info::RunInfo;

    const RUN_INFO_XML: &str = r#"<RunInfo><Run Id="run-1">
        <Flowcell>FCX</Flowcell>
        <FlowcellLayout LaneCount="2" SurfaceCount="2" />
        <Reads><Read Number="1" NumCycles="2" IsIndexedRead="N" /></Reads>
    </Run></RunInfo>"#;

    fn bins() -> Vec<QscoreBin> {
        vec![
            QscoreBin::with_attrs(1, 10, 5),
            QscoreBin::with_attrs(11, 20, 15),
            QscoreBin::with_attrs(21, 30, 25),
        ]
    }

    fn compressed_set() -> QMetricSet {
        QMetricSet::with_attrs(
            vec![
                QMetric::with_attrs(1, 1101, 1, vec![3, 1, 0]),
                QMetric::with_attrs(1, 1101, 2, vec![0, 2, 1]),
            ],
            bins(),
            true,
        )
    }

    fn run_metrics(q_metrics: QMetricSet) -> RunMetrics {
        RunMetrics::with_attrs(
            RunInfo::parse(RUN_INFO_XML).unwrap(),
            MetricSet::new(),
            q_metrics,
        )
    }

    #[test]
    fn test_fold_conservation_before_normalization() {
        let set = compressed_set();
        let options = FilterOptions::new(TileNaming::FourDigit);
        let mut data = HeatmapData::new();
        data.resize(set.max_cycle() as usize, set.max_qval());
        populate_heatmap_from_compressed(set.iter(), set.bins(), &options, &mut data);
        assert_eq!(data.total(), 7.0);
        assert_eq!(data.at(0, 4), 3.0);
        assert_eq!(data.at(0, 14), 1.0);
        assert_eq!(data.at(1, 14), 2.0);
        assert_eq!(data.at(1, 24), 1.0);
    }

    #[test]
    fn test_populate_heatmap_normalizes_and_expands() {
        let set = compressed_set();
        let options = FilterOptions::new(TileNaming::FourDigit);
        let mut data = HeatmapData::new();
        populate_heatmap(&set, &options, &mut data).unwrap();
        assert_eq!(data.row_count(), 2);
        assert_eq!(data.column_count(), 30);
        // The largest accumulated cell (3) becomes 100.
        let third = 100.0 / 3.0;
        for column in 0..10 {
            assert!((data.at(0, column) - 100.0).abs() < 1e-4);
        }
        for column in 10..20 {
            assert!((data.at(0, column) - third).abs() < 1e-4);
        }
        for column in 20..30 {
            assert_eq!(data.at(0, column), 0.0);
        }
        for column in 0..10 {
            assert_eq!(data.at(1, column), 0.0);
        }
        for column in 10..20 {
            assert!((data.at(1, column) - 2.0 * third).abs() < 1e-4);
        }
        for column in 20..30 {
            assert!((data.at(1, column) - third).abs() < 1e-4);
        }
    }

    #[test]
    fn test_rows_are_constant_within_each_bin_range() {
        let set = compressed_set();
        let options = FilterOptions::new(TileNaming::FourDigit);
        let mut data = HeatmapData::new();
        populate_heatmap(&set, &options, &mut data).unwrap();
        for bin in set.bins() {
            let source = bin.value() as usize - 1;
            for row in 0..data.row_count() {
                for column in bin.lower() as usize - 1..bin.upper() as usize {
                    assert_eq!(data.at(row, column), data.at(row, source));
                }
            }
        }
    }

    #[test]
    fn test_uncompressed_fold_is_score_indexed() {
        let mut hist = vec![0u32; 40];
        hist[4] = 3;
        hist[14] = 1;
        let set = QMetricSet::with_attrs(
            vec![QMetric::with_attrs(1, 1101, 1, hist)],
            vec![],
            false,
        );
        let options = FilterOptions::new(TileNaming::FourDigit);
        let mut data = HeatmapData::new();
        populate_heatmap(&set, &options, &mut data).unwrap();
        assert_eq!(data.column_count(), 40);
        assert_eq!(data.at(0, 4), 100.0);
        assert!((data.at(0, 14) - 100.0 / 3.0).abs() < 1e-4);
    }

    #[test]
    fn test_normalize_leaves_all_zero_grid() {
        let mut data = HeatmapData::new();
        data.resize(2, 2);
        normalize_heatmap(&mut data);
        assert_eq!(data.total(), 0.0);
    }

    #[test]
    fn test_plot_uses_by_lane_set_when_not_surface_specific() {
        let mut metrics = run_metrics(compressed_set());
        let options = FilterOptions::new(TileNaming::FourDigit);
        let mut data = HeatmapData::new();
        plot_qscore_heatmap(&mut metrics, &options, &mut data).unwrap();
        // The per-lane set was materialized and cached.
        assert_eq!(metrics.q_metrics_by_lane().size(), 2);
        assert_eq!(data.row_count(), 2);
        assert_eq!(data.column_count(), 30);
        assert_eq!(data.x_axis().label(), "Cycle");
        assert_eq!(data.y_axis().label(), "Q Score");
        assert_eq!(data.x_axis().max(), 2.0);
        assert_eq!(data.y_axis().max(), 30.0);
        assert_eq!(data.title(), "FCX All Lanes");
    }

    #[test]
    fn test_plot_surface_specific_reads_raw_set() {
        let mut metrics = run_metrics(compressed_set());
        let options =
            FilterOptions::with_attrs(TileNaming::FourDigit, None, Some(1), None);
        let mut data = HeatmapData::new();
        plot_qscore_heatmap(&mut metrics, &options, &mut data).unwrap();
        assert!(metrics.q_metrics_by_lane().is_empty());
        assert_eq!(data.title(), "FCX All Lanes Surface 1");
        assert!((data.at(0, 0) - 100.0).abs() < 1e-4);
    }

    #[test]
    fn test_plot_surface_filter_excludes_other_surface() {
        let mut metrics = run_metrics(compressed_set());
        // All fixture tiles are 1101 (surface 1); surface 2 sees nothing.
        let options =
            FilterOptions::with_attrs(TileNaming::FourDigit, None, Some(2), None);
        let mut data = HeatmapData::new();
        plot_qscore_heatmap(&mut metrics, &options, &mut data).unwrap();
        assert_eq!(data.total(), 0.0);
    }

    #[test]
    fn test_plot_empty_set_leaves_cleared_heatmap() {
        let mut metrics = run_metrics(QMetricSet::new());
        let options = FilterOptions::new(TileNaming::FourDigit);
        let mut data = HeatmapData::new();
        data.resize(4, 4);
        data.set_title("stale");
        plot_qscore_heatmap(&mut metrics, &options, &mut data).unwrap();
        assert_eq!(data.row_count(), 0);
        assert_eq!(data.title(), "");
    }

    #[test]
    fn test_plot_is_idempotent() {
        let mut metrics = run_metrics(compressed_set());
        let options = FilterOptions::new(TileNaming::FourDigit);
        let mut first = HeatmapData::new();
        plot_qscore_heatmap(&mut metrics, &options, &mut first).unwrap();
        let mut second = HeatmapData::new();
        plot_qscore_heatmap(&mut metrics, &options, &mut second).unwrap();
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }
}
