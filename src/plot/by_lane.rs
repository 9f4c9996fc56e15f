use itertools::Itertools;

use crate::error::RunPlotError;
use crate::metrics::{MetricRecord, MetricSet, RunMetrics};
use crate::plot::data::{CandlePoint, PlotData, Series, auto_scale};
use crate::plot::filter_options::FilterOptions;
use crate::plot::metric_value::{MetricType, MetricValue, TileMetricValue};
use crate::plot::stats::candle_stick;

/// Scan one metric set and emit a candle point per non-empty lane.
///
/// Records rejected by the filter or without a sample for `metric_type` are
/// skipped; lanes left without samples produce no point, so the output is
/// densely packed in lane order.
pub fn populate_candle_stick_by_lane<M, V>(
    metrics: &MetricSet<M>,
    proxy: &V,
    options: &FilterOptions,
    metric_type: MetricType,
    points: &mut Vec<CandlePoint>,
) where
    M: MetricRecord,
    V: MetricValue<M>,
{
    let lane_count = metrics.max_lane() as usize;
    if lane_count == 0 {
        return;
    }
    let tiles_per_lane = metrics.size().div_ceil(lane_count);
    let mut tile_by_lane: Vec<Vec<f32>> = vec![Vec::with_capacity(tiles_per_lane); lane_count];
    for record in metrics.iter() {
        if !options.valid_tile(record) {
            continue;
        }
        let Some(value) = proxy.value(record, metric_type) else {
            continue;
        };
        // Lanes are 1-based; anything else is unbucketable.
        let lane_index = record.lane() as usize;
        if lane_index == 0 || lane_index > lane_count {
            continue;
        }
        tile_by_lane[lane_index - 1].push(value);
    }

    let mut outliers = Vec::with_capacity(10);
    for (index, mut values) in tile_by_lane.into_iter().enumerate() {
        let lane = (index + 1) as f32;
        if let Some(point) = candle_stick(&mut values, lane, &mut outliers) {
            points.push(point);
        }
    }
}

/// Candle-stick plot of one tile metric grouped by lane.
///
/// For cluster count and density a second "PF" series carries the matching
/// pass-filter channel. Missing data leaves an empty but well-formed plot.
pub fn plot_by_lane(
    metrics: &RunMetrics,
    metric_type: MetricType,
    options: &FilterOptions,
    data: &mut PlotData<CandlePoint>,
) {
    data.clear();
    data.assign(1, Series::new(metric_type.description(), "Blue"));
    let proxy = TileMetricValue::new(options.read());
    populate_candle_stick_by_lane(
        metrics.tile_metrics(),
        &proxy,
        options,
        metric_type,
        data[0].points_mut(),
    );

    if matches!(metric_type, MetricType::ClusterCount | MetricType::Density) {
        let pf_type = if metric_type == MetricType::Density {
            MetricType::DensityPF
        } else {
            MetricType::ClusterCountPF
        };
        data.push_back(Series::new("PF", "DarkGreen"));
        populate_candle_stick_by_lane(
            metrics.tile_metrics(),
            &proxy,
            options,
            pf_type,
            data[1].points_mut(),
        );
    }

    auto_scale(data, true, 1.2);
    if matches!(
        metric_type,
        MetricType::PercentPhasing | MetricType::PercentPrephasing
    ) {
        data.set_yrange(0.0, 1.0);
    }
    data.set_xrange(0.0, data.x_axis().max() + 1.0);

    data.set_xlabel("Lane");
    data.set_ylabel(metric_type.description());

    let flowcell = metrics.run_info().flowcell();
    let mut components = vec![flowcell.barcode().clone()];
    if options.is_specific_read(metric_type) {
        components.push(options.read_description());
    }
    if flowcell.surface_count() > 1 && options.is_specific_surface() {
        components.push(options.surface_description());
    }
    data.set_title(join_title(components));
}

/// String-typed front of [`plot_by_lane`]; fails on an unknown metric name.
pub fn plot_by_lane_named(
    metrics: &RunMetrics,
    metric_name: &str,
    options: &FilterOptions,
    data: &mut PlotData<CandlePoint>,
) -> Result<(), RunPlotError> {
    let metric_type: MetricType = metric_name.parse()?;
    plot_by_lane(metrics, metric_type, options, data);
    Ok(())
}

/// Join title components with single spaces, dropping empty ones.
pub(crate) fn join_title(components: Vec<String>) -> String {
    components
        .into_iter()
        .filter(|component| !component.is_empty())
        .join(" ")
}
