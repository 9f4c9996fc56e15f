pub mod by_lane;
pub mod data;
pub mod filter_options;
pub mod heatmap_data;
pub mod metric_value;
pub mod qscore_heatmap;
pub mod stats;

pub use by_lane::{plot_by_lane, plot_by_lane_named, populate_candle_stick_by_lane};
pub use data::{Axis, CandlePoint, PlotData, PlotPoint, Series, auto_scale};
pub use filter_options::{FilterOptions, TileNaming};
pub use heatmap_data::HeatmapData;
pub use metric_value::{MetricType, MetricValue, TileMetricValue};
pub use qscore_heatmap::{plot_qscore_heatmap, populate_heatmap};
pub use stats::candle_stick;
