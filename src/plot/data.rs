use std::ops::{Index, IndexMut};

use getset::{CopyGetters, Getters};
use serde::{Deserialize, Serialize};

/// One plot axis: a closed range and a label.
#[derive(Debug, Clone, Default, CopyGetters, Getters, Serialize, Deserialize)]
pub struct Axis {
    #[getset(get_copy = "pub")]
    min: f32,
    #[getset(get_copy = "pub")]
    max: f32,
    #[getset(get = "pub")]
    label: String,
}

impl Axis {
    pub fn set_range(&mut self, min: f32, max: f32) {
        self.min = min;
        self.max = max;
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    pub fn clear(&mut self) {
        self.min = 0.0;
        self.max = 0.0;
        self.label.clear();
    }
}

/// Anything placeable on a plot. `min_value`/`max_value` give the vertical
/// extent the point occupies, so auto-scaling covers whiskers and outliers,
/// not just the y coordinate.
pub trait PlotPoint {
    fn x(&self) -> f32;
    fn y(&self) -> f32;

    fn min_value(&self) -> f32 {
        self.y()
    }

    fn max_value(&self) -> f32 {
        self.y()
    }
}

/// Five-number summary of one lane plus its outliers. `y` is the median.
#[derive(Debug, Clone, Default, CopyGetters, Getters, Serialize, Deserialize)]
pub struct CandlePoint {
    #[getset(get_copy = "pub")]
    x: f32,
    #[getset(get_copy = "pub")]
    p25: f32,
    #[getset(get_copy = "pub")]
    p50: f32,
    #[getset(get_copy = "pub")]
    p75: f32,
    #[getset(get_copy = "pub")]
    lower_whisker: f32,
    #[getset(get_copy = "pub")]
    upper_whisker: f32,
    #[getset(get = "pub")]
    outliers: Vec<f32>,
}

impl CandlePoint {
    pub fn with_attrs(
        x: f32,
        p25: f32,
        p50: f32,
        p75: f32,
        lower_whisker: f32,
        upper_whisker: f32,
        outliers: Vec<f32>,
    ) -> Self {
        CandlePoint {
            x,
            p25,
            p50,
            p75,
            lower_whisker,
            upper_whisker,
            outliers,
        }
    }
}

impl PlotPoint for CandlePoint {
    fn x(&self) -> f32 {
        self.x
    }

    fn y(&self) -> f32 {
        self.p50
    }

    fn min_value(&self) -> f32 {
        self.outliers
            .iter()
            .copied()
            .fold(self.lower_whisker, f32::min)
    }

    fn max_value(&self) -> f32 {
        self.outliers
            .iter()
            .copied()
            .fold(self.upper_whisker, f32::max)
    }
}

/// An ordered point collection with a title and color.
#[derive(Debug, Clone, Default, Getters, Serialize, Deserialize)]
pub struct Series<P> {
    #[getset(get = "pub")]
    title: String,
    #[getset(get = "pub")]
    color: String,
    #[getset(get = "pub")]
    points: Vec<P>,
}

impl<P> Series<P> {
    pub fn new(title: impl Into<String>, color: impl Into<String>) -> Self {
        Series {
            title: title.into(),
            color: color.into(),
            points: Vec::new(),
        }
    }

    pub fn points_mut(&mut self) -> &mut Vec<P> {
        &mut self.points
    }

    pub fn push(&mut self, point: P) {
        self.points.push(point);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Fully assembled plot: series, axes, and a title. Created empty by the
/// caller, populated by exactly one engine invocation.
#[derive(Debug, Clone, Default, Getters, Serialize, Deserialize)]
pub struct PlotData<P> {
    series: Vec<Series<P>>,
    #[getset(get = "pub")]
    x_axis: Axis,
    #[getset(get = "pub")]
    y_axis: Axis,
    #[getset(get = "pub")]
    title: String,
}

impl<P> PlotData<P> {
    pub fn new() -> Self {
        PlotData {
            series: Vec::new(),
            x_axis: Axis::default(),
            y_axis: Axis::default(),
            title: String::new(),
        }
    }

    /// Replace the contents with `n` clones of the given series.
    pub fn assign(&mut self, n: usize, series: Series<P>)
    where
        P: Clone,
    {
        self.series = vec![series; n];
    }

    pub fn push_back(&mut self, series: Series<P>) {
        self.series.push(series);
    }

    pub fn series(&self) -> &[Series<P>] {
        &self.series
    }

    pub fn series_count(&self) -> usize {
        self.series.len()
    }

    pub fn set_xrange(&mut self, min: f32, max: f32) {
        self.x_axis.set_range(min, max);
    }

    pub fn set_yrange(&mut self, min: f32, max: f32) {
        self.y_axis.set_range(min, max);
    }

    pub fn set_xlabel(&mut self, label: impl Into<String>) {
        self.x_axis.set_label(label);
    }

    pub fn set_ylabel(&mut self, label: impl Into<String>) {
        self.y_axis.set_label(label);
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn clear(&mut self) {
        self.series.clear();
        self.x_axis.clear();
        self.y_axis.clear();
        self.title.clear();
    }
}

impl<P> Index<usize> for PlotData<P> {
    type Output = Series<P>;

    fn index(&self, index: usize) -> &Self::Output {
        &self.series[index]
    }
}

impl<P> IndexMut<usize> for PlotData<P> {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.series[index]
    }
}

/// Fit the axis ranges to the contained points. With `apply_padding`, the
/// y-span is stretched by `pad_factor` and the padded range re-centered on
/// the mean of the original extremes.
pub fn auto_scale<P: PlotPoint>(data: &mut PlotData<P>, apply_padding: bool, pad_factor: f32) {
    let mut x_min = f32::MAX;
    let mut x_max = f32::MIN;
    let mut y_min = f32::MAX;
    let mut y_max = f32::MIN;
    let mut any = false;
    for series in &data.series {
        for point in series.points() {
            any = true;
            x_min = x_min.min(point.x());
            x_max = x_max.max(point.x());
            y_min = y_min.min(point.min_value());
            y_max = y_max.max(point.max_value());
        }
    }
    if !any {
        data.set_xrange(0.0, 0.0);
        data.set_yrange(0.0, 0.0);
        return;
    }
    if apply_padding {
        let center = (y_min + y_max) / 2.0;
        let half_span = (y_max - y_min) * pad_factor / 2.0;
        y_min = center - half_span;
        y_max = center + half_span;
    }
    data.set_xrange(x_min, x_max);
    data.set_yrange(y_min, y_max);
}
