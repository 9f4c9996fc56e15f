use std::ops::{Index, IndexMut};

use getset::{CopyGetters, Getters};
use serde::{Deserialize, Serialize};

use crate::plot::data::Axis;

/// Dense row-major grid backing the q-score heatmap, with row = cycle - 1
/// and column = score - 1.
#[derive(Debug, Clone, Default, CopyGetters, Getters, Serialize, Deserialize)]
pub struct HeatmapData {
    values: Vec<f32>,
    #[getset(get_copy = "pub")]
    row_count: usize,
    #[getset(get_copy = "pub")]
    column_count: usize,
    #[getset(get = "pub")]
    x_axis: Axis,
    #[getset(get = "pub")]
    y_axis: Axis,
    #[getset(get = "pub")]
    title: String,
}

impl HeatmapData {
    pub fn new() -> Self {
        HeatmapData::default()
    }

    /// Resize to `rows x columns`, zero-filled.
    pub fn resize(&mut self, rows: usize, columns: usize) {
        self.row_count = rows;
        self.column_count = columns;
        self.values.clear();
        self.values.resize(rows * columns, 0.0);
    }

    pub fn clear(&mut self) {
        self.values.clear();
        self.row_count = 0;
        self.column_count = 0;
        self.x_axis.clear();
        self.y_axis.clear();
        self.title.clear();
    }

    pub fn at(&self, row: usize, column: usize) -> f32 {
        self[(row, column)]
    }

    /// One row of the grid, score-ordered.
    pub fn row(&self, row: usize) -> &[f32] {
        let start = row * self.column_count;
        &self.values[start..start + self.column_count]
    }

    /// Largest cell value; zero on an empty grid.
    pub fn max_value(&self) -> f32 {
        self.values.iter().copied().fold(0.0, f32::max)
    }

    /// Sum over all cells.
    pub fn total(&self) -> f64 {
        self.values.iter().map(|&v| v as f64).sum()
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
}

impl Index<(usize, usize)> for HeatmapData {
    type Output = f32;

    fn index(&self, (row, column): (usize, usize)) -> &f32 {
        debug_assert!(row < self.row_count && column < self.column_count);
        &self.values[row * self.column_count + column]
    }
}

impl IndexMut<(usize, usize)> for HeatmapData {
    fn index_mut(&mut self, (row, column): (usize, usize)) -> &mut f32 {
        debug_assert!(row < self.row_count && column < self.column_count);
        &mut self.values[row * self.column_count + column]
    }
}
