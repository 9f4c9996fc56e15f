use std::io::Write;

use serde::Serialize;

use crate::error::RunPlotError;
use crate::plot::data::{CandlePoint, PlotData};
use crate::plot::heatmap_data::HeatmapData;

#[derive(Debug, Serialize)]
struct CandleRow<'a> {
    series: &'a str,
    lane: f32,
    lower_whisker: f32,
    q1: f32,
    median: f32,
    q3: f32,
    upper_whisker: f32,
    outliers: String,
}

/// Write a candle-stick plot as one CSV row per point.
pub fn write_candle_csv<W: Write>(
    data: &PlotData<CandlePoint>,
    writer: W,
) -> Result<(), RunPlotError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for series in data.series() {
        for point in series.points() {
            wtr.serialize(CandleRow {
                series: series.title(),
                lane: point.x(),
                lower_whisker: point.lower_whisker(),
                q1: point.p25(),
                median: point.p50(),
                q3: point.p75(),
                upper_whisker: point.upper_whisker(),
                outliers: point
                    .outliers()
                    .iter()
                    .map(|v| v.to_string())
                    .collect::<Vec<_>>()
                    .join(";"),
            })?;
        }
    }
    wtr.flush()?;
    Ok(())
}

/// Write the heatmap grid as CSV: a header of scores, then one row per
/// cycle.
pub fn write_heatmap_csv<W: Write>(data: &HeatmapData, writer: W) -> Result<(), RunPlotError> {
    let mut wtr = csv::Writer::from_writer(writer);
    let mut header = vec!["cycle".to_string()];
    header.extend((1..=data.column_count()).map(|score| format!("q{}", score)));
    wtr.write_record(&header)?;
    for row in 0..data.row_count() {
        let mut record = vec![(row + 1).to_string()];
        record.extend(data.row(row).iter().map(|v| v.to_string()));
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}
