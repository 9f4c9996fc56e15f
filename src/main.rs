use std::io::{self, Write};
use std::path::Path;

use clap::Parser;

use runplot::cli::{Args, Commands, OutputFormat};
use runplot::error::{EXIT_SUCCESS, RunPlotError};
use runplot::export::{write_candle_csv, write_heatmap_csv};
use runplot::metrics::RunMetrics;
use runplot::plot::{
    FilterOptions, HeatmapData, PlotData, TileNaming, plot_by_lane_named, plot_qscore_heatmap,
};

fn main() {
    pretty_env_logger::init();
    let args = Args::parse();

    let code = match run(args) {
        Ok(()) => EXIT_SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            err.exit_code()
        }
    };
    std::process::exit(code);
}

fn run(args: Args) -> Result<(), RunPlotError> {
    match args.command {
        Commands::PlotByLane {
            run_folder,
            metric,
            lane,
            surface,
            read,
            format,
        } => {
            let metrics = read_run_metrics(Path::new(&run_folder))?;
            let options =
                FilterOptions::with_attrs(TileNaming::FourDigit, lane, surface, read);
            let mut data = PlotData::new();
            plot_by_lane_named(&metrics, &metric, &options, &mut data)?;
            let stdout = io::stdout().lock();
            match format {
                OutputFormat::Json => write_json(&data, stdout)?,
                OutputFormat::Csv => write_candle_csv(&data, stdout)?,
            }
        }
        Commands::QscoreHeatmap {
            run_folder,
            lane,
            surface,
            format,
        } => {
            let mut metrics = read_run_metrics(Path::new(&run_folder))?;
            let options =
                FilterOptions::with_attrs(TileNaming::FourDigit, lane, surface, None);
            let mut data = HeatmapData::new();
            plot_qscore_heatmap(&mut metrics, &options, &mut data)?;
            let stdout = io::stdout().lock();
            match format {
                OutputFormat::Json => write_json(&data, stdout)?,
                OutputFormat::Csv => write_heatmap_csv(&data, stdout)?,
            }
        }
    }
    Ok(())
}

/// Load a run folder, rejecting one with no metric records at all.
fn read_run_metrics(run_folder: &Path) -> Result<RunMetrics, RunPlotError> {
    let metrics = RunMetrics::read(run_folder)?;
    if metrics.empty() {
        return Err(RunPlotError::EmptyInterop);
    }
    Ok(metrics)
}

fn write_json<T: serde::Serialize, W: Write>(value: &T, mut writer: W) -> Result<(), RunPlotError> {
    let json = serde_json::to_string_pretty(value)?;
    writeln!(writer, "{json}")?;
    Ok(())
}
