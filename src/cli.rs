use clap::builder::styling::{AnsiColor, Color};
use clap::builder::styling::{Style, Styles};
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "runplot",
    version = env!("CARGO_PKG_VERSION"),
    about = "QC plot aggregation from sequencing run metrics",
    styles = get_styles(),
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Candle-stick plot of a tile metric grouped by lane
    #[command(alias = "lane")]
    PlotByLane {
        /// Run folder containing RunInfo.xml and InterOp/
        run_folder: String,

        /// Metric to plot (e.g. Density, ClusterCount, PercentPhasing)
        #[arg(short, long, default_value = "Density")]
        metric: String,

        /// Restrict to one lane
        #[arg(long)]
        lane: Option<u16>,

        /// Restrict to one surface
        #[arg(long)]
        surface: Option<u16>,

        /// Restrict read-specific metrics to one read
        #[arg(long)]
        read: Option<u16>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "json")]
        format: OutputFormat,
    },

    /// Heatmap of q-score counts over cycles
    #[command(alias = "qhm")]
    QscoreHeatmap {
        /// Run folder containing RunInfo.xml and InterOp/
        run_folder: String,

        /// Restrict to one lane
        #[arg(long)]
        lane: Option<u16>,

        /// Restrict to one surface
        #[arg(long)]
        surface: Option<u16>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "json")]
        format: OutputFormat,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Csv,
}

pub fn get_styles() -> Styles {
    Styles::styled()
        .usage(
            Style::new()
                .bold()
                .underline()
                .fg_color(Some(Color::Ansi(AnsiColor::Yellow))),
        )
        .header(
            Style::new()
                .bold()
                .underline()
                .fg_color(Some(Color::Ansi(AnsiColor::Yellow))),
        )
        .literal(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green))))
        .invalid(
            Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Red))),
        )
        .error(
            Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Red))),
        )
        .placeholder(Style::new().fg_color(Some(Color::Ansi(AnsiColor::White))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plot_by_lane() {
        let args = Args::try_parse_from([
            "runplot",
            "plot-by-lane",
            "/runs/160223",
            "--metric",
            "ClusterCount",
            "--lane",
            "2",
        ])
        .unwrap();
        match args.command {
            Commands::PlotByLane {
                run_folder,
                metric,
                lane,
                surface,
                read,
                format,
            } => {
                assert_eq!(run_folder, "/runs/160223");
                assert_eq!(metric, "ClusterCount");
                assert_eq!(lane, Some(2));
                assert_eq!(surface, None);
                assert_eq!(read, None);
                assert_eq!(format, OutputFormat::Json);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_qscore_heatmap_alias() {
        let args =
            Args::try_parse_from(["runplot", "qhm", "/runs/160223", "--format", "csv"]).unwrap();
        match args.command {
            Commands::QscoreHeatmap { format, .. } => assert_eq!(format, OutputFormat::Csv),
            other => panic!("unexpected command {:?}", other),
        }
    }
}
