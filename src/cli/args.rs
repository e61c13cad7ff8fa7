use crate::models::IntensityBucket;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sunset-precip")]
#[command(about = "Urban versus rural sunset precipitation analysis and figure rendering")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        help = "Settings file [default: sunset-precip.toml if present]"
    )]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// The subcommand to run; no subcommand means `render` with defaults
    pub fn resolved_command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Render {
            data_dir: None,
            figures_dir: None,
            output: None,
            year: None,
            intensity: None,
        })
    }
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Render the three-panel composite figure
    Render {
        #[arg(
            short,
            long,
            help = "Directory holding the .npy curves and spa_{year}.txt files"
        )]
        data_dir: Option<PathBuf>,

        #[arg(short, long, help = "Figures directory [default: figures]")]
        figures_dir: Option<PathBuf>,

        #[arg(
            short,
            long,
            help = "Figure path, .png or .svg [default: {figures_dir}/figure1_composite.png]"
        )]
        output: Option<PathBuf>,

        #[arg(short, long, help = "Year shown on the map panel [default: 2020]")]
        year: Option<u16>,

        #[arg(
            short,
            long,
            help = "Intensity bucket for the temporal panels: light, moderate or heavy"
        )]
        intensity: Option<IntensityBucket>,
    },

    /// Print difference index and temporal stability summaries
    Summary {
        #[arg(short, long)]
        data_dir: Option<PathBuf>,

        #[arg(long, default_value = "false", help = "Print the summary as JSON")]
        json: bool,
    },

    /// Check that every expected input file exists and parses
    Validate {
        #[arg(short, long)]
        data_dir: Option<PathBuf>,
    },

    /// Write derived tables: DI curves, city records, stability series and run summary
    Export {
        #[arg(short, long)]
        data_dir: Option<PathBuf>,

        #[arg(short, long, help = "Figures directory [default: figures]")]
        figures_dir: Option<PathBuf>,

        #[arg(
            short,
            long,
            help = "Output directory [default: {figures_dir}/export-{YYMMDD}]"
        )]
        output_dir: Option<PathBuf>,

        #[arg(short, long, help = "Parquet compression [default: snappy]")]
        compression: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_subcommand_defaults_to_render() {
        let cli = Cli::try_parse_from(["sunset-precip"]).unwrap();
        assert!(matches!(
            cli.resolved_command(),
            Commands::Render {
                data_dir: None,
                figures_dir: None,
                output: None,
                year: None,
                intensity: None
            }
        ));
    }

    #[test]
    fn test_render_arguments() {
        let cli = Cli::try_parse_from([
            "sunset-precip",
            "--verbose",
            "render",
            "--data-dir",
            "/tmp/data",
            "--intensity",
            "moderate",
            "--year",
            "2012",
        ])
        .unwrap();

        assert!(cli.verbose);
        match cli.resolved_command() {
            Commands::Render {
                data_dir,
                year,
                intensity,
                ..
            } => {
                assert_eq!(data_dir, Some(PathBuf::from("/tmp/data")));
                assert_eq!(year, Some(2012));
                assert_eq!(intensity, Some(IntensityBucket::Moderate));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_unknown_intensity_rejected() {
        let parsed = Cli::try_parse_from(["sunset-precip", "render", "--intensity", "drizzle"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_export_figures_dir() {
        let cli = Cli::try_parse_from([
            "sunset-precip",
            "export",
            "--figures-dir",
            "/tmp/figures",
            "--compression",
            "zstd",
        ])
        .unwrap();

        match cli.resolved_command() {
            Commands::Export {
                figures_dir,
                compression,
                output_dir,
                ..
            } => {
                assert_eq!(figures_dir, Some(PathBuf::from("/tmp/figures")));
                assert_eq!(compression.as_deref(), Some("zstd"));
                assert_eq!(output_dir, None);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
