use clap::{Parser, Subcommand, ValueEnum};
use geotag_core::models::Axis;
use std::path::PathBuf;

/// Geotag - Reverse geocoding for photo sidecar metadata
#[derive(Parser, Debug)]
#[command(name = "geotag")]
#[command(about = "Fill place names in XMP sidecars from GPS coordinates", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Show planned changes without writing them
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Log everything, including per-field decisions
    #[arg(long, global = true)]
    pub debug: bool,

    /// Configuration file (defaults to ./geotag.toml when present)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Log level used when RUST_LOG is not set
    pub fn log_level(&self) -> &'static str {
        if self.debug {
            return "trace";
        }
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fill place fields of XMP sidecars
    Enrich(EnrichArgs),

    /// Convert a coordinate between hemisphere-tagged and decimal notation
    Convert(ConvertArgs),

    /// Show the effective configuration and where each value comes from
    Config,
}

#[derive(Parser, Debug)]
pub struct EnrichArgs {
    /// XMP files or folders (folders are scanned recursively)
    #[arg(short = 'x', long = "xmp", value_name = "SOURCE", required = true, num_args = 1..)]
    pub sources: Vec<PathBuf>,

    /// Lightroom folder containing the .lrcat catalog
    #[arg(short = 'l', long = "lightroom", value_name = "FOLDER")]
    pub lightroom: Option<PathBuf>,

    /// Fields that may be overwritten: overwrite, location, city, state, country, countrycode
    #[arg(short = 'f', long = "field", value_name = "CONTROL", num_args = 1..)]
    pub fields: Vec<String>,

    /// Geocoding API key
    #[arg(long)]
    pub api_key: Option<String>,

    /// Language for place names returned by the geocoder
    #[arg(long)]
    pub language: Option<String>,

    /// Do not consult the geocoder
    #[arg(long)]
    pub no_geocode: bool,
}

#[derive(Parser, Debug)]
pub struct ConvertArgs {
    /// Coordinate, e.g. "35,40.0153533333S" or "-35.668589"
    #[arg(allow_hyphen_values = true)]
    pub value: String,

    /// Axis the value belongs to
    #[arg(long, value_enum)]
    pub axis: AxisArg,
}

/// Coordinate axis selection
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum AxisArg {
    Latitude,
    Longitude,
}

impl From<AxisArg> for Axis {
    fn from(axis: AxisArg) -> Self {
        match axis {
            AxisArg::Latitude => Axis::Latitude,
            AxisArg::Longitude => Axis::Longitude,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_enrich() {
        let cli = Cli::parse_from([
            "geotag", "enrich", "-x", "a.xmp", "photos", "-l", "lr", "-f", "overwrite", "city", "-vv",
        ]);

        assert_eq!(cli.log_level(), "trace");
        match cli.command {
            Commands::Enrich(args) => {
                assert_eq!(args.sources, vec![PathBuf::from("a.xmp"), PathBuf::from("photos")]);
                assert_eq!(args.lightroom, Some(PathBuf::from("lr")));
                assert_eq!(args.fields, vec!["overwrite", "city"]);
                assert!(!args.no_geocode);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_convert_negative_value() {
        let cli = Cli::parse_from(["geotag", "--json", "convert", "-139.5", "--axis", "longitude"]);
        assert!(cli.json);
        assert_eq!(cli.log_level(), "info");
        match cli.command {
            Commands::Convert(args) => {
                assert_eq!(args.value, "-139.5");
                assert!(matches!(args.axis, AxisArg::Longitude));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_enrich_requires_sources() {
        assert!(Cli::try_parse_from(["geotag", "enrich"]).is_err());
    }
}
