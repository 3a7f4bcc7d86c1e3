use std::path::PathBuf;

use clap::Parser;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use frpac::config::{Config, FieldSource, FireFiles, OutOfRangePolicy};
use frpac::correction::BatchRunner;

#[derive(Parser, Debug)]
#[command(name = "frpac")]
#[command(about = "Atmospheric correction of fire radiative power")]
struct Args {
    /// JSON configuration file; the other inputs are ignored when given
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Fire pixel file (NetCDF or CSV)
    #[arg(short, long, required_unless_present = "config")]
    fire: Option<PathBuf>,

    /// Transmittance lookup table (CSV)
    #[arg(short, long, required_unless_present = "config")]
    lut: Option<PathBuf>,

    /// Precipitable water field (NetCDF or GeoTIFF); constant water vapor when absent
    #[arg(long)]
    field: Option<PathBuf>,

    /// Time step of the atmospheric field
    #[arg(long, default_value_t = 0)]
    time_index: usize,

    /// What to do with pixels outside the table or field: abort or missing
    #[arg(long, default_value_t = OutOfRangePolicy::Abort)]
    policy: OutOfRangePolicy,

    /// Correct pixels in parallel
    #[arg(long)]
    parallel: bool,

    /// Directory for the corrected CSV and JSON summary
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn into_config(self) -> Result<Config, Box<dyn std::error::Error>> {
        if let Some(path) = self.config {
            return Ok(Config::from_file(path)?);
        }

        let fire = self.fire.ok_or("missing --fire")?;
        let lut = self.lut.ok_or("missing --lut")?;

        let mut config = Config::new(FireFiles::Path(fire), lut)
            .with_out_of_range(self.policy)
            .with_parallel(self.parallel);

        if let Some(path) = self.field {
            let mut source = FieldSource::new(path);
            source.time_index = self.time_index;
            config = config.with_atmospheric_field(source);
        }
        if let Some(directory) = self.output {
            config = config.with_output_directory(directory);
        }

        Ok(config)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = args.into_config()?;
    let runner = BatchRunner::new(config)?;
    info!(files = runner.fire_files().len(), "Starting FRP atmospheric correction");

    let summaries = runner.process()?;
    for summary in &summaries {
        println!("{}", summary);
    }

    Ok(())
}
