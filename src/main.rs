use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueHint};
use seismic_synth::config::SynthConfig;
use seismic_synth::{convert, visualisation, Benchmark};
use std::path::PathBuf;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Synthetic velocity models and shot gathers for seismic imaging benchmarks"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build a velocity model and shot gather and write every artifact
    Generate(GenerateArgs),

    /// Render PNG previews from previously generated blobs
    Preview(PreviewArgs),

    /// Convert a float32 model blob and its JSON sidecar to a grayscale PNG
    ToPng(ToPngArgs),

    /// Re-encode a binary PGM image as PNG
    PgmToPng(PgmToPngArgs),
}

#[derive(Args)]
struct GenerateArgs {
    /// TOML configuration; flags below override its values
    #[arg(long, value_hint = ValueHint::FilePath)]
    config: Option<String>,

    /// Output directory
    #[arg(long, value_hint = ValueHint::DirPath)]
    out_dir: Option<PathBuf>,

    #[arg(long)]
    nx: Option<usize>,

    #[arg(long)]
    nz: Option<usize>,

    /// Horizontal spacing (m)
    #[arg(long)]
    dx: Option<f64>,

    /// Vertical spacing (m)
    #[arg(long)]
    dz: Option<f64>,

    /// Samples per trace
    #[arg(long)]
    nt: Option<usize>,

    /// Sample interval (s)
    #[arg(long)]
    dt: Option<f64>,

    /// Dominant wavelet frequency (Hz)
    #[arg(long)]
    f0: Option<f64>,

    #[arg(long)]
    seed: Option<u64>,

    /// Skip the PNG previews
    #[arg(long)]
    no_previews: bool,
}

impl GenerateArgs {
    fn resolve(&self) -> Result<SynthConfig> {
        let mut config = match &self.config {
            Some(path) => SynthConfig::from_file(path)?,
            None => SynthConfig::default(),
        };
        if let Some(dir) = &self.out_dir {
            config.output.dir = dir.clone();
        }
        if self.no_previews {
            config.output.previews = false;
        }
        let grid = &mut config.grid;
        grid.nx = self.nx.unwrap_or(grid.nx);
        grid.nz = self.nz.unwrap_or(grid.nz);
        grid.dx = self.dx.unwrap_or(grid.dx);
        grid.dz = self.dz.unwrap_or(grid.dz);
        let acq = &mut config.acquisition;
        acq.nt = self.nt.unwrap_or(acq.nt);
        acq.dt = self.dt.unwrap_or(acq.dt);
        acq.f0 = self.f0.unwrap_or(acq.f0);
        config.seed = self.seed.unwrap_or(config.seed);

        config.validate()?;
        Ok(config)
    }
}

#[derive(Args)]
struct PreviewArgs {
    /// Directory holding the generated blobs and sidecars
    #[arg(long, default_value = "data/synthetic", value_hint = ValueHint::DirPath)]
    data_dir: PathBuf,

    /// Directory for the PNG previews
    #[arg(long, default_value = "artifacts/synthetic_preview", value_hint = ValueHint::DirPath)]
    out_dir: PathBuf,
}

#[derive(Args)]
struct ToPngArgs {
    #[arg(long, value_hint = ValueHint::FilePath)]
    input: PathBuf,

    #[arg(long, value_hint = ValueHint::FilePath)]
    meta: PathBuf,

    #[arg(long, value_hint = ValueHint::FilePath)]
    output: PathBuf,
}

#[derive(Args)]
struct PgmToPngArgs {
    #[arg(value_hint = ValueHint::FilePath)]
    input: PathBuf,

    #[arg(value_hint = ValueHint::FilePath)]
    output: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let written = match cli.command {
        Command::Generate(args) => {
            let config = args.resolve()?;
            config.log_summary();
            let grid = config.grid()?;
            let benchmark = Benchmark::synthesize(&grid, &config.gather_params(), config.seed)?;
            benchmark
                .write_all(&config.output.dir, config.output.previews)
                .with_context(|| format!("Failed to write artifacts to {}", config.output.dir.display()))?
        }
        Command::Preview(args) => visualisation::preview_directory(&args.data_dir, &args.out_dir)
            .with_context(|| format!("Failed to render previews from {}", args.data_dir.display()))?,
        Command::ToPng(args) => vec![visualisation::float32_to_png(&args.input, &args.meta, &args.output)
            .with_context(|| format!("Failed to convert {}", args.input.display()))?],
        Command::PgmToPng(args) => {
            if !convert::conversion_available() {
                warn!("PGM support is not compiled in; rebuild with `--features convert`");
            }
            convert::pgm_to_png(&args.input, &args.output)
                .with_context(|| format!("Failed to convert {}", args.input.display()))?;
            vec![args.output]
        }
    };

    for path in written {
        println!("{}", path.display());
    }
    Ok(())
}
