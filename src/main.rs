use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use negative_harmony::config::{Config, DEFAULT_CONFIG_FILE};
use negative_harmony::general::check;
use negative_harmony::{live, negate_file, PitchClass, ReflectionMode, TargetOctave};

/// Apply negative harmony to a MIDI file, or live between two MIDI ports
#[derive(Parser, Debug)]
#[command(name = "negative-harmony", version)]
struct Cli {
    /// Negative mode: le, so, fa, cn or ca [default: ca]
    #[arg(long)]
    mode: Option<ReflectionMode>,

    /// MIDI file name, looked up in the input directory
    #[arg(short = 'm', long = "midi")]
    midi: Option<String>,

    /// Generator (tonic) the axis is built on, a sharp label C..B [default: C]
    #[arg(short, long)]
    generator: Option<PitchClass>,

    /// Target octave for mode fa, 0-10 [default: 4]
    #[arg(short, long)]
    octave: Option<TargetOctave>,

    /// JSON config file with defaults; ignored if missing
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Directory the MIDI file is read from [default: midi]
    #[arg(long)]
    input_dir: Option<PathBuf>,

    /// Directory the negated file is written to [default: neg]
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Negate a live MIDI port instead of a file
    #[arg(long)]
    live: bool,

    /// Print per-note reflection details
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(_) => (),
        Err(err) => {
            let config_error = err
                .downcast_ref::<negative_harmony::Error>()
                .is_some_and(|err| err.is_config_error());
            if config_error {
                check::print_failed(&format!("Configuration error: {:#}", err));
                std::process::exit(2);
            }
            check::print_failed(&format!("{:#}", err));
            std::process::exit(1);
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("negative_harmony=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

/// Merge command line flags over the config file.
fn resolve_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::load(&cli.config)?;
    if let Some(mode) = cli.mode {
        config.negative.mode = mode;
    }
    if let Some(generator) = cli.generator {
        config.negative.generator = generator;
    }
    if let Some(octave) = cli.octave {
        config.negative.octave = octave;
    }
    if let Some(dir) = &cli.input_dir {
        config.paths.input_dir = dir.clone();
    }
    if let Some(dir) = &cli.output_dir {
        config.paths.output_dir = dir.clone();
    }
    Ok(config)
}

fn run(cli: Cli) -> Result<()> {
    tracing::debug!("{:?}", cli);
    let config = negative_harmony::init_config(resolve_config(&cli)?);
    let reflector = config.negative.reflector();
    tracing::info!("Settings: {} scale {}", reflector, reflector.rotation());

    if cli.live {
        return live::run_live(config, &reflector).context("live mode stopped");
    }

    let midi = cli
        .midi
        .filter(|name| !name.trim().is_empty())
        .context("no MIDI file given, pass one with -m/--midi")?;
    let input = config.paths.input_dir.join(&midi);
    // the output name is built from the bare file name
    let input_name = Path::new(&midi)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| midi.clone());

    let outcome = negate_file(&input, &input_name, &config.paths.output_dir, &reflector)
        .with_context(|| format!("negating {} failed", input.display()))?;
    check::print_completed(&outcome);
    Ok(())
}
