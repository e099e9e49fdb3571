//! # imgbatch - Main Entry Point
//!
//! Questo è il punto di ingresso principale dell'applicazione.
//!
//! ## Responsabilità:
//! - Parsing degli argomenti della command line con `clap`
//! - Inizializzazione del sistema di logging con `tracing` (su stderr)
//! - Caricamento della configurazione e override dai flag CLI
//! - Avvio del batch e conversione del report in exit status
//!
//! ## Esempio di utilizzo:
//! ```bash
//! imgbatch jpg --input scans/ --delete no
//! imgbatch shrink --input photos/ --max_dim 1280
//! imgbatch pad --input frames/ --n 6
//! imgbatch webp -q 80 -mt photos/
//! ```

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

use image_batch::{
    config::AllowList, json_output::JsonMessage, utils::parse_bool, BatchOptimizer, CommandEncoder,
    Config, ImageCrateCodec, ToolPathResolver,
};

#[derive(Parser, Debug)]
#[command(name = "imgbatch", version)]
#[command(about = "Batch image maintenance: convert to JPG/WebP, shrink oversized photos, zero-pad numeric names")]
struct Cli {
    /// Config file (default: <config dir>/imgbatch/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Verbose logging (long form only, `-v` belongs to the webp encoders)
    #[arg(long, global = true)]
    verbose: bool,

    /// Emit one JSON event per line on stdout
    #[arg(long, global = true)]
    json: bool,

    /// Report what would be done without touching any file
    #[arg(long, global = true)]
    dry_run: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert PNG/TIFF/JPEG images to .jpg
    Jpg(JpgArgs),
    /// Downscale JPGs whose longer side exceeds max_dim
    Shrink(ShrinkArgs),
    /// Zero-pad numeric file names
    Pad(PadArgs),
    /// Convert images under a directory to .webp with cwebp/gif2webp
    Webp(WebpArgs),
    /// Write the current configuration to the config file
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Args, Debug)]
struct JpgArgs {
    /// Files or directories to convert
    #[arg(long, required = true, num_args = 1..)]
    input: Vec<PathBuf>,

    /// Directory for the .jpg files (default: next to each source)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Delete sources after a verified conversion
    #[arg(long, value_parser = parse_bool)]
    delete: Option<bool>,

    /// Delete *.Identifier files in the input directories
    #[arg(long = "delete_identifiers", alias = "delete-identifiers", value_parser = parse_bool)]
    delete_identifiers: Option<bool>,

    /// Replace the extension allow-list (repeatable)
    #[arg(long = "ext")]
    ext: Vec<String>,
}

#[derive(Args, Debug)]
struct ShrinkArgs {
    /// Files or directories to scan recursively
    #[arg(long, required = true, num_args = 1..)]
    input: Vec<PathBuf>,

    /// Maximum length of the longer side, 0 disables
    #[arg(long = "max_dim", alias = "max-dim")]
    max_dim: Option<u32>,

    /// Replace the extension allow-list (repeatable)
    #[arg(long = "ext")]
    ext: Vec<String>,
}

#[derive(Args, Debug)]
struct PadArgs {
    /// Files or directories to scan recursively
    #[arg(long, required = true, num_args = 1..)]
    input: Vec<PathBuf>,

    /// Width of the padded stem
    #[arg(long)]
    n: Option<usize>,

    /// Replace the extension allow-list (repeatable)
    #[arg(long = "ext")]
    ext: Vec<String>,
}

#[derive(Args, Debug)]
struct WebpArgs {
    /// Encoder options followed by the target directory
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, num_args = 0..)]
    args: Vec<String>,
}

impl WebpArgs {
    /// Split `[OPTIONS...] TARGET_DIR`
    fn split(&self) -> Option<(&[String], PathBuf)> {
        let (target, options) = self.args.split_last()?;
        Some((options, PathBuf::from(target)))
    }
}

/// CLI flags win over the config file
fn apply_overrides(config: &mut Config, cli: &Cli) {
    config.json_output |= cli.json;
    config.dry_run |= cli.dry_run;

    match &cli.command {
        Command::Jpg(args) => {
            if let Some(ref output) = args.output {
                config.output_path = Some(output.clone());
            }
            if let Some(delete) = args.delete {
                config.delete_sources = delete;
            }
            if let Some(delete_identifiers) = args.delete_identifiers {
                config.delete_identifiers = delete_identifiers;
            }
            if !args.ext.is_empty() {
                config.allow_lists.jpg = AllowList::new(&args.ext);
            }
        }
        Command::Shrink(args) => {
            if let Some(max_dim) = args.max_dim {
                config.max_dim = max_dim;
            }
            if !args.ext.is_empty() {
                config.allow_lists.shrink = AllowList::new(&args.ext);
            }
        }
        Command::Pad(args) => {
            if let Some(n) = args.n {
                config.pad_width = n;
            }
            if !args.ext.is_empty() {
                config.allow_lists.pad = AllowList::new(&args.ext);
            }
        }
        Command::Webp(_) | Command::InitConfig { .. } => {}
    }
}

async fn init_config(cli: &Cli, config: &Config, force: bool) -> Result<ExitCode> {
    let path = match cli.config.clone().or_else(Config::default_path) {
        Some(path) => path,
        None => return Err(anyhow::anyhow!("No config directory available, use --config")),
    };
    if path.exists() && !force {
        return Err(anyhow::anyhow!(
            "Config file already exists: {} (use --force to overwrite)",
            path.display()
        ));
    }

    config.save_to_file(&path).await?;
    info!("Configuration written to {}", path.display());
    Ok(ExitCode::SUCCESS)
}

fn build_optimizer(config: Config) -> Result<BatchOptimizer<ImageCrateCodec, CommandEncoder>> {
    let codec = ImageCrateCodec::new(config.jpeg_quality);
    let encoder = CommandEncoder::new(ToolPathResolver::new());
    BatchOptimizer::new(config, codec, encoder)
}

async fn run(cli: Cli) -> Result<ExitCode> {
    // init-config may target a file that does not exist yet
    let mut config = match (&cli.command, cli.config.as_deref()) {
        (Command::InitConfig { .. }, Some(path)) => Config::from_file(path).await?,
        (_, explicit) => Config::load(explicit).await?,
    };
    apply_overrides(&mut config, &cli);

    let report = match &cli.command {
        Command::Jpg(args) => build_optimizer(config)?.convert_to_jpg(&args.input).await,
        Command::Shrink(args) => build_optimizer(config)?.shrink(&args.input).await,
        Command::Pad(args) => build_optimizer(config)?.zero_pad(&args.input).await,
        Command::Webp(args) => {
            let Some((options, target_dir)) = args.split() else {
                println!("webp: No target directory provided. Exiting.");
                return Ok(ExitCode::FAILURE);
            };
            build_optimizer(config)?.convert_to_webp(&target_dir, options).await
        }
        Command::InitConfig { force } => {
            config.validate()?;
            return init_config(&cli, &config, *force).await;
        }
    };

    Ok(if report.has_failures() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG wins over --verbose
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let json = cli.json;
    match run(cli).await {
        Ok(code) => Ok(code),
        Err(e) => {
            if json {
                JsonMessage::error(e.to_string(), Some(format!("{:?}", e))).emit();
            }
            Err(e)
        }
    }
}
