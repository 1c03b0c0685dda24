use anyhow::Context;
use clap::Parser;
use srcseal::archive::prepare_archive;
use srcseal::prompt::confirm_overwrite_stdin;
use srcseal::{AesTransform, Archiver, BarSink, CryptoKey, KeyFile, RunConfig, RunSummary, SealError};
use std::path::PathBuf;
use std::process::exit;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "srcseal")]
#[command(version)]
#[command(about = "Clone a project and encrypt its Python sources in place", long_about = None)]
struct Cli {
    /// JSON configuration file with "select", "archive" and optional "except"
    config: PathBuf,

    /// Key file (32 raw bytes or 64 hex characters). A new key is generated
    /// and saved as <archive>.key when omitted
    #[arg(short, long, env = "SRCSEAL_KEY_FILE")]
    key_file: Option<PathBuf>,
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    match run(cli) {
        Ok(summary) if summary.is_success() => {
            println!("success!");
        }
        Ok(summary) => {
            for (path, err) in &summary.failed {
                eprintln!("failed: {}: {}", path.display(), err);
            }
            eprintln!("Error: {} file(s) could not be sealed", summary.failed.len());
            exit(1);
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            exit(1);
        }
    }
}

fn init_tracing() {
    let layer = fmt::layer().compact().with_writer(std::io::stderr);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry().with(layer).with(filter).init();
}

fn run(cli: Cli) -> anyhow::Result<RunSummary> {
    let config = RunConfig::load(&cli.config)?;

    let key = match &cli.key_file {
        Some(path) => KeyFile::load(path)?,
        None => CryptoKey::generate(),
    };

    prepare_archive(&config, |path| {
        confirm_overwrite_stdin(path).map_err(SealError::from)
    })?;
    println!(
        "Cloned {} to {}",
        config.select_dir().display(),
        config.archive_dir().display()
    );

    if cli.key_file.is_none() {
        let key_path = KeyFile::default_path_for(config.archive_dir());
        KeyFile::save(&key_path, &key)
            .with_context(|| format!("cannot save key to {}", key_path.display()))?;
        println!("Generated new key: {}", key_path.display());
    }
    println!("Key fingerprint: {}", key.fingerprint());

    let transform = AesTransform::new(key);
    let mut sink = BarSink::new("processing...");
    let summary = Archiver::new(&config, &transform).seal(&mut sink);

    println!(
        "Sealed {} file(s), deleted {}, left {} unchanged, excluded {}",
        summary.encrypted, summary.deleted, summary.skipped, summary.excluded
    );
    Ok(summary)
}
