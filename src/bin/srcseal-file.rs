use anyhow::{bail, Context};
use clap::Parser;
use srcseal::{AesTransform, ByteTransform, KeyFile};
use std::path::{Path, PathBuf};
use std::process::exit;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "srcseal-file")]
#[command(version)]
#[command(about = "Seal or open a single file", long_about = None)]
struct Cli {
    /// File to read
    input: PathBuf,

    /// File to write
    output: PathBuf,

    /// Key file (32 raw bytes or 64 hex characters)
    #[arg(short, long, env = "SRCSEAL_KEY_FILE")]
    key_file: PathBuf,

    /// Open a sealed file instead of sealing
    #[arg(short, long)]
    decrypt: bool,
}

fn main() {
    let layer = fmt::layer().compact().with_writer(std::io::stderr);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry().with(layer).with(filter).init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("Error: {:#}", e);
        exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    if !cli.input.is_file() {
        bail!("{} is not a file", cli.input.display());
    }

    let transform = AesTransform::new(KeyFile::load(&cli.key_file)?);
    if cli.decrypt {
        transform
            .decrypt(&cli.input, &cli.output)
            .with_context(|| format!("cannot open {}", cli.input.display()))?;
    } else {
        transform
            .encrypt(&cli.input, &cli.output)
            .with_context(|| format!("cannot seal {}", cli.input.display()))?;
    }

    normalize_permissions(&cli.output)?;
    Ok(())
}

#[cfg(unix)]
fn normalize_permissions(path: &Path) -> anyhow::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))?;
    Ok(())
}

#[cfg(not(unix))]
fn normalize_permissions(_path: &Path) -> anyhow::Result<()> {
    Ok(())
}
