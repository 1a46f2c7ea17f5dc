use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use base64::Engine;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use sctkit::certspec::SpecCertificateBuilder;
use sctkit::config::Config;
use sctkit::sct::sign_and_encode;
use sctkit::specification::signing_request_from_specification;

/// Builds a Signed Certificate Timestamp from a specification file.
#[derive(Parser, Debug)]
struct Args {
    /// SCT specification file.
    specification: PathBuf,
    /// Output file, or `-` to print the SCT as base64.
    output: PathBuf,
    /// JSON configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(config.logging_level()))
        .with_writer(std::io::stderr)
        .init();

    let specification = fs::read_to_string(&args.specification)
        .with_context(|| format!("reading {}", args.specification.display()))?;
    let keys = config.key_ring()?;
    let defaults = config.defaults()?;
    let builder = SpecCertificateBuilder::new(&keys, &defaults.key);

    let request = signing_request_from_specification(&specification, &defaults, &keys, &builder)
        .with_context(|| format!("building SCT from {}", args.specification.display()))?;
    let sct = sign_and_encode(&request)?;

    if args.output.as_os_str() == "-" {
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{}", base64::engine::general_purpose::STANDARD.encode(&sct))?;
    } else {
        fs::write(&args.output, &sct)
            .with_context(|| format!("writing {}", args.output.display()))?;
    }
    Ok(())
}
