//! Command-line front end for decrypting and inspecting ECDH-ES JWEs

use crate::config::{self, DecryptorConfig};
use crate::decrypt::EcdhDirectDecryptor;
use crate::jwk::Jwk;
use crate::message::JweMessage;
use crate::registry::{AlgorithmRegistry, ContentEncryptionAlgorithm};
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// ECDH-ES direct key agreement JWE tool
#[derive(Parser, Debug)]
#[command(name = "ecdh-jwe-cli")]
#[command(about = "Decrypt and inspect ECDH-ES direct key agreement JWEs", long_about = None)]
pub struct Cli {
    /// Log pipeline stages to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Decrypt a compact JWE with a private JWK
    #[command(name = "decrypt")]
    Decrypt {
        /// File holding the recipient's private EC JWK
        #[arg(short, long, required = true)]
        key: PathBuf,

        /// File holding the compact JWE (reads stdin if omitted)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output file for the plaintext (writes stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Only accept this content encryption algorithm (A128GCM, A192GCM or A256GCM)
        #[arg(short, long)]
        enc: Option<String>,

        /// Reject ephemeral keys sent under the legacy `epv` member
        #[arg(long)]
        no_legacy_epv: bool,
    },

    /// Print the decoded protected header of a compact JWE
    #[command(name = "inspect")]
    Inspect {
        /// File holding the compact JWE (reads stdin if omitted)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
}

/// Parses the command line and runs the selected command
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Decrypt {
            key,
            input,
            output,
            enc,
            no_legacy_epv,
        } => decrypt(DecryptOptions {
            key_file: &key,
            input: input.as_deref(),
            output: output.as_deref(),
            enc: enc.as_deref(),
            accept_legacy_epv: !no_legacy_epv,
        }),
        Commands::Inspect { input } => inspect(input.as_deref()),
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("ecdh_jwe=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

struct DecryptOptions<'a> {
    key_file: &'a Path,
    input: Option<&'a Path>,
    output: Option<&'a Path>,
    enc: Option<&'a str>,
    accept_legacy_epv: bool,
}

fn decrypt(options: DecryptOptions<'_>) -> Result<()> {
    let registry = AlgorithmRegistry::standard();

    let key_json = fs::read_to_string(options.key_file)
        .with_context(|| format!("Failed to read key file {}", options.key_file.display()))?;
    let jwk: Jwk = serde_json::from_str(&key_json).context("Key file is not a JWK")?;
    let private_key = jwk
        .to_private_key(registry)
        .context("Key file does not hold a usable EC private key")?;
    debug!(curve = %private_key.curve(), "Loaded recipient key");

    let config = build_config(registry, options.enc, options.accept_legacy_epv)?;
    let decryptor = EcdhDirectDecryptor::standard().with_config(config);

    let compact = read_compact(options.input)?;
    let plaintext = decryptor
        .decrypt_compact(&private_key, &compact)
        .context("Decryption failed")?;

    match options.output {
        Some(path) => {
            fs::write(path, &plaintext)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(bytes = plaintext.len(), "Plaintext saved to {}", path.display());
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(&plaintext)?;
            stdout.flush()?;
        }
    }
    Ok(())
}

fn build_config(
    registry: &AlgorithmRegistry,
    enc: Option<&str>,
    accept_legacy_epv: bool,
) -> Result<DecryptorConfig> {
    let config = match enc {
        Some(name) => {
            let algorithm: ContentEncryptionAlgorithm = match registry.content_algorithm(name) {
                Some(algorithm) => algorithm,
                None => bail!("Unknown content encryption algorithm: {}", name),
            };
            DecryptorConfig::for_content_algorithm(algorithm)
        }
        None => DecryptorConfig::default(),
    }
    .with_legacy_epv(accept_legacy_epv);

    config::validate(&config)?;
    Ok(config)
}

fn inspect(input: Option<&Path>) -> Result<()> {
    let compact = read_compact(input)?;
    let message = JweMessage::from_compact(&compact).context("Not a compact JWE")?;

    let header = serde_json::to_string_pretty(message.header())?;
    println!("{}", header);
    println!(
        "encrypted_key: {} bytes, iv: {} bytes, ciphertext: {} bytes, tag: {} bytes",
        message.encrypted_key().len(),
        message.iv().len(),
        message.ciphertext().len(),
        message.tag().len()
    );
    Ok(())
}

fn read_compact(input: Option<&Path>) -> Result<String> {
    let raw = match input {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read JWE from stdin")?;
            buffer
        }
    };
    Ok(raw.trim().to_string())
}
