use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
mod auth;
use keyset::crypto::{KEY_LEN, generate_random_bytes, hash_for_string};
use keyset::{Key, Keyset};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use zeroize::Zeroizing;

#[derive(Debug, Parser)]
#[command(name = "keyset")]
#[command(
    version,
    about = "Encrypt and decrypt with a rotating set of symmetric keys."
)]
struct Cli {
    /// Hex-encoded 256-bit key; repeat for older keys, current key first
    #[arg(
        long = "key",
        global = true,
        value_name = "HEX",
        env = "KEYSET_KEYS",
        value_delimiter = ',',
        hide_env_values = true
    )]
    keys: Vec<String>,

    /// Log level used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, clap::Args)]
struct IoArgs {
    /// File to read
    #[arg(long, short, value_name = "PATH")]
    input: PathBuf,

    /// File to write (default: stdout)
    #[arg(long, short, value_name = "PATH")]
    output: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Prints a fresh random key as hex
    Keygen,

    /// Prints the key derived from a passphrase as hex
    Hash,

    /// Encrypts a file with the current key, writing hex ciphertext
    Encrypt {
        #[command(flatten)]
        io: IoArgs,
    },

    /// Decrypts hex ciphertext with the first key that authenticates it
    Decrypt {
        #[command(flatten)]
        io: IoArgs,
    },
}

/// Keys from `--key`/`KEYSET_KEYS`, or one derived from the passphrase.
fn resolve_keyset(keys: &[String]) -> Result<Keyset> {
    if keys.is_empty() {
        let passphrase = auth::read_passphrase()?;
        return Ok(Keyset::with_key(Key::from_passphrase(&passphrase)));
    }

    let keys = keys
        .iter()
        .enumerate()
        .map(|(i, k)| parse_key(k).with_context(|| format!("invalid key #{}", i + 1)))
        .collect::<Result<Vec<_>>>()?;
    Ok(Keyset::from_keys(keys))
}

fn parse_key(hex_key: &str) -> Result<Key> {
    let material = Zeroizing::new(hex::decode(hex_key.trim()).context("key is not valid hex")?);
    if material.len() != KEY_LEN {
        bail!("key must be {KEY_LEN} bytes, got {}", material.len());
    }
    Ok(Key::from_material(material.to_vec()))
}

fn write_output(path: Option<&Path>, data: &[u8]) -> Result<()> {
    match path {
        Some(p) => fs::write(p, data).with_context(|| format!("failed to write {}", p.display())),
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(data)?;
            stdout.flush()?;
            Ok(())
        }
    }
}

fn main() -> Result<()> {
    let args = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();

    match args.command {
        Commands::Keygen => {
            let key = Zeroizing::new(generate_random_bytes(KEY_LEN)?);
            println!("{}", hex::encode(key.as_slice()));
        }
        Commands::Hash => {
            let passphrase = auth::read_passphrase()?;
            println!("{}", hex::encode(*hash_for_string(&passphrase)));
        }
        Commands::Encrypt { io: files } => {
            let keyset = resolve_keyset(&args.keys)?;
            let plaintext = Zeroizing::new(
                fs::read(&files.input)
                    .with_context(|| format!("failed to read {}", files.input.display()))?,
            );
            let ciphertext = keyset.encrypt(&plaintext)?;
            let mut encoded = hex::encode(ciphertext);
            encoded.push('\n');
            write_output(files.output.as_deref(), encoded.as_bytes())?;
            tracing::info!(bytes = plaintext.len(), "encrypted input");
        }
        Commands::Decrypt { io: files } => {
            let keyset = resolve_keyset(&args.keys)?;
            let encoded = fs::read_to_string(&files.input)
                .with_context(|| format!("failed to read {}", files.input.display()))?;
            let ciphertext = hex::decode(encoded.trim()).context("ciphertext is not valid hex")?;
            let plaintext = keyset.decrypt(&ciphertext)?;
            write_output(files.output.as_deref(), &plaintext)?;
            tracing::info!(bytes = plaintext.len(), "decrypted input");
        }
    }

    Ok(())
}
