//! Main entrypoint for the sequence simulator.

#![warn(
    missing_docs,
    clippy::missing_docs_in_private_items,
    clippy::clone_on_ref_ptr
)]

use anyhow::Context;
use sequence_preallocator::{Registry, Setting};
use sequence_sim::{run, Input, SequenceConfig};
use tracing_subscriber::EnvFilter;

/// The amount of values requested when `SEQUENCE_BUMPS` is not set.
const DEFAULT_BUMPS: u64 = 10;

fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = env_var("SEQUENCE_CONFIG")?.context("SEQUENCE_CONFIG env var is not set")?;
    let config: SequenceConfig =
        serde_json::from_str(&config).context("SEQUENCE_CONFIG env var is not valid")?;
    let preallocator = Setting::from_property(env_var("SEQUENCE_PREALLOCATOR")?.as_deref())?;
    let bumps = parse_env_var("SEQUENCE_BUMPS")?.unwrap_or(DEFAULT_BUMPS);

    let output = run(
        Input {
            config,
            preallocator,
            bumps,
        },
        &Registry::new(),
    )?;

    println!("allocation count: {}", output.allocation_count);
    for bump in output.bumps {
        println!("{bump}");
    }

    Ok(())
}

/// Get the value of process environment variable `key`, if it is set.
///
/// Returns an error if the value is an invalid unicode.
fn env_var(key: &'static str) -> Result<Option<String>, anyhow::Error> {
    std::env::var_os(key)
        .map(|raw| {
            raw.into_string()
                .map_err(|_| anyhow::anyhow!("{} env var is not a valid unicode string", key))
        })
        .transpose()
}

/// Get the value of process environment variable `key` and parse it into the type `T`.
///
/// Returns an error if the value is an invalid unicode, or if the value could not be parsed.
fn parse_env_var<T>(key: &'static str) -> Result<Option<T>, anyhow::Error>
where
    T: std::str::FromStr,
    <T as std::str::FromStr>::Err: std::fmt::Display,
{
    env_var(key)?
        .map(|string| {
            string
                .parse()
                .map_err(|err| anyhow::anyhow!("{} env var is not valid: {}", key, err))
        })
        .transpose()
}
