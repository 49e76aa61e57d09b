//! Sequence simulation.
//!
//! Runs a sequence configuration through the reference model and a native-width
//! generator side by side, and reports every handed out value along with the upper bound.

#![warn(
    missing_docs,
    clippy::missing_docs_in_private_items,
    clippy::clone_on_ref_ptr
)]

use core::{fmt, num::NonZeroU32};

use num::BigInt;
use sequence_generator::{Descriptor, SequenceGenerator};
use sequence_preallocator::{Registry, Setting};
use sequence_vetter::{AllocatorUnderTest, Vetter};
use tracing::info;

/// The sequence to simulate.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SequenceConfig {
    /// The schema the sequence lives in.
    #[serde(default = "default_schema")]
    pub schema: String,
    /// The name of the sequence.
    #[serde(default = "default_sequence")]
    pub sequence: String,
    /// The first value to hand out, none for an already exhausted sequence.
    #[serde(default)]
    pub start: Option<i64>,
    /// Whether the sequence wraps around.
    pub can_cycle: bool,
    /// The increment.
    pub step: i64,
    /// The inclusive upper bound.
    pub max: i64,
    /// The inclusive lower bound.
    pub min: i64,
    /// The value to resume at after a cycle.
    pub restart: i64,
}

/// The default schema name.
fn default_schema() -> String {
    "APP".to_owned()
}

/// The default sequence name.
fn default_sequence() -> String {
    "SEQ".to_owned()
}

/// The input of the simulation.
pub struct Input {
    /// The sequence to simulate.
    pub config: SequenceConfig,
    /// The preallocation policy.
    pub preallocator: Setting,
    /// The amount of values to request.
    pub bumps: u64,
}

/// The outcome of a single request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bump {
    /// The value handed out, none if the sequence is exhausted.
    pub value: Option<i64>,
    /// The upper bound after the request.
    pub upper_bound: Option<i64>,
}

impl fmt::Display for Bump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value {
            Some(value) => write!(f, "{value}")?,
            None => f.write_str("exhausted")?,
        }
        match self.upper_bound {
            Some(upper_bound) => write!(f, " {upper_bound}"),
            None => f.write_str(" -"),
        }
    }
}

/// The output of the simulation.
#[derive(Debug)]
pub struct Output {
    /// The allocation count the sequence ended up with.
    pub allocation_count: NonZeroU32,
    /// The requests, in order.
    pub bumps: Vec<Bump>,
}

/// Run the simulation.
pub fn run(input: Input, registry: &Registry) -> Result<Output, anyhow::Error> {
    let Input {
        config,
        preallocator,
        bumps,
    } = input;

    let preallocator = registry.resolve(&preallocator)?;
    let allocation_count = sequence_preallocator::allocation_count(
        &*preallocator,
        &config.schema,
        &config.sequence,
        &config.step,
        &config.min,
        &config.max,
    );

    let descriptor = Descriptor {
        can_cycle: config.can_cycle,
        step: config.step,
        max: config.max,
        min: config.min,
        restart: config.restart,
        allocation_count,
    };

    info!(
        message = "simulating sequence",
        schema = %config.schema,
        sequence = %config.sequence,
        allocation_count = allocation_count.get(),
        bumps,
    );

    let oracle = SequenceGenerator::new(
        config.start.map(BigInt::from),
        descriptor.clone().map(BigInt::from),
    )?;
    let allocator = SequenceGenerator::new(config.start, descriptor)?;
    let mut vetter = Vetter::new(oracle, allocator);

    let bumps = (0..bumps)
        .map(|_| -> Result<Bump, anyhow::Error> {
            let value = vetter.vet_bump()?;
            Ok(Bump {
                value,
                upper_bound: vetter.allocator().value_on_disk(),
            })
        })
        .collect::<Result<_, _>>()?;

    Ok(Output {
        allocation_count,
        bumps,
    })
}
