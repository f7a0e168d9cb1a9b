//! Deterministic example payloads.
//!
//! The [`ExampleSynthesizer`] walks the resolved [`TypeGraph`] as a type descriptor table and
//! fabricates a value for it in-process. Every call seeds a fresh generator from the
//! configured seed, so the same type always yields byte-identical text. Generation reads the
//! graph only; a value is built as a [`Sample`] tree and encoded with `serde_json`, which
//! drops fields hidden from serialization the same way the documented encoding does.

pub mod fillers;

pub use fillers::{Filler, FillerRegistry};

use crate::config::SynthesisConfig;
use crate::type_graph::{BasicKind, TypeGraph, TypeId, TypeNode};
use log::{debug, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use serde_json::Value;
use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Nodes filled between two wall-clock checks
const CLOCK_CHECK_INTERVAL: usize = 256;

/// Reasons an example could not be produced
#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("nesting exceeds {0} levels")]
    DepthExceeded(usize),

    #[error("value exceeds {0} nodes")]
    BudgetExceeded(usize),

    #[error("generation took longer than {0} ms")]
    Timeout(u64),

    #[error("filler for `{qualifier}` panicked: {message}")]
    FillerPanicked { qualifier: String, message: String },

    #[error("encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// A fabricated value before encoding
#[derive(Debug, Clone, PartialEq)]
pub enum Sample {
    Value(Value),
    List(Vec<Sample>),
    /// Struct fields in declaration order with their exported flag
    Record(Vec<(String, bool, Sample)>),
    /// Unsupported shape, encoded as `null`
    Skipped,
}

impl Serialize for Sample {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Sample::Value(value) => value.serialize(serializer),
            Sample::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Sample::Record(fields) => {
                let exported = fields.iter().filter(|(_, exported, _)| *exported);
                let mut map = serializer.serialize_map(Some(exported.clone().count()))?;
                for (name, _, value) in exported {
                    map.serialize_entry(name, value)?;
                }
                map.end()
            }
            Sample::Skipped => serializer.serialize_none(),
        }
    }
}

/// Example synthesizer over a finished type graph.
///
/// # Example
///
/// ```
/// use restdoc::config::SynthesisConfig;
/// use restdoc::synthesizer::{ExampleSynthesizer, FillerRegistry};
/// use restdoc::type_graph::{BasicKind, TypeGraph};
///
/// let mut graph = TypeGraph::new();
/// let flag = graph.basic(BasicKind::Bool);
/// let config = SynthesisConfig::default();
/// let synthesizer = ExampleSynthesizer::new(&graph, &config, FillerRegistry::with_builtin());
/// let text = synthesizer.example_text(flag);
/// assert!(text == "true" || text == "false");
/// ```
pub struct ExampleSynthesizer<'g> {
    graph: &'g TypeGraph,
    config: &'g SynthesisConfig,
    fillers: FillerRegistry,
}

/// State of one fill pass
struct FillPass {
    rng: StdRng,
    nodes: usize,
    started: Instant,
}

impl<'g> ExampleSynthesizer<'g> {
    pub fn new(graph: &'g TypeGraph, config: &'g SynthesisConfig, fillers: FillerRegistry) -> Self {
        Self {
            graph,
            config,
            fillers,
        }
    }

    /// Fabricates and encodes an example of `id` as indented JSON
    pub fn synthesize(&self, id: TypeId) -> Result<String, SynthesisError> {
        let sample = self.sample(id)?;
        Ok(serde_json::to_string_pretty(&sample)?)
    }

    /// Fabricates a value of `id` without encoding it
    pub fn sample(&self, id: TypeId) -> Result<Sample, SynthesisError> {
        let mut pass = FillPass {
            rng: StdRng::seed_from_u64(self.config.seed),
            nodes: 0,
            started: Instant::now(),
        };
        self.fill(id, 0, &mut pass)
    }

    /// Like [`synthesize`](Self::synthesize), but a failure becomes the example text
    pub fn example_text(&self, id: TypeId) -> String {
        match self.synthesize(id) {
            Ok(text) => text,
            Err(err) => {
                warn!("Example for {} failed: {}", self.graph.short_name(id), err);
                format!("example generation failed: {}", err)
            }
        }
    }

    fn fill(&self, id: TypeId, depth: usize, pass: &mut FillPass) -> Result<Sample, SynthesisError> {
        if depth > self.config.max_depth {
            return Err(SynthesisError::DepthExceeded(self.config.max_depth));
        }
        pass.nodes += 1;
        if pass.nodes > self.config.max_nodes {
            return Err(SynthesisError::BudgetExceeded(self.config.max_nodes));
        }
        if pass.nodes % CLOCK_CHECK_INTERVAL == 0
            && pass.started.elapsed() > Duration::from_millis(self.config.timeout_ms)
        {
            return Err(SynthesisError::Timeout(self.config.timeout_ms));
        }

        match self.graph.node(id) {
            TypeNode::Named {
                qualifier,
                underlying,
            } => {
                if let Some(filler) = self.fillers.get(qualifier) {
                    return run_filler(filler, qualifier, &mut pass.rng).map(Sample::Value);
                }
                match underlying {
                    Some(target) => self.fill(*target, depth + 1, pass),
                    None => {
                        warn!("Skipping unresolved type `{}` in example", qualifier);
                        Ok(Sample::Skipped)
                    }
                }
            }
            TypeNode::Basic(kind) => Ok(Sample::Value(self.scalar(*kind, &mut pass.rng))),
            TypeNode::Struct(fields) => {
                let mut record = Vec::with_capacity(fields.len());
                for field in fields {
                    let value = self.fill(field.ty, depth + 1, pass)?;
                    record.push((field.name.clone(), field.exported, value));
                }
                Ok(Sample::Record(record))
            }
            TypeNode::Slice(elem) => {
                let len = pass
                    .rng
                    .gen_range(self.config.min_slice_len..=self.config.max_slice_len);
                let mut items = Vec::with_capacity(len);
                for _ in 0..len {
                    items.push(self.fill(*elem, depth + 1, pass)?);
                }
                Ok(Sample::List(items))
            }
            TypeNode::Pointer(pointee) => self.fill(*pointee, depth + 1, pass),
            TypeNode::Unsupported(diagnostic) => {
                warn!("Skipping unsupported type in example: {}", diagnostic);
                Ok(Sample::Skipped)
            }
        }
    }

    fn scalar(&self, kind: BasicKind, rng: &mut StdRng) -> Value {
        match kind {
            BasicKind::I8 => Value::from(rng.gen::<i8>()),
            BasicKind::I16 => Value::from(rng.gen::<i16>()),
            BasicKind::I32 => Value::from(rng.gen::<i32>()),
            BasicKind::I64 | BasicKind::I128 | BasicKind::Isize => Value::from(rng.gen::<i64>()),
            BasicKind::U8 => Value::from(rng.gen::<u8>()),
            BasicKind::U16 => Value::from(rng.gen::<u16>()),
            BasicKind::U32 => Value::from(rng.gen::<u32>()),
            BasicKind::U64 | BasicKind::U128 | BasicKind::Usize => Value::from(rng.gen::<u64>()),
            BasicKind::F32 => Value::from(rng.gen::<f32>()),
            BasicKind::F64 => Value::from(rng.gen::<f64>()),
            BasicKind::Bool => Value::Bool(rng.gen::<u32>() % 2 == 0),
            BasicKind::Char => Value::String(char::from(rng.gen_range(b'a'..=b'z')).to_string()),
            BasicKind::String => Value::String(self.config.string_placeholder.clone()),
        }
    }
}

fn run_filler(filler: &dyn Filler, qualifier: &str, rng: &mut StdRng) -> Result<Value, SynthesisError> {
    debug!("Using custom filler for `{}`", qualifier);
    panic::catch_unwind(AssertUnwindSafe(|| filler.fill(rng))).map_err(|payload| {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        SynthesisError::FillerPanicked {
            qualifier: qualifier.to_string(),
            message,
        }
    })
}
