//! Per-extension transform chain resolution.
//!
//! Turns the ordered list of parsed specifications into a table mapping
//! each file extension to its ordered chain of executable steps.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::builtins::BuiltinKind;
use crate::spec::{ProcessorSpec, SpecTarget};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One executable step in a chain. The builtin/external split is decided
/// here, once, so the per-file loop is a plain match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransformStep {
    /// In-process transform.
    Builtin(BuiltinKind),
    /// Out-of-process transform.
    External(PathBuf),
}

/// Mapping from file extension (no leading dot) to its transform chain.
///
/// Built once per run and read-only afterwards. An extension absent from
/// the table has an empty chain: its files pass through byte-for-byte.
#[derive(Debug, Clone, Default)]
pub struct ChainTable {
    chains: HashMap<String, Vec<TransformStep>>,
}

impl ChainTable {
    /// The chain for `ext`, empty when none was configured.
    pub fn chain_for(&self, ext: &str) -> &[TransformStep] {
        self.chains.get(ext).map(Vec::as_slice).unwrap_or(&[])
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Resolve an ordered list of specifications into the chain table.
///
/// Two passes. First, every direct spec (builtin or external) appends to
/// its extension's chain, order of appearance being execution order.
/// Second, every alias spec overwrites its destination extension with a
/// copy of the snapshot the first pass produced for the source extension.
/// An alias therefore never sees another alias's contribution, and
/// aliasing an extension with no direct specs copies an empty chain.
/// Cycles are not detected; they just copy whatever the snapshot holds.
pub fn resolve(specs: &[ProcessorSpec]) -> ChainTable {
    let mut chains: HashMap<String, Vec<TransformStep>> = HashMap::new();
    let mut aliases: Vec<(&str, &str)> = Vec::new();

    for spec in specs {
        match &spec.target {
            SpecTarget::Builtin(kind) => chains
                .entry(spec.ext.clone())
                .or_default()
                .push(TransformStep::Builtin(*kind)),
            SpecTarget::External(path) => chains
                .entry(spec.ext.clone())
                .or_default()
                .push(TransformStep::External(path.clone())),
            SpecTarget::CopyFrom(source) => aliases.push((spec.ext.as_str(), source.as_str())),
        }
    }

    let snapshot = chains.clone();
    for (dest, source) in aliases {
        let copied = snapshot.get(source).cloned().unwrap_or_default();
        chains.insert(dest.to_string(), copied);
    }

    ChainTable { chains }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
