//! Per-cycle ruleset publication and resolution.
//!
//! Each cycle's registry is composed exactly once, when the cycle is
//! published, and stored as an immutable snapshot. Resolving a cycle is a map
//! lookup that hands back the shared snapshot; it never replays the delta
//! chain.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use rulebook_model::{Registry, YearConfig};
use serde::Serialize;
use tracing::{info, info_span};

use crate::compose::{DeltaPolicy, compose_with};
use crate::error::{RegistryError, Result};

/// Identifier of a reporting cycle, e.g. `"2024"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CycleId(String);

impl CycleId {
    /// Trim and validate a cycle identifier.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.chars().any(char::is_whitespace) {
            return Err(RegistryError::InvalidCycle {
                cycle: raw.to_string(),
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Identifier of the stored snapshot for this cycle.
    pub fn snapshot_id(&self) -> String {
        format!("ruleset-{}", self.0)
    }
}

impl fmt::Display for CycleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A published, frozen registry for one cycle.
#[derive(Debug, Clone)]
pub struct Ruleset {
    pub cycle: CycleId,
    /// Cycle this snapshot was derived from; `None` for the base cycle.
    pub parent: Option<CycleId>,
    pub registry: Arc<Registry>,
}

impl Ruleset {
    pub fn snapshot_id(&self) -> String {
        self.cycle.snapshot_id()
    }
}

/// Published rulesets, keyed by cycle.
///
/// Publication only ever adds snapshots. Build the full set at startup and
/// share it (by reference or `Arc`) with whatever resolves cycles.
#[derive(Debug, Clone)]
pub struct Rulesets {
    snapshots: BTreeMap<CycleId, Ruleset>,
    policy: DeltaPolicy,
}

impl Default for Rulesets {
    fn default() -> Self {
        Self::new()
    }
}

impl Rulesets {
    pub fn new() -> Self {
        Self::with_policy(DeltaPolicy::Strict)
    }

    /// Use `policy` for every delta published into this set.
    pub fn with_policy(policy: DeltaPolicy) -> Self {
        Self {
            snapshots: BTreeMap::new(),
            policy,
        }
    }

    /// Publish a cycle whose registry has no predecessor.
    pub fn publish_base(&mut self, cycle: &str, registry: Registry) -> Result<&Ruleset> {
        let cycle = self.unpublished(cycle)?;
        info!(cycle = %cycle, rules = registry.len(), "published base ruleset");
        Ok(self.snapshots.entry(cycle.clone()).or_insert(Ruleset {
            cycle,
            parent: None,
            registry: Arc::new(registry),
        }))
    }

    /// Publish `cycle` by composing `prior`'s snapshot with `delta`.
    ///
    /// Nothing is stored when composition fails.
    pub fn publish(&mut self, cycle: &str, prior: &str, delta: &YearConfig) -> Result<&Ruleset> {
        let cycle = self.unpublished(cycle)?;
        let prior = CycleId::parse(prior)?;
        let span = info_span!("publish_ruleset", cycle = %cycle, prior = %prior);
        let _guard = span.enter();

        let base = self.resolve_id(&prior)?;
        let registry = compose_with(&base, delta, self.policy)?;
        info!(
            rules = registry.len(),
            upserted = delta.upserted_count(),
            deleted = delta.deleted().len(),
            "published ruleset"
        );
        Ok(self.snapshots.entry(cycle.clone()).or_insert(Ruleset {
            cycle,
            parent: Some(prior),
            registry: Arc::new(registry),
        }))
    }

    /// Registry frozen for `cycle`.
    pub fn resolve(&self, cycle: &str) -> Result<Arc<Registry>> {
        self.resolve_id(&CycleId::parse(cycle)?)
    }

    pub fn ruleset(&self, cycle: &str) -> Result<&Ruleset> {
        let id = CycleId::parse(cycle)?;
        self.snapshots
            .get(&id)
            .ok_or_else(|| RegistryError::UnknownCycle {
                cycle: id.to_string(),
            })
    }

    /// Published cycles in ascending order.
    pub fn cycles(&self) -> impl Iterator<Item = &Ruleset> {
        self.snapshots.values()
    }

    /// Highest cycle identifier published.
    pub fn latest(&self) -> Option<&Ruleset> {
        self.snapshots.values().next_back()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    fn resolve_id(&self, cycle: &CycleId) -> Result<Arc<Registry>> {
        self.snapshots
            .get(cycle)
            .map(|ruleset| Arc::clone(&ruleset.registry))
            .ok_or_else(|| RegistryError::UnknownCycle {
                cycle: cycle.to_string(),
            })
    }

    fn unpublished(&self, cycle: &str) -> Result<CycleId> {
        let cycle = CycleId::parse(cycle)?;
        if self.snapshots.contains_key(&cycle) {
            return Err(RegistryError::CycleAlreadyPublished {
                cycle: cycle.to_string(),
            });
        }
        Ok(cycle)
    }
}
