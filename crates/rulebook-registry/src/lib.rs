//! Versioned rule registries.
//!
//! Registries move through three stages:
//!
//! 1. [`discover`] builds the base registry from an explicit registration table.
//! 2. [`compose`] derives a new registry from a base and a [`YearConfig`] delta.
//! 3. [`Rulesets`] publishes one composed registry per cycle and resolves a
//!    cycle identifier back to its frozen snapshot by lookup.
//!
//! # Example
//!
//! ```ignore
//! use rulebook_registry::{Rulesets, discover};
//!
//! let mut rulesets = Rulesets::new();
//! rulesets.publish_base("2023", discover(base_rules()?)?)?;
//! rulesets.publish("2024", "2023", &delta_2024()?)?;
//! let registry = rulesets.resolve("2024")?;
//! ```
//!
//! [`YearConfig`]: rulebook_model::YearConfig

pub mod compose;
pub mod diff;
pub mod discovery;
pub mod error;
pub mod rulesets;

pub use compose::{DeltaPolicy, compose, compose_with};
pub use diff::{RegistryDiff, diff};
pub use discovery::discover;
pub use error::{RegistryError, Result};
pub use rulesets::{CycleId, Ruleset, Rulesets};
