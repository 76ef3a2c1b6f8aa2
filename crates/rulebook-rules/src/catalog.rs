//! Registration table for the built-in rules.
//!
//! The base cycle lists every rule explicitly; each later cycle is a
//! [`YearConfig`] against the cycle before it. [`published_rulesets`] replays
//! the whole table into a [`Rulesets`].

use std::sync::Arc;

use rulebook_model::{ModelError, Predicate, RuleDefinition, Severity, YearConfig};
use rulebook_registry::{RegistryError, Rulesets, discover};
use tracing::debug;

use crate::checks::{AllowedValues, DateOrder, IntegerRange, IsoDate, References, Required, Unique};

pub const SCHOOLS: &str = "schools";
pub const LEARNERS: &str = "learners";

pub const BASE_CYCLE: &str = "2023";

const PHASES_2023: &[&str] = &["PRIMARY", "SECONDARY", "ALL_THROUGH", "SPECIAL"];
const PHASES_2024: &[&str] = &["PRIMARY", "MIDDLE", "SECONDARY", "ALL_THROUGH", "SPECIAL"];

/// One published cycle after the base.
struct CycleDelta {
    cycle: &'static str,
    prior: &'static str,
    build: fn() -> Result<YearConfig, ModelError>,
}

const CYCLE_DELTAS: &[CycleDelta] = &[
    CycleDelta {
        cycle: "2024",
        prior: BASE_CYCLE,
        build: delta_2024,
    },
    CycleDelta {
        cycle: "2025",
        prior: "2024",
        build: delta_2025,
    },
];

fn rule(
    code: &str,
    table: &str,
    severity: Severity,
    message: &str,
    fields: &[&str],
    predicate: impl Predicate + 'static,
) -> Result<RuleDefinition, ModelError> {
    RuleDefinition::builder(code, table)
        .message(message)
        .fields(fields.iter().copied())
        .severity(severity)
        .predicate(Arc::new(predicate))
        .build()
}

fn school_phase(allowed: &'static [&'static str]) -> Result<RuleDefinition, ModelError> {
    rule(
        "1020",
        SCHOOLS,
        Severity::Error,
        "School phase is not a recognised phase",
        &["phase"],
        AllowedValues {
            column: "phase",
            allowed,
        },
    )
}

/// Rules of the base cycle.
pub fn base_rules() -> Result<Vec<RuleDefinition>, ModelError> {
    Ok(vec![
        rule(
            "1010",
            SCHOOLS,
            Severity::Error,
            "School identifier must be present",
            &["school_id"],
            Required { column: "school_id" },
        )?,
        school_phase(PHASES_2023)?,
        rule(
            "1030",
            SCHOOLS,
            Severity::Error,
            "School identifier must be unique",
            &["school_id"],
            Unique { column: "school_id" },
        )?,
        rule(
            "2010",
            LEARNERS,
            Severity::Error,
            "Learner identifier must be present",
            &["learner_id"],
            Required {
                column: "learner_id",
            },
        )?,
        rule(
            "2020",
            LEARNERS,
            Severity::Error,
            "Learner identifier must be unique",
            &["learner_id"],
            Unique {
                column: "learner_id",
            },
        )?,
        rule(
            "2030",
            LEARNERS,
            Severity::Error,
            "Date of birth must be a valid YYYY-MM-DD date",
            &["date_of_birth"],
            IsoDate {
                column: "date_of_birth",
            },
        )?,
        rule(
            "2040",
            LEARNERS,
            Severity::Warning,
            "Gender must be M or F",
            &["gender"],
            AllowedValues {
                column: "gender",
                allowed: &["M", "F"],
            },
        )?,
        rule(
            "2050",
            LEARNERS,
            Severity::Error,
            "Learner school is not listed in the schools table",
            &["school_id"],
            References {
                column: "school_id",
                target_table: SCHOOLS,
                target_column: "school_id",
            },
        )?,
    ])
}

/// 2024: gender gains `X` under a new code, middle schools become a phase and
/// enrolment dates are collected.
pub fn delta_2024() -> Result<YearConfig, ModelError> {
    Ok(YearConfig::new()
        .delete("2040")
        .upsert(rule(
            "2041",
            LEARNERS,
            Severity::Warning,
            "Gender must be M, F or X",
            &["gender"],
            AllowedValues {
                column: "gender",
                allowed: &["M", "F", "X"],
            },
        )?)
        .upsert(school_phase(PHASES_2024)?)
        .upsert(rule(
            "2060",
            LEARNERS,
            Severity::Warning,
            "Enrolment date must be a valid YYYY-MM-DD date",
            &["enrolment_date"],
            IsoDate {
                column: "enrolment_date",
            },
        )?))
}

/// 2025: rule 2060 is retired and its code reused for the enrolment date
/// ordering check; year groups are range checked.
pub fn delta_2025() -> Result<YearConfig, ModelError> {
    Ok(YearConfig::new()
        .delete("2060")
        .upsert(rule(
            "2060",
            LEARNERS,
            Severity::Error,
            "Enrolment date must not precede date of birth",
            &["date_of_birth", "enrolment_date"],
            DateOrder {
                earlier: "date_of_birth",
                later: "enrolment_date",
            },
        )?)
        .upsert(rule(
            "2070",
            LEARNERS,
            Severity::Error,
            "Year group must be a whole number between 0 and 14",
            &["year_group"],
            IntegerRange {
                column: "year_group",
                min: 0,
                max: 14,
            },
        )?))
}

/// Every built-in cycle, published in order.
pub fn published_rulesets() -> Result<Rulesets, RegistryError> {
    let mut rulesets = Rulesets::new();
    rulesets.publish_base(BASE_CYCLE, discover(base_rules()?)?)?;
    for entry in CYCLE_DELTAS {
        let delta = (entry.build)()?;
        rulesets.publish(entry.cycle, entry.prior, &delta)?;
    }
    debug!(cycles = rulesets.len(), "built-in rulesets published");
    Ok(rulesets)
}
