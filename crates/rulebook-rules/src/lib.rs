//! Built-in rules for school census returns.
//!
//! Two tables are checked: `schools` and `learners`. Rule codes in the 1000s
//! read `schools`, codes in the 2000s read `learners`.

pub mod catalog;
pub mod checks;

pub use catalog::{
    BASE_CYCLE, LEARNERS, SCHOOLS, base_rules, delta_2024, delta_2025, published_rulesets,
};
