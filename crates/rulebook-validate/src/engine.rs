//! Fault-isolated rule execution.
//!
//! The engine resolves the effective rule set for a run, executes each rule
//! with its own [`Findings`] recorder and merges the results into a fresh
//! [`ValidationContext`]. A rule that returns an error or panics is recorded
//! as failed; the remaining rules still run. Rules are executed in ascending
//! code order, or spread over scoped worker threads when `jobs > 1`; either
//! way the merged context is identical.

use std::collections::BTreeSet;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use rulebook_common::TableStore;
use rulebook_model::{Findings, Issue, Registry, RuleDefinition};
use tracing::{Span, debug, info, info_span, warn};

use crate::context::{RuleFailure, ValidationContext};

/// Engine configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    /// Worker threads. `1` runs rules sequentially; `0` uses the available
    /// parallelism of the machine.
    pub jobs: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self { jobs: 1 }
    }
}

impl EngineOptions {
    #[must_use]
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs;
        self
    }

    fn worker_count(&self) -> usize {
        match self.jobs {
            0 => thread::available_parallelism().map_or(1, usize::from),
            jobs => jobs,
        }
    }

    /// Workers used for `rules` rules: never more than one per rule, at least one.
    fn workers_for(&self, rules: usize) -> usize {
        self.worker_count().min(rules).max(1)
    }
}

/// One engine invocation: registry, optional code selection and data.
#[derive(Clone, Copy)]
pub struct ValidationRun<'a> {
    pub registry: &'a Registry,
    /// Codes to execute; `None` runs every rule in the registry.
    pub selected: Option<&'a [String]>,
    pub data: &'a dyn TableStore,
}

impl<'a> ValidationRun<'a> {
    pub fn new(registry: &'a Registry, data: &'a dyn TableStore) -> Self {
        Self {
            registry,
            selected: None,
            data,
        }
    }

    #[must_use]
    pub fn with_selection(mut self, selected: Option<&'a [String]>) -> Self {
        self.selected = selected;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct ValidationEngine {
    options: EngineOptions,
}

type ExecutionResult = Result<Vec<Issue>, RuleFailure>;

impl ValidationEngine {
    pub fn new(options: EngineOptions) -> Self {
        Self { options }
    }

    /// Execute the run and return its filled context.
    ///
    /// Never fails: predicate errors and panics become failure entries and
    /// unknown selected codes are recorded separately.
    pub fn run(&self, run: &ValidationRun<'_>) -> ValidationContext {
        let plan = RunPlan::new(run.registry, run.selected);
        let workers = self.options.workers_for(plan.rules.len());
        let span = info_span!(
            "validation_run",
            rules = plan.rules.len(),
            unknown = plan.unknown.len(),
            workers
        );
        let _guard = span.enter();
        let started = Instant::now();

        let mut context = ValidationContext::new();
        for code in &plan.unknown {
            warn!(code = %code, "selected rule code is not in the registry");
            context.record_unknown(code);
        }

        let results = if workers > 1 {
            execute_parallel(&plan.rules, run.data, workers)
        } else {
            plan.rules
                .iter()
                .map(|rule| (Arc::clone(rule), execute_rule(rule, run.data)))
                .collect()
        };

        for (rule, result) in results {
            merge(&mut context, rule, result);
        }

        info!(
            executed = context.executed_count(),
            issues = context.issue_count(),
            failures = context.failure_count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "validation run finished"
        );
        context
    }
}

/// Run `registry` against `data` with default options.
pub fn run(
    registry: &Registry,
    selected: Option<&[String]>,
    data: &dyn TableStore,
) -> ValidationContext {
    ValidationEngine::default().run(&ValidationRun {
        registry,
        selected,
        data,
    })
}

/// Effective rule set of a run, in ascending code order.
struct RunPlan {
    rules: Vec<Arc<RuleDefinition>>,
    unknown: BTreeSet<String>,
}

impl RunPlan {
    fn new(registry: &Registry, selected: Option<&[String]>) -> Self {
        let Some(selected) = selected else {
            return Self {
                rules: registry.iter().cloned().collect(),
                unknown: BTreeSet::new(),
            };
        };
        let mut codes = BTreeSet::new();
        let mut unknown = BTreeSet::new();
        for requested in selected {
            let code = requested.trim();
            if code.is_empty() {
                unknown.insert(requested.clone());
            } else if registry.contains(code) {
                codes.insert(code);
            } else {
                unknown.insert(code.to_string());
            }
        }
        let rules = codes
            .into_iter()
            .filter_map(|code| registry.get(code).cloned())
            .collect();
        Self { rules, unknown }
    }
}

fn execute_rule(rule: &RuleDefinition, data: &dyn TableStore) -> ExecutionResult {
    let started = Instant::now();
    let mut findings = Findings::for_rule(rule);
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| rule.check(data, &mut findings)));
    let result = match outcome {
        Ok(Ok(())) => Ok(findings.into_issues()),
        Ok(Err(error)) => Err(RuleFailure::error(error.to_string())),
        Err(payload) => Err(RuleFailure::panic(panic_payload_to_string(payload.as_ref()))),
    };
    match &result {
        Ok(issues) => debug!(
            code = rule.code(),
            issues = issues.len(),
            elapsed_us = started.elapsed().as_micros() as u64,
            "rule completed"
        ),
        Err(failure) => warn!(
            code = rule.code(),
            kind = ?failure.kind,
            detail = %failure.detail,
            "rule failed"
        ),
    }
    result
}

fn execute_parallel(
    rules: &[Arc<RuleDefinition>],
    data: &dyn TableStore,
    workers: usize,
) -> Vec<(Arc<RuleDefinition>, ExecutionResult)> {
    let batch_size = rules.len().div_ceil(workers);
    let run_span = Span::current();
    thread::scope(|scope| {
        let handles: Vec<_> = rules
            .chunks(batch_size)
            .map(|batch| {
                let span = run_span.clone();
                let handle = scope.spawn(move || {
                    span.in_scope(|| {
                        batch
                            .iter()
                            .map(|rule| (Arc::clone(rule), execute_rule(rule, data)))
                            .collect::<Vec<_>>()
                    })
                });
                (batch, handle)
            })
            .collect();

        let mut results = Vec::with_capacity(rules.len());
        for (batch, handle) in handles {
            match handle.join() {
                Ok(batch_results) => results.extend(batch_results),
                Err(payload) => {
                    let detail = panic_payload_to_string(payload.as_ref());
                    results.extend(
                        batch
                            .iter()
                            .map(|rule| (Arc::clone(rule), Err(RuleFailure::panic(detail.clone())))),
                    );
                }
            }
        }
        results
    })
}

fn merge(context: &mut ValidationContext, rule: Arc<RuleDefinition>, result: ExecutionResult) {
    let code = rule.code().to_string();
    context.register_rule(rule);
    let recorded = match result {
        Ok(issues) => context.mark_completed(&code).and_then(|()| {
            issues
                .into_iter()
                .try_for_each(|issue| context.record_issue(&code, issue))
        }),
        Err(failure) => context.record_failure(&code, failure),
    };
    if let Err(error) = recorded {
        warn!(code = %code, %error, "could not record rule outcome");
    }
}

fn panic_payload_to_string(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&'static str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
