//! Benchmark executor: run every registered method against one dataset,
//! isolating per-method failures.

use crate::data::{BenchResult, Dataset, MethodColumn, MethodFailure};
use crate::error::Result;
use crate::registry::{DatasetField, MethodContext, MethodSpec, Registry};
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Run every method in `registry` against `dataset`.
///
/// Methods run sequentially in registry order. This is the crate's central
/// fault-isolation contract: a method that errors, panics, lacks a required
/// dataset field, or returns a vector of the wrong length gets an
/// all-missing column and an entry in the failure log, and the run
/// continues. Some covariate-aware methods are expected to fail under
/// degenerate inputs (too few populated bins, zero-variance covariate);
/// that must never block evaluation of the others.
pub fn execute(dataset: &Dataset, registry: &Registry) -> BenchResult {
    let m = dataset.n_tests();
    let mut columns = Vec::with_capacity(registry.len());
    let mut failures = Vec::new();

    for spec in registry.iter() {
        match invoke_method(dataset, spec) {
            Ok(q_values) => columns.push(MethodColumn {
                method_id: spec.id().to_string(),
                q_values: Some(q_values),
            }),
            Err(reason) => {
                columns.push(MethodColumn {
                    method_id: spec.id().to_string(),
                    q_values: None,
                });
                failures.push(MethodFailure {
                    method_id: spec.id().to_string(),
                    reason,
                });
            }
        }
    }

    BenchResult {
        n_tests: m,
        columns,
        truth: dataset.truth().map(<[bool]>::to_vec),
        covariate: dataset.covariate().map(<[f64]>::to_vec),
        failures,
    }
}

/// Invoke one method, mapping every failure mode to a reason string.
fn invoke_method(dataset: &Dataset, spec: &MethodSpec) -> std::result::Result<Vec<f64>, String> {
    if let Some(field) = missing_required_field(dataset, spec) {
        return Err(format!("required field '{}' is absent", field.name()));
    }

    let ctx = MethodContext {
        p_values: dataset.p_values(),
        test_statistics: dataset.test_statistics(),
        effect_sizes: dataset.effect_sizes(),
        standard_errors: dataset.standard_errors(),
        covariate: dataset.covariate(),
        params: spec.params(),
    };

    let outcome: Result<Vec<f64>> = {
        let callable = spec.callable();
        let extractor = spec.extractor();
        match catch_unwind(AssertUnwindSafe(|| callable(&ctx).and_then(|o| extractor(o)))) {
            Ok(result) => result,
            Err(panic) => return Err(format!("panicked: {}", panic_message(&panic))),
        }
    };

    match outcome {
        Ok(q_values) if q_values.len() == dataset.n_tests() => Ok(q_values),
        Ok(q_values) => Err(format!(
            "output length {} does not match {} hypotheses",
            q_values.len(),
            dataset.n_tests()
        )),
        Err(e) => Err(e.to_string()),
    }
}

fn missing_required_field(dataset: &Dataset, spec: &MethodSpec) -> Option<DatasetField> {
    spec.requires().iter().copied().find(|field| match field {
        DatasetField::PValues => false,
        DatasetField::TestStatistics => dataset.test_statistics().is_none(),
        DatasetField::EffectSizes => dataset.effect_sizes().is_none(),
        DatasetField::StandardErrors => dataset.standard_errors().is_none(),
        DatasetField::Covariate => dataset.covariate().is_none(),
    })
}

fn panic_message(panic: &Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
