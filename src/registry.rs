//! Method registry: declarative descriptions of correction methods and an
//! ordered mapping from method id to spec.
//!
//! A correction procedure is a black box to this crate. A [`MethodSpec`]
//! pins down everything needed to invoke one: the callable itself, the
//! dataset fields it consumes (its binding schema, resolved at registration
//! rather than mid-run), a fixed parameter set, and an extractor that maps
//! the callable's raw output to a q-value vector aligned to input order.

use crate::error::{BenchError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// A parameter value passed to a method callable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// Floating-point parameter.
    Float(f64),
    /// Integer parameter.
    Int(i64),
    /// Boolean flag.
    Bool(bool),
    /// Free-form text parameter.
    Text(String),
}

impl ParamValue {
    /// Interpret as f64 (ints widen).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Float(v) => Some(*v),
            ParamValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Interpret as i64.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ParamValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Interpret as bool.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Interpret as text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ParamValue::Text(v) => Some(v),
            _ => None,
        }
    }
}

impl std::fmt::Display for ParamValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParamValue::Float(v) => write!(f, "{}", v),
            ParamValue::Int(v) => write!(f, "{}", v),
            ParamValue::Bool(v) => write!(f, "{}", v),
            ParamValue::Text(v) => write!(f, "{}", v),
        }
    }
}

/// Named parameters for a method, in deterministic iteration order.
pub type MethodParams = BTreeMap<String, ParamValue>;

/// Dataset fields a method callable may bind to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DatasetField {
    /// Raw p-values (always available).
    PValues,
    /// Raw test statistics.
    TestStatistics,
    /// Estimated effect sizes.
    EffectSizes,
    /// Standard errors of the effect estimates.
    StandardErrors,
    /// Independent covariate for covariate-aware methods.
    Covariate,
}

impl DatasetField {
    /// Column name as it appears in dataset schemas and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            DatasetField::PValues => "p_value",
            DatasetField::TestStatistics => "test_statistic",
            DatasetField::EffectSizes => "effect_size",
            DatasetField::StandardErrors => "standard_error",
            DatasetField::Covariate => "ind_covariate",
        }
    }
}

/// The dataset fields and parameters bound for one method invocation.
///
/// Borrowed views into the dataset; the executor builds one of these per
/// method call after checking the spec's binding schema.
pub struct MethodContext<'a> {
    /// Raw p-values, length m.
    pub p_values: &'a [f64],
    /// Test statistics, if the dataset carries them.
    pub test_statistics: Option<&'a [f64]>,
    /// Effect sizes, if present.
    pub effect_sizes: Option<&'a [f64]>,
    /// Standard errors, if present.
    pub standard_errors: Option<&'a [f64]>,
    /// Independent covariate, if present.
    pub covariate: Option<&'a [f64]>,
    /// Merged fixed + override parameters from the spec.
    pub params: &'a MethodParams,
}

impl<'a> MethodContext<'a> {
    /// The covariate column, or a method-execution error if absent.
    pub fn require_covariate(&self) -> Result<&'a [f64]> {
        self.covariate.ok_or_else(|| {
            BenchError::MethodExecution("required field 'ind_covariate' is absent".into())
        })
    }

    /// The test-statistic column, or a method-execution error if absent.
    pub fn require_test_statistics(&self) -> Result<&'a [f64]> {
        self.test_statistics.ok_or_else(|| {
            BenchError::MethodExecution("required field 'test_statistic' is absent".into())
        })
    }

    /// Numeric parameter with a default.
    pub fn param_f64(&self, name: &str, default: f64) -> f64 {
        self.params
            .get(name)
            .and_then(ParamValue::as_f64)
            .unwrap_or(default)
    }

    /// Integer parameter with a default.
    pub fn param_i64(&self, name: &str, default: i64) -> i64 {
        self.params
            .get(name)
            .and_then(ParamValue::as_i64)
            .unwrap_or(default)
    }
}

/// Raw return value of a method callable.
///
/// Most methods return the adjusted-p vector directly; structured methods
/// return a named-column table that the spec's extractor pulls from.
#[derive(Debug, Clone)]
pub enum MethodOutput {
    /// Adjusted p-values in input order.
    QValues(Vec<f64>),
    /// Named columns, each in input order.
    Table(HashMap<String, Vec<f64>>),
}

/// A correction method exposed as a callable.
pub type MethodFn = Arc<dyn Fn(&MethodContext) -> Result<MethodOutput> + Send + Sync>;

/// Maps a callable's raw output to a q-value vector.
pub type Extractor = Arc<dyn Fn(MethodOutput) -> Result<Vec<f64>> + Send + Sync>;

/// Default extractor: take q-values directly, or the `q_value` column of a
/// table.
pub fn qvalue_extractor() -> Extractor {
    column_extractor("q_value")
}

/// Extractor that pulls a named column out of a table output (and accepts a
/// bare q-value vector as-is).
pub fn column_extractor(column: &str) -> Extractor {
    let column = column.to_string();
    Arc::new(move |output| match output {
        MethodOutput::QValues(q) => Ok(q),
        MethodOutput::Table(mut table) => table.remove(&column).ok_or_else(|| {
            BenchError::MethodExecution(format!("output table has no '{}' column", column))
        }),
    })
}

/// Declarative description of a correction method.
///
/// Immutable once registered: [`MethodSpec::overridden`] produces a new spec
/// with merged parameters rather than mutating the original.
#[derive(Clone)]
pub struct MethodSpec {
    id: String,
    callable: MethodFn,
    params: MethodParams,
    extractor: Extractor,
    requires: Vec<DatasetField>,
}

impl std::fmt::Debug for MethodSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MethodSpec")
            .field("id", &self.id)
            .field("params", &self.params)
            .field("requires", &self.requires)
            .finish_non_exhaustive()
    }
}

impl MethodSpec {
    /// Create a spec with the default (q-value) extractor and no required
    /// fields beyond p-values.
    pub fn new(id: &str, callable: MethodFn) -> Self {
        Self {
            id: id.to_string(),
            callable,
            params: MethodParams::new(),
            extractor: qvalue_extractor(),
            requires: vec![DatasetField::PValues],
        }
    }

    /// Set fixed parameters.
    pub fn with_params(mut self, params: MethodParams) -> Self {
        self.params = params;
        self
    }

    /// Set a single fixed parameter.
    pub fn with_param(mut self, name: &str, value: ParamValue) -> Self {
        self.params.insert(name.to_string(), value);
        self
    }

    /// Replace the output extractor.
    pub fn with_extractor(mut self, extractor: Extractor) -> Self {
        self.extractor = extractor;
        self
    }

    /// Declare an additional required dataset field.
    pub fn requiring(mut self, field: DatasetField) -> Self {
        if !self.requires.contains(&field) {
            self.requires.push(field);
        }
        self
    }

    /// Unique method id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Fixed parameters.
    pub fn params(&self) -> &MethodParams {
        &self.params
    }

    /// Required dataset fields.
    pub fn requires(&self) -> &[DatasetField] {
        &self.requires
    }

    /// The callable.
    pub fn callable(&self) -> &MethodFn {
        &self.callable
    }

    /// The output extractor.
    pub fn extractor(&self) -> &Extractor {
        &self.extractor
    }

    /// A new spec with `overrides` merged over the fixed parameters.
    /// Call-site values win.
    pub fn overridden(&self, overrides: MethodParams) -> Self {
        let mut merged = self.params.clone();
        merged.extend(overrides);
        Self {
            id: self.id.clone(),
            callable: Arc::clone(&self.callable),
            params: merged,
            extractor: Arc::clone(&self.extractor),
            requires: self.requires.clone(),
        }
    }
}

/// Ordered mapping from method id to spec.
///
/// Insertion order determines the default comparison order downstream.
/// Built single-threaded before any parallel execution begins; read-only
/// during execution, so no locking is needed.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    specs: Vec<MethodSpec>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a method spec.
    ///
    /// Fails with [`BenchError::DuplicateMethod`] if the id is already
    /// present.
    pub fn register(&mut self, spec: MethodSpec) -> Result<()> {
        if spec.id.is_empty() {
            return Err(BenchError::InvalidParameter(
                "method id must be non-empty".into(),
            ));
        }
        if self.specs.iter().any(|s| s.id == spec.id) {
            return Err(BenchError::DuplicateMethod(spec.id));
        }
        self.specs.push(spec);
        Ok(())
    }

    /// A new spec for `id` with merged parameter overrides, leaving the
    /// registered spec untouched.
    ///
    /// Fails with [`BenchError::UnknownMethod`] if `id` is absent.
    pub fn overridden(&self, id: &str, overrides: MethodParams) -> Result<MethodSpec> {
        self.get(id)
            .map(|spec| spec.overridden(overrides))
            .ok_or_else(|| BenchError::UnknownMethod(id.to_string()))
    }

    /// Remove and return the spec for `id`.
    ///
    /// Fails with [`BenchError::UnknownMethod`] if `id` is absent.
    pub fn remove(&mut self, id: &str) -> Result<MethodSpec> {
        let pos = self
            .specs
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| BenchError::UnknownMethod(id.to_string()))?;
        Ok(self.specs.remove(pos))
    }

    /// Look up a spec by id.
    pub fn get(&self, id: &str) -> Option<&MethodSpec> {
        self.specs.iter().find(|s| s.id == id)
    }

    /// Method ids in insertion order.
    pub fn ids(&self) -> Vec<String> {
        self.specs.iter().map(|s| s.id.clone()).collect()
    }

    /// Iterate over specs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &MethodSpec> {
        self.specs.iter()
    }

    /// Number of registered methods.
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity_spec(id: &str) -> MethodSpec {
        MethodSpec::new(
            id,
            Arc::new(|ctx: &MethodContext| Ok(MethodOutput::QValues(ctx.p_values.to_vec()))),
        )
    }

    #[test]
    fn test_register_and_order() {
        let mut registry = Registry::new();
        registry.register(identity_spec("unadjusted")).unwrap();
        registry.register(identity_spec("bh")).unwrap();
        registry.register(identity_spec("bonferroni")).unwrap();

        assert_eq!(registry.ids(), vec!["unadjusted", "bh", "bonferroni"]);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut registry = Registry::new();
        registry.register(identity_spec("bh")).unwrap();
        let err = registry.register(identity_spec("bh")).unwrap_err();
        assert!(matches!(err, BenchError::DuplicateMethod(id) if id == "bh"));
    }

    #[test]
    fn test_empty_id_rejected() {
        let mut registry = Registry::new();
        assert!(registry.register(identity_spec("")).is_err());
    }

    #[test]
    fn test_remove_unknown() {
        let mut registry = Registry::new();
        let err = registry.remove("ghost").unwrap_err();
        assert!(matches!(err, BenchError::UnknownMethod(id) if id == "ghost"));
    }

    #[test]
    fn test_override_merges_without_mutation() {
        let mut registry = Registry::new();
        registry
            .register(
                identity_spec("bh")
                    .with_param("lambda", ParamValue::Float(0.5))
                    .with_param("robust", ParamValue::Bool(false)),
            )
            .unwrap();

        let mut overrides = MethodParams::new();
        overrides.insert("lambda".into(), ParamValue::Float(0.9));
        let variant = registry.overridden("bh", overrides).unwrap();

        // Call-site value wins, untouched params survive.
        assert_eq!(variant.params()["lambda"], ParamValue::Float(0.9));
        assert_eq!(variant.params()["robust"], ParamValue::Bool(false));

        // Original spec in the registry is unchanged.
        let original = registry.get("bh").unwrap();
        assert_eq!(original.params()["lambda"], ParamValue::Float(0.5));
    }

    #[test]
    fn test_override_unknown() {
        let registry = Registry::new();
        assert!(matches!(
            registry.overridden("ghost", MethodParams::new()),
            Err(BenchError::UnknownMethod(_))
        ));
    }

    #[test]
    fn test_clone_for_variant_registries() {
        let mut base = Registry::new();
        base.register(identity_spec("bh")).unwrap();

        let mut variant = base.clone();
        variant.register(identity_spec("lfdr")).unwrap();
        variant.remove("bh").unwrap();

        assert_eq!(base.ids(), vec!["bh"]);
        assert_eq!(variant.ids(), vec!["lfdr"]);
    }

    #[test]
    fn test_column_extractor() {
        let extract = column_extractor("q_value");

        let direct = extract(MethodOutput::QValues(vec![0.1])).unwrap();
        assert_eq!(direct, vec![0.1]);

        let mut table = HashMap::new();
        table.insert("q_value".to_string(), vec![0.2]);
        table.insert("lfdr".to_string(), vec![0.3]);
        let from_table = extract(MethodOutput::Table(table)).unwrap();
        assert_eq!(from_table, vec![0.2]);

        let missing = extract(MethodOutput::Table(HashMap::new()));
        assert!(missing.is_err());
    }
}
