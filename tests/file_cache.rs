//! A file-backed implementation of the ensemble cache trait, the way a
//! caller persisting expensive simulation runs across sessions would write
//! one.

use fdr_bench::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Stores one JSON file per cache key under a directory.
struct DirCache {
    dir: PathBuf,
}

impl DirCache {
    fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
        }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl EnsembleCache for DirCache {
    fn get_or_compute<F>(&self, key: &str, compute: F) -> Result<Ensemble>
    where
        F: FnOnce() -> Result<Ensemble>,
    {
        let path = self.path_for(key);
        if path.exists() {
            let json = std::fs::read_to_string(&path)?;
            return Ok(serde_json::from_str(&json)?);
        }
        let ensemble = compute()?;
        std::fs::write(&path, serde_json::to_string(&ensemble)?)?;
        Ok(ensemble)
    }
}

fn registry() -> Registry {
    let mut registry = Registry::new();
    registry.register(unadjusted()).unwrap();
    registry.register(bh()).unwrap();
    registry
}

fn small_run() -> Result<Ensemble> {
    let config = SimulationConfig::sine_informative()
        .with_n_tests(100)
        .with_seed(31);
    Ok(run_simulation(&config, &registry(), 3)?.informative)
}

#[test]
fn file_cache_computes_once_and_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let cache = DirCache::new(dir.path());
    let calls = AtomicUsize::new(0);

    let first = cache
        .get_or_compute("sine_100x3", || {
            calls.fetch_add(1, Ordering::SeqCst);
            small_run()
        })
        .unwrap();
    let second = cache
        .get_or_compute("sine_100x3", || {
            calls.fetch_add(1, Ordering::SeqCst);
            small_run()
        })
        .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(first.len(), second.len());
    for (a, b) in first.replicates.iter().zip(&second.replicates) {
        assert_eq!(a.q_values("bh"), b.q_values("bh"));
        assert_eq!(a.truth, b.truth);
    }

    // The persisted ensemble standardizes identically to the fresh one.
    let alphas = alpha_grid(0.05);
    assert_eq!(
        standardize(&first, &alphas).unwrap(),
        standardize(&second, &alphas).unwrap()
    );
}

#[test]
fn file_cache_failure_leaves_no_entry() {
    let dir = tempfile::tempdir().unwrap();
    let cache = DirCache::new(dir.path());

    let result = cache.get_or_compute("broken", || {
        Err(BenchError::EmptyData("nothing to simulate".into()))
    });
    assert!(result.is_err());
    assert!(!dir.path().join("broken.json").exists());

    // The key is still usable after a failed computation.
    cache.get_or_compute("broken", small_run).unwrap();
    assert!(dir.path().join("broken.json").exists());
}
