//! Shared JSON fixtures for morphsample tests and benches.
//!
//! `fixtures/manifest.json` lists every fixture with its kind and path
//! relative to the `fixtures/` directory.

use std::fs;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Deserialize;

static MANIFEST: Lazy<Vec<FixtureEntry>> = Lazy::new(|| {
    let raw = include_str!("../../../../fixtures/manifest.json");
    let manifest: Manifest = serde_json::from_str(raw).expect("fixtures manifest should parse");
    manifest.fixtures
});

#[derive(Debug, Deserialize)]
struct Manifest {
    fixtures: Vec<FixtureEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum FixtureKind {
    Scene,
    Settings,
}

#[derive(Debug, Deserialize)]
struct FixtureEntry {
    name: String,
    kind: FixtureKind,
    path: String,
}

fn load<T: DeserializeOwned>(kind: FixtureKind, name: &str) -> Result<T> {
    let entry = MANIFEST
        .iter()
        .find(|e| e.kind == kind && e.name == name)
        .ok_or_else(|| anyhow!("unknown {kind:?} fixture '{name}'"))?;
    let path: PathBuf = [env!("CARGO_MANIFEST_DIR"), "../../../fixtures", entry.path.as_str()]
        .iter()
        .collect();
    let text = fs::read_to_string(&path)
        .with_context(|| format!("failed to read fixture at {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse JSON fixture {name}"))
}

/// Scene descriptions (objects, shape keys, drivers, actions).
pub mod scenes {
    use super::*;

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        super::load(FixtureKind::Scene, name)
    }
}

/// Export settings bundles.
pub mod settings {
    use super::*;

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        super::load(FixtureKind::Settings, name)
    }
}
