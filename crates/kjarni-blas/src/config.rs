//! Runtime configuration for the gemv drivers.
//!
//! Loaded from `kjarni-blas.toml` when present, then overridden from the
//! environment. Every field has a default, so an empty file is a valid config.

use std::path::Path;
use std::str::FromStr;
use std::sync::OnceLock;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::BlasError;

/// Config file looked up by [`load_config`].
pub const DEFAULT_CONFIG_FILE: &str = "./kjarni-blas.toml";

/// Overrides [`BlasConfig::kernel`].
pub const KERNEL_ENV: &str = "KJARNI_BLAS_KERNEL";

/// Overrides [`BlasConfig::parallel_threshold`].
pub const PARALLEL_THRESHOLD_ENV: &str = "KJARNI_BLAS_PARALLEL_THRESHOLD";

/// Which f32 kernel family the drivers should run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum KernelChoice {
    /// Native SIMD if the CPU supports it, portable lanes otherwise.
    #[default]
    Auto,
    /// Element-at-a-time reference kernels.
    Scalar,
    /// 4-lane kernels built on the `load` helpers.
    Portable,
    /// AVX2/FMA on x86_64, NEON on aarch64.
    Native,
}

impl FromStr for KernelChoice {
    type Err = BlasError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(KernelChoice::Auto),
            "scalar" => Ok(KernelChoice::Scalar),
            "portable" => Ok(KernelChoice::Portable),
            "native" | "simd" => Ok(KernelChoice::Native),
            _ => Err(BlasError::UnknownKernel(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BlasConfig {
    #[serde(default)]
    pub kernel: KernelChoice,

    /// Problems with `m * n` at or above this run on the rayon pool.
    #[serde(default = "default_parallel_threshold")]
    pub parallel_threshold: usize,

    /// Smallest number of output elements handed to one rayon task.
    #[serde(default = "default_min_chunk")]
    pub min_chunk: usize,
}

impl Default for BlasConfig {
    fn default() -> Self {
        Self {
            kernel: KernelChoice::default(),
            parallel_threshold: default_parallel_threshold(),
            min_chunk: default_min_chunk(),
        }
    }
}

fn default_parallel_threshold() -> usize { 1 << 16 }
fn default_min_chunk() -> usize { 64 }

static GLOBAL: OnceLock<BlasConfig> = OnceLock::new();

impl BlasConfig {
    /// Parse a config from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: BlasConfig = toml::from_str(contents)?;
        Ok(config)
    }

    /// Apply `KJARNI_BLAS_*` overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(kernel) = lookup(KERNEL_ENV) {
            self.kernel = kernel
                .parse()
                .with_context(|| format!("while reading {}", KERNEL_ENV))?;
        }
        if let Some(threshold) = lookup(PARALLEL_THRESHOLD_ENV) {
            self.parallel_threshold = threshold
                .trim()
                .parse()
                .with_context(|| format!("{} must be an unsigned integer", PARALLEL_THRESHOLD_ENV))?;
        }
        Ok(())
    }

    /// Process-wide config used by the plain `sbgemv` / `dbgemv` entry points.
    ///
    /// Initialised on first use from [`load_config`]. A broken config file is
    /// logged and replaced by the defaults rather than failing every call.
    pub fn global() -> &'static BlasConfig {
        GLOBAL.get_or_init(|| match load_config() {
            Ok(config) => config,
            Err(e) => {
                log::warn!("[kjarni-blas] ignoring invalid config: {:#}", e);
                BlasConfig::default()
            }
        })
    }
}

/// Load configuration with priority: env > ./kjarni-blas.toml > defaults.
pub fn load_config() -> Result<BlasConfig> {
    let mut config = match try_load_from_path(DEFAULT_CONFIG_FILE)? {
        Some(config) => config,
        None => BlasConfig::default(),
    };
    config.apply_env()?;
    log::info!(
        "[kjarni-blas] kernel={:?} parallel_threshold={} min_chunk={}",
        config.kernel,
        config.parallel_threshold,
        config.min_chunk
    );
    Ok(config)
}

/// Load from a specific path. Environment overrides are not applied.
pub fn load_config_from_path(path: &Path) -> Result<BlasConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    BlasConfig::from_toml_str(&contents)
        .with_context(|| format!("failed to parse {}", path.display()))
}

fn try_load_from_path(path: impl AsRef<Path>) -> Result<Option<BlasConfig>> {
    let path = path.as_ref();
    if path.exists() {
        Ok(Some(load_config_from_path(path)?))
    } else {
        Ok(None)
    }
}
