use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context as _;

use crate::foundation::error::{AlignError, AlignResult};

/// Environment variable consulted when the config carries no password.
pub const PASSWORD_ENV: &str = "OBS_PASSWORD";

/// Where and how to reach the automation backend.
#[derive(Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Host name or address.
    pub host: String,
    /// TCP port of the WebSocket server.
    pub port: u16,
    /// Server password.
    #[serde(skip_serializing)]
    pub password: Option<String>,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 4455,
            password: None,
        }
    }
}

impl std::fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl ConnectionConfig {
    /// WebSocket URL of the server.
    pub fn url(&self) -> String {
        format!("ws://{}:{}", self.host, self.port)
    }

    /// Use `fallback` when no password was configured.
    pub fn fill_password(&mut self, fallback: Option<String>) {
        if self.password.is_none() {
            self.password = fallback.filter(|p| !p.is_empty());
        }
    }

    /// Fill a missing password from [`PASSWORD_ENV`].
    pub fn password_from_env(&mut self) {
        self.fill_password(std::env::var(PASSWORD_ENV).ok());
    }

    /// Reject an unusable endpoint or a missing credential.
    pub fn validate(&self) -> AlignResult<()> {
        if self.host.trim().is_empty() {
            return Err(AlignError::config("connection host must be non-empty"));
        }
        if self.port == 0 {
            return Err(AlignError::config("connection port must be non-zero"));
        }
        match self.password.as_deref() {
            Some(p) if !p.is_empty() => Ok(()),
            _ => Err(AlignError::config(format!(
                "no backend password configured (set connection.password or {PASSWORD_ENV})"
            ))),
        }
    }
}

/// Everything a convergence run needs besides the backend connection itself.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct RunConfig {
    /// Backend endpoint and credential.
    #[serde(default)]
    pub connection: ConnectionConfig,
    /// Scene holding the tracked sources.
    #[serde(default = "default_scene")]
    pub scene: String,
    /// Names of the tracked sources.
    pub sources: Vec<String>,
    /// Reference layout image.
    pub reference: PathBuf,
    /// Source captured as the composited output; the scene itself when unset.
    #[serde(default)]
    pub capture_source: Option<String>,
    /// Upper bound on capture/score/adjust iterations.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,
    /// Score at or above which the layout counts as converged.
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,
    /// Position nudge in pixels per iteration; scale moves by `step / 100`.
    #[serde(default = "default_adjustment_step")]
    pub adjustment_step: f64,
    /// Difference luminance above which a pixel counts as changed.
    #[serde(default = "default_diff_threshold")]
    pub diff_threshold: u8,
    /// Pause after each adjustment so the compositor can settle.
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
    /// Write each captured frame and difference mask here.
    #[serde(default)]
    pub dump_dir: Option<PathBuf>,
}

fn default_scene() -> String {
    "DJing".to_string()
}

fn default_max_iterations() -> u32 {
    20
}

fn default_similarity_threshold() -> f64 {
    0.99
}

fn default_adjustment_step() -> f64 {
    5.0
}

fn default_diff_threshold() -> u8 {
    50
}

fn default_settle_delay_ms() -> u64 {
    500
}

impl RunConfig {
    /// Config with default tunables for the given sources and reference image.
    pub fn new(sources: Vec<String>, reference: impl Into<PathBuf>) -> Self {
        Self {
            connection: ConnectionConfig::default(),
            scene: default_scene(),
            sources,
            reference: reference.into(),
            capture_source: None,
            max_iterations: default_max_iterations(),
            similarity_threshold: default_similarity_threshold(),
            adjustment_step: default_adjustment_step(),
            diff_threshold: default_diff_threshold(),
            settle_delay_ms: default_settle_delay_ms(),
            dump_dir: None,
        }
    }

    /// Read a JSON config file. Relative paths inside it resolve against the
    /// file's directory.
    pub fn from_path(path: &Path) -> AlignResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))
            .map_err(|e| AlignError::config(format!("{e:#}")))?;
        let mut cfg: Self = serde_json::from_str(&text).map_err(|e| {
            AlignError::config(format!("parse config '{}': {e}", path.display()))
        })?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        cfg.reference = resolve(base, &cfg.reference);
        cfg.dump_dir = cfg.dump_dir.map(|d| resolve(base, &d));
        Ok(cfg)
    }

    /// Source captured as the composited output.
    pub fn capture_source(&self) -> &str {
        self.capture_source.as_deref().unwrap_or(&self.scene)
    }

    /// Settle pause between iterations.
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    /// Reject empty source lists and out-of-range tunables.
    pub fn validate(&self) -> AlignResult<()> {
        if self.scene.trim().is_empty() {
            return Err(AlignError::config("scene name must be non-empty"));
        }
        if self.sources.is_empty() {
            return Err(AlignError::config("at least one tracked source is required"));
        }
        let mut seen = BTreeSet::new();
        for s in &self.sources {
            if s.trim().is_empty() {
                return Err(AlignError::config("source names must be non-empty"));
            }
            if !seen.insert(s.as_str()) {
                return Err(AlignError::config(format!("source '{s}' is listed twice")));
            }
        }
        if self.reference.as_os_str().is_empty() {
            return Err(AlignError::config("reference image path must be set"));
        }
        if self.max_iterations == 0 {
            return Err(AlignError::config("max_iterations must be >= 1"));
        }
        if !(self.similarity_threshold > 0.0 && self.similarity_threshold <= 1.0) {
            return Err(AlignError::config(format!(
                "similarity_threshold must be in (0, 1], got {}",
                self.similarity_threshold
            )));
        }
        if !(self.adjustment_step.is_finite() && self.adjustment_step > 0.0) {
            return Err(AlignError::config(format!(
                "adjustment_step must be a positive number, got {}",
                self.adjustment_step
            )));
        }
        Ok(())
    }
}

fn resolve(base: &Path, p: &Path) -> PathBuf {
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base.join(p)
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
