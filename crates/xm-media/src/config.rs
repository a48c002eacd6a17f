//! Runtime configuration of a media context.

use std::path::Path;

use serde::{Deserialize, Serialize};
use xm_core::MismatchTolerance;

use crate::error::{MediaError, MediaResult};

/// Default number of simultaneously live backends.
pub const DEFAULT_MAX_SOLVER: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// Ring size of the backend pool.
    pub max_solver: usize,
    /// Cache-trust test applied to the caller's redundant inputs.
    pub mismatch: MismatchTolerance,
    /// Reclaim transient states once this many are live. `None` keeps them until
    /// an explicit reclaim.
    pub reclaim_transients_above: Option<usize>,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            max_solver: DEFAULT_MAX_SOLVER,
            mismatch: MismatchTolerance::default(),
            reclaim_transients_above: None,
        }
    }
}

impl MediaConfig {
    pub fn with_max_solver(mut self, max_solver: usize) -> Self {
        self.max_solver = max_solver;
        self
    }

    pub fn validate(&self) -> MediaResult<()> {
        if self.max_solver == 0 {
            return Err(MediaError::Config {
                what: "max_solver must be at least 1".into(),
            });
        }
        let MismatchTolerance { rel, floor } = self.mismatch;
        if !(rel.is_finite() && rel >= 0.0) {
            return Err(MediaError::Config {
                what: format!("mismatch.rel must be finite and non-negative, got {rel}"),
            });
        }
        if !(floor.is_finite() && floor > 0.0) {
            return Err(MediaError::Config {
                what: format!("mismatch.floor must be finite and positive, got {floor}"),
            });
        }
        Ok(())
    }

    pub fn from_yaml_str(content: &str) -> MediaResult<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_yaml(path: &Path) -> MediaResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = MediaConfig::default();
        assert_eq!(config.max_solver, 10);
        assert_eq!(config.mismatch.rel, 1e-15);
        assert_eq!(config.mismatch.floor, 1e-10);
        assert!(config.reclaim_transients_above.is_none());
        config.validate().unwrap();
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config = MediaConfig::from_yaml_str("max_solver: 2\n").unwrap();
        assert_eq!(config.max_solver, 2);
        assert_eq!(config.mismatch, MismatchTolerance::default());

        let config = MediaConfig::from_yaml_str(
            "mismatch:\n  rel: 1.0e-12\nreclaim_transients_above: 64\n",
        )
        .unwrap();
        assert_eq!(config.max_solver, DEFAULT_MAX_SOLVER);
        assert_eq!(config.mismatch.rel, 1e-12);
        assert_eq!(config.mismatch.floor, 1e-10);
        assert_eq!(config.reclaim_transients_above, Some(64));
    }

    #[test]
    fn invalid_values_rejected() {
        let err = MediaConfig::from_yaml_str("max_solver: 0\n").unwrap_err();
        assert!(matches!(err, MediaError::Config { .. }));

        let err = MediaConfig::from_yaml_str("mismatch:\n  floor: 0.0\n").unwrap_err();
        assert!(matches!(err, MediaError::Config { .. }));

        let err = MediaConfig::from_yaml_str("max_solver: [1, 2]\n").unwrap_err();
        assert!(matches!(err, MediaError::Yaml(_)));
    }

    #[test]
    fn load_from_file() {
        let path = std::env::temp_dir().join(format!("xm-media-config-{}.yaml", std::process::id()));
        std::fs::write(&path, "max_solver: 3\n").unwrap();
        let config = MediaConfig::load_yaml(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(config.max_solver, 3);

        let missing = MediaConfig::load_yaml(Path::new("/nonexistent/xm-media.yaml")).unwrap_err();
        assert!(matches!(missing, MediaError::Io(_)));
    }
}
