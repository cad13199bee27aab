//! Physics simulation configuration

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tern_core::Vec3;

/// Physics simulation configuration
///
/// Loadable from TOML; missing keys fall back to the defaults.
///
/// ```toml
/// gravity = { x = 0.0, y = -9.81, z = 0.0 }
/// timestep = 0.016666668
/// max_substeps = 4
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Gravity vector
    pub gravity: Vec3,
    /// Physics timestep (0 = use frame delta)
    pub timestep: f32,
    /// Maximum substeps per frame
    pub max_substeps: u32,
    /// Enable continuous collision detection for new bodies
    pub ccd_enabled: bool,
    /// Solver iterations
    pub solver_iterations: u32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, -9.81, 0.0),
            timestep: 1.0 / 60.0,
            max_substeps: 4,
            ccd_enabled: false,
            solver_iterations: 4,
        }
    }
}

impl PhysicsConfig {
    pub fn with_gravity(mut self, gravity: Vec3) -> Self {
        self.gravity = gravity;
        self
    }

    /// Fixed timestep, or 0 to step by the frame delta
    pub fn with_timestep(mut self, timestep: f32) -> Self {
        self.timestep = timestep.max(0.0);
        self
    }

    pub fn with_max_substeps(mut self, max_substeps: u32) -> Self {
        self.max_substeps = max_substeps.max(1);
        self
    }

    pub fn with_ccd(mut self, enabled: bool) -> Self {
        self.ccd_enabled = enabled;
        self
    }

    pub fn with_solver_iterations(mut self, iterations: u32) -> Self {
        self.solver_iterations = iterations;
        self
    }

    /// Zero gravity preset
    pub fn zero_gravity() -> Self {
        Self::default().with_gravity(Vec3::ZERO)
    }

    /// 2D side-scroller preset
    pub fn sidescroller() -> Self {
        Self::default().with_gravity(Vec3::new(0.0, -20.0, 0.0))
    }

    /// Moon gravity preset
    pub fn low_gravity() -> Self {
        Self::default().with_gravity(Vec3::new(0.0, -1.62, 0.0))
    }

    /// Parse a TOML document, clamping values the way the builders do
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source)?;
        let (timestep, max_substeps) = (config.timestep, config.max_substeps);
        Ok(config.with_timestep(timestep).with_max_substeps(max_substeps))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PhysicsError;

    #[test]
    fn test_physics_config() {
        let config = PhysicsConfig::default();
        assert!((config.gravity.y - (-9.81)).abs() < 0.001);
        assert!((config.timestep - 1.0 / 60.0).abs() < 1e-6);
    }

    #[test]
    fn test_config_presets() {
        let zero_g = PhysicsConfig::zero_gravity();
        assert!(zero_g.gravity.y.abs() < 0.001);

        let moon = PhysicsConfig::low_gravity();
        assert!((moon.gravity.y - (-1.62)).abs() < 0.001);
    }

    #[test]
    fn test_from_toml_partial() {
        let config = PhysicsConfig::from_toml_str(
            r#"
            timestep = 0.01
            gravity = { x = 0.0, y = -3.0, z = 1.0 }
            "#,
        )
        .unwrap();

        assert!((config.timestep - 0.01).abs() < 1e-6);
        assert_eq!(config.gravity, Vec3::new(0.0, -3.0, 1.0));
        assert_eq!(config.max_substeps, PhysicsConfig::default().max_substeps);
    }

    #[test]
    fn test_from_toml_rejects_bad_types() {
        let err = PhysicsConfig::from_toml_str("max_substeps = \"many\"").unwrap_err();
        assert!(matches!(err, PhysicsError::Config(_)));
    }

    #[test]
    fn test_from_toml_clamps_like_builders() {
        let config = PhysicsConfig::from_toml_str(
            r#"
            max_substeps = 0
            timestep = -0.5
            "#,
        )
        .unwrap();

        assert_eq!(config.max_substeps, 1);
        assert_eq!(config.timestep, 0.0);
    }

    #[test]
    fn test_load_missing_file() {
        let err = PhysicsConfig::load("/nonexistent/tern/physics.toml").unwrap_err();
        assert!(matches!(err, PhysicsError::Io(_)));
    }
}
