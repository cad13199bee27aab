//! Tern Core
//!
//! Small math value types shared by the Tern crates:
//!
//! - **Vec3**: 3D vector with the usual arithmetic operators
//! - **Quat**: unit quaternion for rotations
//! - **Bounds**: axis-aligned boxes and spheres computed from mesh data
//!
//! # Example
//!
//! ```rust
//! use tern_core::{Quat, Vec3};
//!
//! let q = Quat::from_axis_angle(Vec3::UP, std::f32::consts::FRAC_PI_2);
//! let v = q.rotate_vec3(Vec3::new(1.0, 0.0, 0.0));
//! assert!((v.z + 1.0).abs() < 1e-5);
//! ```

mod bounds;
mod quat;
mod vec;

pub use bounds::{BoundingBox, BoundingSphere};
pub use quat::Quat;
pub use vec::Vec3;

/// Threshold below which squared magnitudes are treated as zero
pub const MATH_EPSILON: f32 = 1.0e-6;
