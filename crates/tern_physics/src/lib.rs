//! # Tern Physics
//!
//! Rigid-body physics for scene nodes. Collision shapes are derived from the
//! node's mesh bounds, bodies are registered with a Rapier world on
//! creation, and every [`PhysicsController::step`] writes the simulated
//! poses back into the nodes.
//!
//! ```rust
//! use tern_physics::{PhysicsConfig, PhysicsController, RigidBodyParams, ShapeType};
//! use tern_scene::{Geometry, Model, Node, SceneGraph, Vec3};
//!
//! let mut scene = SceneGraph::new();
//! let crate_node = scene.add(
//!     Node::new("crate")
//!         .with_position(Vec3::new(0.0, 5.0, 0.0))
//!         .with_model(Model::from_geometry(Geometry::cube(0.5))),
//! );
//!
//! let mut physics = PhysicsController::new(PhysicsConfig::default());
//! let body = physics
//!     .create_rigid_body(&scene, crate_node, &ShapeType::Box, &RigidBodyParams::default())
//!     .unwrap();
//! physics.apply_impulse(body, Vec3::new(1.0, 0.0, 0.0), None).unwrap();
//!
//! for _ in 0..10 {
//!     physics.step(&mut scene, 1.0 / 60.0);
//! }
//! assert!(scene.get(crate_node).unwrap().position.y < 5.0);
//! ```

pub mod backend;
pub mod config;
pub mod controller;
pub mod error;
pub mod motion_state;
pub mod queries;
pub mod rapier_backend;
pub mod rigid_body;
pub mod shape;

pub use backend::{BodyHandle, BodyKind, PhysicsBackend};
pub use config::PhysicsConfig;
pub use controller::PhysicsController;
pub use error::{PhysicsError, Result};
pub use motion_state::MotionState;
pub use queries::{CollisionEvent, CollisionEventType, Ray, RaycastHit};
pub use rapier_backend::RapierBackend;
pub use rigid_body::{PhysicsRigidBody, RigidBodyParams};
pub use shape::{Heightfield, ShapeDesc, ShapeKind, ShapeType};
