//! # Tern Scene
//!
//! A minimal scene graph: named nodes with a local transform, an optional
//! model, and parent/child links.
//!
//! ```rust
//! use tern_core::Vec3;
//! use tern_scene::{Node, SceneGraph};
//!
//! let mut scene = SceneGraph::new();
//! let root = scene.add(Node::new("root").with_position(Vec3::new(0.0, 1.0, 0.0)));
//! let child = scene.add_child(root, Node::new("child").with_position(Vec3::new(2.0, 0.0, 0.0)));
//!
//! let world = scene.world_transform(child).unwrap();
//! assert_eq!(world.position, Vec3::new(2.0, 1.0, 0.0));
//! ```

mod mesh;
mod node;

pub use mesh::{Geometry, Mesh, Model};
pub use node::{Node, NodeId, SceneGraph, WorldTransform};

pub use tern_core::{BoundingBox, BoundingSphere, Quat, Vec3};
