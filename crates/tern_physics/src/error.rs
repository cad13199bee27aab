//! Physics error types

use tern_scene::NodeId;
use thiserror::Error;

/// Errors raised while building or driving rigid bodies
#[derive(Error, Debug)]
pub enum PhysicsError {
    /// The node id does not name a node in the scene
    #[error("Node not found: {0:?}")]
    NodeNotFound(NodeId),

    /// Box, sphere and triangle mesh shapes need the node's model
    #[error("Node {0:?} has no model to derive a collision shape from")]
    MissingModel(NodeId),

    /// The node's mesh has no vertices to bound
    #[error("Mesh bounds of node {0:?} are empty")]
    EmptyBounds(NodeId),

    /// Triangle data cannot form a collision mesh
    #[error("Invalid triangle mesh: {0}")]
    InvalidMesh(String),

    /// Height samples do not match the declared grid
    #[error("Invalid heightfield: {0}")]
    InvalidHeightfield(String),

    /// Mass must be finite and non-negative
    #[error("Invalid mass: {0}")]
    InvalidMass(f32),

    /// Triangle meshes and heightfields can only back static or kinematic bodies
    #[error("{0} shapes cannot be used for dynamic bodies")]
    ConcaveDynamicShape(&'static str),

    /// Each node carries at most one rigid body
    #[error("Node {0:?} already has a rigid body")]
    NodeAlreadyHasBody(NodeId),

    /// The body was removed or never registered
    #[error("Rigid body not found")]
    BodyNotFound,

    /// Configuration file could not be read
    #[error("Failed to read physics config: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be parsed
    #[error("Failed to parse physics config: {0}")]
    Config(#[from] toml::de::Error),
}

/// Result type for physics operations
pub type Result<T> = std::result::Result<T, PhysicsError>;
