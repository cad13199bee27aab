//! Collision shapes derived from scene nodes
//!
//! Box and sphere shapes come from the bounds of the node's mesh, scaled by
//! the node's scale. Triangle meshes copy the mesh triangles; heightfields
//! carry their own samples.

use crate::error::{PhysicsError, Result};
use tern_core::Vec3;
use tern_scene::{Node, NodeId};

/// Which collision shape to build for a node
#[derive(Clone, Debug, PartialEq)]
pub enum ShapeType {
    /// Box around the mesh bounding box
    Box,
    /// Sphere around the mesh bounding sphere
    Sphere,
    /// The mesh triangles themselves (static and kinematic bodies only)
    TriangleMesh,
    /// Terrain height samples (static and kinematic bodies only)
    Heightfield(Heightfield),
}

impl ShapeType {
    pub fn kind(&self) -> ShapeKind {
        match self {
            Self::Box => ShapeKind::Box,
            Self::Sphere => ShapeKind::Sphere,
            Self::TriangleMesh => ShapeKind::TriangleMesh,
            Self::Heightfield(_) => ShapeKind::Heightfield,
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind().name()
    }

    /// Whether the shape may back a dynamic body
    pub fn supports_dynamic(&self) -> bool {
        matches!(self, Self::Box | Self::Sphere)
    }
}

/// Shape family of a body, without the shape data
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Box,
    Sphere,
    TriangleMesh,
    Heightfield,
}

impl ShapeKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Box => "Box",
            Self::Sphere => "Sphere",
            Self::TriangleMesh => "TriangleMesh",
            Self::Heightfield => "Heightfield",
        }
    }
}

/// Grid of terrain heights
///
/// Samples are row-major: `heights[row * cols + col]`, rows along Z and
/// columns along X. The grid spans `scale.x` by `scale.z` centered on the
/// node origin and each sample is multiplied by `scale.y`.
#[derive(Clone, Debug, PartialEq)]
pub struct Heightfield {
    pub rows: usize,
    pub cols: usize,
    pub heights: Vec<f32>,
    pub scale: Vec3,
}

impl Heightfield {
    pub fn new(rows: usize, cols: usize, heights: Vec<f32>, scale: Vec3) -> Self {
        Self {
            rows,
            cols,
            heights,
            scale,
        }
    }

    /// Flat grid of zeros
    pub fn flat(rows: usize, cols: usize, scale: Vec3) -> Self {
        Self::new(rows, cols, vec![0.0; rows * cols], scale)
    }

    /// Build by sampling `f(row, col)`
    pub fn from_fn(rows: usize, cols: usize, scale: Vec3, f: impl Fn(usize, usize) -> f32) -> Self {
        let heights = (0..rows * cols).map(|i| f(i / cols, i % cols)).collect();
        Self::new(rows, cols, heights, scale)
    }

    fn validate(&self) -> Result<()> {
        if self.rows < 2 || self.cols < 2 {
            return Err(PhysicsError::InvalidHeightfield(format!(
                "need at least 2x2 samples, got {}x{}",
                self.rows, self.cols
            )));
        }
        if self.heights.len() != self.rows * self.cols {
            return Err(PhysicsError::InvalidHeightfield(format!(
                "expected {} samples, got {}",
                self.rows * self.cols,
                self.heights.len()
            )));
        }
        if self.heights.iter().any(|h| !h.is_finite()) {
            return Err(PhysicsError::InvalidHeightfield("non-finite sample".into()));
        }
        Ok(())
    }
}

/// Engine-independent shape description handed to the backend
#[derive(Clone, Debug, PartialEq)]
pub enum ShapeDesc {
    Box {
        half_extents: Vec3,
    },
    Sphere {
        radius: f32,
    },
    TriangleMesh {
        vertices: Vec<Vec3>,
        indices: Vec<[u32; 3]>,
    },
    Heightfield {
        rows: usize,
        cols: usize,
        heights: Vec<f32>,
        scale: Vec3,
    },
}

impl ShapeDesc {
    /// Box with half extents `0.5 * |max - min| * |scale|`
    pub fn scaled_box(min: Vec3, max: Vec3, scale: Vec3) -> Self {
        Self::Box {
            half_extents: (max - min).abs().mul_elem(scale.abs()) * 0.5,
        }
    }

    /// Sphere whose radius grows with the largest scale component
    pub fn scaled_sphere(radius: f32, scale: Vec3) -> Self {
        Self::Sphere {
            radius: radius * scale.abs().max_element(),
        }
    }

    /// Describe the collision shape for a node
    ///
    /// Returns the description and the collider's offset from the node
    /// origin, in the node's rotated frame.
    pub fn from_node(id: NodeId, node: &Node, shape_type: &ShapeType) -> Result<(Self, Vec3)> {
        let scale = node.scale;
        let mesh = || {
            node.model
                .as_ref()
                .map(|model| model.mesh())
                .ok_or(PhysicsError::MissingModel(id))
        };

        match shape_type {
            ShapeType::Box => {
                let bbox = mesh()?.bounding_box();
                if bbox.is_empty() {
                    return Err(PhysicsError::EmptyBounds(id));
                }
                Ok((
                    Self::scaled_box(bbox.min, bbox.max, scale),
                    bbox.center().mul_elem(scale),
                ))
            }
            ShapeType::Sphere => {
                let sphere = mesh()?.bounding_sphere();
                if sphere.is_empty() {
                    return Err(PhysicsError::EmptyBounds(id));
                }
                Ok((
                    Self::scaled_sphere(sphere.radius, scale),
                    sphere.center.mul_elem(scale),
                ))
            }
            ShapeType::TriangleMesh => {
                let geometry = mesh()?.geometry();
                let vertices: Vec<Vec3> = geometry.positions.iter().map(|p| p.mul_elem(scale)).collect();
                let indices = triangles(&geometry.indices, vertices.len())?;
                Ok((Self::TriangleMesh { vertices, indices }, Vec3::ZERO))
            }
            ShapeType::Heightfield(field) => {
                field.validate()?;
                let desc = Self::Heightfield {
                    rows: field.rows,
                    cols: field.cols,
                    heights: field.heights.clone(),
                    scale: field.scale.mul_elem(scale),
                };
                Ok((desc, Vec3::ZERO))
            }
        }
    }

    /// Cache key, for the shapes that are shared between bodies
    pub fn key(&self) -> Option<ShapeKey> {
        match self {
            Self::Box { half_extents } => Some(ShapeKey::Box([
                half_extents.x.to_bits(),
                half_extents.y.to_bits(),
                half_extents.z.to_bits(),
            ])),
            Self::Sphere { radius } => Some(ShapeKey::Sphere(radius.to_bits())),
            Self::TriangleMesh { .. } | Self::Heightfield { .. } => None,
        }
    }
}

/// Identity of a cached box or sphere: the bit patterns of its scaled size
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShapeKey {
    Box([u32; 3]),
    Sphere(u32),
}

fn triangles(indices: &[u32], vertex_count: usize) -> Result<Vec<[u32; 3]>> {
    if vertex_count < 3 {
        return Err(PhysicsError::InvalidMesh(format!(
            "need at least 3 vertices, got {vertex_count}"
        )));
    }
    if indices.is_empty() || indices.len() % 3 != 0 {
        return Err(PhysicsError::InvalidMesh(format!(
            "index count {} is not a non-zero multiple of 3",
            indices.len()
        )));
    }
    if let Some(bad) = indices.iter().find(|&&i| i as usize >= vertex_count) {
        return Err(PhysicsError::InvalidMesh(format!(
            "index {bad} out of range for {vertex_count} vertices"
        )));
    }
    Ok(indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]]).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tern_scene::{Geometry, Model, SceneGraph};

    fn node_with(geometry: Geometry, scale: Vec3) -> (NodeId, Node) {
        let node = Node::new("shape")
            .with_scale(scale)
            .with_model(Model::from_geometry(geometry));
        let mut scene = SceneGraph::new();
        let id = scene.add(node.clone());
        (id, node)
    }

    #[test]
    fn test_box_from_bounds_and_scale() {
        let geometry = Geometry::new(
            vec![Vec3::new(0.0, 0.0, 0.0), Vec3::new(2.0, 4.0, 6.0), Vec3::new(1.0, 1.0, 1.0)],
            vec![0, 1, 2],
        );
        let (id, node) = node_with(geometry, Vec3::new(1.0, -2.0, 0.5));

        let (desc, offset) = ShapeDesc::from_node(id, &node, &ShapeType::Box).unwrap();
        assert_eq!(desc, ShapeDesc::Box { half_extents: Vec3::new(1.0, 4.0, 1.5) });
        assert_eq!(offset, Vec3::new(1.0, -4.0, 1.5));
    }

    #[test]
    fn test_sphere_uses_largest_scale() {
        let (id, node) = node_with(Geometry::cube(1.0), Vec3::new(1.0, 3.0, -2.0));

        let (desc, offset) = ShapeDesc::from_node(id, &node, &ShapeType::Sphere).unwrap();
        match desc {
            ShapeDesc::Sphere { radius } => assert!((radius - 3.0f32.sqrt() * 3.0).abs() < 1e-4),
            other => panic!("expected sphere, got {other:?}"),
        }
        assert_eq!(offset, Vec3::ZERO);
    }

    #[test]
    fn test_missing_model_and_empty_bounds() {
        let bare = Node::new("bare");
        let mut scene = SceneGraph::new();
        let id = scene.add(bare.clone());
        assert!(matches!(
            ShapeDesc::from_node(id, &bare, &ShapeType::Box),
            Err(PhysicsError::MissingModel(_))
        ));

        let (id, empty) = node_with(Geometry::default(), Vec3::ONE);
        assert!(matches!(
            ShapeDesc::from_node(id, &empty, &ShapeType::Sphere),
            Err(PhysicsError::EmptyBounds(_))
        ));
    }

    #[test]
    fn test_triangle_mesh_scaled_and_checked() {
        let (id, node) = node_with(Geometry::plane(1.0, 2.0), Vec3::new(2.0, 1.0, 1.0));
        let (desc, _) = ShapeDesc::from_node(id, &node, &ShapeType::TriangleMesh).unwrap();
        match desc {
            ShapeDesc::TriangleMesh { vertices, indices } => {
                assert_eq!(vertices[1], Vec3::new(2.0, 0.0, -2.0));
                assert_eq!(indices, vec![[0, 2, 1], [0, 3, 2]]);
            }
            other => panic!("expected triangle mesh, got {other:?}"),
        }

        let broken = Geometry::new(Geometry::plane(1.0, 1.0).positions, vec![0, 1, 9]);
        let (id, node) = node_with(broken, Vec3::ONE);
        assert!(matches!(
            ShapeDesc::from_node(id, &node, &ShapeType::TriangleMesh),
            Err(PhysicsError::InvalidMesh(_))
        ));
    }

    #[test]
    fn test_heightfield_needs_no_model() {
        let field = Heightfield::from_fn(3, 4, Vec3::new(10.0, 1.0, 20.0), |r, c| (r + c) as f32);
        assert_eq!(field.heights[4 + 1], 2.0);

        let node = Node::new("terrain").with_scale(Vec3::new(2.0, 3.0, 1.0));
        let mut scene = SceneGraph::new();
        let id = scene.add(node.clone());

        let (desc, offset) = ShapeDesc::from_node(id, &node, &ShapeType::Heightfield(field)).unwrap();
        match desc {
            ShapeDesc::Heightfield { rows, cols, scale, .. } => {
                assert_eq!((rows, cols), (3, 4));
                assert_eq!(scale, Vec3::new(20.0, 3.0, 20.0));
            }
            other => panic!("expected heightfield, got {other:?}"),
        }
        assert_eq!(offset, Vec3::ZERO);
    }

    #[test]
    fn test_heightfield_validation() {
        let short = Heightfield::new(2, 2, vec![0.0; 3], Vec3::ONE);
        let tiny = Heightfield::flat(1, 5, Vec3::ONE);
        let node = Node::new("terrain");
        let mut scene = SceneGraph::new();
        let id = scene.add(node.clone());

        for field in [short, tiny] {
            assert!(matches!(
                ShapeDesc::from_node(id, &node, &ShapeType::Heightfield(field)),
                Err(PhysicsError::InvalidHeightfield(_))
            ));
        }
    }

    #[test]
    fn test_shape_keys() {
        let a = ShapeDesc::scaled_box(Vec3::ZERO, Vec3::splat(2.0), Vec3::ONE);
        let b = ShapeDesc::scaled_box(Vec3::splat(-1.0), Vec3::splat(1.0), Vec3::ONE);
        assert_eq!(a.key(), b.key());
        assert_ne!(a.key(), ShapeDesc::scaled_sphere(1.0, Vec3::ONE).key());
        assert!(ShapeDesc::TriangleMesh { vertices: vec![], indices: vec![] }.key().is_none());
    }
}
