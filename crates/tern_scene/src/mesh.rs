//! Mesh geometry and the model that attaches it to a node

use std::sync::Arc;
use tern_core::{BoundingBox, BoundingSphere, Vec3};

/// Vertex positions and triangle indices
#[derive(Clone, Debug, Default)]
pub struct Geometry {
    /// Vertex positions in local space
    pub positions: Vec<Vec3>,
    /// Index data (triangles)
    pub indices: Vec<u32>,
}

impl Geometry {
    pub fn new(positions: Vec<Vec3>, indices: Vec<u32>) -> Self {
        Self { positions, indices }
    }

    /// Axis-aligned cube centered on the origin
    pub fn cube(half_size: f32) -> Self {
        let h = half_size;
        let positions = vec![
            Vec3::new(-h, -h, -h),
            Vec3::new(h, -h, -h),
            Vec3::new(h, h, -h),
            Vec3::new(-h, h, -h),
            Vec3::new(-h, -h, h),
            Vec3::new(h, -h, h),
            Vec3::new(h, h, h),
            Vec3::new(-h, h, h),
        ];
        #[rustfmt::skip]
        let indices = vec![
            0, 2, 1, 0, 3, 2, // back
            4, 5, 6, 4, 6, 7, // front
            0, 1, 5, 0, 5, 4, // bottom
            3, 6, 2, 3, 7, 6, // top
            0, 4, 7, 0, 7, 3, // left
            1, 2, 6, 1, 6, 5, // right
        ];
        Self { positions, indices }
    }

    /// Flat quad in the XZ plane, facing +Y
    pub fn plane(half_width: f32, half_depth: f32) -> Self {
        let positions = vec![
            Vec3::new(-half_width, 0.0, -half_depth),
            Vec3::new(half_width, 0.0, -half_depth),
            Vec3::new(half_width, 0.0, half_depth),
            Vec3::new(-half_width, 0.0, half_depth),
        ];
        Self {
            positions,
            indices: vec![0, 2, 1, 0, 3, 2],
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Geometry plus its precomputed bounding volumes
#[derive(Clone, Debug)]
pub struct Mesh {
    geometry: Geometry,
    bounding_box: BoundingBox,
    bounding_sphere: BoundingSphere,
}

impl Mesh {
    /// Create a mesh, computing bounds from the vertex positions
    pub fn new(geometry: Geometry) -> Self {
        let bounding_box = BoundingBox::from_points(&geometry.positions);
        let bounding_sphere = BoundingSphere::from_box(&bounding_box);
        Self {
            geometry,
            bounding_box,
            bounding_sphere,
        }
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn bounding_box(&self) -> &BoundingBox {
        &self.bounding_box
    }

    pub fn bounding_sphere(&self) -> &BoundingSphere {
        &self.bounding_sphere
    }
}

/// Renderable attached to a node. Meshes are shared between models.
#[derive(Clone, Debug)]
pub struct Model {
    mesh: Arc<Mesh>,
}

impl Model {
    pub fn new(mesh: Arc<Mesh>) -> Self {
        Self { mesh }
    }

    /// Wrap a geometry in a fresh, unshared mesh
    pub fn from_geometry(geometry: Geometry) -> Self {
        Self::new(Arc::new(Mesh::new(geometry)))
    }

    pub fn mesh(&self) -> &Arc<Mesh> {
        &self.mesh
    }
}
