//! Scene graph node types
//!
//! Handles, transforms, geometry and material descriptions for the objects the
//! city places into the rendering backend.

use glam::{EulerRot, Mat4, Quat, Vec3};

use crate::city::config::Color;

/// Unique identifier for a scene graph node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SceneNodeId(pub u64);

/// Opaque handle to an object owned by a rendering backend.
pub type ObjectHandle = SceneNodeId;

/// Which group an object belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Layer {
    Ground,
    Buildings,
    Debris,
}

impl Layer {
    pub const ALL: [Layer; 3] = [Layer::Ground, Layer::Buildings, Layer::Debris];

    pub fn name(self) -> &'static str {
        match self {
            Layer::Ground => "ground",
            Layer::Buildings => "buildings",
            Layer::Debris => "debris",
        }
    }
}

/// Local transform relative to the parent node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LocalTransform {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for LocalTransform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

impl LocalTransform {
    /// Identity transform (no translation or rotation).
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a translation-only transform.
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Position plus XYZ-ordered Euler rotation in radians.
    pub fn from_euler(position: Vec3, angles: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::from_euler(EulerRot::XYZ, angles.x, angles.y, angles.z),
        }
    }

    /// Convert to a 4x4 matrix.
    pub fn to_mat4(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.position)
    }
}

/// Where a box's local origin sits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pivot {
    /// Origin at the centroid
    Center,
    /// Origin at the middle of the bottom face, so rotation topples about the base
    Base,
}

/// Thickness given to ground planes so they rasterize as a slab.
pub const PLANE_THICKNESS: f32 = 0.05;

/// Shape of a renderable object.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Geometry {
    Box { size: Vec3, pivot: Pivot },
    /// Horizontal plane whose top face lies at the local origin.
    Plane { width: f32, depth: f32 },
}

impl Geometry {
    /// Matrix taking the unit cube (`[-0.5, 0.5]^3`) onto this shape in local space.
    pub fn unit_cube_matrix(&self) -> Mat4 {
        match *self {
            Geometry::Box { size, pivot: Pivot::Center } => Mat4::from_scale(size),
            Geometry::Box { size, pivot: Pivot::Base } => {
                Mat4::from_translation(Vec3::new(0.0, size.y * 0.5, 0.0)) * Mat4::from_scale(size)
            }
            Geometry::Plane { width, depth } => {
                Mat4::from_translation(Vec3::new(0.0, -PLANE_THICKNESS * 0.5, 0.0))
                    * Mat4::from_scale(Vec3::new(width, PLANE_THICKNESS, depth))
            }
        }
    }
}

/// Surface description.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    pub color: Color,
}

/// Everything a backend needs to create an object.
#[derive(Clone, Debug, PartialEq)]
pub struct ObjectDesc {
    pub name: String,
    pub layer: Layer,
    pub geometry: Geometry,
    pub material: Material,
    pub transform: LocalTransform,
}

/// What a scene node contains.
#[derive(Clone, Debug)]
pub enum NodeContent {
    /// A grouping node with no geometry of its own.
    Group,
    /// A drawable object.
    Mesh { geometry: Geometry, material: Material },
}

/// A single node in the scene graph.
#[derive(Clone, Debug)]
pub struct SceneNode {
    pub id: SceneNodeId,
    pub name: String,
    pub parent: Option<SceneNodeId>,
    pub children: Vec<SceneNodeId>,
    pub local_transform: LocalTransform,
    /// Cached world transform (recomputed during propagation).
    pub world_transform: Mat4,
    pub layer: Layer,
    pub visible: bool,
    pub content: NodeContent,
}

impl SceneNode {
    /// Create a new scene node.
    pub fn new(
        id: SceneNodeId,
        name: impl Into<String>,
        layer: Layer,
        content: NodeContent,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            parent: None,
            children: Vec::new(),
            local_transform: LocalTransform::identity(),
            world_transform: Mat4::IDENTITY,
            layer,
            visible: true,
            content,
        }
    }
}
