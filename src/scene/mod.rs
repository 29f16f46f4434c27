//! Scene objects and the in-process rendering backend

pub mod backend;
pub mod flatten;
pub mod graph;
pub mod node;

pub use backend::RenderBackend;
pub use flatten::FlatInstance;
pub use graph::SceneGraph;
pub use node::{
    Geometry, Layer, LocalTransform, Material, NodeContent, ObjectDesc, ObjectHandle, Pivot,
    SceneNode, SceneNodeId,
};
