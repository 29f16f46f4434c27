//! Scene graph: CPU-side hierarchy of nodes.
//!
//! The root has one group node per [`Layer`]; every object created through the
//! [`RenderBackend`] interface hangs under its layer's group. Each frame,
//! `flatten()` walks the tree and produces a flat `Vec<FlatInstance>` that can
//! be uploaded directly to the GPU.

use std::collections::HashMap;

use glam::{Mat4, Quat};

use super::backend::RenderBackend;
use super::flatten::FlatInstance;
use super::node::{
    Layer, LocalTransform, NodeContent, ObjectDesc, ObjectHandle, SceneNode, SceneNodeId,
};

/// CPU-side scene graph that organizes city objects into layers.
pub struct SceneGraph {
    nodes: HashMap<SceneNodeId, SceneNode>,
    root: SceneNodeId,
    layer_groups: HashMap<Layer, SceneNodeId>,
    next_id: u64,
    redraw_requested: bool,
}

impl SceneGraph {
    /// Create a new scene graph with a root and one group per layer.
    pub fn new() -> Self {
        let root_id = SceneNodeId(0);
        let root_node = SceneNode::new(root_id, "root", Layer::Ground, NodeContent::Group);

        let mut nodes = HashMap::new();
        nodes.insert(root_id, root_node);

        let mut graph = Self {
            nodes,
            root: root_id,
            layer_groups: HashMap::new(),
            next_id: 1,
            redraw_requested: false,
        };

        for layer in Layer::ALL {
            let group = graph.add_child(root_id, layer.name(), layer, NodeContent::Group);
            graph.layer_groups.insert(layer, group);
        }

        graph
    }

    /// Get the root node ID.
    pub fn root(&self) -> SceneNodeId {
        self.root
    }

    /// Group node that parents every object of `layer`.
    pub fn layer_group(&self, layer: Layer) -> SceneNodeId {
        self.layer_groups.get(&layer).copied().unwrap_or(self.root)
    }

    /// Allocate a fresh node ID. IDs are never reused.
    fn alloc_id(&mut self) -> SceneNodeId {
        let id = SceneNodeId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Add a child node under `parent`. Returns the new node's ID.
    pub fn add_child(
        &mut self,
        parent: SceneNodeId,
        name: impl Into<String>,
        layer: Layer,
        content: NodeContent,
    ) -> SceneNodeId {
        let id = self.alloc_id();
        let mut node = SceneNode::new(id, name, layer, content);
        node.parent = Some(parent);

        self.nodes.insert(id, node);

        if let Some(parent_node) = self.nodes.get_mut(&parent) {
            parent_node.children.push(id);
        }

        id
    }

    /// Remove a node and its entire subtree. Cannot remove the root.
    pub fn remove(&mut self, id: SceneNodeId) {
        if id == self.root {
            return;
        }

        // Collect subtree IDs (BFS)
        let mut to_remove = vec![id];
        let mut i = 0;
        while i < to_remove.len() {
            if let Some(node) = self.nodes.get(&to_remove[i]) {
                to_remove.extend_from_slice(&node.children);
            }
            i += 1;
        }

        // Detach from parent
        if let Some(parent_id) = self.nodes.get(&id).and_then(|n| n.parent) {
            if let Some(parent) = self.nodes.get_mut(&parent_id) {
                parent.children.retain(|c| *c != id);
            }
        }

        for nid in to_remove {
            self.nodes.remove(&nid);
        }
    }

    /// Set the local transform of a node.
    pub fn set_local_transform(&mut self, id: SceneNodeId, transform: LocalTransform) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.local_transform = transform;
        }
    }

    /// Set the visibility of a node.
    pub fn set_visible(&mut self, id: SceneNodeId, visible: bool) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.visible = visible;
        }
    }

    /// Get an immutable reference to a node.
    pub fn get(&self, id: SceneNodeId) -> Option<&SceneNode> {
        self.nodes.get(&id)
    }

    /// Iterate over the children of a node.
    pub fn children(&self, id: SceneNodeId) -> impl Iterator<Item = SceneNodeId> + '_ {
        self.nodes
            .get(&id)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
            .iter()
            .copied()
    }

    /// Total number of nodes in the graph, groups included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of live objects in `layer`.
    pub fn object_count(&self, layer: Layer) -> usize {
        self.children(self.layer_group(layer)).count()
    }

    /// Returns and clears the pending redraw flag.
    pub fn take_redraw_request(&mut self) -> bool {
        std::mem::take(&mut self.redraw_requested)
    }

    /// Walk the tree, propagate transforms, and collect all visible meshes.
    pub fn flatten(&mut self) -> Vec<FlatInstance> {
        self.propagate_transforms(self.root, Mat4::IDENTITY);

        let mut out = Vec::with_capacity(self.nodes.len());
        self.collect_visible(self.root, Quat::IDENTITY, &mut out);
        out
    }

    /// Recursively propagate world transforms.
    fn propagate_transforms(&mut self, node_id: SceneNodeId, parent_world: Mat4) {
        let (local_mat, children) = match self.nodes.get(&node_id) {
            Some(node) => (node.local_transform.to_mat4(), node.children.clone()),
            None => return,
        };

        let world = parent_world * local_mat;

        if let Some(node) = self.nodes.get_mut(&node_id) {
            node.world_transform = world;
        }

        for child_id in children {
            self.propagate_transforms(child_id, world);
        }
    }

    /// Recursively collect visible meshes.
    fn collect_visible(&self, node_id: SceneNodeId, parent_rotation: Quat, out: &mut Vec<FlatInstance>) {
        let Some(node) = self.nodes.get(&node_id) else {
            return;
        };

        if !node.visible {
            return;
        }

        let rotation = parent_rotation * node.local_transform.rotation;

        if let NodeContent::Mesh { geometry, material } = &node.content {
            out.push(FlatInstance {
                model: node.world_transform * geometry.unit_cube_matrix(),
                rotation,
                color: material.color.to_linear(),
                layer: node.layer,
            });
        }

        for &child_id in &node.children {
            self.collect_visible(child_id, rotation, out);
        }
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderBackend for SceneGraph {
    fn create_object(&mut self, desc: ObjectDesc) -> ObjectHandle {
        let parent = self.layer_group(desc.layer);
        let id = self.add_child(
            parent,
            desc.name,
            desc.layer,
            NodeContent::Mesh {
                geometry: desc.geometry,
                material: desc.material,
            },
        );
        self.set_local_transform(id, desc.transform);
        id
    }

    fn set_transform(&mut self, handle: ObjectHandle, transform: LocalTransform) {
        self.set_local_transform(handle, transform);
    }

    fn remove_object(&mut self, handle: ObjectHandle) {
        // Layer groups and the root are not objects
        if handle == self.root || self.layer_groups.values().any(|g| *g == handle) {
            return;
        }
        self.remove(handle);
    }

    fn contains(&self, handle: ObjectHandle) -> bool {
        self.nodes.contains_key(&handle)
    }

    fn request_redraw(&mut self) {
        self.redraw_requested = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::city::config::Color;
    use crate::scene::node::{Geometry, Material, Pivot};
    use glam::Vec3;

    fn box_desc(layer: Layer, position: Vec3) -> ObjectDesc {
        ObjectDesc {
            name: "box".into(),
            layer,
            geometry: Geometry::Box { size: Vec3::splat(2.0), pivot: Pivot::Center },
            material: Material { color: Color(0x242424) },
            transform: LocalTransform::from_position(position),
        }
    }

    #[test]
    fn test_new_scene_graph_has_layer_groups() {
        let graph = SceneGraph::new();
        assert_eq!(graph.node_count(), 1 + Layer::ALL.len());
        for layer in Layer::ALL {
            assert_eq!(graph.object_count(layer), 0);
            assert_eq!(graph.get(graph.layer_group(layer)).unwrap().name, layer.name());
        }
    }

    #[test]
    fn test_create_and_remove_object() {
        let mut graph = SceneGraph::new();
        let h = graph.create_object(box_desc(Layer::Debris, Vec3::ZERO));

        assert!(graph.contains(h));
        assert_eq!(graph.object_count(Layer::Debris), 1);
        assert_eq!(graph.get(h).unwrap().parent, Some(graph.layer_group(Layer::Debris)));

        graph.remove_object(h);
        assert!(!graph.contains(h));
        assert_eq!(graph.object_count(Layer::Debris), 0);
    }

    #[test]
    fn test_handles_are_not_reused() {
        let mut graph = SceneGraph::new();
        let a = graph.create_object(box_desc(Layer::Debris, Vec3::ZERO));
        graph.remove_object(a);
        let b = graph.create_object(box_desc(Layer::Debris, Vec3::ZERO));
        assert_ne!(a, b);
    }

    #[test]
    fn test_cannot_remove_root_or_groups() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        graph.remove_object(root);
        graph.remove_object(graph.layer_group(Layer::Buildings));
        graph.remove(root);
        assert_eq!(graph.node_count(), 1 + Layer::ALL.len());
    }

    #[test]
    fn test_remove_subtree() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let parent = graph.add_child(root, "parent", Layer::Debris, NodeContent::Group);
        let child = graph.add_child(parent, "child", Layer::Debris, NodeContent::Group);

        graph.remove(parent);
        assert!(graph.get(parent).is_none());
        assert!(graph.get(child).is_none());
        assert_eq!(graph.node_count(), 1 + Layer::ALL.len());
    }

    #[test]
    fn test_set_transform_moves_flattened_instance() {
        let mut graph = SceneGraph::new();
        let h = graph.create_object(box_desc(Layer::Debris, Vec3::ZERO));
        graph.set_transform(h, LocalTransform::from_position(Vec3::new(0.0, 12.0, -64.0)));

        let flat = graph.flatten();
        assert_eq!(flat.len(), 1);
        let center = flat[0].model.transform_point3(Vec3::ZERO);
        assert!((center - Vec3::new(0.0, 12.0, -64.0)).length() < 1e-5);
    }

    #[test]
    fn test_flatten_skips_hidden_and_groups() {
        let mut graph = SceneGraph::new();
        assert!(graph.flatten().is_empty());

        graph.create_object(box_desc(Layer::Buildings, Vec3::ZERO));
        let hidden = graph.create_object(box_desc(Layer::Debris, Vec3::ZERO));
        graph.set_visible(hidden, false);

        let flat = graph.flatten();
        assert_eq!(flat.len(), 1);
        assert_eq!(flat[0].layer, Layer::Buildings);
    }

    #[test]
    fn test_flatten_hidden_layer_excluded() {
        let mut graph = SceneGraph::new();
        graph.create_object(box_desc(Layer::Debris, Vec3::ZERO));
        graph.set_visible(graph.layer_group(Layer::Debris), false);
        assert!(graph.flatten().is_empty());
    }

    #[test]
    fn test_transform_propagation() {
        let mut graph = SceneGraph::new();
        let group = graph.layer_group(Layer::Buildings);
        graph.set_local_transform(group, LocalTransform::from_position(Vec3::new(10.0, 0.0, 0.0)));
        graph.create_object(box_desc(Layer::Buildings, Vec3::new(5.0, 0.0, 0.0)));

        let flat = graph.flatten();
        let center = flat[0].model.transform_point3(Vec3::ZERO);
        assert!((center - Vec3::new(15.0, 0.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn test_redraw_flag_is_consumed() {
        let mut graph = SceneGraph::new();
        assert!(!graph.take_redraw_request());
        graph.request_redraw();
        assert!(graph.take_redraw_request());
        assert!(!graph.take_redraw_request());
    }
}
