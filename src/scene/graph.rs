use nalgebra_glm as glm;

use super::mesh::Mesh;

/// Index of a node inside one [`SceneGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Offset produced when one graph is grafted into another. Ids from the
/// grafted graph are shifted by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeOffset(usize);

impl NodeOffset {
    pub fn apply(self, id: NodeId) -> NodeId {
        NodeId(id.0 + self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    pub translation: glm::Vec3,
    pub rotation: glm::Quat,
    pub scale: glm::Vec3,
}

impl Transform {
    pub fn matrix(&self) -> glm::Mat4 {
        glm::translation(&self.translation)
            * glm::quat_to_mat4(&self.rotation)
            * glm::scaling(&self.scale)
    }

    pub fn set_uniform_scale(&mut self, factor: f32) {
        self.scale = glm::vec3(factor, factor, factor);
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: glm::vec3(0.0, 0.0, 0.0),
            rotation: glm::quat_identity(),
            scale: glm::vec3(1.0, 1.0, 1.0),
        }
    }
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    Group,
    Mesh(Mesh),
}

#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    pub transform: Transform,
    pub visible: bool,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
    pub kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    pub fn group(name: impl Into<String>) -> Self {
        Self::with_kind(name, NodeKind::Group)
    }

    pub fn mesh(name: impl Into<String>, mesh: Mesh) -> Self {
        Self::with_kind(name, NodeKind::Mesh(mesh))
    }

    fn with_kind(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            transform: Transform::default(),
            visible: true,
            cast_shadow: false,
            receive_shadow: false,
            kind,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn is_mesh(&self) -> bool {
        matches!(self.kind, NodeKind::Mesh(_))
    }

    pub fn as_mesh(&self) -> Option<&Mesh> {
        match &self.kind {
            NodeKind::Mesh(mesh) => Some(mesh),
            NodeKind::Group => None,
        }
    }

    pub fn as_mesh_mut(&mut self) -> Option<&mut Mesh> {
        match &mut self.kind {
            NodeKind::Mesh(mesh) => Some(mesh),
            NodeKind::Group => None,
        }
    }
}

/// Arena of nodes. Nodes are never removed, so a `NodeId` stays valid for
/// the life of the graph it came from.
#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    nodes: Vec<Node>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn add(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    /// Adds `node` and attaches it as the last child of `parent`.
    pub fn add_child(&mut self, parent: NodeId, node: Node) -> NodeId {
        let id = self.add(node);
        self.attach(parent, id);
        id
    }

    /// Moves `child` under `parent`, detaching it from any previous parent.
    pub fn attach(&mut self, parent: NodeId, child: NodeId) {
        if let Some(old) = self.nodes[child.0].parent.take() {
            self.nodes[old.0].children.retain(|c| *c != child);
        }
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    pub fn mesh(&self, id: NodeId) -> Option<&Mesh> {
        self.get(id).and_then(Node::as_mesh)
    }

    pub fn mesh_mut(&mut self, id: NodeId) -> Option<&mut Mesh> {
        self.get_mut(id).and_then(Node::as_mesh_mut)
    }

    /// Appends every node of `other` to this graph and hangs `other_root`
    /// under `parent`. Returns the offset to translate ids from `other`.
    pub fn graft(&mut self, parent: NodeId, other: SceneGraph, other_root: NodeId) -> NodeOffset {
        let offset = NodeOffset(self.nodes.len());
        for mut node in other.nodes {
            node.parent = node.parent.map(|p| offset.apply(p));
            for child in &mut node.children {
                *child = offset.apply(*child);
            }
            self.nodes.push(node);
        }
        self.attach(parent, offset.apply(other_root));
        offset
    }

    /// Depth-first pre-order walk starting at `root`: a node, then each of
    /// its children's subtrees in insertion order.
    pub fn traverse(&self, root: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let Some(node) = self.get(id) else { continue };
            order.push(id);
            stack.extend(node.children.iter().rev().copied());
        }
        order
    }

    pub fn world_matrix(&self, id: NodeId) -> glm::Mat4 {
        let mut matrix = glm::Mat4::identity();
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = &self.nodes[node_id.0];
            matrix = node.transform.matrix() * matrix;
            current = node.parent;
        }
        matrix
    }

    /// Visible mesh nodes under `root` with their world matrices. Hidden
    /// nodes hide their whole subtree.
    pub fn visible_meshes(&self, root: NodeId) -> Vec<(NodeId, glm::Mat4)> {
        let mut out = Vec::new();
        let mut stack = vec![(root, glm::Mat4::identity())];
        while let Some((id, parent_world)) = stack.pop() {
            let node = &self.nodes[id.0];
            if !node.visible {
                continue;
            }
            let world = parent_world * node.transform.matrix();
            if node.is_mesh() {
                out.push((id, world));
            }
            for child in node.children.iter().rev() {
                stack.push((*child, world));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> (SceneGraph, NodeId, [NodeId; 4]) {
        // root
        // ├── a
        // │   └── a1
        // └── b
        //     └── b1
        let mut graph = SceneGraph::new();
        let root = graph.add(Node::group("root"));
        let a = graph.add_child(root, Node::group("a"));
        let b = graph.add_child(root, Node::group("b"));
        let a1 = graph.add_child(a, Node::group("a1"));
        let b1 = graph.add_child(b, Node::group("b1"));
        (graph, root, [a, a1, b, b1])
    }

    #[test]
    fn traverse_is_depth_first_preorder() {
        let (graph, root, [a, a1, b, b1]) = tree();
        assert_eq!(graph.traverse(root), vec![root, a, a1, b, b1]);
    }

    #[test]
    fn graft_shifts_ids_and_links_parent() {
        let (mut stage, stage_root, _) = tree();
        let (asset, asset_root, [_, a1, ..]) = tree();

        let offset = stage.graft(stage_root, asset, asset_root);
        let grafted_root = offset.apply(asset_root);
        let grafted_a1 = offset.apply(a1);

        assert_eq!(stage.len(), 10);
        assert_eq!(stage.get(grafted_root).and_then(Node::parent), Some(stage_root));
        assert_eq!(stage.get(grafted_a1).map(|n| n.name.as_str()), Some("a1"));
        assert!(stage.traverse(stage_root).contains(&grafted_a1));
    }

    #[test]
    fn world_matrix_composes_parent_transforms() {
        let (mut graph, root, [a, a1, ..]) = tree();
        graph.get_mut(root).unwrap().transform.translation = glm::vec3(1.0, 0.0, 0.0);
        graph.get_mut(a).unwrap().transform.set_uniform_scale(2.0);
        graph.get_mut(a1).unwrap().transform.translation = glm::vec3(0.0, 1.0, 0.0);

        let world = graph.world_matrix(a1);
        let origin = world * glm::vec4(0.0, 0.0, 0.0, 1.0);
        assert!((origin.x - 1.0).abs() < 1e-6);
        assert!((origin.y - 2.0).abs() < 1e-6);
    }
}
