//! Scene content: meshes, materials, nodes.
//!
//! Responsibilities:
//! - own vertex/index buffers, material bind groups, per-node model bind groups
//! - provide deterministic draw traversal via [`Scene::draws`], a lazy and
//!   restartable iterator of (model binding, material binding, primitive)
//!   triples consumed by the geometry pass
//!
//! Missing material or primitive indices on a node are a caller bug and
//! panic; the renderer does not handle them defensively.

mod layouts;
mod material;
mod mesh;
mod node;
mod vertex;

pub use layouts::SharedLayouts;
pub use material::Material;
pub use mesh::{Primitive, cube, plane};
pub use node::{ModelUniforms, Node, NodeDraw};
pub use vertex::Vertex;

/// One draw issued by the geometry pass.
pub struct DrawCall<'a> {
    pub model_bind_group: &'a wgpu::BindGroup,
    pub material_bind_group: &'a wgpu::BindGroup,
    pub primitive: &'a Primitive,
}

/// Scene content, indexed: nodes reference materials and primitives by slot.
#[derive(Default)]
pub struct Scene {
    pub materials: Vec<Material>,
    pub primitives: Vec<Primitive>,
    pub nodes: Vec<Node>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_material(&mut self, material: Material) -> usize {
        self.materials.push(material);
        self.materials.len() - 1
    }

    pub fn add_primitive(&mut self, primitive: Primitive) -> usize {
        self.primitives.push(primitive);
        self.primitives.len() - 1
    }

    pub fn add_node(&mut self, node: Node) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    /// Lazy draw traversal in deterministic order: nodes in insertion order,
    /// then each node's draws in insertion order. Restartable every frame.
    ///
    /// Primitives with zero indices are skipped (no draw call is issued).
    pub fn draws(&self) -> impl Iterator<Item = DrawCall<'_>> {
        self.nodes.iter().flat_map(move |node| {
            node.draws.iter().filter_map(move |d| {
                let primitive = &self.primitives[d.primitive];
                if primitive.index_count == 0 {
                    return None;
                }
                Some(DrawCall {
                    model_bind_group: node.bind_group(),
                    material_bind_group: self.materials[d.material].bind_group(),
                    primitive,
                })
            })
        })
    }
}
