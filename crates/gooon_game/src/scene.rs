//! Scene graph of textured quads plus the two controllers that write to it.
//!
//! Every node is a unit quad placed on the design canvas by its local
//! transform. The graph's root transform (from `Layout::design_to_device`)
//! maps the whole canvas to device pixels, so a viewport change only touches
//! the root.
//!
//! Writers go through `RenderGraph::set_glyph`; both controllers remember
//! what they last wrote so an unchanged frame issues no writes at all.

use glam::{Affine2, Vec2};
use gooon_core::countdown::GameState;

use crate::atlas::Glyph;

pub const DIGIT_SLOTS: usize = 5;
const CELL: f32 = 200.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

pub trait RenderGraph {
    /// Assigns a glyph to a node; `None` blanks it.
    fn set_glyph(&mut self, node: NodeId, glyph: Option<Glyph>);
}

#[derive(Debug, Clone, Copy)]
pub struct SpriteNode {
    /// Unit quad to design-space rectangle.
    pub local: Affine2,
    pub glyph: Option<Glyph>,
}

#[derive(Debug, Clone)]
pub struct SceneGraph {
    nodes: Vec<SpriteNode>,
    root: Affine2,
    glyph_writes: u64,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            root: Affine2::IDENTITY,
            glyph_writes: 0,
        }
    }

    /// Adds a blank node covering `size` design units at `top_left`.
    pub fn add_node(&mut self, top_left: Vec2, size: Vec2) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(SpriteNode {
            local: Affine2::from_scale_angle_translation(size, 0.0, top_left),
            glyph: None,
        });
        id
    }

    pub fn set_root(&mut self, root: Affine2) {
        self.root = root;
    }

    #[allow(dead_code)]
    pub fn root(&self) -> Affine2 {
        self.root
    }

    #[allow(dead_code)]
    pub fn glyph(&self, node: NodeId) -> Option<Glyph> {
        self.nodes.get(node.0).and_then(|n| n.glyph)
    }

    #[allow(dead_code)]
    pub fn world_transform(&self, node: NodeId) -> Option<Affine2> {
        self.nodes.get(node.0).map(|n| self.root * n.local)
    }

    /// World transform and glyph of every non-blank node, in insertion order.
    pub fn visible_sprites(&self) -> impl Iterator<Item = (Affine2, Glyph)> + '_ {
        self.nodes
            .iter()
            .filter_map(move |n| n.glyph.map(|g| (self.root * n.local, g)))
    }

    #[allow(dead_code)]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Total `set_glyph` calls since creation.
    #[allow(dead_code)]
    pub fn glyph_writes(&self) -> u64 {
        self.glyph_writes
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderGraph for SceneGraph {
    fn set_glyph(&mut self, node: NodeId, glyph: Option<Glyph>) {
        if let Some(n) = self.nodes.get_mut(node.0) {
            n.glyph = glyph;
            self.glyph_writes += 1;
        } else {
            log::warn!("set_glyph on unknown node {:?}", node);
        }
    }
}

/// The five `MM:SS` character slots.
#[derive(Debug, Clone)]
pub struct DigitDisplay {
    slots: [NodeId; DIGIT_SLOTS],
}

impl DigitDisplay {
    pub fn new(graph: &mut SceneGraph) -> Self {
        let slots = std::array::from_fn(|i| {
            graph.add_node(Vec2::new(i as f32 * CELL, 0.0), Vec2::splat(CELL))
        });
        Self { slots }
    }

    #[allow(dead_code)]
    pub fn slots(&self) -> &[NodeId; DIGIT_SLOTS] {
        &self.slots
    }

    pub fn show<G: RenderGraph>(&self, text: &str, graph: &mut G) {
        let mut chars = text.chars();
        for &slot in &self.slots {
            let glyph = chars.next().and_then(Glyph::from_char);
            graph.set_glyph(slot, glyph);
        }
    }

    pub fn clear<G: RenderGraph>(&self, graph: &mut G) {
        for &slot in &self.slots {
            graph.set_glyph(slot, None);
        }
    }
}

/// Shows the "GO" and "gooon" prompts according to the game state.
#[derive(Debug, Clone)]
pub struct VisibilityController {
    start_node: NodeId,
    end_node: NodeId,
    start_visible: bool,
    end_visible: bool,
}

impl VisibilityController {
    pub fn new(graph: &mut SceneGraph) -> Self {
        let top_left = Vec2::new(CELL, 0.0);
        let size = Vec2::new(3.0 * CELL, CELL);
        Self {
            start_node: graph.add_node(top_left, size),
            end_node: graph.add_node(top_left, size),
            start_visible: false,
            end_visible: false,
        }
    }

    #[allow(dead_code)]
    pub fn start_node(&self) -> NodeId {
        self.start_node
    }

    #[allow(dead_code)]
    pub fn end_node(&self) -> NodeId {
        self.end_node
    }

    pub fn arrange<G: RenderGraph>(&mut self, state: GameState, graph: &mut G) {
        match state {
            GameState::Start => {
                if !self.start_visible {
                    self.start_visible = true;
                    graph.set_glyph(self.start_node, Some(Glyph::Go));
                }
                if self.end_visible {
                    self.end_visible = false;
                    graph.set_glyph(self.end_node, None);
                }
            }
            GameState::Running => {
                if self.start_visible {
                    self.start_visible = false;
                    graph.set_glyph(self.start_node, None);
                }
            }
            GameState::End => {
                if !self.end_visible {
                    self.end_visible = true;
                    graph.set_glyph(self.end_node, Some(Glyph::Gooon));
                }
            }
        }
    }
}
