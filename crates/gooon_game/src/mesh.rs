//! CPU-side quad mesh for the current scene graph.
//!
//! Every visible node becomes one quad: the node's unit square pushed through
//! its world transform, textured with the glyph's atlas UVs. The whole scene
//! shares one texture, so a frame is a single indexed draw.

use glam::Vec2;
use gooon_render::SpriteVertex;

use crate::atlas::GlyphAtlas;
use crate::scene::SceneGraph;

/// Seven nodes at most; buffers are sized once for this.
pub const MAX_QUADS: usize = 8;

const UNIT_CORNERS: [Vec2; 4] = [
    Vec2::new(0.0, 0.0),
    Vec2::new(1.0, 0.0),
    Vec2::new(1.0, 1.0),
    Vec2::new(0.0, 1.0),
];

#[derive(Debug, Default)]
pub struct SpriteMesh {
    pub vertices: Vec<SpriteVertex>,
    pub indices: Vec<u32>,
}

impl SpriteMesh {
    pub fn quad_count(&self) -> usize {
        self.vertices.len() / 4
    }
}

pub fn build_sprite_mesh(scene: &SceneGraph, atlas: &GlyphAtlas) -> SpriteMesh {
    let mut mesh = SpriteMesh::default();
    for (world, glyph) in scene.visible_sprites() {
        let Some(entry) = atlas.resolve(glyph) else {
            log::warn!("glyph '{}' has no atlas entry; skipping", glyph);
            continue;
        };
        if mesh.quad_count() == MAX_QUADS {
            log::warn!("sprite mesh full; dropping '{}'", glyph);
            break;
        }
        let [u0, v0, u1, v1] = entry.uv;
        let base = mesh.vertices.len() as u32;
        for corner in UNIT_CORNERS {
            let p = world.transform_point2(corner);
            mesh.vertices.push(SpriteVertex {
                position: [p.x, p.y],
                tex_coords: [u0 + (u1 - u0) * corner.x, v0 + (v1 - v0) * corner.y],
            });
        }
        mesh.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    mesh
}
