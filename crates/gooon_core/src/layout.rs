//! Design-space to device-space mapping.
//!
//! All nodes are authored on a fixed 1000x200 canvas. The canvas is scaled so
//! the design width (1100, leaving a margin) spans the viewport, and centred.
//! Portrait viewports are presented sideways: the root transform rotates by
//! -90 degrees so the game always reads in landscape.

use glam::{Affine2, Vec2};

pub const DESIGN_WIDTH: f32 = 1100.0;
pub const CANVAS_SIZE: Vec2 = Vec2::new(1000.0, 200.0);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    pub viewport: (u32, u32),
    pub portrait: bool,
    /// Landscape-oriented extent after the portrait swap.
    pub extent: Vec2,
    pub scale: f32,
    /// Device position of the canvas' top-left corner, before rotation.
    pub origin: Vec2,
    pub root: Affine2,
}

impl Layout {
    pub fn compute(viewport_width: u32, viewport_height: u32) -> Self {
        let (mut w, mut h) = (viewport_width as f32, viewport_height as f32);
        let portrait = h > w;

        let root = if portrait {
            std::mem::swap(&mut w, &mut h);
            Affine2::from_angle_translation(-std::f32::consts::FRAC_PI_2, Vec2::new(0.0, w))
        } else {
            Affine2::IDENTITY
        };

        let scale = w / DESIGN_WIDTH;
        let origin = Vec2::new(w, h) * 0.5 - CANVAS_SIZE * 0.5 * scale;
        log::debug!(
            "layout {}x{} portrait={} scale={:.3} origin=({:.1}, {:.1})",
            viewport_width,
            viewport_height,
            portrait,
            scale,
            origin.x,
            origin.y
        );

        Self {
            viewport: (viewport_width, viewport_height),
            portrait,
            extent: Vec2::new(w, h),
            scale,
            origin,
            root,
        }
    }

    pub fn matches(&self, viewport_width: u32, viewport_height: u32) -> bool {
        self.viewport == (viewport_width, viewport_height)
    }

    pub fn canvas_transform(&self) -> Affine2 {
        Affine2::from_scale_angle_translation(Vec2::splat(self.scale), 0.0, self.origin)
    }

    /// Maps design-space units to device pixels.
    pub fn design_to_device(&self) -> Affine2 {
        self.root * self.canvas_transform()
    }
}
