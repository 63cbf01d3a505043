//! Glyph lookup into the shared sprite sheet.
//!
//! The sheet is a grid of 200x200 cells holding the colon and the ten digits,
//! followed by two 600x200 bands for the "GO" and "gooon" prompts. The
//! partition is fixed; loading only checks that the decoded image is large
//! enough and precomputes normalized UVs for the renderer.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::StartupError;

const CELL: u32 = 200;
const BAND_WIDTH: u32 = 3 * CELL;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Glyph {
    Digit(u8),
    Colon,
    Go,
    Gooon,
}

impl Glyph {
    pub const ALL: [Glyph; 13] = [
        Glyph::Colon,
        Glyph::Digit(0),
        Glyph::Digit(1),
        Glyph::Digit(2),
        Glyph::Digit(3),
        Glyph::Digit(4),
        Glyph::Digit(5),
        Glyph::Digit(6),
        Glyph::Digit(7),
        Glyph::Digit(8),
        Glyph::Digit(9),
        Glyph::Go,
        Glyph::Gooon,
    ];

    /// Glyph for one character of a formatted `MM:SS` string.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            ':' => Some(Self::Colon),
            '0'..='9' => c.to_digit(10).map(|d| Self::Digit(d as u8)),
            _ => None,
        }
    }

    pub fn key(self) -> &'static str {
        const DIGITS: [&str; 10] = ["0", "1", "2", "3", "4", "5", "6", "7", "8", "9"];
        match self {
            Self::Digit(d) => DIGITS.get(d as usize).copied().unwrap_or("?"),
            Self::Colon => ":",
            Self::Go => "GO",
            Self::Gooon => "gooon",
        }
    }

    /// Fixed position on the sprite sheet; `None` for digits outside 0-9.
    fn sheet_rect(self) -> Option<GlyphRect> {
        let cell = |col: u32, row: u32| GlyphRect::new(col * CELL, row * CELL, CELL, CELL);
        match self {
            Self::Colon => Some(cell(0, 0)),
            // Digits fill the grid row-major right after the colon.
            Self::Digit(d) if d <= 9 => {
                let slot = d as u32 + 1;
                Some(cell(slot % 3, slot / 3))
            }
            Self::Digit(_) => None,
            Self::Go => Some(GlyphRect::new(0, 4 * CELL, BAND_WIDTH, CELL)),
            Self::Gooon => Some(GlyphRect::new(0, 5 * CELL, BAND_WIDTH, CELL)),
        }
    }
}

impl std::fmt::Display for Glyph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Pixel rectangle, half-open: `[x, x + w) x [y, y + h)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlyphRect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl GlyphRect {
    pub const fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> u32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> u32 {
        self.y + self.h
    }

    #[allow(dead_code)]
    pub fn intersects(&self, other: &GlyphRect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    pub fn fits_in(&self, width: u32, height: u32) -> bool {
        self.right() <= width && self.bottom() <= height
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GlyphEntry {
    #[allow(dead_code)]
    pub rect: GlyphRect,
    /// `[u0, v0, u1, v1]`, top-left origin.
    pub uv: [f32; 4],
}

#[derive(Debug, Clone)]
pub struct GlyphAtlas {
    size_px: (u32, u32),
    entries: HashMap<Glyph, GlyphEntry>,
}

impl GlyphAtlas {
    /// Builds the glyph table for a sheet of the given pixel size.
    pub fn new(width: u32, height: u32) -> Result<Self, StartupError> {
        let mut entries = HashMap::new();
        for glyph in Glyph::ALL {
            let Some(rect) = glyph.sheet_rect() else {
                continue;
            };
            if !rect.fits_in(width, height) {
                return Err(StartupError::AtlasOutOfBounds {
                    glyph,
                    width,
                    height,
                });
            }
            let (fw, fh) = (width as f32, height as f32);
            let uv = [
                rect.x as f32 / fw,
                rect.y as f32 / fh,
                rect.right() as f32 / fw,
                rect.bottom() as f32 / fh,
            ];
            entries.insert(glyph, GlyphEntry { rect, uv });
        }
        Ok(Self {
            size_px: (width, height),
            entries,
        })
    }

    pub fn resolve(&self, glyph: Glyph) -> Option<&GlyphEntry> {
        self.entries.get(&glyph)
    }

    #[allow(dead_code)]
    pub fn size_px(&self) -> (u32, u32) {
        self.size_px
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Decoded sprite sheet plus the glyph table that indexes it.
pub struct SpriteSheet {
    pub atlas: GlyphAtlas,
    pub image: image::RgbaImage,
}

pub fn load_sprite_sheet(path: &Path) -> Result<SpriteSheet, StartupError> {
    let bytes = fs::read(path).map_err(|source| StartupError::AssetMissing {
        path: path.to_path_buf(),
        source,
    })?;
    decode_sprite_sheet(path, &bytes)
}

pub fn decode_sprite_sheet(path: &Path, bytes: &[u8]) -> Result<SpriteSheet, StartupError> {
    let image = image::load_from_memory_with_format(bytes, image::ImageFormat::Png)
        .map_err(|source| StartupError::ImageDecode {
            path: path.to_path_buf(),
            source,
        })?
        .to_rgba8();
    let atlas = GlyphAtlas::new(image.width(), image.height())?;
    log::info!(
        "Loaded sprite sheet '{}' ({}x{}, {} glyphs)",
        path.display(),
        image.width(),
        image.height(),
        atlas.len()
    );
    Ok(SpriteSheet { atlas, image })
}
