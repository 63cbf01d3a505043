use std::path::PathBuf;

use thiserror::Error;

use crate::atlas::Glyph;

/// Failures that leave the game unable to start. Never retried; `main` logs
/// them and exits.
#[derive(Error, Debug)]
pub enum StartupError {
    #[error("asset '{}' could not be read: {source}", .path.display())]
    AssetMissing {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("sprite sheet '{}' could not be decoded: {source}", .path.display())]
    ImageDecode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("sprite sheet is {width}x{height}, too small for glyph '{glyph}'")]
    AtlasOutOfBounds {
        glyph: Glyph,
        width: u32,
        height: u32,
    },
    #[error("audio cue '{}' could not be opened: {reason}", .path.display())]
    Audio { path: PathBuf, reason: String },
}
