use std::fs;
use std::path::Path;

use kira::{
    manager::{backend::DefaultBackend, AudioManager, AudioManagerSettings},
    sound::static_sound::{StaticSoundData, StaticSoundHandle, StaticSoundSettings},
    tween::Tween,
    Volume,
};

use crate::error::StartupError;

/// Something that can play the expiry sound from its beginning.
pub trait CuePlayer {
    fn play_from_start(&mut self);
}

/// The "gooon" cue, held open while the app is visible.
pub struct ExpiryCue {
    manager: AudioManager<DefaultBackend>,
    sound: StaticSoundData,
    playing: Option<StaticSoundHandle>,
}

impl ExpiryCue {
    pub fn open(path: &Path) -> Result<Self, StartupError> {
        fs::metadata(path).map_err(|source| StartupError::AssetMissing {
            path: path.to_path_buf(),
            source,
        })?;
        let audio_err = |reason: String| StartupError::Audio {
            path: path.to_path_buf(),
            reason,
        };

        let manager = AudioManager::<DefaultBackend>::new(AudioManagerSettings::default())
            .map_err(|e| audio_err(e.to_string()))?;
        let sound_data = StaticSoundData::from_file(path).map_err(|e| audio_err(e.to_string()))?;

        let mut settings = StaticSoundSettings::default();
        settings.volume = Volume::Amplitude(1.0).into();
        log::info!("Opened audio cue '{}'", path.display());

        Ok(Self {
            manager,
            sound: sound_data.with_settings(settings),
            playing: None,
        })
    }
}

impl CuePlayer for ExpiryCue {
    fn play_from_start(&mut self) {
        // Restart rather than overlap if the previous run's cue is still going.
        if let Some(mut handle) = self.playing.take() {
            handle.stop(Tween::default());
        }
        match self.manager.play(self.sound.clone()) {
            Ok(handle) => self.playing = Some(handle),
            Err(e) => log::warn!("Failed to play expiry cue: {:?}", e),
        }
    }
}

impl Drop for ExpiryCue {
    fn drop(&mut self) {
        log::info!("Closing audio cue");
    }
}
