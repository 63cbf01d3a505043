//! Scripted host sessions for tests: a JSON list of host events with a
//! virtual clock, replayed against a `GameContext`.

use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

use gooon_core::input::{TouchEvent, TouchPhase};
use serde::Deserialize;

use crate::audio::CuePlayer;
use crate::context::GameContext;

#[derive(Debug, Deserialize, Clone)]
pub struct ReplaySession {
    pub events: Vec<ReplayEvent>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ReplayEvent {
    Config {
        width: u32,
        height: u32,
    },
    Touch {
        #[serde(default)]
        slot: u32,
        phase: ReplayPhase,
    },
    /// `repeat` draw ticks spaced `every_ms` apart.
    Draw {
        #[serde(default = "default_repeat")]
        repeat: u32,
        #[serde(default = "default_frame_ms")]
        every_ms: u64,
    },
    Wait {
        ms: u64,
    },
}

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum ReplayPhase {
    Press,
    Move,
    Release,
}

impl From<ReplayPhase> for TouchPhase {
    fn from(phase: ReplayPhase) -> Self {
        match phase {
            ReplayPhase::Press => TouchPhase::Press,
            ReplayPhase::Move => TouchPhase::Move,
            ReplayPhase::Release => TouchPhase::Release,
        }
    }
}

impl ReplaySession {
    /// Plays every event, starting the virtual clock at `origin`. Returns the
    /// virtual time after the last event.
    pub fn run<C: CuePlayer>(&self, ctx: &mut GameContext<C>, origin: Instant) -> Instant {
        let mut now = origin;
        for event in &self.events {
            match *event {
                ReplayEvent::Config { width, height } => ctx.on_config(width, height),
                ReplayEvent::Touch { slot, phase } => {
                    ctx.on_touch(TouchEvent::new(slot, phase.into()), now)
                }
                ReplayEvent::Draw { repeat, every_ms } => {
                    for _ in 0..repeat.max(1) {
                        now += Duration::from_millis(every_ms);
                        ctx.on_draw(now);
                    }
                }
                ReplayEvent::Wait { ms } => now += Duration::from_millis(ms),
            }
        }
        now
    }
}

pub fn load_replay_from_path(path: &Path) -> Result<ReplaySession, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let replay: ReplaySession = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse replay JSON {}: {e}", path.display()))?;
    validate_replay(&replay)?;
    Ok(replay)
}

fn validate_replay(replay: &ReplaySession) -> Result<(), String> {
    if replay.events.is_empty() {
        return Err("Replay validation failed: events list is empty".to_string());
    }
    for event in &replay.events {
        if let ReplayEvent::Draw { every_ms: 0, .. } = event {
            return Err("Replay validation failed: draw spacing must be > 0".to_string());
        }
    }
    Ok(())
}

const fn default_repeat() -> u32 {
    1
}

const fn default_frame_ms() -> u64 {
    17
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atlas::Glyph;
    use crate::context::tests::{new_context, CountingCue};
    use gooon_core::countdown::GameState;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file_path(name_hint: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "gooon_replay_test_{}_{}_{}.json",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    #[test]
    fn replay_file_parses() {
        let path = temp_file_path("parse");
        fs::write(
            &path,
            r#"{
              "events": [
                { "event": "config", "width": 1280, "height": 720 },
                { "event": "draw", "repeat": 3 },
                { "event": "touch", "phase": "release" },
                { "event": "wait", "ms": 1000 }
              ]
            }"#,
        )
        .expect("write replay file");

        let replay = load_replay_from_path(&path).expect("replay should load");
        assert_eq!(replay.events.len(), 4);
        assert!(matches!(
            replay.events[1],
            ReplayEvent::Draw {
                repeat: 3,
                every_ms: 17
            }
        ));
        assert!(matches!(
            replay.events[2],
            ReplayEvent::Touch {
                slot: 0,
                phase: ReplayPhase::Release
            }
        ));

        let _ = fs::remove_file(path);
    }

    #[test]
    fn replay_rejects_empty_session() {
        let path = temp_file_path("empty");
        fs::write(&path, r#"{ "events": [] }"#).expect("write replay file");
        let err = load_replay_from_path(&path).expect_err("empty session should fail");
        assert!(err.contains("events list is empty"));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn replay_rejects_zero_draw_spacing() {
        let path = temp_file_path("zero_spacing");
        fs::write(
            &path,
            r#"{ "events": [ { "event": "draw", "every_ms": 0 } ] }"#,
        )
        .expect("write replay file");
        let err = load_replay_from_path(&path).expect_err("zero spacing should fail");
        assert!(err.contains("draw spacing"));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn scripted_session_runs_full_cycle() {
        let path = temp_file_path("cycle");
        fs::write(
            &path,
            r#"{
              "events": [
                { "event": "config", "width": 1080, "height": 1920 },
                { "event": "draw" },
                { "event": "touch", "slot": 1, "phase": "release" },
                { "event": "touch", "phase": "press" },
                { "event": "touch", "phase": "move" },
                { "event": "draw" },
                { "event": "touch", "phase": "release" },
                { "event": "draw", "repeat": 2 },
                { "event": "wait", "ms": 299000 },
                { "event": "draw", "repeat": 120 },
                { "event": "touch", "phase": "release" },
                { "event": "draw", "repeat": 2 }
              ]
            }"#,
        )
        .expect("write replay file");
        let replay = load_replay_from_path(&path).expect("replay should load");

        let t0 = Instant::now();
        let mut ctx = new_context(t0);
        let cue = CountingCue::default();
        ctx.on_visible(cue.clone());

        replay.run(&mut ctx, t0);

        assert_eq!(cue.plays.get(), 1);
        assert_eq!(ctx.state(), GameState::Start);
        assert!(ctx.layout().expect("layout computed").portrait);
        let go = ctx.scene().glyph(ctx.visibility().start_node());
        assert_eq!(go, Some(Glyph::Go));

        let _ = fs::remove_file(path);
    }

    #[test]
    fn replays_are_deterministic() {
        let session = ReplaySession {
            events: vec![
                ReplayEvent::Config {
                    width: 1280,
                    height: 720,
                },
                ReplayEvent::Touch {
                    slot: 0,
                    phase: ReplayPhase::Release,
                },
                ReplayEvent::Draw {
                    repeat: 200,
                    every_ms: 33,
                },
            ],
        };

        let t0 = Instant::now();
        let mut run_a = new_context(t0);
        let mut run_b = new_context(t0);
        session.run(&mut run_a, t0);
        session.run(&mut run_b, t0);

        let glyphs = |ctx: &GameContext<CountingCue>| -> Vec<Option<Glyph>> {
            ctx.digits()
                .slots()
                .iter()
                .map(|&s| ctx.scene().glyph(s))
                .collect()
        };
        assert_eq!(glyphs(&run_a), glyphs(&run_b));
        assert_eq!(run_a.scene().glyph_writes(), run_b.scene().glyph_writes());
        assert_eq!(run_a.state(), GameState::Running);
    }
}
