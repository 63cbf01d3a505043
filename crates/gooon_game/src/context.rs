//! All mutable game state, with one handler per host event.
//!
//! The host (winit in `main.rs`, a replay script in tests) calls:
//!
//!   - `on_visible` / `on_invisible` -- acquire / release the audio cue
//!   - `on_config` -- viewport size, before the first draw and on resize
//!   - `on_touch` -- normalised touch events from `TouchTracker`
//!   - `on_draw` -- once per display refresh; returns whether to render
//!
//! Within a rendered frame the countdown ticks first, then the prompt
//! visibility is arranged from the resulting state, so an expiry blanks the
//! digits and shows "gooon" in the same frame.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use gooon_core::countdown::{Countdown, GameState, Tick, DEFAULT_COUNTDOWN};
use gooon_core::input::TouchEvent;
use gooon_core::layout::Layout;
use gooon_core::time::FrameClock;

use crate::atlas::GlyphAtlas;
use crate::audio::CuePlayer;
use crate::scene::{DigitDisplay, SceneGraph, VisibilityController};

#[derive(Debug, Clone)]
pub struct GameConfig {
    pub countdown: Duration,
    pub sprite_sheet_path: PathBuf,
    pub expiry_cue_path: PathBuf,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            countdown: DEFAULT_COUNTDOWN,
            sprite_sheet_path: PathBuf::from("assets/tx_letters.png"),
            expiry_cue_path: PathBuf::from("assets/gooon.wav"),
        }
    }
}

pub struct GameContext<C> {
    countdown: Countdown,
    frame_clock: FrameClock,
    viewport: Option<(u32, u32)>,
    layout: Option<Layout>,
    scene: SceneGraph,
    digits: DigitDisplay,
    visibility: VisibilityController,
    atlas: GlyphAtlas,
    cue: Option<C>,
}

impl<C: CuePlayer> GameContext<C> {
    pub fn new(config: &GameConfig, atlas: GlyphAtlas, origin: Instant) -> Self {
        let mut scene = SceneGraph::new();
        // Draw order: digits, then the two prompts.
        let digits = DigitDisplay::new(&mut scene);
        let visibility = VisibilityController::new(&mut scene);
        Self {
            countdown: Countdown::new(config.countdown),
            frame_clock: FrameClock::new(origin),
            viewport: None,
            layout: None,
            scene,
            digits,
            visibility,
            atlas,
            cue: None,
        }
    }

    pub fn on_visible(&mut self, cue: C) {
        self.cue = Some(cue);
    }

    /// Releases the audio cue, handing it back to the caller to drop.
    pub fn on_invisible(&mut self) -> Option<C> {
        self.cue.take()
    }

    pub fn on_config(&mut self, width: u32, height: u32) {
        if self.viewport != Some((width, height)) {
            log::debug!("viewport {}x{}", width, height);
        }
        self.viewport = Some((width, height));
    }

    pub fn on_touch(&mut self, touch: TouchEvent, now: Instant) {
        if self.countdown.handle_touch(touch, now) {
            log::debug!("state -> {}", self.countdown.state());
        }
    }

    pub fn on_draw(&mut self, now: Instant) -> bool {
        if !self.frame_clock.begin_frame(now) {
            return false;
        }
        let Some((width, height)) = self.viewport.filter(|&(w, h)| w > 0 && h > 0) else {
            return false;
        };
        if !self.layout.is_some_and(|l| l.matches(width, height)) {
            let layout = Layout::compute(width, height);
            self.scene.set_root(layout.design_to_device());
            self.layout = Some(layout);
        }

        match self.countdown.tick(now) {
            Tick::Show(text) => self.digits.show(&text, &mut self.scene),
            Tick::Expired => {
                self.digits.clear(&mut self.scene);
                self.fire_cue();
            }
            Tick::Idle | Tick::Unchanged => {}
        }
        self.visibility
            .arrange(self.countdown.state(), &mut self.scene);
        true
    }

    fn fire_cue(&mut self) {
        match self.cue.as_mut() {
            Some(cue) => cue.play_from_start(),
            None => log::warn!("Countdown expired while the audio cue is closed"),
        }
    }

    #[allow(dead_code)]
    pub fn state(&self) -> GameState {
        self.countdown.state()
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn atlas(&self) -> &GlyphAtlas {
        &self.atlas
    }

    #[allow(dead_code)]
    pub fn layout(&self) -> Option<&Layout> {
        self.layout.as_ref()
    }

    #[allow(dead_code)]
    pub fn digits(&self) -> &DigitDisplay {
        &self.digits
    }

    #[allow(dead_code)]
    pub fn visibility(&self) -> &VisibilityController {
        &self.visibility
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::atlas::Glyph;
    use gooon_core::input::{TouchPhase, PRIMARY_SLOT};
    use std::cell::Cell;
    use std::rc::Rc;

    /// Counts plays; clones share the counter.
    #[derive(Clone, Default)]
    pub(crate) struct CountingCue {
        pub plays: Rc<Cell<u32>>,
    }

    impl CuePlayer for CountingCue {
        fn play_from_start(&mut self) {
            self.plays.set(self.plays.get() + 1);
        }
    }

    pub(crate) fn new_context(origin: Instant) -> GameContext<CountingCue> {
        let atlas = GlyphAtlas::new(600, 1200).expect("full-size sheet");
        GameContext::new(&GameConfig::default(), atlas, origin)
    }

    fn digit_text(ctx: &GameContext<CountingCue>) -> String {
        ctx.digits()
            .slots()
            .iter()
            .map(|&slot| ctx.scene().glyph(slot).map_or(" ", |g| g.key()))
            .collect()
    }

    fn prompt(ctx: &GameContext<CountingCue>) -> (Option<Glyph>, Option<Glyph>) {
        (
            ctx.scene().glyph(ctx.visibility().start_node()),
            ctx.scene().glyph(ctx.visibility().end_node()),
        )
    }

    fn release() -> TouchEvent {
        TouchEvent::new(PRIMARY_SLOT, TouchPhase::Release)
    }

    #[test]
    fn draw_without_viewport_renders_nothing() {
        let t0 = Instant::now();
        let mut ctx = new_context(t0);
        assert!(!ctx.on_draw(t0));
        assert!(ctx.layout().is_none());
    }

    #[test]
    fn first_frame_shows_go_prompt() {
        let t0 = Instant::now();
        let mut ctx = new_context(t0);
        ctx.on_config(1920, 1080);
        assert!(ctx.on_draw(t0));
        assert_eq!(prompt(&ctx), (Some(Glyph::Go), None));
        assert_eq!(digit_text(&ctx), "     ");
    }

    #[test]
    fn repeated_logical_tick_is_skipped() {
        let t0 = Instant::now();
        let mut ctx = new_context(t0);
        ctx.on_config(1920, 1080);
        assert!(ctx.on_draw(t0));
        assert!(!ctx.on_draw(t0 + Duration::from_millis(3)));
    }

    #[test]
    fn full_cycle_fires_cue_once() {
        let t0 = Instant::now();
        let mut ctx = new_context(t0);
        let cue = CountingCue::default();
        ctx.on_visible(cue.clone());
        ctx.on_config(1920, 1080);
        ctx.on_draw(t0);

        // Press alone does nothing; the release starts the countdown.
        let t_tap = t0 + Duration::from_millis(100);
        ctx.on_touch(TouchEvent::new(PRIMARY_SLOT, TouchPhase::Press), t_tap);
        assert_eq!(ctx.state(), GameState::Start);
        ctx.on_touch(release(), t_tap);
        assert_eq!(ctx.state(), GameState::Running);

        ctx.on_draw(t_tap + Duration::from_millis(20));
        assert_eq!(digit_text(&ctx), "05:00");
        assert_eq!(prompt(&ctx), (None, None));

        ctx.on_draw(t_tap + Duration::from_secs(61));
        assert_eq!(digit_text(&ctx), "03:59");

        let writes_before = ctx.scene().glyph_writes();
        ctx.on_draw(t_tap + Duration::from_millis(61_500));
        assert_eq!(ctx.scene().glyph_writes(), writes_before);

        let t_end = t_tap + DEFAULT_COUNTDOWN;
        ctx.on_draw(t_end);
        assert_eq!(ctx.state(), GameState::End);
        assert_eq!(cue.plays.get(), 1);
        assert_eq!(digit_text(&ctx), "     ");
        assert_eq!(prompt(&ctx), (None, Some(Glyph::Gooon)));

        for i in 1..30 {
            ctx.on_draw(t_end + Duration::from_millis(i * 17));
        }
        assert_eq!(cue.plays.get(), 1);

        ctx.on_touch(release(), t_end + Duration::from_secs(1));
        assert_eq!(ctx.state(), GameState::Start);
        ctx.on_draw(t_end + Duration::from_millis(1020));
        assert_eq!(prompt(&ctx), (Some(Glyph::Go), None));
    }

    #[test]
    fn touch_while_running_is_ignored() {
        let t0 = Instant::now();
        let mut ctx = new_context(t0);
        ctx.on_config(1920, 1080);
        ctx.on_touch(release(), t0);
        ctx.on_touch(release(), t0 + Duration::from_secs(3));
        assert_eq!(ctx.state(), GameState::Running);
        ctx.on_draw(t0 + Duration::from_millis(3_100));
        assert_eq!(digit_text(&ctx), "04:57");
    }

    #[test]
    fn expiry_without_audio_still_ends() {
        let t0 = Instant::now();
        let mut ctx = new_context(t0);
        ctx.on_config(800, 600);
        ctx.on_touch(release(), t0);
        ctx.on_draw(t0 + DEFAULT_COUNTDOWN);
        assert_eq!(ctx.state(), GameState::End);
    }

    #[test]
    fn invisible_releases_cue() {
        let t0 = Instant::now();
        let mut ctx = new_context(t0);
        ctx.on_visible(CountingCue::default());
        assert!(ctx.on_invisible().is_some());
        assert!(ctx.on_invisible().is_none());
    }

    #[test]
    fn resize_recomputes_layout() {
        let t0 = Instant::now();
        let mut ctx = new_context(t0);
        ctx.on_config(1920, 1080);
        ctx.on_draw(t0);
        assert!(!ctx.layout().expect("layout computed").portrait);

        ctx.on_config(1080, 1920);
        ctx.on_draw(t0 + Duration::from_millis(20));
        let layout = *ctx.layout().expect("layout recomputed");
        assert!(layout.portrait);
        assert_eq!(ctx.scene().root(), layout.design_to_device());
    }
}
