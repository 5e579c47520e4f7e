//! Animated loading indicator shown while a remote page is in flight.
//!
//! Works like a spinner: [`Model::start`] returns the first tick command and
//! every accepted [`TickMsg`] advances one frame and schedules the next.
//! [`Model::stop`] bumps the tag so ticks already scheduled are ignored.

use bubbletea_rs::{tick as bubbletea_tick, Cmd, Msg};
use lipgloss_extras::prelude::*;
use once_cell::sync::Lazy;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

// Internal ID management for indicator instances
static LAST_ID: AtomicI64 = AtomicI64::new(0);

fn next_id() -> i64 {
    LAST_ID.fetch_add(1, Ordering::SeqCst) + 1
}

/// Animation frames and their rate.
#[derive(Debug, Clone)]
pub struct Frames {
    /// Frames to cycle through.
    pub frames: Vec<String>,
    /// Delay between frames.
    pub fps: Duration,
}

impl Frames {
    /// Creates a frame set.
    pub fn new(frames: Vec<String>, fps: Duration) -> Self {
        Self { frames, fps }
    }
}

/// Braille dots.
pub static DOTS: Lazy<Frames> = Lazy::new(|| Frames {
    frames: ["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"]
        .iter()
        .map(|f| f.to_string())
        .collect(),
    fps: Duration::from_millis(100),
});

/// Plain ASCII line.
pub static LINE: Lazy<Frames> = Lazy::new(|| Frames {
    frames: ["|", "/", "-", "\\"].iter().map(|f| f.to_string()).collect(),
    fps: Duration::from_millis(100),
});

/// Advances the indicator of the given id.
#[derive(Debug, Clone)]
pub struct TickMsg {
    /// Indicator the tick belongs to.
    pub id: i64,
    tag: i64,
}

/// Loading indicator state.
#[derive(Debug, Clone)]
pub struct Model {
    frames: Frames,
    frame: usize,
    id: i64,
    tag: i64,
    active: bool,
    /// Style of the frame.
    pub style: Style,
}

impl Default for Model {
    fn default() -> Self {
        Self::new()
    }
}

impl Model {
    /// Creates a stopped indicator using [`DOTS`].
    pub fn new() -> Self {
        Self {
            frames: DOTS.clone(),
            frame: 0,
            id: next_id(),
            tag: 0,
            active: false,
            style: Style::new(),
        }
    }

    /// Uses another frame set (builder pattern).
    pub fn with_frames(mut self, frames: Frames) -> Self {
        self.frames = frames;
        self.frame = 0;
        self
    }

    /// Sets the frame style (builder pattern).
    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Unique id of this indicator.
    pub fn id(&self) -> i64 {
        self.id
    }

    /// Returns true while the indicator is running.
    pub fn active(&self) -> bool {
        self.active
    }

    /// Current frame, unstyled.
    pub fn frame(&self) -> &str {
        self.frames
            .frames
            .get(self.frame)
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// Shows the first frame without scheduling ticks.
    pub fn show(&mut self) {
        self.active = true;
        self.frame = 0;
        self.tag += 1;
    }

    /// Starts the animation from the first frame.
    pub fn start(&mut self) -> Cmd {
        self.show();
        self.tick()
    }

    /// Schedules the next frame while running.
    pub fn spin(&self) -> Option<Cmd> {
        self.active.then(|| self.tick())
    }

    /// Stops the animation; pending ticks are dropped.
    pub fn stop(&mut self) {
        self.active = false;
        self.tag += 1;
    }

    fn tick(&self) -> Cmd {
        let id = self.id;
        let tag = self.tag;
        bubbletea_tick(self.frames.fps, move |_| Box::new(TickMsg { id, tag }) as Msg)
    }

    /// Advances one frame on a matching tick and schedules the next one.
    pub fn update(&mut self, msg: &Msg) -> Option<Cmd> {
        let tick = msg.downcast_ref::<TickMsg>()?;
        if !self.active || tick.id != self.id || tick.tag != self.tag {
            return None;
        }
        self.frame += 1;
        if self.frame >= self.frames.frames.len() {
            self.frame = 0;
        }
        self.tag += 1;
        Some(self.tick())
    }

    /// Renders the styled frame, or nothing when stopped.
    pub fn view(&self) -> String {
        if !self.active {
            return String::new();
        }
        self.style.clone().inline(true).render(self.frame())
    }
}
