use std::time::Instant;

use log::debug;

use crate::error::RenderError;
use crate::panel::ParameterPanel;
use crate::renderer::SceneRenderer;
use crate::scene::Scene;

const FPS_UPDATE_INTERVAL: f32 = 1.0;

/// Minimal frame clock - tracks delta time and total elapsed time.
#[derive(Debug)]
pub struct Clock {
    last_tick: Instant,
    elapsed: f32,
}

impl Clock {
    pub fn new() -> Self {
        Self {
            last_tick: Instant::now(),
            elapsed: 0.0,
        }
    }

    /// Get delta time since last tick and advance the clock.
    /// Returns delta in seconds.
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let delta = now.duration_since(self.last_tick).as_secs_f32();
        self.last_tick = now;
        self.elapsed += delta;
        delta
    }

    /// Total seconds accumulated across ticks.
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

/// Timing snapshot handed to the renderer each frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameStats {
    pub delta: f32,
    pub elapsed: f32,
    pub frame_count: u64,
    pub fps: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Running,
    /// Terminal. A stopped loop never schedules again; switching scenes
    /// creates a fresh loop.
    Stopped,
}

/// Per-frame scheduling for one mounted scene.
///
/// The loop owns no scene reference; the owner hands the scene in on each
/// host frame and a frame does nothing unless the loop is `Running`. Frame
/// work runs in a fixed order: advance controls and animation, refresh light
/// helpers, then render. Rendering before the update would show last frame's
/// interaction state.
#[derive(Debug)]
pub struct RenderLoop {
    state: LoopState,
    clock: Clock,
    frame_count: u64,
    fps: f32,
    fps_frames: u32,
    fps_timer: f32,
}

impl RenderLoop {
    pub fn new() -> Self {
        Self {
            state: LoopState::Idle,
            clock: Clock::new(),
            frame_count: 0,
            fps: 0.0,
            fps_frames: 0,
            fps_timer: 0.0,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Idle -> Running. Returns false (and does nothing) from any other
    /// state.
    pub fn start(&mut self) -> bool {
        if self.state != LoopState::Idle {
            return false;
        }
        self.state = LoopState::Running;
        self.clock = Clock::new();
        debug!("render loop started");
        true
    }

    /// Running -> Stopped. Idempotent; `Stopped` is terminal for this loop
    /// instance.
    pub fn stop(&mut self) {
        if self.state == LoopState::Running {
            debug!("render loop stopped after {} frames", self.frame_count);
        }
        self.state = LoopState::Stopped;
    }

    pub fn stats(&self) -> FrameStats {
        FrameStats {
            delta: 0.0,
            elapsed: self.clock.elapsed(),
            frame_count: self.frame_count,
            fps: self.fps,
        }
    }

    /// Execute one frame if running: (1) update controls and animation,
    /// (2) refresh helper decorations, (3) render.
    pub fn frame(
        &mut self,
        scene: &mut Scene,
        panel: &mut ParameterPanel,
        renderer: &mut dyn SceneRenderer,
    ) -> Result<(), RenderError> {
        if self.state != LoopState::Running {
            return Ok(());
        }

        let delta = self.clock.tick();
        self.frame_count += 1;
        self.update_fps(delta);

        scene.update(delta, self.clock.elapsed());
        scene.refresh_helpers();

        let stats = FrameStats {
            delta,
            elapsed: self.clock.elapsed(),
            frame_count: self.frame_count,
            fps: self.fps,
        };
        renderer.render(scene, panel, &stats)
    }

    fn update_fps(&mut self, delta: f32) {
        self.fps_frames += 1;
        self.fps_timer += delta;
        if self.fps_timer >= FPS_UPDATE_INTERVAL {
            self.fps = self.fps_frames as f32 / self.fps_timer;
            self.fps_frames = 0;
            self.fps_timer = 0.0;
        }
    }
}

impl Default for RenderLoop {
    fn default() -> Self {
        Self::new()
    }
}
