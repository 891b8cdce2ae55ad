//! # Runtime
//!
//! The frame loop. Startup resolves the display scale, opens the window and
//! materializes the asset registry; each frame then polls events, snapshots
//! input, runs the update callback, presents and paces.

use crate::assets::Assets;
use crate::config::Config;
use crate::frame::Frame;
use crate::input::InputState;
use crate::platform::{Platform, PlatformEvent, WindowRequest};
use crate::scale::{needs_monitor, resolve, ScaleFactor};
use crate::{PixieError, PixieResult};
use log::{debug, info};
use std::collections::VecDeque;
use std::time::Duration;

/// Number of frame intervals averaged for the capped frame rate.
pub const FPS_WINDOW: usize = 10;

/// Lifecycle of a [`Runtime`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Created, nothing touched yet
    Uninitialized,
    /// Scale resolved, window open, assets materialized
    Configuring,
    /// Inside the frame loop
    Running,
    /// Quit requested or a fatal error occurred
    Terminated,
}

/// Frame pacing and frame-rate measurement.
///
/// With a cap, every tick returns how long to sleep so frames start
/// `1 / cap` apart, and the reported rate is the average over the last
/// [`FPS_WINDOW`] intervals. Without a cap nothing sleeps and the rate is the
/// number of frames counted during the last full second.
///
/// # Examples
///
/// ```
/// use pixie::FrameClock;
/// use std::time::Duration;
///
/// let mut clock = FrameClock::new(Some(50), Duration::ZERO);
/// let sleep = clock.tick(Duration::from_millis(5));
/// assert_eq!(sleep, Duration::from_millis(15));
/// ```
#[derive(Debug, Clone)]
pub struct FrameClock {
    cap: Option<u32>,
    last_frame: Duration,
    intervals: VecDeque<Duration>,
    second_start: Duration,
    frames_this_second: u32,
    fps: f32,
}

impl FrameClock {
    /// Starts the clock at `now`.
    pub fn new(cap: Option<u32>, now: Duration) -> Self {
        Self {
            cap,
            last_frame: now,
            intervals: VecDeque::with_capacity(FPS_WINDOW),
            second_start: now,
            frames_this_second: 0,
            fps: 0.0,
        }
    }

    /// Target time between frames, if capped.
    pub fn period(&self) -> Option<Duration> {
        self.cap
            .filter(|cap| *cap > 0)
            .map(|cap| Duration::from_secs_f64(1.0 / f64::from(cap)))
    }

    /// Ends a frame at `now` and returns how long to sleep before the next.
    pub fn tick(&mut self, now: Duration) -> Duration {
        match self.period() {
            Some(period) => {
                let deadline = self.last_frame + period;
                let sleep = deadline.saturating_sub(now);
                let frame_end = now + sleep;
                self.record(frame_end.saturating_sub(self.last_frame));
                self.last_frame = frame_end;
                sleep
            }
            None => {
                self.frames_this_second += 1;
                if now.saturating_sub(self.second_start) >= Duration::from_secs(1) {
                    self.fps = self.frames_this_second as f32;
                    self.frames_this_second = 0;
                    self.second_start = now;
                }
                self.last_frame = now;
                Duration::ZERO
            }
        }
    }

    fn record(&mut self, interval: Duration) {
        if self.intervals.len() == FPS_WINDOW {
            self.intervals.pop_front();
        }
        self.intervals.push_back(interval);

        let total: Duration = self.intervals.iter().sum();
        self.fps = if total.is_zero() {
            0.0
        } else {
            self.intervals.len() as f32 / total.as_secs_f32()
        };
    }

    /// Most recently measured frame rate. Zero until measured.
    pub fn fps(&self) -> f32 {
        self.fps
    }
}

/// Owns the configuration, assets, input state and platform for one game.
///
/// # Examples
///
/// ```
/// use pixie::{Assets, Config, HeadlessPlatform, LoopState, Runtime, ScaleMode, BLACK};
///
/// let config = Config::new("demo").with_scale(ScaleMode::Fixed(2));
/// let platform = HeadlessPlatform::new().quit_after(3);
/// let mut runtime = Runtime::new(config, Assets::new(), platform);
///
/// tokio_test::block_on(runtime.run(|frame| {
///     frame.cls(BLACK);
///     Ok(())
/// }))
/// .unwrap();
///
/// assert_eq!(runtime.state(), LoopState::Terminated);
/// assert_eq!(runtime.platform().frames().len(), 3);
/// ```
pub struct Runtime<P: Platform> {
    config: Config,
    assets: Assets,
    platform: P,
    input: InputState,
    state: LoopState,
    scale: Option<ScaleFactor>,
    clock: FrameClock,
    frames: u64,
}

impl<P: Platform> Runtime<P> {
    pub fn new(config: Config, assets: Assets, platform: P) -> Self {
        let clock = FrameClock::new(config.fps_cap, platform.now());
        Self {
            config,
            assets,
            platform,
            input: InputState::new(),
            state: LoopState::Uninitialized,
            scale: None,
            clock,
            frames: 0,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Display scale, once configured.
    pub fn scale(&self) -> Option<ScaleFactor> {
        self.scale
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn assets(&self) -> &Assets {
        &self.assets
    }

    pub fn assets_mut(&mut self) -> &mut Assets {
        &mut self.assets
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    pub fn into_platform(self) -> P {
        self.platform
    }

    /// Frames completed so far.
    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    pub fn fps(&self) -> f32 {
        self.clock.fps()
    }

    /// Resolves the scale, opens the window and materializes every pending
    /// asset. Any failure terminates the runtime.
    pub async fn configure(&mut self) -> PixieResult<ScaleFactor> {
        if self.state != LoopState::Uninitialized {
            return Err(PixieError::InvalidState(format!(
                "cannot configure a runtime in state {:?}",
                self.state
            )));
        }
        self.state = LoopState::Configuring;

        match self.prepare().await {
            Ok(scale) => Ok(scale),
            Err(e) => {
                self.state = LoopState::Terminated;
                Err(e)
            }
        }
    }

    async fn prepare(&mut self) -> PixieResult<ScaleFactor> {
        self.config.validate()?;
        let logical = self.config.logical_size();

        let monitor = if needs_monitor(self.config.scale, self.config.fullscreen) {
            self.platform.primary_monitor_size().await
        } else {
            None
        };
        let scale = resolve(self.config.scale, logical, self.config.fullscreen, monitor)?;

        self.platform.open_window(&WindowRequest {
            title: self.config.title.clone(),
            width: logical.0.saturating_mul(scale.get()),
            height: logical.1.saturating_mul(scale.get()),
            fullscreen: self.config.fullscreen,
            vsync: self.config.vsync,
        })?;
        self.assets.materialize_all(scale)?;
        self.scale = Some(scale);
        Ok(scale)
    }

    /// Runs frames until the platform reports quit or `update` fails.
    ///
    /// Configures first if [`Runtime::configure`] has not been called.
    pub async fn run<F>(&mut self, mut update: F) -> PixieResult<()>
    where
        F: FnMut(&mut Frame<'_, P>) -> PixieResult<()>,
    {
        if self.state == LoopState::Uninitialized {
            self.configure().await?;
        }
        if self.state != LoopState::Configuring {
            return Err(PixieError::InvalidState(format!(
                "cannot run a runtime in state {:?}",
                self.state
            )));
        }

        self.state = LoopState::Running;
        self.clock = FrameClock::new(self.config.fps_cap, self.platform.now());
        info!("Entering frame loop (fps cap: {:?})", self.config.fps_cap);

        while self.step(&mut update).await? == LoopState::Running {}

        info!("Frame loop ended after {} frames", self.frames);
        Ok(())
    }

    /// Runs a single frame and returns the state afterwards.
    pub async fn step<F>(&mut self, update: &mut F) -> PixieResult<LoopState>
    where
        F: FnMut(&mut Frame<'_, P>) -> PixieResult<()>,
    {
        let scale = match (self.state, self.scale) {
            (LoopState::Running, Some(scale)) => scale,
            _ => {
                return Err(PixieError::InvalidState(format!(
                    "cannot step a runtime in state {:?}",
                    self.state
                )))
            }
        };

        if self
            .platform
            .poll_events()
            .contains(&PlatformEvent::Quit)
        {
            debug!("Quit requested");
            self.state = LoopState::Terminated;
            return Ok(self.state);
        }

        let (mouse_x, mouse_y) = self.platform.mouse_position();
        let factor = scale.get() as f32;
        self.input
            .advance(self.platform.keys_down(), (mouse_x / factor, mouse_y / factor));

        let result = {
            let mut frame = Frame::new(
                &mut self.platform,
                &mut self.assets,
                &self.input,
                scale,
                self.config.logical_size(),
                self.clock.fps(),
            );
            update(&mut frame)
        };
        if let Err(e) = result {
            self.state = LoopState::Terminated;
            return Err(e);
        }

        if let Err(e) = self.platform.present().await {
            self.state = LoopState::Terminated;
            return Err(e);
        }

        let sleep = self.clock.tick(self.platform.now());
        if !sleep.is_zero() {
            self.platform.sleep(sleep);
        }
        self.frames += 1;
        Ok(self.state)
    }
}
