//! The render loop: play/pause state machine, step cadence and repaints.
//!
//! The controller never arms timers itself. Every call that may need a
//! follow-up tick returns `Some(cadence)`, and the host runs [`tick`] once
//! after that cadence. At most one tick is pending at any time, so ticks
//! never overlap and a pause/resume cycle cannot start a second loop.
//!
//! [`tick`]: LoopController::tick

use crate::{
    config::{Cadence, SessionConfig, SessionMode},
    error::EngineError,
    fps::FrameRateMeter,
    input::{GridPosition, PointerMapper, Scale, SurfaceRect},
    rendering::{DrawingContext, GridRenderer},
    sim::Engine,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Running,
    Paused,
}

pub struct LoopController<E, D> {
    engine: E,
    surface: D,
    renderer: GridRenderer,
    mapper: PointerMapper,
    meter: Option<FrameRateMeter>,
    config: SessionConfig,
    state: PlaybackState,
    /// A tick has been handed to the host and has not run yet.
    tick_pending: bool,
    ticks: u64,
}

impl<E: Engine, D: DrawingContext> LoopController<E, D> {
    /// Size the surface for the engine's grid and take ownership of both.
    pub fn new(engine: E, mut surface: D, config: SessionConfig) -> Self {
        let renderer = GridRenderer::new(config.cell_size, config.palette);
        let (px_width, px_height) = renderer.surface_size(engine.width(), engine.height());
        surface.resize(px_width, px_height);
        log::info!(
            "Session ready: {}x{} cells on a {px_width}x{px_height} surface, {:?} mode, {} step(s) per paint every {}",
            engine.width(),
            engine.height(),
            config.mode,
            config.steps_per_paint,
            config.cadence
        );
        Self {
            engine,
            surface,
            mapper: PointerMapper::new(renderer.cell_size()),
            renderer,
            meter: None,
            config,
            state: PlaybackState::Running,
            tick_pending: false,
            ticks: 0,
        }
    }

    /// Attach a frame rate meter, sampled on every tick in animate mode.
    pub fn with_meter(mut self, meter: FrameRateMeter) -> Self {
        self.meter = Some(meter);
        self
    }

    /// Paint the initial state and hand back the first tick to schedule.
    pub fn start(&mut self) -> Option<Cadence> {
        self.repaint();
        self.schedule_next()
    }

    /// Run one iteration: sample the meter, step the engine, repaint.
    ///
    /// A tick that fires while paused does nothing and returns `None`.
    pub fn tick(&mut self) -> Option<Cadence> {
        self.tick_pending = false;
        if self.state == PlaybackState::Paused {
            log::trace!("Tick dropped while paused");
            return None;
        }

        if self.config.mode.measures_frame_rate() {
            if let Some(meter) = self.meter.as_mut() {
                meter.render();
            }
        }
        for _ in 0..self.config.steps_per_paint {
            self.engine.step();
        }
        self.repaint();
        self.ticks += 1;
        log::trace!("Tick {} done", self.ticks);

        self.schedule_next()
    }

    pub fn pause(&mut self) {
        if self.state == PlaybackState::Paused {
            return;
        }
        self.state = PlaybackState::Paused;
        log::debug!("Simulation paused after {} ticks", self.ticks);
    }

    /// Resume playback. Returns a tick to schedule unless one is already
    /// pending from before the pause.
    pub fn resume(&mut self) -> Option<Cadence> {
        if self.state == PlaybackState::Running {
            return None;
        }
        self.state = PlaybackState::Running;
        if let Some(meter) = self.meter.as_mut() {
            meter.restart_timing();
        }
        log::debug!("Simulation resumed");
        self.schedule_next()
    }

    /// The play/pause control.
    pub fn toggle_playback(&mut self) -> Option<Cadence> {
        match self.state {
            PlaybackState::Running => {
                self.pause();
                None
            }
            PlaybackState::Paused => self.resume(),
        }
    }

    /// Toggle the cell under a click and repaint immediately, whether or
    /// not playback is running.
    pub fn handle_click(
        &mut self,
        client_x: f64,
        client_y: f64,
        rect: &SurfaceRect,
        scale: Scale,
    ) -> Result<GridPosition, EngineError> {
        let pos = self.mapper.map(client_x, client_y, rect, scale);
        let out_of_bounds = || {
            EngineError::cell_out_of_bounds(
                pos.row,
                pos.col,
                self.engine.width(),
                self.engine.height(),
            )
        };
        let row = u32::try_from(pos.row).map_err(|_| out_of_bounds())?;
        let col = u32::try_from(pos.col).map_err(|_| out_of_bounds())?;
        self.engine.toggle_cell(row, col)?;
        log::debug!("Toggled cell ({row}, {col})");
        self.repaint();
        Ok(pos)
    }

    /// Redraw every cell, then the grid on top.
    pub fn repaint(&mut self) {
        if let Err(e) = self.renderer.draw_cells(&self.engine, &mut self.surface) {
            log::warn!("Cell paint incomplete: {e}");
        }
        self.renderer.draw_grid(&self.engine, &mut self.surface);
    }

    pub fn set_cadence(&mut self, cadence: Cadence) {
        log::debug!("Cadence set to {cadence}");
        self.config.cadence = cadence;
    }

    pub fn set_steps_per_paint(&mut self, steps: u32) {
        log::debug!("Steps per paint set to {steps}");
        self.config.steps_per_paint = steps;
    }

    pub fn set_mode(&mut self, mode: SessionMode) {
        log::debug!("Mode set to {mode:?}");
        self.config.mode = mode;
        if let Some(meter) = self.meter.as_mut() {
            meter.restart_timing();
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn surface(&self) -> &D {
        &self.surface
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn meter(&self) -> Option<&FrameRateMeter> {
        self.meter.as_ref()
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_paused(&self) -> bool {
        self.state == PlaybackState::Paused
    }

    pub fn has_pending_tick(&self) -> bool {
        self.tick_pending
    }

    /// Running ticks completed so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    fn schedule_next(&mut self) -> Option<Cadence> {
        if self.state == PlaybackState::Paused || self.tick_pending {
            return None;
        }
        self.tick_pending = true;
        Some(self.config.cadence)
    }
}
