use std::{fmt, str::FromStr, time::Duration};

use crate::util::Color;

/// Nominal frame interval used when a host has no animation-frame callback.
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// How long the host waits between ticks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cadence {
    /// Run the next tick on the host's next animation frame.
    NextFrame,
    /// Run the next tick after a fixed delay.
    Delay(Duration),
}

impl Cadence {
    pub fn from_millis(ms: u64) -> Self {
        if ms == 0 {
            Cadence::NextFrame
        } else {
            Cadence::Delay(Duration::from_millis(ms))
        }
    }

    /// Delay to wait for hosts that can only sleep.
    pub fn as_duration(&self) -> Duration {
        match self {
            Cadence::NextFrame => FRAME_INTERVAL,
            Cadence::Delay(d) => *d,
        }
    }
}

impl fmt::Display for Cadence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cadence::NextFrame => write!(f, "next frame"),
            Cadence::Delay(d) => write!(f, "{}", humantime::format_duration(*d)),
        }
    }
}

/// Presentation mode of a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionMode {
    /// Discrete stepping for looking at small grids. Frame rate is not sampled.
    Explore,
    /// Continuous animation with a live frame-rate readout.
    Animate,
}

impl SessionMode {
    pub fn measures_frame_rate(self) -> bool {
        self == SessionMode::Animate
    }
}

impl FromStr for SessionMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "explore" => Ok(SessionMode::Explore),
            "animate" => Ok(SessionMode::Animate),
            other => Err(anyhow::anyhow!(
                "unknown session mode `{other}` (expected `explore` or `animate`)"
            )),
        }
    }
}

/// Colours used to paint the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Palette {
    pub alive: Color,
    pub dead: Color,
    pub grid: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            alive: Color::rgb(0, 0, 0),
            dead: Color::rgb(255, 255, 255),
            grid: Color::rgb(204, 204, 204),
        }
    }
}

/// The parameters controlling a visualization session
#[derive(Clone, Debug, PartialEq)]
pub struct SessionConfig {
    pub mode: SessionMode,
    /// Wait between ticks
    pub cadence: Cadence,
    /// Engine steps executed per painted frame
    pub steps_per_paint: u32,
    /// Side length of one cell in surface pixels
    pub cell_size: u32,
    pub palette: Palette,
}

impl SessionConfig {
    /// One generation per paint at a slow cadence, for watching small grids
    /// evolve step by step.
    pub fn explore() -> Self {
        Self {
            mode: SessionMode::Explore,
            cadence: Cadence::Delay(Duration::from_millis(100)),
            steps_per_paint: 1,
            cell_size: 5,
            palette: Palette::default(),
        }
    }

    /// Ten generations per paint on every animation frame. Trades smoothness
    /// for throughput on large grids.
    pub fn fast_forward() -> Self {
        Self {
            mode: SessionMode::Animate,
            cadence: Cadence::NextFrame,
            steps_per_paint: 10,
            cell_size: 5,
            palette: Palette::default(),
        }
    }

    /// The preset matching a mode.
    pub fn for_mode(mode: SessionMode) -> Self {
        match mode {
            SessionMode::Explore => Self::explore(),
            SessionMode::Animate => Self::fast_forward(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::explore()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_modes() {
        assert_eq!("explore".parse::<SessionMode>().unwrap(), SessionMode::Explore);
        assert_eq!(" Animate ".parse::<SessionMode>().unwrap(), SessionMode::Animate);
        assert!("turbo".parse::<SessionMode>().is_err());
    }

    #[test]
    fn zero_millis_means_next_frame() {
        assert_eq!(Cadence::from_millis(0), Cadence::NextFrame);
        assert_eq!(
            Cadence::from_millis(250),
            Cadence::Delay(Duration::from_millis(250))
        );
        assert_eq!(Cadence::NextFrame.as_duration(), FRAME_INTERVAL);
    }

    #[test]
    fn presets_differ_in_step_policy() {
        let explore = SessionConfig::explore();
        let fast = SessionConfig::fast_forward();
        assert_eq!(explore.steps_per_paint, 1);
        assert_eq!(fast.steps_per_paint, 10);
        assert!(!explore.mode.measures_frame_rate());
        assert!(fast.mode.measures_frame_rate());
    }

    #[test]
    fn cadence_displays_humanized() {
        assert_eq!(Cadence::from_millis(1500).to_string(), "1s 500ms");
        assert_eq!(Cadence::NextFrame.to_string(), "next frame");
    }
}
