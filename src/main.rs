use std::thread;

use anyhow::Context;

use conway_canvas::{
    Cadence, LoopController, SessionConfig, SessionMode, Universe,
    fps::{FrameRateMeter, LogSink, SystemClock},
    rendering::Raster,
};

const GRID_WIDTH: u32 = 24;
const GRID_HEIGHT: u32 = 12;
const MAX_TICKS: u64 = 40;

// Two gliders heading for a blinker.
const SEED: [(u32, u32); 13] = [
    (0, 1),
    (1, 2),
    (2, 0),
    (2, 1),
    (2, 2),
    (6, 5),
    (7, 6),
    (8, 4),
    (8, 5),
    (8, 6),
    (5, 16),
    (5, 17),
    (5, 18),
];

fn main() -> anyhow::Result<()> {
    conway_canvas::init_native_logging(log::LevelFilter::Info)
        .context("failed to install logger")?;

    let mut universe = Universe::new(GRID_WIDTH, GRID_HEIGHT)?;
    universe.set_cells(&SEED)?;

    let config = SessionConfig {
        mode: SessionMode::Animate,
        cadence: Cadence::from_millis(120),
        steps_per_paint: 1,
        ..SessionConfig::fast_forward()
    };
    let mut controller = LoopController::new(universe, Raster::new(0, 0), config)
        .with_meter(FrameRateMeter::new(SystemClock::new(), LogSink));

    let mut next = controller.start();
    print_frame(&controller);
    while let Some(cadence) = next {
        if controller.ticks() >= MAX_TICKS {
            break;
        }
        thread::sleep(cadence.as_duration());
        next = controller.tick();
        print_frame(&controller);
    }

    log::info!(
        "Stopped after {} ticks at generation {}",
        controller.ticks(),
        controller.engine().generation()
    );
    Ok(())
}

/// Print the painted surface, sampling the centre pixel of each cell.
fn print_frame(controller: &LoopController<Universe, Raster>) {
    let raster = controller.surface();
    let size = controller.config().cell_size;
    let alive = controller.config().palette.alive;

    let mut out = String::new();
    for row in 0..GRID_HEIGHT {
        for col in 0..GRID_WIDTH {
            let centre = raster.pixel(col * size + size / 2, row * size + size / 2);
            out.push(if centre == Some(alive) { '◼' } else { '◻' });
        }
        out.push('\n');
    }
    if let Some(stats) = controller.meter().and_then(|m| m.stats()) {
        out.push_str(&format!("{stats} recent: {:.2}\n", stats.recent_avg));
    }
    println!("{out}");
}
