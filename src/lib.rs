pub mod config;
pub mod controller;
pub mod error;
pub mod fps;
pub mod input;
pub mod rendering;
pub mod sim;
pub mod util;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use config::{Cadence, Palette, SessionConfig, SessionMode};
pub use controller::{LoopController, PlaybackState};
pub use error::EngineError;
pub use sim::{Cell, Engine, Universe};

/// Wasm entry point: panic hook plus a `log` dispatcher on the browser console.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn initialize() {
    console_error_panic_hook::set_once();
    let _ = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {}] {}",
                record.level(),
                record.target(),
                message
            ))
        })
        .level(log::LevelFilter::Debug)
        .chain(fern::Output::call(console_log::log))
        .apply();
}

/// Install a stderr logger for native hosts.
#[cfg(not(target_arch = "wasm32"))]
pub fn init_native_logging(level: log::LevelFilter) -> Result<(), log::SetLoggerError> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                humantime::format_rfc3339_seconds(std::time::SystemTime::now()),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stderr())
        .apply()
}
