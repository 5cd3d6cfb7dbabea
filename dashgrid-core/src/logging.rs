//! Logger setup for the `log` facade.
//!
//! In the browser records go to `console.error/warn/info/debug` through
//! `ConsoleLogger`. Native builds (tests, tools embedding the crate) use
//! `env_logger`, so `RUST_LOG` can still override the level given to `init`.
//! Nothing is printed until `init` is called.

use log::LevelFilter;

#[cfg(target_arch = "wasm32")]
pub use browser::ConsoleLogger;

#[cfg(target_arch = "wasm32")]
mod browser {
    use log::{Level, Log, Metadata, Record};
    use wasm_bindgen::JsValue;
    use web_sys::console;

    pub struct ConsoleLogger;

    pub(super) static LOGGER: ConsoleLogger = ConsoleLogger;

    impl Log for ConsoleLogger {
        fn enabled(&self, metadata: &Metadata) -> bool {
            metadata.level() <= log::max_level()
        }

        fn log(&self, record: &Record) {
            if !self.enabled(record.metadata()) {
                return;
            }
            let value = JsValue::from_str(&format!("[{} {}] {}", record.level(), record.target(), record.args()));
            match record.level() {
                Level::Error => console::error_1(&value),
                Level::Warn => console::warn_1(&value),
                Level::Info => console::info_1(&value),
                Level::Debug | Level::Trace => console::debug_1(&value),
            }
        }

        fn flush(&self) {}
    }
}

/// Install the logger (once) and set the max level. Later calls only
/// change the level.
#[cfg(target_arch = "wasm32")]
pub fn init(level: LevelFilter) {
    let _ = log::set_logger(&browser::LOGGER);
    log::set_max_level(level);
}

/// Install `env_logger` (once) with `level` as the default filter. Later
/// calls only change the level.
#[cfg(not(target_arch = "wasm32"))]
pub fn init(level: LevelFilter) {
    let installed = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .try_init();
    if installed.is_err() {
        log::set_max_level(level);
    }
}

/// Parse a level name as sent by the host ("warn", "debug", ...).
pub fn parse_level(name: &str) -> LevelFilter {
    name.parse().unwrap_or(LevelFilter::Warn)
}
