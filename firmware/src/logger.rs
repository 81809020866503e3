//! Print `log` records over RTT.

use log::{LevelFilter, Log, Metadata, Record};
use rtt_target::rprintln;

struct RttLogger;

static LOGGER: RttLogger = RttLogger;

impl Log for RttLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            rprintln!(":: {}", record.args());
        }
    }

    fn flush(&self) {}
}

/// Install the logger. Must be called after `rtt_init_print!`.
pub fn init(level: LevelFilter) {
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}
