//! Wires the `log` crate (declared in Cargo.toml, unused by the teacher) up
//! to the same `Printer`/`Spinlock` pair `printf!` already uses, so the rest
//! of the kernel can call `log::{trace, debug, info, warn, error}` instead
//! of ad hoc `printf!`/`debug_log!` calls. One global logger, installed once
//! from `kmain` before any other subsystem runs.

use log::{Level, LevelFilter, Log, Metadata, Record};

struct KernelLogger;

static LOGGER: KernelLogger = KernelLogger;

impl Log for KernelLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let level = match record.level() {
            Level::Error => "ERROR",
            Level::Warn => "WARN ",
            Level::Info => "INFO ",
            Level::Debug => "DEBUG",
            Level::Trace => "TRACE",
        };
        printf!("[{}] {}: {}\n", level, record.target(), record.args());
    }

    fn flush(&self) {}
}

/// Release builds compile out per-tick scheduler chatter the same way the
/// teacher's `debug_log!` is gated by `cfg(log_level = "debug")`; debug
/// builds keep it to make MLFQ/Stride bookkeeping observable on the console.
#[cfg(debug_assertions)]
fn max_level() -> LevelFilter {
    LevelFilter::Debug
}

#[cfg(not(debug_assertions))]
fn max_level() -> LevelFilter {
    LevelFilter::Info
}

pub fn init() {
    log::set_max_level(max_level());
    // The logger is 'static and stateless; a failed second call just means
    // some other subsystem raced us, which can't happen since this is only
    // ever called once from kmain on hart 0.
    let _ = log::set_logger(&LOGGER);
}
