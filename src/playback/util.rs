use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::Result;

use crate::sink::KeystrokeSink;

pub(crate) fn sleep_interruptible(stop: &AtomicBool, ms: u64) {
    let mut remaining = ms;
    while remaining > 0 {
        if stop.load(Ordering::SeqCst) {
            return;
        }
        let step = remaining.min(50);
        std::thread::sleep(Duration::from_millis(step));
        remaining -= step;
    }
}

/// Pauses that return early once `stop` is set.
pub(crate) struct Interruptible<'a, S> {
    pub(crate) inner: S,
    pub(crate) stop: &'a AtomicBool,
}

impl<S: KeystrokeSink> KeystrokeSink for Interruptible<'_, S> {
    fn emit(&mut self, c: char) -> Result<()> {
        self.inner.emit(c)
    }

    fn erase_one(&mut self) -> Result<()> {
        self.inner.erase_one()
    }

    fn pause(&mut self, duration: Duration) -> Result<()> {
        let ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        sleep_interruptible(self.stop, ms);
        Ok(())
    }

    fn prepare(&mut self) -> Result<()> {
        self.inner.prepare()
    }
}

pub(crate) fn print_trace_line(line: &str) {
    const RESET: &str = "\x1b[0m";
    const TYPING: &str = "\x1b[34m";
    const FIX: &str = "\x1b[33m";

    if let Some(rest) = line.strip_prefix("Typing") {
        eprintln!("{TYPING}Typing{RESET}{rest}");
    } else if let Some(rest) = line.strip_prefix("Fix") {
        eprintln!("{FIX}Fix{RESET}{rest}");
    } else {
        eprintln!("{line}");
    }
}

/// Print a countdown to stderr. Returns `false` if `stop` was set before it finished.
pub fn countdown(stop: &AtomicBool, secs: u64) -> bool {
    if secs == 0 {
        return !stop.load(Ordering::SeqCst);
    }
    eprintln!("Focus the target window. Starting in {secs}s...");
    for remaining in (1..=secs).rev() {
        if stop.load(Ordering::SeqCst) {
            return false;
        }
        eprintln!("{remaining}...");
        sleep_interruptible(stop, 1000);
    }
    !stop.load(Ordering::SeqCst)
}
