//! Global Shift+Space activation hotkey on X11.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use tracing::debug;
use x11rb::connection::Connection;
use x11rb::protocol::xproto::{self, ConnectionExt as _, GrabMode, ModMask};
use x11rb::protocol::Event;
use x11rb::rust_connection::RustConnection;

use crate::keyboard::XK_SPACE;
use crate::playback::backends::x11::KeyboardMapping;
use crate::playback::util::sleep_interruptible;
use crate::sink::ActivationTrigger;

const POLL_INTERVAL_MS: u64 = 50;

/// Lock-style modifiers that must not stop the hotkey from matching.
fn ignored_modifier_combos() -> [ModMask; 4] {
    [
        ModMask::from(0u16),
        ModMask::LOCK,
        ModMask::M2,
        ModMask::LOCK | ModMask::M2,
    ]
}

/// Tells real presses of the hotkey apart from X autorepeat.
///
/// Autorepeat shows up as a release immediately followed by a press carrying the same
/// timestamp.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct RepeatFilter {
    last_release: Option<xproto::Timestamp>,
}

impl RepeatFilter {
    /// Feed one event for the hotkey's keycode. Returns `true` for a fresh press.
    pub(crate) fn accept(&mut self, pressed: bool, time: xproto::Timestamp) -> bool {
        if !pressed {
            self.last_release = Some(time);
            return false;
        }
        self.last_release.take() != Some(time)
    }
}

/// Passive grab of Shift+Space on the root window.
pub struct X11Hotkey {
    conn: RustConnection,
    root: xproto::Window,
    keycode: u8,
    repeats: RepeatFilter,
    stop: Arc<AtomicBool>,
}

impl X11Hotkey {
    /// Grab Shift+Space. Fails if another client already holds the grab.
    pub fn grab_shift_space(stop: Arc<AtomicBool>) -> Result<Self> {
        let (conn, screen_num) = x11rb::connect(None).context("failed to connect to X11")?;
        let root = conn
            .setup()
            .roots
            .get(screen_num)
            .ok_or_else(|| anyhow!("invalid X11 screen index"))?
            .root;

        let keycode = KeyboardMapping::load(&conn)?
            .keycode_for(XK_SPACE)
            .ok_or_else(|| anyhow!("X11 keyboard mapping has no space key"))?;

        for extra in ignored_modifier_combos() {
            conn.grab_key(
                false,
                root,
                ModMask::SHIFT | extra,
                keycode,
                GrabMode::ASYNC,
                GrabMode::ASYNC,
            )
            .context("failed to request Shift+Space grab")?
            .check()
            .context("Shift+Space is already grabbed by another application")?;
        }
        conn.flush().context("failed to flush X11 connection")?;

        debug!(keycode, "grabbed Shift+Space");

        Ok(Self {
            conn,
            root,
            keycode,
            repeats: RepeatFilter::default(),
            stop,
        })
    }
}

impl ActivationTrigger for X11Hotkey {
    fn wait_for_trigger(&mut self) -> Result<bool> {
        loop {
            if self.stop.load(Ordering::SeqCst) {
                return Ok(false);
            }

            while let Some(event) = self
                .conn
                .poll_for_event()
                .context("lost connection to X11")?
            {
                let (pressed, key) = match event {
                    Event::KeyPress(e) => (true, e),
                    Event::KeyRelease(e) => (false, e),
                    _ => continue,
                };
                if key.detail == self.keycode && self.repeats.accept(pressed, key.time) {
                    return Ok(true);
                }
            }

            sleep_interruptible(self.stop.as_ref(), POLL_INTERVAL_MS);
        }
    }
}

impl Drop for X11Hotkey {
    fn drop(&mut self) {
        let _ = self.conn.ungrab_key(self.keycode, self.root, ModMask::ANY);
        let _ = self.conn.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::RepeatFilter;

    #[test]
    fn first_press_activates() {
        let mut filter = RepeatFilter::default();
        assert!(filter.accept(true, 100));
    }

    #[test]
    fn held_key_repeats_are_ignored() {
        let mut filter = RepeatFilter::default();
        assert!(filter.accept(true, 100));
        // Autorepeat: release and press share a timestamp.
        assert!(!filter.accept(false, 600));
        assert!(!filter.accept(true, 600));
        assert!(!filter.accept(false, 633));
        assert!(!filter.accept(true, 633));
        // Physical release, then a new press later.
        assert!(!filter.accept(false, 650));
        assert!(filter.accept(true, 900));
    }

    #[test]
    fn press_without_prior_release_activates() {
        let mut filter = RepeatFilter::default();
        assert!(filter.accept(true, 5));
        assert!(filter.accept(true, 5));
    }
}
