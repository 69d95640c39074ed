use anyhow::{anyhow, Context, Result};
use tracing::debug;
use x11rb::connection::Connection;
use x11rb::protocol::xproto::{ConnectionExt as _, GetInputFocusReply};
use x11rb::protocol::xtest::ConnectionExt as _;
use x11rb::protocol::{xproto, xtest};
use x11rb::rust_connection::RustConnection;

use super::COMMON_MODIFIER_KEYSYMS;
use crate::keyboard::{keysym_for_char, NO_SYMBOL, XK_BACKSPACE};
use crate::sink::KeystrokeSink;

/// The server's core keyboard mapping, as fetched at connect time.
#[derive(Debug, Clone)]
pub(crate) struct KeyboardMapping {
    min_keycode: u8,
    keysyms_per_keycode: u8,
    keysyms: Vec<xproto::Keysym>,
}

impl KeyboardMapping {
    pub(crate) fn load(conn: &impl Connection) -> Result<Self> {
        let setup = conn.setup();
        let min_keycode = setup.min_keycode;
        let count = setup
            .max_keycode
            .checked_sub(min_keycode)
            .and_then(|span| span.checked_add(1))
            .ok_or_else(|| anyhow!("X server reported an invalid keycode range"))?;

        let reply = conn
            .get_keyboard_mapping(min_keycode, count)
            .context("failed to request keyboard mapping")?
            .reply()
            .context("failed to read keyboard mapping")?;

        if reply.keysyms_per_keycode == 0 {
            return Err(anyhow!("X server returned 0 keysyms per keycode"));
        }

        Ok(Self {
            min_keycode,
            keysyms_per_keycode: reply.keysyms_per_keycode,
            keysyms: reply.keysyms,
        })
    }

    fn rows(&self) -> impl Iterator<Item = (u8, &[xproto::Keysym])> + '_ {
        let per = self.keysyms_per_keycode as usize;
        self.keysyms
            .chunks(per)
            .enumerate()
            .map(move |(i, row)| (self.min_keycode.saturating_add(i as u8), row))
    }

    /// First keycode producing `keysym` unshifted.
    pub(crate) fn keycode_for(&self, keysym: xproto::Keysym) -> Option<u8> {
        self.rows()
            .find(|(_, row)| row.first() == Some(&keysym))
            .map(|(keycode, _)| keycode)
    }

    /// Highest keycode with nothing bound to it.
    fn spare_keycode(&self) -> Option<u8> {
        self.rows()
            .filter(|(_, row)| row.iter().all(|&sym| sym == NO_SYMBOL))
            .map(|(keycode, _)| keycode)
            .last()
    }
}

fn query_xtest(conn: &impl Connection) -> Result<()> {
    let ext = conn
        .extension_information(xtest::X11_EXTENSION_NAME)
        .context("failed to query X11 extension info")?;

    if ext.is_none() {
        return Err(anyhow!(
            "X11 backend requires the XTEST extension (not present on this X server)"
        ));
    }

    // Optional sanity check: ask for a version. If this fails, we still treat it as unsupported.
    let _ = conn
        .xtest_get_version(2, 2)
        .ok()
        .and_then(|cookie| cookie.reply().ok());

    Ok(())
}

fn get_focus(conn: &impl Connection) -> Result<GetInputFocusReply> {
    conn.get_input_focus()
        .context("failed to request input focus")?
        .reply()
        .context("failed to read input focus reply")
}

fn xtest_key(
    conn: &impl Connection,
    root: xproto::Window,
    keycode: u8,
    pressed: bool,
) -> Result<()> {
    let type_ = if pressed {
        xproto::KEY_PRESS_EVENT
    } else {
        xproto::KEY_RELEASE_EVENT
    };
    conn.xtest_fake_input(type_, keycode, x11rb::CURRENT_TIME, root, 0, 0, 0)
        .context("failed to send XTEST fake input")?;
    Ok(())
}

/// Types through XTEST. Each character's keysym is bound to a spare keycode before the
/// key is tapped, so any Unicode text types regardless of the active layout.
pub struct X11Keyboard {
    conn: RustConnection,
    root: xproto::Window,
    keysyms_per_keycode: u8,
    scratch: u8,
    backspace: u8,
    modifiers: Vec<u8>,
    bound: Option<xproto::Keysym>,
}

impl X11Keyboard {
    pub fn connect() -> Result<Self> {
        let (conn, screen_num) = x11rb::connect(None).context("failed to connect to X11")?;
        query_xtest(&conn)?;

        let root = conn
            .setup()
            .roots
            .get(screen_num)
            .ok_or_else(|| anyhow!("invalid X11 screen index"))?
            .root;

        let mapping = KeyboardMapping::load(&conn)?;
        let scratch = mapping.spare_keycode().ok_or_else(|| {
            anyhow!("X11 keyboard mapping has no unused keycode to bind characters to")
        })?;
        let backspace = mapping
            .keycode_for(XK_BACKSPACE)
            .ok_or_else(|| anyhow!("X11 keyboard mapping has no BackSpace key"))?;
        let modifiers = COMMON_MODIFIER_KEYSYMS
            .iter()
            .filter_map(|&sym| mapping.keycode_for(sym))
            .collect();

        debug!(scratch, backspace, "connected X11 keyboard");

        Ok(Self {
            conn,
            root,
            keysyms_per_keycode: mapping.keysyms_per_keycode,
            scratch,
            backspace,
            modifiers,
            bound: None,
        })
    }

    fn bind(&mut self, keysym: xproto::Keysym) -> Result<()> {
        if self.bound == Some(keysym) {
            return Ok(());
        }

        let row = vec![keysym; self.keysyms_per_keycode as usize];
        self.conn
            .change_keyboard_mapping(1, self.scratch, self.keysyms_per_keycode, &row)
            .context("failed to rebind X11 keycode")?;
        // Round-trip so the binding is in place before the key event.
        get_focus(&self.conn)?;
        self.bound = Some(keysym);
        Ok(())
    }

    fn tap(&mut self, keycode: u8) -> Result<()> {
        xtest_key(&self.conn, self.root, keycode, true)?;
        xtest_key(&self.conn, self.root, keycode, false)?;
        self.conn.flush().context("failed to flush X11 connection")?;
        Ok(())
    }

    fn reset_modifiers_best_effort(&self) {
        for &keycode in &self.modifiers {
            let _ = xtest_key(&self.conn, self.root, keycode, false);
        }
        let _ = self.conn.flush();
    }
}

impl KeystrokeSink for X11Keyboard {
    fn emit(&mut self, c: char) -> Result<()> {
        let keysym = keysym_for_char(c).ok_or_else(|| anyhow!("no X11 keysym for {c:?}"))?;
        self.bind(keysym)?;
        self.tap(self.scratch)
    }

    fn erase_one(&mut self) -> Result<()> {
        self.tap(self.backspace)
    }

    fn prepare(&mut self) -> Result<()> {
        let focus = get_focus(&self.conn)?;
        if focus.focus == x11rb::NONE {
            return Err(anyhow!(
                "no X11 input focus detected; click into the target window first"
            ));
        }

        // X11 has no per-client modifier state; start from a neutral one.
        self.reset_modifiers_best_effort();
        Ok(())
    }
}

impl Drop for X11Keyboard {
    fn drop(&mut self) {
        if self.bound.is_none() {
            return;
        }
        let row = vec![NO_SYMBOL; self.keysyms_per_keycode as usize];
        let _ = self
            .conn
            .change_keyboard_mapping(1, self.scratch, self.keysyms_per_keycode, &row);
        let _ = self.conn.flush();
    }
}
