use anyhow::{Context, Result};
use arboard::Clipboard;

use crate::sink::ClipboardSource;

pub struct SystemClipboard {
    clipboard: Clipboard,
}

impl SystemClipboard {
    pub fn new() -> Result<Self> {
        let clipboard = Clipboard::new().context("failed to initialize clipboard")?;
        Ok(Self { clipboard })
    }
}

impl ClipboardSource for SystemClipboard {
    fn read_text(&mut self) -> Result<String> {
        self.clipboard
            .get_text()
            .context("failed to read text from clipboard")
    }
}
