pub mod clipboard;
pub mod delay;
#[cfg(feature = "x11")]
pub mod hotkey;
pub mod keyboard;
pub mod layout;
pub mod listen;
pub mod mistakes;
pub mod model;
pub mod playback;
pub mod profile;
pub mod sequencer;
pub mod sim;
pub mod sink;
pub mod trace;
