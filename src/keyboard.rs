use xkbcommon::xkb;

// X11 keysyms (see X11/keysymdef.h)
pub const XK_BACKSPACE: u32 = 0xff08;
pub const XK_TAB: u32 = 0xff09;
pub const XK_RETURN: u32 = 0xff0d;
pub const XK_SPACE: u32 = 0x0020;

pub const NO_SYMBOL: u32 = 0;

/// The keysym that produces `c` when bound to a key, if any.
pub fn keysym_for_char(c: char) -> Option<u32> {
    let keysym = match c {
        // xkbcommon maps '\n' to Linefeed, which most toolkits ignore.
        '\n' => XK_RETURN,
        '\t' => XK_TAB,
        _ => xkb::utf32_to_keysym(c as u32).raw(),
    };
    (keysym != NO_SYMBOL).then_some(keysym)
}

pub fn find_first_untypable_char(text: &str) -> Option<(usize, char)> {
    text.char_indices()
        .find(|&(_idx, c)| keysym_for_char(c).is_none())
}
