#[cfg(feature = "x11")]
pub mod x11;

// Modifiers we try to "unstick" before typing.
//
// The activation hotkey itself holds Shift; if it is still down when typing starts, every
// letter would come out shifted. Releasing a key the user is physically holding may
// desync the target app's view until the key is tapped again.
#[cfg(feature = "x11")]
pub(crate) const COMMON_MODIFIER_KEYSYMS: [u32; 7] = [
    0xffe1, // Shift_L
    0xffe2, // Shift_R
    0xffe3, // Control_L
    0xffe4, // Control_R
    0xffe9, // Alt_L
    0xffea, // Alt_R
    0xffeb, // Super_L
];
