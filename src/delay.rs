use std::ops::Range;
use std::time::Duration;

use rand::Rng;
use rand_distr::{Distribution, Uniform};

use crate::profile::TypingProfile;

/// What the typist just did (or is about to do); selects the pause range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelayContext {
    /// After activation, before the first keystroke.
    Reaction,
    /// After every raw keystroke, including mistaken ones.
    Keystroke,
    /// After a wrong character, before erasing it.
    MistakeNoticed,
    /// After erasing, before retyping the intended character.
    CorrectionBegins,
    /// After a space or newline.
    AfterWhitespace,
    /// After sentence or clause punctuation.
    AfterPunctuation,
    /// After any other character.
    AfterCharacter,
}

impl DelayContext {
    /// Post-character context for `c`.
    pub fn after(c: char) -> Self {
        match c {
            ' ' | '\n' => DelayContext::AfterWhitespace,
            '.' | ',' | '!' | '?' | ';' | ':' => DelayContext::AfterPunctuation,
            _ => DelayContext::AfterCharacter,
        }
    }

    /// Unscaled pause range in milliseconds (half-open).
    pub fn range_ms(self) -> Range<u64> {
        match self {
            DelayContext::Reaction => 150..400,
            DelayContext::Keystroke => 20..60,
            DelayContext::MistakeNoticed => 80..180,
            DelayContext::CorrectionBegins => 60..140,
            DelayContext::AfterWhitespace => 80..180,
            DelayContext::AfterPunctuation => 180..450,
            DelayContext::AfterCharacter => 35..95,
        }
    }
}

pub fn delay(context: DelayContext, profile: &TypingProfile, rng: &mut impl Rng) -> Duration {
    let range = context.range_ms();
    random_sleep_range(range.start, range.end, profile, rng)
}

/// Uniform integer milliseconds in `[min_ms, max_ms)`, scaled by the profile speed.
///
/// An empty range yields `min_ms` (scaled).
pub fn random_sleep_range(
    min_ms: u64,
    max_ms: u64,
    profile: &TypingProfile,
    rng: &mut impl Rng,
) -> Duration {
    let ms = if max_ms > min_ms {
        Uniform::new(min_ms, max_ms).sample(rng)
    } else {
        min_ms
    };
    scale(ms, profile.speed_multiplier)
}

fn scale(ms: u64, speed_multiplier: f64) -> Duration {
    let nanos = (ms as f64 * speed_multiplier * 1_000_000.0).round();
    if !nanos.is_finite() || nanos <= 0.0 {
        return Duration::ZERO;
    }
    // `as` saturates on overflow.
    Duration::from_nanos(nanos as u64)
}
