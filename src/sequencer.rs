use std::time::Duration;

use anyhow::Result;
use rand::Rng;

use crate::delay::{delay, DelayContext};
use crate::mistakes::ErrorModel;
use crate::profile::TypingProfile;
use crate::sink::KeystrokeSink;

/// Where the typist is within the current character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for the next character.
    Idle,
    /// Type the character straight through.
    Emit(char),
    /// Type the wrong key first.
    Mistype { intended: char, wrong: char },
    /// Erase the wrong key.
    Undo { intended: char },
    /// Retype the intended character.
    Correct { intended: char },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Intended characters emitted (corrected ones included).
    pub typed: usize,
    /// Misclick cycles; each one costs exactly one erase.
    pub mistakes: usize,
    /// Characters dropped as unrenderable.
    pub skipped: usize,
    pub total_pause: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Nothing to type after trimming.
    Skipped,
    Typed(SessionStats),
}

/// Any non-empty character is typed, control characters included.
pub fn is_renderable(c: char) -> bool {
    c.len_utf8() > 0
}

/// Drives a sink through a text, one character at a time.
pub struct TypingSequencer<'a, E, S, R> {
    profile: &'a TypingProfile,
    errors: &'a E,
    sink: S,
    rng: &'a mut R,
    stats: SessionStats,
}

impl<'a, E, S, R> TypingSequencer<'a, E, S, R>
where
    E: ErrorModel,
    S: KeystrokeSink,
    R: Rng,
{
    pub fn new(profile: &'a TypingProfile, errors: &'a E, sink: S, rng: &'a mut R) -> Self {
        Self {
            profile,
            errors,
            sink,
            rng,
            stats: SessionStats::default(),
        }
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Decide how `c` will be typed. `Idle` means skip it.
    pub fn plan_char(&mut self, c: char) -> Phase {
        if !is_renderable(c) {
            return Phase::Idle;
        }

        if self.profile.mistakes_enabled
            && self
                .errors
                .should_misclick(c, self.profile.error_rate, &mut *self.rng)
        {
            if let Some(wrong) = self.errors.pick_wrong_neighbor(c, &mut *self.rng) {
                return Phase::Mistype { intended: c, wrong };
            }
        }

        Phase::Emit(c)
    }

    /// Perform one phase and return the next.
    pub fn step(&mut self, phase: Phase) -> Result<Phase> {
        match phase {
            Phase::Idle => Ok(Phase::Idle),
            Phase::Emit(c) | Phase::Correct { intended: c } => {
                self.keystroke(c)?;
                self.wait(DelayContext::after(c))?;
                self.stats.typed += 1;
                Ok(Phase::Idle)
            }
            Phase::Mistype { intended, wrong } => {
                self.stats.mistakes += 1;
                self.keystroke(wrong)?;
                self.wait(DelayContext::MistakeNoticed)?;
                Ok(Phase::Undo { intended })
            }
            Phase::Undo { intended } => {
                self.sink.erase_one()?;
                self.wait(DelayContext::CorrectionBegins)?;
                Ok(Phase::Correct { intended })
            }
        }
    }

    pub fn type_char(&mut self, c: char) -> Result<()> {
        let mut phase = self.plan_char(c);
        if phase == Phase::Idle {
            self.stats.skipped += 1;
            return Ok(());
        }
        while phase != Phase::Idle {
            phase = self.step(phase)?;
        }
        Ok(())
    }

    pub fn type_text(&mut self, text: &str) -> Result<()> {
        for c in text.chars() {
            self.type_char(c)?;
        }
        Ok(())
    }

    /// The pause between activation and the first keystroke.
    pub fn react(&mut self) -> Result<()> {
        self.wait(DelayContext::Reaction)
    }

    pub fn finish(self) -> SessionStats {
        self.stats
    }

    fn keystroke(&mut self, c: char) -> Result<()> {
        self.sink.emit(c)?;
        self.wait(DelayContext::Keystroke)
    }

    fn wait(&mut self, context: DelayContext) -> Result<()> {
        let d = delay(context, self.profile, &mut *self.rng);
        self.stats.total_pause += d;
        self.sink.pause(d)
    }
}

/// One activation's worth of text.
#[derive(Debug, Clone)]
pub struct TypingSession<'a> {
    text: &'a str,
    profile: &'a TypingProfile,
}

impl<'a> TypingSession<'a> {
    /// `None` when nothing is left after trimming trailing line breaks.
    pub fn new(text: &'a str, profile: &'a TypingProfile) -> Option<Self> {
        let text = text.trim_end_matches(&['\r', '\n'][..]);
        if text.is_empty() {
            return None;
        }
        Some(Self { text, profile })
    }

    pub fn text(&self) -> &str {
        self.text
    }

    pub fn run<E, S, R>(self, errors: &E, sink: S, rng: &mut R) -> Result<SessionStats>
    where
        E: ErrorModel,
        S: KeystrokeSink,
        R: Rng,
    {
        let mut sequencer = TypingSequencer::new(self.profile, errors, sink, rng);
        sequencer.react()?;
        sequencer.sink.prepare()?;
        sequencer.type_text(self.text)?;
        Ok(sequencer.finish())
    }
}

/// Type `text` as one session: reaction pause, then every character in order.
pub fn run_session<E, S, R>(
    text: &str,
    profile: &TypingProfile,
    errors: &E,
    sink: S,
    rng: &mut R,
) -> Result<SessionOutcome>
where
    E: ErrorModel,
    S: KeystrokeSink,
    R: Rng,
{
    let Some(session) = TypingSession::new(text, profile) else {
        return Ok(SessionOutcome::Skipped);
    };
    session.run(errors, sink, rng).map(SessionOutcome::Typed)
}
