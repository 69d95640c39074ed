//! The activation loop: wait for the hotkey, read the clipboard, type it, repeat.

use anyhow::Result;
use rand::Rng;
use tracing::{debug, info, warn};

use crate::mistakes::ErrorModel;
use crate::profile::TypingProfile;
use crate::sequencer::{run_session, SessionOutcome};
use crate::sink::{ActivationTrigger, ClipboardSource, KeystrokeSink};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListenSummary {
    pub activations: usize,
    pub typed: usize,
    /// Clipboard unreadable or empty.
    pub skipped: usize,
    /// Aborted by a keystroke sink error.
    pub failed: usize,
}

/// Run sessions until the trigger shuts down.
///
/// Sessions run to completion one at a time; a trigger that fires mid-session is only
/// seen once the session returns. Clipboard and sink failures skip the session, trigger
/// failures end the loop with an error.
pub fn run_activation_loop<T, C, S, E, R>(
    trigger: &mut T,
    clipboard: &mut C,
    sink: &mut S,
    profile: &TypingProfile,
    errors: &E,
    rng: &mut R,
) -> Result<ListenSummary>
where
    T: ActivationTrigger + ?Sized,
    C: ClipboardSource + ?Sized,
    S: KeystrokeSink + ?Sized,
    E: ErrorModel,
    R: Rng,
{
    let mut summary = ListenSummary::default();

    while trigger.wait_for_trigger()? {
        summary.activations += 1;

        let text = match clipboard.read_text() {
            Ok(text) => text,
            Err(err) => {
                warn!("skipping activation: {err:#}");
                summary.skipped += 1;
                continue;
            }
        };

        match run_session(&text, profile, errors, &mut *sink, rng) {
            Ok(SessionOutcome::Skipped) => {
                debug!("clipboard is empty; nothing to type");
                summary.skipped += 1;
            }
            Ok(SessionOutcome::Typed(stats)) => {
                info!(
                    chars = stats.typed,
                    mistakes = stats.mistakes,
                    skipped = stats.skipped,
                    pause_ms = stats.total_pause.as_millis() as u64,
                    "typed clipboard"
                );
                summary.typed += 1;
            }
            Err(err) => {
                warn!("session aborted: {err:#}");
                summary.failed += 1;
            }
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use anyhow::anyhow;
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::mistakes::AdjacentKeyErrors;
    use crate::model::Action;
    use crate::profile::resolve;
    use crate::sink::PlanRecorder;

    struct Presses(usize);

    impl ActivationTrigger for Presses {
        fn wait_for_trigger(&mut self) -> Result<bool> {
            if self.0 == 0 {
                return Ok(false);
            }
            self.0 -= 1;
            Ok(true)
        }
    }

    struct Clips(VecDeque<Result<String>>);

    impl ClipboardSource for Clips {
        fn read_text(&mut self) -> Result<String> {
            self.0.pop_front().unwrap_or_else(|| Ok(String::new()))
        }
    }

    struct BrokenKeyboard;

    impl KeystrokeSink for BrokenKeyboard {
        fn emit(&mut self, _c: char) -> Result<()> {
            Err(anyhow!("keyboard unplugged"))
        }

        fn erase_one(&mut self) -> Result<()> {
            Err(anyhow!("keyboard unplugged"))
        }

        fn pause(&mut self, _duration: std::time::Duration) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn types_each_activation_and_skips_unreadable_or_empty_clipboards() {
        let profile = resolve("normal", 1.0, -1.0).unwrap().with_mistakes(false);
        let mut trigger = Presses(4);
        let mut clipboard = Clips(VecDeque::from([
            Ok("hi\r\n".to_string()),
            Err(anyhow!("no text on clipboard")),
            Ok("\n\n".to_string()),
            Ok("yo".to_string()),
        ]));
        let mut recorder = PlanRecorder::new(&profile);
        let mut rng = StdRng::seed_from_u64(11);

        let summary = run_activation_loop(
            &mut trigger,
            &mut clipboard,
            &mut recorder,
            &profile,
            &AdjacentKeyErrors,
            &mut rng,
        )
        .unwrap();

        assert_eq!(
            summary,
            ListenSummary {
                activations: 4,
                typed: 2,
                skipped: 2,
                failed: 0,
            }
        );

        let typed: String = recorder
            .actions()
            .iter()
            .filter_map(|a| match a {
                Action::Type { ch } => Some(*ch),
                _ => None,
            })
            .collect();
        assert_eq!(typed, "hiyo");
    }

    #[test]
    fn sink_failures_do_not_end_the_loop() {
        let profile = resolve("normal", 1.0, -1.0).unwrap();
        let mut trigger = Presses(2);
        let mut clipboard = Clips(VecDeque::from([Ok("a".to_string()), Ok("b".to_string())]));
        let mut rng = StdRng::seed_from_u64(12);

        let summary = run_activation_loop(
            &mut trigger,
            &mut clipboard,
            &mut BrokenKeyboard,
            &profile,
            &AdjacentKeyErrors,
            &mut rng,
        )
        .unwrap();

        assert_eq!(summary.failed, 2);
        assert_eq!(summary.activations, 2);
    }
}
