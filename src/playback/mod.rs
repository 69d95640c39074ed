pub mod backends;
pub(crate) mod util;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use tracing::{debug, warn};

use crate::model::{Action, Plan, PLAN_VERSION};
use crate::sink::{ActivationTrigger, KeystrokeSink};
use crate::trace::plan_console_trace;

pub use util::countdown;
use util::{print_trace_line, Interruptible};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackBackend {
    Auto,
    X11,
}

fn env_is_set(name: &str) -> bool {
    std::env::var_os(name)
        .map(|v| !v.is_empty())
        .unwrap_or(false)
}

fn auto_backend() -> PlaybackBackend {
    // Xwayland sessions export DISPLAY too; XTEST works for X11 clients there.
    if env_is_set("DISPLAY") {
        return PlaybackBackend::X11;
    }

    // Unknown/unsupported environment.
    PlaybackBackend::Auto
}

fn backend_unavailable_message() -> String {
    let xdg_session_type = std::env::var("XDG_SESSION_TYPE").unwrap_or_default();

    let mut parts = Vec::new();

    if env_is_set("WAYLAND_DISPLAY") {
        parts.push("WAYLAND_DISPLAY is set".to_string());
    }
    if env_is_set("DISPLAY") {
        parts.push("DISPLAY is set".to_string());
    }
    if !xdg_session_type.is_empty() {
        parts.push(format!("XDG_SESSION_TYPE={xdg_session_type}"));
    }

    if parts.is_empty() {
        "No display session detected (expected the DISPLAY environment variable).".to_string()
    } else {
        format!("Detected environment: {}", parts.join(", "))
    }
}

fn require_supported_backend(
    #[allow(unused_variables)] selected: PlaybackBackend,
    resolved: PlaybackBackend,
) -> Result<()> {
    match resolved {
        PlaybackBackend::X11 => {
            #[cfg(feature = "x11")]
            {
                Ok(())
            }

            #[cfg(not(feature = "x11"))]
            {
                let how = match selected {
                    PlaybackBackend::Auto => "detected",
                    _ => "requested",
                };
                Err(anyhow!(
                    "X11 backend {how} but is disabled in this build. (Rebuild with `--features x11`.) {details}",
                    how = how,
                    details = backend_unavailable_message()
                ))
            }
        }
        PlaybackBackend::Auto => {
            let hint = if cfg!(feature = "x11") {
                "Run inside an X11 (or Xwayland) session, or pass --backend x11 with DISPLAY set."
            } else {
                "This build has no keyboard backends enabled."
            };

            Err(anyhow!(
                "No supported keyboard backend detected. {details}\n{hint}",
                details = backend_unavailable_message(),
                hint = hint,
            ))
        }
    }
}

pub fn resolve_backend(requested: PlaybackBackend) -> Result<PlaybackBackend> {
    let resolved = match requested {
        PlaybackBackend::Auto => auto_backend(),
        other => other,
    };

    require_supported_backend(requested, resolved)?;
    Ok(resolved)
}

/// Connect the keystroke sink for a backend.
pub fn open_keyboard(backend: PlaybackBackend) -> Result<Box<dyn KeystrokeSink>> {
    match resolve_backend(backend)? {
        PlaybackBackend::X11 => {
            #[cfg(feature = "x11")]
            {
                Ok(Box::new(backends::x11::X11Keyboard::connect()?))
            }

            #[cfg(not(feature = "x11"))]
            {
                Err(anyhow!(
                    "X11 backend is disabled in this build (rebuild with `--features x11`)."
                ))
            }
        }
        PlaybackBackend::Auto => Err(anyhow!("no backend resolved")),
    }
}

/// Grab the global activation hotkey (Shift+Space) for a backend.
pub fn open_hotkey(
    backend: PlaybackBackend,
    #[allow(unused_variables)] stop: Arc<AtomicBool>,
) -> Result<Box<dyn ActivationTrigger>> {
    match resolve_backend(backend)? {
        PlaybackBackend::X11 => {
            #[cfg(feature = "x11")]
            {
                Ok(Box::new(crate::hotkey::X11Hotkey::grab_shift_space(stop)?))
            }

            #[cfg(not(feature = "x11"))]
            {
                Err(anyhow!(
                    "X11 backend is disabled in this build (rebuild with `--features x11`)."
                ))
            }
        }
        PlaybackBackend::Auto => Err(anyhow!("no backend resolved")),
    }
}

/// Install a Ctrl+C handler. The first press sets the returned flag; a second press exits.
pub fn install_stop_handler() -> Result<Arc<AtomicBool>> {
    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = stop.clone();
        ctrlc::set_handler(move || {
            if stop.swap(true, Ordering::SeqCst) {
                std::process::exit(130);
            }
        })
        .context("failed to install Ctrl+C handler")?;
    }
    Ok(stop)
}

/// Perform a recorded plan's actions against `sink`, in order.
///
/// Checks `stop` between actions and fails with "aborted" once it is set.
pub fn replay<S: KeystrokeSink>(
    plan: &Plan,
    mut sink: S,
    stop: &AtomicBool,
    trace: bool,
) -> Result<()> {
    if plan.version != PLAN_VERSION {
        return Err(anyhow!(
            "unsupported plan version {}; expected {PLAN_VERSION}",
            plan.version
        ));
    }

    sink.prepare()?;

    let trace_events = trace.then(|| plan_console_trace(&plan.actions));
    let mut next_trace_event = 0usize;

    for (action_index, action) in plan.actions.iter().enumerate() {
        if stop.load(Ordering::SeqCst) {
            return Err(anyhow!("aborted"));
        }

        if let Some(events) = &trace_events {
            while next_trace_event < events.len()
                && events[next_trace_event].action_index == action_index
            {
                print_trace_line(&events[next_trace_event].line);
                next_trace_event += 1;
            }
        }

        match action {
            Action::Wait { ms } => sink.pause(Duration::from_millis(*ms))?,
            Action::Type { ch } => sink
                .emit(*ch)
                .with_context(|| format!("failed to type {ch:?} (action_index={action_index})"))?,
            Action::Erase => sink
                .erase_one()
                .with_context(|| format!("failed to erase (action_index={action_index})"))?,
        }
    }

    if stop.load(Ordering::SeqCst) {
        return Err(anyhow!("aborted"));
    }

    Ok(())
}

/// Play a plan into the focused window after a countdown. Ctrl+C aborts between actions.
pub fn play_plan(
    plan: &Plan,
    countdown_secs: u64,
    trace: bool,
    backend: PlaybackBackend,
) -> Result<()> {
    let stop = install_stop_handler()?;
    let keyboard = open_keyboard(backend)?;

    if !countdown(stop.as_ref(), countdown_secs) {
        return Err(anyhow!("aborted"));
    }

    debug!(actions = plan.actions.len(), profile = %plan.profile.name, "replaying plan");
    let sink = Interruptible {
        inner: keyboard,
        stop: stop.as_ref(),
    };
    let result = replay(plan, sink, stop.as_ref(), trace);
    if let Err(err) = &result {
        warn!("playback stopped: {err:#}");
    }
    result
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::profile::resolve;
    use crate::sink::PlanRecorder;

    fn sample_plan() -> Plan {
        let mut plan = Plan::new(resolve("fast", 1.0, -1.0).unwrap());
        plan.actions = vec![
            Action::Wait { ms: 3 },
            Action::Type { ch: 'ф' },
            Action::Erase,
            Action::Type { ch: 'а' },
        ];
        plan
    }

    #[test]
    fn replay_into_a_recorder_reproduces_the_plan() {
        let plan = sample_plan();
        let mut recorder = PlanRecorder::new(&plan.profile);
        replay(&plan, &mut recorder, &AtomicBool::new(false), false).unwrap();
        assert_eq!(recorder.into_plan(), plan);
    }

    #[test]
    fn replay_stops_before_the_first_action_when_aborted() {
        let plan = sample_plan();
        let mut recorder = PlanRecorder::new(&plan.profile);
        let err = replay(&plan, &mut recorder, &AtomicBool::new(true), false).unwrap_err();
        assert_eq!(err.to_string(), "aborted");
        assert!(recorder.actions().is_empty());
    }

    #[test]
    fn replay_rejects_unknown_plan_versions() {
        let mut plan = sample_plan();
        plan.version = 99;
        let mut recorder = PlanRecorder::new(&plan.profile);
        assert!(replay(&plan, &mut recorder, &AtomicBool::new(false), false).is_err());
    }
}
