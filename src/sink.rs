use std::time::Duration;

use anyhow::Result;

use crate::model::{Action, Plan};
use crate::profile::TypingProfile;

/// Where keystrokes go: a real keyboard backend, or a recorder.
pub trait KeystrokeSink {
    /// Inject one character as if typed.
    fn emit(&mut self, c: char) -> Result<()>;

    /// Remove the most recently emitted unit (a backspace).
    fn erase_one(&mut self) -> Result<()>;

    fn pause(&mut self, duration: Duration) -> Result<()> {
        std::thread::sleep(duration);
        Ok(())
    }

    /// Called once per session, right before the first keystroke.
    fn prepare(&mut self) -> Result<()> {
        Ok(())
    }
}

impl<S: KeystrokeSink + ?Sized> KeystrokeSink for Box<S> {
    fn emit(&mut self, c: char) -> Result<()> {
        (**self).emit(c)
    }

    fn erase_one(&mut self) -> Result<()> {
        (**self).erase_one()
    }

    fn pause(&mut self, duration: Duration) -> Result<()> {
        (**self).pause(duration)
    }

    fn prepare(&mut self) -> Result<()> {
        (**self).prepare()
    }
}

impl<S: KeystrokeSink + ?Sized> KeystrokeSink for &mut S {
    fn emit(&mut self, c: char) -> Result<()> {
        (**self).emit(c)
    }

    fn erase_one(&mut self) -> Result<()> {
        (**self).erase_one()
    }

    fn pause(&mut self, duration: Duration) -> Result<()> {
        (**self).pause(duration)
    }

    fn prepare(&mut self) -> Result<()> {
        (**self).prepare()
    }
}

pub trait ClipboardSource {
    fn read_text(&mut self) -> Result<String>;
}

/// Blocks until the user asks for a session.
pub trait ActivationTrigger {
    /// Returns `false` once the trigger source has shut down.
    fn wait_for_trigger(&mut self) -> Result<bool>;
}

/// Records a session as a [`Plan`] instead of typing it. Pauses are recorded, not slept.
#[derive(Debug, Clone)]
pub struct PlanRecorder {
    plan: Plan,
}

impl PlanRecorder {
    pub fn new(profile: &TypingProfile) -> Self {
        Self {
            plan: Plan::new(profile.clone()),
        }
    }

    pub fn actions(&self) -> &[Action] {
        &self.plan.actions
    }

    pub fn into_plan(self) -> Plan {
        self.plan
    }
}

impl KeystrokeSink for PlanRecorder {
    fn emit(&mut self, c: char) -> Result<()> {
        self.plan.actions.push(Action::Type { ch: c });
        Ok(())
    }

    fn erase_one(&mut self) -> Result<()> {
        self.plan.actions.push(Action::Erase);
        Ok(())
    }

    fn pause(&mut self, duration: Duration) -> Result<()> {
        let ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        // Sub-millisecond pauses only happen at absurd speed multipliers.
        if ms > 0 {
            self.plan.actions.push(Action::Wait { ms });
        }
        Ok(())
    }
}
