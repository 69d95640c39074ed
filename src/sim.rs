use crate::model::{Action, Plan};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlanStats {
    pub actions: usize,
    pub keystrokes: usize,
    pub erases: usize,
    pub total_wait_ms: u64,
}

pub fn stats(plan: &Plan) -> PlanStats {
    let mut out = PlanStats {
        actions: plan.actions.len(),
        ..Default::default()
    };

    for a in &plan.actions {
        match a {
            Action::Wait { ms } => {
                out.total_wait_ms = out.total_wait_ms.saturating_add(*ms);
            }
            Action::Type { .. } => out.keystrokes += 1,
            Action::Erase => out.erases += 1,
        }
    }

    out
}

/// Simulate the text left in an editor after a plan is played.
///
/// Intended for tests/debugging. Erase on an empty buffer is a no-op, as a
/// backspace at the start of a document would be.
pub fn simulate_typed_text(plan: &Plan) -> String {
    let mut buf: Vec<char> = Vec::new();

    for action in &plan.actions {
        match action {
            Action::Type { ch } => buf.push(*ch),
            Action::Erase => {
                buf.pop();
            }
            Action::Wait { .. } => {}
        }
    }

    buf.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::resolve;

    fn plan(actions: Vec<Action>) -> Plan {
        let mut plan = Plan::new(resolve("normal", 1.0, -1.0).unwrap());
        plan.actions = actions;
        plan
    }

    #[test]
    fn stats_count_each_action_kind() {
        let p = plan(vec![
            Action::Wait { ms: 200 },
            Action::Type { ch: 'r' },
            Action::Wait { ms: 30 },
            Action::Erase,
            Action::Type { ch: 't' },
        ]);
        assert_eq!(
            stats(&p),
            PlanStats {
                actions: 5,
                keystrokes: 2,
                erases: 1,
                total_wait_ms: 230,
            }
        );
    }

    #[test]
    fn erase_removes_the_last_typed_char() {
        let p = plan(vec![
            Action::Erase,
            Action::Type { ch: 'h' },
            Action::Type { ch: 'o' },
            Action::Erase,
            Action::Type { ch: 'i' },
        ]);
        assert_eq!(simulate_typed_text(&p), "hi");
    }
}
