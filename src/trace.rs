use crate::model::Action;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceEvent {
    /// Print before performing the action at this index.
    pub action_index: usize,
    pub line: String,
}

/// Summarize a plan as console lines: runs of straight typing, and each misclick fix.
///
/// A misclick is a `Type` whose next non-wait action is an `Erase` followed (again
/// skipping waits) by another `Type`.
pub fn plan_console_trace(actions: &[Action]) -> Vec<TraceEvent> {
    let mut events = Vec::new();
    let mut run: Option<(usize, String)> = None;
    let mut idx = 0usize;

    while idx < actions.len() {
        match actions[idx] {
            Action::Wait { .. } => {}
            Action::Type { ch } => {
                if let Some((fix_index, fixed)) = correction_after(actions, idx) {
                    flush_run(&mut run, &mut events);
                    events.push(TraceEvent {
                        action_index: idx,
                        line: format!(
                            "Fix \"{}\" -> \"{}\"...",
                            escape_for_log(&ch.to_string()),
                            escape_for_log(&fixed.to_string())
                        ),
                    });
                    idx = fix_index + 1;
                    continue;
                }
                run.get_or_insert_with(|| (idx, String::new())).1.push(ch);
            }
            Action::Erase => {
                flush_run(&mut run, &mut events);
                events.push(TraceEvent {
                    action_index: idx,
                    line: "Erase...".to_string(),
                });
            }
        }
        idx += 1;
    }

    flush_run(&mut run, &mut events);
    events
}

fn next_non_wait(actions: &[Action], from: usize) -> Option<usize> {
    (from..actions.len()).find(|&i| !matches!(actions[i], Action::Wait { .. }))
}

fn correction_after(actions: &[Action], typed_index: usize) -> Option<(usize, char)> {
    let erase = next_non_wait(actions, typed_index + 1)?;
    if actions[erase] != Action::Erase {
        return None;
    }
    let fix = next_non_wait(actions, erase + 1)?;
    match actions[fix] {
        Action::Type { ch } => Some((fix, ch)),
        _ => None,
    }
}

fn flush_run(run: &mut Option<(usize, String)>, events: &mut Vec<TraceEvent>) {
    if let Some((action_index, text)) = run.take() {
        events.push(TraceEvent {
            action_index,
            line: format!("Typing \"{}\"...", escape_for_log(&text)),
        });
    }
}

fn escape_for_log(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out
}
