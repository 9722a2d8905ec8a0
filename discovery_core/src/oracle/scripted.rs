//! Scripted in-memory oracle for tests.

use std::collections::{HashMap, VecDeque};

use super::{Oracle, OracleError, ResolutionOutcome};

/// One scripted answer.
#[derive(Debug, Clone)]
pub enum Step {
    Found(&'static str, &'static str),
    Empty,
    Fail,
}

/// Answers pairs from a per-pair script; unscripted pairs are `Empty`.
///
/// A pair's last step repeats once the script runs out.
#[derive(Debug, Default)]
pub struct ScriptedOracle {
    scripts: HashMap<(String, String), VecDeque<Step>>,
    pub calls: Vec<(String, String)>,
}

fn pair(first: &str, second: &str) -> (String, String) {
    if first <= second {
        (first.to_string(), second.to_string())
    } else {
        (second.to_string(), first.to_string())
    }
}

impl ScriptedOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the answers for an unordered pair.
    pub fn with(mut self, first: &str, second: &str, steps: impl IntoIterator<Item = Step>) -> Self {
        self.scripts
            .insert(pair(first, second), steps.into_iter().collect());
        self
    }

    /// Number of calls made for an unordered pair.
    pub fn calls_for(&self, first: &str, second: &str) -> usize {
        let wanted = pair(first, second);
        self.calls
            .iter()
            .filter(|(a, b)| pair(a, b) == wanted)
            .count()
    }
}

impl Oracle for ScriptedOracle {
    fn resolve(&mut self, first: &str, second: &str) -> ResolutionOutcome {
        self.calls.push((first.to_string(), second.to_string()));

        let step = match self.scripts.get_mut(&pair(first, second)) {
            Some(script) if script.len() > 1 => script.pop_front(),
            Some(script) => script.front().cloned(),
            None => None,
        };

        match step {
            Some(Step::Found(result, glyph)) => ResolutionOutcome::found(result, glyph),
            Some(Step::Fail) => ResolutionOutcome::Failed(OracleError::Protocol { status: 503 }),
            Some(Step::Empty) | None => ResolutionOutcome::Empty,
        }
    }
}
