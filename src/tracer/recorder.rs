//! Step hook that turns step events into [`TraceStep`]s

use crate::analysis::hint;
use crate::interpreter::constants::UNREPRABLE_PLACEHOLDER;
use crate::interpreter::context::{StepEvent, StepHook};
use crate::serialize::{serialize_with, SerializeLimits};
use crate::snapshot::{EnvDiagram, TraceStep};
use indexmap::IndexMap;

/// Records one [`TraceStep`] per executed statement
pub struct TraceRecorder<'a> {
    lines: Vec<&'a str>,
    limits: &'a SerializeLimits,
    steps: Vec<TraceStep>,
}

impl<'a> TraceRecorder<'a> {
    pub fn new(source: &'a str, limits: &'a SerializeLimits) -> Self {
        TraceRecorder {
            lines: source.lines().collect(),
            limits,
            steps: Vec::new(),
        }
    }

    /// Raw text of a 1-based line, empty when out of range
    fn line_text(&self, line: usize) -> &'a str {
        line.checked_sub(1)
            .and_then(|index| self.lines.get(index))
            .copied()
            .unwrap_or("")
    }

    pub fn steps(&self) -> &[TraceStep] {
        &self.steps
    }

    pub fn into_steps(self) -> Vec<TraceStep> {
        self.steps
    }
}

impl StepHook for TraceRecorder<'_> {
    fn on_step(&mut self, event: &StepEvent<'_>) {
        let code = self.line_text(event.line);

        let mut locals = IndexMap::with_capacity(event.bindings.len());
        let mut variables = IndexMap::with_capacity(event.bindings.len());
        for binding in event.bindings {
            let printable = match &binding.printable {
                Ok(text) => text.clone(),
                Err(_) => UNREPRABLE_PLACEHOLDER.to_string(),
            };
            locals.insert(binding.name.clone(), printable);
            variables.insert(
                binding.name.clone(),
                serialize_with(&binding.value, 0, self.limits),
            );
        }

        self.steps.push(TraceStep {
            line: event.line,
            code: code.to_string(),
            locals,
            env: EnvDiagram { variables },
            hint: hint(code),
            output_offset: event.output_len,
        });
    }
}
