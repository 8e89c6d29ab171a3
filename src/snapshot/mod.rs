// Per-step snapshots of a traced run and the payloads built from them

use crate::analysis::steps::{extract_steps, AlgorithmStep};
use crate::serialize::SerializedValue;
use crate::tracer::Tracer;
use indexmap::IndexMap;
use serde::Serialize;

/// In-memory stand-in for the guest's standard output
#[derive(Debug, Clone, Default)]
pub struct OutputBuffer {
    text: String,
}

impl OutputBuffer {
    pub fn new() -> Self {
        OutputBuffer::default()
    }

    /// Append text exactly as the guest wrote it
    pub fn write(&mut self, text: &str) {
        self.text.push_str(text);
    }

    /// Bytes written so far
    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn contents(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

/// Structured bindings of one step, keyed by variable name
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EnvDiagram {
    pub variables: IndexMap<String, SerializedValue>,
}

/// State captured immediately before one statement ran
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceStep {
    /// 1-based line of the statement about to run
    pub line: usize,
    /// Raw source text of that line (empty if out of range)
    pub code: String,
    /// Printable form of each binding
    pub locals: IndexMap<String, String>,
    pub env: EnvDiagram,
    pub hint: String,
    /// Bytes of output written before this step
    #[serde(skip)]
    pub output_offset: usize,
}

/// Outcome of one traced run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunResult {
    pub trace: Vec<TraceStep>,
    pub output: String,
    /// Failure summary, empty on success
    pub error: String,
}

impl RunResult {
    pub fn is_success(&self) -> bool {
        self.error.is_empty()
    }

    /// Output the program had written when `step` was recorded
    pub fn output_before(&self, step: &TraceStep) -> &str {
        let end = step.output_offset.min(self.output.len());
        self.output.get(..end).unwrap_or(&self.output)
    }
}

/// Combined payload: the traced run plus the static outline of the source
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Report {
    #[serde(flatten)]
    pub run: RunResult,
    pub algorithmic_steps: Vec<AlgorithmStep>,
}

impl Report {
    /// Trace `source` with default settings and outline it
    pub fn build(source: &str) -> Report {
        Self::build_with(&Tracer::default(), source)
    }

    pub fn build_with(tracer: &Tracer, source: &str) -> Report {
        Report {
            run: tracer.run(source),
            algorithmic_steps: extract_steps(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_buffer_tracks_length() {
        let mut output = OutputBuffer::new();
        assert!(output.is_empty());
        output.write("héllo");
        output.write("\n");
        assert_eq!(output.len(), "héllo\n".len());
        assert_eq!(output.into_string(), "héllo\n");
    }

    #[test]
    fn test_output_before_step() {
        let step = TraceStep {
            line: 2,
            code: "print(x)".to_string(),
            locals: IndexMap::new(),
            env: EnvDiagram::default(),
            hint: String::new(),
            output_offset: 2,
        };
        let result = RunResult {
            trace: vec![step.clone()],
            output: "1\n2\n".to_string(),
            error: String::new(),
        };
        assert_eq!(result.output_before(&step), "1\n");
        assert!(result.is_success());
    }

    #[test]
    fn test_report_payload_fields() {
        let report = Report {
            run: RunResult::default(),
            algorithmic_steps: Vec::new(),
        };
        let json = serde_json::to_value(&report).unwrap();
        let object = json.as_object().unwrap();
        let mut keys: Vec<&str> = object.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, vec!["algorithmic_steps", "error", "output", "trace"]);
    }
}
