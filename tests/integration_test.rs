// End-to-end tests for traced runs

use std::thread;
use std::time::Duration;

use stepwise::interpreter::ExecutionLimits;
use stepwise::{extract_steps, run, Report, Tracer, TracerConfig};

fn lines(source: &str) -> Vec<usize> {
    run(source).trace.iter().map(|step| step.line).collect()
}

#[test]
fn test_assignment_then_print() {
    let result = run("x = 1\nprint(x)");

    assert_eq!(result.trace.len(), 2);
    assert_eq!(result.output, "1\n");
    assert_eq!(result.error, "");

    assert_eq!(result.trace[0].line, 1);
    assert_eq!(result.trace[0].code, "x = 1");
    assert!(result.trace[0].locals.is_empty());
    assert_eq!(result.trace[1].locals["x"], "1");
    assert_eq!(result.trace[1].env.variables["x"].type_name(), "int");
}

#[test]
fn test_for_loop_steps() {
    let result = run("for i in range(3):\n    print(i)");

    assert_eq!(result.trace.len(), 4);
    assert_eq!(result.output, "0\n1\n2\n");
    assert!(result.is_success());
    assert_eq!(lines("for i in range(3):\n    print(i)"), vec![1, 2, 2, 2]);
    assert_eq!(result.trace[3].locals["i"], "2");
}

#[test]
fn test_division_by_zero_summary() {
    let result = run("x = 1 / 0");

    assert_eq!(result.trace.len(), 1);
    assert_eq!(result.output, "");
    assert_eq!(
        result.error,
        "Traceback (most recent call last):\n  File \"<submission>\", line 1, in <module>\nZeroDivisionError: division by zero\n"
    );
}

#[test]
fn test_output_before_failure_is_kept() {
    let result = run("print('start')\nitems = [1, 2]\nprint(items[5])\n");
    assert_eq!(result.output, "start\n");
    assert!(result.error.ends_with("IndexError: list index out of range\n"));
    assert!(result.error.contains("line 3, in <module>"));
    assert_eq!(result.trace.len(), 3);
}

#[test]
fn test_function_frames_are_traced() {
    let source = "def add(a, b):\n    total = a + b\n    return total\nprint(add(2, 3))\n";
    let result = run(source);

    assert_eq!(result.output, "5\n");
    assert_eq!(lines(source), vec![1, 4, 2, 3]);

    let inside: Vec<&str> = result.trace[2].locals.keys().map(String::as_str).collect();
    assert_eq!(inside, vec!["a", "b"]);
    assert_eq!(result.trace[3].locals["total"], "5");
    assert!(result.trace[1].locals["add"].starts_with("<function add at 0x"));
}

#[test]
fn test_error_inside_function_names_scope() {
    let result = run("def first():\n    return [][1]\nfirst()\n");
    assert_eq!(
        result.error,
        "Traceback (most recent call last):\n  File \"<submission>\", line 2, in first\nIndexError: list index out of range\n"
    );
}

#[test]
fn test_reserved_names_are_hidden() {
    let result = run("__secret = 1\nvisible = 2\npass\n");
    let names: Vec<&str> = result.trace[2].locals.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["visible"]);
}

#[test]
fn test_json_payload_shape() {
    let report = Report::build("xs = [1, 'a']\nprint(len(xs))\n");
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["output"], "2\n");
    assert_eq!(json["error"], "");
    assert_eq!(json["trace"].as_array().unwrap().len(), 2);
    assert_eq!(json["algorithmic_steps"].as_array().unwrap().len(), 2);

    let step = &json["trace"][1];
    let mut keys: Vec<&str> = step.as_object().unwrap().keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(keys, vec!["code", "env", "hint", "line", "locals"]);

    assert_eq!(step["locals"]["xs"], "[1, 'a']");
    assert_eq!(
        step["env"]["variables"]["xs"],
        serde_json::json!({
            "type": "list",
            "length": 2,
            "elements": [
                {"type": "int", "value": 1},
                {"type": "str", "value": "a"}
            ]
        })
    );
    assert_eq!(
        step["hint"],
        "At this step, you display something to the user: print(len(xs)). Ask yourself: what collection are you measuring here?"
    );
    assert_eq!(
        json["algorithmic_steps"][0],
        serde_json::json!({
            "line": 1,
            "code": "xs = [1, 'a']",
            "description": "Compute or update something: xs = [1, 'a']"
        })
    );
}

#[test]
fn test_serialized_dict_and_long_text() {
    let source = format!("d = {{'k': 1, 2: 'two'}}\ns = '{}'\npass\n", "a".repeat(41));
    let result = run(&source);
    let env = serde_json::to_value(&result.trace[2].env).unwrap();

    assert_eq!(
        env["variables"]["d"],
        serde_json::json!({"type": "dict", "fields": {"k": {"type": "int", "value": 1}, "2": {"type": "str", "value": "two"}}})
    );
    let text = env["variables"]["s"]["value"].as_str().unwrap();
    assert_eq!(text.chars().count(), 40);
    assert!(text.ends_with("..."));
}

#[test]
fn test_step_limit_keeps_partial_trace() {
    let tracer = Tracer::new(TracerConfig {
        limits: ExecutionLimits {
            max_steps: 50,
            ..ExecutionLimits::default()
        },
        ..TracerConfig::default()
    });
    let result = tracer.run("n = 0\nwhile True:\n    n += 1\n");

    assert_eq!(result.trace.len(), 50);
    assert!(result.error.contains("StepLimitExceeded: execution stopped after 50 steps"));
    assert!(result.error.starts_with("Traceback (most recent call last):\n"));
}

#[test]
fn test_time_limit() {
    let tracer = Tracer::new(TracerConfig {
        limits: ExecutionLimits {
            max_steps: u64::MAX,
            timeout: Duration::from_millis(50),
            ..ExecutionLimits::default()
        },
        ..TracerConfig::default()
    });
    let result = tracer.run("while True:\n    pass\n");
    assert!(result.error.contains("TimeLimitExceeded"));
    assert!(!result.trace.is_empty());
}

#[test]
fn test_failing_repr_uses_placeholder() {
    let source = "class Bad:\n    def __repr__(self):\n        raise ValueError('no')\nb = Bad()\nprint('ok')\n";
    let result = run(source);

    assert!(result.is_success(), "{}", result.error);
    assert_eq!(result.output, "ok\n");
    let last = result.trace.last().unwrap();
    assert_eq!(last.line, 5);
    assert_eq!(last.locals["b"], "<unrepr-able>");
    assert_eq!(last.env.variables["b"].type_name(), "Bad");
    // The __repr__ body ran while printing bindings and is not part of the trace
    assert!(result.trace.iter().all(|step| step.line != 3));
}

#[test]
fn test_runaway_repr_does_not_consume_the_program_budget() {
    let source = "class Loop:\n    def __repr__(self):\n        while True:\n            pass\nx = Loop()\nprint('ok')\ny = 2\n";
    let result = run(source);

    assert!(result.is_success(), "{}", result.error);
    assert_eq!(result.output, "ok\n");
    assert_eq!(lines(source), vec![1, 2, 5, 6, 7]);
    let last = result.trace.last().unwrap();
    assert_eq!(last.locals["x"], "<unrepr-able>");
}

#[test]
fn test_failure_after_first_step_keeps_it() {
    let result = run("x = 1\nprint(f'{1.0:.99999}')");
    assert_eq!(result.trace.len(), 2);
    assert_eq!(result.trace[0].code, "x = 1");
    assert_eq!(result.trace[1].locals["x"], "1");
    assert!(result.error.contains("line 2, in <module>"));
    assert!(result.error.ends_with("ValueError: precision too big\n"));
}

#[test]
fn test_output_survives_a_late_failure() {
    let result = run("print('first')\nprint('%99999999999d' % 1)\n");
    assert_eq!(result.output, "first\n");
    assert_eq!(result.trace.len(), 2);
    assert!(result.error.ends_with("MemoryError\n"));
}

#[test]
fn test_custom_repr_is_used_for_locals() {
    let source = "class P:\n    def __init__(self, x):\n        self.x = x\n    def __repr__(self):\n        return f'P({self.x})'\np = P(3)\npass\n";
    let result = run(source);
    assert_eq!(result.trace.last().unwrap().locals["p"], "P(3)");
}

#[test]
fn test_cyclic_list_prints_and_serializes() {
    let result = run("xs = [1]\nxs.append(xs)\nprint(xs)\n");
    assert!(result.is_success());
    assert_eq!(result.output, "[1, [...]]\n");
    assert_eq!(result.trace[2].locals["xs"], "[1, [...]]");
}

#[test]
fn test_syntax_error_summary() {
    let result = run("x = 1\ny = = 2\n");
    assert!(result.trace.is_empty());
    assert_eq!(result.output, "");
    assert!(result.error.starts_with("  File \"<submission>\", line 2\n    y = = 2\n"));
    assert!(result.error.contains("SyntaxError: "));
}

#[test]
fn test_indentation_error_summary() {
    let result = run("if True:\nprint(1)\n");
    assert!(result.trace.is_empty());
    assert!(result.error.contains("IndentationError: "));
}

#[test]
fn test_recursion_limit() {
    let result = run("def down(n):\n    return down(n + 1)\ndown(0)\n");
    assert!(result
        .error
        .ends_with("RecursionError: maximum recursion depth exceeded\n"));
    assert!(result.error.contains("in down"));
}

#[test]
fn test_input_reads_configured_lines() {
    let tracer = Tracer::new(TracerConfig {
        stdin: vec!["3".to_string(), "4".to_string()],
        ..TracerConfig::default()
    });
    let result = tracer.run("a = int(input('a? '))\nb = int(input('b? '))\nprint(a * b)\ninput()\n");
    assert_eq!(result.output, "a? b? 12\n");
    assert!(result.error.ends_with("EOFError: EOF when reading a line\n"));
}

#[test]
fn test_output_offsets_replay_output() {
    let result = run("print('a')\nprint('b')\nx = 1\n");
    let offsets: Vec<usize> = result.trace.iter().map(|step| step.output_offset).collect();
    assert_eq!(offsets, vec![0, 2, 4]);
    assert_eq!(result.output_before(&result.trace[1]), "a\n");
}

#[test]
fn test_concurrent_runs_are_independent() {
    let handles: Vec<_> = (0..4)
        .map(|n| {
            thread::spawn(move || {
                let source = format!("for i in range({}):\n    print(i * {})\n", n + 1, n);
                (n, run(&source))
            })
        })
        .collect();

    for handle in handles {
        let (n, result) = handle.join().unwrap();
        assert_eq!(result.trace.len(), n + 2);
        let expected: String = (0..=n).map(|i| format!("{}\n", i * n)).collect();
        assert_eq!(result.output, expected);
    }
}

#[test]
fn test_extract_steps_is_static_and_idempotent() {
    let source = "# outline\nx = int(input())\n\nwhile x > 0:\n    x -= 1\nelse:\n    print('done')\n";
    let first = extract_steps(source);
    assert_eq!(first, extract_steps(source));

    let numbered: Vec<usize> = first.iter().map(|step| step.line).collect();
    assert_eq!(numbered, vec![2, 4, 5, 6, 7]);
    assert_eq!(first[0].description, "Get input from the user: x = int(input())");
    assert_eq!(first[2].code, "    x -= 1");
    assert_eq!(first[3].description, "Handle an alternative case: else:");
}
