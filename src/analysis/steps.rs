//! Static outline ("algorithm steps") of a submission

use super::classifier::classify;
use serde::Serialize;

/// One non-blank, non-comment source line and its description
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlgorithmStep {
    /// 1-based line number in the original text
    pub line: usize,
    /// Raw line, original whitespace included
    pub code: String,
    pub description: String,
}

/// Outline every meaningful line of `source`; never executes it
pub fn extract_steps(source: &str) -> Vec<AlgorithmStep> {
    source
        .lines()
        .enumerate()
        .filter_map(|(index, raw)| {
            let stripped = raw.trim();
            if stripped.is_empty() || stripped.starts_with('#') {
                return None;
            }
            Some(AlgorithmStep {
                line: index + 1,
                code: raw.to_string(),
                description: classify(stripped),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = "# tally\nxs = []\n\nfor i in range(3):\n    # keep it\n    xs.append(i)\nprint(xs)\n";

    #[test]
    fn test_skips_blank_and_comment_lines() {
        let steps = extract_steps(SOURCE);
        let lines: Vec<usize> = steps.iter().map(|s| s.line).collect();
        assert_eq!(lines, vec![2, 4, 6, 7]);
    }

    #[test]
    fn test_preserves_raw_code() {
        let steps = extract_steps(SOURCE);
        assert_eq!(steps[2].code, "    xs.append(i)");
        assert_eq!(steps[2].description, "Compute or update something: xs.append(i)");
        assert_eq!(steps[1].description, "Loop over a sequence: for i in range(3):");
    }

    #[test]
    fn test_idempotent() {
        assert_eq!(extract_steps(SOURCE), extract_steps(SOURCE));
    }

    #[test]
    fn test_empty_source() {
        assert!(extract_steps("").is_empty());
        assert!(extract_steps("\n\n   \n# only comments").is_empty());
    }

    #[test]
    fn test_invalid_program_still_outlines() {
        let steps = extract_steps("def broken(:\n    pass");
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].description, "Define a function: def broken(:");
    }

    #[test]
    fn test_crlf_line_endings() {
        let steps = extract_steps("x = 1\r\nprint(x)\r\n");
        assert_eq!(steps[1].code, "print(x)");
        assert_eq!(steps[1].line, 2);
    }
}
