//! Coaching hints attached to trace steps

use super::classifier::classify;

/// Turn one raw source line into a student-facing hint
pub fn hint(line: &str) -> String {
    let stripped = line.trim();
    let description = classify(stripped);

    let extra = if stripped.starts_with("for ") || stripped.starts_with("while ") {
        "Check that the loop will run the number of times you expect."
    } else if stripped.contains("append(") {
        "Think: which list are you changing and what are you adding to it?"
    } else if stripped.contains("len(") {
        "Ask yourself: what collection are you measuring here?"
    } else if stripped.starts_with("print(") {
        "Check if this prints the information you want the user to see."
    } else if stripped.starts_with("if ")
        || stripped.starts_with("elif ")
        || stripped.starts_with("else")
    {
        "Consider what happens in each branch of this condition."
    } else {
        "Does this step move you closer to your goal (like building the collection or showing results)?"
    };

    format!("At this step, you {}. {}", lowercase_first(&description), extra)
}

fn lowercase_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loop_hint() {
        assert_eq!(
            hint("for i in range(3):"),
            "At this step, you loop over a sequence: for i in range(3):. \
             Check that the loop will run the number of times you expect."
        );
    }

    #[test]
    fn test_hint_strips_indentation() {
        assert_eq!(
            hint("    print(i)"),
            "At this step, you display something to the user: print(i). \
             Check if this prints the information you want the user to see."
        );
    }

    #[test]
    fn test_append_outranks_print() {
        assert!(hint("print(xs.append(1))").ends_with(
            "Think: which list are you changing and what are you adding to it?"
        ));
    }

    #[test]
    fn test_len_hint() {
        assert!(hint("n = len(xs)")
            .ends_with("Ask yourself: what collection are you measuring here?"));
    }

    #[test]
    fn test_branch_hint() {
        assert!(hint("  else:").starts_with("At this step, you handle an alternative case: else:."));
        assert!(hint("else:").ends_with("Consider what happens in each branch of this condition."));
    }

    #[test]
    fn test_blank_line_hint() {
        assert!(hint("   ").starts_with("At this step, you blank line. "));
    }
}
