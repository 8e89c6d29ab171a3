//! Static line classifier

/// Describe what a stripped source line does; first matching rule wins
pub fn classify(line: &str) -> String {
    let category = if line.starts_with("for ") {
        "Loop over a sequence"
    } else if line.starts_with("while ") {
        "Repeat while a condition is true"
    } else if line.starts_with("if ") {
        "Check a condition and branch"
    } else if line.starts_with("elif ") || line.starts_with("else") {
        "Handle an alternative case"
    } else if line.starts_with("def ") {
        "Define a function"
    } else if line.starts_with("class ") {
        "Define a class (data + behavior)"
    } else if line.contains("input(") {
        "Get input from the user"
    } else if line.starts_with("print(") {
        "Display something to the user"
    } else if line.is_empty() {
        return "Blank line".to_string();
    } else {
        "Compute or update something"
    };

    format!("{}: {}", category, line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_flow_lines() {
        assert_eq!(classify("for x in xs:"), "Loop over a sequence: for x in xs:");
        assert_eq!(
            classify("while n > 0:"),
            "Repeat while a condition is true: while n > 0:"
        );
        assert_eq!(classify("if x:"), "Check a condition and branch: if x:");
        assert_eq!(classify("elif y:"), "Handle an alternative case: elif y:");
        assert_eq!(classify("else:"), "Handle an alternative case: else:");
    }

    #[test]
    fn test_definitions() {
        assert_eq!(classify("def f():"), "Define a function: def f():");
        assert_eq!(
            classify("class Card:"),
            "Define a class (data + behavior): class Card:"
        );
    }

    #[test]
    fn test_input_outranks_print() {
        assert_eq!(
            classify("print(input('name? '))"),
            "Get input from the user: print(input('name? '))"
        );
        assert_eq!(classify("print(x)"), "Display something to the user: print(x)");
    }

    #[test]
    fn test_fallbacks() {
        assert_eq!(classify(""), "Blank line");
        assert_eq!(classify("x = 1"), "Compute or update something: x = 1");
        // Prefix rules need the trailing space
        assert_eq!(classify("format = 3"), "Compute or update something: format = 3");
        assert_eq!(classify("iffy = 1"), "Compute or update something: iffy = 1");
    }

    #[test]
    fn test_else_prefix_is_loose() {
        assert_eq!(
            classify("elsewhere = 2"),
            "Handle an alternative case: elsewhere = 2"
        );
    }
}
