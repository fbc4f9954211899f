//! Diff rendering for fixture comparison.

/// Render a text diff between expected and actual output.
///
/// Single-line outputs (the common case) get one hunk; extra lines on either
/// side are shown as pure additions or removals.
#[must_use]
pub fn render_diff(expected: &str, actual: &str) -> String {
    if expected == actual {
        return String::from("[identical]");
    }

    let mut out = String::new();
    out.push_str("--- expected\n");
    out.push_str("+++ actual\n");

    let expected_lines: Vec<&str> = expected.lines().collect();
    let actual_lines: Vec<&str> = actual.lines().collect();
    let longest = expected_lines.len().max(actual_lines.len());

    for i in 0..longest {
        let e = expected_lines.get(i);
        let a = actual_lines.get(i);
        if e == a {
            continue;
        }
        out.push_str(&format!("@@ line {} @@\n", i + 1));
        if let Some(e) = e {
            out.push_str(&format!("-{e}\n"));
        }
        if let Some(a) = a {
            out.push_str(&format!("+{a}\n"));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_outputs() {
        assert_eq!(render_diff("[1, 0]", "[1, 0]"), "[identical]");
    }

    #[test]
    fn single_line_mismatch() {
        let diff = render_diff("3", "4");
        assert_eq!(diff, "--- expected\n+++ actual\n@@ line 1 @@\n-3\n+4\n");
    }

    #[test]
    fn trailing_lines_are_reported() {
        let diff = render_diff("a", "a\nb");
        assert!(diff.contains("@@ line 2 @@\n+b\n"));
        assert!(!diff.contains("-a"));
    }
}
