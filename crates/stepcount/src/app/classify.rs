//! Heuristic classification of source lines into logical steps.

use once_cell::sync::Lazy;
use regex::Regex;

/// Keyword prefixes that mark a control-flow or definition line across the
/// covered languages.
const KEYWORDS: &[&str] = &[
    "if ", "for ", "while ", "def ", "function ", "return ", "with ", "class ", "switch ",
    "case ", "else", "try", "except ", "catch ", "fn ",
];

/// Prefixes that mark a comment line.
const COMMENT_MARKERS: &[&str] = &["#", "//", "*", "/*", "*/"];

static CALL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\w+\(").expect("call pattern compiles"));

/// Decide whether one line of source text counts as a logical step.
///
/// Rules are applied in order to the whitespace-trimmed line and the first
/// match wins: comment markers, keyword prefixes, an `=` anywhere but at the
/// start, a call-like `ident(` at the start, a `;` anywhere. Purely
/// surface-syntax: a comparison `a == b` or a string literal containing `=`
/// counts as a step. That imprecision is accepted, not a bug.
pub fn is_logical_line(line: &str) -> bool {
    let stripped = line.trim();
    if stripped.is_empty() {
        return false;
    }
    if COMMENT_MARKERS
        .iter()
        .any(|marker| stripped.starts_with(marker))
    {
        return false;
    }
    if KEYWORDS.iter().any(|keyword| stripped.starts_with(keyword)) {
        return true;
    }
    if stripped.contains('=') && !stripped.starts_with('=') {
        return true;
    }
    if CALL_PATTERN.is_match(stripped) {
        return true;
    }
    stripped.contains(';')
}

/// Count the logical steps among the provided lines.
pub fn count_logical_lines<'a, I>(lines: I) -> usize
where
    I: IntoIterator<Item = &'a str>,
{
    lines.into_iter().filter(|line| is_logical_line(line)).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_lines_are_not_steps() {
        assert!(!is_logical_line(""));
        assert!(!is_logical_line("   "));
        assert!(!is_logical_line("\t\t"));
        assert!(!is_logical_line("\u{a0} \u{a0}"));
    }

    #[test]
    fn comment_markers_win_over_every_other_rule() {
        assert!(!is_logical_line("# x = 5"));
        assert!(!is_logical_line("// if x > 0 {"));
        assert!(!is_logical_line("* return early;"));
        assert!(!is_logical_line("/* for i in xs */"));
        assert!(!is_logical_line("*/"));
    }

    #[test]
    fn keyword_prefixes_are_steps() {
        assert!(is_logical_line("if x > 0:"));
        assert!(is_logical_line("for item in items:"));
        assert!(is_logical_line("while true {"));
        assert!(is_logical_line("def main():"));
        assert!(is_logical_line("function run() {"));
        assert!(is_logical_line("return 0"));
        assert!(is_logical_line("with open(path) as f:"));
        assert!(is_logical_line("class Foo:"));
        assert!(is_logical_line("switch (x) {"));
        assert!(is_logical_line("case 1:"));
        assert!(is_logical_line("else:"));
        assert!(is_logical_line("try {"));
        assert!(is_logical_line("except ValueError:"));
        assert!(is_logical_line("catch (err) {"));
        assert!(is_logical_line("fn main() {"));
    }

    #[test]
    fn assignments_are_steps_unless_leading_equals() {
        assert!(is_logical_line("x = 5"));
        assert!(is_logical_line("    total += 1"));
        assert!(!is_logical_line("= 5"));
    }

    #[test]
    fn comparisons_count_as_assignments_by_design() {
        // Documented limitation: `==` satisfies the `=` rule.
        assert!(is_logical_line("a == b"));
        assert!(is_logical_line("print(\"x = y\")"));
    }

    #[test]
    fn call_pattern_must_start_the_line() {
        assert!(is_logical_line("foo(1,2)"));
        assert!(is_logical_line("foo_bar(x)"));
        assert!(!is_logical_line("a foo(1,2)"));
    }

    #[test]
    fn statement_terminators_are_steps() {
        assert!(is_logical_line("done;"));
        assert!(is_logical_line("break;"));
    }

    #[test]
    fn bare_words_are_not_steps() {
        assert!(!is_logical_line("pass"));
        assert!(!is_logical_line("done"));
        assert!(!is_logical_line("{"));
        assert!(!is_logical_line("}"));
    }

    #[test]
    fn counts_logical_lines_across_a_snippet() {
        let snippet = ["def add(a, b):", "    # sum two values", "    return a + b", ""];
        assert_eq!(count_logical_lines(snippet), 2);
    }
}
