//! Output comparison with whitespace-tolerant fallbacks.

/// Decide whether a program's output matches the expected output.
///
/// Three rules are tried in order; the first match wins:
/// 1. Exact equality after trimming leading/trailing whitespace from the
///    whole text.
/// 2. Line-by-line equality after right-trimming each line. Line count and
///    order must match; trailing spaces per line are tolerated.
/// 3. Whitespace-token equality: both texts split on runs of whitespace
///    must yield the same token sequence. Tolerates arbitrary spacing and
///    newline formatting but stays order- and value-sensitive.
pub fn outputs_match(expected: &str, actual: &str) -> bool {
    let expected = expected.trim();
    let actual = actual.trim();

    if expected == actual {
        return true;
    }

    let expected_lines: Vec<&str> = expected.split('\n').map(str::trim_end).collect();
    let actual_lines: Vec<&str> = actual.split('\n').map(str::trim_end).collect();
    if expected_lines == actual_lines {
        return true;
    }

    let expected_tokens: Vec<&str> = expected.split_whitespace().collect();
    let actual_tokens: Vec<&str> = actual.split_whitespace().collect();
    expected_tokens == actual_tokens
}
