//! SQL LIKE pattern matching.
//!
//! Two wildcards are recognized:
//! - `%` matches zero or more characters
//! - `_` matches exactly one character
//!
//! The pattern must match the whole value. Matching is case-sensitive and
//! operates on Unicode scalar values.

/// Returns true if `value` matches the LIKE `pattern`.
///
/// ```
/// use cellsql_core::pattern_match::like;
/// assert!(like("hello", "h%o"));
/// assert!(like("hello", "_ello"));
/// assert!(!like("hello", "world"));
/// ```
pub fn like(value: &str, pattern: &str) -> bool {
    let v: Vec<char> = value.chars().collect();
    let p: Vec<char> = pattern.chars().collect();

    let (mut vi, mut pi) = (0usize, 0usize);
    // Position of the last `%` seen and the value index it was tried at.
    let mut backtrack: Option<(usize, usize)> = None;

    while vi < v.len() {
        match p.get(pi) {
            Some('%') => {
                backtrack = Some((pi, vi));
                pi += 1;
            }
            Some('_') => {
                vi += 1;
                pi += 1;
            }
            Some(&ch) if ch == v[vi] => {
                vi += 1;
                pi += 1;
            }
            _ => match backtrack {
                Some((star, start)) => {
                    // let the last `%` absorb one more character
                    pi = star + 1;
                    vi = start + 1;
                    backtrack = Some((star, start + 1));
                }
                None => return false,
            },
        }
    }

    p[pi..].iter().all(|&c| c == '%')
}
