//! Glob-like matching of segment paths.
//!
//! Rules, applied per segment:
//!
//! - `*` matches exactly one path segment, whatever its content.
//! - `**` matches zero or more consecutive segments.
//! - Anything else, the empty string included, matches only itself.
//!
//! A pattern without `**` that is shorter than the path matches as a prefix;
//! one that is longer never matches. Patterns containing `**` must account
//! for the whole path.

/// Single-segment wildcard.
pub const ANY: &str = "*";
/// Multi-segment wildcard.
pub const ANY_DEPTH: &str = "**";

/// Match `path` against `pattern`.
pub fn matches<S: AsRef<str>>(path: &[S], pattern: &[S]) -> bool {
    if pattern.iter().any(|p| p.as_ref() == ANY_DEPTH) {
        return match_with_depth(path, pattern);
    }
    if pattern.len() > path.len() {
        return false;
    }
    pattern
        .iter()
        .zip(path)
        .all(|(p, s)| segment_matches(s.as_ref(), p.as_ref()))
}

fn segment_matches(segment: &str, pattern: &str) -> bool {
    pattern == ANY || pattern == segment
}

/// Full match for patterns holding one or more `**`.
///
/// `table[i][j]` records whether `path[i..]` matches `pattern[j..]`. Each
/// `(i, j)` pair is settled once, so any number of `**` stays
/// `O(path.len() * pattern.len())`.
fn match_with_depth<S: AsRef<str>>(path: &[S], pattern: &[S]) -> bool {
    let n = path.len();
    let m = pattern.len();
    let mut table = vec![vec![false; m + 1]; n + 1];
    table[n][m] = true;

    for i in (0..=n).rev() {
        for j in (0..m).rev() {
            let p = pattern[j].as_ref();
            table[i][j] = if p == ANY_DEPTH {
                // zero segments, or swallow one and stay on the same `**`
                table[i][j + 1] || (i < n && table[i + 1][j])
            } else {
                i < n && segment_matches(path[i].as_ref(), p) && table[i + 1][j + 1]
            };
        }
    }
    table[0][0]
}
