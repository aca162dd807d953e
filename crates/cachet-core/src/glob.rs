//! Glob matching with the semantics key-value servers use for `KEYS`/`SCAN MATCH`.
//!
//! | Syntax | Matches |
//! |--------|---------|
//! | `*` | any sequence, including empty |
//! | `?` | exactly one byte |
//! | `[abc]` | one of the listed bytes |
//! | `[^abc]` | any byte not listed |
//! | `[a-z]` | a byte in the range (either order) |
//! | `\x` | the literal byte `x` |
//!
//! Backends without a native pattern scan use [`glob_match`] to filter their
//! whole key set client-side, which costs O(total keys) per call.

/// Whether `key` matches the glob `pattern`.
pub fn glob_match(pattern: &str, key: &str) -> bool {
    matches_from(pattern.as_bytes(), key.as_bytes())
}

fn matches_from(pattern: &[u8], key: &[u8]) -> bool {
    let (mut p, mut k) = (0usize, 0usize);
    // Position after the last `*` seen and the key position it was tried at.
    let mut backtrack: Option<(usize, usize)> = None;

    while k < key.len() {
        let step = match pattern.get(p) {
            Some(b'*') => {
                backtrack = Some((p + 1, k));
                p += 1;
                continue;
            }
            Some(b'?') => Some(p + 1),
            Some(b'[') => match_class(pattern, p, key[k]),
            Some(b'\\') if p + 1 < pattern.len() => (pattern[p + 1] == key[k]).then_some(p + 2),
            Some(&c) => (c == key[k]).then_some(p + 1),
            None => None,
        };

        match step {
            Some(next) => {
                p = next;
                k += 1;
            }
            None => match backtrack {
                Some((star_p, star_k)) => {
                    backtrack = Some((star_p, star_k + 1));
                    p = star_p;
                    k = star_k + 1;
                }
                None => return false,
            },
        }
    }

    pattern[p..].iter().all(|&c| c == b'*')
}

/// Match `byte` against the class opening at `pattern[open]`. Returns the
/// pattern position after the class on a match.
///
/// An unterminated class runs to the end of the pattern. A range may end in
/// `]`, so `[a-]` is the range `]`..=`a`, not the set `{a, -}`.
fn match_class(pattern: &[u8], open: usize, byte: u8) -> Option<usize> {
    let mut i = open + 1;
    let negate = pattern.get(i) == Some(&b'^');
    if negate {
        i += 1;
    }

    let mut hit = false;
    while i < pattern.len() && pattern[i] != b']' {
        if pattern[i] == b'\\' && i + 1 < pattern.len() {
            hit |= pattern[i + 1] == byte;
            i += 2;
        } else if i + 2 < pattern.len() && pattern[i + 1] == b'-' {
            let (lo, hi) = if pattern[i] <= pattern[i + 2] {
                (pattern[i], pattern[i + 2])
            } else {
                (pattern[i + 2], pattern[i])
            };
            hit |= (lo..=hi).contains(&byte);
            i += 3;
        } else {
            hit |= pattern[i] == byte;
            i += 1;
        }
    }

    let end = (i + 1).min(pattern.len());
    (hit != negate).then_some(end)
}
