//! Bounded Levenshtein distance shared by both correction backends.
//!
//! Compares Unicode scalar values, never encoded bytes, so SymSpell and the
//! BK-tree agree on non-ASCII input. The common prefix and suffix are trimmed
//! before the DP runs; the DP aborts as soon as a whole row exceeds the bound.

/// Distance value meaning "no bound".
pub const UNBOUNDED: u32 = u32::MAX;

/// Levenshtein distance between `a` and `b`.
///
/// Returns the true distance when it is `<= max_distance`, otherwise some value
/// strictly greater than `max_distance` (not necessarily the true distance).
pub fn distance(a: &str, b: &str, max_distance: u32) -> u32 {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    distance_chars(&a_chars, &b_chars, max_distance)
}

/// `Some(distance)` if the distance is within `max_distance`, `None` otherwise.
pub fn bounded_distance(a: &str, b: &str, max_distance: u32) -> Option<u32> {
    let d = distance(a, b, max_distance);
    (d <= max_distance).then_some(d)
}

/// Exact Levenshtein distance, no early exit.
pub fn unbounded_distance(a: &str, b: &str) -> u32 {
    distance(a, b, UNBOUNDED)
}

/// Same contract as [`distance`], over pre-split characters.
pub fn distance_chars(a: &[char], b: &[char], max_distance: u32) -> u32 {
    let exceeded = max_distance.saturating_add(1);
    let max_d = max_distance as usize;

    if a.len().abs_diff(b.len()) > max_d {
        return exceeded;
    }

    // Trim common prefix, then common suffix of what remains
    let common_prefix = a.iter().zip(b).take_while(|(x, y)| x == y).count();
    let (a, b) = (&a[common_prefix..], &b[common_prefix..]);
    let common_suffix = a
        .iter()
        .rev()
        .zip(b.iter().rev())
        .take_while(|(x, y)| x == y)
        .count();
    let a = &a[..a.len() - common_suffix];
    let b = &b[..b.len() - common_suffix];

    // Length difference is unchanged by trimming, so this is within the bound
    if a.is_empty() {
        return b.len() as u32;
    }
    if b.is_empty() {
        return a.len() as u32;
    }

    let n = b.len();
    let mut prev: Vec<usize> = (0..=n).collect();
    let mut curr = vec![0usize; n + 1];

    for (i, &ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        let mut row_min = curr[0];

        for (j, &cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1)
                .min(curr[j] + 1)
                .min(prev[j] + cost);
            row_min = row_min.min(curr[j + 1]);
        }

        // Row minima never decrease, so nothing below can come back under the bound
        if row_min > max_d {
            return exceeded;
        }

        std::mem::swap(&mut prev, &mut curr);
    }

    prev[n] as u32
}
