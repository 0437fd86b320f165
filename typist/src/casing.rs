//! Carrying the user's capitalization over to a dictionary word.
//!
//! Lowercase typing keeps the dictionary's own casing ("sh" -> "Shawn",
//! "us" -> "USA"). Once the user types a capital, each typed character dictates
//! the case of the word character it lines up with; untyped characters keep the
//! dictionary casing unless everything typed so far is capitals.

/// Reconcile dictionary word `word` with what the user typed around the cursor.
pub fn reconcile_capitalization(word: &str, prefix: &str, suffix: &str) -> String {
    let pattern: Vec<char> = prefix.chars().chain(suffix.chars()).collect();
    if !pattern.iter().any(|c| c.is_uppercase()) {
        return word.to_string();
    }

    let word_chars: Vec<char> = word.chars().collect();
    if word_chars.is_empty() {
        return String::new();
    }

    let all_caps = pattern.len() > 1 && pattern.iter().all(|c| c.is_uppercase());
    let typed_prefix = prefix.chars().count();
    let typed_suffix = pattern.len() - typed_prefix;

    // Per word position: Some(upper?) where a typed character decides, None where the word's own casing stands
    let mut decided: Vec<Option<bool>> = vec![None; word_chars.len()];
    if pattern.len() < word_chars.len() {
        // Typed prefix lines up with the start, typed suffix with the end
        for (slot, c) in decided.iter_mut().zip(prefix.chars()) {
            *slot = Some(c.is_uppercase());
        }
        let suffix_start = word_chars.len() - typed_suffix;
        for (slot, c) in decided[suffix_start..].iter_mut().zip(suffix.chars()) {
            *slot = Some(c.is_uppercase());
        }
        if all_caps {
            for slot in decided.iter_mut().filter(|s| s.is_none()) {
                *slot = Some(true);
            }
        }
    } else {
        for (slot, c) in decided.iter_mut().zip(pattern.iter()) {
            *slot = Some(c.is_uppercase());
        }
    }

    let mut result = String::with_capacity(word.len());
    for (&c, upper) in word_chars.iter().zip(decided) {
        match upper {
            Some(true) => result.extend(c.to_uppercase()),
            Some(false) => result.extend(c.to_lowercase()),
            None => result.push(c),
        }
    }
    result
}
