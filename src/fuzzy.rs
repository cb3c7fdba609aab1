//! Weighted fuzzy title scoring on a 0-100 scale.
//!
//! Both strings are lowercased, every non-alphanumeric character becomes a
//! space and whitespace is collapsed, so case, punctuation, separators like
//! `.`/`_` and surrounding whitespace never influence a score. Every component
//! works on sorted tokens, which makes the result independent of word order.

use std::collections::BTreeSet;

use strsim::normalized_levenshtein;

const TOKEN_SET_WEIGHT: f64 = 0.95;
const PARTIAL_SCALE: f64 = 0.9;
const LONG_PARTIAL_SCALE: f64 = 0.6;
const PARTIAL_LENGTH_RATIO: f64 = 1.5;
const LONG_LENGTH_RATIO: f64 = 8.0;

/// Lowercase, replace non-alphanumerics with spaces, collapse whitespace.
pub fn normalize(s: &str) -> String {
    let spaced: String = s
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    spaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Plain edit-distance similarity of two already normalized strings.
pub fn ratio(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    normalized_levenshtein(a, b) * 100.0
}

/// Best [`ratio`] of the shorter string against any equally long window of
/// the longer one.
pub fn partial_ratio(a: &str, b: &str) -> f64 {
    let (short, long) = if a.chars().count() <= b.chars().count() {
        (a, b)
    } else {
        (b, a)
    };
    let short_len = short.chars().count();
    if short_len == 0 {
        return 0.0;
    }

    let long_chars: Vec<char> = long.chars().collect();
    let mut best: f64 = 0.0;
    for start in 0..=(long_chars.len() - short_len) {
        let window: String = long_chars[start..start + short_len].iter().collect();
        best = best.max(ratio(short, &window));
        if best >= 100.0 {
            break;
        }
    }
    best
}

fn sorted_tokens(s: &str) -> String {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

pub fn token_sort_ratio(a: &str, b: &str) -> f64 {
    ratio(&sorted_tokens(a), &sorted_tokens(b))
}

pub fn partial_token_sort_ratio(a: &str, b: &str) -> f64 {
    partial_ratio(&sorted_tokens(a), &sorted_tokens(b))
}

// Shared tokens, then shared + each side's leftovers.
fn token_set_strings(a: &str, b: &str) -> (String, String, String) {
    let left: BTreeSet<&str> = a.split_whitespace().collect();
    let right: BTreeSet<&str> = b.split_whitespace().collect();

    let join = |tokens: Vec<&str>| tokens.join(" ");
    let common = join(left.intersection(&right).copied().collect());
    let only_left = join(left.difference(&right).copied().collect());
    let only_right = join(right.difference(&left).copied().collect());

    let combine = |rest: &str| format!("{common} {rest}").trim().to_string();
    let with_left = combine(&only_left);
    let with_right = combine(&only_right);
    (common, with_left, with_right)
}

fn best_of_set(a: &str, b: &str, scorer: fn(&str, &str) -> f64) -> f64 {
    let (common, with_left, with_right) = token_set_strings(a, b);
    scorer(&common, &with_left)
        .max(scorer(&common, &with_right))
        .max(scorer(&with_left, &with_right))
}

pub fn token_set_ratio(a: &str, b: &str) -> f64 {
    best_of_set(a, b, ratio)
}

pub fn partial_token_set_ratio(a: &str, b: &str) -> f64 {
    best_of_set(a, b, partial_ratio)
}

/// Similarity of `query` and `title` in `[0, 100]`.
///
/// Strings of similar length are compared as whole token lists. When one is
/// at least 1.5 times longer, the shorter one may match a part of the longer
/// one, scaled down by 0.9 (0.6 beyond a length ratio of 8).
pub fn score(query: &str, title: &str) -> u8 {
    let a = normalize(query);
    let b = normalize(title);
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let (len_a, len_b) = (a.chars().count() as f64, b.chars().count() as f64);
    let length_ratio = len_a.max(len_b) / len_a.min(len_b);

    let base = token_sort_ratio(&a, &b);
    let best = if length_ratio < PARTIAL_LENGTH_RATIO {
        base.max(token_set_ratio(&a, &b) * TOKEN_SET_WEIGHT)
    } else {
        let scale = if length_ratio > LONG_LENGTH_RATIO {
            LONG_PARTIAL_SCALE
        } else {
            PARTIAL_SCALE
        };
        base.max(partial_token_sort_ratio(&a, &b) * scale)
            .max(partial_token_set_ratio(&a, &b) * TOKEN_SET_WEIGHT * scale)
    };

    best.round().clamp(0.0, 100.0) as u8
}
