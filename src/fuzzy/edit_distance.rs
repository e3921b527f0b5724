// File: src/fuzzy/edit_distance.rs
use std::collections::BTreeSet;

/// Case-insensitive Levenshtein distance bounded by `limit`.
///
/// Returns the exact distance when it is at most `limit`, and `limit + 1`
/// otherwise. Bails out early when the length difference alone exceeds the
/// limit or when every cell of a DP row does.
/// Complexity: O(n·m) worst case, usually far less thanks to the row cutoff.
pub fn levenshtein(a: &str, b: &str, limit: usize) -> usize {
    let a: Vec<char> = a.chars().map(|c| c.to_ascii_lowercase()).collect();
    let b: Vec<char> = b.chars().map(|c| c.to_ascii_lowercase()).collect();
    let (n, m) = (a.len(), b.len());

    if n.abs_diff(m) > limit {
        return limit + 1;
    }

    let mut prev: Vec<usize> = (0..=m).collect();
    let mut curr = vec![0usize; m + 1];

    for i in 1..=n {
        curr[0] = i;
        let mut row_min = curr[0];
        for j in 1..=m {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            curr[j] = (curr[j - 1] + 1).min(prev[j] + 1).min(prev[j - 1] + cost);
            row_min = row_min.min(curr[j]);
        }
        if row_min > limit {
            return limit + 1;
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[m].min(limit + 1)
}

/// Number of distinct adjacent letter pairs the two strings share.
pub fn bigram_overlap(keys: &str, word: &str) -> usize {
    let keys = letter_bigrams(keys);
    let word = letter_bigrams(word);
    keys.intersection(&word).count()
}

fn letter_bigrams(s: &str) -> BTreeSet<(char, char)> {
    let chars: Vec<char> = s.chars().map(|c| c.to_ascii_lowercase()).collect();
    chars
        .windows(2)
        .filter(|w| w[0].is_ascii_alphabetic() && w[1].is_ascii_alphabetic())
        .map(|w| (w[0], w[1]))
        .collect()
}
