//! Placeholder profanity filter for chirp bodies.

const PROFANE_WORDS: [&str; 3] = ["kerfuffle", "sharbert", "fornax"];
const MASK: &str = "****";

/// Replaces every profane word with `****`.
///
/// Words are split on single spaces so the original spacing survives.
/// Matching ignores case but not punctuation: `Fornax!` is left alone.
pub fn clean_chirp_body(body: &str) -> String {
    body.split(' ')
        .map(|word| {
            if PROFANE_WORDS.contains(&word.to_lowercase().as_str()) {
                MASK
            } else {
                word
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
