/// Hard-coded block list. Matching is case-sensitive plain substring, so a
/// banned word inside a longer word still matches. Applied only when
/// serving search results; ingestion stores messages unfiltered.
const BANNED_WORDS: &[&str] = &["fuck", "shit", "viagra"];

pub fn contains_banned_words(message: &str) -> bool {
    BANNED_WORDS.iter().any(|word| message.contains(word))
}
