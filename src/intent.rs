//! Keyword-based routing of chat messages.
//!
//! A message that asks to draw, design or show a pattern goes to the image
//! provider; anything else is answered by the text provider.

/// Phrases that mark a message as an image request.
///
/// Latin phrases match whole words only. Thai is written without spaces, so
/// Thai phrases match anywhere in the message.
pub const DEFAULT_IMAGE_KEYWORDS: &[&str] = &[
    "วาด",
    "ออกแบบ",
    "ดูลาย",
    "ขอดูรูป",
    "draw",
    "design a",
    "design an",
    "design me",
    "show me a picture",
    "show me an image",
    "show me a pattern",
    "show me a design",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    GenerateImage,
    Answer,
}

#[derive(Debug, Clone)]
pub struct IntentClassifier {
    keywords: Vec<String>,
}

impl IntentClassifier {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.as_ref().trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    pub fn classify(&self, message: &str) -> Intent {
        let message = message.to_lowercase();
        if self.keywords.iter().any(|k| contains_phrase(&message, k)) {
            Intent::GenerateImage
        } else {
            Intent::Answer
        }
    }
}

/// Substring match that refuses to split a word at an ASCII-alphanumeric edge
/// of `phrase`, so "draw" does not match "withdraw".
fn contains_phrase(message: &str, phrase: &str) -> bool {
    let bounded_start = phrase.starts_with(|c: char| c.is_ascii_alphanumeric());
    let bounded_end = phrase.ends_with(|c: char| c.is_ascii_alphanumeric());

    message.match_indices(phrase).any(|(start, matched)| {
        let end = start + matched.len();
        let clear_before = !bounded_start
            || !message[..start]
                .chars()
                .next_back()
                .is_some_and(char::is_alphanumeric);
        let clear_after = !bounded_end
            || !message[end..]
                .chars()
                .next()
                .is_some_and(char::is_alphanumeric);
        clear_before && clear_after
    })
}

impl Default for IntentClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_IMAGE_KEYWORDS)
    }
}
