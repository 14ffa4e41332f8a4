use regex::Regex;

use crate::core::WortkartenError;

/// Wrap the target token in `sentence` with a cloze marker.
///
/// The token is located case-insensitively on word boundaries (the same word
/// may open the sentence capitalized), but the marker wraps the span exactly
/// as it appears in the sentence. A sentence that does not contain the token
/// is an explicit failure; an unmarked sentence must never reach a card.
pub fn cloze_sentence(
    sentence: &str,
    target: &str,
    index: u32,
) -> Result<String, WortkartenError> {
    let pattern = Regex::new(&format!(r"(?i)\b{}\b", regex::escape(target.trim())))?;

    let found = pattern.find(sentence).ok_or_else(|| WortkartenError::ClozeMatch {
        target: target.to_string(),
        sentence: sentence.to_string(),
    })?;

    let mut out = String::with_capacity(sentence.len() + 12);
    out.push_str(&sentence[..found.start()]);
    out.push_str(&format!("{{cloze:{}:{}}}", index, found.as_str()));
    out.push_str(&sentence[found.end()..]);
    Ok(out)
}
