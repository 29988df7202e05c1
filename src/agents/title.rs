//! Film title extraction
//!
//! Guesses which part of a free-text question names a film, without looking
//! at the catalog. Rules are tried in order and the first hit wins:
//!
//! 1. text inside double quotes
//! 2. words following "film" / "movie"
//! 3. a capitalized run among the first five words
//! 4. capitalized words anywhere
//! 5. a single capitalized word longer than two characters

use once_cell::sync::Lazy;
use regex::Regex;

static QUOTED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""([^"]+)"|“([^”]+)”"#).expect("quoted title regex"));

static AFTER_KEYWORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?:film|movie)\s+([a-z][a-z\s]+?)(?:\?|\.|$|,|!|;|:|\s+(?:rental|rate|is|the|what|about)\b)",
    )
    .expect("keyword title regex")
});

/// Words that never start or continue a title
pub const STOP_WORDS: [&str; 16] = [
    "what", "is", "the", "rental", "rate", "for", "film", "movie", "of", "a", "an", "about",
    "tell", "me", "this", "that",
];

/// Extra words ignored by the single-word rule
const SINGLE_WORD_STOP_WORDS: [&str; 4] = ["i", "you", "can", "help"];

/// Only the first few words are considered a leading title.
const LEADING_WINDOW: usize = 5;

pub fn is_stop_word(word: &str) -> bool {
    let lower = word.to_lowercase();
    STOP_WORDS.contains(&lower.as_str())
}

fn is_capitalized(word: &str) -> bool {
    word.chars().next().is_some_and(char::is_uppercase)
}

/// Strip the punctuation that commonly trails a word in a question
pub fn clean_word(word: &str) -> &str {
    word.trim_end_matches(['.', ',', '!', '?', ';', ':'])
}

/// Run every rule in order and return the first candidate title
pub fn extract_title(question: &str) -> Option<String> {
    quoted(question)
        .or_else(|| after_keyword(question))
        .or_else(|| leading_capitalized(question))
        .or_else(|| capitalized_anywhere(question))
        .or_else(|| single_capitalized(question))
}

fn quoted(question: &str) -> Option<String> {
    let captures = QUOTED.captures(question)?;
    captures
        .get(1)
        .or_else(|| captures.get(2))
        .map(|m| m.as_str().to_string())
}

fn after_keyword(question: &str) -> Option<String> {
    let captures = AFTER_KEYWORD.captures(question)?;
    let title = captures.get(1)?.as_str().trim();
    (!title.is_empty()).then(|| title.to_string())
}

fn leading_capitalized(question: &str) -> Option<String> {
    let mut title_words: Vec<&str> = Vec::new();

    for (i, word) in question.split_whitespace().enumerate() {
        let word = clean_word(word);
        let capitalized = is_capitalized(word);

        if i < LEADING_WINDOW && capitalized {
            if !is_stop_word(word) {
                title_words.push(word);
            } else if !title_words.is_empty() {
                break;
            }
        } else if !title_words.is_empty() {
            if capitalized && !is_stop_word(word) {
                title_words.push(word);
            } else {
                break;
            }
        }
    }

    join(title_words)
}

fn capitalized_anywhere(question: &str) -> Option<String> {
    let mut title_words: Vec<&str> = Vec::new();

    for word in question.split_whitespace() {
        let word = clean_word(word);
        if word.is_empty() || is_stop_word(word) {
            continue;
        }
        if is_capitalized(word) {
            title_words.push(word);
        } else if !title_words.is_empty() {
            break;
        }
    }

    join(title_words)
}

fn single_capitalized(question: &str) -> Option<String> {
    question
        .split_whitespace()
        .map(clean_word)
        .find(|word| {
            let lower = word.to_lowercase();
            is_capitalized(word)
                && word.chars().count() > 2
                && !STOP_WORDS.contains(&lower.as_str())
                && !SINGLE_WORD_STOP_WORDS.contains(&lower.as_str())
        })
        .map(str::to_string)
}

fn join(words: Vec<&str>) -> Option<String> {
    if words.is_empty() {
        None
    } else {
        Some(words.join(" "))
    }
}
