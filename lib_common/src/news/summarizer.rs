//! Frequency-based extractive summarizer.
//!
//! Each sentence is scored by the sum of the normalized frequencies
//! (count / highest count) of its non-stopword terms. The best `n`
//! sentences are returned in their original order.

use std::collections::HashMap;

const STOPWORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "also", "am", "an", "and", "any",
    "are", "as", "at", "be", "because", "been", "before", "being", "below", "between", "both",
    "but", "by", "can", "could", "did", "do", "does", "doing", "down", "during", "each", "few",
    "for", "from", "further", "had", "has", "have", "having", "he", "her", "here", "hers", "him",
    "his", "how", "i", "if", "in", "into", "is", "it", "its", "itself", "just", "me", "more",
    "most", "my", "no", "nor", "not", "now", "of", "off", "on", "once", "only", "or", "other",
    "our", "out", "over", "own", "said", "same", "says", "she", "should", "so", "some", "such",
    "than", "that", "the", "their", "them", "then", "there", "these", "they", "this", "those",
    "through", "to", "too", "under", "until", "up", "very", "was", "we", "were", "what", "when",
    "where", "which", "while", "who", "whom", "why", "will", "with", "would", "you", "your",
];

/// Tokens ending in a period that do not end a sentence.
const ABBREVIATIONS: &[&str] = &[
    "mr", "mrs", "ms", "dr", "st", "jr", "sr", "inc", "ltd", "co", "corp", "vs", "no", "jan",
    "feb", "mar", "apr", "jun", "jul", "aug", "sep", "sept", "oct", "nov", "dec",
];

/// Returns at most `n` sentences of `text`, in original order.
pub fn summarize(text: &str, n: usize) -> Vec<String> {
    let sentences = split_sentences(text);
    if n == 0 || sentences.is_empty() {
        return Vec::new();
    }
    if sentences.len() <= n {
        return sentences;
    }

    let tokens: Vec<Vec<String>> = sentences.iter().map(|s| terms(s)).collect();

    let mut frequencies: HashMap<&str, f64> = HashMap::new();
    for term in tokens.iter().flatten() {
        *frequencies.entry(term.as_str()).or_insert(0.0) += 1.0;
    }
    let max = frequencies.values().copied().fold(0.0_f64, f64::max);
    if max == 0.0 {
        return sentences.into_iter().take(n).collect();
    }

    let mut scored: Vec<(usize, f64)> = tokens
        .iter()
        .enumerate()
        .map(|(i, words)| {
            let score = words
                .iter()
                .map(|w| frequencies.get(w.as_str()).copied().unwrap_or(0.0) / max)
                .sum::<f64>();
            (i, score)
        })
        .collect();

    // Highest score first, earlier sentence on ties.
    scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
    let mut keep: Vec<usize> = scored.into_iter().take(n).map(|(i, _)| i).collect();
    keep.sort_unstable();

    keep.into_iter().map(|i| sentences[i].clone()).collect()
}

/// Splits on `.`, `!` or `?` followed by whitespace, and on line breaks.
fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();

    for block in text.lines() {
        let chars: Vec<char> = block.chars().collect();
        let mut start = 0;

        for i in 0..chars.len() {
            let c = chars[i];
            if !matches!(c, '.' | '!' | '?') {
                continue;
            }
            let at_break = chars.get(i + 1).map_or(true, |next| next.is_whitespace());
            if !at_break || (c == '.' && is_abbreviation(&chars[start..i])) {
                continue;
            }
            push_sentence(&mut sentences, &chars[start..=i]);
            start = i + 1;
        }
        if start < chars.len() {
            push_sentence(&mut sentences, &chars[start..]);
        }
    }

    sentences
}

fn push_sentence(sentences: &mut Vec<String>, chars: &[char]) {
    let sentence: String = chars.iter().collect();
    let sentence = sentence.trim();
    if sentence.chars().any(char::is_alphanumeric) {
        sentences.push(sentence.to_string());
    }
}

/// True when the word right before a period is an initialism (`U.S`) or a
/// known abbreviation.
fn is_abbreviation(before: &[char]) -> bool {
    let word: String = before
        .iter()
        .rev()
        .take_while(|c| !c.is_whitespace())
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    let word = word.trim_start_matches(['(', '"', '\'']);

    is_initialism(word)
        || (word.chars().count() == 1 && word.chars().all(char::is_uppercase))
        || ABBREVIATIONS.contains(&word.to_lowercase().as_str())
}

/// Single letters joined by periods (`U.S`, `e.g`). Prices such as
/// `$2,345.67` do not qualify.
fn is_initialism(word: &str) -> bool {
    word.contains('.')
        && word.split('.').all(|part| {
            let mut chars = part.chars();
            matches!((chars.next(), chars.next()), (Some(c), None) if c.is_alphabetic())
        })
}

/// Lowercased non-stopword terms of a sentence.
fn terms(sentence: &str) -> Vec<String> {
    sentence
        .split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .map(|w| w.trim_matches('\'').to_lowercase())
        .filter(|w| w.chars().count() > 1 && !STOPWORDS.contains(&w.as_str()))
        .collect()
}
