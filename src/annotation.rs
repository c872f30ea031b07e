//! # Annotation Module
//!
//! Tokenization and part-of-speech annotation consumed by the extraction core.
//!
//! The extractor only sees annotations through the [`Annotator`] trait, so a
//! statistical tagger can be plugged in without touching the extraction logic.
//! [`LexiconAnnotator`] is the rule-based default: closed-class word lists,
//! a food-adjective lexicon and a noun-chunk segmenter over ADJ/NOUN runs.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::trace;

/// Coarse part-of-speech tag attached to each token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PartOfSpeech {
    Num,
    Noun,
    Adj,
    Verb,
    Aux,
    Adp,
    Det,
    Pron,
    Cconj,
    Adv,
    Punct,
    Other,
}

/// One lexical unit of annotated text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// Surface text as it appeared in the entry
    pub text: String,
    /// Position of the token in the sequence
    pub index: usize,
    /// Whether the token looks like a number ("2", "1/2", "1.5", "½", "two")
    pub like_num: bool,
    pub pos: PartOfSpeech,
    pub is_stop: bool,
    pub is_punct: bool,
}

impl Token {
    /// Lowercase surface form used for all lexicon lookups
    pub fn lower(&self) -> String {
        self.text.to_lowercase()
    }
}

/// A contiguous token range `[start, end)` forming one noun phrase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NounChunk {
    pub start: usize,
    pub end: usize,
    /// Lowercase text of the chunk, tokens joined by single spaces
    pub text: String,
}

/// Result of annotating one diary entry
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Annotation {
    pub tokens: Vec<Token>,
    pub noun_chunks: Vec<NounChunk>,
}

impl Annotation {
    /// Lowercase text of the token range `[start, end)`
    pub fn span_text(&self, start: usize, end: usize) -> String {
        let end = end.min(self.tokens.len());
        if start >= end {
            return String::new();
        }
        self.tokens[start..end]
            .iter()
            .map(Token::lower)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// The noun chunk covering `index`, if any
    pub fn chunk_containing(&self, index: usize) -> Option<&NounChunk> {
        self.noun_chunks
            .iter()
            .find(|chunk| chunk.start <= index && index < chunk.end)
    }
}

/// Capability that turns raw text into tokens and noun chunks
///
/// Implementations must be cheap to share: one instance is built at startup
/// and used read-only by every extraction call.
pub trait Annotator: Send + Sync {
    fn annotate(&self, text: &str) -> Annotation;
}

lazy_static! {
    static ref TOKEN_REGEX: Regex = Regex::new(
        r"\d{1,3}(?:,\d{3})+(?:\.\d+)?|\d+/\d+|\d+(?:\.\d+)?|[½⅓⅔¼¾⅕⅖⅗⅘⅙⅚⅛⅜⅝⅞]|\p{L}+(?:['’-]\p{L}+)*|\S"
    )
    .expect("Token pattern should be valid");
    static ref NUMERIC_LITERAL: Regex =
        Regex::new(r"^(?:\d{1,3}(?:,\d{3})+(?:\.\d+)?|\d+/\d+|\d+(?:\.\d+)?|[½⅓⅔¼¾⅕⅖⅗⅘⅙⅚⅛⅜⅝⅞])$")
            .expect("Numeric literal pattern should be valid");
    static ref NUMBER_WORDS: HashSet<&'static str> = [
        "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
        "eleven", "twelve", "fifteen", "twenty", "hundred", "dozen",
    ]
    .into_iter()
    .collect();
    static ref STOP_WORDS: HashSet<&'static str> = [
        "a", "an", "the", "this", "that", "these", "those", "my", "your", "his", "her", "its",
        "our", "their", "some", "any", "each", "every", "no", "another", "i", "me", "you", "he",
        "him", "she", "it", "we", "us", "they", "them", "myself", "what", "who", "which", "of",
        "with", "in", "on", "at", "for", "from", "to", "by", "about", "after", "before",
        "during", "into", "onto", "over", "under", "without", "than", "per", "and", "or", "but",
        "nor", "so", "am", "is", "are", "was", "were", "be", "been", "being", "have", "has",
        "had", "do", "does", "did", "will", "would", "can", "could", "should", "may", "might",
        "must", "then", "also", "just", "very", "too", "only", "again", "there", "here", "when",
        "where", "while", "not", "all", "both", "more", "most", "much", "many", "few", "other",
        "such", "own", "same", "well", "up", "down", "out", "off", "zero", "one", "two",
        "three", "four", "five", "six", "seven", "eight", "nine", "ten", "eleven", "twelve",
        "fifteen", "twenty", "hundred",
    ]
    .into_iter()
    .collect();
    static ref DETERMINERS: HashSet<&'static str> = [
        "a", "an", "the", "this", "that", "these", "those", "my", "your", "his", "her", "its",
        "our", "their", "some", "any", "each", "every", "no", "another",
    ]
    .into_iter()
    .collect();
    static ref PRONOUNS: HashSet<&'static str> = [
        "i", "me", "you", "he", "him", "she", "it", "we", "us", "they", "them", "myself",
        "what", "who", "which",
    ]
    .into_iter()
    .collect();
    static ref ADPOSITIONS: HashSet<&'static str> = [
        "of", "with", "in", "on", "at", "for", "from", "to", "by", "about", "after", "before",
        "during", "into", "onto", "over", "under", "without", "than", "per",
    ]
    .into_iter()
    .collect();
    static ref CONJUNCTIONS: HashSet<&'static str> =
        ["and", "or", "but", "nor", "plus", "so"].into_iter().collect();
    static ref AUXILIARIES: HashSet<&'static str> = [
        "am", "is", "are", "was", "were", "be", "been", "being", "have", "has", "had", "do",
        "does", "did", "will", "would", "can", "could", "should", "may", "might", "must",
    ]
    .into_iter()
    .collect();
    static ref VERBS: HashSet<&'static str> = [
        "ate", "eat", "eaten", "eating", "eats", "drank", "drink", "drinking", "drinks", "got",
        "get", "took", "take", "made", "make", "went", "go", "having", "called", "tried",
        "finished", "ordered", "shared", "enjoyed", "added", "grabbed", "snacked", "love",
        "loved", "want", "wanted", "ran", "walked", "slept", "skipped",
    ]
    .into_iter()
    .collect();
    static ref ADVERBS: HashSet<&'static str> = [
        "then", "also", "just", "very", "too", "only", "again", "later", "really", "afterwards",
        "there", "here", "when", "where", "while", "not", "well", "up", "down", "out", "off",
        "today", "yesterday", "tonight",
    ]
    .into_iter()
    .collect();
    static ref FOOD_ADJECTIVES: HashSet<&'static str> = [
        "whole", "skim", "low-fat", "nonfat", "non-fat", "organic", "fresh", "frozen", "canned",
        "dried", "raw", "cooked", "boiled", "fried", "baked", "grilled", "steamed", "roasted",
        "white", "brown", "wild", "green", "red", "black", "large", "small", "medium", "big",
        "lean", "sweet", "plain", "greek", "mixed", "toasted", "scrambled", "sliced", "diced",
        "chopped", "mashed", "hot", "cold", "iced", "light", "dark", "unsweetened",
        "sparkling", "good", "delicious", "quick", "little",
    ]
    .into_iter()
    .collect();
}

/// Rule-based annotator backed by static English word lists
#[derive(Debug, Default, Clone)]
pub struct LexiconAnnotator;

impl LexiconAnnotator {
    pub fn new() -> Self {
        Self
    }

    fn tag(lower: &str, like_num: bool, is_punct: bool) -> PartOfSpeech {
        if like_num {
            return PartOfSpeech::Num;
        }
        if is_punct {
            return PartOfSpeech::Punct;
        }
        let word = lower;
        if DETERMINERS.contains(word) {
            PartOfSpeech::Det
        } else if PRONOUNS.contains(word) {
            PartOfSpeech::Pron
        } else if ADPOSITIONS.contains(word) {
            PartOfSpeech::Adp
        } else if CONJUNCTIONS.contains(word) {
            PartOfSpeech::Cconj
        } else if AUXILIARIES.contains(word) {
            PartOfSpeech::Aux
        } else if VERBS.contains(word) {
            PartOfSpeech::Verb
        } else if ADVERBS.contains(word) {
            PartOfSpeech::Adv
        } else if FOOD_ADJECTIVES.contains(word) {
            PartOfSpeech::Adj
        } else if word.len() >= 6 && word.ends_with("ed") && !word.ends_with("eed") {
            // Past-tense verbs outside the lexicon ("snacked", "devoured")
            PartOfSpeech::Verb
        } else if word.chars().all(char::is_alphabetic) || word.contains('-') || word.contains('\'') {
            PartOfSpeech::Noun
        } else {
            PartOfSpeech::Other
        }
    }

    fn tokenize(text: &str) -> Vec<Token> {
        TOKEN_REGEX
            .find_iter(text)
            .enumerate()
            .map(|(index, m)| {
                let surface = m.as_str();
                let lower = surface.to_lowercase();
                let like_num =
                    NUMERIC_LITERAL.is_match(surface) || NUMBER_WORDS.contains(lower.as_str());
                let is_punct = !surface.chars().any(char::is_alphanumeric)
                    && !NUMERIC_LITERAL.is_match(surface);
                Token {
                    text: surface.to_string(),
                    index,
                    like_num,
                    pos: Self::tag(&lower, like_num, is_punct),
                    is_stop: STOP_WORDS.contains(lower.as_str()),
                    is_punct,
                }
            })
            .collect()
    }

    /// Segment maximal ADJ/NOUN runs into noun chunks
    ///
    /// Trailing adjectives are trimmed and runs without a noun are dropped,
    /// so "whole wheat bread" is one chunk while a lone "good" is none.
    fn noun_chunks(tokens: &[Token]) -> Vec<NounChunk> {
        let mut chunks = Vec::new();
        let mut i = 0;
        while i < tokens.len() {
            let is_chunk_token = |t: &Token| {
                !t.is_stop && matches!(t.pos, PartOfSpeech::Adj | PartOfSpeech::Noun)
            };
            if !is_chunk_token(&tokens[i]) {
                i += 1;
                continue;
            }

            let start = i;
            while i < tokens.len() && is_chunk_token(&tokens[i]) {
                i += 1;
            }
            let mut end = i;
            while end > start && tokens[end - 1].pos == PartOfSpeech::Adj {
                end -= 1;
            }
            if end > start {
                let text = tokens[start..end]
                    .iter()
                    .map(Token::lower)
                    .collect::<Vec<_>>()
                    .join(" ");
                chunks.push(NounChunk { start, end, text });
            }
        }
        chunks
    }
}

impl Annotator for LexiconAnnotator {
    fn annotate(&self, text: &str) -> Annotation {
        let tokens = Self::tokenize(text);
        let noun_chunks = Self::noun_chunks(&tokens);
        trace!(
            token_count = tokens.len(),
            chunk_count = noun_chunks.len(),
            "Annotated diary entry"
        );
        Annotation {
            tokens,
            noun_chunks,
        }
    }
}
