//! Tokenizer adapter shared by the lexical index, the reranker and the
//! intent classifier.
//!
//! The default [`CjkBigramTokenizer`] needs no dictionary: Latin/digit runs
//! become words and CJK runs become overlapping bigrams. With the `jieba`
//! feature, [`JiebaTokenizer`] segments Chinese with a dictionary instead.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub use crate::traits::Tokenizer;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenizerKind {
    #[default]
    Bigram,
    Jieba,
}

/// Build the configured tokenizer. Falls back to bigrams (with a warning)
/// when `jieba` is requested but the feature is not compiled in.
pub fn build_tokenizer(kind: TokenizerKind) -> Arc<dyn Tokenizer> {
    match kind {
        TokenizerKind::Bigram => Arc::new(CjkBigramTokenizer),
        #[cfg(feature = "jieba")]
        TokenizerKind::Jieba => Arc::new(JiebaTokenizer::new()),
        #[cfg(not(feature = "jieba"))]
        TokenizerKind::Jieba => {
            tracing::warn!("jieba tokenizer requested but the `jieba` feature is disabled; using bigrams");
            Arc::new(CjkBigramTokenizer)
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CjkBigramTokenizer;

impl Tokenizer for CjkBigramTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        let mut tokens = Vec::new();
        let mut word = String::new();
        let mut run: Vec<char> = Vec::new();
        for c in text.chars().flat_map(char::to_lowercase) {
            if is_cjk(c) {
                flush_word(&mut word, &mut tokens);
                run.push(c);
            } else if c.is_alphanumeric() {
                flush_run(&mut run, &mut tokens);
                word.push(c);
            } else {
                flush_word(&mut word, &mut tokens);
                flush_run(&mut run, &mut tokens);
            }
        }
        flush_word(&mut word, &mut tokens);
        flush_run(&mut run, &mut tokens);
        tokens
    }
}

fn flush_word(word: &mut String, tokens: &mut Vec<String>) {
    if !word.is_empty() { tokens.push(std::mem::take(word)); }
}

fn flush_run(run: &mut Vec<char>, tokens: &mut Vec<String>) {
    match run.len() {
        0 => {}
        1 => tokens.push(run[0].to_string()),
        _ => tokens.extend(run.windows(2).map(|w| w.iter().collect::<String>())),
    }
    run.clear();
}

fn is_cjk(c: char) -> bool {
    matches!(c,
        '\u{3040}'..='\u{30FF}'      // hiragana, katakana
        | '\u{3400}'..='\u{4DBF}'    // CJK extension A
        | '\u{4E00}'..='\u{9FFF}'    // CJK unified ideographs
        | '\u{AC00}'..='\u{D7AF}'    // hangul syllables
        | '\u{F900}'..='\u{FAFF}'    // compatibility ideographs
        | '\u{20000}'..='\u{2A6DF}') // extension B
}

#[cfg(feature = "jieba")]
pub struct JiebaTokenizer {
    jieba: jieba_rs::Jieba,
}

#[cfg(feature = "jieba")]
impl JiebaTokenizer {
    pub fn new() -> Self { Self { jieba: jieba_rs::Jieba::new() } }
}

#[cfg(feature = "jieba")]
impl Default for JiebaTokenizer {
    fn default() -> Self { Self::new() }
}

#[cfg(feature = "jieba")]
impl Tokenizer for JiebaTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        let lower = text.to_lowercase();
        self.jieba
            .cut(&lower, false)
            .into_iter()
            .map(str::trim)
            .filter(|t| t.chars().any(char::is_alphanumeric))
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latin_words_are_lowercased_and_split_on_punctuation() {
        let t = CjkBigramTokenizer.tokenize("How much is a Card? 2-for-1!");
        assert_eq!(t, vec!["how", "much", "is", "a", "card", "2", "for", "1"]);
    }

    #[test]
    fn cjk_runs_become_bigrams() {
        assert_eq!(CjkBigramTokenizer.tokenize("脱发怎么办"), vec!["脱发", "发怎", "怎么", "么办"]);
    }

    #[test]
    fn single_cjk_char_is_a_unigram_and_scripts_split() {
        assert_eq!(CjkBigramTokenizer.tokenize("卡vip会员"), vec!["卡", "vip", "会员"]);
    }

    #[test]
    fn whitespace_only_yields_nothing() {
        assert!(CjkBigramTokenizer.tokenize("  \t\n ").is_empty());
        assert!(CjkBigramTokenizer.tokenize("？！。").is_empty());
    }
}
