//! Rough token counts for artifact text
//!
//! Used to report how much the optimizer saved. Counts are estimates; no
//! tokenizer model is involved.

pub struct TokenEstimator;

impl Default for TokenEstimator {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenEstimator {
    /// Average characters per token for English text and code
    const CHARS_PER_TOKEN: f64 = 4.0;

    /// Average characters per token for CJK text
    const CJK_CHARS_PER_TOKEN: f64 = 2.0;

    pub fn new() -> Self {
        Self
    }

    /// Character-based estimate; switches ratio when the text contains CJK
    pub fn estimate_string(&self, text: &str) -> usize {
        if text.is_empty() {
            return 0;
        }
        let chars_per_token = if self.contains_cjk(text) {
            Self::CJK_CHARS_PER_TOKEN
        } else {
            Self::CHARS_PER_TOKEN
        };
        (text.chars().count() as f64 / chars_per_token).ceil() as usize
    }

    /// Estimate for serialized text; invalid UTF-8 is replaced, not rejected
    pub fn estimate_bytes(&self, bytes: &[u8]) -> usize {
        self.estimate_string(&String::from_utf8_lossy(bytes))
    }

    pub fn contains_cjk(&self, text: &str) -> bool {
        text.chars().any(|ch| {
            let code = ch as u32;
            (0x4E00..=0x9FFF).contains(&code)      // CJK Unified Ideographs
                || (0x3400..=0x4DBF).contains(&code) // Extension A
                || (0x3040..=0x30FF).contains(&code) // Hiragana and Katakana
                || (0xAC00..=0xD7AF).contains(&code) // Hangul Syllables
        })
    }
}
