//! Synthetic email generation with evolving spam tactics.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Spam vocabulary available from day 0.
pub const BASE_SPAM_WORDS: &[&str] = &["win", "free", "money", "click", "buy"];

/// Additional spam vocabulary that appears after day 20.
pub const LATE_SPAM_WORDS: &[&str] = &["prize", "offer", "deal", "sale", "discount"];

/// Vocabulary for legitimate emails.
pub const NORMAL_WORDS: &[&str] = &["meeting", "project", "report", "team", "work"];

const SPAM_PROBABILITY: f64 = 0.3;
const VOCABULARY_SHIFT_DAY: u32 = 20;

/// Generates fake emails with evolving spam tactics.
///
/// Roughly 30% of generated emails are spam. Spam emails draw 3..=8 words
/// from the spam vocabulary plus 2 normal words; legitimate emails are
/// 4..=10 normal words. After day 20 the spam vocabulary grows, simulating
/// spammers changing tactics so the detector has to keep learning.
pub struct EmailGenerator {
    rng: StdRng,
}

impl EmailGenerator {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Seeded generator for reproducible output in tests.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Generate one email and its true label (`true` = spam).
    pub fn generate(&mut self, day: u32) -> (String, bool) {
        let mut spam_words: Vec<&str> = BASE_SPAM_WORDS.to_vec();
        if day > VOCABULARY_SHIFT_DAY {
            spam_words.extend_from_slice(LATE_SPAM_WORDS);
        }

        let is_spam = self.rng.gen_bool(SPAM_PROBABILITY);
        let mut words: Vec<&str> = Vec::new();

        if is_spam {
            let num_words = self.rng.gen_range(3..=8);
            for _ in 0..num_words {
                words.push(spam_words.choose(&mut self.rng).copied().unwrap_or("win"));
            }
            for _ in 0..2 {
                words.push(NORMAL_WORDS.choose(&mut self.rng).copied().unwrap_or("work"));
            }
        } else {
            let num_words = self.rng.gen_range(4..=10);
            for _ in 0..num_words {
                words.push(NORMAL_WORDS.choose(&mut self.rng).copied().unwrap_or("work"));
            }
        }

        (words.join(" "), is_spam)
    }
}

impl Default for EmailGenerator {
    fn default() -> Self {
        Self::new()
    }
}
