//! 候選名稱產生器。
//!
//! 三種策略都是無狀態的純函數，只依賴字元集、字典與長度範圍這些常數。
//! 隨機來源由呼叫端注入，方便以固定 seed 測試。

use crate::domain::model::{GenerationStrategy, Identifier};
use rand::Rng;
use std::ops::RangeInclusive;

pub const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

pub const RANDOM_LENGTH: RangeInclusive<usize> = 5..=6;

pub const HYBRID_SUFFIX_LENGTH: RangeInclusive<usize> = 2..=4;

/// Dictionary 策略的數字後綴上限（不含）
pub const DICTIONARY_NUMBER_BOUND: u32 = 1000;

pub const DEFAULT_WORDLIST: &[&str] = &[
    "apple", "star", "game", "code", "roblox", "ninja", "hero", "quest", "magic", "pixel",
];

#[derive(Debug, Clone)]
pub struct Generator {
    wordlist: Vec<String>,
}

impl Default for Generator {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl Generator {
    /// 空字典時退回內建字典
    pub fn new(wordlist: Vec<String>) -> Self {
        let wordlist = if wordlist.is_empty() {
            DEFAULT_WORDLIST.iter().map(|w| w.to_string()).collect()
        } else {
            wordlist
        };
        Self { wordlist }
    }

    pub fn wordlist(&self) -> &[String] {
        &self.wordlist
    }

    pub fn generate(&self, strategy: GenerationStrategy) -> Identifier {
        self.generate_with(strategy, &mut rand::thread_rng())
    }

    pub fn generate_with<R: Rng + ?Sized>(
        &self,
        strategy: GenerationStrategy,
        rng: &mut R,
    ) -> Identifier {
        match strategy {
            GenerationStrategy::Random => {
                let len = rng.gen_range(RANDOM_LENGTH);
                random_chars(len, rng)
            }
            GenerationStrategy::Dictionary => {
                let word = self.pick_word(rng);
                let number = rng.gen_range(0..DICTIONARY_NUMBER_BOUND);
                dictionary_name(word, number)
            }
            GenerationStrategy::Hybrid => {
                let word = self.pick_word(rng);
                let len = rng.gen_range(HYBRID_SUFFIX_LENGTH);
                format!("{}{}", word, random_chars(len, rng))
            }
        }
    }

    fn pick_word<R: Rng + ?Sized>(&self, rng: &mut R) -> &str {
        &self.wordlist[rng.gen_range(0..self.wordlist.len())]
    }
}

/// 單字直接接數字，不加分隔符
pub fn dictionary_name(word: &str, number: u32) -> Identifier {
    format!("{}{}", word, number)
}

fn random_chars<R: Rng + ?Sized>(len: usize, rng: &mut R) -> String {
    (0..len)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect()
}
