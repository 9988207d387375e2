//! Letter Normalization
//!
//! Every letter entering the core passes through [`normalise_letter`]: it is
//! trimmed, uppercased and checked against the A-Z alphabet. Lists are
//! deduplicated preserving first-seen order.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::AlgoError;

/// Letters in alphabet order
pub const ALPHABET: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// One canonical uppercase letter of the alphabet
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Letter(u8);

impl Letter {
    /// Build from an already uppercase ASCII byte
    pub fn from_ascii(byte: u8) -> Option<Self> {
        byte.is_ascii_uppercase().then_some(Letter(byte))
    }

    pub fn as_char(self) -> char {
        self.0 as char
    }

    pub fn as_str(self) -> &'static str {
        let i = self.index();
        &ALPHABET[i..i + 1]
    }

    /// Zero-based position in the alphabet
    pub fn index(self) -> usize {
        (self.0 - b'A') as usize
    }

    /// The alphabet in order
    pub fn alphabet() -> impl Iterator<Item = Letter> {
        ALPHABET.bytes().map(Letter)
    }

    /// The first `count` letters of the alphabet
    pub fn prefix(count: usize) -> Vec<Letter> {
        Self::alphabet().take(count).collect()
    }
}

impl fmt::Display for Letter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl AsRef<str> for Letter {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl FromStr for Letter {
    type Err = AlgoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        normalise_letter(s).ok_or_else(|| AlgoError::InvalidLetter(s.to_string()))
    }
}

impl Serialize for Letter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

struct LetterVisitor;

impl<'de> Visitor<'de> for LetterVisitor {
    type Value = Letter;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a single letter A-Z")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Letter, E> {
        normalise_letter(v).ok_or_else(|| E::invalid_value(de::Unexpected::Str(v), &self))
    }
}

impl<'de> Deserialize<'de> for Letter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_str(LetterVisitor)
    }
}

/// Trim, uppercase and validate a single letter
pub fn normalise_letter(raw: &str) -> Option<Letter> {
    let mut chars = raw.trim().chars();
    let first = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    let upper = first.to_ascii_uppercase();
    if upper.is_ascii_uppercase() {
        Letter::from_ascii(upper as u8)
    } else {
        None
    }
}

/// Normalize a list, dropping invalid entries and later duplicates
pub fn normalise_list<S: AsRef<str>>(raw: &[S]) -> Vec<Letter> {
    let mut result = Vec::with_capacity(raw.len());
    for item in raw {
        if let Some(letter) = normalise_letter(item.as_ref()) {
            if !result.contains(&letter) {
                result.push(letter);
            }
        }
    }
    result
}

/// Parse a whitespace/comma separated list like `"a, b c"`
pub fn letters(raw: &str) -> Vec<Letter> {
    let parts: Vec<&str> = raw
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .collect();
    normalise_list(&parts)
}
