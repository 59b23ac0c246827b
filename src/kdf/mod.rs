//! Passphrase-based key derivation: turn a memorable word phrase into a
//! [`DualKey`](crate::DualKey), and back.
//!
//! A phrase is an ordered list of lowercase words drawn from a fixed
//! dictionary, plus one reserved "version word" embedded at a random
//! position that selects the key-generation parameters (currently just a
//! bit length) to regenerate under. Typos in a phrase are corrected by
//! nearest-neighbor edit distance before the phrase is hashed into a seed.

pub mod edit_distance;
pub mod fortuna;

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use rand::Rng;
use rand_core::RngCore;
use serde::Deserialize;

use crate::digest::{Digest, SHA256};
use crate::dualkey::DualKey;
use crate::error::{Error, Result};
use edit_distance::edit_distance;
use fortuna::Fortuna;

/// Parameters selected by a phrase's embedded version word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionInfo {
    pub key_bits: u32,
}

#[derive(Deserialize)]
struct VersionEntry {
    #[serde(rename = "KeyBits")]
    key_bits: u32,
}

#[derive(Deserialize)]
struct VersionsFile {
    #[serde(rename = "Current")]
    current: String,
    #[serde(rename = "Words")]
    words: serde_json::Map<String, serde_json::Value>,
}

/// A validated word list plus version table, ready to generate and
/// regenerate phrase-derived keys.
pub struct KeyMaker {
    words: Vec<String>,
    /// Version words in the order they appear in the source table, which is
    /// also the tie-break order [`KeyMaker::correct_word`] uses.
    version_words: Vec<(String, VersionInfo)>,
    version_lookup: HashMap<String, VersionInfo>,
    current_version: String,
}

impl KeyMaker {
    /// Build a `KeyMaker` from already-loaded text: `words_text` is a
    /// free-form whitespace-separated word list; `versions_json` has the
    /// shape `{"Current": "...", "Words": {"word": {"KeyBits": N}, ...}}`.
    pub fn new(words_text: &str, versions_json: &str) -> Result<KeyMaker> {
        let words: Vec<String> = words_text.split_whitespace().map(str::to_lowercase).collect();
        if words.len() <= 1 {
            return Err(Error::BadParameters);
        }

        let versions_file: VersionsFile =
            serde_json::from_str(versions_json).map_err(|_| Error::BadParameters)?;

        if !versions_file.words.contains_key(&versions_file.current) {
            return Err(Error::BadParameters);
        }

        let mut version_words = Vec::with_capacity(versions_file.words.len());
        let mut version_lookup = HashMap::with_capacity(versions_file.words.len());

        for (word, value) in versions_file.words {
            if word != word.to_lowercase() {
                return Err(Error::BadParameters);
            }
            if words.contains(&word) {
                return Err(Error::BadParameters);
            }

            let entry: VersionEntry = serde_json::from_value(value).map_err(|_| Error::BadParameters)?;
            let info = VersionInfo {
                key_bits: entry.key_bits,
            };

            version_words.push((word.clone(), info));
            version_lookup.insert(word, info);
        }

        let all_words = words.iter().chain(version_words.iter().map(|(w, _)| w));
        for (i, a) in all_words.clone().enumerate() {
            for (j, b) in all_words.clone().enumerate() {
                if i < j && edit_distance(a, b) <= 1 {
                    return Err(Error::BadParameters);
                }
            }
        }

        Ok(KeyMaker {
            words,
            version_words,
            version_lookup,
            current_version: versions_file.current,
        })
    }

    /// Convenience wrapper over [`KeyMaker::new`] that reads both inputs
    /// from disk.
    pub fn from_paths(words_path: impl AsRef<Path>, versions_path: impl AsRef<Path>) -> Result<KeyMaker> {
        let words_text = fs::read_to_string(words_path).map_err(|_| Error::BadParameters)?;
        let versions_json = fs::read_to_string(versions_path).map_err(|_| Error::BadParameters)?;
        KeyMaker::new(&words_text, &versions_json)
    }

    /// Generate a fresh key together with the phrase that reproduces it.
    ///
    /// Draws main-list words uniformly until the accumulated entropy (plus
    /// the entropy of the version word's eventual position) reaches
    /// `word_bits`, then inserts the current version word at a uniformly
    /// random position.
    pub fn generate_key_and_phrase(&self, rng: &mut impl RngCore, word_bits: u32) -> Result<(DualKey, Vec<String>)> {
        let per_word_bits = (self.words.len() as f64).log2();
        let mut phrase: Vec<String> = Vec::new();
        let mut accumulated_bits = 0.0_f64;

        loop {
            let idx = rng.gen_range(0..self.words.len());
            phrase.push(self.words[idx].clone());
            accumulated_bits += per_word_bits;

            let position_bits = ((phrase.len() + 1) as f64).log2();
            if accumulated_bits + position_bits >= f64::from(word_bits) {
                break;
            }
        }

        let n = phrase.len();
        phrase.push(self.current_version.clone());
        let swap_index = rng.gen_range(0..=n);
        phrase.swap(swap_index, n);

        self.regenerate_key_from_phrase(&phrase)
    }

    /// Recover the key and corrected phrase a (possibly typo-laden) phrase
    /// was meant to encode.
    pub fn regenerate_key_from_phrase(&self, phrase: &[String]) -> Result<(DualKey, Vec<String>)> {
        let mut corrected = Vec::with_capacity(phrase.len());

        for word in phrase {
            corrected.push(self.correct_word(&word.to_lowercase())?);
        }

        let mut found_versions: Vec<(&str, VersionInfo)> = Vec::new();
        for word in &corrected {
            if let Some(&info) = self.version_lookup.get(word) {
                found_versions.push((word.as_str(), info));
            }
        }

        let info = match found_versions.as_slice() {
            [] => return Err(Error::NoVersion),
            [(_, info)] => *info,
            [(first, _), (second, _), ..] => {
                return Err(Error::MultipleVersions((*first).to_string(), (*second).to_string()))
            }
        };

        let mut hasher = SHA256::default();
        for word in &corrected {
            hasher.update(word.as_bytes());
            hasher.update(b":");
        }
        let seed = hasher.finalize();

        let mut prng = Fortuna::new(seed.as_ref());
        let key = DualKey::generate(&mut prng, info.key_bits)?;

        Ok((key, corrected))
    }

    /// Find the nearest dictionary word to `word` (already lowercased),
    /// breaking ties by scanning the main word list in order, then the
    /// version words in their table order, and keeping the first match.
    fn correct_word(&self, word: &str) -> Result<String> {
        let mut best: Option<(&str, usize)> = None;

        for candidate in self.words.iter().chain(self.version_words.iter().map(|(w, _)| w)) {
            let distance = edit_distance(word, candidate);

            if best.map_or(true, |(_, best_distance)| distance < best_distance) {
                best = Some((candidate, distance));

                if distance == 0 {
                    break;
                }
            }
        }

        match best {
            Some((candidate, distance)) if distance < 2 => Ok(candidate.to_string()),
            _ => Err(Error::InvalidWord(word.to_string())),
        }
    }
}

#[cfg(test)]
mod test {
    use super::KeyMaker;
    use rand::thread_rng;

    fn sample_key_maker() -> KeyMaker {
        let words = "alpha bravo charlie delta echo foxtrot golf hotel india juliet kilo lima";
        let versions = r#"{
            "Current": "v1",
            "Words": {
                "android": {"KeyBits": 128},
                "ios": {"KeyBits": 128},
                "web": {"KeyBits": 128},
                "v1": {"KeyBits": 128}
            }
        }"#;

        KeyMaker::new(words, versions).unwrap()
    }

    #[test]
    fn rejects_current_not_in_table() {
        let versions = r#"{"Current": "missing", "Words": {"android": {"KeyBits": 128}}}"#;
        assert!(KeyMaker::new("alpha bravo charlie", versions).is_err());
    }

    #[test]
    fn rejects_version_word_overlapping_main_list() {
        let versions = r#"{"Current": "alpha", "Words": {"alpha": {"KeyBits": 128}}}"#;
        assert!(KeyMaker::new("alpha bravo charlie", versions).is_err());
    }

    #[test]
    fn rejects_words_too_close_in_edit_distance() {
        let versions = r#"{"Current": "v1", "Words": {"v1": {"KeyBits": 128}}}"#;
        assert!(KeyMaker::new("alpha alphb charlie", versions).is_err());
    }

    #[test]
    fn generates_and_regenerates_an_identical_key() {
        let maker = sample_key_maker();
        let mut rng = thread_rng();

        let (key, phrase) = maker.generate_key_and_phrase(&mut rng, 64).unwrap();
        let (regenerated, corrected) = maker.regenerate_key_from_phrase(&phrase).unwrap();

        assert_eq!(key, regenerated);
        assert_eq!(corrected, phrase);
    }

    #[test]
    fn phrase_contains_exactly_one_version_word() {
        let maker = sample_key_maker();
        let mut rng = thread_rng();

        let (_, phrase) = maker.generate_key_and_phrase(&mut rng, 64).unwrap();
        let version_word_count = phrase.iter().filter(|w| maker.version_lookup.contains_key(*w)).count();

        assert_eq!(version_word_count, 1);
    }

    #[test]
    fn corrects_a_single_character_typo() {
        let maker = sample_key_maker();
        let mut rng = thread_rng();

        let (key, mut phrase) = maker.generate_key_and_phrase(&mut rng, 64).unwrap();
        let original = phrase.clone();

        let word = &mut phrase[0];
        let last = word.pop().unwrap();
        word.push(((last as u8) ^ 0x01) as char);

        let (regenerated, corrected) = maker.regenerate_key_from_phrase(&phrase).unwrap();
        assert_eq!(key, regenerated);
        assert_eq!(corrected, original);
    }

    #[test]
    fn rejects_phrase_without_a_version_word() {
        let maker = sample_key_maker();
        let phrase: Vec<String> = vec!["alpha".into(), "bravo".into(), "charlie".into()];
        assert!(matches!(
            maker.regenerate_key_from_phrase(&phrase),
            Err(crate::error::Error::NoVersion)
        ));
    }

    #[test]
    fn rejects_unrecognizable_word() {
        let maker = sample_key_maker();
        let phrase: Vec<String> = vec!["zzzzzzzzzz".into(), "v1".into()];
        assert!(matches!(
            maker.regenerate_key_from_phrase(&phrase),
            Err(crate::error::Error::InvalidWord(_))
        ));
    }
}
