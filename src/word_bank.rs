use include_dir::{include_dir, Dir};
use itertools::Itertools;
use rand::Rng;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::ops::RangeInclusive;
use std::path::Path;
use thiserror::Error;

static LANG_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/lang");

const DEFAULT_WORD_LIST: &str = "words.txt";

#[derive(Debug, Error)]
pub enum WordBankError {
    #[error("no words of length {length} left in the word bank")]
    ExhaustedBucket { length: usize },
    #[error("embedded word list `{0}` not found")]
    MissingEmbedded(String),
    #[error("word list is not valid utf-8")]
    NotUtf8,
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Pool of candidate words bucketed by character length.
///
/// Words are drawn without replacement: a drawn word is gone from its bucket
/// for the rest of the session. Bucket order is the load order, which is also
/// the order used when the remaining words are written back.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WordBank {
    buckets: BTreeMap<usize, Vec<String>>,
}

impl WordBank {
    /// Build from raw words, bucketing each by its measured length.
    ///
    /// Blank entries, duplicates and words containing anything other than
    /// letters are dropped since they could never be typed out.
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut buckets: BTreeMap<usize, Vec<String>> = BTreeMap::new();
        for word in words
            .into_iter()
            .map(|w| w.as_ref().trim().to_string())
            .filter(|w| !w.is_empty())
            .unique()
        {
            if !word.chars().all(char::is_alphabetic) {
                log::debug!("skipping untypeable word {word:?}");
                continue;
            }
            buckets.entry(word.chars().count()).or_default().push(word);
        }
        Self { buckets }
    }

    /// Parse a word list file.
    ///
    /// Accepts both newline-separated words and comma-separated rows (one row
    /// per length). Every entry is re-bucketed by its measured length, so a
    /// misplaced word in a row still lands in the right bucket.
    pub fn parse(text: &str) -> Self {
        Self::from_words(text.split(['\n', '\r', ',']))
    }

    /// The word list compiled into the binary.
    pub fn embedded() -> Result<Self, WordBankError> {
        let file = LANG_DIR
            .get_file(DEFAULT_WORD_LIST)
            .ok_or_else(|| WordBankError::MissingEmbedded(DEFAULT_WORD_LIST.to_string()))?;
        let text = file.contents_utf8().ok_or(WordBankError::NotUtf8)?;
        Ok(Self::parse(text))
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, WordBankError> {
        let text = fs::read_to_string(path)?;
        Ok(Self::parse(&text))
    }

    /// Write the words that were never drawn, newline-separated.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, self.to_lines())
    }

    /// Remaining words, shortest lengths first.
    pub fn to_lines(&self) -> String {
        self.buckets.values().flatten().join("\n")
    }

    /// Take a uniformly random word of exactly `length` characters.
    pub fn draw<R: Rng + ?Sized>(
        &mut self,
        length: usize,
        rng: &mut R,
    ) -> Result<String, WordBankError> {
        let bucket = self
            .buckets
            .get_mut(&length)
            .filter(|b| !b.is_empty())
            .ok_or(WordBankError::ExhaustedBucket { length })?;
        let idx = rng.gen_range(0..bucket.len());
        Ok(bucket.remove(idx))
    }

    pub fn bucket_len(&self, length: usize) -> usize {
        self.buckets.get(&length).map_or(0, Vec::len)
    }

    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Lengths in `levels` whose bucket holds fewer than `needed` words,
    /// paired with how many they do hold.
    pub fn shortfall(&self, levels: RangeInclusive<usize>, needed: usize) -> Vec<(usize, usize)> {
        levels
            .map(|length| (length, self.bucket_len(length)))
            .filter(|&(_, have)| have < needed)
            .collect()
    }

    /// Total words available across `levels`.
    pub fn capacity(&self, levels: RangeInclusive<usize>) -> usize {
        levels.map(|length| self.bucket_len(length)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use tempfile::tempdir;

    #[test]
    fn draws_without_replacement_until_exhausted() {
        let mut bank = WordBank::from_words(["cat", "dog"]);
        let mut rng = StdRng::seed_from_u64(7);

        let mut drawn = vec![
            bank.draw(3, &mut rng).unwrap(),
            bank.draw(3, &mut rng).unwrap(),
        ];
        drawn.sort();
        assert_eq!(drawn, vec!["cat", "dog"]);

        assert_matches!(
            bank.draw(3, &mut rng),
            Err(WordBankError::ExhaustedBucket { length: 3 })
        );
    }

    #[test]
    fn missing_length_is_exhausted() {
        let mut bank = WordBank::from_words(["cat"]);
        let mut rng = StdRng::seed_from_u64(1);
        assert_matches!(
            bank.draw(9, &mut rng),
            Err(WordBankError::ExhaustedBucket { length: 9 })
        );
    }

    #[test]
    fn buckets_by_measured_length() {
        let bank = WordBank::parse("cat\nhorse\n\ndog\nzebra\nelephant\n");
        assert_eq!(bank.bucket_len(3), 2);
        assert_eq!(bank.bucket_len(5), 2);
        assert_eq!(bank.bucket_len(8), 1);
        assert_eq!(bank.len(), 5);
    }

    #[test]
    fn parses_comma_separated_rows() {
        let bank = WordBank::parse("cat, dog,owl\nbear,wolf\nhorse");
        assert_eq!(bank.bucket_len(3), 3);
        assert_eq!(bank.bucket_len(4), 2);
        assert_eq!(bank.bucket_len(5), 1);
    }

    #[test]
    fn drops_duplicates_and_untypeable_entries() {
        let bank = WordBank::from_words(["cat", "cat", "don't", "x-ray", " dog "]);
        assert_eq!(bank.len(), 2);
        assert_eq!(bank.bucket_len(3), 2);
    }

    #[test]
    fn embedded_list_covers_every_level() {
        let bank = WordBank::embedded().unwrap();
        for length in 3..=9 {
            assert!(
                bank.bucket_len(length) >= 20,
                "length {length} only has {} words",
                bank.bucket_len(length)
            );
        }
    }

    #[test]
    fn shortfall_reports_thin_buckets() {
        let bank = WordBank::from_words(["cat", "dog", "bear"]);
        assert_eq!(bank.shortfall(3..=5, 2), vec![(4, 1), (5, 0)]);
        assert!(bank.shortfall(3..=3, 2).is_empty());
    }

    #[test]
    fn capacity_sums_the_level_range() {
        let bank = WordBank::from_words(["cat", "dog", "bear", "horse"]);
        assert_eq!(bank.capacity(3..=4), 3);
        assert_eq!(bank.capacity(3..=9), 4);
        assert_eq!(bank.capacity(6..=9), 0);
    }

    #[test]
    fn embedded_list_covers_a_default_game() {
        let bank = WordBank::embedded().unwrap();
        assert!(bank.shortfall(3..=9, 1).is_empty());
        assert!(bank.capacity(3..=9) >= 50);
    }

    #[test]
    fn save_writes_only_remaining_words() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("words.txt");

        let mut bank = WordBank::from_words(["cat", "bear", "horse"]);
        let mut rng = StdRng::seed_from_u64(3);
        bank.draw(4, &mut rng).unwrap();
        bank.save(&path).unwrap();

        let reloaded = WordBank::load(&path).unwrap();
        assert_eq!(reloaded.bucket_len(4), 0);
        assert_eq!(reloaded.to_lines(), "cat\nhorse");
    }
}
