//! Word frequency ranks loaded from a newline-delimited list, most frequent
//! word first.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

#[derive(Debug, Default)]
pub struct FrequencyList {
    ranks: HashMap<String, u32>,
}

impl FrequencyList {
    pub fn load(path: &Path) -> io::Result<FrequencyList> {
        FrequencyList::from_reader(File::open(path)?)
    }

    pub fn from_reader(reader: impl Read) -> io::Result<FrequencyList> {
        let mut ranks = HashMap::new();

        for (index, line) in BufReader::new(reader).lines().enumerate() {
            let word = line?.trim().to_string();
            if word.is_empty() {
                continue;
            }

            // ranks are 1-based; the first occurrence of a word wins
            let rank = u32::try_from(index + 1).unwrap_or(u32::MAX);
            ranks.entry(word).or_insert(rank);
        }

        Ok(FrequencyList { ranks })
    }

    #[must_use]
    pub fn rank(&self, word: &str) -> Option<u32> {
        self.ranks.get(word).copied()
    }
}
