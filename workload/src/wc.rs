//! A MapReduce-compatible implementation of word count.
//!

use anyhow::{anyhow, Result};
use bytes::Bytes;

use common::utils::string_from_bytes;
use common::KeyValue;

/// Words are maximal runs of ASCII letters and apostrophes. Case is kept.
fn is_word_char(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '\''
}

pub fn map(_name: &str, contents: Bytes) -> Result<Vec<KeyValue>> {
    let s = string_from_bytes(contents)?;
    let pairs = s
        .split(|c: char| !is_word_char(c))
        .filter(|word| !word.is_empty())
        .map(|word| KeyValue::new(word, 1))
        .collect();
    Ok(pairs)
}

pub fn reduce(key: &str, values: &[u64]) -> Result<u64> {
    values
        .iter()
        .try_fold(0u64, |total, value| total.checked_add(*value))
        .ok_or_else(|| anyhow!("count for `{key}` overflowed"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_emits_one_per_word() {
        let pairs = map("split-1.txt", Bytes::from("the cat, the\nrat's 42 hat")).unwrap();
        let words = pairs.iter().map(KeyValue::key).collect::<Vec<_>>();

        assert_eq!(words, vec!["the", "cat", "the", "rat's", "hat"]);
        assert!(pairs.iter().all(|kv| kv.value() == 1));
    }

    #[test]
    fn test_map_empty_input() {
        assert!(map("empty", Bytes::new()).unwrap().is_empty());
    }

    #[test]
    fn test_reduce_sums() {
        assert_eq!(reduce("the", &[1, 2, 3]).unwrap(), 6);
        assert!(reduce("the", &[u64::MAX, 1]).is_err());
    }
}
