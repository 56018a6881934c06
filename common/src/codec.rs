//! Line codec for intermediate files.
//!
//! Each record is one JSON value per line, so keys may contain any
//! character without breaking the framing.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Encode every item as its own line.
pub fn encode_lines<'a, T, I>(items: I) -> Result<String>
where
    T: Serialize + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut out = String::new();
    for item in items {
        out.push_str(&serde_json::to_string(item)?);
        out.push('\n');
    }
    Ok(out)
}

/// Decode a buffer produced by [`encode_lines`]. Blank lines are skipped.
pub fn decode_lines<T: DeserializeOwned>(text: &str) -> Result<Vec<T>> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(no, line)| {
            serde_json::from_str(line).with_context(|| format!("malformed record on line {}", no + 1))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_with_separators_survive() {
        let records = vec![("a,b".to_string(), vec![1u64, 2]), ("c\td".to_string(), vec![3])];
        let text = encode_lines(&records).unwrap();
        assert_eq!(text.lines().count(), 2);

        let back: Vec<(String, Vec<u64>)> = decode_lines(&text).unwrap();
        assert_eq!(back, records);
    }

    #[test]
    fn test_malformed_line_reports_position() {
        let err = decode_lines::<(String, u64)>("[\"a\",1]\nnot json\n").unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }
}
