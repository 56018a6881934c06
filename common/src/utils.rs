use anyhow::Result;
use bytes::Bytes;

/// Interpret raw input as UTF-8.
pub fn string_from_bytes(bytes: Bytes) -> Result<String> {
    Ok(String::from_utf8(bytes.to_vec())?)
}

/// Cut `text` into consecutive chunks of at most `lines_per_chunk` lines.
///
/// Each chunk keeps its lines joined by `\n`. Empty input yields no chunks.
pub fn chunk_lines(text: &str, lines_per_chunk: usize) -> Vec<String> {
    let lines_per_chunk = lines_per_chunk.max(1);
    let lines = text.lines().collect::<Vec<_>>();

    lines
        .chunks(lines_per_chunk)
        .map(|chunk| chunk.join("\n"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_lines() {
        let text = "a\nb\nc\nd\ne";
        assert_eq!(chunk_lines(text, 2), vec!["a\nb", "c\nd", "e"]);
        assert_eq!(chunk_lines(text, 10), vec![text]);
        assert!(chunk_lines("", 3).is_empty());
    }

    #[test]
    fn test_zero_chunk_size_is_one_line() {
        assert_eq!(chunk_lines("x\ny", 0), vec!["x", "y"]);
    }

    #[test]
    fn test_invalid_utf8() {
        assert!(string_from_bytes(Bytes::from_static(&[0xff, 0xfe])).is_err());
    }
}
