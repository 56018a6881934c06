//! A MapReduce-compatible application that computes the
//! degree of each vertex in a graph, given a list of edges.
//!

use anyhow::{anyhow, Result};
use bytes::Bytes;

use common::utils::string_from_bytes;
use common::KeyValue;

fn parse_line(line: &str) -> Result<(u64, u64)> {
    let mut iter = line.split_whitespace().take(2);
    let a = iter
        .next()
        .ok_or_else(|| anyhow!("Invalid input file format"))?
        .parse()?;
    let b = iter
        .next()
        .ok_or_else(|| anyhow!("Invalid input file format"))?
        .parse()?;
    Ok((a, b))
}

pub fn map(_name: &str, contents: Bytes) -> Result<Vec<KeyValue>> {
    let s = string_from_bytes(contents)?;
    let edges = s
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(parse_line)
        .collect::<Result<Vec<_>>>()?;

    let pairs = edges
        .into_iter()
        .flat_map(|(a, b)| [KeyValue::new(a.to_string(), 1), KeyValue::new(b.to_string(), 1)])
        .collect();
    Ok(pairs)
}

pub fn reduce(key: &str, values: &[u64]) -> Result<u64> {
    values
        .iter()
        .try_fold(0u64, |deg, value| deg.checked_add(*value))
        .ok_or_else(|| anyhow!("degree of vertex {key} overflowed"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_emits_both_endpoints() {
        let pairs = map("edges", Bytes::from("1 2\n2 3\n")).unwrap();
        let keys = pairs.iter().map(KeyValue::key).collect::<Vec<_>>();
        assert_eq!(keys, vec!["1", "2", "2", "3"]);
    }

    #[test]
    fn test_malformed_edge_fails() {
        assert!(map("edges", Bytes::from("1 2\n7\n")).is_err());
        assert!(map("edges", Bytes::from("a b\n")).is_err());
    }

    #[test]
    fn test_degree() {
        assert_eq!(reduce("2", &[1, 1]).unwrap(), 2);
    }
}
