use common::{CombinedRecord, KeyValue, NodeError, NodeKind};

/// Local pre-aggregation of one mapper's emitted pairs.
#[derive(Debug, Default, Clone, Copy)]
pub struct Combiner;

impl Combiner {
    /// Sum the values emitted for each key.
    pub fn execute(&self, pairs: &[KeyValue], worker: usize) -> Result<CombinedRecord, NodeError> {
        let mut combined = CombinedRecord::new();
        for kv in pairs {
            let count = combined.entry(kv.key.clone()).or_insert(0);
            *count = count.checked_add(kv.value).ok_or_else(|| {
                NodeError::new(
                    format!("count for `{}` overflowed", kv.key),
                    worker,
                    NodeKind::Combinator,
                )
            })?;
        }
        Ok(combined)
    }
}
