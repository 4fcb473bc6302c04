//! Scheme registry: a fixed number of buckets with chaining.

use crate::Scheme;

pub const BUCKET_COUNT: usize = 101;

/// Sum of each character's code weighted by its 1-based position, modulo the
/// bucket count.
pub fn scheme_hash(id: &str) -> usize {
    let sum = id
        .chars()
        .enumerate()
        .fold(0u64, |acc, (idx, ch)| {
            acc.wrapping_add(u64::from(ch).wrapping_mul(idx as u64 + 1))
        });
    (sum % BUCKET_COUNT as u64) as usize
}

#[derive(Debug, Clone)]
pub struct SchemeTable {
    buckets: Vec<Vec<Scheme>>,
    len: usize,
}

impl Default for SchemeTable {
    fn default() -> Self {
        Self {
            buckets: vec![Vec::new(); BUCKET_COUNT],
            len: 0,
        }
    }
}

impl SchemeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace by id. Returns the replaced scheme, if any.
    pub fn put(&mut self, scheme: Scheme) -> Option<Scheme> {
        let bucket = &mut self.buckets[scheme_hash(&scheme.id)];
        if let Some(slot) = bucket.iter_mut().find(|s| s.id == scheme.id) {
            return Some(std::mem::replace(slot, scheme));
        }
        bucket.push(scheme);
        self.len += 1;
        None
    }

    pub fn get(&self, id: &str) -> Option<&Scheme> {
        self.buckets[scheme_hash(id)].iter().find(|s| s.id == id)
    }

    /// Every scheme, bucket by bucket, each chain in insertion order.
    pub fn all(&self) -> Vec<&Scheme> {
        self.buckets.iter().flatten().collect()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_positional() {
        // 'a' = 97, 'b' = 98
        assert_eq!(scheme_hash("ab"), (97 + 98 * 2) % 101);
        assert_ne!(scheme_hash("ab"), scheme_hash("ba"));
        assert_eq!(scheme_hash(""), 0);
        assert!(scheme_hash("مفعول") < BUCKET_COUNT);
    }

    #[test]
    fn put_replaces_by_id() {
        let mut table = SchemeTable::new();
        assert!(table.put(Scheme::new("فاعل", "فَاعِل", "Agent")).is_none());
        let old = table.put(Scheme::new("فاعل", "فاعل", "Agent noun")).unwrap();
        assert_eq!(old.pattern, "فَاعِل");
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("فاعل").unwrap().transformation_rule, "Agent noun");
    }

    #[test]
    fn colliding_ids_chain_in_one_bucket() {
        // 'e' (101) and U+00CA (202) both land in bucket 0
        assert_eq!(scheme_hash("e"), scheme_hash("\u{ca}"));
        let mut table = SchemeTable::new();
        table.put(Scheme::new("e", "x", "first"));
        table.put(Scheme::new("\u{ca}", "y", "second"));
        assert_eq!(table.get("e").unwrap().pattern, "x");
        assert_eq!(table.get("\u{ca}").unwrap().pattern, "y");
        let ids: Vec<_> = table.all().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["e", "\u{ca}"]);
    }

    #[test]
    fn all_walks_buckets_in_order() {
        let mut table = SchemeTable::new();
        // 'c' = 99, 'a' = 97
        table.put(Scheme::new("c", "", ""));
        table.put(Scheme::new("a", "", ""));
        let ids: Vec<_> = table.all().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert!(table.get("b").is_none());
    }
}
