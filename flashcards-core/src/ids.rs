use uuid::Uuid;

/// Source of server-assigned entity ids.
pub trait IdSource: Send + Sync {
    /// Returns a fresh, non-empty id, distinct from every id issued before.
    fn new_id(&self) -> String;
}

/// Hyphenated UUIDv4, e.g. `67e55044-10b1-426f-9247-bb680e5fe0c8`.
#[derive(Clone, Copy, Debug, Default)]
pub struct UuidIds;

impl IdSource for UuidIds {
    fn new_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uuid_ids_are_canonical_and_distinct() {
        let ids = UuidIds;
        let a = ids.new_id();
        let b = ids.new_id();
        assert_eq!(a.len(), 36);
        let groups: Vec<usize> = a.split('-').map(str::len).collect();
        assert_eq!(groups, vec![8, 4, 4, 4, 12]);
        assert_ne!(a, b);
    }
}
