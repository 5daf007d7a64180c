use crate::domain::model::Identifier;
use std::collections::HashSet;

/// 已檢查過的名稱集合。只增不減，不做淘汰。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DedupStore {
    seen: HashSet<Identifier>,
}

impl DedupStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.seen.contains(id)
    }

    /// 回傳是否為新加入
    pub fn insert(&mut self, id: impl Into<Identifier>) -> bool {
        self.seen.insert(id.into())
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

impl FromIterator<Identifier> for DedupStore {
    fn from_iter<T: IntoIterator<Item = Identifier>>(iter: T) -> Self {
        Self {
            seen: iter.into_iter().collect(),
        }
    }
}

impl Extend<Identifier> for DedupStore {
    fn extend<T: IntoIterator<Item = Identifier>>(&mut self, iter: T) {
        self.seen.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_then_contains() {
        let mut store = DedupStore::new();
        assert!(!store.contains("abc12"));
        assert!(store.insert("abc12"));
        assert!(store.contains("abc12"));
        assert!(!store.insert("abc12"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_from_iter_collapses_duplicates() {
        let store: DedupStore = vec!["a".to_string(), "b".to_string(), "a".to_string()]
            .into_iter()
            .collect();
        assert_eq!(store.len(), 2);
        assert!(store.contains("a"));
        assert!(store.contains("b"));
    }
}
