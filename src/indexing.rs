use std::collections::HashMap;
use std::sync::RwLock;

use crate::common::Rid;
use crate::tuple::value::Value;

/// The registry key under which the index on `table`.`column` is found.
pub fn index_key(table: &str, column: &str) -> String {
    format!("{}.{}", table, column)
}

/// An in-memory multimap from cell value to the rids holding that value,
/// in insertion order. Not persisted; rebuilt from the heap on startup.
/// Key equality is the natural equality of the value's type; DECIMAL keys
/// compare by their canonical decimal text form.
pub struct HashIndex {
    items: RwLock<HashMap<Value, Vec<Rid>>>,
}

impl HashIndex {
    pub fn new() -> Self {
        Self {
            items: RwLock::new(HashMap::new()),
        }
    }

    pub fn insert(&self, key: Value, rid: Rid) {
        let mut items = self.items.write().unwrap();
        items.entry(key).or_default().push(rid);
    }

    pub fn get(&self, key: &Value) -> Vec<Rid> {
        let items = self.items.read().unwrap();
        items.get(key).cloned().unwrap_or_default()
    }

    /// Removes the first occurrence of (key, rid), if present.
    pub fn delete(&self, key: &Value, rid: Rid) {
        let mut items = self.items.write().unwrap();
        if let Some(rids) = items.get_mut(key) {
            if let Some(pos) = rids.iter().position(|r| *r == rid) {
                rids.remove(pos);
            }
        }
    }

    pub fn len(&self) -> usize {
        let items = self.items.read().unwrap();
        items.values().map(|rids| rids.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for HashIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::HashIndex;
    use crate::tuple::value::Value;

    #[test]
    fn rids_accumulate_in_insertion_order() {
        let index = HashIndex::new();
        index.insert(Value::Int(1), (0, 0));
        index.insert(Value::Int(1), (0, 1));
        index.insert(Value::Int(2), (1, 0));

        assert_eq!(index.get(&Value::Int(1)), vec![(0, 0), (0, 1)]);
        assert_eq!(index.get(&Value::Int(2)), vec![(1, 0)]);
        assert_eq!(index.get(&Value::Int(3)), vec![]);
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn delete_removes_only_the_first_occurrence() {
        let index = HashIndex::new();
        index.insert(Value::Int(1), (0, 0));
        index.insert(Value::Int(1), (0, 0));
        index.delete(&Value::Int(1), (0, 0));
        assert_eq!(index.get(&Value::Int(1)), vec![(0, 0)]);

        // deleting a missing pair is a no-op
        index.delete(&Value::Int(9), (9, 9));
    }

    #[test]
    fn decimal_keys_compare_by_text() {
        let index = HashIndex::new();
        assert!(index.is_empty());
        index.insert(Value::Decimal("10.50".to_owned()), (0, 0));

        assert_eq!(index.get(&Value::Decimal("10.50".to_owned())), vec![(0, 0)]);
        assert_eq!(index.get(&Value::Decimal("10.5".to_owned())), vec![]);
        assert!(!index.is_empty());
    }
}
