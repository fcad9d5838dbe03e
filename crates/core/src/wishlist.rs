//! Wishlist membership snapshot.

use serde::Serialize;

use crate::types::ProductId;

/// Insertion-ordered set of wishlisted products.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct WishlistSnapshot {
    ids: Vec<ProductId>,
}

impl WishlistSnapshot {
    /// Build a snapshot, dropping repeated ids (first occurrence wins).
    #[must_use]
    pub fn from_ids(ids: impl IntoIterator<Item = ProductId>) -> Self {
        let mut unique: Vec<ProductId> = Vec::new();
        for id in ids {
            if !unique.contains(&id) {
                unique.push(id);
            }
        }
        Self { ids: unique }
    }

    #[must_use]
    pub fn contains(&self, id: &ProductId) -> bool {
        self.ids.contains(id)
    }

    /// A snapshot that includes `id` (appended if new).
    #[must_use]
    pub fn with(&self, id: ProductId) -> Self {
        if self.contains(&id) {
            return self.clone();
        }
        let mut ids = self.ids.clone();
        ids.push(id);
        Self { ids }
    }

    /// A snapshot without `id`.
    #[must_use]
    pub fn without(&self, id: &ProductId) -> Self {
        Self {
            ids: self.ids.iter().filter(|existing| *existing != id).cloned().collect(),
        }
    }

    #[must_use]
    pub fn ids(&self) -> &[ProductId] {
        &self.ids
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_ids_dedupes_in_order() {
        let snapshot = WishlistSnapshot::from_ids(
            ["b", "a", "b", "c"].into_iter().map(ProductId::from),
        );
        let ids: Vec<_> = snapshot.ids().iter().map(ProductId::as_str).collect();
        assert_eq!(ids, ["b", "a", "c"]);
    }

    #[test]
    fn test_without_absent_is_unchanged() {
        let snapshot = WishlistSnapshot::from_ids([ProductId::new("a")]);
        assert_eq!(snapshot.without(&ProductId::new("z")), snapshot);
        assert_eq!(snapshot.len(), 1);
    }
}
