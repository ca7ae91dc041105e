//! Price-based holder selection.

use orca_api::{Directory, DirectoryError};
use orca_primitives::{ContentHash, FileRef, Holder};
use orca_store::NameIndex;
use std::sync::Arc;
use tracing::{debug, info};

/// The holder with the lowest price. Ties go to the first one encountered.
///
/// Lookup results carry no order, so which of several equally cheap holders
/// wins can differ between runs.
pub fn select_cheapest(holders: &[Holder]) -> Option<&Holder> {
    holders.iter().reduce(|best, holder| {
        if holder.price_per_unit < best.price_per_unit {
            holder
        } else {
            best
        }
    })
}

/// Looks up the holders of a file and picks the cheapest one.
pub struct HolderSelector<D> {
    directory: D,
    names: Option<Arc<NameIndex>>,
}

impl<D: Directory> HolderSelector<D> {
    pub fn new(directory: D) -> Self {
        Self {
            directory,
            names: None,
        }
    }

    /// Resolve file names through `names` before querying the directory.
    pub fn with_name_index(mut self, names: Arc<NameIndex>) -> Self {
        self.names = Some(names);
        self
    }

    /// Turn a hash or a local file name into the id the directory is queried with.
    ///
    /// Names missing from the index are passed through unchanged.
    pub fn resolve_id(&self, input: &str) -> String {
        match FileRef::parse(input) {
            FileRef::Hash(hash) => hash.to_hex(),
            FileRef::Name(name) => self
                .names
                .as_ref()
                .and_then(|names| names.get(&name))
                .map(|hash| hash.to_hex())
                .unwrap_or(name),
        }
    }

    /// Resolve `input` to the content hash it stands for.
    ///
    /// Unlike [`resolve_id`](Self::resolve_id), a name missing from the index
    /// is an error, since there is nothing to download it as.
    pub fn resolve_hash(&self, input: &str) -> Result<ContentHash, DirectoryError> {
        match FileRef::parse(input) {
            FileRef::Hash(hash) => Ok(hash),
            FileRef::Name(name) => self
                .names
                .as_ref()
                .and_then(|names| names.get(&name))
                .ok_or(DirectoryError::UnknownName { name }),
        }
    }

    /// Best holder for `input` (a content hash or a file name).
    pub async fn best_holder(&self, input: &str) -> Result<Holder, DirectoryError> {
        let id = self.resolve_id(input);
        let holders = self.directory.check_holders(&id).await?;
        debug!(%id, candidates = holders.len(), "Selecting holder");

        let best = select_cheapest(&holders)
            .cloned()
            .ok_or(DirectoryError::NoHolderFound { id: id.clone() })?;

        info!(%id, holder = %best.socket_addr(), price = best.price_per_unit, "Selected holder");
        Ok(best)
    }

    pub fn directory(&self) -> &D {
        &self.directory
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use orca_store::hash_bytes;
    use orca_test_utils::{MemoryDirectory, holder};

    #[test]
    fn test_select_cheapest() {
        let holders = vec![holder("a", 7), holder("b", 3), holder("c", 9)];
        assert_eq!(select_cheapest(&holders).unwrap().identity_key, "b");
        assert!(select_cheapest(&[]).is_none());
    }

    #[test]
    fn test_select_cheapest_tie_keeps_first() {
        let holders = vec![holder("a", 4), holder("b", 2), holder("c", 2)];
        assert_eq!(select_cheapest(&holders).unwrap().identity_key, "b");
    }

    #[test]
    fn test_selected_price_is_minimal() {
        let prices = [12u64, 5, 40, 5, 1, 99, 1, 33];
        for len in 1..=prices.len() {
            let holders: Vec<_> = prices
                .iter()
                .take(len)
                .enumerate()
                .map(|(i, p)| holder(&format!("h{i}"), *p))
                .collect();
            let best = select_cheapest(&holders).unwrap();
            assert!(holders.iter().all(|h| best.price_per_unit <= h.price_per_unit));
        }
    }

    #[tokio::test]
    async fn test_best_holder_no_holder() {
        let selector = HolderSelector::new(MemoryDirectory::default());
        let hash = hash_bytes(b"nobody has this");
        assert_matches!(
            selector.best_holder(&hash.to_hex()).await,
            Err(DirectoryError::NoHolderFound { id }) if id == hash.to_hex()
        );
    }

    #[tokio::test]
    async fn test_best_holder_resolves_names() {
        let dir = tempfile::tempdir().unwrap();
        let names = Arc::new(NameIndex::open(dir.path().join("names.json")).unwrap());
        let hash = hash_bytes(b"report");
        names.put("report.pdf", hash).unwrap();

        let directory = MemoryDirectory::default();
        directory.add_holder(hash, holder("pricey", 10));
        directory.add_holder(hash, holder("cheap", 5));

        let selector = HolderSelector::new(directory).with_name_index(names);
        assert_eq!(selector.resolve_id("report.pdf"), hash.to_hex());
        assert_eq!(selector.resolve_id("unknown.pdf"), "unknown.pdf");

        let best = selector.best_holder("report.pdf").await.unwrap();
        assert_eq!(best.identity_key, "cheap");
        assert_eq!(best.price_per_unit, 5);
    }

    #[test]
    fn test_resolve_hash() {
        let dir = tempfile::tempdir().unwrap();
        let names = Arc::new(NameIndex::open(dir.path().join("names.json")).unwrap());
        let hash = hash_bytes(b"report");
        names.put("report.pdf", hash).unwrap();

        let selector = HolderSelector::new(MemoryDirectory::default()).with_name_index(names);
        assert_eq!(selector.resolve_hash("report.pdf").unwrap(), hash);
        assert_eq!(selector.resolve_hash(&hash.to_hex()).unwrap(), hash);
        assert_matches!(
            selector.resolve_hash("unknown.pdf"),
            Err(DirectoryError::UnknownName { name }) if name == "unknown.pdf"
        );
    }
}
