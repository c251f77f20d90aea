use std::sync::Arc;
use std::time::Duration;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::debug;

use super::{StackId, StackInstance, StoreError};

/// Authoritative mapping from identifier to stack instance.
///
/// The registry exclusively owns every instance it issues. The map is
/// sharded (`DashMap`), so resolve/delete on unrelated identifiers never
/// contend; only `create` takes a registry-wide lock, to keep the
/// instance-count bound exact.
///
/// The registry is an explicitly owned state object: the server constructs
/// one at startup and hands it to request handlers, and tests instantiate
/// isolated registries of their own.
pub struct StackRegistry {
    stacks: DashMap<StackId, Arc<StackInstance>>,
    max_stacks: usize,
    max_depth: usize,
    ttl: Option<Duration>,
    create_lock: Mutex<()>,
}

/// Occupancy snapshot for the `LIST` operation.
///
/// Deliberately carries no identifiers: an identifier is the access
/// credential for its stack, so listings only describe shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryStats {
    pub max_stacks: usize,
    /// Depth of each live stack, paired with its depth bound.
    pub depths: Vec<(usize, usize)>,
}

impl RegistryStats {
    pub fn len(&self) -> usize {
        self.depths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.depths.is_empty()
    }
}

impl StackRegistry {
    /// Creates an empty registry.
    ///
    /// `ttl` of `None` disables idle expiry; instances then live until
    /// explicitly deleted or the registry is dropped.
    pub fn new(max_stacks: usize, max_depth: usize, ttl: Option<Duration>) -> Self {
        Self {
            stacks: DashMap::new(),
            max_stacks,
            max_depth,
            ttl,
            create_lock: Mutex::new(()),
        }
    }

    /// Allocates a fresh empty stack and returns its identifier.
    ///
    /// Fails with [`StoreError::RegistryFull`] at the instance bound. A
    /// collision with a live identifier is probabilistically impossible at
    /// 128 bits, but the insert re-rolls rather than assuming so.
    pub fn create(&self) -> Result<StackId, StoreError> {
        let _guard = self.create_lock.lock();
        if self.stacks.len() >= self.max_stacks {
            return Err(StoreError::RegistryFull {
                limit: self.max_stacks,
            });
        }
        loop {
            let id = StackId::generate();
            match self.stacks.entry(id.clone()) {
                Entry::Vacant(slot) => {
                    slot.insert(Arc::new(StackInstance::new(self.max_depth)));
                    debug!(id = %id, live = self.stacks.len(), "created stack");
                    return Ok(id);
                }
                Entry::Occupied(_) => continue,
            }
        }
    }

    /// Looks up the instance for `id`, refreshing its idle deadline.
    ///
    /// Fails with [`StoreError::UnknownId`] if the identifier was never
    /// issued, was deleted, or has expired.
    pub fn resolve(&self, id: &StackId) -> Result<Arc<StackInstance>, StoreError> {
        let stack = self
            .stacks
            .get(id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| StoreError::UnknownId(id.clone()))?;
        stack.touch();
        Ok(stack)
    }

    /// Removes the mapping for `id`, releasing the instance.
    ///
    /// Fails with [`StoreError::UnknownId`] if absent; deleting an
    /// already-deleted identifier reports the same error.
    pub fn delete(&self, id: &StackId) -> Result<(), StoreError> {
        match self.stacks.remove(id) {
            Some(_) => {
                debug!(id = %id, live = self.stacks.len(), "deleted stack");
                Ok(())
            }
            None => Err(StoreError::UnknownId(id.clone())),
        }
    }

    /// Number of live instances.
    pub fn len(&self) -> usize {
        self.stacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stacks.is_empty()
    }

    /// Removes instances idle past the TTL, returning how many went.
    ///
    /// A no-op when expiry is disabled.
    pub fn purge_expired(&self) -> usize {
        let Some(ttl) = self.ttl else { return 0 };
        let before = self.stacks.len();
        self.stacks.retain(|_, stack| !stack.idle_longer_than(ttl));
        let purged = before.saturating_sub(self.stacks.len());
        if purged > 0 {
            debug!(purged, live = self.stacks.len(), "purged expired stacks");
        }
        purged
    }

    /// Occupancy snapshot for listings.
    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            max_stacks: self.max_stacks,
            depths: self
                .stacks
                .iter()
                .map(|entry| (entry.value().len(), entry.value().max_depth()))
                .collect(),
        }
    }
}

impl std::fmt::Debug for StackRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StackRegistry")
            .field("live", &self.stacks.len())
            .field("max_stacks", &self.max_stacks)
            .field("max_depth", &self.max_depth)
            .field("ttl", &self.ttl)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> StackRegistry {
        StackRegistry::new(8, 16, None)
    }

    #[test]
    fn test_create_resolve_delete_lifecycle() {
        let reg = registry();
        let id = reg.create().unwrap();
        assert_eq!(reg.len(), 1);

        let stack = reg.resolve(&id).unwrap();
        stack.push("x".to_string()).unwrap();
        assert_eq!(reg.resolve(&id).unwrap().len(), 1);

        reg.delete(&id).unwrap();
        assert!(reg.is_empty());
        assert_eq!(reg.resolve(&id), Err(StoreError::UnknownId(id.clone())));
    }

    #[test]
    fn test_resolve_unknown_id_fails() {
        let reg = registry();
        let id = StackId::from("xyz999");
        assert_eq!(reg.resolve(&id), Err(StoreError::UnknownId(id)));
    }

    #[test]
    fn test_delete_is_idempotent_in_its_error() {
        let reg = registry();
        let id = reg.create().unwrap();
        reg.delete(&id).unwrap();
        assert_eq!(reg.delete(&id), Err(StoreError::UnknownId(id.clone())));
        assert_eq!(reg.delete(&id), Err(StoreError::UnknownId(id)));
    }

    #[test]
    fn test_identifier_resolves_to_the_same_instance() {
        let reg = registry();
        let id = reg.create().unwrap();
        reg.resolve(&id).unwrap().push("a".to_string()).unwrap();
        reg.resolve(&id).unwrap().push("b".to_string()).unwrap();
        assert_eq!(reg.resolve(&id).unwrap().pop().unwrap(), "b");
    }

    #[test]
    fn test_stacks_are_isolated() {
        let reg = registry();
        let a = reg.create().unwrap();
        let b = reg.create().unwrap();
        assert_ne!(a, b);

        reg.resolve(&a).unwrap().push("only-in-a".to_string()).unwrap();
        assert_eq!(reg.resolve(&a).unwrap().len(), 1);
        assert_eq!(reg.resolve(&b).unwrap().len(), 0);
        assert_eq!(reg.resolve(&b).unwrap().pop(), Err(StoreError::Empty));
    }

    #[test]
    fn test_create_fails_at_instance_bound() {
        let reg = StackRegistry::new(2, 16, None);
        reg.create().unwrap();
        reg.create().unwrap();
        assert_eq!(reg.create(), Err(StoreError::RegistryFull { limit: 2 }));

        // Deleting frees capacity again.
        let stats = reg.stats();
        assert_eq!(stats.len(), 2);
    }

    #[test]
    fn test_delete_frees_capacity() {
        let reg = StackRegistry::new(1, 16, None);
        let id = reg.create().unwrap();
        assert!(reg.create().is_err());
        reg.delete(&id).unwrap();
        assert!(reg.create().is_ok());
    }

    #[test]
    fn test_purge_expired_reclaims_idle_stacks() {
        let reg = StackRegistry::new(8, 16, Some(Duration::from_millis(20)));
        let id = reg.create().unwrap();
        assert_eq!(reg.purge_expired(), 0);

        std::thread::sleep(Duration::from_millis(40));
        assert_eq!(reg.purge_expired(), 1);
        assert_eq!(reg.resolve(&id), Err(StoreError::UnknownId(id)));
    }

    #[test]
    fn test_resolve_refreshes_the_idle_deadline() {
        let reg = StackRegistry::new(8, 16, Some(Duration::from_millis(50)));
        let id = reg.create().unwrap();

        for _ in 0..4 {
            std::thread::sleep(Duration::from_millis(25));
            reg.resolve(&id).unwrap();
        }
        assert_eq!(reg.purge_expired(), 0);
        assert!(reg.resolve(&id).is_ok());
    }

    #[test]
    fn test_purge_is_a_no_op_without_ttl() {
        let reg = registry();
        reg.create().unwrap();
        std::thread::sleep(Duration::from_millis(10));
        assert_eq!(reg.purge_expired(), 0);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_stats_reports_depths_without_ids() {
        let reg = registry();
        let id = reg.create().unwrap();
        reg.create().unwrap();
        reg.resolve(&id).unwrap().push("v".to_string()).unwrap();

        let stats = reg.stats();
        assert_eq!(stats.max_stacks, 8);
        assert_eq!(stats.len(), 2);
        let mut depths: Vec<usize> = stats.depths.iter().map(|(d, _)| *d).collect();
        depths.sort_unstable();
        assert_eq!(depths, vec![0, 1]);
        assert!(stats.depths.iter().all(|(_, cap)| *cap == 16));
    }

    #[test]
    fn test_concurrent_creates_respect_the_bound() {
        let reg = std::sync::Arc::new(StackRegistry::new(16, 4, None));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let reg = std::sync::Arc::clone(&reg);
                std::thread::spawn(move || {
                    let mut created = 0;
                    for _ in 0..4 {
                        if reg.create().is_ok() {
                            created += 1;
                        }
                    }
                    created
                })
            })
            .collect();

        let created: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(created, 16);
        assert_eq!(reg.len(), 16);
    }
}
