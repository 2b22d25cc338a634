use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use metrics::counter;
use tracing::warn;

/// Read `lock`, continuing with the inner value if a writer panicked.
pub(crate) fn rw_read<'a, T>(
    lock: &'a RwLock<T>,
    owner: &'static str,
    op: &'static str,
) -> RwLockReadGuard<'a, T> {
    lock.read()
        .unwrap_or_else(|poisoned| recover(poisoned, owner, op, "read"))
}

pub(crate) fn rw_write<'a, T>(
    lock: &'a RwLock<T>,
    owner: &'static str,
    op: &'static str,
) -> RwLockWriteGuard<'a, T> {
    lock.write()
        .unwrap_or_else(|poisoned| recover(poisoned, owner, op, "write"))
}

fn recover<G>(
    poisoned: PoisonError<G>,
    owner: &'static str,
    op: &'static str,
    mode: &'static str,
) -> G {
    counter!("brewcache_lock_recovered_total", "owner" => owner).increment(1);
    warn!(
        target = "brewcache::cache::lock",
        owner,
        op,
        mode,
        "query state lock was poisoned; continuing with its last contents"
    );
    poisoned.into_inner()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use super::*;
    use crate::cache::QueryKey;

    #[test]
    fn poisoned_state_keeps_its_entries() {
        let lock = Arc::new(RwLock::new(HashMap::from([(QueryKey::Posts, 1_u32)])));
        let poisoner = Arc::clone(&lock);
        let _ = std::thread::spawn(move || {
            let mut guard = poisoner.write().expect("first writer");
            guard.insert(QueryKey::Authors, 2);
            panic!("writer panicked mid-update");
        })
        .join();

        assert!(lock.is_poisoned());
        rw_write(&lock, "test", "record").insert(QueryKey::Categories, 3);

        let state = rw_read(&lock, "test", "peek");
        assert_eq!(state.get(&QueryKey::Posts), Some(&1));
        assert_eq!(state.get(&QueryKey::Authors), Some(&2));
        assert_eq!(state.get(&QueryKey::Categories), Some(&3));
    }
}
