use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

lazy_static::lazy_static! {
    static ref TARGET_LOCKS: Mutex<HashMap<String, Arc<Mutex<()>>>> = Mutex::new(HashMap::new());
}

/// The process-wide lock serialising all access to one store target.
pub(crate) fn target_lock(target: &str) -> Arc<Mutex<()>> {
    let mut locks = TARGET_LOCKS
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    locks
        .entry(target.to_string())
        .or_insert_with(|| Arc::new(Mutex::new(())))
        .clone()
}

/// A panic in another holder leaves nothing half-done in `()`, so poisoning is ignored.
pub(crate) fn hold(lock: &Mutex<()>) -> MutexGuard<'_, ()> {
    lock.lock().unwrap_or_else(PoisonError::into_inner)
}
