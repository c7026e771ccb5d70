//! Atomic execution of state transitions.

use crate::store::{BufStore, Store};
use crate::Result;

/// Runs `op` against a write buffer over the given store, flushing the
/// buffer into the store only if `op` succeeds.
///
/// On error the buffer is dropped, leaving the store untouched: a failed
/// transition never partial-writes.
pub fn step_atomic<S, F, T>(store: &mut S, op: F) -> Result<T>
where
    S: Store,
    F: FnOnce(&mut BufStore<&mut S>) -> Result<T>,
{
    let mut buf = BufStore::wrap(store);
    let res = op(&mut buf)?;
    buf.flush()?;
    Ok(res)
}
