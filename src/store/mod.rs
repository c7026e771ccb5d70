//! Ordered key-value store traits and implementations.
//!
//! Everything the state machine persists goes through [Read] and [Write],
//! keyed by raw bytes. Iteration is ascending lexicographic only; no
//! transition may depend on any other order.

use std::ops::{Bound, RangeBounds};

use crate::Result;

mod atomic;
mod bufstore;
mod iter;

pub use atomic::step_atomic;
pub use bufstore::{BufStore, MapStore};
pub use iter::Iter;

/// A key-value entry.
pub type KV = (Vec<u8>, Vec<u8>);

/// Read access to an ordered keyspace.
pub trait Read {
    /// Gets the value at the given key, or `None` if no entry exists.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>>;

    /// Gets the entry with the smallest key strictly greater than the given
    /// key, or `None` if no such entry exists.
    fn get_next(&self, key: &[u8]) -> Result<Option<KV>>;

    /// Gets the entry at the given key if it exists, otherwise the next
    /// entry after it.
    #[inline]
    fn get_next_inclusive(&self, key: &[u8]) -> Result<Option<KV>> {
        if let Some(value) = self.get(key)? {
            return Ok(Some((key.to_vec(), value)));
        }
        self.get_next(key)
    }

    /// Returns an iterator over the entries within the given key range, in
    /// ascending key order.
    fn into_iter<B: RangeBounds<Vec<u8>>>(self, bounds: B) -> Iter<Self>
    where
        Self: Sized,
    {
        let bounds = (bounds.start_bound().cloned(), bounds.end_bound().cloned());
        Iter::new(self, bounds)
    }
}

/// Write access to an ordered keyspace.
pub trait Write: Read {
    /// Sets the value at the given key, replacing any previous entry.
    fn put(&mut self, key: Vec<u8>, value: Vec<u8>) -> Result<()>;

    /// Deletes the entry at the given key. Deleting a non-existent key is a
    /// no-op.
    fn delete(&mut self, key: &[u8]) -> Result<()>;
}

/// A readable and writable store.
pub trait Store: Read + Write {}

impl<S: Read + Write> Store for S {}

impl<S: Read + ?Sized> Read for &S {
    #[inline]
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        (**self).get(key)
    }

    #[inline]
    fn get_next(&self, key: &[u8]) -> Result<Option<KV>> {
        (**self).get_next(key)
    }
}

impl<S: Read + ?Sized> Read for &mut S {
    #[inline]
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        (**self).get(key)
    }

    #[inline]
    fn get_next(&self, key: &[u8]) -> Result<Option<KV>> {
        (**self).get_next(key)
    }
}

impl<S: Write + ?Sized> Write for &mut S {
    #[inline]
    fn put(&mut self, key: Vec<u8>, value: Vec<u8>) -> Result<()> {
        (**self).put(key, value)
    }

    #[inline]
    fn delete(&mut self, key: &[u8]) -> Result<()> {
        (**self).delete(key)
    }
}

/// A store which contains no entries.
#[derive(Default, Clone, Copy)]
pub struct Empty;

impl Read for Empty {
    #[inline]
    fn get(&self, _key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(None)
    }

    #[inline]
    fn get_next(&self, _key: &[u8]) -> Result<Option<KV>> {
        Ok(None)
    }
}

/// The half-open key range covering exactly the keys which start with the
/// given prefix.
pub fn prefix_bounds(prefix: &[u8]) -> (Bound<Vec<u8>>, Bound<Vec<u8>>) {
    let end = increment_bytes(prefix.to_vec());
    let end = if end.is_empty() {
        Bound::Unbounded
    } else {
        Bound::Excluded(end)
    };
    (Bound::Included(prefix.to_vec()), end)
}

// The smallest byte string greater than every string prefixed by the input,
// or empty if no such string exists (all bytes 0xff).
fn increment_bytes(mut bytes: Vec<u8>) -> Vec<u8> {
    while bytes.last() == Some(&0xff) {
        bytes.pop();
    }
    if let Some(last) = bytes.last_mut() {
        *last += 1;
    }
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn increment() {
        assert_eq!(increment_bytes(vec![0x31, 0x00]), vec![0x31, 0x01]);
        assert_eq!(increment_bytes(vec![0x31, 0xff]), vec![0x32]);
        assert_eq!(increment_bytes(vec![0xff, 0xff]), Vec::<u8>::new());
    }

    #[test]
    fn prefix_scan_stays_in_prefix() -> Result<()> {
        let mut store = MapStore::new();
        store.put(vec![0x31, 0x00], vec![1])?;
        store.put(vec![0x31, 0xff], vec![2])?;
        store.put(vec![0x32, 0x00], vec![3])?;

        let entries: Vec<KV> = (&store)
            .into_iter(prefix_bounds(&[0x31]))
            .collect::<Result<_>>()?;
        assert_eq!(
            entries,
            vec![(vec![0x31, 0x00], vec![1]), (vec![0x31, 0xff], vec![2])],
        );
        Ok(())
    }

    #[test]
    fn empty_store() -> Result<()> {
        assert_eq!(Empty.get(&[1])?, None);
        assert_eq!(Empty.get_next(&[])?, None);
        Ok(())
    }
}
