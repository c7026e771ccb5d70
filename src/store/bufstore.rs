//! A store which buffers writes to another store.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::ops::Bound;

use crate::store::{Empty, Read, Write, KV};
use crate::{Error, Result};

/// An in-memory map containing values modified by writes to a [BufStore].
/// `None` marks a deletion shadowing the backing store.
pub type Map = BTreeMap<Vec<u8>, Option<Vec<u8>>>;

/// A simple store which keeps all of its data in memory.
pub type MapStore = BufStore<Empty>;

/// Wraps a store and records mutations in an in-memory map, so that
/// modifications do not affect the underlying store until `flush` is called.
pub struct BufStore<S> {
    map: Map,
    store: S,
}

impl<S: Read + Default> BufStore<S> {
    /// Constructs a `BufStore` wrapping the default value of the inner
    /// store.
    #[inline]
    pub fn new() -> Self {
        Default::default()
    }
}

impl<S: Read + Default> Default for BufStore<S> {
    #[inline]
    fn default() -> Self {
        Self {
            map: Default::default(),
            store: Default::default(),
        }
    }
}

impl<S> BufStore<S> {
    /// Constructs a `BufStore` by wrapping the given store. Reads check the
    /// in-memory buffer first, then fall through to the wrapped store.
    #[inline]
    pub fn wrap(store: S) -> Self {
        BufStore {
            store,
            map: Default::default(),
        }
    }

    /// Drains the in-memory buffer, applying all of its writes to the
    /// wrapped store.
    #[inline]
    pub fn flush(&mut self) -> Result<()>
    where
        S: Write,
    {
        while let Some((key, value)) = self.map.pop_first() {
            match value {
                Some(value) => self.store.put(key, value)?,
                None => self.store.delete(key.as_slice())?,
            }
        }
        Ok(())
    }
}

impl<S: Read> Read for BufStore<S> {
    #[inline]
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        match self.map.get(key) {
            Some(Some(value)) => Ok(Some(value.clone())),
            Some(None) => Ok(None),
            None => self.store.get(key),
        }
    }

    #[inline]
    fn get_next(&self, key: &[u8]) -> Result<Option<KV>> {
        let bounds = (Bound::Excluded(key.to_vec()), Bound::Unbounded);
        let mut map_iter = self
            .map
            .range::<Vec<u8>, _>(bounds.clone())
            .map(|(k, v)| (k.clone(), v.clone()));
        let mut store_iter = (&self.store).into_iter(bounds);
        merge_next(&mut map_iter, &mut store_iter)
    }
}

/// Takes an iterator over entries in the write buffer and an iterator over
/// entries in the backing store, and yields the next entry in ascending
/// order. Buffer entries shadow backing entries with the same key, and
/// buffered deletions skip the key entirely.
fn merge_next<M, S>(map_iter: &mut M, store_iter: &mut S) -> Result<Option<KV>>
where
    M: Iterator<Item = (Vec<u8>, Option<Vec<u8>>)>,
    S: Iterator<Item = Result<KV>>,
{
    let mut map_iter = map_iter.peekable();
    let mut store_iter = store_iter.peekable();

    loop {
        let has_map_entry = map_iter.peek().is_some();
        let has_backing_entry = store_iter.peek().is_some();

        return Ok(match (has_map_entry, has_backing_entry) {
            (false, false) => None,

            // backing store exhausted, emit the next non-deleted buffer entry
            (true, false) => match map_iter.next().unwrap() {
                (key, Some(value)) => Some((key, value)),
                (_, None) => continue,
            },

            // buffer exhausted, emit the next backing entry
            (false, true) => store_iter.next().transpose()?,

            (true, true) => {
                let map_key = &map_iter.peek().unwrap().0;
                let backing_key = match store_iter.peek().unwrap() {
                    Err(_) => return Err(Error::Store("Backing key does not exist".into())),
                    Ok((ref key, _)) => key,
                };

                // backing entry comes first, emit it
                if map_key.cmp(backing_key) == Ordering::Greater {
                    let entry = store_iter.next().unwrap()?;
                    return Ok(Some(entry));
                }

                // equal keys: the buffer entry shadows the backing entry
                if map_key.cmp(backing_key) == Ordering::Equal {
                    store_iter.next();
                }

                match map_iter.next().unwrap() {
                    (key, Some(value)) => Some((key, value)),
                    (_, None) => continue,
                }
            }
        });
    }
}

impl<S: Read> Write for BufStore<S> {
    #[inline]
    fn put(&mut self, key: Vec<u8>, value: Vec<u8>) -> Result<()> {
        self.map.insert(key, Some(value));
        Ok(())
    }

    #[inline]
    fn delete(&mut self, key: &[u8]) -> Result<()> {
        self.map.insert(key.to_vec(), None);
        Ok(())
    }
}
