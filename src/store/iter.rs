//! Iteration for stores.

use std::ops::{Bound, RangeBounds};

use crate::store::{Read, KV};
use crate::Result;

/// An iterator over key-value entries in a [Read] type, ascending by key.
///
/// `Iter` is typically created by calling `read.into_iter(some_range)`.
/// Under the hood it calls [Read::get_next] and tracks its position, so it
/// holds no reference into the store's internals and may be dropped at any
/// point.
pub struct Iter<S> {
    parent: S,
    bounds: (Bound<Vec<u8>>, Bound<Vec<u8>>),
    done: bool,
}

impl<S: Read> Iter<S> {
    /// Creates a new iterator over entries in `parent` within the given
    /// range bounds.
    pub fn new(parent: S, bounds: (Bound<Vec<u8>>, Bound<Vec<u8>>)) -> Self {
        Iter {
            parent,
            bounds,
            done: false,
        }
    }
}

impl<S: Read> Iterator for Iter<S> {
    type Item = Result<KV>;

    fn next(&mut self) -> Option<Result<KV>> {
        if self.done {
            return None;
        }

        let maybe_entry = match self.bounds.0 {
            // if an entry exists at the empty key, emit it, else the next one
            Bound::Unbounded => self.parent.get_next_inclusive(&[]).transpose(),

            // if an entry exists at the given key, emit it, else the next one
            Bound::Included(ref key) => self.parent.get_next_inclusive(key).transpose(),

            // strictly next entry
            Bound::Excluded(ref key) => self.parent.get_next(key).transpose(),
        };

        match maybe_entry {
            Some(Err(err)) => Some(Err(err)),

            Some(Ok((key, value))) => {
                if !self.bounds.contains(&key) {
                    self.done = true;
                    return None;
                }

                self.bounds.0 = Bound::Excluded(key.clone());
                Some(Ok((key, value)))
            }

            None => {
                self.done = true;
                None
            }
        }
    }
}
