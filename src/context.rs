//! Block-level execution context.

/// The block context supplied to every transition.
///
/// Time advances only with block headers; transitions never read a wall
/// clock. Both fields come from the header of the block currently being
/// executed, so every replica sees identical values.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BlockContext {
    /// Height of the current block.
    pub height: i64,
    /// Header time of the current block, in unix seconds.
    pub time_seconds: i64,
}

impl BlockContext {
    /// Creates a context for the given block height and header time.
    pub fn new(height: i64, time_seconds: i64) -> Self {
        BlockContext {
            height,
            time_seconds,
        }
    }
}
