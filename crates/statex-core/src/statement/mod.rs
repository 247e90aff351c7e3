//! Bank-independent statement parsing: segmentation, classification and
//! summaries.

pub mod classify;
pub mod rules;
pub mod segment;
pub mod summary;

pub use classify::{BalanceMove, BalanceTracker, Classification};
pub use segment::{Block, BlockLayout, Segmenter, LOOKAHEAD_LINES};
pub use summary::calculate_summary;
