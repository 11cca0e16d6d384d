//! Community feedback aggregation.
//!
//! - **FeedbackAggregator**: tau_neg smoothing and fixed-vector negative ratio
//! - **FeedbackStore**: per-subject event history capability
//! - **InMemoryFeedbackStore**: bounded in-process store (30 events per subject)

pub mod aggregator;
pub mod store;

pub use aggregator::FeedbackAggregator;
pub use store::{FeedbackStore, InMemoryFeedbackStore};
