//! Trust anchor assembly
//!
//! The store is seeded from the embedded bootstrap root, a public root
//! program feed, or a local PEM bundle. All three go through one PEM intake
//! path.

pub mod bootstrap;
pub mod feed;
pub mod store;

pub use bootstrap::BOOTSTRAP_ROOT_PEM;
pub use feed::{parse_feed, unwrap_pem_cell, FeedFetcher, DEFAULT_FEED_URL};
pub use store::{AnchorSource, FeedSummary, TrustAnchor, TrustAnchorStore};
