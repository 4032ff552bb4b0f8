//! Property-based tests for the statblock parsers
//!
//! Property tests verify invariants that should hold for all inputs, rather
//! than testing specific cases.
//!
//! ## Running Property Tests
//!
//! ```sh
//! cargo test property --release
//! ```
//!
//! ## Test Modules
//!
//! - `normalizer_props`: text normalization
//!   - Idempotent on any input
//!   - No carriage returns, tabs, long dashes or double spaces survive
//!
//! - `splitter_props`: chunk detection
//!   - Never returns an empty list
//!   - `===` separators and blank lines yield one chunk per block
//!   - Tier headers yield one chunk per actor, starting at its name
//!
//! - `annotator_props`: dice wrapping and action detection
//!   - Wrapping never double-wraps
//!   - One roll marker per dice expression
//!   - Detected damage formulas survive annotation
//!
//! ## Configuration
//!
//! By default, proptest runs 256 cases per property. This can be configured
//! via the `PROPTEST_CASES` environment variable:
//!
//! ```sh
//! PROPTEST_CASES=1000 cargo test property --release
//! ```

mod annotator_props;
mod normalizer_props;
mod splitter_props;
