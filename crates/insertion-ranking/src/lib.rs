//! insertion-ranking - an embeddable, always-sorted ranking list.
//!
//! A [`RankedCollection`] keeps keyed elements ordered best-first by a
//! vector of up to [`MAX_FACTOR`] sort factors, gives each element a
//! growable array of typed [`Value`] slots, and persists the lot to a
//! single binary file.
//!
//! A factor update moves one element by adjacent swaps, so it costs the
//! distance between its old and new rank rather than a full resort.
//!
//! # Module layout
//!
//! | Module | Contents |
//! |--------|----------|
//! [`value`] | [`Value`] payload variant and its wire tags |
//! [`factors`] | [`SortKey`] and the lexicographic comparator |
//! [`element`] | [`Element`], one ranked entry and its payload |
//! `store` | rank-ordered array, key index, shift-up/shift-down |
//! [`collection`] | [`RankedCollection`], the public API |
//! [`codec`] | save/load, [`Decoder`] streaming parser |
//! `dump` | plain-text table rendering |

pub mod codec;
pub mod collection;
pub mod constants;
mod dump;
pub mod element;
pub mod error;
pub mod factors;
pub mod options;
mod store;
pub mod value;

pub use codec::{Decoder, Progress, SaveOutcome};
pub use collection::RankedCollection;
pub use constants::{MAX_FACTOR, MAX_VALUE};
pub use element::Element;
pub use error::{MalformedFile, RankingError, Result};
pub use factors::{compare, SortKey};
pub use options::RankingOptions;
pub use store::Reposition;
pub use value::{Value, ValueTag};
