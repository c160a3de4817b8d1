//! Score normalization and hybrid fusion
//!
//! - normalize: per-topic min-max rescaling into `[0, 1]`
//! - fuser: `Fuser` trait with linear and reciprocal-rank implementations

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod fuser;
pub mod normalize;

pub use fuser::{
    fuse, fuse_top_k, fuser_from_config, validate_alpha, Fuser, LinearFuser, RrfFuser,
    DEFAULT_FUSED_TAG, DEFAULT_RRF_K,
};
pub use normalize::{min_max, normalize_run, normalize_scores, normalize_topic, SCORE_RANGE_EPSILON};
