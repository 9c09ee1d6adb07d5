//! Gemfall (workspace facade crate).
//!
//! Re-exports the match-3 engine under one name while the implementation
//! lives in dedicated crates under `crates/`.

pub use gemfall_core as core;
pub use gemfall_engine as engine;
pub use gemfall_types as types;
