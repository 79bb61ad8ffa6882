//! Shared data structures for the EM-induction measurement pipeline
//!
//! The central type is [`Reading`]: one sensor sample plus every field the
//! processing stages derive from it. Downstream consumers (storage, export,
//! visualization, classification) receive fully processed readings as plain
//! serialized data and never call back into the pipeline.

mod reading;

pub use reading::*;
