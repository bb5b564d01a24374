//! # Record Encoder Module
//!
//! The core of the crate: turns an Arrow record batch into a [`Payload`] —
//! serialized header bytes plus an ordered list of aligned body buffers.
//!
//! ## Design Principles
//!
//! 1. **Two explicit passes**: a depth-first traversal producing the ordered
//!    body buffer list and per-node field metadata, then a pure fold over
//!    that list computing byte offsets and padding. The 8-byte alignment
//!    invariant is checked where the fold ends, independently of traversal
//!    logic.
//!
//! 2. **Zero-copy where the layout allows**: buffers of unsliced arrays are
//!    shared into the payload by reference; only sliced or bit-shifted
//!    views are repacked.
//!
//! 3. **Ownership by refcount**: body buffers are `arrow::buffer::Buffer`
//!    handles, so the payload holds every buffer alive exactly until it is
//!    dropped, on every control-flow path.

mod error;
mod payload;
mod record;
mod truncate;


pub use error::EncodeError;
pub use payload::Payload;
pub use record::RecordEncoder;
