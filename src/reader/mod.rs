//! # Stream Reader Module
//!
//! Decodes a colstream byte stream back into Arrow record batches: the
//! schema message first, then one batch per message until the end-of-stream
//! marker.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::fs::File;
//! use std::io::BufReader;
//! use colstream::reader::StreamReader;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let file = BufReader::new(File::open("batches.colstream")?);
//! let reader = StreamReader::new(file)?;
//! println!("schema: {}", reader.schema());
//! for batch in reader {
//!     let batch = batch?;
//!     println!("{} rows", batch.num_rows());
//! }
//! # Ok(())
//! # }
//! ```

mod error;
mod stream;


pub use error::ReaderError;
pub use stream::StreamReader;
