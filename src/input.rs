//! Input adapters turning source identifiers into SQL text blobs.
//!
//! Each adapter produces plain SQL text for the analyzer: `.sql` files are
//! read whole, MySQL general logs have their `Query` lines extracted.
//! Directory recursion lives in the orchestrator, not here.

pub mod general_log;
pub mod sql_file;
