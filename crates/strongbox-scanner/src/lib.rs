//! Strongbox Scanner Library
//!
//! Client for the clamd stream protocol, used as the scan gate in front of
//! file storage. The `frame` module holds the wire codec (no I/O of its own),
//! `client` the TCP protocol client, and `traits` the capability abstraction
//! that lets tests substitute an in-memory scanner.

pub mod client;
pub mod frame;
pub mod outcome;
pub mod traits;

// Re-export commonly used types
pub use client::ClamdClient;
pub use outcome::ScanOutcome;
pub use traits::VirusScanner;
