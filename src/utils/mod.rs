//! Utility functions for snapdrift.

pub mod cancel;

pub use cancel::CancellationToken;
