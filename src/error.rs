//! Shared error-code contract.
//!
//! Every error type surfaced to the dashboard carries a stable machine code
//! and a retry hint, so HTTP responses and state records can render the same
//! shape regardless of which layer failed.

pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}
