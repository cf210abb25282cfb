//! Cross-crate tests for the relay and the studio session; see `tests/`.
