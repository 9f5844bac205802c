//! Purpose: Shared core library crate used by the `itemstat` CLI and tests.
//! Exports: `core` (decimal canonicalization, sizing, statistics, errors).
//! Role: Internal library backing the binary; not yet a stable public SDK.
//! Invariants: Treat the crate API as internal until a dedicated library release.
//! Invariants: Core modules are pure functions over immutable inputs; all I/O
//! lives in the binary.
pub mod core;
