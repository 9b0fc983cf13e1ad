#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::module_name_repetitions)]

//! Staging backends built on external transfer clients.
//!
//! Layout: `gsutil.rs` (cloud bucket, fail-fast), `rsync.rs` (remote host over
//! ssh, best-effort).

pub mod gsutil;
pub mod rsync;

pub use gsutil::{DEFAULT_GSUTIL_PROGRAM, GSUTIL_SCHEME, GsutilStaging};
pub use rsync::{DEFAULT_RSYNC_PROGRAM, DEFAULT_SSH_PROGRAM, RSYNC_SCHEME, RsyncStaging};
