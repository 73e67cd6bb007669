//! Flat, non-hierarchical error kinds for the generator and the applier.
//!
//! Each variant corresponds exactly to one `E_*` kind from the format
//! specification. Errors are surfaced, never recovered internally; a CLI
//! front end matches on these to print a single diagnostic line.

use std::io;

/// Failure modes of [`crate::generate`].
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    /// The *old* file could not be read, or is too large to index (length
    /// must fit in a signed 32-bit integer).
    #[error("old file I/O error: {0}")]
    OldIo(#[source] io::Error),

    /// The *new* file could not be read, or is too large to scan.
    #[error("new file I/O error: {0}")]
    NewIo(#[source] io::Error),

    /// Suffix array construction failed, or internal geometry produced a
    /// negative-length span. The latter is a bug-or-corruption signal and
    /// should never occur on correct input.
    #[error("internal algorithm error: {0}")]
    Algo(String),

    /// Writing the patch stream failed.
    #[error("patch file I/O error: {0}")]
    PatchIo(#[source] io::Error),
}

/// Failure modes of [`crate::apply`].
#[derive(Debug, thiserror::Error)]
pub enum ApplyError {
    /// The first eight bytes of the patch stream are not `DDELTA40`.
    #[error("patch has invalid magic, expected DDELTA40")]
    Magic,

    /// Reading the patch stream failed or ended unexpectedly before a
    /// terminator record was seen.
    #[error("patch file I/O error: {0}")]
    PatchIo(#[source] io::Error),

    /// Reading or seeking the *old* source failed.
    #[error("old file I/O error: {0}")]
    OldIo(#[source] io::Error),

    /// Writing the *new* sink failed.
    #[error("new file I/O error: {0}")]
    NewIo(#[source] io::Error),

    /// The terminator record arrived before `new_file_size` bytes had been
    /// written: the patch is structurally short.
    #[error("patch ended before the declared new file size was reached")]
    PatchShort,
}
