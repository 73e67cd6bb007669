//! Patch application: read header, replay diff/extra record pairs against
//! the old file, seek, repeat until the terminator record.

use std::io::{self, Read, Seek, SeekFrom, Write};
use std::mem::size_of;

use zerocopy::Ref;

use crate::error::ApplyError;
use crate::wire::{EntryHeader, PatchHeader, MAGIC};

type Result<T> = std::result::Result<T, ApplyError>;

const BLOCK_SIZE: u64 = 32 * 1024;

/// Reads a fixed-size, zerocopy-decodable header type from `reader`. The
/// terminator record is mandatory, so a stream that runs out before one
/// arrives is `PATCH_IO`, not a distinct short-read kind — `PATCH_SHORT` is
/// reserved for a terminator that arrives structurally intact but too
/// early (see the `bytes_written` check in [`apply`]).
macro_rules! read_header {
    ($reader:expr, $type:ty) => {{
        let mut buf = [0u8; size_of::<$type>()];
        $reader
            .read_exact(&mut buf)
            .map_err(ApplyError::PatchIo)
            .and_then(|_| {
                Ref::<_, $type>::from_bytes(&buf[..])
                    .map(|data| *data)
                    .map_err(|_| {
                        ApplyError::PatchIo(io::Error::new(
                            io::ErrorKind::InvalidData,
                            "header bytes not aligned",
                        ))
                    })
            })
    }};
}

fn apply_diff(
    patch_f: &mut impl Read,
    old_f: &mut impl Read,
    new_f: &mut impl Write,
    mut size: u64,
) -> Result<()> {
    let mut old = [0u8; BLOCK_SIZE as usize];
    let mut patch = [0u8; BLOCK_SIZE as usize];
    while size > 0 {
        let to_read = BLOCK_SIZE.min(size) as usize;
        let old = &mut old[..to_read];
        let patch = &mut patch[..to_read];

        patch_f.read_exact(patch).map_err(ApplyError::PatchIo)?;
        old_f.read_exact(old).map_err(ApplyError::OldIo)?;

        old.iter_mut()
            .zip(patch.iter())
            .for_each(|(old, patch)| *old = old.wrapping_add(*patch));

        new_f.write_all(old).map_err(ApplyError::NewIo)?;

        size -= to_read as u64;
    }
    Ok(())
}

fn copy_bytes(src: &mut impl Read, dst: &mut impl Write, mut bytes: u64) -> Result<()> {
    let mut buf = [0u8; BLOCK_SIZE as usize];
    while bytes > 0 {
        let to_read = BLOCK_SIZE.min(bytes) as usize;
        let buf = &mut buf[..to_read];
        src.read_exact(buf).map_err(ApplyError::PatchIo)?;
        dst.write_all(buf).map_err(ApplyError::NewIo)?;
        bytes -= to_read as u64;
    }
    Ok(())
}

/// Applies a `DDELTA40` patch read from `patch`, reconstructing the *new*
/// stream by replaying each diff/extra record against `old` (seekable,
/// since a negative `seek` field may rewind it) and writing the result to
/// `new`.
pub fn apply(old: &mut (impl Read + Seek), new: &mut impl Write, patch: &mut impl Read) -> Result<()> {
    let header = read_header!(patch, PatchHeader)?;
    if header.magic != MAGIC {
        return Err(ApplyError::Magic);
    }

    let mut bytes_written = 0u64;
    loop {
        let entry = read_header!(patch, EntryHeader)?;
        if entry.is_terminator() {
            return if bytes_written == header.new_file_size.get() {
                Ok(())
            } else {
                Err(ApplyError::PatchShort)
            };
        }

        apply_diff(patch, old, new, entry.diff.get())?;
        copy_bytes(patch, new, entry.extra.get())?;
        old.seek(SeekFrom::Current(entry.seek.get()))
            .map_err(ApplyError::OldIo)?;
        bytes_written += entry.diff.get() + entry.extra.get();
    }
}
