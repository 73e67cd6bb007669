/*!
Suffix-array-driven binary delta compressor and patcher.

`ddelta` produces and consumes the `DDELTA40` patch format: a simplified,
uncompressed derivative of BSDIFF that retains its control/diff/extra
triplet structure and its suffix-array-driven approximate matching, but lays
each of the three logical streams out sequentially in a single file instead
of running them through an outer entropy coder.

```
use std::io::Cursor;

fn round_trip(old: &[u8], new: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut patch = Vec::new();
    ddelta::generate(old, new, &mut patch, |_| {}).unwrap();

    let mut reconstructed = Vec::new();
    ddelta::apply(&mut Cursor::new(old), &mut reconstructed, &mut Cursor::new(&patch[..])).unwrap();
    Ok(reconstructed)
}
```

Only the patch format is a compatibility promise; the exact bytes a given
version of the generator produces are not (though they are deterministic for
a fixed input, see [`generate`]).
*/

mod diff;
mod error;
mod patch;
mod wire;

pub use diff::{generate, State, MAX_LENGTH};
pub use error::{ApplyError, GenerateError};
pub use patch::apply;
pub use wire::MAGIC as DDELTA_MAGIC;
