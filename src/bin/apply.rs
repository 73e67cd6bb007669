use std::fs;
use std::io::{BufWriter, Cursor};
use std::process::ExitCode;

use argh::FromArgs;

/// apply a DDELTA40 patch to OLD, writing the reconstructed file to NEW
#[derive(FromArgs)]
struct Args {
    /// path to the old (source) file
    #[argh(positional)]
    old: String,

    /// path to write the reconstructed (new) file to
    #[argh(positional)]
    new: String,

    /// path to the patch to apply
    #[argh(positional)]
    patch: String,
}

fn main() -> ExitCode {
    let args: Args = argh::from_env();

    let old = match fs::read(&args.old) {
        Ok(data) => data,
        Err(e) => {
            eprintln!("apply: could not read old file {:?}: {e}", args.old);
            return ExitCode::FAILURE;
        }
    };
    let patch = match fs::read(&args.patch) {
        Ok(data) => data,
        Err(e) => {
            eprintln!("apply: could not read patch file {:?}: {e}", args.patch);
            return ExitCode::FAILURE;
        }
    };
    let new_file = match fs::File::create(&args.new) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("apply: could not create new file {:?}: {e}", args.new);
            return ExitCode::FAILURE;
        }
    };

    let mut new = BufWriter::new(new_file);
    match ddelta::apply(&mut Cursor::new(&old[..]), &mut new, &mut Cursor::new(&patch[..])) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("apply: {e}");
            ExitCode::FAILURE
        }
    }
}
