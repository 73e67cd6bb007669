use std::fs;
use std::io::BufWriter;
use std::process::ExitCode;

use argh::FromArgs;

/// generate a DDELTA40 patch transforming OLD into NEW
#[derive(FromArgs)]
struct Args {
    /// path to the old (source) file
    #[argh(positional)]
    old: String,

    /// path to the new (target) file
    #[argh(positional)]
    new: String,

    /// path to write the patch to
    #[argh(positional)]
    patch: String,
}

fn main() -> ExitCode {
    let args: Args = argh::from_env();

    let old = match fs::read(&args.old) {
        Ok(data) => data,
        Err(e) => {
            eprintln!("generate: could not read old file {:?}: {e}", args.old);
            return ExitCode::FAILURE;
        }
    };
    let new = match fs::read(&args.new) {
        Ok(data) => data,
        Err(e) => {
            eprintln!("generate: could not read new file {:?}: {e}", args.new);
            return ExitCode::FAILURE;
        }
    };
    let patch_file = match fs::File::create(&args.patch) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("generate: could not create patch file {:?}: {e}", args.patch);
            return ExitCode::FAILURE;
        }
    };

    let mut patch = BufWriter::new(patch_file);
    match ddelta::generate(&old, &new, &mut patch, |_| {}) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("generate: {e}");
            ExitCode::FAILURE
        }
    }
}
