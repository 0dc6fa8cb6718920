use crate::cli::NormalizeArgs;
use deployctl_core::{NormalizeOptions, normalize_name};

pub fn execute(args: NormalizeArgs) -> anyhow::Result<()> {
    let options = NormalizeOptions {
        version: !args.strip_version,
    };
    println!("{}", normalize_name(&args.name, options));
    Ok(())
}
