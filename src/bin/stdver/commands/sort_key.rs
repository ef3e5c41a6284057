//! `stdver sort-key` command

use anyhow::Result;

use crate::cli::SortKeyArgs;
use stdver::core::version::is_valid;
use stdver::for_sorting;
use stdver::util::Error;

pub fn execute(args: SortKeyArgs) -> Result<()> {
    for version in &args.versions {
        if !is_valid(version) {
            return Err(
                Error::invalid_argument(format!("`{}` is not a valid version", version)).into(),
            );
        }
        println!("{} {}", version, for_sorting(version));
    }
    Ok(())
}
