//! `stdver latest` command

use anyhow::Result;

use crate::cli::LatestArgs;
use stdver::core::version::is_valid;
use stdver::latest_of;
use stdver::util::Error;

pub fn execute(args: LatestArgs) -> Result<()> {
    if let Some(bad) = args.versions.iter().find(|v| !is_valid(v)) {
        return Err(Error::invalid_argument(format!("`{}` is not a valid version", bad)).into());
    }

    let latest = latest_of(&args.versions)
        .ok_or_else(|| Error::invalid_argument("no versions given"))?;
    println!("{}", latest);
    Ok(())
}
