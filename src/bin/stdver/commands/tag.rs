//! `stdver tag` command

use anyhow::Result;

use crate::cli::TagArgs;
use stdver::stdlib::{tag_for_version, version_for_tag};
use stdver::util::Error;

pub fn execute(args: TagArgs) -> Result<()> {
    let mapped = if args.reverse {
        version_for_tag(&args.value)
            .ok_or_else(|| Error::not_found(format!("`{}` is not a release tag", args.value)))?
    } else {
        tag_for_version(&args.value)?
    };
    println!("{}", mapped);
    Ok(())
}
