//! `stdver versions` command

use anyhow::Result;

use crate::cli::VersionsArgs;
use stdver::ops::versions;
use stdver::util::{CancelToken, GlobalContext};

pub fn execute(args: VersionsArgs, ctx: &GlobalContext, cancel: &CancelToken) -> Result<()> {
    let backend = ctx.backend()?;
    let versions = versions(backend.as_ref(), cancel)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&versions)?);
    } else {
        for version in &versions {
            println!("{}", version);
        }
    }
    Ok(())
}
