//! `stdver branches` command

use anyhow::Result;

use crate::cli::BranchesArgs;
use stdver::ops::resolve_supported_branches;
use stdver::util::{CancelToken, GlobalContext};

pub fn execute(args: BranchesArgs, ctx: &GlobalContext, cancel: &CancelToken) -> Result<()> {
    let backend = ctx.backend()?;
    let branches = resolve_supported_branches(backend.as_ref(), cancel)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&branches)?);
    } else {
        for (branch, hash) in &branches {
            println!("{} {}", branch, hash);
        }
    }
    Ok(())
}
