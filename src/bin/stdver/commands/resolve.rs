//! `stdver resolve` command

use anyhow::Result;
use serde::Serialize;

use crate::cli::ResolveArgs;
use stdver::ops::resolve_revision;
use stdver::stdlib::MODULE_PATH;
use stdver::util::{CancelToken, GlobalContext};

#[derive(Serialize)]
struct ResolveOutput<'a> {
    module_path: &'a str,
    requested: &'a str,
    version: &'a str,
    hash: &'a str,
    commit_time: String,
}

pub fn execute(args: ResolveArgs, ctx: &GlobalContext, cancel: &CancelToken) -> Result<()> {
    let backend = ctx.backend()?;
    let (_checkout, revision) = resolve_revision(backend.as_ref(), &args.version, cancel)?;

    let output = ResolveOutput {
        module_path: MODULE_PATH,
        requested: &args.version,
        version: &revision.version,
        hash: &revision.hash,
        commit_time: revision.commit_time.to_rfc3339(),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}@{}", output.module_path, output.version);
        println!("  commit: {}", output.hash);
        println!("  time:   {}", output.commit_time);
    }
    Ok(())
}
