//! `stdver clone` command

use anyhow::{Context, Result};

use crate::cli::CloneArgs;
use stdver::ops::resolve_version;
use stdver::util::{CancelToken, GlobalContext};

pub fn execute(args: CloneArgs, ctx: &GlobalContext, cancel: &CancelToken) -> Result<()> {
    let backend = ctx.backend()?;
    let version = resolve_version(backend.as_ref(), &args.version, cancel)?;

    std::fs::create_dir_all(&args.dest)
        .with_context(|| format!("failed to create directory: {}", args.dest.display()))?;
    let hash = backend.clone_ref(&version, &args.dest, cancel)?;

    println!("Cloned {} at {} into {}", version, hash, args.dest.display());
    Ok(())
}
