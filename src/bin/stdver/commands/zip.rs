//! `stdver zip` command

use anyhow::Result;

use crate::cli::ZipArgs;
use stdver::ops::zip;
use stdver::util::{CancelToken, GlobalContext};

pub fn execute(args: ZipArgs, ctx: &GlobalContext, cancel: &CancelToken) -> Result<()> {
    let backend = ctx.backend()?;
    let archive = zip(backend.as_ref(), &args.version, cancel)?;

    if args.list {
        for name in archive.entry_names() {
            println!("{}", name);
        }
        if args.output.is_none() {
            return Ok(());
        }
    }

    let output = args.output.unwrap_or_else(|| {
        ctx.cwd()
            .join(format!("{}@{}.zip", archive.module_path(), archive.version()))
    });
    archive.write_to(&output)?;

    println!(
        "Wrote {} ({} files, sha256 {})",
        output.display(),
        archive.entry_names().len(),
        archive.sha256()
    );
    Ok(())
}
