//! `stdver classify` command

use anyhow::Result;

use crate::cli::ClassifyArgs;
use stdver::core::version::is_incompatible;
use stdver::parse_type;

pub fn execute(args: ClassifyArgs) -> Result<()> {
    let ty = parse_type(&args.version)?;
    if is_incompatible(&args.version) {
        println!("{} (incompatible)", ty);
    } else {
        println!("{}", ty);
    }
    Ok(())
}
