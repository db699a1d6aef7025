//! `shimbind check` command

use anyhow::{bail, Result};

use crate::cli::CheckArgs;
use crate::commands::load;
use shimbind::ops::check;
use shimbind::util::diagnostic::suggestions;

pub fn execute(args: CheckArgs, color: bool) -> Result<()> {
    let loaded = load(&args.model, color)?;
    let summary = check(&loaded.model);

    if !summary.is_ok() {
        bail!("{}\n{}", summary, suggestions::RESOLVE_FAILED);
    }

    println!("{}", summary);
    Ok(())
}
