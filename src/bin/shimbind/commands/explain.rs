//! `shimbind explain` command

use anyhow::Result;

use crate::cli::ExplainArgs;
use crate::commands::load;
use shimbind::ops::explain;
use shimbind::TypeRef;

pub fn execute(args: ExplainArgs, color: bool) -> Result<()> {
    let interface = TypeRef::parse(&args.interface)?;
    let loaded = load(&args.model, color)?;

    print!("{}", explain(&loaded.model, &interface)?);
    Ok(())
}
