//! `shimbind graph` command

use anyhow::Result;

use crate::cli::GraphArgs;
use crate::commands::load;

pub fn execute(args: GraphArgs, color: bool) -> Result<()> {
    let loaded = load(&args.model, color)?;
    let graph = loaded.model.graph();

    if graph.is_empty() {
        println!("(no shims)");
        return Ok(());
    }

    if args.dot {
        print!("{}", graph.to_dot());
    } else {
        print!("{}", graph.render_tree(args.depth.unwrap_or(usize::MAX)));
    }
    Ok(())
}
