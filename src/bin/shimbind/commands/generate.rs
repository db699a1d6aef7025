//! `shimbind generate` command

use anyhow::Result;

use crate::cli::GenerateArgs;
use crate::commands::load;
use shimbind::emit::{EmitOptions, RendererKind};
use shimbind::ops::{generate, GenerateOptions};
use shimbind::util::CancellationToken;

pub fn execute(args: GenerateArgs, color: bool) -> Result<()> {
    let loaded = load(&args.model, color)?;
    let config = &loaded.config;

    // CLI overrides config
    let renderer = match args.renderer.as_deref() {
        Some(name) => name.parse::<RendererKind>()?,
        None => config.renderer().unwrap_or_default(),
    };
    let namespace = args
        .namespace
        .unwrap_or_else(|| config.namespace().to_string());
    let output_dir = args.output_dir.unwrap_or_else(|| config.output_dir());
    let file_per_adapter = args.file_per_adapter || config.file_per_adapter();

    let opts = GenerateOptions {
        renderer,
        emit: EmitOptions {
            namespace,
            file_per_adapter,
        },
        output_dir,
        dry_run: args.dry_run,
    };

    let result = generate(&loaded.model, &opts, &CancellationToken::new())?;

    if opts.dry_run {
        println!("Would generate {} adapter(s):", result.adapters);
        for unit in &result.units {
            println!("  {}", opts.output_dir.join(unit).display());
        }
    } else {
        println!(
            "Generated {} adapter(s) in {} file(s) under {}",
            result.adapters,
            result.written.len(),
            opts.output_dir.display()
        );
    }
    println!("fingerprint: {}", result.fingerprint);

    Ok(())
}
