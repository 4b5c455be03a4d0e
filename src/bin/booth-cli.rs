//! NoirBooth CLI - Headless photobox
//!
//! Runs timed capture sessions against a synthetic or directory-backed camera
//! and exports the resulting strips.
//!
//! # Usage
//!
//! ```bash
//! # Build the CLI binary
//! cargo build --package noirbooth --features cli --bin booth-cli
//!
//! # One session for a guest, then export the strip
//! ./target/debug/booth-cli -n "Alex" --auto-grant
//!
//! # Strip layout, 5 second timer, custom file name
//! ./target/debug/booth-cli -n "Alex" -l STRIP_2x6_3 -t 5 --hint party --auto-grant
//!
//! # JSON event stream for scripting
//! ./target/debug/booth-cli --once --json --auto-grant | jq .
//!
//! # A session per name in a file, saved to the photo library album
//! ./target/debug/booth-cli -f guests.txt --gallery --auto-grant
//!
//! # Interactive REPL mode (when no -n, --once or -f provided)
//! ./target/debug/booth-cli
//! ```

use anyhow::Result;
use clap::Parser;

use noirbooth_lib::cli::{capture_batch, capture_once, initialize, print_layouts, run_repl, Args};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.list_layouts {
        print_layouts();
        return Ok(());
    }

    let mut ctx = initialize(&args).await?;

    // Execute based on mode
    let result = if let Some(ref name) = args.name {
        capture_once(&ctx, name, args.hint.as_deref()).await.map(|_| ())
    } else if args.once {
        let name = ctx.defaults.user_name.clone();
        capture_once(&ctx, &name, args.hint.as_deref()).await.map(|_| ())
    } else if let Some(ref file) = args.file {
        capture_batch(&ctx, file).await
    } else {
        run_repl(&mut ctx).await
    };

    // Graceful shutdown
    ctx.shutdown().await?;

    result
}
