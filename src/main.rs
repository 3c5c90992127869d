// src/main.rs

use std::path::Path;

use scripthook::config::load_or_default;
use scripthook::fs::RealFileSystem;
use scripthook::logging::{self, LogTarget};
use scripthook::{cli, run};

#[tokio::main]
async fn main() {
    if let Err(err) = run_main().await {
        eprintln!("scripthook error: {err:?}");
        std::process::exit(1);
    }
}

async fn run_main() -> anyhow::Result<()> {
    let args = cli::parse();

    // Installed before the host's own init so `--log-level` wins.
    let target = if args.console || args.dry_run {
        LogTarget::Console
    } else {
        let cfg = load_or_default(&RealFileSystem, Path::new(&args.config))?;
        LogTarget::File(cfg.host.log_file)
    };
    logging::init_logging(target, args.log_level)?;

    run(args).await
}
