use clap::Parser;
use payout_preview::{init_logging, run, Cli};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_format);
    let out = run(&cli)?;
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}
