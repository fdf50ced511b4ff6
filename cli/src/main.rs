mod commands;
mod terminal;

use commands::{CommandLine, Commands, info, require_tenant, run, scan};
use terminal::{logging, print};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();
    logging::init(commands.verbose, commands.quiet)?;

    let cfg = commands.to_config();
    if !matches!(commands.command, Commands::Info) {
        require_tenant(&cfg)?;
    }
    print::banner(cfg.quiet);

    match &commands.command {
        Commands::Info => {
            print::header("about this host", cfg.quiet);
            info::info(&cfg).await
        }
        Commands::Run => {
            print::header("endpoint agent", cfg.quiet);
            run::run(&cfg).await
        }
        Commands::Scan { target } => {
            print::header("getting ready for discovery", cfg.quiet);
            scan::scan(target, &cfg).await
        }
    }
}
