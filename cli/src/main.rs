mod commands;
mod server;
mod terminal;

use commands::{CommandLine, Commands, collect, migrate, serve};
use terminal::logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();

    logging::init_logging(commands.verbose);

    let cfg = commands.config.into_config();

    match commands.command {
        Commands::Serve => serve::serve(&cfg).await,
        Commands::Collect => collect::collect(&cfg).await,
        Commands::Migrate => migrate::migrate(&cfg),
    }
}
