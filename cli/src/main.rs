mod commands;
mod terminal;

use std::time::Duration;

use commands::{CommandLine, Commands, interfaces, run, settings};
use netroute_common::config::Config;
use terminal::{logging, print};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();

    logging::init_logging();

    match commands.command {
        Commands::Run {
            interface,
            probe_timeout_ms,
            install_timeout_secs,
            no_input,
        } => {
            let cfg = Config {
                settings_path: commands.settings,
                probe_timeout: Duration::from_millis(probe_timeout_ms),
                install_timeout: Duration::from_secs(install_timeout_secs),
                no_input,
            };
            print::header("configuring routes");
            run::run(interface, &cfg).await
        }
        Commands::Interfaces => {
            print::header("usable interfaces");
            interfaces::interfaces(&commands.settings)
        }
        Commands::Settings { action } => {
            print::header("settings");
            settings::settings(action, &commands.settings)
        }
    }
}
