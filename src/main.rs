use anyhow::Result;
use clap::{Arg, ArgAction, Command};

use gpuscope::commands;

fn backend_arg() -> Arg {
    Arg::new("backend")
        .help("Backend name (see 'gpuscope backends')")
        .required(true)
        .index(1)
}

fn main() -> Result<()> {
    let matches = Command::new("gpuscope")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Detect the primary GPU and report live telemetry")
        .disable_version_flag(true)
        .arg(
            Arg::new("version")
                .short('V')
                .long("version")
                .help("Print version information")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Log every backend probe")
                .global(true)
                .action(ArgAction::SetTrue),
        )
        .subcommand(
            Command::new("detect")
                .about("Detect the primary GPU and print its identity")
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Print the identity as JSON")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("watch")
                .about("Poll live GPU metrics until interrupted")
                .arg(
                    Arg::new("interval")
                        .short('i')
                        .long("interval")
                        .value_name("MS")
                        .help("Polling interval in milliseconds (default: from config)")
                        .value_parser(clap::value_parser!(u64)),
                )
                .arg(
                    Arg::new("count")
                        .short('n')
                        .long("count")
                        .value_name("N")
                        .help("Stop after N samples")
                        .value_parser(clap::value_parser!(u64).range(1..)),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Print one JSON snapshot per line")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(Command::new("backends").about("List detection backends in priority order"))
        .subcommand(
            Command::new("config")
                .about("Inspect or change configuration (use 'gpuscope config --help' for subcommands)")
                .subcommand_required(true)
                .arg_required_else_help(true)
                .subcommand(Command::new("path").about("Print the config file location"))
                .subcommand(Command::new("show").about("Print the effective configuration"))
                .subcommand(
                    Command::new("disable")
                        .about("Skip a backend during detection")
                        .arg(backend_arg()),
                )
                .subcommand(
                    Command::new("enable")
                        .about("Re-enable a disabled backend")
                        .arg(backend_arg()),
                ),
        )
        .subcommand(Command::new("version").about("Shows version information"))
        .get_matches();

    gpuscope::init_logging(matches.get_flag("verbose"));

    if matches.get_flag("version") {
        return commands::version();
    }

    match matches.subcommand() {
        Some(("detect", sub_matches)) => commands::detect(sub_matches)?,
        Some(("watch", sub_matches)) => commands::watch(sub_matches)?,
        Some(("backends", sub_matches)) => commands::backends(sub_matches)?,
        Some(("config", sub_matches)) => commands::config::execute(sub_matches)?,
        Some(("version", _)) => commands::version()?,
        _ => {
            println!("Welcome to gpuscope!");
            println!("Use 'gpuscope --help' for more information.");
        }
    }

    Ok(())
}
