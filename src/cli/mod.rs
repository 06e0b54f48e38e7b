use structopt::StructOpt;

use crate::logger;

mod resolve;

pub use resolve::ResolveCmd;

#[derive(Debug, StructOpt)]
#[structopt(name = "witness", about = "Resolve concept witnesses in declaration files")]
pub struct Cli {
    #[structopt(
        long, env = "LOG_LEVEL",
        help = "Sets the log level",
        default_value = "info",
        possible_values = &["off", "error", "warn", "info", "debug", "trace"],
        global = true
    )]
    log_level: log::LevelFilter,

    #[structopt(subcommand)]
    cmd: Command,
}

#[derive(Debug, StructOpt)]
pub enum Command {
    /// Run every `resolve` and `call` query in a declaration file
    Resolve(ResolveCmd),
}

pub fn run() {
    // get the subcommand
    let cli: Cli = Cli::from_args();

    // set up logging
    if let Err(err) = logger::init(cli.log_level) {
        eprintln!("could not install logger: {}", err);
    }

    let result = match cli.cmd {
        Command::Resolve(options) => resolve::action(options),
    };

    if let Err(err) = result {
        err.emit();
        std::process::exit(1);
    }
}
