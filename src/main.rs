#![deny(unsafe_code)]
pub mod commands;
mod version;

use clap::Parser;
use clap::builder::styling::{AnsiColor, Effects, Styles};

/// Custom styles for CLI help output
const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

use commands::command::Command;
use commands::reverse::Reverse;
use commands::verify::Verify;
use enum_dispatch::enum_dispatch;
use env_logger::Env;
use linerev_lib::ReverseError;
use log::info;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

/// Exit code for bad command-line usage (clap parse failures included).
const USAGE_EXIT_CODE: i32 = 4;

#[derive(Parser, Debug)]
#[command(styles = STYLES)]
struct Args {
    #[clap(subcommand)]
    subcommand: Subcommand,
}

#[enum_dispatch(Command)]
#[derive(Parser, Debug)]
#[command(version)]
enum Subcommand {
    #[command(display_order = 1)]
    Reverse(Reverse),
    #[command(display_order = 2)]
    Verify(Verify),
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            if matches!(
                e.kind(),
                clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion
            ) {
                e.exit();
            }
            let _ = e.print();
            std::process::exit(USAGE_EXIT_CODE);
        }
    };

    info!("Running linerev version {}", version::VERSION);
    if let Err(error) = args.subcommand.execute() {
        log::error!("{error:#}");
        let code = error.downcast_ref::<ReverseError>().map_or(1, ReverseError::exit_code);
        std::process::exit(code);
    }
}
