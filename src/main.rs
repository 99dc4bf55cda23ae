mod args;
mod report;

use clap::Parser;
use log::{warn, LevelFilter};
use snafu::ErrorCompat;

fn init_logging(verbose: bool) {
    let mut builder = if verbose {
        let mut b = env_logger::Builder::new();
        b.filter_level(LevelFilter::Debug);
        b
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
    };
    builder.init();
}

fn main() {
    let args = args::Args::parse();
    init_logging(args.verbose);

    if let Err(e) = report::run(&args) {
        warn!("Error occured {:?}", e);
        eprintln!("An error occured: {}", e);
        if let Some(bt) = ErrorCompat::backtrace(&e) {
            eprintln!("trace: {}", bt);
        }
        std::process::exit(1);
    }
}
