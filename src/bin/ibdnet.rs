use clap::Parser;
use ibdnet::cli::{run_command, Opts};
use log::error;

fn main() {
    env_logger::init();
    let opts: Opts = Opts::parse();
    println!("# started_at={}", chrono::Local::now());
    println!("# opts={:?}", opts);
    if let Err(e) = run_command(&opts) {
        error!("{}", e);
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
    println!("# finished_at={}", chrono::Local::now());
}
