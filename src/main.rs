mod ai;
mod cli;
mod config;
mod error;
mod feeds;
mod logging;
mod newsroom;
mod store;
mod web;

#[tokio::main]
async fn main() {
    if let Err(e) = cli::run_main().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
