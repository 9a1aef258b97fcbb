use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = foldergrid_lib::cli::Cli::parse();

    if let Err(e) = foldergrid_lib::run(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
