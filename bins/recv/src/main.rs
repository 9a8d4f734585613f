mod cmd;

use clap::Parser;
use cmd::config::RecvArgs;

#[derive(Parser)]
#[command(
    name = "telelink-recv",
    version,
    about = "Принимает JSON-записи от telelink-send, по одному соединению за раз"
)]
struct Cli {
    #[command(flatten)]
    args: RecvArgs,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.args.verbose);

    let result = match cmd::config::effective(&cli.args) {
        Ok(config) => cmd::recv::run(config).await,
        Err(e) => Err(e),
    };
    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

/// RUST_LOG wins; otherwise `-v` picks the level.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| level.into()),
        )
        .init();
}
