mod cmd;

use clap::Parser;
use cmd::config::SendArgs;

#[derive(Parser)]
#[command(
    name = "telelink-send",
    version,
    about = "Периодически отправляет JSON-запись (случайные данные + время) по TCP"
)]
struct Cli {
    #[command(flatten)]
    args: SendArgs,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.args.verbose);

    let config = match cmd::config::effective(&cli.args) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    cmd::send::run(config).await;
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
