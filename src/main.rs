use clap::Parser;
use clipstack::capture::SystemClipboard;
use clipstack::cli::{Cli, Command};
use clipstack::config::Config;
use clipstack::daemon;
use clipstack::error::Error;
use clipstack::history::search;
use clipstack::report;
use clipstack::service::Service;
use clipstack::store::JsonFileStore;
use tracing::error;

fn setup_logging(verbose: u8) {
    use tracing_subscriber::{fmt, EnvFilter};

    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // stdout is reserved for list output
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose > 2)
        .init();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("failed to listen for ctrl-c: {e}");
        std::future::pending::<()>().await;
    }
}

fn fail(context: &str, e: impl std::fmt::Display) -> ! {
    eprintln!("{context}: {e}");
    std::process::exit(1);
}

fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let mut config = Config::load(&cli).unwrap_or_else(|e| fail("Error loading config", e));
    let store = JsonFileStore::new(config.store_path.clone());

    match cli.command {
        Command::Watch(args) => {
            if let Err(e) = config.apply_watch_args(&args) {
                fail("Invalid watch options", e);
            }

            let mut clipboard = SystemClipboard::open().unwrap_or_else(|e| {
                error!("clipboard unavailable: {e}");
                fail("Error opening clipboard", e)
            });

            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap_or_else(|e| fail("Error starting runtime", e));

            let mut service = Service::open(store);
            let result = runtime.block_on(daemon::run(&mut service, &mut clipboard, &config, shutdown_signal()));

            if let Err(e) = result {
                fail("Error while watching", e);
            }
        }
        Command::List(args) => {
            let service = Service::open(store);
            let history = service.history();

            let mut entries = search::filter_indexed(history, args.search.as_deref().unwrap_or(""));
            if let Some(limit) = args.limit {
                entries.truncate(limit);
            }

            if entries.is_empty() && !args.json {
                if history.is_empty() {
                    println!("History is empty. Run 'clipstack watch' to start recording.");
                } else {
                    println!("No entries match.");
                }
            } else {
                report::print(&entries, args.json);
            }
        }
        Command::Copy(args) => {
            let mut service = Service::open(store);

            let item = match service.history().get(args.index) {
                Some(item) => item.clone(),
                None => fail(
                    "Error",
                    Error::IndexOutOfRange {
                        index: args.index,
                        len: service.history().len(),
                    },
                ),
            };

            // on Linux the selection is held until another program takes it
            let mut clipboard = SystemClipboard::open()
                .map(|clipboard| clipboard.hold_selection(true))
                .unwrap_or_else(|e| fail("Error opening clipboard", e));

            if let Err(e) = service.copy_item(&mut clipboard, &item) {
                fail("Error copying entry", e);
            }
            println!("Copied {} entry {} to the clipboard", item.kind(), args.index);
        }
        Command::Clear => {
            let mut service = Service::open(store);
            let count = service.history().len();

            if let Err(e) = service.clear_history() {
                fail("Error clearing history", e);
            }
            println!("Cleared {count} entries");
        }
        Command::Theme(args) => {
            let mut service = Service::open(store);

            match args.color {
                Some(color) => {
                    if let Err(e) = service.set_theme(&color) {
                        fail("Error saving theme", e);
                    }
                }
                None => match service.get_theme() {
                    Some(color) => println!("{color}"),
                    None => println!("No theme color set"),
                },
            }
        }
    }
}
