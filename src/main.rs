use crate::widgets::Terminal;
use std::io::IsTerminal;

#[macro_use]
mod macros;

pub mod api;
pub mod app;
pub mod cli;
pub mod data;
pub mod figure;
pub mod helper;
pub mod instance_lock;
pub mod logger;
#[cfg_attr(target_family = "windows", path = "os/windows.rs")]
#[cfg_attr(target_family = "unix", path = "os/unix.rs")]
pub mod os;
pub mod path_env;
pub mod render;
pub mod system;
pub mod ui;
pub mod views;
pub mod widgets;

#[macro_use]
extern crate rust_i18n;
i18n!("locales");

pub use cli::Args;

#[tokio::main]
async fn main() {
    let bin_name = std::env::args()
        .next()
        .unwrap_or_else(|| "tickerterm".to_string());

    let command = match cli::parse_args(std::env::args().skip(1)) {
        Ok(command) => command,
        Err(err) => {
            eprintln!("{}", err.message);
            std::process::exit(err.code);
        }
    };

    let args = match command {
        cli::Command::Help => {
            println!("{}", cli::help_text(&bin_name));
            return;
        }
        cli::Command::Version => {
            println!("{}", cli::version_text());
            return;
        }
        cli::Command::Run(args) => args,
    };

    dotenvy::dotenv().ok();

    if !std::io::stdout().is_terminal() {
        eprintln!("tickerterm needs an interactive terminal (TTY).");
        std::process::exit(1);
    }

    let _instance_lock = match instance_lock::acquire() {
        Ok(lock) => lock,
        Err(err) => {
            if err.kind() == std::io::ErrorKind::WouldBlock {
                eprintln!("another tickerterm instance is already running; close it first.");
            } else {
                eprintln!("failed to acquire instance lock: {err}");
            }
            std::process::exit(3);
        }
    };

    let locale = std::env::var("TICKERTERM_LOCALE").unwrap_or_else(|_| "en".to_string());
    rust_i18n::set_locale(&locale);

    // Initialize logger
    let _guard = logger::init();
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        pid = std::process::id(),
        locale = %locale,
        log_dir = %logger::active_log_dir().display(),
        "application started"
    );

    // Server URL: the flag wins over the environment
    let server = match args.server.clone() {
        Some(server) => server,
        None => {
            let missing = api::missing_required_env();
            if !missing.is_empty() {
                api::print_config_guide();
                eprintln!("\nMissing required environment variables: {}", missing.join(", "));
                std::process::exit(2);
            }
            std::env::var(api::client::SERVER_URL_ENV).unwrap_or_default()
        }
    };

    if let Err(err) = api::init(&server) {
        eprintln!("failed to configure the analysis service client: {err}");
        tracing::error!("failed to configure the analysis service client: {err}");
        std::process::exit(2);
    }
    tracing::info!(server = %server, "analysis service configured");

    let symbol = args
        .symbol
        .clone()
        .or_else(|| {
            std::env::var("TICKERTERM_SYMBOL")
                .ok()
                .filter(|value| !value.trim().is_empty())
                .map(|value| data::Symbol::new(&value))
        })
        .unwrap_or_else(|| data::Symbol::new("AAPL"));
    let period = args
        .period
        .or_else(|| {
            std::env::var("TICKERTERM_PERIOD").ok().and_then(|value| {
                value
                    .parse()
                    .inspect_err(|err| tracing::warn!("ignoring TICKERTERM_PERIOD: {err}"))
                    .ok()
            })
        })
        .unwrap_or_default();
    let session = data::Session::new(symbol, period);

    // Restore the terminal on panics before the default hook prints
    let hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        Terminal::exit_full_screen();
        hook(info);
    }));

    Terminal::enter_full_screen();
    app::run(session).await;
    Terminal::exit_full_screen();
}
