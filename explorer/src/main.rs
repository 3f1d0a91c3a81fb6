//! FaunaDB explorer console host.
//!
//! Drives the command registry from the command line: activates the
//! extension against console implementations of the host surfaces and
//! dispatches one command per invocation.

use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use common::config::AppConfig;
use common::errors::AppError;
use explorer::{
    activate,
    commands::CMD_RUN_QUERY,
    ConsoleChannel, EditorHost, FaunaClient, HttpFaunaClient, OutputChannel,
};

const USAGE: &str = "usage: fauna-explorer <command> [arg]\n\
    commands:\n\
      runQuery <file.fql>   run the FQL query in the file\n\
      createQuery           print a scratch query document\n\
      get <db/node/path>    show info for a schema node\n\
      refreshEntry          discard the cached schema tree";

/// Console implementation of the host surfaces.
struct ConsoleHost;

impl EditorHost for ConsoleHost {
    fn open_document(&self, uri: &str, content: &str) {
        println!("--- {} ---", uri);
        print!("{}", content);
    }

    fn show_error_message(&self, message: &str) {
        eprintln!("{}", message);
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // Load configuration
    let config = AppConfig::load();
    info!(endpoint = %config.endpoint, workspace = %config.workspace_dir.display(), "starting explorer");

    let host: Arc<dyn EditorHost> = Arc::new(ConsoleHost);
    let output: Arc<dyn OutputChannel> = Arc::new(ConsoleChannel);

    // Wire the extension; without a resolvable secret nothing is registered.
    let Some(extension) = activate(config, host, output, |config, secret| {
        Arc::new(HttpFaunaClient::new(config.endpoint.clone(), secret)) as Arc<dyn FaunaClient>
    }) else {
        std::process::exit(1);
    };

    let mut args = std::env::args().skip(1);
    let Some(command) = args.next() else {
        eprintln!("{}", USAGE);
        std::process::exit(2);
    };
    // Accept command names with or without the `fauna.` prefix.
    let id = if command.contains('.') {
        command
    } else {
        format!("fauna.{}", command)
    };

    let handler_args: Vec<String> = match id.as_str() {
        // The "open document" is a file on disk for the console host.
        CMD_RUN_QUERY => {
            let Some(path) = args.next() else {
                eprintln!("{}", USAGE);
                std::process::exit(2);
            };
            match std::fs::read_to_string(&path).map_err(AppError::from) {
                Ok(text) => vec![text],
                Err(e) => {
                    error!(path = %path, error = %e, "failed to read query document");
                    std::process::exit(1);
                }
            }
        }
        _ => args.collect(),
    };

    if let Err(e) = extension.registry.invoke(&id, handler_args).await {
        eprintln!("{}\n{}", e, USAGE);
        std::process::exit(2);
    }
}
