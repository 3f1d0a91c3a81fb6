//! Command wiring.
//!
//! The composition root: an explicit registry maps string command
//! identifiers to handler closures over the injected dependencies
//! (secret-bearing client, tree provider, output channel). Handlers
//! never propagate errors; the only registry-level error is an
//! unknown command id.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tracing::{error, info, warn};

use common::config::AppConfig;
use common::errors::{AppError, AppResult};

use crate::auth;
use crate::client::FaunaClient;
use crate::content::FqlContentProvider;
use crate::output::OutputChannel;
use crate::provider::SchemaTreeProvider;
use crate::query::QueryRunner;
use crate::state::AppState;

/// Runs the FQL text passed as the first argument.
pub const CMD_RUN_QUERY: &str = "fauna.runQuery";
/// Opens a scratch query document via the host.
pub const CMD_CREATE_QUERY: &str = "fauna.createQuery";
/// Writes the info of the node named by the first argument.
pub const CMD_GET: &str = "fauna.get";
/// Discards the cached schema tree.
pub const CMD_REFRESH_ENTRY: &str = "fauna.refreshEntry";

type BoxFuture = Pin<Box<dyn Future<Output = ()> + Send>>;
type CommandHandler = Box<dyn Fn(Vec<String>) -> BoxFuture + Send + Sync>;

/// Host surfaces the extension needs from its embedding environment.
pub trait EditorHost: Send + Sync {
    /// Opens (or displays) a document with the given content.
    fn open_document(&self, uri: &str, content: &str);

    /// Shows an error message to the user.
    fn show_error_message(&self, message: &str);
}

/// Registry of invocable commands.
#[derive(Default)]
pub struct CommandRegistry {
    handlers: HashMap<String, CommandHandler>,
}

impl CommandRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler under a command id.
    pub fn register<F, Fut>(&mut self, id: impl Into<String>, handler: F)
    where
        F: Fn(Vec<String>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.handlers
            .insert(id.into(), Box::new(move |args| Box::pin(handler(args))));
    }

    /// Invokes a command. Fails only for an unknown id; handlers
    /// themselves swallow their own failures.
    pub async fn invoke(&self, id: &str, args: Vec<String>) -> AppResult<()> {
        let handler = self
            .handlers
            .get(id)
            .ok_or_else(|| AppError::UnknownCommand(id.to_string()))?;
        handler(args).await;
        Ok(())
    }

    /// Registered command ids, sorted.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Number of registered commands.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether the registry has no commands.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

/// The activated extension: wired registry plus its providers.
pub struct Extension {
    pub registry: CommandRegistry,
    pub provider: Arc<SchemaTreeProvider>,
    pub content: Arc<FqlContentProvider>,
    pub state: AppState,
}

/// Wires the extension: resolves the secret, builds the client, the
/// tree provider and the query runner, and registers the four
/// commands.
///
/// With no secret resolvable this shows one error through the host and
/// returns `None` without registering anything (fatal at startup, no
/// retries, no prompting).
pub fn activate(
    config: AppConfig,
    host: Arc<dyn EditorHost>,
    output: Arc<dyn OutputChannel>,
    client_factory: impl FnOnce(&AppConfig, String) -> Arc<dyn FaunaClient>,
) -> Option<Extension> {
    let Some(secret) = auth::resolve_secret(&config) else {
        error!("activation aborted: {}", AppError::MissingSecret);
        host.show_error_message(
            "No FaunaDB admin secret key was found. Set FAUNA_ADMIN_SECRET_KEY \
             or add FAUNA_KEY to the workspace .faunarc.",
        );
        return None;
    };

    let client = client_factory(&config, secret);
    let state = AppState::new(config, Arc::clone(&client), Arc::clone(&output));
    let provider = Arc::new(SchemaTreeProvider::new(Arc::clone(&client)));
    let runner = Arc::new(QueryRunner::new(client, Arc::clone(&output)));
    let content = Arc::new(FqlContentProvider);

    let mut registry = CommandRegistry::new();

    {
        let runner = Arc::clone(&runner);
        registry.register(CMD_RUN_QUERY, move |args: Vec<String>| {
            let runner = Arc::clone(&runner);
            async move {
                let text = args.into_iter().next().unwrap_or_default();
                runner.run(&text).await;
            }
        });
    }

    {
        let host = Arc::clone(&host);
        let content = Arc::clone(&content);
        registry.register(CMD_CREATE_QUERY, move |_args: Vec<String>| {
            let uri = content.scratch_uri();
            let body = content.provide_text_document_content(&uri);
            host.open_document(&uri, &body);
            async {}
        });
    }

    {
        let provider = Arc::clone(&provider);
        let output = Arc::clone(&output);
        registry.register(CMD_GET, move |args: Vec<String>| {
            let provider = Arc::clone(&provider);
            let output = Arc::clone(&output);
            async move {
                let path = args.into_iter().next().unwrap_or_default();
                match provider.resolve_path(&path).await {
                    Some(node) => {
                        if let Err(e) = provider.display_info(node.id, output.as_ref()) {
                            warn!(path = %path, error = %e, "display info failed");
                        }
                    }
                    None => {
                        output.append(&format!("ERROR: schema node not found: {}", path));
                        output.show();
                    }
                }
            }
        });
    }

    {
        let provider = Arc::clone(&provider);
        registry.register(CMD_REFRESH_ENTRY, move |_args: Vec<String>| {
            provider.refresh();
            async {}
        });
    }

    info!(commands = registry.len(), "extension activated");
    Some(Extension {
        registry,
        provider,
        content,
        state,
    })
}
