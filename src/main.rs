use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use shop_agent::app::App;
use shop_agent::config::BACKEND_URL_ENV;
use shop_agent::dashboard::{sync_complete_message, SYNC_FAILED, SYNC_IN_PROGRESS};
use shop_agent::widget::FAILURE_REPLY;
use shop_agent::{handler, logging, tui, ui};
use shop_agent::{BackendClient, ChatRequest, Config, SyncRequest};

#[derive(Parser)]
#[command(name = "shop-agent")]
#[command(version, about = "Dashboard and chat widget for the Shop Agent backend")]
struct Cli {
    /// Backend base URL
    #[arg(long, global = true, env = BACKEND_URL_ENV)]
    backend_url: Option<String>,

    /// Config file (defaults to <config dir>/shop-agent/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive dashboard and chat widget (default)
    Ui {
        /// Log file for the session
        #[arg(long)]
        log_file: Option<PathBuf>,
    },
    /// Trigger a catalog sync once and print the status
    Sync {
        /// Shopify store URL, e.g. my-shop.myshopify.com
        #[arg(long)]
        shop_url: String,
        /// Admin API access token
        #[arg(long, env = "SHOP_AGENT_API_TOKEN", hide_env_values = true)]
        api_token: String,
    },
    /// Send one chat message and print the reply
    Chat {
        message: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().or_else(|| Config::get_config_path().ok());
    let command = cli.command.unwrap_or(Commands::Ui { log_file: None });

    match &command {
        Commands::Ui { log_file } => {
            let path = log_file.clone().unwrap_or_else(logging::default_log_path);
            logging::init_file(&path)?;
        }
        _ => logging::init_stderr()?,
    }

    let (config, config_path) = load_config(config_path);
    let backend = BackendClient::from_config(&config, cli.backend_url.as_deref())?;
    info!(backend = backend.base_url(), "shop-agent v{}", env!("CARGO_PKG_VERSION"));

    match command {
        Commands::Ui { .. } => run_ui(config, config_path, backend).await,
        Commands::Sync { shop_url, api_token } => {
            run_sync(config, config_path, backend, shop_url, api_token).await
        }
        Commands::Chat { message } => run_chat(&config, &backend, message).await,
    }
}

/// Load the config file. An unreadable file is ignored and also dropped as a
/// save target, so remembering the shop URL cannot overwrite it with defaults.
fn load_config(path: Option<PathBuf>) -> (Config, Option<PathBuf>) {
    let Some(path) = path else {
        return (Config::new(), None);
    };
    match Config::load_from(&path) {
        Ok(config) => (config, Some(path)),
        Err(e) => {
            warn!(error = %e, path = %path.display(), "ignoring unreadable config");
            (Config::new(), None)
        }
    }
}

async fn run_ui(config: Config, config_path: Option<PathBuf>, backend: BackendClient) -> Result<()> {
    let mut app = App::new(config, backend);
    app.config_path = config_path;

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let result = event_loop(&mut terminal, &mut app).await;
    tui::restore()?;
    result
}

async fn event_loop(terminal: &mut tui::Tui, app: &mut App) -> Result<()> {
    let mut events = tui::EventHandler::new(tui::TICK_RATE);

    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event).await?,
            None => break,
        }
    }
    Ok(())
}

async fn run_sync(
    mut config: Config,
    config_path: Option<PathBuf>,
    backend: BackendClient,
    shop_url: String,
    api_token: String,
) -> Result<()> {
    println!("{}", SYNC_IN_PROGRESS);

    let request = SyncRequest { shop_url, api_token };
    match backend.sync(&request).await {
        Ok(report) => {
            println!("{}", sync_complete_message(&report));
            if let Some(path) = config_path {
                config.shop_url = Some(request.shop_url);
                if let Err(e) = config.save_to(&path) {
                    warn!(error = %e, "could not remember shop url");
                }
            }
            Ok(())
        }
        Err(e) => {
            warn!(error = %e, "sync failed");
            bail!(SYNC_FAILED)
        }
    }
}

async fn run_chat(config: &Config, backend: &BackendClient, message: String) -> Result<()> {
    if message.trim().is_empty() {
        return Ok(());
    }

    let mut request = ChatRequest::new(message);
    request.cart_id = config.cart_id.clone();
    request.shop_domain = config.effective_shop_domain().map(str::to_string);

    let reply = match backend.chat(&request).await {
        Ok(reply) => reply,
        Err(e) => {
            warn!(error = %e, "chat failed");
            bail!(FAILURE_REPLY)
        }
    };

    println!("{}", reply.response);
    let shop_domain = config.effective_shop_domain();
    for (i, product) in reply.products.iter().enumerate() {
        let price = product
            .price
            .as_deref()
            .map(|p| format!(" - ${}", p))
            .unwrap_or_default();
        println!("  {}. {}{}", i + 1, product.title, price);

        let link = shop_domain.and_then(|d| product.product_url(d).or_else(|| product.cart_permalink(d)));
        if let Some(link) = link {
            println!("     {}", link);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_url_flag_beats_env_beats_file() {
        let file = Config {
            backend_url: Some("http://file:9000".into()),
            ..Config::default()
        };

        std::env::remove_var(BACKEND_URL_ENV);
        let cli = Cli::try_parse_from(["shop-agent", "chat", "hi"]).unwrap();
        assert_eq!(cli.backend_url, None);
        assert_eq!(file.resolve_backend_url(cli.backend_url.as_deref()), "http://file:9000");

        std::env::set_var(BACKEND_URL_ENV, "http://env:7000");
        let cli = Cli::try_parse_from(["shop-agent", "chat", "hi"]).unwrap();
        assert_eq!(file.resolve_backend_url(cli.backend_url.as_deref()), "http://env:7000");

        let cli = Cli::try_parse_from(["shop-agent", "--backend-url", "http://flag:1", "chat", "hi"])
            .unwrap();
        assert_eq!(file.resolve_backend_url(cli.backend_url.as_deref()), "http://flag:1");
        std::env::remove_var(BACKEND_URL_ENV);

        let cli = Cli::try_parse_from(["shop-agent", "chat", "hi"]).unwrap();
        assert_eq!(
            Config::default().resolve_backend_url(cli.backend_url.as_deref()),
            shop_agent::config::DEFAULT_BACKEND_URL
        );
    }

    #[test]
    fn readable_config_stays_the_save_target() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "cart_id": "c1" }"#).unwrap();

        let (config, save_to) = load_config(Some(path.clone()));
        assert_eq!(config.cart_id.as_deref(), Some("c1"));
        assert_eq!(save_to, Some(path));
    }

    #[tokio::test]
    async fn broken_config_is_never_overwritten() {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let dir = tempfile::tempdir().unwrap();
        let config_file = dir.path().join("config.json");
        let broken = r#"{ "backend_url": "http://my-backend:9000", "cart_id": "c1", }"#;
        std::fs::write(&config_file, broken).unwrap();

        let (config, save_to) = load_config(Some(config_file.clone()));
        assert_eq!(config, Config::new());
        assert_eq!(save_to, None);

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/sync"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let mut app = App::new(config, BackendClient::new(&server.uri()));
        app.config_path = save_to;
        app.dashboard.shop_url = shop_agent::input::TextInput::with_value("s.myshopify.com");
        app.start_sync();
        while app.sync_task.as_ref().is_some_and(|t| !t.is_finished()) {
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        app.poll_tasks().await;

        assert_eq!(app.config.shop_url.as_deref(), Some("s.myshopify.com"));
        assert_eq!(std::fs::read_to_string(&config_file).unwrap(), broken);
    }
}
