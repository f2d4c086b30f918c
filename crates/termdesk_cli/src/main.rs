//! `termdesk`: terminal front-end for the contract terms admin screen.
//!
//! Talks to a remote endpoint with `--url`, or serves a local SQLite-backed
//! endpoint in-process (`--db <path>`, in-memory when omitted).

mod shell;
mod terminal;

use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use termdesk_core::client::{ContractTermApi, HttpTransport, LocalTransport, ResourceClient};
use termdesk_core::config::{ClientConfig, ConfigOverrides};
use termdesk_core::controller::ContractTermsController;
use termdesk_core::db::{open_db, open_db_in_memory};
use termdesk_core::endpoint::policy::GrantPolicy;
use termdesk_core::endpoint::ResourceEndpoint;
use termdesk_core::logging::{init_logging, LogTarget};
use termdesk_core::repo::contract_term_repo::SqliteContractTermRepository;
use termdesk_core::session::CsrfToken;
use terminal::TerminalPrompt;

const STDERR_LOG_LEVEL: &str = "warn";

#[derive(Parser)]
#[command(name = "termdesk", about = "Manage contract terms from the terminal", version)]
struct Cli {
    /// Remote server root, e.g. http://localhost:3000
    #[arg(long, conflicts_with = "db")]
    url: Option<String>,

    /// SQLite database file for the local endpoint
    #[arg(long)]
    db: Option<PathBuf>,

    /// Anti-forgery token issued by the remote server
    #[arg(long)]
    csrf_token: Option<String>,

    /// Configuration file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// trace|debug|info|warn|error
    #[arg(long)]
    log_level: Option<String>,

    /// Absolute directory for rolling log files (stderr when omitted)
    #[arg(long)]
    log_dir: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    if let Err(message) = run(cli) {
        eprintln!("Error: {message}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), String> {
    let file_config = match &cli.config {
        Some(path) => ClientConfig::load(path).map_err(|err| err.to_string())?,
        None => ClientConfig::default(),
    };
    let config = file_config.merge_overrides(ConfigOverrides {
        base_url: cli.url,
        csrf_token: cli.csrf_token,
        log_level: cli.log_level,
        log_dir: cli.log_dir,
    });

    let mode = endpoint_mode(&config, cli.db)?;
    start_logging(&config)?;

    match mode {
        EndpointMode::Remote(base_url) => run_remote(&base_url, &config),
        EndpointMode::Local(db) => run_local(db, &config),
    }
}

#[derive(Debug, PartialEq, Eq)]
enum EndpointMode {
    Remote(String),
    Local(Option<PathBuf>),
}

/// Picks remote or local mode. A base url from either the flag or the
/// config file cannot be combined with `--db`.
fn endpoint_mode(config: &ClientConfig, db: Option<PathBuf>) -> Result<EndpointMode, String> {
    match (&config.endpoint.base_url, db) {
        (Some(base_url), Some(db)) => Err(format!(
            "--db {} cannot be used with remote endpoint {base_url}",
            db.display()
        )),
        (Some(base_url), None) => Ok(EndpointMode::Remote(base_url.clone())),
        (None, db) => Ok(EndpointMode::Local(db)),
    }
}

fn start_logging(config: &ClientConfig) -> Result<(), String> {
    let (target, default_level) = match &config.log.dir {
        Some(dir) => (
            LogTarget::directory(dir)?,
            termdesk_core::logging::default_log_level(),
        ),
        None => (LogTarget::Stderr, STDERR_LOG_LEVEL),
    };
    let level = config.log.level.as_deref().unwrap_or(default_level);
    init_logging(level, target)
}

fn run_remote(base_url: &str, config: &ClientConfig) -> Result<(), String> {
    let raw_token = config
        .endpoint
        .csrf_token
        .as_deref()
        .ok_or("a csrf token is required with --url (use --csrf-token or [endpoint].csrf_token)")?;
    let csrf = CsrfToken::new(raw_token).map_err(|err| err.to_string())?;
    let transport = HttpTransport::new(base_url).map_err(|err| err.to_string())?;
    log::info!("event=session_start module=cli mode=remote");
    interact(ResourceClient::new(transport), csrf, config)
}

fn run_local(db: Option<PathBuf>, config: &ClientConfig) -> Result<(), String> {
    let conn = match &db {
        Some(path) => open_db(path),
        None => open_db_in_memory(),
    }
    .map_err(|err| err.to_string())?;
    let repo = SqliteContractTermRepository::try_new(&conn).map_err(|err| err.to_string())?;

    let csrf = CsrfToken::generate();
    let endpoint = ResourceEndpoint::new(repo, GrantPolicy::full_access(), csrf.clone());
    log::info!(
        "event=session_start module=cli mode=local persistent={}",
        db.is_some()
    );
    interact(ResourceClient::new(LocalTransport::new(endpoint)), csrf, config)
}

fn interact<A: ContractTermApi>(
    api: A,
    csrf: CsrfToken,
    config: &ClientConfig,
) -> Result<(), String> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    let prompt = TerminalPrompt::new(stdin.lock(), stdout.lock());
    let mut controller = ContractTermsController::new(api, prompt, csrf)
        .with_highlight_step(config.highlight.step());

    run_shell(&mut controller).map_err(|err| format!("terminal i/o failed: {err}"))
}

fn run_shell<A: ContractTermApi, I: BufRead, W: Write>(
    controller: &mut ContractTermsController<A, TerminalPrompt<I, W>>,
) -> io::Result<()> {
    shell::run(controller)?;
    controller.prompt_mut().out().flush()
}

#[cfg(test)]
mod tests {
    use super::{endpoint_mode, EndpointMode};
    use std::path::PathBuf;
    use termdesk_core::config::ClientConfig;

    const REMOTE_CONFIG: &str = r#"
[endpoint]
base_url = "http://localhost:3000"
"#;

    #[test]
    fn config_base_url_conflicts_with_db_flag() {
        let config = ClientConfig::from_toml_str(REMOTE_CONFIG).unwrap();

        let err = endpoint_mode(&config, Some(PathBuf::from("terms.db"))).unwrap_err();
        assert!(err.contains("--db terms.db"));
        assert!(err.contains("http://localhost:3000"));
    }

    #[test]
    fn mode_follows_base_url_presence() {
        let config = ClientConfig::from_toml_str(REMOTE_CONFIG).unwrap();
        assert_eq!(
            endpoint_mode(&config, None).unwrap(),
            EndpointMode::Remote("http://localhost:3000".to_string())
        );

        let local = ClientConfig::default();
        assert_eq!(
            endpoint_mode(&local, Some(PathBuf::from("terms.db"))).unwrap(),
            EndpointMode::Local(Some(PathBuf::from("terms.db")))
        );
        assert_eq!(endpoint_mode(&local, None).unwrap(), EndpointMode::Local(None));
    }
}
