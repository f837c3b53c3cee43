//! FIR console — headless client for the case ledger.
//!
//! Establishes an authenticated session with a local signing key, files and
//! progresses cases through the workflow engine, and streams live case-list
//! updates driven by ledger events.

mod config;
mod logging;
mod wallet;

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

use fir_evidence::{EvidenceStore, HttpEvidenceStore};
use fir_ledger::{EventKind, Ledger, RelayClient, RpcLedger};
use fir_session::{AuthHttpClient, RoleResolver, SessionManager, SystemClock};
use fir_sync::{ReadModelState, Synchronizer};
use fir_types::{AccountAddress, CaseId, CaseRecord, CaseStatus, CaseType, ChainId, Timestamp};
use fir_workflow::CaseWorkflowEngine;

use config::ConsoleConfig;
use logging::{init_logging, LogFormat};
use wallet::LocalKeyWallet;

#[derive(Parser)]
#[command(name = "fir-console", about = "FIR ledger console client")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings are
    /// used as the base; CLI flags and env vars override them.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Ledger node JSON-RPC endpoint.
    #[arg(long, env = "FIR_RPC_URL")]
    rpc_url: Option<String>,

    /// Ledger node WebSocket notification endpoint.
    #[arg(long, env = "FIR_WS_URL")]
    ws_url: Option<String>,

    /// Authentication service base URL.
    #[arg(long, env = "FIR_AUTH_URL")]
    auth_url: Option<String>,

    /// Relay base URL for fee-less submission.
    #[arg(long, env = "FIR_RELAY_URL")]
    relay_url: Option<String>,

    /// Chain id the ledger lives on.
    #[arg(long, env = "FIR_CHAIN_ID")]
    chain_id: Option<u64>,

    /// Path to the 32-byte hex seed for the signing key.
    #[arg(long, env = "FIR_KEY_FILE")]
    key_file: Option<PathBuf>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, default_value = "info", env = "FIR_LOG_LEVEL")]
    log_level: String,

    /// Log format: "human" or "json".
    #[arg(long, default_value = "human", env = "FIR_LOG_FORMAT")]
    log_format: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Establish a session and stream live case-list updates.
    Watch,
    /// List the cases visible to the current role.
    Cases,
    /// File a new case (citizen only).
    Submit {
        /// Case category: not_specified, fraud_call, otp_scam,
        /// online_harassment, financial_theft.
        #[arg(long, default_value = "not_specified")]
        case_type: String,
        /// Description entries; repeat for multiple.
        #[arg(long = "description", required = true)]
        descriptions: Vec<String>,
        /// Accused entries; repeat for multiple.
        #[arg(long = "accused")]
        accused: Vec<String>,
        /// Evidence digests (hex); repeat for multiple.
        #[arg(long = "evidence")]
        evidence: Vec<String>,
        /// Incident time as a Unix timestamp in seconds.
        #[arg(long)]
        incident_at: u64,
    },
    /// Assign a verified case to a police account (government only).
    Assign {
        case_id: u64,
        police: String,
    },
    /// Progress a case to a new status with a remark.
    UpdateStatus {
        case_id: u64,
        /// Target status: verified, rejected, under_process, closed.
        status: String,
        remark: String,
    },
    /// Manage the active police set (government only).
    Police {
        #[command(subcommand)]
        action: PoliceCommand,
    },
    /// Upload evidence and print the digest to reference in a submission.
    Evidence {
        #[command(subcommand)]
        action: EvidenceCommand,
    },
}

#[derive(clap::Subcommand)]
enum PoliceCommand {
    List,
    Add { address: String },
    Remove { address: String },
}

#[derive(clap::Subcommand)]
enum EvidenceCommand {
    Upload { file: PathBuf },
}

struct App {
    config: ConsoleConfig,
    ledger: Arc<RpcLedger>,
    manager: Arc<SessionManager>,
    engine: CaseWorkflowEngine,
}

fn build_app(config: ConsoleConfig) -> anyhow::Result<App> {
    let chain_id = ChainId::new(config.chain_id);
    let wallet = Arc::new(LocalKeyWallet::from_seed_file(&config.key_file, chain_id)?);

    let mut ledger = RpcLedger::new(&config.ledger_rpc_url, chain_id)?;
    if let Some(relay_url) = &config.relay_url {
        ledger = ledger.with_relay(RelayClient::new(relay_url)?);
    }
    let ledger = Arc::new(ledger);

    let auth = Arc::new(AuthHttpClient::new(&config.auth_url)?);
    let clock = Arc::new(SystemClock);
    let manager = Arc::new(SessionManager::new(
        wallet,
        auth,
        RoleResolver::new(ledger.clone()),
        clock.clone(),
    ));
    let engine = CaseWorkflowEngine::new(ledger.clone(), manager.snapshots(), clock);

    Ok(App {
        config,
        ledger,
        manager,
        engine,
    })
}

fn parse_case_type(s: &str) -> anyhow::Result<CaseType> {
    match s.to_lowercase().as_str() {
        "not_specified" => Ok(CaseType::NotSpecified),
        "fraud_call" => Ok(CaseType::FraudCall),
        "otp_scam" => Ok(CaseType::OtpScam),
        "online_harassment" => Ok(CaseType::OnlineHarassment),
        "financial_theft" => Ok(CaseType::FinancialTheft),
        other => anyhow::bail!("unknown case type: {other}"),
    }
}

fn parse_status(s: &str) -> anyhow::Result<CaseStatus> {
    match s.to_lowercase().as_str() {
        "submitted" => Ok(CaseStatus::Submitted),
        "verified" => Ok(CaseStatus::Verified),
        "rejected" => Ok(CaseStatus::Rejected),
        "under_process" => Ok(CaseStatus::UnderProcess),
        "closed" => Ok(CaseStatus::Closed),
        other => anyhow::bail!("unknown status: {other}"),
    }
}

fn print_cases(cases: &[CaseRecord]) {
    println!(
        "{:<8} {:<18} {:<14} {:<44} remarks",
        "case", "type", "status", "assigned"
    );
    for record in cases {
        println!(
            "{:<8} {:<18} {:<14} {:<44} {}",
            record.id.to_string(),
            format!("{:?}", record.case_type),
            record.status.to_string(),
            record
                .assigned_police
                .map(|a| a.to_string())
                .unwrap_or_else(|| "-".into()),
            record.remarks.len(),
        );
    }
}

async fn run_watch(app: &App) -> anyhow::Result<()> {
    let snapshot = app.manager.connect().await?;
    let identity = snapshot.identity.expect("authenticated session has identity");
    println!("session: {} as {}", identity, snapshot.role);
    if snapshot.role_degraded {
        println!("warning: role resolution unavailable; acting as citizen");
    }

    let feed = app.ledger.event_feed(&app.config.ledger_ws_url);
    let _feed_task = tokio::spawn(feed.run());

    let sync = Arc::new(Synchronizer::new());
    let _dispatcher = sync.attach(app.ledger.subscribe());
    sync.set_context(Some(identity));

    // Any later identity/chain change invalidates every read model.
    let context_sync = sync.clone();
    let mut session_rx = app.manager.snapshots();
    let _context_task = tokio::spawn(async move {
        while session_rx.changed().await.is_ok() {
            let identity = session_rx.borrow_and_update().identity;
            context_sync.set_context(identity);
        }
    });

    let ledger = app.ledger.clone();
    let role = snapshot.role;
    let address = identity.address;
    let model = sync.register(EventKind::ALL, move || {
        let ledger = ledger.clone();
        async move {
            if role.can_view_all_cases() {
                ledger.all_cases().await
            } else {
                ledger.cases_by_complainant(&address).await
            }
        }
    });

    println!("watching for updates; ctrl-c to exit");
    let mut model_rx = model.watch();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = model_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let state: ReadModelState<Vec<CaseRecord>> = model_rx.borrow_and_update().clone();
                if let Some(error) = &state.last_error {
                    println!("refresh failed ({error}); showing last known state");
                }
                if let Some(cases) = &state.data {
                    println!("-- {} case(s){}", cases.len(), if state.stale { " [stale]" } else { "" });
                    print_cases(cases);
                }
            }
        }
    }

    sync.unsubscribe(&model);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(LogFormat::parse(&cli.log_format), &cli.log_level);

    let mut config = match &cli.config {
        Some(path) => ConsoleConfig::from_toml_file(path)?,
        None => ConsoleConfig::default(),
    };
    if let Some(rpc_url) = cli.rpc_url {
        config.ledger_rpc_url = rpc_url;
    }
    if let Some(ws_url) = cli.ws_url {
        config.ledger_ws_url = ws_url;
    }
    if let Some(auth_url) = cli.auth_url {
        config.auth_url = auth_url;
    }
    if cli.relay_url.is_some() {
        config.relay_url = cli.relay_url;
    }
    if let Some(chain_id) = cli.chain_id {
        config.chain_id = chain_id;
    }
    if let Some(key_file) = cli.key_file {
        config.key_file = key_file;
    }

    let app = build_app(config)?;

    match cli.command {
        Command::Watch => run_watch(&app).await?,
        Command::Cases => {
            let snapshot = app.manager.connect().await?;
            let identity = snapshot.identity.expect("authenticated session has identity");
            let cases = if snapshot.role.can_view_all_cases() {
                app.ledger.all_cases().await?
            } else {
                app.ledger.cases_by_complainant(&identity.address).await?
            };
            print_cases(&cases);
        }
        Command::Submit {
            case_type,
            descriptions,
            accused,
            evidence,
            incident_at,
        } => {
            app.manager.connect().await?;
            let draft = fir_types::CaseDraft {
                case_type: parse_case_type(&case_type)?,
                accused_entries: accused,
                evidence_digests: evidence,
                description_entries: descriptions,
                incident_at: Timestamp::new(incident_at),
            };
            let receipt = app.engine.submit(&draft).await?;
            println!("case submitted: tx {} at {}", receipt.tx_hash, receipt.included_at);
        }
        Command::Assign { case_id, police } => {
            app.manager.connect().await?;
            let police: AccountAddress = police.parse().context("invalid police address")?;
            let receipt = app.engine.assign(CaseId::new(case_id), &police).await?;
            println!("case assigned: tx {}", receipt.tx_hash);
        }
        Command::UpdateStatus {
            case_id,
            status,
            remark,
        } => {
            app.manager.connect().await?;
            let status = parse_status(&status)?;
            let receipt = app
                .engine
                .update_status(CaseId::new(case_id), status, &remark)
                .await?;
            println!("status updated: tx {}", receipt.tx_hash);
        }
        Command::Police { action } => {
            app.manager.connect().await?;
            match action {
                PoliceCommand::List => {
                    for address in app.ledger.police_set().await? {
                        println!("{address}");
                    }
                }
                PoliceCommand::Add { address } => {
                    let address: AccountAddress =
                        address.parse().context("invalid police address")?;
                    app.engine.add_police(&address).await?;
                    println!("police account added: {address}");
                }
                PoliceCommand::Remove { address } => {
                    let address: AccountAddress =
                        address.parse().context("invalid police address")?;
                    app.engine.remove_police(&address).await?;
                    println!("police account removed: {address}");
                }
            }
        }
        Command::Evidence { action } => match action {
            EvidenceCommand::Upload { file } => {
                let base_url = app
                    .config
                    .evidence_url
                    .as_deref()
                    .context("evidence_url is not configured")?;
                let store = HttpEvidenceStore::new(
                    base_url,
                    &app.config.evidence_api_key,
                    &app.config.evidence_api_secret,
                )?;
                let bytes = std::fs::read(&file)
                    .with_context(|| format!("failed to read {}", file.display()))?;
                let name = file
                    .file_name()
                    .and_then(|name| name.to_str())
                    .unwrap_or("evidence");
                let digest = store.upload(bytes, name).await?;
                println!("{digest}");
            }
        },
    }

    Ok(())
}
