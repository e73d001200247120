use clap::Parser;
use miette::{IntoDiagnostic, Result};
use paysheet::application::controller::FlowController;
use paysheet::application::handle::FlowEvent;
use paysheet::config::{CheckoutConfig, FlowSettings, ProcessorConfig};
use paysheet::domain::args::FlowArgs;
use paysheet::domain::ports::SessionStoreBox;
use paysheet::domain::presentation::{PresentationState, SessionPhase};
use paysheet::domain::session::SessionId;
use paysheet::infrastructure::in_memory::InMemorySessionStore;
use paysheet::infrastructure::simulated::SimulatedProcessorClient;
use paysheet::interfaces::console::{ChannelPresentation, PresentationCall};
use paysheet::interfaces::csv::event_writer::EventWriter;
use paysheet::interfaces::csv::script_reader::ScriptReader;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_PUBLISHABLE_KEY: &str = "pk_test_simulated";

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Scripted session steps (CSV with an `action,value` header)
    script: PathBuf,

    /// Client secret of the payment intent to confirm
    #[arg(long)]
    client_secret: Option<String>,

    /// JSON file with processor configuration and flow settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Key under which session state is persisted
    #[arg(long, default_value = "default")]
    session_id: String,

    /// Overrides the delay before the sheet is presented
    #[arg(long)]
    presentation_delay_ms: Option<u64>,
}

#[cfg(feature = "storage-rocksdb")]
fn open_store(db_path: Option<PathBuf>) -> Result<SessionStoreBox> {
    use paysheet::infrastructure::rocksdb::RocksDbSessionStore;

    Ok(match db_path {
        Some(path) => Box::new(RocksDbSessionStore::open(path).into_diagnostic()?),
        None => Box::new(InMemorySessionStore::new()),
    })
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_store(db_path: Option<PathBuf>) -> Result<SessionStoreBox> {
    if db_path.is_some() {
        warn!(
            "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
        );
    }
    Ok(Box::new(InMemorySessionStore::new()))
}

struct EventLog<W: io::Write> {
    writer: EventWriter<W>,
    ended: bool,
}

impl<W: io::Write> EventLog<W> {
    fn record(&mut self, event: &FlowEvent) -> Result<()> {
        self.ended |= matches!(event, FlowEvent::Ended(_));
        self.writer.write_event(event).into_diagnostic()
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let (processor_config, mut settings) = match &cli.config {
        Some(path) => {
            let config = CheckoutConfig::from_path(path).into_diagnostic()?;
            (config.processor, config.settings)
        }
        None => (
            ProcessorConfig::new(DEFAULT_PUBLISHABLE_KEY).into_diagnostic()?,
            FlowSettings::default(),
        ),
    };
    if let Some(delay) = cli.presentation_delay_ms {
        settings.presentation_delay_ms = delay;
    }

    let store = open_store(cli.db_path)?;
    let (presentation, mut presentation_calls) = ChannelPresentation::new();
    let processor = SimulatedProcessorClient::new(processor_config);

    let mut controller = FlowController::new(Box::new(processor), Box::new(presentation), settings)
        .with_session_store(SessionId::new(cli.session_id), store);
    if let Some(secret) = cli.client_secret {
        controller = controller.with_args(FlowArgs::new(secret).into_diagnostic()?);
    }
    let mut events = controller.subscribe_events();
    let handle = controller.start();

    // Headless host: every presentation change completes instantly.
    let acknowledger = handle.clone();
    tokio::spawn(async move {
        while let Some(call) = presentation_calls.recv().await {
            if let PresentationCall::SetPresentation(state) = call {
                acknowledger.presentation_reached(state);
            }
        }
    });

    let stdout = io::stdout();
    let mut log = EventLog {
        writer: EventWriter::new(stdout.lock()),
        ended: false,
    };

    // Wait for the sheet to come up before replaying user input.
    while !log.ended {
        match events.recv().await {
            Ok(event) => {
                log.record(&event)?;
                if event == FlowEvent::PresentationRequested(PresentationState::Visible) {
                    break;
                }
            }
            Err(RecvError::Lagged(skipped)) => warn!(skipped, "event log lagged"),
            Err(RecvError::Closed) => break,
        }
    }

    let file = File::open(&cli.script).into_diagnostic()?;
    let reader = ScriptReader::new(file);
    for step in reader.steps() {
        match step {
            Ok(step) => {
                if let Err(e) = step.apply(&handle) {
                    error!("Error applying step: {}", e);
                }
                handle.settled().await;
            }
            Err(e) => {
                error!("Error reading step: {}", e);
            }
        }
        loop {
            match events.try_recv() {
                Ok(event) => log.record(&event)?,
                Err(TryRecvError::Lagged(skipped)) => warn!(skipped, "event log lagged"),
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }
    }

    // A closing sheet ends once the acknowledger reports it hidden.
    if let Some(snapshot) = handle.snapshot().await
        && snapshot.phase != SessionPhase::Closing
    {
        handle.teardown();
    }
    while !log.ended {
        match events.recv().await {
            Ok(event) => log.record(&event)?,
            Err(RecvError::Lagged(skipped)) => warn!(skipped, "event log lagged"),
            Err(RecvError::Closed) => break,
        }
    }
    handle.closed().await;
    log.writer.flush().into_diagnostic()?;

    Ok(())
}
