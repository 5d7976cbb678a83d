mod display;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use lexdraft_ai::{CaseIntelligence, ChatIntelligence, MockIntelligence, MockLatency};
use lexdraft_chat::{
    CaseConversation, ChatClient, ChatConfig, CredentialStore, DEFAULT_ENDPOINT, DEFAULT_MODEL,
    FileCredentialStore, improve_lawsuit, validate_credential,
};
use lexdraft_core::{CaseDetails, CaseRecord, DocumentHandle};
use lexdraft_wizard::{Advance, Wizard};

#[derive(Parser)]
#[command(name = "lexdraft", version, about = "Labor-law case intake and lawsuit drafting")]
struct Cli {
    /// Key/value file holding the API credential.
    #[arg(long, env = "LEXDRAFT_CREDENTIAL_FILE", global = true)]
    credential_file: Option<PathBuf>,

    #[command(flatten)]
    chat: ChatArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct ChatArgs {
    #[arg(long, env = "LEXDRAFT_ENDPOINT", default_value = DEFAULT_ENDPOINT, global = true)]
    endpoint: String,

    #[arg(long, env = "LEXDRAFT_MODEL", default_value = DEFAULT_MODEL, global = true)]
    model: String,

    #[arg(long, env = "LEXDRAFT_TEMPERATURE", default_value_t = 0.7, global = true)]
    temperature: f32,

    #[arg(long, env = "LEXDRAFT_MAX_TOKENS", default_value_t = 1500, global = true)]
    max_tokens: u32,

    /// Whole-request timeout in seconds.
    #[arg(long, env = "LEXDRAFT_TIMEOUT_SECS", global = true)]
    timeout_secs: Option<u64>,
}

impl ChatArgs {
    fn config(&self) -> ChatConfig {
        let mut config = ChatConfig {
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            ..ChatConfig::default()
        }
        .with_endpoint(self.endpoint.as_str())
        .with_model(self.model.as_str());
        if let Some(secs) = self.timeout_secs {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        config
    }
}

#[derive(Subcommand)]
enum Command {
    /// Report whether an API credential is stored.
    Status,
    /// Validate an API key against the service and store it.
    Setup {
        #[arg(long, env = "LEXDRAFT_API_KEY", hide_env_values = true)]
        api_key: String,
    },
    /// Remove the stored API credential.
    Logout,
    /// Run a new case through every intake stage.
    NewCase(NewCaseArgs),
    /// Ask the assistant about a case saved with `new-case --output json`.
    Ask {
        #[arg(long)]
        record: PathBuf,
        message: String,
    },
    /// Ask the assistant to revise a lawsuit document.
    Improve {
        #[arg(long)]
        document: PathBuf,
        #[arg(long)]
        request: String,
    },
}

#[derive(Args)]
struct NewCaseArgs {
    #[arg(long, default_value = "")]
    title: String,
    #[arg(long)]
    client_name: String,
    #[arg(long, default_value = "")]
    client_email: String,
    #[arg(long, default_value = "")]
    client_phone: String,
    #[arg(long, default_value = "")]
    description: String,
    /// Case explanation text.
    #[arg(long, conflicts_with = "explanation_file")]
    explanation: Option<String>,
    /// Read the case explanation from a file.
    #[arg(long)]
    explanation_file: Option<PathBuf>,
    /// Attach a document (repeatable).
    #[arg(long = "document")]
    documents: Vec<PathBuf>,
    #[arg(long, value_enum, default_value_t = Backend::Mock)]
    backend: Backend,
    /// Skip the mock backend's simulated processing time.
    #[arg(long)]
    instant: bool,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,
}

#[derive(Clone, Copy, ValueEnum)]
enum Backend {
    Mock,
    Llm,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Top-level session context: owns the credential store and hands the
/// stored credential to clients it builds.
struct AppContext {
    store: FileCredentialStore,
    config: ChatConfig,
}

impl AppContext {
    fn new(cli: &Cli) -> Self {
        let path = cli
            .credential_file
            .clone()
            .unwrap_or_else(default_credential_file);
        Self {
            store: FileCredentialStore::new(path),
            config: cli.chat.config(),
        }
    }

    /// Client carrying the stored credential. Fails if none is stored.
    fn authorized_client(&self) -> anyhow::Result<ChatClient> {
        let credential = self
            .store
            .load()
            .with_context(|| format!("reading {}", self.store.path().display()))?;
        if credential.is_none() {
            bail!("no API key configured; run `lexdraft setup --api-key <KEY>` first");
        }
        Ok(ChatClient::new(self.config.clone(), credential)?)
    }
}

fn default_credential_file() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_default()
        .join(".lexdraft")
        .join("credentials.json")
}

fn document_handle(path: &Path) -> anyhow::Result<DocumentHandle> {
    let metadata =
        std::fs::metadata(path).with_context(|| format!("reading {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let mut handle = DocumentHandle::new(name, metadata.len());
    handle.media_type = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    Ok(handle)
}

async fn run_new_case(ctx: &AppContext, args: NewCaseArgs) -> anyhow::Result<()> {
    let case_explanation = match (&args.explanation, &args.explanation_file) {
        (Some(text), _) => text.clone(),
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?,
        (None, None) => String::new(),
    };

    let mut details = CaseDetails {
        title: args.title,
        client_name: args.client_name,
        client_email: args.client_email,
        client_phone: args.client_phone,
        description: args.description,
        case_explanation,
        ..CaseDetails::default()
    };
    for path in &args.documents {
        details.attach(document_handle(path)?);
    }

    let intelligence: Box<dyn CaseIntelligence> = match args.backend {
        Backend::Mock if args.instant => Box::new(MockIntelligence::instant()),
        Backend::Mock => Box::new(MockIntelligence::new(MockLatency::default())),
        Backend::Llm => Box::new(ChatIntelligence::new(ctx.authorized_client()?)),
    };

    let wizard = Wizard::with_details(intelligence, details);
    display::print_stage(wizard.current_stage());
    let record = loop {
        match wizard.advance().await? {
            Advance::Moved(stage) => display::print_stage(stage),
            Advance::Completed(record) => break record,
        }
    };

    match args.output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&record)?),
        OutputFormat::Text => display::print_case(&record),
    }
    Ok(())
}

async fn run_ask(ctx: &AppContext, record_path: &Path, message: &str) -> anyhow::Result<()> {
    let json = std::fs::read_to_string(record_path)
        .with_context(|| format!("reading {}", record_path.display()))?;
    let record: CaseRecord = serde_json::from_str(&json).context("parsing case record")?;

    let mut conversation = match &record.lawsuit {
        Some(lawsuit) => CaseConversation::for_document(&lawsuit.full_text),
        None => CaseConversation::new(),
    };

    let client = ctx.authorized_client()?;
    match conversation.send(&client, message).await? {
        Some(reply) => println!("{reply}"),
        None => bail!("message is empty"),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();
    tracing::info!("lexdraft v{}", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();
    let mut ctx = AppContext::new(&cli);

    match cli.command {
        Command::Status => match ctx.store.load()? {
            Some(_) => println!("API key configured ({})", ctx.store.path().display()),
            None => println!("No API key configured. Run `lexdraft setup --api-key <KEY>`."),
        },
        Command::Setup { api_key } => {
            let mut client = ChatClient::new(ctx.config.clone(), None)?;
            validate_credential(&mut client, &mut ctx.store, &api_key).await?;
            println!("API key validated and saved to {}", ctx.store.path().display());
        }
        Command::Logout => {
            ctx.store.clear()?;
            println!("API key removed");
        }
        Command::NewCase(args) => run_new_case(&ctx, args).await?,
        Command::Ask { record, message } => run_ask(&ctx, &record, &message).await?,
        Command::Improve { document, request } => {
            let text = std::fs::read_to_string(&document)
                .with_context(|| format!("reading {}", document.display()))?;
            let client = ctx.authorized_client()?;
            println!("{}", improve_lawsuit(&client, &text, &request).await?);
        }
    }
    Ok(())
}
