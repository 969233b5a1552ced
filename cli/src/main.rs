//! CLI entrypoint for sabha
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use sabha_application::{
    ConversationLogger, EmbeddingProvider, EndMeetingInput, EndMeetingProgress, EndMeetingUseCase,
    IndexDocumentInput, IndexDocumentUseCase, IndexStatus, MeetingStore, NoProgress,
    ProviderFactory, RetrievalMerger, RunTurnError, RunTurnInput, RunTurnUseCase,
};
use sabha_domain::{
    DEFAULT_ROSTER, KnowledgeScope, NewMessage, NewParticipant, Participant, PromptTemplate,
    ProviderKind, ToolCatalog,
};
use sabha_infrastructure::{
    ConfigLoader, FileConfig, InMemoryKnowledgeScopes, InMemoryMeetingStore, InMemoryVectorIndex,
    JsonlConversationLogger, MeetingToolExecutor, ProviderRegistry, create_embedder, tool_spec_for,
};
use sabha_presentation::{
    Cli, Command, ConsoleFormatter, MeetArgs, MeetingReport, OutputFormat, ProgressReporter,
    StreamOutcome, StreamRenderer, print_stream,
};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Keep the guard alive so buffered file logs are flushed on exit
    let _log_guard = init_logging(cli.verbose, cli.log_dir.as_deref());

    info!("Starting sabha");

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref())
            .map_err(|e| anyhow!("Failed to load configuration: {}", e))?
    };

    match &cli.command {
        Command::Config => {
            let sources = if cli.no_config {
                Vec::new()
            } else {
                ConfigLoader::describe_sources(cli.config.as_deref())
            };
            println!("{}", ConsoleFormatter::config_sources(&sources));

            let registry = ProviderRegistry::new(config.provider_settings());
            let defaults = registry.defaults();
            let available: Vec<&str> = registry.available().iter().map(|k| k.as_str()).collect();
            println!(
                "Default provider: {} ({})",
                defaults.provider,
                defaults.model_for(defaults.provider)
            );
            println!("Providers with credentials: {}\n", available.join(", "));

            print!("{}", ConsoleFormatter::config_issues(&config.validate()));
            Ok(())
        }
        Command::Meet(args) => run_meeting(&cli, config, args).await,
    }
}

fn init_logging(verbose: u8, log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };

    let console = fmt::layer().with_target(false).with_writer(std::io::stderr);

    match log_dir {
        Some(dir) => {
            let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, "sabha.log"));
            tracing_subscriber::registry()
                .with(EnvFilter::new(level))
                .with(console)
                .with(fmt::layer().with_ansi(false).with_writer(writer))
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(EnvFilter::new(level))
                .with(console)
                .init();
            None
        }
    }
}

async fn run_meeting(cli: &Cli, config: FileConfig, args: &MeetArgs) -> Result<()> {
    let issues = config.validate();
    for issue in &issues {
        warn!(code = ?issue.code, "{}", issue.message);
    }
    if issues.iter().any(|i| i.is_error()) {
        eprint!("{}", ConsoleFormatter::config_issues(&issues));
        bail!("Configuration is invalid; run `sabha config` for details");
    }

    for file in &args.persona_knowledge {
        if !DEFAULT_ROSTER.iter().any(|p| p.role == file.role) {
            let roles: Vec<&str> = DEFAULT_ROSTER.iter().map(|p| p.role).collect();
            bail!(
                "Unknown persona '{}' in --persona-knowledge (expected one of: {})",
                file.role,
                roles.join(", ")
            );
        }
    }

    let live = args.output == OutputFormat::Full;
    let show_progress = live && !cli.quiet;
    let wants_knowledge = args.uses_knowledge();

    // === Dependency Injection ===
    let settings = config.provider_settings();
    let registry = Arc::new(ProviderRegistry::new(settings.clone()));
    apply_overrides(&registry, args)?;

    let store = Arc::new(InMemoryMeetingStore::new());
    let scopes = Arc::new(InMemoryKnowledgeScopes::new());
    let index = Arc::new(InMemoryVectorIndex::new());

    let (mut catalog, _) = config.meeting.parse_tools();
    if wants_knowledge {
        catalog = ToolCatalog::Full;
    }
    let (rule, _) = config.meeting.parse_end_rule();

    let embedder: Option<Arc<dyn EmbeddingProvider>> = if catalog == ToolCatalog::Full {
        let (kind, _) = config.embedding.parse_provider();
        match create_embedder(
            reqwest::Client::new(),
            kind,
            &config.embedding.model,
            &settings.ollama,
            &settings.gemini,
        ) {
            Ok(embedder) => Some(embedder),
            Err(e) if wants_knowledge => {
                return Err(anyhow!("Cannot index knowledge files: {}", e));
            }
            Err(e) => {
                warn!(error = %e, "Knowledge search disabled");
                None
            }
        }
    } else {
        None
    };

    let mut executor = MeetingToolExecutor::new().with_tools(tool_spec_for(catalog));
    if let Some(embedder) = &embedder {
        let merger = Arc::new(RetrievalMerger::new(embedder.clone(), index.clone()));
        executor = executor.with_knowledge(scopes.clone(), merger);
    }

    let logger: Option<Arc<dyn ConversationLogger>> = match &args.transcript {
        Some(path) => {
            let logger = JsonlConversationLogger::open(path)
                .with_context(|| format!("Failed to open transcript {}", path.display()))?;
            info!(path = %path.display(), session = logger.session(), "Writing transcript");
            Some(Arc::new(logger))
        }
        None => None,
    };

    // === Meeting setup ===
    let meeting = store.create_meeting(args.meeting_name(), &args.agenda).await?;
    let mut participants: Vec<Participant> = Vec::with_capacity(DEFAULT_ROSTER.len());
    for persona in DEFAULT_ROSTER.iter() {
        let participant = store
            .add_participant(
                &meeting.id,
                NewParticipant::new(persona.name, persona.role, PromptTemplate::persona_system(persona.prompt)),
            )
            .await?;
        participants.push(participant);
    }

    if live {
        println!("{}", ConsoleFormatter::meeting_header(&meeting, &participants));
    }

    if let Some(embedder) = embedder.filter(|_| wants_knowledge) {
        let indexer = IndexDocumentUseCase::new(embedder, index.clone());
        if !args.knowledge.is_empty() {
            let scope = scopes.share_with_meeting(&meeting.id).await;
            for path in &args.knowledge {
                index_file(&indexer, &scope, path).await?;
            }
        }
        for file in &args.persona_knowledge {
            for participant in participants.iter().filter(|p| p.role == file.role) {
                let scope = scopes.attach_to_participant(&participant.id, &file.role).await;
                index_file(&indexer, &scope, &file.path).await?;
            }
        }
    }

    for content in &args.messages {
        let message = store.append_message(&meeting.id, NewMessage::user(content.as_str())).await?;
        if live {
            print!("{}", ConsoleFormatter::message(&message));
        }
    }

    // === Rounds ===
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted; cancelling the current turn");
                cancel.cancel();
            }
        });
    }

    let mut turns = RunTurnUseCase::new(store.clone(), registry.clone(), Arc::new(executor))
        .with_cancellation(cancel.clone());
    if let Some(logger) = &logger {
        turns = turns.with_conversation_logger(logger.clone());
    }

    'rounds: for round in 1..=args.rounds {
        info!(meeting_id = %meeting.id, round, "Starting round");
        for participant in &participants {
            if cancel.is_cancelled() {
                break 'rounds;
            }
            let input = RunTurnInput::new(&meeting.id, &participant.id);

            if live && args.stream {
                print!("{}", StreamRenderer::speaker(&participant.name));
                let mut stdout = std::io::stdout();
                let outcome = print_stream(turns.execute_streaming(input), &mut stdout).await?;
                stdout.flush()?;
                if let StreamOutcome::Failed(reason) = outcome {
                    warn!(participant = %participant.name, error = %reason, "Turn failed");
                }
                continue;
            }

            let spinner = show_progress.then(|| ProgressReporter::turn_spinner(&participant.name));
            let result = turns.execute(&input).await;
            if let Some(spinner) = spinner {
                spinner.finish_and_clear();
            }

            match result {
                Ok(turn) if live => print!("{}", ConsoleFormatter::turn(&turn)),
                Ok(_) => {}
                Err(RunTurnError::Cancelled) => break 'rounds,
                Err(e) if e.is_not_found() => return Err(e.into()),
                Err(e) => {
                    warn!(participant = %participant.name, error = %e, "Turn failed");
                    eprintln!("{} could not speak: {}", participant.name, e);
                }
            }
        }
    }

    // === End of meeting ===
    let outcome = if args.no_end || cancel.is_cancelled() {
        None
    } else {
        let mut end = EndMeetingUseCase::new(store.clone(), registry.clone())
            .with_rule(rule)
            .with_vote_history(config.meeting.vote_history);
        if let Some(logger) = &logger {
            end = end.with_conversation_logger(logger.clone());
        }

        let mut input = EndMeetingInput::new(&meeting.id);
        if args.force_end {
            input = input.forced();
        }

        let progress: Box<dyn EndMeetingProgress> = if show_progress {
            Box::new(ProgressReporter::new())
        } else {
            Box::new(NoProgress)
        };
        let outcome = end.execute_with_progress(&input, progress.as_ref()).await?;
        drop(progress);

        if live {
            print!("{}", ConsoleFormatter::end_outcome(&outcome));
        }
        Some(outcome)
    };

    if live {
        let total = store
            .get_snapshot(&meeting.id)
            .await?
            .map(|s| s.meeting.total_cost)
            .unwrap_or_default();
        println!("Total estimated cost: ${:.4}", total);
        return Ok(());
    }

    let snapshot = store
        .get_snapshot(&meeting.id)
        .await?
        .ok_or_else(|| anyhow!("Meeting {} disappeared", meeting.id))?;
    let mut report = MeetingReport::new(
        snapshot,
        store.list_disagreements(&meeting.id).await?,
        store.list_consensus(&meeting.id).await?,
    );
    if let Some(outcome) = &outcome {
        report = report.with_end(outcome);
    }

    match args.output {
        OutputFormat::Json => println!("{}", report.to_json()),
        _ => print!("{}", ConsoleFormatter::format_summary_only(&report)),
    }

    Ok(())
}

/// Read a plain-text file and index it into `scope`; indexing problems are
/// reported and skipped, unreadable files are fatal
async fn index_file(indexer: &IndexDocumentUseCase, scope: &KnowledgeScope, path: &Path) -> Result<()> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let title = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let input = IndexDocumentInput::new(scope.clone(), path.display().to_string(), text).with_title(title);
    let report = indexer.execute(input).await;
    match report.status {
        IndexStatus::Indexed => info!(
            document = %report.document_id,
            collection = %report.collection,
            chunks = report.chunks,
            "Knowledge indexed"
        ),
        IndexStatus::Empty => warn!(document = %report.document_id, "Knowledge file has no text"),
        IndexStatus::Failed(reason) => eprintln!("Skipping {}: {}", report.document_id, reason),
    }

    Ok(())
}

/// Apply `--provider` / `--model` to the process-wide defaults
fn apply_overrides(registry: &ProviderRegistry, args: &MeetArgs) -> Result<()> {
    if args.provider.is_none() && args.model.is_none() {
        return Ok(());
    }

    let mut defaults = registry.defaults();
    if let Some(provider) = &args.provider {
        defaults.provider = provider.parse::<ProviderKind>()?;
    }
    if let Some(model) = &args.model {
        let slot = match defaults.provider {
            ProviderKind::OpenRouter => &mut defaults.openrouter_model,
            ProviderKind::Ollama => &mut defaults.ollama_model,
            ProviderKind::Gemini => &mut defaults.gemini_model,
        };
        *slot = model.clone();
    }
    registry.set_defaults(defaults);

    Ok(())
}
