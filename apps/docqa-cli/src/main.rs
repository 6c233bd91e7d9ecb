use std::io::{self, Write};

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use docqa_core::config::{Config, Settings};
use docqa_embed::get_default_embedder;
use docqa_generate::{get_default_generator, AnswerGenerator};
use docqa_session::{Action, BuildReport, Event, Response, Session, SessionState};

const CONTEXT_SEPARATOR: &str = "------------------------";

#[derive(Parser)]
#[command(name = "docqa")]
#[command(about = "Ask questions about a directory of PDF documents", long_about = None)]
#[command(version)]
struct Cli {
    #[command(flatten)]
    overrides: Overrides,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct Overrides {
    /// Directory holding the documents to index
    #[arg(long, global = true)]
    data_dir: Option<String>,

    /// Number of chunks retrieved per question
    #[arg(long, global = true)]
    top_k: Option<usize>,

    /// Target chunk size in characters
    #[arg(long, global = true)]
    chunk_size: Option<usize>,

    /// Characters shared by adjacent chunks
    #[arg(long, global = true)]
    chunk_overlap: Option<usize>,

    /// Cap on loaded documents (0 = no cap)
    #[arg(long, global = true)]
    max_documents: Option<usize>,

    /// Print the supporting chunks under every answer
    #[arg(long, global = true)]
    show_context: bool,
}

impl Overrides {
    fn apply(&self, settings: &mut Settings) {
        if let Some(dir) = &self.data_dir {
            settings.data.dir = dir.clone();
        }
        if let Some(k) = self.top_k {
            settings.retrieval.top_k = k;
        }
        if let Some(size) = self.chunk_size {
            settings.splitter.chunk_size = size;
        }
        if let Some(overlap) = self.chunk_overlap {
            settings.splitter.chunk_overlap = overlap;
        }
        if let Some(max) = self.max_documents {
            settings.data.max_documents = max;
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Build the index once and print its statistics
    Build,
    /// Build the index and answer a single question
    Ask {
        /// The question to answer
        question: String,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn,docqa=info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::load().map_err(|e| {
        eprintln!("Error loading config: {}", e);
        e
    })?;
    let mut settings = config.settings()?;
    cli.overrides.apply(&mut settings);
    settings.validate()?;

    let embedder = get_default_embedder(&settings.embedding)?;
    let show_context = cli.overrides.show_context;

    if !needs_generator(cli.command.as_ref()) {
        let (_index, report) = docqa_session::build_index(&settings, embedder)?;
        print_report(&settings, &report);
        return Ok(());
    }

    let answerer = AnswerGenerator::new(get_default_generator(&settings.generation)?);
    let mut session = Session::new(settings, embedder, answerer);
    match cli.command {
        Some(Commands::Ask { question }) => {
            session.build_index()?;
            let response = session.ask(&question)?;
            print_answer(&response, show_context);
        }
        _ => interactive_loop(&mut session, show_context)?,
    }
    Ok(())
}

/// `build` never generates, so it must not require a generation credential.
fn needs_generator(command: Option<&Commands>) -> bool {
    !matches!(command, Some(Commands::Build))
}

fn interactive_loop(session: &mut Session, show_context: bool) -> anyhow::Result<()> {
    println!("📄 Document Q&A ({})", session.model_id());
    println!("========================");
    show_help();
    println!();

    let mut last: Option<Response> = None;
    loop {
        print!("question> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        match input {
            "/help" | "/h" => show_help(),
            "/build" | "/b" => {
                println!("⏳ Building vector store...");
                render(session.handle(Action::BuildIndex), session, show_context, &mut last);
            }
            "/context" | "/c" => match &last {
                Some(response) => print_context(response),
                None => println!("No answer yet."),
            },
            "/stats" | "/s" => show_stats(session),
            "/quit" | "/q" | "quit" | "exit" => {
                println!("👋 Goodbye!");
                break;
            }
            question => render(session.handle(Action::Ask(question.to_string())), session, show_context, &mut last),
        }
        println!();
    }
    Ok(())
}

fn render(event: Event, session: &Session, show_context: bool, last: &mut Option<Response>) {
    match event {
        Event::IndexBuilt(report) => {
            println!("✅ Vector Store DB is ready");
            print_report(session.settings(), &report);
        }
        Event::Answered(response) => {
            print_answer(&response, show_context);
            *last = Some(response);
        }
        Event::Failed { kind, message } => println!("❌ {}: {}", kind.label(), message),
    }
}

fn print_answer(response: &Response, show_context: bool) {
    println!("Response Time: {:.2}s", response.elapsed.as_secs_f64());
    println!();
    println!("Answer: {}", response.answer.text);
    if show_context {
        println!();
        print_context(response);
    }
}

fn print_context(response: &Response) {
    println!("Document similarity context");
    for hit in &response.retrieved.hits {
        println!("[{}] score {:.4}", hit.chunk.provenance(), hit.score);
        println!("{}", hit.chunk.text);
        println!("{}", CONTEXT_SEPARATOR);
    }
}

fn print_report(settings: &Settings, report: &BuildReport) {
    println!("📊 Documents: {}", report.documents);
    println!("📊 Chunks: {}", report.chunks);
    println!("📊 Embedding dimension: {}", report.dim);
    println!("📁 Source: {}", settings.data.dir_path().display());
}

fn show_stats(session: &Session) {
    let settings = session.settings();
    match (session.state(), session.report()) {
        (SessionState::Uninitialized, _) | (_, None) => println!("Index not built yet. Run /build first."),
        (_, Some(report)) => print_report(settings, report),
    }
    println!(
        "⚙️  chunk_size={} chunk_overlap={} top_k={} model={}",
        settings.splitter.chunk_size,
        settings.splitter.chunk_overlap,
        settings.retrieval.top_k,
        session.model_id()
    );
}

fn show_help() {
    println!("🎯 Commands:");
    println!("  /build    - Load, split and embed the documents");
    println!("  /context  - Show the chunks behind the last answer");
    println!("  /stats    - Show index statistics");
    println!("  /help     - Show this help message");
    println!("  /quit     - Exit");
    println!("  <text>    - Ask a question");
}
