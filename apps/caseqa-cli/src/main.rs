use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use caseqa_core::answer::{truncate_chars, AnswerFormatter};
use caseqa_core::config::AppConfig;
use caseqa_core::error::Error;
use caseqa_embed::get_default_embedder;
use caseqa_rag::{load_collection, prepare_documents, Retriever};
use caseqa_vector::LanceStore;

#[derive(Parser)]
#[command(name = "caseqa")]
#[command(about = "Question answering over an indexed spreadsheet of case records", long_about = None)]
struct Cli {
    /// Config file (defaults to $APP_CONFIG or ./config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rebuild the vector collection from the configured spreadsheet
    Ingest,
    /// Answer a free-text question from the indexed cases
    Ask {
        /// Query, e.g. 'acoso escolar' or 'PIAR'
        #[arg(long = "q")]
        q: String,

        /// Print debug information
        #[arg(long)]
        debug: bool,
    },
    /// Show what the vector store currently holds
    Inspect,
}

fn init_logging(debug: bool) {
    let default = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).with_target(false).try_init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let debug = matches!(cli.command, Commands::Ask { debug: true, .. });
    init_logging(debug);

    let result = AppConfig::load(cli.config.as_deref()).and_then(|config| match &cli.command {
        Commands::Ingest => ingest(&config),
        Commands::Ask { q, debug } => ask(&config, q, *debug),
        Commands::Inspect => inspect(&config),
    });
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<Error>() {
                Some(Error::NoUsableRows { columns }) => {
                    eprintln!("[ERR] No row has content in text_fields. Check 'text_fields' in the config.");
                    eprintln!("Actual columns: {:?}", columns);
                }
                _ => eprintln!("[ERR] {:#}", e),
            }
            ExitCode::FAILURE
        }
    }
}

fn open_store(config: &AppConfig) -> Result<LanceStore> {
    let embedder = get_default_embedder(&config.embedding_model)?;
    LanceStore::from_config(config, embedder)
}

fn ingest(config: &AppConfig) -> Result<()> {
    let docs = prepare_documents(config)?;
    let store = open_store(config)?;
    let count = load_collection(&store, &docs)?;
    println!("[OK] Indexados {} documentos en '{}' (dir: {}).", count, store.collection(), store.persist_dir().display());
    let first = store.peek(3)?.into_iter().next().unwrap_or_else(|| "—".to_string());
    println!("[OK] Peek ids: {}", first);
    Ok(())
}

fn ask(config: &AppConfig, q: &str, debug: bool) -> Result<()> {
    let store = open_store(config)?;
    if debug {
        println!(
            "[DEBUG] persist_dir={} collections={:?} count={}",
            store.persist_dir().display(),
            store.table_names()?,
            store.count()?
        );
    }
    let retriever = Retriever::new(&store, config);
    let ranked = retriever.search_and_merge(q)?;

    if debug {
        println!("[DEBUG] k={} threshold={}", config.retrieval.k, config.retrieval.distance_max);
        let topic_key = caseqa_core::types::field_meta_key(&config.answer.topic_field);
        for h in ranked.iter().take(10) {
            let topic = truncate_chars(h.meta(&topic_key).unwrap_or(""), 80);
            println!("  - ID {} dist={:.4} tema={}", h.id, h.distance, topic);
        }
    }

    let answer = AnswerFormatter::new(config).format(q, &ranked);
    println!("\n=== RESPUESTA ===");
    println!("{}", answer.text);
    if !answer.sources.is_empty() {
        println!("\nFuentes:");
        for s in &answer.sources {
            println!("• ID {}: dist={}", s.id, s.distance);
        }
    }
    Ok(())
}

fn inspect(config: &AppConfig) -> Result<()> {
    let store = open_store(config)?;
    println!("persist_dir: {}", store.persist_dir().display());
    println!("collections: {:?}", store.table_names()?);
    println!("collection.name: {}", store.collection());
    println!("count: {}", store.count()?);
    println!("peek.ids: {:?}", store.peek(3)?);
    Ok(())
}
