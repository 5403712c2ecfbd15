//! tanyata CLI - index a thesis and chat with it
//!
//! # Commands
//!
//! ```bash
//! # Build the vector index from the configured document
//! tanyata index --input ta_teks_V1.1.txt
//!
//! # Ask questions interactively (needs GROQ_API_KEY)
//! tanyata chat
//!
//! # Show the chunks retrieved for a query, without calling the model
//! tanyata search "Apa yang dibahas dalam penelitian ini?" -k 5
//! ```

mod logging;
mod repl;

use std::io;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tanyata_lib::{
    app,
    chat::ChatSession,
    config::Config,
    embed::{Embedder, FastEmbedder},
    indexer,
};

#[derive(Parser)]
#[command(name = "tanyata")]
#[command(about = "Question answering over a single thesis document")]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to ./tanyata.yaml when present)
    #[arg(long, global = true, env = "TANYATA_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Chunk and embed the document, then write the vector index
    Index {
        /// Document to index
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Index directory
        #[arg(long)]
        index_dir: Option<PathBuf>,

        /// Discard any existing index first
        #[arg(long)]
        fresh: bool,
    },

    /// Interactive question answering
    Chat {
        /// Index directory
        #[arg(long)]
        index_dir: Option<PathBuf>,

        /// Number of chunks to retrieve per question
        #[arg(short, long)]
        k: Option<usize>,
    },

    /// Print the chunks retrieved for a query
    Search {
        query: String,

        /// Index directory
        #[arg(long)]
        index_dir: Option<PathBuf>,

        /// Number of results to return
        #[arg(short, long)]
        k: Option<usize>,
    },
}

impl Commands {
    /// Apply command-line overrides on top of the loaded configuration.
    fn apply(&self, config: &mut Config) {
        match self {
            Self::Index {
                input, index_dir, ..
            } => {
                if let Some(input) = input {
                    config.corpus.path.clone_from(input);
                }
                if let Some(dir) = index_dir {
                    config.index.dir.clone_from(dir);
                }
            }
            Self::Chat { index_dir, k } | Self::Search { index_dir, k, .. } => {
                if let Some(dir) = index_dir {
                    config.index.dir.clone_from(dir);
                }
                if let Some(k) = k {
                    config.retrieval.top_k = *k;
                }
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // A local .env may hold the API key
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref()).context("failed to load configuration")?;
    cli.command.apply(&mut config);
    config.validate().context("invalid configuration")?;

    logging::init(&config.logging)?;

    match cli.command {
        Commands::Index { fresh, .. } => index(&config, fresh),
        Commands::Chat { .. } => chat(&config).await,
        Commands::Search { query, .. } => search(&config, &query),
    }
}

fn index(config: &Config, fresh: bool) -> Result<()> {
    let started = Instant::now();
    let input = config.corpus.path.display();
    println!("Memulai proses indexing untuk '{input}'...");

    println!("[1/4] Memuat dokumen '{input}'...");
    let (doc, chunks) = indexer::load_and_chunk(&config.corpus, &config.chunking)
        .with_context(|| format!("failed to read '{input}'"))?;
    println!(
        "[2/4] Dokumen dipotong menjadi {} potongan (ukuran {}, overlap {})",
        chunks.len(),
        config.chunking.chunk_size,
        config.chunking.chunk_overlap
    );

    println!(
        "[3/4] Menyiapkan model embedding '{}' (diunduh saat pertama kali)...",
        config.embedding.model
    );
    let embedder = FastEmbedder::new(&config.embedding).context("failed to load embedding model")?;

    println!("[4/4] Menyimpan database vektor ke '{}'...", config.index.dir.display());
    let report = indexer::write_index(&chunks, &doc.source_id(), embedder, &config.index.dir, fresh)
        .context("failed to write index")?;

    println!("\n--- Selesai! ---");
    if report.replaced > 0 {
        println!("{} potongan dari proses sebelumnya diganti.", report.replaced);
    }
    println!(
        "Database vektor di '{}' berisi {} potongan.",
        report.dir.display(),
        report.total
    );
    println!("Total waktu: {:.2} detik.", started.elapsed().as_secs_f64());
    Ok(())
}

async fn chat(config: &Config) -> Result<()> {
    println!("Mempersiapkan model dan database...");
    let mut assistant = app::open_assistant(config).context("failed to start chat")?;
    println!(
        "Bot siap! {} potongan terindeks, {} konteks per pertanyaan, model '{}'.\n",
        assistant.retriever().len(),
        assistant.top_k(),
        config.llm.model
    );

    let mut session = ChatSession::new();
    let stdin = io::stdin();
    repl::run(
        &mut assistant,
        &mut session,
        stdin.lock(),
        &mut io::stdout(),
        &mut io::stderr(),
    )
    .await
}

fn search(config: &Config, query: &str) -> Result<()> {
    let mut retriever = app::open_retriever(config).context("failed to open index")?;
    println!(
        "Mencari di {} potongan dengan '{}': '{query}' (k={})",
        retriever.len(),
        retriever.embedder().model_name(),
        config.retrieval.top_k
    );

    let results = retriever.retrieve(query, config.retrieval.top_k)?;

    println!("\n=== Hasil ===\n");
    for (i, result) in results.iter().enumerate() {
        println!("#{} (skor: {:.4}, id: {})", i + 1, result.score, result.chunk.id);
        println!("---");
        let preview: String = result.chunk.content.chars().take(300).collect();
        let ellipsis = if result.chunk.content.chars().count() > 300 { "..." } else { "" };
        println!("{preview}{ellipsis}\n");
    }
    Ok(())
}
