//! Process-level wiring of the query service

use crate::chat::Assistant;
use crate::config::Config;
use crate::embed::FastEmbedder;
use crate::generate::GroqGenerator;
use crate::search::Retriever;
use crate::store::DiskStore;
use crate::Result;

pub type ThesisRetriever = Retriever<FastEmbedder, DiskStore>;
pub type ThesisAssistant = Assistant<FastEmbedder, DiskStore, GroqGenerator>;

/// Open the persisted index and load the embedding model it was built with.
///
/// The index is opened first so a missing index fails before the model is
/// downloaded.
pub fn open_retriever(config: &Config) -> Result<ThesisRetriever> {
    let store = DiskStore::open(&config.index.dir)?;
    let embedder = FastEmbedder::new(&config.embedding)?;
    store.manifest().ensure_matches(&embedder)?;
    Ok(Retriever::new(embedder, store))
}

/// Build the chat assistant.
///
/// The API key is resolved before anything else is loaded.
pub fn open_assistant(config: &Config) -> Result<ThesisAssistant> {
    let api_key = config.llm.api_key()?;
    let generator = GroqGenerator::new(&config.llm, api_key)?;
    let retriever = open_retriever(config)?;

    Ok(Assistant::new(
        retriever,
        config.prompt.template(),
        generator,
        config.retrieval.top_k,
    ))
}
