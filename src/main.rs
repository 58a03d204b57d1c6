use std::net::SocketAddr;
use std::sync::Arc;
use support_assistant::api::{create_router, AppState};
use support_assistant::application::{
    ConversationMemory, KnowledgeBase, MessagingGateway, QaService, RagService,
};
use support_assistant::domain::ports::{Embedder, VectorStore};
use support_assistant::infrastructure::{
    AppConfig, InMemoryVectorStore, IntercomClient, OpenAiEmbedder, QdrantVectorStore,
    RigGenerator, VectorStoreBackend,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "support_assistant=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load()?;

    let embedder: Arc<dyn Embedder> = Arc::new(OpenAiEmbedder::from_config(&config.embedding)?);
    let vector_store = open_vector_store(&config, embedder.dimension()).await?;
    let rag = Arc::new(RagService::new(embedder, vector_store));

    KnowledgeBase::new(rag.clone())
        .with_chunking(config.rag.chunk_size, config.rag.chunk_overlap)
        .initialize(&config.knowledge_base.documents_dir)
        .await?;

    let generator = Arc::new(RigGenerator::from_config(&config.llm, &config.prompts)?);
    let memory = Arc::new(
        ConversationMemory::new(config.memory.max_turns)
            .with_max_conversations(config.memory.max_conversations),
    );
    let qa = Arc::new(QaService::new(rag, generator, memory, config.rag.top_k));

    let intercom = Arc::new(IntercomClient::new(config.intercom.clone()));
    let gateway = Arc::new(MessagingGateway::new(qa.clone(), intercom));

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);
    let app = create_router(AppState::new(qa, gateway, config));

    info!("API server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn open_vector_store(
    config: &AppConfig,
    dimension: usize,
) -> anyhow::Result<Arc<dyn VectorStore>> {
    let store: Arc<dyn VectorStore> = match config.vector_store.backend {
        VectorStoreBackend::Local => Arc::new(
            InMemoryVectorStore::new()
                .with_persist_directory(&config.vector_store.persist_directory),
        ),
        VectorStoreBackend::Qdrant => {
            let store = QdrantVectorStore::new(
                &config.vector_store.qdrant_url,
                &config.vector_store.collection,
                dimension,
            )
            .await?;
            info!(url = %config.vector_store.qdrant_url, "Qdrant connected");
            Arc::new(store)
        }
    };
    Ok(store)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        return;
    }
    info!("shutdown signal received");
}
