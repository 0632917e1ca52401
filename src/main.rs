use std::sync::Arc;

use famlink_onboarding::catalog::QuestionCatalog;
use famlink_onboarding::config::ServiceConfig;
use famlink_onboarding::flow::QuestionPresenter;
use famlink_onboarding::llm::{LlmBackend, LlmConfig, create_provider};
use famlink_onboarding::routes::{AppState, onboarding_routes};
use famlink_onboarding::store::{LibSqlStore, SessionStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Install rustls crypto provider before any TLS usage
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = ServiceConfig::from_env()?;

    eprintln!("👨‍👩‍👧 Famlink Onboarding v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   API: http://0.0.0.0:{}/api/onboarding", config.port);
    eprintln!("   Language: {}", config.language);

    // ── Question catalog ─────────────────────────────────────────────────
    // A failed load disables the flow endpoints (503), not the process.
    let catalog = match QuestionCatalog::load(&config.questions_path) {
        Ok(catalog) => {
            eprintln!(
                "   Catalog: {} questions from {}",
                catalog.len(),
                config.questions_path.display()
            );
            Some(Arc::new(catalog))
        }
        Err(e) => {
            tracing::error!(error = %e, "Question catalog unavailable, onboarding disabled");
            eprintln!("   Catalog: UNAVAILABLE ({e})");
            None
        }
    };

    // ── Session store ────────────────────────────────────────────────────
    let store: Arc<dyn SessionStore> = Arc::new(
        LibSqlStore::new_local(&config.db_path)
            .await
            .unwrap_or_else(|e| {
                eprintln!(
                    "Error: Failed to open database at {}: {}",
                    config.db_path.display(),
                    e
                );
                std::process::exit(1);
            }),
    );
    eprintln!("   Database: {}", config.db_path.display());

    // ── Text generation (optional) ───────────────────────────────────────
    let llm = match std::env::var("ANTHROPIC_API_KEY") {
        Ok(api_key) => {
            let llm_config = LlmConfig {
                backend: LlmBackend::Anthropic,
                api_key: secrecy::SecretString::from(api_key),
                model: config.model.clone(),
            };
            match create_provider(&llm_config) {
                Ok(provider) => {
                    eprintln!("   Personalization: {}", provider.model_name());
                    Some(provider)
                }
                Err(e) => {
                    tracing::warn!(error = %e, "LLM provider unavailable, serving raw questions");
                    eprintln!("   Personalization: disabled ({e})");
                    None
                }
            }
        }
        Err(_) => {
            eprintln!("   Personalization: disabled (ANTHROPIC_API_KEY not set)");
            None
        }
    };

    let presenter = Arc::new(QuestionPresenter::new(
        llm,
        config.generation_timeout,
        config.language.clone(),
    ));

    // ── HTTP server ──────────────────────────────────────────────────────
    let state = AppState {
        catalog,
        store,
        presenter,
        language: config.language.clone(),
    };
    let app = onboarding_routes(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;
    tracing::info!(port = config.port, "Onboarding server started");
    axum::serve(listener, app).await?;

    Ok(())
}
