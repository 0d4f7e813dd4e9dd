//! Engine wiring and server startup for unravel.

use std::path::Path;
use std::sync::Arc;

use tracing::info;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use unravel_config::{Config, ConfigLoader, LoggingConfig};
use unravel_engine::optimizer::OptimizerConfig;
use unravel_engine::{Deobfuscator, EngineOptions, Oracle, ProviderOracle};
use unravel_mcp_server::{serve_stdio, McpServer, ServerInfo, ToolRegistry};
use unravel_provider_openai::OpenAIProvider;
use unravel_tools_deobfuscate::{DeobfuscateTool, DetectObfuscationTool};

/// Initialize tracing with console and optional file output.
///
/// Console output goes to stderr because stdout carries MCP traffic.
/// When `logging.dir` is set, logs are also written there with daily rotation.
pub(crate) fn init_tracing(logging: &LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    let file_layer = match &logging.dir {
        Some(dir) => {
            let log_dir = ConfigLoader::expand_path(dir);
            std::fs::create_dir_all(&log_dir)?;

            let file_appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix("unravel")
                .filename_suffix("log")
                .max_log_files(30)
                .build(&log_dir)?;

            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

            // Keeps the background writer alive for the program duration.
            static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
                std::sync::OnceLock::new();
            let _ = GUARD.set(guard);

            Some(fmt::layer().with_writer(non_blocking).with_ansi(false))
        }
        None => None,
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .with(file_layer)
        .init();

    Ok(())
}

/// Load the configuration file, falling back to defaults when it is absent.
pub(crate) fn load_config(path: &Path) -> Result<Config, Box<dyn std::error::Error>> {
    let expanded = ConfigLoader::expand_path(&path.to_string_lossy());
    Ok(ConfigLoader::load_or_default(Path::new(&expanded))?)
}

pub(crate) fn engine_options(config: &Config) -> EngineOptions {
    let engine = &config.engine;
    EngineOptions {
        default_timeout_ms: engine.timeout_ms,
        use_ast_optimization: engine.use_ast_optimization,
        optimizer: OptimizerConfig {
            iterations: engine.optimizer_iterations,
            inline_threshold: engine.inline_threshold,
        },
        oracle_snippet_limit: engine.oracle_snippet_limit,
        llm_cleanup: engine.llm_cleanup,
    }
}

/// Build the oracle from `[oracle]`, if enabled.
pub(crate) fn build_oracle(config: &Config) -> Option<Arc<dyn Oracle>> {
    let oracle = &config.oracle;
    if !oracle.enabled {
        return None;
    }
    info!(url = %oracle.base_url, model = %oracle.model, "LLM oracle enabled");
    let provider = OpenAIProvider::with_url(
        oracle.api_key.clone().unwrap_or_default(),
        oracle.base_url.clone(),
    );
    Some(Arc::new(ProviderOracle::new(Arc::new(provider), oracle.model.clone())))
}

pub(crate) fn build_engine(config: &Config) -> Deobfuscator {
    Deobfuscator::new(engine_options(config), build_oracle(config))
}

/// Register every deobfuscation tool.
pub(crate) fn build_registry(engine: Arc<Deobfuscator>) -> Result<ToolRegistry, Box<dyn std::error::Error>> {
    let registry = ToolRegistry::new();
    registry.register(Arc::new(DeobfuscateTool::new(engine.clone())))?;
    registry.register(Arc::new(DetectObfuscationTool::new(engine)))?;
    Ok(registry)
}

/// Serve MCP over stdio until the client closes stdin.
pub(crate) async fn run_server(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    info!("Starting unravel v{}", env!("CARGO_PKG_VERSION"));

    let engine = Arc::new(build_engine(&config));
    let registry = Arc::new(build_registry(engine)?);
    info!(tools = registry.len(), "Tools registered");

    let server = Arc::new(McpServer::new(
        ServerInfo::new(config.server.name.clone(), env!("CARGO_PKG_VERSION")),
        registry,
    ));
    serve_stdio(server).await?;
    Ok(())
}
