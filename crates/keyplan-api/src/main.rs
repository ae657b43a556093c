//! keyplan-api server binary.

use std::net::SocketAddr;
use std::path::Path;

use keyplan_api::{build_router, AppState, ServerConfig};
use keyplan_core::ModelerConfig;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::writer::BoxMakeWriter, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

const DEFAULT_LOG_FILTER: &str = "keyplan_api=debug,keyplan_modeler=debug,tower_http=debug";
const DEFAULT_LOG_FILE_NAME: &str = "keyplan-api.log";

/// Log output settings.
///
/// | Variable | Meaning |
/// |----------|---------|
/// | `LOG_FORMAT` | `json` or `text` (default) |
/// | `LOG_FILE` | Daily-rotated log file instead of stdout |
/// | `LOG_ANSI` | `true`/`1` forces colors; otherwise on for stdout only |
/// | `RUST_LOG` | Env filter, default `keyplan_api=debug,keyplan_modeler=debug,tower_http=debug` |
#[derive(Debug, Clone, PartialEq, Eq)]
struct LogSettings {
    json: bool,
    file: Option<String>,
    ansi: Option<bool>,
}

impl LogSettings {
    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            json: lookup("LOG_FORMAT").is_some_and(|v| v.trim().eq_ignore_ascii_case("json")),
            file: lookup("LOG_FILE").filter(|v| !v.trim().is_empty()),
            ansi: lookup("LOG_ANSI").map(|v| v == "true" || v == "1"),
        }
    }

    fn format_name(&self) -> &'static str {
        if self.json {
            "json"
        } else {
            "text"
        }
    }
}

/// Install the global subscriber. The returned guard flushes the file
/// writer and must live as long as the process.
fn init_tracing(settings: &LogSettings) -> Option<WorkerGuard> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());

    let (writer, guard) = match settings.file.as_deref() {
        Some(path) => {
            let path = Path::new(path);
            let dir = path.parent().unwrap_or(Path::new("."));
            let name = path
                .file_name()
                .and_then(|f| f.to_str())
                .unwrap_or(DEFAULT_LOG_FILE_NAME);
            let appender = tracing_appender::rolling::daily(dir, name);
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            (BoxMakeWriter::new(non_blocking), Some(guard))
        }
        None => (BoxMakeWriter::new(std::io::stdout), None),
    };

    let layer = if settings.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(writer)
            .boxed()
    } else {
        let ansi = settings.ansi.unwrap_or(settings.file.is_none());
        tracing_subscriber::fmt::layer()
            .with_ansi(ansi)
            .with_writer(writer)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(layer)
        .with(env_filter)
        .init();

    guard
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let log_settings = LogSettings::from_lookup(|key| std::env::var(key).ok());
    let _file_guard = init_tracing(&log_settings);
    info!(
        log_format = log_settings.format_name(),
        log_file = log_settings.file.as_deref().unwrap_or("(stdout)"),
        "Logging initialized"
    );

    let modeler_config = ModelerConfig::from_env();
    let server_config = ServerConfig::from_env();
    info!(
        default_keyspace = %modeler_config.default_keyspace,
        batch_policy = %modeler_config.batch_policy,
        large_partition_mb = modeler_config.large_partition_mb,
        allowed_origins = server_config.allowed_origins.len(),
        "Configuration loaded"
    );

    let app = build_router(AppState::new(modeler_config), &server_config);

    let addr: SocketAddr = server_config.bind_address().parse()?;
    info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(pairs: &[(&str, &str)]) -> LogSettings {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        LogSettings::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_log_settings_default_to_text_on_stdout() {
        let s = settings(&[]);
        assert_eq!(
            s,
            LogSettings {
                json: false,
                file: None,
                ansi: None,
            }
        );
        assert_eq!(s.format_name(), "text");
    }

    #[test]
    fn test_log_settings_from_environment() {
        let s = settings(&[
            ("LOG_FORMAT", "JSON"),
            ("LOG_FILE", "/var/log/keyplan/api.log"),
            ("LOG_ANSI", "1"),
        ]);
        assert!(s.json);
        assert_eq!(s.file.as_deref(), Some("/var/log/keyplan/api.log"));
        assert_eq!(s.ansi, Some(true));
        assert_eq!(s.format_name(), "json");
    }

    #[test]
    fn test_blank_log_file_means_stdout() {
        let s = settings(&[("LOG_FILE", "  "), ("LOG_ANSI", "no")]);
        assert_eq!(s.file, None);
        assert_eq!(s.ansi, Some(false));
    }
}
