//! Tutor Bot entry point.
//!
//! Startup sequence:
//!   1. Load .env (if present)
//!   2. Load config
//!   3. Resolve effective log level (CLI `-v` flags > RUST_LOG > config)
//!   4. Init logger once
//!   5. Open the study store
//!   6. Build the LLM provider, prompts and study service
//!   7. Spawn Ctrl-C → shutdown signal watcher
//!   8. Serve HTTP until the token is cancelled

use tokio_util::sync::CancellationToken;
use tracing::info;

use tutor_bot::{
    config,
    error::AppError,
    generation::Generator,
    http::{self, AppState},
    llm::providers,
    logger::{self, LevelChoice},
    markdown::RenderOptions,
    prompts::PromptSet,
    store::StudyStore,
    study::StudyService,
};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    // .env is optional.
    let _ = dotenvy::dotenv();

    let args = parse_cli_args(std::env::args().skip(1));

    let config = config::load(args.config_path.as_deref())?;

    let level = LevelChoice::resolve(args.log_level, &config.log_level);
    logger::init(level)?;

    info!(
        app_name = %config.app_name,
        work_dir = %config.work_dir.display(),
        configured_log_level = %config.log_level,
        effective_log_level = %level.directive,
        level_from_cli = level.from_cli,
        "config loaded"
    );

    let store = StudyStore::open(&config.work_dir).map_err(|e| AppError::Store(e.to_string()))?;
    info!(db = %store.db_path().display(), "study store ready");

    let provider = providers::build(&config.llm, config.llm_api_key.clone())
        .map_err(|e| AppError::Config(e.to_string()))?;
    info!(
        provider = provider.name(),
        model = %config.llm.openai.model,
        max_tokens = config.llm.openai.max_tokens,
        "llm provider ready"
    );

    let prompts = PromptSet::load(config.prompts_dir.as_deref());
    let render = RenderOptions { escape_html: config.render.escape_html };

    let study = StudyService::new(store, Generator::new(provider), prompts, render);
    let state = AppState::new(&config.app_name, study);

    let shutdown = CancellationToken::new();

    let ctrlc_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("ctrl-c received, shutting down");
            ctrlc_token.cancel();
        }
    });

    http::serve(&config.http.bind, state, shutdown).await?;

    info!("clean shutdown");
    Ok(())
}

struct CliArgs {
    log_level: Option<&'static str>,
    config_path: Option<String>,
}

fn parse_cli_args(args: impl IntoIterator<Item = String>) -> CliArgs {
    let mut verbosity = 0u8;
    let mut config_path = None;

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        if arg == "--" {
            break;
        }

        match arg.as_str() {
            "-h" | "--help" => {
                println!("Usage: tutor-bot [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -h, --help                 Print help");
                println!("  -f, --config <PATH>        Path to configuration file (default: config/default.toml)");
                println!("  -v, -vv, -vvv, -vvvv       Increase logging verbosity");
                std::process::exit(0);
            }
            "-f" | "--config" => {
                if let Some(path) = iter.next() {
                    config_path = Some(path);
                } else {
                    eprintln!("error: -f/--config requires a path argument");
                    std::process::exit(1);
                }
            }
            "--verbose" => verbosity = verbosity.saturating_add(1),
            a if a.starts_with('-') && a.len() > 1 && a.chars().skip(1).all(|c| c == 'v') => {
                let count = u8::try_from(a.len() - 1).unwrap_or(u8::MAX);
                verbosity = verbosity.saturating_add(count);
            }
            _ => {}
        }
    }

    // -v warn, -vv info, -vvv debug, -vvvv+ trace.
    let log_level = match verbosity {
        0 => None,
        1 => Some("warn"),
        2 => Some("info"),
        3 => Some("debug"),
        _ => Some("trace"),
    };

    CliArgs { log_level, config_path }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliArgs {
        parse_cli_args(args.iter().map(|a| a.to_string()))
    }

    #[test]
    fn no_flags_keeps_config_level() {
        let args = parse(&[]);
        assert_eq!(args.log_level, None);
        assert_eq!(args.config_path, None);
    }

    #[test]
    fn verbosity_flags_accumulate() {
        assert_eq!(parse(&["-v"]).log_level, Some("warn"));
        assert_eq!(parse(&["-v", "--verbose"]).log_level, Some("info"));
        assert_eq!(parse(&["-vvv"]).log_level, Some("debug"));
        assert_eq!(parse(&["-vv", "-vv"]).log_level, Some("trace"));
    }

    #[test]
    fn very_long_verbosity_flag_saturates_to_trace() {
        for n in [255, 256, 300, 512] {
            let flag = format!("-{}", "v".repeat(n));
            assert_eq!(parse(&[flag.as_str()]).log_level, Some("trace"), "{n} v's");
        }
    }

    #[test]
    fn config_path_and_separator() {
        let args = parse(&["-f", "my.toml", "--", "-vvv"]);
        assert_eq!(args.config_path.as_deref(), Some("my.toml"));
        assert_eq!(args.log_level, None);
    }
}
