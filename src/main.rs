//! Echo Capture CLI entry point

use std::process::ExitCode;

use clap::Parser;

use echo_capture::cli::{
    app::{backend_store, init_tracing, load_merged_config, EXIT_ERROR, EXIT_USAGE_ERROR},
    args::{Cli, Commands, RecordArgs, RecordOptions},
    config_cmd::handle_config_command,
    presenter::Presenter,
    record_cmd::run_record,
    testimonial_cmd::{
        handle_delete, handle_link, handle_list, handle_set_approved, handle_submit,
        TestimonialCmdError,
    },
};
use echo_capture::domain::config::AppConfig;
use echo_capture::domain::recording::Duration;
use echo_capture::infrastructure::XdgConfigStore;

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut presenter = Presenter::new();
    let config_store = XdgConfigStore::new();

    // Config management works on the file alone
    let command = match cli.command {
        Commands::Config { action } => {
            if let Err(e) = handle_config_command(action, &config_store, &presenter).await {
                presenter.error(&e.to_string());
                return ExitCode::from(EXIT_ERROR);
            }
            return ExitCode::SUCCESS;
        }
        other => other,
    };

    let config = load_merged_config(&config_store, AppConfig::empty()).await;

    let result = match command {
        Commands::Record(args) => {
            return match record_options(args, &config) {
                Ok(options) => run_record(options).await,
                Err(message) => {
                    presenter.error(&message);
                    ExitCode::from(EXIT_USAGE_ERROR)
                }
            };
        }
        Commands::Link { origin } => {
            let origin = origin.unwrap_or_else(|| config.share_origin_or_default().to_string());
            handle_link(&origin, &presenter);
            return ExitCode::SUCCESS;
        }
        Commands::Config { .. } => return ExitCode::SUCCESS,
        backend_command => {
            let store = match backend_store(&config) {
                Ok(store) => store,
                Err(message) => {
                    presenter.error(&message);
                    return ExitCode::from(EXIT_ERROR);
                }
            };
            match backend_command {
                Commands::Submit(args) => handle_submit(args, store, &mut presenter).await,
                Commands::List { approved, pending } => {
                    handle_list(store, approved, pending, &presenter).await
                }
                Commands::Approve { id } => {
                    handle_set_approved(store, &id, true, &presenter).await
                }
                Commands::Unapprove { id } => {
                    handle_set_approved(store, &id, false, &presenter).await
                }
                Commands::Delete { id } => handle_delete(store, &id, &presenter).await,
                _ => Ok(()),
            }
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => exit_for(&e, &presenter),
    }
}

/// Resolve `record` arguments against config, clamping to `max_duration`
fn record_options(args: RecordArgs, config: &AppConfig) -> Result<RecordOptions, String> {
    let requested = match args.duration.as_deref() {
        Some(s) => s
            .parse::<Duration>()
            .map_err(|e| format!("Invalid duration: {}", e))?,
        None => Duration::default_duration(),
    };

    let max = config.max_duration_or_default();
    if requested > max {
        tracing::warn!(%requested, %max, "duration clamped to max_duration");
    }

    Ok(RecordOptions {
        kind: args.kind.into(),
        duration: requested.clamp_to(max),
        device: args.device,
        facing_mode: args
            .facing
            .map(Into::into)
            .unwrap_or_else(|| config.facing_mode_or_default()),
        output: args.output,
        play: args.play,
    })
}

fn exit_for(error: &TestimonialCmdError, presenter: &Presenter) -> ExitCode {
    presenter.error(&error.to_string());
    if error.is_usage_error() {
        ExitCode::from(EXIT_USAGE_ERROR)
    } else {
        ExitCode::from(EXIT_ERROR)
    }
}
