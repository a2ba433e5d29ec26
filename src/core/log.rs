use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter, filter::Targets, fmt, prelude::__tracing_subscriber_SubscriberExt,
    util::SubscriberInitExt,
};

/// Installs the global subscriber.
///
/// A set `RUST_LOG` takes precedence; otherwise `verbose` turns on debug
/// output for this crate and everything else stays at warn.
pub fn init_logging(verbose: bool) {
    let (env_filter, app_filter) = match EnvFilter::try_from_default_env() {
        Ok(env_filter) => (Some(env_filter), None),
        Err(_) => (None, Some(app_targets(verbose))),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().pretty().without_time().with_writer(std::io::stderr))
        .with(app_filter)
        .with(env_filter)
        .init();
}

fn app_targets(verbose: bool) -> Targets {
    let level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    Targets::new()
        .with_target("xrate", level)
        .with_default(LevelFilter::WARN)
}
