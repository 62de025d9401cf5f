use std::time::Duration;

use clap::Parser;
use tracing_subscriber::{fmt::format, prelude::__tracing_subscriber_field_MakeExt, EnvFilter};

use crate::release::ReleaseConfig;

#[derive(Debug, Parser)]
pub struct Config {
    #[clap(required = true, env)]
    pub database_url: String,
    #[clap(default_value = "", env)]
    pub env: String,
    /// Seconds an assignment holds equipment before auto-release.
    #[clap(default_value = "8", env)]
    pub release_window_secs: u64,
    /// Seconds shutdown waits for outstanding releases before discarding them.
    #[clap(default_value = "5", env)]
    pub release_grace_secs: u64,
}

impl Config {
    pub fn release(&self) -> ReleaseConfig {
        ReleaseConfig {
            window: Duration::from_secs(self.release_window_secs),
            grace: Duration::from_secs(self.release_grace_secs),
        }
    }
}

pub fn configure_tracing() {
    let formatter =
        format::debug_fn(|writer, field, value| write!(writer, "{}={:?}", field, value))
            .delimited(" ");

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .fmt_fields(formatter)
        .init();
}
