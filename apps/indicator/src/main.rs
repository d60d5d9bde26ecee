//! migasfree indicator entry point.

mod app;
mod cli;
mod config;
mod headless;

use std::io::Write;

use clap::Parser;
use migasfree_upgrade::{GatewayProbe, NetworkGate, ProcNetRoute};
use tracing_subscriber::EnvFilter;

/// Exit status when no default gateway shows up in time.
const NO_NETWORK_EXIT_CODE: i32 = 1;

fn main() -> anyhow::Result<()> {
    // Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::Cli::parse();

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "starting migasfree indicator"
    );

    // Load configuration; command-line flags win over the file.
    let mut config = config::Config::load(&cli.config)?;
    config.apply_cli(&cli);
    tracing::info!(
        force_upgrade = config.force_upgrade,
        interval_hours = config.interval,
        "configuration loaded"
    );

    let rt = tokio::runtime::Runtime::new()?;

    // Nothing is shown until the machine has a route out.
    let gate = NetworkGate::new(ProcNetRoute::default());
    if let Some(code) = rt.block_on(await_network(&gate, &mut std::io::stderr())) {
        std::process::exit(code);
    }

    rt.block_on(app::run(config))?;

    tracing::info!("indicator shut down cleanly");
    Ok(())
}

/// Holds startup on the network gate.
///
/// Returns the exit code to quit with when the gate gives up, after
/// reporting it on `out`.
async fn await_network<P: GatewayProbe>(gate: &NetworkGate<P>, out: &mut impl Write) -> Option<i32> {
    match gate.wait().await {
        Ok(_) => None,
        Err(e) => {
            tracing::error!("{e}");
            let _ = writeln!(out, "No network access");
            Some(NO_NETWORK_EXIT_CODE)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    struct FixedGateway(Option<&'static str>);

    impl GatewayProbe for FixedGateway {
        fn default_gateway(&self) -> Option<String> {
            self.0.map(str::to_string)
        }
    }

    #[tokio::test]
    async fn no_gateway_exits_with_message() {
        let gate = NetworkGate::new(FixedGateway(None)).with_timeout(Duration::ZERO);
        let mut out = Vec::new();

        assert_eq!(await_network(&gate, &mut out).await, Some(1));
        assert_eq!(String::from_utf8(out).unwrap(), "No network access\n");
    }

    #[tokio::test]
    async fn gateway_present_continues_silently() {
        let gate = NetworkGate::new(FixedGateway(Some("192.168.1.1"))).with_timeout(Duration::ZERO);
        let mut out = Vec::new();

        assert_eq!(await_network(&gate, &mut out).await, None);
        assert!(out.is_empty());
    }
}
