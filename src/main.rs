use clap::{CommandFactory, Parser};
use std::{error::Error, io, process::ExitCode, time::Duration};
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod advance;
mod config;
mod enumerate;
mod error;
mod exchange;
mod nsec;
mod query;
mod walk;

#[cfg(test)]
mod testing;

use config::{QueryOptions, ResolverTarget, WalkConfig};
use error::ConfigError;
use exchange::NetExchanger;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about=None)]
#[command(override_usage = "nsecwalk [@nameserver] [OPTIONS] <ZONE>")]
struct Args {
    /// Zone to walk, optionally with @nameserver to query (default 1.1.1.1)
    #[arg(required = true, value_name = "ZONE")]
    operands: Vec<String>,

    /// Do a full zone walk
    #[arg(short = 'f', long = "full")]
    full_walk: bool,

    /// Start walk with this owner name
    #[arg(short, long, value_name = "NAME")]
    start: Option<String>,

    /// Specify port number
    #[arg(short, long, default_value_t = config::DEFAULT_PORT)]
    port: u16,

    /// Seconds to wait for each response
    #[arg(short, long, value_name = "SECS", default_value_t = config::DEFAULT_TIMEOUT.as_secs())]
    timeout: u64,

    /// Attempts after a failed query before giving up
    #[arg(long, default_value_t = config::DEFAULT_RETRIES)]
    retries: u32,

    /// Seconds to wait between attempts
    #[arg(long, value_name = "SECS", default_value_t = config::DEFAULT_RETRY_DELAY.as_secs())]
    retry_delay: u64,
}

impl Args {
    fn into_config(self) -> Result<WalkConfig, ConfigError> {
        let (server, zone) = config::split_operands(&self.operands)?;
        let target = ResolverTarget::new(server.unwrap_or(config::DEFAULT_NAMESERVER), self.port);
        let zone = config::fqdn(zone)?;
        let start = self.start.as_deref().map(config::fqdn).transpose()?;

        let mut query = QueryOptions::new(target.resolve()?);
        query.timeout = Duration::from_secs(self.timeout);
        query.retries = self.retries;
        query.retry_delay = Duration::from_secs(self.retry_delay);

        Ok(WalkConfig { zone, start, full_walk: self.full_walk, query })
    }
}

/// Logs go to stderr so stdout only carries the walk. `RUST_LOG` overrides
/// the default level, e.g. `RUST_LOG=nsecwalk=debug`.
fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .without_time()
        .init();
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let config = match args.into_config() {
        Ok(config) => config,
        Err(ConfigError::Usage(msg)) => {
            Args::command()
                .error(clap::error::ErrorKind::WrongNumberOfValues, msg)
                .exit()
        }
        Err(e) => return Err(e.into()),
    };
    debug!(?config, "starting walk");

    let exchanger = NetExchanger::new(config.query.timeout);
    let stdout = io::stdout();
    walk::run(&config, exchanger, &mut stdout.lock())?;
    Ok(())
}

fn main() -> ExitCode {
    init_logging();

    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
