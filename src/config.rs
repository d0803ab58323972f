use std::{
    net::{IpAddr, SocketAddr},
    time::Duration,
};

use tracing::debug;
use trust_dns_proto::rr::Name;
use trust_dns_resolver::Resolver;

use crate::error::ConfigError;

pub const DEFAULT_NAMESERVER: &str = "1.1.1.1";
pub const DEFAULT_PORT: u16 = 53;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(4);
pub const DEFAULT_RETRIES: u32 = 3;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(2);
pub const DEFAULT_PAYLOAD_SIZE: u16 = 4096;

/// The nameserver every query of the run is sent to, as given by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverTarget {
    pub host: String,
    pub port: u16,
}

impl ResolverTarget {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self { host: host.into(), port }
    }

    /// Turns the target into a socket address. IP literals are used as is,
    /// anything else is looked up through the system resolver.
    pub fn resolve(&self) -> Result<SocketAddr, ConfigError> {
        let host = self.host.trim_start_matches('[').trim_end_matches(']');
        if let Ok(ip) = host.parse::<IpAddr>() {
            return Ok(SocketAddr::new(ip, self.port));
        }

        let resolver = Resolver::from_system_conf().map_err(ConfigError::SystemConf)?;
        let ip = resolver
            .lookup_ip(host)
            .map_err(|source| ConfigError::Resolve { host: host.to_owned(), source })?
            .iter()
            .next()
            .ok_or_else(|| ConfigError::NoAddress(host.to_owned()))?;
        debug!(host, %ip, "resolved nameserver");
        Ok(SocketAddr::new(ip, self.port))
    }
}

/// How the query executor talks to the resolver.
#[derive(Debug, Clone)]
pub struct QueryOptions {
    pub target: SocketAddr,
    pub timeout: Duration,
    /// Attempts made after the first one fails.
    pub retries: u32,
    pub retry_delay: Duration,
    pub payload_size: u16,
}

impl QueryOptions {
    pub fn new(target: SocketAddr) -> Self {
        Self {
            target,
            timeout: DEFAULT_TIMEOUT,
            retries: DEFAULT_RETRIES,
            retry_delay: DEFAULT_RETRY_DELAY,
            payload_size: DEFAULT_PAYLOAD_SIZE,
        }
    }
}

#[derive(Debug, Clone)]
pub struct WalkConfig {
    pub zone: Name,
    pub start: Option<Name>,
    pub full_walk: bool,
    pub query: QueryOptions,
}

/// Splits `[@nameserver] zone` operands, in either order.
pub fn split_operands(operands: &[String]) -> Result<(Option<&str>, &str), ConfigError> {
    let mut server = None;
    let mut zone = None;
    for operand in operands {
        if let Some(host) = operand.strip_prefix('@') {
            if server.replace(host).is_some() {
                return Err(ConfigError::Usage("more than one nameserver given".into()));
            }
        } else if zone.replace(operand.as_str()).is_some() {
            return Err(ConfigError::Usage("more than one zone given".into()));
        }
    }
    let zone = zone.ok_or_else(|| ConfigError::Usage("no zone given".into()))?;
    Ok((server, zone))
}

/// Parses a name from user input, making it fully qualified.
pub fn fqdn(name: &str) -> Result<Name, ConfigError> {
    let qualified = if name.ends_with('.') {
        name.to_owned()
    } else {
        format!("{name}.")
    };
    Name::from_ascii(&qualified).map_err(|source| ConfigError::Name { name: name.to_owned(), source })
}
