use std::io;

use thiserror::Error;
use trust_dns_client::error::{ClientError, ClientErrorKind};
use trust_dns_proto::{
    error::ProtoError,
    op::Message,
    rr::{Name, RecordType},
};
use trust_dns_resolver::error::ResolveError;

use crate::nsec::ResponseDump;

/// Failure of a single request/response exchange with the resolver.
#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("timed out waiting for a response")]
    Timeout,

    #[error("no response received")]
    NoResponse,

    #[error("{0}")]
    Client(ClientError),
}

impl From<ClientError> for ExchangeError {
    fn from(e: ClientError) -> Self {
        match e.kind() {
            ClientErrorKind::Timeout => Self::Timeout,
            _ => Self::Client(e),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("usage: {0}")]
    Usage(String),

    #[error("invalid name {name:?}: {source}")]
    Name {
        name: String,
        #[source]
        source: ProtoError,
    },

    #[error("cannot resolve nameserver {host}: {source}")]
    Resolve {
        host: String,
        #[source]
        source: ResolveError,
    },

    #[error("cannot load system resolver configuration: {0}")]
    SystemConf(#[source] io::Error),

    #[error("nameserver {0} has no address")]
    NoAddress(String),
}

/// Every condition that ends a walk.
#[derive(Debug, Error)]
pub enum WalkError {
    #[error("query: {name} {rtype}\nerror: {source}")]
    Query {
        name: Name,
        rtype: RecordType,
        #[source]
        source: ExchangeError,
    },

    #[error("No NSEC records found in authority section:\n{}", ResponseDump(.response))]
    MissingNsec { response: Box<Message> },

    #[error("This zone is likely using online signing\n\n{}", ResponseDump(.response))]
    OnlineSigning { response: Box<Message> },

    #[error("NSEC chain revisits {name} without reaching the zone apex")]
    ChainLoop { name: Name },

    #[error("cannot build query name: {0}")]
    Name(#[from] ProtoError),

    #[error("cannot write output: {0}")]
    Output(#[from] io::Error),
}
