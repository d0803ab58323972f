//! The resolver client: sends one DNS message and waits for its answer.

use std::{net::SocketAddr, time::Duration};

use tracing::debug;
use trust_dns_client::{
    client::{Client, SyncClient},
    error::ClientResult,
    tcp::TcpClientConnection,
    udp::UdpClientConnection,
};
use trust_dns_proto::{op::Message, xfer::DnsResponse};

use crate::error::ExchangeError;

pub trait Exchange {
    fn exchange(&self, request: &Message, target: SocketAddr) -> Result<Message, ExchangeError>;
}

impl<E: Exchange + ?Sized> Exchange for &E {
    fn exchange(&self, request: &Message, target: SocketAddr) -> Result<Message, ExchangeError> {
        (**self).exchange(request, target)
    }
}

/// Exchanges messages over the network: UDP first, TCP when the UDP answer
/// comes back truncated.
#[derive(Debug, Clone)]
pub struct NetExchanger {
    timeout: Duration,
}

impl NetExchanger {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Exchange for NetExchanger {
    fn exchange(&self, request: &Message, target: SocketAddr) -> Result<Message, ExchangeError> {
        let udp = SyncClient::new(UdpClientConnection::with_timeout(target, self.timeout)?);
        let response = first_response(udp.send(request.clone()))?;
        if !response.truncated() {
            return Ok(response);
        }

        debug!(%target, "response truncated, retrying over tcp");
        let tcp = SyncClient::new(TcpClientConnection::with_timeout(target, self.timeout)?);
        first_response(tcp.send(request.clone()))
    }
}

fn first_response(responses: Vec<ClientResult<DnsResponse>>) -> Result<Message, ExchangeError> {
    let response = responses
        .into_iter()
        .next()
        .ok_or(ExchangeError::NoResponse)??;
    Ok(Message::clone(&response))
}
