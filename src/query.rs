use std::{thread, time::Duration};

use tracing::{trace, warn};
use trust_dns_proto::{
    op::{Edns, Message, MessageType, OpCode, Query},
    rr::{Name, RecordType},
};

use crate::{config::QueryOptions, error::WalkError, exchange::Exchange};

/// Sends queries to the configured resolver, retrying transport failures.
pub struct QueryExecutor<'c, E> {
    exchanger: E,
    options: &'c QueryOptions,
    pause: Box<dyn Fn(Duration) + 'c>,
}

impl<'c, E: Exchange> QueryExecutor<'c, E> {
    pub fn new(exchanger: E, options: &'c QueryOptions) -> Self {
        Self { exchanger, options, pause: Box::new(thread::sleep) }
    }

    /// Replaces the sleep between attempts.
    #[cfg(test)]
    pub fn with_pause(mut self, pause: impl Fn(Duration) + 'c) -> Self {
        self.pause = Box::new(pause);
        self
    }

    /// Queries `(name, rtype)`. Any response that arrives is returned as is,
    /// whatever its response code; only transport errors are retried.
    pub fn query(&self, name: &Name, rtype: RecordType) -> Result<Message, WalkError> {
        let mut attempt = 0;
        loop {
            let request = build_request(name, rtype, self.options.payload_size);
            trace!(%name, %rtype, attempt, id = request.id(), "sending query");

            match self.exchanger.exchange(&request, self.options.target) {
                Ok(response) => return Ok(response),
                Err(source) if attempt >= self.options.retries => {
                    return Err(WalkError::Query { name: name.clone(), rtype, source });
                }
                Err(e) => {
                    warn!(%name, %rtype, attempt, error = %e, "query failed, retrying");
                    (self.pause)(self.options.retry_delay);
                    attempt += 1;
                }
            }
        }
    }
}

fn build_request(name: &Name, rtype: RecordType, payload_size: u16) -> Message {
    let mut edns = Edns::new();
    edns.set_max_payload(payload_size);
    edns.set_dnssec_ok(true);

    let mut message = Message::new();
    message
        .set_id(rand::random())
        .set_message_type(MessageType::Query)
        .set_op_code(OpCode::Query)
        .set_recursion_desired(true)
        .set_authentic_data(true)
        .add_query(Query::query(name.clone(), rtype))
        .set_edns(edns);
    message
}
