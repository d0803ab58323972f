//! Scripted resolver and response builders shared by the unit tests.

use std::{cell::RefCell, collections::VecDeque, net::SocketAddr};

use trust_dns_proto::{
    op::{Message, MessageType, ResponseCode},
    rr::{
        dnssec::rdata::{DNSSECRData, NSEC},
        Name, RData, Record, RecordType,
    },
};

use crate::{error::ExchangeError, exchange::Exchange};

/// Replays canned outcomes in order and remembers every question asked.
/// Once the script runs dry every exchange times out.
#[derive(Default)]
pub struct Script {
    outcomes: RefCell<VecDeque<Result<Message, ExchangeError>>>,
    queries: RefCell<Vec<(Name, RecordType)>>,
}

impl Script {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, response: Message) -> Self {
        self.outcomes.borrow_mut().push_back(Ok(response));
        self
    }

    pub fn fail(self, error: ExchangeError) -> Self {
        self.outcomes.borrow_mut().push_back(Err(error));
        self
    }

    pub fn queries(&self) -> Vec<(Name, RecordType)> {
        self.queries.borrow().clone()
    }
}

impl Exchange for Script {
    fn exchange(&self, request: &Message, _target: SocketAddr) -> Result<Message, ExchangeError> {
        let query = &request.queries()[0];
        self.queries
            .borrow_mut()
            .push((query.name().clone(), query.query_type()));
        self.outcomes
            .borrow_mut()
            .pop_front()
            .unwrap_or(Err(ExchangeError::Timeout))
    }
}

pub fn name(s: &str) -> Name {
    Name::from_ascii(s).unwrap()
}

pub fn nsec(owner: &str, next: &str, types: &[RecordType]) -> Record {
    Record::from_rdata(
        name(owner),
        3600,
        RData::DNSSEC(DNSSECRData::NSEC(NSEC::new(name(next), types.to_vec()))),
    )
}

pub fn response() -> Message {
    let mut message = Message::new();
    message
        .set_message_type(MessageType::Response)
        .set_response_code(ResponseCode::NoError);
    message
}

/// A denial response carrying one NSEC record in its authority section.
pub fn denial(owner: &str, next: &str, types: &[RecordType]) -> Message {
    let mut message = response();
    message.add_name_server(nsec(owner, next, types));
    message
}
