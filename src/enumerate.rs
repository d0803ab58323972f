use std::io::Write;

use tracing::debug;
use trust_dns_proto::{
    op::ResponseCode,
    rr::{Name, RecordType},
};

use crate::{error::WalkError, exchange::Exchange, query::QueryExecutor};

/// Resolves every type an owner name advertises and prints the records.
pub struct TypeEnumerator<'q, 'c, E> {
    executor: &'q QueryExecutor<'c, E>,
}

impl<'q, 'c, E: Exchange> TypeEnumerator<'q, 'c, E> {
    pub fn new(executor: &'q QueryExecutor<'c, E>) -> Self {
        Self { executor }
    }

    pub fn enumerate_types<W: Write>(
        &self,
        owner: &Name,
        types: &[RecordType],
        out: &mut W,
    ) -> Result<(), WalkError> {
        for &rtype in types {
            let response = self.executor.query(owner, rtype)?;
            debug!(%owner, %rtype, answers = response.answers().len(), "resolved type");

            for record in response.answers() {
                writeln!(out, "{record}")?;
            }

            // delegation: the NS set and its glue come back as a referral
            if rtype == RecordType::NS
                && response.answers().is_empty()
                && response.response_code() == ResponseCode::NoError
            {
                for record in response.name_servers() {
                    writeln!(out, "{record}")?;
                }
                for record in response
                    .additionals()
                    .iter()
                    .filter(|r| r.record_type() != RecordType::OPT)
                {
                    writeln!(out, "{record}")?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::{net::Ipv4Addr, time::Duration};

    use pretty_assertions::assert_eq;
    use trust_dns_proto::rr::{RData, Record};

    use super::*;
    use crate::{
        config::QueryOptions,
        error::ExchangeError,
        testing::{name, response, Script},
    };

    fn options() -> QueryOptions {
        let mut options = QueryOptions::new("127.0.0.1:53".parse().unwrap());
        options.retry_delay = Duration::ZERO;
        options
    }

    fn a(owner: &str, ip: [u8; 4]) -> Record {
        Record::from_rdata(name(owner), 300, RData::A(Ipv4Addr::from(ip)))
    }

    fn ns(owner: &str, target: &str) -> Record {
        Record::from_rdata(name(owner), 300, RData::NS(name(target)))
    }

    fn lines(out: Vec<u8>) -> Vec<String> {
        String::from_utf8(out).unwrap().lines().map(str::to_owned).collect()
    }

    #[test]
    fn prints_answers_per_type_in_bitmap_order() {
        let mut a_answer = response();
        a_answer.add_answer(a("www.example.", [192, 0, 2, 1]));
        a_answer.add_answer(a("www.example.", [192, 0, 2, 2]));
        let empty = response();

        let script = Script::new().respond(a_answer).respond(empty);
        let options = options();
        let executor = QueryExecutor::new(&script, &options);
        let mut out = Vec::new();

        TypeEnumerator::new(&executor)
            .enumerate_types(&name("www.example."), &[RecordType::A, RecordType::TXT], &mut out)
            .unwrap();

        assert_eq!(
            lines(out),
            vec![
                a("www.example.", [192, 0, 2, 1]).to_string(),
                a("www.example.", [192, 0, 2, 2]).to_string(),
            ]
        );
        assert_eq!(
            script.queries(),
            vec![
                (name("www.example."), RecordType::A),
                (name("www.example."), RecordType::TXT),
            ]
        );
    }

    #[test]
    fn recovers_glue_at_delegation() {
        let mut referral = response();
        referral.add_name_server(ns("sub.example.", "ns1.sub.example."));
        referral.add_additional(a("ns1.sub.example.", [192, 0, 2, 53]));
        referral.add_additional(Record::with(Name::root(), RecordType::OPT, 0));

        let script = Script::new().respond(referral);
        let options = options();
        let executor = QueryExecutor::new(&script, &options);
        let mut out = Vec::new();

        TypeEnumerator::new(&executor)
            .enumerate_types(&name("sub.example."), &[RecordType::NS], &mut out)
            .unwrap();

        assert_eq!(
            lines(out),
            vec![
                ns("sub.example.", "ns1.sub.example.").to_string(),
                a("ns1.sub.example.", [192, 0, 2, 53]).to_string(),
            ]
        );
    }

    #[test]
    fn failed_referral_prints_nothing_extra() {
        let mut servfail = response();
        servfail.set_response_code(ResponseCode::ServFail);
        servfail.add_name_server(ns("sub.example.", "ns1.sub.example."));

        let script = Script::new().respond(servfail);
        let options = options();
        let executor = QueryExecutor::new(&script, &options);
        let mut out = Vec::new();

        TypeEnumerator::new(&executor)
            .enumerate_types(&name("sub.example."), &[RecordType::NS], &mut out)
            .unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn authority_is_ignored_for_other_types() {
        let mut denial = response();
        denial.add_name_server(ns("example.", "ns.example."));

        let script = Script::new().respond(denial);
        let options = options();
        let executor = QueryExecutor::new(&script, &options);
        let mut out = Vec::new();

        TypeEnumerator::new(&executor)
            .enumerate_types(&name("example."), &[RecordType::MX], &mut out)
            .unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn exhausted_sub_query_is_fatal() {
        let script = Script::new()
            .respond(response())
            .fail(ExchangeError::Timeout)
            .fail(ExchangeError::Timeout)
            .fail(ExchangeError::Timeout)
            .fail(ExchangeError::Timeout)
            .respond(response());
        let options = options();
        let executor = QueryExecutor::new(&script, &options);
        let mut out = Vec::new();

        let err = TypeEnumerator::new(&executor)
            .enumerate_types(
                &name("www.example."),
                &[RecordType::A, RecordType::AAAA, RecordType::TXT],
                &mut out,
            )
            .unwrap_err();

        assert!(matches!(err, WalkError::Query { rtype: RecordType::AAAA, .. }));
        // the TXT query is never sent
        assert_eq!(script.queries().len(), 5);
    }
}
