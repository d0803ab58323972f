use std::{collections::HashSet, io::Write};

use tracing::{debug, info};
use trust_dns_proto::rr::{Name, RecordType};

use crate::{
    advance::advance_name,
    config::WalkConfig,
    enumerate::TypeEnumerator,
    error::WalkError,
    exchange::Exchange,
    nsec::{self, NsecRecord},
    query::QueryExecutor,
};

/// Where the walk currently is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Walking(Name),
    Done,
    Aborted,
}

/// Follows the NSEC chain of a zone, yielding one link per query until the
/// chain wraps back to the apex. The iterator ends after the first error.
pub struct NsecWalker<'q, 'c, E> {
    executor: &'q QueryExecutor<'c, E>,
    apex: Name,
    phase: Phase,
    seen: HashSet<Name>,
}

impl<'q, 'c, E: Exchange> NsecWalker<'q, 'c, E> {
    /// Starts just below `apex`, or just past `start` when one is given.
    pub fn new(
        executor: &'q QueryExecutor<'c, E>,
        apex: Name,
        start: Option<&Name>,
    ) -> Result<Self, WalkError> {
        let first = match start {
            Some(start) => advance_name(start, false)?,
            None => advance_name(&apex, true)?,
        };
        Ok(Self { executor, apex, phase: Phase::Walking(first), seen: HashSet::new() })
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    fn step(&mut self, qname: &Name) -> Result<NsecRecord, WalkError> {
        // DS is never present at the queried names, so the answer is a denial
        let response = self.executor.query(qname, RecordType::DS)?;
        let record = nsec::interpret(&response, qname)?;
        debug!(%qname, owner = %record.owner, next = %record.next_owner, "chain step");

        // Next domain name equal to the apex means end of zone
        if record.next_owner == self.apex {
            self.phase = Phase::Done;
            return Ok(record);
        }
        if !self.seen.insert(record.next_owner.clone()) {
            return Err(WalkError::ChainLoop { name: record.next_owner });
        }
        self.phase = Phase::Walking(advance_name(&record.next_owner, false)?);
        Ok(record)
    }
}

impl<E: Exchange> Iterator for NsecWalker<'_, '_, E> {
    type Item = Result<NsecRecord, WalkError>;

    fn next(&mut self) -> Option<Self::Item> {
        let qname = match &self.phase {
            Phase::Walking(qname) => qname.clone(),
            Phase::Done | Phase::Aborted => return None,
        };
        let step = self.step(&qname);
        if step.is_err() {
            self.phase = Phase::Aborted;
        }
        Some(step)
    }
}

/// Walks the configured zone, writing either one line per link or, in full
/// walk mode, every record at every owner. Returns the number of links.
pub fn run<E: Exchange, W: Write>(
    config: &WalkConfig,
    exchanger: E,
    out: &mut W,
) -> Result<usize, WalkError> {
    let executor = QueryExecutor::new(exchanger, &config.query);
    let enumerator = TypeEnumerator::new(&executor);
    let mut walker = NsecWalker::new(&executor, config.zone.clone(), config.start.as_ref())?;

    let mut steps = 0;
    for record in walker.by_ref() {
        let record = record?;
        if config.full_walk {
            enumerator.enumerate_types(&record.owner, &record.types, out)?;
        } else {
            writeln!(out, "{record}")?;
        }
        out.flush()?;
        steps += 1;
    }
    debug_assert_eq!(walker.phase(), &Phase::Done);

    info!(zone = %config.zone, steps, "walk complete");
    Ok(steps)
}
