use std::fmt;

use trust_dns_proto::{
    op::Message,
    rr::{Name, RecordType},
};

use crate::{advance::SENTINEL, error::WalkError};

/// One link of the chain, taken from a denial response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NsecRecord {
    pub owner: Name,
    pub next_owner: Name,
    /// Types present at `owner`, in wire order.
    pub types: Vec<RecordType>,
}

/// Renders the bare walk line: the next owner name followed by the type
/// mnemonics of the bitmap.
impl fmt::Display for NsecRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.next_owner)?;
        for rtype in &self.types {
            write!(f, " {rtype}")?;
        }
        Ok(())
    }
}

/// Extracts the chain link from the response to a query for `qname`.
pub fn interpret(response: &Message, qname: &Name) -> Result<NsecRecord, WalkError> {
    let record = response
        .name_servers()
        .iter()
        .filter(|r| r.record_type() == RecordType::NSEC)
        .find_map(|r| {
            let nsec = r.data()?.as_dnssec()?.as_nsec()?;
            Some(NsecRecord {
                owner: r.name().clone(),
                next_owner: nsec.next_domain_name().clone(),
                types: nsec.type_bit_maps().to_vec(),
            })
        })
        .ok_or_else(|| WalkError::MissingNsec { response: Box::new(response.clone()) })?;

    // likely using NSEC black lies
    // https://blog.cloudflare.com/black-lies/
    if is_online_signed(&record.next_owner, qname) {
        return Err(WalkError::OnlineSigning { response: Box::new(response.clone()) });
    }

    Ok(record)
}

/// Whether `next_owner` was synthesized for this one query rather than
/// taken from a precomputed chain.
pub fn is_online_signed(next_owner: &Name, qname: &Name) -> bool {
    starts_with_sentinel_pair(next_owner) || is_minimal_cover(next_owner, qname)
}

/// `\000.\000.<anything>`
fn starts_with_sentinel_pair(name: &Name) -> bool {
    let mut labels = name.iter();
    matches!(
        (labels.next(), labels.next()),
        (Some(first), Some(second)) if first == SENTINEL && second == SENTINEL
    )
}

/// `\000.<qname>`, the immediate successor of the question itself.
fn is_minimal_cover(next_owner: &Name, qname: &Name) -> bool {
    next_owner.iter().next() == Some(SENTINEL) && next_owner.base_name() == *qname
}

/// Formats a whole response for diagnostics.
pub struct ResponseDump<'a>(pub &'a Message);

impl fmt::Display for ResponseDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = self.0;
        writeln!(
            f,
            ";; id: {} opcode: {:?} status: {} aa: {} tc: {} rd: {} ra: {} ad: {} cd: {}",
            message.id(),
            message.op_code(),
            message.response_code(),
            message.authoritative(),
            message.truncated(),
            message.recursion_desired(),
            message.recursion_available(),
            message.authentic_data(),
            message.checking_disabled(),
        )?;

        writeln!(f, ";; QUESTION SECTION:")?;
        for query in message.queries() {
            writeln!(f, ";{} {} {}", query.name(), query.query_class(), query.query_type())?;
        }

        let sections = [
            ("ANSWER", message.answers()),
            ("AUTHORITY", message.name_servers()),
            ("ADDITIONAL", message.additionals()),
        ];
        for (title, records) in sections {
            writeln!(f, "\n;; {title} SECTION:")?;
            for record in records {
                writeln!(f, "{record}")?;
            }
        }
        Ok(())
    }
}
