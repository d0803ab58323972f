//! Computing the next name to ask about.
//!
//! In canonical DNS order a label with a zero octet appended sorts right
//! after the label itself and before every longer label sharing its prefix,
//! so `owner` with `\000` appended to its leftmost label is the smallest
//! name past `owner` that is not below it.

use std::iter;

use trust_dns_proto::{
    error::ProtoResult,
    rr::{domain::Label, Name},
};

pub const SENTINEL: &[u8] = b"\0";

fn sentinel() -> ProtoResult<Label> {
    Label::from_raw_bytes(SENTINEL)
}

/// Returns the name to query after `owner`.
///
/// With `first` set, `owner` is the zone apex and the result is the
/// smallest name below it, so the first answer covers the start of the zone.
pub fn advance_name(owner: &Name, first: bool) -> ProtoResult<Name> {
    if owner.is_root() {
        return Name::from_labels(iter::once(sentinel()?));
    }
    if first {
        return below(owner);
    }

    let mut labels = owner
        .iter()
        .map(Label::from_raw_bytes)
        .collect::<ProtoResult<Vec<_>>>()?;
    let mut leftmost = labels[0].as_bytes().to_vec();
    leftmost.extend_from_slice(SENTINEL);

    match Label::from_raw_bytes(&leftmost) {
        Ok(label) => {
            labels[0] = label;
            Name::from_labels(labels)
        }
        // a 63 octet label has no room left; the name just below owner is
        // covered by the same NSEC record
        Err(_) => below(owner),
    }
}

fn below(owner: &Name) -> ProtoResult<Name> {
    let labels = owner
        .iter()
        .map(Label::from_raw_bytes)
        .collect::<ProtoResult<Vec<_>>>()?;
    Name::from_labels(iter::once(sentinel()?).chain(labels))
}
