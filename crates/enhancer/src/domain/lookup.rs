//! Selection of records by id or unique id prefix

use crate::domain::entities::{HistoryEntry, PromptTemplate};

pub trait Identified {
    fn id(&self) -> &str;
}

impl Identified for HistoryEntry {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Identified for PromptTemplate {
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum Lookup<'a, T> {
    Found(&'a T),
    NotFound,
    /// Prefix matched this many records
    Ambiguous(usize),
}

/// Find the record whose id equals `needle`, or the only one it prefixes
pub fn find_by_prefix<'a, T: Identified>(items: &'a [T], needle: &str) -> Lookup<'a, T> {
    let needle = needle.trim();
    if needle.is_empty() {
        return Lookup::NotFound;
    }

    if let Some(exact) = items.iter().find(|item| item.id() == needle) {
        return Lookup::Found(exact);
    }

    let mut matches = items.iter().filter(|item| item.id().starts_with(needle));
    match (matches.next(), matches.count()) {
        (None, _) => Lookup::NotFound,
        (Some(only), 0) => Lookup::Found(only),
        (Some(_), rest) => Lookup::Ambiguous(rest + 1),
    }
}
