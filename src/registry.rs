//! Insertion-ordered, id-keyed collections backing the workflow registries.
use crate::entities::{Account, Application, Client, SipPlan};
use std::collections::HashMap;

/// Anything stored in a [`Registry`], addressable by its natural id.
pub trait Keyed {
    fn key(&self) -> &str;
}

impl Keyed for Client {
    fn key(&self) -> &str {
        &self.client_id
    }
}

impl Keyed for Account {
    fn key(&self) -> &str {
        &self.account_id
    }
}

impl Keyed for Application {
    fn key(&self) -> &str {
        &self.application_id
    }
}

impl Keyed for SipPlan {
    fn key(&self) -> &str {
        &self.sip_id
    }
}

/// Id-keyed collection that enumerates in insertion order.
///
/// Records are never removed; rejection is a status transition upstream, not
/// a deletion. Re-inserting an existing id replaces the record in place and
/// keeps its original position.
#[derive(Debug, Clone)]
pub struct Registry<T> {
    order: Vec<String>,
    items: HashMap<String, T>,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self {
            order: Vec::new(),
            items: HashMap::new(),
        }
    }
}

impl<T: Keyed> Registry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, item: T) {
        let key = item.key().to_owned();
        if !self.items.contains_key(&key) {
            self.order.push(key.clone());
        }
        self.items.insert(key, item);
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.items.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut T> {
        self.items.get_mut(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.items.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Walks records in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.order.iter().filter_map(|id| self.items.get(id))
    }
}

impl<C, T: minicbor::Encode<C> + Keyed> minicbor::Encode<C> for Registry<T> {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        ctx: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        e.array(self.order.len() as u64)?;
        for item in self.iter() {
            item.encode(e, ctx)?;
        }
        Ok(())
    }
}

impl<'b, C, T: minicbor::Decode<'b, C> + Keyed> minicbor::Decode<'b, C> for Registry<T> {
    fn decode(d: &mut minicbor::Decoder<'b>, ctx: &mut C) -> Result<Self, minicbor::decode::Error> {
        let Some(len) = d.array()? else {
            return Err(minicbor::decode::Error::message(
                "expected definite-length registry array",
            ));
        };

        let mut registry = Registry::default();
        for _ in 0..len {
            registry.insert(T::decode(d, ctx)?);
        }
        Ok(registry)
    }
}
