//! # Entity Identity
//!
//! Every entity in an edit session carries up to two identifiers:
//!
//! - a **server id**, assigned once the entity has been persisted
//! - a **local id**, materialized client-side and used as a stable key for
//!   list rendering and diffing
//!
//! Local ids never leave the client. When an entity is sent to the server it
//! either carries its server id (update in place) or nothing (create).

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{EntityPath, PreconditionViolation};

/// Server-assigned, durable identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServerId(String);

impl ServerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ServerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ServerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Transient client-side identifier, unique within one edit session
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalId(String);

impl LocalId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LocalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LocalId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Produces local ids for a single edit session.
///
/// Ids have the form `<session>-<counter>`. The counter only moves forward,
/// so an id handed out once is never handed out again by the same generator.
#[derive(Debug, Clone)]
pub struct LocalIdGenerator {
    session: String,
    next: u64,
}

impl LocalIdGenerator {
    pub fn new(session: impl Into<String>) -> Self {
        Self {
            session: session.into(),
            next: 0,
        }
    }

    /// Materialize a fresh local id
    pub fn materialize(&mut self) -> LocalId {
        let id = LocalId(format!("{}-{}", self.session, self.next));
        self.next += 1;
        id
    }

    /// Number of ids handed out so far
    pub fn issued(&self) -> u64 {
        self.next
    }

    pub fn session(&self) -> &str {
        &self.session
    }

    /// Whether `id` was handed out by this generator
    pub fn has_issued(&self, id: &LocalId) -> bool {
        id.0.strip_prefix(self.session.as_str())
            .and_then(|rest| rest.strip_prefix('-'))
            .and_then(|n| n.parse::<u64>().ok())
            .is_some_and(|n| n < self.next)
    }
}

/// Server id and/or local id of one entity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<ServerId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local: Option<LocalId>,
}

impl Identity {
    /// Identity of an entity loaded from the server
    pub fn persisted(server: ServerId, local: LocalId) -> Self {
        Self {
            server: Some(server),
            local: Some(local),
        }
    }

    /// Identity of an entity created during this session
    pub fn fresh(local: LocalId) -> Self {
        Self {
            server: None,
            local: Some(local),
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.server.is_some()
    }

    /// Whether this identity answers to the given local id
    pub fn matches(&self, local: &LocalId) -> bool {
        self.local.as_ref() == Some(local)
    }

    /// The id to send to the server: `Some` for update-in-place, `None` for
    /// create. An identity with neither id cannot be sent.
    pub fn for_transport(
        &self,
        entity: EntityPath,
    ) -> Result<Option<ServerId>, PreconditionViolation> {
        match (&self.server, &self.local) {
            (Some(server), _) => Ok(Some(server.clone())),
            (None, Some(_)) => Ok(None),
            (None, None) => Err(PreconditionViolation::MissingIdentity { entity }),
        }
    }

    /// Fill in a local id if none has been materialized yet
    pub fn ensure_local(&mut self, ids: &mut LocalIdGenerator) -> &LocalId {
        self.local.get_or_insert_with(|| ids.materialize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generated_ids_never_collide() {
        let mut ids = LocalIdGenerator::new("session");
        let generated: HashSet<LocalId> = (0..10_000).map(|_| ids.materialize()).collect();

        assert_eq!(generated.len(), 10_000);
        assert_eq!(ids.issued(), 10_000);
    }

    #[test]
    fn test_ids_carry_session_prefix() {
        let mut ids = LocalIdGenerator::new("edit-7");
        assert_eq!(ids.materialize().as_str(), "edit-7-0");
        assert_eq!(ids.materialize().as_str(), "edit-7-1");
    }

    #[test]
    fn test_has_issued() {
        let mut ids = LocalIdGenerator::new("s");
        let first = ids.materialize();

        assert!(ids.has_issued(&first));
        assert!(!ids.has_issued(&LocalId::from("s-1")));
        assert!(!ids.has_issued(&LocalId::from("other-0")));
        assert!(!ids.has_issued(&LocalId::from("s-x")));
        assert!(!ids.has_issued(&LocalId::from("s0")));
    }

    #[test]
    fn test_transport_identity() {
        let mut ids = LocalIdGenerator::new("s");

        let persisted = Identity::persisted(ServerId::from("r-1"), ids.materialize());
        assert_eq!(
            persisted.for_transport(EntityPath::Recipe).unwrap(),
            Some(ServerId::from("r-1"))
        );

        let fresh = Identity::fresh(ids.materialize());
        assert_eq!(fresh.for_transport(EntityPath::Recipe).unwrap(), None);

        let orphan = Identity::default();
        let path = EntityPath::Ingredient { group: 0, index: 2 };
        assert_eq!(
            orphan.for_transport(path.clone()),
            Err(PreconditionViolation::MissingIdentity { entity: path })
        );
    }

    #[test]
    fn test_ensure_local_is_stable() {
        let mut ids = LocalIdGenerator::new("s");
        let mut identity = Identity::default();

        let first = identity.ensure_local(&mut ids).clone();
        let second = identity.ensure_local(&mut ids).clone();

        assert_eq!(first, second);
        assert_eq!(ids.issued(), 1);
    }
}
