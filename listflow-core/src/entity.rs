//! The uniform shape of a remote directory entry, independent of which
//! listing strategy inspects it.

/// A single entry visible on the remote endpoint at listing time.
///
/// `identifier` is the identity of the entity: unique across everything
/// under a listing root and stable across polls. Two listings returning the
/// same identifier with a different `(timestamp, size)` describe a
/// modification of the same logical entity, never a new one. `name` is the
/// remote display name and carries no uniqueness guarantee.
///
/// `timestamp` is the remote-reported last-modified time in epoch
/// milliseconds. It is authoritative for the listing call that produced it
/// but may regress between calls (clock skew, rewrites).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListableEntity {
    pub name: String,
    pub identifier: String,
    pub timestamp: i64,
    pub size: u64,
    /// Remote ownership/permission metadata, passed through untouched.
    pub attributes: Option<EntityAttributes>,
}

/// Owner/group/permission strings as the remote reports them. The trackers
/// never look at these; they ride along into the emitted record.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EntityAttributes {
    pub owner: Option<String>,
    pub group: Option<String>,
    pub permissions: Option<String>,
}

impl ListableEntity {
    pub fn new(
        name: impl Into<String>,
        identifier: impl Into<String>,
        timestamp: i64,
        size: u64,
    ) -> Self {
        Self {
            name: name.into(),
            identifier: identifier.into(),
            timestamp,
            size,
            attributes: None,
        }
    }
}

/// Orders a batch by `(timestamp, identifier)` ascending.
///
/// Every emission path sorts with this so that a crash mid-emission leaves
/// the durably-sent subset as a prefix of the deterministic order.
pub fn sort_for_emission(entities: &mut [ListableEntity]) {
    entities.sort_by(|a, b| {
        a.timestamp
            .cmp(&b.timestamp)
            .then_with(|| a.identifier.cmp(&b.identifier))
    });
}
