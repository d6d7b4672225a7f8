//! The record handed downstream for each discovered entity.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::config::EndpointConfig;
use crate::entity::ListableEntity;

/// Everything a downstream fetcher needs to act on one discovered entity:
/// where it lives (host/port/user), what it is called, and the listing
/// metadata at discovery time. Owner/group/permissions ride through from
/// the remote listing untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub host: String,
    pub port: u16,
    pub user: Option<String>,
    pub name: String,
    /// Directory part of the identifier, `/` for root-level entities.
    pub path: String,
    pub identifier: String,
    pub timestamp_millis: i64,
    /// Last-modified time as an ISO-8601 string, e.g. `2024-05-01T12:00:00Z`.
    pub last_modified: String,
    pub size: u64,
    pub owner: Option<String>,
    pub group: Option<String>,
    pub permissions: Option<String>,
}

impl FileRecord {
    pub fn new(endpoint: &EndpointConfig, entity: &ListableEntity) -> Self {
        let path = match entity.identifier.rsplit_once('/') {
            Some((dir, _)) if !dir.is_empty() => dir.to_string(),
            _ => "/".to_string(),
        };
        let last_modified = DateTime::<Utc>::from_timestamp_millis(entity.timestamp)
            .unwrap_or_default()
            .to_rfc3339_opts(SecondsFormat::Secs, true);
        let attributes = entity.attributes.clone().unwrap_or_default();

        Self {
            host: endpoint.host.clone(),
            port: endpoint.port,
            user: endpoint.user.clone(),
            name: entity.name.clone(),
            path,
            identifier: entity.identifier.clone(),
            timestamp_millis: entity.timestamp,
            last_modified,
            size: entity.size,
            owner: attributes.owner,
            group: attributes.group,
            permissions: attributes.permissions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityAttributes;

    fn endpoint() -> EndpointConfig {
        EndpointConfig {
            host: "ftp.example.com".to_string(),
            port: 21,
            user: Some("ingest".to_string()),
        }
    }

    #[test]
    fn test_record_carries_endpoint_and_listing_metadata() {
        let mut entity = ListableEntity::new("report.csv", "daily/report.csv", 1_700_000_000_000, 42);
        entity.attributes = Some(EntityAttributes {
            owner: Some("1001".to_string()),
            group: Some("100".to_string()),
            permissions: Some("rw-r--r--".to_string()),
        });

        let record = FileRecord::new(&endpoint(), &entity);

        assert_eq!(record.host, "ftp.example.com");
        assert_eq!(record.port, 21);
        assert_eq!(record.user.as_deref(), Some("ingest"));
        assert_eq!(record.name, "report.csv");
        assert_eq!(record.path, "daily");
        assert_eq!(record.identifier, "daily/report.csv");
        assert_eq!(record.size, 42);
        assert_eq!(record.last_modified, "2023-11-14T22:13:20Z");
        assert_eq!(record.owner.as_deref(), Some("1001"));
        assert_eq!(record.permissions.as_deref(), Some("rw-r--r--"));
    }

    #[test]
    fn test_root_level_identifier_maps_to_root_path() {
        let entity = ListableEntity::new("a.bin", "a.bin", 0, 0);
        let record = FileRecord::new(&endpoint(), &entity);
        assert_eq!(record.path, "/");
        assert_eq!(record.last_modified, "1970-01-01T00:00:00Z");
    }
}
