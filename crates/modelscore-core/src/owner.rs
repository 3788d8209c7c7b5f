//! Owner classification: individual user or organization.

use crate::hub::{ModelHub, UserRecord};
use crate::{Result, ScoreError};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;
use tracing::debug;

/// Kind of account that owns a model namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OwnerKind {
    User,
    Organization,
}

impl fmt::Display for OwnerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OwnerKind::User => write!(f, "user"),
            OwnerKind::Organization => write!(f, "organization"),
        }
    }
}

/// Classification result, carrying the overview fetched while deciding.
#[derive(Debug, Clone)]
pub enum ClassifiedOwner {
    User(UserRecord),
    Organization {
        name: String,
        overview: Map<String, Value>,
    },
}

impl ClassifiedOwner {
    pub fn kind(&self) -> OwnerKind {
        match self {
            ClassifiedOwner::User(_) => OwnerKind::User,
            ClassifiedOwner::Organization { .. } => OwnerKind::Organization,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ClassifiedOwner::User(record) => &record.username,
            ClassifiedOwner::Organization { name, .. } => name,
        }
    }
}

/// Classify `owner` with a single owner lookup.
///
/// The response's `type` field decides; the endpoint that answered is used
/// only when the field is missing. Any other discriminator is an error.
pub async fn classify(hub: &dyn ModelHub, owner: &str) -> Result<ClassifiedOwner> {
    let overview = hub.resolve_owner(owner).await?;

    let kind = match overview.type_tag() {
        Some(tag) if tag.eq_ignore_ascii_case("user") => OwnerKind::User,
        Some(tag) if tag.eq_ignore_ascii_case("org") || tag.eq_ignore_ascii_case("organization") => {
            OwnerKind::Organization
        }
        Some(other) => {
            return Err(ScoreError::Other(format!(
                "Unrecognised owner type '{}' for {}",
                other, owner
            )))
        }
        None => overview.endpoint,
    };
    debug!("Classified {} as {}", owner, kind);

    Ok(match kind {
        OwnerKind::User => ClassifiedOwner::User(UserRecord {
            username: overview.name,
            overview: overview.fields,
        }),
        OwnerKind::Organization => ClassifiedOwner::Organization {
            name: overview.name,
            overview: overview.fields,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hub::{ModelRecord, OrgAssets, OwnerOverview};
    use async_trait::async_trait;
    use serde_json::json;

    struct StaticHub {
        endpoint: OwnerKind,
        fields: Value,
    }

    #[async_trait]
    impl ModelHub for StaticHub {
        async fn fetch_model(&self, hub_id: &str) -> Result<ModelRecord> {
            Err(ScoreError::NotFound {
                service: "huggingface".into(),
                resource: hub_id.into(),
            })
        }

        async fn resolve_owner(&self, name: &str) -> Result<OwnerOverview> {
            Ok(OwnerOverview {
                name: name.to_string(),
                endpoint: self.endpoint,
                fields: self.fields.as_object().cloned().unwrap_or_default(),
            })
        }

        async fn fetch_org_assets(&self, _org_name: &str) -> OrgAssets {
            OrgAssets::default()
        }
    }

    #[tokio::test]
    async fn test_classify_user() {
        let hub = StaticHub {
            endpoint: OwnerKind::User,
            fields: json!({"type": "user", "fullname": "Alice"}),
        };
        let owner = classify(&hub, "alice").await.unwrap();
        assert_eq!(owner.kind(), OwnerKind::User);
        assert_eq!(owner.name(), "alice");
        match owner {
            ClassifiedOwner::User(record) => assert_eq!(record.overview["fullname"], json!("Alice")),
            other => panic!("expected user, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_classify_org_by_type_tag() {
        let hub = StaticHub {
            endpoint: OwnerKind::User,
            fields: json!({"type": "org"}),
        };
        let owner = classify(&hub, "acme").await.unwrap();
        assert_eq!(owner.kind(), OwnerKind::Organization);
    }

    #[tokio::test]
    async fn test_classify_falls_back_to_endpoint() {
        let hub = StaticHub {
            endpoint: OwnerKind::Organization,
            fields: json!({"name": "acme"}),
        };
        let owner = classify(&hub, "acme").await.unwrap();
        assert_eq!(owner.kind(), OwnerKind::Organization);
    }

    #[tokio::test]
    async fn test_classify_rejects_unknown_type() {
        let hub = StaticHub {
            endpoint: OwnerKind::User,
            fields: json!({"type": "bot"}),
        };
        let err = classify(&hub, "robo").await.unwrap_err();
        assert!(err.to_string().contains("bot"));
    }

    #[tokio::test]
    async fn test_classify_propagates_not_found() {
        struct MissingHub;

        #[async_trait]
        impl ModelHub for MissingHub {
            async fn fetch_model(&self, _hub_id: &str) -> Result<ModelRecord> {
                Ok(ModelRecord::default())
            }
            async fn resolve_owner(&self, name: &str) -> Result<OwnerOverview> {
                Err(ScoreError::NotFound {
                    service: "huggingface".into(),
                    resource: format!("owner {}", name),
                })
            }
            async fn fetch_org_assets(&self, _org_name: &str) -> OrgAssets {
                OrgAssets::default()
            }
        }

        let err = classify(&MissingHub, "ghost").await.unwrap_err();
        assert!(matches!(err, ScoreError::NotFound { .. }));
    }
}
