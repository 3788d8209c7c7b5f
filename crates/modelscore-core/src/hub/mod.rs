//! Hugging Face Hub access.
//!
//! The [`ModelHub`] trait is the seam the record processor and owner
//! classifier depend on; [`HubClient`] implements it over the REST API.

mod client;
mod types;

pub use client::HubClient;
pub use types::{HubSibling, ModelRecord, OrgAssets, OrgRecord, OwnerOverview, UserRecord};

use crate::Result;
use async_trait::async_trait;

/// Read access to model hub resources.
#[async_trait]
pub trait ModelHub: Send + Sync {
    /// Fetch model metadata, including the security scan summary.
    async fn fetch_model(&self, hub_id: &str) -> Result<ModelRecord>;

    /// Look up an owner's overview, trying the user endpoint first and then
    /// the organization endpoint.
    async fn resolve_owner(&self, name: &str) -> Result<OwnerOverview>;

    /// Count an organization's members, models, datasets and spaces.
    ///
    /// Never fails; a failed sub-request leaves its count unset.
    async fn fetch_org_assets(&self, org_name: &str) -> OrgAssets;
}
