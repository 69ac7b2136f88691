//! Business records and their physical / virtual settings.

use serde_json::{Map, Value};

use super::executor::QueryExecutor;
use super::resource::{default_to_caller, Listing, Resource, ResourceService};
use crate::error::AppError;
use crate::model::{Business, PhysicalBusinessSettings, User, VirtualBusinessSettings};
use crate::schemas::business::{BusinessWrite, PhysicalSettingsWrite, VirtualSettingsWrite};
use crate::schemas::ListParams;

impl Resource for Business {
    type Write = BusinessWrite;
    const SEARCH_FIELD: Option<&'static str> = Some("name");

    fn stamp(payload: &mut Map<String, Value>, caller: &User, creating: bool) {
        default_to_caller(payload, "owner_id", caller, creating);
    }
}

impl Resource for PhysicalBusinessSettings {
    type Write = PhysicalSettingsWrite;
    const SEARCH_FIELD: Option<&'static str> = Some("location");
}

impl Resource for VirtualBusinessSettings {
    type Write = VirtualSettingsWrite;
    const SEARCH_FIELD: Option<&'static str> = None;
}

pub struct BusinessService;

impl BusinessService {
    /// The caller's own businesses; list filters and pagination still apply.
    pub async fn yours<X>(exec: &mut X, params: ListParams, caller: &User) -> Result<Listing<Business>, AppError>
    where
        X: QueryExecutor + ?Sized,
    {
        let scope = vec![("owner_id".to_string(), Value::String(caller.id.to_string()))];
        ResourceService::list::<Business, X>(exec, params, scope).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schemas::business::BusinessType;
    use crate::service::executor::testing::RecordingExecutor;
    use crate::service::resource::fixtures;
    use serde_json::json;
    use uuid::Uuid;

    fn write(id: Option<Uuid>) -> BusinessWrite {
        BusinessWrite {
            id,
            name: "Bakery".into(),
            description: None,
            business_type: BusinessType::Physical,
            owner_id: None,
            initial_investment: 1000.0,
            operational_costs: 0.0,
            expected_revenue: 300.0,
            break_even_months: None,
        }
    }

    #[test]
    fn owner_defaults_to_caller_only_on_create() {
        let caller = fixtures::user(false);
        let mut created = Map::new();
        Business::stamp(&mut created, &caller, true);
        assert_eq!(created["owner_id"], json!(caller.id.to_string()));

        let mut updated = Map::new();
        Business::stamp(&mut updated, &caller, false);
        assert!(updated.get("owner_id").is_none());
    }

    #[tokio::test]
    async fn create_binds_the_caller_as_owner() {
        let caller = fixtures::user(false);
        let mut exec = RecordingExecutor::default();
        let _ = ResourceService::upsert_batch::<Business, _>(&mut exec, vec![write(None)], &caller).await;
        let insert = &exec.statements[0];
        assert!(insert.sql.contains("\"owner_id\""), "{}", insert.sql);
    }

    #[tokio::test]
    async fn yours_scopes_to_the_caller() {
        let caller = fixtures::user(false);
        let mut exec = RecordingExecutor::default();
        BusinessService::yours(&mut exec, ListParams::default(), &caller).await.unwrap();
        assert!(exec.statements[0].sql.contains("WHERE \"owner_id\" = $1::uuid"));
        assert!(exec.statements[1].sql.starts_with("SELECT COUNT(*)"));
    }
}
