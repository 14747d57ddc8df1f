//! Per-table in-memory collections with optimistic add/remove

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use super::summary::recent;
use super::DashboardError;
use crate::session::Session;
use crate::store::{error_message, Draft, Gateway, GatewayError, Record};

/// Decode a query or insert body into typed rows.
///
/// Anything other than a JSON array is a rejection; an array whose elements
/// don't match the row shape is a `Shape` error.
pub fn decode_rows<T: DeserializeOwned>(
    table: &'static str,
    body: Value,
) -> Result<Vec<T>, DashboardError> {
    if !body.is_array() {
        let message = error_message(&body).unwrap_or_else(|| match body {
            Value::Null => "empty response".to_string(),
            Value::Object(_) => "expected rows, got an object".to_string(),
            _ => format!("expected rows, got {}", body),
        });
        return Err(DashboardError::Rejected { table, message });
    }

    serde_json::from_value(body).map_err(|source| DashboardError::Shape { table, source })
}

/// Ordered in-memory copy of one table for the current session
#[derive(Debug, Clone, PartialEq)]
pub struct Collection<T> {
    records: Vec<T>,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
        }
    }
}

impl<T: Record> Collection<T> {
    pub fn new(records: Vec<T>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[T] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.records.iter().find(|r| r.id() == id)
    }

    /// First records in fetched order, at most `RECENT_LIMIT`
    pub fn recent(&self) -> &[T] {
        recent(&self.records)
    }

    /// Validate, insert remotely, then append the returned row.
    ///
    /// The collection is untouched unless the gateway hands back a
    /// well-formed row; there are no placeholder ids.
    pub async fn add<D>(
        &mut self,
        draft: &D,
        session: &Session,
        gateway: &dyn Gateway,
    ) -> Result<&T, DashboardError>
    where
        D: Draft<Row = T>,
    {
        draft.validate().map_err(DashboardError::Validation)?;

        let payload = draft
            .payload(&session.user.id)
            .map_err(|source| DashboardError::Encode {
                table: T::TABLE,
                source,
            })?;

        let body = gateway.insert_row(T::TABLE, session, &payload).await?;
        let row = decode_rows::<T>(T::TABLE, body)?
            .into_iter()
            .next()
            .ok_or(DashboardError::NoRowReturned { table: T::TABLE })?;

        debug!(table = T::TABLE, id = row.id(), "Row added");

        let index = self.records.len();
        self.records.push(row);
        Ok(&self.records[index])
    }

    /// Delete remotely, then drop every local record with that id.
    ///
    /// Local removal happens whatever the response body says, even one that
    /// isn't JSON; only a transport failure leaves the collection as it was.
    pub async fn delete(
        &mut self,
        id: &str,
        session: &Session,
        gateway: &dyn Gateway,
    ) -> Result<usize, DashboardError> {
        let body = match gateway.delete_row(T::TABLE, session, id).await {
            Ok(body) => body,
            Err(GatewayError::Parse(e)) => {
                warn!(
                    table = T::TABLE,
                    id,
                    error = %e,
                    "Remote delete answered with an unreadable body, removing locally anyway"
                );
                Value::Null
            }
            Err(e) => return Err(e.into()),
        };

        if let Some(message) = error_message(&body) {
            warn!(
                table = T::TABLE,
                id,
                %message,
                "Remote delete reported an error, removing locally anyway"
            );
        }

        let before = self.records.len();
        self.records.retain(|r| r.id() != id);
        Ok(before - self.records.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionUser;
    use crate::store::mock::MockGateway;
    use crate::store::{InventoryDraft, InventoryItem, Order, OrderDraft, OrderStatus};
    use serde_json::json;

    fn session() -> Session {
        Session {
            access_token: "token".into(),
            user: SessionUser {
                id: "user-1".into(),
                email: None,
                user_metadata: None,
            },
        }
    }

    fn item(id: &str) -> InventoryItem {
        InventoryItem {
            id: id.into(),
            name: format!("Item {}", id),
            category: "Flowers".into(),
            quantity: 1.0,
            unit: "stems".into(),
            cost_per_unit: 1.0,
            supplier: None,
        }
    }

    fn roses() -> InventoryDraft {
        InventoryDraft {
            name: "Roses".into(),
            quantity: 10.0,
            cost_per_unit: 5.0,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn invalid_draft_issues_no_request() {
        let gateway = MockGateway::new();
        let mut inventory = Collection::new(vec![item("a")]);

        let draft = InventoryDraft {
            name: String::new(),
            quantity: 0.0,
            ..Default::default()
        };
        let result = inventory.add(&draft, &session(), &gateway).await;

        assert!(matches!(result, Err(DashboardError::Validation(_))));
        assert_eq!(inventory.len(), 1);
        assert_eq!(gateway.call_count(), 0);
    }

    #[tokio::test]
    async fn add_appends_returned_row() {
        let gateway = MockGateway::new();
        let mut inventory = Collection::new(vec![item("a")]);

        let added = inventory.add(&roses(), &session(), &gateway).await.unwrap();
        assert_eq!(added.name, "Roses");
        assert!(!added.id.is_empty());

        assert_eq!(inventory.len(), 2);
        assert_eq!(inventory.records()[1].name, "Roses");
        assert_eq!(gateway.calls(), vec!["insert inventory".to_string()]);
    }

    #[tokio::test]
    async fn add_uses_first_row_of_response() {
        let gateway = MockGateway::new();
        gateway.set_insert_response(
            "orders",
            json!([
                { "id": "o-1", "customer_name": "Ana", "order_date": "2024-05-01",
                  "total_price": 100, "status": "pending" },
                { "id": "o-2", "customer_name": "Ignored", "order_date": "2024-05-01",
                  "total_price": 1, "status": "pending" }
            ]),
        );
        let mut orders: Collection<Order> = Collection::default();
        let draft = OrderDraft {
            customer_name: "Ana".into(),
            total_price: 100.0,
            ..Default::default()
        };

        orders.add(&draft, &session(), &gateway).await.unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders.records()[0].id, "o-1");
        assert_eq!(orders.records()[0].status, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn add_rejected_by_remote_leaves_collection_unchanged() {
        let gateway = MockGateway::new();
        gateway.set_insert_response(
            "inventory",
            json!({ "code": "42501", "message": "new row violates row-level security policy" }),
        );
        let mut inventory = Collection::new(vec![item("a")]);

        let err = inventory
            .add(&roses(), &session(), &gateway)
            .await
            .unwrap_err();
        assert!(matches!(err, DashboardError::Rejected { .. }));
        assert_eq!(inventory.len(), 1);
    }

    #[tokio::test]
    async fn add_with_empty_response_is_no_row() {
        let gateway = MockGateway::new();
        gateway.set_insert_response("inventory", json!([]));
        let mut inventory: Collection<InventoryItem> = Collection::default();

        let err = inventory
            .add(&roses(), &session(), &gateway)
            .await
            .unwrap_err();
        assert!(matches!(err, DashboardError::NoRowReturned { table: "inventory" }));
        assert!(inventory.is_empty());
    }

    #[tokio::test]
    async fn add_transport_failure_leaves_collection_unchanged() {
        let gateway = MockGateway::new();
        gateway.fail_table("inventory");
        let mut inventory = Collection::new(vec![item("a")]);

        let err = inventory
            .add(&roses(), &session(), &gateway)
            .await
            .unwrap_err();
        assert!(matches!(err, DashboardError::Gateway(_)));
        assert_eq!(inventory.len(), 1);
    }

    #[tokio::test]
    async fn delete_removes_only_matching_id_whatever_the_body() {
        let gateway = MockGateway::new();
        gateway.set_delete_response(json!({ "message": "permission denied" }));
        let mut inventory = Collection::new(vec![item("x"), item("abc"), item("y")]);

        let removed = inventory.delete("abc", &session(), &gateway).await.unwrap();

        assert_eq!(removed, 1);
        let ids: Vec<&str> = inventory.records().iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec!["x", "y"]);
        assert_eq!(gateway.calls(), vec!["delete inventory?id=eq.abc".to_string()]);
    }

    #[tokio::test]
    async fn delete_transport_failure_keeps_record() {
        let gateway = MockGateway::new();
        gateway.unreachable_table("inventory");
        let mut inventory = Collection::new(vec![item("abc")]);

        let err = inventory
            .delete("abc", &session(), &gateway)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DashboardError::Gateway(GatewayError::Request(_))
        ));
        assert!(inventory.get("abc").is_some());
    }

    #[tokio::test]
    async fn delete_with_non_json_body_still_removes() {
        let gateway = MockGateway::new();
        gateway.fail_table("inventory");
        let mut inventory = Collection::new(vec![item("abc"), item("keep")]);

        let removed = inventory.delete("abc", &session(), &gateway).await.unwrap();

        assert_eq!(removed, 1);
        assert!(inventory.get("abc").is_none());
        assert!(inventory.get("keep").is_some());
    }

    #[test]
    fn decode_rows_rejects_error_payload() {
        let err = decode_rows::<InventoryItem>(
            "inventory",
            json!({ "message": "JWT expired", "code": "PGRST301" }),
        )
        .unwrap_err();
        match err {
            DashboardError::Rejected { table, message } => {
                assert_eq!(table, "inventory");
                assert_eq!(message, "JWT expired");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn decode_rows_reports_shape_mismatch() {
        let err = decode_rows::<InventoryItem>("inventory", json!([{ "id": "1" }])).unwrap_err();
        assert!(matches!(err, DashboardError::Shape { table: "inventory", .. }));
    }
}
