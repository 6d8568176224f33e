use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel::SqliteConnection;
use rust_decimal::Decimal;
use uuid::Uuid;

use stockpile_core::triggers::{ShipmentTrigger, TriggerRepositoryTrait, TriggerType};
use stockpile_core::Result;

use super::model::ShipmentTriggerDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::shipment_triggers;
use crate::utils::{format_decimal, format_timestamp};

pub struct TriggerRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl TriggerRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        TriggerRepository { pool, writer }
    }
}

#[async_trait]
impl TriggerRepositoryTrait for TriggerRepository {
    fn get_triggers(&self, user_id: &str) -> Result<Vec<ShipmentTrigger>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = shipment_triggers::table
            .filter(shipment_triggers::user_id.eq(user_id))
            .order(shipment_triggers::created_at.asc())
            .select(ShipmentTriggerDB::as_select())
            .load::<ShipmentTriggerDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows
            .into_iter()
            .map(ShipmentTrigger::try_from)
            .collect::<std::result::Result<Vec<_>, StorageError>>()?)
    }

    async fn upsert_trigger(
        &self,
        user_id: &str,
        trigger_type: TriggerType,
        threshold_value: Decimal,
        is_active: bool,
    ) -> Result<ShipmentTrigger> {
        let user_id = user_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<ShipmentTrigger> {
                let timestamp = format_timestamp(Utc::now());
                let row = ShipmentTriggerDB {
                    id: Uuid::new_v4().to_string(),
                    user_id: user_id.clone(),
                    trigger_type: trigger_type.as_str().to_string(),
                    threshold_value: format_decimal(threshold_value),
                    is_active,
                    created_at: timestamp.clone(),
                    updated_at: timestamp,
                };

                diesel::insert_into(shipment_triggers::table)
                    .values(&row)
                    .on_conflict((shipment_triggers::user_id, shipment_triggers::trigger_type))
                    .do_update()
                    .set((
                        shipment_triggers::threshold_value
                            .eq(excluded(shipment_triggers::threshold_value)),
                        shipment_triggers::is_active.eq(excluded(shipment_triggers::is_active)),
                        shipment_triggers::updated_at.eq(excluded(shipment_triggers::updated_at)),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;

                let saved = shipment_triggers::table
                    .filter(shipment_triggers::user_id.eq(&user_id))
                    .filter(shipment_triggers::trigger_type.eq(trigger_type.as_str()))
                    .select(ShipmentTriggerDB::as_select())
                    .first::<ShipmentTriggerDB>(conn)
                    .map_err(StorageError::from)?;
                Ok(ShipmentTrigger::try_from(saved)?)
            })
            .await
    }

    async fn delete_trigger(
        &self,
        user_id: &str,
        trigger_id: &str,
    ) -> Result<Option<ShipmentTrigger>> {
        let user_id = user_id.to_string();
        let trigger_id = trigger_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Option<ShipmentTrigger>> {
                let owned = shipment_triggers::table
                    .filter(shipment_triggers::id.eq(&trigger_id))
                    .filter(shipment_triggers::user_id.eq(&user_id));

                let existing = owned
                    .clone()
                    .select(ShipmentTriggerDB::as_select())
                    .first::<ShipmentTriggerDB>(conn)
                    .optional()
                    .map_err(StorageError::from)?;
                let Some(existing) = existing else {
                    return Ok(None);
                };

                diesel::delete(owned)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(Some(ShipmentTrigger::try_from(existing)?))
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_database;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_upsert_keeps_one_row_per_type() {
        let (pool, writer, _dir) = test_database().await;
        let repo = TriggerRepository::new(pool, writer);

        let first = repo
            .upsert_trigger("user-1", TriggerType::Budget, dec!(500), true)
            .await
            .unwrap();
        let second = repo
            .upsert_trigger("user-1", TriggerType::Budget, dec!(800), false)
            .await
            .unwrap();
        repo.upsert_trigger("user-1", TriggerType::Quantity, dec!(2000), true)
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.threshold_value, dec!(800));
        assert!(!second.is_active);
        assert_eq!(second.created_at, first.created_at);

        let triggers = repo.get_triggers("user-1").unwrap();
        assert_eq!(triggers.len(), 2);
        assert!(repo.get_triggers("user-2").unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_is_scoped_to_owner() {
        let (pool, writer, _dir) = test_database().await;
        let repo = TriggerRepository::new(pool, writer);
        let trigger = repo
            .upsert_trigger("user-1", TriggerType::Manual, Decimal::ZERO, true)
            .await
            .unwrap();

        assert!(repo
            .delete_trigger("user-2", &trigger.id)
            .await
            .unwrap()
            .is_none());
        assert_eq!(repo.get_triggers("user-1").unwrap().len(), 1);

        let deleted = repo.delete_trigger("user-1", &trigger.id).await.unwrap();
        assert_eq!(deleted.map(|t| t.id), Some(trigger.id));
        assert!(repo.get_triggers("user-1").unwrap().is_empty());
    }
}
