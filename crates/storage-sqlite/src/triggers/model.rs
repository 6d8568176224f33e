//! Database models for shipment triggers.

use diesel::prelude::*;

use crate::errors::StorageError;
use crate::utils::{parse_decimal, parse_timestamp};
use stockpile_core::triggers::{ShipmentTrigger, TriggerType};

#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::shipment_triggers)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ShipmentTriggerDB {
    pub id: String,
    pub user_id: String,
    pub trigger_type: String,
    pub threshold_value: String,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl TryFrom<ShipmentTriggerDB> for ShipmentTrigger {
    type Error = StorageError;

    fn try_from(db: ShipmentTriggerDB) -> Result<Self, Self::Error> {
        let trigger_type = db.trigger_type.parse::<TriggerType>().map_err(|e| {
            StorageError::corrupt("shipment_triggers.trigger_type", &db.trigger_type, e)
        })?;
        Ok(ShipmentTrigger {
            threshold_value: parse_decimal(
                "shipment_triggers.threshold_value",
                &db.threshold_value,
            )?,
            created_at: parse_timestamp("shipment_triggers.created_at", &db.created_at)?,
            updated_at: parse_timestamp("shipment_triggers.updated_at", &db.updated_at)?,
            id: db.id,
            user_id: db.user_id,
            trigger_type,
            is_active: db.is_active,
        })
    }
}
