use std::sync::Arc;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::SqliteConnection;
use uuid::Uuid;

use stockpile_core::shipments::{NewShipment, Shipment, ShipmentRepositoryTrait, ShipmentStatus};
use stockpile_core::stockpile::HistoryChangeType;
use stockpile_core::Result;

use super::model::{ShipmentDB, ShipmentItemDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::{shipment_items, shipments};
use crate::stockpile::{apply_quantity_change, QuantityChange};
use crate::utils::{format_decimal, format_timestamp};

pub struct ShipmentRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl ShipmentRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        ShipmentRepository { pool, writer }
    }
}

fn insert_shipment(conn: &mut SqliteConnection, shipment: &NewShipment) -> Result<Shipment> {
    let timestamp = format_timestamp(shipment.requested_at);
    let row = ShipmentDB {
        id: Uuid::new_v4().to_string(),
        user_id: shipment.user_id.clone(),
        status: ShipmentStatus::Pending.as_str().to_string(),
        tracking_number: None,
        shipping_address: serde_json::to_string(&shipment.shipping_address)
            .map_err(StorageError::from)?,
        notes: shipment.notes.clone(),
        created_at: timestamp.clone(),
        updated_at: timestamp,
    };
    diesel::insert_into(shipments::table)
        .values(&row)
        .execute(conn)
        .map_err(StorageError::from)?;

    let items: Vec<ShipmentItemDB> = shipment
        .items
        .iter()
        .map(|item| ShipmentItemDB {
            id: Uuid::new_v4().to_string(),
            shipment_id: row.id.clone(),
            product_id: item.product_id.clone(),
            quantity: format_decimal(item.quantity),
            price_per_unit: format_decimal(item.price_per_unit),
        })
        .collect();
    diesel::insert_into(shipment_items::table)
        .values(&items)
        .execute(conn)
        .map_err(StorageError::from)?;

    Ok(row.into_shipment(items)?)
}

#[async_trait]
impl ShipmentRepositoryTrait for ShipmentRepository {
    async fn create_shipment(&self, shipment: NewShipment) -> Result<Shipment> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Shipment> {
                let created = insert_shipment(conn, &shipment)?;
                for item in &shipment.items {
                    // Overdrawing any item aborts the transaction, shipment included.
                    apply_quantity_change(
                        conn,
                        &QuantityChange {
                            user_id: &shipment.user_id,
                            product_id: &item.product_id,
                            delta: -item.quantity,
                            target_quantity: None,
                            change_type: HistoryChangeType::Shipment,
                            reference_id: Some(created.id.clone()),
                            notes: shipment.notes.clone(),
                            at: shipment.requested_at,
                        },
                    )?;
                }
                Ok(created)
            })
            .await
    }

    fn get_shipments(&self, user_id: &str) -> Result<Vec<Shipment>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = shipments::table
            .filter(shipments::user_id.eq(user_id))
            .order((shipments::created_at.desc(), shipments::id.desc()))
            .select(ShipmentDB::as_select())
            .load::<ShipmentDB>(&mut conn)
            .map_err(StorageError::from)?;

        let items = ShipmentItemDB::belonging_to(&rows)
            .order(shipment_items::product_id.asc())
            .select(ShipmentItemDB::as_select())
            .load::<ShipmentItemDB>(&mut conn)
            .map_err(StorageError::from)?
            .grouped_by(&rows);

        Ok(rows
            .into_iter()
            .zip(items)
            .map(|(shipment, items)| shipment.into_shipment(items))
            .collect::<std::result::Result<Vec<_>, StorageError>>()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stockpile::StockpileRepository;
    use crate::test_support::test_database;
    use chrono::{DateTime, TimeZone, Utc};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use stockpile_core::errors::Error;
    use stockpile_core::shipments::NewShipmentItem;
    use stockpile_core::stockpile::{HistoryFilter, StockpileRepositoryTrait};
    use stockpile_core::subscriptions::ShippingAddress;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, day, 10, 0, 0).unwrap()
    }

    async fn stock(writer: &WriteHandle, product_id: &'static str, quantity: Decimal) {
        writer
            .exec(move |conn: &mut SqliteConnection| {
                apply_quantity_change(
                    conn,
                    &QuantityChange {
                        user_id: "user-1",
                        product_id,
                        delta: quantity,
                        target_quantity: None,
                        change_type: HistoryChangeType::Allocation,
                        reference_id: None,
                        notes: None,
                        at: at(1),
                    },
                )
            })
            .await
            .unwrap();
    }

    fn new_shipment(items: Vec<(&str, Decimal, Decimal)>, day: u32) -> NewShipment {
        NewShipment {
            user_id: "user-1".to_string(),
            shipping_address: ShippingAddress {
                street1: "1 Range Rd".to_string(),
                street2: None,
                city: "Austin".to_string(),
                state: "TX".to_string(),
                postal_code: "78701".to_string(),
                country: "US".to_string(),
            },
            notes: Some("Leave at the gate".to_string()),
            items: items
                .into_iter()
                .map(|(product_id, quantity, price_per_unit)| NewShipmentItem {
                    product_id: product_id.to_string(),
                    quantity,
                    price_per_unit,
                })
                .collect(),
            requested_at: at(day),
        }
    }

    #[tokio::test]
    async fn test_shipment_deducts_stockpile() {
        let (pool, writer, _dir) = test_database().await;
        stock(&writer, "9mm-fmj", dec!(1000)).await;
        stock(&writer, "308-match", dec!(100)).await;
        let repo = ShipmentRepository::new(pool.clone(), writer.clone());

        let shipment = repo
            .create_shipment(new_shipment(
                vec![
                    ("9mm-fmj", dec!(500), dec!(0.30)),
                    ("308-match", dec!(40), dec!(1.50)),
                ],
                2,
            ))
            .await
            .unwrap();

        assert_eq!(shipment.status, ShipmentStatus::Pending);
        assert_eq!(shipment.total_rounds, dec!(540));
        assert_eq!(shipment.total_value, dec!(210));
        assert_eq!(shipment.items.len(), 2);

        let stockpile = StockpileRepository::new(pool, writer);
        let items = stockpile.get_stockpile_items("user-1").unwrap();
        let nine = items.iter().find(|i| i.product_id == "9mm-fmj").unwrap();
        assert_eq!(nine.quantity_allocated, dec!(500));
        assert_eq!(nine.last_shipment_date, Some(at(2)));

        let (history, _) = stockpile
            .get_history(
                "user-1",
                &HistoryFilter {
                    limit: 10,
                    offset: 0,
                    product_id: None,
                    change_type: Some(HistoryChangeType::Shipment),
                },
            )
            .unwrap();
        assert_eq!(history.len(), 2);
        assert!(history
            .iter()
            .all(|h| h.reference_id.as_deref() == Some(shipment.id.as_str())));
    }

    #[tokio::test]
    async fn test_insufficient_stock_rolls_back_everything() {
        let (pool, writer, _dir) = test_database().await;
        stock(&writer, "9mm-fmj", dec!(1000)).await;
        stock(&writer, "308-match", dec!(10)).await;
        let repo = ShipmentRepository::new(pool.clone(), writer.clone());

        let err = repo
            .create_shipment(new_shipment(
                vec![
                    ("9mm-fmj", dec!(500), dec!(0.30)),
                    ("308-match", dec!(40), dec!(1.50)),
                ],
                2,
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ConstraintViolation(_)));

        assert!(repo.get_shipments("user-1").unwrap().is_empty());
        let stockpile = StockpileRepository::new(pool, writer);
        let items = stockpile.get_stockpile_items("user-1").unwrap();
        let nine = items.iter().find(|i| i.product_id == "9mm-fmj").unwrap();
        assert_eq!(nine.quantity_allocated, dec!(1000));
    }

    #[tokio::test]
    async fn test_shipments_listed_newest_first() {
        let (pool, writer, _dir) = test_database().await;
        stock(&writer, "9mm-fmj", dec!(1000)).await;
        let repo = ShipmentRepository::new(pool, writer);

        let older = repo
            .create_shipment(new_shipment(vec![("9mm-fmj", dec!(100), dec!(0.30))], 2))
            .await
            .unwrap();
        let newer = repo
            .create_shipment(new_shipment(vec![("9mm-fmj", dec!(200), dec!(0.30))], 5))
            .await
            .unwrap();

        let listed = repo.get_shipments("user-1").unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, newer.id);
        assert_eq!(listed[1].id, older.id);
        assert_eq!(listed[1].items[0].quantity, dec!(100));
        assert_eq!(listed[0].shipping_address.city, "Austin");
        assert!(repo.get_shipments("user-2").unwrap().is_empty());
    }
}
