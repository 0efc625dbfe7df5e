//! Sales ledger

use chrono::{DateTime, Local, NaiveDate};
use dokan_api::{NewSale, SaleRecord};
use dokan_store::Storage;
use dokan_util::{to_epoch_millis, RecordId, Result};
use tracing::info;

use crate::collection::{check_amount, required_text, Collection, Placement};
use crate::ChangeBus;

/// Recorded sales, newest first
#[derive(Clone)]
pub struct SalesStore {
    records: Collection<SaleRecord>,
}

impl SalesStore {
    pub fn new(storage: Storage, bus: ChangeBus) -> Self {
        Self {
            records: Collection::new(storage, bus),
        }
    }

    /// Every sale; empty when nothing is stored or the data is unreadable
    pub fn list(&self) -> Vec<SaleRecord> {
        self.records.load()
    }

    /// Sales recorded for `date`
    pub fn on_date(&self, date: NaiveDate) -> Vec<SaleRecord> {
        self.list().into_iter().filter(|s| s.date == date).collect()
    }

    pub fn get(&self, id: &RecordId) -> Option<SaleRecord> {
        self.list().into_iter().find(|s| &s.id == id)
    }

    /// Record a sale made at `now`
    pub fn add(&self, sale: NewSale, now: DateTime<Local>) -> Result<SaleRecord> {
        let item_name = validate(&sale)?;
        let items = self.records.snapshot()?;

        let record = SaleRecord {
            id: Collection::fresh_id(&items, now),
            item_name,
            wholesale_price: sale.wholesale_price,
            selling_price: sale.selling_price,
            quantity: sale.quantity,
            stock_color: sale.stock_color,
            photo: sale.photo,
            date: sale.date.unwrap_or_else(|| now.date_naive()),
            timestamp: to_epoch_millis(&now),
        };

        info!(
            id = %record.id,
            item = %record.item_name,
            quantity = record.quantity,
            "Sale recorded"
        );
        Ok(self.records.insert(items, record, Placement::Front))
    }

    /// Replace the editable fields of an existing sale. Id and timestamp stay.
    pub fn update(&self, id: &RecordId, sale: NewSale) -> Result<SaleRecord> {
        let item_name = validate(&sale)?;
        self.records.modify(id, |record| {
            record.item_name = item_name;
            record.wholesale_price = sale.wholesale_price;
            record.selling_price = sale.selling_price;
            record.quantity = sale.quantity;
            record.stock_color = sale.stock_color;
            record.photo = sale.photo;
            if let Some(date) = sale.date {
                record.date = date;
            }
            Ok(())
        })
    }

    /// False when no sale has this id
    pub fn delete(&self, id: &RecordId) -> bool {
        self.records.delete(id)
    }
}

fn validate(sale: &NewSale) -> Result<String> {
    let name = required_text(&sale.item_name, "Item name")?;
    check_amount(sale.wholesale_price, "Wholesale price")?;
    check_amount(sale.selling_price, "Selling price")?;
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixed_now;
    use dokan_api::{keys, StockColor};
    use dokan_store::{KvStore, MemoryKvStore};
    use dokan_util::DokanError;
    use std::sync::atomic::Ordering;
    use std::sync::Arc;

    fn store() -> (Arc<MemoryKvStore>, SalesStore) {
        let kv = Arc::new(MemoryKvStore::new());
        (kv.clone(), SalesStore::new(Storage::new(kv), ChangeBus::new()))
    }

    fn rice() -> NewSale {
        NewSale {
            item_name: " Rice ".into(),
            wholesale_price: 40.0,
            selling_price: 100.0,
            quantity: 2,
            stock_color: Some(StockColor::Green),
            ..Default::default()
        }
    }

    #[test]
    fn add_prepends_and_defaults_date_to_today() {
        let (_, sales) = store();
        let now = fixed_now();

        let first = sales.add(rice(), now).unwrap();
        let second = sales.add(rice(), now).unwrap();

        assert_eq!(first.item_name, "Rice");
        assert_eq!(first.date, now.date_naive());
        assert_eq!(first.timestamp, to_epoch_millis(&now));
        assert_ne!(first.id, second.id);

        let ids: Vec<_> = sales.list().into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[test]
    fn rejects_bad_input_without_writing() {
        let (kv, sales) = store();

        for bad in [
            NewSale { item_name: "  ".into(), ..rice() },
            NewSale { wholesale_price: -1.0, ..rice() },
            NewSale { selling_price: f64::NAN, ..rice() },
        ] {
            assert!(matches!(
                sales.add(bad, fixed_now()),
                Err(DokanError::ValidationError(_))
            ));
        }
        assert!(kv.is_empty());
    }

    #[test]
    fn update_keeps_identity() {
        let (_, sales) = store();
        let sale = sales.add(rice(), fixed_now()).unwrap();

        let updated = sales
            .update(
                &sale.id,
                NewSale {
                    item_name: "Basmati".into(),
                    quantity: 5,
                    ..rice()
                },
            )
            .unwrap();

        assert_eq!(updated.id, sale.id);
        assert_eq!(updated.timestamp, sale.timestamp);
        assert_eq!(updated.date, sale.date);
        assert_eq!(updated.quantity, 5);
        assert_eq!(sales.get(&sale.id).unwrap().item_name, "Basmati");

        assert!(matches!(
            sales.update(&RecordId::new("nope"), rice()),
            Err(DokanError::RecordNotFound(_))
        ));
    }

    #[test]
    fn on_date_filters() {
        let (_, sales) = store();
        let now = fixed_now();
        let yesterday = now.date_naive().pred_opt().unwrap();

        sales.add(rice(), now).unwrap();
        sales
            .add(NewSale { date: Some(yesterday), ..rice() }, now)
            .unwrap();

        assert_eq!(sales.on_date(now.date_naive()).len(), 1);
        assert_eq!(sales.on_date(yesterday).len(), 1);
    }

    #[test]
    fn corrupt_ledger_reads_empty() {
        let (kv, sales) = store();
        kv.set(keys::SALES, "[{\"id\":").unwrap();
        assert!(sales.list().is_empty());
    }

    #[test]
    fn add_keeps_records_it_cannot_read() {
        let (kv, sales) = store();
        kv.set(
            keys::SALES,
            r#"[{"id":"3","itemName":"Rice","wholesalePrice":40,"sellingPrice":50,"quantity":1,"stockColor":"blue","date":"2026-06-14","timestamp":3},{"id":"2","itemName":"Oil","wholesalePrice":150,"sellingPrice":180,"quantity":2,"stockColor":null,"date":"2026-06-14","timestamp":2},{"id":"1","itemName":"Eggs","wholesalePrice":10,"sellingPrice":12,"quantity":1.5,"date":"2026-06-14","timestamp":1}]"#,
        )
        .unwrap();

        let visible = sales.list();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].item_name, "Oil");

        let salt = sales
            .add(NewSale { item_name: "Salt".into(), ..rice() }, fixed_now())
            .unwrap();

        let stored: Vec<serde_json::Value> =
            serde_json::from_str(&kv.get(keys::SALES).unwrap().unwrap()).unwrap();
        assert_eq!(stored.len(), 4);
        assert_eq!(stored[0]["id"], salt.id.to_string());
        assert_eq!(stored[1]["stockColor"], "blue");
        assert_eq!(stored[3]["quantity"], 1.5);
    }

    #[test]
    fn add_refused_when_ledger_unreadable() {
        let (kv, sales) = store();
        sales.add(rice(), fixed_now()).unwrap();
        let before = kv.get(keys::SALES).unwrap();

        kv.fail_reads.store(true, Ordering::SeqCst);
        assert!(matches!(
            sales.add(rice(), fixed_now()),
            Err(DokanError::StorageUnreadable(_))
        ));
        assert!(!sales.delete(&RecordId::new("1")));

        kv.fail_reads.store(false, Ordering::SeqCst);
        assert_eq!(kv.get(keys::SALES).unwrap(), before);
        assert_eq!(sales.list().len(), 1);
    }

    #[test]
    fn delete_twice() {
        let (_, sales) = store();
        let sale = sales.add(rice(), fixed_now()).unwrap();
        assert!(sales.delete(&sale.id));
        assert!(!sales.delete(&sale.id));
    }
}
