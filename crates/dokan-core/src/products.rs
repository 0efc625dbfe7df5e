//! Product catalog and its schema migration

use chrono::{DateTime, Local};
use dokan_api::{keys, NewProduct, ProductRecord, QuantityUnit};
use dokan_store::{CollectionRead, Entry, Storage};
use dokan_util::{DokanError, RecordId, Result};
use serde::Deserialize;
use tracing::{info, warn};

use crate::collection::{check_amount, required_text, Collection, Placement};
use crate::ChangeBus;

/// Current schema version of the stored catalog.
///
/// Version 1 records may lack `quantity` and `quantityUnit`, and may hold
/// numbers where version 2 holds text.
pub const PRODUCTS_SCHEMA_VERSION: i64 = 2;

/// Catalog entry as written by any schema version
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredProduct {
    id: RecordId,
    #[serde(default)]
    name: String,
    #[serde(default)]
    price: Option<NumberOrText>,
    #[serde(default)]
    quantity: Option<NumberOrText>,
    #[serde(default)]
    quantity_unit: Option<String>,
    #[serde(default)]
    date: String,
    #[serde(default)]
    features: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

impl NumberOrText {
    fn into_text(self) -> String {
        match self {
            NumberOrText::Number(n) => n.to_string(),
            NumberOrText::Text(s) => s,
        }
    }
}

impl From<StoredProduct> for ProductRecord {
    fn from(stored: StoredProduct) -> Self {
        let quantity_unit = match stored.quantity_unit.as_deref() {
            None => QuantityUnit::default(),
            Some(raw) => raw.parse().unwrap_or_else(|e| {
                warn!(id = %stored.id, error = %e, "Unknown quantity unit, using piece");
                QuantityUnit::default()
            }),
        };

        ProductRecord {
            id: stored.id,
            name: stored.name,
            price: stored.price.map(NumberOrText::into_text).unwrap_or_default(),
            quantity: stored
                .quantity
                .map(NumberOrText::into_text)
                .unwrap_or_default(),
            quantity_unit,
            date: stored.date,
            features: stored.features,
        }
    }
}

/// The product catalog, newest first
#[derive(Clone)]
pub struct ProductStore {
    records: Collection<ProductRecord>,
}

impl ProductStore {
    pub fn new(storage: Storage, bus: ChangeBus) -> Self {
        Self {
            records: Collection::new(storage, bus),
        }
    }

    /// Every product, migrated to the current schema.
    ///
    /// The first load after an upgrade writes the migrated catalog and the
    /// new schema version back; later loads read it directly.
    pub fn list(&self) -> Vec<ProductRecord> {
        let storage = self.records.storage();
        let version = storage.get_i64(keys::PRODUCTS_SCHEMA_VERSION).unwrap_or(1);
        if version >= PRODUCTS_SCHEMA_VERSION {
            return self.records.load();
        }
        self.migrate(version)
    }

    pub fn get(&self, id: &RecordId) -> Option<ProductRecord> {
        self.list().into_iter().find(|p| &p.id == id)
    }

    /// Case-insensitive substring search on name and features
    pub fn search(&self, query: &str) -> Vec<ProductRecord> {
        let needle = query.trim().to_lowercase();
        self.list()
            .into_iter()
            .filter(|p| {
                needle.is_empty()
                    || p.name.to_lowercase().contains(&needle)
                    || p.features.to_lowercase().contains(&needle)
            })
            .collect()
    }

    pub fn add(&self, product: NewProduct, now: DateTime<Local>) -> Result<ProductRecord> {
        let (name, price) = validate(&product)?;
        self.list();
        let items = self.records.snapshot()?;

        let record = ProductRecord {
            id: Collection::fresh_id(&items, now),
            name,
            price,
            quantity: product.quantity.trim().to_string(),
            quantity_unit: product.quantity_unit,
            date: now.date_naive().to_string(),
            features: product.features.trim().to_string(),
        };

        info!(id = %record.id, name = %record.name, "Product added");
        Ok(self.records.insert(items, record, Placement::Front))
    }

    /// Replace the editable fields of a product. Id and date stay.
    pub fn update(&self, id: &RecordId, product: NewProduct) -> Result<ProductRecord> {
        let (name, price) = validate(&product)?;
        // Make sure the stored catalog is current before editing in place
        self.list();
        self.records.modify(id, |record| {
            record.name = name;
            record.price = price;
            record.quantity = product.quantity.trim().to_string();
            record.quantity_unit = product.quantity_unit;
            record.features = product.features.trim().to_string();
            Ok(())
        })
    }

    pub fn delete(&self, id: &RecordId) -> bool {
        self.list();
        self.records.delete(id)
    }

    fn migrate(&self, from_version: i64) -> Vec<ProductRecord> {
        let storage = self.records.storage();
        let stored: Vec<Entry<StoredProduct>> = match storage.load_collection(keys::PRODUCTS) {
            CollectionRead::Absent => Vec::new(),
            CollectionRead::Entries(entries) => entries,
            CollectionRead::Unreadable => {
                warn!(from_version, "Product catalog unreadable, migration postponed");
                return Vec::new();
            }
        };
        let migrated: Vec<Entry<ProductRecord>> = stored
            .into_iter()
            .map(|entry| entry.map(ProductRecord::from))
            .collect();

        info!(
            from_version,
            to_version = PRODUCTS_SCHEMA_VERSION,
            count = migrated.len(),
            "Migrating product catalog"
        );
        if storage.write_collection(keys::PRODUCTS, &migrated) {
            let _ = storage.set_i64(keys::PRODUCTS_SCHEMA_VERSION, PRODUCTS_SCHEMA_VERSION);
        }
        migrated.into_iter().filter_map(Entry::into_record).collect()
    }
}

/// Trimmed name and price text
fn validate(product: &NewProduct) -> Result<(String, String)> {
    let name = required_text(&product.name, "Product name")?;
    let price = product.price.trim();
    let value: f64 = price
        .parse()
        .map_err(|_| DokanError::validation("Price must be a number"))?;
    check_amount(value, "Price")?;
    Ok((name, price.to_string()))
}
