//! Shared types for the dokan data model

use chrono::{DateTime, Local, NaiveDate};
use dokan_util::RecordId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::keys;

/// Stock level marker set on a sale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockColor {
    Red,
    Yellow,
    Green,
}

/// One recorded sale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleRecord {
    pub id: RecordId,
    pub item_name: String,
    /// Unit cost. Some older records call this `buyingPrice`.
    #[serde(alias = "buyingPrice")]
    pub wholesale_price: f64,
    /// Unit price charged to the customer
    pub selling_price: f64,
    pub quantity: u32,
    #[serde(default)]
    pub stock_color: Option<StockColor>,
    /// Encoded image (data URL)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    pub date: NaiveDate,
    /// Creation time, epoch milliseconds
    pub timestamp: i64,
}

impl SaleRecord {
    /// Money taken for this sale
    pub fn income(&self) -> f64 {
        self.selling_price * self.quantity as f64
    }

    /// Wholesale cost of the goods sold
    pub fn cost(&self) -> f64 {
        self.wholesale_price * self.quantity as f64
    }

    pub fn profit(&self) -> f64 {
        self.income() - self.cost()
    }
}

/// Input for a new sale; id, date defaults and timestamp are assigned by the store
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewSale {
    pub item_name: String,
    pub wholesale_price: f64,
    pub selling_price: f64,
    pub quantity: u32,
    pub stock_color: Option<StockColor>,
    pub photo: Option<String>,
    /// Sale date; today when `None`
    pub date: Option<NaiveDate>,
}

/// Unit a product quantity is counted in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuantityUnit {
    Gram,
    Kg,
    Liter,
    #[default]
    Piece,
}

impl QuantityUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuantityUnit::Gram => "gram",
            QuantityUnit::Kg => "kg",
            QuantityUnit::Liter => "liter",
            QuantityUnit::Piece => "piece",
        }
    }
}

impl FromStr for QuantityUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gram" | "g" => Ok(QuantityUnit::Gram),
            "kg" => Ok(QuantityUnit::Kg),
            "liter" | "l" => Ok(QuantityUnit::Liter),
            "piece" | "pcs" => Ok(QuantityUnit::Piece),
            other => Err(format!("Unknown quantity unit: {}", other)),
        }
    }
}

/// Catalog entry, fully populated after migration
///
/// `price` and `quantity` keep the user's text as typed; use
/// [`ProductRecord::price_value`] for arithmetic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    pub id: RecordId,
    pub name: String,
    pub price: String,
    pub quantity: String,
    pub quantity_unit: QuantityUnit,
    /// ISO date the product was added
    pub date: String,
    pub features: String,
}

impl ProductRecord {
    pub fn price_value(&self) -> Option<f64> {
        self.price.trim().parse().ok()
    }
}

/// Input for a new product
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub price: String,
    pub quantity: String,
    pub quantity_unit: QuantityUnit,
    pub features: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShoppingListItem {
    pub id: RecordId,
    pub name: String,
    /// Free text, e.g. "2 kg"
    #[serde(default)]
    pub quantity: String,
    #[serde(default)]
    pub bought: bool,
    /// Creation time, epoch milliseconds
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskItem {
    pub id: RecordId,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
}

/// The shop registered on first run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShopProfile {
    pub shop_name: String,
    pub owner_name: String,
    pub phone: String,
    pub address: String,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
}

/// The four record collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionKind {
    Sales,
    Products,
    ShoppingList,
    Tasks,
}

impl CollectionKind {
    /// Storage key holding this collection
    pub fn key(&self) -> &'static str {
        match self {
            CollectionKind::Sales => keys::SALES,
            CollectionKind::Products => keys::PRODUCTS,
            CollectionKind::ShoppingList => keys::SHOPPING_LIST,
            CollectionKind::Tasks => keys::TASKS,
        }
    }
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CollectionKind::Sales => "sales",
            CollectionKind::Products => "products",
            CollectionKind::ShoppingList => "shopping_list",
            CollectionKind::Tasks => "tasks",
        };
        write!(f, "{}", name)
    }
}

/// Answer to "is premium active right now?"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitlementStatus {
    pub is_active: bool,
    /// Populated when active, and when just expired so the caller can say when
    pub expiry_date: Option<DateTime<Local>>,
    pub activation_date: Option<DateTime<Local>>,
}

impl EntitlementStatus {
    pub fn inactive() -> Self {
        Self::default()
    }

    /// Time left before expiry; zero when inactive
    pub fn remaining(&self, now: DateTime<Local>) -> Duration {
        match (self.is_active, self.expiry_date) {
            (true, Some(expiry)) => (expiry - now).to_std().unwrap_or(Duration::ZERO),
            _ => Duration::ZERO,
        }
    }
}

macro_rules! text_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? } default $default:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::$default
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim() {
                    $($text => Ok($name::$variant),)+
                    other => Err(format!("Unknown {}: {}", stringify!($name), other)),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }
    };
}

text_enum! {
    /// UI language
    Language { En => "en", Bn => "bn" } default En
}

text_enum! {
    ThemeMode { Light => "light", Dark => "dark" } default Light
}

text_enum! {
    /// Accent palette
    ThemeColor {
        Emerald => "emerald",
        Blue => "blue",
        Purple => "purple",
        Rose => "rose",
        Amber => "amber",
    } default Emerald
}

/// All user preferences with defaults applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    pub language: Language,
    pub theme_mode: ThemeMode,
    pub theme_color: ThemeColor,
    pub sound_enabled: bool,
    /// Data URL of a user-chosen notification sound
    pub custom_sound: Option<String>,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            language: Language::default(),
            theme_mode: ThemeMode::default(),
            theme_color: ThemeColor::default(),
            sound_enabled: true,
            custom_sound: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sale(selling: f64, wholesale: f64, quantity: u32) -> SaleRecord {
        SaleRecord {
            id: RecordId::new("1"),
            item_name: "Rice".into(),
            wholesale_price: wholesale,
            selling_price: selling,
            quantity,
            stock_color: None,
            photo: None,
            date: NaiveDate::from_ymd_opt(2026, 5, 1).unwrap(),
            timestamp: 0,
        }
    }

    #[test]
    fn sale_income_and_profit() {
        let s = sale(100.0, 40.0, 2);
        assert_eq!(s.income(), 200.0);
        assert_eq!(s.cost(), 80.0);
        assert_eq!(s.profit(), 120.0);
    }

    #[test]
    fn sale_uses_camel_case_and_accepts_buying_price() {
        let json = r#"{
            "id": "1714550400000",
            "itemName": "Lentils",
            "buyingPrice": 40,
            "sellingPrice": 55.5,
            "quantity": 3,
            "stockColor": "yellow",
            "date": "2026-05-01",
            "timestamp": 1714550400000
        }"#;
        let s: SaleRecord = serde_json::from_str(json).unwrap();
        assert_eq!(s.wholesale_price, 40.0);
        assert_eq!(s.stock_color, Some(StockColor::Yellow));
        assert!(s.photo.is_none());

        let out = serde_json::to_value(&s).unwrap();
        assert!(out.get("wholesalePrice").is_some());
        assert!(out.get("photo").is_none());
    }

    #[test]
    fn null_stock_color_is_none() {
        let json = r#"{"id":"1","itemName":"x","wholesalePrice":1,"sellingPrice":2,
            "quantity":1,"stockColor":null,"date":"2026-01-01","timestamp":1}"#;
        let s: SaleRecord = serde_json::from_str(json).unwrap();
        assert!(s.stock_color.is_none());
    }

    #[test]
    fn quantity_unit_parsing() {
        assert_eq!("kg".parse::<QuantityUnit>().unwrap(), QuantityUnit::Kg);
        assert_eq!("Liter".parse::<QuantityUnit>().unwrap(), QuantityUnit::Liter);
        assert_eq!(QuantityUnit::default(), QuantityUnit::Piece);
        assert!("bushel".parse::<QuantityUnit>().is_err());
    }

    #[test]
    fn product_price_value() {
        let p = ProductRecord {
            id: RecordId::new("1"),
            name: "Soap".into(),
            price: " 35.5 ".into(),
            quantity: "".into(),
            quantity_unit: QuantityUnit::Piece,
            date: "2026-01-01".into(),
            features: String::new(),
        };
        assert_eq!(p.price_value(), Some(35.5));
    }

    #[test]
    fn profile_tolerates_missing_fields() {
        let p: ShopProfile = serde_json::from_str(r#"{"shopName":"Rahim Store"}"#).unwrap();
        assert_eq!(p.shop_name, "Rahim Store");
        assert!(p.owner_name.is_empty());
    }

    #[test]
    fn preference_enums_parse_their_text() {
        assert_eq!("bn".parse::<Language>().unwrap(), Language::Bn);
        assert_eq!(ThemeMode::Dark.as_str(), "dark");
        assert_eq!("rose".parse::<ThemeColor>().unwrap(), ThemeColor::Rose);
        assert!("fr".parse::<Language>().is_err());
        assert_eq!(Preferences::default().language, Language::En);
        assert!(Preferences::default().sound_enabled);
    }

    #[test]
    fn entitlement_remaining() {
        let now = Local.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let status = EntitlementStatus {
            is_active: true,
            expiry_date: Some(now + chrono::Duration::hours(2)),
            activation_date: Some(now),
        };
        assert_eq!(status.remaining(now), Duration::from_secs(7200));
        assert_eq!(EntitlementStatus::inactive().remaining(now), Duration::ZERO);
    }

    #[test]
    fn collection_keys_are_distinct() {
        let kinds = [
            CollectionKind::Sales,
            CollectionKind::Products,
            CollectionKind::ShoppingList,
            CollectionKind::Tasks,
        ];
        let keys: std::collections::HashSet<_> = kinds.iter().map(|k| k.key()).collect();
        assert_eq!(keys.len(), kinds.len());
    }
}
