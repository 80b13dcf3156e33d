//! Static service catalog.
//!
//! Categories and their candidate shops are fixed at build time. Only the
//! premium multiplier per category comes from configuration.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Stable identifier of a service category, as used on the wire
/// (`service_type`) and in filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CategoryKey {
    TyreChange,
    WheelAlignment,
    Balancing,
    OilChange,
    BatteryCheck,
}

impl CategoryKey {
    pub const ALL: [CategoryKey; 5] = [
        CategoryKey::TyreChange,
        CategoryKey::WheelAlignment,
        CategoryKey::Balancing,
        CategoryKey::OilChange,
        CategoryKey::BatteryCheck,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryKey::TyreChange => "tyre-change",
            CategoryKey::WheelAlignment => "wheel-alignment",
            CategoryKey::Balancing => "balancing",
            CategoryKey::OilChange => "oil-change",
            CategoryKey::BatteryCheck => "battery-check",
        }
    }

    pub fn category(&self) -> &'static ServiceCategory {
        // CATEGORIES is ordered like ALL
        &CATEGORIES[*self as usize]
    }

    /// Candidate shops at their base prices.
    pub fn shops(&self) -> Vec<Shop> {
        let entries = match self {
            CategoryKey::TyreChange => TYRE_ENTRIES,
            CategoryKey::WheelAlignment => ALIGNMENT_ENTRIES,
            CategoryKey::Balancing => BALANCING_ENTRIES,
            CategoryKey::OilChange => OIL_ENTRIES,
            CategoryKey::BatteryCheck => BATTERY_ENTRIES,
        };
        entries.iter().map(Shop::from).collect()
    }

    pub fn find_shop(&self, shop_id: &str) -> Option<Shop> {
        self.shops().into_iter().find(|s| s.id == shop_id)
    }

    /// One-line summary of what a tier includes, where the category has one.
    pub fn tier_summary(&self, premium: bool) -> Option<&'static str> {
        match (self, premium) {
            (CategoryKey::TyreChange, false) => Some("Includes tyre replacement and balancing."),
            (CategoryKey::TyreChange, true) => {
                Some("Includes premium tyres, balancing, and free wheel alignment check.")
            }
            _ => None,
        }
    }
}

impl fmt::Display for CategoryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CategoryKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase();
        CategoryKey::ALL
            .into_iter()
            .find(|k| k.as_str() == wanted)
            .ok_or_else(|| {
                anyhow!(
                    "Unknown service category '{}'. Expected one of: {}",
                    s,
                    CategoryKey::ALL.map(|k| k.as_str()).join(", ")
                )
            })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceCategory {
    pub key: CategoryKey,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub route: &'static str,
}

/// A candidate shop with its base (standard tier) price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shop {
    pub id: String,
    pub name: String,
    pub distance_km: f64,
    pub rating: f64,
    pub price: u32,
    pub eta_minutes: u32,
}

pub static CATEGORIES: [ServiceCategory; 5] = [
    ServiceCategory {
        key: CategoryKey::TyreChange,
        name: "Tyre Change",
        description: "Replace worn-out tyres",
        icon: "🛞",
        route: "/dashboard/service-category/tyre-change",
    },
    ServiceCategory {
        key: CategoryKey::WheelAlignment,
        name: "Wheel Alignment",
        description: "Adjust wheels for straight tracking",
        icon: "📐",
        route: "/dashboard/service-category/wheel-alignment",
    },
    ServiceCategory {
        key: CategoryKey::Balancing,
        name: "Balancing",
        description: "Balance wheels to reduce vibration",
        icon: "⚖️",
        route: "/dashboard/service-category/balancing",
    },
    ServiceCategory {
        key: CategoryKey::OilChange,
        name: "Oil Change",
        description: "Replace engine oil and filter",
        icon: "🛢️",
        route: "/dashboard/service-category/oil-change",
    },
    ServiceCategory {
        key: CategoryKey::BatteryCheck,
        name: "Battery Check",
        description: "Test battery health and connections",
        icon: "🔋",
        route: "/dashboard/service-category/battery-check",
    },
];

macro_rules! shops {
    ($($id:literal, $name:literal, $km:literal, $rating:literal, $price:literal, $eta:literal;)*) => {
        &[$(ShopEntry {
            id: $id,
            name: $name,
            distance_km: $km,
            rating: $rating,
            price: $price,
            eta_minutes: $eta,
        }),*]
    };
}

/// Compile-time form of [`Shop`].
#[derive(Debug, Clone, Copy)]
pub struct ShopEntry {
    pub id: &'static str,
    pub name: &'static str,
    pub distance_km: f64,
    pub rating: f64,
    pub price: u32,
    pub eta_minutes: u32,
}

impl From<&ShopEntry> for Shop {
    fn from(e: &ShopEntry) -> Self {
        Shop {
            id: e.id.to_string(),
            name: e.name.to_string(),
            distance_km: e.distance_km,
            rating: e.rating,
            price: e.price,
            eta_minutes: e.eta_minutes,
        }
    }
}

const TYRE_ENTRIES: &[ShopEntry] = shops! {
    "s1", "Rapid Tyres & Wheels", 1.2, 4.6, 120, 45;
    "s2", "City Auto Care", 2.5, 4.3, 110, 60;
    "s3", "Prime Wheel Works", 3.1, 4.8, 135, 40;
};

const ALIGNMENT_ENTRIES: &[ShopEntry] = shops! {
    "w1", "Precision Align Co.", 1.0, 4.7, 80, 50;
    "w2", "Track True Garage", 2.2, 4.4, 70, 60;
    "w3", "Straight Line Motors", 3.4, 4.6, 85, 45;
};

const BALANCING_ENTRIES: &[ShopEntry] = shops! {
    "b1", "Smooth Ride Balancers", 0.9, 4.5, 50, 30;
    "b2", "VibeLess Wheels", 2.1, 4.2, 45, 40;
    "b3", "Balance Pros", 3.8, 4.6, 55, 35;
};

const OIL_ENTRIES: &[ShopEntry] = shops! {
    "o1", "Quick Lube Center", 1.4, 4.4, 60, 30;
    "o2", "Prime Oil & Filter", 2.0, 4.6, 70, 40;
    "o3", "Eco Oil Garage", 3.2, 4.3, 65, 35;
};

const BATTERY_ENTRIES: &[ShopEntry] = shops! {
    "bt1", "PowerCell Battery Hub", 1.1, 4.5, 40, 20;
    "bt2", "Volt Check Garage", 2.4, 4.2, 35, 30;
    "bt3", "Amp Up Auto Electric", 3.0, 4.7, 45, 25;
};

/// Categories whose name contains `query`, case-insensitively.
///
/// A blank query returns every category.
pub fn search(query: &str) -> Vec<&'static ServiceCategory> {
    let q = query.trim().to_lowercase();
    CATEGORIES
        .iter()
        .filter(|c| q.is_empty() || c.name.to_lowercase().contains(&q))
        .collect()
}
