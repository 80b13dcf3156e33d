//! Tier pricing.

use crate::catalog::{CategoryKey, Shop};
use crate::error::AppError;
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    #[default]
    Standard,
    Premium,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Standard => "standard",
            Tier::Premium => "premium",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Tier::Standard => Tier::Premium,
            Tier::Premium => Tier::Standard,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "standard" => Ok(Tier::Standard),
            "premium" => Ok(Tier::Premium),
            other => Err(anyhow!("Unknown tier '{}'. Expected 'standard' or 'premium'", other)),
        }
    }
}

/// A shop as listed for a tier. `price` is derived; `base_price` is the
/// catalog value it was computed from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayedShop {
    pub id: String,
    pub name: String,
    pub distance_km: f64,
    pub rating: f64,
    pub price: u32,
    pub base_price: u32,
    pub eta_minutes: u32,
}

/// Premium multipliers per category. Standard is always 1.
#[derive(Debug, Clone, PartialEq)]
pub struct PricingTable {
    premium: BTreeMap<CategoryKey, f64>,
}

impl PricingTable {
    pub fn new(premium: BTreeMap<CategoryKey, f64>) -> Self {
        Self { premium }
    }

    /// Multipliers observed for the shipped categories. Battery check has none.
    pub fn default_premium() -> BTreeMap<CategoryKey, f64> {
        BTreeMap::from([
            (CategoryKey::TyreChange, 1.25),
            (CategoryKey::WheelAlignment, 1.2),
            (CategoryKey::Balancing, 1.2),
            (CategoryKey::OilChange, 1.15),
        ])
    }

    pub fn premium_multiplier(&self, category: CategoryKey) -> Option<f64> {
        self.premium.get(&category).copied()
    }

    pub fn supports(&self, category: CategoryKey, tier: Tier) -> bool {
        tier == Tier::Standard || self.premium.contains_key(&category)
    }

    pub fn multiplier(&self, category: CategoryKey, tier: Tier) -> Result<f64, AppError> {
        match tier {
            Tier::Standard => Ok(1.0),
            Tier::Premium => self.premium_multiplier(category).ok_or_else(|| {
                AppError::precondition(format!(
                    "Premium pricing is not configured for {}.",
                    category.category().name
                ))
            }),
        }
    }

    pub fn price(&self, category: CategoryKey, tier: Tier, base: u32) -> Result<u32, AppError> {
        Ok(apply(base, self.multiplier(category, tier)?))
    }

    pub fn display(&self, category: CategoryKey, tier: Tier, shop: &Shop) -> Result<DisplayedShop, AppError> {
        Ok(DisplayedShop {
            id: shop.id.clone(),
            name: shop.name.clone(),
            distance_km: shop.distance_km,
            rating: shop.rating,
            price: self.price(category, tier, shop.price)?,
            base_price: shop.price,
            eta_minutes: shop.eta_minutes,
        })
    }

    /// Every shop of `category` priced for `tier`.
    pub fn listing(&self, category: CategoryKey, tier: Tier) -> Result<Vec<DisplayedShop>, AppError> {
        category
            .shops()
            .iter()
            .map(|shop| self.display(category, tier, shop))
            .collect()
    }
}

impl Default for PricingTable {
    fn default() -> Self {
        Self::new(Self::default_premium())
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn apply(base: u32, multiplier: f64) -> u32 {
    (f64::from(base) * multiplier).round().max(0.0) as u32
}
