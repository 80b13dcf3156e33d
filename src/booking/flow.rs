//! Shop and tier selection for one service category.
//!
//! A [`ShopPicker`] is the browsing half of the booking flow. It is the same
//! component for every category; only the key, its multiplier and its shop
//! list differ.

use super::pricing::{DisplayedShop, PricingTable, Tier};
use crate::catalog::CategoryKey;
use crate::error::AppError;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowStage {
    Browsing,
    ShopSelected,
}

/// Shop and tier carried from the picker into checkout. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingDraft {
    pub category: CategoryKey,
    pub shop: DisplayedShop,
    pub tier: Tier,
}

#[derive(Debug, Clone)]
pub struct ShopPicker {
    category: CategoryKey,
    pricing: PricingTable,
    tier: Tier,
    selected: Option<String>,
}

impl ShopPicker {
    pub fn new(category: CategoryKey, pricing: PricingTable) -> Self {
        Self {
            category,
            pricing,
            tier: Tier::Standard,
            selected: None,
        }
    }

    pub fn category(&self) -> CategoryKey {
        self.category
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    pub fn stage(&self) -> FlowStage {
        if self.selected.is_some() {
            FlowStage::ShopSelected
        } else {
            FlowStage::Browsing
        }
    }

    pub fn premium_available(&self) -> bool {
        self.pricing.supports(self.category, Tier::Premium)
    }

    /// Switch tiers. Allowed with or without a selected shop; the selection
    /// survives. A tier the category has no multiplier for is refused and the
    /// current tier is kept.
    pub fn select_tier(&mut self, tier: Tier) -> Result<(), AppError> {
        self.pricing.multiplier(self.category, tier)?;
        debug!("{}: tier -> {}", self.category, tier);
        self.tier = tier;
        Ok(())
    }

    /// Select a shop by id. Unknown ids leave the state untouched.
    pub fn select_shop(&mut self, shop_id: &str) -> bool {
        if self.category.find_shop(shop_id).is_none() {
            return false;
        }
        debug!("{}: selected shop {}", self.category, shop_id);
        self.selected = Some(shop_id.to_string());
        true
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Shops priced for the current tier.
    pub fn shops(&self) -> Vec<DisplayedShop> {
        // The current tier is only ever set after its multiplier resolved.
        self.pricing
            .listing(self.category, self.tier)
            .unwrap_or_default()
    }

    pub fn selected(&self) -> Option<DisplayedShop> {
        let id = self.selected.as_deref()?;
        self.shops().into_iter().find(|s| s.id == id)
    }

    pub fn can_proceed(&self) -> bool {
        self.selected.is_some()
    }

    /// Hand the selection over to checkout. `None` without a selection.
    pub fn proceed(&self) -> Option<BookingDraft> {
        let shop = self.selected()?;
        Some(BookingDraft {
            category: self.category,
            shop,
            tier: self.tier,
        })
    }

    pub fn summary(&self) -> String {
        match self.selected() {
            Some(shop) => format!("Shop: {} • Tier: {}", shop.name, self.tier),
            None => "Pick a shop to proceed.".to_string(),
        }
    }
}
