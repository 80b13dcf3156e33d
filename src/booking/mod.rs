//! The booking flow, parameterized by service category.
//!
//! [`ShopPicker`] covers browsing and shop/tier selection; it hands a
//! [`BookingDraft`] to [`Checkout`], which collects the form and submits it.

pub mod checkout;
pub mod flow;
pub mod pricing;

pub use checkout::{BookingForm, Checkout, CheckoutState, FormField};
pub use flow::{BookingDraft, FlowStage, ShopPicker};
pub use pricing::{DisplayedShop, PricingTable, Tier};
