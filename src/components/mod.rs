// Reusable widgets shared by the screens

pub mod footer;
pub mod header;
pub mod help_overlay;
pub mod input_field;
pub mod notice;

pub use help_overlay::HelpOverlay;
pub use notice::Notice;
