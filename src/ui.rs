use crate::catalog::CategoryKey;
use std::fmt;

/// Application screens. Every screen except the two auth screens needs a
/// signed-in session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    SignIn,
    SignUp,
    Dashboard,
    ServiceCategories,
    CategoryDetail(CategoryKey),
    Booking(CategoryKey),
    Bookings,
    NewTask,
    Tasks,
}

impl Screen {
    pub fn requires_session(&self) -> bool {
        !matches!(self, Screen::SignIn | Screen::SignUp)
    }

    pub fn title(&self) -> String {
        match self {
            Screen::SignIn => "Sign In".to_string(),
            Screen::SignUp => "Sign Up".to_string(),
            Screen::Dashboard => "Dashboard".to_string(),
            Screen::ServiceCategories => "Select Service".to_string(),
            Screen::CategoryDetail(key) => key.category().name.to_string(),
            Screen::Booking(key) => format!("{} - Booking", key.category().name),
            Screen::Bookings => "My Bookings".to_string(),
            Screen::NewTask => "My Task".to_string(),
            Screen::Tasks => "View Tasks".to_string(),
        }
    }

    /// Location-style path, shown in the header.
    pub fn path(&self) -> String {
        match self {
            Screen::SignIn => "/signin".to_string(),
            Screen::SignUp => "/signup".to_string(),
            Screen::Dashboard => "/dashboard".to_string(),
            Screen::ServiceCategories => "/dashboard/service-category".to_string(),
            Screen::CategoryDetail(key) => key.category().route.to_string(),
            Screen::Booking(key) => format!("{}/book", key.category().route),
            Screen::Bookings => "/dashboard/bookings".to_string(),
            Screen::NewTask => "/dashboard/my-task".to_string(),
            Screen::Tasks => "/dashboard/view-tasks".to_string(),
        }
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}
