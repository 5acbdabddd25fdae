//! Pages
//!
//! One component per screen in [`crate::models::Page`].

mod dashboard;
mod diary;
mod login;
mod reminders;
mod routine;
mod sign_up;

pub use dashboard::DashboardPage;
pub use diary::DiaryPage;
pub use login::LoginPage;
pub use reminders::RemindersPage;
pub use routine::RoutinePage;
pub use sign_up::SignUpPage;
