//! Frontend Models
//!
//! Screens of the app and the domain records they render.

pub use companion_core::domain::{
    AdhdLevel, ChildProfile, DiaryEntry, MedicationTaken, Reminder, ReminderType, Session, Task, User,
};

/// Screen shown in the main area
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Login,
    SignUp,
    Dashboard,
    Diary,
    Routine,
    Reminders,
}

impl Page {
    /// Screens reachable from the sidebar
    pub const NAVIGATION: [Page; 4] = [Page::Dashboard, Page::Diary, Page::Routine, Page::Reminders];

    pub fn label(&self) -> &'static str {
        match self {
            Page::Login => "Entrar",
            Page::SignUp => "Criar conta",
            Page::Dashboard => "Início",
            Page::Diary => "Diário",
            Page::Routine => "Rotina",
            Page::Reminders => "Lembretes",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Page::Login | Page::SignUp => "🔑",
            Page::Dashboard => "🏠",
            Page::Diary => "📔",
            Page::Routine => "✅",
            Page::Reminders => "⏰",
        }
    }

    /// Pages that need a signed-in user
    pub fn requires_session(&self) -> bool {
        !matches!(self, Page::Login | Page::SignUp)
    }
}
