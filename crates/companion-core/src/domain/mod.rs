//! Domain Layer
//!
//! Records stored by the remote backend and the identity types handed out
//! by the sign-in provider.
//! This layer has NO external dependencies (except serde/chrono for the wire shape).

mod entity;
mod task;
mod profile;
mod diary;
mod reminder;
mod user;

pub use entity::Entity;
pub use task::{NewTask, Task};
pub use profile::{AdhdLevel, ChildProfile, ChildProfilePatch, NewChildProfile};
pub use diary::{DiaryEntry, MedicationTaken, NewDiaryEntry};
pub use reminder::{NewReminder, Reminder, ReminderPatch, ReminderType};
pub use user::{Session, SignUpOutcome, User, UserMetadata};
