//! Reminder Entity

use serde::{Deserialize, Serialize};

use super::entity::Entity;

/// Reminder category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReminderType {
    Medication,
    Appointment,
    #[default]
    Activity,
    Other,
}

impl ReminderType {
    pub const ALL: [ReminderType; 4] = [
        ReminderType::Medication,
        ReminderType::Appointment,
        ReminderType::Activity,
        ReminderType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReminderType::Medication => "medication",
            ReminderType::Appointment => "appointment",
            ReminderType::Activity => "activity",
            ReminderType::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }

    pub fn label(&self) -> &'static str {
        match self {
            ReminderType::Medication => "Medicação",
            ReminderType::Appointment => "Consulta",
            ReminderType::Activity => "Atividade",
            ReminderType::Other => "Outro",
        }
    }
}

/// Reminder as stored in `reminders`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    pub id: String,
    pub user_id: String,
    pub child_id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// RFC 3339 instant
    pub reminder_time: String,
    #[serde(rename = "type")]
    pub kind: ReminderType,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Entity for Reminder {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Insert payload for a reminder
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewReminder {
    pub title: String,
    pub description: Option<String>,
    pub reminder_time: String,
    #[serde(rename = "type")]
    pub kind: ReminderType,
    pub is_completed: bool,
}

/// Partial update for a reminder
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReminderPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reminder_time: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<ReminderType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_completed: Option<bool>,
}

impl From<NewReminder> for ReminderPatch {
    fn from(new: NewReminder) -> Self {
        Self {
            title: Some(new.title),
            description: new.description,
            reminder_time: Some(new.reminder_time),
            kind: Some(new.kind),
            is_completed: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reminder_type_round_trips_through_str() {
        for kind in ReminderType::ALL {
            assert_eq!(ReminderType::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(ReminderType::parse("birthday"), None);
    }

    #[test]
    fn test_reminder_uses_type_column() {
        let new = NewReminder {
            title: "Ritalina".to_string(),
            description: None,
            reminder_time: "2024-05-01T11:00:00+00:00".to_string(),
            kind: ReminderType::Medication,
            is_completed: false,
        };
        let value = serde_json::to_value(&new).unwrap();
        assert_eq!(value["type"], "medication");
    }
}
