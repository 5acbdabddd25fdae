//! Form Validation
//!
//! Raw input as typed by the user, validated into insert payloads. Messages
//! are shown next to the offending field.

use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveTime, SecondsFormat, TimeZone, Utc};
use thiserror::Error;

use crate::domain::{
    AdhdLevel, ChildProfile, ChildProfilePatch, MedicationTaken, NewChildProfile, NewDiaryEntry, NewReminder,
    Reminder, ReminderType,
};

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self { field, message: message.into() }
    }
}

fn required(value: &str, field: &'static str, message: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ValidationError::new(field, message))
    } else {
        Ok(trimmed.to_string())
    }
}

fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn parse_date(value: &str, field: &'static str, message: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| ValidationError::new(field, message))
}

/// Parse a 24-hour `H:MM` / `HH:MM` time
pub fn parse_clock(value: &str) -> Option<NaiveTime> {
    let (hours, minutes) = value.trim().split_once(':')?;
    let digits = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());
    if !digits(hours) || hours.len() > 2 || !digits(minutes) || minutes.len() != 2 {
        return None;
    }
    NaiveTime::from_hms_opt(hours.parse().ok()?, minutes.parse().ok()?, 0)
}

// ========================
// Auth
// ========================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<(), ValidationError> {
        required(&self.email, "email", "E-mail é obrigatório")?;
        if self.password.is_empty() {
            return Err(ValidationError::new("password", "Senha é obrigatória"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignUpForm {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl SignUpForm {
    pub fn validate(&self) -> Result<(), ValidationError> {
        required(&self.full_name, "full_name", "Nome é obrigatório")?;
        let email = required(&self.email, "email", "E-mail é obrigatório")?;
        if !email.contains('@') {
            return Err(ValidationError::new("email", "E-mail inválido"));
        }
        if self.password.is_empty() {
            return Err(ValidationError::new("password", "Senha é obrigatória"));
        }
        if self.password != self.confirm_password {
            return Err(ValidationError::new("confirm_password", "As senhas não coincidem!"));
        }
        Ok(())
    }
}

// ========================
// Child profile
// ========================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChildProfileForm {
    pub nome_crianca: String,
    pub data_nascimento: String,
    pub diagnostico_tdah: bool,
    /// Empty when not informed
    pub grau_tdah: String,
    pub informacoes_adicionais: String,
}

impl ChildProfileForm {
    pub fn from_profile(profile: &ChildProfile) -> Self {
        Self {
            nome_crianca: profile.nome_crianca.clone(),
            data_nascimento: profile.data_nascimento.clone(),
            diagnostico_tdah: profile.diagnostico_tdah,
            grau_tdah: profile.grau_tdah.map(|g| g.as_str().to_string()).unwrap_or_default(),
            informacoes_adicionais: profile.informacoes_adicionais.clone().unwrap_or_default(),
        }
    }

    pub fn validate(&self) -> Result<NewChildProfile, ValidationError> {
        let nome_crianca = required(&self.nome_crianca, "nome_crianca", "Nome é obrigatório")?;
        let birth = parse_date(&self.data_nascimento, "data_nascimento", "Data de nascimento inválida")?;
        let grau_tdah = match self.grau_tdah.trim() {
            "" => None,
            value => Some(AdhdLevel::parse(value).ok_or_else(|| ValidationError::new("grau_tdah", "Grau inválido"))?),
        };
        Ok(NewChildProfile {
            nome_crianca,
            data_nascimento: birth.format(DATE_FORMAT).to_string(),
            diagnostico_tdah: self.diagnostico_tdah,
            grau_tdah,
            informacoes_adicionais: optional(&self.informacoes_adicionais),
            avatar_url: None,
        })
    }

    /// Full replacement patch for an existing profile
    pub fn validate_patch(&self) -> Result<ChildProfilePatch, ValidationError> {
        let new = self.validate()?;
        Ok(ChildProfilePatch {
            nome_crianca: Some(new.nome_crianca),
            data_nascimento: Some(new.data_nascimento),
            diagnostico_tdah: Some(new.diagnostico_tdah),
            grau_tdah: new.grau_tdah,
            informacoes_adicionais: new.informacoes_adicionais,
            avatar_url: None,
        })
    }
}

// ========================
// Routine task
// ========================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskForm {
    pub description: String,
}

impl TaskForm {
    pub fn validate(&self) -> Result<String, ValidationError> {
        required(&self.description, "description", "Descrição é obrigatória")
    }
}

// ========================
// Diary
// ========================

#[derive(Debug, Clone, PartialEq)]
pub struct DiaryEntryForm {
    pub entry_date: String,
    pub mood: String,
    pub behavior_observations: String,
    pub medication_taken: String,
    pub medication_details: String,
    pub activities_highlights: String,
    pub parent_observations: String,
}

impl DiaryEntryForm {
    /// Blank form dated `today`
    pub fn new(today: NaiveDate) -> Self {
        Self {
            entry_date: today.format(DATE_FORMAT).to_string(),
            mood: String::new(),
            behavior_observations: String::new(),
            medication_taken: MedicationTaken::default().as_str().to_string(),
            medication_details: String::new(),
            activities_highlights: String::new(),
            parent_observations: String::new(),
        }
    }

    pub fn validate(&self) -> Result<NewDiaryEntry, ValidationError> {
        let date = parse_date(&self.entry_date, "entry_date", "Data inválida")?;
        let mood = required(&self.mood, "mood", "Humor é obrigatório")?;
        let medication_taken = MedicationTaken::parse(self.medication_taken.trim())
            .ok_or_else(|| ValidationError::new("medication_taken", "Opção de medicação inválida"))?;
        let parent_observations =
            required(&self.parent_observations, "parent_observations", "Observações dos pais são obrigatórias")?;

        Ok(NewDiaryEntry {
            entry_date: date.format(DATE_FORMAT).to_string(),
            mood,
            behavior_observations: optional(&self.behavior_observations),
            medication_taken,
            medication_details: optional(&self.medication_details),
            activities_highlights: optional(&self.activities_highlights),
            parent_observations,
        })
    }
}

// ========================
// Reminder
// ========================

#[derive(Debug, Clone, PartialEq)]
pub struct ReminderForm {
    pub title: String,
    pub description: String,
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HH:MM`, 24-hour
    pub time: String,
    pub kind: String,
}

impl ReminderForm {
    /// Blank form for `today` at 09:00
    pub fn new(today: NaiveDate) -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            date: today.format(DATE_FORMAT).to_string(),
            time: "09:00".to_string(),
            kind: ReminderType::default().as_str().to_string(),
        }
    }

    /// Prefill from a stored reminder, shown in `offset`'s wall-clock time
    pub fn from_reminder(reminder: &Reminder, offset: FixedOffset) -> Self {
        let local = DateTime::parse_from_rfc3339(&reminder.reminder_time)
            .ok()
            .map(|t| t.with_timezone(&offset));
        Self {
            title: reminder.title.clone(),
            description: reminder.description.clone().unwrap_or_default(),
            date: local.map(|t| t.format(DATE_FORMAT).to_string()).unwrap_or_default(),
            time: local.map(|t| t.format("%H:%M").to_string()).unwrap_or_else(|| "09:00".to_string()),
            kind: reminder.kind.as_str().to_string(),
        }
    }

    /// Validate using the browser's current UTC offset
    pub fn validate(&self) -> Result<NewReminder, ValidationError> {
        self.validate_at(*Local::now().offset())
    }

    /// Validate, reading date and time as wall-clock time at `offset`;
    /// `reminder_time` is stored as a UTC instant
    pub fn validate_at(&self, offset: FixedOffset) -> Result<NewReminder, ValidationError> {
        let title = required(&self.title, "title", "Título é obrigatório")?;
        if self.date.trim().is_empty() {
            return Err(ValidationError::new("date", "Data é obrigatória"));
        }
        let date = parse_date(&self.date, "date", "Data inválida")?;
        let time = parse_clock(&self.time).ok_or_else(|| ValidationError::new("time", "Hora inválida (HH:MM)"))?;
        let kind = ReminderType::parse(self.kind.trim())
            .ok_or_else(|| ValidationError::new("kind", "Tipo é obrigatório"))?;

        let instant = offset
            .from_local_datetime(&date.and_time(time))
            .single()
            .ok_or_else(|| ValidationError::new("time", "Hora inválida (HH:MM)"))?;

        Ok(NewReminder {
            title,
            description: optional(&self.description),
            reminder_time: instant.with_timezone(&Utc).to_rfc3339_opts(SecondsFormat::Millis, true),
            kind,
            is_completed: false,
        })
    }
}
