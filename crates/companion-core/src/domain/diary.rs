//! Diary Entry Entity
//!
//! Daily log of mood, behaviour and medication for one child.

use serde::{Deserialize, Serialize};

use super::entity::Entity;

/// Whether the child took medication that day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MedicationTaken {
    Sim,
    Nao,
    #[default]
    NaoAplica,
}

impl MedicationTaken {
    pub fn as_str(&self) -> &'static str {
        match self {
            MedicationTaken::Sim => "sim",
            MedicationTaken::Nao => "nao",
            MedicationTaken::NaoAplica => "nao_aplica",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "sim" => Some(MedicationTaken::Sim),
            "nao" => Some(MedicationTaken::Nao),
            "nao_aplica" => Some(MedicationTaken::NaoAplica),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MedicationTaken::Sim => "Sim",
            MedicationTaken::Nao => "Não",
            MedicationTaken::NaoAplica => "Não se aplica",
        }
    }
}

/// Diary entry as stored in `diary_entries`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiaryEntry {
    pub id: String,
    pub user_id: String,
    pub child_id: String,
    /// `YYYY-MM-DD`
    pub entry_date: String,
    pub mood: String,
    #[serde(default)]
    pub behavior_observations: Option<String>,
    pub medication_taken: MedicationTaken,
    #[serde(default)]
    pub medication_details: Option<String>,
    #[serde(default)]
    pub activities_highlights: Option<String>,
    pub parent_observations: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Entity for DiaryEntry {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Insert payload for a diary entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewDiaryEntry {
    pub entry_date: String,
    pub mood: String,
    pub behavior_observations: Option<String>,
    pub medication_taken: MedicationTaken,
    pub medication_details: Option<String>,
    pub activities_highlights: Option<String>,
    pub parent_observations: String,
}
