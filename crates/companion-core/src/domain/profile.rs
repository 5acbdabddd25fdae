//! Child Profile Entity
//!
//! A child followed by the authenticated parent/guardian.

use serde::{Deserialize, Serialize};

use super::entity::Entity;

/// ADHD severity as recorded on the profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdhdLevel {
    Leve,
    Moderado,
    Severo,
}

impl AdhdLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdhdLevel::Leve => "Leve",
            AdhdLevel::Moderado => "Moderado",
            AdhdLevel::Severo => "Severo",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Leve" => Some(AdhdLevel::Leve),
            "Moderado" => Some(AdhdLevel::Moderado),
            "Severo" => Some(AdhdLevel::Severo),
            _ => None,
        }
    }
}

/// Child profile as stored in `children`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildProfile {
    pub child_id: String,
    pub user_id: String,
    pub nome_crianca: String,
    /// Birth date, `YYYY-MM-DD`
    pub data_nascimento: String,
    #[serde(default)]
    pub diagnostico_tdah: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grau_tdah: Option<AdhdLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub informacoes_adicionais: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Entity for ChildProfile {
    fn id(&self) -> &str {
        &self.child_id
    }
}

/// Insert payload for a new child profile
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewChildProfile {
    pub nome_crianca: String,
    pub data_nascimento: String,
    pub diagnostico_tdah: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grau_tdah: Option<AdhdLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub informacoes_adicionais: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

/// Partial update for a child profile; unset fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChildProfilePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nome_crianca: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_nascimento: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostico_tdah: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grau_tdah: Option<AdhdLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub informacoes_adicionais: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}
