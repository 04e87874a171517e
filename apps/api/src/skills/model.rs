use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Fixed display buckets a skill can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkillCategory {
    #[serde(rename = "FRONT END")]
    FrontEnd,
    #[serde(rename = "BACK END")]
    BackEnd,
    #[serde(rename = "DATABASE")]
    Database,
    #[serde(rename = "TOOLS")]
    Tools,
    #[serde(rename = "OTHER")]
    Other,
}

impl SkillCategory {
    pub const ALL: [SkillCategory; 5] = [
        SkillCategory::FrontEnd,
        SkillCategory::BackEnd,
        SkillCategory::Database,
        SkillCategory::Tools,
        SkillCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SkillCategory::FrontEnd => "FRONT END",
            SkillCategory::BackEnd => "BACK END",
            SkillCategory::Database => "DATABASE",
            SkillCategory::Tools => "TOOLS",
            SkillCategory::Other => "OTHER",
        }
    }
}

impl fmt::Display for SkillCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCategory(pub String);

impl fmt::Display for UnknownCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let allowed: Vec<&str> = SkillCategory::ALL.iter().map(|c| c.as_str()).collect();
        write!(
            f,
            "Category '{}' is not one of: {}",
            self.0,
            allowed.join(", ")
        )
    }
}

impl std::error::Error for UnknownCategory {}

impl FromStr for SkillCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SkillCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    pub id: Uuid,
    pub skill_name: String,
    pub percentage: i32,
    pub category: SkillCategory,
    pub order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row shape of the `skills` table. Category is stored as its display label.
#[derive(Debug, Clone, FromRow)]
pub struct SkillRow {
    pub id: Uuid,
    pub skill_name: String,
    pub percentage: i32,
    pub category: String,
    pub sort_order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<SkillRow> for Skill {
    type Error = UnknownCategory;

    fn try_from(row: SkillRow) -> Result<Self, Self::Error> {
        Ok(Skill {
            id: row.id,
            skill_name: row.skill_name,
            percentage: row.percentage,
            category: row.category.parse()?,
            order: row.sort_order,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Validated field changes for an update. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SkillPatch {
    pub skill_name: Option<String>,
    pub percentage: Option<i32>,
    pub category: Option<SkillCategory>,
    pub is_active: Option<bool>,
}

impl SkillPatch {
    pub fn apply(&self, skill: &mut Skill) {
        if let Some(name) = &self.skill_name {
            skill.skill_name = name.clone();
        }
        if let Some(percentage) = self.percentage {
            skill.percentage = percentage;
        }
        if let Some(category) = self.category {
            skill.category = category;
        }
        if let Some(is_active) = self.is_active {
            skill.is_active = is_active;
        }
    }
}

/// Public projection of a skill inside a category group.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PublicSkill {
    pub skill_name: String,
    pub percentage: i32,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SkillGroup {
    pub label: SkillCategory,
    pub data: Vec<PublicSkill>,
}

/// One entry of a reorder batch. The id stays a string so malformed ids
/// can be reported back instead of failing the whole batch.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderUpdate {
    pub id: String,
    pub order: i32,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ReorderOutcome {
    pub updated: usize,
    pub missing: Vec<String>,
}
