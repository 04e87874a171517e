use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::skills::model::{
    OrderUpdate, PublicSkill, ReorderOutcome, Skill, SkillCategory, SkillGroup, SkillPatch,
};
use crate::skills::store::SkillStore;

/// Raw, unvalidated changes for an update call.
#[derive(Debug, Clone, Default)]
pub struct SkillUpdate {
    pub skill_name: Option<String>,
    pub percentage: Option<i64>,
    pub category: Option<String>,
    pub is_active: Option<bool>,
}

/// Ordered, categorized CRUD over skills.
#[derive(Clone)]
pub struct SkillRepository {
    store: Arc<dyn SkillStore>,
}

impl SkillRepository {
    pub fn new(store: Arc<dyn SkillStore>) -> Self {
        Self { store }
    }

    /// Active skills grouped by category for the public site.
    pub async fn list_public(&self) -> Result<Vec<SkillGroup>, AppError> {
        let mut skills = self.store.list(true).await?;
        sort_for_display(&mut skills);
        Ok(group_by_category(&skills))
    }

    pub async fn list_all(&self) -> Result<Vec<Skill>, AppError> {
        let mut skills = self.store.list(false).await?;
        sort_for_display(&mut skills);
        Ok(skills)
    }

    pub async fn create(
        &self,
        skill_name: &str,
        percentage: i64,
        category: &str,
    ) -> Result<Skill, AppError> {
        let skill_name = validate_name(skill_name)?;
        let percentage = validate_percentage(percentage)?;
        let category = validate_category(category)?;

        let order = self
            .store
            .max_order(category)
            .await?
            .map_or(0, |max| max + 1);

        let now = Utc::now();
        let skill = Skill {
            id: Uuid::new_v4(),
            skill_name,
            percentage,
            category,
            order,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.store.insert(&skill).await?;

        info!(
            "Created skill {} '{}' in {} at order {}",
            skill.id, skill.skill_name, skill.category, skill.order
        );
        Ok(skill)
    }

    pub async fn update(&self, id: Uuid, changes: SkillUpdate) -> Result<Skill, AppError> {
        let patch = SkillPatch {
            skill_name: changes.skill_name.as_deref().map(validate_name).transpose()?,
            percentage: changes.percentage.map(validate_percentage).transpose()?,
            category: changes.category.as_deref().map(validate_category).transpose()?,
            is_active: changes.is_active,
        };

        let skill = self
            .store
            .update(id, &patch)
            .await?
            .ok_or_else(|| AppError::NotFound("Skill not found".to_string()))?;

        info!("Updated skill {id}");
        Ok(skill)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        if !self.store.delete(id).await? {
            return Err(AppError::NotFound("Skill not found".to_string()));
        }
        info!("Deleted skill {id}");
        Ok(())
    }

    /// Applies each order update independently. Unknown or malformed ids are
    /// collected into `missing`; the remaining updates still go through.
    pub async fn reorder(&self, updates: &[OrderUpdate]) -> Result<ReorderOutcome, AppError> {
        let mut outcome = ReorderOutcome::default();

        for update in updates {
            let Ok(id) = Uuid::parse_str(update.id.trim()) else {
                outcome.missing.push(update.id.clone());
                continue;
            };
            if self.store.set_order(id, update.order).await? {
                outcome.updated += 1;
            } else {
                outcome.missing.push(update.id.clone());
            }
        }

        if !outcome.missing.is_empty() {
            warn!(
                "Reorder skipped {} unknown skill id(s): {:?}",
                outcome.missing.len(),
                outcome.missing
            );
        }
        info!("Reordered {} skill(s)", outcome.updated);
        Ok(outcome)
    }

    pub async fn count(&self) -> Result<i64, AppError> {
        self.store.count().await
    }

    /// Inserts a skill with an explicit order. Used by the seeder only.
    pub(crate) async fn insert_seeded(
        &self,
        skill_name: &str,
        percentage: i64,
        category: SkillCategory,
        order: i32,
    ) -> Result<(), AppError> {
        let now = Utc::now();
        let skill = Skill {
            id: Uuid::new_v4(),
            skill_name: validate_name(skill_name)?,
            percentage: validate_percentage(percentage)?,
            category,
            order,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.store.insert(&skill).await
    }
}

pub fn validate_percentage(percentage: i64) -> Result<i32, AppError> {
    if !(0..=100).contains(&percentage) {
        return Err(AppError::Validation(
            "Percentage must be between 0 and 100".to_string(),
        ));
    }
    Ok(percentage as i32)
}

pub fn validate_category(category: &str) -> Result<SkillCategory, AppError> {
    category
        .parse()
        .map_err(|e: crate::skills::model::UnknownCategory| AppError::Validation(e.to_string()))
}

fn validate_name(name: &str) -> Result<String, AppError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("Skill name cannot be empty".to_string()));
    }
    Ok(name.to_string())
}

/// Category label ascending, then order, then creation time.
pub fn sort_for_display(skills: &mut [Skill]) {
    skills.sort_by(|a, b| {
        a.category
            .as_str()
            .cmp(b.category.as_str())
            .then(a.order.cmp(&b.order))
            .then(a.created_at.cmp(&b.created_at))
    });
}

/// Groups already-sorted skills, one group per category in first-seen order.
pub fn group_by_category(skills: &[Skill]) -> Vec<SkillGroup> {
    let mut groups: Vec<SkillGroup> = Vec::new();
    for skill in skills {
        let entry = PublicSkill {
            skill_name: skill.skill_name.clone(),
            percentage: skill.percentage,
        };
        match groups.iter_mut().find(|g| g.label == skill.category) {
            Some(group) => group.data.push(entry),
            None => groups.push(SkillGroup {
                label: skill.category,
                data: vec![entry],
            }),
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemorySkillStore;

    fn repo() -> (SkillRepository, Arc<MemorySkillStore>) {
        let store = Arc::new(MemorySkillStore::default());
        (SkillRepository::new(store.clone()), store)
    }

    #[tokio::test]
    async fn test_create_assigns_next_order_in_category() {
        let (repo, _) = repo();
        let existing = repo.create("Java", 90, "BACK END").await.unwrap();
        assert_eq!(existing.order, 0);

        let go = repo.create("Go", 75, "BACK END").await.unwrap();
        assert_eq!(go.order, 1);
        assert_eq!(go.skill_name, "Go");
        assert_eq!(go.percentage, 75);
        assert_eq!(go.category, SkillCategory::BackEnd);
        assert!(go.is_active);
    }

    #[tokio::test]
    async fn test_create_order_is_per_category() {
        let (repo, _) = repo();
        repo.create("Java", 90, "BACK END").await.unwrap();
        repo.create("Python", 70, "BACK END").await.unwrap();
        let html = repo.create("HTML", 90, "FRONT END").await.unwrap();
        assert_eq!(html.order, 0);
    }

    #[tokio::test]
    async fn test_percentage_bounds() {
        let (repo, _) = repo();
        assert!(repo.create("Zero", 0, "OTHER").await.is_ok());
        assert!(repo.create("Full", 100, "OTHER").await.is_ok());
        assert!(matches!(
            repo.create("Neg", -1, "OTHER").await,
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            repo.create("Over", 101, "OTHER").await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_category_and_blank_name() {
        let (repo, store) = repo();
        assert!(matches!(
            repo.create("Rust", 80, "SYSTEMS").await,
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            repo.create("   ", 80, "OTHER").await,
            Err(AppError::Validation(_))
        ));
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_create_then_list_all_round_trip() {
        let (repo, _) = repo();
        let created = repo.create("  Rust ", 85, "BACK END").await.unwrap();
        let all = repo.list_all().await.unwrap();
        assert_eq!(all.len(), 1);
        let listed = &all[0];
        assert_eq!(listed, &created);
        assert_eq!(listed.skill_name, "Rust");
        assert!(listed.updated_at >= listed.created_at);
    }

    #[tokio::test]
    async fn test_update_applies_subset_and_refreshes_timestamp() {
        let (repo, _) = repo();
        let skill = repo.create("Rust", 60, "BACK END").await.unwrap();

        let updated = repo
            .update(
                skill.id,
                SkillUpdate {
                    percentage: Some(95),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.percentage, 95);
        assert_eq!(updated.skill_name, "Rust");
        assert_eq!(updated.category, SkillCategory::BackEnd);
        assert!(updated.updated_at >= skill.updated_at);
    }

    #[tokio::test]
    async fn test_update_validates_before_touching_store() {
        let (repo, _) = repo();
        let skill = repo.create("Rust", 60, "BACK END").await.unwrap();

        let result = repo
            .update(
                skill.id,
                SkillUpdate {
                    percentage: Some(150),
                    skill_name: Some("Renamed".into()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));

        let bad_category = repo
            .update(
                skill.id,
                SkillUpdate {
                    category: Some("MOBILE".into()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(bad_category, Err(AppError::Validation(_))));

        let all = repo.list_all().await.unwrap();
        assert_eq!(all[0].skill_name, "Rust");
        assert_eq!(all[0].percentage, 60);
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_not_found() {
        let (repo, _) = repo();
        let result = repo.update(Uuid::new_v4(), SkillUpdate::default()).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete() {
        let (repo, _) = repo();
        let skill = repo.create("Rust", 60, "BACK END").await.unwrap();
        repo.delete(skill.id).await.unwrap();
        assert!(repo.list_all().await.unwrap().is_empty());
        assert!(matches!(
            repo.delete(skill.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_list_public_hides_inactive_and_groups() {
        let (repo, _) = repo();
        repo.create("HTML", 90, "FRONT END").await.unwrap();
        let hidden = repo.create("CSS", 85, "FRONT END").await.unwrap();
        repo.create("Java", 90, "BACK END").await.unwrap();
        repo.create("Git", 85, "TOOLS").await.unwrap();
        repo.update(
            hidden.id,
            SkillUpdate {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let groups = repo.list_public().await.unwrap();
        let labels: Vec<_> = groups.iter().map(|g| g.label).collect();
        assert_eq!(
            labels,
            vec![
                SkillCategory::BackEnd,
                SkillCategory::FrontEnd,
                SkillCategory::Tools
            ]
        );
        let front: Vec<_> = groups[1].data.iter().map(|s| s.skill_name.as_str()).collect();
        assert_eq!(front, vec!["HTML"]);
        assert!(groups
            .iter()
            .flat_map(|g| g.data.iter())
            .all(|s| s.skill_name != "CSS"));
    }

    #[tokio::test]
    async fn test_list_public_empty() {
        let (repo, _) = repo();
        assert!(repo.list_public().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reorder_applies_known_and_reports_missing() {
        let (repo, _) = repo();
        let a = repo.create("A", 50, "TOOLS").await.unwrap();
        let b = repo.create("B", 50, "TOOLS").await.unwrap();
        let ghost = Uuid::new_v4().to_string();

        let outcome = repo
            .reorder(&[
                OrderUpdate {
                    id: a.id.to_string(),
                    order: 5,
                },
                OrderUpdate {
                    id: ghost.clone(),
                    order: 1,
                },
                OrderUpdate {
                    id: "not-a-uuid".to_string(),
                    order: 2,
                },
                OrderUpdate {
                    id: b.id.to_string(),
                    order: 0,
                },
            ])
            .await
            .unwrap();

        assert_eq!(outcome.updated, 2);
        assert_eq!(outcome.missing, vec![ghost, "not-a-uuid".to_string()]);

        let names: Vec<_> = repo
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.skill_name)
            .collect();
        assert_eq!(names, vec!["B", "A"]);
    }

    #[test]
    fn test_sort_breaks_order_ties_by_creation() {
        let now = Utc::now();
        let make = |name: &str, offset: i64| Skill {
            id: Uuid::new_v4(),
            skill_name: name.to_string(),
            percentage: 50,
            category: SkillCategory::Other,
            order: 0,
            is_active: true,
            created_at: now + chrono::Duration::seconds(offset),
            updated_at: now,
        };
        let mut skills = vec![make("late", 10), make("early", 0)];
        sort_for_display(&mut skills);
        assert_eq!(skills[0].skill_name, "early");
    }
}
