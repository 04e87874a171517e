use tracing::info;

use crate::errors::AppError;
use crate::skills::model::SkillCategory;
use crate::skills::repository::SkillRepository;

const DEFAULT_SKILLS: &[(&str, i64, SkillCategory)] = &[
    ("HTML", 90, SkillCategory::FrontEnd),
    ("CSS", 85, SkillCategory::FrontEnd),
    ("JavaScript", 80, SkillCategory::FrontEnd),
    ("React", 85, SkillCategory::FrontEnd),
    ("SCSS/Sass", 75, SkillCategory::FrontEnd),
    ("Java", 90, SkillCategory::BackEnd),
    ("Python", 70, SkillCategory::BackEnd),
    ("Node.js", 75, SkillCategory::BackEnd),
    ("Express.js", 80, SkillCategory::BackEnd),
    ("MongoDB", 85, SkillCategory::Database),
    ("SQL", 80, SkillCategory::Database),
    ("MySQL", 75, SkillCategory::Database),
    ("Git", 85, SkillCategory::Tools),
    ("GitHub", 90, SkillCategory::Tools),
    ("VS Code", 95, SkillCategory::Tools),
    ("Postman", 80, SkillCategory::Tools),
];

/// Seeds the default skill set into an empty store. Returns how many were inserted.
/// Existing data is never touched.
pub async fn seed_defaults(repo: &SkillRepository) -> Result<usize, AppError> {
    let existing = repo.count().await?;
    if existing > 0 {
        info!("Skipping skill seed: {existing} skill(s) already present");
        return Ok(0);
    }

    let mut next_order: Vec<(SkillCategory, i32)> = Vec::new();
    for &(name, percentage, category) in DEFAULT_SKILLS {
        let order = match next_order.iter_mut().find(|(c, _)| *c == category) {
            Some((_, n)) => {
                *n += 1;
                *n
            }
            None => {
                next_order.push((category, 0));
                0
            }
        };
        repo.insert_seeded(name, percentage, category, order).await?;
    }

    info!("Seeded {} default skills", DEFAULT_SKILLS.len());
    Ok(DEFAULT_SKILLS.len())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::testing::MemorySkillStore;

    #[tokio::test]
    async fn test_seed_into_empty_store() {
        let repo = SkillRepository::new(Arc::new(MemorySkillStore::default()));
        let inserted = seed_defaults(&repo).await.unwrap();
        assert_eq!(inserted, DEFAULT_SKILLS.len());

        let all = repo.list_all().await.unwrap();
        let tools: Vec<_> = all
            .iter()
            .filter(|s| s.category == SkillCategory::Tools)
            .map(|s| (s.skill_name.as_str(), s.order))
            .collect();
        assert_eq!(
            tools,
            vec![("Git", 0), ("GitHub", 1), ("VS Code", 2), ("Postman", 3)]
        );
    }

    #[tokio::test]
    async fn test_seed_skips_non_empty_store() {
        let repo = SkillRepository::new(Arc::new(MemorySkillStore::default()));
        repo.create("Rust", 80, "BACK END").await.unwrap();
        assert_eq!(seed_defaults(&repo).await.unwrap(), 0);
        assert_eq!(repo.count().await.unwrap(), 1);
    }
}
