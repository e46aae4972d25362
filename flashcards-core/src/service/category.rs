use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::repo::CategoryRepository;
use crate::validation::{require_non_blank, require_non_null};
use crate::{messages, Category, CategoryRequest, CoreError, CoreResult, Mapper};

pub struct CategoryService {
    repo: Arc<dyn CategoryRepository>,
    mapper: Mapper,
}

impl CategoryService {
    pub fn new(repo: Arc<dyn CategoryRepository>, mapper: Mapper) -> Self {
        Self { repo, mapper }
    }

    /// All categories, ascending by name (code-point order).
    pub async fn find_all(&self) -> CoreResult<Vec<Category>> {
        self.repo.find_all_by_order_by_name_asc().await
    }

    pub async fn find_by_id(&self, id: &str) -> CoreResult<Category> {
        require_non_blank(id, "Category ID")?;
        debug!(%id, "category lookup");
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| CoreError::NotFound(messages::category_not_found(id)))
    }

    pub async fn find_by_name(&self, name: &str) -> CoreResult<Category> {
        require_non_blank(name, "Category name")?;
        debug!(%name, "category lookup by name");
        self.repo
            .find_by_name(name)
            .await?
            .ok_or_else(|| CoreError::NotFound(messages::category_name_not_found(name)))
    }

    pub async fn exists_by_id(&self, id: &str) -> CoreResult<bool> {
        self.repo.exists_by_id(id).await
    }

    pub async fn assert_exists_by_id(&self, id: &str) -> CoreResult<()> {
        if self.repo.exists_by_id(id).await? {
            Ok(())
        } else {
            Err(CoreError::NotFound(messages::category_not_found(id)))
        }
    }

    pub async fn id_from_category_with_name(&self, name: &str) -> CoreResult<String> {
        Ok(self.find_by_name(name).await?.id)
    }

    pub async fn create_category(&self, request: Option<CategoryRequest>) -> CoreResult<Category> {
        let request = require_non_null(request)?;
        require_non_blank(&request.name, "Category name")?;
        if self.repo.exists_by_name(&request.name).await? {
            warn!(name = %request.name, "category name already taken");
            return Err(CoreError::Conflict(messages::category_name_exists(
                &request.name,
            )));
        }
        let category = self.mapper.category_from(request);
        let saved = self.repo.save(&category).await?;
        info!(id = %saved.id, name = %saved.name, "category created");
        Ok(saved)
    }

    /// Upsert by id. The name may only be held by this same id.
    pub async fn save(&self, category: Option<Category>) -> CoreResult<Category> {
        let category = require_non_null(category)?;
        require_non_blank(&category.id, "Category ID")?;
        require_non_blank(&category.name, "Category name")?;
        if let Some(holder) = self.repo.find_by_name(&category.name).await? {
            if holder.id != category.id {
                warn!(name = %category.name, holder = %holder.id, "category name already taken");
                return Err(CoreError::Conflict(messages::category_name_exists(
                    &category.name,
                )));
            }
        }
        let saved = self.repo.save(&category).await?;
        info!(id = %saved.id, "category saved");
        Ok(saved)
    }

    /// Deletes the category and, through the store, its sessions and flashcards.
    pub async fn delete_by_id(&self, id: &str) -> CoreResult<()> {
        self.assert_exists_by_id(id).await?;
        self.repo.delete_by_id(id).await?;
        info!(%id, "category deleted");
        Ok(())
    }
}
