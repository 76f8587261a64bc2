use events_errors::CategoryError;
use events_models::Category;
use json_store::{Collection, JsonStore, StoreError};
use tracing::instrument;

/// Read-mostly access to the category catalog. Clients never mutate it;
/// `insert` exists for seeding and fixtures.
#[derive(Clone)]
pub struct CategoryDao {
    categories: Collection<Category>,
}

impl CategoryDao {
    pub fn new(store: JsonStore) -> Self {
        Self {
            categories: store.collection("categories"),
        }
    }

    #[instrument(skip(self))]
    pub async fn find_by_id(
        &self, id: &str,
    ) -> Result<Category, CategoryError> {
        self.lookup(id).await?.ok_or_else(|| {
            CategoryError::NotFound {
                category_id: id.to_string(),
            }
        })
    }

    /// Expansion lookup: a dangling category id is not an error, the
    /// event simply renders without its category.
    #[instrument(skip(self))]
    pub async fn lookup(
        &self, id: &str,
    ) -> Result<Option<Category>, StoreError> {
        self.categories.find(|c| c.id == id).await
    }

    #[instrument(skip(self))]
    pub async fn all(&self) -> Result<Vec<Category>, StoreError> {
        self.categories.all().await
    }

    pub async fn insert(
        &self, category: &Category,
    ) -> Result<(), StoreError> {
        self.categories.insert(category).await
    }
}
