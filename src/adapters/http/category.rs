use super::client::ApiClient;
use super::dto::{CategoryReadDto, CategoryWriteDto};
use crate::domain::{CategoryModel, DomainError, NewCategory};
use crate::ports::EntityApi;
use async_trait::async_trait;
use reqwest::Method;
use tracing::debug;

pub struct HttpCategoryApi {
    client: ApiClient,
}

impl HttpCategoryApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl EntityApi for HttpCategoryApi {
    type Entity = CategoryModel;
    type Draft = NewCategory;

    async fn fetch_all(&self) -> Result<Vec<CategoryModel>, DomainError> {
        let req = self
            .client
            .scoped(Method::GET, "/categories/", "get categories")?;
        let rows: Vec<CategoryReadDto> = self.client.send_json(req).await?;
        debug!(count = rows.len(), "categories fetched");
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn create(&self, draft: &NewCategory) -> Result<CategoryModel, DomainError> {
        let req = self
            .client
            .scoped(Method::POST, "/categories/", "create category")?
            .json(&CategoryWriteDto::from(draft));
        let created: CategoryReadDto = self.client.send_json(req).await?;
        Ok(created.into())
    }

    async fn update(&self, category: &CategoryModel) -> Result<(), DomainError> {
        let path = format!("/categories/{}", category.id);
        let req = self
            .client
            .scoped(Method::PATCH, &path, "update category")?
            .json(&CategoryWriteDto::from(category));
        self.client.send_empty(req).await
    }

    async fn delete(&self, category: &CategoryModel) -> Result<(), DomainError> {
        let path = format!("/categories/{}", category.id);
        let req = self
            .client
            .scoped(Method::DELETE, &path, "delete category")?;
        self.client.send_empty(req).await
    }
}
