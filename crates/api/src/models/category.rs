//! Product category model.

use serde::Serialize;

use tricity_core::CategoryId;

/// A catalog category.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

/// Frontend-facing category: camelCase fields plus the `image_url` alias.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryView {
    pub id: CategoryId,
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "imageUrl")]
    pub image_url_camel: Option<String>,
    pub image_url: Option<String>,
}

impl From<Category> for CategoryView {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            name: category.name,
            description: category.description,
            image_url_camel: category.image_url.clone(),
            image_url: category.image_url,
        }
    }
}
