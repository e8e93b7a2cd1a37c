mod inmemory;
mod postgres;

use hicalendar_push_domain::{PushTemplate, TemplateType};
pub use inmemory::InMemoryPushTemplateRepo;
pub use postgres::PostgresPushTemplateRepo;

#[async_trait::async_trait]
pub trait IPushTemplateRepo: Send + Sync {
    async fn insert(&self, template: &PushTemplate) -> anyhow::Result<()>;
    async fn find_by_type(&self, template_type: TemplateType) -> anyhow::Result<Vec<PushTemplate>>;
}
