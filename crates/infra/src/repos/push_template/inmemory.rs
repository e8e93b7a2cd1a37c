use super::IPushTemplateRepo;
use crate::repos::shared::inmemory_repo::*;
use hicalendar_push_domain::{PushTemplate, TemplateType};

pub struct InMemoryPushTemplateRepo {
    templates: std::sync::Mutex<Vec<PushTemplate>>,
}

impl InMemoryPushTemplateRepo {
    pub fn new() -> Self {
        Self {
            templates: std::sync::Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl IPushTemplateRepo for InMemoryPushTemplateRepo {
    async fn insert(&self, template: &PushTemplate) -> anyhow::Result<()> {
        insert(template, &self.templates);
        Ok(())
    }

    async fn find_by_type(&self, template_type: TemplateType) -> anyhow::Result<Vec<PushTemplate>> {
        Ok(find_by(&self.templates, |t| t.template_type == template_type))
    }
}
