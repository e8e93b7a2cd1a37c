use super::IPushTemplateRepo;
use hicalendar_push_domain::{PushTemplate, TemplateType};
use sqlx::{FromRow, PgPool};

pub struct PostgresPushTemplateRepo {
    pool: PgPool,
}

impl PostgresPushTemplateRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct PushTemplateRaw {
    template: String,
}

#[async_trait::async_trait]
impl IPushTemplateRepo for PostgresPushTemplateRepo {
    async fn insert(&self, template: &PushTemplate) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO push_templates(type, template)
            VALUES($1, $2)
            "#,
        )
        .bind(template.template_type.as_str())
        .bind(&template.template)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_type(&self, template_type: TemplateType) -> anyhow::Result<Vec<PushTemplate>> {
        let templates: Vec<PushTemplateRaw> = sqlx::query_as(
            r#"
            SELECT t.template FROM push_templates AS t
            WHERE t.type = $1
            ORDER BY t.id
            "#,
        )
        .bind(template_type.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(templates
            .into_iter()
            .map(|t| PushTemplate::new(template_type, t.template))
            .collect())
    }
}
