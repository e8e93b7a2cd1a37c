use crate::shared::usecase::UseCase;
use chrono::{DateTime, Utc};
use hicalendar_push_domain::{
    group_due_reminders, render_message, token_prefix, NotificationBatch, PushTemplate,
    ReminderKind,
};
use hicalendar_push_infra::PushContext;
use std::collections::HashMap;
use tracing::{info, warn};

/// Builds this run's notification batches: one per user and due reminder
/// kind, each with its rendered message and the user's active devices.
#[derive(Debug)]
pub struct SelectDueBatchesUseCase {
    pub now: DateTime<Utc>,
}

#[derive(Debug)]
pub enum UseCaseError {
    CandidateQuery(String),
}

async fn load_templates(ctx: &PushContext, kind: ReminderKind) -> Vec<PushTemplate> {
    let template_type = match kind.template_type() {
        Some(t) => t,
        None => return Vec::new(),
    };
    match ctx.repos.push_templates.find_by_type(template_type).await {
        Ok(templates) => templates,
        Err(e) => {
            warn!(
                "Unable to load {} templates, using built-in phrasing. Error: {:?}",
                template_type.as_str(),
                e
            );
            Vec::new()
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for SelectDueBatchesUseCase {
    type Response = Vec<NotificationBatch>;

    type Errors = UseCaseError;

    #[tracing::instrument(name = "SelectDueBatches", skip(self, ctx))]
    async fn execute(&mut self, ctx: &PushContext) -> Result<Self::Response, Self::Errors> {
        let events = ctx
            .repos
            .events
            .find_push_candidates()
            .await
            .map_err(|e| UseCaseError::CandidateQuery(e.to_string()))?;

        let groups = group_due_reminders(&events, self.now);
        info!(
            "Found {} due reminder groups among {} candidate events",
            groups.len(),
            events.len()
        );

        let mut templates: HashMap<ReminderKind, Vec<PushTemplate>> = HashMap::new();
        let mut batches = Vec::with_capacity(groups.len());
        for group in groups {
            let device_tokens = match ctx.repos.devices.find_active_tokens(&group.user_id).await {
                Ok(tokens) if !tokens.is_empty() => tokens,
                Ok(_) => {
                    warn!(
                        "No active device tokens for user {}, skipping {} reminder",
                        group.user_id, group.kind
                    );
                    continue;
                }
                Err(e) => {
                    warn!(
                        "Unable to load device tokens of user {}, skipping {} reminder. Error: {:?}",
                        group.user_id, group.kind, e
                    );
                    continue;
                }
            };

            if !templates.contains_key(&group.kind) {
                let pool = load_templates(ctx, group.kind).await;
                templates.insert(group.kind, pool);
            }
            let pool = templates.get(&group.kind).map(|p| p.as_slice()).unwrap_or(&[]);
            let message = render_message(&group.events, group.kind, pool, &mut rand::thread_rng());

            info!(
                "Batch for user {}: {} {} events to {} devices ({}...)",
                group.user_id,
                group.events.len(),
                group.kind,
                device_tokens.len(),
                token_prefix(&device_tokens[0])
            );
            batches.push(NotificationBatch::new(group, message, device_tokens));
        }

        Ok(batches)
    }
}
