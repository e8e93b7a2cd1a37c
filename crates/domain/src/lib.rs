mod batch;
mod device;
mod evaluator;
mod event;
mod push_log;
mod reminder;
mod shared;
mod template;

pub use batch::{group_due_reminders, DueReminderGroup, NotificationBatch};
pub use device::{token_prefix, DeviceToken, DEFAULT_PLATFORM};
pub use evaluator::{due_kinds, is_due};
pub use event::{days_until, PushEvent, MILLIS_PER_DAY};
pub use push_log::{PushLogEntry, PushLogStatus};
pub use reminder::{InvalidReminderKindError, ReminderKind, SentStatus, TemplateType};
pub use shared::entity::{Entity, InvalidIDError, ID};
pub use template::{render_message, PushTemplate, MAX_LISTED_TITLES, TITLE_PLACEHOLDER};
