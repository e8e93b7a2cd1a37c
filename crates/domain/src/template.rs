use crate::event::PushEvent;
use crate::reminder::{ReminderKind, TemplateType};
use rand::seq::SliceRandom;
use rand::Rng;

/// Placeholder replaced by the event title in a `PushTemplate`
pub const TITLE_PLACEHOLDER: &str = "{title}";
/// Titles listed in a notification covering several events
pub const MAX_LISTED_TITLES: usize = 3;

/// A stored phrasing for single-event notifications of one reminder kind.
#[derive(Debug, Clone, PartialEq)]
pub struct PushTemplate {
    pub template_type: TemplateType,
    pub template: String,
}

impl PushTemplate {
    pub fn new(template_type: TemplateType, template: impl Into<String>) -> Self {
        Self {
            template_type,
            template: template.into(),
        }
    }

    pub fn render(&self, title: &str) -> String {
        self.template.replacen(TITLE_PLACEHOLDER, title, 1)
    }
}

fn quoted(title: &str) -> String {
    format!("「{}」", title)
}

fn single_event_fallback(event: &PushEvent, kind: ReminderKind) -> String {
    let title = &event.title;
    if event.is_timed() {
        match kind {
            ReminderKind::OneDay => format!("明天「{}」，别又临时找借口说忘了！", title),
            ReminderKind::OneWeek => {
                format!("一周后「{}」，现在不准备待会儿又手忙脚乱？", title)
            }
            _ => format!("「{}」提醒", title),
        }
    } else {
        match kind {
            ReminderKind::OneDay => {
                format!("别忘了「{}」这事儿，拖了这么久该动手了吧？", title)
            }
            ReminderKind::OneWeek => format!("「{}」都一周了还没搞，再不动手就凉了！", title),
            _ => format!("「{}」该处理了", title),
        }
    }
}

fn multi_event_message(events: &[PushEvent], kind: ReminderKind) -> String {
    let count = events.len();
    let titles = events
        .iter()
        .take(MAX_LISTED_TITLES)
        .map(|e| quoted(&e.title))
        .collect::<Vec<_>>()
        .join("、");

    if events.iter().all(|e| e.is_timed()) {
        match kind {
            ReminderKind::OneDay => format!("明天{}等{}件事等着，忙死你了吧？", titles, count),
            ReminderKind::OneWeek => {
                format!("下周{}等{}个安排，别到时候又说没时间！", titles, count)
            }
            _ => format!("{}件事提醒", count),
        }
    } else {
        match kind {
            ReminderKind::OneDay => format!(
                "{}等{}件事，有的该做了，有的明天要开始，别都堆一块儿！",
                titles, count
            ),
            ReminderKind::OneWeek => {
                format!("{}等{}个安排，该准备的准备，该处理的处理！", titles, count)
            }
            _ => format!("{}件事需要关注", count),
        }
    }
}

/// Renders the notification body for the events of one batch.
///
/// A single event uses a random template of the kind's pool when one exists,
/// otherwise a built-in phrasing that differs for timed and undated items.
/// Several events always use the built-in plural phrasing.
pub fn render_message<R: Rng + ?Sized>(
    events: &[PushEvent],
    kind: ReminderKind,
    templates: &[PushTemplate],
    rng: &mut R,
) -> String {
    match events {
        [event] => {
            let pool = templates
                .iter()
                .filter(|t| Some(t.template_type) == kind.template_type())
                .collect::<Vec<_>>();
            match pool.choose(rng) {
                Some(template) => template.render(&event.title),
                None => single_event_fallback(event, kind),
            }
        }
        _ => multi_event_message(events, kind),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::ID;
    use chrono::Utc;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn timed(title: &str) -> PushEvent {
        let mut e = PushEvent::new(ID::default(), title);
        e.start_at = Some(Utc::now());
        e
    }

    fn undated(title: &str) -> PushEvent {
        PushEvent::new(ID::default(), title)
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn single_timed_event_fallback() {
        let msg = render_message(&[timed("开会")], ReminderKind::OneDay, &[], &mut rng());
        assert_eq!(msg, "明天「开会」，别又临时找借口说忘了！");
    }

    #[test]
    fn single_undated_event_fallback() {
        let msg = render_message(&[undated("交房租")], ReminderKind::OneDay, &[], &mut rng());
        assert_eq!(msg, "别忘了「交房租」这事儿，拖了这么久该动手了吧？");
        let msg = render_message(&[undated("交房租")], ReminderKind::OneWeek, &[], &mut rng());
        assert_eq!(msg, "「交房租」都一周了还没搞，再不动手就凉了！");
    }

    #[test]
    fn single_event_uses_pool_of_matching_kind() {
        let templates = vec![
            PushTemplate::new(TemplateType::WeekBefore, "week {title}"),
            PushTemplate::new(TemplateType::DayBefore, "day {title} ({title})"),
        ];
        let msg = render_message(&[timed("Gym")], ReminderKind::OneDay, &templates, &mut rng());
        assert_eq!(msg, "day Gym ({title})");
    }

    #[test]
    fn random_choice_stays_within_pool() {
        let templates = vec![
            PushTemplate::new(TemplateType::DayBefore, "one {title}"),
            PushTemplate::new(TemplateType::DayBefore, "two {title}"),
        ];
        let mut rng = rng();
        for _ in 0..20 {
            let msg = render_message(&[timed("X")], ReminderKind::OneDay, &templates, &mut rng);
            assert!(msg == "one X" || msg == "two X");
        }
    }

    #[test]
    fn multiple_events_ignore_pool_and_list_titles() {
        let templates = vec![PushTemplate::new(TemplateType::DayBefore, "{title}")];
        let msg = render_message(
            &[timed("A"), timed("B")],
            ReminderKind::OneDay,
            &templates,
            &mut rng(),
        );
        assert_eq!(msg, "明天「A」、「B」等2件事等着，忙死你了吧？");
    }

    #[test]
    fn lists_at_most_three_titles_with_total_count() {
        let events = vec![timed("A"), timed("B"), timed("C"), timed("D"), timed("E")];
        let msg = render_message(&events, ReminderKind::OneWeek, &[], &mut rng());
        assert_eq!(msg, "下周「A」、「B」、「C」等5个安排，别到时候又说没时间！");
    }

    #[test]
    fn mixed_batch_uses_mixed_phrasing() {
        let events = vec![timed("A"), undated("B")];
        let msg = render_message(&events, ReminderKind::OneDay, &[], &mut rng());
        assert_eq!(msg, "「A」、「B」等2件事，有的该做了，有的明天要开始，别都堆一块儿！");
    }
}
