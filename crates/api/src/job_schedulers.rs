use crate::{push::RunPushSchedulerUseCase, shared::usecase::execute};
use actix_web::rt::time::{interval, sleep_until, Instant};
use hicalendar_push_infra::PushContext;
use std::time::Duration;
use tracing::{error, info};

/// Seconds until `secs_before_min` seconds before the next full minute
pub fn get_start_delay(now_ts: usize, secs_before_min: usize) -> usize {
    let secs_to_next_minute = 60 - (now_ts / 1000) % 60;
    if secs_to_next_minute > secs_before_min {
        secs_to_next_minute - secs_before_min
    } else {
        secs_to_next_minute + (60 - secs_before_min)
    }
}

/// Runs the push scheduler in-process every `interval_secs`, starting at
/// the next full minute. Runs never overlap.
pub fn start_push_scheduler_job(ctx: PushContext, interval_secs: u64) {
    actix_web::rt::spawn(async move {
        let now = ctx.sys.get_timestamp_millis();
        let secs_to_next_run = get_start_delay(now as usize, 0);
        let start = Instant::now() + Duration::from_secs(secs_to_next_run as u64);
        info!(
            "Push scheduler job runs every {}s, first run in {}s",
            interval_secs, secs_to_next_run
        );

        sleep_until(start).await;
        let mut scheduler_interval = interval(Duration::from_secs(interval_secs));
        loop {
            scheduler_interval.tick().await;
            match execute(RunPushSchedulerUseCase, &ctx).await {
                Ok(summary) => info!(
                    "Scheduled push run: {} sent, {} failed of {} batches",
                    summary.sent, summary.failed, summary.total
                ),
                Err(e) => error!("Scheduled push run failed: {:?}", e),
            }
        }
    });
}
