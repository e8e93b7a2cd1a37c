mod cleanup_push_data;
mod deliver_batch;
mod push_cron;
mod reconcile_batch;
mod run_push_scheduler;
mod select_due_batches;
mod send_test_push;
#[cfg(test)]
mod test_fakes;

use actix_web::web;
use push_cron::push_cron_controller;
use run_push_scheduler::run_push_scheduler_controller;
use send_test_push::send_test_push_controller;

pub use run_push_scheduler::RunPushSchedulerUseCase;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/push/scheduler",
        web::post().to(run_push_scheduler_controller),
    );
    cfg.route("/push/cron", web::post().to(push_cron_controller));
    cfg.route("/push/test", web::post().to(send_test_push_controller));
}
