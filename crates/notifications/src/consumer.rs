//! Per-topic notification consumers.
//!
//! One worker thread per queue, competing-consumer semantics, and two
//! distinct failure modes:
//!
//! - `job.posted` fans out to a per-event recipient list. Individual
//!   failures are caught and tallied; the message is always acked and never
//!   retried, so one bad address cannot hold the queue hostage.
//! - `application.submitted` and `application.status.changed` are all-or-
//!   nothing. Any failed delivery fails the whole message, which is
//!   requeued with backoff until the retry policy gives up and the message
//!   is dead-lettered. Redelivery repeats every delivery in the message, so
//!   duplicates are possible; that is the accepted tradeoff.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use serde::Serialize;
use tracing::{error, info, warn};

use hireboard_events::{
    ApplicationStatusChanged, ApplicationSubmitted, Delivery, JobPosted, MessageBroker,
    QueueSubscription, RetryPolicy, routing_keys,
};

use crate::messages;
use crate::sink::{DeliveryError, DeliverySink};

/// Outcome of one `job.posted` fan-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FanOutSummary {
    pub total: usize,
    pub delivered: usize,
    pub failed: usize,
}

/// Event -> deliveries mapping, independent of any queue plumbing.
pub struct NotificationHandlers {
    sink: Arc<dyn DeliverySink>,
}

impl NotificationHandlers {
    pub fn new(sink: Arc<dyn DeliverySink>) -> Self {
        Self { sink }
    }

    /// One delivery attempt per recipient; failures are counted, not
    /// propagated, and never abort the loop.
    pub fn job_posted(&self, event: &JobPosted) -> FanOutSummary {
        let mut summary = FanOutSummary {
            total: event.recipient_emails.len(),
            delivered: 0,
            failed: 0,
        };

        for recipient in &event.recipient_emails {
            let notification = messages::job_posted(
                recipient,
                &event.title,
                &event.company_name,
                &event.location,
            );
            match self.sink.deliver(&notification) {
                Ok(()) => summary.delivered += 1,
                Err(e) => {
                    warn!(recipient = %recipient, error = %e, "job-posted delivery failed");
                    summary.failed += 1;
                }
            }
        }

        summary
    }

    /// Confirmation to the applicant, alert to the employer. The first
    /// failure aborts so the broker-side retry can run the pair again.
    pub fn application_submitted(&self, event: &ApplicationSubmitted) -> Result<(), DeliveryError> {
        self.sink.deliver(&messages::application_submitted(
            &event.applicant_email,
            &event.job_title,
            &event.company_name,
        ))?;

        self.sink.deliver(&messages::application_received(
            &event.employer_email,
            &event.job_title,
            &event.applicant_username,
        ))?;

        Ok(())
    }

    pub fn application_status_changed(
        &self,
        event: &ApplicationStatusChanged,
    ) -> Result<(), DeliveryError> {
        self.sink.deliver(&messages::status_changed(
            &event.applicant_email,
            &event.job_title,
            &event.company_name,
            &event.old_status,
            &event.new_status,
        ))
    }
}

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct ConsumerConfig {
    pub name: String,
    pub poll_interval: Duration,
    pub retry: RetryPolicy,
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self {
            name: "notification-worker".to_string(),
            poll_interval: Duration::from_millis(100),
            retry: RetryPolicy::default(),
        }
    }
}

/// Worker runtime counters.
#[derive(Debug, Clone, Default, Serialize)]
pub struct WorkerStats {
    pub processed: u64,
    pub acked: u64,
    pub requeued: u64,
    pub dead_lettered: u64,
    pub deliveries_attempted: u64,
    pub deliveries_failed: u64,
}

/// Handle to a running worker; dropping it leaves the threads running,
/// `shutdown` joins them.
pub struct WorkerHandle {
    stop: Arc<AtomicBool>,
    joins: Vec<thread::JoinHandle<()>>,
    stats: Arc<Mutex<WorkerStats>>,
}

impl WorkerHandle {
    pub fn shutdown(mut self) {
        self.stop.store(true, Ordering::Relaxed);
        for join in self.joins.drain(..) {
            let _ = join.join();
        }
    }

    pub fn stats(&self) -> WorkerStats {
        self.stats
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }
}

fn bump(stats: &Mutex<WorkerStats>, f: impl FnOnce(&mut WorkerStats)) {
    let mut s = stats.lock().unwrap_or_else(|p| p.into_inner());
    f(&mut s);
}

/// Spawns the three per-topic consumer threads.
pub struct NotificationWorker;

impl NotificationWorker {
    pub fn spawn(
        broker: &dyn MessageBroker,
        sink: Arc<dyn DeliverySink>,
        config: ConsumerConfig,
    ) -> WorkerHandle {
        let stop = Arc::new(AtomicBool::new(false));
        let stats = Arc::new(Mutex::new(WorkerStats::default()));
        let handlers = Arc::new(NotificationHandlers::new(sink));

        let mut joins = Vec::with_capacity(3);

        {
            let handlers = handlers.clone();
            let stats = stats.clone();
            joins.push(run_queue(
                format!("{}-job-posted", config.name),
                broker.bind(routing_keys::JOB_POSTED),
                stop.clone(),
                config.poll_interval,
                move |sub, delivery| {
                    bump(&stats, |s| s.processed += 1);
                    match delivery.envelope.decode::<JobPosted>() {
                        Ok(event) => {
                            if event.recipient_emails.is_empty() {
                                info!(job_id = %event.job_id, "job-posted event has no recipients");
                            } else {
                                let summary = handlers.job_posted(&event);
                                info!(
                                    job_id = %event.job_id,
                                    total = summary.total,
                                    delivered = summary.delivered,
                                    failed = summary.failed,
                                    "job-posted fan-out finished"
                                );
                                bump(&stats, |s| {
                                    s.deliveries_attempted += summary.total as u64;
                                    s.deliveries_failed += summary.failed as u64;
                                });
                            }
                            bump(&stats, |s| s.acked += 1);
                        }
                        Err(e) => dead_letter_poison(sub, delivery, &e, &stats),
                    }
                },
            ));
        }

        {
            let handlers = handlers.clone();
            let stats = stats.clone();
            let retry = config.retry.clone();
            joins.push(run_queue(
                format!("{}-application-submitted", config.name),
                broker.bind(routing_keys::APPLICATION_SUBMITTED),
                stop.clone(),
                config.poll_interval,
                move |sub, delivery| {
                    bump(&stats, |s| s.processed += 1);
                    match delivery.envelope.decode::<ApplicationSubmitted>() {
                        Ok(event) => {
                            let result = handlers.application_submitted(&event);
                            settle(sub, delivery, result, &retry, &stats);
                        }
                        Err(e) => dead_letter_poison(sub, delivery, &e, &stats),
                    }
                },
            ));
        }

        {
            let handlers = handlers.clone();
            let stats = stats.clone();
            let retry = config.retry.clone();
            joins.push(run_queue(
                format!("{}-status-changed", config.name),
                broker.bind(routing_keys::APPLICATION_STATUS_CHANGED),
                stop.clone(),
                config.poll_interval,
                move |sub, delivery| {
                    bump(&stats, |s| s.processed += 1);
                    match delivery.envelope.decode::<ApplicationStatusChanged>() {
                        Ok(event) => {
                            let result = handlers.application_status_changed(&event);
                            settle(sub, delivery, result, &retry, &stats);
                        }
                        Err(e) => dead_letter_poison(sub, delivery, &e, &stats),
                    }
                },
            ));
        }

        info!(worker = %config.name, "notification worker started");

        WorkerHandle { stop, joins, stats }
    }
}

fn run_queue(
    name: String,
    sub: QueueSubscription,
    stop: Arc<AtomicBool>,
    poll_interval: Duration,
    process: impl Fn(&QueueSubscription, Delivery) + Send + 'static,
) -> thread::JoinHandle<()> {
    thread::Builder::new()
        .name(name)
        .spawn(move || {
            while !stop.load(Ordering::Relaxed) {
                if let Some(delivery) = sub.recv_timeout(poll_interval) {
                    process(&sub, delivery);
                }
            }
        })
        .expect("failed to spawn notification worker thread")
}

/// Ack on success; on failure, requeue with backoff until the policy is
/// exhausted, then dead-letter.
fn settle(
    sub: &QueueSubscription,
    delivery: Delivery,
    result: Result<(), DeliveryError>,
    retry: &RetryPolicy,
    stats: &Mutex<WorkerStats>,
) {
    bump(stats, |s| s.deliveries_attempted += 1);
    match result {
        Ok(()) => bump(stats, |s| s.acked += 1),
        Err(e) => {
            bump(stats, |s| s.deliveries_failed += 1);
            let attempt = delivery.attempt;
            if retry.should_retry(attempt) {
                let delay = retry.delay_after_attempt(attempt);
                warn!(
                    routing_key = delivery.envelope.routing_key(),
                    attempt,
                    error = %e,
                    "delivery failed, requeueing"
                );
                sub.requeue(delivery, delay);
                bump(stats, |s| s.requeued += 1);
            } else {
                error!(
                    routing_key = delivery.envelope.routing_key(),
                    attempts = attempt,
                    error = %e,
                    "delivery failed, retries exhausted, dead-lettering"
                );
                sub.dead_letter(delivery, e.to_string());
                bump(stats, |s| s.dead_lettered += 1);
            }
        }
    }
}

fn dead_letter_poison(
    sub: &QueueSubscription,
    delivery: Delivery,
    e: &serde_json::Error,
    stats: &Mutex<WorkerStats>,
) {
    error!(
        routing_key = delivery.envelope.routing_key(),
        error = %e,
        "undecodable payload, dead-lettering"
    );
    sub.dead_letter(delivery, format!("undecodable payload: {e}"));
    bump(stats, |s| s.dead_lettered += 1);
}
