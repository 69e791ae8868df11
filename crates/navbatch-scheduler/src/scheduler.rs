use std::sync::{Arc, Mutex, MutexGuard};

use navbatch_merge::merge_batch;
use navbatch_types::{MutationDescriptor, NavigationRequest, UrlState};
use tokio::runtime::{Handle, RuntimeFlavor};
use tokio::sync::broadcast;
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, error, info, warn};

use crate::config::ScopeConfig;
use crate::error::{BatchError, Result};
use crate::event::{FlushEvent, FlushStream};
use crate::navigator::Navigator;
use crate::queue::MutationQueue;

/// Observable state of a [`BatchScheduler`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchedulerPhase {
    /// Nothing queued, no flush armed.
    Idle,
    /// A flush is armed for the end of the current tick.
    FlushScheduled,
    /// The owning scope is gone. Terminal.
    TornDown,
}

enum Phase {
    Idle,
    Scheduled { ticket: u64, abort: AbortHandle },
    TornDown,
}

type FlushTask = JoinHandle<Result<Option<NavigationRequest>>>;

struct State {
    queue: MutationQueue,
    phase: Phase,
    next_ticket: u64,
    in_flight: Option<FlushTask>,
}

impl State {
    fn observed(&self) -> SchedulerPhase {
        match self.phase {
            Phase::Idle => SchedulerPhase::Idle,
            Phase::Scheduled { .. } => SchedulerPhase::FlushScheduled,
            Phase::TornDown => SchedulerPhase::TornDown,
        }
    }

    fn armed_ticket(&self) -> Option<u64> {
        match &self.phase {
            Phase::Scheduled { ticket, .. } => Some(*ticket),
            Phase::Idle | Phase::TornDown => None,
        }
    }
}

struct Shared {
    navigator: Arc<dyn Navigator>,
    config: ScopeConfig,
    state: Mutex<State>,
    events: broadcast::Sender<FlushEvent>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().expect("scheduler lock poisoned")
    }

    /// Merge `batch` over the location as of now and navigate once.
    async fn flush(&self, batch: Vec<MutationDescriptor>) -> Result<Option<NavigationRequest>> {
        let baseline = self.navigator.current();
        let Some(request) = merge_batch(&baseline, &batch) else {
            return Ok(None);
        };

        debug!(
            scope = %self.config.name,
            batch = batch.len(),
            kind = %request.kind,
            href = %request.url,
            "flushing batch"
        );

        match self.navigator.navigate(&request).await {
            Ok(()) => {
                let _ = self.events.send(FlushEvent::Navigated {
                    request: request.clone(),
                });
                Ok(Some(request))
            }
            Err(err) => {
                error!(
                    scope = %self.config.name,
                    href = %request.url,
                    error = %err,
                    "navigation failed"
                );
                let _ = self.events.send(FlushEvent::Failed {
                    request,
                    error: err.clone(),
                });
                Err(err.into())
            }
        }
    }
}

/// Runs at the tick boundary. A flush whose ticket is no longer armed was
/// superseded by an explicit flush or a teardown and does nothing.
async fn deferred_flush(shared: Arc<Shared>, ticket: u64) -> Result<Option<NavigationRequest>> {
    if !shared.config.flush_delay.is_zero() {
        tokio::time::sleep(shared.config.flush_delay).await;
    }

    let batch = {
        let mut state = shared.lock();
        if state.armed_ticket() != Some(ticket) {
            debug!(scope = %shared.config.name, ticket, "stale flush skipped");
            return Ok(None);
        }
        state.phase = Phase::Idle;
        state.queue.drain()
    };

    shared.flush(batch).await
}

/// Coalesces every mutation enqueued within one tick into one navigation.
///
/// A tick ends when the task that enqueued yields to the tokio runtime: the
/// first enqueue spawns the flush task, and later enqueues in the same tick
/// join the armed batch. Drive scopes from a current-thread runtime or a
/// `LocalSet` so that the flush cannot interleave with a running handler.
///
/// Cloning yields another handle onto the same queue.
#[derive(Clone)]
pub struct BatchScheduler {
    shared: Arc<Shared>,
}

impl BatchScheduler {
    pub fn new(navigator: Arc<dyn Navigator>, config: ScopeConfig) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        Self {
            shared: Arc::new(Shared {
                navigator,
                config,
                state: Mutex::new(State {
                    queue: MutationQueue::new(),
                    phase: Phase::Idle,
                    next_ticket: 0,
                    in_flight: None,
                }),
                events,
            }),
        }
    }

    /// Queue a mutation and arm a flush if none is armed yet.
    ///
    /// Fails with [`BatchError::TornDown`] after teardown and with
    /// [`BatchError::NoRuntime`] outside a tokio runtime. On any runtime other
    /// than a current-thread one it fails with
    /// [`BatchError::UnsupportedRuntime`]. In every case nothing is queued.
    pub fn enqueue(&self, descriptor: MutationDescriptor) -> Result<()> {
        let mut state = self.shared.lock();
        match state.observed() {
            SchedulerPhase::TornDown => return Err(BatchError::TornDown),
            SchedulerPhase::FlushScheduled => {
                state.queue.enqueue(descriptor);
                debug!(
                    scope = %self.shared.config.name,
                    pending = state.queue.len(),
                    "mutation joined armed batch"
                );
                return Ok(());
            }
            SchedulerPhase::Idle => {}
        }

        let runtime = Handle::try_current().map_err(|_| BatchError::NoRuntime)?;
        let flavor = runtime.runtime_flavor();
        if flavor != RuntimeFlavor::CurrentThread {
            warn!(
                scope = %self.shared.config.name,
                flavor = ?flavor,
                "mutation rejected: runtime is not current-thread"
            );
            return Err(BatchError::UnsupportedRuntime(format!("{flavor:?}")));
        }
        state.queue.enqueue(descriptor);

        let ticket = state.next_ticket;
        state.next_ticket += 1;
        let task = runtime.spawn(deferred_flush(Arc::clone(&self.shared), ticket));
        state.phase = Phase::Scheduled {
            ticket,
            abort: task.abort_handle(),
        };
        state.in_flight = Some(task);

        debug!(scope = %self.shared.config.name, ticket, "flush scheduled");
        Ok(())
    }

    /// Flush whatever is queued right now, disarming any scheduled flush.
    ///
    /// For hosts that detect their own tick boundary. Returns `Ok(None)`
    /// when the queue is empty.
    pub async fn flush_now(&self) -> Result<Option<NavigationRequest>> {
        let batch = {
            let mut state = self.shared.lock();
            match std::mem::replace(&mut state.phase, Phase::Idle) {
                Phase::TornDown => {
                    state.phase = Phase::TornDown;
                    return Err(BatchError::TornDown);
                }
                Phase::Scheduled { abort, .. } => {
                    abort.abort();
                    state.in_flight = None;
                }
                Phase::Idle => {}
            }
            state.queue.drain()
        };

        self.shared.flush(batch).await
    }

    /// Wait for the most recently scheduled flush task and return its
    /// outcome. `Ok(None)` if there is none or it was cancelled.
    ///
    /// Only the latest flush is reported. Outcomes of earlier ticks that
    /// nobody settled are delivered through [`Self::subscribe`].
    pub async fn settle(&self) -> Result<Option<NavigationRequest>> {
        let task = self.shared.lock().in_flight.take();
        let Some(task) = task else {
            return Ok(None);
        };

        match task.await {
            Ok(outcome) => outcome,
            Err(e) if e.is_cancelled() => Ok(None),
            Err(e) => Err(BatchError::FlushPanicked(e.to_string())),
        }
    }

    /// Tear down: cancel any armed flush and drop queued mutations.
    ///
    /// Idempotent. A navigation already handed to the navigator is not
    /// interrupted.
    pub fn teardown(&self) {
        let mut state = self.shared.lock();
        let previous = std::mem::replace(&mut state.phase, Phase::TornDown);
        let dropped = state.queue.drain().len();
        state.in_flight = None;

        match previous {
            Phase::TornDown => {}
            Phase::Scheduled { abort, .. } => {
                abort.abort();
                warn!(
                    scope = %self.shared.config.name,
                    dropped,
                    "pending flush suppressed by teardown"
                );
                info!(scope = %self.shared.config.name, "scope torn down");
            }
            Phase::Idle => {
                info!(scope = %self.shared.config.name, "scope torn down");
            }
        }
    }

    pub fn phase(&self) -> SchedulerPhase {
        self.shared.lock().observed()
    }

    pub fn is_scheduled(&self) -> bool {
        self.phase() == SchedulerPhase::FlushScheduled
    }

    pub fn is_torn_down(&self) -> bool {
        self.phase() == SchedulerPhase::TornDown
    }

    /// Number of queued mutations.
    pub fn pending(&self) -> usize {
        self.shared.lock().queue.len()
    }

    /// Current location as reported by the navigator.
    pub fn current(&self) -> UrlState {
        self.shared.navigator.current()
    }

    pub fn subscribe(&self) -> FlushStream {
        self.shared.events.subscribe()
    }

    pub fn config(&self) -> &ScopeConfig {
        &self.shared.config
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::memory::MemoryNavigator;
    use navbatch_types::{NavigationKind, UrlObject};

    fn setup(href: &str) -> (Arc<MemoryNavigator>, BatchScheduler) {
        let nav = Arc::new(MemoryNavigator::at(href).unwrap());
        let scheduler = BatchScheduler::new(nav.clone(), ScopeConfig::default());
        (nav, scheduler)
    }

    fn set(key: &str, value: i32) -> MutationDescriptor {
        MutationDescriptor::push(UrlObject::new().set(key, value))
    }

    #[tokio::test]
    async fn one_navigation_per_tick() {
        let (nav, scheduler) = setup("/");
        for i in 0..5 {
            scheduler.enqueue(set(&format!("k{i}"), i)).unwrap();
        }
        assert_eq!(scheduler.pending(), 5);
        assert!(scheduler.is_scheduled());
        assert_eq!(nav.request_count(), 0);

        let request = scheduler.settle().await.unwrap().unwrap();
        assert_eq!(nav.request_count(), 1);
        assert_eq!(request.href(), "/?k0=0&k1=1&k2=2&k3=3&k4=4");
        assert_eq!(scheduler.phase(), SchedulerPhase::Idle);
        assert_eq!(scheduler.pending(), 0);
    }

    #[tokio::test]
    async fn flush_runs_when_caller_yields() {
        let (nav, scheduler) = setup("/?a=1");
        scheduler.enqueue(set("a", 2)).unwrap();
        scheduler.enqueue(set("b", 3)).unwrap();

        tokio::task::yield_now().await;
        tokio::task::yield_now().await;

        assert_eq!(nav.request_count(), 1);
        assert_eq!(nav.current().href(), "/?a=2&b=3");
    }

    #[tokio::test]
    async fn teardown_suppresses_armed_flush() {
        let (nav, scheduler) = setup("/");
        scheduler.enqueue(set("a", 1)).unwrap();
        scheduler.enqueue(set("b", 2)).unwrap();

        scheduler.teardown();
        assert!(scheduler.is_torn_down());
        assert_eq!(scheduler.pending(), 0);

        for _ in 0..3 {
            tokio::task::yield_now().await;
        }
        assert!(scheduler.settle().await.unwrap().is_none());
        assert_eq!(nav.request_count(), 0);
    }

    #[tokio::test]
    async fn enqueue_after_teardown_fails() {
        let (_nav, scheduler) = setup("/");
        scheduler.teardown();
        scheduler.teardown();
        assert!(matches!(
            scheduler.enqueue(set("a", 1)),
            Err(BatchError::TornDown)
        ));
        assert_eq!(scheduler.pending(), 0);
        assert!(matches!(
            scheduler.flush_now().await,
            Err(BatchError::TornDown)
        ));
    }

    #[tokio::test]
    async fn baseline_is_read_at_flush_time() {
        let (nav, scheduler) = setup("/?a=1");
        scheduler.enqueue(set("a", 2)).unwrap();

        // Someone else navigates before the tick ends.
        nav.set_location(UrlState::parse("/other?b=9#frag").unwrap());

        let request = scheduler.settle().await.unwrap().unwrap();
        assert_eq!(request.href(), "/other?a=2&b=9#frag");
    }

    #[tokio::test]
    async fn next_tick_starts_fresh_batch() {
        let (nav, scheduler) = setup("/");
        scheduler.enqueue(set("a", 1)).unwrap();
        scheduler.settle().await.unwrap();

        scheduler
            .enqueue(MutationDescriptor::replace(UrlObject::new().set("b", 2)))
            .unwrap();
        let second = scheduler.settle().await.unwrap().unwrap();

        assert_eq!(nav.request_count(), 2);
        assert_eq!(second.kind, NavigationKind::Replace);
        assert_eq!(second.href(), "/?a=1&b=2");
        assert_eq!(nav.history().len(), 2);
    }

    #[tokio::test]
    async fn navigation_failure_is_surfaced_not_retried() {
        let (nav, scheduler) = setup("/");
        let mut events = scheduler.subscribe();
        nav.fail_next("blocked by host");

        scheduler.enqueue(set("a", 1)).unwrap();
        let err = scheduler.settle().await.unwrap_err();
        assert!(matches!(err, BatchError::Navigation(ref e) if e.message == "blocked by host"));
        assert_eq!(nav.request_count(), 1);

        let event = events.try_recv().unwrap();
        assert!(event.is_failure());
        assert_eq!(event.request().href(), "/?a=1");

        // The failed batch is gone; the next tick flushes only new work.
        scheduler.enqueue(set("b", 2)).unwrap();
        let request = scheduler.settle().await.unwrap().unwrap();
        assert_eq!(request.href(), "/?b=2");
        assert_eq!(nav.request_count(), 2);
    }

    #[tokio::test]
    async fn successful_flush_publishes_event() {
        let (_nav, scheduler) = setup("/");
        let mut events = scheduler.subscribe();
        scheduler.enqueue(set("a", 1)).unwrap();
        scheduler.settle().await.unwrap();

        match events.try_recv().unwrap() {
            FlushEvent::Navigated { request } => assert_eq!(request.href(), "/?a=1"),
            other => panic!("unexpected event: {other:?}"),
        }
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn flush_now_disarms_deferred_flush() {
        let (nav, scheduler) = setup("/");
        scheduler.enqueue(set("a", 1)).unwrap();
        scheduler.enqueue(set("b", 2)).unwrap();

        let request = scheduler.flush_now().await.unwrap().unwrap();
        assert_eq!(request.href(), "/?a=1&b=2");
        assert_eq!(scheduler.phase(), SchedulerPhase::Idle);

        for _ in 0..3 {
            tokio::task::yield_now().await;
        }
        assert!(scheduler.settle().await.unwrap().is_none());
        assert_eq!(nav.request_count(), 1);
    }

    #[tokio::test]
    async fn flush_now_on_empty_queue_is_noop() {
        let (nav, scheduler) = setup("/");
        assert!(scheduler.flush_now().await.unwrap().is_none());
        assert_eq!(nav.request_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn flush_delay_widens_the_batch() {
        let nav = Arc::new(MemoryNavigator::default());
        let config = ScopeConfig {
            flush_delay: Duration::from_millis(5),
            ..ScopeConfig::default()
        };
        let scheduler = BatchScheduler::new(nav.clone(), config);

        scheduler.enqueue(set("a", 1)).unwrap();
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(nav.request_count(), 0);
        scheduler.enqueue(set("b", 2)).unwrap();

        let request = scheduler.settle().await.unwrap().unwrap();
        assert_eq!(request.href(), "/?a=1&b=2");
        assert_eq!(nav.request_count(), 1);
    }

    #[tokio::test]
    async fn schedulers_do_not_share_queues() {
        let nav = Arc::new(MemoryNavigator::default());
        let left = BatchScheduler::new(nav.clone(), ScopeConfig::named("left"));
        let right = BatchScheduler::new(nav.clone(), ScopeConfig::named("right"));

        left.enqueue(set("l", 1)).unwrap();
        right.enqueue(set("r", 1)).unwrap();
        right.teardown();

        let request = left.settle().await.unwrap().unwrap();
        assert_eq!(request.href(), "/?l=1");
        assert_eq!(nav.request_count(), 1);
    }

    #[tokio::test]
    async fn unsettled_failures_still_reach_subscribers() {
        let (nav, scheduler) = setup("/");
        let mut events = scheduler.subscribe();
        nav.fail_next("first");
        nav.fail_next("second");

        scheduler.enqueue(set("a", 1)).unwrap();
        tokio::task::yield_now().await;
        tokio::task::yield_now().await;
        assert_eq!(nav.request_count(), 1);

        scheduler.enqueue(set("b", 2)).unwrap();
        let err = scheduler.settle().await.unwrap_err();
        assert!(matches!(err, BatchError::Navigation(ref e) if e.message == "second"));
        assert_eq!(nav.request_count(), 2);

        let mut failures = Vec::new();
        while let Ok(event) = events.try_recv() {
            match event {
                FlushEvent::Failed { request, error } => {
                    failures.push((request.href(), error.message))
                }
                other => panic!("unexpected event: {other:?}"),
            }
        }
        assert_eq!(
            failures,
            vec![
                ("/?a=1".to_string(), "first".to_string()),
                ("/?b=2".to_string(), "second".to_string()),
            ]
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn multi_thread_runtime_is_rejected() {
        let (nav, scheduler) = setup("/");
        assert!(matches!(
            scheduler.enqueue(set("a", 1)),
            Err(BatchError::UnsupportedRuntime(_))
        ));
        std::thread::sleep(Duration::from_millis(20));
        assert!(matches!(
            scheduler.enqueue(set("b", 2)),
            Err(BatchError::UnsupportedRuntime(_))
        ));

        assert_eq!(scheduler.pending(), 0);
        assert_eq!(scheduler.phase(), SchedulerPhase::Idle);
        assert!(scheduler.settle().await.unwrap().is_none());
        assert_eq!(nav.request_count(), 0);
    }

    #[test]
    fn enqueue_outside_runtime_is_rejected() {
        let (_nav, scheduler) = setup("/");
        assert!(matches!(
            scheduler.enqueue(set("a", 1)),
            Err(BatchError::NoRuntime)
        ));
        assert_eq!(scheduler.pending(), 0);
        assert_eq!(scheduler.phase(), SchedulerPhase::Idle);
    }
}
