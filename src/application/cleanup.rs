use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use crate::domain::ports::{Logger, OrderRepository};

use super::order_service::{OrderService, SweepReport};

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(60);

/// Periodically removes abandoned `created` orders.
///
/// Each pass runs on the blocking pool since the repository is synchronous.
/// A failed pass is logged and the next tick tries again.
pub struct CleanupJob<R> {
    service: Arc<OrderService<R>>,
    logger: Arc<dyn Logger>,
    interval: Duration,
}

impl<R: OrderRepository> CleanupJob<R> {
    pub fn new(service: Arc<OrderService<R>>, logger: Arc<dyn Logger>, interval: Duration) -> Self {
        // tokio's interval panics on a zero period.
        let interval = if interval.is_zero() {
            DEFAULT_INTERVAL
        } else {
            interval
        };
        Self {
            service,
            logger,
            interval,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Start the loop on the current runtime. The first pass runs immediately.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run_loop())
    }

    pub async fn run_loop(self) {
        self.logger.info(
            "order cleanup started",
            &[
                ("interval_secs", &self.interval.as_secs()),
                ("retention_minutes", &self.service.retention().num_minutes()),
            ],
        );
        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            self.run_once().await;
        }
    }

    /// One sweep. `None` when the pass failed; the failure has been logged.
    pub async fn run_once(&self) -> Option<SweepReport> {
        let service = Arc::clone(&self.service);
        match tokio::task::spawn_blocking(move || service.remove_old_created_orders()).await {
            Ok(Ok(report)) => Some(report),
            Ok(Err(e)) => {
                self.logger
                    .error("order cleanup pass failed", &[("error", &e)]);
                None
            }
            Err(e) => {
                self.logger
                    .error("order cleanup task aborted", &[("error", &e)]);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use chrono::Utc;
    use uuid::Uuid;

    use super::{CleanupJob, DEFAULT_INTERVAL};
    use crate::application::order_service::OrderService;
    use crate::domain::errors::DomainError;
    use crate::domain::order::{
        CreateOrderInput, Order, OrderLine, OrderLineContentLine, OrderStatus,
    };
    use crate::domain::ports::OrderRepository;
    use crate::infrastructure::logger::RecordingLogger;
    use crate::infrastructure::memory::InMemoryOrderRepository;

    fn stale_order(repo: &InMemoryOrderRepository) -> Order {
        let mut order = Order::new(CreateOrderInput {
            session_id: Uuid::new_v4().to_string(),
        })
        .expect("valid order");
        order.created_date_time = Utc::now() - chrono::Duration::hours(2);
        repo.create_order(&order).expect("seed")
    }

    fn job(
        repo: Arc<InMemoryOrderRepository>,
        interval: Duration,
    ) -> (CleanupJob<Arc<InMemoryOrderRepository>>, Arc<RecordingLogger>) {
        let logger = Arc::new(RecordingLogger::default());
        let service = Arc::new(OrderService::new(repo, logger.clone()));
        (CleanupJob::new(service, logger.clone(), interval), logger)
    }

    #[test]
    fn zero_interval_falls_back_to_default() {
        let (job, _) = job(Arc::new(InMemoryOrderRepository::new()), Duration::ZERO);
        assert_eq!(job.interval(), DEFAULT_INTERVAL);
    }

    #[tokio::test]
    async fn run_once_removes_stale_orders() {
        let repo = Arc::new(InMemoryOrderRepository::new());
        let order = stale_order(&repo);
        let (job, _) = job(repo.clone(), Duration::from_secs(60));

        let report = job.run_once().await.expect("sweep succeeded");
        assert_eq!(report.deleted, 1);
        assert!(repo.find_order_by_id(order.id).expect("find").is_none());
    }

    #[tokio::test]
    async fn spawned_loop_sweeps_on_first_tick() {
        let repo = Arc::new(InMemoryOrderRepository::new());
        let order = stale_order(&repo);
        let (job, logger) = job(repo.clone(), Duration::from_secs(3600));

        let handle = job.spawn();
        let mut removed = false;
        for _ in 0..100 {
            if repo.find_order_by_id(order.id).expect("find").is_none() {
                removed = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        handle.abort();

        assert!(removed, "stale order should be swept on the first tick");
        assert!(logger
            .entries()
            .iter()
            .any(|(_, line)| line.starts_with("order cleanup started")));
    }

    /// Listing fails, so the whole pass fails.
    struct BrokenRepository;

    impl OrderRepository for BrokenRepository {
        fn create_order(&self, _: &Order) -> Result<Order, DomainError> {
            Err(DomainError::Storage("down".to_string()))
        }
        fn update_order(&self, _: &Order) -> Result<(), DomainError> {
            Err(DomainError::Storage("down".to_string()))
        }
        fn delete_order(&self, _: Uuid) -> Result<(), DomainError> {
            Err(DomainError::Storage("down".to_string()))
        }
        fn find_order_by_id(&self, _: Uuid) -> Result<Option<Order>, DomainError> {
            Err(DomainError::Storage("down".to_string()))
        }
        fn find_order_by_session_id(&self, _: &str) -> Result<Option<Order>, DomainError> {
            Err(DomainError::Storage("down".to_string()))
        }
        fn find_orders_by_status(&self, _: &OrderStatus) -> Result<Vec<Order>, DomainError> {
            Err(DomainError::Storage("down".to_string()))
        }
        fn create_order_line(&self, _: &OrderLine) -> Result<OrderLine, DomainError> {
            Err(DomainError::Storage("down".to_string()))
        }
        fn update_order_line(&self, _: &OrderLine) -> Result<(), DomainError> {
            Err(DomainError::Storage("down".to_string()))
        }
        fn delete_order_line(&self, _: Uuid) -> Result<(), DomainError> {
            Err(DomainError::Storage("down".to_string()))
        }
        fn find_order_line_by_id(&self, _: Uuid) -> Result<Option<OrderLine>, DomainError> {
            Err(DomainError::Storage("down".to_string()))
        }
        fn find_order_lines_by_order_id(&self, _: Uuid) -> Result<Vec<OrderLine>, DomainError> {
            Err(DomainError::Storage("down".to_string()))
        }
        fn create_content_line(
            &self,
            _: &OrderLineContentLine,
        ) -> Result<OrderLineContentLine, DomainError> {
            Err(DomainError::Storage("down".to_string()))
        }
        fn update_content_line(&self, _: &OrderLineContentLine) -> Result<(), DomainError> {
            Err(DomainError::Storage("down".to_string()))
        }
        fn delete_content_line(&self, _: Uuid) -> Result<(), DomainError> {
            Err(DomainError::Storage("down".to_string()))
        }
        fn find_content_line_by_id(
            &self,
            _: Uuid,
        ) -> Result<Option<OrderLineContentLine>, DomainError> {
            Err(DomainError::Storage("down".to_string()))
        }
        fn find_content_lines_by_order_line_id(
            &self,
            _: Uuid,
        ) -> Result<Vec<OrderLineContentLine>, DomainError> {
            Err(DomainError::Storage("down".to_string()))
        }
    }

    #[tokio::test]
    async fn failed_pass_is_logged_and_survivable() {
        let logger = Arc::new(RecordingLogger::default());
        let service = Arc::new(OrderService::new(BrokenRepository, logger.clone()));
        let job = CleanupJob::new(service, logger.clone(), Duration::from_secs(60));

        assert!(job.run_once().await.is_none());
        assert!(job.run_once().await.is_none());
        let errors = logger.errors();
        assert!(errors
            .iter()
            .any(|line| line.starts_with("order cleanup pass failed")));
        assert!(errors
            .iter()
            .any(|line| line.contains("operation=remove_old_created_orders")));
    }
}
