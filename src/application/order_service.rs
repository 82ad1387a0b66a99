use std::fmt;
use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::errors::{parse_id, DomainError};
use crate::domain::order::{
    CreateContentLineInput, CreateOrderInput, CreateOrderLineInput, Order, OrderDetails,
    OrderLine, OrderLineContentLine, OrderStatus, UpdateContentLineInput, UpdateOrderInput,
    UpdateOrderLineInput,
};
use crate::domain::ports::{Logger, OrderRepository};

use super::{log_failure, parse_logged};

/// How long a cart may sit in `created` before the sweep removes it.
pub const DEFAULT_RETENTION_MINUTES: i64 = 30;

/// Outcome of one [`OrderService::remove_old_created_orders`] pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    /// `created` orders looked at.
    pub examined: usize,
    pub deleted: usize,
    pub failed: usize,
}

/// An order handed out by [`OrderService::create_session_order`] or
/// [`OrderService::create_order`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenedOrder {
    pub order: Order,
    /// The session already had an open cart and this is it.
    pub reused: bool,
}

// Sessions are matched on this form: a UUID in canonical hyphenated
// lowercase, anything else trimmed.
fn session_key(raw: &str) -> String {
    match parse_id(raw) {
        Ok(id) => id.to_string(),
        Err(_) => raw.trim().to_string(),
    }
}

pub struct OrderService<R> {
    repo: R,
    logger: Arc<dyn Logger>,
    retention: Duration,
}

impl<R: OrderRepository> OrderService<R> {
    pub fn new(repo: R, logger: Arc<dyn Logger>) -> Self {
        Self {
            repo,
            logger,
            retention: Duration::minutes(DEFAULT_RETENTION_MINUTES),
        }
    }

    pub fn with_retention(mut self, retention: Duration) -> Self {
        self.retention = retention;
        self
    }

    pub fn retention(&self) -> Duration {
        self.retention
    }

    fn fail(&self, operation: &str, id: &dyn fmt::Display, err: DomainError) -> DomainError {
        log_failure(self.logger.as_ref(), operation, id, err)
    }

    fn parse(&self, operation: &str, raw: &str) -> Result<Uuid, DomainError> {
        parse_logged(self.logger.as_ref(), operation, raw)
    }

    fn load_order(&self, operation: &str, id: Uuid) -> Result<Order, DomainError> {
        self.repo
            .find_order_by_id(id)
            .map_err(|e| self.fail(operation, &id, e))?
            .ok_or_else(|| self.fail(operation, &id, DomainError::not_found("Order", id)))
    }

    fn load_order_line(&self, operation: &str, id: Uuid) -> Result<OrderLine, DomainError> {
        self.repo
            .find_order_line_by_id(id)
            .map_err(|e| self.fail(operation, &id, e))?
            .ok_or_else(|| self.fail(operation, &id, DomainError::not_found("Order line", id)))
    }

    fn load_content_line(
        &self,
        operation: &str,
        id: Uuid,
    ) -> Result<OrderLineContentLine, DomainError> {
        self.repo
            .find_content_line_by_id(id)
            .map_err(|e| self.fail(operation, &id, e))?
            .ok_or_else(|| {
                self.fail(
                    operation,
                    &id,
                    DomainError::not_found("Order line content line", id),
                )
            })
    }

    // ── Orders ────────────────────────────────────────────────────────────────

    /// Open a cart for a browser session. The session id must be a UUID and
    /// is stored in its canonical hyphenated form.
    pub fn create_session_order(&self, session_id: &str) -> Result<OpenedOrder, DomainError> {
        let session = parse_id(session_id).map_err(|_| {
            self.fail(
                "create_session_order",
                &session_id,
                DomainError::InvalidIdentifier(format!("session id {}", session_id.trim())),
            )
        })?;
        self.open_order(
            "create_session_order",
            CreateOrderInput {
                session_id: session.to_string(),
            },
        )
    }

    /// Open a cart for an arbitrary, non-blank session key.
    pub fn create_order(&self, input: CreateOrderInput) -> Result<OpenedOrder, DomainError> {
        self.open_order("create_order", input)
    }

    // A session that already has a `created` order gets that order back. The
    // check and the insert are separate statements, so two simultaneous
    // requests can still both insert.
    fn open_order(
        &self,
        operation: &str,
        input: CreateOrderInput,
    ) -> Result<OpenedOrder, DomainError> {
        let order = Order::new(CreateOrderInput {
            session_id: session_key(&input.session_id),
        })?;

        let existing = self
            .repo
            .find_order_by_session_id(&order.session_id)
            .map_err(|e| self.fail(operation, &order.session_id, e))?;
        if let Some(existing) = existing.filter(|o| o.status.is_created()) {
            self.logger.info(
                "reusing open order for session",
                &[("session_id", &existing.session_id), ("order_id", &existing.id)],
            );
            return Ok(OpenedOrder {
                order: existing,
                reused: true,
            });
        }

        let created = self
            .repo
            .create_order(&order)
            .map_err(|e| self.fail(operation, &order.id, e))?;
        self.logger.info(
            "order created",
            &[("session_id", &created.session_id), ("order_id", &created.id)],
        );
        Ok(OpenedOrder {
            order: created,
            reused: false,
        })
    }

    /// The session's cart with every line and content line. Only an order
    /// still in `created` is visible here; once it moves on, the session has
    /// no cart.
    pub fn get_order_details_by_session_id(
        &self,
        session_id: &str,
    ) -> Result<OrderDetails, DomainError> {
        const OP: &str = "get_order_details_by_session_id";

        let session_id = session_key(session_id);
        let order = self
            .repo
            .find_order_by_session_id(&session_id)
            .map_err(|e| self.fail(OP, &session_id, e))?
            .filter(|o| o.status.is_created())
            .ok_or_else(|| {
                self.fail(
                    OP,
                    &session_id,
                    DomainError::NotFound(format!("Open order for session {}", session_id)),
                )
            })?;

        let lines = self
            .repo
            .find_order_lines_by_order_id(order.id)
            .map_err(|e| self.fail(OP, &order.id, e))?;
        let line_ids: Vec<Uuid> = lines.iter().map(|l| l.id).collect();
        let content_lines = if line_ids.is_empty() {
            Vec::new()
        } else {
            self.repo
                .find_content_lines_by_order_line_ids(&line_ids)
                .map_err(|e| self.fail(OP, &order.id, e))?
        };

        Ok(OrderDetails::assemble(order, lines, content_lines))
    }

    pub fn get_order_by_id(&self, id: &str) -> Result<Order, DomainError> {
        let id = self.parse("get_order_by_id", id)?;
        self.load_order("get_order_by_id", id)
    }

    /// Apply the supplied fields, including a status transition. An empty
    /// update returns the stored order untouched.
    pub fn update_order(&self, id: &str, input: UpdateOrderInput) -> Result<Order, DomainError> {
        let id = self.parse("update_order", id)?;
        let mut order = self.load_order("update_order", id)?;
        if input.is_empty() {
            return Ok(order);
        }
        if matches!(&input.session_id, Some(s) if s.trim().is_empty()) {
            return Err(DomainError::Validation(
                "session id cannot be empty".to_string(),
            ));
        }
        let session_id = input.session_id.as_deref().map(session_key);
        order.apply(UpdateOrderInput { session_id, ..input });
        self.repo
            .update_order(&order)
            .map_err(|e| self.fail("update_order", &id, e))?;
        Ok(order)
    }

    /// Removes the order together with its lines and their content lines.
    pub fn delete_order(&self, id: &str) -> Result<(), DomainError> {
        let id = self.parse("delete_order", id)?;
        self.repo
            .delete_order(id)
            .map_err(|e| self.fail("delete_order", &id, e))
    }

    // ── Order lines ───────────────────────────────────────────────────────────

    pub fn add_order_line(
        &self,
        order_id: &str,
        input: CreateOrderLineInput,
    ) -> Result<OrderLine, DomainError> {
        let order_id = self.parse("add_order_line", order_id)?;
        let line = OrderLine::new(order_id, input)?;
        self.load_order("add_order_line", order_id)?;
        self.repo
            .create_order_line(&line)
            .map_err(|e| self.fail("add_order_line", &order_id, e))
    }

    pub fn list_order_lines(&self, order_id: &str) -> Result<Vec<OrderLine>, DomainError> {
        let order_id = self.parse("list_order_lines", order_id)?;
        self.load_order("list_order_lines", order_id)?;
        self.repo
            .find_order_lines_by_order_id(order_id)
            .map_err(|e| self.fail("list_order_lines", &order_id, e))
    }

    pub fn update_order_line(
        &self,
        id: &str,
        input: UpdateOrderLineInput,
    ) -> Result<OrderLine, DomainError> {
        let id = self.parse("update_order_line", id)?;
        let mut line = self.load_order_line("update_order_line", id)?;
        if input.is_empty() {
            return Ok(line);
        }
        line.apply(input)?;
        self.repo
            .update_order_line(&line)
            .map_err(|e| self.fail("update_order_line", &id, e))?;
        Ok(line)
    }

    /// Removes the line together with its content lines.
    pub fn delete_order_line(&self, id: &str) -> Result<(), DomainError> {
        let id = self.parse("delete_order_line", id)?;
        self.repo
            .delete_order_line(id)
            .map_err(|e| self.fail("delete_order_line", &id, e))
    }

    // ── Content lines ─────────────────────────────────────────────────────────

    pub fn add_content_line(
        &self,
        order_line_id: &str,
        input: CreateContentLineInput,
    ) -> Result<OrderLineContentLine, DomainError> {
        let order_line_id = self.parse("add_content_line", order_line_id)?;
        let content_line = OrderLineContentLine::new(order_line_id, input)?;
        self.load_order_line("add_content_line", order_line_id)?;
        self.repo
            .create_content_line(&content_line)
            .map_err(|e| self.fail("add_content_line", &order_line_id, e))
    }

    pub fn list_content_lines(
        &self,
        order_line_id: &str,
    ) -> Result<Vec<OrderLineContentLine>, DomainError> {
        let order_line_id = self.parse("list_content_lines", order_line_id)?;
        self.load_order_line("list_content_lines", order_line_id)?;
        self.repo
            .find_content_lines_by_order_line_id(order_line_id)
            .map_err(|e| self.fail("list_content_lines", &order_line_id, e))
    }

    pub fn update_content_line(
        &self,
        id: &str,
        input: UpdateContentLineInput,
    ) -> Result<OrderLineContentLine, DomainError> {
        let id = self.parse("update_content_line", id)?;
        let mut content_line = self.load_content_line("update_content_line", id)?;
        if input.is_empty() {
            return Ok(content_line);
        }
        content_line.apply(input)?;
        self.repo
            .update_content_line(&content_line)
            .map_err(|e| self.fail("update_content_line", &id, e))?;
        Ok(content_line)
    }

    pub fn delete_content_line(&self, id: &str) -> Result<(), DomainError> {
        let id = self.parse("delete_content_line", id)?;
        self.repo
            .delete_content_line(id)
            .map_err(|e| self.fail("delete_content_line", &id, e))
    }

    // ── Cleanup ───────────────────────────────────────────────────────────────

    /// Delete every `created` order older than the retention window. A failed
    /// delete is logged and counted, and the pass moves on to the next order.
    /// Only a failure to list candidates aborts the pass.
    pub fn remove_old_created_orders(&self) -> Result<SweepReport, DomainError> {
        const OP: &str = "remove_old_created_orders";

        let now = Utc::now();
        let candidates = self
            .repo
            .find_orders_by_status(&OrderStatus::Created)
            .map_err(|e| self.fail(OP, &OrderStatus::Created, e))?;

        let mut report = SweepReport {
            examined: candidates.len(),
            ..SweepReport::default()
        };
        for order in candidates
            .iter()
            .filter(|o| o.is_abandoned(now, self.retention))
        {
            match self.repo.delete_order(order.id) {
                Ok(()) => report.deleted += 1,
                // Removed by someone else since the listing.
                Err(DomainError::NotFound(_)) => {}
                Err(e) => {
                    report.failed += 1;
                    self.logger.error(
                        "failed to remove stale order",
                        &[("order_id", &order.id), ("error", &e)],
                    );
                }
            }
        }

        if report.deleted > 0 || report.failed > 0 {
            self.logger.info(
                "stale order sweep finished",
                &[
                    ("examined", &report.examined),
                    ("deleted", &report.deleted),
                    ("failed", &report.failed),
                ],
            );
        }
        Ok(report)
    }
}
