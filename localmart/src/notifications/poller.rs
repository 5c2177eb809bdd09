use super::NotificationCenter;
use crate::domain::{Order, OrderId, User};
use crate::error::RequestError;
use crate::services::OrderService;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);
const MIN_POLL_INTERVAL: Duration = Duration::from_secs(1);

type NewOrderCallback = Box<dyn Fn(&Order) + Send + Sync>;

/// Watches a shop owner's pending orders and raises a notification for each
/// order that was not there on the previous poll.
pub struct OrderPoller {
    orders: OrderService,
    center: Arc<NotificationCenter>,
    interval: Duration,
    /// `None` until the first successful poll
    known: Option<HashSet<OrderId>>,
    callbacks: Vec<NewOrderCallback>,
}

impl OrderPoller {
    pub fn new(orders: OrderService, center: Arc<NotificationCenter>) -> Self {
        Self {
            orders,
            center,
            interval: DEFAULT_POLL_INTERVAL,
            known: None,
            callbacks: Vec::new(),
        }
    }

    /// A poller for shop owners; everyone else gets `None`
    pub fn for_user(user: &User, orders: OrderService, center: Arc<NotificationCenter>) -> Option<Self> {
        if user.is_shop_owner() {
            Some(Self::new(orders, center))
        } else {
            debug!("Not polling orders for {} ({:?})", user.username, user.role);
            None
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval.max(MIN_POLL_INTERVAL);
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Register a hook run for every newly seen order
    pub fn on_new_order(mut self, callback: impl Fn(&Order) + Send + Sync + 'static) -> Self {
        self.callbacks.push(Box::new(callback));
        self
    }

    /// Fetch pending orders once and return the ones not seen before.
    ///
    /// The first successful poll only records what is already pending.
    pub async fn poll_once(&mut self) -> Result<Vec<Order>, RequestError> {
        let pending = self.orders.pending_orders().await?;
        let current: HashSet<OrderId> = pending.iter().map(|order| order.id).collect();

        let fresh: Vec<Order> = match &self.known {
            None => {
                info!("Tracking {} pending order(s)", current.len());
                Vec::new()
            }
            Some(known) => pending
                .into_iter()
                .filter(|order| !known.contains(&order.id))
                .collect(),
        };

        for order in &fresh {
            self.center.notify_order(
                order.id,
                format!(
                    "New order #{} received for ${:.2}",
                    order.id, order.total_amount
                ),
            );
            for callback in &self.callbacks {
                callback(order);
            }
        }

        self.known = Some(current);
        Ok(fresh)
    }

    /// Poll on every tick until `cancel` fires
    pub async fn run(&mut self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!("Polling pending orders every {:?}", self.interval);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    match self.poll_once().await {
                        Ok(fresh) if !fresh.is_empty() => {
                            info!("{} new order(s)", fresh.len())
                        }
                        Ok(_) => {}
                        Err(e) => warn!("Error checking for new orders: {}", e),
                    }
                }
            }
        }

        info!("Order polling stopped");
    }

    pub fn spawn(mut self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move { self.run(cancel).await })
    }
}

impl std::fmt::Debug for OrderPoller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderPoller")
            .field("interval", &self.interval)
            .field("known", &self.known)
            .field("callbacks", &self.callbacks.len())
            .finish()
    }
}
