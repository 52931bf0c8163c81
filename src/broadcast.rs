use rocket::fairing::AdHoc;
use tokio::sync::broadcast;
use tracing::debug;

/// Topic carried by product-collection refresh events.
pub const UPDATED_PRODUCTS: &str = "updatedProducts";

#[derive(Debug, Clone, PartialEq)]
pub struct FeedEvent {
    pub topic: &'static str,
    pub payload: serde_json::Value,
}

/// Best-effort broadcast channel connecting product mutations to streaming
/// clients. Emission never fails the caller: with no subscribers the event
/// is simply dropped, and slow subscribers lose old events rather than
/// exerting backpressure.
#[derive(Clone)]
pub struct ProductFeed {
    sender: broadcast::Sender<FeedEvent>,
}

impl ProductFeed {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn emit(&self, topic: &'static str, payload: serde_json::Value) {
        match self.sender.send(FeedEvent { topic, payload }) {
            Ok(subscribers) => debug!(topic, subscribers, "broadcast event emitted"),
            Err(_) => debug!(topic, "broadcast event dropped, no subscribers"),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FeedEvent> {
        self.sender.subscribe()
    }
}

impl Default for ProductFeed {
    fn default() -> Self {
        Self::new(32)
    }
}

pub fn stage_feed() -> AdHoc {
    AdHoc::on_ignite("Product Feed", |rocket| async move { rocket.manage(ProductFeed::default()) })
}
