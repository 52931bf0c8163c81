use crate::broadcast::{ProductFeed, UPDATED_PRODUCTS};
use crate::database::product::ProductRepository;
use crate::models::product::ProductResponse;
use tracing::warn;

/// Re-reads the full product collection and emits it on the feed as a
/// single `updatedProducts` event. Best-effort: dispatched after the
/// mutation response has been committed, and any failure is only logged.
pub async fn publish_catalog<R: ProductRepository>(repo: &R, feed: &ProductFeed) {
    let products = match repo.list_products().await {
        Ok(products) => products,
        Err(e) => {
            warn!(error = %e, "failed to refresh product feed");
            return;
        }
    };

    let responses: Vec<ProductResponse> = products.iter().map(ProductResponse::from).collect();
    match serde_json::to_value(&responses) {
        Ok(payload) => feed.emit(UPDATED_PRODUCTS, payload),
        Err(e) => warn!(error = %e, "failed to serialize product feed payload"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::product::ProductRequest;
    use crate::test_utils::MockRepository;
    use tokio::sync::broadcast::error::TryRecvError;

    fn product_request(title: &str, code: &str) -> ProductRequest {
        ProductRequest {
            title: title.to_string(),
            description: "desc".to_string(),
            code: code.to_string(),
            price: 1500,
            stock: 3,
            thumbnail: None,
        }
    }

    #[tokio::test]
    async fn one_mutation_yields_exactly_one_emission_with_the_full_collection() {
        let repo = MockRepository::new();
        repo.create_product(&product_request("yerba", "c-1")).await.unwrap();
        let updated = repo.create_product(&product_request("mate", "c-2")).await.unwrap();
        repo.update_product(&updated.id, &product_request("mate imperial", "c-2")).await.unwrap();

        let feed = ProductFeed::new(8);
        let mut rx = feed.subscribe();

        publish_catalog(&repo, &feed).await;

        let event = rx.recv().await.expect("one event");
        assert_eq!(event.topic, UPDATED_PRODUCTS);
        let payload = event.payload.as_array().expect("array payload");
        assert_eq!(payload.len(), 2);
        assert!(payload.iter().any(|p| p["title"] == "mate imperial"));

        // Exactly one emission per mutation.
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test]
    async fn publish_without_subscribers_does_not_fail() {
        let repo = MockRepository::new();
        let feed = ProductFeed::new(8);
        publish_catalog(&repo, &feed).await;
    }
}
