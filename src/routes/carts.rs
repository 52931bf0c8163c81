use crate::database::cart::CartRepository;
use crate::database::postgres_repository::PostgresRepository;
use crate::database::product::ProductRepository;
use crate::error::app_error::AppError;
use crate::error::json::JsonBody;
use crate::models::cart::{CartItem, CartRequest, CartResponse};
use crate::models::record_id::RecordId;
use crate::models::response::{ApiBody, ok};
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::{State, routes};
use sqlx::PgPool;
use validator::Validate;

/// Resolve the payload's product references into cart items, rejecting
/// malformed ids and references to products that do not exist.
async fn resolve_items<R: ProductRepository>(repo: &R, payload: &CartRequest) -> Result<Vec<CartItem>, AppError> {
    let mut items = Vec::with_capacity(payload.products.len());
    for entry in &payload.products {
        let product_id = RecordId::parse(&entry.product)?;
        if repo.get_product_by_id(&product_id).await?.is_none() {
            return Err(AppError::BadRequest(format!("Product {product_id} does not exist")));
        }
        items.push(CartItem {
            product: product_id,
            quantity: entry.quantity,
        });
    }
    Ok(items)
}

/// `?limit=N` answers 206 with a truncated listing.
#[rocket::get("/?<limit>")]
pub async fn list_carts(pool: &State<PgPool>, limit: Option<usize>) -> Result<(Status, Json<ApiBody<Vec<CartResponse>>>), AppError> {
    let repo = PostgresRepository { pool: pool.inner().clone() };
    let mut carts = repo.list_carts().await?;

    let status = match limit {
        Some(limit) if limit < carts.len() => {
            carts.truncate(limit);
            Status::PartialContent
        }
        _ => Status::Ok,
    };

    Ok((status, Json(ok(carts.iter().map(CartResponse::from).collect()))))
}

#[rocket::get("/<cid>")]
pub async fn get_cart(pool: &State<PgPool>, cid: &str) -> Result<Json<ApiBody<CartResponse>>, AppError> {
    let id = RecordId::parse(cid)?;
    let repo = PostgresRepository { pool: pool.inner().clone() };
    match repo.get_cart_by_id(&id).await? {
        Some(cart) => Ok(Json(ok(CartResponse::from(&cart)))),
        None => Err(AppError::NotFound(format!("The cart with id {cid} does not exist"))),
    }
}

#[rocket::post("/", data = "<payload>")]
pub async fn create_cart(pool: &State<PgPool>, payload: JsonBody<CartRequest>) -> Result<(Status, Json<ApiBody<CartResponse>>), AppError> {
    payload.validate()?;

    let repo = PostgresRepository { pool: pool.inner().clone() };
    let items = resolve_items(&repo, &payload).await?;
    let cart = repo.create_cart(&items).await?;

    Ok((Status::Created, Json(ok(CartResponse::from(&cart)))))
}

#[rocket::put("/<cid>", data = "<payload>")]
pub async fn put_cart(pool: &State<PgPool>, cid: &str, payload: JsonBody<CartRequest>) -> Result<Json<ApiBody<CartResponse>>, AppError> {
    let id = RecordId::parse(cid)?;
    payload.validate()?;

    let repo = PostgresRepository { pool: pool.inner().clone() };
    let items = resolve_items(&repo, &payload).await?;
    let Some(cart) = repo.replace_cart_items(&id, &items).await? else {
        return Err(AppError::NotFound(format!("The cart with id {cid} does not exist")));
    };

    Ok(Json(ok(CartResponse::from(&cart))))
}

pub fn routes() -> Vec<rocket::Route> {
    routes![list_carts, get_cart, create_cart, put_cart]
}
