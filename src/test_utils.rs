use crate::database::cart::CartRepository;
use crate::database::product::ProductRepository;
use crate::database::session::SessionRepository;
use crate::database::user::{UserRepository, hash_password};
use crate::error::app_error::AppError;
use crate::models::cart::{Cart, CartItem};
use crate::models::product::{Product, ProductRequest};
use crate::models::record_id::RecordId;
use crate::models::session::SessionUser;
use crate::models::user::{Identity, Role, User};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

struct MockSession {
    email: String,
    role: Role,
    visit_count: i64,
    expires_at: DateTime<Utc>,
}

/// In-memory stand-in for the Postgres repository, mirroring its contract
/// closely enough to exercise the services and guards without a database.
#[derive(Default)]
pub struct MockRepository {
    users: Mutex<Vec<User>>,
    sessions: Mutex<HashMap<Uuid, MockSession>>,
    products: Mutex<Vec<Product>>,
    carts: Mutex<Vec<Cart>>,
}

impl MockRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn seed_user(&self, email: &str, password: &str, role: Role) {
        let (_salt, password_hash) = hash_password(password).expect("hash");
        self.users.lock().unwrap().push(User {
            id: RecordId::generate(),
            name: "seeded".to_string(),
            email: email.to_string(),
            password_hash: Some(password_hash),
            role,
            oauth_id: None,
            created_at: Utc::now(),
        });
    }
}

#[async_trait::async_trait]
impl UserRepository for MockRepository {
    async fn create_user(&self, name: &str, email: &str, password: &str, role: Role) -> Result<User, AppError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == email) {
            return Err(AppError::DuplicateEmail(email.to_string()));
        }

        let (_salt, password_hash) = hash_password(password)?;
        let user = User {
            id: RecordId::generate(),
            name: name.to_string(),
            email: email.to_string(),
            password_hash: Some(password_hash),
            role,
            oauth_id: None,
            created_at: Utc::now(),
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self.users.lock().unwrap().iter().find(|u| u.email == email).cloned())
    }

    async fn upsert_oauth_user(&self, name: &str, email: &str, oauth_id: &str) -> Result<User, AppError> {
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.iter_mut().find(|u| u.email == email) {
            if user.oauth_id.is_none() {
                user.oauth_id = Some(oauth_id.to_string());
            }
            return Ok(user.clone());
        }

        let user = User {
            id: RecordId::generate(),
            name: name.to_string(),
            email: email.to_string(),
            password_hash: None,
            role: Role::User,
            oauth_id: Some(oauth_id.to_string()),
            created_at: Utc::now(),
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn any_users_exist(&self) -> Result<bool, AppError> {
        Ok(!self.users.lock().unwrap().is_empty())
    }
}

#[async_trait::async_trait]
impl SessionRepository for MockRepository {
    async fn establish_session(&self, session_id: Option<Uuid>, identity: &Identity, ttl_seconds: i64, _user_agent: Option<&str>) -> Result<Uuid, AppError> {
        let mut sessions = self.sessions.lock().unwrap();
        let now = Utc::now();
        sessions.retain(|_, s| s.email != identity.email || s.expires_at > now);

        let id = session_id.unwrap_or_else(Uuid::new_v4);
        let visit_count = sessions.get(&id).map(|s| s.visit_count).unwrap_or(0);
        sessions.insert(
            id,
            MockSession {
                email: identity.email.clone(),
                role: identity.role,
                visit_count,
                expires_at: now + Duration::seconds(ttl_seconds),
            },
        );
        Ok(id)
    }

    async fn current_session_user(&self, session_id: &Uuid, ttl_seconds: i64) -> Result<Option<SessionUser>, AppError> {
        let mut sessions = self.sessions.lock().unwrap();
        let now = Utc::now();
        match sessions.get_mut(session_id) {
            Some(session) if session.expires_at > now => {
                session.expires_at = now + Duration::seconds(ttl_seconds);
                Ok(Some(SessionUser {
                    email: session.email.clone(),
                    role: session.role,
                }))
            }
            _ => Ok(None),
        }
    }

    async fn destroy_session(&self, session_id: &Uuid) -> Result<(), AppError> {
        self.sessions.lock().unwrap().remove(session_id);
        Ok(())
    }

    async fn record_visit(&self, session_id: &Uuid) -> Result<Option<i64>, AppError> {
        let mut sessions = self.sessions.lock().unwrap();
        let now = Utc::now();
        match sessions.get_mut(session_id) {
            Some(session) if session.expires_at > now => {
                session.visit_count += 1;
                Ok(Some(session.visit_count))
            }
            _ => Ok(None),
        }
    }
}

#[async_trait::async_trait]
impl ProductRepository for MockRepository {
    async fn create_product(&self, request: &ProductRequest) -> Result<Product, AppError> {
        let mut products = self.products.lock().unwrap();
        if products.iter().any(|p| p.code == request.code) {
            return Err(AppError::BadRequest(format!("Product code {} already exists", request.code)));
        }

        let product = Product {
            id: RecordId::generate(),
            title: request.title.clone(),
            description: request.description.clone(),
            code: request.code.clone(),
            price: request.price,
            stock: request.stock,
            thumbnail: request.thumbnail.clone(),
            created_at: Utc::now(),
        };
        products.push(product.clone());
        Ok(product)
    }

    async fn get_product_by_id(&self, id: &RecordId) -> Result<Option<Product>, AppError> {
        Ok(self.products.lock().unwrap().iter().find(|p| &p.id == id).cloned())
    }

    async fn list_products(&self) -> Result<Vec<Product>, AppError> {
        Ok(self.products.lock().unwrap().clone())
    }

    async fn update_product(&self, id: &RecordId, request: &ProductRequest) -> Result<Option<Product>, AppError> {
        let mut products = self.products.lock().unwrap();
        let Some(product) = products.iter_mut().find(|p| &p.id == id) else {
            return Ok(None);
        };

        product.title = request.title.clone();
        product.description = request.description.clone();
        product.code = request.code.clone();
        product.price = request.price;
        product.stock = request.stock;
        product.thumbnail = request.thumbnail.clone();
        Ok(Some(product.clone()))
    }

    async fn delete_product(&self, id: &RecordId) -> Result<bool, AppError> {
        let mut products = self.products.lock().unwrap();
        let before = products.len();
        products.retain(|p| &p.id != id);
        Ok(products.len() < before)
    }
}

#[async_trait::async_trait]
impl CartRepository for MockRepository {
    async fn create_cart(&self, items: &[CartItem]) -> Result<Cart, AppError> {
        let cart = Cart {
            id: RecordId::generate(),
            products: items.to_vec(),
            created_at: Utc::now(),
        };
        self.carts.lock().unwrap().push(cart.clone());
        Ok(cart)
    }

    async fn get_cart_by_id(&self, id: &RecordId) -> Result<Option<Cart>, AppError> {
        Ok(self.carts.lock().unwrap().iter().find(|c| &c.id == id).cloned())
    }

    async fn list_carts(&self) -> Result<Vec<Cart>, AppError> {
        Ok(self.carts.lock().unwrap().clone())
    }

    async fn replace_cart_items(&self, id: &RecordId, items: &[CartItem]) -> Result<Option<Cart>, AppError> {
        let mut carts = self.carts.lock().unwrap();
        let Some(cart) = carts.iter_mut().find(|c| &c.id == id) else {
            return Ok(None);
        };

        cart.products = items.to_vec();
        Ok(Some(cart.clone()))
    }
}
