use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Category {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Tag {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pet {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(default)]
    pub photo_urls: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<Tag>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pet_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ship_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub complete: Option<bool>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_status: Option<i32>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Company {
    pub id: Uuid,
    pub user_id: String,
    pub name: String,
    pub status: String,
    pub company_type: String,
}

#[derive(Default)]
pub struct Store {
    pets: HashMap<i64, Pet>,
    orders: HashMap<i64, Order>,
    users: HashMap<String, User>,
    companies: Vec<Company>,
    sessions: Vec<String>,
    next_id: i64,
}

impl Store {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    /// Use a caller-supplied id, or allocate one that no later allocation reuses.
    fn claim_id(&mut self, requested: Option<i64>) -> i64 {
        match requested {
            Some(id) => {
                self.next_id = self.next_id.max(id);
                id
            }
            None => self.next_id(),
        }
    }
}

pub type Db = Arc<RwLock<Store>>;

/// Companies every fresh server starts with.
fn seed_companies() -> Vec<Company> {
    [
        ("u1", "Acme", "active", "pt"),
        ("u1", "Borealis", "inactive", "cv"),
        ("u2", "Cobalt", "active", "personal"),
        ("u2", "Dunmore", "under_review", "pt_asing"),
    ]
    .into_iter()
    .map(|(user_id, name, status, company_type)| Company {
        id: Uuid::new_v4(),
        user_id: user_id.to_string(),
        name: name.to_string(),
        status: status.to_string(),
        company_type: company_type.to_string(),
    })
    .collect()
}

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store {
        companies: seed_companies(),
        ..Store::default()
    }));
    Router::new()
        .route("/pet", post(add_pet).put(update_pet))
        .route("/pet/findByStatus", get(find_pets_by_status))
        .route("/pet/findByTags", get(find_pets_by_tags))
        .route(
            "/pet/{pet_id}",
            get(get_pet).post(update_pet_with_form).delete(delete_pet),
        )
        .route("/pet/{pet_id}/uploadImage", post(upload_image))
        .route("/store/inventory", get(inventory))
        .route("/store/order", post(place_order))
        .route("/store/order/{order_id}", get(get_order).delete(delete_order))
        .route("/user", post(create_user))
        .route("/user/createWithArray", post(create_users))
        .route("/user/createWithList", post(create_users))
        .route("/user/login", get(login))
        .route("/user/logout", get(logout))
        .route(
            "/user/{username}",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route("/api/v1/company/list", get(list_companies))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Error body with a single `field`, so clients see `message`, `error` or
/// `detail` shaped payloads.
fn error(status: StatusCode, field: &str, message: &str) -> Response {
    let mut body = serde_json::Map::new();
    body.insert(field.to_string(), message.into());
    (status, Json(body)).into_response()
}

fn not_found(what: &str) -> Response {
    error(StatusCode::NOT_FOUND, "message", &format!("{what} not found"))
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

// --- pet ---

async fn add_pet(State(db): State<Db>, Json(mut pet): Json<Pet>) -> Json<Pet> {
    let mut store = db.write().await;
    let id = store.claim_id(pet.id);
    pet.id = Some(id);
    store.pets.insert(id, pet.clone());
    Json(pet)
}

async fn update_pet(State(db): State<Db>, Json(pet): Json<Pet>) -> Result<Json<Pet>, Response> {
    let Some(id) = pet.id else {
        return Err(error(StatusCode::BAD_REQUEST, "error", "pet id is required"));
    };
    let mut store = db.write().await;
    let slot = store.pets.get_mut(&id).ok_or_else(|| not_found("Pet"))?;
    *slot = pet.clone();
    Ok(Json(pet))
}

#[derive(Deserialize)]
pub struct StatusQuery {
    pub status: Option<String>,
}

async fn find_pets_by_status(
    State(db): State<Db>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<Vec<Pet>>, Response> {
    let Some(raw) = query.status else {
        return Err(error(StatusCode::BAD_REQUEST, "error", "status is required"));
    };
    let wanted: Vec<&str> = raw.split(',').collect();
    let store = db.read().await;
    let mut pets: Vec<Pet> = store
        .pets
        .values()
        .filter(|p| p.status.as_deref().is_some_and(|s| wanted.contains(&s)))
        .cloned()
        .collect();
    pets.sort_by_key(|p| p.id);
    Ok(Json(pets))
}

#[derive(Deserialize)]
pub struct TagsQuery {
    pub tags: Option<String>,
}

async fn find_pets_by_tags(State(db): State<Db>, Query(query): Query<TagsQuery>) -> Json<Vec<Pet>> {
    let raw = query.tags.unwrap_or_default();
    let wanted: Vec<&str> = raw.split(',').filter(|t| !t.is_empty()).collect();
    let store = db.read().await;
    let mut pets: Vec<Pet> = store
        .pets
        .values()
        .filter(|p| {
            p.tags.iter().flatten().any(|t| {
                t.name.as_deref().is_some_and(|name| wanted.contains(&name))
            })
        })
        .cloned()
        .collect();
    pets.sort_by_key(|p| p.id);
    Json(pets)
}

async fn get_pet(State(db): State<Db>, Path(id): Path<i64>) -> Result<Json<Pet>, Response> {
    let store = db.read().await;
    store.pets.get(&id).cloned().map(Json).ok_or_else(|| not_found("Pet"))
}

#[derive(Deserialize)]
pub struct PetForm {
    pub name: Option<String>,
    pub status: Option<String>,
}

async fn update_pet_with_form(
    State(db): State<Db>,
    Path(id): Path<i64>,
    Query(form): Query<PetForm>,
) -> Result<Json<Pet>, Response> {
    let mut store = db.write().await;
    let pet = store.pets.get_mut(&id).ok_or_else(|| not_found("Pet"))?;
    if let Some(name) = form.name {
        pet.name = name;
    }
    if let Some(status) = form.status {
        pet.status = Some(status);
    }
    Ok(Json(pet.clone()))
}

async fn delete_pet(State(db): State<Db>, Path(id): Path<i64>) -> Result<StatusCode, Response> {
    let mut store = db.write().await;
    store
        .pets
        .remove(&id)
        .map(|_| StatusCode::OK)
        .ok_or_else(|| not_found("Pet"))
}

async fn upload_image(
    State(db): State<Db>,
    Path(id): Path<i64>,
    mut multipart: Multipart,
) -> Result<Json<serde_json::Value>, Response> {
    if !db.read().await.pets.contains_key(&id) {
        return Err(not_found("Pet"));
    }

    let mut metadata = None;
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| error(StatusCode::BAD_REQUEST, "error", &e.to_string()))?
    {
        match field.name() {
            Some("file") => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| error(StatusCode::BAD_REQUEST, "error", &e.to_string()))?;
                upload = Some((file_name, bytes.len()));
            }
            Some("additionalMetadata") => {
                metadata = field.text().await.ok();
            }
            _ => {}
        }
    }

    let Some((file_name, size)) = upload else {
        return Err(error(StatusCode::BAD_REQUEST, "error", "file part is required"));
    };
    let message = match metadata {
        Some(meta) => format!("additionalMetadata: {meta}\nFile uploaded to ./{file_name}, {size} bytes"),
        None => format!("File uploaded to ./{file_name}, {size} bytes"),
    };
    Ok(Json(json!({ "code": 200, "type": "unknown", "message": message })))
}

// --- store ---

async fn inventory(State(db): State<Db>, headers: HeaderMap) -> Result<Json<HashMap<String, i64>>, Response> {
    let store = db.read().await;
    let authorized = bearer_token(&headers).is_some_and(|t| store.sessions.iter().any(|s| s == t));
    if !authorized {
        return Err(error(StatusCode::UNAUTHORIZED, "message", "missing or invalid session token"));
    }
    let mut counts = HashMap::new();
    for pet in store.pets.values() {
        let status = pet.status.clone().unwrap_or_else(|| "unknown".to_string());
        *counts.entry(status).or_insert(0) += 1;
    }
    Ok(Json(counts))
}

async fn place_order(State(db): State<Db>, Json(mut order): Json<Order>) -> Json<Order> {
    let mut store = db.write().await;
    let id = store.claim_id(order.id);
    order.id = Some(id);
    order.status.get_or_insert_with(|| "placed".to_string());
    store.orders.insert(id, order.clone());
    Json(order)
}

async fn get_order(State(db): State<Db>, Path(id): Path<i64>) -> Result<Json<Order>, Response> {
    let store = db.read().await;
    store.orders.get(&id).cloned().map(Json).ok_or_else(|| not_found("Order"))
}

async fn delete_order(State(db): State<Db>, Path(id): Path<i64>) -> Result<StatusCode, Response> {
    let mut store = db.write().await;
    store
        .orders
        .remove(&id)
        .map(|_| StatusCode::OK)
        .ok_or_else(|| not_found("Order"))
}

// --- user ---

async fn create_user(State(db): State<Db>, Json(mut user): Json<User>) -> Result<Json<User>, Response> {
    let Some(username) = user.username.clone().filter(|u| !u.is_empty()) else {
        return Err(error(StatusCode::UNPROCESSABLE_ENTITY, "detail", "username is required"));
    };
    let mut store = db.write().await;
    if store.users.contains_key(&username) {
        return Err(error(StatusCode::CONFLICT, "error", "username already taken"));
    }
    if user.id.is_none() {
        user.id = Some(store.next_id());
    }
    store.users.insert(username, user.clone());
    Ok(Json(user))
}

async fn create_users(State(db): State<Db>, Json(users): Json<Vec<User>>) -> Result<Json<Vec<User>>, Response> {
    let mut store = db.write().await;
    let mut created = Vec::with_capacity(users.len());
    for mut user in users {
        let Some(username) = user.username.clone().filter(|u| !u.is_empty()) else {
            return Err(error(StatusCode::UNPROCESSABLE_ENTITY, "detail", "username is required"));
        };
        if user.id.is_none() {
            user.id = Some(store.next_id());
        }
        store.users.insert(username, user.clone());
        created.push(user);
    }
    Ok(Json(created))
}

#[derive(Deserialize)]
pub struct LoginQuery {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Responds with the session token as plain text.
async fn login(State(db): State<Db>, Query(query): Query<LoginQuery>) -> Response {
    let mut store = db.write().await;
    let valid = match (&query.username, &query.password) {
        (Some(username), Some(password)) => store
            .users
            .get(username)
            .is_some_and(|u| u.password.as_deref() == Some(password.as_str())),
        _ => false,
    };
    if !valid {
        return (StatusCode::BAD_REQUEST, "Invalid username/password supplied").into_response();
    }
    let token = format!("session-{}", Uuid::new_v4());
    store.sessions.push(token.clone());
    (StatusCode::OK, token).into_response()
}

async fn logout(State(db): State<Db>, headers: HeaderMap) -> StatusCode {
    if let Some(token) = bearer_token(&headers) {
        db.write().await.sessions.retain(|s| s != token);
    }
    StatusCode::OK
}

async fn get_user(State(db): State<Db>, Path(username): Path<String>) -> Result<Json<User>, Response> {
    let store = db.read().await;
    store
        .users
        .get(&username)
        .cloned()
        .map(Json)
        .ok_or_else(|| not_found("User"))
}

async fn update_user(
    State(db): State<Db>,
    Path(username): Path<String>,
    Json(user): Json<User>,
) -> Result<StatusCode, Response> {
    let mut store = db.write().await;
    let slot = store.users.get_mut(&username).ok_or_else(|| not_found("User"))?;
    *slot = user;
    Ok(StatusCode::OK)
}

async fn delete_user(State(db): State<Db>, Path(username): Path<String>) -> Result<StatusCode, Response> {
    let mut store = db.write().await;
    store
        .users
        .remove(&username)
        .map(|_| StatusCode::OK)
        .ok_or_else(|| not_found("User"))
}

// --- company ---

#[derive(Deserialize)]
pub struct CompanyQuery {
    pub user_id: Option<String>,
    pub page: Option<usize>,
    pub per_page: Option<usize>,
    pub name: Option<String>,
    pub status: Option<String>,
}

async fn list_companies(State(db): State<Db>, Query(query): Query<CompanyQuery>) -> Json<serde_json::Value> {
    let store = db.read().await;
    let matching: Vec<&Company> = store
        .companies
        .iter()
        .filter(|c| query.user_id.as_ref().is_none_or(|u| &c.user_id == u))
        .filter(|c| query.status.as_ref().is_none_or(|s| &c.status == s))
        .filter(|c| {
            query
                .name
                .as_ref()
                .is_none_or(|n| c.name.to_lowercase().contains(&n.to_lowercase()))
        })
        .collect();

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(10).max(1);
    let total = matching.len();
    let data: Vec<&Company> = matching.into_iter().skip((page - 1).saturating_mul(per_page)).take(per_page).collect();

    Json(json!({
        "data": {
            "data": data,
            "pagination": { "page": page, "per_page": per_page, "total": total },
        },
        "error": false,
        "message": "success",
    }))
}
