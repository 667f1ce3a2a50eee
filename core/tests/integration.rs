//! End-to-end tests against the live mock server.
//!
//! # Design
//! Each test starts the mock server on a random port and drives the real
//! `ReqwestExecutor`, so path expansion, query encoding, auth headers,
//! multipart bodies and error normalization all cross an actual socket.

use std::time::Duration;

use petstore_core::error::{recover, NOT_FOUND, TIMEOUT_ERROR};
use petstore_core::{
    auth, ApiClient, ClientConfig, CompanyListQuery, FilePart, Order, OrderStatus, Pet, PetStatus, RequestOptions,
    Tag, User,
};

async fn start_server() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(mock_server::run(listener));
    format!("http://{addr}")
}

async fn client() -> ApiClient {
    ApiClient::from_config(ClientConfig::new(&start_server().await))
}

#[tokio::test]
async fn pet_lifecycle() {
    let api = client().await;

    // create
    let mut pet = Pet::new("doggie");
    pet.status = Some(PetStatus::Available);
    pet.tags = Some(vec![Tag {
        id: None,
        name: Some("fluffy".to_string()),
    }]);
    let created = api.pet.add_pet(&pet, None).await.unwrap();
    let id = created.id.unwrap();
    assert_eq!(created.name, "doggie");

    // read
    let fetched = api.pet.get_pet_by_id(id, None).await.unwrap();
    assert_eq!(fetched, created);

    // search
    let found = api
        .pet
        .find_pets_by_status(&[PetStatus::Available, PetStatus::Sold], None)
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    let tagged = api.pet.find_pets_by_tags(&["fluffy"], None).await.unwrap();
    assert_eq!(tagged[0].id, Some(id));

    // update via form
    api.pet
        .update_pet_with_form(id, Some("rex"), Some(PetStatus::Sold), None)
        .await
        .unwrap();
    let renamed = api.pet.get_pet_by_id(id, None).await.unwrap();
    assert_eq!(renamed.name, "rex");
    assert_eq!(renamed.status, Some(PetStatus::Sold));

    // full update
    let mut replacement = renamed.clone();
    replacement.name = "max".to_string();
    let updated = api.pet.update_pet(&replacement, None).await.unwrap();
    assert_eq!(updated.name, "max");

    // upload
    let file = FilePart::new("max.png", "image/png", vec![1, 2, 3]);
    let uploaded = api.pet.upload_file(id, file, Some("profile"), None).await.unwrap();
    assert_eq!(uploaded.code, Some(200));
    assert!(uploaded.message.unwrap().contains("max.png, 3 bytes"));

    // delete
    api.pet.delete_pet(id, None).await.unwrap();
    let err = api.pet.get_pet_by_id(id, None).await.unwrap_err();
    assert_eq!(err.status(), Some(404));
}

#[tokio::test]
async fn missing_pet_is_normalized() {
    let api = client().await;

    let err = api.pet.get_pet_by_id(999, None).await.unwrap_err();
    let normalized = err.normalized().unwrap();
    assert_eq!(normalized.message, NOT_FOUND);
    assert_eq!(normalized.status, Some(404));
    assert_eq!(normalized.code.as_deref(), Some("ERR_BAD_REQUEST"));
    assert_eq!(normalized.details.as_ref().unwrap()["message"], "Pet not found");
}

#[tokio::test]
async fn validation_detail_becomes_message() {
    let api = client().await;

    let err = api.user.create_user(&User::default(), None).await.unwrap_err();
    assert_eq!(err.status(), Some(422));
    assert_eq!(err.normalized().unwrap().message, "username is required");
}

#[tokio::test]
async fn login_unlocks_inventory_and_orders_round_trip() {
    let api = client().await;

    let user = User {
        username: Some("ann".to_string()),
        password: Some("pw".to_string()),
        ..User::default()
    };
    api.user.create_user(&user, None).await.unwrap();

    let mut pet = Pet::new("a");
    pet.status = Some(PetStatus::Pending);
    api.pet.add_pet(&pet, None).await.unwrap();

    let token = api.user.login_user(Some("ann"), Some("pw"), None).await.unwrap();
    assert!(token.starts_with("session-"));
    auth::set_bearer_token(api.credentials(), &token, None);

    let inventory = api.store.get_inventory(None).await.unwrap();
    assert_eq!(inventory.get("pending"), Some(&1));

    let order = Order {
        pet_id: Some(1),
        quantity: Some(2),
        ..Order::default()
    };
    let placed = api.store.place_order(&order, None).await.unwrap();
    assert_eq!(placed.status, Some(OrderStatus::Placed));
    let order_id = placed.id.unwrap();
    assert_eq!(api.store.get_order_by_id(order_id, None).await.unwrap().quantity, Some(2));
    api.store.delete_order(order_id, None).await.unwrap();

    api.user.logout_user(None).await.unwrap();
    let err = api.store.get_inventory(None).await.unwrap_err();
    assert_eq!(err.status(), Some(401));
}

#[tokio::test]
async fn bad_login_message_comes_from_plain_text_body() {
    let api = client().await;

    let err = api.user.login_user(Some("nobody"), Some("x"), None).await.unwrap_err();
    assert_eq!(err.status(), Some(400));
    assert_eq!(err.normalized().unwrap().message, "Invalid username/password supplied");
}

#[tokio::test]
#[tracing_test::traced_test]
async fn unauthorized_clears_stored_token() {
    let api = client().await;
    auth::set_bearer_token(api.credentials(), "stale", None);

    let err = api.store.get_inventory(None).await.unwrap_err();

    assert_eq!(err.status(), Some(401));
    assert!(api.credentials().get(auth::DEFAULT_TOKEN_KEY).is_none());
    assert!(logs_contain("Unauthorized access - please login again"));
}

#[tokio::test]
async fn users_bulk_update_and_delete() {
    let api = client().await;

    let users: Vec<User> = ["a", "b"]
        .into_iter()
        .map(|name| User {
            username: Some(name.to_string()),
            ..User::default()
        })
        .collect();
    api.user.create_users_with_array_input(&users, None).await.unwrap();
    api.user.create_users_with_list_input(&users[..1], None).await.unwrap();

    let mut b = api.user.get_user_by_name("b", None).await.unwrap();
    b.email = Some("b@example.com".to_string());
    api.user.update_user("b", &b, None).await.unwrap();
    assert_eq!(
        api.user.get_user_by_name("b", None).await.unwrap().email.as_deref(),
        Some("b@example.com")
    );

    api.user.delete_user("b", None).await.unwrap();
    assert_eq!(api.user.get_user_by_name("b", None).await.unwrap_err().status(), Some(404));
}

#[tokio::test]
async fn company_list_envelope_decodes() {
    let api = client().await;

    let query = CompanyListQuery {
        user_id: Some("u1".to_string()),
        per_page: Some(1),
        ..CompanyListQuery::default()
    };
    let page = api.company.get_api_v1_company_list(Some(&query), None).await.unwrap();
    assert!(!page.error);
    assert_eq!(page.message, "success");
    assert_eq!(page.data.data.len(), 1);
    assert_eq!(page.data.pagination["total"], 2);

    let all = api.company.get_api_v1_company_list(None, None).await.unwrap();
    assert_eq!(all.data.data.len(), 4);
}

#[tokio::test]
async fn unreachable_host_is_a_network_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let api = ApiClient::from_config(ClientConfig::new(&format!("http://{addr}")));

    let err = api.pet.get_pet_by_id(1, None).await.unwrap_err();
    let normalized = err.normalized().unwrap();
    assert_eq!(normalized.message, petstore_core::error::NETWORK_ERROR);
    assert!(normalized.status.is_none());
}

#[tokio::test]
async fn stalled_server_times_out() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    let api = ApiClient::from_config(ClientConfig::new(&format!("http://{addr}")));

    let options = RequestOptions::new().timeout(Duration::from_millis(150));
    let err = api.pet.get_pet_by_id(1, Some(&options)).await.unwrap_err();

    let normalized = err.normalized().unwrap();
    assert_eq!(normalized.message, TIMEOUT_ERROR);
    assert!(normalized.status.is_none());
    assert_eq!(normalized.code.as_deref(), Some("ECONNABORTED"));
}

#[tokio::test]
async fn missing_pet_can_be_recovered_to_a_default() {
    let api = client().await;

    let pets = recover(api.pet.find_pets_by_status(&[], None).await, Vec::new()).unwrap();
    assert!(pets.is_empty());

    let fallback = Pet::new("placeholder");
    let pet = recover(api.pet.get_pet_by_id(404, None).await, fallback.clone()).unwrap();
    assert_eq!(pet, fallback);
}
