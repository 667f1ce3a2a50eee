//! User operations.

use std::sync::Arc;

use serde_json::Value;

use crate::error::{with_error_handling, ApiError};
use crate::http::{HttpMethod, HttpRequest};
use crate::path::{render, PathParams};
use crate::query::QueryParams;
use crate::request::{with_json_body, RequestOptions};
use crate::transport::Transport;
use crate::types::User;

const USER: &str = "/user";
const CREATE_WITH_ARRAY: &str = "/user/createWithArray";
const CREATE_WITH_LIST: &str = "/user/createWithList";
const LOGIN: &str = "/user/login";
const LOGOUT: &str = "/user/logout";
const USER_BY_NAME: &str = "/user/{username}";

/// Client for the `/user` resource.
#[derive(Debug, Clone)]
pub struct UserApi {
    transport: Arc<Transport>,
}

impl UserApi {
    pub fn new(transport: Arc<Transport>) -> Self {
        Self { transport }
    }

    pub fn build_create_user(&self, user: &User, options: Option<&RequestOptions>) -> Result<HttpRequest, ApiError> {
        let request = self.transport.request(HttpMethod::Post, USER.to_string(), None, options);
        with_json_body(request, user)
    }

    pub fn build_create_users_with_array_input(
        &self,
        users: &[User],
        options: Option<&RequestOptions>,
    ) -> Result<HttpRequest, ApiError> {
        let request = self
            .transport
            .request(HttpMethod::Post, CREATE_WITH_ARRAY.to_string(), None, options);
        with_json_body(request, users)
    }

    pub fn build_create_users_with_list_input(
        &self,
        users: &[User],
        options: Option<&RequestOptions>,
    ) -> Result<HttpRequest, ApiError> {
        let request = self
            .transport
            .request(HttpMethod::Post, CREATE_WITH_LIST.to_string(), None, options);
        with_json_body(request, users)
    }

    pub fn build_login_user(
        &self,
        username: Option<&str>,
        password: Option<&str>,
        options: Option<&RequestOptions>,
    ) -> HttpRequest {
        let query = QueryParams::new()
            .add_opt("username", username)
            .add_opt("password", password);
        self.transport
            .request(HttpMethod::Get, LOGIN.to_string(), Some(&query), options)
    }

    pub fn build_logout_user(&self, options: Option<&RequestOptions>) -> HttpRequest {
        self.transport
            .request(HttpMethod::Get, LOGOUT.to_string(), None, options)
    }

    pub fn build_get_user_by_name(&self, username: &str, options: Option<&RequestOptions>) -> Result<HttpRequest, ApiError> {
        let path = render(USER_BY_NAME, &PathParams::new().with("username", username))?;
        Ok(self.transport.request(HttpMethod::Get, path, None, options))
    }

    pub fn build_update_user(
        &self,
        username: &str,
        user: &User,
        options: Option<&RequestOptions>,
    ) -> Result<HttpRequest, ApiError> {
        let path = render(USER_BY_NAME, &PathParams::new().with("username", username))?;
        let request = self.transport.request(HttpMethod::Put, path, None, options);
        with_json_body(request, user)
    }

    pub fn build_delete_user(&self, username: &str, options: Option<&RequestOptions>) -> Result<HttpRequest, ApiError> {
        let path = render(USER_BY_NAME, &PathParams::new().with("username", username))?;
        Ok(self.transport.request(HttpMethod::Delete, path, None, options))
    }

    /// POST /user
    pub async fn create_user(&self, user: &User, options: Option<&RequestOptions>) -> Result<User, ApiError> {
        let request = self.build_create_user(user, options)?;
        with_error_handling(self.transport.send_json(request), None).await
    }

    /// POST /user/createWithArray
    pub async fn create_users_with_array_input(
        &self,
        users: &[User],
        options: Option<&RequestOptions>,
    ) -> Result<Value, ApiError> {
        let request = self.build_create_users_with_array_input(users, options)?;
        with_error_handling(self.transport.send_json(request), None).await
    }

    /// POST /user/createWithList
    pub async fn create_users_with_list_input(
        &self,
        users: &[User],
        options: Option<&RequestOptions>,
    ) -> Result<Value, ApiError> {
        let request = self.build_create_users_with_list_input(users, options)?;
        with_error_handling(self.transport.send_json(request), None).await
    }

    /// GET /user/login. Returns the session message sent by the server.
    pub async fn login_user(
        &self,
        username: Option<&str>,
        password: Option<&str>,
        options: Option<&RequestOptions>,
    ) -> Result<String, ApiError> {
        let request = self.build_login_user(username, password, options);
        with_error_handling(self.transport.send_json(request), None).await
    }

    /// GET /user/logout
    pub async fn logout_user(&self, options: Option<&RequestOptions>) -> Result<Value, ApiError> {
        let request = self.build_logout_user(options);
        with_error_handling(self.transport.send_json(request), None).await
    }

    /// GET /user/{username}
    pub async fn get_user_by_name(&self, username: &str, options: Option<&RequestOptions>) -> Result<User, ApiError> {
        let request = self.build_get_user_by_name(username, options)?;
        with_error_handling(self.transport.send_json(request), None).await
    }

    /// PUT /user/{username}
    pub async fn update_user(
        &self,
        username: &str,
        user: &User,
        options: Option<&RequestOptions>,
    ) -> Result<Value, ApiError> {
        let request = self.build_update_user(username, user, options)?;
        with_error_handling(self.transport.send_json(request), None).await
    }

    /// DELETE /user/{username}
    pub async fn delete_user(&self, username: &str, options: Option<&RequestOptions>) -> Result<Value, ApiError> {
        let request = self.build_delete_user(username, options)?;
        with_error_handling(self.transport.send_json(request), None).await
    }
}
