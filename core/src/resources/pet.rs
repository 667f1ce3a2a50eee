//! Pet operations.

use std::sync::Arc;

use serde_json::Value;

use crate::error::{with_error_handling, ApiError};
use crate::http::{FilePart, HttpMethod, HttpRequest, MultipartForm};
use crate::path::{render, PathParams};
use crate::query::QueryParams;
use crate::request::{with_json_body, with_multipart_body, RequestOptions};
use crate::transport::Transport;
use crate::types::{ApiResponse, Pet, PetStatus};

const PET: &str = "/pet";
const PET_BY_ID: &str = "/pet/{petId}";
const UPLOAD_IMAGE: &str = "/pet/{petId}/uploadImage";
const FIND_BY_STATUS: &str = "/pet/findByStatus";
const FIND_BY_TAGS: &str = "/pet/findByTags";

/// Client for the `/pet` resource.
#[derive(Debug, Clone)]
pub struct PetApi {
    transport: Arc<Transport>,
}

impl PetApi {
    pub fn new(transport: Arc<Transport>) -> Self {
        Self { transport }
    }

    pub fn build_add_pet(&self, pet: &Pet, options: Option<&RequestOptions>) -> Result<HttpRequest, ApiError> {
        let request = self.transport.request(HttpMethod::Post, PET.to_string(), None, options);
        with_json_body(request, pet)
    }

    pub fn build_update_pet(&self, pet: &Pet, options: Option<&RequestOptions>) -> Result<HttpRequest, ApiError> {
        let request = self.transport.request(HttpMethod::Put, PET.to_string(), None, options);
        with_json_body(request, pet)
    }

    pub fn build_get_pet_by_id(&self, pet_id: i64, options: Option<&RequestOptions>) -> Result<HttpRequest, ApiError> {
        let path = render(PET_BY_ID, &PathParams::new().with("petId", pet_id))?;
        Ok(self.transport.request(HttpMethod::Get, path, None, options))
    }

    pub fn build_update_pet_with_form(
        &self,
        pet_id: i64,
        name: Option<&str>,
        status: Option<PetStatus>,
        options: Option<&RequestOptions>,
    ) -> Result<HttpRequest, ApiError> {
        let path = render(PET_BY_ID, &PathParams::new().with("petId", pet_id))?;
        let query = QueryParams::new()
            .add_opt("name", name)
            .add_opt("status", status.map(|s| s.as_str()));
        Ok(self.transport.request(HttpMethod::Post, path, Some(&query), options))
    }

    pub fn build_delete_pet(&self, pet_id: i64, options: Option<&RequestOptions>) -> Result<HttpRequest, ApiError> {
        let path = render(PET_BY_ID, &PathParams::new().with("petId", pet_id))?;
        Ok(self.transport.request(HttpMethod::Delete, path, None, options))
    }

    /// The file travels as the `file` part; `additional_metadata` as a text
    /// field.
    pub fn build_upload_file(
        &self,
        pet_id: i64,
        file: FilePart,
        additional_metadata: Option<&str>,
        options: Option<&RequestOptions>,
    ) -> Result<HttpRequest, ApiError> {
        let path = render(UPLOAD_IMAGE, &PathParams::new().with("petId", pet_id))?;
        let mut form = MultipartForm {
            fields: Vec::new(),
            files: vec![file],
        };
        if let Some(meta) = additional_metadata {
            form.fields.push(("additionalMetadata".to_string(), meta.to_string()));
        }
        let request = self.transport.request(HttpMethod::Post, path, None, options);
        Ok(with_multipart_body(request, form))
    }

    pub fn build_find_pets_by_status(&self, status: &[PetStatus], options: Option<&RequestOptions>) -> HttpRequest {
        let query = QueryParams::new().add_array("status", status.iter().map(|s| s.as_str()).collect());
        self.transport
            .request(HttpMethod::Get, FIND_BY_STATUS.to_string(), Some(&query), options)
    }

    pub fn build_find_pets_by_tags(&self, tags: &[&str], options: Option<&RequestOptions>) -> HttpRequest {
        let query = QueryParams::new().add_array("tags", tags.to_vec());
        self.transport
            .request(HttpMethod::Get, FIND_BY_TAGS.to_string(), Some(&query), options)
    }

    /// POST /pet
    pub async fn add_pet(&self, pet: &Pet, options: Option<&RequestOptions>) -> Result<Pet, ApiError> {
        let request = self.build_add_pet(pet, options)?;
        with_error_handling(self.transport.send_json(request), None).await
    }

    /// PUT /pet
    pub async fn update_pet(&self, pet: &Pet, options: Option<&RequestOptions>) -> Result<Pet, ApiError> {
        let request = self.build_update_pet(pet, options)?;
        with_error_handling(self.transport.send_json(request), None).await
    }

    /// GET /pet/{petId}
    pub async fn get_pet_by_id(&self, pet_id: i64, options: Option<&RequestOptions>) -> Result<Pet, ApiError> {
        let request = self.build_get_pet_by_id(pet_id, options)?;
        with_error_handling(self.transport.send_json(request), None).await
    }

    /// POST /pet/{petId}
    pub async fn update_pet_with_form(
        &self,
        pet_id: i64,
        name: Option<&str>,
        status: Option<PetStatus>,
        options: Option<&RequestOptions>,
    ) -> Result<Value, ApiError> {
        let request = self.build_update_pet_with_form(pet_id, name, status, options)?;
        with_error_handling(self.transport.send_json(request), None).await
    }

    /// DELETE /pet/{petId}
    pub async fn delete_pet(&self, pet_id: i64, options: Option<&RequestOptions>) -> Result<Value, ApiError> {
        let request = self.build_delete_pet(pet_id, options)?;
        with_error_handling(self.transport.send_json(request), None).await
    }

    /// POST /pet/{petId}/uploadImage
    pub async fn upload_file(
        &self,
        pet_id: i64,
        file: FilePart,
        additional_metadata: Option<&str>,
        options: Option<&RequestOptions>,
    ) -> Result<ApiResponse, ApiError> {
        let request = self.build_upload_file(pet_id, file, additional_metadata, options)?;
        with_error_handling(self.transport.send_json(request), None).await
    }

    /// GET /pet/findByStatus
    pub async fn find_pets_by_status(
        &self,
        status: &[PetStatus],
        options: Option<&RequestOptions>,
    ) -> Result<Vec<Pet>, ApiError> {
        let request = self.build_find_pets_by_status(status, options);
        with_error_handling(self.transport.send_json(request), None).await
    }

    /// GET /pet/findByTags
    pub async fn find_pets_by_tags(&self, tags: &[&str], options: Option<&RequestOptions>) -> Result<Vec<Pet>, ApiError> {
        let request = self.build_find_pets_by_tags(tags, options);
        with_error_handling(self.transport.send_json(request), None).await
    }
}
