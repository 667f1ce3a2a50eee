//! Company operations.

use std::sync::Arc;

use crate::error::{with_error_handling, ApiError};
use crate::http::{HttpMethod, HttpRequest};
use crate::query::QueryParams;
use crate::request::RequestOptions;
use crate::transport::Transport;
use crate::types::{CompanyListQuery, CompanyListResponse};

const COMPANY_LIST: &str = "/api/v1/company/list";

/// Client for the company resource.
#[derive(Debug, Clone)]
pub struct CompanyApi {
    transport: Arc<Transport>,
}

impl CompanyApi {
    pub fn new(transport: Arc<Transport>) -> Self {
        Self { transport }
    }

    pub fn build_get_api_v1_company_list(
        &self,
        query: Option<&CompanyListQuery>,
        options: Option<&RequestOptions>,
    ) -> HttpRequest {
        let params = query.map(|q| {
            QueryParams::new()
                .add_opt("user_id", q.user_id.as_deref())
                .add_opt("page", q.page)
                .add_opt("per_page", q.per_page)
                .add_opt("name", q.name.as_deref())
                .add_opt("status", q.status.as_deref())
        });
        self.transport
            .request(HttpMethod::Get, COMPANY_LIST.to_string(), params.as_ref(), options)
    }

    /// GET /api/v1/company/list
    pub async fn get_api_v1_company_list(
        &self,
        query: Option<&CompanyListQuery>,
        options: Option<&RequestOptions>,
    ) -> Result<CompanyListResponse, ApiError> {
        let request = self.build_get_api_v1_company_list(query, options);
        with_error_handling(self.transport.send_json(request), None).await
    }
}
