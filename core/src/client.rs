//! Root client combining every resource client over one transport.
//!
//! # Design
//! `ApiClient` holds no state of its own. Each sub-client keeps an
//! `Arc<Transport>`; whichever constructor is used, all four share the same
//! transport instance and therefore the same defaults and credential store.

use std::sync::Arc;

use crate::auth::CredentialStore;
use crate::config::ClientConfig;
use crate::resources::{CompanyApi, PetApi, StoreApi, UserApi};
use crate::transport::{HttpExecutor, Transport};

#[derive(Debug, Clone)]
pub struct ApiClient {
    pub company: CompanyApi,
    pub pet: PetApi,
    pub store: StoreApi,
    pub user: UserApi,
    transport: Arc<Transport>,
}

impl ApiClient {
    /// Client over the process-wide default transport.
    pub fn new() -> Self {
        Self::with_transport(Transport::shared())
    }

    /// Client over a dedicated transport built from `config`.
    pub fn from_config(config: ClientConfig) -> Self {
        Self::with_transport(Arc::new(Transport::new(config)))
    }

    /// Client with an injected credential store and executor.
    pub fn from_parts(
        config: ClientConfig,
        store: Arc<dyn CredentialStore>,
        executor: Arc<dyn HttpExecutor>,
    ) -> Self {
        Self::with_transport(Arc::new(Transport::with_parts(config, store, executor)))
    }

    pub fn with_transport(transport: Arc<Transport>) -> Self {
        Self {
            company: CompanyApi::new(transport.clone()),
            pet: PetApi::new(transport.clone()),
            store: StoreApi::new(transport.clone()),
            user: UserApi::new(transport.clone()),
            transport,
        }
    }

    pub fn transport(&self) -> &Arc<Transport> {
        &self.transport
    }

    /// The credential store read by the auth interceptor.
    pub fn credentials(&self) -> &dyn CredentialStore {
        self.transport.credentials()
    }
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sub_clients_share_one_transport() {
        let client = ApiClient::from_config(ClientConfig::new("http://localhost:3000"));
        let req = client.pet.build_get_pet_by_id(1, None).unwrap();
        assert_eq!(req.base_url, "http://localhost:3000");
        let req = client.user.build_logout_user(None);
        assert_eq!(req.base_url, "http://localhost:3000");
        assert_eq!(Arc::strong_count(client.transport()), 5);
    }

    #[test]
    fn default_clients_share_the_global_transport() {
        let a = ApiClient::new();
        let b = ApiClient::default();
        assert!(Arc::ptr_eq(a.transport(), b.transport()));
    }

    #[test]
    fn credentials_are_visible_to_every_sub_client() {
        let client = ApiClient::from_config(ClientConfig::new("http://localhost:3000"));
        crate::auth::set_bearer_token(client.credentials(), "tok", None);
        assert_eq!(client.transport().credentials().get("auth_token").as_deref(), Some("tok"));
    }
}
