//! Mock auth helpers for integration tests.
//!
//! Services behind the gateway receive an `x-clinic-user-id` header injected by
//! the gateway. In tests, `MockAuth` produces that header directly so no real
//! gateway is needed.

use axum::http::{HeaderMap, HeaderName, HeaderValue};
use uuid::Uuid;

use clinic_auth_types::identity::USER_ID_HEADER;

/// Configurable identity injected into test requests.
#[derive(Debug, Clone, Copy)]
pub struct MockAuth {
    pub user_id: Uuid,
}

impl MockAuth {
    pub fn new(user_id: Uuid) -> Self {
        Self { user_id }
    }

    /// A fresh identity with a random user id.
    pub fn random() -> Self {
        Self::new(Uuid::now_v7())
    }

    pub fn header_name(&self) -> HeaderName {
        HeaderName::from_static(USER_ID_HEADER)
    }

    pub fn header_value(&self) -> HeaderValue {
        HeaderValue::from_str(&self.user_id.to_string()).unwrap()
    }

    /// Return headers as if the gateway injected them.
    pub fn headers(&self) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(self.header_name(), self.header_value());
        map
    }
}
