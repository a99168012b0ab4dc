//! Permission checks on an authenticated client.

use config::ProviderId;

use crate::ClientRecord;

/// Operations a client can be granted in its `allowed_endpoints` list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::AsRefStr)]
pub enum Endpoint {
    #[strum(serialize = "generate")]
    Generate,
    #[strum(serialize = "clients/reload")]
    ClientsReload,
}

pub fn can_access_endpoint(record: &ClientRecord, endpoint: impl AsRef<str>) -> bool {
    record.allowed_endpoints.contains(endpoint.as_ref())
}

pub fn can_use_provider(record: &ClientRecord, provider: ProviderId) -> bool {
    record.allowed_providers.contains(&provider)
}
