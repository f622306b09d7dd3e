/// Resolver client capability interface and its REST binding
///
/// The resolver is the external service that stores identity documents and
/// delegation records. Its wire protocol is a collaborator concern; the
/// bridge only needs document fetch and delegation registration.
use crate::{
    error::{BridgeError, BridgeResult},
    identity::IdentityRef,
};
use async_trait::async_trait;
use url::Url;
use tracing::debug;

/// External resolver capability
#[async_trait]
pub trait ResolverClient: Send + Sync {
    /// Fetch the registered document for a DID
    async fn get_document(&self, resolver_address: &Url, did: &str)
        -> BridgeResult<serde_json::Value>;

    /// Record a delegation from subject to agent under the given name
    async fn register_delegation(
        &self,
        resolver_address: &Url,
        subject: &IdentityRef,
        agent: &IdentityRef,
        delegation_name: &str,
    ) -> BridgeResult<()>;
}

/// Default REST binding of the resolver capability
pub struct RestResolverClient {
    http_client: reqwest::Client,
}

impl RestResolverClient {
    /// Build the client with a timeout and user-agent
    pub fn new(user_agent: &str, timeout: std::time::Duration) -> BridgeResult<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| {
                BridgeError::RemoteOperation(format!("failed to create HTTP client: {}", e))
            })?;
        Ok(Self { http_client })
    }

    fn discover_url(resolver_address: &Url, did: &str) -> BridgeResult<Url> {
        resolver_address
            .join(&format!("1.0/discover/{}", did))
            .map_err(|e| BridgeError::InvalidArgument(format!("invalid resolver address: {}", e)))
    }

    fn register_url(resolver_address: &Url) -> BridgeResult<Url> {
        resolver_address
            .join("1.0/register")
            .map_err(|e| BridgeError::InvalidArgument(format!("invalid resolver address: {}", e)))
    }
}

#[async_trait]
impl ResolverClient for RestResolverClient {
    async fn get_document(
        &self,
        resolver_address: &Url,
        did: &str,
    ) -> BridgeResult<serde_json::Value> {
        let url = Self::discover_url(resolver_address, did)?;
        debug!(did = %did, url = %url, "fetching registered document");

        let response = self.http_client.get(url).send().await.map_err(|e| {
            BridgeError::RemoteOperation(format!("failed to fetch document: {}", e))
        })?;

        if !response.status().is_success() {
            return Err(BridgeError::RemoteOperation(format!(
                "resolver returned error: {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| BridgeError::Serialization(format!("invalid resolver document: {}", e)))
    }

    async fn register_delegation(
        &self,
        resolver_address: &Url,
        subject: &IdentityRef,
        agent: &IdentityRef,
        delegation_name: &str,
    ) -> BridgeResult<()> {
        let url = Self::register_url(resolver_address)?;
        debug!(
            subject = %subject.did,
            agent = %agent.did,
            name = %delegation_name,
            "registering delegation"
        );

        let body = serde_json::json!({
            "subjectDid": subject.did,
            "agentDid": agent.did,
            "delegationName": delegation_name,
        });

        let response = self
            .http_client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                BridgeError::RemoteOperation(format!("failed to register delegation: {}", e))
            })?;

        if !response.status().is_success() {
            return Err(BridgeError::RemoteOperation(format!(
                "resolver returned error: {}",
                response.status()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discover_url_shape() {
        let base = Url::parse("https://resolver.example").unwrap();
        let url = RestResolverClient::discover_url(&base, "did:iot:abc").unwrap();
        assert_eq!(url.as_str(), "https://resolver.example/1.0/discover/did:iot:abc");
    }

    #[test]
    fn test_client_builds() {
        assert!(
            RestResolverClient::new("identity-bridge/test", std::time::Duration::from_secs(5))
                .is_ok()
        );
    }
}
