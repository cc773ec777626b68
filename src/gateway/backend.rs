use async_trait::async_trait;
use tonic::Status;
use tonic::transport::{Channel, Endpoint};
use tracing::info;

use crate::error::{Error, Result};
use crate::proto::key_value_client::KeyValueClient;
use crate::proto::{
    DeleteRequest, DeleteResponse, GetRequest, GetResponse, SetRequest, SetResponse,
};

/// The storage operations the gateway forwards to
#[async_trait]
pub trait KvBackend: Send + Sync {
    async fn get_value(&self, key: String) -> std::result::Result<GetResponse, Status>;

    async fn set_value(
        &self,
        key: String,
        value: String,
    ) -> std::result::Result<SetResponse, Status>;

    async fn delete_value(&self, key: String) -> std::result::Result<DeleteResponse, Status>;
}

/// Backend that calls the storage service over gRPC
#[derive(Clone)]
pub struct RpcBackend {
    client: KeyValueClient<Channel>,
}

impl RpcBackend {
    /// Create a backend for `addr`; the connection is made on first use.
    pub fn connect_lazy(addr: &str) -> Result<Self> {
        let endpoint = Endpoint::from_shared(addr.to_string()).map_err(|e| Error::InvalidAddr {
            addr: addr.to_string(),
            reason: e.to_string(),
        })?;
        info!("Gateway will call storage service at {}", addr);

        Ok(Self {
            client: KeyValueClient::new(endpoint.connect_lazy()),
        })
    }

    /// Create a backend and establish the connection now
    pub async fn connect(addr: &str) -> Result<Self> {
        let client = KeyValueClient::connect(addr.to_string()).await?;
        info!("Connected to storage service at {}", addr);
        Ok(Self { client })
    }
}

#[async_trait]
impl KvBackend for RpcBackend {
    async fn get_value(&self, key: String) -> std::result::Result<GetResponse, Status> {
        let mut client = self.client.clone();
        let resp = client.get_value(GetRequest { key }).await?;
        Ok(resp.into_inner())
    }

    async fn set_value(
        &self,
        key: String,
        value: String,
    ) -> std::result::Result<SetResponse, Status> {
        let mut client = self.client.clone();
        let resp = client.set_value(SetRequest { key, value }).await?;
        Ok(resp.into_inner())
    }

    async fn delete_value(&self, key: String) -> std::result::Result<DeleteResponse, Status> {
        let mut client = self.client.clone();
        let resp = client.delete_value(DeleteRequest { key }).await?;
        Ok(resp.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_addr() {
        let err = RpcBackend::connect_lazy("not a uri").err().unwrap();
        assert!(matches!(err, Error::InvalidAddr { .. }));
    }

    #[tokio::test]
    async fn test_unreachable_backend_fails_call() {
        // Port 1 on loopback refuses connections.
        let backend = RpcBackend::connect_lazy("http://127.0.0.1:1").unwrap();
        assert!(backend.get_value("k".to_string()).await.is_err());
    }
}
