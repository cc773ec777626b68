use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::{Request, Response, Status};
use tracing::{debug, info};

use crate::error::Result;
use crate::proto::key_value_server::{KeyValue, KeyValueServer};
use crate::proto::{
    DeleteRequest, DeleteResponse, GetRequest, GetResponse, SetRequest, SetResponse,
};
use crate::store::Store;

/// gRPC front of the store
pub struct KvService {
    store: Arc<Store>,
}

impl KvService {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }
}

#[tonic::async_trait]
impl KeyValue for KvService {
    async fn get_value(
        &self,
        request: Request<GetRequest>,
    ) -> std::result::Result<Response<GetResponse>, Status> {
        let key = request.into_inner().key;
        debug!("GetValue key={:?}", key);

        let value = self.store.get(&key);
        Ok(Response::new(GetResponse {
            found: value.is_some(),
            value: value.unwrap_or_default(),
            key,
        }))
    }

    async fn set_value(
        &self,
        request: Request<SetRequest>,
    ) -> std::result::Result<Response<SetResponse>, Status> {
        let SetRequest { key, value } = request.into_inner();

        let outcome = self.store.set(key, value);
        debug!("SetValue key={:?} existed={}", outcome.key, outcome.existed());

        Ok(Response::new(SetResponse {
            result: outcome.to_string(),
            existed: outcome.existed(),
            previous_value: outcome.previous_value().to_string(),
        }))
    }

    async fn delete_value(
        &self,
        request: Request<DeleteRequest>,
    ) -> std::result::Result<Response<DeleteResponse>, Status> {
        let key = request.into_inner().key;

        let outcome = self.store.delete(&key);
        debug!("DeleteValue key={:?} existed={}", outcome.key, outcome.existed);

        Ok(Response::new(DeleteResponse {
            result: outcome.to_string(),
            existed: outcome.existed,
        }))
    }
}

/// Storage RPC server
pub struct Server {
    listener: TcpListener,
    local_addr: SocketAddr,
    store: Arc<Store>,
}

impl Server {
    /// Create and bind the server to the specified address
    pub async fn bind(addr: &str) -> Result<Self> {
        Self::bind_with_store(addr, Arc::new(Store::new())).await
    }

    /// Bind the server around an existing store
    pub async fn bind_with_store(addr: &str, store: Arc<Store>) -> Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        info!("RPC server bound to {}", local_addr);

        Ok(Self {
            listener,
            local_addr,
            store,
        })
    }

    /// Get local listening address
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Shared handle to the backing store
    pub fn store(&self) -> Arc<Store> {
        Arc::clone(&self.store)
    }

    /// Serve requests until the process exits
    pub async fn run(self) -> Result<()> {
        self.run_until(std::future::pending()).await
    }

    /// Serve requests until `shutdown` resolves
    pub async fn run_until<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send,
    {
        info!("Storage server started, listening on {}", self.local_addr);

        let service = KvService::new(self.store);
        tonic::transport::Server::builder()
            .add_service(KeyValueServer::new(service))
            .serve_with_incoming_shutdown(TcpListenerStream::new(self.listener), shutdown)
            .await?;

        info!("Storage server on {} stopped", self.local_addr);
        Ok(())
    }
}
