//! External collaborator for evicting an incumbent torrent from whichever
//! download clients hold it, without deleting payload data.

use std::error::Error;

use async_trait::async_trait;

/// Requests removal of a torrent from one client and verifies it took
/// effect. Adapters implement this per torrent-client protocol.
#[async_trait]
pub trait ClientDriver: Send + Sync {
    /// Ask `client_host` to remove `info_hash`, keeping downloaded data on
    /// disk.
    async fn request_removal(
        &self,
        client_host: &str,
        info_hash: &str,
    ) -> Result<(), Box<dyn Error + Send + Sync>>;

    /// Whether `client_host` no longer reports holding `info_hash`.
    async fn verify_absent(
        &self,
        client_host: &str,
        info_hash: &str,
    ) -> Result<bool, Box<dyn Error + Send + Sync>>;
}
