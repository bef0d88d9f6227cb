use crate::models::config::RemoteConfig;
use crate::models::error::Result;
use std::io::Read;

/// An authenticated session on the remote backup store
pub trait RemoteStore {
    fn cwd(&mut self, dir: &str) -> Result<()>;

    /// Store `reader`'s bytes under `name` in the current directory
    fn put(&mut self, name: &str, reader: &mut dyn Read) -> Result<u64>;

    /// Names in the current directory
    fn list_names(&mut self) -> Result<Vec<String>>;

    fn delete(&mut self, name: &str) -> Result<()>;

    /// End the session
    fn quit(&mut self) -> Result<()>;
}

/// Opens sessions on a remote store
pub trait RemoteConnector {
    type Store: RemoteStore;

    fn connect(&self, remote: &RemoteConfig) -> Result<Self::Store>;
}
