use crate::models::config::RemoteConfig;
use crate::models::error::{BackupError, Result};
use crate::repo::remote::{RemoteConnector, RemoteStore};
use log::{debug, info};
use std::io::Read;
use suppaftp::types::FileType;
use suppaftp::FtpStream;

/// Opens plain FTP sessions with the configured credentials
pub struct FtpConnector;

pub struct FtpStore {
    stream: FtpStream,
}

impl RemoteConnector for FtpConnector {
    type Store = FtpStore;

    fn connect(&self, remote: &RemoteConfig) -> Result<FtpStore> {
        info!("Connecting to FTP server {}", remote.address());
        let mut stream = FtpStream::connect(remote.address())
            .map_err(|e| BackupError::remote(format!("connect {}", remote.address()), e))?;

        stream
            .login(remote.user.as_str(), remote.password.as_str())
            .map_err(|e| BackupError::remote(format!("login as {}", remote.user), e))?;

        stream
            .transfer_type(FileType::Binary)
            .map_err(|e| BackupError::remote("set binary transfer type", e))?;

        debug!("Logged in to {} as {}", remote.host, remote.user);
        Ok(FtpStore { stream })
    }
}

impl RemoteStore for FtpStore {
    fn cwd(&mut self, dir: &str) -> Result<()> {
        self.stream
            .cwd(dir)
            .map_err(|e| BackupError::remote(format!("cwd {}", dir), e))
    }

    fn put(&mut self, name: &str, mut reader: &mut dyn Read) -> Result<u64> {
        self.stream
            .put_file(name, &mut reader)
            .map_err(|e| BackupError::remote(format!("STOR {}", name), e))
    }

    fn list_names(&mut self) -> Result<Vec<String>> {
        self.stream
            .nlst(None)
            .map_err(|e| BackupError::remote("NLST", e))
    }

    fn delete(&mut self, name: &str) -> Result<()> {
        self.stream
            .rm(name)
            .map_err(|e| BackupError::remote(format!("DELE {}", name), e))
    }

    fn quit(&mut self) -> Result<()> {
        self.stream
            .quit()
            .map_err(|e| BackupError::remote("QUIT", e))
    }
}
