pub mod ftp;
pub mod remote;
