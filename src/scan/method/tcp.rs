use std::{
    io::ErrorKind,
    net::{SocketAddr, SocketAddrV4, TcpStream},
    time::Duration,
};

use crate::{
    error::ScanError,
    scan::{Executor, PortState},
};

#[derive(Debug)]
pub struct TcpScan;

impl Executor for TcpScan {
    fn scan(&self, addr: &SocketAddrV4, timeout: Duration) -> Result<PortState, ScanError> {
        match TcpStream::connect_timeout(&SocketAddr::V4(*addr), timeout) {
            // Stream is dropped right away, nothing is exchanged.
            Ok(_) => Ok(PortState::Open),
            Err(e) => match e.kind() {
                ErrorKind::ConnectionRefused
                | ErrorKind::ConnectionReset
                | ErrorKind::TimedOut
                | ErrorKind::WouldBlock => Ok(PortState::Closed),
                _ => Err(ScanError::connection(*addr, e)),
            },
        }
    }
}
