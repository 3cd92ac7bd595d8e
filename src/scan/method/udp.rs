use std::{
    io::ErrorKind,
    net::{Ipv4Addr, SocketAddrV4, UdpSocket},
    time::Duration,
};

use crate::{
    error::ScanError,
    scan::{Executor, PortState},
};

const RECV_BUF_SZ: usize = 1024;

#[derive(Debug)]
pub struct UdpScan;

impl Executor for UdpScan {
    fn scan(&self, addr: &SocketAddrV4, timeout: Duration) -> Result<PortState, ScanError> {
        let failed = |e| ScanError::connection(*addr, e);

        let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).map_err(failed)?;
        // Connected sockets get ICMP errors reported back on recv.
        socket.connect(addr).map_err(failed)?;
        socket.set_read_timeout(Some(timeout)).map_err(failed)?;
        socket.send(&[]).map_err(failed)?;

        let mut buf = [0; RECV_BUF_SZ];
        match socket.recv(&mut buf) {
            Ok(_) => Ok(PortState::Open),
            Err(e) => match e.kind() {
                ErrorKind::WouldBlock | ErrorKind::TimedOut => Ok(PortState::Closed),
                ErrorKind::ConnectionRefused => {
                    log::debug!("Port unreachable reported for `{}`", addr);

                    Ok(PortState::Closed)
                }
                _ => Err(failed(e)),
            },
        }
    }
}
