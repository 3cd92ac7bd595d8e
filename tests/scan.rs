use std::{
    net::{Ipv4Addr, TcpListener, UdpSocket},
    thread,
    time::Duration,
};

use pscan::{
    config::ScanConfig,
    error::{ConfigError, ScanError},
    port::PortRange,
    scan::{ScanType, Scanner},
};

const TIMEOUT: Duration = Duration::from_millis(300);

// Every test listens on its own loopback address so parallel tests never see
// each other's sockets inside a scanned range.

fn around(port: u16) -> PortRange {
    PortRange::new(port.saturating_sub(2), port.saturating_add(3)).unwrap()
}

fn config(kind: ScanType, hosts: &[&str], ports: PortRange) -> ScanConfig {
    ScanConfig::new(kind, hosts.iter().copied(), ports)
        .and_then(|c| c.with_workers(4))
        .and_then(|c| c.with_timeout(TIMEOUT))
        .unwrap()
}

/// Answers `count` datagrams, then stops.
fn udp_echo(ip: Ipv4Addr, count: usize) -> (u16, thread::JoinHandle<()>) {
    let server = UdpSocket::bind((ip, 0)).unwrap();
    let port = server.local_addr().unwrap().port();

    let handle = thread::spawn(move || {
        let mut buf = [0; 64];
        for _ in 0..count {
            let (_, peer) = server.recv_from(&mut buf).unwrap();
            server.send_to(b"hi", peer).unwrap();
        }
    });

    (port, handle)
}

#[test]
fn tcp_reports_only_the_listening_port() {
    let listener = TcpListener::bind((Ipv4Addr::new(127, 0, 0, 20), 0)).unwrap();
    let port = listener.local_addr().unwrap().port();

    let report = Scanner::new(config(ScanType::Tcp, &["127.0.0.20"], around(port)))
        .start()
        .unwrap();

    assert_eq!(report.hosts.len(), 1);
    let result = report.get("127.0.0.20").unwrap();
    assert_eq!(result.open, [port]);
    assert!(result.is_clean());
}

#[test]
fn tcp_scan_is_repeatable() {
    let listener = TcpListener::bind((Ipv4Addr::new(127, 0, 0, 21), 0)).unwrap();
    let port = listener.local_addr().unwrap().port();
    let config = config(ScanType::Tcp, &["127.0.0.21"], around(port));

    let first = Scanner::new(config.clone()).start().unwrap();
    let second = Scanner::new(config).start().unwrap();

    assert_eq!(
        first.get("127.0.0.21").unwrap().open,
        second.get("127.0.0.21").unwrap().open
    );
}

#[test]
fn udp_reports_replying_port() {
    let ip = Ipv4Addr::new(127, 0, 0, 22);
    let (port, echo) = udp_echo(ip, 1);
    let ports = PortRange::new(port, port.saturating_add(1)).unwrap();

    let report = Scanner::new(config(ScanType::Udp, &["127.0.0.22"], ports))
        .start()
        .unwrap();

    assert_eq!(report.get("127.0.0.22").unwrap().open, [port]);
    echo.join().unwrap();
}

#[test]
fn udp_silence_is_not_open() {
    let server = UdpSocket::bind((Ipv4Addr::new(127, 0, 0, 23), 0)).unwrap();
    let port = server.local_addr().unwrap().port();

    let report = Scanner::new(config(
        ScanType::Udp,
        &["127.0.0.23"],
        PortRange::single(port),
    ))
    .start()
    .unwrap();

    let result = report.get("127.0.0.23").unwrap();
    assert!(result.open.is_empty());
    assert!(result.is_clean());
}

#[test]
fn bad_host_does_not_affect_the_others() {
    let listener = TcpListener::bind((Ipv4Addr::new(127, 0, 0, 24), 0)).unwrap();
    let port = listener.local_addr().unwrap().port();

    let report = Scanner::new(config(
        ScanType::Tcp,
        &["nothing-here.invalid", "127.0.0.24", "[::1]"],
        PortRange::single(port),
    ))
    .start()
    .unwrap();

    assert_eq!(report.hosts.len(), 3);
    assert_eq!(report.get("127.0.0.24").unwrap().open, [port]);

    let unresolved = report.get("nothing-here.invalid").unwrap();
    assert!(unresolved.open.is_empty());
    assert_eq!(unresolved.failures.len(), 1);

    let ipv6 = report.get("[::1]").unwrap();
    assert!(matches!(
        ipv6.failures[..],
        [ScanError::OnlyIpv4TargetSupported]
    ));
}

#[test]
fn many_hosts_few_workers() {
    let listener = TcpListener::bind((Ipv4Addr::new(127, 0, 0, 25), 0)).unwrap();
    let port = listener.local_addr().unwrap().port();

    // Same listener is reachable only on .25; the others refuse.
    let hosts: Vec<String> = (25..35).map(|i| format!("127.0.0.{}", i)).collect();
    let config = ScanConfig::new(ScanType::Tcp, hosts.clone(), PortRange::single(port))
        .and_then(|c| c.with_workers(3))
        .and_then(|c| c.with_timeout(TIMEOUT))
        .unwrap();

    let report = Scanner::new(config).start().unwrap();

    assert_eq!(report.hosts.len(), hosts.len());
    assert_eq!(report.open_count(), 1);
    assert_eq!(report.get("127.0.0.25").unwrap().open, [port]);
}

#[test]
fn inverted_range_is_rejected_before_scanning() {
    assert!(matches!(
        PortRange::new(5, 3),
        Err(ConfigError::InvalidPortRange { low: 5, high: 3 })
    ));

    let err: ScanError = "5-3".parse::<PortRange>().unwrap_err().into();
    assert!(matches!(err, ScanError::InvalidConfiguration(_)));
}

#[test]
fn invalid_inputs_are_configuration_errors() {
    let ports = PortRange::single(80);
    let no_hosts: [&str; 0] = [];

    assert!(matches!(
        ScanConfig::new(ScanType::Tcp, no_hosts, ports),
        Err(ConfigError::EmptyHostList)
    ));
    assert!(matches!(
        ScanConfig::new(ScanType::Tcp, ["127.0.0.1"], ports).and_then(|c| c.with_workers(0)),
        Err(ConfigError::InvalidWorkerCount(0))
    ));
    assert!(matches!(
        "0-65536".parse::<PortRange>(),
        Err(ConfigError::InvalidPort(_))
    ));
}
