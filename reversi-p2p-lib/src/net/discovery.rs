//! Serverless peer discovery and role election.
//!
//! Two symmetric peers find each other over UDP broadcast and come out with
//! exactly one connected TCP stream: one side accepted it (P1, plays Black),
//! the other initiated it (P2, plays White). Each round listens passively
//! for an advert first, then advertises its own game and waits on both the
//! TCP listener and the UDP socket; races are arbitrated by a strict
//! lexicographic tie-break on (advert timestamp, IP, port).

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr, SocketAddrV4};
use std::time::{Duration, SystemTime};

use rand::seq::SliceRandom;
use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::{TcpListener, TcpStream, UdpSocket};
use tokio::time::{sleep, sleep_until, timeout, Instant};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::game::board::Color;
use crate::protocol::{decode_new_game, encode_new_game, PORT_MAX, PORT_MIN};

/// Default duration of one discovery window.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(5);

/// Which end of the gameplay stream this peer is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Accepted the TCP connection; plays Black and moves first.
    P1,
    /// Initiated the TCP connection; plays White.
    P2,
}

impl Role {
    pub fn color(self) -> Color {
        match self {
            Role::P1 => Color::Black,
            Role::P2 => Color::White,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Role::P1 => "P1",
            Role::P2 => "P2",
        })
    }
}

/// Tie-break key for near-simultaneous adverts. The lexicographically
/// smaller key keeps the acceptor (P1) slot: earliest advert first, then
/// lower IP, then lower port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct MatchKey {
    pub ts: SystemTime,
    pub ip: Ipv4Addr,
    pub port: u16,
}

/// Strictly-less comparison. Identical keys demote neither side; that round
/// simply retries.
pub fn prefer_peer(mine: MatchKey, peer: MatchKey) -> bool {
    peer < mine
}

/// Successful discovery result. The stream is fresh; no bytes have been
/// exchanged on it.
pub struct Discovered {
    pub role: Role,
    pub stream: TcpStream,
    pub peer: SocketAddr,
    pub gameplay_port: u16,
}

/// Run discovery rounds until a peer is matched. Socket hiccups inside a
/// round are logged and absorbed; only the inability to bind the shared UDP
/// port is surfaced.
pub async fn discover_and_connect(
    broadcast_addr: Ipv4Addr,
    broadcast_port: u16,
    window: Duration,
) -> Result<Discovered> {
    let udp = bind_udp_listener(broadcast_port)?;
    let broadcaster = make_broadcaster().await?;
    let advert_to = SocketAddrV4::new(broadcast_addr, broadcast_port);
    let local_ip = local_ipv4_guess();

    let mut attempt = 0u64;
    loop {
        attempt += 1;
        debug!(attempt, "listening for game adverts");

        // Passive phase: join an advertised game if one shows up.
        if let Some((peer_ip, peer_port)) = wait_for_advert(&udp, window).await {
            match timeout(window, TcpStream::connect((peer_ip, peer_port))).await {
                Ok(Ok(stream)) => {
                    let peer = SocketAddr::from((peer_ip, peer_port));
                    info!(%peer, "joining advertised game");
                    return Ok(Discovered {
                        role: Role::P2,
                        stream,
                        peer,
                        gameplay_port: peer_port,
                    });
                }
                Ok(Err(e)) => {
                    debug!(%peer_ip, peer_port, error = %e, "stale advert, connect failed");
                    continue;
                }
                Err(_) => {
                    debug!(%peer_ip, peer_port, "stale advert, connect timed out");
                    continue;
                }
            }
        }

        // Active phase: advertise our own game and wait for a taker.
        let Some((listener, gameplay_port)) = bind_gameplay_listener().await else {
            warn!("no free gameplay port in [{PORT_MIN}..{PORT_MAX}], retrying");
            sleep(Duration::from_millis(200)).await;
            continue;
        };
        let my_key = MatchKey {
            ts: SystemTime::now(),
            ip: local_ip,
            port: gameplay_port,
        };
        let payload = encode_new_game(gameplay_port);
        if let Err(e) = broadcaster.send_to(payload.as_bytes(), advert_to).await {
            warn!(error = %e, "failed to broadcast advert, retrying round");
            continue;
        }
        debug!(gameplay_port, "advertised new game");

        let deadline = Instant::now() + window;
        match wait_accept_or_demote(&udp, &listener, my_key, deadline).await {
            Active::Accepted(stream, peer) => {
                info!(%peer, gameplay_port, "peer joined our game");
                return Ok(Discovered {
                    role: Role::P1,
                    stream,
                    peer,
                    gameplay_port,
                });
            }
            Active::Demote(ip, port) => {
                // The listener must be gone before we switch sides.
                drop(listener);
                debug!(%ip, port, "lost the tie-break, demoting to connector");
                if let Some((stream, peer)) =
                    demoted_connect(&udp, my_key, (ip, port), window, deadline).await
                {
                    info!(%peer, "joined winning peer's game");
                    let gameplay_port = peer.port();
                    return Ok(Discovered {
                        role: Role::P2,
                        stream,
                        peer,
                        gameplay_port,
                    });
                }
            }
            Active::TimedOut => {}
        }
        // Window expired with no resolution; next round.
    }
}

enum Active {
    Accepted(TcpStream, SocketAddr),
    Demote(Ipv4Addr, u16),
    TimedOut,
}

/// Wait on both the gameplay listener and the UDP socket until the deadline.
async fn wait_accept_or_demote(
    udp: &UdpSocket,
    listener: &TcpListener,
    my_key: MatchKey,
    deadline: Instant,
) -> Active {
    let mut buf = [0u8; 2048];
    loop {
        tokio::select! {
            res = listener.accept() => match res {
                Ok((stream, peer)) => return Active::Accepted(stream, peer),
                Err(e) => warn!(error = %e, "accept failed, still waiting"),
            },
            res = udp.recv_from(&mut buf) => match res {
                Ok((n, from)) => {
                    if let Some((peer_ip, peer_port)) = parse_advert(&buf[..n], from) {
                        let peer_key = MatchKey {
                            ts: SystemTime::now(),
                            ip: peer_ip,
                            port: peer_port,
                        };
                        if prefer_peer(my_key, peer_key) {
                            return Active::Demote(peer_ip, peer_port);
                        }
                        // Includes our own advert echoed back by the
                        // broadcast, which always carries a later timestamp.
                        debug!(%peer_ip, peer_port, "competing advert lost the tie-break, ignoring");
                    }
                }
                Err(e) => debug!(error = %e, "udp receive failed, ignoring"),
            },
            _ = sleep_until(deadline) => return Active::TimedOut,
        }
    }
}

/// After losing the tie-break: connect to the winning peer, falling back to
/// further winning adverts for the rest of the window if the connect fails.
async fn demoted_connect(
    udp: &UdpSocket,
    my_key: MatchKey,
    first: (Ipv4Addr, u16),
    window: Duration,
    deadline: Instant,
) -> Option<(TcpStream, SocketAddr)> {
    let (mut ip, mut port) = first;
    let mut buf = [0u8; 2048];
    loop {
        match timeout(window, TcpStream::connect((ip, port))).await {
            Ok(Ok(stream)) => return Some((stream, SocketAddr::from((ip, port)))),
            Ok(Err(e)) => debug!(%ip, port, error = %e, "connect to winning peer failed"),
            Err(_) => debug!(%ip, port, "connect to winning peer timed out"),
        }
        loop {
            tokio::select! {
                res = udp.recv_from(&mut buf) => {
                    if let Ok((n, from)) = res {
                        if let Some((peer_ip, peer_port)) = parse_advert(&buf[..n], from) {
                            let peer_key = MatchKey {
                                ts: SystemTime::now(),
                                ip: peer_ip,
                                port: peer_port,
                            };
                            if prefer_peer(my_key, peer_key) {
                                ip = peer_ip;
                                port = peer_port;
                                break;
                            }
                        }
                    }
                }
                _ = sleep_until(deadline) => return None,
            }
        }
    }
}

/// Wait up to `window` for a well-formed advert; malformed datagrams and
/// receive errors are skipped.
async fn wait_for_advert(udp: &UdpSocket, window: Duration) -> Option<(Ipv4Addr, u16)> {
    let mut buf = [0u8; 2048];
    let wait = async {
        loop {
            match udp.recv_from(&mut buf).await {
                Ok((n, from)) => {
                    if let Some(found) = parse_advert(&buf[..n], from) {
                        return found;
                    }
                }
                Err(e) => debug!(error = %e, "udp receive failed, ignoring"),
            }
        }
    };
    timeout(window, wait).await.ok()
}

fn parse_advert(data: &[u8], from: SocketAddr) -> Option<(Ipv4Addr, u16)> {
    let line = String::from_utf8_lossy(data);
    let port = decode_new_game(line.as_ref()).ok()?;
    match from.ip() {
        IpAddr::V4(ip) => Some((ip, port)),
        IpAddr::V6(_) => None,
    }
}

/// Bind the shared advert port with address and port reuse so two peers on
/// one host can coexist.
fn bind_udp_listener(port: u16) -> std::io::Result<UdpSocket> {
    let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), port);
    let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))?;
    socket.set_reuse_address(true)?;
    #[cfg(any(target_os = "linux", target_os = "android", target_os = "freebsd"))]
    socket.set_reuse_port(true)?;
    socket.bind(&addr.into())?;
    let std_sock: std::net::UdpSocket = socket.into();
    std_sock.set_nonblocking(true)?;
    UdpSocket::from_std(std_sock)
}

async fn make_broadcaster() -> std::io::Result<UdpSocket> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).await?;
    socket.set_broadcast(true)?;
    Ok(socket)
}

/// Probe-bind random candidates from the gameplay range until one sticks.
/// `None` when the whole range is taken.
pub async fn bind_gameplay_listener() -> Option<(TcpListener, u16)> {
    let mut candidates: Vec<u16> = (PORT_MIN..=PORT_MAX).collect();
    candidates.shuffle(&mut rand::rng());
    for port in candidates {
        if let Ok(listener) = TcpListener::bind((Ipv4Addr::UNSPECIFIED, port)).await {
            return Some((listener, port));
        }
    }
    None
}

/// Best-effort local IPv4 for the tie-break key. Connecting a UDP socket
/// performs a route lookup without sending a packet.
fn local_ipv4_guess() -> Ipv4Addr {
    let guess = std::net::UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).and_then(|s| {
        s.connect(("8.8.8.8", 80))?;
        s.local_addr()
    });
    match guess {
        Ok(SocketAddr::V4(addr)) => *addr.ip(),
        _ => Ipv4Addr::BROADCAST,
    }
}
