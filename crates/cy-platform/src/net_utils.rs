use local_ip_address::list_afinet_netifas;
use std::net::{IpAddr, Ipv4Addr, SocketAddr, TcpListener};
use tracing::{debug, info, warn};

/// Detect the best physical LAN IPv4 address to advertise to peers.
///
/// 检测最佳的物理局域网 IPv4 地址，供手机等设备连接。
///
/// # Filtering rules / 过滤规则
/// - Exclude loopback (127.*)
/// - Exclude link-local (169.254.*)
/// - Exclude tunnel interfaces (utun, tun, tap)
/// - Exclude Clash TUN addresses (198.18.0.0/15)
/// - Only keep private IPv4 addresses (10.*, 172.16-31.*, 192.168.*)
pub fn get_physical_lan_ip() -> Option<Ipv4Addr> {
    let interfaces = match list_afinet_netifas() {
        Ok(ifaces) => ifaces,
        Err(e) => {
            warn!(error = %e, "failed to enumerate network interfaces");
            return None;
        }
    };

    let found = interfaces.into_iter().find_map(|(iface_name, ip)| match ip {
        IpAddr::V4(v4) if is_lan_candidate(&iface_name, v4) => Some((iface_name, v4)),
        _ => None,
    });

    match found {
        Some((iface_name, v4)) => {
            info!(ip = %v4, interface = %iface_name, "detected physical LAN IP");
            Some(v4)
        }
        None => {
            warn!("no suitable physical LAN IP found");
            None
        }
    }
}

/// True when something already listens on `port` on any interface.
///
/// Checked once at startup so a second instance fails fast instead of
/// racing the first one for the socket.
pub fn is_port_in_use(port: u16) -> bool {
    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
    match TcpListener::bind(addr) {
        Ok(_) => false,
        Err(e) => {
            debug!(%addr, error = %e, "port probe failed");
            true
        }
    }
}

fn is_lan_candidate(iface_name: &str, ip: Ipv4Addr) -> bool {
    !ip.is_loopback()
        && !ip.is_link_local()
        && !is_tunnel_interface(iface_name)
        && !is_clash_tun_address(ip)
        && is_private_ipv4(ip)
}

fn is_tunnel_interface(name: &str) -> bool {
    name.contains("utun") || name.contains("tun") || name.contains("tap")
}

fn is_clash_tun_address(ip: Ipv4Addr) -> bool {
    let octets = ip.octets();
    octets[0] == 198 && (18..=19).contains(&octets[1])
}

fn is_private_ipv4(ip: Ipv4Addr) -> bool {
    let octets = ip.octets();
    match octets[0] {
        10 => true,
        172 => (16..=31).contains(&octets[1]),
        192 => octets[1] == 168,
        _ => false,
    }
}
