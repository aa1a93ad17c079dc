//! 本机局域网地址解析
//!
//! 二维码里的地址必须是同一局域网内其他设备能访问到的 IPv4 地址。
//!
//! 选择顺序:
//! 1. `192.168.1.0/24` 内的非回环地址（家用路由器最常见的网段）
//! 2. 第一个非回环 IPv4 地址
//! 3. `localhost`

use log::{debug, warn};
use std::net::{IpAddr, Ipv4Addr};

/// 无可用网卡时的兜底主机名
pub const FALLBACK_HOST: &str = "localhost";

/// 地址解析接口，测试中可替换为固定地址
pub trait AddressResolver: Send + Sync {
    fn resolve(&self) -> String;
}

/// 枚举系统网卡的解析器
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemResolver;

impl AddressResolver for SystemResolver {
    fn resolve(&self) -> String {
        local_ip()
    }
}

/// 总是返回同一地址
#[derive(Debug, Clone)]
pub struct FixedResolver(pub String);

impl AddressResolver for FixedResolver {
    fn resolve(&self) -> String {
        self.0.clone()
    }
}

/// 获取本机局域网 IPv4 地址，永不失败
pub fn local_ip() -> String {
    match if_addrs::get_if_addrs() {
        Ok(interfaces) => {
            for iface in &interfaces {
                debug!("Interface {}: {}", iface.name, iface.ip());
            }
            select_address(interfaces.iter().map(if_addrs::Interface::ip))
        }
        Err(e) => {
            warn!("Failed to enumerate network interfaces: {}", e);
            FALLBACK_HOST.to_string()
        }
    }
}

/// 从网卡地址列表中挑选对外地址（纯函数）
pub fn select_address<I>(addrs: I) -> String
where
    I: IntoIterator<Item = IpAddr>,
{
    let candidates: Vec<Ipv4Addr> = addrs
        .into_iter()
        .filter_map(|ip| match ip {
            IpAddr::V4(v4) if !v4.is_loopback() => Some(v4),
            _ => None,
        })
        .collect();

    candidates
        .iter()
        .find(|ip| is_home_subnet(ip))
        .or_else(|| candidates.first())
        .map_or_else(|| FALLBACK_HOST.to_string(), ToString::to_string)
}

fn is_home_subnet(ip: &Ipv4Addr) -> bool {
    let [a, b, c, _] = ip.octets();
    (a, b, c) == (192, 168, 1)
}
