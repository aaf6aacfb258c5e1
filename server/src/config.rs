use std::net::SocketAddr;

pub const ADDR_VAR: &str = "UR_SERVER_ADDR";
pub const DEFAULT_ADDR: SocketAddr = SocketAddr::new(
    std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST),
    3000,
);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { addr: DEFAULT_ADDR }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_addr_var(std::env::var(ADDR_VAR).ok().as_deref())
    }

    /// An unparsable address falls back to the default with a warning.
    pub fn from_addr_var(value: Option<&str>) -> Self {
        let Some(raw) = value else {
            return Self::default();
        };
        match raw.parse() {
            Ok(addr) => Self { addr },
            Err(err) => {
                tracing::warn!(value = %raw, error = %err, "ignoring invalid {ADDR_VAR}");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_addr_from_var() {
        assert_eq!(ServerConfig::from_addr_var(None).addr, DEFAULT_ADDR);
        assert_eq!(
            ServerConfig::from_addr_var(Some("0.0.0.0:8080")).addr,
            "0.0.0.0:8080".parse::<SocketAddr>().unwrap()
        );
        assert_eq!(
            ServerConfig::from_addr_var(Some("not an address")).addr,
            DEFAULT_ADDR
        );
    }
}
