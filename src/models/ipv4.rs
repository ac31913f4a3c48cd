//! IPv4 CIDR utilities.
//!
//! Provides [`Cidr`] for representing an address prefix in `a.b.c.d/len`
//! notation, with containment checks used when matching NSG rule sources.

use std::error::Error;
use std::net::Ipv4Addr;

/// Maximum length for an IPv4 prefix (32 bits).
pub const MAX_LENGTH: u8 = 32;

/// Convert a CIDR prefix length to a subnet mask as u32.
pub fn get_cidr_mask(len: u8) -> Result<u32, Box<dyn Error>> {
    if len > MAX_LENGTH {
        Err("Network length is too long".into())
    } else {
        let right_len = MAX_LENGTH - len;
        let all_bits = u32::MAX as u64;

        let mask = (all_bits >> right_len) << right_len;

        Ok(mask as u32)
    }
}

/// IPv4 address prefix in CIDR notation.
#[derive(Eq, PartialEq, Ord, PartialOrd, Debug, Copy, Clone, Hash)]
pub struct Cidr {
    /// The network address.
    pub addr: Ipv4Addr,
    /// The prefix length (0-32).
    pub mask: u8,
}

impl Cidr {
    /// Parse a CIDR string (e.g., "10.0.0.0/24"). A bare address is
    /// accepted as a /32.
    pub fn new(addr_cidr: &str) -> Result<Cidr, Box<dyn Error>> {
        let addr_cidr = addr_cidr.trim();
        let parts: Vec<&str> = addr_cidr.split('/').collect();
        let (addr_str, mask): (&str, u8) = match parts.as_slice() {
            [addr] => (addr, MAX_LENGTH),
            [addr, mask] => (addr, mask.parse()?),
            _ => return Err("Invalid address/mask".into()),
        };
        let addr: Ipv4Addr = addr_str
            .parse()
            .map_err(|_| format!("Invalid address {}", addr_str))?;
        if mask > MAX_LENGTH {
            return Err("Network length is too long".into());
        }
        Ok(Cidr { addr, mask })
    }

    /// Whether `ip` falls inside this prefix.
    pub fn contains(&self, ip: Ipv4Addr) -> bool {
        match get_cidr_mask(self.mask) {
            Ok(mask) => (u32::from(ip) & mask) == (u32::from(self.addr) & mask),
            Err(_) => false,
        }
    }
}

impl std::fmt::Display for Cidr {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}/{}", self.addr, self.mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_cidr_mask() {
        assert_eq!(get_cidr_mask(0).unwrap(), 0x00000000);
        assert_eq!(get_cidr_mask(8).unwrap(), 0xFF000000);
        assert_eq!(get_cidr_mask(16).unwrap(), 0xFFFF0000);
        assert_eq!(get_cidr_mask(24).unwrap(), 0xFFFFFF00);
        assert_eq!(get_cidr_mask(32).unwrap(), 0xFFFFFFFF);
        assert!(get_cidr_mask(33).is_err());
    }

    #[test]
    fn test_parse() {
        let cidr = Cidr::new("10.0.0.0/24").unwrap();
        assert_eq!(cidr.addr, Ipv4Addr::new(10, 0, 0, 0));
        assert_eq!(cidr.mask, 24);

        let host = Cidr::new("203.0.113.50").unwrap();
        assert_eq!(host.mask, 32);

        assert!(Cidr::new("10.0.0.0/33").is_err());
        assert!(Cidr::new("not-an-ip/24").is_err());
        assert!(Cidr::new("10.0.0.0/24/8").is_err());
    }

    #[test]
    fn test_contains() {
        let net = Cidr::new("10.0.0.0/24").unwrap();
        assert!(net.contains(Ipv4Addr::new(10, 0, 0, 1)));
        assert!(net.contains(Ipv4Addr::new(10, 0, 0, 255)));
        assert!(!net.contains(Ipv4Addr::new(10, 0, 1, 0)));

        let host = Cidr::new("203.0.113.50/32").unwrap();
        assert!(host.contains(Ipv4Addr::new(203, 0, 113, 50)));
        assert!(!host.contains(Ipv4Addr::new(203, 0, 113, 51)));

        // A non-canonical network address still matches on the masked bits.
        let sloppy = Cidr::new("192.168.1.42/24").unwrap();
        assert!(sloppy.contains(Ipv4Addr::new(192, 168, 1, 7)));
    }
}
