//! IP allow-lists
//!
//! CIDR syntax is checked once, here, when the allow-list is built. The firewall
//! resolver trusts what it receives.

use ipnetwork::{Ipv4Network, Ipv6Network};
use serde::Serialize;
use std::fmt;

use crate::errors::{FrontdoorError, Result};

/// Address family of an allow-list entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum IpVersion {
    #[serde(rename = "IPV4")]
    V4,
    #[serde(rename = "IPV6")]
    V6,
}

impl fmt::Display for IpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IpVersion::V4 => f.write_str("IPV4"),
            IpVersion::V6 => f.write_str("IPV6"),
        }
    }
}

/// Ordered IPv4 and IPv6 CIDR ranges allowed through the firewall
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetworkAllowList {
    ipv4: Vec<Ipv4Network>,
    ipv6: Vec<Ipv6Network>,
}

impl NetworkAllowList {
    /// Parse both families. Order is kept; repeated ranges keep their first position.
    pub fn new<S: AsRef<str>>(ipv4: &[S], ipv6: &[S]) -> Result<Self> {
        let mut allow_list = Self::default();

        for (index, raw) in ipv4.iter().enumerate() {
            let network: Ipv4Network = parse_cidr(raw.as_ref(), "ipv4", index)?;
            if !allow_list.ipv4.contains(&network) {
                allow_list.ipv4.push(network);
            }
        }

        for (index, raw) in ipv6.iter().enumerate() {
            let network: Ipv6Network = parse_cidr(raw.as_ref(), "ipv6", index)?;
            if !allow_list.ipv6.contains(&network) {
                allow_list.ipv6.push(network);
            }
        }

        Ok(allow_list)
    }

    pub fn ipv4(&self) -> &[Ipv4Network] {
        &self.ipv4
    }

    pub fn ipv6(&self) -> &[Ipv6Network] {
        &self.ipv6
    }

    /// Ranges of one family rendered as CIDR strings
    pub fn addresses(&self, version: IpVersion) -> Vec<String> {
        match version {
            IpVersion::V4 => self.ipv4.iter().map(ToString::to_string).collect(),
            IpVersion::V6 => self.ipv6.iter().map(ToString::to_string).collect(),
        }
    }

    /// Families with at least one range, IPv4 first
    pub fn non_empty_families(&self) -> Vec<IpVersion> {
        let mut families = Vec::with_capacity(2);
        if !self.ipv4.is_empty() {
            families.push(IpVersion::V4);
        }
        if !self.ipv6.is_empty() {
            families.push(IpVersion::V6);
        }
        families
    }

    pub fn is_empty(&self) -> bool {
        self.ipv4.is_empty() && self.ipv6.is_empty()
    }
}

fn parse_cidr<N>(raw: &str, family: &str, index: usize) -> Result<N>
where
    N: std::str::FromStr,
    N::Err: fmt::Display,
{
    let field = format!("allow_list.{}[{}]", family, index);
    let trimmed = raw.trim();
    if !trimmed.contains('/') {
        return Err(FrontdoorError::validation_field(
            format!("'{}' is missing a prefix length", raw),
            field,
        ));
    }
    trimmed.parse::<N>().map_err(|e| {
        FrontdoorError::validation_field(
            format!("'{}' is not a valid {} CIDR range: {}", raw, family, e),
            field,
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_both_families() {
        let allow_list =
            NetworkAllowList::new(&["10.0.0.0/16", "192.168.1.0/24"], &["2001:db8::/32"]).unwrap();
        assert_eq!(allow_list.ipv4().len(), 2);
        assert_eq!(allow_list.ipv6().len(), 1);
        assert_eq!(allow_list.addresses(IpVersion::V4), vec!["10.0.0.0/16", "192.168.1.0/24"]);
        assert_eq!(allow_list.non_empty_families(), vec![IpVersion::V4, IpVersion::V6]);
    }

    #[test]
    fn test_empty_lists_are_permitted() {
        let empty: [&str; 0] = [];
        let allow_list = NetworkAllowList::new(&empty, &empty).unwrap();
        assert!(allow_list.is_empty());
        assert!(allow_list.non_empty_families().is_empty());
    }

    #[test]
    fn test_repeated_ranges_keep_first_position() {
        let empty: [&str; 0] = [];
        let allow_list =
            NetworkAllowList::new(&["10.0.0.0/8", "172.16.0.0/12", "10.0.0.0/8"], &empty)
                .unwrap();
        assert_eq!(allow_list.addresses(IpVersion::V4), vec!["10.0.0.0/8", "172.16.0.0/12"]);
    }

    #[test]
    fn test_rejects_malformed_ranges() {
        let empty: [&str; 0] = [];
        let missing_prefix = NetworkAllowList::new(&["10.0.0.1"], &empty).unwrap_err();
        assert!(matches!(missing_prefix, FrontdoorError::Validation { .. }));

        let wrong_family = NetworkAllowList::new(&empty, &["10.0.0.0/8"]).unwrap_err();
        match wrong_family {
            FrontdoorError::Validation { field, .. } => {
                assert_eq!(field.as_deref(), Some("allow_list.ipv6[0]"));
            }
            other => panic!("unexpected error: {other:?}"),
        }

        assert!(NetworkAllowList::new(&["10.0.0.0/33"], &empty).is_err());
    }
}
