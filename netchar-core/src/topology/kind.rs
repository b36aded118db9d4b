use serde::Deserialize;
use std::fmt;

/// What a physical location is. The kind decides which enclosing
/// levels a location must have to be reachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
pub enum PhysicalLocationKind {
    /// user equipment, only reachable through a point of attachment
    #[default]
    #[serde(rename = "UE")]
    Ue,
    #[serde(rename = "FOG")]
    Fog,
    #[serde(rename = "EDGE")]
    Edge,
    #[serde(rename = "DC")]
    Dc,
    #[serde(rename = "CLOUD")]
    Cloud,
}

/// Kind of a network location: a point of attachment of some radio
/// technology, or the zone's default location for nodes that are wired
/// straight into the zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
pub enum NetworkLocationKind {
    #[default]
    #[serde(rename = "POA")]
    Poa,
    #[serde(rename = "POA-4G")]
    Poa4G,
    #[serde(rename = "POA-5G")]
    Poa5G,
    #[serde(rename = "POA-WIFI")]
    PoaWifi,
    #[serde(rename = "DEFAULT")]
    Default,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
pub enum ProcessKind {
    #[default]
    #[serde(rename = "UE-APP")]
    UeApp,
    #[serde(rename = "EDGE-APP")]
    EdgeApp,
    #[serde(rename = "CLOUD-APP")]
    CloudApp,
}

/// Enclosing level a physical location cannot do without.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredParent {
    Poa,
    Zone,
}

impl PhysicalLocationKind {
    pub fn required_parent(self) -> Option<RequiredParent> {
        match self {
            Self::Ue => Some(RequiredParent::Poa),
            Self::Fog | Self::Edge => Some(RequiredParent::Zone),
            Self::Dc | Self::Cloud => None,
        }
    }
}

impl NetworkLocationKind {
    /// `true` when the location is an actual point of attachment
    pub fn is_poa(self) -> bool {
        match self {
            Self::Poa | Self::Poa4G | Self::Poa5G | Self::PoaWifi => true,
            Self::Default => false,
        }
    }
}

impl fmt::Display for PhysicalLocationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Ue => "UE",
            Self::Fog => "FOG",
            Self::Edge => "EDGE",
            Self::Dc => "DC",
            Self::Cloud => "CLOUD",
        };
        f.write_str(s)
    }
}

impl fmt::Display for RequiredParent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Poa => f.write_str("point of attachment"),
            Self::Zone => f.write_str("zone"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_kinds() {
        let kind: PhysicalLocationKind = serde_json::from_str(r#""EDGE""#).unwrap();
        assert_eq!(kind, PhysicalLocationKind::Edge);

        let kind: NetworkLocationKind = serde_json::from_str(r#""POA-5G""#).unwrap();
        assert_eq!(kind, NetworkLocationKind::Poa5G);

        let kind: ProcessKind = serde_json::from_str(r#""CLOUD-APP""#).unwrap();
        assert_eq!(kind, ProcessKind::CloudApp);
    }

    #[test]
    fn unknown_kind_is_rejected() {
        assert!(serde_json::from_str::<PhysicalLocationKind>(r#""SATELLITE""#).is_err());
        assert!(serde_json::from_str::<NetworkLocationKind>(r#""POA-6G""#).is_err());
    }

    #[test]
    fn required_parents() {
        assert_eq!(
            PhysicalLocationKind::Ue.required_parent(),
            Some(RequiredParent::Poa)
        );
        assert_eq!(
            PhysicalLocationKind::Fog.required_parent(),
            Some(RequiredParent::Zone)
        );
        assert_eq!(PhysicalLocationKind::Cloud.required_parent(), None);
        assert!(!NetworkLocationKind::Default.is_poa());
        assert!(NetworkLocationKind::PoaWifi.is_poa());
    }
}
