//! Frame members and their end releases

use serde::{Deserialize, Serialize};

/// Free bending rotations (RY, RZ) at one end
const HINGE: [bool; 6] = [false, false, false, false, true, true];

/// Released DOFs at each end, ordered `[DX, DY, DZ, RX, RY, RZ]`
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MemberReleases {
    pub i_node: [bool; 6],
    pub j_node: [bool; 6],
}

impl MemberReleases {
    /// Fully continuous at both ends
    pub fn none() -> Self {
        Self::default()
    }

    pub fn pin_i() -> Self {
        Self {
            i_node: HINGE,
            ..Self::default()
        }
    }

    pub fn pin_j() -> Self {
        Self {
            j_node: HINGE,
            ..Self::default()
        }
    }

    /// Simply connected at both ends, as for secondary beams and purlins
    pub fn pin_both() -> Self {
        Self {
            i_node: HINGE,
            j_node: HINGE,
        }
    }

    /// Flags in local element DOF order, i end first
    pub fn as_array(&self) -> [bool; 12] {
        let mut flags = [false; 12];
        flags[..6].copy_from_slice(&self.i_node);
        flags[6..].copy_from_slice(&self.j_node);
        flags
    }

    pub fn any(&self) -> bool {
        self.as_array().contains(&true)
    }
}

/// Structural role of a member; selects its section, material and design check
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MemberRole {
    Column,
    PrimaryBeam,
    SecondaryBeam,
    Purlin,
    Generic,
}

impl MemberRole {
    /// Horizontal members carrying floor or roof load
    pub fn is_beam(&self) -> bool {
        matches!(
            self,
            MemberRole::PrimaryBeam | MemberRole::SecondaryBeam | MemberRole::Purlin
        )
    }

    /// Short tag used in generated member names
    pub fn tag(&self) -> &'static str {
        match self {
            MemberRole::Column => "C",
            MemberRole::PrimaryBeam => "B",
            MemberRole::SecondaryBeam => "SB",
            MemberRole::Purlin => "P",
            MemberRole::Generic => "M",
        }
    }
}

/// Beam or column between two named nodes
///
/// Material and section are keys into the owning model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub i_node: String,
    pub j_node: String,
    pub material: String,
    pub section: String,
    /// Roll of the section about the member axis (radians)
    pub rotation: f64,
    pub releases: MemberReleases,
    pub role: MemberRole,
}

impl Member {
    pub fn new(i_node: &str, j_node: &str, material: &str, section: &str) -> Self {
        Self {
            i_node: i_node.to_string(),
            j_node: j_node.to_string(),
            material: material.to_string(),
            section: section.to_string(),
            rotation: 0.0,
            releases: MemberReleases::none(),
            role: MemberRole::Generic,
        }
    }

    pub fn with_rotation(mut self, rotation: f64) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_releases(mut self, releases: MemberReleases) -> Self {
        self.releases = releases;
        self
    }

    pub fn with_role(mut self, role: MemberRole) -> Self {
        self.role = role;
        self
    }
}
