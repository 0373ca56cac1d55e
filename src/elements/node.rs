//! Frame nodes

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Frame joint position in metres; Y is vertical
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub x: f64,
    /// Elevation
    pub y: f64,
    pub z: f64,
}

impl Node {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn coords(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    pub fn position(&self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }

    pub fn distance_to(&self, other: &Node) -> f64 {
        (other.position() - self.position()).norm()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_node_distance() {
        let base = Node::new(6.0, 0.0, 5.0);
        let top = Node::new(6.0, 3.6, 5.0);
        assert_eq!(top.coords(), [6.0, 3.6, 5.0]);
        assert!((base.distance_to(&top) - 3.6).abs() < 1e-12);
        assert_eq!(Node::default().position(), Vector3::zeros());
    }
}
