/// A point in the game world. Coordinates are continuous because the
/// teleport movement tolerance is half a distance unit, below tile
/// resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn distance_to(self, other: Position) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_to_self_is_zero() {
        let position = Position::new(100.0, 64.0, -20.0);
        assert_eq!(position.distance_to(position), 0.0);
    }

    #[test]
    fn distance_is_euclidean() {
        let a = Position::new(0.0, 0.0, 0.0);
        let b = Position::new(3.0, 4.0, 0.0);
        assert_eq!(a.distance_to(b), 5.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let a = Position::new(1.5, -2.0, 8.0);
        let b = Position::new(-0.5, 7.0, 3.5);
        assert_eq!(a.distance_to(b), b.distance_to(a));
    }

    #[test]
    fn vertical_movement_counts() {
        let a = Position::new(10.0, 60.0, 10.0);
        let b = Position::new(10.0, 60.75, 10.0);
        assert!(a.distance_to(b) > 0.5);
    }
}
