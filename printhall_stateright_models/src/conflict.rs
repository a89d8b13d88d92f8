//! Toy copy of the station-class arithmetic the models check against.

/// Number of printing station classes.
pub const STATIONS: u8 = 4;

/// Station class for a 1-based student id.
pub fn station(id: u8) -> u8 {
    id % STATIONS
}

/// The one class a station contends with.
pub fn opponent(station: u8) -> u8 {
    (station + 2) % STATIONS
}

/// Whether two station classes contend for the same press.
pub fn conflicts(a: u8, b: u8) -> bool {
    opponent(a) == b
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_is_symmetric_and_irreflexive() {
        for a in 0..STATIONS {
            assert!(!conflicts(a, a));
            for b in 0..STATIONS {
                assert_eq!(conflicts(a, b), conflicts(b, a));
            }
        }
    }

    #[test]
    fn pairs_are_two_apart() {
        assert!(conflicts(0, 2));
        assert!(conflicts(1, 3));
        assert!(!conflicts(0, 1));
        assert!(!conflicts(2, 3));
    }
}
