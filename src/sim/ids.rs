//! Actor identities and the static station assignment.

use std::fmt;

use serde::Serialize;

/// Number of printing stations; also the number of conflict classes.
pub const STATIONS: u8 = 4;

/// 1-based student id in `[1, N]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct StudentId(pub u32);

/// 1-based group id in `[1, N/M]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct GroupId(pub u32);

/// 1-based staff id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct StaffId(pub u32);

impl StudentId {
    /// Printing-station class, fixed for the student's lifetime.
    pub fn station(self) -> u8 {
        (self.0 % u32::from(STATIONS)) as u8
    }

    /// The group this student belongs to, given the scenario's group size.
    pub fn group(self, group_size: u32) -> GroupId {
        GroupId((self.0 - 1) / group_size + 1)
    }
}

impl GroupId {
    /// Inclusive id span of this group's members.
    pub fn members(self, group_size: u32) -> std::ops::RangeInclusive<u32> {
        let lo = group_size * (self.0 - 1) + 1;
        lo..=group_size * self.0
    }
}

/// Two stations conflict iff their identifiers differ by 2 (mod 4): the four
/// classes form the pairs {0,2} and {1,3}. A class never conflicts with
/// itself.
pub fn conflicts(a: u8, b: u8) -> bool {
    (a + 2) % STATIONS == b
}

/// The single station conflicting with `station`.
pub fn opponent(station: u8) -> u8 {
    (station + 2) % STATIONS
}

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for StaffId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
