//! Attendance summary math for conducted lessons.

/// Per-lesson presence totals. `total = present + absent` always holds;
/// the same invariant is enforced again by a CHECK constraint on the
/// `conducted_lessons` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttendanceStats {
    pub total: i32,
    pub present: i32,
    pub absent: i32,
}

impl AttendanceStats {
    /// Compute totals from a roster size and the number of enrolled
    /// students marked present. Present marks for students no longer
    /// enrolled must be filtered out by the caller before counting.
    pub fn from_counts(roster_size: usize, present: usize) -> Self {
        let total = roster_size as i32;
        let present = present.min(roster_size) as i32;
        Self {
            total,
            present,
            absent: total - present,
        }
    }

    /// Attendance rate in percent; 0.0 for an empty roster.
    pub fn rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            f64::from(self.present) / f64::from(self.total) * 100.0
        }
    }

    /// A lesson earns payroll only when someone actually showed up.
    pub fn eligible_for_payroll(&self) -> bool {
        self.present > 0
    }
}
