//! Line-crossing lap detector
//!
//! Counts laps from crossings of the finish line while a decoy line placed
//! next to it cancels out crossings made by reversing back and forth.
//! Both lines are tested once per tick against the segment travelled that
//! tick, finish line first.

use glam::Vec2;

use super::geometry::Line;

#[derive(Debug, Clone)]
pub struct LapTracker {
    end_line: Line,
    false_line: Line,
    laps: Vec<u64>,
    end_line_balance: i32,
    false_line_balance: i32,
    previous_position: Vec2,
    start_before_end_line: bool,
    max_laps: usize,
}

impl LapTracker {
    pub fn new(
        end_line: Line,
        false_line: Line,
        start_before_end_line: bool,
        max_laps: usize,
        start_position: Vec2,
    ) -> Self {
        Self {
            end_line,
            false_line,
            laps: Vec::with_capacity(max_laps),
            end_line_balance: 0,
            false_line_balance: 0,
            previous_position: start_position,
            start_before_end_line,
            max_laps,
        }
    }

    /// Feed the position reached at `tick`. Returns true if a lap was recorded.
    pub fn update(&mut self, new_position: Vec2, tick: u64) -> bool {
        let from = self.previous_position;
        self.previous_position = new_position;

        let mut recorded = false;
        if self.end_line.crossed_by(from, new_position) {
            recorded = self.on_end_line(tick);
        }
        if self.false_line.crossed_by(from, new_position) {
            self.on_false_line();
        }
        recorded
    }

    fn on_end_line(&mut self, tick: u64) -> bool {
        if self.start_before_end_line {
            // First pass over the line only starts the race
            self.start_before_end_line = false;
            self.false_line_balance = -1;
        } else if self.end_line_balance > self.false_line_balance {
            self.end_line_balance = self.false_line_balance;
        } else if self.end_line_balance == 0 {
            self.false_line_balance = -1;
            if self.laps.len() < self.max_laps {
                self.laps.push(tick);
                log::debug!("Lap {} recorded at tick {}", self.laps.len(), tick);
                return true;
            }
        } else if self.end_line_balance < 0 {
            self.end_line_balance += 1;
        }
        false
    }

    fn on_false_line(&mut self) {
        if self.false_line_balance < 0 {
            self.false_line_balance += 1;
        } else if self.false_line_balance == 0 {
            self.false_line_balance -= 1;
        }
    }

    /// Tick numbers at which each lap finished
    pub fn laps(&self) -> &[u64] {
        &self.laps
    }

    pub fn lap_count(&self) -> usize {
        self.laps.len()
    }

    pub fn max_laps(&self) -> usize {
        self.max_laps
    }

    pub fn finished(&self) -> bool {
        self.laps.len() >= self.max_laps
    }

    pub fn end_line_balance(&self) -> i32 {
        self.end_line_balance
    }

    pub fn false_line_balance(&self) -> i32 {
        self.false_line_balance
    }

    pub fn start_pending(&self) -> bool {
        self.start_before_end_line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finish() -> Line {
        Line::from_points((0.0, 0.0), (0.0, 100.0))
    }

    /// Decoy well away from any test path
    fn far_decoy() -> Line {
        Line::from_points((500.0, 0.0), (500.0, 100.0))
    }

    #[test]
    fn test_single_forward_crossing_records_lap() {
        let mut tracker = LapTracker::new(finish(), far_decoy(), false, 3, Vec2::new(5.0, 50.0));
        assert!(!tracker.update(Vec2::new(1.0, 50.0), 1));
        assert!(tracker.update(Vec2::new(-3.0, 50.0), 2));
        assert_eq!(tracker.laps(), &[2]);
        assert_eq!(tracker.false_line_balance(), -1);
    }

    #[test]
    fn test_start_pass_is_consumed() {
        // Decoy identical to the finish line
        let mut tracker = LapTracker::new(finish(), finish(), true, 3, Vec2::new(5.0, 50.0));
        assert!(!tracker.update(Vec2::new(-10.0, 50.0), 1));
        assert!(tracker.laps().is_empty());
        assert!(!tracker.start_pending());

        assert!(tracker.update(Vec2::new(10.0, 50.0), 2));
        assert_eq!(tracker.laps(), &[2]);
    }

    #[test]
    fn test_oscillation_does_not_farm_laps() {
        let mut tracker = LapTracker::new(finish(), far_decoy(), false, 5, Vec2::new(5.0, 50.0));
        assert!(tracker.update(Vec2::new(-5.0, 50.0), 1));
        // Back and forth across the finish line without touching the decoy
        for tick in 2..20 {
            let x = if tick % 2 == 0 { 5.0 } else { -5.0 };
            assert!(!tracker.update(Vec2::new(x, 50.0), tick), "tick {tick}");
        }
        assert_eq!(tracker.lap_count(), 1);
    }

    #[test]
    fn test_decoy_crossing_alone_gives_no_lap() {
        let decoy = Line::from_points((-20.0, 0.0), (-20.0, 100.0));
        let mut tracker = LapTracker::new(finish(), decoy, false, 5, Vec2::new(5.0, 50.0));
        assert!(tracker.update(Vec2::new(-5.0, 50.0), 1));
        assert!(!tracker.update(Vec2::new(-25.0, 50.0), 2));
        assert_eq!(tracker.lap_count(), 1);
        // Decoy settled the armed state
        assert_eq!(tracker.false_line_balance(), 0);
    }

    #[test]
    fn test_full_circuit_counts_again() {
        let decoy = Line::from_points((-20.0, 0.0), (-20.0, 100.0));
        let mut tracker = LapTracker::new(finish(), decoy, false, 5, Vec2::new(5.0, 50.0));
        assert!(tracker.update(Vec2::new(-5.0, 50.0), 1));
        assert!(!tracker.update(Vec2::new(-25.0, 50.0), 2));
        // Around the track (teleport in the test) back to just before the line
        tracker.previous_position = Vec2::new(5.0, 50.0);
        assert!(tracker.update(Vec2::new(-5.0, 50.0), 30));
        assert_eq!(tracker.laps(), &[1, 30]);
    }

    #[test]
    fn test_reverse_then_forward_is_absorbed() {
        let mut tracker = LapTracker::new(finish(), far_decoy(), false, 5, Vec2::new(5.0, 50.0));
        assert!(tracker.update(Vec2::new(-5.0, 50.0), 1));
        // Reverse: resync end balance down to the armed decoy balance
        assert!(!tracker.update(Vec2::new(5.0, 50.0), 2));
        assert_eq!(tracker.end_line_balance(), -1);
        // Forward again: absorbed
        assert!(!tracker.update(Vec2::new(-5.0, 50.0), 3));
        assert_eq!(tracker.end_line_balance(), 0);
        assert_eq!(tracker.lap_count(), 1);
    }

    #[test]
    fn test_never_exceeds_max_laps() {
        let mut tracker = LapTracker::new(finish(), finish(), false, 2, Vec2::new(5.0, 50.0));
        let mut x = 5.0;
        for tick in 1..10 {
            x = -x;
            tracker.update(Vec2::new(x, 50.0), tick);
        }
        assert_eq!(tracker.lap_count(), 2);
        assert!(tracker.finished());
    }
}
