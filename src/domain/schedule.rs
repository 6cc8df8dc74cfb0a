//! Per-station daily schedule of content entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::media::Content;

/// A piece of content placed at a concrete time slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledProgram {
    pub start_time: DateTime<Utc>,

    /// Always `start_time + content.media().duration`
    pub end_time: DateTime<Utc>,

    pub content: Content,
}

/// The schedule for one broadcast day of one station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationSchedule {
    pub date: DateTime<Utc>,
    pub programs: Vec<ScheduledProgram>,
}

impl StationSchedule {
    /// Create an empty schedule for the given day.
    pub fn new(date: DateTime<Utc>) -> Self {
        Self {
            date,
            programs: Vec::new(),
        }
    }

    /// Append a program starting at `start_time`; the end time is derived
    /// from the content's duration.
    ///
    /// Programs are appended in call order. Overlapping time slots are
    /// permitted; placement logic that cares about overlap must check
    /// before calling.
    pub fn add_program(&mut self, content: Content, start_time: DateTime<Utc>) {
        let end_time = start_time + content.media().duration;
        self.programs.push(ScheduledProgram {
            start_time,
            end_time,
            content,
        });
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::domain::media::{MediaFile, Movie};

    fn movie(duration_secs: u64) -> Content {
        Content::Movie(Movie {
            id: 1,
            title: "Test Movie".to_string(),
            summary: None,
            tagline: None,
            genres: vec![],
            released_at: None,
            media: MediaFile {
                id: 1,
                file: "/media/test.mkv".to_string(),
                duration: Duration::from_secs(duration_secs),
            },
        })
    }

    #[test]
    fn test_end_time_derived_from_duration() {
        let date = Utc::now();
        let mut schedule = StationSchedule::new(date);

        schedule.add_program(movie(5400), date);

        assert_eq!(schedule.programs.len(), 1);
        let program = &schedule.programs[0];
        assert_eq!(program.end_time - program.start_time, chrono::Duration::seconds(5400));
    }

    #[test]
    fn test_programs_append_in_call_order() {
        let date = Utc::now();
        let mut schedule = StationSchedule::new(date);

        schedule.add_program(movie(60), date + chrono::Duration::hours(2));
        schedule.add_program(movie(60), date);

        // Appended sequentially, never reordered
        assert!(schedule.programs[0].start_time > schedule.programs[1].start_time);
    }
}
