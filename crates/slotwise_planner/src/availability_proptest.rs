#[cfg(test)]
mod tests {
    use crate::availability::free_intervals;
    use crate::interval::TimeInterval;
    use crate::models::Appointment;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use proptest::prelude::*;
    use slotwise_common::Location;

    const HOME: Location = Location {
        lat: 47.3769,
        lng: 8.5417,
    };

    fn day_start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 5, 0, 0, 0).unwrap()
    }

    // Appointments laid out back to back with gaps of at least two buffers,
    // starting anywhere from 06:00 so some fall outside the window
    fn create_appointments(
        first_offset_minutes: i64,
        layout: &[(i64, i64)],
        buffer: Duration,
    ) -> Vec<Appointment> {
        let mut appointments = Vec::new();
        let mut cursor = day_start() + Duration::hours(6) + Duration::minutes(first_offset_minutes);
        for (index, (gap_minutes, length_minutes)) in layout.iter().enumerate() {
            let start = cursor + buffer * 2 + Duration::minutes(*gap_minutes);
            let end = start + Duration::minutes(*length_minutes);
            let location = Location {
                lat: 47.0 + index as f64 * 0.01,
                lng: 8.0,
            };
            appointments.push(Appointment::new(start, end, location).unwrap());
            cursor = end;
        }
        appointments
    }

    proptest! {
        // Free intervals plus buffered appointments rebuild the window exactly
        #[test]
        fn test_free_intervals_partition_the_window(
            first_offset_minutes in 0..240i64,
            layout in prop::collection::vec((0..120i64, 5..180i64), 0..8),
            buffer_minutes in 0..30i64,
            open_hour in 6..11i64,
            close_hour in 14..22i64,
        ) {
            let buffer = Duration::minutes(buffer_minutes);
            let window = TimeInterval::new(
                day_start() + Duration::hours(open_hour),
                day_start() + Duration::hours(close_hour),
            ).unwrap();
            let appointments = create_appointments(first_offset_minutes, &layout, buffer);

            let free = free_intervals(&appointments, &window, buffer, HOME).unwrap();

            let mut pieces: Vec<TimeInterval> = free.iter().map(|f| f.interval).collect();
            for appointment in &appointments {
                let busy = appointment.interval.with_buffer(buffer).unwrap();
                if let Some(clipped) = busy.clip(&window) {
                    pieces.push(clipped);
                }
            }
            pieces.sort();

            prop_assert!(!pieces.is_empty());
            prop_assert_eq!(pieces[0].start(), window.start());
            prop_assert_eq!(pieces[pieces.len() - 1].end(), window.end());
            for pair in pieces.windows(2) {
                // No gaps and no overlaps between consecutive pieces
                prop_assert_eq!(pair[0].end(), pair[1].start());
            }
        }

        // Output is ordered, inside the window and never touches a buffered booking
        #[test]
        fn test_free_intervals_are_ordered_and_disjoint_from_bookings(
            first_offset_minutes in 0..240i64,
            layout in prop::collection::vec((0..120i64, 5..180i64), 0..8),
            buffer_minutes in 0..30i64,
        ) {
            let buffer = Duration::minutes(buffer_minutes);
            let window = TimeInterval::new(
                day_start() + Duration::hours(9),
                day_start() + Duration::hours(18),
            ).unwrap();
            let appointments = create_appointments(first_offset_minutes, &layout, buffer);

            let free = free_intervals(&appointments, &window, buffer, HOME).unwrap();

            for pair in free.windows(2) {
                prop_assert!(pair[0].interval.end() < pair[1].interval.start());
            }
            for interval in &free {
                prop_assert!(interval.interval.start() >= window.start());
                prop_assert!(interval.interval.end() <= window.end());
                for appointment in &appointments {
                    let busy = appointment.interval.with_buffer(buffer).unwrap();
                    prop_assert!(!interval.interval.overlaps(&busy));
                }
            }
        }
    }
}
