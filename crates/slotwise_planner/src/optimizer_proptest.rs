#[cfg(test)]
mod tests {
    use crate::availability::free_intervals;
    use crate::interval::TimeInterval;
    use crate::models::{Appointment, CandidateSlot};
    use crate::optimizer::{rank, slots_for_interval, OptimizerOptions};
    use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
    use proptest::prelude::*;
    use slotwise_common::Location;

    const HOME: Location = Location {
        lat: 47.3769,
        lng: 8.5417,
    };

    fn day_start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 5, 0, 0, 0).unwrap()
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, 5).unwrap()
    }

    fn create_appointments(layout: &[(i64, i64)], buffer: Duration) -> Vec<Appointment> {
        let mut appointments = Vec::new();
        let mut cursor = day_start() + Duration::hours(9);
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

    // Slots for one day with travel per interval taken from `travel_minutes`
    fn day_slots(
        layout: &[(i64, i64)],
        travel_minutes: &[(i64, i64)],
        duration: Duration,
        options: &OptimizerOptions,
    ) -> Vec<CandidateSlot> {
        let buffer = Duration::minutes(15);
        let window = TimeInterval::new(
            day_start() + Duration::hours(9),
            day_start() + Duration::hours(18),
        )
        .unwrap();
        let appointments = create_appointments(layout, buffer);
        let free = free_intervals(&appointments, &window, buffer, HOME).unwrap();

        let mut slots = Vec::new();
        for (index, interval) in free.iter().enumerate() {
            let (travel_in, travel_out) = travel_minutes[index % travel_minutes.len()];
            slots.extend(
                slots_for_interval(
                    day(),
                    interval,
                    Duration::minutes(travel_in),
                    Duration::minutes(travel_out),
                    duration,
                    options,
                )
                .unwrap(),
            );
        }
        rank(&mut slots, options.max_results);
        slots
    }

    proptest! {
        // A longer appointment never yields more slots
        #[test]
        fn test_longer_duration_never_adds_slots(
            layout in prop::collection::vec((0..90i64, 15..120i64), 0..5),
            travel_minutes in prop::collection::vec((0..60i64, 0..60i64), 1..6),
            duration_minutes in 15..240i64,
            extra_minutes in 0..120i64,
            granularity_minutes in 0..45i64,
            max_slots_per_interval in 1..6usize,
            max_results in 1..20usize,
        ) {
            let options = OptimizerOptions {
                granularity: Duration::minutes(granularity_minutes),
                max_slots_per_interval,
                max_results,
            };
            let shorter = day_slots(&layout, &travel_minutes, Duration::minutes(duration_minutes), &options);
            let longer = day_slots(
                &layout,
                &travel_minutes,
                Duration::minutes(duration_minutes + extra_minutes),
                &options,
            );
            prop_assert!(longer.len() <= shorter.len());
        }

        // Every slot leaves room for both drives inside its free interval
        #[test]
        fn test_slots_respect_travel_and_ranking(
            layout in prop::collection::vec((0..90i64, 15..120i64), 0..5),
            travel_minutes in prop::collection::vec((0..60i64, 0..60i64), 1..6),
            duration_minutes in 15..180i64,
        ) {
            let options = OptimizerOptions {
                granularity: Duration::minutes(15),
                max_slots_per_interval: 4,
                max_results: 50,
            };
            let duration = Duration::minutes(duration_minutes);
            let buffer = Duration::minutes(15);
            let appointments = create_appointments(&layout, buffer);
            let slots = day_slots(&layout, &travel_minutes, duration, &options);

            for slot in &slots {
                prop_assert_eq!(slot.interval.duration(), duration);
                prop_assert_eq!(slot.total_overhead, slot.travel_in + slot.travel_out);
                let reserved = TimeInterval::new(
                    slot.interval.start() - slot.travel_in,
                    slot.interval.end() + slot.travel_out,
                ).unwrap();
                prop_assert!(reserved.start() >= day_start() + Duration::hours(9));
                prop_assert!(reserved.end() <= day_start() + Duration::hours(18));
                for appointment in &appointments {
                    let busy = appointment.interval.with_buffer(buffer).unwrap();
                    prop_assert!(!reserved.overlaps(&busy));
                }
            }
            for pair in slots.windows(2) {
                let key = |s: &CandidateSlot| (s.total_overhead, s.interval.start());
                prop_assert!(key(&pair[0]) <= key(&pair[1]));
            }
        }
    }
}
