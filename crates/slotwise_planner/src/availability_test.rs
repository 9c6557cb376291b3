#[cfg(test)]
mod tests {
    use crate::availability::{free_intervals, DayAvailability, DayPlanner};
    use crate::error::PlannerError;
    use crate::interval::TimeInterval;
    use crate::models::{Appointment, BusinessWindow};
    use crate::settings::PlannerSettings;
    use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
    use slotwise_common::Location;
    use slotwise_config::{AppConfig, HomeBaseConfig};

    const HOME: Location = Location {
        lat: 40.7128,
        lng: -74.0060,
    };
    const SITE_A: Location = Location {
        lat: 40.7580,
        lng: -73.9855,
    };
    const SITE_B: Location = Location {
        lat: 40.6782,
        lng: -73.9442,
    };

    // 2025-05-05 is a Monday
    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 5, hour, minute, 0).unwrap()
    }

    fn window() -> TimeInterval {
        TimeInterval::new(at(9, 0), at(18, 0)).unwrap()
    }

    fn appointment(start: DateTime<Utc>, end: DateTime<Utc>, location: Location) -> Appointment {
        Appointment::new(start, end, location).unwrap()
    }

    fn bounds_of(free: &[crate::models::FreeInterval]) -> Vec<(DateTime<Utc>, DateTime<Utc>)> {
        free.iter()
            .map(|f| (f.interval.start(), f.interval.end()))
            .collect()
    }

    fn settings(time_zone: &str) -> PlannerSettings {
        let mut config = AppConfig {
            home_base: Some(HomeBaseConfig {
                lat: HOME.lat,
                lng: HOME.lng,
                label: None,
            }),
            ..Default::default()
        };
        config.scheduling.time_zone = time_zone.to_string();
        PlannerSettings::from_config(&config).unwrap()
    }

    #[test]
    fn test_empty_day_is_one_free_interval() {
        let free = free_intervals(&[], &window(), Duration::minutes(15), HOME).unwrap();
        assert_eq!(free.len(), 1);
        assert_eq!(free[0].interval, window());
        assert_eq!(free[0].start_location, HOME);
        assert_eq!(free[0].end_location, HOME);
    }

    #[test]
    fn test_single_appointment_splits_the_window() {
        let appointments = [appointment(at(10, 0), at(11, 0), SITE_A)];
        let free = free_intervals(&appointments, &window(), Duration::minutes(15), HOME).unwrap();

        assert_eq!(
            bounds_of(&free),
            vec![(at(9, 0), at(9, 45)), (at(11, 15), at(18, 0))]
        );
        assert_eq!((free[0].start_location, free[0].end_location), (HOME, SITE_A));
        assert_eq!((free[1].start_location, free[1].end_location), (SITE_A, HOME));
    }

    #[test]
    fn test_gap_between_appointments_uses_both_sites() {
        let appointments = [
            appointment(at(13, 0), at(14, 0), SITE_B),
            appointment(at(10, 0), at(11, 0), SITE_A),
        ];
        let free = free_intervals(&appointments, &window(), Duration::minutes(15), HOME).unwrap();

        assert_eq!(
            bounds_of(&free),
            vec![
                (at(9, 0), at(9, 45)),
                (at(11, 15), at(12, 45)),
                (at(14, 15), at(18, 0)),
            ]
        );
        assert_eq!((free[1].start_location, free[1].end_location), (SITE_A, SITE_B));
        assert_eq!((free[2].start_location, free[2].end_location), (SITE_B, HOME));
    }

    #[test]
    fn test_appointment_partially_outside_window_is_clipped() {
        let appointments = [appointment(at(8, 0), at(9, 30), SITE_A)];
        let free = free_intervals(&appointments, &window(), Duration::minutes(15), HOME).unwrap();

        assert_eq!(bounds_of(&free), vec![(at(9, 45), at(18, 0))]);
        assert_eq!(free[0].start_location, SITE_A);
    }

    #[test]
    fn test_appointment_fully_outside_window_contributes_nothing() {
        let appointments = [
            appointment(at(6, 0), at(7, 0), SITE_A),
            appointment(at(19, 0), at(20, 0), SITE_B),
        ];
        let free = free_intervals(&appointments, &window(), Duration::minutes(15), HOME).unwrap();

        assert_eq!(bounds_of(&free), vec![(at(9, 0), at(18, 0))]);
        assert_eq!(free[0].start_location, HOME);
        assert_eq!(free[0].end_location, HOME);
    }

    #[test]
    fn test_appointment_abutting_close_leaves_no_trailing_interval() {
        // 17:45 + 15 minute buffer ends exactly at close
        let appointments = [appointment(at(16, 45), at(17, 45), SITE_A)];
        let free = free_intervals(&appointments, &window(), Duration::minutes(15), HOME).unwrap();

        assert_eq!(bounds_of(&free), vec![(at(9, 0), at(16, 30))]);
    }

    #[test]
    fn test_buffered_appointments_touching_leave_no_gap() {
        let appointments = [
            appointment(at(10, 0), at(11, 0), SITE_A),
            appointment(at(11, 30), at(12, 0), SITE_B),
        ];
        let free = free_intervals(&appointments, &window(), Duration::minutes(15), HOME).unwrap();

        assert_eq!(
            bounds_of(&free),
            vec![(at(9, 0), at(9, 45)), (at(12, 15), at(18, 0))]
        );
        assert_eq!(free[1].start_location, SITE_B);
    }

    #[test]
    fn test_overlap_after_buffer_is_rejected() {
        let appointments = [
            appointment(at(10, 0), at(11, 0), SITE_A),
            appointment(at(11, 20), at(12, 0), SITE_B),
        ];
        let err = free_intervals(&appointments, &window(), Duration::minutes(15), HOME).unwrap_err();
        assert!(matches!(err, PlannerError::Validation(_)));

        // Without a buffer the same appointments are fine
        let free = free_intervals(&appointments, &window(), Duration::zero(), HOME).unwrap();
        assert_eq!(free.len(), 3);
    }

    #[test]
    fn test_negative_buffer_is_rejected() {
        let appointments = [appointment(at(10, 0), at(11, 0), SITE_A)];
        let err = free_intervals(&appointments, &window(), Duration::minutes(-1), HOME).unwrap_err();
        assert!(matches!(err, PlannerError::Validation(_)));
    }

    #[test]
    fn test_day_planner_skips_non_working_days() {
        let settings = settings("UTC");
        let monday = NaiveDate::from_ymd_opt(2025, 5, 5).unwrap();
        let days: Vec<NaiveDate> = DayPlanner::new(&settings, &[], monday, 7)
            .map(|day| day.unwrap().window.day)
            .collect();

        assert_eq!(days.len(), 5);
        assert_eq!(days[0], monday);
        assert_eq!(days[4], NaiveDate::from_ymd_opt(2025, 5, 9).unwrap());
    }

    #[test]
    fn test_day_planner_assigns_overnight_appointment_to_both_days() {
        let settings = settings("UTC");
        let monday = NaiveDate::from_ymd_opt(2025, 5, 5).unwrap();
        let overnight = appointment(at(17, 0), at(10, 0) + Duration::days(1), SITE_A);
        let appointments = [overnight];

        let days: Vec<_> = DayPlanner::new(&settings, &appointments, monday, 2)
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(bounds_of(&days[0].free), vec![(at(9, 0), at(16, 45))]);
        assert_eq!(
            bounds_of(&days[1].free),
            vec![(at(10, 15) + Duration::days(1), at(18, 0) + Duration::days(1))]
        );
        assert_eq!(days[1].free[0].start_location, SITE_A);
    }

    #[test]
    fn test_day_planner_uses_local_business_hours() {
        let settings = settings("America/New_York");
        let monday = NaiveDate::from_ymd_opt(2025, 5, 5).unwrap();
        // 14:00-15:00 UTC is 10:00-11:00 in New York (EDT)
        let appointments = [appointment(at(14, 0), at(15, 0), SITE_A)];

        let day = DayPlanner::new(&settings, &appointments, monday, 1)
            .next()
            .unwrap()
            .unwrap();

        assert_eq!(day.bounds.start(), at(13, 0));
        assert_eq!(day.bounds.end(), at(22, 0));
        assert_eq!(
            bounds_of(&day.free),
            vec![(at(13, 0), at(13, 45)), (at(15, 15), at(22, 0))]
        );
    }

    #[test]
    fn test_day_planner_is_restartable() {
        let settings = settings("UTC");
        let monday = NaiveDate::from_ymd_opt(2025, 5, 5).unwrap();
        let appointments = [appointment(at(10, 0), at(11, 0), SITE_A)];
        let planner = DayPlanner::new(&settings, &appointments, monday, 1);

        let first = planner.plan_day(monday).unwrap().unwrap();
        let second = planner.plan_day(monday).unwrap().unwrap();
        assert_eq!(first, second);

        let saturday = NaiveDate::from_ymd_opt(2025, 5, 10).unwrap();
        assert!(planner.plan_day(saturday).is_none());
    }

    #[test]
    fn test_drop_before_trims_elapsed_free_time() {
        let appointments = [appointment(at(12, 0), at(13, 0), SITE_A)];
        let mut day = DayAvailability {
            window: BusinessWindow {
                day: NaiveDate::from_ymd_opt(2025, 5, 5).unwrap(),
                open: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                close: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
            },
            bounds: window(),
            free: free_intervals(&appointments, &window(), Duration::minutes(15), HOME).unwrap(),
        };

        day.drop_before(at(10, 30));
        assert_eq!(
            bounds_of(&day.free),
            vec![(at(10, 30), at(11, 45)), (at(13, 15), at(18, 0))]
        );
        assert_eq!(day.free[0].start_location, HOME);
        assert_eq!(day.free[0].end_location, SITE_A);

        day.drop_before(at(14, 0));
        assert_eq!(bounds_of(&day.free), vec![(at(14, 0), at(18, 0))]);
        assert_eq!(day.free[0].start_location, SITE_A);

        day.drop_before(at(18, 0));
        assert!(day.free.is_empty());
    }
}
