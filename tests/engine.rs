//! End-to-end tests for the scheduling engine: the eight quantified
//! invariants, the two boundary cases, and scenarios E1-E6.

use chrono::NaiveDate;
use medschedulr_engine::availability::AvailabilityIndex;
use medschedulr_engine::calendar::Calendar;
use medschedulr_engine::catalogue::PostCatalogue;
use medschedulr_engine::config::SolverConfig;
use medschedulr_engine::domain::{AvailabilityRecord, Category, Doctor, Unit};
use medschedulr_engine::oracle::{BranchAndBoundOracle, SolverStatus};
use medschedulr_engine::report::{self, Report, Warning};
use medschedulr_engine::solve;
use std::collections::HashSet;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Availability=true for every (doctor, day, on-call post): clinic posts
/// are left to the structural default (same-unit member on a clinic day),
/// since marking them true everywhere would admit assignments the clinic
/// schedule itself forbids.
fn full_availability(doctors: &[Doctor], calendar: &Calendar, catalogue: &PostCatalogue) -> Vec<AvailabilityRecord> {
    let mut records = Vec::new();
    for doctor in doctors {
        for day in &calendar.days {
            for post in catalogue.posts_for_weekday(day.weekday) {
                if catalogue.is_oncall(post) {
                    records.push(AvailabilityRecord { doctor_id: doctor.id.clone(), date: day.date, post: post.clone(), available: true });
                }
            }
        }
    }
    records
}

/// A short solver timeout so a test that cannot reach proven optimality
/// fails fast as `OptimalInaccurate` rather than stalling on the default
/// ten-minute budget.
fn test_config() -> SolverConfig {
    SolverConfig { solver_timeout_seconds: 10, ..SolverConfig::default() }
}

struct Fixture {
    report: Report,
    calendar: Calendar,
}

fn run(doctors: Vec<Doctor>, units: Vec<Unit>, posts_weekday: Vec<String>, posts_weekend: Vec<String>, start: NaiveDate, end: NaiveDate, availability: Vec<AvailabilityRecord>, config: SolverConfig) -> Fixture {
    let calendar = Calendar::build(start, end).unwrap();
    let catalogue = PostCatalogue::build(&posts_weekday, &posts_weekend, &units);
    let availability_index = AvailabilityIndex::build(&doctors, &units, &calendar, &catalogue, &availability);
    let oracle = BranchAndBoundOracle::default();
    let result = solve::solve(&oracle, &doctors, &units, &calendar, &catalogue, &availability_index, &config).expect("solve should succeed");
    let report = report::build(result, &doctors, &calendar, &catalogue, &availability_index);
    Fixture { report, calendar }
}

fn e1_fixture() -> (Fixture, Vec<Doctor>, Vec<Unit>) {
    let doctors = vec![
        Doctor::new(0, "d1", "Dr. One", "U1", Category::Senior),
        Doctor::new(1, "d2", "Dr. Two", "U1", Category::Junior),
        Doctor::new(2, "d3", "Dr. Three", "U2", Category::Registrar),
    ];
    let units = vec![
        Unit { id: "U1".into(), name: "U1".into(), clinic_days: vec![0, 4] },
        Unit { id: "U2".into(), name: "U2".into(), clinic_days: vec![1, 3] },
    ];
    let posts_weekday = vec!["ED1".to_string(), "Ward3".to_string()];
    let posts_weekend = vec!["ED1".to_string(), "Standby Oncall".to_string()];
    let start = date(2025, 8, 4);
    let end = date(2025, 8, 10);

    let calendar = Calendar::build(start, end).unwrap();
    let catalogue = PostCatalogue::build(&posts_weekday, &posts_weekend, &units);
    let availability = full_availability(&doctors, &calendar, &catalogue);

    let fixture = run(doctors.clone(), units.clone(), posts_weekday, posts_weekend, start, end, availability, test_config());
    (fixture, doctors, units)
}

#[test]
fn e1_tiny_feasible_week_covers_every_weekday_post_once() {
    let (fixture, _doctors, _units) = e1_fixture();
    assert!(matches!(fixture.report.status, SolverStatus::Optimal | SolverStatus::OptimalInaccurate));

    for day in &fixture.calendar.days {
        if day.is_weekend() {
            continue;
        }
        let ed1_count = fixture.report.assignments.iter().filter(|a| a.date == day.date && a.post == "ED1").count();
        let ward3_count = fixture.report.assignments.iter().filter(|a| a.date == day.date && a.post == "Ward3").count();
        assert_eq!(ed1_count, 1, "ED1 should be filled exactly once on {}", day.date);
        assert_eq!(ward3_count, 1, "Ward3 should be filled exactly once on {}", day.date);
    }
}

#[test]
fn e1_weekend_standby_pair_shares_one_doctor() {
    let (fixture, _doctors, _units) = e1_fixture();
    let sat = date(2025, 8, 9);
    let sun = date(2025, 8, 10);

    let sat_doctor = fixture.report.assignments.iter().find(|a| a.date == sat && a.post == "Standby Oncall").map(|a| &a.doctor_id);
    let sun_doctor = fixture.report.assignments.iter().find(|a| a.date == sun && a.post == "Standby Oncall").map(|a| &a.doctor_id);

    assert!(sat_doctor.is_some());
    assert_eq!(sat_doctor, sun_doctor);
}

#[test]
fn e1_clinic_posts_filled_on_unit_clinic_days_only() {
    let (fixture, _doctors, _units) = e1_fixture();
    let clinic_u1_dates: Vec<_> = fixture.report.assignments.iter().filter(|a| a.post == "clinic:U1").map(|a| a.date).collect();
    let clinic_u2_dates: Vec<_> = fixture.report.assignments.iter().filter(|a| a.post == "clinic:U2").map(|a| a.date).collect();

    assert!(clinic_u1_dates.contains(&date(2025, 8, 4))); // Monday
    assert!(clinic_u1_dates.contains(&date(2025, 8, 8))); // Friday
    assert!(clinic_u2_dates.contains(&date(2025, 8, 5))); // Tuesday
    assert!(clinic_u2_dates.contains(&date(2025, 8, 7))); // Thursday
}

#[test]
fn e2_uncoverable_slot_falls_back_to_phase_two_with_one_slack_unit() {
    let doctors = vec![
        Doctor::new(0, "d1", "Dr. One", "U1", Category::Senior),
        Doctor::new(1, "d2", "Dr. Two", "U1", Category::Junior),
        Doctor::new(2, "d3", "Dr. Three", "U2", Category::Registrar),
    ];
    let units = vec![
        Unit { id: "U1".into(), name: "U1".into(), clinic_days: vec![0, 4] },
        Unit { id: "U2".into(), name: "U2".into(), clinic_days: vec![1, 3] },
    ];
    let posts_weekday = vec!["ED1".to_string(), "Ward3".to_string()];
    let posts_weekend = vec!["ED1".to_string(), "Standby Oncall".to_string()];
    let start = date(2025, 8, 4);
    let end = date(2025, 8, 10);

    let calendar = Calendar::build(start, end).unwrap();
    let catalogue = PostCatalogue::build(&posts_weekday, &posts_weekend, &units);

    // Only D1 is ever eligible for ED1; everyone else is always false for it.
    let mut availability = full_availability(&doctors, &calendar, &catalogue);
    for record in availability.iter_mut() {
        if record.post == "ED1" && record.doctor_id != "d1" {
            record.available = false;
        }
    }
    // D1 unavailable for ED1 specifically on 2025-08-06 -> nobody eligible that day.
    for record in availability.iter_mut() {
        if record.doctor_id == "d1" && record.post == "ED1" && record.date == date(2025, 8, 6) {
            record.available = false;
        }
    }

    let fixture = run(doctors, units, posts_weekday, posts_weekend, start, end, availability, test_config());

    assert!(matches!(fixture.report.status, SolverStatus::Optimal | SolverStatus::OptimalInaccurate));
    assert!(fixture.report.warnings.iter().any(|w| matches!(w, Warning::UncoverableSlot { post, .. } if post == "ED1")));
    assert!(fixture.report.warnings.iter().any(|w| matches!(w, Warning::CoverageRelaxed)));

    let ed1_on_6th = fixture.report.assignments.iter().filter(|a| a.date == date(2025, 8, 6) && a.post == "ED1").count();
    assert_eq!(ed1_on_6th, 0, "the uncoverable slot stays empty under the slack relaxation");

    let ed1_on_5th = fixture.report.assignments.iter().filter(|a| a.date == date(2025, 8, 5) && a.post == "ED1").count();
    assert_eq!(ed1_on_5th, 1, "every other day is still covered exactly once");
}

#[test]
fn e4_workload_aware_standby_prefers_the_less_recently_used_doctor() {
    use medschedulr_engine::domain::Workload;

    let doctor_a = Doctor::new(0, "a", "Dr. A", "U1", Category::Senior).with_workload(Workload { standby_count_12m: 1, ..Workload::default() });
    let doctor_b = Doctor::new(1, "b", "Dr. B", "U1", Category::Senior).with_workload(Workload { days_since_last_standby: 800, ..Workload::default() });
    let doctors = vec![doctor_a, doctor_b];
    let units = vec![Unit { id: "U1".into(), name: "U1".into(), clinic_days: vec![] }];
    let posts_weekday = vec![];
    let posts_weekend = vec!["Standby Oncall".to_string()];
    let start = date(2025, 8, 9); // Saturday
    let end = date(2025, 8, 10); // Sunday

    let calendar = Calendar::build(start, end).unwrap();
    let catalogue = PostCatalogue::build(&posts_weekday, &posts_weekend, &units);
    let availability = full_availability(&doctors, &calendar, &catalogue);

    let fixture = run(doctors, units, posts_weekday, posts_weekend, start, end, availability, test_config());

    let standby_doctor = fixture.report.assignments.iter().find(|a| a.post == "Standby Oncall").map(|a| a.doctor_id.clone());
    assert_eq!(standby_doctor, Some("b".to_string()));
}

#[test]
fn boundary_single_weekday_horizon_has_no_weekend_logic() {
    let doctors = vec![Doctor::new(0, "d1", "Dr. One", "U1", Category::Senior)];
    let units = vec![];
    let posts_weekday = vec!["ED1".to_string()];
    let posts_weekend = vec![];
    let start = date(2025, 8, 4); // Monday
    let end = date(2025, 8, 4);

    let calendar = Calendar::build(start, end).unwrap();
    assert!(calendar.weekend_pairs.is_empty());
    let catalogue = PostCatalogue::build(&posts_weekday, &posts_weekend, &units);
    let availability = full_availability(&doctors, &calendar, &catalogue);

    let fixture = run(doctors, units, posts_weekday, posts_weekend, start, end, availability, test_config());
    assert_eq!(fixture.report.status, SolverStatus::Optimal);
    assert_eq!(fixture.report.assignments.len(), 1);
}

#[test]
fn boundary_isolated_sunday_creates_no_weekend_pair() {
    let doctors = vec![Doctor::new(0, "d1", "Dr. One", "U1", Category::Senior)];
    let units = vec![];
    let posts_weekday = vec![];
    let posts_weekend = vec!["Standby Oncall".to_string()];
    let start = date(2025, 8, 10); // Sunday, isolated
    let end = date(2025, 8, 10);

    let calendar = Calendar::build(start, end).unwrap();
    assert!(calendar.weekend_pairs.is_empty());
    let catalogue = PostCatalogue::build(&posts_weekday, &posts_weekend, &units);
    let availability = full_availability(&doctors, &calendar, &catalogue);

    let fixture = run(doctors, units, posts_weekday, posts_weekend, start, end, availability, test_config());
    assert_eq!(fixture.report.assignments.len(), 1);
}

#[test]
fn property_at_most_one_post_per_doctor_per_day() {
    let (fixture, doctors, _units) = e1_fixture();
    for doctor in &doctors {
        for day in &fixture.calendar.days {
            let count = fixture.report.assignments.iter().filter(|a| a.doctor_id == doctor.id && a.date == day.date).count();
            assert!(count <= 1, "{} has {} posts on {}", doctor.id, count, day.date);
        }
    }
}

#[test]
fn property_standby_weekend_cardinality_is_at_most_one() {
    let (fixture, _doctors, _units) = e1_fixture();
    for pair in &fixture.calendar.weekend_pairs {
        let sat_date = fixture.calendar.days[pair.sat].date;
        let standby_doctors: HashSet<_> =
            fixture.report.assignments.iter().filter(|a| a.date == sat_date && a.post == "Standby Oncall").map(|a| &a.doctor_id).collect();
        assert!(standby_doctors.len() <= 1);
    }
}

#[test]
fn round_trip_on_its_own_output_reproduces_the_same_assignments() {
    // Pin availability to exactly the winning (doctor, day, post) triples
    // from a first solve, for every slot in the horizon, then re-solve.
    // With no other doctor left eligible anywhere, the only legal coverage
    // choice left is the one already made.
    let (fixture, doctors, units) = e1_fixture();
    let posts_weekday = vec!["ED1".to_string(), "Ward3".to_string()];
    let posts_weekend = vec!["ED1".to_string(), "Standby Oncall".to_string()];
    let catalogue = PostCatalogue::build(&posts_weekday, &posts_weekend, &units);

    let chosen: HashSet<(String, NaiveDate, String)> =
        fixture.report.assignments.iter().map(|a| (a.doctor_id.clone(), a.date, a.post.clone())).collect();

    let mut restricted = Vec::new();
    for doctor in &doctors {
        for day in &fixture.calendar.days {
            for post in catalogue.posts_for_weekday(day.weekday) {
                let available = chosen.contains(&(doctor.id.clone(), day.date, post.clone()));
                restricted.push(AvailabilityRecord { doctor_id: doctor.id.clone(), date: day.date, post: post.clone(), available });
            }
        }
    }

    let start = date(2025, 8, 4);
    let end = date(2025, 8, 10);
    let second = run(doctors, units, posts_weekday, posts_weekend, start, end, restricted, test_config());

    let mut first_sorted: Vec<_> = fixture.report.assignments.iter().map(|a| (a.doctor_id.clone(), a.date, a.post.clone())).collect();
    let mut second_sorted: Vec<_> = second.report.assignments.iter().map(|a| (a.doctor_id.clone(), a.date, a.post.clone())).collect();
    first_sorted.sort();
    second_sorted.sort();
    assert_eq!(first_sorted, second_sorted);
}

#[test]
fn weekend_pairing_infeasibility_is_reported_when_sat_sun_eligibility_dont_overlap() {
    let doctors = vec![
        Doctor::new(0, "a", "Dr. A", "U1", Category::Senior),
        Doctor::new(1, "b", "Dr. B", "U1", Category::Senior),
    ];
    let units = vec![];
    let posts_weekday = vec![];
    let posts_weekend = vec!["Standby Oncall".to_string()];
    let start = date(2025, 8, 9); // Saturday
    let end = date(2025, 8, 10); // Sunday

    // A is only eligible Saturday, B is only eligible Sunday: no doctor
    // spans both days, so the pairing is structurally infeasible even
    // though each individual day has an eligible doctor.
    let availability = vec![
        AvailabilityRecord { doctor_id: "a".into(), date: start, post: "Standby Oncall".into(), available: true },
        AvailabilityRecord { doctor_id: "a".into(), date: end, post: "Standby Oncall".into(), available: false },
        AvailabilityRecord { doctor_id: "b".into(), date: start, post: "Standby Oncall".into(), available: false },
        AvailabilityRecord { doctor_id: "b".into(), date: end, post: "Standby Oncall".into(), available: true },
    ];

    let fixture = run(doctors, units, posts_weekday, posts_weekend, start, end, availability, test_config());

    assert!(fixture.report.warnings.iter().any(|w| matches!(w, Warning::WeekendPairingInfeasible { weekend_index: 0 })));
    // Coverage still fills each day from whoever is eligible that day, but
    // since no doctor spans both, two different doctors end up on the two
    // halves of the "pair" — exactly the outcome the warning calls out.
    let sat_doctor = fixture.report.assignments.iter().find(|a| a.date == start && a.post == "Standby Oncall").map(|a| a.doctor_id.clone());
    let sun_doctor = fixture.report.assignments.iter().find(|a| a.date == end && a.post == "Standby Oncall").map(|a| a.doctor_id.clone());
    assert_eq!(sat_doctor, Some("a".to_string()));
    assert_eq!(sun_doctor, Some("b".to_string()));
}

#[test]
fn e3_standby_cooldown_blocks_the_same_doctor_on_two_adjacent_weekends() {
    // 5-week horizon; only one doctor is ever eligible for Standby Oncall,
    // and only on weekends 1 and 2 (0-indexed). The cooldown constraint
    // (`y[d,w] + y[d,w+1] <= 1`) must still let exactly one of those two
    // weekends be covered by that doctor, never both.
    let doctors = vec![Doctor::new(0, "a", "Dr. A", "U1", Category::Senior)];
    let units = vec![];
    let posts_weekday = vec![];
    let posts_weekend = vec!["Standby Oncall".to_string()];
    let start = date(2025, 8, 2); // Saturday, week 0
    let end = date(2025, 9, 6); // Saturday, 5 weekend pairs later

    let calendar = Calendar::build(start, end).unwrap();
    assert!(calendar.weekend_pairs.len() >= 3);

    let weekend_1_sat = calendar.days[calendar.weekend_pairs[1].sat].date;
    let weekend_1_sun = calendar.days[calendar.weekend_pairs[1].sun].date;
    let weekend_2_sat = calendar.days[calendar.weekend_pairs[2].sat].date;
    let weekend_2_sun = calendar.days[calendar.weekend_pairs[2].sun].date;
    let eligible_dates: HashSet<NaiveDate> = [weekend_1_sat, weekend_1_sun, weekend_2_sat, weekend_2_sun].into_iter().collect();

    let availability: Vec<AvailabilityRecord> = calendar
        .days
        .iter()
        .filter(|d| d.is_weekend())
        .map(|d| AvailabilityRecord { doctor_id: "a".into(), date: d.date, post: "Standby Oncall".into(), available: eligible_dates.contains(&d.date) })
        .collect();

    let fixture = run(doctors, units, posts_weekday, posts_weekend, start, end, availability, test_config());

    let weekend_1_covered = fixture.report.assignments.iter().any(|a| a.date == weekend_1_sat && a.post == "Standby Oncall");
    let weekend_2_covered = fixture.report.assignments.iter().any(|a| a.date == weekend_2_sat && a.post == "Standby Oncall");
    assert!(weekend_1_covered != weekend_2_covered, "exactly one of the two adjacent weekends should be covered, not both");
}

#[test]
fn unit_over_coverage_penalty_stays_bounded_when_the_soft_cap_is_exceeded() {
    // 4 doctors in one unit, never on clinic, with two weekday posts that
    // only this unit's doctors can fill. `cap = ceil(0.25 * 4) = 1`, but
    // both posts must be covered, so the unit's actual usage (2) exceeds
    // the cap by 1. This is a soft penalty, not a hard constraint: the
    // solve must still succeed, and the `unit_over` slack resolved by the
    // oracle must reflect the true shortfall (~1) rather than exploding
    // from a sign error in the continuous-slack closed form.
    let doctors = vec![
        Doctor::new(0, "d1", "Dr. One", "U1", Category::Senior),
        Doctor::new(1, "d2", "Dr. Two", "U1", Category::Senior),
        Doctor::new(2, "d3", "Dr. Three", "U1", Category::Senior),
        Doctor::new(3, "d4", "Dr. Four", "U1", Category::Senior),
    ];
    let units = vec![Unit { id: "U1".into(), name: "U1".into(), clinic_days: vec![] }];
    let posts_weekday = vec!["ED1".to_string(), "Ward3".to_string()];
    let posts_weekend = vec![];
    let start = date(2025, 8, 4); // Monday
    let end = date(2025, 8, 4);

    let calendar = Calendar::build(start, end).unwrap();
    let catalogue = PostCatalogue::build(&posts_weekday, &posts_weekend, &units);
    let availability = full_availability(&doctors, &calendar, &catalogue);

    let fixture = run(doctors, units, posts_weekday, posts_weekend, start, end, availability, test_config());

    assert!(matches!(fixture.report.status, SolverStatus::Optimal | SolverStatus::OptimalInaccurate));
    assert_eq!(fixture.report.assignments.len(), 2, "both posts are filled despite exceeding the unit's soft cap");
    assert!(
        fixture.report.objective_value < 1000.0,
        "objective_value {} suggests the unit-over slack exploded instead of resolving to the true ~1 shortfall",
        fixture.report.objective_value
    );
}

#[test]
fn property_floater_category_carries_no_minimum_one_requirement() {
    // A floater with zero availability must not force infeasibility or
    // slack usage; only non-floaters carry the minimum-one rule.
    let doctors = vec![
        Doctor::new(0, "f1", "Dr. Floater", "U1", Category::Floater),
        Doctor::new(1, "j1", "Dr. Junior", "U1", Category::Junior),
    ];
    let units = vec![];
    let posts_weekday = vec!["ED1".to_string()];
    let posts_weekend = vec![];
    let start = date(2025, 8, 4); // Monday
    let end = date(2025, 8, 4);

    let calendar = Calendar::build(start, end).unwrap();
    let catalogue = PostCatalogue::build(&posts_weekday, &posts_weekend, &units);
    // Only the junior is ever available; the floater has no records at all.
    let mut availability = full_availability(&doctors, &calendar, &catalogue);
    availability.retain(|r| r.doctor_id != "f1");

    let fixture = run(doctors, units, posts_weekday, posts_weekend, start, end, availability, test_config());

    assert_eq!(fixture.report.status, SolverStatus::Optimal);
    assert!(!fixture.report.warnings.iter().any(|w| matches!(w, Warning::CoverageRelaxed)));
    assert_eq!(fixture.report.assignments.len(), 1);
    assert_eq!(fixture.report.assignments[0].doctor_id, "j1");
}
