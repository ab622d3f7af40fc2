//! Demo data generators for the roster scheduling engine. Re-themed from
//! the teacher's Employee/Shift generator (`EmployeeSchedule`, skill
//! distributions, name permutations) into Doctor/Unit/Post/Availability —
//! same weighted-distribution + seeded-RNG shape, new vocabulary.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::domain::{AvailabilityRecord, Category, Doctor, ScheduleRequest, Unit, Workload};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemoData {
    Small,
    Large,
}

impl std::str::FromStr for DemoData {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "SMALL" => Ok(DemoData::Small),
            "LARGE" => Ok(DemoData::Large),
            _ => Err(()),
        }
    }
}

impl DemoData {
    pub fn as_str(&self) -> &'static str {
        match self {
            DemoData::Small => "SMALL",
            DemoData::Large => "LARGE",
        }
    }

    fn parameters(&self) -> DemoDataParameters {
        match self {
            DemoData::Small => DemoDataParameters {
                units: vec![("Cardiology".to_string(), vec![0, 4]), ("Neurology".to_string(), vec![1, 3])],
                doctor_count: 12,
                posts_weekday: vec!["ED1".to_string(), "Ward3".to_string()],
                posts_weekend: vec!["ED1".to_string(), "Standby Oncall".to_string()],
                days_in_schedule: 14,
                category_distribution: vec![(Category::Floater, 1.0), (Category::Junior, 3.0), (Category::Senior, 3.0), (Category::Registrar, 2.0)],
                unavailable_probability: 0.15,
            },
            DemoData::Large => DemoDataParameters {
                units: vec![
                    ("Cardiology".to_string(), vec![0, 4]),
                    ("Neurology".to_string(), vec![1, 3]),
                    ("Critical Care".to_string(), vec![2]),
                    ("Paediatrics".to_string(), vec![0, 2, 4]),
                ],
                doctor_count: 40,
                posts_weekday: vec!["ED1".to_string(), "ED2".to_string(), "Ward3".to_string(), "Ward4".to_string()],
                posts_weekend: vec!["ED1".to_string(), "ED2".to_string(), "Standby Oncall".to_string()],
                days_in_schedule: 28,
                category_distribution: vec![(Category::Floater, 1.0), (Category::Junior, 4.0), (Category::Senior, 4.0), (Category::Registrar, 3.0)],
                unavailable_probability: 0.2,
            },
        }
    }
}

struct DemoDataParameters {
    units: Vec<(String, Vec<u8>)>,
    doctor_count: usize,
    posts_weekday: Vec<String>,
    posts_weekend: Vec<String>,
    days_in_schedule: i64,
    category_distribution: Vec<(Category, f64)>,
    unavailable_probability: f64,
}

/// List of available demo data sets.
pub fn list_demo_data() -> Vec<&'static str> {
    vec!["SMALL", "LARGE"]
}

/// Generates a demo `ScheduleRequest` for the given size, deterministic
/// under a fixed seed.
pub fn generate(demo: DemoData) -> ScheduleRequest {
    let params = demo.parameters();
    let mut rng = StdRng::seed_from_u64(0);

    let roster_start = find_next_monday(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
    let roster_end = roster_start + Duration::days(params.days_in_schedule - 1);

    let units: Vec<Unit> = params
        .units
        .iter()
        .enumerate()
        .map(|(i, (name, clinic_days))| Unit { id: format!("U{i}"), name: name.clone(), clinic_days: clinic_days.clone() })
        .collect();

    let name_permutations = generate_name_permutations(&mut rng);
    let mut doctors = Vec::with_capacity(params.doctor_count);
    for i in 0..params.doctor_count {
        let name = name_permutations[i % name_permutations.len()].clone();
        let unit = &units[i % units.len()].name;
        let category = pick_weighted(&mut rng, &params.category_distribution);
        let workload = Workload {
            weekday_oncalls_3m: rng.gen_range(0..10),
            weekend_oncalls_3m: rng.gen_range(0..4),
            ed_shifts_3m: rng.gen_range(0..15),
            days_since_last_standby: rng.gen_range(0..720),
            standby_count_12m: rng.gen_range(0..3),
            standby_count_3m: rng.gen_range(0..2),
        };
        doctors.push(Doctor::new(i, format!("d{i}"), name, unit.clone(), category).with_workload(workload));
    }

    let mut availability = Vec::new();
    let mut current = roster_start;
    while current <= roster_end {
        let weekday = current.weekday().num_days_from_monday() as u8;
        let posts = if weekday >= 5 { &params.posts_weekend } else { &params.posts_weekday };
        for post in posts {
            for doctor in &doctors {
                let available = !rng.gen_bool(params.unavailable_probability);
                availability.push(AvailabilityRecord { doctor_id: doctor.id.clone(), date: current, post: post.clone(), available });
            }
        }
        current += Duration::days(1);
    }

    ScheduleRequest {
        roster_start,
        roster_end,
        doctors,
        units,
        posts_weekday: params.posts_weekday,
        posts_weekend: params.posts_weekend,
        availability,
        solver_config: crate::config::SolverConfig::default(),
    }
}

fn find_next_monday(date: NaiveDate) -> NaiveDate {
    let days_until_monday = match date.weekday() {
        Weekday::Mon => 0,
        Weekday::Tue => 6,
        Weekday::Wed => 5,
        Weekday::Thu => 4,
        Weekday::Fri => 3,
        Weekday::Sat => 2,
        Weekday::Sun => 1,
    };
    date + Duration::days(days_until_monday)
}

fn pick_weighted<T: Copy>(rng: &mut StdRng, distribution: &[(T, f64)]) -> T {
    let total_weight: f64 = distribution.iter().map(|(_, w)| w).sum();
    let mut choice = rng.gen::<f64>() * total_weight;
    for (value, weight) in distribution {
        if choice < *weight {
            return *value;
        }
        choice -= weight;
    }
    distribution.last().map(|(v, _)| *v).unwrap()
}

const FIRST_NAMES: &[&str] = &["Amy", "Beth", "Carl", "Dan", "Elsa", "Flo", "Gus", "Hugo", "Ivy", "Jay"];
const LAST_NAMES: &[&str] = &["Cole", "Fox", "Green", "Jones", "King", "Li", "Poe", "Rye", "Smith", "Watt"];

fn generate_name_permutations(rng: &mut StdRng) -> Vec<String> {
    let mut names = Vec::with_capacity(FIRST_NAMES.len() * LAST_NAMES.len());
    for first in FIRST_NAMES {
        for last in LAST_NAMES {
            names.push(format!("Dr. {first} {last}"));
        }
    }
    names.shuffle(rng);
    names
}
