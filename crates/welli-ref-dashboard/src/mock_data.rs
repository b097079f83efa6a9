//! Simulated patient directory for the dashboard reference runtime.
//!
//! All data in this module is hardcoded and fictional. It stands in for the
//! patient service a real deployment would call, and only exists to give the
//! chat surfaces a "current patient" to talk about.

use serde::{Deserialize, Serialize};

/// One row of the patient directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
    pub id: String,
    pub name: String,
    pub age: u32,
    pub gender: String,
    /// Primary condition shown in the patient list.
    pub condition: String,
    pub last_visit: String,
    pub insurance_provider: String,
}

impl Patient {
    fn new(
        id: &str,
        name: &str,
        age: u32,
        gender: &str,
        condition: &str,
        last_visit: &str,
        insurance_provider: &str,
    ) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            age,
            gender: gender.to_string(),
            condition: condition.to_string(),
            last_visit: last_visit.to_string(),
            insurance_provider: insurance_provider.to_string(),
        }
    }
}

// ── Patient Directory (mock) ──────────────────────────────────────────────────

/// Return every patient in the mock directory, in list order.
pub fn patient_directory() -> Vec<Patient> {
    vec![
        Patient::new("1", "Sarah Johnson", 42, "Female", "Hypertension", "March 15, 2023", "Welli Health"),
        Patient::new("2", "Robert Chen", 56, "Male", "Type 2 Diabetes", "March 10, 2023", "Blue Cross"),
        Patient::new("3", "Emma Garcia", 29, "Female", "Migraine", "March 5, 2023", "None"),
        Patient::new("4", "Michael Wilson", 68, "Male", "Arthritis", "February 28, 2023", "Medicare"),
        Patient::new("5", "Olivia Martinez", 35, "Female", "Asthma", "February 25, 2023", "Aetna"),
    ]
}

/// Look up a patient by id.
///
/// Unknown ids resolve to the first patient in the directory, matching how
/// the profile page behaves when handed a stale route.
pub fn find_patient(id: &str) -> Patient {
    let mut directory = patient_directory();
    match directory.iter().position(|p| p.id == id) {
        Some(index) => directory.swap_remove(index),
        None => directory.swap_remove(0),
    }
}

/// Case-insensitive search over patient name and condition.
///
/// A blank term returns the whole directory.
pub fn search_patients(term: &str) -> Vec<Patient> {
    let needle = term.trim().to_lowercase();
    patient_directory()
        .into_iter()
        .filter(|p| {
            needle.is_empty()
                || p.name.to_lowercase().contains(&needle)
                || p.condition.to_lowercase().contains(&needle)
        })
        .collect()
}
