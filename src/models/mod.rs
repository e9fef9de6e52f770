pub mod platform;
pub mod vacancy;

use std::collections::BTreeMap;

use crate::models::vacancy::Vacancy;

/// Vacancies grouped by platform display name.
pub type PlatformVacancies = BTreeMap<String, Vec<Vacancy>>;
