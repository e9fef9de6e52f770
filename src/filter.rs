use crate::models::vacancy::Vacancy;

/// Salary window with exclusive bounds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SalaryRange {
    pub min: Option<i64>,
    pub max: Option<i64>,
}

impl SalaryRange {
    pub fn new(min: Option<i64>, max: Option<i64>) -> Self {
        Self { min, max }
    }

    /// True when neither bound is set.
    pub fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    /// Whether a vacancy survives the filter.
    ///
    /// Vacancies without any salary (`avg_salary == 0`) never match, and
    /// both bounds are exclusive.
    pub fn admits(&self, vacancy: &Vacancy) -> bool {
        let salary = vacancy.avg_salary();
        if salary == 0 {
            return false;
        }
        if self.min.is_some_and(|min| salary <= min) {
            return false;
        }
        if self.max.is_some_and(|max| salary >= max) {
            return false;
        }
        true
    }
}

/// Keep the vacancies admitted by `range`, preserving input order.
pub fn filter_vacancies(vacancies: &[Vacancy], range: &SalaryRange) -> Vec<Vacancy> {
    vacancies
        .iter()
        .filter(|v| range.admits(v))
        .cloned()
        .collect()
}
