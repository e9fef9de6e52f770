use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AppError;

/// Maximum number of characters kept from a listing description.
pub const DESCRIPTION_LIMIT: usize = 200;

/// Stored in place of a missing description.
pub const NO_DESCRIPTION: &str = "Отсутствует описание";

/// A single job posting, normalized across platforms.
///
/// Fields are private so that `avg_salary` always reflects `salary_from`
/// and `salary_to`. Every path that builds a `Vacancy` (mappers, the file
/// store, deserialization) goes through [`NewVacancy`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "NewVacancy")]
pub struct Vacancy {
    platform: String,
    vacancy_id: i64,
    title: String,
    url: String,
    salary_from: Option<i64>,
    salary_to: Option<i64>,
    currency: Option<String>,
    description: String,
    avg_salary: i64,
}

/// Unvalidated input for a [`Vacancy`].
///
/// `vacancy_id` is kept as raw JSON because platforms disagree on whether
/// ids are numbers or numeric strings. Any `avg_salary` present in stored
/// JSON is ignored and recomputed.
#[derive(Debug, Clone, Deserialize)]
pub struct NewVacancy {
    pub platform: String,
    pub vacancy_id: Value,
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub salary_from: Option<i64>,
    #[serde(default)]
    pub salary_to: Option<i64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl TryFrom<NewVacancy> for Vacancy {
    type Error = AppError;

    fn try_from(input: NewVacancy) -> Result<Self, Self::Error> {
        let vacancy_id = coerce_id(&input.vacancy_id)?;
        let avg_salary = best_salary(input.salary_from, input.salary_to);

        Ok(Vacancy {
            platform: input.platform,
            vacancy_id,
            title: input.title,
            url: input.url,
            salary_from: input.salary_from,
            salary_to: input.salary_to,
            currency: input.currency,
            description: normalize_description(input.description),
            avg_salary,
        })
    }
}

impl Vacancy {
    pub fn new(input: NewVacancy) -> Result<Self, AppError> {
        Self::try_from(input)
    }

    pub fn platform(&self) -> &str {
        &self.platform
    }

    pub fn vacancy_id(&self) -> i64 {
        self.vacancy_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    #[allow(dead_code)]
    pub fn url(&self) -> &str {
        &self.url
    }

    #[allow(dead_code)]
    pub fn salary_from(&self) -> Option<i64> {
        self.salary_from
    }

    #[allow(dead_code)]
    pub fn salary_to(&self) -> Option<i64> {
        self.salary_to
    }

    #[allow(dead_code)]
    pub fn currency(&self) -> Option<&str> {
        self.currency.as_deref()
    }

    #[allow(dead_code)]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Best available single salary figure; 0 when neither bound is known.
    pub fn avg_salary(&self) -> i64 {
        self.avg_salary
    }

    /// Field-named JSON form used for persistence.
    pub fn to_value(&self) -> Result<Value, AppError> {
        Ok(serde_json::to_value(self)?)
    }

    /// Full structural comparison over the persisted form.
    ///
    /// `==` only compares `avg_salary`; use this when identity matters.
    #[allow(dead_code)]
    pub fn same_record(&self, other: &Vacancy) -> bool {
        self.platform == other.platform
            && self.vacancy_id == other.vacancy_id
            && self.title == other.title
            && self.url == other.url
            && self.salary_from == other.salary_from
            && self.salary_to == other.salary_to
            && self.currency == other.currency
            && self.description == other.description
    }
}

/// Vacancies compare by `avg_salary` only. Not suitable for dedup.
impl PartialEq for Vacancy {
    fn eq(&self, other: &Self) -> bool {
        self.avg_salary == other.avg_salary
    }
}

impl PartialOrd for Vacancy {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.avg_salary.partial_cmp(&other.avg_salary)
    }
}

impl fmt::Display for Vacancy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let currency = self.currency.as_deref().unwrap_or("");
        writeln!(f, "Platform: {}", self.platform)?;
        writeln!(f, "ID: {}", self.vacancy_id)?;
        writeln!(f, "Title: {}", self.title)?;
        writeln!(
            f,
            "Salary: {} {currency} - {} {currency}",
            salary_label(self.salary_from),
            salary_label(self.salary_to),
        )?;
        writeln!(f, "Description: {}", self.description)?;
        writeln!(f, "Link: {}", self.url)
    }
}

fn salary_label(value: Option<i64>) -> String {
    value.map_or_else(|| "not specified".to_string(), |v| v.to_string())
}

fn coerce_id(raw: &Value) -> Result<i64, AppError> {
    match raw {
        Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| AppError::InvalidVacancyId(n.to_string())),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| AppError::InvalidVacancyId(s.clone())),
        other => Err(AppError::InvalidVacancyId(other.to_string())),
    }
}

/// Not a mean: the larger bound when both are known, else whichever exists.
fn best_salary(from: Option<i64>, to: Option<i64>) -> i64 {
    match (from, to) {
        (Some(from), Some(to)) => from.max(to),
        (Some(value), None) | (None, Some(value)) => value,
        (None, None) => 0,
    }
}

fn normalize_description(description: Option<String>) -> String {
    match description {
        Some(text) if text.chars().count() > DESCRIPTION_LIMIT => {
            text.chars().take(DESCRIPTION_LIMIT).collect()
        }
        Some(text) => text,
        None => NO_DESCRIPTION.to_string(),
    }
}

#[cfg(test)]
pub(crate) fn sample(platform: &str, id: i64, from: Option<i64>, to: Option<i64>) -> Vacancy {
    Vacancy::new(NewVacancy {
        platform: platform.to_string(),
        vacancy_id: Value::from(id),
        title: format!("Vacancy {id}"),
        url: format!("https://example.com/vacancy/{id}"),
        salary_from: from,
        salary_to: to,
        currency: Some("RUR".to_string()),
        description: Some("Rust, tokio".to_string()),
    })
    .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn input(id: Value, description: Option<String>) -> NewVacancy {
        NewVacancy {
            platform: "HH.ru".to_string(),
            vacancy_id: id,
            title: "Backend developer".to_string(),
            url: "https://hh.ru/vacancy/1".to_string(),
            salary_from: None,
            salary_to: None,
            currency: None,
            description,
        }
    }

    #[test]
    fn avg_salary_prefers_the_larger_bound() {
        assert_eq!(sample("HH.ru", 1, Some(100), Some(300)).avg_salary(), 300);
        assert_eq!(sample("HH.ru", 1, Some(500), Some(300)).avg_salary(), 500);
        assert_eq!(sample("HH.ru", 1, Some(100), None).avg_salary(), 100);
        assert_eq!(sample("HH.ru", 1, None, Some(250)).avg_salary(), 250);
        assert_eq!(sample("HH.ru", 1, None, None).avg_salary(), 0);
    }

    #[test]
    fn description_is_truncated_or_defaulted() {
        let long = "я".repeat(250);
        let vacancy = Vacancy::new(input(json!(1), Some(long))).unwrap();
        assert_eq!(vacancy.description().chars().count(), DESCRIPTION_LIMIT);

        let exact = "a".repeat(DESCRIPTION_LIMIT);
        let vacancy = Vacancy::new(input(json!(1), Some(exact.clone()))).unwrap();
        assert_eq!(vacancy.description(), exact);

        let vacancy = Vacancy::new(input(json!(1), None)).unwrap();
        assert_eq!(vacancy.description(), NO_DESCRIPTION);

        let vacancy = Vacancy::new(input(json!(1), Some(String::new()))).unwrap();
        assert_eq!(vacancy.description(), "");
    }

    #[test]
    fn vacancy_id_is_coerced_to_integer() {
        assert_eq!(Vacancy::new(input(json!("93120"), None)).unwrap().vacancy_id(), 93120);
        assert_eq!(Vacancy::new(input(json!(42), None)).unwrap().vacancy_id(), 42);

        for bad in [json!("abc"), json!(null), json!(1.5), json!([1])] {
            let err = Vacancy::new(input(bad, None)).unwrap_err();
            assert!(matches!(err, AppError::InvalidVacancyId(_)));
        }
    }

    #[test]
    fn equality_only_looks_at_avg_salary() {
        let a = sample("HH.ru", 1, Some(100), Some(200));
        let b = sample("SuperJob.ru", 2, None, Some(200));
        let c = sample("HH.ru", 1, Some(100), Some(300));

        assert_eq!(a, b);
        assert!(!a.same_record(&b));
        assert_ne!(a, c);
        assert!(a < c);
    }

    #[test]
    fn serialized_form_rebuilds_an_identical_record() {
        let original = sample("HH.ru", 7, Some(90_000), Some(120_000));
        let value = original.to_value().unwrap();

        assert_eq!(value["avg_salary"], json!(120_000));
        assert_eq!(value["vacancy_id"], json!(7));

        let restored: Vacancy = serde_json::from_value(value).unwrap();
        assert!(restored.same_record(&original));
        assert_eq!(restored.avg_salary(), original.avg_salary());
    }

    #[test]
    fn stored_avg_salary_is_recomputed() {
        let value = json!({
            "platform": "HH.ru",
            "vacancy_id": 3,
            "title": "QA",
            "url": "https://hh.ru/vacancy/3",
            "salary_from": 10,
            "salary_to": null,
            "currency": "RUR",
            "description": null,
            "avg_salary": 999
        });
        let vacancy: Vacancy = serde_json::from_value(value).unwrap();
        assert_eq!(vacancy.avg_salary(), 10);
        assert_eq!(vacancy.description(), NO_DESCRIPTION);
    }

    #[test]
    fn display_renders_all_parts() {
        let text = sample("HH.ru", 5, Some(100), None).to_string();
        assert!(text.contains("Platform: HH.ru"));
        assert!(text.contains("ID: 5"));
        assert!(text.contains("Salary: 100 RUR - not specified RUR"));
        assert!(text.contains("Link: https://example.com/vacancy/5"));
    }
}
