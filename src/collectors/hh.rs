use serde_json::Value;

use crate::collectors::{Endpoint, optional_int, optional_str, required, required_str};
use crate::config::SourceSettings;
use crate::error::AppError;
use crate::models::platform::Platform;
use crate::models::vacancy::{NewVacancy, Vacancy};

pub const PAGE_SIZE: u32 = 10;

const PLATFORM: Platform = Platform::HeadHunter;

pub fn endpoint(settings: &SourceSettings) -> Endpoint {
    Endpoint {
        url: settings.hh_url.clone(),
        page_size: PAGE_SIZE,
        headers: vec![("User-Agent".to_string(), settings.hh_user_agent.clone())],
        params: vec![
            ("page".to_string(), "0".to_string()),
            ("per_page".to_string(), PAGE_SIZE.to_string()),
            ("text".to_string(), String::new()),
            ("search_field".to_string(), "name".to_string()),
        ],
        page_param: "page",
        keyword_param: "text",
        listings_key: "items",
    }
}

/// Map an HH.ru `items[]` entry.
///
/// `salary` may be null. The description is the snippet requirement,
/// falling back to the responsibility text when the requirement is empty.
pub fn map_listing(raw: &Value) -> Result<Vacancy, AppError> {
    let salary = raw.get("salary").filter(|s| s.is_object());
    let snippet = raw.get("snippet").filter(|s| s.is_object());

    let description = snippet.and_then(|s| {
        optional_str(s, "requirement")
            .filter(|text| !text.is_empty())
            .or_else(|| optional_str(s, "responsibility"))
    });

    Vacancy::new(NewVacancy {
        platform: PLATFORM.display_name().to_string(),
        vacancy_id: required(raw, "id", PLATFORM)?.clone(),
        title: required_str(raw, "name", PLATFORM)?,
        url: required_str(raw, "alternate_url", PLATFORM)?,
        salary_from: salary.and_then(|s| optional_int(s, "from")),
        salary_to: salary.and_then(|s| optional_int(s, "to")),
        currency: salary.and_then(|s| optional_str(s, "currency")),
        description,
    })
}
