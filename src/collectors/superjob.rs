use serde_json::Value;

use crate::collectors::{Endpoint, optional_int, optional_str, required, required_str};
use crate::config::SourceSettings;
use crate::error::AppError;
use crate::models::platform::Platform;
use crate::models::vacancy::{NewVacancy, Vacancy};

pub const PAGE_SIZE: u32 = 20;

const PLATFORM: Platform = Platform::SuperJob;

pub fn endpoint(settings: &SourceSettings) -> Endpoint {
    let mut headers = Vec::new();
    match &settings.superjob_api_key {
        Some(key) => headers.push(("X-Api-App-Id".to_string(), key.clone())),
        None => tracing::warn!("SUPERJOB_API_KEY is not set, SuperJob.ru may reject requests"),
    }

    Endpoint {
        url: settings.superjob_url.clone(),
        page_size: PAGE_SIZE,
        headers,
        params: vec![
            ("page".to_string(), "0".to_string()),
            ("count".to_string(), PAGE_SIZE.to_string()),
            ("keywords[0][srws]".to_string(), "1".to_string()),
            ("keywords[0][skwc]".to_string(), "or".to_string()),
            ("keywords[0][keys]".to_string(), String::new()),
        ],
        page_param: "page",
        keyword_param: "keywords[0][keys]",
        listings_key: "objects",
    }
}

/// Map a SuperJob `objects[]` entry.
pub fn map_listing(raw: &Value) -> Result<Vacancy, AppError> {
    Vacancy::new(NewVacancy {
        platform: PLATFORM.display_name().to_string(),
        vacancy_id: required(raw, "id", PLATFORM)?.clone(),
        title: required_str(raw, "profession", PLATFORM)?,
        url: required_str(raw, "link", PLATFORM)?,
        salary_from: optional_int(raw, "payment_from"),
        salary_to: optional_int(raw, "payment_to"),
        currency: optional_str(raw, "currency"),
        description: optional_str(raw, "vacancyRichText"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object() -> Value {
        json!({
            "id": 46512784,
            "profession": "Инженер-программист",
            "link": "https://www.superjob.ru/vakansii/inzhener-46512784.html",
            "payment_from": 120000,
            "payment_to": 0,
            "currency": "rub",
            "vacancyRichText": "<p>Поддержка и развитие внутренних систем</p>",
            "town": {"title": "Москва"}
        })
    }

    #[test]
    fn maps_all_fields() {
        let vacancy = map_listing(&object()).unwrap();
        assert_eq!(vacancy.platform(), "SuperJob.ru");
        assert_eq!(vacancy.vacancy_id(), 46512784);
        assert_eq!(vacancy.title(), "Инженер-программист");
        assert_eq!(vacancy.salary_from(), Some(120000));
        assert_eq!(vacancy.salary_to(), Some(0));
        assert_eq!(vacancy.currency(), Some("rub"));
        assert_eq!(vacancy.avg_salary(), 120000);
        assert!(vacancy.description().starts_with("<p>Поддержка"));
    }

    #[test]
    fn absent_optional_fields_map_to_none() {
        let raw = json!({
            "id": 1,
            "profession": "Курьер",
            "link": "https://www.superjob.ru/vakansii/1.html"
        });
        let vacancy = map_listing(&raw).unwrap();
        assert_eq!(vacancy.salary_from(), None);
        assert_eq!(vacancy.salary_to(), None);
        assert_eq!(vacancy.currency(), None);
        assert_eq!(vacancy.avg_salary(), 0);
    }

    #[test]
    fn missing_link_is_a_mapping_error() {
        let mut raw = object();
        raw.as_object_mut().unwrap().remove("link");
        let err = map_listing(&raw).unwrap_err();
        assert!(matches!(err, AppError::Mapping { field: "link", .. }));
    }

    #[test]
    fn api_key_is_sent_as_app_id_header() {
        let settings = SourceSettings {
            superjob_api_key: Some("v3.r.secret".to_string()),
            ..SourceSettings::default()
        };
        let endpoint = endpoint(&settings);
        assert_eq!(
            endpoint.headers,
            vec![("X-Api-App-Id".to_string(), "v3.r.secret".to_string())]
        );
        assert_eq!(endpoint.page_size, 20);
        assert_eq!(endpoint.keyword_param, "keywords[0][keys]");
    }
}
