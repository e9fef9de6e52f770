use crate::collectors::VacancyCollector;
use crate::error::AppError;
use crate::filter::{SalaryRange, filter_vacancies};
use crate::models::PlatformVacancies;

/// Run each collector in turn and group the results by platform name.
///
/// Platforms are processed strictly one after another. The salary filter
/// is skipped entirely when `range` has no bounds, so unpriced vacancies
/// are kept in that case. Any transport or mapping error aborts the run.
pub async fn collect_all(
    collectors: &[Box<dyn VacancyCollector>],
    keyword: &str,
    count: u32,
    range: &SalaryRange,
) -> Result<PlatformVacancies, AppError> {
    let mut grouped = PlatformVacancies::new();

    for collector in collectors {
        let platform = collector.platform();
        tracing::info!("Collecting up to {count} vacancies from {platform} for '{keyword}'");

        let vacancies = collector.collect(keyword, count).await?;
        let found = vacancies.len();

        let vacancies = if range.is_unbounded() {
            vacancies
        } else {
            filter_vacancies(&vacancies, range)
        };

        tracing::info!("{platform}: {found} found, {} kept", vacancies.len());
        grouped.insert(platform.display_name().to_string(), vacancies);
    }

    Ok(grouped)
}
