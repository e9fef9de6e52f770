use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

pub const DEFAULT_HH_URL: &str = "https://api.hh.ru/vacancies";
pub const DEFAULT_SUPERJOB_URL: &str = "https://api.superjob.ru/2.0/vacancies/";
pub const DEFAULT_USER_AGENT: &str = "Vacant/1.0 (vacancies-cli)";

/// Number of vacancies requested per platform when none is given.
pub const DEFAULT_COUNT: u32 = 50;

#[derive(Parser, Debug, Clone)]
#[command(name = "vacancies", about = "Search HH.ru and SuperJob.ru vacancies")]
pub struct Config {
    /// JSON file used to save and reload vacancies
    #[arg(long, env = "VACANCY_STORE_PATH", default_value = "vacancies.json")]
    pub store_path: PathBuf,

    /// HH.ru vacancy search endpoint
    #[arg(long, env = "HH_API_URL", default_value = DEFAULT_HH_URL)]
    pub hh_url: String,

    /// User-Agent sent to HH.ru
    #[arg(long, env = "HH_USER_AGENT", default_value = DEFAULT_USER_AGENT)]
    pub hh_user_agent: String,

    /// SuperJob.ru vacancy search endpoint
    #[arg(long, env = "SUPERJOB_API_URL", default_value = DEFAULT_SUPERJOB_URL)]
    pub superjob_url: String,

    /// SuperJob.ru application secret key (X-Api-App-Id)
    #[arg(long, env = "SUPERJOB_API_KEY")]
    pub superjob_api_key: Option<String>,

    /// HTTP request timeout in seconds (no timeout when unset)
    #[arg(long, env = "HTTP_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(clap::Subcommand, Debug, Clone)]
pub enum Command {
    /// Prompt for search parameters (default when no subcommand given)
    Interactive,
    /// Search without prompting
    Search(SearchArgs),
    /// Print the stored vacancy at a position in the file
    Show {
        #[arg(long)]
        index: usize,
    },
    /// Print a stored vacancy by platform and vacancy id
    Find {
        /// Platform selector code: 1 = HH.ru, 2 = SuperJob.ru
        #[arg(long, short = 'p')]
        platform: String,

        #[arg(long)]
        id: i64,
    },
    /// Remove the stored vacancy at a position in the file
    Delete {
        #[arg(long)]
        index: usize,
    },
}

#[derive(clap::Args, Debug, Clone)]
pub struct SearchArgs {
    /// Platform selector code: 1 = HH.ru, 2 = SuperJob.ru (repeatable)
    #[arg(long = "platform", short = 'p', required = true)]
    pub platforms: Vec<String>,

    /// Search keyword
    #[arg(long, short = 'k', default_value = "")]
    pub keyword: String,

    /// Exclusive lower salary bound
    #[arg(long)]
    pub min_salary: Option<i64>,

    /// Exclusive upper salary bound
    #[arg(long)]
    pub max_salary: Option<i64>,

    /// Vacancies to request per platform
    #[arg(long, short = 'n', default_value_t = DEFAULT_COUNT)]
    pub count: u32,

    /// Reload from the store file instead of querying the platforms
    #[arg(long, conflicts_with = "save")]
    pub from_file: bool,

    /// Save fetched results to the store file
    #[arg(long)]
    pub save: bool,

    /// Append fetched results to the store file, keeping what is there
    #[arg(long, conflicts_with_all = ["save", "from_file"])]
    pub append: bool,
}

/// Connection settings for the platform collectors.
#[derive(Debug, Clone)]
pub struct SourceSettings {
    pub hh_url: String,
    pub hh_user_agent: String,
    pub superjob_url: String,
    pub superjob_api_key: Option<String>,
    pub timeout: Option<Duration>,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            hh_url: DEFAULT_HH_URL.to_string(),
            hh_user_agent: DEFAULT_USER_AGENT.to_string(),
            superjob_url: DEFAULT_SUPERJOB_URL.to_string(),
            superjob_api_key: None,
            timeout: None,
        }
    }
}

impl Config {
    /// Resolve the command, defaulting to Interactive if none specified.
    pub fn resolved_command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Interactive)
    }

    pub fn sources(&self) -> SourceSettings {
        SourceSettings {
            hh_url: self.hh_url.clone(),
            hh_user_agent: self.hh_user_agent.clone(),
            superjob_url: self.superjob_url.clone(),
            superjob_api_key: self.superjob_api_key.clone(),
            timeout: self.timeout_secs.map(Duration::from_secs),
        }
    }
}
