use std::io::{self, BufRead, IsTerminal, Write};

use anyhow::Context;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use crate::collectors::{collectors_for, runner};
use crate::config::{Config, DEFAULT_COUNT, SearchArgs};
use crate::filter::SalaryRange;
use crate::models::PlatformVacancies;
use crate::models::platform::{Catalog, Platform};
use crate::models::vacancy::Vacancy;
use crate::store::JsonFileStore;

/// Parameters for one search, from prompts or flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub catalog: Catalog,
    pub keyword: String,
    pub count: u32,
    pub range: SalaryRange,
    pub from_file: bool,
}

impl SearchRequest {
    pub fn from_args(args: &SearchArgs) -> anyhow::Result<Self> {
        Ok(Self {
            catalog: Catalog::select(&args.platforms)?,
            keyword: args.keyword.clone(),
            count: args.count,
            range: SalaryRange::new(args.min_salary, args.max_salary),
            from_file: args.from_file,
        })
    }
}

/// Where prompts are shown and answers come from.
pub trait Console {
    /// Show `prompt` and read one line. `None` once input is closed.
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>>;

    fn write_line(&mut self, message: &str) -> io::Result<()>;
}

/// Interactive terminal with line editing.
pub struct Terminal {
    editor: DefaultEditor,
}

impl Terminal {
    pub fn new() -> anyhow::Result<Self> {
        let editor = DefaultEditor::new().context("Failed to open the terminal")?;
        Ok(Self { editor })
    }
}

impl Console for Terminal {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        match self.editor.readline(prompt) {
            Ok(line) => Ok(Some(line)),
            Err(ReadlineError::Eof | ReadlineError::Interrupted) => Ok(None),
            Err(ReadlineError::Io(e)) => Err(e),
            Err(e) => Err(io::Error::other(e)),
        }
    }

    fn write_line(&mut self, message: &str) -> io::Result<()> {
        println!("{message}");
        Ok(())
    }
}

/// Plain line reads, used when input is not a terminal.
pub struct Piped<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Piped<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> Console for Piped<R, W> {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }

    fn write_line(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.output, "{message}")
    }
}

/// Question/answer flow on top of a [`Console`].
pub struct Prompter<C> {
    console: C,
}

impl<C: Console> Prompter<C> {
    pub fn new(console: C) -> Self {
        Self { console }
    }

    pub fn ask(&mut self, question: &str) -> io::Result<String> {
        match self.console.read_line(question)? {
            Some(line) => Ok(line.trim().to_string()),
            None => Err(io::Error::new(io::ErrorKind::UnexpectedEof, "input closed")),
        }
    }

    pub fn confirm(&mut self, question: &str) -> io::Result<bool> {
        Ok(self.ask(question)?.eq_ignore_ascii_case("y"))
    }

    pub fn say(&mut self, message: &str) -> io::Result<()> {
        self.console.write_line(message)
    }

    /// Walk the user through a search. Returns `None` if they choose to quit.
    pub fn gather_request(&mut self, file_exists: bool) -> io::Result<Option<SearchRequest>> {
        let from_file = file_exists && self.confirm("Read the previously saved file? (y/n): ")?;

        let catalog = loop {
            let catalog = self.select_platforms()?;
            if !catalog.is_empty() {
                break catalog;
            }
            self.say("No platform selected.")?;
            if self.confirm("Exit the program? (y/n): ")? {
                return Ok(None);
            }
        };

        let keyword = self.ask("Enter a search keyword: ")?;

        let mut range = SalaryRange::default();
        if self.confirm("Specify a salary range? (y/n): ")? {
            range.min = self
                .ask("Minimum salary (press Enter to skip): ")?
                .parse()
                .ok();
            range.max = self
                .ask("Maximum salary (press Enter to skip): ")?
                .parse()
                .ok();
        }

        let count = self
            .ask(&format!(
                "How many vacancies per platform? (default: {DEFAULT_COUNT}): "
            ))?
            .parse()
            .unwrap_or(DEFAULT_COUNT);

        Ok(Some(SearchRequest {
            catalog,
            keyword,
            count,
            range,
            from_file,
        }))
    }

    fn select_platforms(&mut self) -> io::Result<Catalog> {
        let mut catalog = Catalog::default();
        loop {
            self.say("Choose a platform to search:")?;
            for platform in Platform::ALL {
                self.say(&format!("{}. {}", platform.code(), platform))?;
            }
            self.say("3. Done")?;

            let choice = self.ask("> ")?;
            if choice == "3" {
                return Ok(catalog);
            }
            match Platform::from_code(&choice) {
                Some(platform) => {
                    if !catalog.insert(platform) {
                        self.say("This platform is already selected.")?;
                    }
                }
                None => self.say(&format!("Unknown option '{choice}'."))?,
            }
        }
    }
}

/// Fetch live results or reload them from the store.
pub async fn run_search(
    config: &Config,
    store: &mut JsonFileStore,
    request: &SearchRequest,
) -> anyhow::Result<PlatformVacancies> {
    if request.from_file {
        tracing::info!("Loading vacancies from {}", store.path().display());
        return store
            .load_filtered(&request.catalog, request.count, &request.keyword, &request.range)
            .context("Failed to load saved vacancies");
    }

    let collectors = collectors_for(&request.catalog, &config.sources())?;
    runner::collect_all(&collectors, &request.keyword, request.count, &request.range)
        .await
        .context("Failed to collect vacancies")
}

pub fn print_vacancies(out: &mut impl Write, grouped: &PlatformVacancies) -> io::Result<()> {
    let rule = "-".repeat(10);
    for (platform, vacancies) in grouped {
        writeln!(out, "\n{rule} {platform} {rule}")?;
        writeln!(out, "{rule} {} {rule}", vacancies.len())?;
        if vacancies.is_empty() {
            writeln!(out, "No vacancies match the given criteria.\n")?;
            continue;
        }
        for vacancy in vacancies {
            writeln!(out, "{vacancy}")?;
        }
    }
    Ok(())
}

pub async fn interactive(config: &Config, store: &mut JsonFileStore) -> anyhow::Result<()> {
    if io::stdin().is_terminal() {
        run_prompts(Prompter::new(Terminal::new()?), config, store).await
    } else {
        let console = Piped::new(io::stdin().lock(), io::stdout());
        run_prompts(Prompter::new(console), config, store).await
    }
}

async fn run_prompts<C: Console>(
    mut prompter: Prompter<C>,
    config: &Config,
    store: &mut JsonFileStore,
) -> anyhow::Result<()> {
    prompter.say("Vacancy search")?;

    let Some(request) = prompter.gather_request(store.exists())? else {
        return Ok(());
    };

    let grouped = run_search(config, store, &request).await?;
    print_vacancies(&mut io::stdout().lock(), &grouped)?;

    if !request.from_file && prompter.confirm("Save results to the JSON file? (y/n): ")? {
        store.save_all(&grouped)?;
    }
    Ok(())
}

pub async fn search(
    config: &Config,
    store: &mut JsonFileStore,
    args: &SearchArgs,
) -> anyhow::Result<()> {
    let request = SearchRequest::from_args(args)?;
    let grouped = run_search(config, store, &request).await?;
    print_vacancies(&mut io::stdout().lock(), &grouped)?;

    if args.save {
        store.save_all(&grouped)?;
    } else if args.append {
        for vacancy in grouped.values().flatten() {
            store.add(vacancy)?;
        }
        tracing::info!("{} vacancies stored in {}", store.len(), store.path().display());
    }
    Ok(())
}

fn stored_at(store: &mut JsonFileStore, index: usize) -> anyhow::Result<Vacancy> {
    let record = store
        .get(index)?
        .with_context(|| format!("No stored vacancy at index {index}"))?;
    serde_json::from_value(record).context("Stored vacancy is malformed")
}

pub fn show(store: &mut JsonFileStore, index: usize) -> anyhow::Result<()> {
    let vacancy = stored_at(store, index)?;
    print!("{vacancy}");
    Ok(())
}

pub fn find(store: &mut JsonFileStore, code: &str, vacancy_id: i64) -> anyhow::Result<()> {
    let platform = Platform::from_code(code)
        .with_context(|| format!("Unknown platform code '{code}'"))?;
    let vacancy = store
        .find(platform.display_name(), vacancy_id)?
        .with_context(|| format!("No stored {platform} vacancy with id {vacancy_id}"))?;
    print!("{vacancy}");
    Ok(())
}

pub fn delete(store: &mut JsonFileStore, index: usize) -> anyhow::Result<()> {
    let record = store
        .remove_at(index)?
        .with_context(|| format!("No stored vacancy at index {index}"))?;
    let title = record.get("title").and_then(|v| v.as_str()).unwrap_or("untitled");
    tracing::info!("Deleted \"{title}\", {} vacancies left", store.len());
    Ok(())
}
