//! The interactive session: authenticate once, then serve menu choices until
//! the user exits.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

use crate::client::Client;
use crate::error::{Error, Result};
use crate::tools::{self, KeywordSearch, PageSearch, DEFAULT_COUNTRY, DEFAULT_LIMIT};

const RULE_WIDTH: usize = 50;

/// Searches run by the "preset" menu entry, in order.
pub fn preset_searches() -> (Vec<KeywordSearch>, PageSearch) {
    let keywords = ["scarpe verdi", "spray nasale", "marketing digitale"]
        .into_iter()
        .map(|k| KeywordSearch::new(k).with_country("IT").with_limit(5))
        .collect();
    (keywords, PageSearch::new("nike").with_limit(5))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuState {
    AwaitingAuth,
    MainMenu,
    Exit,
}

/// Why a session reached [`MenuState::Exit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    AuthFailed,
    UserExit,
    EndOfInput,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    KeywordSearch,
    PageSearch,
    Presets,
    Exit,
}

impl MenuChoice {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(MenuChoice::KeywordSearch),
            "2" => Some(MenuChoice::PageSearch),
            "3" => Some(MenuChoice::Presets),
            "4" => Some(MenuChoice::Exit),
            _ => None,
        }
    }
}

/// Parse a result limit typed by the user; blank means the default.
pub fn parse_limit(input: &str) -> Result<u32> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(DEFAULT_LIMIT);
    }
    input
        .parse()
        .map_err(|_| Error::InvalidInput(format!("limit must be a non-negative integer, got {input:?}")))
}

pub struct Session<'a, R, W> {
    client: &'a Client,
    input: R,
    output: W,
    state: MenuState,
    exit_reason: Option<ExitReason>,
}

impl<'a, R, W> Session<'a, R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(client: &'a Client, input: R, output: W) -> Self {
        Self {
            client,
            input,
            output,
            state: MenuState::AwaitingAuth,
            exit_reason: None,
        }
    }

    pub fn state(&self) -> MenuState {
        self.state
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Drive the session to [`MenuState::Exit`].
    pub async fn run(&mut self) -> Result<ExitReason> {
        self.print("ADS MCP PROBE").await?;
        self.print(&"=".repeat(RULE_WIDTH)).await?;

        while self.state != MenuState::Exit {
            self.state = self.step().await?;
            debug!("Session state: {:?}", self.state);
        }
        Ok(self.exit_reason.unwrap_or(ExitReason::UserExit))
    }

    /// Perform the work of the current state and return the next one.
    pub async fn step(&mut self) -> Result<MenuState> {
        match self.state {
            MenuState::AwaitingAuth => self.authenticate().await,
            MenuState::MainMenu => self.main_menu().await,
            MenuState::Exit => Ok(MenuState::Exit),
        }
    }

    async fn authenticate(&mut self) -> Result<MenuState> {
        self.print("\nAUTHENTICATION CHECK").await?;
        let (response, status) = tools::check_auth_status(self.client).await;
        let raw = serde_json::to_string_pretty(&response)?;
        self.print(&raw).await?;
        self.write(&status.report()).await?;

        if status.authenticated {
            Ok(MenuState::MainMenu)
        } else {
            warn!("Authentication failed, not showing the menu");
            self.exit(ExitReason::AuthFailed)
        }
    }

    async fn main_menu(&mut self) -> Result<MenuState> {
        self.print(&format!("\n{}", "=".repeat(RULE_WIDTH))).await?;
        self.print("OPTIONS:").await?;
        self.print("1. Search ads by keyword").await?;
        self.print("2. Search ads by page").await?;
        self.print("3. Run preset searches").await?;
        self.print("4. Exit").await?;

        let Some(line) = self.prompt("\nChoose an option (1-4): ").await? else {
            return self.exit(ExitReason::EndOfInput);
        };

        match MenuChoice::parse(&line) {
            Some(MenuChoice::KeywordSearch) => self.keyword_search().await,
            Some(MenuChoice::PageSearch) => self.page_search().await,
            Some(MenuChoice::Presets) => {
                self.run_presets().await?;
                Ok(MenuState::MainMenu)
            }
            Some(MenuChoice::Exit) => {
                self.print("\nGoodbye!").await?;
                self.exit(ExitReason::UserExit)
            }
            None => {
                self.print("Invalid option").await?;
                Ok(MenuState::MainMenu)
            }
        }
    }

    async fn keyword_search(&mut self) -> Result<MenuState> {
        let Some(keywords) = self.prompt("Enter keywords: ").await? else {
            return self.exit(ExitReason::EndOfInput);
        };
        let Some(country) = self.prompt(&format!("Country (default {DEFAULT_COUNTRY}): ")).await? else {
            return self.exit(ExitReason::EndOfInput);
        };
        let Some(limit) = self.prompt(&format!("Result limit (default {DEFAULT_LIMIT}): ")).await? else {
            return self.exit(ExitReason::EndOfInput);
        };
        let limit = match parse_limit(&limit) {
            Ok(limit) => limit,
            Err(e) => {
                self.print(&e.to_string()).await?;
                return Ok(MenuState::MainMenu);
            }
        };

        let country = if country.is_empty() {
            DEFAULT_COUNTRY.to_string()
        } else {
            country
        };
        let search = KeywordSearch::new(keywords)
            .with_country(country)
            .with_limit(limit);
        self.run_keyword_search(&search).await?;
        Ok(MenuState::MainMenu)
    }

    async fn page_search(&mut self) -> Result<MenuState> {
        let Some(page_id) = self.prompt("Enter page ID or name: ").await? else {
            return self.exit(ExitReason::EndOfInput);
        };
        let Some(limit) = self.prompt(&format!("Result limit (default {DEFAULT_LIMIT}): ")).await? else {
            return self.exit(ExitReason::EndOfInput);
        };
        let limit = match parse_limit(&limit) {
            Ok(limit) => limit,
            Err(e) => {
                self.print(&e.to_string()).await?;
                return Ok(MenuState::MainMenu);
            }
        };

        self.run_page_search(&PageSearch::new(page_id).with_limit(limit))
            .await?;
        Ok(MenuState::MainMenu)
    }

    async fn run_presets(&mut self) -> Result<()> {
        self.print("\nRunning preset searches...").await?;
        let (keyword_searches, page) = preset_searches();
        for search in &keyword_searches {
            self.run_keyword_search(search).await?;
        }
        self.run_page_search(&page).await
    }

    async fn run_keyword_search(&mut self, search: &KeywordSearch) -> Result<()> {
        self.print(&format!(
            "\nSEARCHING ADS: '{}' in {}",
            search.keywords, search.country
        ))
        .await?;
        let outcome = tools::search_competitor_ads(self.client, search).await;
        self.write(&outcome.keyword_report()).await
    }

    async fn run_page_search(&mut self, search: &PageSearch) -> Result<()> {
        self.print(&format!("\nSEARCHING BY PAGE: {}", search.page_id))
            .await?;
        let outcome = tools::search_ads_by_page(self.client, search).await;
        self.write(&outcome.page_report(&search.page_id)).await
    }

    fn exit(&mut self, reason: ExitReason) -> Result<MenuState> {
        self.exit_reason = Some(reason);
        Ok(MenuState::Exit)
    }

    /// Show `text` and read one trimmed line. `None` at end of input.
    async fn prompt(&mut self, text: &str) -> Result<Option<String>> {
        self.write(text).await?;
        let mut line = String::new();
        if self.input.read_line(&mut line).await? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    async fn print(&mut self, line: &str) -> Result<()> {
        self.write(line).await?;
        self.write("\n").await
    }

    async fn write(&mut self, text: &str) -> Result<()> {
        self.output.write_all(text.as_bytes()).await?;
        self.output.flush().await?;
        Ok(())
    }
}
