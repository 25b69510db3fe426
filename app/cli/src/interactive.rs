//! Interactive prompt loop

use anyhow::Result;
use astra_search::{DateRange, FilterUpdate, SortBy, SourceType};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::render;
use crate::session::SearchSession;

const HELP: &str = r#"Type a query to search. Commands:
  :date all|day|week|month|year   set the date range filter
  :sort relevance|date            set the sort order
  :source all|news|academic|blogs set the source filter
  :filters                        show active filters
  :prompt TEXT                    set the system prompt (:prompt "" sends none)
  :prompt                         show the system prompt
  :prompt-reset                   restore the default system prompt
  :refresh                        run the current query again
  :open FRAGMENT                  open a #q=... link
  :s N                            search related suggestion N
  :history                        list past searches
  :clear-history                  forget past searches
  :quit                           exit"#;

#[derive(Debug, Clone, PartialEq)]
pub enum ReplCommand {
    Empty,
    Search(String),
    Filter(FilterUpdate),
    ShowFilters,
    SetPrompt(String),
    ShowPrompt,
    ResetPrompt,
    Refresh,
    Open(String),
    Suggestion(usize),
    History,
    ClearHistory,
    Help,
    Quit,
}

pub fn parse_command(line: &str) -> Result<ReplCommand, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(ReplCommand::Empty);
    }
    let Some(command) = line.strip_prefix(':') else {
        return Ok(ReplCommand::Search(line.to_string()));
    };

    let (name, arg) = match command.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (command, ""),
    };

    let command = match name {
        "date" => ReplCommand::Filter(FilterUpdate {
            date_range: Some(arg.parse::<DateRange>().map_err(|e| e.to_string())?),
            ..Default::default()
        }),
        "sort" => ReplCommand::Filter(FilterUpdate {
            sort_by: Some(arg.parse::<SortBy>().map_err(|e| e.to_string())?),
            ..Default::default()
        }),
        "source" => ReplCommand::Filter(FilterUpdate {
            source_type: Some(arg.parse::<SourceType>().map_err(|e| e.to_string())?),
            ..Default::default()
        }),
        "filters" => ReplCommand::ShowFilters,
        "prompt" if arg.is_empty() => ReplCommand::ShowPrompt,
        "prompt" if arg == "\"\"" => ReplCommand::SetPrompt(String::new()),
        "prompt" => ReplCommand::SetPrompt(arg.to_string()),
        "prompt-reset" => ReplCommand::ResetPrompt,
        "refresh" => ReplCommand::Refresh,
        "open" if arg.is_empty() => return Err("usage: :open #q=QUERY".to_string()),
        "open" => ReplCommand::Open(arg.to_string()),
        "s" => {
            let n: usize = arg
                .parse()
                .map_err(|_| format!("expected a suggestion number, got '{}'", arg))?;
            if n == 0 {
                return Err("suggestions are numbered from 1".to_string());
            }
            ReplCommand::Suggestion(n - 1)
        }
        "history" => ReplCommand::History,
        "clear-history" => ReplCommand::ClearHistory,
        "help" | "h" | "?" => ReplCommand::Help,
        "quit" | "q" | "exit" => ReplCommand::Quit,
        _ => return Err(format!("unknown command ':{}' (try :help)", name)),
    };
    Ok(command)
}

pub async fn run_interactive(session: &mut SearchSession) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut out = std::io::stdout();

    writeln!(out, "Astra Search. Type :help for commands.")?;

    loop {
        write!(out, "astra> ")?;
        out.flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(message) => {
                eprintln!("{}", message);
                continue;
            }
        };

        match command {
            ReplCommand::Empty => {}
            ReplCommand::Quit => break,
            ReplCommand::Help => writeln!(out, "{}", HELP)?,
            ReplCommand::Search(query) => {
                let state = session.submit(&query).await;
                render::render_state(&mut out, state)?;
            }
            ReplCommand::Filter(update) => {
                let state = session.update_filters(update).await;
                render::render_state(&mut out, state)?;
                render::render_filters(&mut out, session.filters())?;
            }
            ReplCommand::ShowFilters => render::render_filters(&mut out, session.filters())?,
            ReplCommand::SetPrompt(prompt) => {
                let state = session.set_system_prompt(&prompt).await;
                render::render_state(&mut out, state)?;
            }
            ReplCommand::ShowPrompt => {
                writeln!(out, "System prompt: {:?}", session.system_prompt())?
            }
            ReplCommand::ResetPrompt => {
                let state = session.reset_system_prompt().await;
                render::render_state(&mut out, state)?;
            }
            ReplCommand::Refresh => {
                let state = session.refresh().await;
                render::render_state(&mut out, state)?;
            }
            ReplCommand::Open(fragment) => {
                let state = session.navigate(&fragment).await;
                render::render_state(&mut out, state)?;
            }
            ReplCommand::Suggestion(index) => match session.use_suggestion(index).await {
                Some(state) => render::render_state(&mut out, state)?,
                None => eprintln!("no suggestion {}", index + 1),
            },
            ReplCommand::History => render::render_history(&mut out, session.history())?,
            ReplCommand::ClearHistory => {
                session.clear_history();
                writeln!(out, "Search history cleared.")?;
            }
        }
    }

    Ok(())
}
