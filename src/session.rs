use std::io::{BufRead, Write};
use std::str::FromStr;

use anyhow::Context;
use thiserror::Error;

use crate::cache::DatasetCache;
use crate::dashboard::{Dashboard, DashboardParams, LayerStyle};
use crate::models::PersonCategory;
use crate::report;

const HELP: &str = "commands: injured <0-19> | hour <0-23> | category <pedestrians|cyclists|motorists> | raw <on|off> | rows <n> | show | help | quit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    Injured(u32),
    Hour(u32),
    Category(PersonCategory),
    Raw(bool),
    Rows(usize),
    Show,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("empty command")]
    Empty,
    #[error("unknown command '{0}'")]
    UnknownCommand(String),
    #[error("'{0}' needs a value")]
    MissingArgument(&'static str),
    #[error("invalid value '{value}' for '{command}'")]
    InvalidArgument { command: &'static str, value: String },
}

impl FromStr for SessionCommand {
    type Err = SessionError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut parts = line.split_whitespace();
        let name = parts.next().ok_or(SessionError::Empty)?.to_lowercase();
        let arg = parts.next();

        let command = match name.as_str() {
            "injured" => SessionCommand::Injured(parse_arg("injured", arg)?),
            "hour" => SessionCommand::Hour(parse_arg("hour", arg)?),
            "category" => SessionCommand::Category(parse_arg("category", arg)?),
            "rows" => SessionCommand::Rows(parse_arg("rows", arg)?),
            "raw" => match arg.map(str::to_lowercase).as_deref() {
                Some("on") | Some("true") => SessionCommand::Raw(true),
                Some("off") | Some("false") => SessionCommand::Raw(false),
                Some(other) => {
                    return Err(SessionError::InvalidArgument {
                        command: "raw",
                        value: other.to_string(),
                    })
                }
                None => return Err(SessionError::MissingArgument("raw")),
            },
            "show" => SessionCommand::Show,
            "help" | "?" => SessionCommand::Help,
            "quit" | "exit" => SessionCommand::Quit,
            _ => return Err(SessionError::UnknownCommand(name)),
        };

        Ok(command)
    }
}

fn parse_arg<T: FromStr>(command: &'static str, arg: Option<&str>) -> Result<T, SessionError> {
    let value = arg.ok_or(SessionError::MissingArgument(command))?;
    value.parse().map_err(|_| SessionError::InvalidArgument {
        command,
        value: value.to_string(),
    })
}

/// Line-driven dashboard. Every control change rebuilds the dashboard from
/// the cached table for the current row limit.
pub struct Session {
    cache: DatasetCache,
    rows: usize,
    params: DashboardParams,
    style: LayerStyle,
}

impl Session {
    pub fn new(cache: DatasetCache, rows: usize, params: DashboardParams) -> Self {
        Self {
            cache,
            rows,
            params,
            style: LayerStyle::default(),
        }
    }

    pub fn params(&self) -> DashboardParams {
        self.params
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut out: W) -> anyhow::Result<()> {
        writeln!(out, "{HELP}")?;
        self.render_summary(&mut out)?;

        for line in input.lines() {
            let line = line.context("failed to read session input")?;
            if line.trim().is_empty() {
                continue;
            }

            let command = match line.parse::<SessionCommand>() {
                Ok(command) => command,
                Err(err) => {
                    writeln!(out, "error: {err}")?;
                    continue;
                }
            };

            if !self.apply(command, &mut out)? {
                break;
            }
        }

        log::info!(
            "session closed at {} rows with {} cached tables",
            self.rows,
            self.cache.len()
        );
        Ok(())
    }

    /// Applies one command. Returns `false` once the session should end.
    fn apply<W: Write>(&mut self, command: SessionCommand, out: &mut W) -> anyhow::Result<bool> {
        let mut params = self.params;
        match command {
            SessionCommand::Injured(value) => params.min_injured = value,
            SessionCommand::Hour(value) => params.hour = value,
            SessionCommand::Category(value) => params.category = value,
            SessionCommand::Raw(value) => params.show_raw = value,
            SessionCommand::Rows(value) => {
                let previous = self.rows;
                self.rows = value;
                if let Err(err) = self.render_summary(out) {
                    self.rows = previous;
                    writeln!(out, "error: {err:#}")?;
                }
                return Ok(true);
            }
            SessionCommand::Show => {
                let dashboard = self.dashboard(self.params)?;
                write!(out, "{}", report::build_report(&dashboard))?;
                return Ok(true);
            }
            SessionCommand::Help => {
                writeln!(out, "{HELP}")?;
                return Ok(true);
            }
            SessionCommand::Quit => return Ok(false),
        }

        if let Err(err) = params.validate() {
            writeln!(out, "error: {err}")?;
            return Ok(true);
        }

        self.params = params;
        self.render_summary(out)?;
        Ok(true)
    }

    fn dashboard(&mut self, params: DashboardParams) -> anyhow::Result<Dashboard> {
        let raw = self.cache.get(self.rows)?;
        Ok(Dashboard::build(&raw, params, &self.style)?)
    }

    fn render_summary<W: Write>(&mut self, out: &mut W) -> anyhow::Result<()> {
        let dashboard = self.dashboard(self.params)?;
        writeln!(out, "{}", report::build_summary(&dashboard))?;
        Ok(())
    }
}
