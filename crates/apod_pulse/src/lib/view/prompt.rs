//! Terminal front end for the view surface.
//!
//! A session cycles through three states: selection (date and data source),
//! request issued, and result or error shown. End of input at any prompt ends
//! the session cleanly.

use std::io::{self, BufRead, Write};

use apod_datastore::{DataStore, DATE_FORMAT};
use chrono::NaiveDate;

use crate::view::{ApodView, Backend, ViewError, ViewSurface};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewRequest {
    pub date: NaiveDate,
    pub backend: Backend,
}

pub struct Prompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Prompt { input, output }
    }

    pub fn banner(&mut self, num_days: usize) -> io::Result<()> {
        writeln!(self.output, "NASA DATA")?;
        writeln!(
            self.output,
            "This page will give you the NASA APOD Data for past {num_days} days"
        )?;
        writeln!(self.output)
    }

    /// Selection state: returns `None` when the user declines or input ends
    pub fn select(
        &mut self,
        dates: &[NaiveDate],
        default_backend: Backend,
    ) -> io::Result<Option<ViewRequest>> {
        let Some(date) = self.select_date(dates)? else {
            return Ok(None);
        };
        let Some(backend) = self.select_backend(default_backend)? else {
            return Ok(None);
        };

        if !self.confirm("Retrieve data?", true)? {
            return Ok(None);
        }

        Ok(Some(ViewRequest { date, backend }))
    }

    pub fn show(&mut self, result: &Result<ApodView, ViewError>) -> io::Result<()> {
        writeln!(self.output)?;
        match result {
            Ok(view) => write!(self.output, "{view}")?,
            Err(e) => writeln!(self.output, "{e}")?,
        }
        writeln!(self.output)
    }

    fn select_date(&mut self, dates: &[NaiveDate]) -> io::Result<Option<NaiveDate>> {
        if dates.is_empty() {
            writeln!(self.output, "No dates available from the database.")?;
        } else {
            writeln!(self.output, "Select a date:")?;
            for (i, date) in dates.iter().enumerate() {
                writeln!(self.output, "  {}) {}", i + 1, date.format(DATE_FORMAT))?;
            }
        }

        loop {
            if dates.is_empty() {
                write!(self.output, "Enter a date (YYYY-MM-DD): ")?;
            } else {
                write!(
                    self.output,
                    "Date [1-{}] or YYYY-MM-DD (default 1): ",
                    dates.len()
                )?;
            }

            let Some(answer) = self.read_answer()? else {
                return Ok(None);
            };

            if answer.is_empty() {
                if let Some(first) = dates.first() {
                    return Ok(Some(*first));
                }
                continue;
            }

            if let Ok(n) = answer.parse::<usize>() {
                match n.checked_sub(1).and_then(|i| dates.get(i)) {
                    Some(date) => return Ok(Some(*date)),
                    None => {
                        writeln!(self.output, "No date numbered {n}.")?;
                        continue;
                    }
                }
            }

            match NaiveDate::parse_from_str(&answer, DATE_FORMAT) {
                Ok(date) => return Ok(Some(date)),
                Err(_) => writeln!(self.output, "Not a date: {answer}")?,
            }
        }
    }

    fn select_backend(&mut self, default_backend: Backend) -> io::Result<Option<Backend>> {
        loop {
            write!(
                self.output,
                "Select data source (database/json, default {default_backend}): "
            )?;

            let Some(answer) = self.read_answer()? else {
                return Ok(None);
            };
            if answer.is_empty() {
                return Ok(Some(default_backend));
            }

            match answer.parse::<Backend>() {
                Ok(backend) => return Ok(Some(backend)),
                Err(e) => writeln!(self.output, "{e}")?,
            }
        }
    }

    pub fn confirm(&mut self, question: &str, default: bool) -> io::Result<bool> {
        let hint = if default { "[Y/n]" } else { "[y/N]" };

        loop {
            write!(self.output, "{question} {hint} ")?;

            let Some(answer) = self.read_answer()? else {
                return Ok(false);
            };

            match answer.to_ascii_lowercase().as_str() {
                "" => return Ok(default),
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => writeln!(self.output, "Please answer y or n.")?,
            }
        }
    }

    /// Trimmed line of input, `None` at end of input
    fn read_answer(&mut self) -> io::Result<Option<String>> {
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }

        Ok(Some(line.trim().to_string()))
    }
}

/// Runs selection and lookup until the user stops; returns how many
/// records were shown.
pub async fn run_session<D, R, W>(
    surface: &ViewSurface<D>,
    prompt: &mut Prompt<R, W>,
    num_days: usize,
) -> io::Result<usize>
where
    D: DataStore + Send + Sync + 'static,
    R: BufRead,
    W: Write,
{
    let dates = surface.available_dates().await;
    let default_backend = if surface.has_store() {
        Backend::Database
    } else {
        Backend::Json
    };

    prompt.banner(num_days)?;

    let mut shown = 0;
    while let Some(request) = prompt.select(&dates, default_backend)? {
        tracing::info!(date = %request.date, backend = %request.backend, "Retrieving record");

        let result = surface.lookup(request.date, request.backend).await;
        if result.is_ok() {
            shown += 1;
        }
        prompt.show(&result)?;

        if !prompt.confirm("View another date?", false)? {
            break;
        }
    }

    Ok(shown)
}
