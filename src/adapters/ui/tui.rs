//! Implements InputPort. Inquire-based interactive dashboard.
//!
//! Only consumes store views: every screen asks a store, waits for the view to settle,
//! then renders `data` and `error`.

use crate::adapters::ui::progress;
use crate::domain::{
    CategoryModel, DataStatus, DomainError, Entity, EventModel, NewCategory, NewParticipant,
    ParticipantModel, Period, minutes_after,
};
use crate::ports::InputPort;
use crate::usecases::{AppContext, ChartBuilder, ChartCell, EntityStore};
use async_trait::async_trait;
use chrono::{NaiveDateTime, TimeZone, Utc};
use inquire::error::InquireError;
use inquire::ui::{Color, RenderConfig, StyleSheet, Styled};
use inquire::validator::{ValueRequiredValidator, Validation};
use inquire::{Confirm, CustomType, CustomUserError, Select, Text};
use std::sync::Arc;
use tracing::debug;

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M";
/// One week.
const MAX_EVENT_MINUTES: i64 = 7 * 24 * 60;

const PINK: Color = Color::Rgb {
    r: 0xff,
    g: 0x2e,
    b: 0x97,
};
const CYAN: Color = Color::Rgb {
    r: 0x0f,
    g: 0xf0,
    b: 0xfc,
};

/// Global inquire theme matching the banner.
pub fn apply_theme() {
    let config = RenderConfig::default()
        .with_prompt_prefix(Styled::new("◆").with_fg(PINK))
        .with_highlighted_option_prefix(Styled::new("➤").with_fg(CYAN))
        .with_answer(StyleSheet::new().with_fg(CYAN))
        .with_help_message(StyleSheet::new().with_fg(Color::DarkGrey));
    inquire::set_global_render_config(config);
}

/// `Ok(None)` when the user backs out (Esc or Ctrl-C).
fn answer<T>(res: Result<T, InquireError>) -> Result<Option<T>, DomainError> {
    match res {
        Ok(v) => Ok(Some(v)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(e) => Err(DomainError::Ui(e.to_string())),
    }
}

fn ask_required(message: &str) -> Result<Option<String>, DomainError> {
    let value = answer(
        Text::new(message)
            .with_validator(ValueRequiredValidator::default())
            .prompt(),
    )?;
    Ok(value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty()))
}

fn pick<'a, T>(
    message: &str,
    items: &'a [T],
    label: impl Fn(&T) -> String,
) -> Result<Option<&'a T>, DomainError> {
    if items.is_empty() {
        println!("  (nothing here yet)");
        return Ok(None);
    }
    let labels: Vec<String> = items.iter().map(label).collect();
    let picked = answer(Select::new(message, labels).raw_prompt())?;
    Ok(picked.map(|opt| &items[opt.index]))
}

fn confirm(message: &str) -> Result<bool, DomainError> {
    Ok(answer(Confirm::new(message).with_default(false).prompt())?.unwrap_or(false))
}

fn print_error(e: &DomainError) {
    println!("  ✗ {}", e);
}

/// Print the outcome of an operation. True when it succeeded.
fn report<T>(state: &DataStatus<T>, done: &str) -> bool {
    match state.error() {
        Some(e) => {
            print_error(e);
            false
        }
        None => {
            if !done.is_empty() {
                println!("  ✓ {}", done);
            }
            true
        }
    }
}

fn event_line(e: &EventModel) -> String {
    format!(
        "{}  {} ({} min) [{}] {}",
        e.start.format(DATE_FORMAT),
        e.title,
        e.duration_minutes(),
        e.category.title,
        e.participant.full_name()
    )
}

/// Confirm, delete, report.
async fn delete_one<E: Entity, D: Send + Sync + 'static>(
    store: &EntityStore<E, D>,
    items: &[E],
    noun: &str,
    label: impl Fn(&E) -> String,
) -> Result<(), DomainError> {
    let Some(target) = pick(&format!("{} to delete", noun), items, &label)? else {
        return Ok(());
    };
    if !confirm(&format!("Delete \"{}\"?", label(target)))? {
        return Ok(());
    }
    let done = progress::outcome(store.remove(target.clone()), "Deleting...").await;
    report(&done, &format!("{} deleted", noun.to_lowercase()));
    Ok(())
}

/// TUI adapter. Inquire prompts over the shared stores.
pub struct TuiInputPort {
    ctx: Arc<AppContext>,
}

impl TuiInputPort {
    pub fn new(ctx: Arc<AppContext>) -> Self {
        Self { ctx }
    }

    fn header(&self) {
        let tenant = self.ctx.tenant().snapshot().into_data();
        match tenant {
            Some(t) => println!("\n── workspace: {} ({:?}) ──", t.tag, t.role),
            None => println!("\n── no workspace open ──"),
        }
    }

    async fn workspace_menu(&self) -> Result<bool, DomainError> {
        let options = vec![
            "Open workspace by token",
            "Restore saved workspace",
            "Create new workspace",
            "Quit",
        ];
        let Some(choice) = answer(Select::new("Workspace", options).prompt())? else {
            return Ok(false);
        };
        let result = match choice {
            "Open workspace by token" => self.open_by_token().await,
            "Restore saved workspace" => self.restore_saved().await,
            "Create new workspace" => self.create_workspace().await,
            _ => return Ok(false),
        };
        keep_going(result)
    }

    async fn dashboard_menu(&self) -> Result<bool, DomainError> {
        let options = vec![
            "Categories",
            "Participants",
            "Events",
            "Charts",
            "Switch workspace",
            "Quit",
        ];
        let Some(choice) = answer(Select::new("Dashboard", options).prompt())? else {
            return Ok(false);
        };
        let result = match choice {
            "Categories" => self.categories_menu().await,
            "Participants" => self.participants_menu().await,
            "Events" => self.events_menu().await,
            "Charts" => self.charts_menu().await,
            "Switch workspace" => {
                if confirm("Close this workspace?")? {
                    self.ctx.logout();
                }
                Ok(())
            }
            _ => return Ok(false),
        };
        keep_going(result)
    }

    async fn open_by_token(&self) -> Result<(), DomainError> {
        let Some(token) = ask_required("Workspace token:")? else {
            return Ok(());
        };
        let tenant = progress::spin("Opening workspace...", self.ctx.open_workspace(&token)).await?;
        println!("  ✓ opened {} as {:?}", tenant.tag, tenant.role);
        Ok(())
    }

    async fn restore_saved(&self) -> Result<(), DomainError> {
        let saved = self.ctx.saved_workspaces().await?;
        let Some(entry) = pick("Saved workspace", &saved, |w| w.tag.clone())? else {
            return Ok(());
        };
        let tenant =
            progress::spin("Opening workspace...", self.ctx.restore_workspace(&entry.tag)).await?;
        println!("  ✓ opened {} as {:?}", tenant.tag, tenant.role);
        Ok(())
    }

    async fn create_workspace(&self) -> Result<(), DomainError> {
        let tenant = progress::spin("Creating workspace...", self.ctx.create_workspace()).await?;
        println!("  ✓ created {}", tenant.tag);
        if let Some(token) = tenant.token() {
            println!("  admin token (keep it): {}", token);
        }
        Ok(())
    }

    async fn categories_menu(&self) -> Result<(), DomainError> {
        let store = self.ctx.categories();
        loop {
            let state = progress::settle(store.list(), "Loading categories...").await;
            report(&state, "");
            let options = vec!["List", "Add", "Rename", "Delete", "Back"];
            let Some(action) = answer(Select::new("Categories", options).prompt())? else {
                return Ok(());
            };
            let items = state.data();
            match action {
                "List" => {
                    if items.is_empty() {
                        println!("  (no categories)");
                    }
                    for c in items {
                        println!("  • {}", c.title);
                    }
                }
                "Add" => {
                    let Some(title) = ask_required("Title:")? else {
                        continue;
                    };
                    let done = progress::outcome(store.add(NewCategory { title }), "Saving...").await;
                    report(&done, "category added");
                }
                "Rename" => {
                    let Some(current) = pick("Category to rename", items, |c| c.title.clone())?
                    else {
                        continue;
                    };
                    let Some(title) =
                        answer(Text::new("New title:").with_default(&current.title).prompt())?
                    else {
                        continue;
                    };
                    let renamed = CategoryModel {
                        title,
                        ..current.clone()
                    };
                    let done = progress::outcome(store.update(renamed), "Saving...").await;
                    report(&done, "category renamed");
                }
                "Delete" => delete_one(store, items, "Category", |c| c.title.clone()).await?,
                _ => return Ok(()),
            }
        }
    }

    async fn participants_menu(&self) -> Result<(), DomainError> {
        let store = self.ctx.participants();
        loop {
            let state = progress::settle(store.list(), "Loading participants...").await;
            report(&state, "");
            let options = vec!["List", "Add", "Edit", "Delete", "Back"];
            let Some(action) = answer(Select::new("Participants", options).prompt())? else {
                return Ok(());
            };
            let items = state.data();
            match action {
                "List" => {
                    if items.is_empty() {
                        println!("  (no participants)");
                    }
                    for p in items {
                        println!("  • {}", p.full_name());
                    }
                }
                "Add" => {
                    let Some(firstname) = ask_required("First name:")? else {
                        continue;
                    };
                    let Some(lastname) = ask_required("Last name:")? else {
                        continue;
                    };
                    let image_url = answer(Text::new("Image URL (optional):").prompt())?
                        .unwrap_or_default();
                    let draft = NewParticipant {
                        firstname,
                        lastname,
                        image_url,
                    };
                    let done = progress::outcome(store.add(draft), "Saving...").await;
                    report(&done, "participant added");
                }
                "Edit" => {
                    let Some(current) = pick("Participant to edit", items, |p| p.full_name())?
                    else {
                        continue;
                    };
                    let Some(firstname) = answer(
                        Text::new("First name:")
                            .with_default(&current.firstname)
                            .prompt(),
                    )?
                    else {
                        continue;
                    };
                    let Some(lastname) = answer(
                        Text::new("Last name:")
                            .with_default(&current.lastname)
                            .prompt(),
                    )?
                    else {
                        continue;
                    };
                    let edited = ParticipantModel {
                        firstname,
                        lastname,
                        ..current.clone()
                    };
                    let done = progress::outcome(store.update(edited), "Saving...").await;
                    report(&done, "participant updated");
                }
                "Delete" => delete_one(store, items, "Participant", |p| p.full_name()).await?,
                _ => return Ok(()),
            }
        }
    }

    async fn events_menu(&self) -> Result<(), DomainError> {
        let store = self.ctx.events();
        loop {
            let state = progress::settle(store.list(), "Loading events...").await;
            report(&state, "");
            let options = vec!["List", "Add", "Rename", "Delete", "Back"];
            let Some(action) = answer(Select::new("Events", options).prompt())? else {
                return Ok(());
            };
            let items = state.data();
            match action {
                "List" => {
                    if items.is_empty() {
                        println!("  (no events)");
                    }
                    for e in items {
                        println!("  • {}", event_line(e));
                    }
                }
                "Add" => self.add_event().await?,
                "Rename" => {
                    let Some(current) = pick("Event to rename", items, event_line)? else {
                        continue;
                    };
                    let Some(title) =
                        answer(Text::new("New title:").with_default(&current.title).prompt())?
                    else {
                        continue;
                    };
                    let renamed = EventModel {
                        title,
                        ..current.clone()
                    };
                    let done = progress::outcome(store.update(renamed), "Saving...").await;
                    report(&done, "event renamed");
                }
                "Delete" => delete_one(store, items, "Event", event_line).await?,
                _ => return Ok(()),
            }
        }
    }

    async fn add_event(&self) -> Result<(), DomainError> {
        let categories =
            progress::settle(self.ctx.categories().list(), "Loading categories...").await;
        let participants =
            progress::settle(self.ctx.participants().list(), "Loading participants...").await;
        if !report(&categories, "") || !report(&participants, "") {
            return Ok(());
        }

        let Some(category) = pick("Category", categories.data(), |c| c.title.clone())? else {
            return Ok(());
        };
        let Some(participant) = pick("Participant", participants.data(), |p| p.full_name())?
        else {
            return Ok(());
        };
        let Some(title) = ask_required("Title:")? else {
            return Ok(());
        };

        let now = Utc::now().format(DATE_FORMAT).to_string();
        let Some(start) = answer(
            Text::new("Start (YYYY-MM-DD HH:MM, UTC):")
                .with_default(&now)
                .with_validator(|s: &str| -> Result<Validation, CustomUserError> {
                    Ok(match NaiveDateTime::parse_from_str(s.trim(), DATE_FORMAT) {
                        Ok(_) => Validation::Valid,
                        Err(_) => Validation::Invalid("expected YYYY-MM-DD HH:MM".into()),
                    })
                })
                .prompt(),
        )?
        else {
            return Ok(());
        };
        let start = NaiveDateTime::parse_from_str(start.trim(), DATE_FORMAT)
            .map(|naive| Utc.from_utc_datetime(&naive))
            .map_err(|e| DomainError::InvalidInput(e.to_string()))?;

        let Some(minutes) = answer(
            CustomType::<i64>::new("Duration (minutes):")
                .with_default(60)
                .with_validator(|m: &i64| -> Result<Validation, CustomUserError> {
                    Ok(if (1..=MAX_EVENT_MINUTES).contains(m) {
                        Validation::Valid
                    } else {
                        Validation::Invalid(
                            format!("between 1 and {} minutes", MAX_EVENT_MINUTES).into(),
                        )
                    })
                })
                .prompt(),
        )?
        else {
            return Ok(());
        };

        let draft = EventModel::draft(
            title,
            start,
            minutes_after(start, minutes)?,
            category.clone(),
            participant.clone(),
        )?;
        debug!(title = %draft.title, minutes, "submitting event draft");
        let done = progress::outcome(self.ctx.events().add(draft), "Saving...").await;
        report(&done, "event added");
        Ok(())
    }

    async fn charts_menu(&self) -> Result<(), DomainError> {
        let kinds: Vec<_> = ChartBuilder::available().collect();
        let Some(&(family, subtype)) = pick("Chart", &kinds, |(f, s)| {
            format!("{} / {}", f.as_str(), s.as_str())
        })?
        else {
            return Ok(());
        };
        let builder = ChartBuilder::resolve(family, subtype)?;

        let now = Utc::now();
        let periods = vec![Some(Period::this_week(now)), Some(Period::today(now)), None];
        let Some(period) = pick("Period", &periods, |p| {
            p.as_ref()
                .map(|p| p.name.clone())
                .unwrap_or_else(|| "All time".to_string())
        })?
        else {
            return Ok(());
        };

        let state = progress::settle(self.ctx.events().list(), "Loading events...").await;
        if !report(&state, "") {
            return Ok(());
        }
        let events: Vec<EventModel> = state
            .data()
            .iter()
            .filter(|e| period.as_ref().is_none_or(|p| p.duration.contains(e.start)))
            .cloned()
            .collect();

        let params = builder.generate_params(period.as_ref(), &events);
        let data = builder.build_data(&params.data_params);
        println!(
            "\n  {} · {}",
            params.option_params.title, params.option_params.subtitle
        );
        print_table(&data);
        Ok(())
    }
}

/// Header row, then `[label, minutes]` rows; the share column is derived here.
fn print_table(data: &[Vec<ChartCell>]) {
    let Some((header, rows)) = data.split_first() else {
        println!("  (no events in this period)");
        return;
    };
    let minutes = |row: &Vec<ChartCell>| match row.get(1) {
        Some(ChartCell::Number(n)) => *n,
        _ => 0,
    };
    let total: i64 = rows.iter().map(minutes).sum();
    let width = rows
        .iter()
        .filter_map(|r| r.first())
        .map(|c| c.to_string().len())
        .max()
        .unwrap_or(4)
        .max(4);

    let head: Vec<String> = header.iter().map(ToString::to_string).collect();
    println!(
        "  {:<width$}  {:>8}  {:>10}",
        head.first().map(String::as_str).unwrap_or(""),
        head.get(1).map(String::as_str).unwrap_or(""),
        head.get(2).map(String::as_str).unwrap_or(""),
    );
    for row in rows {
        let label = row.first().map(ToString::to_string).unwrap_or_default();
        let value = minutes(row);
        let share = if total > 0 {
            value as f64 * 100.0 / total as f64
        } else {
            0.0
        };
        println!("  {:<width$}  {:>8}  {:>9.1}%", label, value, share);
    }
}

/// Store and backend failures are shown and the loop continues; prompt failures end it.
fn keep_going(result: Result<(), DomainError>) -> Result<bool, DomainError> {
    match result {
        Ok(()) => Ok(true),
        Err(e @ DomainError::Ui(_)) => Err(e),
        Err(e) => {
            print_error(&e);
            Ok(true)
        }
    }
}

#[async_trait]
impl InputPort for TuiInputPort {
    async fn run(&self) -> Result<(), DomainError> {
        loop {
            self.header();
            let keep = if self.ctx.tokens().snapshot().is_some() {
                self.dashboard_menu().await?
            } else {
                self.workspace_menu().await?
            };
            if !keep {
                println!("bye");
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_is_not_an_error() {
        let res: Result<Option<u8>, _> = answer(Err(InquireError::OperationCanceled));
        assert_eq!(res, Ok(None));
        let res: Result<Option<u8>, _> = answer(Err(InquireError::NotTTY));
        assert!(matches!(res, Err(DomainError::Ui(_))));
    }

    #[test]
    fn test_backend_errors_keep_loop_running() {
        assert_eq!(keep_going(Err(DomainError::Status { code: 500 })), Ok(true));
        assert!(keep_going(Err(DomainError::Ui("tty gone".into()))).is_err());
    }
}
