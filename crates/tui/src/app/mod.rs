use std::time::Duration;

use chrono::{Local, NaiveDate, Utc};
use crossterm::event::{self, Event, KeyEvent};
use engine::{
    Breakdown, CategoryId, Intent, Money, Summary, Tier, Tracker, TransactionDraft,
    TransactionFilter, TransactionKind, storage::KeyValueStore,
};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::{
    error::{AppError, Result},
    render::{RENDER_DELAY, RenderGuard, RenderScheduler},
    source::DataSource,
    ui::{
        self,
        keymap::{AppAction, map_key},
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Browse,
    Form,
    Filter,
    OpeningBalance,
    ConfirmDelete(i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Kind,
    Amount,
    Category,
    Description,
    Date,
}

impl FormField {
    fn next(self) -> Self {
        match self {
            Self::Kind => Self::Amount,
            Self::Amount => Self::Category,
            Self::Category => Self::Description,
            Self::Description => Self::Date,
            Self::Date => Self::Kind,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FormState {
    pub kind: TransactionKind,
    pub amount: String,
    /// Index into the categories of `kind`.
    pub category: usize,
    pub description: String,
    pub date: String,
    pub focus: FormField,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            kind: TransactionKind::Expense,
            amount: String::new(),
            category: 0,
            description: String::new(),
            date: String::new(),
            focus: FormField::Kind,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterField {
    #[default]
    Category,
    Kind,
}

/// Selector positions of the filter popup; 0 means "all".
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterState {
    pub category: usize,
    pub kind: usize,
    pub focus: FilterField,
}

pub const KIND_OPTIONS: [Option<TransactionKind>; 3] =
    [None, Some(TransactionKind::Income), Some(TransactionKind::Expense)];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct ToastState {
    pub message: String,
    pub level: ToastLevel,
}

/// One table line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub id: i64,
    pub date: NaiveDate,
    pub kind: TransactionKind,
    pub category: String,
    pub description: String,
    pub amount: Money,
}

/// Output of the last render pass.
#[derive(Debug, Clone, Default)]
pub struct Rendered {
    pub summary: Summary,
    pub rows: Vec<Row>,
    pub breakdown: Breakdown,
}

impl Rendered {
    fn from_tracker(tracker: &Tracker) -> Self {
        let view = tracker.view();
        let rows = view
            .visible
            .iter()
            .map(|t| Row {
                id: t.id,
                date: t.occurred_on,
                kind: t.kind,
                category: tracker.label_of(t).to_string(),
                description: t.description.clone(),
                amount: t.amount,
            })
            .collect();
        Self {
            summary: view.summary,
            rows,
            breakdown: view.breakdown,
        }
    }
}

#[derive(Debug)]
pub struct AppState {
    pub tracker: Tracker,
    pub rendered: Rendered,
    pub mode: Mode,
    pub form: FormState,
    pub filter: FilterState,
    pub balance_input: String,
    pub selected: usize,
    pub toast: Option<ToastState>,
    pub users: usize,
    pub base_url: String,
}

impl AppState {
    fn new(base_url: String) -> Self {
        Self {
            tracker: Tracker::default(),
            rendered: Rendered::default(),
            mode: Mode::Browse,
            form: FormState::default(),
            filter: FilterState::default(),
            balance_input: String::new(),
            selected: 0,
            toast: None,
            users: 0,
            base_url,
        }
    }

    /// Categories offered by the form for its current kind.
    pub fn form_categories(&self) -> Vec<(&CategoryId, &str)> {
        self.tracker
            .categories()
            .of_kind(self.form.kind)
            .map(|c| (&c.id, c.name.as_str()))
            .collect()
    }

    /// Label of the filter's category selector.
    pub fn filter_category_label(&self) -> &str {
        match self.filter.category {
            0 => "All",
            n => self
                .tracker
                .categories()
                .as_slice()
                .get(n - 1)
                .map_or("All", |c| c.name.as_str()),
        }
    }

    pub fn filter_kind_label(&self) -> &'static str {
        KIND_OPTIONS[self.filter.kind].map_or("All", TransactionKind::label)
    }

    fn typing(&self) -> bool {
        matches!(self.mode, Mode::Form | Mode::OpeningBalance)
    }

    fn toast(&mut self, level: ToastLevel, message: impl Into<String>) {
        self.toast = Some(ToastState {
            message: message.into(),
            level,
        });
    }
}

pub struct App<S> {
    source: DataSource<S>,
    pub state: AppState,
    scheduler: RenderScheduler,
    renders: mpsc::UnboundedReceiver<()>,
    guard: RenderGuard,
    should_quit: bool,
}

impl<S: KeyValueStore> App<S> {
    pub fn new(source: DataSource<S>, base_url: String) -> Self {
        let (tx, renders) = mpsc::unbounded_channel();
        Self {
            source,
            state: AppState::new(base_url),
            scheduler: RenderScheduler::new(tx, RENDER_DELAY),
            renders,
            guard: RenderGuard::default(),
            should_quit: false,
        }
    }

    /// Loads every collection from the active tier and renders.
    pub async fn load(&mut self) {
        let loaded = self.source.load(&mut self.state.tracker).await;
        self.state.users = loaded.users;
        if loaded.read_only {
            self.state.toast(
                ToastLevel::Error,
                "Saved transactions could not be read. Import a backup before adding new ones.",
            );
        } else if loaded.skipped > 0 {
            self.state.toast(
                ToastLevel::Error,
                format!("Skipped {} saved transaction(s) with invalid data.", loaded.skipped),
            );
        } else if loaded.tier == Tier::Local && self.source.has_remote() {
            self.state
                .toast(ToastLevel::Info, "Remote service unavailable, using local data.");
        }
        self.render_now();
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut terminal = ui::setup_terminal()?;
        let result = self.event_loop(&mut terminal).await;
        ui::restore_terminal(&mut terminal)?;
        result
    }

    async fn event_loop(&mut self, terminal: &mut ui::Terminal) -> Result<()> {
        let tick_rate = Duration::from_millis(50);

        while !self.should_quit {
            self.drain_renders();
            terminal
                .draw(|frame| ui::render(frame, &self.state))
                .map_err(|err| AppError::Terminal(err.to_string()))?;

            if event::poll(tick_rate)? {
                match event::read()? {
                    Event::Key(key) => self.handle_key(key).await,
                    Event::Resize(_, _) => {}
                    _ => {}
                }
            }
        }

        Ok(())
    }

    /// Runs the passes fired by the scheduler since the last call.
    fn drain_renders(&mut self) {
        while self.renders.try_recv().is_ok() {
            self.render_now();
        }
    }

    /// Recomputes the derived figures. Dropped if a pass is already running.
    fn render_now(&mut self) {
        let Some(_pass) = self.guard.try_begin() else {
            debug!("render pass already in flight, dropping");
            return;
        };
        self.state.rendered = Rendered::from_tracker(&self.state.tracker);
        let len = self.state.rendered.rows.len();
        self.state.selected = self.state.selected.min(len.saturating_sub(1));
    }

    pub async fn handle_key(&mut self, key: KeyEvent) {
        let action = map_key(key, self.state.typing());
        if action == AppAction::Quit {
            self.should_quit = true;
            return;
        }
        if action != AppAction::None {
            self.state.toast = None;
        }

        match self.state.mode {
            Mode::Browse => self.handle_browse(action).await,
            Mode::Form => self.handle_form(action).await,
            Mode::Filter => self.handle_filter(action),
            Mode::OpeningBalance => self.handle_opening_balance(action),
            Mode::ConfirmDelete(id) => self.handle_confirm_delete(id, action).await,
        }
    }

    async fn handle_browse(&mut self, action: AppAction) {
        match action {
            AppAction::Up | AppAction::Input('k') => self.select_prev(),
            AppAction::Down | AppAction::Input('j') => self.select_next(),
            AppAction::Input('a') => {
                self.state.form = FormState::default();
                self.state.mode = Mode::Form;
            }
            AppAction::Input('f') => self.state.mode = Mode::Filter,
            AppAction::Input('b') => {
                self.state.balance_input.clear();
                self.state.mode = Mode::OpeningBalance;
            }
            AppAction::Input('d') => {
                if let Some(row) = self.state.rendered.rows.get(self.state.selected) {
                    self.state.mode = Mode::ConfirmDelete(row.id);
                }
            }
            AppAction::Input('r') => self.load().await,
            _ => {}
        }
    }

    async fn handle_form(&mut self, action: AppAction) {
        let form = &mut self.state.form;
        match action {
            AppAction::Cancel => self.state.mode = Mode::Browse,
            AppAction::NextField | AppAction::Down => form.focus = form.focus.next(),
            AppAction::Left | AppAction::Right | AppAction::Input(' ')
                if form.focus == FormField::Kind =>
            {
                form.kind = match form.kind {
                    TransactionKind::Income => TransactionKind::Expense,
                    TransactionKind::Expense => TransactionKind::Income,
                };
                form.category = 0;
            }
            AppAction::Left | AppAction::Right if form.focus == FormField::Category => {
                let count = self.state.form_categories().len();
                let form = &mut self.state.form;
                if count > 0 {
                    form.category = if action == AppAction::Right {
                        (form.category + 1) % count
                    } else {
                        (form.category + count - 1) % count
                    };
                }
            }
            AppAction::Input(ch) => {
                if let Some(field) = form_text_mut(form) {
                    field.push(ch);
                }
            }
            AppAction::Backspace => {
                if let Some(field) = form_text_mut(form) {
                    field.pop();
                }
            }
            AppAction::Submit => self.submit_form().await,
            _ => {}
        }
    }

    async fn submit_form(&mut self) {
        let category = self
            .state
            .form_categories()
            .get(self.state.form.category)
            .map(|(id, _)| id.to_string())
            .unwrap_or_default();
        let form = &self.state.form;
        let draft = TransactionDraft {
            kind: form.kind.as_str().to_string(),
            amount: form.amount.clone(),
            category,
            description: form.description.clone(),
            date: form.date.clone(),
        };

        let today = Local::now().date_naive();
        let now_ms = Utc::now().timestamp_millis();
        match self
            .source
            .add(&mut self.state.tracker, &draft, today, now_ms)
            .await
        {
            Ok(_) => {
                self.state.form = FormState::default();
                self.state.mode = Mode::Browse;
                self.render_now();
                self.state.toast(ToastLevel::Success, "Transaction added.");
            }
            Err(err) => {
                warn!(%err, "transaction rejected");
                self.state.toast(
                    ToastLevel::Error,
                    format!("Failed to add transaction. {}", err.user_message()),
                );
            }
        }
    }

    fn handle_filter(&mut self, action: AppAction) {
        let filter = &mut self.state.filter;
        let categories = self.state.tracker.categories().len() + 1;
        match action {
            AppAction::Cancel | AppAction::Submit => {
                self.state.mode = Mode::Browse;
                return;
            }
            AppAction::NextField | AppAction::Up | AppAction::Down => {
                filter.focus = match filter.focus {
                    FilterField::Category => FilterField::Kind,
                    FilterField::Kind => FilterField::Category,
                };
                return;
            }
            AppAction::Right => match filter.focus {
                FilterField::Category => filter.category = (filter.category + 1) % categories,
                FilterField::Kind => filter.kind = (filter.kind + 1) % KIND_OPTIONS.len(),
            },
            AppAction::Left => match filter.focus {
                FilterField::Category => {
                    filter.category = (filter.category + categories - 1) % categories;
                }
                FilterField::Kind => {
                    filter.kind = (filter.kind + KIND_OPTIONS.len() - 1) % KIND_OPTIONS.len();
                }
            },
            AppAction::Backspace => match filter.focus {
                FilterField::Category => filter.category = 0,
                FilterField::Kind => filter.kind = 0,
            },
            _ => return,
        }
        self.apply_filter();
    }

    /// Sets the filter now; the table follows on the next scheduled pass.
    fn apply_filter(&mut self) {
        let category = match self.state.filter.category {
            0 => None,
            n => self
                .state
                .tracker
                .categories()
                .as_slice()
                .get(n - 1)
                .map(|c| c.id.clone()),
        };
        let filter = TransactionFilter {
            category,
            kind: KIND_OPTIONS[self.state.filter.kind],
        };
        if let Err(err) = self.state.tracker.apply(Intent::SetFilter(filter)) {
            warn!(%err, "cannot apply filter");
            return;
        }
        self.scheduler.schedule();
    }

    fn handle_opening_balance(&mut self, action: AppAction) {
        match action {
            AppAction::Cancel => self.state.mode = Mode::Browse,
            AppAction::Input(ch) => self.state.balance_input.push(ch),
            AppAction::Backspace => {
                self.state.balance_input.pop();
            }
            AppAction::Submit => {
                let input = self.state.balance_input.clone();
                match self
                    .source
                    .set_opening_balance(&mut self.state.tracker, &input)
                {
                    Ok(balance) => {
                        self.state.balance_input.clear();
                        self.state.mode = Mode::Browse;
                        self.render_now();
                        self.state.toast(
                            ToastLevel::Success,
                            format!("Opening balance set: {}", balance.amount()),
                        );
                    }
                    Err(err) => self.state.toast(ToastLevel::Error, err.user_message()),
                }
            }
            _ => {}
        }
    }

    async fn handle_confirm_delete(&mut self, id: i64, action: AppAction) {
        self.state.mode = Mode::Browse;
        if !matches!(action, AppAction::Input('y' | 'Y')) {
            return;
        }

        match self.source.delete(&mut self.state.tracker, id).await {
            Ok(()) => {
                self.render_now();
                self.state.toast(ToastLevel::Success, "Transaction deleted.");
            }
            Err(err) => {
                warn!(%err, id, "delete failed");
                self.state.toast(
                    ToastLevel::Error,
                    format!("Failed to delete transaction. {}", err.user_message()),
                );
            }
        }
    }

    fn select_next(&mut self) {
        let len = self.state.rendered.rows.len();
        if len == 0 {
            return;
        }
        self.state.selected = (self.state.selected + 1).min(len - 1);
    }

    fn select_prev(&mut self) {
        self.state.selected = self.state.selected.saturating_sub(1);
    }
}

fn form_text_mut(form: &mut FormState) -> Option<&mut String> {
    match form.focus {
        FormField::Amount => Some(&mut form.amount),
        FormField::Description => Some(&mut form.description),
        FormField::Date => Some(&mut form.date),
        FormField::Kind | FormField::Category => None,
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyModifiers};
    use engine::storage::{LocalState, MemoryStore};

    use super::*;

    async fn app() -> App<MemoryStore> {
        let source = DataSource::new(None, LocalState::new(MemoryStore::default()));
        let mut app = App::new(source, String::new());
        app.load().await;
        app
    }

    async fn press(app: &mut App<MemoryStore>, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE)).await;
    }

    async fn type_text(app: &mut App<MemoryStore>, text: &str) {
        for ch in text.chars() {
            press(app, KeyCode::Char(ch)).await;
        }
    }

    /// Opens the form and submits one transaction of `kind`, picking the
    /// `category`-th category of that kind.
    async fn add(app: &mut App<MemoryStore>, income: bool, amount: &str, category: usize) {
        press(app, KeyCode::Char('a')).await;
        if income {
            press(app, KeyCode::Right).await;
        }
        press(app, KeyCode::Tab).await;
        type_text(app, amount).await;
        press(app, KeyCode::Tab).await;
        for _ in 0..category {
            press(app, KeyCode::Right).await;
        }
        press(app, KeyCode::Tab).await;
        type_text(app, "quick note").await;
        press(app, KeyCode::Enter).await;
    }

    #[tokio::test]
    async fn form_adds_transaction_and_rerenders() {
        let mut app = app().await;

        add(&mut app, false, "50.000", 0).await;

        assert_eq!(app.state.mode, Mode::Browse);
        assert_eq!(app.state.tracker.transactions().len(), 1);
        assert_eq!(app.state.rendered.rows.len(), 1);
        assert_eq!(app.state.rendered.rows[0].category, "Makanan");
        assert_eq!(app.state.rendered.summary.total_expense, Money::from_major(50_000));
        assert_eq!(
            app.state.toast.as_ref().map(|t| t.level),
            Some(ToastLevel::Success)
        );
    }

    #[tokio::test]
    async fn zero_amount_keeps_form_open() {
        let mut app = app().await;

        add(&mut app, false, "0", 0).await;

        assert_eq!(app.state.mode, Mode::Form);
        assert!(app.state.tracker.transactions().is_empty());
        let toast = app.state.toast.as_ref().unwrap();
        assert_eq!(toast.level, ToastLevel::Error);
        assert!(toast.message.contains("greater than 0"));
    }

    #[tokio::test]
    async fn q_inside_form_is_text() {
        let mut app = app().await;
        press(&mut app, KeyCode::Char('a')).await;
        press(&mut app, KeyCode::Tab).await;
        press(&mut app, KeyCode::Tab).await;
        press(&mut app, KeyCode::Tab).await;
        type_text(&mut app, "qris").await;

        assert!(!app.should_quit);
        assert_eq!(app.state.form.description, "qris");
    }

    #[tokio::test]
    async fn opening_balance_then_summary() {
        let mut app = app().await;

        press(&mut app, KeyCode::Char('b')).await;
        type_text(&mut app, "1000000").await;
        press(&mut app, KeyCode::Enter).await;
        add(&mut app, true, "500000", 0).await;
        add(&mut app, false, "200000", 0).await;

        let summary = app.state.rendered.summary;
        assert_eq!(summary.total_income, Money::from_major(500_000));
        assert_eq!(summary.total_expense, Money::from_major(200_000));
        assert_eq!(summary.balance, Money::from_major(1_300_000));
    }

    #[tokio::test]
    async fn delete_needs_confirmation() {
        let mut app = app().await;
        add(&mut app, false, "10000", 0).await;

        press(&mut app, KeyCode::Char('d')).await;
        press(&mut app, KeyCode::Char('n')).await;
        assert_eq!(app.state.tracker.transactions().len(), 1);

        press(&mut app, KeyCode::Char('d')).await;
        assert!(matches!(app.state.mode, Mode::ConfirmDelete(_)));
        press(&mut app, KeyCode::Char('y')).await;
        assert!(app.state.tracker.transactions().is_empty());
        assert!(app.state.rendered.rows.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn filter_changes_render_once_after_delay() {
        let mut app = app().await;
        add(&mut app, true, "500000", 0).await;
        add(&mut app, false, "200000", 0).await;
        add(&mut app, false, "30000", 1).await;

        press(&mut app, KeyCode::Char('f')).await;
        press(&mut app, KeyCode::Tab).await;
        // All -> Income -> Expense
        press(&mut app, KeyCode::Right).await;
        press(&mut app, KeyCode::Right).await;
        app.drain_renders();
        assert_eq!(app.state.rendered.rows.len(), 3);

        tokio::time::sleep(RENDER_DELAY + Duration::from_millis(10)).await;
        app.drain_renders();
        assert_eq!(app.state.filter_kind_label(), "Expense");
        assert_eq!(app.state.rendered.rows.len(), 2);
        // the summary is never filtered
        assert_eq!(
            app.state.rendered.summary.total_income,
            Money::from_major(500_000)
        );
        assert!(app.renders.try_recv().is_err());
    }
}
