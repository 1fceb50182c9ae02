use super::form::{FormField, FormState};
use crate::config::Config;
use crate::db::repository::{SaveOutcome, TransactionRepository};
use crate::db::storage::KeyValueStorage;
use crate::models::transaction::Transaction;
use crate::operations::add::{TransactionDraft, submit_draft};
use crate::operations::aggregate::{Summary, month_summary};
use crate::operations::calendar::{self, MonthGrid, add_months, build_month_grid, first_of_month};
use crate::operations::report::format_amount;
use crate::operations::search::{DailyOrder, TransactionFilter, daily_listing};
use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, TimeZone};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use log::debug;
use ratatui::widgets::TableState;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Loading,
    Calendar,
    Form,
    ConfirmDelete,
    Search,
    MonthPicker,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthPickerState {
    pub year: i32,
    pub month0: u32,
}

pub struct CalendarApp<S, Tz> {
    repository: TransactionRepository<S>,
    tz: Tz,
    pub(super) currency: String,
    daily_order: DailyOrder,

    pub(super) mode: Mode,
    loading_until: Instant,

    pub(super) today: NaiveDate,
    pub(super) clock: String,

    pub(super) current_month: NaiveDate,
    pub(super) selected_date: NaiveDate,

    pub(super) filter: TransactionFilter,
    search_backup: String,
    pub(super) daily_state: TableState,

    pub(super) form: Option<FormState>,
    pub(super) delete_target: Option<Transaction>,
    pub(super) picker: MonthPickerState,

    pub(super) status: Option<String>,
}

impl<S: KeyValueStorage, Tz: TimeZone> CalendarApp<S, Tz> {
    pub fn new(
        repository: TransactionRepository<S>,
        config: &Config,
        tz: Tz,
        now: NaiveDateTime,
        started: Instant,
    ) -> Self {
        let today = now.date();
        let mode = if config.splash.is_zero() {
            Mode::Calendar
        } else {
            Mode::Loading
        };

        Self {
            repository,
            tz,
            currency: config.currency.clone(),
            daily_order: config.daily_order,
            mode,
            loading_until: started + config.splash,
            today,
            clock: now.format("%H:%M:%S").to_string(),
            current_month: first_of_month(today),
            selected_date: today,
            filter: TransactionFilter::default(),
            search_backup: String::new(),
            daily_state: TableState::default().with_selected(Some(0)),
            form: None,
            delete_target: None,
            picker: MonthPickerState {
                year: today.year(),
                month0: today.month0(),
            },
            status: None,
        }
    }

    pub fn show_month(&mut self, month: NaiveDate) {
        self.current_month = first_of_month(month);
        if !same_month(self.selected_date, self.current_month) {
            self.selected_date = self.current_month;
        }
        self.reset_daily_selection();
    }

    /// Advances the header clock and ends the loading screen once its delay has passed.
    pub fn tick(&mut self, now: Instant, local_now: NaiveDateTime) {
        self.clock = local_now.format("%H:%M:%S").to_string();
        self.today = local_now.date();
        if self.mode == Mode::Loading && now >= self.loading_until {
            self.mode = Mode::Calendar;
        }
    }

    pub fn grid(&self) -> MonthGrid {
        build_month_grid(self.repository.list(), self.current_month, self.today, &self.tz)
    }

    pub fn month_summary(&self) -> Summary {
        month_summary(self.repository.list(), self.current_month, &self.tz)
    }

    pub fn daily_transactions(&self) -> Vec<&Transaction> {
        daily_listing(
            self.repository.list(),
            Some(self.selected_date),
            &self.filter,
            self.daily_order,
            &self.tz,
        )
    }

    pub fn highlighted_transaction(&self) -> Option<&Transaction> {
        let index = self.daily_state.selected()?;
        self.daily_transactions().get(index).copied()
    }

    /// Returns `true` when the application should exit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        // Many terminals emit both a Press and a Release event. Only act on Press/Repeat.
        if key.kind == KeyEventKind::Release {
            return false;
        }

        match self.mode {
            Mode::Loading => {
                self.mode = Mode::Calendar;
                false
            }
            Mode::Calendar => self.handle_calendar_key(key),
            Mode::Form => {
                self.handle_form_key(key);
                false
            }
            Mode::ConfirmDelete => {
                self.handle_confirm_key(key);
                false
            }
            Mode::Search => {
                self.handle_search_key(key);
                false
            }
            Mode::MonthPicker => {
                self.handle_picker_key(key);
                false
            }
        }
    }

    fn handle_calendar_key(&mut self, key: KeyEvent) -> bool {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return true;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Left => self.move_selection(-1),
            KeyCode::Right => self.move_selection(1),
            KeyCode::Up => self.move_selection(-7),
            KeyCode::Down => self.move_selection(7),
            KeyCode::Char('[') | KeyCode::PageUp => self.shift_month(-1),
            KeyCode::Char(']') | KeyCode::PageDown => self.shift_month(1),
            KeyCode::Char('t') => self.go_to_today(),
            KeyCode::Char('m') => self.open_month_picker(),
            KeyCode::Char('a') => self.open_add_form(),
            KeyCode::Char('e') | KeyCode::Enter => self.open_edit_form(),
            KeyCode::Char('d') | KeyCode::Delete => self.open_delete_confirm(),
            KeyCode::Char('j') => self.move_daily_highlight(1),
            KeyCode::Char('k') => self.move_daily_highlight(-1),
            KeyCode::Char('/') => self.start_search(),
            KeyCode::Char('f') => {
                self.filter.cycle_type();
                self.reset_daily_selection();
            }
            KeyCode::Char('x') => {
                self.filter.clear();
                self.reset_daily_selection();
            }
            _ => {}
        }
        false
    }

    fn move_selection(&mut self, days: i64) {
        let shifted = if days >= 0 {
            self.selected_date.checked_add_days(Days::new(days.unsigned_abs()))
        } else {
            self.selected_date.checked_sub_days(Days::new(days.unsigned_abs()))
        };
        if let Some(date) = shifted {
            self.select_date(date);
        }
    }

    fn select_date(&mut self, date: NaiveDate) {
        self.selected_date = date;
        if !same_month(date, self.current_month) {
            self.current_month = first_of_month(date);
        }
        self.reset_daily_selection();
    }

    fn shift_month(&mut self, delta: i32) {
        self.current_month = add_months(self.current_month, delta);
        self.selected_date = add_months(self.selected_date, delta);
        self.reset_daily_selection();
    }

    fn go_to_today(&mut self) {
        self.select_date(self.today);
        self.current_month = first_of_month(self.today);
    }

    fn reset_daily_selection(&mut self) {
        let selected = if self.daily_transactions().is_empty() {
            None
        } else {
            Some(0)
        };
        self.daily_state.select(selected);
    }

    fn move_daily_highlight(&mut self, delta: i32) {
        let len = self.daily_transactions().len();
        if len == 0 {
            self.daily_state.select(None);
            return;
        }
        let current = self.daily_state.selected().unwrap_or(0) as i32;
        let next = (current + delta).clamp(0, len as i32 - 1) as usize;
        self.daily_state.select(Some(next));
    }

    fn open_add_form(&mut self) {
        self.form = Some(FormState::new(
            TransactionDraft::for_day(self.selected_date),
            false,
        ));
        self.mode = Mode::Form;
    }

    fn open_edit_form(&mut self) {
        let Some(transaction) = self.highlighted_transaction() else {
            return;
        };
        let draft = TransactionDraft::from_transaction(transaction, &self.tz);
        self.form = Some(FormState::new(draft, true));
        self.mode = Mode::Form;
    }

    fn close_form(&mut self) {
        self.form = None;
        self.mode = Mode::Calendar;
    }

    fn handle_form_key(&mut self, key: KeyEvent) {
        let Some(form) = self.form.as_mut() else {
            self.mode = Mode::Calendar;
            return;
        };

        match key.code {
            KeyCode::Esc => self.close_form(),
            KeyCode::Enter => self.submit_form(),
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.prev_field(),
            KeyCode::Left | KeyCode::Right if form.focus == FormField::Type => form.toggle_type(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Char(ch) => form.input_char(ch),
            _ => {}
        }
    }

    fn submit_form(&mut self) {
        let Some(form) = self.form.as_mut() else {
            return;
        };

        let result = form
            .to_draft()
            .and_then(|draft| submit_draft(&mut self.repository, &draft, &self.tz));

        match result {
            Ok((transaction, outcome)) => {
                debug!("form saved transaction {} ({:?})", transaction.id, outcome);
                self.status = Some(match outcome {
                    SaveOutcome::Added => format!("Added: {}", transaction.description),
                    SaveOutcome::Updated => format!("Updated: {}", transaction.description),
                });
                let day = transaction.day_in(&self.tz);
                self.close_form();
                self.select_date(day);
            }
            Err(e) => form.error = Some(e.to_string()),
        }
    }

    fn open_delete_confirm(&mut self) {
        if let Some(transaction) = self.highlighted_transaction().cloned() {
            self.delete_target = Some(transaction);
            self.mode = Mode::ConfirmDelete;
        }
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                if let Some(target) = self.delete_target.take() {
                    if let Some(removed) = self.repository.remove(&target.id) {
                        self.status = Some(format!(
                            "Deleted: {} - {}",
                            removed.description,
                            format_amount(removed.amount, &self.currency)
                        ));
                    }
                }
                self.mode = Mode::Calendar;
                self.clamp_daily_selection();
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.delete_target = None;
                self.mode = Mode::Calendar;
            }
            _ => {}
        }
    }

    fn clamp_daily_selection(&mut self) {
        let len = self.daily_transactions().len();
        let selected = match (len, self.daily_state.selected()) {
            (0, _) => None,
            (len, Some(i)) => Some(i.min(len - 1)),
            (_, None) => Some(0),
        };
        self.daily_state.select(selected);
    }

    fn start_search(&mut self) {
        self.search_backup = self.filter.text.clone();
        self.mode = Mode::Search;
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => self.mode = Mode::Calendar,
            KeyCode::Esc => {
                self.filter.text = std::mem::take(&mut self.search_backup);
                self.mode = Mode::Calendar;
            }
            KeyCode::Backspace => {
                self.filter.text.pop();
            }
            KeyCode::Char(ch) => self.filter.text.push(ch),
            _ => return,
        }
        self.reset_daily_selection();
    }

    fn open_month_picker(&mut self) {
        self.picker = MonthPickerState {
            year: self.current_month.year(),
            month0: self.current_month.month0(),
        };
        self.mode = Mode::MonthPicker;
    }

    fn handle_picker_key(&mut self, key: KeyEvent) {
        let picker = &mut self.picker;
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => self.mode = Mode::Calendar,
            KeyCode::Left => picker.month0 = (picker.month0 + 11) % 12,
            KeyCode::Right => picker.month0 = (picker.month0 + 1) % 12,
            KeyCode::Up => picker.month0 = (picker.month0 + 9) % 12,
            KeyCode::Down => picker.month0 = (picker.month0 + 3) % 12,
            KeyCode::PageUp | KeyCode::Char('<') => picker.year -= 1,
            KeyCode::PageDown | KeyCode::Char('>') => picker.year += 1,
            KeyCode::Enter => {
                if let Some(month) = NaiveDate::from_ymd_opt(picker.year, picker.month0 + 1, 1) {
                    let delta = (month.year() - self.current_month.year()) * 12
                        + month.month() as i32
                        - self.current_month.month() as i32;
                    self.selected_date = add_months(self.selected_date, delta);
                    self.current_month = month;
                    self.reset_daily_selection();
                }
                self.mode = Mode::Calendar;
            }
            _ => {}
        }
    }

    pub fn month_title(&self) -> String {
        calendar::month_title(self.current_month)
    }

    pub(super) fn daily_order(&self) -> DailyOrder {
        self.daily_order
    }

    #[cfg(test)]
    pub(super) fn repository(&self) -> &TransactionRepository<S> {
        &self.repository
    }

    #[cfg(test)]
    pub(super) fn finish_loading_after(&self) -> std::time::Duration {
        self.loading_until.saturating_duration_since(Instant::now())
    }
}

fn same_month(a: NaiveDate, b: NaiveDate) -> bool {
    a.year() == b.year() && a.month() == b.month()
}

#[cfg(test)]
pub(super) mod tests {
    use super::*;
    use crate::db::repository::TRANSACTIONS_KEY;
    use crate::db::repository::tests::create_test_transaction;
    use crate::db::storage::MemoryStorage;
    use crate::models::transaction::TransactionType;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use std::path::PathBuf;
    use std::time::Duration;

    pub(crate) fn test_config(splash: Duration) -> Config {
        Config {
            db_path: PathBuf::from("unused.db"),
            storage_key: TRANSACTIONS_KEY.to_string(),
            currency: "Rp".to_string(),
            daily_order: DailyOrder::IncomeFirst,
            splash,
            log_file: None,
        }
    }

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 5)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap()
    }

    pub(crate) fn test_app() -> CalendarApp<MemoryStorage, Utc> {
        let mut repo = TransactionRepository::load(MemoryStorage::new(), TRANSACTIONS_KEY);
        repo.add(create_test_transaction("1", TransactionType::Expense, 40000, (2024, 1, 5)))
            .unwrap();
        repo.add(create_test_transaction("2", TransactionType::Income, 100000, (2024, 1, 5)))
            .unwrap();
        repo.add(create_test_transaction("3", TransactionType::Expense, 5000, (2024, 2, 1)))
            .unwrap();

        CalendarApp::new(repo, &test_config(Duration::ZERO), Utc, now(), Instant::now())
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(app: &mut CalendarApp<MemoryStorage, Utc>, text: &str) {
        for ch in text.chars() {
            app.handle_key(key(KeyCode::Char(ch)));
        }
    }

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_initial_state() {
        let app = test_app();

        assert_eq!(app.mode, Mode::Calendar);
        assert_eq!(app.current_month, date(2024, 1, 1));
        assert_eq!(app.selected_date, date(2024, 1, 5));
        assert_eq!(app.clock, "10:30:00");
        assert_eq!(app.month_title(), "January 2024");
    }

    #[test]
    fn test_month_summary_and_daily_listing() {
        let app = test_app();

        let summary = app.month_summary();
        assert_eq!(summary.income, Decimal::new(100000, 0));
        assert_eq!(summary.balance(), Decimal::new(60000, 0));

        let ids: Vec<&str> = app.daily_transactions().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "1"]);
        assert_eq!(app.highlighted_transaction().map(|t| t.id.as_str()), Some("2"));
    }

    #[test]
    fn test_loading_screen_ends_after_delay() {
        let repo = TransactionRepository::load(MemoryStorage::new(), TRANSACTIONS_KEY);
        let started = Instant::now();
        let mut app = CalendarApp::new(
            repo,
            &test_config(Duration::from_millis(2500)),
            Utc,
            now(),
            started,
        );
        assert_eq!(app.mode, Mode::Loading);
        assert!(app.finish_loading_after() <= Duration::from_millis(2500));

        app.tick(started + Duration::from_millis(1000), now());
        assert_eq!(app.mode, Mode::Loading);

        let later = now() + chrono::Duration::seconds(3);
        app.tick(started + Duration::from_millis(2500), later);
        assert_eq!(app.mode, Mode::Calendar);
        assert_eq!(app.clock, "10:30:03");
    }

    #[test]
    fn test_any_key_skips_loading() {
        let repo = TransactionRepository::load(MemoryStorage::new(), TRANSACTIONS_KEY);
        let mut app = CalendarApp::new(
            repo,
            &test_config(Duration::from_secs(60)),
            Utc,
            now(),
            Instant::now(),
        );

        assert!(!app.handle_key(key(KeyCode::Char('q'))));
        assert_eq!(app.mode, Mode::Calendar);
    }

    #[test]
    fn test_release_events_are_ignored() {
        let mut app = test_app();
        let mut release = key(KeyCode::Char('q'));
        release.kind = KeyEventKind::Release;

        assert!(!app.handle_key(release));
        assert!(app.handle_key(key(KeyCode::Char('q'))));
    }

    #[test]
    fn test_arrow_keys_cross_months() {
        let mut app = test_app();

        app.handle_key(key(KeyCode::Up));
        assert_eq!(app.selected_date, date(2023, 12, 29));
        assert_eq!(app.current_month, date(2023, 12, 1));

        app.handle_key(key(KeyCode::Down));
        app.handle_key(key(KeyCode::Right));
        assert_eq!(app.selected_date, date(2024, 1, 6));
        assert_eq!(app.current_month, date(2024, 1, 1));
    }

    #[test]
    fn test_month_navigation_and_today() {
        let mut app = test_app();

        app.handle_key(key(KeyCode::Char(']')));
        assert_eq!(app.current_month, date(2024, 2, 1));
        assert_eq!(app.selected_date, date(2024, 2, 5));
        assert_eq!(app.month_summary().expense, Decimal::new(5000, 0));

        app.handle_key(key(KeyCode::Char('[')));
        app.handle_key(key(KeyCode::Char('[')));
        assert_eq!(app.current_month, date(2023, 12, 1));

        app.handle_key(key(KeyCode::Char('t')));
        assert_eq!(app.current_month, date(2024, 1, 1));
        assert_eq!(app.selected_date, date(2024, 1, 5));
    }

    #[test]
    fn test_show_month_moves_selection_into_month() {
        let mut app = test_app();
        app.show_month(date(2024, 3, 15));

        assert_eq!(app.current_month, date(2024, 3, 1));
        assert_eq!(app.selected_date, date(2024, 3, 1));
    }

    #[test]
    fn test_add_transaction_through_form() {
        let mut app = test_app();
        app.handle_key(key(KeyCode::Right));
        app.handle_key(key(KeyCode::Char('a')));
        assert_eq!(app.mode, Mode::Form);

        app.handle_key(key(KeyCode::Tab));
        type_text(&mut app, "Bensin");
        app.handle_key(key(KeyCode::Tab));
        type_text(&mut app, "30.000");
        app.handle_key(key(KeyCode::Enter));

        assert_eq!(app.mode, Mode::Calendar);
        assert_eq!(app.repository().len(), 4);
        assert_eq!(app.status.as_deref(), Some("Added: Bensin"));

        let daily = app.daily_transactions();
        assert_eq!(daily.len(), 1);
        assert_eq!(daily[0].description, "Bensin");
        assert_eq!(daily[0].transaction_type, TransactionType::Expense);
        assert_eq!(daily[0].day_in(&Utc), date(2024, 1, 6));
    }

    #[test]
    fn test_form_shows_validation_error_for_zero_amount() {
        let mut app = test_app();
        app.handle_key(key(KeyCode::Char('a')));
        app.handle_key(key(KeyCode::Tab));
        type_text(&mut app, "Gratis");
        app.handle_key(key(KeyCode::Tab));
        type_text(&mut app, "0");
        app.handle_key(key(KeyCode::Enter));

        assert_eq!(app.mode, Mode::Form);
        assert_eq!(app.repository().len(), 3);
        let error = app.form.as_ref().and_then(|f| f.error.clone()).unwrap();
        assert!(error.contains("greater than zero"));

        app.handle_key(key(KeyCode::Esc));
        assert_eq!(app.mode, Mode::Calendar);
        assert!(app.form.is_none());
    }

    #[test]
    fn test_edit_highlighted_transaction() {
        let mut app = test_app();
        app.handle_key(key(KeyCode::Char('j')));
        assert_eq!(app.highlighted_transaction().map(|t| t.id.as_str()), Some("1"));

        app.handle_key(key(KeyCode::Char('e')));
        let form = app.form.as_ref().unwrap();
        assert!(form.editing);
        assert_eq!(form.description, "Test 1");

        app.handle_key(key(KeyCode::Tab));
        app.handle_key(key(KeyCode::Tab));
        for _ in 0..5 {
            app.handle_key(key(KeyCode::Backspace));
        }
        type_text(&mut app, "45000");
        app.handle_key(key(KeyCode::Enter));

        assert_eq!(app.repository().len(), 3);
        assert_eq!(
            app.repository().get("1").unwrap().amount,
            Decimal::new(45000, 0)
        );
        assert_eq!(app.status.as_deref(), Some("Updated: Test 1"));
    }

    #[test]
    fn test_delete_with_confirmation() {
        let mut app = test_app();

        app.handle_key(key(KeyCode::Char('d')));
        assert_eq!(app.mode, Mode::ConfirmDelete);
        app.handle_key(key(KeyCode::Char('n')));
        assert_eq!(app.mode, Mode::Calendar);
        assert_eq!(app.repository().len(), 3);

        app.handle_key(key(KeyCode::Char('d')));
        app.handle_key(key(KeyCode::Char('y')));
        assert_eq!(app.repository().len(), 2);
        assert!(app.repository().get("2").is_none());
        assert_eq!(app.status.as_deref(), Some("Deleted: Test 2 - Rp 100.000"));
        assert_eq!(app.highlighted_transaction().map(|t| t.id.as_str()), Some("1"));
    }

    #[test]
    fn test_delete_on_empty_day_does_nothing() {
        let mut app = test_app();
        app.handle_key(key(KeyCode::Right));
        app.handle_key(key(KeyCode::Char('d')));
        assert_eq!(app.mode, Mode::Calendar);
    }

    #[test]
    fn test_search_and_type_filter() {
        let mut app = test_app();

        app.handle_key(key(KeyCode::Char('/')));
        assert_eq!(app.mode, Mode::Search);
        type_text(&mut app, "TEST 1");
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.daily_transactions().len(), 1);

        app.handle_key(key(KeyCode::Char('x')));
        app.handle_key(key(KeyCode::Char('f')));
        let daily = app.daily_transactions();
        assert_eq!(daily.len(), 1);
        assert_eq!(daily[0].id, "2");

        app.handle_key(key(KeyCode::Char('/')));
        type_text(&mut app, "zzz");
        app.handle_key(key(KeyCode::Esc));
        assert_eq!(app.filter.text, "");
    }

    #[test]
    fn test_month_picker() {
        let mut app = test_app();

        app.handle_key(key(KeyCode::Char('m')));
        assert_eq!(app.mode, Mode::MonthPicker);
        app.handle_key(key(KeyCode::Down));
        app.handle_key(key(KeyCode::PageDown));
        app.handle_key(key(KeyCode::Enter));

        assert_eq!(app.mode, Mode::Calendar);
        assert_eq!(app.current_month, date(2025, 4, 1));
        assert_eq!(app.selected_date, date(2025, 4, 5));
    }

    #[test]
    fn test_month_picker_wraps_and_cancels() {
        let mut app = test_app();

        app.handle_key(key(KeyCode::Char('m')));
        app.handle_key(key(KeyCode::Left));
        assert_eq!(app.picker.month0, 11);
        app.handle_key(key(KeyCode::Esc));

        assert_eq!(app.current_month, date(2024, 1, 1));
    }
}
