use chrono::NaiveDate;
use std::collections::HashMap;

use crate::clock;
use crate::config::PaymentConfig;
use crate::db::Database;
use crate::error::SaccoResult;
use crate::models::{Actor, Loan, LoanDecision, LoanStatus, RecordFilter, Role};
use crate::pages::{
    self, AdminDashboardPage, AdminSavingsPage, AdminWelfarePage, ApplyLoanPage, DashboardPage,
    SavingsPage, TargetHistoryPage, UserLoansPage, WelfarePage,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Screen {
    Login,
    Dashboard,
    Savings,
    Targets,
    Loans,
    Welfare,
    LoanReview,
    SavingsOverview,
    WelfareFund,
}

impl Screen {
    /// The tabs a role can reach, in tab-bar order.
    pub(crate) fn tabs(role: Option<Role>) -> &'static [Screen] {
        match role {
            None => &[Self::Login],
            Some(Role::Member) => &[
                Self::Dashboard,
                Self::Savings,
                Self::Targets,
                Self::Loans,
                Self::Welfare,
            ],
            Some(Role::Staff) => &[Self::LoanReview, Self::SavingsOverview, Self::WelfareFund],
        }
    }
}

impl std::fmt::Display for Screen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Login => write!(f, "Sign in"),
            Self::Dashboard => write!(f, "Dashboard"),
            Self::Savings => write!(f, "Savings"),
            Self::Targets => write!(f, "Targets"),
            Self::Loans => write!(f, "Loans"),
            Self::Welfare => write!(f, "Welfare"),
            Self::LoanReview => write!(f, "Loan Review"),
            Self::SavingsOverview => write!(f, "Savings Overview"),
            Self::WelfareFund => write!(f, "Welfare Fund"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InputMode {
    Normal,
    Command,
    Confirm,
}

impl std::fmt::Display for InputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normal => write!(f, "NORMAL"),
            Self::Command => write!(f, "COMMAND"),
            Self::Confirm => write!(f, "CONFIRM"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum LoginField {
    #[default]
    Username,
    Password,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct LoginForm {
    pub(crate) username: String,
    pub(crate) password: String,
    pub(crate) field: LoginField,
    /// Create a member account instead of signing in.
    pub(crate) registering: bool,
}

impl LoginForm {
    pub(crate) fn active_input(&mut self) -> &mut String {
        match self.field {
            LoginField::Username => &mut self.username,
            LoginField::Password => &mut self.password,
        }
    }

    pub(crate) fn toggle_field(&mut self) {
        self.field = match self.field {
            LoginField::Username => LoginField::Password,
            LoginField::Password => LoginField::Username,
        };
    }
}

/// Pending action that requires user confirmation.
#[derive(Debug, Clone)]
pub(crate) enum PendingAction {
    DecideLoan { id: i64, decision: LoanDecision },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct ListCursor {
    pub(crate) index: usize,
    pub(crate) scroll: usize,
}

pub(crate) struct App {
    pub(crate) running: bool,
    pub(crate) screen: Screen,
    pub(crate) input_mode: InputMode,
    pub(crate) command_input: String,
    pub(crate) status_message: String,
    pub(crate) show_help: bool,
    pub(crate) show_nav: bool,
    pub(crate) nav_index: usize,
    pub(crate) payment: PaymentConfig,

    pub(crate) actor: Option<Actor>,
    pub(crate) login: LoginForm,
    pub(crate) today: NaiveDate,

    // Member pages
    pub(crate) dashboard: Option<DashboardPage>,
    pub(crate) apply: Option<ApplyLoanPage>,
    pub(crate) savings: Option<SavingsPage>,
    pub(crate) targets: Option<TargetHistoryPage>,
    pub(crate) loans: Option<UserLoansPage>,
    pub(crate) welfare: Option<WelfarePage>,

    // Staff pages
    pub(crate) loan_review: Option<AdminDashboardPage>,
    pub(crate) savings_overview: Option<AdminSavingsPage>,
    pub(crate) welfare_fund: Option<AdminWelfarePage>,

    // Filters
    pub(crate) loan_filter: Option<LoanStatus>,
    pub(crate) record_filter: RecordFilter,

    pub(crate) cursors: HashMap<Screen, ListCursor>,

    // Confirmation
    pub(crate) pending_action: Option<PendingAction>,
    pub(crate) confirm_message: String,

    // Layout (updated each render frame)
    pub(crate) visible_rows: usize,
}

impl App {
    pub(crate) fn new(payment: PaymentConfig) -> Self {
        Self {
            running: true,
            screen: Screen::Login,
            input_mode: InputMode::Normal,
            command_input: String::new(),
            status_message: String::new(),
            show_help: false,
            show_nav: false,
            nav_index: 0,
            payment,

            actor: None,
            login: LoginForm::default(),
            today: clock::now().date(),

            dashboard: None,
            apply: None,
            savings: None,
            targets: None,
            loans: None,
            welfare: None,

            loan_review: None,
            savings_overview: None,
            welfare_fund: None,

            loan_filter: pages::DEFAULT_LOAN_FILTER,
            record_filter: RecordFilter::default(),

            cursors: HashMap::new(),

            pending_action: None,
            confirm_message: String::new(),

            visible_rows: 20,
        }
    }

    pub(crate) fn tabs(&self) -> &'static [Screen] {
        Screen::tabs(self.actor.as_ref().map(|a| a.role))
    }

    pub(crate) fn is_staff(&self) -> bool {
        self.actor.as_ref().is_some_and(Actor::is_staff)
    }

    pub(crate) fn sign_in(&mut self, actor: Actor, db: &Database) -> SaccoResult<()> {
        let greeting = format!("Signed in as {} ({})", actor.username, actor.role);
        self.actor = Some(actor);
        self.login = LoginForm::default();
        self.loan_filter = pages::DEFAULT_LOAN_FILTER;
        self.record_filter = RecordFilter::default();
        self.cursors.clear();
        self.screen = self.tabs()[0];
        self.refresh_all(db)?;
        self.set_status(greeting);
        Ok(())
    }

    pub(crate) fn sign_out(&mut self) {
        if let Some(actor) = self.actor.take() {
            log::info!("'{}' signed out", actor.username);
        }
        self.dashboard = None;
        self.apply = None;
        self.savings = None;
        self.targets = None;
        self.loans = None;
        self.welfare = None;
        self.loan_review = None;
        self.savings_overview = None;
        self.welfare_fund = None;
        self.pending_action = None;
        self.screen = Screen::Login;
        self.input_mode = InputMode::Normal;
        self.set_status("Signed out");
    }

    /// Reload the payload behind `screen`.
    pub(crate) fn refresh_screen(&mut self, db: &Database, screen: Screen) -> SaccoResult<()> {
        let Some(actor) = self.actor.clone() else {
            return Ok(());
        };
        self.today = clock::now().date();
        let today = self.today;

        match screen {
            Screen::Login => {}
            Screen::Dashboard => {
                self.dashboard = Some(pages::dashboard(db, &actor, today)?);
                self.apply = Some(pages::apply_loan(db, &actor)?);
            }
            Screen::Savings => self.savings = Some(pages::savings(db, &actor)?),
            Screen::Targets => self.targets = Some(pages::target_history(db, &actor, today)?),
            Screen::Loans => {
                self.loans = Some(pages::user_loans(db, &actor, self.loan_filter)?);
                self.apply = Some(pages::apply_loan(db, &actor)?);
            }
            Screen::Welfare => self.welfare = Some(pages::welfare(db, &actor, today)?),
            Screen::LoanReview => {
                self.loan_review = Some(pages::admin_dashboard(db, &actor, self.loan_filter)?)
            }
            Screen::SavingsOverview => {
                self.savings_overview = Some(pages::admin_savings(
                    db,
                    &actor,
                    &self.record_filter,
                    today,
                )?)
            }
            Screen::WelfareFund => {
                self.welfare_fund = Some(pages::admin_welfare(db, &actor, &self.record_filter)?)
            }
        }
        self.clamp_cursor(screen);
        Ok(())
    }

    pub(crate) fn refresh(&mut self, db: &Database) -> SaccoResult<()> {
        self.refresh_screen(db, self.screen)
    }

    pub(crate) fn refresh_all(&mut self, db: &Database) -> SaccoResult<()> {
        for &screen in self.tabs() {
            self.refresh_screen(db, screen)?;
        }
        Ok(())
    }

    /// Number of rows in the list shown on `screen`.
    pub(crate) fn list_len(&self, screen: Screen) -> usize {
        match screen {
            Screen::Login | Screen::Dashboard => 0,
            Screen::Savings => self.savings.as_ref().map_or(0, |p| p.history.len()),
            Screen::Targets => self.targets.as_ref().map_or(0, |p| p.targets.len()),
            Screen::Loans => self.loans.as_ref().map_or(0, |p| p.loans.len()),
            Screen::Welfare => self
                .welfare
                .as_ref()
                .map_or(0, |p| p.summary.contributions.len()),
            Screen::LoanReview => self.loan_review.as_ref().map_or(0, |p| p.loans.len()),
            Screen::SavingsOverview => self
                .savings_overview
                .as_ref()
                .map_or(0, |p| p.overview.records.len()),
            Screen::WelfareFund => self
                .welfare_fund
                .as_ref()
                .map_or(0, |p| p.summary.contributions.len()),
        }
    }

    pub(crate) fn cursor(&self, screen: Screen) -> ListCursor {
        self.cursors.get(&screen).copied().unwrap_or_default()
    }

    pub(crate) fn cursor_mut(&mut self, screen: Screen) -> &mut ListCursor {
        self.cursors.entry(screen).or_default()
    }

    fn clamp_cursor(&mut self, screen: Screen) {
        let len = self.list_len(screen);
        let cursor = self.cursor_mut(screen);
        if cursor.index >= len {
            cursor.index = len.saturating_sub(1);
        }
        if cursor.scroll > cursor.index {
            cursor.scroll = cursor.index;
        }
    }

    /// The loan under the cursor on the review screen.
    pub(crate) fn selected_review_loan(&self) -> Option<&Loan> {
        let index = self.cursor(Screen::LoanReview).index;
        self.loan_review.as_ref()?.loans.get(index)
    }

    /// Rows that fit in the list area of the current screen.
    pub(crate) fn page_size(&self) -> usize {
        self.visible_rows.saturating_sub(3).max(1)
    }

    pub(crate) fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = msg.into();
    }
}

#[cfg(test)]
#[path = "app_tests.rs"]
mod tests;
