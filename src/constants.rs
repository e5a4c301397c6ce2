pub mod license {

    /// Stored in `licenses.expires_at` for permanent licenses.
    pub const LIFETIME_SENTINEL: &str = "LIFETIME";

    pub const TRIAL_DAYS: i64 = 1;

    pub const WEEK_DAYS: i64 = 7;

    pub const MONTH_DAYS: i64 = 30;

    pub const YEAR_DAYS: i64 = 365;
}

pub mod budget {

    pub const NEAR_LIMIT_PERCENT: f64 = 80.0;

    pub const OVER_BUDGET_PERCENT: f64 = 100.0;
}

pub mod bills {

    pub const DUE_SOON_DAYS: i64 = 7;

    pub const UPCOMING_WINDOW_DAYS: i64 = 30;

    pub const UPCOMING_LIMIT: usize = 5;
}

pub mod reports {

    pub const TREND_MONTHS: u32 = 12;

    pub const COMPARISON_MONTHS: u32 = 6;

    pub const RECENT_TRANSACTIONS: usize = 10;
}

pub mod intervals {

    pub const SYNC_MINUTES: u32 = 5;

    pub const REMINDER_POLL_SECONDS: u64 = 60;

    pub const REMINDER_WINDOW_MINUTES: i64 = 15;

    pub const REMINDER_COOLDOWN_MINUTES: i64 = 2;
}

pub mod defaults {
    use crate::domain::TransactionKind;

    pub const CURRENCY: &str = "USD";

    pub const LOCALE: &str = "en";

    /// Categories seeded for every new account: (name, kind, icon tag).
    pub const CATEGORIES: &[(&str, TransactionKind, &str)] = &[
        ("Salary", TransactionKind::Income, "briefcase"),
        ("Freelance", TransactionKind::Income, "laptop"),
        ("Investment", TransactionKind::Income, "graph-up"),
        ("Internet", TransactionKind::Expense, "wifi"),
        ("Groceries", TransactionKind::Expense, "cart"),
        ("Transport", TransactionKind::Expense, "car"),
        ("Utilities", TransactionKind::Expense, "lightning"),
        ("Entertainment", TransactionKind::Expense, "film"),
        ("Healthcare", TransactionKind::Expense, "heart"),
        ("Education", TransactionKind::Expense, "book"),
        ("Shopping", TransactionKind::Expense, "bag"),
        ("Rent", TransactionKind::Expense, "house"),
        ("Other", TransactionKind::Expense, "three-dots"),
    ];
}
