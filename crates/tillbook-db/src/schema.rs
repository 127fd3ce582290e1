//! Embedded schema, applied statement by statement on startup

pub(crate) const STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id            BLOB PRIMARY KEY NOT NULL,
        role          TEXT NOT NULL CHECK (role IN ('business', 'employee')),
        business_id   BLOB NOT NULL,
        name          TEXT NOT NULL,
        username      TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        created_at    TEXT NOT NULL,
        updated_at    TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_users_business ON users (business_id, role)",
    r#"
    CREATE TABLE IF NOT EXISTS stores (
        id          BLOB PRIMARY KEY NOT NULL,
        business_id BLOB NOT NULL,
        name        TEXT NOT NULL,
        created_at  TEXT NOT NULL,
        updated_at  TEXT NOT NULL,
        UNIQUE (business_id, name)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS income_entries (
        id                       BLOB PRIMARY KEY NOT NULL,
        user_id                  BLOB NOT NULL,
        role                     TEXT NOT NULL,
        business_id              BLOB NOT NULL,
        store_id                 BLOB NOT NULL REFERENCES stores (id),
        date                     TEXT NOT NULL,
        cash_income              TEXT NOT NULL,
        pos_income               TEXT NOT NULL,
        lottery_ticket_income    TEXT NOT NULL,
        lottery_scratch_income   TEXT NOT NULL,
        lottery_numerical_income TEXT NOT NULL,
        created_at               TEXT NOT NULL,
        updated_at               TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_income_business_date ON income_entries (business_id, date)",
    "CREATE INDEX IF NOT EXISTS idx_income_user_date ON income_entries (user_id, date)",
    "CREATE INDEX IF NOT EXISTS idx_income_store ON income_entries (store_id)",
    r#"
    CREATE TABLE IF NOT EXISTS expense_entries (
        id           BLOB PRIMARY KEY NOT NULL,
        user_id      BLOB NOT NULL,
        role         TEXT NOT NULL,
        business_id  BLOB NOT NULL,
        store_id     BLOB NOT NULL REFERENCES stores (id),
        date         TEXT NOT NULL,
        description  TEXT NOT NULL,
        amount       TEXT NOT NULL,
        expense_type TEXT NOT NULL CHECK (expense_type IN ('expense', 'payment')),
        created_at   TEXT NOT NULL,
        updated_at   TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_expense_business_date ON expense_entries (business_id, date)",
    "CREATE INDEX IF NOT EXISTS idx_expense_user_date ON expense_entries (user_id, date)",
    "CREATE INDEX IF NOT EXISTS idx_expense_store ON expense_entries (store_id)",
];
