//! SQL query constants
//!
//! Forms and responses are stored as JSONB documents next to the few columns
//! the queries filter or sort on.

/// Schema bootstrap, executed statement by statement at startup
pub const CREATE_SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id UUID PRIMARY KEY,
        email VARCHAR(255) UNIQUE NOT NULL,
        password_hash VARCHAR(255) NOT NULL,
        name VARCHAR(255) NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS forms (
        id UUID PRIMARY KEY,
        user_id UUID NOT NULL,
        response_count BIGINT NOT NULL DEFAULT 0,
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        document JSONB NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS responses (
        id UUID PRIMARY KEY,
        form_id UUID NOT NULL,
        ip_address TEXT,
        submitter_email TEXT,
        submitted_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        document JSONB NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_forms_user_id ON forms(user_id, updated_at DESC)",
    "CREATE INDEX IF NOT EXISTS idx_responses_form_id ON responses(form_id, submitted_at DESC)",
];

// ============================================
// Forms
// ============================================

pub const INSERT_FORM: &str = r#"
    INSERT INTO forms (id, user_id, response_count, updated_at, document)
    VALUES ($1, $2, $3, $4, $5)
"#;

pub const SELECT_FORM: &str = r#"
    SELECT document, response_count FROM forms WHERE id = $1
"#;

pub const SELECT_FORMS_BY_OWNER: &str = r#"
    SELECT document, response_count
    FROM forms
    WHERE user_id = $1
    ORDER BY updated_at DESC
"#;

/// Leaves `response_count` alone; only response inserts move it
pub const UPDATE_FORM: &str = r#"
    UPDATE forms SET updated_at = $2, document = $3 WHERE id = $1
"#;

pub const DELETE_FORM: &str = "DELETE FROM forms WHERE id = $1";

pub const INCREMENT_RESPONSE_COUNT: &str =
    "UPDATE forms SET response_count = response_count + 1 WHERE id = $1";

// ============================================
// Responses
// ============================================

pub const INSERT_RESPONSE: &str = r#"
    INSERT INTO responses (id, form_id, ip_address, submitter_email, submitted_at, document)
    VALUES ($1, $2, $3, $4, $5, $6)
"#;

pub const SELECT_RESPONSES_BY_FORM: &str = r#"
    SELECT document FROM responses WHERE form_id = $1 ORDER BY submitted_at DESC
"#;

/// Same IP, or same submitter email when one is given
pub const SELECT_PRIOR_SUBMISSION: &str = r#"
    SELECT document
    FROM responses
    WHERE form_id = $1
      AND (ip_address = $2 OR ($3::TEXT IS NOT NULL AND submitter_email = $3::TEXT))
    LIMIT 1
"#;

pub const DELETE_RESPONSES_BY_FORM: &str = "DELETE FROM responses WHERE form_id = $1";

// ============================================
// Users
// ============================================

pub const INSERT_USER: &str = r#"
    INSERT INTO users (id, email, password_hash, name, created_at, updated_at)
    VALUES ($1, $2, $3, $4, $5, $6)
"#;

pub const SELECT_USER_BY_EMAIL: &str = r#"
    SELECT id, email, password_hash, name, created_at, updated_at
    FROM users WHERE email = $1
"#;

pub const SELECT_USER_BY_ID: &str = r#"
    SELECT id, email, password_hash, name, created_at, updated_at
    FROM users WHERE id = $1
"#;

pub const UPDATE_USER: &str = r#"
    UPDATE users SET email = $2, password_hash = $3, name = $4, updated_at = $5
    WHERE id = $1
"#;
