//! Initial database migration.
//!
//! Creates the directories, the status lookup table, the four document
//! stores with their type tables, and the append-only signature audit
//! trail.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: DIRECTORIES
        // ============================================================
        db.execute_unprepared(USERS_SQL).await?;
        db.execute_unprepared(CONTACTS_SQL).await?;
        db.execute_unprepared(ORGANIZATIONS_SQL).await?;

        // ============================================================
        // PART 2: STATUS LOOKUP (reference data)
        // ============================================================
        db.execute_unprepared(DOCUMENT_STATUSES_SQL).await?;

        // ============================================================
        // PART 3: DOCUMENT STORES
        // ============================================================
        db.execute_unprepared(DECREES_SQL).await?;
        db.execute_unprepared(REPORTS_SQL).await?;
        db.execute_unprepared(LETTERS_SQL).await?;
        db.execute_unprepared(INSTRUCTIONS_SQL).await?;

        // ============================================================
        // PART 4: SIGNATURE AUDIT TRAIL
        // ============================================================
        db.execute_unprepared(DOCUMENT_SIGNATURES_SQL).await?;
        db.execute_unprepared(TRIGGERS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_SQL).await?;
        Ok(())
    }
}

const USERS_SQL: &str = r"
CREATE TABLE users (
    id BIGSERIAL PRIMARY KEY,
    login VARCHAR(100) NOT NULL UNIQUE,
    full_name VARCHAR(255) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const CONTACTS_SQL: &str = r"
CREATE TABLE contacts (
    id BIGSERIAL PRIMARY KEY,
    full_name VARCHAR(255) NOT NULL,
    email VARCHAR(255),
    phone VARCHAR(50),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const ORGANIZATIONS_SQL: &str = r"
CREATE TABLE organizations (
    id BIGSERIAL PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    short_name VARCHAR(100),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const DOCUMENT_STATUSES_SQL: &str = r"
CREATE TABLE document_statuses (
    id SERIAL PRIMARY KEY,
    code VARCHAR(50) NOT NULL UNIQUE,
    name VARCHAR(100) NOT NULL
);

INSERT INTO document_statuses (code, name) VALUES
    ('draft', 'Draft'),
    ('pending_signature', 'Pending signature'),
    ('signed', 'Signed'),
    ('signature_rejected', 'Signature rejected');
";

const DECREES_SQL: &str = r"
CREATE TABLE decree_types (
    id BIGSERIAL PRIMARY KEY,
    name VARCHAR(255) NOT NULL UNIQUE
);

CREATE TABLE decrees (
    id BIGSERIAL PRIMARY KEY,
    name VARCHAR(500) NOT NULL,
    decree_number VARCHAR(50) NOT NULL,
    decree_date DATE NOT NULL,
    decree_type_id BIGINT NOT NULL REFERENCES decree_types(id),
    organization_id BIGINT REFERENCES organizations(id) ON DELETE SET NULL,
    responsible_contact_id BIGINT REFERENCES contacts(id) ON DELETE SET NULL,
    status_id INTEGER NOT NULL REFERENCES document_statuses(id),
    executor_id BIGINT REFERENCES contacts(id) ON DELETE SET NULL,
    due_date DATE,
    created_by BIGINT REFERENCES users(id) ON DELETE SET NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_by BIGINT REFERENCES users(id) ON DELETE SET NULL,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_decrees_status ON decrees(status_id, created_at DESC);
";

const REPORTS_SQL: &str = r"
CREATE TABLE report_types (
    id BIGSERIAL PRIMARY KEY,
    name VARCHAR(255) NOT NULL UNIQUE
);

CREATE TABLE reports (
    id BIGSERIAL PRIMARY KEY,
    name VARCHAR(500) NOT NULL,
    report_number VARCHAR(50) NOT NULL,
    report_date DATE NOT NULL,
    report_type_id BIGINT NOT NULL REFERENCES report_types(id),
    organization_id BIGINT REFERENCES organizations(id) ON DELETE SET NULL,
    responsible_contact_id BIGINT REFERENCES contacts(id) ON DELETE SET NULL,
    status_id INTEGER NOT NULL REFERENCES document_statuses(id),
    executor_id BIGINT REFERENCES contacts(id) ON DELETE SET NULL,
    due_date DATE,
    created_by BIGINT REFERENCES users(id) ON DELETE SET NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_by BIGINT REFERENCES users(id) ON DELETE SET NULL,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_reports_status ON reports(status_id, created_at DESC);
";

const LETTERS_SQL: &str = r"
CREATE TABLE letter_types (
    id BIGSERIAL PRIMARY KEY,
    name VARCHAR(255) NOT NULL UNIQUE
);

CREATE TABLE letters (
    id BIGSERIAL PRIMARY KEY,
    name VARCHAR(500) NOT NULL,
    letter_number VARCHAR(50) NOT NULL,
    letter_date DATE NOT NULL,
    letter_type_id BIGINT NOT NULL REFERENCES letter_types(id),
    organization_id BIGINT REFERENCES organizations(id) ON DELETE SET NULL,
    responsible_contact_id BIGINT REFERENCES contacts(id) ON DELETE SET NULL,
    status_id INTEGER NOT NULL REFERENCES document_statuses(id),
    executor_id BIGINT REFERENCES contacts(id) ON DELETE SET NULL,
    due_date DATE,
    created_by BIGINT REFERENCES users(id) ON DELETE SET NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_by BIGINT REFERENCES users(id) ON DELETE SET NULL,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_letters_status ON letters(status_id, created_at DESC);
";

const INSTRUCTIONS_SQL: &str = r"
CREATE TABLE instruction_types (
    id BIGSERIAL PRIMARY KEY,
    name VARCHAR(255) NOT NULL UNIQUE
);

CREATE TABLE instructions (
    id BIGSERIAL PRIMARY KEY,
    name VARCHAR(500) NOT NULL,
    instruction_number VARCHAR(50) NOT NULL,
    instruction_date DATE NOT NULL,
    instruction_type_id BIGINT NOT NULL REFERENCES instruction_types(id),
    organization_id BIGINT REFERENCES organizations(id) ON DELETE SET NULL,
    responsible_contact_id BIGINT REFERENCES contacts(id) ON DELETE SET NULL,
    status_id INTEGER NOT NULL REFERENCES document_statuses(id),
    executor_id BIGINT REFERENCES contacts(id) ON DELETE SET NULL,
    due_date DATE,
    created_by BIGINT REFERENCES users(id) ON DELETE SET NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_by BIGINT REFERENCES users(id) ON DELETE SET NULL,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_instructions_status ON instructions(status_id, created_at DESC);
";

const DOCUMENT_SIGNATURES_SQL: &str = r"
CREATE TABLE document_signatures (
    id BIGSERIAL PRIMARY KEY,
    document_kind VARCHAR(20) NOT NULL,
    document_id BIGINT NOT NULL,
    action VARCHAR(20) NOT NULL,
    resolution_text TEXT,
    rejection_reason TEXT,
    assigned_executor_id BIGINT REFERENCES contacts(id),
    assigned_due_date DATE,
    signed_by BIGINT NOT NULL REFERENCES users(id),
    signed_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_signature_kind
        CHECK (document_kind IN ('decree', 'report', 'letter', 'instruction')),
    CONSTRAINT chk_signature_action CHECK (action IN ('signed', 'rejected')),
    CONSTRAINT chk_rejection_has_no_assignment CHECK (
        action = 'signed'
        OR (assigned_executor_id IS NULL AND assigned_due_date IS NULL AND resolution_text IS NULL)
    )
);

-- History lookup (most recent first)
CREATE INDEX idx_document_signatures_document
    ON document_signatures(document_kind, document_id, signed_at DESC, id DESC);
";

const TRIGGERS_SQL: &str = r"
-- ============================================================
-- FUNCTION: prevent_signature_modification
-- The audit trail is append-only.
-- ============================================================
CREATE OR REPLACE FUNCTION prevent_signature_modification()
RETURNS TRIGGER AS $$
BEGIN
    RAISE EXCEPTION 'document_signatures is append-only: % is not allowed', TG_OP;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_prevent_signature_update
BEFORE UPDATE OR DELETE ON document_signatures
FOR EACH ROW
EXECUTE FUNCTION prevent_signature_modification();

CREATE TRIGGER trg_prevent_signature_truncate
BEFORE TRUNCATE ON document_signatures
FOR EACH STATEMENT
EXECUTE FUNCTION prevent_signature_modification();
";

const DROP_SQL: &str = r"
DROP TABLE IF EXISTS document_signatures CASCADE;
DROP FUNCTION IF EXISTS prevent_signature_modification() CASCADE;
DROP TABLE IF EXISTS instructions CASCADE;
DROP TABLE IF EXISTS instruction_types CASCADE;
DROP TABLE IF EXISTS letters CASCADE;
DROP TABLE IF EXISTS letter_types CASCADE;
DROP TABLE IF EXISTS reports CASCADE;
DROP TABLE IF EXISTS report_types CASCADE;
DROP TABLE IF EXISTS decrees CASCADE;
DROP TABLE IF EXISTS decree_types CASCADE;
DROP TABLE IF EXISTS document_statuses CASCADE;
DROP TABLE IF EXISTS organizations CASCADE;
DROP TABLE IF EXISTS contacts CASCADE;
DROP TABLE IF EXISTS users CASCADE;
";
