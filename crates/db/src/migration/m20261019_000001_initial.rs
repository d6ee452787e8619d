//! Initial database migration.
//!
//! Creates the budget aggregate tables, matrix overrides and schedule activities.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: BUDGET AGGREGATE
        // ============================================================
        db.execute_unprepared(BUDGETS_SQL).await?;
        db.execute_unprepared(LINE_GROUPS_SQL).await?;
        db.execute_unprepared(LINE_ITEMS_SQL).await?;
        db.execute_unprepared(CLASSIFICATION_MAPPINGS_SQL).await?;

        // ============================================================
        // PART 3: MATRIX OVERRIDES
        // ============================================================
        db.execute_unprepared(MATRIX_OVERRIDES_SQL).await?;

        // ============================================================
        // PART 4: SCHEDULE
        // ============================================================
        db.execute_unprepared(SCHEDULE_ACTIVITIES_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
CREATE TYPE budget_status AS ENUM ('draft', 'active', 'archived');

CREATE TYPE matrix_concept AS ENUM (
    'monthly_expense',
    'partial_progress',
    'cumulative_progress',
    'disbursement',
    'cumulative_investment',
    'payment_date'
);
";

const BUDGETS_SQL: &str = r"
CREATE TABLE budgets (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    project_id UUID NOT NULL,
    client_id UUID NOT NULL,
    name VARCHAR(255) NOT NULL,
    status budget_status NOT NULL DEFAULT 'draft',
    settings JSONB NOT NULL DEFAULT '{}'::jsonb,
    created_by UUID NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_budget_name_not_blank CHECK (length(trim(name)) > 0)
);

CREATE INDEX idx_budgets_project ON budgets(project_id, created_at DESC);
";

const LINE_GROUPS_SQL: &str = r"
CREATE TABLE line_groups (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    budget_id UUID NOT NULL REFERENCES budgets(id) ON DELETE CASCADE,
    name VARCHAR(255) NOT NULL,
    order_index INTEGER NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT true,
    notes TEXT,
    fee_pct_override NUMERIC(7, 4),
    waste_pct_override NUMERIC(7, 4),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT uq_line_groups_order UNIQUE (budget_id, order_index)
);
";

const LINE_ITEMS_SQL: &str = r"
CREATE TABLE line_items (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    line_group_id UUID NOT NULL REFERENCES line_groups(id) ON DELETE CASCADE,
    code VARCHAR(50),
    short_description VARCHAR(500) NOT NULL,
    long_description TEXT,
    unit VARCHAR(20),
    provider VARCHAR(255),
    real_quantity NUMERIC(19, 4) NOT NULL DEFAULT 0,
    waste_pct NUMERIC(7, 4) NOT NULL DEFAULT 0,
    quantity NUMERIC(19, 4) NOT NULL DEFAULT 0,
    real_price NUMERIC(19, 4) NOT NULL DEFAULT 0,
    fee_pct NUMERIC(7, 4) NOT NULL DEFAULT 0,
    unit_price NUMERIC(19, 4) NOT NULL DEFAULT 0,
    real_total NUMERIC(19, 4) NOT NULL DEFAULT 0,
    total NUMERIC(19, 4) NOT NULL DEFAULT 0,
    order_index INTEGER NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_line_item_amounts_non_negative CHECK (
        real_quantity >= 0 AND waste_pct >= 0 AND quantity >= 0
        AND real_price >= 0 AND fee_pct >= 0 AND unit_price >= 0
    )
);

CREATE INDEX idx_line_items_group ON line_items(line_group_id, order_index);
";

const CLASSIFICATION_MAPPINGS_SQL: &str = r"
CREATE TABLE classification_mappings (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    budget_id UUID NOT NULL REFERENCES budgets(id) ON DELETE CASCADE,
    line_group_id UUID NOT NULL UNIQUE REFERENCES line_groups(id) ON DELETE CASCADE,
    mayor_id UUID NOT NULL,
    partida_id UUID NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_classification_mappings_budget ON classification_mappings(budget_id);
";

const MATRIX_OVERRIDES_SQL: &str = r"
CREATE TABLE matrix_overrides (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    budget_id UUID NOT NULL REFERENCES budgets(id) ON DELETE CASCADE,
    month INTEGER NOT NULL,
    concept matrix_concept NOT NULL,
    value TEXT NOT NULL,
    updated_by UUID NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT uq_matrix_overrides_cell UNIQUE (budget_id, month, concept),
    CONSTRAINT chk_matrix_override_month CHECK (month >= 1)
);
";

const SCHEDULE_ACTIVITIES_SQL: &str = r"
CREATE TABLE schedule_activities (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    project_id UUID NOT NULL,
    client_id UUID NOT NULL,
    mayor_id UUID NOT NULL,
    name VARCHAR(255) NOT NULL,
    start_month INTEGER NOT NULL,
    start_week INTEGER NOT NULL,
    end_month INTEGER NOT NULL,
    end_week INTEGER NOT NULL,
    duration_weeks INTEGER NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_schedule_start_month CHECK (start_month BETWEEN 1 AND 12),
    CONSTRAINT chk_schedule_end_month CHECK (end_month BETWEEN 1 AND 12),
    CONSTRAINT chk_schedule_start_week CHECK (start_week BETWEEN 1 AND 4),
    CONSTRAINT chk_schedule_end_week CHECK (end_week BETWEEN 1 AND 4),
    CONSTRAINT chk_schedule_duration CHECK (duration_weeks BETWEEN 1 AND 480)
);

CREATE INDEX idx_schedule_activities_owner ON schedule_activities(project_id, client_id);
";

const DROP_ALL_SQL: &str = r"
-- Order matters due to foreign key constraints
DROP TABLE IF EXISTS schedule_activities CASCADE;
DROP TABLE IF EXISTS matrix_overrides CASCADE;
DROP TABLE IF EXISTS classification_mappings CASCADE;
DROP TABLE IF EXISTS line_items CASCADE;
DROP TABLE IF EXISTS line_groups CASCADE;
DROP TABLE IF EXISTS budgets CASCADE;

DROP TYPE IF EXISTS matrix_concept;
DROP TYPE IF EXISTS budget_status;
";
