use sqlx::{Executor, PgConnection};

/// Provision a new per-tenant PostgreSQL schema with all required tables.
/// Runs against a plain connection so signup can execute it inside the
/// registration transaction — PostgreSQL DDL is transactional, which is what
/// makes tenant bootstrap all-or-nothing.
pub async fn provision_tenant_schema(conn: &mut PgConnection, slug: &str) -> anyhow::Result<()> {
    let schema = schema_name(slug);

    // --- Create schema ---
    conn.execute(sqlx::raw_sql(&format!("CREATE SCHEMA IF NOT EXISTS \"{schema}\"")))
        .await?;

    // --- Enum: user_role ---
    conn.execute(sqlx::raw_sql(&format!(
        "DO $$ BEGIN
           IF NOT EXISTS (
             SELECT 1 FROM pg_type t
             JOIN pg_namespace n ON n.oid = t.typnamespace
             WHERE t.typname = 'user_role' AND n.nspname = '{schema}'
           ) THEN
             CREATE TYPE \"{schema}\".user_role AS ENUM
               ('owner','admin','teacher','accountant');
           END IF;
         END $$"
    )))
    .await?;

    // --- Users ---
    conn.execute(sqlx::raw_sql(&format!(
        r#"CREATE TABLE IF NOT EXISTS "{schema}".users (
            id            UUID PRIMARY KEY DEFAULT public.uuid_generate_v4(),
            email         VARCHAR(255) UNIQUE NOT NULL,
            password_hash TEXT NOT NULL,
            first_name    VARCHAR(128) NOT NULL,
            last_name     VARCHAR(128) NOT NULL,
            role          "{schema}".user_role NOT NULL DEFAULT 'teacher',
            is_active     BOOLEAN NOT NULL DEFAULT TRUE,
            created_at    TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at    TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )"#
    )))
    .await?;

    // --- Classes ---
    conn.execute(sqlx::raw_sql(&format!(
        r#"CREATE TABLE IF NOT EXISTS "{schema}".classes (
            id         UUID PRIMARY KEY DEFAULT public.uuid_generate_v4(),
            name       VARCHAR(128) NOT NULL,
            section    VARCHAR(32),
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )"#
    )))
    .await?;

    // --- Students ---
    conn.execute(sqlx::raw_sql(&format!(
        r#"CREATE TABLE IF NOT EXISTS "{schema}".students (
            id             UUID PRIMARY KEY DEFAULT public.uuid_generate_v4(),
            first_name     VARCHAR(128) NOT NULL,
            last_name      VARCHAR(128) NOT NULL,
            class_id       UUID NOT NULL REFERENCES "{schema}".classes(id),
            admission_no   VARCHAR(64) UNIQUE,
            guardian_name  VARCHAR(255),
            guardian_phone VARCHAR(32),
            is_active      BOOLEAN NOT NULL DEFAULT TRUE,
            created_at     TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at     TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )"#
    )))
    .await?;

    conn.execute(sqlx::raw_sql(&format!(
        r#"CREATE INDEX IF NOT EXISTS students_class_idx ON "{schema}".students(class_id)"#
    )))
    .await?;

    // --- Teachers ---
    conn.execute(sqlx::raw_sql(&format!(
        r#"CREATE TABLE IF NOT EXISTS "{schema}".teachers (
            id         UUID PRIMARY KEY DEFAULT public.uuid_generate_v4(),
            first_name VARCHAR(128) NOT NULL,
            last_name  VARCHAR(128) NOT NULL,
            email      VARCHAR(255),
            phone      VARCHAR(32),
            subject    VARCHAR(128),
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )"#
    )))
    .await?;

    // --- Fee heads ---
    conn.execute(sqlx::raw_sql(&format!(
        r#"CREATE TABLE IF NOT EXISTS "{schema}".fee_heads (
            id          UUID PRIMARY KEY DEFAULT public.uuid_generate_v4(),
            name        VARCHAR(128) UNIQUE NOT NULL,
            is_one_time BOOLEAN NOT NULL DEFAULT FALSE,
            created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )"#
    )))
    .await?;

    // --- Fee structures (the due-amount assertions) ---
    conn.execute(sqlx::raw_sql(&format!(
        r#"CREATE TABLE IF NOT EXISTS "{schema}".fee_structures (
            id          UUID PRIMARY KEY DEFAULT public.uuid_generate_v4(),
            class_id    UUID NOT NULL REFERENCES "{schema}".classes(id),
            fee_head_id UUID NOT NULL REFERENCES "{schema}".fee_heads(id),
            month_year  VARCHAR(7) NOT NULL,
            amount      NUMERIC(12,2) NOT NULL CHECK (amount >= 0),
            created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at  TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            UNIQUE (class_id, fee_head_id, month_year)
        )"#
    )))
    .await?;

    conn.execute(sqlx::raw_sql(&format!(
        r#"CREATE INDEX IF NOT EXISTS fee_structures_month_idx
           ON "{schema}".fee_structures(class_id, month_year)"#
    )))
    .await?;

    // --- Fee payments (append-only; no update/delete path exists) ---
    conn.execute(sqlx::raw_sql(&format!(
        r#"CREATE TABLE IF NOT EXISTS "{schema}".fee_payments (
            id                UUID PRIMARY KEY DEFAULT public.uuid_generate_v4(),
            student_id        UUID NOT NULL REFERENCES "{schema}".students(id),
            class_id          UUID NOT NULL REFERENCES "{schema}".classes(id),
            month_year        VARCHAR(7) NOT NULL,
            payment_date      DATE NOT NULL,
            received_by       UUID NOT NULL REFERENCES "{schema}".users(id),
            total_amount_paid NUMERIC(12,2) NOT NULL CHECK (total_amount_paid > 0),
            remarks           TEXT,
            created_at        TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )"#
    )))
    .await?;

    conn.execute(sqlx::raw_sql(&format!(
        r#"CREATE INDEX IF NOT EXISTS fee_payments_student_month_idx
           ON "{schema}".fee_payments(student_id, month_year);
           CREATE INDEX IF NOT EXISTS fee_payments_class_month_idx
           ON "{schema}".fee_payments(class_id, month_year)"#
    )))
    .await?;

    // --- Fee payment items (the per-head allocation of each payment) ---
    conn.execute(sqlx::raw_sql(&format!(
        r#"CREATE TABLE IF NOT EXISTS "{schema}".fee_payment_items (
            id          UUID PRIMARY KEY DEFAULT public.uuid_generate_v4(),
            payment_id  UUID NOT NULL REFERENCES "{schema}".fee_payments(id) ON DELETE CASCADE,
            fee_head_id UUID NOT NULL REFERENCES "{schema}".fee_heads(id),
            amount_paid NUMERIC(12,2) NOT NULL CHECK (amount_paid > 0),
            position    SMALLINT NOT NULL DEFAULT 0
        )"#
    )))
    .await?;

    conn.execute(sqlx::raw_sql(&format!(
        r#"CREATE INDEX IF NOT EXISTS fee_payment_items_payment_idx
           ON "{schema}".fee_payment_items(payment_id);
           CREATE INDEX IF NOT EXISTS fee_payment_items_head_idx
           ON "{schema}".fee_payment_items(fee_head_id)"#
    )))
    .await?;

    // --- Enum: attendance_status ---
    conn.execute(sqlx::raw_sql(&format!(
        "DO $$ BEGIN
           IF NOT EXISTS (
             SELECT 1 FROM pg_type t
             JOIN pg_namespace n ON n.oid = t.typnamespace
             WHERE t.typname = 'attendance_status' AND n.nspname = '{schema}'
           ) THEN
             CREATE TYPE \"{schema}\".attendance_status AS ENUM
               ('present','absent','late','leave');
           END IF;
         END $$"
    )))
    .await?;

    // --- Attendance (natural key: student + day) ---
    conn.execute(sqlx::raw_sql(&format!(
        r#"CREATE TABLE IF NOT EXISTS "{schema}".attendance (
            id         UUID PRIMARY KEY DEFAULT public.uuid_generate_v4(),
            student_id UUID NOT NULL REFERENCES "{schema}".students(id) ON DELETE CASCADE,
            date       DATE NOT NULL,
            status     "{schema}".attendance_status NOT NULL,
            marked_by  UUID NOT NULL REFERENCES "{schema}".users(id),
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            UNIQUE (student_id, date)
        )"#
    )))
    .await?;

    // --- Exams ---
    conn.execute(sqlx::raw_sql(&format!(
        r#"CREATE TABLE IF NOT EXISTS "{schema}".exams (
            id         UUID PRIMARY KEY DEFAULT public.uuid_generate_v4(),
            name       VARCHAR(128) UNIQUE NOT NULL,
            term       VARCHAR(64),
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )"#
    )))
    .await?;

    // --- Grades (natural key: student + exam + subject) ---
    conn.execute(sqlx::raw_sql(&format!(
        r#"CREATE TABLE IF NOT EXISTS "{schema}".grades (
            id             UUID PRIMARY KEY DEFAULT public.uuid_generate_v4(),
            student_id     UUID NOT NULL REFERENCES "{schema}".students(id) ON DELETE CASCADE,
            exam_id        UUID NOT NULL REFERENCES "{schema}".exams(id) ON DELETE CASCADE,
            subject        VARCHAR(128) NOT NULL,
            obtained_marks NUMERIC(6,2) NOT NULL CHECK (obtained_marks >= 0),
            total_marks    NUMERIC(6,2) NOT NULL CHECK (total_marks > 0),
            graded_by      UUID NOT NULL REFERENCES "{schema}".users(id),
            created_at     TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at     TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            UNIQUE (student_id, exam_id, subject)
        )"#
    )))
    .await?;

    // --- updated_at trigger function ---
    conn.execute(sqlx::raw_sql(&format!(
        r#"CREATE OR REPLACE FUNCTION "{schema}".update_updated_at()
           RETURNS TRIGGER AS $fn$
           BEGIN NEW.updated_at = NOW(); RETURN NEW; END;
           $fn$ LANGUAGE plpgsql"#
    )))
    .await?;

    // --- Triggers (one per table, idempotent via DROP IF EXISTS + CREATE) ---
    for table in &["users", "classes", "students", "teachers", "fee_structures", "attendance", "grades"] {
        let trigger = format!("{table}_updated_at");
        conn.execute(sqlx::raw_sql(&format!(
            r#"DROP TRIGGER IF EXISTS "{trigger}" ON "{schema}"."{table}";
               CREATE TRIGGER "{trigger}"
               BEFORE UPDATE ON "{schema}"."{table}"
               FOR EACH ROW EXECUTE FUNCTION "{schema}".update_updated_at()"#
        )))
        .await?;
    }

    tracing::info!("Provisioned tenant schema: {schema}");
    Ok(())
}

/// Returns the PostgreSQL schema name for a given school slug.
pub fn schema_name(slug: &str) -> String {
    format!("school_{}", slug.to_lowercase().replace('-', "_"))
}

