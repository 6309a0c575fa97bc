//! PostgreSQL migration catalogue.
//!
//! Each entry is an immutable, reversible schema change. Entries are listed
//! in timestamp order; [`registry`] still sorts and checks them.

use crate::domain::migrations::{MigrationDefinition, MigrationRegistry, RegistryError};

const INITIAL_MIGRATION: MigrationDefinition = MigrationDefinition {
    name: "1722000000000-InitialMigration",
    timestamp: 1_722_000_000_000,
    up: &[
        "CREATE TABLE users (
            mbr_id SERIAL PRIMARY KEY,
            user_id VARCHAR(255) NOT NULL,
            password VARCHAR(255) NOT NULL,
            name VARCHAR(255) NOT NULL,
            email VARCHAR(255) NOT NULL,
            phone VARCHAR(20) NOT NULL,
            role VARCHAR(32) NOT NULL DEFAULT 'USER'
                CONSTRAINT chk_users_role
                CHECK (role IN ('USER', 'ADMIN', 'RELATIONSHIP_MANAGER')),
            created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )",
        "CREATE UNIQUE INDEX idx_users_user_id ON users (user_id)",
        "CREATE INDEX idx_users_email ON users (email)",
    ],
    down: &[
        "DROP INDEX idx_users_email",
        "DROP INDEX idx_users_user_id",
        "DROP TABLE users",
    ],
};

const CREATE_QUESTION_TABLE: MigrationDefinition = MigrationDefinition {
    name: "1754614559235-CreateQuestionTable",
    timestamp: 1_754_614_559_235,
    up: &[
        "CREATE TABLE questions (
            id SERIAL PRIMARY KEY,
            title VARCHAR(500) NOT NULL,
            description TEXT NOT NULL,
            votes INTEGER NOT NULL DEFAULT 0,
            answers INTEGER NOT NULL DEFAULT 0,
            views INTEGER NOT NULL DEFAULT 0,
            tags TEXT[] NOT NULL DEFAULT '{}',
            user_id INTEGER NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            CONSTRAINT fk_questions_user_id FOREIGN KEY (user_id)
                REFERENCES users (mbr_id) ON DELETE CASCADE
        )",
        "CREATE INDEX idx_questions_user_id ON questions (user_id)",
        "CREATE INDEX idx_questions_created_at ON questions (created_at)",
    ],
    down: &["DROP TABLE questions"],
};

const CREATE_ANSWER_TABLE: MigrationDefinition = MigrationDefinition {
    name: "1754649528822-CreateAnswerTable",
    timestamp: 1_754_649_528_822,
    up: &[
        "CREATE TABLE answers (
            id SERIAL PRIMARY KEY,
            content TEXT NOT NULL,
            votes INTEGER NOT NULL DEFAULT 0,
            accepted BOOLEAN NOT NULL DEFAULT FALSE,
            question_id INTEGER NOT NULL,
            user_id INTEGER NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            CONSTRAINT fk_answers_question FOREIGN KEY (question_id)
                REFERENCES questions (id) ON DELETE CASCADE,
            CONSTRAINT fk_answers_user FOREIGN KEY (user_id) REFERENCES users (mbr_id)
        )",
        "CREATE INDEX idx_answers_question_id ON answers (question_id)",
        "CREATE INDEX idx_answers_user_id ON answers (user_id)",
    ],
    down: &["DROP TABLE answers"],
};

const ADD_IMAGE_REPUTATION_TO_USER: MigrationDefinition = MigrationDefinition {
    name: "1754649968401-AddImageReputationToUser",
    timestamp: 1_754_649_968_401,
    up: &[
        "ALTER TABLE users ADD COLUMN IF NOT EXISTS image VARCHAR(255)",
        "ALTER TABLE users ADD COLUMN IF NOT EXISTS reputation INTEGER NOT NULL DEFAULT 0",
    ],
    down: &[
        "ALTER TABLE users DROP COLUMN reputation",
        "ALTER TABLE users DROP COLUMN image",
    ],
};

const UPDATE_QUESTION_ANSWER_MBR_ID_COLUMNS: MigrationDefinition = MigrationDefinition {
    name: "1755338541222-UpdateQuestionAnswerMbrIdColumns",
    timestamp: 1_755_338_541_222,
    up: &[
        "ALTER TABLE questions DROP CONSTRAINT IF EXISTS fk_questions_user_id",
        "ALTER TABLE questions RENAME COLUMN user_id TO mbr_id",
        "ALTER INDEX idx_questions_user_id RENAME TO idx_questions_mbr_id",
        "ALTER TABLE questions ADD CONSTRAINT fk_questions_mbr_id FOREIGN KEY (mbr_id)
            REFERENCES users (mbr_id) ON DELETE CASCADE",
        "ALTER TABLE answers DROP CONSTRAINT IF EXISTS fk_answers_user",
        "ALTER TABLE answers RENAME COLUMN user_id TO mbr_id",
        "ALTER INDEX idx_answers_user_id RENAME TO idx_answers_mbr_id",
        "ALTER TABLE answers ADD CONSTRAINT fk_answers_mbr_id FOREIGN KEY (mbr_id)
            REFERENCES users (mbr_id) ON DELETE CASCADE",
    ],
    down: &[
        "ALTER TABLE answers DROP CONSTRAINT fk_answers_mbr_id",
        "ALTER INDEX idx_answers_mbr_id RENAME TO idx_answers_user_id",
        "ALTER TABLE answers RENAME COLUMN mbr_id TO user_id",
        "ALTER TABLE answers ADD CONSTRAINT fk_answers_user FOREIGN KEY (user_id)
            REFERENCES users (mbr_id)",
        "ALTER TABLE questions DROP CONSTRAINT fk_questions_mbr_id",
        "ALTER INDEX idx_questions_mbr_id RENAME TO idx_questions_user_id",
        "ALTER TABLE questions RENAME COLUMN mbr_id TO user_id",
        "ALTER TABLE questions ADD CONSTRAINT fk_questions_user_id FOREIGN KEY (user_id)
            REFERENCES users (mbr_id) ON DELETE CASCADE",
    ],
};

const ADD_POINT_TO_USER: MigrationDefinition = MigrationDefinition {
    name: "1756536350000-AddPointToUser",
    timestamp: 1_756_536_350_000,
    up: &["ALTER TABLE users ADD COLUMN point INTEGER NOT NULL DEFAULT 0"],
    down: &["ALTER TABLE users DROP COLUMN point"],
};

const CREATE_COUPON_TABLE: MigrationDefinition = MigrationDefinition {
    name: "1756540000000-CreateCouponTable",
    timestamp: 1_756_540_000_000,
    up: &[
        "CREATE TABLE coupons (
            id SERIAL PRIMARY KEY,
            coupon_code VARCHAR(20) NOT NULL,
            points INTEGER NOT NULL,
            is_used BOOLEAN NOT NULL DEFAULT FALSE,
            used_by_mbr_id INTEGER,
            used_at TIMESTAMPTZ,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            CONSTRAINT uq_coupons_coupon_code UNIQUE (coupon_code)
        )",
        "CREATE INDEX idx_coupon_code ON coupons (coupon_code)",
    ],
    down: &["DROP TABLE coupons"],
};

const SEED_COUPONS: MigrationDefinition = MigrationDefinition {
    name: "1756540001000-SeedCoupons",
    timestamp: 1_756_540_001_000,
    up: &[
        "INSERT INTO coupons (coupon_code, points)
            SELECT 'POINT100-' || lpad(n::text, 3, '0'), 100 FROM generate_series(1, 7) AS n",
        "INSERT INTO coupons (coupon_code, points)
            SELECT 'POINT500-' || lpad(n::text, 3, '0'), 500 FROM generate_series(1, 8) AS n",
        "INSERT INTO coupons (coupon_code, points)
            SELECT 'POINT1000-' || lpad(n::text, 2, '0'), 1000 FROM generate_series(1, 5) AS n",
    ],
    down: &["DELETE FROM coupons WHERE coupon_code LIKE 'POINT%'"],
};

/// Every migration, ascending by timestamp.
pub const MIGRATIONS: &[MigrationDefinition] = &[
    INITIAL_MIGRATION,
    CREATE_QUESTION_TABLE,
    CREATE_ANSWER_TABLE,
    ADD_IMAGE_REPUTATION_TO_USER,
    UPDATE_QUESTION_ANSWER_MBR_ID_COLUMNS,
    ADD_POINT_TO_USER,
    CREATE_COUPON_TABLE,
    SEED_COUPONS,
];

/// Registry over [`MIGRATIONS`].
///
/// # Errors
/// Returns [`RegistryError`] if two entries share a name or timestamp.
pub fn registry() -> Result<MigrationRegistry, RegistryError> {
    MigrationRegistry::new(MIGRATIONS.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn catalogue_forms_a_valid_registry() {
        let registry = registry().expect("catalogue is consistent");
        assert_eq!(registry.len(), MIGRATIONS.len());
        assert_eq!(
            registry.iter().map(|m| m.name).collect::<Vec<_>>(),
            MIGRATIONS.iter().map(|m| m.name).collect::<Vec<_>>()
        );
    }

    #[rstest]
    fn names_embed_their_timestamp() {
        for migration in MIGRATIONS {
            assert!(
                migration
                    .name
                    .starts_with(&format!("{}-", migration.timestamp)),
                "{} does not start with its timestamp",
                migration.name
            );
        }
    }

    #[rstest]
    fn every_migration_is_reversible() {
        for migration in MIGRATIONS {
            assert!(!migration.up.is_empty(), "{} has no up", migration.name);
            assert!(!migration.down.is_empty(), "{} has no down", migration.name);
        }
    }

    #[rstest]
    fn plain_text_credentials_are_never_seeded() {
        let inserts_users = MIGRATIONS
            .iter()
            .flat_map(|m| m.up.iter())
            .any(|statement| statement.contains("INSERT INTO users"));
        assert!(!inserts_users);
    }
}
