use crate::errors::DbError;
use libsql::Connection;
use tracing::{debug, info, instrument};

/// SPEC_FULL §3.1: logical schemas (`raw_files`, `spine`, `processing`,
/// `dictionary`) are realized as table-name prefixes since libsql/SQLite has
/// no schema namespaces. Grouped here by prefix, in dependency order
/// (artifact bookkeeping has no foreign keys into spine/processing, so it
/// can bootstrap first).
const RAW_FILES_TABLES: &[(&str, &str)] = &[
    (
        "raw_files_spine_artifacts",
        r#"
        CREATE TABLE IF NOT EXISTS raw_files_spine_artifacts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            file_hash TEXT NOT NULL,
            download_time TEXT NOT NULL,
            active INTEGER NOT NULL DEFAULT 0,
            storage_location TEXT NOT NULL,
            UNIQUE(file_hash)
        );
    "#,
    ),
    (
        "raw_files_cube_artifacts",
        r#"
        CREATE TABLE IF NOT EXISTS raw_files_cube_artifacts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            productid INTEGER NOT NULL,
            file_hash TEXT NOT NULL,
            download_time TEXT NOT NULL,
            active INTEGER NOT NULL DEFAULT 0,
            storage_location TEXT NOT NULL,
            UNIQUE(productid, file_hash)
        );
    "#,
    ),
    (
        "raw_files_metadata_artifacts",
        r#"
        CREATE TABLE IF NOT EXISTS raw_files_metadata_artifacts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            productid INTEGER NOT NULL,
            file_hash TEXT NOT NULL,
            download_time TEXT NOT NULL,
            active INTEGER NOT NULL DEFAULT 0,
            storage_location TEXT NOT NULL,
            UNIQUE(productid, file_hash)
        );
    "#,
    ),
    (
        "raw_files_spine_status",
        r#"
        CREATE TABLE IF NOT EXISTS raw_files_spine_status (
            singleton INTEGER PRIMARY KEY CHECK (singleton = 0),
            last_download TEXT,
            download_pending INTEGER NOT NULL DEFAULT 1,
            last_file_hash TEXT,
            last_loaded_date TEXT,
            claimed_by TEXT
        );
    "#,
    ),
    (
        "raw_files_cube_status",
        r#"
        CREATE TABLE IF NOT EXISTS raw_files_cube_status (
            productid INTEGER PRIMARY KEY,
            last_download TEXT,
            download_pending INTEGER NOT NULL DEFAULT 1,
            last_file_hash TEXT,
            claimed_by TEXT
        );
    "#,
    ),
    (
        "raw_files_metadata_status",
        r#"
        CREATE TABLE IF NOT EXISTS raw_files_metadata_status (
            productid INTEGER PRIMARY KEY,
            last_download TEXT,
            download_pending INTEGER NOT NULL DEFAULT 1,
            last_file_hash TEXT,
            last_loaded_hash TEXT,
            claimed_by TEXT
        );
    "#,
    ),
    (
        "raw_files_changed_cubes_log",
        r#"
        CREATE TABLE IF NOT EXISTS raw_files_changed_cubes_log (
            productid INTEGER NOT NULL,
            change_date TEXT NOT NULL,
            PRIMARY KEY (productid, change_date)
        );
    "#,
    ),
];

const SPINE_TABLES: &[(&str, &str)] = &[
    (
        "spine_cubes",
        r#"
        CREATE TABLE IF NOT EXISTS spine_cubes (
            productid INTEGER PRIMARY KEY,
            cansim_id TEXT,
            title_en TEXT NOT NULL,
            title_fr TEXT NOT NULL,
            start_date TEXT,
            end_date TEXT,
            release_date TEXT,
            archived_flag INTEGER NOT NULL DEFAULT 0,
            frequency_code TEXT,
            issue_date TEXT
        );
    "#,
    ),
    (
        "spine_cube_subjects",
        r#"
        CREATE TABLE IF NOT EXISTS spine_cube_subjects (
            productid INTEGER NOT NULL,
            subject_code TEXT NOT NULL,
            PRIMARY KEY (productid, subject_code)
        );
    "#,
    ),
    (
        "spine_cube_surveys",
        r#"
        CREATE TABLE IF NOT EXISTS spine_cube_surveys (
            productid INTEGER NOT NULL,
            survey_code TEXT NOT NULL,
            PRIMARY KEY (productid, survey_code)
        );
    "#,
    ),
];

const PROCESSING_TABLES: &[(&str, &str)] = &[
    (
        "processing_raw_dimensions",
        r#"
        CREATE TABLE IF NOT EXISTS processing_raw_dimensions (
            productid INTEGER NOT NULL,
            dimension_position INTEGER NOT NULL,
            name_en TEXT NOT NULL,
            name_fr TEXT NOT NULL,
            has_uom INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (productid, dimension_position)
        );
    "#,
    ),
    (
        "processing_raw_members",
        r#"
        CREATE TABLE IF NOT EXISTS processing_raw_members (
            productid INTEGER NOT NULL,
            dimension_position INTEGER NOT NULL,
            member_id INTEGER NOT NULL,
            parent_member_id INTEGER,
            classification_code TEXT,
            name_en TEXT NOT NULL,
            name_fr TEXT NOT NULL,
            uom_code TEXT,
            geo_level TEXT,
            vintage TEXT,
            terminated INTEGER,
            PRIMARY KEY (productid, dimension_position, member_id)
        );
    "#,
    ),
    (
        "processing_processed_members",
        r#"
        CREATE TABLE IF NOT EXISTS processing_processed_members (
            productid INTEGER NOT NULL,
            dimension_position INTEGER NOT NULL,
            member_id INTEGER NOT NULL,
            parent_member_id INTEGER,
            uom_code TEXT,
            name_en TEXT NOT NULL,
            name_fr TEXT NOT NULL,
            member_label_norm TEXT NOT NULL,
            member_hash TEXT NOT NULL,
            dimension_hash TEXT,
            PRIMARY KEY (productid, dimension_position, member_id)
        );
    "#,
    ),
    (
        "processing_processed_dimensions",
        r#"
        CREATE TABLE IF NOT EXISTS processing_processed_dimensions (
            productid INTEGER NOT NULL,
            dimension_position INTEGER NOT NULL,
            dimension_hash TEXT NOT NULL,
            name_en TEXT NOT NULL,
            name_fr TEXT NOT NULL,
            has_uom INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (productid, dimension_position)
        );
    "#,
    ),
];

const DICTIONARY_TABLES: &[(&str, &str)] = &[
    (
        "dictionary_dimension_set",
        r#"
        CREATE TABLE IF NOT EXISTS dictionary_dimension_set (
            dimension_hash TEXT PRIMARY KEY,
            name_en TEXT NOT NULL,
            name_fr TEXT NOT NULL,
            usage_count INTEGER NOT NULL,
            has_uom INTEGER NOT NULL,
            is_tree INTEGER NOT NULL,
            is_hetero INTEGER NOT NULL,
            has_total INTEGER NOT NULL
        );
    "#,
    ),
    (
        "dictionary_dimension_set_member",
        r#"
        CREATE TABLE IF NOT EXISTS dictionary_dimension_set_member (
            dimension_hash TEXT NOT NULL,
            member_id INTEGER NOT NULL,
            name_en TEXT NOT NULL,
            name_fr TEXT NOT NULL,
            parent_member_id INTEGER,
            uom_code TEXT,
            usage_count INTEGER NOT NULL,
            tree_level INTEGER,
            base_name TEXT NOT NULL,
            PRIMARY KEY (dimension_hash, member_id)
        );
    "#,
    ),
];

const ACCELERATION_INDEXES: &[(&str, &str)] = &[
    (
        "idx_cube_artifacts_productid_active",
        "CREATE INDEX IF NOT EXISTS idx_cube_artifacts_productid_active ON raw_files_cube_artifacts(productid, active);",
    ),
    (
        "idx_metadata_artifacts_productid_active",
        "CREATE INDEX IF NOT EXISTS idx_metadata_artifacts_productid_active ON raw_files_metadata_artifacts(productid, active);",
    ),
    (
        "idx_cube_status_pending",
        "CREATE INDEX IF NOT EXISTS idx_cube_status_pending ON raw_files_cube_status(download_pending);",
    ),
    (
        "idx_metadata_status_pending",
        "CREATE INDEX IF NOT EXISTS idx_metadata_status_pending ON raw_files_metadata_status(download_pending);",
    ),
    (
        "idx_processed_members_dimension_hash",
        "CREATE INDEX IF NOT EXISTS idx_processed_members_dimension_hash ON processing_processed_members(dimension_hash);",
    ),
    (
        "idx_dimension_set_member_hash",
        "CREATE INDEX IF NOT EXISTS idx_dimension_set_member_hash ON dictionary_dimension_set_member(dimension_hash);",
    ),
];

#[instrument(skip(connection))]
pub async fn apply_schema(connection: &Connection) -> Result<(), DbError> {
    info!("applying schema");
    for (name, sql) in RAW_FILES_TABLES
        .iter()
        .chain(SPINE_TABLES)
        .chain(PROCESSING_TABLES)
        .chain(DICTIONARY_TABLES)
    {
        debug!(table = *name, "ensuring table exists");
        connection.execute(sql, ()).await?;
    }

    for (name, sql) in ACCELERATION_INDEXES {
        debug!(index = *name, "ensuring index exists");
        connection.execute(sql, ()).await?;
    }

    info!("schema synchronized");
    Ok(())
}
