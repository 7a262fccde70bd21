//! Development seed data for Chancery.
//!
//! Seeds a signer, a few contacts and organizations, one document type per
//! kind and a handful of documents awaiting signature. Every step checks
//! for existing rows first, so the seeder can be re-run safely.
//!
//! Usage: cargo run --bin seeder

use anyhow::Context;
use chrono::{Duration, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbBackend, EntityTrait,
    QueryFilter, Set, Statement,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chancery_core::workflow::{DocumentKind, DocumentKindResolver, StoreDescriptor};
use chancery_db::entities::{contacts, organizations, users};
use chancery_db::{PendingDocumentRepository, StatusRepository};
use chancery_shared::AppConfig;

const SIGNER_LOGIN: &str = "director";
const CONTACTS: [&str; 2] = ["Irina Sokolova", "Pavel Orlov"];
const ORGANIZATIONS: [(&str, &str); 2] = [
    ("Northern Logistics LLC", "NorLog"),
    ("City Water Utility", "CWU"),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chancery=debug,seeder=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("failed to load configuration")?;
    let db = chancery_db::connect_with(&config.database)
        .await
        .context("failed to connect to database")?;
    info!("Connected to database");

    let signer_id = seed_signer(&db).await?;
    let contact_id = seed_contacts(&db).await?;
    let organization_id = seed_organizations(&db).await?;

    let statuses = StatusRepository::new(db.clone()).load_registry().await?;
    let pending = statuses.resolve_status_id(&config.workflow.pending_status_code)?;

    for store in DocumentKindResolver::all() {
        let type_id = seed_document_type(&db, store).await?;
        for n in 1..=2 {
            let seeded = seed_document(
                &db,
                store,
                &DocumentSeed {
                    number: format!("{}-{n:03}", store.kind.as_str().to_uppercase()),
                    type_id,
                    organization_id,
                    contact_id,
                    status_id: pending.into_inner(),
                    created_by: signer_id,
                    age_days: i64::from(n),
                },
            )
            .await?;
            info!(kind = %store.kind, document_id = seeded, "document ready");
        }
    }

    let counts = PendingDocumentRepository::new(db)
        .count_pending_by_kind(pending)
        .await?;
    for (kind, count) in counts {
        info!(kind = %kind, count, "documents pending signature");
    }

    info!("Seeding complete");
    Ok(())
}

async fn seed_signer(db: &DatabaseConnection) -> anyhow::Result<i64> {
    if let Some(user) = users::Entity::find()
        .filter(users::Column::Login.eq(SIGNER_LOGIN))
        .one(db)
        .await?
    {
        info!(user_id = user.id, "signer already exists, skipping");
        return Ok(user.id);
    }

    let user = users::ActiveModel {
        login: Set(SIGNER_LOGIN.to_string()),
        full_name: Set("Elena Volkova".to_string()),
        created_at: Set(Utc::now().into()),
        ..Default::default()
    }
    .insert(db)
    .await?;
    info!(user_id = user.id, "signer created");
    Ok(user.id)
}

/// Returns the id of the first seeded contact.
async fn seed_contacts(db: &DatabaseConnection) -> anyhow::Result<i64> {
    let mut first = None;
    for name in CONTACTS {
        let existing = contacts::Entity::find()
            .filter(contacts::Column::FullName.eq(name))
            .one(db)
            .await?;
        let id = match existing {
            Some(contact) => contact.id,
            None => {
                contacts::ActiveModel {
                    full_name: Set(name.to_string()),
                    email: Set(Some(format!(
                        "{}@example.org",
                        name.to_lowercase().replace(' ', ".")
                    ))),
                    created_at: Set(Utc::now().into()),
                    ..Default::default()
                }
                .insert(db)
                .await?
                .id
            }
        };
        first.get_or_insert(id);
    }
    first.context("no contacts seeded")
}

/// Returns the id of the first seeded organization.
async fn seed_organizations(db: &DatabaseConnection) -> anyhow::Result<i64> {
    let mut first = None;
    for (name, short_name) in ORGANIZATIONS {
        let existing = organizations::Entity::find()
            .filter(organizations::Column::Name.eq(name))
            .one(db)
            .await?;
        let id = match existing {
            Some(organization) => organization.id,
            None => {
                organizations::ActiveModel {
                    name: Set(name.to_string()),
                    short_name: Set(Some(short_name.to_string())),
                    created_at: Set(Utc::now().into()),
                    ..Default::default()
                }
                .insert(db)
                .await?
                .id
            }
        };
        first.get_or_insert(id);
    }
    first.context("no organizations seeded")
}

async fn seed_document_type(db: &DatabaseConnection, store: &StoreDescriptor) -> anyhow::Result<i64> {
    let name = match store.kind {
        DocumentKind::Decree => "General decree",
        DocumentKind::Report => "Quarterly report",
        DocumentKind::Letter => "Outgoing letter",
        DocumentKind::Instruction => "Operating instruction",
    };
    let sql = format!(
        "INSERT INTO {table} (name) VALUES ($1) \
         ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name RETURNING id",
        table = store.type_table
    );
    let row = db
        .query_one(Statement::from_sql_and_values(
            DbBackend::Postgres,
            sql,
            [name.into()],
        ))
        .await?
        .context("document type insert returned no row")?;
    Ok(row.try_get("", "id")?)
}

struct DocumentSeed {
    number: String,
    type_id: i64,
    organization_id: i64,
    contact_id: i64,
    status_id: i32,
    created_by: i64,
    age_days: i64,
}

async fn seed_document(
    db: &DatabaseConnection,
    store: &StoreDescriptor,
    seed: &DocumentSeed,
) -> anyhow::Result<i64> {
    let c = &store.columns;

    let lookup = format!(
        "SELECT {id} AS id FROM {table} WHERE {number} = $1",
        id = c.id,
        table = store.table,
        number = c.number,
    );
    if let Some(row) = db
        .query_one(Statement::from_sql_and_values(
            DbBackend::Postgres,
            lookup,
            [seed.number.clone().into()],
        ))
        .await?
    {
        return Ok(row.try_get("", "id")?);
    }

    let created_at = Utc::now() - Duration::days(seed.age_days);
    let insert = format!(
        "INSERT INTO {table} ({name}, {number}, {date}, {type_id}, {org}, {resp}, {status}, \
         {created_by}, {created_at}, {updated_by}, {updated_at}) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $8, $9) RETURNING {id} AS id",
        table = store.table,
        name = c.name,
        number = c.number,
        date = c.document_date,
        type_id = c.type_id,
        org = c.organization,
        resp = c.responsible,
        status = c.status,
        created_by = c.created_by,
        created_at = c.created_at,
        updated_by = c.updated_by,
        updated_at = c.updated_at,
        id = c.id,
    );
    let row = db
        .query_one(Statement::from_sql_and_values(
            DbBackend::Postgres,
            insert,
            [
                format!("{} {}", store.kind, seed.number).into(),
                seed.number.clone().into(),
                created_at.date_naive().into(),
                seed.type_id.into(),
                seed.organization_id.into(),
                seed.contact_id.into(),
                seed.status_id.into(),
                seed.created_by.into(),
                created_at.into(),
            ],
        ))
        .await?
        .context("document insert returned no row")?;
    Ok(row.try_get("", "id")?)
}
