//! Database seeder for Obra development and testing.
//!
//! Seeds the "Casa A" budget (line groups, items, classification mappings and
//! a few matrix overrides) plus a small schedule, then prints a development
//! access token for the seeded user.
//!
//! Usage: cargo run --bin seeder

use anyhow::Context;
use obra_core::budget::{CreateBudgetInput, CreateLineGroupInput, CreateLineItemInput};
use obra_core::matrix::MatrixConcept;
use obra_core::schedule::CreateActivityInput;
use obra_db::{BudgetRepository, MatrixOverrideRepository, ScheduleRepository};
use obra_shared::types::{
    BudgetId, ClassificationPartidaId, ClientId, MayorId, ProjectId, UserId,
};
use obra_shared::{AppConfig, JwtConfig, JwtService};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::DatabaseConnection;
use serde_json::json;
use uuid::Uuid;

const DEV_USER: Uuid = Uuid::from_u128(0x0000_0000_0000_0000_0000_0000_0000_0001);
const DEV_PROJECT: Uuid = Uuid::from_u128(0x0000_0000_0000_0000_0000_0000_0000_0101);
const DEV_CLIENT: Uuid = Uuid::from_u128(0x0000_0000_0000_0000_0000_0000_0000_0201);
const MAYOR_PRELIMINARES: Uuid = Uuid::from_u128(0x0000_0000_0000_0000_0000_0000_0000_0301);
const MAYOR_CIMENTACION: Uuid = Uuid::from_u128(0x0000_0000_0000_0000_0000_0000_0000_0302);
const MAYOR_ESTRUCTURA: Uuid = Uuid::from_u128(0x0000_0000_0000_0000_0000_0000_0000_0303);

const SEED_BUDGET_NAME: &str = "Casa A";

/// One seeded line item: description, unit, real quantity, waste %, real price, fee %.
type ItemSeed = (&'static str, &'static str, Decimal, Decimal, Decimal, Decimal);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;

    println!("Connecting to database...");
    let db = obra_db::connect(&config.database)
        .await
        .context("Failed to connect to database")?;

    println!("Seeding budget...");
    match seed_budget(&db).await? {
        Some(budget_id) => {
            println!("  Created {SEED_BUDGET_NAME} ({budget_id})");
            println!("Seeding matrix overrides...");
            seed_overrides(&db, budget_id).await?;
        }
        None => println!("  {SEED_BUDGET_NAME} already exists, skipping..."),
    }

    println!("Seeding schedule...");
    seed_schedule(&db).await?;

    let jwt = JwtService::new(JwtConfig::from(&config.jwt));
    let token = jwt
        .generate_access_token(UserId::from_uuid(DEV_USER), "admin")
        .context("Failed to sign development token")?;
    println!("Development token (project {DEV_PROJECT}, client {DEV_CLIENT}):");
    println!("  {token}");

    println!("Seeding complete!");
    Ok(())
}

/// Seeds the budget unless one with the same name already exists in the project.
async fn seed_budget(db: &DatabaseConnection) -> anyhow::Result<Option<BudgetId>> {
    let repo = BudgetRepository::new(db.clone());
    let project_id = ProjectId::from_uuid(DEV_PROJECT);

    let existing = repo.list_budgets(Some(project_id)).await?;
    if existing.iter().any(|budget| budget.name == SEED_BUDGET_NAME) {
        return Ok(None);
    }

    let budget = repo
        .create_budget(CreateBudgetInput {
            project_id,
            client_id: ClientId::from_uuid(DEV_CLIENT),
            name: SEED_BUDGET_NAME.to_string(),
            settings: json!({ "currency": "MXN", "default_fee_pct": "12" }),
            created_by: UserId::from_uuid(DEV_USER),
        })
        .await?;

    let groups: [(&str, Uuid, Vec<ItemSeed>); 3] = [
        (
            "Preliminares",
            MAYOR_PRELIMINARES,
            vec![
                ("Limpieza de terreno", "m2", dec!(120), dec!(0), dec!(18.50), dec!(12)),
                ("Trazo y nivelación", "m2", dec!(95), dec!(0), dec!(22), dec!(12)),
            ],
        ),
        (
            "Cimentación",
            MAYOR_CIMENTACION,
            vec![
                ("Excavación a mano", "m3", dec!(38), dec!(0), dec!(210), dec!(12)),
                ("Concreto f'c=250", "m3", dec!(14.5), dec!(5), dec!(2350), dec!(12)),
                ("Acero de refuerzo", "kg", dec!(860), dec!(3), dec!(28.40), dec!(12)),
            ],
        ),
        (
            "Estructura",
            MAYOR_ESTRUCTURA,
            vec![("Muro de block 15 cm", "m2", dec!(210), dec!(4), dec!(385), dec!(12))],
        ),
    ];

    for (group_index, (name, mayor, items)) in (1..).zip(groups) {
        let (group, _) = repo
            .create_line_group(
                budget.id,
                CreateLineGroupInput {
                    name: name.to_string(),
                    order_index: group_index,
                    notes: None,
                    fee_pct_override: None,
                    waste_pct_override: None,
                    classification: Some((
                        MayorId::from_uuid(mayor),
                        ClassificationPartidaId::new(),
                    )),
                },
            )
            .await?;

        for (item_index, (description, unit, real_quantity, waste_pct, real_price, fee_pct)) in
            (1..).zip(items)
        {
            let hundred = Decimal::ONE_HUNDRED;
            repo.create_line_item(
                group.id,
                CreateLineItemInput {
                    short_description: description.to_string(),
                    unit: Some(unit.to_string()),
                    real_quantity,
                    waste_pct,
                    quantity: (real_quantity * (hundred + waste_pct) / hundred).round_dp(4),
                    real_price,
                    fee_pct,
                    unit_price: (real_price * (hundred + fee_pct) / hundred).round_dp(4),
                    order_index: item_index,
                    ..CreateLineItemInput::default()
                },
            )
            .await?;
        }
    }

    Ok(Some(budget.id))
}

async fn seed_overrides(db: &DatabaseConnection, budget_id: BudgetId) -> anyhow::Result<()> {
    let repo = MatrixOverrideRepository::new(db.clone());
    let user = UserId::from_uuid(DEV_USER);

    repo.upsert_override(budget_id, 2, MatrixConcept::Disbursement, "150000", user)
        .await?;
    repo.upsert_override(budget_id, 3, MatrixConcept::PaymentDate, "15/03, 30/03", user)
        .await?;
    Ok(())
}

async fn seed_schedule(db: &DatabaseConnection) -> anyhow::Result<()> {
    let repo = ScheduleRepository::new(db.clone());
    let project_id = ProjectId::from_uuid(DEV_PROJECT);
    let client_id = ClientId::from_uuid(DEV_CLIENT);

    if !repo.list_activities(project_id, client_id).await?.is_empty() {
        println!("  Schedule already exists, skipping...");
        return Ok(());
    }

    let activities = [
        (MAYOR_PRELIMINARES, "Limpieza y trazo", 1, 1, 2),
        (MAYOR_CIMENTACION, "Excavación", 1, 3, 2),
        (MAYOR_CIMENTACION, "Zapatas y contratrabes", 2, 1, 4),
        (MAYOR_ESTRUCTURA, "Muros planta baja", 3, 1, 6),
    ];

    for (mayor, name, start_month, start_week, duration_weeks) in activities {
        repo.create_activity(
            project_id,
            client_id,
            CreateActivityInput {
                mayor_id: MayorId::from_uuid(mayor),
                name: name.to_string(),
                start_month,
                start_week,
                duration_weeks,
            },
        )
        .await?;
    }
    println!("  Created {} activities", activities.len());
    Ok(())
}
