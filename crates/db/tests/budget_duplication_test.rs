//! Integration tests for budget duplication.

mod common;

use chrono::Utc;
use obra_core::budget::{
    BudgetError, BudgetStatus, CreateBudgetInput, CreateLineGroupInput, CreateLineItemInput,
    DuplicateBudgetOptions, DuplicationPlanner,
};
use obra_db::entities::line_groups;
use obra_db::{BudgetRepository, BudgetRepositoryError};
use obra_shared::types::{
    BudgetId, ClassificationPartidaId, ClientId, LineGroupId, MayorId, ProjectId, UserId,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, ActiveValue::Set, EntityTrait};

fn group_input(name: &str, order_index: i32) -> CreateLineGroupInput {
    CreateLineGroupInput {
        name: name.to_string(),
        order_index,
        notes: None,
        fee_pct_override: None,
        waste_pct_override: None,
        classification: None,
    }
}

fn item_input(
    description: &str,
    order_index: i32,
    quantity: Decimal,
    price: Decimal,
) -> CreateLineItemInput {
    CreateLineItemInput {
        short_description: description.to_string(),
        real_quantity: quantity,
        waste_pct: dec!(5),
        quantity,
        real_price: price,
        fee_pct: dec!(10),
        unit_price: price,
        order_index,
        ..CreateLineItemInput::default()
    }
}

async fn create_budget(repo: &BudgetRepository, name: &str) -> BudgetId {
    repo.create_budget(CreateBudgetInput {
        project_id: ProjectId::new(),
        client_id: ClientId::new(),
        name: name.to_string(),
        settings: serde_json::json!({ "iva": "16", "moneda": "MXN" }),
        created_by: UserId::new(),
    })
    .await
    .expect("Failed to create budget")
    .id
}

#[tokio::test]
async fn test_duplicate_casa_a_without_prices() {
    let Some(db) = common::setup().await else {
        return;
    };
    let repo = BudgetRepository::new(db.clone());

    let source_id = create_budget(&repo, "Casa A").await;
    repo.set_budget_status(source_id, BudgetStatus::Active)
        .await
        .unwrap();

    let mayor = MayorId::new();
    let partida = ClassificationPartidaId::new();
    let mut cimentacion = group_input("Cimentación", 0);
    cimentacion.classification = Some((mayor, partida));
    let (g1, _) = repo.create_line_group(source_id, cimentacion).await.unwrap();
    let (g2, _) = repo
        .create_line_group(source_id, group_input("Estructura", 1))
        .await
        .unwrap();
    let (retired, _) = repo
        .create_line_group(source_id, group_input("Retirada", 2))
        .await
        .unwrap();

    repo.create_line_item(g1.id, item_input("Excavación", 0, dec!(10), dec!(100)))
        .await
        .unwrap();
    repo.create_line_item(g2.id, item_input("Castillos", 0, dec!(5), dec!(200)))
        .await
        .unwrap();
    repo.create_line_item(retired.id, item_input("Demolición", 0, dec!(1), dec!(1)))
        .await
        .unwrap();

    let retired_model = line_groups::Entity::find_by_id(retired.id.into_inner())
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    let mut retired_active: line_groups::ActiveModel = retired_model.into();
    retired_active.is_active = Set(false);
    retired_active.update(&db).await.unwrap();

    let user = UserId::new();
    let options = DuplicateBudgetOptions {
        new_name: "Casa A v2".to_string(),
        preserve_quantities: true,
        preserve_prices: false,
    };
    let new_id = repo.duplicate_budget(source_id, &options, user).await.unwrap();
    assert_ne!(new_id, source_id);

    let source = repo.get_aggregate(source_id).await.unwrap();
    let copy = repo.get_aggregate(new_id).await.unwrap();

    assert_eq!(copy.budget.name, "Casa A v2");
    assert_eq!(copy.budget.status, BudgetStatus::Draft);
    assert_eq!(copy.budget.project_id, source.budget.project_id);
    assert_eq!(copy.budget.client_id, source.budget.client_id);
    assert_eq!(copy.budget.settings, source.budget.settings);
    assert_eq!(copy.budget.created_by, user);

    let names: Vec<&str> = copy.groups.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(names, vec!["Cimentación", "Estructura"]);
    assert_eq!(copy.items.len(), 2);
    for item in &copy.items {
        assert!(item.quantity > Decimal::ZERO);
        assert_eq!(item.waste_pct, dec!(5));
        assert_eq!(item.unit_price, Decimal::ZERO);
        assert_eq!(item.real_price, Decimal::ZERO);
        assert_eq!(item.fee_pct, Decimal::ZERO);
        assert_eq!(item.total, Decimal::ZERO);
        assert_eq!(item.real_total, Decimal::ZERO);
    }

    assert_eq!(copy.mappings.len(), 1);
    assert_eq!(copy.mappings[0].budget_id, new_id);
    assert_eq!(copy.mappings[0].line_group_id, copy.groups[0].id);
    assert_eq!(copy.mappings[0].mayor_id, mayor);
    assert_eq!(copy.mappings[0].partida_id, partida);

    // The source is untouched.
    assert_eq!(source.groups.len(), 3);
    assert_eq!(source.grand_total(), dec!(2000));

    repo.delete_budget(new_id).await.unwrap();
    repo.delete_budget(source_id).await.unwrap();
}

#[tokio::test]
async fn test_duplicate_preserving_everything_keeps_totals() {
    let Some(db) = common::setup().await else {
        return;
    };
    let repo = BudgetRepository::new(db);

    let source_id = create_budget(&repo, "Casa B").await;
    let (group, _) = repo
        .create_line_group(source_id, group_input("Instalaciones", 0))
        .await
        .unwrap();
    repo.create_line_item(group.id, item_input("Tubería", 0, dec!(3), dec!(50.5)))
        .await
        .unwrap();

    let options = DuplicateBudgetOptions {
        new_name: "Casa B copia".to_string(),
        preserve_quantities: true,
        preserve_prices: true,
    };
    let new_id = repo
        .duplicate_budget(source_id, &options, UserId::new())
        .await
        .unwrap();
    let copy = repo.get_aggregate(new_id).await.unwrap();

    assert_eq!(copy.budget.name, "Casa B copia");
    assert_eq!(copy.grand_total(), dec!(151.5));

    repo.delete_budget(new_id).await.unwrap();
    repo.delete_budget(source_id).await.unwrap();
}

#[tokio::test]
async fn test_duplicate_empty_budget() {
    let Some(db) = common::setup().await else {
        return;
    };
    let repo = BudgetRepository::new(db);

    let source_id = create_budget(&repo, "Vacío").await;
    let options = DuplicateBudgetOptions {
        new_name: "Vacío 2".to_string(),
        preserve_quantities: false,
        preserve_prices: false,
    };
    let new_id = repo
        .duplicate_budget(source_id, &options, UserId::new())
        .await
        .unwrap();
    let copy = repo.get_aggregate(new_id).await.unwrap();

    assert!(copy.groups.is_empty());
    assert!(copy.items.is_empty());
    assert!(copy.mappings.is_empty());

    repo.delete_budget(new_id).await.unwrap();
    repo.delete_budget(source_id).await.unwrap();
}

#[tokio::test]
async fn test_duplicate_missing_budget_is_not_found() {
    let Some(db) = common::setup().await else {
        return;
    };
    let repo = BudgetRepository::new(db);
    let missing = BudgetId::new();

    let options = DuplicateBudgetOptions {
        new_name: "Copia".to_string(),
        preserve_quantities: true,
        preserve_prices: true,
    };
    let err = repo
        .duplicate_budget(missing, &options, UserId::new())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        BudgetRepositoryError::Domain(BudgetError::NotFound(id)) if id == missing
    ));
}

#[tokio::test]
async fn test_failed_plan_leaves_no_rows() {
    let Some(db) = common::setup().await else {
        return;
    };
    let repo = BudgetRepository::new(db);

    let source_id = create_budget(&repo, "Casa C").await;
    let (group, _) = repo
        .create_line_group(source_id, group_input("Acabados", 0))
        .await
        .unwrap();
    repo.create_line_item(group.id, item_input("Pintura", 0, dec!(2), dec!(80)))
        .await
        .unwrap();

    let source = repo.get_aggregate(source_id).await.unwrap();
    let options = DuplicateBudgetOptions {
        new_name: "Casa C copia".to_string(),
        preserve_quantities: true,
        preserve_prices: true,
    };
    let mut plan =
        DuplicationPlanner::plan(&source, &options, UserId::new(), Utc::now()).unwrap();
    // Point the last insert at a group that does not exist.
    plan.items[0].line_group_id = LineGroupId::new();

    assert!(repo.apply_plan(&plan).await.is_err());

    let err = repo.get_budget(plan.new_budget_id()).await.unwrap_err();
    assert!(matches!(
        err,
        BudgetRepositoryError::Domain(BudgetError::NotFound(_))
    ));

    repo.delete_budget(source_id).await.unwrap();
}

#[tokio::test]
async fn test_order_index_collision_is_a_conflict() {
    let Some(db) = common::setup().await else {
        return;
    };
    let repo = BudgetRepository::new(db);

    let budget_id = create_budget(&repo, "Casa D").await;
    repo.create_line_group(budget_id, group_input("Preliminares", 4))
        .await
        .unwrap();
    let err = repo
        .create_line_group(budget_id, group_input("Otra", 4))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        BudgetRepositoryError::Domain(BudgetError::DuplicateOrderIndex { order_index: 4, .. })
    ));

    repo.delete_budget(budget_id).await.unwrap();
}
