use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::{table_columns, ColumnDef, ColumnType, Entity, TableDef};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Business {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub business_type: String,
    pub owner_id: Uuid,
    pub initial_investment: f64,
    pub operational_costs: f64,
    pub expected_revenue: f64,
    pub break_even_months: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Business {
    type Id = Uuid;

    const TABLE: &'static TableDef = &TableDef {
        name: "business",
        pk: "id",
        columns: table_columns![
            ColumnDef::new("name", ColumnType::Text),
            ColumnDef::new("description", ColumnType::Text),
            ColumnDef::new("business_type", ColumnType::Text),
            ColumnDef::new("owner_id", ColumnType::Uuid),
            ColumnDef::new("initial_investment", ColumnType::Float),
            ColumnDef::new("operational_costs", ColumnType::Float),
            ColumnDef::new("expected_revenue", ColumnType::Float),
            ColumnDef::new("break_even_months", ColumnType::Int),
        ],
        timestamps: true,
        natural_sort: false,
    };
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PhysicalBusinessSettings {
    pub id: Uuid,
    pub business_id: Uuid,
    pub location: String,
    pub size_sq_meters: f64,
    pub employee_count: i32,
    pub average_salary: f64,
    pub rent_cost: f64,
    pub equipment_maintenance_cost: f64,
    pub tax_rate: f64,
    pub utilities_cost: f64,
    pub marketing_budget: f64,
    pub equipment: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for PhysicalBusinessSettings {
    type Id = Uuid;

    const TABLE: &'static TableDef = &TableDef {
        name: "physical_business_settings",
        pk: "id",
        columns: table_columns![
            ColumnDef::new("business_id", ColumnType::Uuid),
            ColumnDef::new("location", ColumnType::Text),
            ColumnDef::new("size_sq_meters", ColumnType::Float),
            ColumnDef::new("employee_count", ColumnType::Int),
            ColumnDef::new("average_salary", ColumnType::Float),
            ColumnDef::new("rent_cost", ColumnType::Float),
            ColumnDef::new("equipment_maintenance_cost", ColumnType::Float),
            ColumnDef::new("tax_rate", ColumnType::Float),
            ColumnDef::new("utilities_cost", ColumnType::Float),
            ColumnDef::new("marketing_budget", ColumnType::Float),
            ColumnDef::new("equipment", ColumnType::Json),
        ],
        timestamps: true,
        natural_sort: false,
    };
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VirtualBusinessSettings {
    pub id: Uuid,
    pub business_id: Uuid,
    pub electricity_cost: f64,
    pub hardware_cost: f64,
    pub hashrate: f64,
    pub mining_difficulty: f64,
    pub pool_fees: f64,
    pub crypto_price: f64,
    pub risk_multiplier: f64,
    pub initial_capital: f64,
    pub risk_level: i32,
    pub portfolio: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for VirtualBusinessSettings {
    type Id = Uuid;

    const TABLE: &'static TableDef = &TableDef {
        name: "virtual_business_settings",
        pk: "id",
        columns: table_columns![
            ColumnDef::new("business_id", ColumnType::Uuid),
            ColumnDef::new("electricity_cost", ColumnType::Float),
            ColumnDef::new("hardware_cost", ColumnType::Float),
            ColumnDef::new("hashrate", ColumnType::Float),
            ColumnDef::new("mining_difficulty", ColumnType::Float),
            ColumnDef::new("pool_fees", ColumnType::Float),
            ColumnDef::new("crypto_price", ColumnType::Float),
            ColumnDef::new("risk_multiplier", ColumnType::Float),
            ColumnDef::new("initial_capital", ColumnType::Float),
            ColumnDef::new("risk_level", ColumnType::Int),
            ColumnDef::new("portfolio", ColumnType::Json),
        ],
        timestamps: true,
        natural_sort: false,
    };
}
