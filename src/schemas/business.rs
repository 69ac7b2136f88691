use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::validation::{between, ge_zero, gt_zero, max_length, not_blank, Validate};
use crate::error::AppError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BusinessType {
    #[serde(alias = "PHYSICAL")]
    Physical,
    #[serde(alias = "VIRTUAL")]
    Virtual,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BusinessWrite {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub business_type: BusinessType,
    /// Defaults to the caller on create; left untouched on update when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<Uuid>,
    pub initial_investment: f64,
    #[serde(default)]
    pub operational_costs: f64,
    pub expected_revenue: f64,
    #[serde(default)]
    pub break_even_months: Option<i32>,
}

impl Validate for BusinessWrite {
    fn validate(&self) -> Result<(), AppError> {
        not_blank("name", &self.name)?;
        max_length("name", &self.name, 100)?;
        if let Some(d) = &self.description {
            max_length("description", d, 500)?;
        }
        gt_zero("initial_investment", self.initial_investment)?;
        ge_zero("operational_costs", self.operational_costs)?;
        ge_zero("expected_revenue", self.expected_revenue)?;
        if let Some(m) = self.break_even_months {
            ge_zero("break_even_months", f64::from(m))?;
        }
        Ok(())
    }
}

fn default_tax_rate() -> f64 {
    0.15
}

fn json_object(field: &str, v: &Value) -> Result<(), AppError> {
    if !v.is_object() {
        return Err(AppError::Validation(format!("{} must be a JSON object", field)));
    }
    Ok(())
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PhysicalSettingsWrite {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub business_id: Uuid,
    pub location: String,
    pub size_sq_meters: f64,
    pub employee_count: i32,
    pub average_salary: f64,
    pub rent_cost: f64,
    pub equipment_maintenance_cost: f64,
    #[serde(default = "default_tax_rate")]
    pub tax_rate: f64,
    pub utilities_cost: f64,
    pub marketing_budget: f64,
    #[serde(default = "empty_object")]
    pub equipment: Value,
}

impl Validate for PhysicalSettingsWrite {
    fn validate(&self) -> Result<(), AppError> {
        max_length("location", &self.location, 255)?;
        gt_zero("size_sq_meters", self.size_sq_meters)?;
        gt_zero("employee_count", f64::from(self.employee_count))?;
        gt_zero("average_salary", self.average_salary)?;
        ge_zero("rent_cost", self.rent_cost)?;
        ge_zero("equipment_maintenance_cost", self.equipment_maintenance_cost)?;
        between("tax_rate", self.tax_rate, 0.0, 1.0)?;
        ge_zero("utilities_cost", self.utilities_cost)?;
        ge_zero("marketing_budget", self.marketing_budget)?;
        json_object("equipment", &self.equipment)
    }
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}

fn default_pool_fees() -> f64 {
    0.02
}

fn default_risk_multiplier() -> f64 {
    1.0
}

fn default_initial_capital() -> f64 {
    100_000.0
}

fn default_risk_level() -> i32 {
    3
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VirtualSettingsWrite {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub business_id: Uuid,
    pub electricity_cost: f64,
    pub hardware_cost: f64,
    pub hashrate: f64,
    pub mining_difficulty: f64,
    #[serde(default = "default_pool_fees")]
    pub pool_fees: f64,
    pub crypto_price: f64,
    #[serde(default = "default_risk_multiplier")]
    pub risk_multiplier: f64,
    #[serde(default = "default_initial_capital")]
    pub initial_capital: f64,
    #[serde(default = "default_risk_level")]
    pub risk_level: i32,
    #[serde(default = "empty_object")]
    pub portfolio: Value,
}

impl Validate for VirtualSettingsWrite {
    fn validate(&self) -> Result<(), AppError> {
        ge_zero("electricity_cost", self.electricity_cost)?;
        ge_zero("hardware_cost", self.hardware_cost)?;
        gt_zero("hashrate", self.hashrate)?;
        gt_zero("mining_difficulty", self.mining_difficulty)?;
        between("pool_fees", self.pool_fees, 0.0, 0.5)?;
        gt_zero("crypto_price", self.crypto_price)?;
        between("risk_multiplier", self.risk_multiplier, 0.5, 2.0)?;
        between("risk_level", f64::from(self.risk_level), 1.0, 5.0)?;
        json_object("portfolio", &self.portfolio)
    }
}
