use dotenv::dotenv;
use reqwest::Client;
use serde_json::Value;
use std::collections::HashMap;
use std::env;
use std::time::Duration;
use tracing::{debug, info};

use crate::catalog::normalize::{list_from_json, number_from_json, string_from_json};
use crate::catalog::pairings::PairingSet;
use crate::catalog::record::{IngredientRecord, Macros, Role};

pub const SUPABASE_URL_ENV_VAR: &str = "SUPABASE_URL";
pub const SUPABASE_KEY_ENV_VAR: &str = "SUPABASE_KEY";

const INGREDIENT_TABLE: &str = "ingredient";
const PAIRING_TABLE: &str = "pairing";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Environment variable not set: {0}")]
    MissingCredential(String),
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Remote catalog error {status}: {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("Unexpected response from table '{0}': expected a JSON list of rows")]
    UnexpectedShape(String),
}

/// Read-only client for the hosted ingredient and pairing tables.
#[derive(Debug, Clone)]
pub struct SupabaseCatalog {
    base_url: String,
    api_key: String,
    client: Client,
}

impl SupabaseCatalog {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, CatalogError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client,
        })
    }

    /// Reads the endpoint and key from the named environment variables (`.env` honored).
    pub fn from_env(url_env_var: &str, key_env_var: &str) -> Result<Self, CatalogError> {
        dotenv().ok();
        let url = env::var(url_env_var)
            .map_err(|_| CatalogError::MissingCredential(url_env_var.to_string()))?;
        let key = env::var(key_env_var)
            .map_err(|_| CatalogError::MissingCredential(key_env_var.to_string()))?;
        Self::new(&url, &key)
    }

    async fn fetch_rows(&self, table: &str) -> Result<Vec<Value>, CatalogError> {
        let url = format!("{}/rest/v1/{}?select=*", self.base_url, table);
        debug!(%url, "fetching remote table");

        let response = self
            .client
            .get(&url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            return Err(CatalogError::Api { status, body });
        }

        match response.json::<Value>().await? {
            Value::Array(rows) => Ok(rows),
            _ => Err(CatalogError::UnexpectedShape(table.to_string())),
        }
    }

    pub async fn fetch_ingredients(&self) -> Result<Vec<IngredientRecord>, CatalogError> {
        let rows = self.fetch_rows(INGREDIENT_TABLE).await?;
        let records: Vec<IngredientRecord> = rows
            .iter()
            .enumerate()
            .filter_map(|(idx, row)| ingredient_from_row(idx, row))
            .collect();
        info!(count = records.len(), "loaded remote ingredient catalog");
        Ok(records)
    }

    /// Fetches the pairing table and resolves ingredient ids against `catalog`.
    pub async fn fetch_pairings(
        &self,
        catalog: &[IngredientRecord],
        min_score: i64,
    ) -> Result<PairingSet, CatalogError> {
        let rows = self.fetch_rows(PAIRING_TABLE).await?;
        let pairings = pairings_from_rows(&rows, catalog, min_score);
        info!(count = pairings.len(), min_score, "loaded remote pairings");
        Ok(pairings)
    }
}

/// Normalizes one remote row. Rows without a name are dropped.
pub fn ingredient_from_row(idx: usize, row: &Value) -> Option<IngredientRecord> {
    let name = string_from_json(row.get("name"))?.trim().to_string();
    let role = string_from_json(row.get("role"))
        .map(|r| Role::from_label(&r))
        .unwrap_or(Role::Other);

    Some(IngredientRecord {
        id: string_from_json(row.get("id")).unwrap_or_else(|| format!("row-{}", idx)),
        name,
        role,
        category: string_from_json(row.get("category")).unwrap_or_else(|| "other".to_string()),
        cuisines: list_from_json(row.get("cuisine")),
        meal_slots: list_from_json(row.get("meal_types")),
        diet_tags: list_from_json(row.get("diet_tags")),
        allergens: list_from_json(row.get("allergens")),
        macros: Macros {
            protein: number_from_json(row.get("protein")),
            carbs: number_from_json(row.get("carbs")),
            fat: number_from_json(row.get("fat")),
            sugar: number_from_json(row.get("sugar")),
            fiber: number_from_json(row.get("fiber")),
            kcal: number_from_json(row.get("kcal")),
        },
        price_per_serving: number_from_json(row.get("price_per_serving")),
    })
}

/// Joins id-based pairing rows to lowercase names, keeping `pairing_score >= min_score`.
pub fn pairings_from_rows(rows: &[Value], catalog: &[IngredientRecord], min_score: i64) -> PairingSet {
    let id_to_name: HashMap<&str, String> = catalog
        .iter()
        .map(|r| (r.id.as_str(), r.name_key()))
        .collect();

    let mut pairings = PairingSet::default();
    for row in rows {
        let score = number_from_json(row.get("pairing_score")) as i64;
        if score < min_score {
            continue;
        }
        let a = string_from_json(row.get("ingredient_a"));
        let b = string_from_json(row.get("ingredient_b"));
        if let (Some(a), Some(b)) = (a, b) {
            if let (Some(name_a), Some(name_b)) = (id_to_name.get(a.as_str()), id_to_name.get(b.as_str())) {
                pairings.insert(name_a, name_b);
            }
        }
    }
    pairings
}
