//! nutrilabel MCP Server Implementation
//!
//! Implements the MCP server with the catalogue, cart, recipe and report tools.
//! One service value serves one connection and owns that session's cart.

use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::cart::Cart;
use crate::config::Config;
use crate::db::Database;
use crate::error::ValidationError;
use crate::tools::cart as cart_tools;
use crate::tools::catalogue;
use crate::tools::recipes;
use crate::tools::reports;
use crate::tools::status::StatusTracker;

/// nutrilabel MCP Service
#[derive(Clone)]
pub struct NutrilabelService {
    status_tracker: Arc<Mutex<StatusTracker>>,
    database: Database,
    config: Arc<Config>,
    /// Working recipe for this session
    cart: Arc<Mutex<Cart>>,
    tool_router: ToolRouter<NutrilabelService>,
}

impl NutrilabelService {
    pub fn new(config: Config, database: Database) -> Self {
        Self {
            status_tracker: Arc::new(Mutex::new(StatusTracker::new(config.database_path.clone()))),
            database,
            config: Arc::new(config),
            cart: Arc::new(Mutex::new(Cart::new())),
            tool_router: Self::tool_router(),
        }
    }
}

fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

fn invalid(e: ValidationError) -> McpError {
    McpError::invalid_params(e.to_string(), None)
}

fn not_found(what: &str, key: impl Serialize) -> Result<CallToolResult, McpError> {
    json_result(&serde_json::json!({ "error": format!("{} not found", what), "key": key }))
}

// ============================================================================
// Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListIngredientsParams {
    /// Sort key: "code" (default) or "name"
    pub order_by: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetIngredientParams {
    /// Catalogue code (case-insensitive)
    pub code: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CartAddParams {
    /// Catalogue code (case-insensitive)
    pub code: String,
    /// Quantity in `unit` as typed, e.g. "250" or "0,5"; zero or less is ignored
    pub quantity: String,
    /// Unit: "g" (default), "kg" or "mg"
    pub unit: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CartRemoveParams {
    /// Zero-based line position as shown by cart_view
    pub index: usize,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CartSetServingParams {
    /// Serving size in grams; omit or 0 to unset
    pub grams: Option<f64>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SaveRecipeParams {
    /// Recipe name
    pub name: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetRecipeParams {
    /// Recipe ID
    pub id: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ExportRecipeSheetParams {
    /// Title printed on the sheet; blank prints "Untitled recipe"
    pub name: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ExportSavedRecipeSheetParams {
    /// Recipe ID
    pub id: i64,
    /// Optional serving size in grams for the per-serving table
    pub serving_grams: Option<f64>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ImportCatalogueParams {
    /// Full path to the catalogue export (semicolon- or comma-separated, header row required)
    pub file_path: String,
}

// ============================================================================
// Tool Implementations
// ============================================================================

#[tool_router]
impl NutrilabelService {
    // --- Status ---

    #[tool(description = "Get the current status of the nutrilabel service including build info, database status, catalogue size and process information")]
    async fn service_status(&self) -> Result<CallToolResult, McpError> {
        let tracker = self.status_tracker.lock().await;
        let status = tracker.get_status(&self.database);
        json_result(&status)
    }

    #[tool(description = "Get step-by-step instructions for composing a recipe and reading its nutrition facts. Call this when starting a session or when unsure how to use the cart tools.")]
    fn composer_instructions(&self) -> Result<CallToolResult, McpError> {
        use crate::tools::status::COMPOSER_INSTRUCTIONS;
        Ok(CallToolResult::success(vec![Content::text(COMPOSER_INSTRUCTIONS)]))
    }

    // --- Catalogue ---

    #[tool(description = "List catalogue ingredients (code, name, supplier, energy per 100 g) ordered by code or name")]
    fn list_ingredients(&self, Parameters(p): Parameters<ListIngredientsParams>) -> Result<CallToolResult, McpError> {
        let result = catalogue::list_ingredients(&self.database, p.order_by.as_deref())
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Get the full datasheet of one ingredient, including the nine nutrients per 100 g")]
    fn get_ingredient(&self, Parameters(p): Parameters<GetIngredientParams>) -> Result<CallToolResult, McpError> {
        let result = catalogue::get_ingredient(&self.database, &p.code)
            .map_err(|e| McpError::internal_error(e, None))?;
        match result {
            Some(item) => json_result(&item),
            None => not_found("Ingredient", &p.code),
        }
    }

    #[tool(description = "Import or update the ingredient catalogue from a delimited export of the master sheet. Rows are upserted by code in one transaction.")]
    fn import_catalogue(&self, Parameters(p): Parameters<ImportCatalogueParams>) -> Result<CallToolResult, McpError> {
        let result = catalogue::import_catalogue(&self.database, &p.file_path)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    // --- Cart ---

    #[tool(description = "Add a quantity of an ingredient to the session cart. Adding a code already in the cart adds to its grams.")]
    async fn cart_add(&self, Parameters(p): Parameters<CartAddParams>) -> Result<CallToolResult, McpError> {
        let mut cart = self.cart.lock().await;
        let result = cart_tools::cart_add(&self.database, &mut cart, &p.code, &p.quantity, p.unit.as_deref())
            .map_err(|e| McpError::internal_error(e, None))?
            .map_err(invalid)?;
        json_result(&result)
    }

    #[tool(description = "Remove the cart line at a zero-based index. An index past the end does nothing.")]
    async fn cart_remove(&self, Parameters(p): Parameters<CartRemoveParams>) -> Result<CallToolResult, McpError> {
        let mut cart = self.cart.lock().await;
        let result = cart_tools::cart_remove(&self.database, &mut cart, p.index)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Empty the session cart and unset the serving size")]
    async fn cart_clear(&self) -> Result<CallToolResult, McpError> {
        let mut cart = self.cart.lock().await;
        let result = cart_tools::cart_clear(&self.database, &mut cart)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Set the serving size in grams used for per-serving nutrition; omit to unset")]
    async fn cart_set_serving(&self, Parameters(p): Parameters<CartSetServingParams>) -> Result<CallToolResult, McpError> {
        let mut cart = self.cart.lock().await;
        let result = cart_tools::cart_set_serving(&self.database, &mut cart, p.grams)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Show the cart: lines, total weight, nutrition per 100 g and per serving, and any codes missing from the catalogue")]
    async fn cart_view(&self) -> Result<CallToolResult, McpError> {
        let cart = self.cart.lock().await;
        let result = cart_tools::cart_view(&self.database, &cart)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    // --- Recipes ---

    #[tool(description = "Save the cart as a named recipe. All lines are written in one transaction. The cart is not cleared.")]
    async fn save_recipe(&self, Parameters(p): Parameters<SaveRecipeParams>) -> Result<CallToolResult, McpError> {
        let mut cart = self.cart.lock().await;
        let result = recipes::save_recipe(&self.database, &mut cart, &p.name)
            .map_err(|e| McpError::internal_error(e, None))?
            .map_err(invalid)?;
        json_result(&result)
    }

    #[tool(description = "Get a saved recipe with its lines and nutrition per 100 g")]
    fn get_recipe(&self, Parameters(p): Parameters<GetRecipeParams>) -> Result<CallToolResult, McpError> {
        let result = recipes::get_recipe(&self.database, p.id)
            .map_err(|e| McpError::internal_error(e, None))?;
        match result {
            Some(recipe) => json_result(&recipe),
            None => not_found("Recipe", p.id),
        }
    }

    #[tool(description = "List saved recipes, newest first")]
    fn list_recipes(&self) -> Result<CallToolResult, McpError> {
        let result = recipes::list_recipes(&self.database)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    // --- Reports ---

    #[tool(description = "Write a PDF recipe sheet for the current cart (ingredients, total weight, nutrition per 100 g and per serving)")]
    async fn export_recipe_sheet(&self, Parameters(p): Parameters<ExportRecipeSheetParams>) -> Result<CallToolResult, McpError> {
        let cart = self.cart.lock().await;
        let result = reports::export_cart_sheet(&self.database, &self.config, &cart, p.name.as_deref().unwrap_or(""))
            .map_err(|e| McpError::internal_error(e, None))?
            .map_err(invalid)?;
        json_result(&result)
    }

    #[tool(description = "Write a PDF recipe sheet for a saved recipe")]
    fn export_saved_recipe_sheet(&self, Parameters(p): Parameters<ExportSavedRecipeSheetParams>) -> Result<CallToolResult, McpError> {
        let result = reports::export_saved_recipe_sheet(&self.database, &self.config, p.id, p.serving_grams)
            .map_err(|e| McpError::internal_error(e, None))?;
        match result {
            Some(response) => json_result(&response),
            None => not_found("Recipe", p.id),
        }
    }
}

// ============================================================================
// Server Handler
// ============================================================================

#[tool_handler]
impl ServerHandler for NutrilabelService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: crate::build_info::NAME.into(),
                version: crate::build_info::VERSION.into(),
                title: Some("Recipe Nutrition Composer".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "nutrilabel - compose recipes from a per-100 g ingredient catalogue and derive nutrition facts. \
                 IMPORTANT: Call composer_instructions first. \
                 Catalogue: list_ingredients, get_ingredient, import_catalogue. \
                 Cart: cart_add, cart_remove, cart_clear, cart_set_serving, cart_view. \
                 Recipes: save_recipe, get_recipe, list_recipes. \
                 Sheets: export_recipe_sheet, export_saved_recipe_sheet. \
                 Status: service_status."
                    .into(),
            ),
        }
    }
}
