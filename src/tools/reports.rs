//! Recipe sheet generation
//!
//! Renders a read-only projection of a recipe (lines, total weight, per-100g
//! and per-serving nutrition) to an A4 PDF.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use printpdf::image_crate::GenericImageView;
use printpdf::*;
use serde::Serialize;

use crate::cart::{Cart, LineItem};
use crate::catalogue::SqliteCatalogue;
use crate::config::Config;
use crate::db::Database;
use crate::error::ValidationError;
use crate::models::Nutrition;
use crate::nutrition::{self, AggregateResult, PortionResult};
use crate::recipes;

// ============================================================================
// Layout Constants
// ============================================================================

const COLOR_TITLE: (u8, u8, u8) = (31, 78, 121);
const COLOR_BLACK: (u8, u8, u8) = (0, 0, 0);
const COLOR_GRAY: (u8, u8, u8) = (120, 120, 120);
const COLOR_RULE: (u8, u8, u8) = (200, 200, 200);

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN_LEFT: f32 = 15.0;
const MARGIN_RIGHT: f32 = 195.0;
const MARGIN_BOTTOM: f32 = 20.0;
const ROW_HEIGHT: f32 = 7.0;

const COL_CODE_X: f32 = 135.0;
const COL_GRAMS_X: f32 = 165.0;
const COL_VALUE_X: f32 = 105.0;

const LOGO_WIDTH_MM: f32 = 35.0;
const MAX_NAME_CHARS: usize = 60;

pub const UNTITLED_RECIPE: &str = "Untitled recipe";

// ============================================================================
// Sheet Projection
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SheetLine {
    pub display_name: String,
    pub code: String,
    pub grams: f64,
}

/// Everything a recipe sheet shows. Built once, never mutated while rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecipeSheet {
    pub recipe_name: String,
    pub lines: Vec<SheetLine>,
    pub total_grams: f64,
    pub per_100g: Option<Nutrition>,
    pub per_serving: Option<PortionResult>,
}

impl RecipeSheet {
    pub fn new(
        recipe_name: &str,
        lines: &[LineItem],
        aggregate: Option<&AggregateResult>,
        portion: Option<&PortionResult>,
    ) -> Self {
        let lines: Vec<SheetLine> = lines
            .iter()
            .filter(|l| l.contributes())
            .map(|l| SheetLine {
                display_name: l.display_name.clone(),
                code: l.code.clone(),
                grams: l.grams,
            })
            .collect();
        let total_grams = match aggregate {
            Some(a) => a.total_grams,
            None => sum_grams(&lines),
        };

        Self {
            recipe_name: recipe_name.trim().to_string(),
            lines,
            total_grams,
            per_100g: aggregate.map(|a| a.per_100g),
            per_serving: portion.cloned(),
        }
    }

    pub fn title(&self) -> String {
        let name = if self.recipe_name.is_empty() {
            UNTITLED_RECIPE
        } else {
            self.recipe_name.as_str()
        };
        format!("Recipe: {}", name)
    }
}

fn sum_grams(lines: &[SheetLine]) -> f64 {
    crate::models::round2(lines.iter().map(|l| l.grams).sum())
}

/// Shorten a display name to fit the ingredient column
pub fn truncate_name(name: &str) -> String {
    if name.chars().count() <= MAX_NAME_CHARS {
        return name.to_string();
    }
    let kept: String = name.chars().take(MAX_NAME_CHARS - 3).collect();
    format!("{}...", kept)
}

/// File name for a recipe sheet: alphanumerics, space, `_` and `-` survive,
/// spaces become underscores.
pub fn sheet_file_name(recipe_name: &str) -> String {
    let safe: String = recipe_name
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '_' | '-'))
        .collect::<String>()
        .trim()
        .replace(' ', "_");
    let stem = if safe.is_empty() { "recipe" } else { safe.as_str() };
    format!("{}.pdf", stem)
}

// ============================================================================
// PDF Generation Helper Functions
// ============================================================================

fn rgb_to_printpdf(r: u8, g: u8, b: u8) -> Color {
    Color::Rgb(Rgb::new(
        r as f32 / 255.0,
        g as f32 / 255.0,
        b as f32 / 255.0,
        None,
    ))
}

fn add_text(
    layer: &PdfLayerReference,
    font: &IndirectFontRef,
    text: &str,
    x: Mm,
    y: Mm,
    size: f32,
    color: (u8, u8, u8),
) {
    layer.set_fill_color(rgb_to_printpdf(color.0, color.1, color.2));
    layer.use_text(text, size, x, y, font);
}

fn add_line(
    layer: &PdfLayerReference,
    x1: Mm,
    y1: Mm,
    x2: Mm,
    y2: Mm,
    color: (u8, u8, u8),
    width: f32,
) {
    layer.set_outline_color(rgb_to_printpdf(color.0, color.1, color.2));
    layer.set_outline_thickness(width);

    let line = Line {
        points: vec![
            (Point::new(x1, y1), false),
            (Point::new(x2, y2), false),
        ],
        is_closed: false,
    };
    layer.add_line(line);
}

/// Cursor over the current page; starts a new page when a block won't fit
struct SheetWriter<'d> {
    doc: &'d PdfDocumentReference,
    layer: PdfLayerReference,
    font: IndirectFontRef,
    font_bold: IndirectFontRef,
    y: f32,
    pages: usize,
}

impl<'d> SheetWriter<'d> {
    fn new(
        doc: &'d PdfDocumentReference,
        layer: PdfLayerReference,
        font: IndirectFontRef,
        font_bold: IndirectFontRef,
    ) -> Self {
        let writer = Self {
            doc,
            layer,
            font,
            font_bold,
            y: PAGE_HEIGHT - 20.0,
            pages: 1,
        };
        writer.footer();
        writer
    }

    fn footer(&self) {
        let label = format!("Generated by {} - page {}", crate::build_info::NAME, self.pages);
        add_text(&self.layer, &self.font, &label, Mm(PAGE_WIDTH / 2.0 - 25.0), Mm(10.0), 8.0, COLOR_GRAY);
    }

    fn ensure_space(&mut self, height: f32) {
        if self.y - height >= MARGIN_BOTTOM {
            return;
        }
        self.pages += 1;
        let (page, layer) = self.doc.add_page(
            Mm(PAGE_WIDTH),
            Mm(PAGE_HEIGHT),
            format!("Page {}", self.pages),
        );
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = PAGE_HEIGHT - 20.0;
        self.footer();
    }

    fn text(&self, text: &str, x: f32, size: f32, bold: bool, color: (u8, u8, u8)) {
        let font = if bold { &self.font_bold } else { &self.font };
        add_text(&self.layer, font, text, Mm(x), Mm(self.y), size, color);
    }

    fn heading(&mut self, text: &str) {
        self.ensure_space(ROW_HEIGHT * 3.0);
        self.text(text, MARGIN_LEFT, 12.0, true, COLOR_BLACK);
        self.y -= 8.0;
    }

    fn rule(&self) {
        let y = self.y - 2.0;
        add_line(&self.layer, Mm(MARGIN_LEFT), Mm(y), Mm(MARGIN_RIGHT), Mm(y), COLOR_RULE, 0.5);
    }

    /// One table row; `cells` are (x, text) pairs
    fn row(&mut self, cells: &[(f32, &str)], bold: bool) {
        self.ensure_space(ROW_HEIGHT);
        for (x, text) in cells {
            self.text(text, *x, 10.0, bold, COLOR_BLACK);
        }
        self.rule();
        self.y -= ROW_HEIGHT;
    }

    fn nutrition_table(&mut self, nutrition: &Nutrition) {
        for (label, value) in nutrition.labelled() {
            let value = format!("{:.2}", value);
            self.row(&[(MARGIN_LEFT, label), (COL_VALUE_X, value.as_str())], false);
        }
    }
}

fn draw_logo(layer: &PdfLayerReference, logo_path: &Path) -> Result<f32, String> {
    let bytes = std::fs::read(logo_path).map_err(|e| e.to_string())?;
    let dynamic_image = printpdf::image_crate::load_from_memory(&bytes).map_err(|e| e.to_string())?;
    let (width_px, height_px) = dynamic_image.dimensions();
    if width_px == 0 || height_px == 0 {
        return Err("empty image".to_string());
    }

    let dpi = width_px as f32 * 25.4 / LOGO_WIDTH_MM;
    let height_mm = height_px as f32 * 25.4 / dpi;
    let top = PAGE_HEIGHT - 12.0;

    let pdf_image = Image::from_dynamic_image(&dynamic_image);
    let transform = ImageTransform {
        translate_x: Some(Mm(MARGIN_LEFT)),
        translate_y: Some(Mm(top - height_mm)),
        dpi: Some(dpi),
        ..Default::default()
    };
    pdf_image.add_to_layer(layer.clone(), transform);

    Ok(height_mm + 12.0 + 6.0)
}

/// Render `sheet` to a PDF file at `output_path`.
///
/// A logo that cannot be read or decoded is skipped with a warning.
pub fn write_recipe_sheet(
    sheet: &RecipeSheet,
    output_path: &Path,
    logo_path: Option<&Path>,
) -> Result<(), String> {
    let title = sheet.title();
    let (doc, page1, layer1) = PdfDocument::new(&title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");

    let font = doc.add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| e.to_string())?;
    let font_bold = doc.add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| e.to_string())?;

    let layer = doc.get_page(page1).get_layer(layer1);
    let mut writer = SheetWriter::new(&doc, layer, font, font_bold);

    // Leave room below the logo so the title never overlaps it
    if let Some(logo_path) = logo_path {
        match draw_logo(&writer.layer, logo_path) {
            Ok(used) => writer.y = PAGE_HEIGHT - used - 6.0,
            Err(e) => tracing::warn!(path = %logo_path.display(), error = %e, "skipping recipe sheet logo"),
        }
    }

    // Title
    writer.text(&title, MARGIN_LEFT, 16.0, true, COLOR_TITLE);
    writer.y -= 8.0;
    let now = chrono::Local::now().format("%Y-%m-%d %H:%M").to_string();
    writer.text(&format!("Generated: {}", now), MARGIN_LEFT, 10.0, false, COLOR_GRAY);
    writer.y -= 10.0;

    // Ingredients
    writer.heading("Ingredients");
    writer.row(&[(MARGIN_LEFT, "Ingredient"), (COL_CODE_X, "Code"), (COL_GRAMS_X, "Grams")], true);
    for line in &sheet.lines {
        let name = truncate_name(&line.display_name);
        let grams = format!("{:.2}", line.grams);
        writer.row(
            &[(MARGIN_LEFT, name.as_str()), (COL_CODE_X, line.code.as_str()), (COL_GRAMS_X, grams.as_str())],
            false,
        );
    }
    let total = format!("{:.2}", sheet.total_grams);
    writer.row(&[(MARGIN_LEFT, "Total weight (g)"), (COL_GRAMS_X, total.as_str())], true);
    writer.y -= 6.0;

    if let Some(per_100g) = &sheet.per_100g {
        writer.heading("Nutrition information (per 100 g)");
        writer.nutrition_table(per_100g);
        writer.y -= 6.0;
    }

    if let Some(portion) = &sheet.per_serving {
        writer.heading(&format!("Nutrition information (per serving: {:.2} g)", portion.serving_grams));
        writer.nutrition_table(&portion.per_serving);
    }

    tracing::debug!(pages = writer.pages, "recipe sheet laid out");

    if let Some(parent) = output_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| e.to_string())?;
    }

    let file = File::create(output_path).map_err(|e| e.to_string())?;
    let mut buf = BufWriter::new(file);
    doc.save(&mut buf).map_err(|e| e.to_string())?;

    Ok(())
}

// ============================================================================
// Tools
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ExportSheetResponse {
    pub success: bool,
    pub file_path: String,
    pub title: String,
    pub line_count: usize,
    pub total_grams: f64,
    pub message: String,
}

fn export(config: &Config, sheet: &RecipeSheet) -> Result<ExportSheetResponse, String> {
    let path: PathBuf = config.reports_dir.join(sheet_file_name(&sheet.recipe_name));
    write_recipe_sheet(sheet, &path, config.logo_path.as_deref())?;

    tracing::info!(path = %path.display(), lines = sheet.lines.len(), "recipe sheet written");
    Ok(ExportSheetResponse {
        success: true,
        file_path: path.display().to_string(),
        title: sheet.title(),
        line_count: sheet.lines.len(),
        total_grams: sheet.total_grams,
        message: format!("Recipe sheet written with {} ingredient(s)", sheet.lines.len()),
    })
}

/// Render the session cart as a recipe sheet
pub fn export_cart_sheet(
    db: &Database,
    config: &Config,
    cart: &Cart,
    recipe_name: &str,
) -> Result<Result<ExportSheetResponse, ValidationError>, String> {
    if !cart.lines().iter().any(|l| l.contributes()) {
        return Ok(Err(ValidationError::NoValidLines));
    }

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let aggregate = nutrition::aggregate(cart.lines(), &SqliteCatalogue::new(&conn))
        .map_err(|e| format!("Failed to aggregate nutrition: {}", e))?;
    let portion = cart
        .serving_grams()
        .and_then(|g| nutrition::scale(aggregate.as_ref(), g));

    let sheet = RecipeSheet::new(recipe_name, cart.lines(), aggregate.as_ref(), portion.as_ref());
    export(config, &sheet).map(Ok)
}

/// Render a saved recipe as a recipe sheet, optionally with a serving size
pub fn export_saved_recipe_sheet(
    db: &Database,
    config: &Config,
    recipe_id: i64,
    serving_grams: Option<f64>,
) -> Result<Option<ExportSheetResponse>, String> {
    let Some(saved) = recipes::load(db, recipe_id)
        .map_err(|e| format!("Failed to load recipe: {}", e))?
    else {
        return Ok(None);
    };

    let lines = saved.line_items();
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let aggregate = nutrition::aggregate(&lines, &SqliteCatalogue::new(&conn))
        .map_err(|e| format!("Failed to aggregate nutrition: {}", e))?;
    let portion = serving_grams.and_then(|g| nutrition::scale(aggregate.as_ref(), g));

    let sheet = RecipeSheet::new(&saved.recipe.name, &lines, aggregate.as_ref(), portion.as_ref());
    export(config, &sheet).map(Some)
}
