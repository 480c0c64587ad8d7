use std::fmt::Write as _;

use bitburner_core::core_api::bitnode_catalog::bitnode_name;
use bitburner_core::core_api::{
    AugmentationStatus, BreakdownEntry, Engine, HealthField, HealthRecord, MultiplierRecord,
    SkillRecord, StateManager, StatusKind,
};
use bitburner_core::model::SaveModel;
use serde_json::{Map as JsonMap, Value as JsonValue};

const FIELD_COL_WIDTH: usize = 28;
const NUMBER_COL_WIDTH: usize = 12;
const NAME_COL_WIDTH: usize = 44;
const MISMATCH_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonStyle {
    #[default]
    CanonicalV1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextRenderOptions {
    /// Adds per-source breakdown lines and unowned augmentations.
    pub verbose: bool,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FieldSelection {
    pub summary: bool,
    pub multipliers: bool,
    pub skills: bool,
    pub health: bool,
    pub augmentations: bool,
}

impl FieldSelection {
    pub fn all() -> Self {
        Self {
            summary: true,
            multipliers: true,
            skills: true,
            health: true,
            augmentations: true,
        }
    }

    pub fn is_any_selected(&self) -> bool {
        self.summary || self.multipliers || self.skills || self.health || self.augmentations
    }
}

/// One catalog augmentation the player owns in some form.
#[derive(Debug, Clone, PartialEq)]
pub struct AugmentationRow {
    pub key: String,
    pub name: String,
    pub status: AugmentationStatus,
}

pub fn augmentation_rows(engine: &Engine, model: &SaveModel, include_unowned: bool) -> Vec<AugmentationRow> {
    engine
        .catalog()
        .iter()
        .map(|def| AugmentationRow {
            key: def.key.clone(),
            name: def.name.clone(),
            status: engine.status(model, &def.key),
        })
        .filter(|row| include_unowned || row.status.state != StatusKind::None)
        .collect()
}

/// Owned names the catalog cannot resolve, in save order.
pub fn unrecognized_augmentations(engine: &Engine, model: &SaveModel) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for owned in model
        .player
        .augmentations
        .iter()
        .chain(model.player.queued_augmentations.iter())
    {
        if engine.catalog().resolve(&owned.name).is_none() && !out.contains(&owned.name) {
            out.push(owned.name.clone());
        }
    }
    out
}

pub fn render_json_full(engine: &Engine, state: &StateManager, style: JsonStyle) -> JsonValue {
    render_json_selected(engine, state, &FieldSelection::all(), style)
}

pub fn render_json_selected(
    engine: &Engine,
    state: &StateManager,
    fields: &FieldSelection,
    style: JsonStyle,
) -> JsonValue {
    match style {
        JsonStyle::CanonicalV1 => JsonValue::Object(selected_json(engine, state, fields)),
    }
}

pub fn render_text(engine: &Engine, state: &StateManager, options: TextRenderOptions) -> String {
    render_text_selected(engine, state, &FieldSelection::all(), options)
}

pub fn render_text_selected(
    engine: &Engine,
    state: &StateManager,
    fields: &FieldSelection,
    options: TextRenderOptions,
) -> String {
    let model = state.working();
    let mut out = String::new();
    let mut sections = 0;
    let mut separate = |out: &mut String| {
        if sections > 0 {
            writeln!(out).expect("writing to String cannot fail");
        }
        sections += 1;
    };

    if fields.summary {
        separate(&mut out);
        write_summary(&mut out, engine, state);
    }
    if fields.skills {
        separate(&mut out);
        write_skill_table(&mut out, &engine.levels(model), options);
    }
    if fields.health {
        separate(&mut out);
        write_health_table(&mut out, &engine.health(model), options);
    }
    if fields.multipliers {
        separate(&mut out);
        write_multiplier_table(&mut out, &engine.multipliers(model), options);
    }
    if fields.augmentations {
        separate(&mut out);
        write_augmentation_table(&mut out, engine, model, options);
    }
    out
}

fn selected_json(
    engine: &Engine,
    state: &StateManager,
    fields: &FieldSelection,
) -> JsonMap<String, JsonValue> {
    let model = state.working();
    let mut out = JsonMap::new();

    if fields.summary {
        out.insert("summary".to_string(), summary_to_json(engine, state));
    }
    if fields.skills {
        out.insert("skills".to_string(), skills_to_json(&engine.levels(model)));
    }
    if fields.health {
        out.insert("health".to_string(), health_to_json(&engine.health(model)));
    }
    if fields.multipliers {
        out.insert(
            "multipliers".to_string(),
            multipliers_to_json(&engine.multipliers(model)),
        );
    }
    if fields.augmentations {
        out.insert(
            "augmentations".to_string(),
            augmentations_to_json(engine, model),
        );
    }
    out
}

pub fn summary_to_json(engine: &Engine, state: &StateManager) -> JsonValue {
    let model = state.working();
    let player = &model.player;
    let mut out = JsonMap::new();

    out.insert("bitnode".to_string(), JsonValue::from(player.bit_node));
    out.insert(
        "bitnode_name".to_string(),
        bitnode_name(player.bit_node).map_or(JsonValue::Null, JsonValue::from),
    );
    out.insert("money".to_string(), json_number(player.money));
    out.insert(
        "hp".to_string(),
        pair_json("current", player.hp.current, "max", player.hp.max),
    );
    let skills: JsonMap<String, JsonValue> = player
        .skills
        .iter()
        .map(|(skill, level)| (skill.key().to_string(), json_number(Some(level))))
        .collect();
    out.insert("skills".to_string(), JsonValue::Object(skills));
    out.insert(
        "source_files".to_string(),
        JsonValue::Array(
            player
                .source_files
                .iter()
                .map(|(id, level)| {
                    let mut m = JsonMap::new();
                    m.insert("id".to_string(), JsonValue::from(id));
                    m.insert("level".to_string(), JsonValue::from(level));
                    JsonValue::Object(m)
                })
                .collect(),
        ),
    );
    out.insert(
        "installed_augmentations".to_string(),
        JsonValue::from(player.augmentations.len()),
    );
    out.insert(
        "queued_augmentations".to_string(),
        JsonValue::from(player.queued_augmentations.len()),
    );
    out.insert(
        "unrecognized_augmentations".to_string(),
        JsonValue::from(unrecognized_augmentations(engine, model).len()),
    );
    out.insert("exploits".to_string(), JsonValue::from(player.exploits.len()));
    out.insert("servers".to_string(), JsonValue::from(model.servers.len()));
    out.insert(
        "changed_sections".to_string(),
        JsonValue::Array(
            state
                .changed_sections()
                .into_iter()
                .map(|name| JsonValue::from(name.key()))
                .collect(),
        ),
    );
    out.insert(
        "transport".to_string(),
        JsonValue::from(state.transport().as_str()),
    );
    JsonValue::Object(out)
}

pub fn multipliers_to_json(records: &[MultiplierRecord]) -> JsonValue {
    JsonValue::Array(
        records
            .iter()
            .map(|r| {
                let mut m = JsonMap::new();
                m.insert("field".to_string(), JsonValue::from(r.field.key()));
                m.insert("saved".to_string(), json_number(Some(r.saved_value)));
                m.insert(
                    "calculated".to_string(),
                    json_number(Some(r.calculated_value)),
                );
                m.insert("breakdown".to_string(), breakdown_to_json(&r.breakdown));
                JsonValue::Object(m)
            })
            .collect(),
    )
}

pub fn skills_to_json(records: &[SkillRecord]) -> JsonValue {
    JsonValue::Array(
        records
            .iter()
            .map(|r| {
                let mut m = JsonMap::new();
                m.insert("skill".to_string(), JsonValue::from(r.skill.key()));
                m.insert("experience".to_string(), json_number(Some(r.experience)));
                m.insert("saved".to_string(), json_number(Some(r.saved)));
                m.insert("calculated".to_string(), json_number(Some(r.calculated)));
                m.insert("breakdown".to_string(), breakdown_to_json(&r.breakdown));
                JsonValue::Object(m)
            })
            .collect(),
    )
}

pub fn health_to_json(records: &[HealthRecord]) -> JsonValue {
    JsonValue::Array(
        records
            .iter()
            .map(|r| {
                let mut m = JsonMap::new();
                m.insert("field".to_string(), JsonValue::from(r.field.key()));
                m.insert("saved".to_string(), json_number(Some(r.saved)));
                m.insert("calculated".to_string(), json_number(Some(r.calculated)));
                m.insert("breakdown".to_string(), breakdown_to_json(&r.breakdown));
                JsonValue::Object(m)
            })
            .collect(),
    )
}

pub fn augmentations_to_json(engine: &Engine, model: &SaveModel) -> JsonValue {
    let owned: Vec<JsonValue> = augmentation_rows(engine, model, false)
        .into_iter()
        .map(|row| {
            let mut m = JsonMap::new();
            m.insert("key".to_string(), JsonValue::from(row.key));
            m.insert("name".to_string(), JsonValue::from(row.name));
            m.insert(
                "state".to_string(),
                JsonValue::from(row.status.state.as_str()),
            );
            m.insert(
                "installed_level".to_string(),
                row.status.installed_level.map_or(JsonValue::Null, JsonValue::from),
            );
            m.insert(
                "queued_level".to_string(),
                row.status.queued_level.map_or(JsonValue::Null, JsonValue::from),
            );
            JsonValue::Object(m)
        })
        .collect();

    let mut out = JsonMap::new();
    out.insert("owned".to_string(), JsonValue::Array(owned));
    out.insert(
        "unrecognized".to_string(),
        JsonValue::Array(
            unrecognized_augmentations(engine, model)
                .into_iter()
                .map(JsonValue::from)
                .collect(),
        ),
    );
    JsonValue::Object(out)
}

fn breakdown_to_json(entries: &[BreakdownEntry]) -> JsonValue {
    JsonValue::Array(
        entries
            .iter()
            .map(|e| {
                let mut m = JsonMap::new();
                m.insert("label".to_string(), JsonValue::from(e.label.clone()));
                m.insert("factor".to_string(), json_number(Some(e.factor)));
                JsonValue::Object(m)
            })
            .collect(),
    )
}

fn pair_json(a: &str, av: f64, b: &str, bv: f64) -> JsonValue {
    let mut m = JsonMap::new();
    m.insert(a.to_string(), json_number(Some(av)));
    m.insert(b.to_string(), json_number(Some(bv)));
    JsonValue::Object(m)
}

// Integral values render without a fraction, matching the save encoding.
fn json_number(value: Option<f64>) -> JsonValue {
    match value {
        Some(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < 9.0e15 => {
            JsonValue::from(v as i64)
        }
        Some(v) => serde_json::Number::from_f64(v).map_or(JsonValue::Null, JsonValue::Number),
        None => JsonValue::Null,
    }
}

fn write_summary(out: &mut String, engine: &Engine, state: &StateManager) {
    let model = state.working();
    let player = &model.player;

    writeln!(out, " ::: Summary :::").expect("writing to String cannot fail");
    let bitnode = match bitnode_name(player.bit_node) {
        Some(name) => format!("{} ({name})", player.bit_node),
        None => player.bit_node.to_string(),
    };
    writeln!(out, "  BitNode: {bitnode}").expect("writing to String cannot fail");
    let money = player.money.map_or_else(|| "-".to_string(), format_money);
    writeln!(out, "  Money: {money}").expect("writing to String cannot fail");
    writeln!(
        out,
        "  HP: {} / {}",
        format_level(player.hp.current),
        format_level(player.hp.max)
    )
    .expect("writing to String cannot fail");

    let skills: Vec<String> = player
        .skills
        .iter()
        .map(|(skill, level)| format!("{} {}", skill.label(), format_level(level)))
        .collect();
    writeln!(out, "  Skills: {}", skills.join(", ")).expect("writing to String cannot fail");

    let source_files: Vec<String> = player
        .source_files
        .iter()
        .map(|(id, level)| format!("SF{id}.{level}"))
        .collect();
    writeln!(
        out,
        "  Source-Files: {}",
        if source_files.is_empty() {
            "none".to_string()
        } else {
            source_files.join(", ")
        }
    )
    .expect("writing to String cannot fail");
    writeln!(
        out,
        "  Augmentations: {} installed, {} queued",
        player.augmentations.len(),
        player.queued_augmentations.len()
    )
    .expect("writing to String cannot fail");

    let unrecognized = unrecognized_augmentations(engine, model);
    if !unrecognized.is_empty() {
        writeln!(out, "  Unrecognized: {}", unrecognized.join(", "))
            .expect("writing to String cannot fail");
    }

    let changed: Vec<&str> = state
        .changed_sections()
        .into_iter()
        .map(|name| name.key())
        .collect();
    writeln!(
        out,
        "  Changed sections: {}",
        if changed.is_empty() {
            "none".to_string()
        } else {
            changed.join(", ")
        }
    )
    .expect("writing to String cannot fail");
}

fn write_skill_table(out: &mut String, records: &[SkillRecord], options: TextRenderOptions) {
    writeln!(out, " ::: Skills :::").expect("writing to String cannot fail");
    write_header(out, "Skill", "Saved", "Calculated");
    for r in records {
        write_row(
            out,
            r.skill.label(),
            &format_level(r.saved),
            &format_level(r.calculated),
            r.saved != r.calculated,
        );
        if options.verbose {
            writeln!(
                out,
                "      {:<w$}{:>n$}",
                "experience",
                format_level(r.experience),
                w = FIELD_COL_WIDTH - 4,
                n = NUMBER_COL_WIDTH
            )
            .expect("writing to String cannot fail");
            write_breakdown(out, &r.breakdown);
        }
    }
}

fn write_health_table(out: &mut String, records: &[HealthRecord], options: TextRenderOptions) {
    writeln!(out, " ::: Health :::").expect("writing to String cannot fail");
    write_header(out, "Field", "Saved", "Calculated");
    for r in records {
        let label = match r.field {
            HealthField::Current => "Current HP",
            HealthField::Max => "Max HP",
        };
        write_row(
            out,
            label,
            &format_level(r.saved),
            &format_level(r.calculated),
            r.saved != r.calculated,
        );
        if options.verbose {
            write_breakdown(out, &r.breakdown);
        }
    }
}

fn write_multiplier_table(
    out: &mut String,
    records: &[MultiplierRecord],
    options: TextRenderOptions,
) {
    writeln!(out, " ::: Multipliers :::").expect("writing to String cannot fail");
    write_header(out, "Field", "Saved", "Calculated");
    for r in records {
        write_row(
            out,
            r.field.label(),
            &format_factor(r.saved_value),
            &format_factor(r.calculated_value),
            (r.saved_value - r.calculated_value).abs()
                > MISMATCH_TOLERANCE * r.calculated_value.abs().max(1.0),
        );
        if options.verbose {
            write_breakdown(out, &r.breakdown);
        }
    }
}

fn write_augmentation_table(
    out: &mut String,
    engine: &Engine,
    model: &SaveModel,
    options: TextRenderOptions,
) {
    writeln!(out, " ::: Augmentations :::").expect("writing to String cannot fail");
    let rows = augmentation_rows(engine, model, options.verbose);
    if rows.is_empty() {
        writeln!(out, "  none").expect("writing to String cannot fail");
    }
    for row in rows {
        let levels = match (row.status.installed_level, row.status.queued_level) {
            (Some(i), Some(q)) if q > i => format!("{i} (queued to {q})"),
            (Some(i), _) => i.to_string(),
            (None, Some(q)) => q.to_string(),
            (None, None) => String::new(),
        };
        let line = format!(
            "  {:<w$}{:<10}{}",
            fit_column(&row.name, NAME_COL_WIDTH - 2),
            row.status.state.as_str(),
            levels,
            w = NAME_COL_WIDTH
        );
        writeln!(out, "{}", line.trim_end()).expect("writing to String cannot fail");
    }
    for name in unrecognized_augmentations(engine, model) {
        let line = format!(
            "  {:<w$}{}",
            fit_column(&name, NAME_COL_WIDTH - 2),
            "unrecognized",
            w = NAME_COL_WIDTH
        );
        writeln!(out, "{line}").expect("writing to String cannot fail");
    }
}

fn write_header(out: &mut String, first: &str, second: &str, third: &str) {
    writeln!(
        out,
        "  {:<w$}{:>n$}{:>n$}",
        first,
        second,
        third,
        w = FIELD_COL_WIDTH,
        n = NUMBER_COL_WIDTH
    )
    .expect("writing to String cannot fail");
}

fn write_row(out: &mut String, label: &str, saved: &str, calculated: &str, differs: bool) {
    let line = format!(
        "  {:<w$}{:>n$}{:>n$} {}",
        fit_column(label, FIELD_COL_WIDTH - 1),
        saved,
        calculated,
        if differs { "*" } else { "" },
        w = FIELD_COL_WIDTH,
        n = NUMBER_COL_WIDTH
    );
    writeln!(out, "{}", line.trim_end()).expect("writing to String cannot fail");
}

fn write_breakdown(out: &mut String, entries: &[BreakdownEntry]) {
    for entry in entries {
        writeln!(
            out,
            "      {:<w$}x{}",
            fit_column(&entry.label, FIELD_COL_WIDTH + NUMBER_COL_WIDTH - 4),
            format_factor(entry.factor),
            w = FIELD_COL_WIDTH + NUMBER_COL_WIDTH
        )
        .expect("writing to String cannot fail");
    }
}

fn fit_column(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    if width <= 3 {
        return value.chars().take(width).collect();
    }

    let mut out = String::with_capacity(width);
    for ch in value.chars().take(width - 3) {
        out.push(ch);
    }
    out.push_str("...");
    out
}

fn format_factor(value: f64) -> String {
    format!("{value:.4}")
}

fn format_level(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 9.0e15 {
        format_number_with_commas(value as i64)
    } else {
        format!("{value:.2}")
    }
}

/// Formats a money amount as `$1,234.50`, rounded to the cent. Whole
/// amounts drop the cents; negative amounts read `-$0.50`.
fn format_money(value: f64) -> String {
    if !value.is_finite() {
        return format!("${value}");
    }
    let cents = (value.abs() * 100.0).round();
    let sign = if value < 0.0 && cents > 0.0 { "-" } else { "" };
    if cents >= 9.0e17 {
        return format!("{sign}${:e}", value.abs());
    }
    let cents = cents as i64;
    let whole = format_number_with_commas(cents / 100);
    match cents % 100 {
        0 => format!("{sign}${whole}"),
        rest => format!("{sign}${whole}.{rest:02}"),
    }
}

fn format_number_with_commas(n: i64) -> String {
    if n < 0 {
        return format!("-{}", format_number_with_commas(-n));
    }
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    for (i, c) in s.chars().enumerate() {
        if i > 0 && (s.len() - i).is_multiple_of(3) {
            result.push(',');
        }
        result.push(c);
    }
    result
}
