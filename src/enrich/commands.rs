use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde_json::{Value, json};
use tempfile::NamedTempFile;

use crate::ui::prelude::{Level, emit};

use super::cli::{CheckArgs, EnrichArgs, EnrichCommands, PhraseArgs};
use super::coerce::records_from_value;
use super::config::EnrichConfig;
use super::model::{
    BrollCatalog, MotionRules, OverlayElement, Plan, SceneRecord, SfxCatalog, SubtitleEntry,
};
use super::phrase::{PhraseExtractor, PhraseOptions, extract_phrase};
use super::pipeline::{EnrichInputs, EnrichReport, enrich_plan};
use super::srt;
use super::timing::timing_warnings;

pub fn handle_enrich_command(command: EnrichCommands) -> Result<()> {
    match command {
        EnrichCommands::Enrich(args) => handle_enrich(args),
        EnrichCommands::Check(args) => handle_check(args),
        EnrichCommands::Phrase(args) => handle_phrase(args),
    }
}

fn canonicalize_existing(path: &Path) -> Result<PathBuf> {
    if !path.exists() {
        bail!("{} does not exist", path.display());
    }
    path.canonicalize()
        .with_context(|| format!("Failed to canonicalize path {}", path.display()))
}

fn read_json(path: &Path, what: &str) -> Result<Value> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {what} {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse {what} {} as JSON", path.display()))
}

fn load_plan(path: &Path) -> Result<Plan> {
    let path = canonicalize_existing(path)?;
    let contents = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read plan {}", path.display()))?;
    Plan::from_json_str(&contents).with_context(|| format!("Invalid plan {}", path.display()))
}

/// Optional inputs that fail to load are reported and treated as absent.
fn load_optional<T>(
    path: Option<&Path>,
    what: &str,
    load: impl FnOnce(&Path) -> Result<T>,
) -> Option<T> {
    let path = path?;
    match load(path) {
        Ok(value) => Some(value),
        Err(error) => {
            emit(
                Level::Warn,
                "enrich.input.skipped",
                &format!("Skipping {what}: {error:#}"),
                Some(json!({ "path": path.display().to_string() })),
            );
            None
        }
    }
}

fn load_motion_rules(path: &Path) -> Result<MotionRules> {
    match read_json(path, "motion rules")? {
        value @ Value::Object(_) => serde_json::from_value(value)
            .with_context(|| format!("Invalid motion rules {}", path.display())),
        _ => bail!("motion rules {} must be a JSON object", path.display()),
    }
}

fn load_subtitles(path: &Path) -> Result<Vec<SubtitleEntry>> {
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        return Ok(srt::entries_from_value(read_json(path, "subtitles")?));
    }
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read subtitles {}", path.display()))?;
    Ok(srt::parse_srt(&contents))
}

fn write_plan(path: &Path, plan: &Plan) -> Result<()> {
    let parent = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent)
        .with_context(|| format!("Failed to create output directory {}", parent.display()))?;

    let mut temp = NamedTempFile::new_in(parent).context("creating temporary plan file")?;
    serde_json::to_writer_pretty(&mut temp, plan).context("serializing enriched plan")?;
    writeln!(temp).context("writing enriched plan")?;
    temp.flush().context("flushing enriched plan")?;
    temp.persist(path)
        .with_context(|| format!("Failed to write plan to {}", path.display()))?;
    Ok(())
}

fn handle_enrich(args: EnrichArgs) -> Result<()> {
    let mut plan = load_plan(&args.plan)?;

    let scene_path = canonicalize_existing(&args.scene_map)?;
    let scene_records: Vec<SceneRecord> = records_from_value(
        read_json(&scene_path, "scene map")?,
        &["segments", "scenes"],
    );

    let mut config = match &args.config {
        Some(path) => EnrichConfig::load_from_path(path)?,
        None => EnrichConfig::load()?,
    };
    if let Some(threshold) = args.broll_threshold {
        config.broll_threshold = threshold;
        config = config.sanitized();
    }

    let broll_catalog = load_optional(args.broll_catalog.as_deref(), "B-roll catalog", |path| {
        read_json(path, "B-roll catalog").map(BrollCatalog::from_value)
    });
    let sfx_catalog = load_optional(args.sfx_catalog.as_deref(), "SFX catalog", |path| {
        read_json(path, "SFX catalog").map(SfxCatalog::from_value)
    });
    let motion_rules =
        load_optional(args.motion_rules.as_deref(), "motion rules", load_motion_rules);
    let overlays: Option<Vec<OverlayElement>> =
        load_optional(args.overlays.as_deref(), "overlay catalog", |path| {
            read_json(path, "overlay catalog")
                .map(|value| records_from_value(value, &["elements", "overlays", "items"]))
        });
    let subtitles = load_optional(args.subtitles.as_deref(), "subtitles", load_subtitles);

    emit(
        Level::Debug,
        "enrich.inputs.loaded",
        &format!(
            "{} segment(s), {} scene record(s)",
            plan.segments.len(),
            scene_records.len()
        ),
        None,
    );

    let inputs = EnrichInputs {
        scene_records: &scene_records,
        broll_catalog: broll_catalog.as_ref(),
        sfx_catalog: sfx_catalog.as_ref(),
        motion_rules: motion_rules.as_ref(),
        overlays: overlays.as_deref(),
        subtitles: subtitles.as_deref(),
    };
    let extractor = PhraseExtractor::new();
    let report = enrich_plan(&mut plan, &inputs, &config, &extractor);

    write_plan(&args.output, &plan)?;
    report_run(&report, &args.output);
    Ok(())
}

fn report_run(report: &EnrichReport, output: &Path) {
    emit(
        Level::Info,
        "enrich.plan.counts",
        &format!(
            "Segments: {total} ({skipped} without scene data), B-roll: {broll_scene} scene / {broll_highlight} highlight, Motion: {motion_scene} scene / {motion_highlight} highlight (budget {budget})",
            total = report.segments_total,
            skipped = report.segments_skipped,
            broll_scene = report.broll_from_scenes,
            broll_highlight = report.broll_from_highlights,
            motion_scene = report.motion_from_scenes,
            motion_highlight = report.motion_from_highlights,
            budget = report.motion_budget,
        ),
        None,
    );
    emit(
        Level::Info,
        "enrich.plan.highlights",
        &format!(
            "Highlights: {catalog} from overlays, {subtitles} from subtitles, {dropped} dropped at plan bounds, CTA {cta}",
            catalog = report.catalog_highlights,
            subtitles = report.subtitle_highlights,
            dropped = report.highlights_dropped,
            cta = if report.cta_appended { "added" } else { "unchanged" },
        ),
        None,
    );

    for warning in &report.warnings {
        emit(Level::Warn, "enrich.timing.warning", warning, None);
    }

    emit(
        Level::Success,
        "enrich.plan.written",
        &format!("Enriched plan written to {}", output.display()),
        serde_json::to_value(report).ok(),
    );
}

fn handle_check(args: CheckArgs) -> Result<()> {
    let plan = load_plan(&args.plan)?;
    let tolerance = args
        .tolerance
        .filter(|tolerance| tolerance.is_finite() && *tolerance >= 0.0)
        .unwrap_or(EnrichConfig::DEFAULT_TIMING_TOLERANCE);

    let warnings = timing_warnings(&plan.segments, tolerance);
    for warning in &warnings {
        emit(Level::Warn, "enrich.timing.warning", warning, None);
    }

    if warnings.is_empty() {
        emit(
            Level::Success,
            "enrich.check.ok",
            &format!(
                "{} segment(s) are contiguous within {tolerance:.2}s",
                plan.segments.len()
            ),
            None,
        );
    } else if args.strict {
        bail!("{} timing warning(s) found", warnings.len());
    }
    Ok(())
}

fn handle_phrase(args: PhraseArgs) -> Result<()> {
    let options = PhraseOptions {
        max_tokens: args.max_tokens.max(1),
        max_chars: args.max_chars,
    };
    emit(
        Level::Debug,
        "enrich.phrase.candidates",
        &format!(
            "Candidates: {:?}",
            PhraseExtractor::new().candidate_tokens(&args.text)
        ),
        None,
    );

    match extract_phrase(&args.text, options) {
        Some(phrase) => emit(
            Level::Success,
            "enrich.phrase.extracted",
            &phrase,
            Some(json!({ "phrase": phrase })),
        ),
        None => emit(
            Level::Warn,
            "enrich.phrase.none",
            "No meaningful phrase in the given text",
            None,
        ),
    }
    Ok(())
}
