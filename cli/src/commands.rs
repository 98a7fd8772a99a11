//! Interactive console commands
//!
//! Each input line is split with shlex and parsed with clap, the same way a
//! shell command line would be. Mutating preset commands persist the store
//! immediately.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use ffradar_core::memory::ProcessProvider;
use ffradar_core::{ActorId, AppConfig, AppConfigExt, ImportConflict, ImportOutcome, PresetError, Radar};
use ffradar_types::formatting::{format_address, format_color_hex, format_decimal};
use ffradar_types::{ActorFilter, ActorType, DisplayMode, Rgb};

use crate::presenter::{ActorSort, print_actor_list};

#[derive(Parser)]
#[command(version, about = "ffradar console")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scanner state and attached process
    Status,
    /// List tracked actors
    Actors {
        #[arg(long, value_enum, default_value_t = ActorSort::Scan)]
        sort: ActorSort,
    },
    /// Freeze actor updates; no argument toggles
    Pause {
        #[arg(action = ArgAction::Set)]
        enabled: Option<bool>,
    },
    /// Highlight an actor by hex id, or clear the highlight
    Select { id: Option<String> },
    /// Print the current overlay frame
    Frame,
    Presets {
        #[command(subcommand)]
        action: PresetAction,
    },
    Filters {
        #[command(subcommand)]
        action: FilterAction,
    },
    Config,
    Exit,
}

#[derive(Subcommand)]
pub enum PresetAction {
    List,
    /// Show the filters of a preset (the active one by default)
    Show { name: Option<String> },
    /// Make a preset active; no name deactivates presets
    Select { name: Option<String> },
    Add,
    Delete { name: String },
    Export {
        name: String,
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    Import {
        file: PathBuf,
        #[arg(long, value_enum, default_value_t = ConflictArg::Merge)]
        on_conflict: ConflictArg,
    },
    ShowOnlyMatching {
        #[arg(action = ArgAction::Set)]
        enabled: bool,
    },
}

#[derive(Subcommand)]
pub enum FilterAction {
    Add {
        #[arg(long = "type", value_parser = parse_actor_type)]
        actor_type: Option<ActorType>,
        #[arg(long)]
        npc_id: Option<u32>,
        #[arg(long, value_parser = parse_color)]
        color: Option<Rgb>,
        #[arg(long, value_parser = parse_display_mode)]
        mode: Option<DisplayMode>,
        /// Overlay label replacing the actor name
        #[arg(long)]
        label: Option<String>,
    },
    /// Change fields of an existing filter in place
    Edit {
        index: usize,
        #[command(flatten)]
        edit: FilterEdit,
    },
    /// Add a filter matching a tracked actor
    FromActor { id: String },
    Remove { index: usize },
    Move { from: usize, to: usize },
}

/// Field changes for `filters edit`. Unset flags leave the field alone.
#[derive(Debug, Default, Args)]
pub struct FilterEdit {
    #[arg(long = "type", value_parser = parse_actor_type, conflicts_with = "no_type")]
    pub actor_type: Option<ActorType>,
    /// Stop matching on actor type
    #[arg(long)]
    pub no_type: bool,
    #[arg(long, conflicts_with = "no_npc_id")]
    pub npc_id: Option<u32>,
    /// Stop matching on npc id
    #[arg(long)]
    pub no_npc_id: bool,
    /// Label text; also turns the label override on unless --override is given
    #[arg(long)]
    pub label: Option<String>,
    #[arg(long = "override", action = ArgAction::Set)]
    pub label_override: Option<bool>,
    #[arg(long, value_parser = parse_color)]
    pub color: Option<Rgb>,
    #[arg(long, value_parser = parse_display_mode)]
    pub mode: Option<DisplayMode>,
}

impl FilterEdit {
    pub fn apply(self, filter: &mut ActorFilter) {
        if let Some(actor_type) = self.actor_type {
            filter.match_type = actor_type;
            filter.use_match_type = true;
        }
        if self.no_type {
            filter.use_match_type = false;
        }
        if let Some(npc_id) = self.npc_id {
            filter.match_npc_id = npc_id;
            filter.use_match_npc_id = true;
        }
        if self.no_npc_id {
            filter.use_match_npc_id = false;
        }
        if let Some(label) = self.label {
            filter.description = label;
            filter.has_description_override = true;
        }
        if let Some(enabled) = self.label_override {
            filter.has_description_override = enabled;
        }
        if let Some(color) = self.color {
            filter.color = color;
        }
        if let Some(mode) = self.mode {
            filter.mode = mode;
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ConflictArg {
    Merge,
    KeepSeparate,
    Cancel,
}

impl From<ConflictArg> for ImportConflict {
    fn from(arg: ConflictArg) -> Self {
        match arg {
            ConflictArg::Merge => ImportConflict::Merge,
            ConflictArg::KeepSeparate => ImportConflict::KeepSeparate,
            ConflictArg::Cancel => ImportConflict::Cancel,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Argument parsers
// ═══════════════════════════════════════════════════════════════════════════

pub fn parse_actor_type(s: &str) -> Result<ActorType, String> {
    ActorType::ALL
        .iter()
        .copied()
        .find(|t| t.label().eq_ignore_ascii_case(s) || format!("{t:?}").eq_ignore_ascii_case(s))
        .ok_or_else(|| format!("unknown actor type `{s}`"))
}

pub fn parse_display_mode(s: &str) -> Result<DisplayMode, String> {
    match s.to_ascii_lowercase().as_str() {
        "close" => Ok(DisplayMode::WhenClose),
        "look" | "look-at" => Ok(DisplayMode::WhenLookingAt),
        "both" | "close-look-at" => Ok(DisplayMode::WhenCloseAndLookingAt),
        _ => Err(format!("unknown display mode `{s}` (close, look-at, both)")),
    }
}

/// `#RRGGBB` or `RRGGBB`
pub fn parse_color(s: &str) -> Result<Rgb, String> {
    let hex = s.trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return Err(format!("color `{s}` is not #RRGGBB"));
    }
    let channel = |i: usize| {
        u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| format!("color `{s}` is not #RRGGBB"))
    };
    Ok([channel(0)?, channel(2)?, channel(4)?])
}

pub fn parse_actor_id(s: &str) -> Result<ActorId, String> {
    let hex = s.trim_start_matches("0x").trim_start_matches("0X");
    u32::from_str_radix(hex, 16)
        .map(ActorId)
        .map_err(|_| format!("error: actor id `{s}` is not hex\n"))
}

// ═══════════════════════════════════════════════════════════════════════════
// Dispatch
// ═══════════════════════════════════════════════════════════════════════════

/// Run one console line. Returns true when the console should exit.
pub fn respond<P: ProcessProvider>(
    line: &str,
    radar: &mut Radar<P>,
    config: &mut AppConfig,
) -> Result<bool, String> {
    let mut args = shlex::split(line).ok_or("error: Invalid quoting")?;
    args.insert(0, "ffradar".to_string());
    let cli = Cli::try_parse_from(args).map_err(|e| e.to_string())?;

    match cli.command {
        Some(Commands::Status) => show_status(radar),
        Some(Commands::Actors { sort }) => {
            print_actor_list(radar.registry(), config.overlay.european_number_format, sort)
        }
        Some(Commands::Pause { enabled }) => {
            let paused = enabled.unwrap_or(!radar.is_paused());
            radar.set_paused(paused);
            println!("Actor updates {}", if paused { "paused" } else { "running" });
        }
        Some(Commands::Select { id }) => {
            let id = id.as_deref().map(parse_actor_id).transpose()?;
            if !radar.select_actor(id) && id.is_some() {
                return Err("error: no such actor\n".to_string());
            }
        }
        Some(Commands::Frame) => show_frame(radar, config.overlay.european_number_format),
        Some(Commands::Presets { action }) => preset_command(action, radar, config)?,
        Some(Commands::Filters { action }) => filter_command(action, radar, config)?,
        Some(Commands::Config) => show_settings(config),
        Some(Commands::Exit) => return Ok(true),
        None => {}
    }
    Ok(false)
}

fn show_status<P: ProcessProvider>(radar: &Radar<P>) {
    println!("Scanner: {}", radar.scanner_state());
    if radar.is_paused() {
        println!("Updates: paused");
    }
    if let Some(process) = radar.scanner().process() {
        println!("Process: {} (pid {})", process.name, process.pid);
    }
    if let Some(paths) = radar.scanner().paths() {
        println!("Actor table: {}", format_address(paths.actor_table));
        println!("Camera:      {}", format_address(paths.camera));
    }
    println!("Actors: {}", radar.registry().len());
    match radar.presets().active_name() {
        Some(name) => println!("Preset: {name}"),
        None => println!("Preset: (none)"),
    }
}

fn show_frame<P: ProcessProvider>(radar: &Radar<P>, european: bool) {
    let frame = radar.frame();
    for decision in frame.drawn() {
        let pos = decision
            .screen_pos
            .map(|p| {
                format!(
                    "{}; {}",
                    format_decimal(p.x, 0, european),
                    format_decimal(p.y, 0, european)
                )
            })
            .unwrap_or_else(|| "off screen".to_string());
        println!(
            "{}{} {} {} @ {}",
            if decision.highlighted { "*" } else { " " },
            decision.actor_id,
            format_color_hex(decision.color),
            decision.label,
            pos
        );
    }
}

fn show_settings(config: &AppConfig) {
    println!("Process:      {}", config.scanner.process_name);
    println!("Tick:         {}ms", config.scanner.tick_interval_ms);
    let european = config.overlay.european_number_format;
    println!("Close range:  {}", format_decimal(config.overlay.close_range, 1, european));
    println!(
        "Look-at cone: {}°",
        format_decimal(config.overlay.look_at_cone_deg, 1, european)
    );
    if let Some(path) = AppConfig::config_path() {
        println!("File:         {}", path.display());
    }
}

fn persist<P: ProcessProvider>(radar: &Radar<P>, config: &mut AppConfig) -> Result<(), String> {
    config.presets = radar.presets().clone();
    config.save().map_err(|e| format!("error: failed to save settings: {e}\n"))
}

fn preset_command<P: ProcessProvider>(
    action: PresetAction,
    radar: &mut Radar<P>,
    config: &mut AppConfig,
) -> Result<(), String> {
    match action {
        PresetAction::List => {
            let active = radar.presets().active_name();
            for preset in radar.presets().iter() {
                let marker = if Some(preset.name.as_str()) == active { '*' } else { ' ' };
                println!("{marker} {} ({} filters)", preset.name, preset.filters.len());
            }
            return Ok(());
        }
        PresetAction::Show { name } => {
            let preset = match name.as_deref() {
                Some(name) => radar.presets().get(name),
                None => radar.presets().active(),
            }
            .ok_or("error: no such preset\n")?;
            println!("{} (show only matching: {})", preset.name, preset.show_only_matching);
            for (i, filter) in preset.filters.iter().enumerate() {
                println!(
                    "{i:>3} {:<16} {:<10} {:>8} {} {}",
                    filter.summary_label(),
                    if filter.use_match_type { filter.match_type.label() } else { "*" },
                    if filter.use_match_npc_id { filter.match_npc_id.to_string() } else { "*".to_string() },
                    format_color_hex(filter.color),
                    filter.mode.label()
                );
            }
            return Ok(());
        }
        PresetAction::Select { name } => {
            radar.select_preset(name.as_deref()).map_err(|e| format!("error: {e}\n"))?;
        }
        PresetAction::Add => {
            let name = radar.add_preset().ok_or("error: no free preset name\n")?;
            println!("Added {name}");
        }
        PresetAction::Delete { name } => {
            radar.delete_preset(&name).map_err(|e| format!("error: {e}\n"))?;
        }
        PresetAction::Export { name, file } => {
            let text = radar.export_preset(&name).map_err(|e| format!("error: {e}\n"))?;
            match file {
                Some(path) => std::fs::write(&path, text).map_err(|e| format!("error: {e}\n"))?,
                None => println!("{text}"),
            }
            return Ok(());
        }
        PresetAction::Import { file, on_conflict } => {
            let text = std::fs::read_to_string(&file).map_err(|e| format!("error: {e}\n"))?;
            let outcome = radar
                .import_preset(&text, on_conflict.into())
                .map_err(|e| format!("error: {e}\n"))?;
            match &outcome {
                ImportOutcome::Added(name) => println!("Imported {name}"),
                ImportOutcome::Merged(name) => println!("Merged into {name}"),
                ImportOutcome::Renamed(name) => println!("Imported as {name}"),
                ImportOutcome::Cancelled => {
                    println!("Import cancelled");
                    return Ok(());
                }
            }
        }
        PresetAction::ShowOnlyMatching { enabled } => {
            radar
                .set_show_only_matching(enabled)
                .map_err(|e| format!("error: {e}\n"))?;
        }
    }
    persist(radar, config)
}

fn filter_command<P: ProcessProvider>(
    action: FilterAction,
    radar: &mut Radar<P>,
    config: &mut AppConfig,
) -> Result<(), String> {
    let result = match action {
        FilterAction::Add {
            actor_type,
            npc_id,
            color,
            mode,
            label,
        } => {
            if actor_type.is_none() && npc_id.is_none() {
                return Err("error: a filter needs --type or --npc-id\n".to_string());
            }
            let defaults = ActorFilter::default();
            radar.push_filter(ActorFilter {
                has_description_override: label.is_some(),
                description: label.unwrap_or_default(),
                match_type: actor_type.unwrap_or(defaults.match_type),
                use_match_type: actor_type.is_some(),
                match_npc_id: npc_id.unwrap_or_default(),
                use_match_npc_id: npc_id.is_some(),
                mode: mode.unwrap_or(defaults.mode),
                color: color.unwrap_or(defaults.color),
            })
        }
        FilterAction::FromActor { id } => {
            let id = parse_actor_id(&id)?;
            radar.push_filter_for_actor(id).map(|filter| {
                println!("Added filter {}", filter.summary_label());
            })
        }
        FilterAction::Edit { index, edit } => {
            let preset = radar.presets().active().ok_or(PresetError::NoActivePreset);
            let filter = preset.and_then(|preset| {
                preset.filters.get(index).cloned().ok_or(PresetError::FilterIndex {
                    index,
                    len: preset.filters.len(),
                })
            });
            let mut filter = filter.map_err(|e| format!("error: {e}\n"))?;
            edit.apply(&mut filter);
            if !filter.use_match_type && !filter.use_match_npc_id {
                return Err("error: a filter needs --type or --npc-id\n".to_string());
            }
            radar.replace_filter(index, filter)
        }
        FilterAction::Remove { index } => radar.remove_filter(index).map(|_| ()),
        FilterAction::Move { from, to } => radar.move_filter(from, to),
    };
    result.map_err(|e| format!("error: {e}\n"))?;
    persist(radar, config)
}
