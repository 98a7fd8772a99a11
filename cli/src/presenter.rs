//! Console presenter
//!
//! Prints scanner status and actor membership changes as they happen.

use clap::ValueEnum;
use ffradar_core::{ActorEntry, ActorRegistry, RadarSignal, RadarSignalHandler};
use ffradar_types::formatting::{format_color_hex, format_distance, truncate_name};

const NAME_WIDTH: usize = 28;

#[derive(Debug, Default)]
pub struct ConsolePresenter {
    /// Print every refresh instead of only membership changes
    pub verbose: bool,
    /// Decimal comma in distances
    pub european: bool,
}

impl ConsolePresenter {
    pub fn new(verbose: bool, european: bool) -> Self {
        Self { verbose, european }
    }
}

/// Actor list ordering. `Scan` keeps actor table order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ActorSort {
    #[default]
    Scan,
    Name,
    Type,
    Id,
    Distance,
}

/// Stable sort, so ties keep scan order
pub fn sort_entries(entries: &mut [&ActorEntry], sort: ActorSort) {
    match sort {
        ActorSort::Scan => {}
        ActorSort::Name => entries.sort_by_cached_key(|e| e.settings.label_text.to_lowercase()),
        ActorSort::Type => entries.sort_by_key(|e| e.record.actor_type.label()),
        ActorSort::Id => entries.sort_by_key(|e| e.record.stable_id),
        ActorSort::Distance => {
            entries.sort_by(|a, b| a.record.local_distance.total_cmp(&b.record.local_distance))
        }
    }
}

/// One actor list row
pub fn actor_row(entry: &ActorEntry, european: bool) -> String {
    let record = &entry.record;
    let settings = &entry.settings;
    format!(
        "{marker} {id} {kind:<10} {name:<width$} {npc:>8} {dist:>8} {color} {mode}{hidden}",
        marker = if settings.highlighted { '*' } else { ' ' },
        id = record.stable_id,
        kind = record.actor_type.label(),
        name = truncate_name(&settings.label_text, NAME_WIDTH),
        width = NAME_WIDTH,
        npc = record.npc_id,
        dist = format_distance(record.local_distance, european),
        color = format_color_hex(settings.color),
        mode = settings.label_mode.label(),
        hidden = if settings.visible { "" } else { " (hidden)" },
    )
}

pub fn print_actor_list(registry: &ActorRegistry, european: bool, sort: ActorSort) {
    println!(
        "  {:<8} {:<10} {:<width$} {:>8} {:>8} {:<7} Mode",
        "Id",
        "Type",
        "Label",
        "NpcId",
        "Dist",
        "Color",
        width = NAME_WIDTH
    );
    let mut entries: Vec<&ActorEntry> = registry.iter().collect();
    sort_entries(&mut entries, sort);
    for entry in entries {
        println!("{}", actor_row(entry, european));
    }
}

impl RadarSignalHandler for ConsolePresenter {
    fn handle_signal(&mut self, signal: &RadarSignal, registry: &ActorRegistry) {
        match signal {
            RadarSignal::ScannerStateChanged(state) => {
                println!("[scanner] {state}");
            }
            RadarSignal::ActorsChanged { added, removed } => {
                for id in added {
                    if let Some(entry) = registry.get(*id) {
                        println!("+{}", actor_row(entry, self.european));
                    }
                }
                for id in removed {
                    println!("- {id}");
                }
            }
            RadarSignal::ActorsRefreshed => {
                if self.verbose {
                    print_actor_list(registry, self.european, ActorSort::Scan);
                }
            }
        }
    }
}
