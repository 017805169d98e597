//! Statistics dashboard: overview counters and proportional bar charts

use std::fmt;

use super::{
    api::CatalogBackend,
    status::{server_unavailable_notice, StatusLine},
};
use crate::models::{AvailabilityBreakdown, CatalogStats, GroupCount, ReservationRollup};

/// Bar colors, cycled by position
pub const PALETTE: [&str; 15] = [
    "#4CAF50", "#2196F3", "#FF9800", "#E91E63", "#9C27B0", "#00BCD4", "#FFEB3B", "#795548",
    "#607D8B", "#3F51B5", "#8BC34A", "#FFC107", "#FF5722", "#673AB7", "#009688",
];

/// Label of a group whose key is missing or empty
pub const UNDEFINED_LABEL: &str = "Non défini";

const EMPTY_CHART: &str = "Aucune donnée disponible";

/// Width in characters of a 100% bar in text rendering
const TEXT_BAR_WIDTH: f64 = 30.0;

pub fn color(index: usize) -> &'static str {
    PALETTE[index % PALETTE.len()]
}

fn label(key: &Option<String>) -> String {
    match key {
        Some(k) if !k.is_empty() => k.clone(),
        _ => UNDEFINED_LABEL.to_string(),
    }
}

/// `value` as a percentage of `max`; 0 when `max` is 0
fn proportion(value: i64, max: i64) -> f64 {
    if max > 0 {
        value as f64 / max as f64 * 100.0
    } else {
        0.0
    }
}

fn text_bar(width: f64) -> String {
    "█".repeat((width / 100.0 * TEXT_BAR_WIDTH).round() as usize)
}

/// One horizontal bar
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub label: String,
    pub value: i64,
    /// Width in percent of the largest bar
    pub width: f64,
    pub color: &'static str,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BarChart {
    pub bars: Vec<Bar>,
}

impl BarChart {
    /// Bars scaled against the largest value
    pub fn proportional(groups: &[GroupCount]) -> Self {
        let max = groups.iter().map(|g| g.count).max().unwrap_or(0);
        let bars = groups
            .iter()
            .enumerate()
            .map(|(i, g)| Bar {
                label: label(&g.key),
                value: g.count,
                width: proportion(g.count, max),
                color: color(i),
            })
            .collect();
        Self { bars }
    }
}

impl fmt::Display for BarChart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.bars.is_empty() {
            return writeln!(f, "  {}", EMPTY_CHART);
        }
        for bar in &self.bars {
            writeln!(f, "  {:<30} {} {}", bar.label, text_bar(bar.width), bar.value)?;
        }
        Ok(())
    }
}

/// Reservation bar of one type with its document count and average
#[derive(Debug, Clone, PartialEq)]
pub struct ReservationBar {
    pub bar: Bar,
    pub caption: String,
    pub info: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReservationChart {
    pub rows: Vec<ReservationBar>,
}

impl ReservationChart {
    pub fn new(rollups: &[ReservationRollup]) -> Self {
        let max = rollups.iter().map(|r| r.total_reservations).max().unwrap_or(0);
        let rows = rollups
            .iter()
            .enumerate()
            .map(|(i, r)| ReservationBar {
                bar: Bar {
                    label: label(&r.key),
                    value: r.total_reservations,
                    width: proportion(r.total_reservations, max),
                    color: color(i),
                },
                caption: format!("{} réservations", r.total_reservations),
                info: format!(
                    "{} document(s) • Moyenne: {:.2} réservation(s) par document",
                    r.nombre_documents, r.moyenne_reservations
                ),
            })
            .collect();
        Self { rows }
    }
}

impl fmt::Display for ReservationChart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rows.is_empty() {
            return writeln!(f, "  {}", EMPTY_CHART);
        }
        for row in &self.rows {
            writeln!(f, "  {:<30} {} {}", row.bar.label, text_bar(row.bar.width), row.caption)?;
            writeln!(f, "  {:<30} {}", "", row.info)?;
        }
        Ok(())
    }
}

/// Available/checked-out split of one type
#[derive(Debug, Clone, PartialEq)]
pub struct StackedBar {
    /// "type (total)"
    pub label: String,
    pub disponibles: i64,
    pub empruntes: i64,
    /// Percentages rounded to one decimal
    pub percent_disponible: f64,
    pub percent_emprunte: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StackedChart {
    pub bars: Vec<StackedBar>,
}

fn percent_1dp(part: i64, total: i64) -> f64 {
    (part as f64 / total as f64 * 1000.0).round() / 10.0
}

impl StackedChart {
    /// Types without records are skipped
    pub fn new(breakdown: &[AvailabilityBreakdown]) -> Self {
        let bars = breakdown
            .iter()
            .filter(|b| b.total > 0)
            .map(|b| StackedBar {
                label: format!("{} ({})", label(&b.key), b.total),
                disponibles: b.disponibles,
                empruntes: b.empruntes,
                percent_disponible: percent_1dp(b.disponibles, b.total),
                percent_emprunte: percent_1dp(b.empruntes, b.total),
            })
            .collect();
        Self { bars }
    }
}

impl fmt::Display for StackedChart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.bars.is_empty() {
            return writeln!(f, "  {}", EMPTY_CHART);
        }
        for bar in &self.bars {
            writeln!(
                f,
                "  {:<30} {}{} Disponibles: {} ({:.1}%) • Empruntés: {} ({:.1}%)",
                bar.label,
                "█".repeat((bar.percent_disponible / 100.0 * TEXT_BAR_WIDTH).round() as usize),
                "░".repeat((bar.percent_emprunte / 100.0 * TEXT_BAR_WIDTH).round() as usize),
                bar.disponibles,
                bar.percent_disponible,
                bar.empruntes,
                bar.percent_emprunte
            )?;
        }
        Ok(())
    }
}

/// Headline counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Overview {
    pub documents: i64,
    pub types: usize,
    pub reservations: i64,
}

impl From<&CatalogStats> for Overview {
    fn from(stats: &CatalogStats) -> Self {
        Self {
            documents: stats.total_livres,
            types: stats.types_documents.len(),
            reservations: stats
                .reservations_par_type
                .iter()
                .fold(0i64, |sum, r| sum.saturating_add(r.total_reservations)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatsDashboard {
    pub overview: Overview,
    pub types: BarChart,
    pub reservations: ReservationChart,
    pub authors: BarChart,
    pub availability: StackedChart,
}

impl From<&CatalogStats> for StatsDashboard {
    fn from(stats: &CatalogStats) -> Self {
        Self {
            overview: Overview::from(stats),
            types: BarChart::proportional(&stats.types_documents),
            reservations: ReservationChart::new(&stats.reservations_par_type),
            authors: BarChart::proportional(&stats.top_auteurs),
            availability: StackedChart::new(&stats.disponibilite_par_type),
        }
    }
}

impl StatsDashboard {
    /// Fetch statistics and build the dashboard, with the status line to show.
    /// On failure the error carries the notice to display instead.
    pub async fn load<B: CatalogBackend + ?Sized>(
        backend: &B,
    ) -> (StatusLine, Result<Self, String>) {
        match backend.stats().await {
            Ok(stats) => (
                StatusLine::success("Statistiques chargées avec succès"),
                Ok(Self::from(&stats)),
            ),
            Err(e) => {
                tracing::warn!("Failed to load statistics: {}", e);
                let message = e.to_string();
                (StatusLine::error(&message), Err(server_unavailable_notice(&message)))
            }
        }
    }
}

impl fmt::Display for StatsDashboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Documents: {}", self.overview.documents)?;
        writeln!(f, "Types: {}", self.overview.types)?;
        writeln!(f, "Réservations: {}", self.overview.reservations)?;
        writeln!(f)?;
        writeln!(f, "Répartition par type")?;
        write!(f, "{}", self.types)?;
        writeln!(f, "Réservations par type")?;
        write!(f, "{}", self.reservations)?;
        writeln!(f, "Top auteurs")?;
        write!(f, "{}", self.authors)?;
        writeln!(f, "Disponibilité par type")?;
        write!(f, "{}", self.availability)
    }
}
