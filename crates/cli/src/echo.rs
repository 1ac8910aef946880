use owo_colors::OwoColorize;

use billboard_core::{Chart, ChartInfo, Song};

use crate::VERSION;

/// Print a styled banner for verbose mode
pub fn print_banner() {
    eprintln!(
        "\n{} {} {}",
        "Billboard".bold().bright_blue(),
        "v".dimmed(),
        VERSION.dimmed()
    );
    eprintln!("{}", "Fetch music charts from billboard.com\n".dimmed());
}

/// Print a styled step message
pub fn print_step(step: usize, total: usize, message: &str) {
    eprintln!("{} {}", format!("[{}/{}]", step, total).dimmed(), message.bright_cyan());
}

/// Print a success message
pub fn print_success(message: &str) {
    eprintln!("{} {}", "✓".green(), message.bright_green());
}

/// Print an info message
pub fn print_info(message: &str) {
    eprintln!("{} {}", "ℹ".blue(), message.bright_blue());
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red(), message.bright_red());
}

/// Print a labelled detail line under a step
pub fn print_detail(label: &str, value: &str) {
    eprintln!("  {} {}", format!("{}:", label).dimmed(), value.bright_white());
}

/// Format file size for display
pub fn format_size(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = 1024 * KB;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

fn format_stat(value: Option<u32>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

/// Render one song as a plain-text table row
pub fn format_song(song: &Song) -> String {
    let artist = if song.artist.is_empty() { "Unknown artist" } else { song.artist.as_str() };
    format!(
        "{:>3}  {} - {}  [LW {}, peak {}, {} wks]",
        song.rank,
        song.title,
        artist,
        format_stat(song.position.position_last_week),
        format_stat(song.position.peak_position),
        format_stat(song.position.weeks_on_chart),
    )
}

/// Render a chart as plain text
pub fn format_chart(chart_name: &str, chart: &Chart) -> String {
    let mut out = String::new();
    if chart.week.is_empty() {
        out.push_str(&format!("{}\n\n", chart_name));
    } else {
        out.push_str(&format!("{} (week of {})\n\n", chart_name, chart.week));
    }

    for song in &chart.songs {
        out.push_str(&format_song(song));
        out.push('\n');
    }
    out
}

/// Render the chart catalog as plain text
pub fn format_chart_list(charts: &[ChartInfo]) -> String {
    let width = charts.iter().map(|c| c.name.len()).max().unwrap_or(0);
    charts
        .iter()
        .map(|c| format!("{:<width$}  {}\n", c.name, c.url, width = width))
        .collect()
}
