//! System view rendering.
//!
//! Static host facts on top, then the partition and interface tables.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use crate::app::App;
use crate::data::format::{
    format_bytes, format_count, format_percent, format_timestamp, format_uptime,
};
use crate::source::{NetworkInterface, StaticInfo};

/// Render the System view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::vertical([
        Constraint::Length(9),
        Constraint::Percentage(50),
        Constraint::Percentage(50),
    ])
    .split(area);

    render_info(frame, app, chunks[0]);
    render_partitions(frame, app, chunks[1]);
    render_interfaces(frame, app, chunks[2]);
}

fn block<'a>(app: &App, title: String) -> Block<'a> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border))
}

fn field<'a>(label: &'a str, value: String) -> Vec<Span<'a>> {
    vec![
        Span::styled(format!(" {:<10}", label), Style::default().add_modifier(Modifier::DIM)),
        Span::raw(value),
    ]
}

/// Two-column key/value lines for the host facts.
pub fn info_lines(info: &StaticInfo) -> Vec<Line<'static>> {
    let cores = match info.physical_cores {
        Some(physical) => format!("{} physical, {} logical", physical, info.logical_cores),
        None => format!("{} logical", info.logical_cores),
    };
    let frequency = info
        .cpu_frequency_mhz
        .map(|mhz| format!("{} MHz", mhz))
        .unwrap_or_else(|| "-".to_string());
    let memory_used = if info.total_memory > 0 {
        info.used_memory as f64 / info.total_memory as f64 * 100.0
    } else {
        0.0
    };

    let rows: [(&'static str, String, &'static str, String); 4] = [
        (
            "OS",
            format!("{} {}", info.os_name, info.os_version),
            "Host",
            info.hostname.clone(),
        ),
        ("Kernel", info.kernel_version.clone(), "CPU", info.cpu_brand.clone()),
        ("Cores", cores, "Frequency", frequency),
        (
            "Memory",
            format!(
                "{} / {} ({}), {} available",
                format_bytes(info.used_memory),
                format_bytes(info.total_memory),
                format_percent(memory_used),
                format_bytes(info.available_memory)
            ),
            "Swap",
            format!("{} / {}", format_bytes(info.used_swap), format_bytes(info.total_swap)),
        ),
    ];

    let mut lines: Vec<Line<'static>> = rows
        .into_iter()
        .map(|(left, left_value, right, right_value)| {
            let mut spans = field(left, format!("{:<44}", left_value));
            spans.extend(field(right, right_value));
            Line::from(spans)
        })
        .collect();

    let mut boot = field("Booted", format!("{:<44}", format_timestamp(info.boot_time)));
    boot.extend(field("Uptime", format_uptime(info.uptime)));
    lines.push(Line::from(boot));
    lines
}

fn render_info(frame: &mut Frame, app: &App, area: Rect) {
    let lines = match (&app.static_info, &app.load_error) {
        (Some(info), _) => info_lines(info),
        (None, Some(err)) => vec![Line::from(Span::styled(
            format!(" Error: {} | r:retry", err),
            Style::default().fg(app.theme.critical),
        ))],
        (None, None) => vec![Line::from(" Loading...")],
    };

    frame.render_widget(
        Paragraph::new(lines).block(block(app, " System ".to_string())),
        area,
    );
}

fn render_partitions(frame: &mut Frame, app: &App, area: Rect) {
    let header = Row::new(vec!["Device", "Mount", "FS", "Size", "Used", "Use%", ""])
        .height(1)
        .style(app.theme.header);

    let rows: Vec<Row> = app
        .partitions
        .iter()
        .map(|p| {
            let used = p.used_percent();
            Row::new(vec![
                Cell::from(p.device.clone()),
                Cell::from(p.mount_path.clone()),
                Cell::from(p.file_system.clone()),
                Cell::from(format_bytes(p.total_bytes)),
                Cell::from(format_bytes(p.used_bytes)),
                Cell::from(format_percent(used)).style(app.theme.usage_style(used)),
                Cell::from(if p.removable { "removable" } else { "" }),
            ])
        })
        .collect();

    let widths = [
        Constraint::Fill(2),
        Constraint::Fill(2),
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Min(7),
        Constraint::Min(9),
    ];

    let title = format!(" Partitions ({}) ", app.partitions.len());
    let table = Table::new(rows, widths).header(header).block(block(app, title));
    frame.render_widget(table, area);
}

fn render_interfaces(frame: &mut Frame, app: &App, area: Rect) {
    let header = Row::new(vec![
        "Interface",
        "IPv4",
        "Netmask",
        "MAC",
        "Received",
        "Sent",
        "Packets in/out",
        "Errors in/out",
    ])
    .height(1)
    .style(app.theme.header);

    let rows: Vec<Row> = app
        .interfaces
        .iter()
        .map(|iface| {
            let errors = iface.errors_in + iface.errors_out;
            let error_style = if errors > 0 {
                Style::default().fg(app.theme.warning)
            } else {
                Style::default()
            };
            let (address, netmask) = address_cells(iface);
            Row::new(vec![
                Cell::from(iface.name.clone()),
                Cell::from(address),
                Cell::from(netmask),
                Cell::from(iface.mac_address.clone()),
                Cell::from(format_bytes(iface.bytes_recv)),
                Cell::from(format_bytes(iface.bytes_sent)),
                Cell::from(format!(
                    "{} / {}",
                    format_count(iface.packets_recv),
                    format_count(iface.packets_sent)
                )),
                Cell::from(format!("{} / {}", iface.errors_in, iface.errors_out)).style(error_style),
            ])
        })
        .collect();

    let widths = [
        Constraint::Fill(2),
        Constraint::Min(15),
        Constraint::Min(15),
        Constraint::Min(17),
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Fill(1),
    ];

    let title = format!(" Network Interfaces ({}) ", app.interfaces.len());
    let table = Table::new(rows, widths).header(header).block(block(app, title));
    frame.render_widget(table, area);
}

/// IPv4 address and netmask, or the first other address with its prefix.
pub fn address_cells(iface: &NetworkInterface) -> (String, String) {
    if let Some(v4) = iface.ipv4() {
        let netmask = v4.netmask().map(|m| m.to_string()).unwrap_or_default();
        return (v4.address.to_string(), netmask);
    }
    match iface.addresses.first() {
        Some(other) => (other.to_string(), "-".to_string()),
        None => ("-".to_string(), "-".to_string()),
    }
}
