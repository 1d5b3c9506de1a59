/*
 * This file is part of Hwfan.
 *
 * Copyright (C) 2025 Hwfan contributors
 *
 * Hwfan is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Hwfan is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Hwfan. If not, see <https://www.gnu.org/licenses/>.
 */

use ratatui::layout::{Alignment, Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::widgets::{Axis, Block, BorderType, Borders, Chart, Dataset, GraphType, Paragraph};

use crate::display::{ChartState, HISTORY_LEN};

const PALETTE: [Color; 10] = [
    Color::Magenta,
    Color::Cyan,
    Color::Green,
    Color::Yellow,
    Color::Blue,
    Color::Red,
    Color::LightMagenta,
    Color::LightCyan,
    Color::LightGreen,
    Color::LightYellow,
];

/// Color of series `i`: units cycle through five color pairs.
pub fn series_color(i: usize) -> Color {
    let unit = i / 2;
    PALETTE[(unit % 5) * 2 + i % 2]
}

pub fn ui(f: &mut Frame, chart: &ChartState, status: &str) {
    let size = f.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(1)])
        .split(size);

    let points: Vec<Vec<(f64, f64)>> = chart.series.iter().map(|s| s.points()).collect();
    let datasets: Vec<Dataset> = chart
        .series
        .iter()
        .zip(points.iter())
        .enumerate()
        .map(|(i, (s, pts))| {
            Dataset::default()
                .name(s.title.clone())
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(series_color(i)))
                .data(pts)
        })
        .collect();

    let last = (HISTORY_LEN - 1) as f64;
    let widget = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .title(format!(" {} ", chart.title())),
        )
        .x_axis(
            Axis::default()
                .style(Style::default().fg(Color::Gray))
                .bounds([0.0, last])
                .labels(vec![Span::raw("60"), Span::raw("30"), Span::raw("0")]),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(Color::Gray))
                .bounds([0.0, 100.0])
                .labels(vec![Span::raw("0"), Span::raw("50"), Span::raw("100")]),
        );
    f.render_widget(widget, chunks[0]);

    let help = Paragraph::new(format!("q / Esc / Ctrl-C quit  |  {}", status))
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Gray));
    f.render_widget(help, chunks[1]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::display::{DisplaySink, Sample};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    #[test]
    fn test_series_colors_pair_per_unit() {
        assert_eq!(series_color(0), Color::Magenta);
        assert_eq!(series_color(1), Color::Cyan);
        assert_eq!(series_color(2), Color::Green);
        assert_eq!(series_color(10), Color::Magenta);
    }

    #[test]
    fn test_renders_chart_title_and_footer() {
        let mut chart = ChartState::new(&["fan1".to_string()], &Settings::default());
        chart.offer(&Sample { index: 0, label: "fan1".into(), temperature: 65, duty: 130 });

        let backend = TestBackend::new(100, 20);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| ui(f, &chart, "1 fan")).unwrap();

        let buffer = terminal.backend().buffer();
        let text: String = buffer.content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains("Min : 52°"));
        assert!(text.contains("q / Esc / Ctrl-C quit"));
    }
}
