use ratatui::{
    Frame,
    layout::{Constraint, Flex, Layout, Rect},
    style::{Style, Stylize},
    symbols::border,
    text::{Line, Span},
    widgets::{
        Block, Cell, Clear, List, ListState, Paragraph, Row, Table, TableState, Wrap,
    },
};

use crate::domain::AppConfig;
use crate::model::{Model, Modus, UIData};
use crate::presenter::NOT_FOUND_TEXT;

pub const SEARCH_INPUT_HEIGHT: u16 = 3;
pub const STATUSLINE_HEIGHT: u16 = 1;
pub const FIELD_LABEL_MARGIN: u16 = 2;

pub struct ClientUI {
    field_label_width: u16,
}

impl ClientUI {
    pub fn new(cfg: &AppConfig) -> Self {
        let longest = cfg
            .fields
            .iter()
            .map(|f| f.chars().count())
            .max()
            .unwrap_or(0);
        Self {
            field_label_width: longest as u16 + FIELD_LABEL_MARGIN,
        }
    }

    pub fn draw(&self, model: &Model, frame: &mut Frame) {
        let uidata = model.get_uidata();

        let [main, statusline] =
            Layout::vertical([Constraint::Min(0), Constraint::Length(STATUSLINE_HEIGHT)])
                .areas(frame.area());
        let [search, fields] =
            Layout::horizontal([Constraint::Percentage(40), Constraint::Percentage(60)])
                .areas(main);

        self.render_search(uidata, frame, search);
        self.render_fields(uidata, frame, fields);
        self.render_statusline(uidata, frame, statusline);

        if uidata.show_popup {
            self.render_popup(uidata, frame);
        }
    }

    fn panel(title: &str, focused: bool) -> Block<'static> {
        let block = Block::bordered().title(Line::from(format!(" {title} ").bold()));
        if focused {
            block
                .border_set(border::THICK)
                .border_style(Style::new().yellow())
        } else {
            block
        }
    }

    fn render_search(&self, uidata: &UIData, frame: &mut Frame, area: Rect) {
        let focused = uidata.modus == Modus::SEARCH;
        let block = Self::panel("Search client", focused);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [label, input, list] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(SEARCH_INPUT_HEIGHT),
            Constraint::Min(0),
        ])
        .areas(inner);

        frame.render_widget(Paragraph::new("Select or type the name:"), label);

        // Scroll the text horizontally so the curser stays visible.
        let input_block = Block::bordered();
        let text_area = input_block.inner(input);
        let width = text_area.width as usize;
        let skip = if width > 0 && uidata.search.curser_pos >= width {
            uidata.search.curser_pos - width + 1
        } else {
            0
        };
        let visible: String = uidata.search.input.chars().skip(skip).collect();
        frame.render_widget(Paragraph::new(visible).block(input_block), input);
        if focused {
            frame.set_cursor_position((
                text_area.x + (uidata.search.curser_pos - skip) as u16,
                text_area.y,
            ));
        }

        if uidata.names.is_empty() {
            frame.render_widget(Paragraph::new("No matching client".italic()), list);
        } else {
            let names = List::new(uidata.names.iter().map(|n| n.as_str()))
                .highlight_style(Style::new().reversed())
                .highlight_symbol("> ");
            let mut state = ListState::default().with_selected(uidata.selected_name);
            frame.render_stateful_widget(names, list, &mut state);
        }
    }

    fn render_fields(&self, uidata: &UIData, frame: &mut Frame, area: Rect) {
        let focused = uidata.modus == Modus::FIELDS;
        let block = Self::panel("Selected client data", focused);

        let rows = uidata.fields.iter().enumerate().map(|(idx, f)| {
            let value = if f.value == NOT_FOUND_TEXT {
                Cell::from(f.value.as_str().red())
            } else {
                Cell::from(f.value.as_str())
            };
            Row::new(vec![
                Cell::from(format!("{}", idx + 1).blue()),
                Cell::from(format!("{}:", f.field)),
                value,
            ])
        });
        let table = Table::new(
            rows,
            [
                Constraint::Length(2),
                Constraint::Length(self.field_label_width),
                Constraint::Min(10),
            ],
        )
        .block(block)
        .row_highlight_style(Style::new().reversed());

        let selected = if focused {
            Some(uidata.selected_field)
        } else {
            None
        };
        let mut state = TableState::default().with_selected(selected);
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn render_statusline(&self, uidata: &UIData, frame: &mut Frame, area: Rect) {
        let line = Line::from(vec![
            Span::from(format!(" {} ", uidata.name)).yellow(),
            Span::from(format!("| {} records | ", uidata.nrecords)),
            Span::from(uidata.status_message.as_str()),
            Span::from("  <F1> help ").blue().bold(),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }

    fn render_popup(&self, uidata: &UIData, frame: &mut Frame) {
        let area = popup_area(frame.area(), 70, 70);
        let block = Block::bordered()
            .title(Line::from(format!(" {} ", uidata.popup_title).bold()).centered())
            .title_bottom(Line::from(" <Esc> close ".blue()).centered())
            .border_set(border::THICK);
        frame.render_widget(Clear, area);
        frame.render_widget(
            Paragraph::new(uidata.popup_message.as_str())
                .wrap(Wrap { trim: false })
                .block(block),
            area,
        );
    }
}

fn popup_area(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let [area] = Layout::vertical([Constraint::Percentage(percent_y)])
        .flex(Flex::Center)
        .areas(area);
    let [area] = Layout::horizontal([Constraint::Percentage(percent_x)])
        .flex(Flex::Center)
        .areas(area);
    area
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Message;
    use crate::model::tests::{FakeClipboard, test_model};
    use ratatui::{Terminal, backend::TestBackend};

    fn render(model: &Model) -> String {
        let ui = ClientUI::new(&AppConfig::default());
        let mut terminal = Terminal::new(TestBackend::new(100, 20)).unwrap();
        terminal.draw(|f| ui.draw(model, f)).unwrap();
        let buffer = terminal.backend().buffer();
        buffer
            .content
            .chunks(buffer.area.width as usize)
            .map(|line| line.iter().map(|c| c.symbol()).collect::<String>())
            .collect::<Vec<String>>()
            .join("\n")
    }

    #[test]
    fn test_render_initial_screen() {
        let model = test_model(FakeClipboard::default());
        let screen = render(&model);
        assert!(screen.contains("Search client"));
        assert!(screen.contains("Selected client data"));
        assert!(screen.contains("Maria Silva"));
        assert!(screen.contains("SENHA IMA:"));
        assert!(screen.contains("3 records"));
    }

    #[test]
    fn test_render_selected_client() {
        let mut model = test_model(FakeClipboard::default());
        model.update(Some(Message::Select)).unwrap();
        let screen = render(&model);
        assert!(screen.contains("222"));
        assert!(screen.contains("Selected Ana"));
    }

    #[test]
    fn test_render_popup() {
        let mut model = test_model(FakeClipboard::default());
        model.update(Some(Message::Help)).unwrap();
        let screen = render(&model);
        assert!(screen.contains("Help"));
        assert!(screen.contains("copy the highlighted field"));
    }

    #[test]
    fn test_popup_area_is_centered() {
        let area = popup_area(Rect::new(0, 0, 100, 50), 50, 50);
        assert_eq!((area.x, area.width, area.height), (25, 50, 25));
    }
}
