use super::*;
use crate::app::{ChatEntry, Message, Model, update};
use crate::conversation::{ChatSession, ConversationWindow};
use crate::ui::style::Theme;
use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::buffer::Cell;
use ratatui::layout::Rect;

const WIDTH: u16 = 60;
const HEIGHT: u16 = 20;

fn create_test_model() -> Model {
    let window = ConversationWindow::new(50).unwrap();
    Model::new(ChatSession::new(window), "gemini-test", (WIDTH, HEIGHT)).with_theme(Theme::dark())
}

fn draw(model: &mut Model) -> Vec<String> {
    let mut terminal = Terminal::new(TestBackend::new(WIDTH, HEIGHT)).unwrap();
    terminal.draw(|frame| render(model, frame)).unwrap();
    let buffer = terminal.backend().buffer();
    buffer
        .content()
        .chunks(usize::from(buffer.area.width))
        .map(|row| row.iter().map(Cell::symbol).collect())
        .collect()
}

fn screen_contains(rows: &[String], needle: &str) -> bool {
    rows.iter().any(|row| row.contains(needle))
}

#[test]
fn test_status_bar_shows_model_and_context() {
    let mut model = create_test_model();
    let rows = draw(&mut model);
    let status = rows.last().unwrap();
    assert!(status.contains("gemini-test"), "status: {status:?}");
    assert!(status.contains("context 0/50"));
    assert!(status.contains("[end]"));
    assert!(status.contains("F1:help"));
}

#[test]
fn test_empty_input_shows_placeholder() {
    let mut model = create_test_model();
    let rows = draw(&mut model);
    assert!(screen_contains(&rows, "Message"));
    assert!(screen_contains(&rows, "Enter sends"));
}

#[test]
fn test_model_bubble_renders_markup() {
    let mut model = create_test_model();
    model.push_entry(ChatEntry::model("# Plan\n- **first** step", "12:00"));
    let rows = draw(&mut model);
    assert!(screen_contains(&rows, "Gemini  12:00"));
    assert!(screen_contains(&rows, "  Plan"));
    assert!(screen_contains(&rows, "  • first step"));
    assert!(!screen_contains(&rows, "**"));
}

#[test]
fn test_user_bubble_is_right_aligned() {
    let mut model = create_test_model();
    model.push_entry(ChatEntry::user("hello there", "12:01"));
    let rows = draw(&mut model);
    let row = rows
        .iter()
        .find(|row| row.contains("hello there"))
        .expect("user text on screen");
    assert!(row.ends_with("hello there"), "row: {row:?}");
    assert!(screen_contains(&rows, "12:01  You"));
}

#[test]
fn test_code_block_renders_framed() {
    let mut model = create_test_model();
    model.push_entry(ChatEntry::model("```py\nprint(1)\n```", "12:02"));
    let rows = draw(&mut model);
    assert!(screen_contains(&rows, "┌ py "));
    assert!(screen_contains(&rows, "│ print(1) │"));
    assert!(screen_contains(&rows, "└"));
}

#[test]
fn test_typing_indicator_while_busy() {
    let mut model = create_test_model();
    model.session.begin("hi").unwrap();
    let rows = draw(&mut model);
    assert!(screen_contains(&rows, "Gemini is typing…"));
    assert!(screen_contains(&rows, "Waiting for reply"));
}

#[test]
fn test_no_typing_indicator_when_idle() {
    let mut model = create_test_model();
    let rows = draw(&mut model);
    assert!(!screen_contains(&rows, "typing"));
}

#[test]
fn test_clear_history_shows_notice_and_toast() {
    let mut model = create_test_model();
    model.push_entry(ChatEntry::user("old", "11:00"));
    let mut model = update(model, Message::ClearHistory);
    let rows = draw(&mut model);
    assert!(!screen_contains(&rows, "old"));
    assert!(screen_contains(&rows, "· Conversation history cleared."));
    assert!(screen_contains(&rows, "[info] History cleared"));
}

#[test]
fn test_help_overlay_renders() {
    let mut model = update(create_test_model(), Message::ToggleHelp);
    let rows = draw(&mut model);
    assert!(screen_contains(&rows, "Help"));
    assert!(screen_contains(&rows, "Send message"));
    assert!(screen_contains(&rows, "Clear history"));
}

#[test]
fn test_screen_areas_stack_footer() {
    let model = create_test_model();
    let area = Rect::new(0, 0, WIDTH, HEIGHT);
    let areas = screen_areas(&model, area);
    assert_eq!(areas.transcript.height, HEIGHT - 4);
    assert_eq!(areas.typing, None);
    assert_eq!(areas.toast, None);
    assert_eq!(areas.input.y, HEIGHT - 4);
    assert_eq!(areas.input.height, 3);
    assert_eq!(areas.status.y, HEIGHT - 1);
}

#[test]
fn test_screen_areas_with_typing_row() {
    let mut model = create_test_model();
    model.session.begin("hi").unwrap();
    let areas = screen_areas(&model, Rect::new(0, 0, WIDTH, HEIGHT));
    assert_eq!(areas.transcript.height, HEIGHT - 5);
    assert_eq!(areas.typing.map(|r| r.y), Some(HEIGHT - 5));
}

#[test]
fn test_input_box_grows_up_to_cap() {
    let mut model = create_test_model();
    model = update(model, Message::Paste("a\nb\nc".to_string()));
    let areas = screen_areas(&model, Rect::new(0, 0, WIDTH, HEIGHT));
    assert_eq!(areas.input.height, 5);

    model = update(model, Message::Paste("\n1\n2\n3\n4\n5\n6".to_string()));
    let areas = screen_areas(&model, Rect::new(0, 0, WIDTH, HEIGHT));
    assert_eq!(areas.input.height, MAX_INPUT_ROWS as u16 + 2);
}

#[test]
fn test_multiline_input_keeps_cursor_line_visible() {
    let mut model = create_test_model();
    model = update(
        model,
        Message::Paste("l1\nl2\nl3\nl4\nl5\nl6\nl7\nlast line".to_string()),
    );
    let rows = draw(&mut model);
    assert!(screen_contains(&rows, "last line"));
    assert!(!screen_contains(&rows, "l1 "));
}

#[test]
fn test_tiny_terminal_does_not_panic() {
    let window = ConversationWindow::new(5).unwrap();
    let mut model = Model::new(ChatSession::new(window), "m", (10, 3));
    model.push_entry(ChatEntry::model("```rust\nfn main() {}\n```", "00:00"));
    let mut terminal = Terminal::new(TestBackend::new(10, 3)).unwrap();
    terminal.draw(|frame| render(&mut model, frame)).unwrap();
}

#[test]
fn test_scrolled_transcript_shows_percent() {
    let mut model = create_test_model();
    for i in 0..20 {
        model.push_entry(ChatEntry::notice(format!("notice {i}"), "10:00"));
    }
    let mut model = update(model, Message::GoToTop);
    let rows = draw(&mut model);
    assert!(screen_contains(&rows, "notice 0"));
    assert!(rows.last().unwrap().contains("[0%]"));

    let mut model = update(model, Message::FollowTail);
    let rows = draw(&mut model);
    assert!(screen_contains(&rows, "notice 19"));
    assert!(rows.last().unwrap().contains("[end]"));
}

#[test]
fn test_status_text_counts_window_turns() {
    let mut model = create_test_model();
    model.session.begin("question").unwrap();
    model.session.complete("answer").unwrap();
    assert!(status_text(&model).contains("context 2/50"));
}
