use std::collections::HashMap;
use std::sync::mpsc;
use std::time::Duration;

use font8x8::{UnicodeFonts, BASIC_FONTS, HIRAGANA_FONTS, LATIN_FONTS};
use hondana_adapters::{
    present_progress_line, present_research_notice, present_total_pages, NO_READING_NOW_MESSAGE,
    NO_RESULTS_MESSAGE, PROGRESS_SAVED_MESSAGE,
};
use hondana_application::{
    ApplicationService, BookDetailQuery, BookDetailView, CoverImageQuery, ReadingNowQuery,
    SaveProgressCommand, SearchBooksCommand,
};
use hondana_domain::{
    BookId, ReadingNowEntry, ReadingStatus, SearchRecord, FALLBACK_PAGES_INPUT_MAX,
};
use log::{error, warn};
use minifb::{InputCallback, Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};

use crate::config::ShelfConfig;

const WINDOW_WIDTH: usize = 1120;
const WINDOW_HEIGHT: usize = 700;
const CANVAS_MARGIN: usize = 24;
const HEADER_TOP: usize = 16;
const HEADER_HEIGHT: usize = 56;
const WORKAREA_TOP: usize = 92;
const WORKAREA_BOTTOM_MARGIN: usize = 24;
const SPLIT_GUTTER: usize = 20;
const DETAIL_PANEL_WIDTH: usize = 380;
const DETAIL_PAD: usize = 18;
const DESCRIPTION_LINES: usize = 5;
const READING_NOW_HEIGHT: usize = 170;
const READING_ROW_HEIGHT: usize = 34;
const CARD_HEIGHT: usize = 68;
const CARD_GAP: usize = 8;
const CARD_PAD: usize = 10;
const THUMB_WIDTH: usize = 40;
const THUMB_HEIGHT: usize = 56;
const LINE_HEIGHT: usize = 14;
const NOTICE_FRAMES: u32 = 180;
const FLASH_FRAMES: u32 = 18;

const BACKGROUND: u32 = 0xF4F1EA;
const PANEL_FILL: u32 = 0xFFFFFF;
const PANEL_BORDER: u32 = 0xC8BBA4;
const TEXT_MAIN: u32 = 0x222222;
const TEXT_DIM: u32 = 0x6A5B47;
// Progress green and track grey from the page stylesheet.
const ACCENT: u32 = 0x4CAF50;
const BAR_TRACK: u32 = 0xEEEEEE;
const INPUT_FILL: u32 = 0xFBFAF7;
const FOCUS_BORDER: u32 = 0x4E78D5;
const COMPLETED_FILL: u32 = 0xE8F5E9;
const BUTTON_FILL: u32 = 0x1B1F26;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Rect {
    left: usize,
    top: usize,
    width: usize,
    height: usize,
}

impl Rect {
    fn contains(&self, x: usize, y: usize) -> bool {
        x >= self.left
            && x < self.left + self.width
            && y >= self.top
            && y < self.top + self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    SearchBox,
    PagesInput,
}

/// Everything a user can do to the window, decoupled from how the next
/// frame is drawn.
#[derive(Debug, Clone, PartialEq, Eq)]
enum UiEvent {
    FocusSearchBox,
    FocusPagesInput,
    SubmitSearch,
    SelectCard(usize),
    SelectReadingNow(usize),
    SaveProgress,
    DismissModal,
}

#[derive(Debug, Clone)]
struct CardThumb {
    width: usize,
    height: usize,
    pixels: Vec<u32>,
}

struct UiState {
    search_input: String,
    pages_input: String,
    focus: Focus,
    results: Vec<SearchRecord>,
    completed: Vec<bool>,
    searched_once: bool,
    selected: Option<usize>,
    detail: Option<BookDetailView>,
    reading_now: Vec<ReadingNowEntry>,
    thumbs: HashMap<BookId, Option<CardThumb>>,
    results_scroll: usize,
    notice: Option<String>,
    notice_frames: u32,
    modal: Option<String>,
    detail_flash: u32,
}

impl UiState {
    fn new() -> Self {
        Self {
            search_input: String::new(),
            pages_input: String::new(),
            focus: Focus::SearchBox,
            results: Vec::new(),
            completed: Vec::new(),
            searched_once: false,
            selected: None,
            detail: None,
            reading_now: Vec::new(),
            thumbs: HashMap::new(),
            results_scroll: 0,
            notice: None,
            notice_frames: 0,
            modal: None,
            detail_flash: 0,
        }
    }

    fn push_char(&mut self, ch: char) {
        match self.focus {
            Focus::SearchBox => {
                if !ch.is_control() && self.search_input.chars().count() < 64 {
                    self.search_input.push(ch);
                }
            }
            Focus::PagesInput => {
                if ch.is_ascii_digit() && self.pages_input.len() < 6 {
                    self.pages_input.push(ch);
                    self.clamp_pages_input();
                }
            }
        }
    }

    fn pop_char(&mut self) {
        match self.focus {
            Focus::SearchBox => {
                self.search_input.pop();
            }
            Focus::PagesInput => {
                self.pages_input.pop();
            }
        }
    }

    fn pages_input_bound(&self) -> u32 {
        self.detail
            .as_ref()
            .map(|detail| detail.pages_input_max)
            .unwrap_or(FALLBACK_PAGES_INPUT_MAX)
    }

    fn clamp_pages_input(&mut self) {
        let bound = self.pages_input_bound();
        if let Ok(value) = self.pages_input.parse::<u64>() {
            if value > u64::from(bound) {
                self.pages_input = bound.to_string();
            }
        }
    }

    fn show_notice(&mut self, message: String) {
        self.notice = Some(message);
        self.notice_frames = NOTICE_FRAMES;
    }

    fn scroll_results(&mut self, wheel_y: f32) {
        let max_scroll = self.results.len().saturating_sub(visible_card_count());
        if wheel_y < 0.0 {
            self.results_scroll = (self.results_scroll + 1).min(max_scroll);
        } else if wheel_y > 0.0 {
            self.results_scroll = self.results_scroll.saturating_sub(1);
        }
    }

    fn tick(&mut self) {
        if self.notice_frames > 0 {
            self.notice_frames -= 1;
            if self.notice_frames == 0 {
                self.notice = None;
            }
        }
        if self.detail_flash > 0 {
            self.detail_flash -= 1;
        }
    }
}

struct CharCollector {
    tx: mpsc::Sender<char>,
}

impl InputCallback for CharCollector {
    fn add_char(&mut self, uni_char: u32) {
        if let Some(ch) = char::from_u32(uni_char) {
            let _ = self.tx.send(ch);
        }
    }
}

pub fn launch_window(service: &ApplicationService, config: &ShelfConfig) -> Result<(), String> {
    let mut window = Window::new(
        &format!("hondana | store={}", config.store_path),
        WINDOW_WIDTH,
        WINDOW_HEIGHT,
        WindowOptions::default(),
    )
    .map_err(|error| format!("failed to start UI window: {error}"))?;
    window.limit_update_rate(Some(Duration::from_micros(16_000)));

    let (tx, rx) = mpsc::channel();
    window.set_input_callback(Box::new(CharCollector { tx }));

    let mut state = UiState::new();
    refresh_reading_now(&mut state, service);

    let mut buffer = vec![BACKGROUND; WINDOW_WIDTH * WINDOW_HEIGHT];
    let mut was_mouse_down = false;

    while window.is_open() && !window.is_key_down(Key::Escape) {
        while let Ok(ch) = rx.try_recv() {
            state.push_char(ch);
        }
        if window.is_key_pressed(Key::Backspace, KeyRepeat::Yes) {
            state.pop_char();
        }
        if window.is_key_pressed(Key::Tab, KeyRepeat::No) {
            state.focus = match state.focus {
                Focus::SearchBox => Focus::PagesInput,
                Focus::PagesInput => Focus::SearchBox,
            };
        }
        if window.is_key_pressed(Key::Enter, KeyRepeat::No) {
            let event = if state.modal.is_some() {
                UiEvent::DismissModal
            } else {
                match state.focus {
                    Focus::SearchBox => UiEvent::SubmitSearch,
                    Focus::PagesInput => UiEvent::SaveProgress,
                }
            };
            dispatch(&mut state, service, event);
        }
        if let Some((_, wheel_y)) = window.get_scroll_wheel() {
            state.scroll_results(wheel_y);
        }

        let mouse_down = window.get_mouse_down(MouseButton::Left);
        if mouse_down && !was_mouse_down {
            if let Some((mouse_x, mouse_y)) = window.get_mouse_pos(MouseMode::Clamp) {
                if let Some(event) = hit_test(&state, mouse_x, mouse_y) {
                    dispatch(&mut state, service, event);
                }
            }
        }
        was_mouse_down = mouse_down;

        draw_frame(&mut buffer, &state);
        window.set_title(&build_window_title(config, &state));
        window
            .update_with_buffer(&buffer, WINDOW_WIDTH, WINDOW_HEIGHT)
            .map_err(|error| format!("failed to update UI window: {error}"))?;
        state.tick();
    }

    Ok(())
}

fn dispatch(state: &mut UiState, service: &ApplicationService, event: UiEvent) {
    match event {
        UiEvent::FocusSearchBox => state.focus = Focus::SearchBox,
        UiEvent::FocusPagesInput => {
            if state.detail.is_some() {
                state.focus = Focus::PagesInput;
            }
        }
        UiEvent::SubmitSearch => submit_search(state, service),
        UiEvent::SelectCard(index) => select_card(state, service, index),
        UiEvent::SelectReadingNow(index) => {
            if let Some(entry) = state.reading_now.get(index) {
                state.modal = Some(present_research_notice(&entry.id));
            }
        }
        UiEvent::SaveProgress => save_progress(state, service),
        UiEvent::DismissModal => state.modal = None,
    }
}

fn submit_search(state: &mut UiState, service: &ApplicationService) {
    state.focus = Focus::SearchBox;
    if state.search_input.trim().is_empty() {
        return;
    }

    // Prior results and any open detail are gone either way.
    state.results.clear();
    state.completed.clear();
    state.detail = None;
    state.selected = None;
    state.pages_input.clear();
    state.results_scroll = 0;
    state.searched_once = true;

    match service.search_books(SearchBooksCommand {
        query: state.search_input.clone(),
    }) {
        Ok(records) => {
            state.results = records;
            refresh_completed_flags(state, service);
            load_thumbnails(state, service);
        }
        Err(err) => {
            error!("search failed: {err}");
            state.show_notice(format!("検索に失敗しました: {err}"));
        }
    }
    refresh_reading_now(state, service);
}

fn select_card(state: &mut UiState, service: &ApplicationService, index: usize) {
    let Some(record) = state.results.get(index).cloned() else {
        return;
    };
    match service.book_detail(BookDetailQuery { record }) {
        Ok(view) => {
            state.pages_input = view.pages_read.to_string();
            state.detail = Some(view);
            state.selected = Some(index);
            state.focus = Focus::PagesInput;
            state.detail_flash = FLASH_FRAMES;
        }
        Err(err) => {
            error!("opening detail failed: {err}");
            state.show_notice(err.to_string());
        }
    }
}

fn save_progress(state: &mut UiState, service: &ApplicationService) {
    let Some(detail) = state.detail.clone() else {
        return;
    };
    let requested_pages = parse_pages_input(&state.pages_input);
    match service.save_progress(SaveProgressCommand {
        id: detail.id.clone(),
        total_pages: detail.total_pages,
        requested_pages,
    }) {
        Ok(saved) => {
            if let Some(view) = state.detail.as_mut() {
                view.pages_read = saved.pages_read;
                view.percent = saved.percent;
                view.status = if saved.completed {
                    ReadingStatus::Completed
                } else if saved.pages_read == 0 {
                    ReadingStatus::Known
                } else {
                    ReadingStatus::Reading
                };
            }
            state.pages_input = saved.pages_read.to_string();
            if let Some(index) = state.selected {
                if let Some(flag) = state.completed.get_mut(index) {
                    *flag = saved.completed;
                }
            }
            state.show_notice(PROGRESS_SAVED_MESSAGE.to_string());
            refresh_reading_now(state, service);
        }
        Err(err) => {
            error!("saving progress failed: {err}");
            state.show_notice(err.to_string());
        }
    }
}

fn refresh_reading_now(state: &mut UiState, service: &ApplicationService) {
    match service.reading_now(ReadingNowQuery) {
        Ok(entries) => state.reading_now = entries,
        Err(err) => {
            error!("reading-now recompute failed: {err}");
            state.show_notice(err.to_string());
        }
    }
}

fn refresh_completed_flags(state: &mut UiState, service: &ApplicationService) {
    state.completed = state
        .results
        .iter()
        .map(|record| {
            service
                .book_detail(BookDetailQuery {
                    record: record.clone(),
                })
                .map(|view| view.status == ReadingStatus::Completed)
                .unwrap_or(false)
        })
        .collect();
}

fn load_thumbnails(state: &mut UiState, service: &ApplicationService) {
    for record in &state.results {
        if state.thumbs.contains_key(&record.id) {
            continue;
        }
        let thumb = match service.cover_image(CoverImageQuery {
            url: record.thumbnail.clone(),
        }) {
            Ok(bytes) => decode_thumb(&bytes),
            Err(err) => {
                warn!("thumbnail fetch failed for {}: {err}", record.id);
                None
            }
        };
        state.thumbs.insert(record.id.clone(), thumb);
    }
}

/// Decodes cover bytes and downsamples them into the card thumb box.
fn decode_thumb(bytes: &[u8]) -> Option<CardThumb> {
    let image = image::load_from_memory(bytes).ok()?;
    let source = image.to_rgb8();
    let src_width = source.width() as usize;
    let src_height = source.height() as usize;
    if src_width == 0 || src_height == 0 {
        return None;
    }

    let scale = (THUMB_WIDTH as f32 / src_width as f32)
        .min(THUMB_HEIGHT as f32 / src_height as f32);
    let dst_width = ((src_width as f32 * scale).max(1.0)).round() as usize;
    let dst_height = ((src_height as f32 * scale).max(1.0)).round() as usize;

    let mut pixels = vec![0_u32; dst_width * dst_height];
    for y in 0..dst_height {
        let src_y = y * src_height / dst_height;
        for x in 0..dst_width {
            let src_x = x * src_width / dst_width;
            let pixel = source.get_pixel(src_x as u32, src_y as u32);
            let [r, g, b] = pixel.0;
            pixels[y * dst_width + x] = ((r as u32) << 16) | ((g as u32) << 8) | (b as u32);
        }
    }

    Some(CardThumb {
        width: dst_width,
        height: dst_height,
        pixels,
    })
}

fn parse_pages_input(input: &str) -> i64 {
    input.trim().parse::<i64>().unwrap_or(0)
}

fn hit_test(state: &UiState, mouse_x: f32, mouse_y: f32) -> Option<UiEvent> {
    if state.modal.is_some() {
        return Some(UiEvent::DismissModal);
    }

    let x = mouse_x.max(0.0) as usize;
    let y = mouse_y.max(0.0) as usize;

    if search_button_rect().contains(x, y) {
        return Some(UiEvent::SubmitSearch);
    }
    if search_box_rect().contains(x, y) {
        return Some(UiEvent::FocusSearchBox);
    }
    if state.detail.is_some() {
        if save_button_rect().contains(x, y) {
            return Some(UiEvent::SaveProgress);
        }
        if pages_input_rect().contains(x, y) {
            return Some(UiEvent::FocusPagesInput);
        }
    }
    if let Some(index) = card_at_position(x, y, state.results.len(), state.results_scroll) {
        return Some(UiEvent::SelectCard(index));
    }
    if let Some(index) = reading_now_at_position(x, y, state.reading_now.len()) {
        return Some(UiEvent::SelectReadingNow(index));
    }
    None
}

fn header_rect() -> Rect {
    Rect {
        left: CANVAS_MARGIN,
        top: HEADER_TOP,
        width: WINDOW_WIDTH - 2 * CANVAS_MARGIN,
        height: HEADER_HEIGHT,
    }
}

fn search_button_rect() -> Rect {
    Rect {
        left: WINDOW_WIDTH - CANVAS_MARGIN - 100,
        top: HEADER_TOP + 12,
        width: 100,
        height: 32,
    }
}

fn search_box_rect() -> Rect {
    let left = CANVAS_MARGIN + 120;
    Rect {
        left,
        top: HEADER_TOP + 12,
        width: search_button_rect().left - left - 12,
        height: 32,
    }
}

fn results_panel_rect() -> Rect {
    Rect {
        left: CANVAS_MARGIN,
        top: WORKAREA_TOP,
        width: WINDOW_WIDTH - 2 * CANVAS_MARGIN - DETAIL_PANEL_WIDTH - SPLIT_GUTTER,
        height: WINDOW_HEIGHT
            - WORKAREA_TOP
            - WORKAREA_BOTTOM_MARGIN
            - READING_NOW_HEIGHT
            - SPLIT_GUTTER,
    }
}

fn reading_now_panel_rect() -> Rect {
    let results = results_panel_rect();
    Rect {
        left: results.left,
        top: WINDOW_HEIGHT - WORKAREA_BOTTOM_MARGIN - READING_NOW_HEIGHT,
        width: results.width,
        height: READING_NOW_HEIGHT,
    }
}

fn detail_panel_rect() -> Rect {
    Rect {
        left: WINDOW_WIDTH - CANVAS_MARGIN - DETAIL_PANEL_WIDTH,
        top: WORKAREA_TOP,
        width: DETAIL_PANEL_WIDTH,
        height: WINDOW_HEIGHT - WORKAREA_TOP - WORKAREA_BOTTOM_MARGIN,
    }
}

fn visible_card_count() -> usize {
    let panel = results_panel_rect();
    (panel.height - 2 * CARD_PAD) / (CARD_HEIGHT + CARD_GAP)
}

fn card_rect(index: usize, scroll: usize) -> Option<Rect> {
    if index < scroll {
        return None;
    }
    let row = index - scroll;
    if row >= visible_card_count() {
        return None;
    }
    let panel = results_panel_rect();
    Some(Rect {
        left: panel.left + CARD_PAD,
        top: panel.top + CARD_PAD + row * (CARD_HEIGHT + CARD_GAP),
        width: panel.width - 2 * CARD_PAD,
        height: CARD_HEIGHT,
    })
}

fn card_at_position(x: usize, y: usize, card_count: usize, scroll: usize) -> Option<usize> {
    for index in scroll..card_count {
        let Some(rect) = card_rect(index, scroll) else {
            break;
        };
        if rect.contains(x, y) {
            return Some(index);
        }
    }
    None
}

fn reading_now_row_rect(index: usize) -> Option<Rect> {
    let panel = reading_now_panel_rect();
    let top = panel.top + 30 + index * READING_ROW_HEIGHT;
    if top + READING_ROW_HEIGHT > panel.top + panel.height - 6 {
        return None;
    }
    Some(Rect {
        left: panel.left + CARD_PAD,
        top,
        width: panel.width - 2 * CARD_PAD,
        height: READING_ROW_HEIGHT,
    })
}

fn reading_now_at_position(x: usize, y: usize, entry_count: usize) -> Option<usize> {
    for index in 0..entry_count {
        let Some(rect) = reading_now_row_rect(index) else {
            break;
        };
        if rect.contains(x, y) {
            return Some(index);
        }
    }
    None
}

fn detail_title_y() -> usize {
    detail_panel_rect().top + 16
}

fn detail_description_y() -> usize {
    detail_title_y() + 18 + 24
}

fn detail_total_y() -> usize {
    detail_description_y() + DESCRIPTION_LINES * LINE_HEIGHT + 10
}

fn pages_input_rect() -> Rect {
    let panel = detail_panel_rect();
    Rect {
        left: panel.left + DETAIL_PAD,
        top: detail_total_y() + 24 + 18,
        width: 130,
        height: 26,
    }
}

fn save_button_rect() -> Rect {
    let input = pages_input_rect();
    Rect {
        left: input.left + input.width + 12,
        top: input.top,
        width: 84,
        height: 26,
    }
}

fn progress_bar_rect() -> Rect {
    let panel = detail_panel_rect();
    let input = pages_input_rect();
    Rect {
        left: panel.left + DETAIL_PAD,
        top: input.top + input.height + 16 + 20,
        width: panel.width - 2 * DETAIL_PAD,
        height: 18,
    }
}

fn draw_frame(buffer: &mut [u32], state: &UiState) {
    buffer.fill(BACKGROUND);
    draw_header(buffer, state);
    draw_results_panel(buffer, state);
    draw_detail_panel(buffer, state);
    draw_reading_now_panel(buffer, state);

    if let Some(notice) = &state.notice {
        draw_text(
            buffer,
            WINDOW_WIDTH,
            CANVAS_MARGIN,
            WINDOW_HEIGHT - 16,
            notice,
            TEXT_DIM,
        );
    }
    if let Some(modal) = &state.modal {
        draw_modal(buffer, modal);
    }
}

fn draw_header(buffer: &mut [u32], state: &UiState) {
    let band = header_rect();
    fill_rect(buffer, WINDOW_WIDTH, band, PANEL_FILL);
    draw_rect(buffer, WINDOW_WIDTH, band, PANEL_BORDER);
    draw_text(
        buffer,
        WINDOW_WIDTH,
        band.left + 14,
        band.top + 24,
        "HONDANA",
        TEXT_MAIN,
    );

    let search_box = search_box_rect();
    fill_rect(buffer, WINDOW_WIDTH, search_box, INPUT_FILL);
    let border = if state.focus == Focus::SearchBox {
        FOCUS_BORDER
    } else {
        PANEL_BORDER
    };
    draw_rect(buffer, WINDOW_WIDTH, search_box, border);
    let mut shown = state.search_input.clone();
    if state.focus == Focus::SearchBox {
        shown.push('_');
    }
    draw_text_clipped(
        buffer,
        WINDOW_WIDTH,
        search_box.left + 8,
        search_box.top + 12,
        (search_box.width - 16) / 8,
        &shown,
        TEXT_MAIN,
    );

    let button = search_button_rect();
    fill_rect(buffer, WINDOW_WIDTH, button, BUTTON_FILL);
    draw_text(
        buffer,
        WINDOW_WIDTH,
        button.left + 22,
        button.top + 12,
        "SEARCH",
        PANEL_FILL,
    );
}

fn draw_results_panel(buffer: &mut [u32], state: &UiState) {
    let panel = results_panel_rect();
    fill_rect(buffer, WINDOW_WIDTH, panel, PANEL_FILL);
    draw_rect(buffer, WINDOW_WIDTH, panel, PANEL_BORDER);
    draw_text(
        buffer,
        WINDOW_WIDTH,
        panel.left + CARD_PAD,
        panel.top - 12,
        "RESULTS",
        TEXT_DIM,
    );

    if state.searched_once && state.results.is_empty() {
        draw_text(
            buffer,
            WINDOW_WIDTH,
            panel.left + CARD_PAD,
            panel.top + CARD_PAD + 4,
            NO_RESULTS_MESSAGE,
            TEXT_MAIN,
        );
        return;
    }

    for (index, record) in state.results.iter().enumerate() {
        let Some(card) = card_rect(index, state.results_scroll) else {
            continue;
        };
        let completed = state.completed.get(index).copied().unwrap_or(false);
        let fill = if completed { COMPLETED_FILL } else { INPUT_FILL };
        fill_rect(buffer, WINDOW_WIDTH, card, fill);
        let border = if state.selected == Some(index) {
            FOCUS_BORDER
        } else if completed {
            ACCENT
        } else {
            PANEL_BORDER
        };
        draw_rect(buffer, WINDOW_WIDTH, card, border);

        draw_card_thumb(buffer, state, record, card);
        let text_left = card.left + THUMB_WIDTH + 16;
        let max_chars = (card.left + card.width - text_left - 8) / 8;
        draw_text_clipped(
            buffer,
            WINDOW_WIDTH,
            text_left,
            card.top + 12,
            max_chars,
            &record.title,
            TEXT_MAIN,
        );
        draw_text_clipped(
            buffer,
            WINDOW_WIDTH,
            text_left,
            card.top + 12 + LINE_HEIGHT,
            max_chars,
            &record.authors,
            TEXT_DIM,
        );
        if completed {
            draw_text(
                buffer,
                WINDOW_WIDTH,
                text_left,
                card.top + 12 + 2 * LINE_HEIGHT,
                "READ 100%",
                ACCENT,
            );
        }
    }
}

fn draw_card_thumb(buffer: &mut [u32], state: &UiState, record: &SearchRecord, card: Rect) {
    let box_left = card.left + 8;
    let box_top = card.top + (card.height - THUMB_HEIGHT) / 2;
    let thumb_box = Rect {
        left: box_left,
        top: box_top,
        width: THUMB_WIDTH,
        height: THUMB_HEIGHT,
    };

    match state.thumbs.get(&record.id) {
        Some(Some(thumb)) => {
            let start_x = box_left + (THUMB_WIDTH.saturating_sub(thumb.width)) / 2;
            let start_y = box_top + (THUMB_HEIGHT.saturating_sub(thumb.height)) / 2;
            for y in 0..thumb.height.min(THUMB_HEIGHT) {
                for x in 0..thumb.width.min(THUMB_WIDTH) {
                    set_pixel(
                        buffer,
                        WINDOW_WIDTH,
                        start_x + x,
                        start_y + y,
                        thumb.pixels[y * thumb.width + x],
                    );
                }
            }
        }
        _ => {
            fill_rect(buffer, WINDOW_WIDTH, thumb_box, BAR_TRACK);
            draw_rect(buffer, WINDOW_WIDTH, thumb_box, PANEL_BORDER);
            draw_text(
                buffer,
                WINDOW_WIDTH,
                box_left + THUMB_WIDTH / 2 - 4,
                box_top + THUMB_HEIGHT / 2 - 4,
                "?",
                TEXT_DIM,
            );
        }
    }
}

fn draw_detail_panel(buffer: &mut [u32], state: &UiState) {
    let panel = detail_panel_rect();
    fill_rect(buffer, WINDOW_WIDTH, panel, PANEL_FILL);
    let border = if state.detail_flash > 0 {
        FOCUS_BORDER
    } else {
        PANEL_BORDER
    };
    draw_rect(buffer, WINDOW_WIDTH, panel, border);
    draw_text(
        buffer,
        WINDOW_WIDTH,
        panel.left + DETAIL_PAD,
        panel.top - 12,
        "DETAIL",
        TEXT_DIM,
    );

    let Some(detail) = &state.detail else {
        draw_text(
            buffer,
            WINDOW_WIDTH,
            panel.left + DETAIL_PAD,
            panel.top + 24,
            "SELECT A BOOK",
            TEXT_DIM,
        );
        return;
    };

    let max_chars = (panel.width - 2 * DETAIL_PAD) / 8;
    draw_text_clipped(
        buffer,
        WINDOW_WIDTH,
        panel.left + DETAIL_PAD,
        detail_title_y(),
        max_chars,
        &detail.title,
        TEXT_MAIN,
    );
    draw_text_clipped(
        buffer,
        WINDOW_WIDTH,
        panel.left + DETAIL_PAD,
        detail_title_y() + 18,
        max_chars,
        &format!("著者: {}", detail.authors),
        TEXT_DIM,
    );

    for (row, line) in wrap_text(&detail.description, max_chars)
        .iter()
        .take(DESCRIPTION_LINES)
        .enumerate()
    {
        draw_text(
            buffer,
            WINDOW_WIDTH,
            panel.left + DETAIL_PAD,
            detail_description_y() + row * LINE_HEIGHT,
            line,
            TEXT_DIM,
        );
    }

    draw_text(
        buffer,
        WINDOW_WIDTH,
        panel.left + DETAIL_PAD,
        detail_total_y(),
        &format!("総ページ数: {}", present_total_pages(detail.total_pages)),
        TEXT_MAIN,
    );
    draw_text(
        buffer,
        WINDOW_WIDTH,
        panel.left + DETAIL_PAD,
        detail_total_y() + 24,
        "読んだページ数:",
        TEXT_MAIN,
    );

    let input = pages_input_rect();
    fill_rect(buffer, WINDOW_WIDTH, input, INPUT_FILL);
    let input_border = if state.focus == Focus::PagesInput {
        FOCUS_BORDER
    } else {
        PANEL_BORDER
    };
    draw_rect(buffer, WINDOW_WIDTH, input, input_border);
    let mut shown = state.pages_input.clone();
    if state.focus == Focus::PagesInput {
        shown.push('_');
    }
    draw_text_clipped(
        buffer,
        WINDOW_WIDTH,
        input.left + 8,
        input.top + 9,
        (input.width - 16) / 8,
        &shown,
        TEXT_MAIN,
    );

    let save = save_button_rect();
    fill_rect(buffer, WINDOW_WIDTH, save, BUTTON_FILL);
    draw_text(
        buffer,
        WINDOW_WIDTH,
        save.left + 26,
        save.top + 9,
        "SAVE",
        PANEL_FILL,
    );

    let bar = progress_bar_rect();
    draw_text(
        buffer,
        WINDOW_WIDTH,
        bar.left,
        bar.top - 20,
        &format!("進捗: {}%", detail.percent),
        TEXT_MAIN,
    );
    fill_rect(buffer, WINDOW_WIDTH, bar, BAR_TRACK);
    let filled = Rect {
        left: bar.left,
        top: bar.top,
        width: bar.width * usize::from(detail.percent) / 100,
        height: bar.height,
    };
    fill_rect(buffer, WINDOW_WIDTH, filled, ACCENT);
    draw_rect(buffer, WINDOW_WIDTH, bar, PANEL_BORDER);
}

fn draw_reading_now_panel(buffer: &mut [u32], state: &UiState) {
    let panel = reading_now_panel_rect();
    fill_rect(buffer, WINDOW_WIDTH, panel, PANEL_FILL);
    draw_rect(buffer, WINDOW_WIDTH, panel, PANEL_BORDER);
    draw_text(
        buffer,
        WINDOW_WIDTH,
        panel.left + CARD_PAD,
        panel.top + 10,
        "READING NOW",
        TEXT_DIM,
    );

    if state.reading_now.is_empty() {
        draw_text(
            buffer,
            WINDOW_WIDTH,
            panel.left + CARD_PAD,
            panel.top + 34,
            NO_READING_NOW_MESSAGE,
            TEXT_MAIN,
        );
        return;
    }

    for (index, entry) in state.reading_now.iter().enumerate() {
        let Some(row) = reading_now_row_rect(index) else {
            break;
        };
        let max_chars = (row.width - 8) / 8;
        draw_text_clipped(
            buffer,
            WINDOW_WIDTH,
            row.left + 4,
            row.top + 2,
            max_chars,
            &entry.title,
            TEXT_MAIN,
        );
        draw_text_clipped(
            buffer,
            WINDOW_WIDTH,
            row.left + 4,
            row.top + 2 + LINE_HEIGHT,
            max_chars,
            &present_progress_line(entry.pages_read, entry.total_pages, entry.percent),
            TEXT_DIM,
        );
    }
}

fn draw_modal(buffer: &mut [u32], message: &str) {
    let lines: Vec<&str> = message.split('\n').collect();
    let modal = Rect {
        left: WINDOW_WIDTH / 2 - 280,
        top: WINDOW_HEIGHT / 2 - 70,
        width: 560,
        height: 32 + (lines.len() + 1) * (LINE_HEIGHT + 2),
    };
    fill_rect(buffer, WINDOW_WIDTH, modal, PANEL_FILL);
    draw_rect(buffer, WINDOW_WIDTH, modal, BUTTON_FILL);

    for (row, line) in lines.iter().enumerate() {
        draw_text_clipped(
            buffer,
            WINDOW_WIDTH,
            modal.left + 16,
            modal.top + 16 + row * (LINE_HEIGHT + 2),
            (modal.width - 32) / 8,
            line,
            TEXT_MAIN,
        );
    }
    draw_text(
        buffer,
        WINDOW_WIDTH,
        modal.left + 16,
        modal.top + modal.height - LINE_HEIGHT - 4,
        "CLICK OR ENTER TO CLOSE",
        TEXT_DIM,
    );
}

fn build_window_title(config: &ShelfConfig, state: &UiState) -> String {
    let selected = state
        .selected
        .and_then(|index| state.results.get(index))
        .map(|record| record.id.to_string())
        .unwrap_or_else(|| "none".to_string());
    format!(
        "hondana | store={} | results={} | reading-now={} | selected={} | esc quit",
        config.store_path,
        state.results.len(),
        state.reading_now.len(),
        selected
    )
}

/// Fixed-width chunking by character count; CJK text has no spaces to
/// break on.
fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    if max_chars == 0 {
        return Vec::new();
    }
    let mut lines = Vec::new();
    let mut current = String::new();
    for ch in text.chars() {
        if ch == '\n' || current.chars().count() == max_chars {
            lines.push(std::mem::take(&mut current));
        }
        if ch != '\n' {
            current.push(ch);
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn fill_rect(buffer: &mut [u32], width: usize, rect: Rect, color: u32) {
    for y in rect.top..rect.top.saturating_add(rect.height) {
        for x in rect.left..rect.left.saturating_add(rect.width) {
            set_pixel(buffer, width, x, y, color);
        }
    }
}

fn draw_rect(buffer: &mut [u32], width: usize, rect: Rect, color: u32) {
    if rect.width == 0 || rect.height == 0 {
        return;
    }
    let right = rect.left + rect.width - 1;
    let bottom = rect.top + rect.height - 1;
    for x in rect.left..=right {
        set_pixel(buffer, width, x, rect.top, color);
        set_pixel(buffer, width, x, bottom, color);
    }
    for y in rect.top..=bottom {
        set_pixel(buffer, width, rect.left, y, color);
        set_pixel(buffer, width, right, y, color);
    }
}

fn set_pixel(buffer: &mut [u32], width: usize, x: usize, y: usize, color: u32) {
    let height = buffer.len() / width;
    if x < width && y < height {
        buffer[y * width + x] = color;
    }
}

fn draw_text(buffer: &mut [u32], width: usize, x: usize, y: usize, text: &str, color: u32) {
    let mut cursor_x = x;
    for ch in text.chars() {
        if ch == '\n' {
            continue;
        }
        draw_char(buffer, width, cursor_x, y, ch, color);
        cursor_x = cursor_x.saturating_add(8);
    }
}

fn draw_text_clipped(
    buffer: &mut [u32],
    width: usize,
    x: usize,
    y: usize,
    max_chars: usize,
    text: &str,
    color: u32,
) {
    let clipped: String = text.chars().take(max_chars).collect();
    draw_text(buffer, width, x, y, &clipped, color);
}

fn draw_char(buffer: &mut [u32], width: usize, x: usize, y: usize, ch: char, color: u32) {
    // Kanji are outside the 8x8 font set and render blank.
    let glyph = BASIC_FONTS
        .get(ch)
        .or_else(|| LATIN_FONTS.get(ch))
        .or_else(|| HIRAGANA_FONTS.get(ch))
        .unwrap_or([0; 8]);
    for (row, bits) in glyph.iter().enumerate() {
        for col in 0..8 {
            if (bits >> col) & 1 == 1 {
                set_pixel(buffer, width, x + col, y + row, color);
            }
        }
    }
}
