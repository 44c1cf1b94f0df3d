use hondana_domain::{BookId, ReadingNowEntry, SearchRecord};

pub const NO_RESULTS_MESSAGE: &str = "本が見つかりませんでした。";
pub const NO_READING_NOW_MESSAGE: &str = "今読み進めている本はありません。";
pub const PROGRESS_SAVED_MESSAGE: &str = "進捗を保存しました！";

pub fn present_search_row(record: &SearchRecord) -> String {
    format!(
        "{}\t{}\t{}\t{}",
        record.id,
        present_total_pages(record.total_pages),
        record.authors,
        record.title
    )
}

pub fn present_total_pages(total_pages: u32) -> String {
    if total_pages > 0 {
        format!("{total_pages}ページ")
    } else {
        "不明".to_string()
    }
}

pub fn present_progress_line(pages_read: u32, total_pages: u32, percent: u8) -> String {
    format!("進捗: {percent}% ({pages_read} / {total_pages}ページ)")
}

pub fn present_reading_now_row(entry: &ReadingNowEntry) -> String {
    format!(
        "{}\t{}",
        entry.title,
        present_progress_line(entry.pages_read, entry.total_pages, entry.percent)
    )
}

/// Detail view needs the book in the current result set; entries picked
/// from the reading-now list only carry the id to search for again.
pub fn present_research_notice(id: &BookId) -> String {
    format!("詳細を表示するには、検索して該当の本をクリックしてください。\n\n本のID: {id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_pages_display() {
        assert_eq!(present_total_pages(300), "300ページ");
        assert_eq!(present_total_pages(0), "不明");
    }

    #[test]
    fn progress_line_format() {
        assert_eq!(
            present_progress_line(150, 300, 50),
            "進捗: 50% (150 / 300ページ)"
        );
    }

    #[test]
    fn reading_now_row_carries_title_and_progress() {
        let entry = ReadingNowEntry {
            id: BookId::new("abc").expect("id"),
            title: "坊っちゃん".to_string(),
            thumbnail: "u".to_string(),
            pages_read: 150,
            total_pages: 300,
            percent: 50,
        };
        let row = present_reading_now_row(&entry);
        assert!(row.contains("坊っちゃん"));
        assert!(row.contains("50% (150 / 300ページ)"));
    }

    #[test]
    fn research_notice_names_the_book_id() {
        let id = BookId::new("abc123").expect("id");
        assert!(present_research_notice(&id).contains("本のID: abc123"));
    }
}
