use hondana_domain::{
    clamp_pages, progress_percent, reading_status, BookInfo, ProgressRecord, ReadingNowEntry,
    SearchRecord, FALLBACK_PAGES_INPUT_MAX,
};

use crate::{
    ApplicationError, BookDetailQuery, BookDetailView, BootstrapStoreCommand, CatalogClient,
    CoverImageQuery, ProgressStore, ReadingNowQuery, SaveProgressCommand, SavedProgress,
    SearchBooksCommand, StoredInfoQuery,
};

pub struct ApplicationService {
    store: Box<dyn ProgressStore>,
    catalog: Box<dyn CatalogClient>,
}

impl ApplicationService {
    pub fn new(store: Box<dyn ProgressStore>, catalog: Box<dyn CatalogClient>) -> Self {
        Self { store, catalog }
    }

    pub fn bootstrap_store(&self, _command: BootstrapStoreCommand) -> Result<(), ApplicationError> {
        self.store.initialize()
    }

    /// Runs one catalog search and caches the metadata of every hit.
    /// A blank query is a no-op: no request is issued.
    pub fn search_books(
        &self,
        command: SearchBooksCommand,
    ) -> Result<Vec<SearchRecord>, ApplicationError> {
        let query = command.query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let records = self.catalog.search(query)?;
        for record in &records {
            self.store.put_info(&record.info())?;
        }
        Ok(records)
    }

    pub fn book_detail(&self, query: BookDetailQuery) -> Result<BookDetailView, ApplicationError> {
        let record = query.record;
        let pages_read = self
            .store
            .pages(&record.id)?
            .map(|progress| progress.pages_read)
            .unwrap_or(0);
        let percent = progress_percent(pages_read, record.total_pages);
        let status = reading_status(Some(&record.info()), pages_read);
        let pages_input_max = if record.total_pages > 0 {
            record.total_pages
        } else {
            FALLBACK_PAGES_INPUT_MAX
        };

        Ok(BookDetailView {
            id: record.id,
            title: record.title,
            thumbnail: record.thumbnail,
            authors: record.authors,
            description: record.description,
            total_pages: record.total_pages,
            pages_read,
            percent,
            status,
            pages_input_max,
        })
    }

    pub fn save_progress(
        &self,
        command: SaveProgressCommand,
    ) -> Result<SavedProgress, ApplicationError> {
        let pages_read = clamp_pages(command.requested_pages, command.total_pages);
        self.store
            .put_pages(&command.id, ProgressRecord { pages_read })?;

        let percent = progress_percent(pages_read, command.total_pages);
        Ok(SavedProgress {
            pages_read,
            percent,
            completed: percent == 100,
        })
    }

    /// Rebuilds the "currently reading" list from storage. Books with no
    /// progress, implausible progress, undecodable metadata, or exactly
    /// 100% are left out; finished books drop off by design.
    pub fn reading_now(
        &self,
        _query: ReadingNowQuery,
    ) -> Result<Vec<ReadingNowEntry>, ApplicationError> {
        let mut ids = self.store.progress_book_ids()?;
        ids.sort();
        ids.dedup();

        let mut entries = Vec::new();
        for id in ids {
            let Some(progress) = self.store.pages(&id)? else {
                continue;
            };
            if progress.pages_read == 0 || !progress.is_plausible() {
                continue;
            }
            let Some(info) = self.store.info(&id)? else {
                continue;
            };
            let percent = progress_percent(progress.pages_read, info.total_pages);
            if percent == 100 {
                continue;
            }
            entries.push(ReadingNowEntry {
                id,
                title: info.title,
                thumbnail: info.thumbnail,
                pages_read: progress.pages_read,
                total_pages: info.total_pages,
                percent,
            });
        }
        Ok(entries)
    }

    pub fn stored_info(&self, query: StoredInfoQuery) -> Result<Option<BookInfo>, ApplicationError> {
        self.store.info(&query.id)
    }

    pub fn cover_image(&self, query: CoverImageQuery) -> Result<Vec<u8>, ApplicationError> {
        self.catalog.fetch_thumbnail(&query.url)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;
    use std::rc::Rc;

    use hondana_domain::BookId;

    use super::*;

    #[derive(Default)]
    struct FakeStore {
        infos: RefCell<HashMap<BookId, BookInfo>>,
        pages: RefCell<HashMap<BookId, u32>>,
        initialized: Cell<bool>,
    }

    impl ProgressStore for FakeStore {
        fn initialize(&self) -> Result<(), ApplicationError> {
            self.initialized.set(true);
            Ok(())
        }

        fn pages(&self, id: &BookId) -> Result<Option<ProgressRecord>, ApplicationError> {
            Ok(self
                .pages
                .borrow()
                .get(id)
                .map(|&pages_read| ProgressRecord { pages_read }))
        }

        fn put_pages(&self, id: &BookId, record: ProgressRecord) -> Result<(), ApplicationError> {
            self.pages.borrow_mut().insert(id.clone(), record.pages_read);
            Ok(())
        }

        fn info(&self, id: &BookId) -> Result<Option<BookInfo>, ApplicationError> {
            Ok(self.infos.borrow().get(id).cloned())
        }

        fn put_info(&self, info: &BookInfo) -> Result<(), ApplicationError> {
            self.infos.borrow_mut().insert(info.id.clone(), info.clone());
            Ok(())
        }

        fn progress_book_ids(&self) -> Result<Vec<BookId>, ApplicationError> {
            Ok(self.pages.borrow().keys().cloned().collect())
        }
    }

    #[derive(Default)]
    struct FakeCatalog {
        results: RefCell<Vec<SearchRecord>>,
        fail: Cell<bool>,
        calls: Rc<Cell<usize>>,
    }

    impl CatalogClient for FakeCatalog {
        fn search(&self, _query: &str) -> Result<Vec<SearchRecord>, ApplicationError> {
            self.calls.set(self.calls.get() + 1);
            if self.fail.get() {
                return Err(ApplicationError::Network("connection refused".to_string()));
            }
            Ok(self.results.borrow().clone())
        }

        fn fetch_thumbnail(&self, _url: &str) -> Result<Vec<u8>, ApplicationError> {
            Ok(Vec::new())
        }
    }

    fn record(id: &str, total_pages: u32) -> SearchRecord {
        SearchRecord {
            id: BookId::new(id).expect("id"),
            title: format!("title-{id}"),
            thumbnail: format!("http://example.com/{id}.jpg"),
            authors: "著者不明".to_string(),
            description: "説明なし".to_string(),
            total_pages,
        }
    }

    struct Harness {
        service: ApplicationService,
    }

    impl Harness {
        fn new(results: Vec<SearchRecord>) -> Self {
            let catalog = FakeCatalog::default();
            *catalog.results.borrow_mut() = results;
            Self {
                service: ApplicationService::new(
                    Box::new(FakeStore::default()),
                    Box::new(catalog),
                ),
            }
        }

        fn search(&self, query: &str) -> Vec<SearchRecord> {
            self.service
                .search_books(SearchBooksCommand {
                    query: query.to_string(),
                })
                .expect("search should work")
        }

        fn save(&self, record: &SearchRecord, requested_pages: i64) -> SavedProgress {
            self.service
                .save_progress(SaveProgressCommand {
                    id: record.id.clone(),
                    total_pages: record.total_pages,
                    requested_pages,
                })
                .expect("save should work")
        }

        fn reading_now(&self) -> Vec<ReadingNowEntry> {
            self.service
                .reading_now(ReadingNowQuery)
                .expect("reading-now should work")
        }
    }

    #[test]
    fn blank_query_issues_no_request() {
        let catalog = FakeCatalog::default();
        let calls = Rc::clone(&catalog.calls);
        let service = ApplicationService::new(Box::new(FakeStore::default()), Box::new(catalog));
        let results = service
            .search_books(SearchBooksCommand {
                query: "   ".to_string(),
            })
            .expect("blank query is a no-op");
        assert!(results.is_empty());
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn search_caches_info_for_every_result() {
        let harness = Harness::new(vec![record("a", 300), record("b", 0)]);
        let results = harness.search("botchan");
        assert_eq!(results.len(), 2);

        for record in &results {
            let stored = harness
                .service
                .stored_info(StoredInfoQuery {
                    id: record.id.clone(),
                })
                .expect("lookup should work")
                .expect("info should be cached");
            assert_eq!(stored, record.info());
        }
    }

    #[test]
    fn network_failure_propagates() {
        let catalog = FakeCatalog::default();
        catalog.fail.set(true);
        let service = ApplicationService::new(Box::new(FakeStore::default()), Box::new(catalog));
        let result = service.search_books(SearchBooksCommand {
            query: "botchan".to_string(),
        });
        assert!(matches!(result, Err(ApplicationError::Network(_))));
    }

    #[test]
    fn save_clamps_negative_input_to_zero() {
        let harness = Harness::new(vec![record("a", 200)]);
        let book = harness.search("x")[0].clone();
        let saved = harness.save(&book, -5);
        assert_eq!(saved.pages_read, 0);
        assert_eq!(saved.percent, 0);
        assert!(!saved.completed);
    }

    #[test]
    fn save_clamps_overflow_to_total() {
        let harness = Harness::new(vec![record("a", 300)]);
        let book = harness.search("x")[0].clone();
        let saved = harness.save(&book, 500);
        assert_eq!(saved.pages_read, 300);
        assert_eq!(saved.percent, 100);
        assert!(saved.completed);
    }

    #[test]
    fn double_save_is_idempotent() {
        let harness = Harness::new(vec![record("a", 300)]);
        let book = harness.search("x")[0].clone();
        let first = harness.save(&book, 150);
        let second = harness.save(&book, 150);
        assert_eq!(first, second);

        let detail = harness
            .service
            .book_detail(BookDetailQuery {
                record: book.clone(),
            })
            .expect("detail should work");
        assert_eq!(detail.pages_read, 150);
        assert_eq!(detail.percent, 50);
    }

    #[test]
    fn detail_prefills_from_store_and_bounds_input() {
        let harness = Harness::new(vec![record("a", 300), record("b", 0)]);
        let results = harness.search("x");
        harness.save(&results[0], 150);

        let known = harness
            .service
            .book_detail(BookDetailQuery {
                record: results[0].clone(),
            })
            .expect("detail should work");
        assert_eq!(known.pages_read, 150);
        assert_eq!(known.percent, 50);
        assert_eq!(known.status, hondana_domain::ReadingStatus::Reading);
        assert_eq!(known.pages_input_max, 300);

        let unknown = harness
            .service
            .book_detail(BookDetailQuery {
                record: results[1].clone(),
            })
            .expect("detail should work");
        assert_eq!(unknown.pages_read, 0);
        assert_eq!(unknown.percent, 0);
        assert_eq!(unknown.status, hondana_domain::ReadingStatus::Known);
        assert_eq!(unknown.pages_input_max, FALLBACK_PAGES_INPUT_MAX);
    }

    #[test]
    fn reading_now_lists_partially_read_books() {
        let harness = Harness::new(vec![record("a", 300)]);
        let book = harness.search("botchan")[0].clone();
        harness.save(&book, 150);

        let entries = harness.reading_now();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, book.id);
        assert_eq!(entries[0].pages_read, 150);
        assert_eq!(entries[0].total_pages, 300);
        assert_eq!(entries[0].percent, 50);
    }

    #[test]
    fn finishing_a_book_drops_it_from_reading_now() {
        let harness = Harness::new(vec![record("a", 300)]);
        let book = harness.search("botchan")[0].clone();
        harness.save(&book, 150);
        assert_eq!(harness.reading_now().len(), 1);

        let saved = harness.save(&book, 300);
        assert!(saved.completed);
        assert!(harness.reading_now().is_empty());

        // Dropping back under 100% puts it back on the list.
        harness.save(&book, 299);
        assert_eq!(harness.reading_now().len(), 1);
    }

    #[test]
    fn reading_now_skips_zero_progress() {
        let harness = Harness::new(vec![record("a", 300)]);
        let book = harness.search("x")[0].clone();
        harness.save(&book, 0);
        assert!(harness.reading_now().is_empty());
    }

    #[test]
    fn reading_now_skips_implausible_progress() {
        let harness = Harness::new(vec![record("a", 0)]);
        let book = harness.search("x")[0].clone();
        harness.save(&book, 1_000_000);
        assert!(harness.reading_now().is_empty());
    }

    #[test]
    fn reading_now_skips_books_without_metadata() {
        let service =
            ApplicationService::new(Box::new(FakeStore::default()), Box::new(FakeCatalog::default()));
        service
            .save_progress(SaveProgressCommand {
                id: BookId::new("orphan").expect("id"),
                total_pages: 300,
                requested_pages: 150,
            })
            .expect("save should work");
        assert!(service
            .reading_now(ReadingNowQuery)
            .expect("reading-now should work")
            .is_empty());
    }

    #[test]
    fn reading_now_includes_unknown_total_as_zero_percent() {
        let harness = Harness::new(vec![record("a", 0)]);
        let book = harness.search("x")[0].clone();
        harness.save(&book, 42);

        let entries = harness.reading_now();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].percent, 0);
        assert_eq!(entries[0].total_pages, 0);
    }

    #[test]
    fn reading_now_is_ordered_by_id() {
        let harness = Harness::new(vec![record("b", 100), record("a", 100)]);
        let results = harness.search("x");
        harness.save(&results[0], 10);
        harness.save(&results[1], 10);

        let entries = harness.reading_now();
        let ids: Vec<&str> = entries.iter().map(|entry| entry.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }
}
