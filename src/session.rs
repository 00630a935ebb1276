//! Single-user session: the record set, live filters and upload state.
//!
//! The session is the only owner of mutable state. Filters and aggregates are
//! recomputed from it on demand, and every ingestion failure leaves it holding
//! the built-in sample dataset plus a [`Notice`] describing what happened.

use std::{
    io::{self, Read},
    path::{Path, PathBuf},
};

use anyhow::Result;
use log::{debug, info, warn};

use crate::{
    aggregate::Dashboard,
    cli::{FilterArgs, SourceArgs},
    data::Record,
    error::IngestError,
    export::{self, ExportTable},
    filter::{self, FilterState},
    io_utils,
    normalize::{Dataset, normalize},
    sample,
    schema::SchemaMapper,
    workbook,
};

pub const DEFAULT_DATASET_PATH: &str = "assets/Tableau_Final_Items_Critiques.xlsx";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    /// Emits the notice through the logger at a matching level.
    pub fn log(&self) {
        match self.level {
            NoticeLevel::Error => warn!("{}", self.message),
            NoticeLevel::Success => info!("{}", self.message),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataOrigin {
    Sample,
    Workbook(PathBuf),
    Upload(String),
}

/// Proof that an upload was accepted and is in flight.
#[derive(Debug)]
pub struct UploadTicket {
    file_name: String,
}

#[derive(Debug, Clone)]
pub struct Session {
    mapper: SchemaMapper,
    dataset: Dataset,
    origin: DataOrigin,
    filters: FilterState,
    is_loading: bool,
    selected_file_name: String,
    notice: Option<Notice>,
}

impl Session {
    /// Fresh session holding the sample dataset.
    pub fn new(mapper: SchemaMapper) -> Self {
        Self {
            mapper,
            dataset: sample::sample_dataset(),
            origin: DataOrigin::Sample,
            filters: FilterState::default(),
            is_loading: false,
            selected_file_name: String::new(),
            notice: None,
        }
    }

    /// Builds a session from command-line source and filter flags.
    pub fn from_args(source: &SourceArgs, filters: &FilterArgs) -> Result<Self> {
        let mapper = SchemaMapper::from_options(source.mapping.as_deref(), source.require_segment)?;
        let mut session = Session::new(mapper);
        if let Err(err) = session.load_default(&source.input) {
            debug!("Default dataset unavailable: {err}");
        }
        if let Some(path) = &source.upload {
            let name = source
                .upload_name
                .clone()
                .unwrap_or_else(|| io_utils::display_name(path));
            if let Err(err) = session.upload_path(&name, path) {
                debug!("Upload of {name} rejected: {err}");
            }
        }
        if let Some(notice) = session.notice() {
            notice.log();
        }
        filters.apply_to(session.filters_mut());
        Ok(session)
    }

    pub fn records(&self) -> &[Record] {
        &self.dataset.records
    }

    pub fn origin(&self) -> &DataOrigin {
        &self.origin
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn selected_file_name(&self) -> &str {
        &self.selected_file_name
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn filters_mut(&mut self) -> &mut FilterState {
        &mut self.filters
    }

    /// Loads the well-known workbook, falling back to sample data when it is
    /// missing or cannot be normalized. Refused while an upload is in flight.
    pub fn load_default(&mut self, path: &Path) -> Result<(), IngestError> {
        self.refuse_while_loading()?;
        self.is_loading = true;
        self.selected_file_name.clear();
        self.notice = None;
        let result = if path.exists() {
            workbook::read_path(path).and_then(|table| normalize(&table, &self.mapper))
        } else {
            Err(IngestError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} introuvable", io_utils::display_name(path)),
            )))
        };
        self.is_loading = false;
        match result {
            Ok(dataset) => {
                info!(
                    "Loaded {} record(s) from {}",
                    dataset.len(),
                    path.display()
                );
                self.replace(dataset, DataOrigin::Workbook(path.to_path_buf()));
                Ok(())
            }
            Err(err) => {
                let message =
                    format!("Erreur fichier par défaut: {err}. Chargement données exemples.");
                Err(self.fail(err, message))
            }
        }
    }

    /// Accepts one upload. The loading flag stays set until
    /// [`Session::finish_upload`] consumes the ticket.
    pub fn begin_upload(&mut self, file_name: &str) -> Result<UploadTicket, IngestError> {
        self.refuse_while_loading()?;
        if let Err(err) = workbook::ensure_supported(file_name) {
            let message = err.to_string();
            return Err(self.fail(err, message));
        }
        self.selected_file_name = file_name.to_string();
        self.is_loading = true;
        Ok(UploadTicket {
            file_name: file_name.to_string(),
        })
    }

    /// Reads and normalizes the uploaded workbook, replacing the record set
    /// only when every step succeeded.
    pub fn finish_upload<R: Read>(
        &mut self,
        ticket: UploadTicket,
        source: R,
    ) -> Result<(), IngestError> {
        let result = workbook::read_from(source).and_then(|table| normalize(&table, &self.mapper));
        self.is_loading = false;
        match result {
            Ok(dataset) => {
                info!(
                    "Uploaded {} record(s) from {}",
                    dataset.len(),
                    ticket.file_name
                );
                self.replace(dataset, DataOrigin::Upload(ticket.file_name));
                self.notice = Some(Notice::success(
                    "Fichier téléversé et traité avec succès!",
                ));
                Ok(())
            }
            Err(err) => Err(self.upload_failed(ticket, err)),
        }
    }

    pub fn upload<R: Read>(&mut self, file_name: &str, source: R) -> Result<(), IngestError> {
        let ticket = self.begin_upload(file_name)?;
        self.finish_upload(ticket, source)
    }

    /// Uploads the workbook at `path` (`-` reads stdin) under `file_name`. An
    /// unopenable path fails the upload like an unreadable workbook.
    pub fn upload_path(&mut self, file_name: &str, path: &Path) -> Result<(), IngestError> {
        let ticket = self.begin_upload(file_name)?;
        match io_utils::open_input(path) {
            Ok(reader) => self.finish_upload(ticket, reader),
            Err(err) => Err(self.upload_failed(ticket, err.into())),
        }
    }

    pub fn set_filter_pn(&mut self, value: &str) {
        self.filters.set_pn(value);
    }

    pub fn set_filter_urgency(&mut self, value: &str) {
        self.filters.set_urgency(value);
    }

    pub fn set_filter_ac_reg(&mut self, value: &str) {
        self.filters.set_ac_reg(value);
    }

    pub fn set_filter_min_score(&mut self, value: &str) {
        self.filters.set_min_score(value);
    }

    pub fn set_filter_annee(&mut self, value: &str) {
        self.filters.set_annee(value);
    }

    pub fn working_subset(&self) -> Vec<Record> {
        filter::apply(&self.dataset.records, &self.filters)
    }

    pub fn dashboard(&self) -> Dashboard {
        let subset = self.working_subset();
        Dashboard::compute(&self.dataset.records, &subset)
    }

    /// Export rows for the working subset; an empty subset is reported as
    /// [`IngestError::EmptyExport`].
    pub fn export(&self) -> Result<ExportTable, IngestError> {
        let subset = self.working_subset();
        if subset.is_empty() {
            return Err(IngestError::EmptyExport);
        }
        Ok(export::project(&subset))
    }

    fn refuse_while_loading(&mut self) -> Result<(), IngestError> {
        if !self.is_loading {
            return Ok(());
        }
        let err = IngestError::UploadInProgress;
        self.notice = Some(Notice::error(err.to_string()));
        Err(err)
    }

    fn upload_failed(&mut self, ticket: UploadTicket, err: IngestError) -> IngestError {
        self.is_loading = false;
        debug!("Upload of {} failed", ticket.file_name);
        let message = format!("Erreur: {err} Données exemples chargées.");
        self.fail(err, message)
    }

    /// Publishes `message` and, unless `err` leaves the current data valid,
    /// swaps in the sample dataset.
    fn fail(&mut self, err: IngestError, message: String) -> IngestError {
        if err.triggers_fallback() {
            self.fall_back_to_sample();
        }
        self.notice = Some(Notice::error(message));
        err
    }

    fn replace(&mut self, dataset: Dataset, origin: DataOrigin) {
        self.dataset = dataset;
        self.origin = origin;
    }

    fn fall_back_to_sample(&mut self) {
        warn!("Falling back to the built-in sample dataset");
        self.replace(sample::sample_dataset(), DataOrigin::Sample);
        self.selected_file_name.clear();
        self.is_loading = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_is_never_empty() {
        let session = Session::new(SchemaMapper::new());
        assert_eq!(session.records().len(), 14);
        assert_eq!(session.origin(), &DataOrigin::Sample);
        assert!(!session.filters().is_active());
    }

    #[test]
    fn missing_default_file_falls_back_with_notice() {
        let mut session = Session::new(SchemaMapper::new());
        let result = session.load_default(Path::new("does/not/exist.xlsx"));
        assert!(matches!(result, Err(IngestError::Io(_))));
        assert_eq!(session.origin(), &DataOrigin::Sample);
        let notice = session.notice().expect("notice");
        assert_eq!(notice.level, NoticeLevel::Error);
        assert!(notice.message.contains("exist.xlsx introuvable"));
        assert!(!session.is_loading());
    }

    #[test]
    fn second_upload_is_refused_while_first_is_in_flight() {
        let mut session = Session::new(SchemaMapper::new());
        let ticket = session.begin_upload("a.xlsx").expect("first upload");
        assert!(session.is_loading());
        assert!(matches!(
            session.begin_upload("b.xlsx"),
            Err(IngestError::UploadInProgress)
        ));
        assert_eq!(session.selected_file_name(), "a.xlsx");
        let result = session.finish_upload(ticket, &b"corrupt"[..]);
        assert!(matches!(result, Err(IngestError::Processing(_))));
        assert!(!session.is_loading());
        assert_eq!(session.selected_file_name(), "");
        assert_eq!(session.records().len(), 14);
    }

    #[test]
    fn wrong_extension_is_rejected_before_reading() {
        let mut session = Session::new(SchemaMapper::new());
        session.set_filter_pn("PN00");
        let result = session.upload("donnees.csv", FailingReader);
        assert!(matches!(result, Err(IngestError::UnsupportedFileType(_))));
        assert_eq!(session.origin(), &DataOrigin::Sample);
        assert_eq!(session.notice().map(|n| n.level), Some(NoticeLevel::Error));
    }

    #[test]
    fn export_of_empty_subset_is_reported() {
        let mut session = Session::new(SchemaMapper::new());
        session.set_filter_min_score("1000");
        assert!(matches!(session.export(), Err(IngestError::EmptyExport)));
        session.set_filter_min_score("0");
        assert_eq!(session.export().expect("export").rows.len(), 14);
    }

    #[test]
    fn unopenable_upload_reports_the_io_error() {
        let mut session = Session::new(SchemaMapper::new());
        let result = session.upload_path("absent.xlsx", Path::new("does/not/absent.xlsx"));
        assert!(matches!(result, Err(IngestError::Io(_))));
        assert!(!session.is_loading());
        assert_eq!(session.origin(), &DataOrigin::Sample);
        let notice = session.notice().expect("notice");
        assert_eq!(notice.level, NoticeLevel::Error);
        assert!(notice.message.starts_with("Erreur: Lecture du fichier impossible"));
        assert!(notice.message.contains("absent.xlsx"));
    }

    #[test]
    fn default_load_is_refused_while_upload_is_in_flight() {
        let mut session = Session::new(SchemaMapper::new());
        let ticket = session.begin_upload("a.xlsx").expect("first upload");
        assert!(matches!(
            session.load_default(Path::new("does/not/exist.xlsx")),
            Err(IngestError::UploadInProgress)
        ));
        assert!(session.is_loading());
        assert!(matches!(
            session.begin_upload("b.xlsx"),
            Err(IngestError::UploadInProgress)
        ));
        assert_eq!(session.selected_file_name(), "a.xlsx");
        let _ = session.finish_upload(ticket, &b""[..]);
        assert!(!session.is_loading());
    }

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            panic!("file contents must not be read for unsupported uploads");
        }
    }
}
