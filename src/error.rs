//! Error kinds raised at the ingestion and export boundaries.
//!
//! Per-cell coercion problems never show up here: the normalizer defaults
//! those cells and only counts them (see [`crate::normalize`]).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    /// Mandatory columns are absent; carries the spreadsheet display names.
    #[error("Colonnes requises manquantes : {}.", .missing.join(", "))]
    SchemaValidation { missing: Vec<String> },
    #[error("Erreur de traitement des données du fichier: {0}")]
    Processing(String),
    #[error("Type de fichier invalide '{0}'. Veuillez téléverser un fichier .xlsx.")]
    UnsupportedFileType(String),
    #[error("Un téléversement est déjà en cours.")]
    UploadInProgress,
    #[error("Aucune donnée filtrée à télécharger.")]
    EmptyExport,
    #[error("Lecture du fichier impossible: {0}")]
    Io(#[from] std::io::Error),
}

impl IngestError {
    /// Whether the session should fall back to known-good data after this error.
    pub fn triggers_fallback(&self) -> bool {
        !matches!(self, IngestError::EmptyExport | IngestError::UploadInProgress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_validation_lists_display_names() {
        let err = IngestError::SchemaValidation {
            missing: vec!["Réfèrence pièce".to_string(), "Description".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Colonnes requises manquantes : Réfèrence pièce, Description."
        );
    }

    #[test]
    fn empty_export_does_not_trigger_fallback() {
        assert!(!IngestError::EmptyExport.triggers_fallback());
        assert!(IngestError::Processing("boom".into()).triggers_fallback());
    }
}
