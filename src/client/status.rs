//! Status line shown above the catalog and dashboard

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Loading,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub kind: StatusKind,
    pub message: String,
}

impl StatusLine {
    pub fn new(kind: StatusKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(StatusKind::Info, message)
    }

    pub fn loading(message: impl Into<String>) -> Self {
        Self::new(StatusKind::Loading, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(StatusKind::Success, message)
    }

    pub fn error(message: impl fmt::Display) -> Self {
        Self::new(StatusKind::Error, format!("Erreur: {}", message))
    }
}

impl Default for StatusLine {
    fn default() -> Self {
        Self::info("")
    }
}

impl fmt::Display for StatusLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = match self.kind {
            StatusKind::Info => "i",
            StatusKind::Loading => "…",
            StatusKind::Success => "✓",
            StatusKind::Error => "✗",
        };
        write!(f, "[{}] {}", marker, self.message)
    }
}

/// Non-fatal notice shown when the server cannot be reached
pub fn server_unavailable_notice(error: &str) -> String {
    format!(
        "Serveur non disponible\n\
         Assurez-vous que le serveur est démarré :\n  \
         1. Configurez la base dans config/default.toml ou via DATABASE_URL\n  \
         2. Lancez le serveur catalogue-server\n\
         Erreur actuelle: {}",
        error
    )
}
