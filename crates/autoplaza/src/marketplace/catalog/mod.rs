//! CSV import of listings, bank partners, and partner incidents.

mod parser;

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use crate::marketplace::financing::{BankPartner, BankPartnerId};
use crate::marketplace::listings::Listing;

#[derive(Debug)]
pub enum CatalogError {
    Io(std::io::Error),
    Csv(csv::Error),
    Invalid { line: u64, message: String },
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogError::Io(err) => write!(f, "failed to read catalog file: {}", err),
            CatalogError::Csv(err) => write!(f, "invalid catalog CSV data: {}", err),
            CatalogError::Invalid { line, message } => {
                write!(f, "invalid catalog row at line {}: {}", line, message)
            }
        }
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CatalogError::Io(err) => Some(err),
            CatalogError::Csv(err) => Some(err),
            CatalogError::Invalid { .. } => None,
        }
    }
}

impl From<std::io::Error> for CatalogError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for CatalogError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

pub struct CatalogImporter;

impl CatalogImporter {
    pub fn listings_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<Listing>, CatalogError> {
        let file = std::fs::File::open(path)?;
        Self::listings_from_reader(file)
    }

    pub fn listings_from_reader<R: Read>(reader: R) -> Result<Vec<Listing>, CatalogError> {
        parser::parse_listings(reader)
    }

    /// Partners from one file, with incidents from an optional second file joined by partner id.
    pub fn partners_from_paths<P: AsRef<Path>>(
        partners: P,
        incidents: Option<P>,
    ) -> Result<Vec<BankPartner>, CatalogError> {
        let partners = std::fs::File::open(partners)?;
        match incidents {
            Some(path) => {
                let incidents = std::fs::File::open(path)?;
                Self::partners_from_readers(partners, Some(incidents))
            }
            None => Self::partners_from_readers(partners, None::<std::fs::File>),
        }
    }

    pub fn partners_from_readers<R: Read, I: Read>(
        partners: R,
        incidents: Option<I>,
    ) -> Result<Vec<BankPartner>, CatalogError> {
        let mut partners = parser::parse_partners(partners)?;
        let Some(incidents) = incidents else {
            return Ok(partners);
        };

        let index: HashMap<BankPartnerId, usize> = partners
            .iter()
            .enumerate()
            .map(|(position, partner)| (partner.id.clone(), position))
            .collect();

        for (line, partner_id, incident) in parser::parse_incidents(incidents)? {
            let position = index.get(&partner_id).ok_or_else(|| CatalogError::Invalid {
                line,
                message: format!("incident references unknown partner '{}'", partner_id.0),
            })?;
            partners[*position].record_incident(incident);
        }

        Ok(partners)
    }
}
