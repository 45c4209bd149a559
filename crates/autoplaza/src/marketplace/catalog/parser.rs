use std::collections::BTreeSet;
use std::io::Read;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer};

use super::CatalogError;
use crate::marketplace::financing::{BankPartner, BankPartnerId, Incident, IncidentSeverity};
use crate::marketplace::listings::{Listing, ListingId, ListingStatus, UserId};

fn reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader)
}

fn line_of(record: &csv::StringRecord) -> u64 {
    record.position().map(|position| position.line()).unwrap_or(0)
}

fn invalid(line: u64, message: impl Into<String>) -> CatalogError {
    CatalogError::Invalid {
        line,
        message: message.into(),
    }
}

pub(crate) fn parse_listings<R: Read>(input: R) -> Result<Vec<Listing>, CatalogError> {
    let mut csv_reader = reader(input);
    let headers = csv_reader.headers()?.clone();
    let mut listings = Vec::new();

    for record in csv_reader.records() {
        let record = record?;
        let line = line_of(&record);
        let row: ListingRow = record.deserialize(Some(&headers))?;

        let status = ListingStatus::parse(&row.status)
            .ok_or_else(|| invalid(line, format!("unknown listing status '{}'", row.status)))?;
        let created_at = parse_datetime(&row.created_at)
            .ok_or_else(|| invalid(line, format!("unparseable created_at '{}'", row.created_at)))?;

        listings.push(Listing {
            id: ListingId(row.id),
            user_id: UserId(row.user_id),
            brand: row.brand,
            model: row.model,
            year: row.year,
            price: row.price,
            mileage: row.mileage,
            fuel_type: row.fuel_type,
            transmission: row.transmission,
            body_type: row.body_type,
            color: row.color,
            city: row.city,
            status,
            is_featured: row.is_featured.unwrap_or(false),
            views_count: counter(row.views_count),
            likes_count: counter(row.likes_count),
            created_at,
        });
    }

    Ok(listings)
}

pub(crate) fn parse_partners<R: Read>(input: R) -> Result<Vec<BankPartner>, CatalogError> {
    let mut csv_reader = reader(input);
    let headers = csv_reader.headers()?.clone();
    let mut partners = Vec::new();

    for record in csv_reader.records() {
        let record = record?;
        let line = line_of(&record);
        let row: PartnerRow = record.deserialize(Some(&headers))?;

        let requirements: BTreeSet<String> = row
            .requirements
            .as_deref()
            .unwrap_or_default()
            .split(';')
            .map(str::trim)
            .filter(|requirement| !requirement.is_empty())
            .map(str::to_string)
            .collect();

        let partner = BankPartner {
            id: BankPartnerId(row.id),
            name: row.name,
            credit_rate: row.credit_rate,
            min_term: row.min_term,
            max_term: row.max_term,
            min_vehicle_year: row.min_vehicle_year,
            requirements,
            processing_time: row.processing_time,
            is_active: row.is_active,
            incidents: Vec::new(),
        };
        partner
            .validate()
            .map_err(|err| invalid(line, err.to_string()))?;
        partners.push(partner);
    }

    Ok(partners)
}

pub(crate) fn parse_incidents<R: Read>(
    input: R,
) -> Result<Vec<(u64, BankPartnerId, Incident)>, CatalogError> {
    let mut csv_reader = reader(input);
    let headers = csv_reader.headers()?.clone();
    let mut incidents = Vec::new();

    for record in csv_reader.records() {
        let record = record?;
        let line = line_of(&record);
        let row: IncidentRow = record.deserialize(Some(&headers))?;

        let severity = IncidentSeverity::parse(&row.severity)
            .ok_or_else(|| invalid(line, format!("unknown severity '{}'", row.severity)))?;
        let reported_at = parse_datetime(&row.reported_at).ok_or_else(|| {
            invalid(line, format!("unparseable reported_at '{}'", row.reported_at))
        })?;

        incidents.push((
            line,
            BankPartnerId(row.partner_id),
            Incident {
                kind: row.kind,
                severity,
                description: row.description,
                reported_at,
                resolved: row.resolved.unwrap_or(false),
            },
        ));
    }

    Ok(incidents)
}

#[derive(Debug, Deserialize)]
struct ListingRow {
    id: String,
    user_id: String,
    brand: String,
    model: String,
    year: u16,
    price: u64,
    mileage: u32,
    fuel_type: String,
    transmission: String,
    body_type: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    color: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    city: Option<String>,
    status: String,
    #[serde(default)]
    is_featured: Option<bool>,
    #[serde(default)]
    views_count: Option<i64>,
    #[serde(default)]
    likes_count: Option<i64>,
    created_at: String,
}

#[derive(Debug, Deserialize)]
struct PartnerRow {
    id: String,
    name: String,
    credit_rate: f64,
    min_term: u16,
    max_term: u16,
    #[serde(default)]
    min_vehicle_year: Option<u16>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    requirements: Option<String>,
    processing_time: u16,
    is_active: bool,
}

#[derive(Debug, Deserialize)]
struct IncidentRow {
    partner_id: String,
    #[serde(rename = "type")]
    kind: String,
    severity: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    description: Option<String>,
    reported_at: String,
    #[serde(default)]
    resolved: Option<bool>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

/// Missing or negative counters read as zero.
fn counter(value: Option<i64>) -> u64 {
    value.and_then(|count| u64::try_from(count).ok()).unwrap_or(0)
}

fn parse_datetime(value: &str) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_datetime_accepts_rfc3339_and_plain_dates() {
        let rfc = parse_datetime("2026-03-01T10:30:00-06:00").expect("rfc3339 parses");
        assert_eq!(rfc.to_rfc3339(), "2026-03-01T16:30:00+00:00");

        let plain = parse_datetime("2026-03-01").expect("date parses");
        assert_eq!(plain.to_rfc3339(), "2026-03-01T00:00:00+00:00");

        assert!(parse_datetime(" ").is_none());
        assert!(parse_datetime("yesterday").is_none());
    }

    #[test]
    fn counters_clamp_at_zero() {
        assert_eq!(counter(Some(42)), 42);
        assert_eq!(counter(Some(-5)), 0);
        assert_eq!(counter(None), 0);
    }
}
