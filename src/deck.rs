//! Deck list parsing.
//!
//! Deck lists ship as six-column CSV: `cardNumber, cardName, cardId,
//! cardSide, cardType, cardSiteNum`, one header row. Card names embed
//! `|` where a printed comma would break the line format; the parser
//! undoes that substitution. Identity, type, and site number feed the
//! replication core; the unescaped name rides along for the embedder's
//! renderer, while number and side are dropped here.

use thiserror::Error;

use crate::core::{CardId, CardType};

/// Deck list failure, with the 1-based CSV line where applicable.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DeckError {
    #[error("line {line}: expected 6 columns, found {found}")]
    ColumnCount { line: usize, found: usize },

    #[error("line {line}: unknown card type `{value}`")]
    UnknownCardType { line: usize, value: String },

    #[error("line {line}: bad site number `{value}`")]
    BadSiteNumber { line: usize, value: String },

    #[error("deck list is empty")]
    Empty,

    #[error("deck list has no ring-bearer")]
    NoRingBearer,
}

/// One card of a deck list, reduced to what replication needs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeckRecord {
    pub card_id: CardId,
    /// Printed name with the `|`-for-comma substitution undone.
    pub card_name: String,
    pub card_type: CardType,
    /// Printed site number, for site cards only.
    pub site_num: Option<u8>,
}

/// Parse a full deck CSV (header row included).
pub fn parse_deck_csv(text: &str) -> Result<Vec<DeckRecord>, DeckError> {
    let mut records = Vec::new();

    for (idx, line) in text.lines().enumerate().skip(1) {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let lineno = idx + 1;

        let columns: Vec<&str> = line.split(',').collect();
        if columns.len() != 6 {
            return Err(DeckError::ColumnCount {
                line: lineno,
                found: columns.len(),
            });
        }

        let card_type = parse_card_type(columns[4]).ok_or_else(|| DeckError::UnknownCardType {
            line: lineno,
            value: columns[4].trim().to_owned(),
        })?;
        let site_num = parse_site_num(columns[5]).map_err(|value| DeckError::BadSiteNumber {
            line: lineno,
            value,
        })?;

        records.push(DeckRecord {
            card_id: CardId::new(columns[2].trim()),
            card_name: unescape_card_name(columns[1].trim()),
            card_type,
            site_num,
        });
    }

    if records.is_empty() {
        return Err(DeckError::Empty);
    }
    if !records
        .iter()
        .any(|r| r.card_type == CardType::RingBearer)
    {
        return Err(DeckError::NoRingBearer);
    }
    Ok(records)
}

/// Printed type column, tolerant of case and hyphenation
/// ("Ring-Bearer", "ring bearer", "The One Ring").
fn parse_card_type(value: &str) -> Option<CardType> {
    let folded: String = value
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect();
    match folded.as_str() {
        "companion" => Some(CardType::Companion),
        "ringbearer" => Some(CardType::RingBearer),
        "ring" | "theonering" => Some(CardType::Ring),
        "ally" => Some(CardType::Ally),
        "minion" => Some(CardType::Minion),
        "site" => Some(CardType::Site),
        "condition" => Some(CardType::Condition),
        "possession" => Some(CardType::Possession),
        "event" => Some(CardType::Event),
        _ => None,
    }
}

/// Site column: empty or `0` for non-sites, `1..=9` for sites.
fn parse_site_num(value: &str) -> Result<Option<u8>, String> {
    let value = value.trim();
    if value.is_empty() || value == "0" {
        return Ok(None);
    }
    match value.parse::<u8>() {
        Ok(n @ 1..=9) => Ok(Some(n)),
        _ => Err(value.to_owned()),
    }
}

/// Undo the `|`-for-comma substitution in a printed card name.
#[must_use]
pub fn unescape_card_name(name: &str) -> String {
    name.replace('|', ",")
}
