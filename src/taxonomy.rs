// 🏷️ Event Taxonomy Normalizer - canonical settlement event types
// Maps free-text marketplace event labels (typos, hyphen variants, SAC
// suffixes) onto a fixed canonical set.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// CANONICAL EVENT TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    /// Standard settlement payout for an order
    #[serde(rename = "Repasse Normal")]
    RepasseNormal,

    /// Return / charge-back deduction correlated to the original payout
    #[serde(rename = "Descontar Hove/Houve")]
    DescontarHove,

    /// Shipping / freight charge-back deduction
    #[serde(rename = "Descontar Reversa Centauro Envios")]
    ReversaCentauroEnvios,

    /// Retroactive deduction, possibly several per order
    #[serde(rename = "Descontar Retroativo")]
    DescontarRetroativo,

    /// Settlement cycle adjustment
    #[serde(rename = "Ajuste de Ciclo")]
    AjusteDeCiclo,

    /// Recognized as an event but not in the known taxonomy
    #[serde(rename = "Outros")]
    Outros,

    /// Empty or absent event label
    #[serde(rename = "Desconhecido")]
    Desconhecido,
}

impl EventType {
    /// All canonical types, in display order
    pub const ALL: [EventType; 7] = [
        EventType::RepasseNormal,
        EventType::DescontarHove,
        EventType::ReversaCentauroEnvios,
        EventType::DescontarRetroativo,
        EventType::AjusteDeCiclo,
        EventType::Outros,
        EventType::Desconhecido,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            EventType::RepasseNormal => "Repasse Normal",
            EventType::DescontarHove => "Descontar Hove/Houve",
            EventType::ReversaCentauroEnvios => "Descontar Reversa Centauro Envios",
            EventType::DescontarRetroativo => "Descontar Retroativo",
            EventType::AjusteDeCiclo => "Ajuste de Ciclo",
            EventType::Outros => "Outros",
            EventType::Desconhecido => "Desconhecido",
        }
    }

    /// Normalize a raw event label into a canonical type.
    ///
    /// Trims and lowercases the input, then matches against every known
    /// spelling variant from the marketplace export (the data contains typos
    /// like "repassse" and inconsistent " - " separators). Empty input maps
    /// to `Desconhecido`, anything non-empty but unrecognized to `Outros`.
    ///
    /// Canonical labels are fixed points: normalizing an already-normalized
    /// label returns the same type.
    pub fn normalize(raw: &str) -> EventType {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return EventType::Desconhecido;
        }

        match trimmed.to_lowercase().as_str() {
            "repasse normal"
            | "repasse - normal"
            | "repassse normal"
            | "repassse - normal" => EventType::RepasseNormal,

            "descontar hove"
            | "descontar houve"
            | "descontar - hove"
            | "descontar - houve"
            | "descontar hove/houve" => EventType::DescontarHove,

            "descontar reversa centauro envios"
            | "descontar - reversa centauro envios" => EventType::ReversaCentauroEnvios,

            "descontar retroativo"
            | "descontar - retroativo"
            | "descontar retroativo sac"
            | "descontar - retroativo sac"
            | "descontar retroativos"
            | "descontar - retroativos"
            | "descontar retroativos sac"
            | "descontar - retroativos sac" => EventType::DescontarRetroativo,

            "ajuste de ciclo" => EventType::AjusteDeCiclo,

            "outros" => EventType::Outros,
            "desconhecido" => EventType::Desconhecido,

            _ => EventType::Outros,
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ============================================================================
// TESTS
// ============================================================================
