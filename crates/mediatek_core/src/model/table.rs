//! Table identifiers with bespoke routing.
//!
//! Identifiers outside this set are still valid targets; they are served by
//! the generic single-table operations.

use std::fmt::{Display, Formatter};

/// Known table or pseudo-table identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Table {
    Genre,
    Public,
    Rayon,
    Etat,
    Suivi,
    Livre,
    Dvd,
    Revue,
    Exemplaire,
    /// Spans `commande` and `commandedocument`.
    CommandeDocument,
    /// All rows of `commande`, whatever their subtype.
    Commandes,
    /// Spans `commande` and `abonnement`.
    Abonnement,
    /// Subscriptions ending within the next 30 days.
    Expiration,
}

impl Table {
    pub const ALL: [Table; 13] = [
        Table::Genre,
        Table::Public,
        Table::Rayon,
        Table::Etat,
        Table::Suivi,
        Table::Livre,
        Table::Dvd,
        Table::Revue,
        Table::Exemplaire,
        Table::CommandeDocument,
        Table::Commandes,
        Table::Abonnement,
        Table::Expiration,
    ];

    pub const LOOKUPS: [Table; 5] = [
        Table::Genre,
        Table::Public,
        Table::Rayon,
        Table::Etat,
        Table::Suivi,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Genre => "genre",
            Self::Public => "public",
            Self::Rayon => "rayon",
            Self::Etat => "etat",
            Self::Suivi => "suivi",
            Self::Livre => "livre",
            Self::Dvd => "dvd",
            Self::Revue => "revue",
            Self::Exemplaire => "exemplaire",
            Self::CommandeDocument => "commandedocument",
            Self::Commandes => "commandes",
            Self::Abonnement => "abonnement",
            Self::Expiration => "expiration",
        }
    }

    /// Parses an identifier by exact, case-sensitive match.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|table| table.as_str() == value)
    }

    /// Whether this is an id + `libelle` dictionary table.
    pub fn is_lookup(self) -> bool {
        Self::LOOKUPS.contains(&self)
    }
}

impl Display for Table {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::Table;

    #[test]
    fn parse_roundtrips_every_identifier() {
        for table in Table::ALL {
            assert_eq!(Table::parse(table.as_str()), Some(table));
        }
    }

    #[test]
    fn parse_is_case_sensitive() {
        assert_eq!(Table::parse("Livre"), None);
        assert_eq!(Table::parse("COMMANDEDOCUMENT"), None);
        assert_eq!(Table::parse(" livre"), None);
    }

    #[test]
    fn only_dictionaries_are_lookups() {
        assert!(Table::Suivi.is_lookup());
        assert!(!Table::Livre.is_lookup());
        assert!(!Table::Commandes.is_lookup());
    }
}
