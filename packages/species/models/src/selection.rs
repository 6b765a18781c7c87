//! The multiset of species a user wants to stock.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::species_key;

/// One species in a [`FishSelection`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionEntry {
    /// Common name with the casing it was first added under.
    pub name: String,
    /// Requested quantity, always `>= 1`.
    pub quantity: u32,
}

/// Error returned when deserializing a selection with an unusable key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidSelectionError {
    /// The offending key.
    pub name: String,
}

impl fmt::Display for InvalidSelectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid species name in selection: {:?}", self.name)
    }
}

impl std::error::Error for InvalidSelectionError {}

/// Requested quantity per species, keyed case-insensitively.
///
/// Entries keep insertion order and the display casing they were first
/// added with. A species whose quantity drops to zero is removed rather
/// than kept with a zero count. Serialized as a name→quantity map in
/// entry order; deserializing keeps the document's key order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FishSelection {
    entries: Vec<SelectionEntry>,
}

impl FishSelection {
    /// Creates an empty selection.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    fn position(&self, name: &str) -> Option<usize> {
        let key = species_key(name);
        self.entries
            .iter()
            .position(|entry| species_key(&entry.name) == key)
    }

    /// Adds `quantity` fish of `name`, merging with an existing entry of
    /// any casing. Blank names and zero quantities are ignored.
    pub fn add(&mut self, name: &str, quantity: u32) {
        let name = name.trim();
        if name.is_empty() || quantity == 0 {
            return;
        }
        if let Some(idx) = self.position(name) {
            let entry = &mut self.entries[idx];
            entry.quantity = entry.quantity.saturating_add(quantity);
        } else {
            self.entries.push(SelectionEntry {
                name: name.to_string(),
                quantity,
            });
        }
    }

    /// Sets the quantity for `name`. A quantity of zero removes the species.
    pub fn set_quantity(&mut self, name: &str, quantity: u32) {
        if quantity == 0 {
            self.remove(name);
            return;
        }
        match self.position(name) {
            Some(idx) => self.entries[idx].quantity = quantity,
            None => self.add(name, quantity),
        }
    }

    /// Adds one fish of `name`.
    pub fn increment(&mut self, name: &str) {
        self.add(name, 1);
    }

    /// Removes one fish of `name`, dropping the species at zero.
    pub fn decrement(&mut self, name: &str) {
        if let Some(idx) = self.position(name) {
            if self.entries[idx].quantity <= 1 {
                self.entries.remove(idx);
            } else {
                self.entries[idx].quantity -= 1;
            }
        }
    }

    /// Removes a species entirely, returning its previous quantity.
    pub fn remove(&mut self, name: &str) -> Option<u32> {
        self.position(name)
            .map(|idx| self.entries.remove(idx).quantity)
    }

    /// Requested quantity for `name`, or `0` when absent.
    #[must_use]
    pub fn quantity(&self, name: &str) -> u32 {
        self.position(name)
            .map_or(0, |idx| self.entries[idx].quantity)
    }

    /// Whether `name` is present under any casing.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Number of distinct species.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no species are selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of individual fish.
    #[must_use]
    pub fn total_fish(&self) -> u64 {
        self.entries.iter().map(|e| u64::from(e.quantity)).sum()
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &SelectionEntry> {
        self.entries.iter()
    }

    /// Display names in insertion order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    /// Flattens the selection so each name appears `quantity` times.
    #[must_use]
    pub fn expanded(&self) -> Vec<String> {
        self.entries
            .iter()
            .flat_map(|entry| std::iter::repeat_n(entry.name.clone(), entry.quantity as usize))
            .collect()
    }

    /// Whether a group compatibility check is meaningful: two or more
    /// species, or a single species kept in a group.
    #[must_use]
    pub fn requires_group_check(&self) -> bool {
        self.entries.len() >= 2 || self.entries.iter().any(|e| e.quantity >= 2)
    }
}

impl<S: AsRef<str>> FromIterator<(S, u32)> for FishSelection {
    fn from_iter<I: IntoIterator<Item = (S, u32)>>(iter: I) -> Self {
        let mut selection = Self::new();
        for (name, quantity) in iter {
            selection.add(name.as_ref(), quantity);
        }
        selection
    }
}

impl<'a> IntoIterator for &'a FishSelection {
    type Item = &'a SelectionEntry;
    type IntoIter = std::slice::Iter<'a, SelectionEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

struct SelectionVisitor;

impl<'de> Visitor<'de> for SelectionVisitor {
    type Value = FishSelection;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of species name to quantity")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut selection = FishSelection::new();
        while let Some((name, quantity)) = access.next_entry::<String, u32>()? {
            if name.trim().is_empty() {
                return Err(serde::de::Error::custom(InvalidSelectionError { name }));
            }
            selection.add(&name, quantity);
        }
        Ok(selection)
    }
}

impl<'de> Deserialize<'de> for FishSelection {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(SelectionVisitor)
    }
}

impl Serialize for FishSelection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(&entry.name, &entry.quantity)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_merges_case_insensitively_and_keeps_first_casing() {
        let mut selection = FishSelection::new();
        selection.add("Neon Tetra", 4);
        selection.add("neon tetra", 2);
        assert_eq!(selection.len(), 1);
        assert_eq!(selection.quantity("NEON TETRA"), 6);
        assert_eq!(selection.names(), vec!["Neon Tetra"]);
    }

    #[test]
    fn zero_quantity_removes_species() {
        let mut selection: FishSelection = [("Betta", 1), ("Guppy", 3)].into_iter().collect();
        selection.set_quantity("guppy", 0);
        assert!(!selection.contains("Guppy"));
        assert_eq!(selection.len(), 1);
    }

    #[test]
    fn decrement_to_zero_removes_species() {
        let mut selection: FishSelection = [("Betta", 1)].into_iter().collect();
        selection.decrement("betta");
        assert!(selection.is_empty());
    }

    #[test]
    fn add_ignores_blank_names_and_zero_quantity() {
        let mut selection = FishSelection::new();
        selection.add("   ", 3);
        selection.add("Guppy", 0);
        assert!(selection.is_empty());
    }

    #[test]
    fn expanded_repeats_each_name_by_quantity() {
        let selection: FishSelection = [("Tiger Barb", 3), ("Betta", 1)].into_iter().collect();
        assert_eq!(
            selection.expanded(),
            vec!["Tiger Barb", "Tiger Barb", "Tiger Barb", "Betta"]
        );
        assert_eq!(selection.total_fish(), 4);
    }

    #[test]
    fn group_check_requirements() {
        let single: FishSelection = [("Betta", 1)].into_iter().collect();
        assert!(!single.requires_group_check());

        let school: FishSelection = [("Neon Tetra", 2)].into_iter().collect();
        assert!(school.requires_group_check());

        let pair: FishSelection = [("Betta", 1), ("Guppy", 1)].into_iter().collect();
        assert!(pair.requires_group_check());

        assert!(!FishSelection::new().requires_group_check());
    }

    #[test]
    fn deserializes_from_map_and_drops_zero_entries() {
        let selection: FishSelection =
            serde_json::from_value(serde_json::json!({ "Guppy": 3, "Betta": 0 })).unwrap();
        assert_eq!(selection.len(), 1);
        assert_eq!(selection.quantity("guppy"), 3);
    }

    #[test]
    fn rejects_blank_names() {
        let result: Result<FishSelection, _> =
            serde_json::from_value(serde_json::json!({ " ": 3 }));
        assert!(result.is_err());
    }

    #[test]
    fn serializes_in_insertion_order() {
        let selection: FishSelection = [("Zebra Danio", 5), ("Angelfish", 1)]
            .into_iter()
            .collect();
        let json = serde_json::to_string(&selection).unwrap();
        assert_eq!(json, r#"{"Zebra Danio":5,"Angelfish":1}"#);
    }

    #[test]
    fn deserializes_in_document_order() {
        let selection: FishSelection =
            serde_json::from_str(r#"{"Zebra Danio": 5, "Angelfish": 1, "zebra danio": 1}"#)
                .unwrap();
        assert_eq!(selection.names(), vec!["Zebra Danio", "Angelfish"]);
        assert_eq!(selection.quantity("Zebra Danio"), 6);
        assert_eq!(
            serde_json::to_string(&selection).unwrap(),
            r#"{"Zebra Danio":6,"Angelfish":1}"#
        );
    }
}
