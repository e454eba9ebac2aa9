use crate::core::errors::SimError;
use rand::distributions::WeightedIndex;
use rand::prelude::Distribution;
use log::warn;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// One catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    name: String,
    /// Mean cooking time in seconds
    mean_cooking_time: f64,
    /// Relative order weight
    popularity: u32,
}

impl MenuItem {
    pub fn new(name: impl Into<String>, mean_cooking_time: f64, popularity: u32) -> Self {
        Self {
            name: name.into(),
            mean_cooking_time,
            popularity,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mean_cooking_time(&self) -> f64 {
        self.mean_cooking_time
    }

    pub fn popularity(&self) -> u32 {
        self.popularity
    }

    fn validate(&self) -> Result<(), SimError> {
        let reason = if self.name.trim().is_empty() {
            Some("name is empty")
        } else if !self.mean_cooking_time.is_finite() || self.mean_cooking_time < 0.0 {
            Some("cooking time must be finite and non-negative")
        } else if self.popularity == 0 {
            Some("popularity must be positive")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(SimError::InvalidMenuItem {
                name: self.name.clone(),
                reason: reason.to_string(),
            }),
            None => Ok(()),
        }
    }
}

impl std::fmt::Display for MenuItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Weighted item catalog.
///
/// Items only enter through [`Menu::add_item`], which rejects malformed
/// entries, so every registered weight is positive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MenuRecord")]
pub struct Menu {
    items: Vec<MenuItem>,
}

/// Serialized shape of a [`Menu`]; every item is re-registered on load
#[derive(Deserialize)]
struct MenuRecord {
    items: Vec<MenuItem>,
}

impl TryFrom<MenuRecord> for Menu {
    type Error = SimError;

    fn try_from(record: MenuRecord) -> Result<Self, Self::Error> {
        record.items.into_iter().try_fold(Menu::new(), Menu::with_item)
    }
}

impl Menu {
    /// Create an empty menu
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// The standard six-item fast-food menu
    pub fn standard() -> Self {
        let mut menu = Self::new();
        for (name, cooking_time, popularity) in [
            ("Cheeseburger", 20.0, 50),
            ("Big Mac", 40.0, 60),
            ("Big Tasty", 60.0, 40),
            ("Shrimp Roll", 80.0, 10),
            ("French Fries", 10.0, 100),
            ("Coca-Cola", 8.0, 130),
        ] {
            if let Err(err) = menu.add_item(MenuItem::new(name, cooking_time, popularity)) {
                warn!("skipping standard menu item: {}", err);
            }
        }
        menu
    }

    /// Register an item. Names must be unique.
    pub fn add_item(&mut self, item: MenuItem) -> Result<(), SimError> {
        item.validate()?;
        if self.get(item.name()).is_some() {
            return Err(SimError::DuplicateMenuItem(item.name));
        }
        self.items.push(item);
        Ok(())
    }

    /// Builder form of [`Menu::add_item`]
    pub fn with_item(mut self, item: MenuItem) -> Result<Self, SimError> {
        self.add_item(item)?;
        Ok(self)
    }

    /// Change the weight of a registered item
    pub fn set_popularity(&mut self, name: &str, popularity: u32) -> Result<(), SimError> {
        let index = self
            .items
            .iter()
            .position(|item| item.name == name)
            .ok_or_else(|| SimError::UnknownMenuItem(name.to_string()))?;

        let updated = MenuItem::new(name, self.items[index].mean_cooking_time, popularity);
        updated.validate()?;
        self.items[index] = updated;
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&MenuItem> {
        self.items.iter().find(|item| item.name == name)
    }

    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Fail if the menu cannot be sampled from
    pub fn validate(&self) -> Result<(), SimError> {
        if self.items.is_empty() {
            return Err(SimError::EmptyMenu);
        }
        self.items.iter().try_for_each(MenuItem::validate)
    }

    /// Draw `amount` items independently, with replacement, proportionally
    /// to popularity
    pub fn generate_items<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        amount: usize,
    ) -> Result<Vec<MenuItem>, SimError> {
        if amount == 0 {
            return Ok(Vec::new());
        }
        let weights = WeightedIndex::new(self.items.iter().map(|item| item.popularity))
            .map_err(|_| SimError::EmptyMenu)?;
        Ok((0..amount)
            .map(|_| self.items[weights.sample(rng)].clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_standard_menu_is_valid() {
        let menu = Menu::standard();
        assert_eq!(menu.len(), 6);
        assert!(menu.validate().is_ok());
        assert_eq!(menu.get("Big Tasty").unwrap().popularity(), 40);
    }

    #[test]
    fn test_standard_menu_matches_registered_items() {
        let mut menu = Menu::new();
        menu.add_item(MenuItem::new("Cheeseburger", 20.0, 50)).unwrap();
        menu.add_item(MenuItem::new("Big Mac", 40.0, 60)).unwrap();
        menu.add_item(MenuItem::new("Big Tasty", 60.0, 40)).unwrap();
        menu.add_item(MenuItem::new("Shrimp Roll", 80.0, 10)).unwrap();
        menu.add_item(MenuItem::new("French Fries", 10.0, 100)).unwrap();
        menu.add_item(MenuItem::new("Coca-Cola", 8.0, 130)).unwrap();

        assert_eq!(Menu::standard(), menu);
    }

    #[test]
    fn test_deserialize_registers_every_item() {
        let json = serde_json::to_string(&Menu::standard()).unwrap();
        let restored: Menu = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, Menu::standard());

        let duplicate = r#"{"items": [
            {"name": "Pie", "mean_cooking_time": 10.0, "popularity": 5},
            {"name": "Pie", "mean_cooking_time": 12.0, "popularity": 5}
        ]}"#;
        assert!(serde_json::from_str::<Menu>(duplicate).is_err());

        let unpopular = r#"{"items": [
            {"name": "Pie", "mean_cooking_time": 10.0, "popularity": 0}
        ]}"#;
        assert!(serde_json::from_str::<Menu>(unpopular).is_err());
    }

    #[test]
    fn test_add_item_rejects_malformed_entries() {
        let mut menu = Menu::new();
        assert!(matches!(
            menu.add_item(MenuItem::new("", 10.0, 1)),
            Err(SimError::InvalidMenuItem { .. })
        ));
        assert!(matches!(
            menu.add_item(MenuItem::new("Pie", -1.0, 1)),
            Err(SimError::InvalidMenuItem { .. })
        ));
        assert!(matches!(
            menu.add_item(MenuItem::new("Pie", f64::INFINITY, 1)),
            Err(SimError::InvalidMenuItem { .. })
        ));
        assert!(matches!(
            menu.add_item(MenuItem::new("Pie", 10.0, 0)),
            Err(SimError::InvalidMenuItem { .. })
        ));
        assert!(menu.is_empty());
    }

    #[test]
    fn test_add_item_rejects_duplicates() {
        let mut menu = Menu::new();
        menu.add_item(MenuItem::new("Pie", 10.0, 5)).unwrap();
        assert!(matches!(
            menu.add_item(MenuItem::new("Pie", 12.0, 5)),
            Err(SimError::DuplicateMenuItem(_))
        ));
    }

    #[test]
    fn test_empty_menu_fails_validation() {
        assert!(matches!(Menu::new().validate(), Err(SimError::EmptyMenu)));
    }

    #[test]
    fn test_set_popularity() {
        let mut menu = Menu::standard();
        menu.set_popularity("Big Tasty", 80).unwrap();
        assert_eq!(menu.get("Big Tasty").unwrap().popularity(), 80);
        assert_eq!(menu.get("Big Tasty").unwrap().mean_cooking_time(), 60.0);
        assert!(menu.set_popularity("Big Tasty", 0).is_err());
        assert!(matches!(
            menu.set_popularity("Pizza", 3),
            Err(SimError::UnknownMenuItem(_))
        ));
    }

    #[test]
    fn test_generate_items_follows_popularity() {
        let menu = Menu::new()
            .with_item(MenuItem::new("Rare", 5.0, 1))
            .and_then(|menu| menu.with_item(MenuItem::new("Common", 5.0, 9)))
            .unwrap();
        let mut rng = StdRng::seed_from_u64(3);

        let items = menu.generate_items(&mut rng, 20_000).unwrap();
        assert_eq!(items.len(), 20_000);
        let common = items.iter().filter(|item| item.name() == "Common").count();
        let frequency = common as f64 / items.len() as f64;
        assert!((frequency - 0.9).abs() < 0.01);
    }

    #[test]
    fn test_generate_zero_items() {
        let mut rng = StdRng::seed_from_u64(3);
        assert!(Menu::standard().generate_items(&mut rng, 0).unwrap().is_empty());
        assert!(Menu::new().generate_items(&mut rng, 0).unwrap().is_empty());
        assert!(Menu::new().generate_items(&mut rng, 2).is_err());
    }
}
