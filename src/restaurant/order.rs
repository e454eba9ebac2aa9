use super::menu::{Menu, MenuItem};
use super::parameters::Parameters;
use crate::core::errors::SimError;
use crate::core::random::{exponential, weighted_choice};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// How a customer places the order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    Terminal,
    Cashier,
    Online,
}

/// How the delivery flag is derived from the configured probability
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeliveryRule {
    /// Delivery is needed with the configured probability
    #[default]
    AsNamed,
    /// Delivery is needed with one minus the configured probability
    Inverted,
}

impl DeliveryRule {
    fn needs_delivery<R: Rng + ?Sized>(self, rng: &mut R, probability: f64) -> bool {
        let draw: f64 = rng.gen();
        match self {
            DeliveryRule::AsNamed => draw < probability,
            DeliveryRule::Inverted => probability < draw,
        }
    }
}

/// A single customer's order
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub channel: Channel,
    pub needs_delivery: bool,
    pub items: Vec<MenuItem>,
}

impl Order {
    /// Draw a random order.
    ///
    /// The item count is an exponential draw with the given mean, rounded
    /// half to even. A count of zero is a customer who leaves before ordering.
    pub fn generate<R: Rng + ?Sized>(
        rng: &mut R,
        channel_mix: &[(Channel, f64)],
        delivery_probability: f64,
        delivery_rule: DeliveryRule,
        mean_order_size: f64,
        menu: &Menu,
    ) -> Result<Self, SimError> {
        let channel = *weighted_choice(rng, channel_mix)?;
        let needs_delivery = delivery_rule.needs_delivery(rng, delivery_probability);
        let amount = exponential(rng, mean_order_size).round_ties_even() as usize;
        let items = menu.generate_items(rng, amount)?;

        Ok(Self {
            channel,
            needs_delivery,
            items,
        })
    }

    /// Draw an order using the simulation parameters
    pub fn from_parameters<R: Rng + ?Sized>(
        rng: &mut R,
        params: &Parameters,
    ) -> Result<Self, SimError> {
        Self::generate(
            rng,
            &params.channel_mix(),
            params.delivery_probability(),
            params.delivery_rule(),
            params.order_size(),
            params.menu(),
        )
    }

    /// Customer left without ordering anything
    pub fn is_abandoned(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }
}
