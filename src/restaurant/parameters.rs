//! Tunable inputs of a restaurant run.
//!
//! Setters never reject a value: out-of-range numbers are clamped to the
//! nearest valid bound so a badly tuned experiment still runs.

use super::menu::Menu;
use super::order::{Channel, DeliveryRule};
use crate::core::random::clamp;
use log::warn;
use serde::{Deserialize, Serialize};

const MIN_REQUEST_TIMEOUT: f64 = 0.0001;
const MIN_ORDER_SIZE: f64 = 1.0;

fn clamp_logged(field: &str, value: f64, lower: Option<f64>, upper: Option<f64>) -> f64 {
    let clamped = clamp(value, lower, upper);
    if clamped != value {
        warn!("{} = {} is out of range, using {}", field, value, clamped);
    }
    clamped
}

/// Station counts of the restaurant. Each count is at least one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Staffing {
    pub terminals: usize,
    pub services: usize,
    pub chefs: usize,
}

impl Staffing {
    pub fn new(terminals: usize, services: usize, chefs: usize) -> Self {
        Self {
            terminals: terminals.max(1),
            services: services.max(1),
            chefs: chefs.max(1),
        }
    }

    /// Build from real-valued levels: clamp to at least one, then truncate
    pub fn from_levels(terminals: f64, services: f64, chefs: f64) -> Self {
        let count = |field: &str, value: f64| clamp_logged(field, value, Some(1.0), None) as usize;
        Self {
            terminals: count("terminals", terminals),
            services: count("services", services),
            chefs: count("chefs", chefs),
        }
    }
}

impl Default for Staffing {
    fn default() -> Self {
        Self::new(2, 2, 2)
    }
}

/// Mean durations (seconds), probabilities and the menu for one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ParametersRecord")]
pub struct Parameters {
    request_timeout: f64,
    terminal_order_time: f64,
    cashier_order_time: f64,
    collect_time_per_item: f64,
    bring_time: f64,
    terminal_probability: f64,
    cashier_probability: f64,
    online_probability: f64,
    delivery_probability: f64,
    delivery_rule: DeliveryRule,
    order_size: f64,
    menu: Menu,
}

/// Serialized shape of [`Parameters`]; loaded values pass through the
/// clamping setters
#[derive(Deserialize)]
struct ParametersRecord {
    request_timeout: f64,
    terminal_order_time: f64,
    cashier_order_time: f64,
    collect_time_per_item: f64,
    bring_time: f64,
    terminal_probability: f64,
    cashier_probability: f64,
    online_probability: f64,
    delivery_probability: f64,
    delivery_rule: DeliveryRule,
    order_size: f64,
    menu: Menu,
}

impl From<ParametersRecord> for Parameters {
    fn from(record: ParametersRecord) -> Self {
        Parameters::new()
            .with_request_timeout(record.request_timeout)
            .with_terminal_order_time(record.terminal_order_time)
            .with_cashier_order_time(record.cashier_order_time)
            .with_collect_time_per_item(record.collect_time_per_item)
            .with_bring_time(record.bring_time)
            .with_terminal_probability(record.terminal_probability)
            .with_cashier_probability(record.cashier_probability)
            .with_online_probability(record.online_probability)
            .with_delivery_probability(record.delivery_probability)
            .with_delivery_rule(record.delivery_rule)
            .with_order_size(record.order_size)
            .with_menu(record.menu)
    }
}

impl Parameters {
    /// Create parameters with default values
    pub fn new() -> Self {
        Self {
            request_timeout: 60.0,
            terminal_order_time: 90.0,
            cashier_order_time: 60.0,
            collect_time_per_item: 5.0,
            bring_time: 30.0,
            terminal_probability: 0.5,
            cashier_probability: 0.3,
            online_probability: 0.2,
            delivery_probability: 0.5,
            delivery_rule: DeliveryRule::default(),
            order_size: 3.5,
            menu: Menu::standard(),
        }
    }

    /// Mean time between two customer arrivals
    pub fn with_request_timeout(mut self, seconds: f64) -> Self {
        self.request_timeout =
            clamp_logged("request_timeout", seconds, Some(MIN_REQUEST_TIMEOUT), None);
        self
    }

    pub fn with_terminal_order_time(mut self, seconds: f64) -> Self {
        self.terminal_order_time = clamp_logged("terminal_order_time", seconds, Some(0.0), None);
        self
    }

    pub fn with_cashier_order_time(mut self, seconds: f64) -> Self {
        self.cashier_order_time = clamp_logged("cashier_order_time", seconds, Some(0.0), None);
        self
    }

    pub fn with_collect_time_per_item(mut self, seconds: f64) -> Self {
        self.collect_time_per_item =
            clamp_logged("collect_time_per_item", seconds, Some(0.0), None);
        self
    }

    pub fn with_bring_time(mut self, seconds: f64) -> Self {
        self.bring_time = clamp_logged("bring_time", seconds, Some(0.0), None);
        self
    }

    /// Relative weight of ordering at a terminal, clamped to [0, 1]
    pub fn with_terminal_probability(mut self, probability: f64) -> Self {
        self.terminal_probability =
            clamp_logged("terminal_probability", probability, Some(0.0), Some(1.0));
        self
    }

    pub fn with_cashier_probability(mut self, probability: f64) -> Self {
        self.cashier_probability =
            clamp_logged("cashier_probability", probability, Some(0.0), Some(1.0));
        self
    }

    pub fn with_online_probability(mut self, probability: f64) -> Self {
        self.online_probability =
            clamp_logged("online_probability", probability, Some(0.0), Some(1.0));
        self
    }

    pub fn with_delivery_probability(mut self, probability: f64) -> Self {
        self.delivery_probability =
            clamp_logged("delivery_probability", probability, Some(0.0), Some(1.0));
        self
    }

    pub fn with_delivery_rule(mut self, rule: DeliveryRule) -> Self {
        self.delivery_rule = rule;
        self
    }

    /// Mean number of items per order, at least one
    pub fn with_order_size(mut self, items: f64) -> Self {
        self.order_size = clamp_logged("order_size", items, Some(MIN_ORDER_SIZE), None);
        self
    }

    pub fn with_menu(mut self, menu: Menu) -> Self {
        self.menu = menu;
        self
    }

    pub fn request_timeout(&self) -> f64 {
        self.request_timeout
    }

    pub fn terminal_order_time(&self) -> f64 {
        self.terminal_order_time
    }

    pub fn cashier_order_time(&self) -> f64 {
        self.cashier_order_time
    }

    pub fn collect_time_per_item(&self) -> f64 {
        self.collect_time_per_item
    }

    pub fn bring_time(&self) -> f64 {
        self.bring_time
    }

    pub fn delivery_probability(&self) -> f64 {
        self.delivery_probability
    }

    pub fn delivery_rule(&self) -> DeliveryRule {
        self.delivery_rule
    }

    pub fn order_size(&self) -> f64 {
        self.order_size
    }

    pub fn menu(&self) -> &Menu {
        &self.menu
    }

    pub fn menu_mut(&mut self) -> &mut Menu {
        &mut self.menu
    }

    /// Channel probabilities renormalised to sum to one. An all-zero mix is
    /// treated as uniform.
    pub fn channel_mix(&self) -> [(Channel, f64); 3] {
        let total = self.terminal_probability + self.cashier_probability + self.online_probability;
        if total <= 0.0 {
            let third = 1.0 / 3.0;
            return [
                (Channel::Terminal, third),
                (Channel::Cashier, third),
                (Channel::Online, third),
            ];
        }
        [
            (Channel::Terminal, self.terminal_probability / total),
            (Channel::Cashier, self.cashier_probability / total),
            (Channel::Online, self.online_probability / total),
        ]
    }
}

impl Default for Parameters {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_parameters() {
        let params = Parameters::default();
        assert_eq!(params.request_timeout(), 60.0);
        assert_eq!(params.terminal_order_time(), 90.0);
        assert_eq!(params.cashier_order_time(), 60.0);
        assert_eq!(params.collect_time_per_item(), 5.0);
        assert_eq!(params.bring_time(), 30.0);
        assert_eq!(params.delivery_probability(), 0.5);
        assert_eq!(params.order_size(), 3.5);
        assert_eq!(params.delivery_rule(), DeliveryRule::AsNamed);
        assert_eq!(params.menu().len(), 6);
    }

    #[test]
    fn test_out_of_range_values_are_clamped() {
        let params = Parameters::new()
            .with_request_timeout(-5.0)
            .with_terminal_order_time(-1.0)
            .with_bring_time(-30.0)
            .with_delivery_probability(1.7)
            .with_order_size(0.2);

        assert_eq!(params.request_timeout(), MIN_REQUEST_TIMEOUT);
        assert_eq!(params.terminal_order_time(), 0.0);
        assert_eq!(params.bring_time(), 0.0);
        assert_eq!(params.delivery_probability(), 1.0);
        assert_eq!(params.order_size(), 1.0);
    }

    #[test]
    fn test_channel_mix_is_renormalised() {
        let params = Parameters::new()
            .with_terminal_probability(1.0)
            .with_cashier_probability(0.3)
            .with_online_probability(0.2);
        let mix = params.channel_mix();
        let total: f64 = mix.iter().map(|(_, p)| p).sum();
        assert!((total - 1.0).abs() < 1e-12);
        assert!((mix[0].1 - 1.0 / 1.5).abs() < 1e-12);

        let clamped = Parameters::new()
            .with_terminal_probability(4.0)
            .with_cashier_probability(-1.0)
            .with_online_probability(1.0);
        let mix = clamped.channel_mix();
        assert_eq!(mix[0].1, 0.5);
        assert_eq!(mix[1].1, 0.0);
        assert_eq!(mix[2].1, 0.5);
    }

    #[test]
    fn test_deserialized_values_are_clamped() {
        let mut value = serde_json::to_value(Parameters::new()).unwrap();
        value["cashier_probability"] = serde_json::json!(-1.0);
        value["delivery_probability"] = serde_json::json!(7.0);
        value["request_timeout"] = serde_json::json!(0.0);
        value["order_size"] = serde_json::json!(-2.0);
        value["delivery_rule"] = serde_json::json!("Inverted");

        let params: Parameters = serde_json::from_value(value).unwrap();
        let mix = params.channel_mix();
        assert_eq!(mix[1], (Channel::Cashier, 0.0));
        assert!((mix[0].1 - 0.5 / 0.7).abs() < 1e-12);
        assert_eq!(params.delivery_probability(), 1.0);
        assert_eq!(params.request_timeout(), MIN_REQUEST_TIMEOUT);
        assert_eq!(params.order_size(), 1.0);
        assert_eq!(params.delivery_rule(), DeliveryRule::Inverted);
        assert_eq!(params.menu(), &Menu::standard());
    }

    #[test]
    fn test_default_parameters_survive_serde() {
        let json = serde_json::to_string(&Parameters::new()).unwrap();
        let restored: Parameters = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, Parameters::new());
    }

    #[test]
    fn test_all_zero_channel_mix_is_uniform() {
        let params = Parameters::new()
            .with_terminal_probability(0.0)
            .with_cashier_probability(0.0)
            .with_online_probability(0.0);
        for (_, probability) in params.channel_mix() {
            assert!((probability - 1.0 / 3.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_staffing_clamps_and_truncates() {
        assert_eq!(Staffing::from_levels(0.0, -3.0, 2.9), Staffing::new(1, 1, 2));
        assert_eq!(Staffing::new(0, 4, 0), Staffing::new(1, 4, 1));
        assert_eq!(Staffing::default(), Staffing::new(2, 2, 2));
    }
}
