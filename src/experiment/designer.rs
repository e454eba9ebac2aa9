use super::config::{ConcurrencyMode, ExperimentConfig};
use super::dataset::{Dataset, RESPONSE_COLUMN};
use crate::core::errors::SimError;
use crate::core::random::clamp;
use crate::restaurant::parameters::{Parameters, Staffing};
use crate::restaurant::simulation::RestaurantSimulation;
use log::info;
use rayon::prelude::*;

/// Which knob of the restaurant a factor turns
#[derive(Debug, Clone, PartialEq)]
pub enum FactorKind {
    Terminals,
    Services,
    Chefs,
    TerminalProbability,
    CashierProbability,
    OnlineProbability,
    DeliveryProbability,
    OrderSize,
    RequestTimeout,
    CollectTimePerItem,
    BringTime,
    /// Popularity weight of the named menu item
    ItemPopularity(String),
}

/// A factor with its low and high level
#[derive(Debug, Clone, PartialEq)]
pub struct Factor {
    pub name: String,
    pub kind: FactorKind,
    pub low: f64,
    pub high: f64,
}

impl Factor {
    pub fn new(name: impl Into<String>, kind: FactorKind, low: f64, high: f64) -> Self {
        Self {
            name: name.into(),
            kind,
            low,
            high,
        }
    }

    pub fn levels(&self) -> [f64; 2] {
        [self.low, self.high]
    }
}

/// Full 2^N factorial experiment over the restaurant simulation
#[derive(Debug, Clone)]
pub struct ExperimentDesigner {
    factors: Vec<Factor>,
    base_staffing: Staffing,
    base_parameters: Parameters,
    config: ExperimentConfig,
}

impl ExperimentDesigner {
    pub fn new(factors: Vec<Factor>) -> Self {
        Self {
            factors,
            base_staffing: Staffing::default(),
            base_parameters: Parameters::default(),
            config: ExperimentConfig::default(),
        }
    }

    /// Six-factor study of staffing, channel mix, order size and the
    /// popularity of the slowest burger, with a customer every 30 s on average
    pub fn reference() -> Self {
        Self::new(vec![
            Factor::new("terminals", FactorKind::Terminals, 2.0, 8.0),
            Factor::new("services", FactorKind::Services, 2.0, 8.0),
            Factor::new("chefs", FactorKind::Chefs, 2.0, 8.0),
            Factor::new(
                "terminal_order_proba",
                FactorKind::TerminalProbability,
                0.25,
                1.0,
            ),
            Factor::new("order_size", FactorKind::OrderSize, 2.0, 8.0),
            Factor::new(
                "big_tasty_popularity",
                FactorKind::ItemPopularity("Big Tasty".to_string()),
                20.0,
                80.0,
            ),
        ])
        .with_base_parameters(Parameters::new().with_request_timeout(30.0))
    }

    pub fn with_base_parameters(mut self, parameters: Parameters) -> Self {
        self.base_parameters = parameters;
        self
    }

    pub fn with_base_staffing(mut self, staffing: Staffing) -> Self {
        self.base_staffing = staffing;
        self
    }

    pub fn with_config(mut self, config: ExperimentConfig) -> Self {
        self.config = config;
        self
    }

    pub fn factors(&self) -> &[Factor] {
        &self.factors
    }

    pub fn config(&self) -> &ExperimentConfig {
        &self.config
    }

    /// Every combination of levels, first factor varying slowest
    pub fn plan(&self) -> Result<Vec<Vec<f64>>, SimError> {
        let count = self.factors.len();
        let cells = u32::try_from(count)
            .ok()
            .and_then(|bits| 1usize.checked_shl(bits))
            .ok_or(SimError::TooManyFactors(count))?;

        Ok((0..cells)
            .map(|cell| {
                self.factors
                    .iter()
                    .enumerate()
                    .map(|(position, factor)| {
                        let bit = (cell >> (count - 1 - position)) & 1;
                        factor.levels()[bit]
                    })
                    .collect()
            })
            .collect())
    }

    /// Staffing and parameters of one cell
    pub fn configure(&self, levels: &[f64]) -> Result<(Staffing, Parameters), SimError> {
        let mut terminals = self.base_staffing.terminals as f64;
        let mut services = self.base_staffing.services as f64;
        let mut chefs = self.base_staffing.chefs as f64;
        let mut params = self.base_parameters.clone();

        for (factor, &level) in self.factors.iter().zip(levels) {
            params = match &factor.kind {
                FactorKind::Terminals => {
                    terminals = level;
                    params
                }
                FactorKind::Services => {
                    services = level;
                    params
                }
                FactorKind::Chefs => {
                    chefs = level;
                    params
                }
                FactorKind::TerminalProbability => params.with_terminal_probability(level),
                FactorKind::CashierProbability => params.with_cashier_probability(level),
                FactorKind::OnlineProbability => params.with_online_probability(level),
                FactorKind::DeliveryProbability => params.with_delivery_probability(level),
                FactorKind::OrderSize => params.with_order_size(level),
                FactorKind::RequestTimeout => params.with_request_timeout(level),
                FactorKind::CollectTimePerItem => params.with_collect_time_per_item(level),
                FactorKind::BringTime => params.with_bring_time(level),
                FactorKind::ItemPopularity(item) => {
                    let popularity = clamp(level, Some(1.0), None) as u32;
                    params.menu_mut().set_popularity(item, popularity)?;
                    params
                }
            };
        }

        Ok((Staffing::from_levels(terminals, services, chefs), params))
    }

    /// Simulate one cell and return its mean wait in whole seconds
    pub fn run_cell(&self, index: usize, levels: &[f64]) -> Result<f64, SimError> {
        let (staffing, params) = self.configure(levels)?;
        let seed = self.config.cell_seed(index);
        let mut simulation = RestaurantSimulation::new(staffing, Some(params), seed)?;
        simulation.run(self.config.horizon)?;
        let wait = simulation.avg_wait_time()?;

        info!(
            "cell {} {:?} (seed {}): mean wait {}",
            index, levels, seed, wait
        );
        Ok(wait.total_seconds() as f64)
    }

    /// Run every cell and collect the dataset, one row per cell in plan order
    pub fn run(&self) -> Result<Dataset, SimError> {
        if self.factors.is_empty() {
            return Err(SimError::NoFactors);
        }
        let plan = self.plan()?;
        info!(
            "running {} cells over {} factors ({:?})",
            plan.len(),
            self.factors.len(),
            self.config.concurrency_mode
        );

        let responses = match self.config.concurrency_mode {
            ConcurrencyMode::Sequential => plan
                .iter()
                .enumerate()
                .map(|(index, levels)| self.run_cell(index, levels))
                .collect::<Result<Vec<_>, _>>()?,
            ConcurrencyMode::Rayon => self.run_parallel(&plan)?,
        };

        let names = self.factors.iter().map(|factor| factor.name.clone()).collect();
        let mut dataset = Dataset::new(names, RESPONSE_COLUMN);
        for (levels, response) in plan.into_iter().zip(responses) {
            dataset.push_row(levels, response)?;
        }
        Ok(dataset)
    }

    fn run_parallel(&self, plan: &[Vec<f64>]) -> Result<Vec<f64>, SimError> {
        let run_all = || {
            plan.par_iter()
                .enumerate()
                .map(|(index, levels)| self.run_cell(index, levels))
                .collect::<Result<Vec<_>, _>>()
        };

        match self.config.thread_pool_size {
            Some(size) => rayon::ThreadPoolBuilder::new()
                .num_threads(size)
                .build()
                .map_err(|err| SimError::ThreadPool(err.to_string()))?
                .install(run_all),
            None => run_all(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_factor_designer() -> ExperimentDesigner {
        ExperimentDesigner::new(vec![
            Factor::new("chefs", FactorKind::Chefs, 1.0, 4.0),
            Factor::new("order_size", FactorKind::OrderSize, 2.0, 5.0),
        ])
    }

    #[test]
    fn test_plan_is_full_cartesian_product() {
        let plan = two_factor_designer().plan().unwrap();
        assert_eq!(
            plan,
            vec![
                vec![1.0, 2.0],
                vec![1.0, 5.0],
                vec![4.0, 2.0],
                vec![4.0, 5.0],
            ]
        );
        assert_eq!(ExperimentDesigner::reference().plan().unwrap().len(), 64);
    }

    #[test]
    fn test_configure_applies_levels() {
        let designer = ExperimentDesigner::reference();
        let (staffing, params) = designer
            .configure(&[8.0, 2.0, 8.0, 1.0, 2.0, 80.0])
            .unwrap();

        assert_eq!(staffing, Staffing::new(8, 2, 8));
        assert_eq!(params.order_size(), 2.0);
        assert_eq!(params.request_timeout(), 30.0);
        assert_eq!(params.menu().get("Big Tasty").unwrap().popularity(), 80);
        let mix = params.channel_mix();
        assert!((mix[0].1 - 1.0 / 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_item_factor_fails() {
        let designer = ExperimentDesigner::new(vec![Factor::new(
            "pizza_popularity",
            FactorKind::ItemPopularity("Pizza".to_string()),
            1.0,
            2.0,
        )]);
        assert!(matches!(
            designer.configure(&[1.0]),
            Err(SimError::UnknownMenuItem(_))
        ));
    }

    #[test]
    fn test_oversized_design_is_rejected() {
        let factors = (0..usize::BITS)
            .map(|index| Factor::new(format!("f{}", index), FactorKind::Chefs, 1.0, 2.0))
            .collect();
        let designer = ExperimentDesigner::new(factors);
        assert!(matches!(
            designer.plan(),
            Err(SimError::TooManyFactors(count)) if count == usize::BITS as usize
        ));
        assert!(matches!(designer.run(), Err(SimError::TooManyFactors(_))));
    }

    #[test]
    fn test_run_without_factors_fails() {
        let designer = ExperimentDesigner::new(Vec::new());
        assert!(matches!(designer.run(), Err(SimError::NoFactors)));
    }
}
