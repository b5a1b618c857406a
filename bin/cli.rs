//! Operator CLI: deploys the token set, oracle and pool, and exposes a
//! status scenario for a deployed pool.

use odra::host::{Deployer, HostEnv, NoArgs};
use odra::prelude::Addressable;
use odra::Address;

use odra_cli::{
    deploy::DeployScript,
    scenario::{Args, Error, Scenario, ScenarioMetadata},
    CommandArg, ContractProvider, DeployedContractsContainer, DeployerExt, OdraCli,
};

use commodity_pool::oracle::{PriceOracle, PriceOracleInitArgs};
use commodity_pool::pool::CommodityPool;
use commodity_pool::state::CommodityKind;
use commodity_pool::token::{FungibleToken, FungibleTokenHostRef, FungibleTokenInitArgs};

const DEPLOY_GAS: u64 = 200_000_000_000;

/// Feed ids registered for the four commodities, in `CommodityKind::all()`
/// order.
const FEED_IDS: [&str; 4] = ["WTI/USD", "XAU/USD", "XAG/USD", "NG/USD"];

fn deploy_token(
    env: &HostEnv,
    name: &str,
    symbol: &str,
    mint_authority: Address,
) -> FungibleTokenHostRef {
    env.set_gas(DEPLOY_GAS);
    FungibleToken::deploy(
        env,
        FungibleTokenInitArgs {
            name: name.to_string(),
            symbol: symbol.to_string(),
            decimals: 6,
            mint_authority,
        },
    )
}

/// Deploys the whole stack and initializes the pool record.
pub struct PoolDeployScript;

impl DeployScript for PoolDeployScript {
    fn deploy(
        &self,
        env: &HostEnv,
        container: &mut DeployedContractsContainer,
    ) -> Result<(), odra_cli::deploy::Error> {
        println!("🚀 Deploying the commodity pool stack...");
        let admin = env.get_account(0);

        let mut pool = CommodityPool::load_or_deploy(env, NoArgs, container, DEPLOY_GAS)?;
        let pool_address = *pool.address();
        println!("✅ Pool deployed at: {:?}", pool_address);

        let usdc = deploy_token(env, "USD Coin", "USDC", admin);
        let oil = deploy_token(env, "Oil Token", "OIL", pool_address);
        let gold = deploy_token(env, "Gold Token", "GOLD", pool_address);
        let silver = deploy_token(env, "Silver Token", "SLVR", pool_address);
        let natural_gas = deploy_token(env, "Natural Gas Token", "NGAS", pool_address);
        println!("✅ Token set deployed, commodity mints owned by the pool");

        let mut oracle =
            PriceOracle::load_or_deploy(env, PriceOracleInitArgs { admin }, container, DEPLOY_GAS)?;
        for (feed_id, kind) in FEED_IDS.iter().zip(CommodityKind::all()) {
            env.set_gas(DEPLOY_GAS);
            oracle.register_feed(feed_id.to_string(), kind);
        }
        println!("✅ Oracle deployed at: {:?}, feeds registered", oracle.address());

        env.set_gas(DEPLOY_GAS);
        pool.initialize(
            *oracle.address(),
            *usdc.address(),
            pool_address,
            *oil.address(),
            *gold.address(),
            *silver.address(),
            *natural_gas.address(),
        );
        println!("✅ Pool initialized");

        Ok(())
    }
}

/// Prints the pool record of a deployed pool.
pub struct PoolStatusScenario;

impl Scenario for PoolStatusScenario {
    fn args(&self) -> Vec<CommandArg> {
        vec![]
    }

    fn run(
        &self,
        env: &HostEnv,
        container: &DeployedContractsContainer,
        _args: Args,
    ) -> Result<(), Error> {
        let pool = container.contract_ref::<CommodityPool>(env)?;

        println!("🔍 Pool status");
        println!("   initialized: {}", pool.is_initialized());
        println!("   authority:   {:?}", pool.get_authority());
        println!("   oracle:      {:?}", pool.get_oracle());
        println!("   reference:   {:?}", pool.get_reference_mint());
        println!("   vault:       {:?}", pool.get_reference_vault());
        for kind in CommodityKind::all() {
            let label = kind.as_str();
            println!("   {:<12} {:?}", label, pool.get_commodity_mint(kind));
        }

        Ok(())
    }
}

impl ScenarioMetadata for PoolStatusScenario {
    const NAME: &'static str = "pool-status";
    const DESCRIPTION: &'static str = "Prints the pool record of a deployed pool";
}

pub fn main() {
    OdraCli::new()
        .about("CLI tool for the commodity swap pool")
        .deploy(PoolDeployScript)
        .contract::<CommodityPool>()
        .contract::<PriceOracle>()
        .scenario(PoolStatusScenario)
        .build()
        .run();
}
