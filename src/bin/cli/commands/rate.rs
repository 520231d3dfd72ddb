use clap::Subcommand;

use crate::client::ProcuraClient;
use crate::output::{self, OutputConfig};

/// Exchange rates
#[derive(Subcommand, Debug)]
pub enum RateCommands {
    /// List stored rates
    List,
    /// Store the rate of a currency pair, replacing any previous one
    Set {
        /// Source currency, e.g. CNY
        from: String,
        /// Target currency, e.g. FCFA
        to: String,
        /// Units of `to` per unit of `from`
        rate: f64,
    },
    /// Convert an amount with the stored rates
    Convert {
        amount: f64,
        from: String,
        #[clap(default_value = "FCFA")]
        to: String,
    },
}

/// Executes a rate command
pub async fn execute(
    client: &ProcuraClient,
    cmd: RateCommands,
    config: &OutputConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        RateCommands::List => {
            let rates = client.list_rates().await?;
            output::print_rates(&rates, config);
        }
        RateCommands::Set { from, to, rate } => {
            let stored = client.set_rate(from, to, rate).await?;
            output::print_success(
                &format!(
                    "1 {} = {} {}",
                    stored.get_from_currency(),
                    stored.get_rate(),
                    stored.get_to_currency()
                ),
                config,
            );
        }
        RateCommands::Convert { amount, from, to } => {
            let conversion = client.convert(amount, &from, &to).await?;
            output::print_conversion(&conversion, config);
        }
    }
    Ok(())
}
