//! Command-line front end of the Thea SDK.
//!
//! Loads a TOML configuration, builds a [`TheaClient`] and runs one action
//! per invocation, printing its result as JSON.
//!
//! ```bash
//! thea --config thea.toml convert --token-id 1 --amount 1000
//! RUST_LOG=thea_core=debug thea --config thea.toml query-recover --token-id 1 --amount 1000
//! ```

use alloy_primitives::{Address, U256};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use thea_config::Config;
use thea_core::TheaClient;

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to the TOML configuration file
	#[arg(short, long, default_value = "thea.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Convert a VCC NFT into base tokens
	Convert {
		#[arg(long)]
		token_id: U256,
		#[arg(long)]
		amount: U256,
	},
	/// Burn base tokens to recover a VCC NFT
	Recover {
		#[arg(long)]
		token_id: U256,
		#[arg(long)]
		amount: U256,
	},
	/// Show the base tokens a recovery would burn
	QueryRecover {
		#[arg(long)]
		token_id: U256,
		#[arg(long)]
		amount: U256,
	},
	/// Request an unwrap of a VCC NFT to an off-chain account
	Unwrap {
		#[arg(long)]
		token_id: U256,
		#[arg(long)]
		amount: U256,
		#[arg(long)]
		offchain_account: String,
	},
	/// Show the state of an unwrap request
	UnwrapState {
		#[arg(long)]
		request_id: U256,
	},
	/// Retire a VCC NFT
	OffsetNft {
		#[arg(long)]
		token_id: U256,
		#[arg(long)]
		amount: U256,
		/// Beneficiary of the retirement, the signer by default
		#[arg(long)]
		receiver: Option<Address>,
	},
	/// Request retirement of base tokens of a vintage
	OffsetFungible {
		#[arg(long)]
		vintage: U256,
		#[arg(long)]
		amount: U256,
		#[arg(long, default_value = "0")]
		token_id: U256,
	},
	/// List the retirements of the logged-in account
	OffsetHistory,
	/// List indexed VCC tokens grouped by project
	TokenList,
	/// Log in to the backend with the configured signer
	Login,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	use tracing_subscriber::{fmt, EnvFilter};

	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
	fmt()
		.with_env_filter(env_filter)
		.with_target(true)
		.with_writer(std::io::stderr)
		.init();

	let config = Config::from_file(&args.config).await?;
	tracing::info!(
		config = %args.config.display(),
		chain_id = config.network.chain_id,
		"Loaded configuration"
	);

	let client = TheaClient::from_config(&config).await?;
	run(&client, args.command).await
}

async fn run(client: &TheaClient, command: Command) -> Result<(), Box<dyn std::error::Error>> {
	match command {
		Command::Convert { token_id, amount } => {
			print_json(&client.convert().convert_nft(token_id, amount).await?)
		},
		Command::Recover { token_id, amount } => {
			print_json(&client.recover().recover_nft(token_id, amount).await?)
		},
		Command::QueryRecover { token_id, amount } => print_json(
			&client
				.recover()
				.query_recover_fungibles(token_id, amount)
				.await?,
		),
		Command::Unwrap {
			token_id,
			amount,
			offchain_account,
		} => print_json(
			&client
				.unwrap()
				.unwrap_token(token_id, amount, &offchain_account)
				.await?,
		),
		Command::UnwrapState { request_id } => {
			print_json(&client.unwrap().get_unwrap_token_state(request_id).await?)
		},
		Command::OffsetNft {
			token_id,
			amount,
			receiver,
		} => print_json(&client.offset().offset_nft(token_id, amount, receiver).await?),
		Command::OffsetFungible {
			vintage,
			amount,
			token_id,
		} => print_json(
			&client
				.offset()
				.offset_fungible(vintage, amount, token_id)
				.await?,
		),
		Command::OffsetHistory => print_json(&client.offset().offset_history().await?),
		Command::TokenList => print_json(&client.tokens().token_list().await?),
		Command::Login => print_json(&client.auth().login().await?),
	}
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
	println!("{}", serde_json::to_string_pretty(value)?);
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use clap::CommandFactory;

	#[test]
	fn test_cli_definition() {
		Args::command().debug_assert();
	}

	#[test]
	fn test_parses_offset_fungible_defaults() {
		let args = Args::try_parse_from([
			"thea",
			"offset-fungible",
			"--vintage",
			"2019",
			"--amount",
			"5",
		])
		.unwrap();
		assert_eq!(args.config, PathBuf::from("thea.toml"));
		match args.command {
			Command::OffsetFungible {
				vintage,
				amount,
				token_id,
			} => {
				assert_eq!(vintage, U256::from(2019));
				assert_eq!(amount, U256::from(5));
				assert_eq!(token_id, U256::ZERO);
			},
			other => panic!("unexpected command {:?}", other),
		}
	}

	#[test]
	fn test_parses_listing_commands() {
		let args = Args::try_parse_from(["thea", "token-list"]).unwrap();
		assert!(matches!(args.command, Command::TokenList));
		let args = Args::try_parse_from(["thea", "offset-history"]).unwrap();
		assert!(matches!(args.command, Command::OffsetHistory));
	}

	#[test]
	fn test_parses_receiver_address() {
		let args = Args::try_parse_from([
			"thea",
			"--log-level",
			"debug",
			"offset-nft",
			"--token-id",
			"1",
			"--amount",
			"10",
			"--receiver",
			"0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266",
		])
		.unwrap();
		assert_eq!(args.log_level, "debug");
		assert!(matches!(
			args.command,
			Command::OffsetNft { receiver: Some(_), .. }
		));
	}
}
